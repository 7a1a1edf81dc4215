//! HTTP-level integration tests for `/reviews`.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_listing, delete_auth, get, post_json_auth, put_json_auth, token_for,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use staybook_core::booking::BookingStatus;
use staybook_core::types::{DbId, EntityId};
use staybook_db::models::booking::{Booking, NewBooking};
use staybook_db::repositories::BookingRepo;

fn review_body(listing: &Value, rating: i64, comment: &str) -> Value {
    json!({ "listing_id": listing["id"], "rating": rating, "comment": comment })
}

fn listing_id(listing: &Value) -> EntityId {
    listing["id"].as_str().unwrap().parse().unwrap()
}

/// Insert a past stay directly, bypassing the "not in the past" rule.
async fn past_booking(
    pool: &SqlitePool,
    listing_id: EntityId,
    guest_id: DbId,
    status: BookingStatus,
) -> Booking {
    let check_in = Utc::now().date_naive() - Duration::days(10);
    BookingRepo::create_if_available(
        pool,
        &NewBooking {
            listing_id,
            guest_id,
            check_in_date: check_in,
            check_out_date: check_in + Duration::days(3),
            number_of_guests: 2,
            total_price_cents: 36_000,
            status,
            special_requests: None,
        },
    )
    .await
    .unwrap()
    .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_review_of_same_listing_rejected(pool: SqlitePool) {
    let host = common::create_user(&pool, "host1").await;
    let guest = common::create_user(&pool, "guest1").await;
    let app = common::build_test_app(pool);
    let listing = create_listing(app.clone(), &token_for(&host), "Cabin", 4).await;
    let token = token_for(&guest);

    let first = post_json_auth(app.clone(), "/api/v1/reviews", review_body(&listing, 5, "Lovely"), &token).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let json = body_json(first).await;
    assert_eq!(json["data"]["reviewer_id"], guest.id);
    assert_eq!(json["data"]["rating"], 5);

    let second = post_json_auth(app, "/api/v1/reviews", review_body(&listing, 4, "Again"), &token).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(
        json["fields"]["listing_id"][0],
        "You have already reviewed this listing."
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rating_and_comment_validation(pool: SqlitePool) {
    let host = common::create_user(&pool, "host1").await;
    let guest = common::create_user(&pool, "guest1").await;
    let app = common::build_test_app(pool);
    let listing = create_listing(app.clone(), &token_for(&host), "Cabin", 4).await;
    let token = token_for(&guest);

    for rating in [0, 6] {
        let response =
            post_json_auth(app.clone(), "/api/v1/reviews", review_body(&listing, rating, "Hm"), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["fields"]["rating"].is_array());
    }

    let response = post_json_auth(app, "/api/v1/reviews", review_body(&listing, 3, "  "), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["comment"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_citing_booking_must_be_own_completed_stay(pool: SqlitePool) {
    let host = common::create_user(&pool, "host1").await;
    let guest = common::create_user(&pool, "guest1").await;
    let other = common::create_user(&pool, "guest2").await;
    let app = common::build_test_app(pool.clone());
    let listing = create_listing(app.clone(), &token_for(&host), "Cabin", 4).await;
    let id = listing_id(&listing);

    let confirmed = past_booking(&pool, id, guest.id, BookingStatus::Confirmed).await;
    let mut body = review_body(&listing, 4, "Nice");
    body["booking_id"] = json!(confirmed.id);
    let response = post_json_auth(app.clone(), "/api/v1/reviews", body.clone(), &token_for(&guest)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["booking_id"].is_array());

    BookingRepo::transition_status(&pool, confirmed.id, BookingStatus::Confirmed, BookingStatus::Completed)
        .await
        .unwrap()
        .unwrap();

    // Someone else's booking.
    let response = post_json_auth(app.clone(), "/api/v1/reviews", body.clone(), &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["booking_id"].is_array());

    let response = post_json_auth(app, "/api/v1/reviews", body, &token_for(&guest)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["booking_id"], json!(confirmed.id));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_update_delete_and_filter(pool: SqlitePool) {
    let host = common::create_user(&pool, "host1").await;
    let guest = common::create_user(&pool, "guest1").await;
    let app = common::build_test_app(pool);
    let a = create_listing(app.clone(), &token_for(&host), "Cabin", 4).await;
    let b = create_listing(app.clone(), &token_for(&host), "Loft", 2).await;
    let token = token_for(&guest);

    let created = body_json(
        post_json_auth(app.clone(), "/api/v1/reviews", review_body(&a, 2, "Meh"), &token).await,
    )
    .await;
    post_json_auth(app.clone(), "/api/v1/reviews", review_body(&b, 5, "Great"), &token).await;
    let uri = format!("/api/v1/reviews/{}", created["data"]["id"].as_str().unwrap());

    let all = body_json(get(app.clone(), "/api/v1/reviews").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    let only_a = body_json(
        get(app.clone(), &format!("/api/v1/reviews?listing_id={}", listing_id(&a))).await,
    )
    .await;
    assert_eq!(only_a["data"].as_array().unwrap().len(), 1);

    let response = put_json_auth(app.clone(), &uri, json!({ "rating": 4 }), &token_for(&host)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app.clone(), &uri, json!({ "rating": 9 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(app.clone(), &uri, json!({ "rating": 4 }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rating"], 4);
    assert_eq!(json["data"]["comment"], "Meh");

    assert_eq!(
        delete_auth(app.clone(), &uri, &token).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(get(app, &uri).await.status(), StatusCode::NOT_FOUND);
}
