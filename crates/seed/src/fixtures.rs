//! Fixed data pools the seeder draws from.

use staybook_core::booking::BookingStatus;

/// Password given to every fixture user.
pub const FIXTURE_PASSWORD: &str = "password123";

/// A fixture account: `(username, first_name, last_name)`.
pub type FixtureUser = (&'static str, &'static str, &'static str);

pub const HOSTS: &[FixtureUser] = &[
    ("host1", "Jeffrey", "Eshun"),
    ("host2", "Jane", "Smith"),
    ("host3", "Mike", "Johnson"),
    ("host4", "Sarah", "Wilson"),
];

pub const GUESTS: &[FixtureUser] = &[
    ("guest1", "Alice", "Brown"),
    ("guest2", "Bob", "Davis"),
    ("guest3", "Carol", "Garcia"),
    ("guest4", "David", "Miller"),
];

pub const TITLES: &[&str] = &[
    "Cozy Downtown Apartment",
    "Luxury Beach Villa",
    "Mountain Cabin Retreat",
    "Historic City Loft",
    "Modern Studio Flat",
    "Charming Countryside Cottage",
    "Beachfront Condo",
    "Urban Penthouse",
    "Rustic Log Cabin",
    "Elegant Townhouse",
    "Seaside Bungalow",
    "Metropolitan High-Rise",
    "Peaceful Garden House",
    "Designer Apartment",
    "Vintage Victorian Home",
    "Contemporary Loft Space",
    "Tropical Paradise Villa",
    "Ski Chalet",
    "Riverside Retreat",
    "City Center Suite",
];

pub const LOCATIONS: &[&str] = &[
    "New York, NY",
    "Los Angeles, CA",
    "Miami, FL",
    "San Francisco, CA",
    "Austin, TX",
    "Seattle, WA",
    "Boston, MA",
    "Chicago, IL",
    "Denver, CO",
    "Nashville, TN",
    "Portland, OR",
    "San Diego, CA",
    "Las Vegas, NV",
    "Phoenix, AZ",
    "Atlanta, GA",
    "Washington, DC",
    "Honolulu, HI",
    "Charleston, SC",
    "Savannah, GA",
    "Key West, FL",
];

pub const DESCRIPTIONS: &[&str] = &[
    "Perfect for couples or solo travelers looking for comfort and convenience.",
    "Spacious accommodation with modern amenities and stunning views.",
    "Quiet retreat away from the hustle and bustle of city life.",
    "Located in the heart of the city with easy access to attractions.",
    "Beautifully decorated space with all the comforts of home.",
    "Ideal for families or groups seeking a memorable vacation experience.",
    "Recently renovated with high-end furnishings and appliances.",
    "Enjoy breathtaking sunrises and sunsets from your private balcony.",
    "Experience local culture and cuisine within walking distance.",
    "Perfect blend of luxury and comfort in a prime location.",
];

/// `None` means no special request.
pub const SPECIAL_REQUESTS: &[Option<&str>] = &[
    None,
    Some("Late check-in please"),
    Some("Extra towels needed"),
    Some("Ground floor preferred"),
    Some("Quiet room please"),
    Some("Early check-in if possible"),
];

pub const REVIEW_COMMENTS: &[&str] = &[
    "Amazing place! Exactly as described and the host was very helpful.",
    "Great location and clean accommodations. Would definitely stay again.",
    "Perfect for our weekend getaway. Beautiful views and comfortable beds.",
    "Host was responsive and the place had everything we needed.",
    "Lovely property in a quiet neighborhood. Highly recommend!",
    "Good value for money. The amenities were as advertised.",
    "Wonderful experience! The place was spotless and well-equipped.",
    "Great communication from the host. Check-in was smooth and easy.",
    "Beautiful property with stunning views. Perfect for relaxation.",
    "Comfortable stay with all necessary amenities. Would book again.",
    "Nice place but could use some updates. Overall decent stay.",
    "Location was perfect for exploring the area. Clean and tidy.",
    "Exceeded expectations! The photos don't do it justice.",
    "Peaceful and quiet. Exactly what we were looking for.",
    "Good experience overall. Minor issues but nothing major.",
];

/// Mostly confirmed stays, with some of every other state.
pub const STATUS_WEIGHTS: &[(BookingStatus, u32)] = &[
    (BookingStatus::Pending, 10),
    (BookingStatus::Confirmed, 60),
    (BookingStatus::Cancelled, 15),
    (BookingStatus::Completed, 15),
];

/// Skewed towards four and five stars.
pub const RATING_WEIGHTS: &[(i64, u32)] = &[(1, 2), (2, 3), (3, 10), (4, 35), (5, 50)];
