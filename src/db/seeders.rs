//! Database seeders for demo data.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use super::models::serialize_tags;

struct DemoCaterer {
    business_name: &'static str,
    contact_person: &'static str,
    email: &'static str,
    phone: &'static str,
    description: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    specialties: &'static [&'static str],
    occasion_types: &'static [&'static str],
    menu_types: &'static [&'static str],
    min_guests: i64,
    max_guests: i64,
    price_per_person: f64,
    rating: f64,
    review_count: i64,
    image_url: &'static str,
}

const DEMO_CATERERS: &[DemoCaterer] = &[
    DemoCaterer {
        business_name: "Gourmet Delights",
        contact_person: "Marie Laurent",
        email: "gourmet@example.com",
        phone: "111-222-3333",
        description: "Exquisite culinary experiences for any event.",
        address: "123 Food St",
        city: "Flavor Town",
        state: "CA",
        specialties: &["French", "Italian"],
        occasion_types: &["wedding", "corporate", "anniversary"],
        menu_types: &["plated", "buffet"],
        min_guests: 20,
        max_guests: 200,
        price_per_person: 50.0,
        rating: 4.8,
        review_count: 150,
        image_url: "https://example.com/gourmet.jpg",
    },
    DemoCaterer {
        business_name: "Spice Route Catering",
        contact_person: "Priya Sharma",
        email: "spice@example.com",
        phone: "444-555-6666",
        description: "Authentic flavors from around the world.",
        address: "456 Spice Ln",
        city: "Aroma City",
        state: "NY",
        specialties: &["Indian", "Thai", "Mexican"],
        occasion_types: &["wedding", "social", "birthday"],
        menu_types: &["buffet", "family-style"],
        min_guests: 30,
        max_guests: 300,
        price_per_person: 45.0,
        rating: 4.5,
        review_count: 120,
        image_url: "https://example.com/spice.jpg",
    },
    DemoCaterer {
        business_name: "Vegan Feast",
        contact_person: "Jordan Green",
        email: "vegan@example.com",
        phone: "777-888-9999",
        description: "Delicious and healthy plant-based catering.",
        address: "789 Green Rd",
        city: "Veggieville",
        state: "OR",
        specialties: &["Vegan", "Organic"],
        occasion_types: &["social", "corporate", "celebration"],
        menu_types: &["plated", "buffet"],
        min_guests: 10,
        max_guests: 100,
        price_per_person: 35.0,
        rating: 4.9,
        review_count: 90,
        image_url: "https://example.com/vegan.jpg",
    },
    DemoCaterer {
        business_name: "BBQ Masters",
        contact_person: "Hank Walker",
        email: "bbq@example.com",
        phone: "101-202-3030",
        description: "Smoked meats and classic BBQ sides.",
        address: "101 Smokehouse Blvd",
        city: "Grill City",
        state: "TX",
        specialties: &["BBQ", "American"],
        occasion_types: &["corporate", "social", "birthday"],
        menu_types: &["buffet", "food-stations"],
        min_guests: 50,
        max_guests: 500,
        price_per_person: 60.0,
        rating: 4.7,
        review_count: 200,
        image_url: "https://example.com/bbq.jpg",
    },
    DemoCaterer {
        business_name: "Sweet Treats Catering",
        contact_person: "Rosa Dulce",
        email: "sweettreats@example.com",
        phone: "505-101-2020",
        description: "Desserts and pastries for every occasion.",
        address: "505 Sugar St",
        city: "Dessert Land",
        state: "IL",
        specialties: &["Desserts", "Pastries"],
        occasion_types: &["birthday", "celebration", "anniversary", "wedding"],
        menu_types: &["dessert-bar", "buffet"],
        min_guests: 15,
        max_guests: 150,
        price_per_person: 25.0,
        rating: 4.6,
        review_count: 80,
        image_url: "https://example.com/sweettreats.jpg",
    },
];

/// Seed the demo caterer fixtures. Skipped when any caterers already
/// exist so the flag is safe to leave on.
pub async fn seed_demo_caterers(pool: &SqlitePool, password_hash: &str) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM caterers")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!("Caterers already present, skipping demo seed");
        return Ok(());
    }

    info!("Seeding {} demo caterers...", DEMO_CATERERS.len());

    for demo in DEMO_CATERERS {
        let now = chrono::Utc::now().to_rfc3339();
        let to_owned = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        sqlx::query(
            r#"
            INSERT INTO caterers (
                id, business_name, contact_person, email, password_hash, phone,
                description, address, city, state, specialties, occasion_types,
                menu_types, min_guests, max_guests, price_per_person, rating,
                review_count, image_url, is_active, is_verified, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 1, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(demo.business_name)
        .bind(demo.contact_person)
        .bind(demo.email)
        .bind(password_hash)
        .bind(demo.phone)
        .bind(demo.description)
        .bind(demo.address)
        .bind(demo.city)
        .bind(demo.state)
        .bind(serialize_tags(&to_owned(demo.specialties)))
        .bind(serialize_tags(&to_owned(demo.occasion_types)))
        .bind(serialize_tags(&to_owned(demo.menu_types)))
        .bind(demo.min_guests)
        .bind(demo.max_guests)
        .bind(demo.price_per_person)
        .bind(demo.rating)
        .bind(demo.review_count)
        .bind(demo.image_url)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    info!("Demo caterers seeded");
    Ok(())
}
