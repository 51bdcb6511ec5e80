//! # Seed Data Generator
//!
//! Populates the database with a small demo restaurant for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./grill_dev.db
//! cargo run -p grill-db --bin seed
//!
//! # Specify database path
//! cargo run -p grill-db --bin seed -- --db ./data/grill.db
//! ```
//!
//! ## Generated Data
//! - One staff user and one customer
//! - Categories: Burgers, Sides, Drinks
//! - Ingredients with opening stock (each gets an `in` movement)
//! - Products with recipes; canned drinks have no recipe
//!
//! The printed user ids go in the `x-user-id` header when calling the API.

use std::env;

use grill_core::input::{CategoryInput, IngredientInput, NewUser, ProductInput, RecipeLineInput};
use grill_core::{Quantity, UnitOfMeasure};
use grill_db::{Database, DbConfig};

/// (name, unit, stock, minimum, package price cents, package size)
const INGREDIENTS: &[(&str, UnitOfMeasure, &str, &str, i64, &str)] = &[
    ("Brioche bun", UnitOfMeasure::Unit, "48", "12", 1200, "24"),
    ("Beef", UnitOfMeasure::Kg, "8", "2", 2400, "2"),
    ("Cheddar", UnitOfMeasure::Kg, "1.5", "0.5", 1800, "1"),
    ("Lettuce", UnitOfMeasure::Kg, "2", "0.5", 300, "1"),
    ("Tomato", UnitOfMeasure::Kg, "3", "1", 450, "1"),
    ("Potato", UnitOfMeasure::Kg, "10", "3", 900, "5"),
    ("Frying oil", UnitOfMeasure::L, "5", "2", 1500, "5"),
];

/// (category, name, price cents, recipe: [(ingredient, per unit)])
const PRODUCTS: &[(&str, &str, i64, &[(&str, &str)])] = &[
    (
        "Burgers",
        "Classic Burger",
        899,
        &[("Brioche bun", "1"), ("Beef", "0.15"), ("Lettuce", "0.02"), ("Tomato", "0.03")],
    ),
    (
        "Burgers",
        "Double Cheeseburger",
        1199,
        &[("Brioche bun", "1"), ("Beef", "0.3"), ("Cheddar", "0.04")],
    ),
    ("Sides", "Fries", 350, &[("Potato", "0.25"), ("Frying oil", "0.05")]),
    ("Sides", "Side Salad", 450, &[("Lettuce", "0.1"), ("Tomato", "0.08")]),
    ("Drinks", "Lemonade", 300, &[]),
    ("Drinks", "Cola", 250, &[]),
];

fn quantity(value: &str) -> Result<Quantity, Box<dyn std::error::Error>> {
    Ok(value.parse::<Quantity>()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./grill_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Grill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./grill_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Grill Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list(None).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Users
    let staff = db
        .users()
        .create(
            NewUser {
                email: "chef@grill.test".to_string(),
                name: "Head Chef".to_string(),
                phone: None,
                address: None,
                is_staff: true,
            }
            .validate()?,
        )
        .await?;
    let customer = db
        .users()
        .create(
            NewUser {
                email: "customer@grill.test".to_string(),
                name: "Demo Customer".to_string(),
                phone: Some("555-0100".to_string()),
                address: Some("742 Evergreen Terrace".to_string()),
                is_staff: false,
            }
            .validate()?,
        )
        .await?;

    // Ingredients
    let mut ingredient_ids = Vec::new();
    for (name, unit, stock, minimum, price, size) in INGREDIENTS {
        let input = IngredientInput {
            name: name.to_string(),
            description: None,
            unit: *unit,
            stock: quantity(stock)?,
            minimum_stock: quantity(minimum)?,
            package_price_cents: *price,
            package_size: quantity(size)?,
            supplier: None,
            storage_location: None,
            is_active: true,
        }
        .validate()?;
        let ingredient = db.inventory().create_ingredient(input, Some(&staff.id)).await?;
        ingredient_ids.push((*name, ingredient.id));
    }
    println!("✓ Created {} ingredients", ingredient_ids.len());

    // Categories and products
    let mut category_ids: Vec<(&str, String)> = Vec::new();
    for (category, name, price, recipe) in PRODUCTS {
        let category_id = match category_ids.iter().find(|(c, _)| c == category) {
            Some((_, id)) => id.clone(),
            None => {
                let created = db
                    .categories()
                    .create(CategoryInput {
                        name: category.to_string(),
                    })
                    .await?;
                category_ids.push((*category, created.id.clone()));
                created.id
            }
        };

        let product = db
            .products()
            .create(
                ProductInput {
                    name: name.to_string(),
                    description: None,
                    price_cents: *price,
                    image_url: None,
                    category_id: Some(category_id),
                    is_available: true,
                }
                .validate()?,
            )
            .await?;

        for (ingredient, per_unit) in recipe.iter() {
            let Some((_, ingredient_id)) = ingredient_ids.iter().find(|(n, _)| n == ingredient) else {
                eprintln!("Unknown ingredient {} in recipe of {}", ingredient, name);
                continue;
            };
            db.recipes()
                .add(
                    &product.id,
                    RecipeLineInput {
                        ingredient_id: ingredient_id.clone(),
                        quantity_per_unit: quantity(per_unit)?,
                        notes: None,
                    },
                )
                .await?;
        }
    }
    println!("✓ Created {} products in {} categories", PRODUCTS.len(), category_ids.len());

    println!();
    println!("Staff user id:    {}", staff.id);
    println!("Customer user id: {}", customer.id);
    println!();
    println!("✅ Seed complete!");

    db.close().await;
    Ok(())
}
