//! Fixtures shared by the in-crate tests.

use chrono::{Duration, Utc};
use grill_core::input::{
    AddCartItem, IngredientInput, NewUser, ProductInput, PromotionInput, RecipeLineInput,
};
use grill_core::order::CheckoutDetails;
use grill_core::{
    DeliveryType, Ingredient, OrderWithLines, PaymentMethod, Product, Promotion, Quantity,
    RecipeLine, UnitOfMeasure, User,
};

use crate::service::CheckoutOptions;
use crate::Database;

pub fn product_input(name: &str, price_cents: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        price_cents,
        image_url: None,
        category_id: None,
        is_available: true,
    }
}

pub async fn create_product(db: &Database, name: &str, price_cents: i64) -> Product {
    db.products()
        .create(product_input(name, price_cents))
        .await
        .unwrap()
}

/// Unit-counted ingredient, $10.00 per package of 10.
pub fn ingredient_input(name: &str, stock: &str, minimum: &str) -> IngredientInput {
    IngredientInput {
        name: name.to_string(),
        description: None,
        unit: UnitOfMeasure::Unit,
        stock: stock.parse().unwrap(),
        minimum_stock: minimum.parse().unwrap(),
        package_price_cents: 1000,
        package_size: Quantity::from_whole(10),
        supplier: None,
        storage_location: None,
        is_active: true,
    }
}

pub async fn create_ingredient(db: &Database, name: &str, stock: &str, minimum: &str) -> Ingredient {
    db.inventory()
        .create_ingredient(ingredient_input(name, stock, minimum), None)
        .await
        .unwrap()
}

pub async fn create_ingredient_priced(
    db: &Database,
    name: &str,
    stock: &str,
    package_price_cents: i64,
    package_size: &str,
) -> Ingredient {
    let input = IngredientInput {
        package_price_cents,
        package_size: package_size.parse().unwrap(),
        ..ingredient_input(name, stock, "0")
    };
    db.inventory().create_ingredient(input, None).await.unwrap()
}

pub async fn add_recipe_line(db: &Database, product_id: &str, ingredient_id: &str, per_unit: &str) -> RecipeLine {
    db.recipes()
        .add(
            product_id,
            RecipeLineInput {
                ingredient_id: ingredient_id.to_string(),
                quantity_per_unit: per_unit.parse().unwrap(),
                notes: None,
            },
        )
        .await
        .unwrap()
}

pub async fn create_user(db: &Database, email: &str) -> User {
    db.users()
        .create(NewUser {
            email: email.to_string(),
            name: "Test Customer".to_string(),
            phone: Some("555-0100".to_string()),
            address: Some("Calle 10".to_string()),
            is_staff: false,
        })
        .await
        .unwrap()
}

pub async fn add_to_cart(db: &Database, user_id: &str, product_id: &str, quantity: i64) {
    db.cart_service(CheckoutOptions::default())
        .add_item(
            user_id,
            AddCartItem {
                product_id: product_id.to_string(),
                quantity,
            },
        )
        .await
        .unwrap();
}

pub fn pickup() -> CheckoutDetails {
    CheckoutDetails {
        delivery_type: DeliveryType::Pickup,
        payment_method: PaymentMethod::Cash,
        delivery_address: None,
        notes: None,
        promo_code: None,
    }
}

pub async fn checkout_pickup(db: &Database, user_id: &str) -> OrderWithLines {
    db.checkout(CheckoutOptions::default())
        .checkout(user_id, pickup())
        .await
        .unwrap()
}

/// A validated promotion running from yesterday until tomorrow.
pub fn promotion_input(code: &str, percent_off_bp: i64, amount_off_cents: i64) -> PromotionInput {
    let now = Utc::now();
    PromotionInput {
        code: code.to_string(),
        description: format!("{code} promotion"),
        percent_off_bp,
        amount_off_cents,
        starts_at: now - Duration::days(1),
        ends_at: now + Duration::days(1),
        is_active: true,
    }
    .validate()
    .unwrap()
}

pub async fn create_promotion(db: &Database, code: &str, percent_off_bp: i64, amount_off_cents: i64) -> Promotion {
    db.promotions()
        .create(promotion_input(code, percent_off_bp, amount_off_cents))
        .await
        .unwrap()
}
