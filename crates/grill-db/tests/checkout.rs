//! Checkout against a file database with a real multi-connection pool.
//!
//! These cover what an in-memory, single-connection pool cannot: several
//! transactions competing for the stock lock at once.

use std::path::PathBuf;
use std::time::Duration;

use grill_core::input::{AddCartItem, IngredientInput, NewUser, ProductInput, RecipeLineInput, StockAdjustment};
use grill_core::order::CheckoutDetails;
use grill_core::{
    CoreError, DeliveryType, Ingredient, MovementKind, PaymentMethod, Product, Quantity,
    UnitOfMeasure, User,
};
use grill_db::{CheckoutOptions, Database, DbConfig, DbError};
use uuid::Uuid;

struct TestDb {
    db: Database,
    path: PathBuf,
}

impl TestDb {
    async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("grill-test-{}.db", Uuid::new_v4()));
        let config = DbConfig::new(&path)
            .max_connections(8)
            .busy_timeout(Duration::from_secs(10));
        let db = Database::new(config).await.unwrap();
        TestDb { db, path }
    }

    async fn cleanup(self) {
        self.db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn user(db: &Database, email: &str) -> User {
    db.users()
        .create(NewUser {
            email: email.to_string(),
            name: "Customer".to_string(),
            phone: None,
            address: None,
            is_staff: false,
        })
        .await
        .unwrap()
}

async fn burger_with_buns(db: &Database, buns: &str) -> (Product, Ingredient) {
    let burger = db
        .products()
        .create(ProductInput {
            name: "Classic Burger".to_string(),
            description: None,
            price_cents: 899,
            image_url: None,
            category_id: None,
            is_available: true,
        })
        .await
        .unwrap();
    let bun = db
        .inventory()
        .create_ingredient(
            IngredientInput {
                name: "Bun".to_string(),
                description: None,
                unit: UnitOfMeasure::Unit,
                stock: buns.parse().unwrap(),
                minimum_stock: Quantity::zero(),
                package_price_cents: 1200,
                package_size: Quantity::from_whole(24),
                supplier: None,
                storage_location: None,
                is_active: true,
            },
            None,
        )
        .await
        .unwrap();
    db.recipes()
        .add(
            &burger.id,
            RecipeLineInput {
                ingredient_id: bun.id.clone(),
                quantity_per_unit: Quantity::from_whole(1),
                notes: None,
            },
        )
        .await
        .unwrap();
    (burger, bun)
}

async fn add(db: &Database, user_id: &str, product_id: &str, quantity: i64) -> Result<(), DbError> {
    db.cart_service(CheckoutOptions::default())
        .add_item(
            user_id,
            AddCartItem {
                product_id: product_id.to_string(),
                quantity,
            },
        )
        .await
        .map(|_| ())
}

async fn set_stock(db: &Database, ingredient_id: &str, stock: i64) {
    db.inventory()
        .adjust(
            ingredient_id,
            StockAdjustment {
                new_stock: Quantity::from_whole(stock),
                reason: "Recount".to_string(),
            },
            None,
        )
        .await
        .unwrap();
}

fn pickup() -> CheckoutDetails {
    CheckoutDetails {
        delivery_type: DeliveryType::Pickup,
        payment_method: PaymentMethod::Cash,
        delivery_address: None,
        notes: None,
        promo_code: None,
    }
}

#[tokio::test]
async fn bun_stock_limits_cart_and_checkout_empties_it() {
    let test = TestDb::new().await;
    let db = &test.db;
    let customer = user(db, "ana@example.com").await;
    let (burger, bun) = burger_with_buns(db, "10").await;

    let err = add(db, &customer.id, &burger.id, 12).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientAvailability {
            available: 10,
            requested: 12,
            ..
        })
    ));

    add(db, &customer.id, &burger.id, 10).await.unwrap();
    let order = db
        .checkout(CheckoutOptions::default())
        .checkout(&customer.id, pickup())
        .await
        .unwrap();

    let bun = db.ingredients().require(&bun.id).await.unwrap();
    assert_eq!(bun.stock, Quantity::zero());

    let movements = db.movements().for_order(&order.order.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].kind, MovementKind::Out);
    assert_eq!(movements[0].stock_before, Quantity::from_whole(10));
    assert_eq!(movements[0].stock_after, Quantity::zero());

    test.cleanup().await;
}

#[tokio::test]
async fn failed_checkout_leaves_everything_untouched() {
    let test = TestDb::new().await;
    let db = &test.db;
    let customer = user(db, "ana@example.com").await;
    let (burger, bun) = burger_with_buns(db, "5").await;

    add(db, &customer.id, &burger.id, 5).await.unwrap();
    set_stock(db, &bun.id, 4).await;

    let movements_before = db.movements().list(None, 100).await.unwrap().len();
    let err = db
        .checkout(CheckoutOptions::default())
        .checkout(&customer.id, pickup())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));

    assert!(db.orders().list_all(None).await.unwrap().is_empty());
    assert_eq!(
        db.ingredients().require(&bun.id).await.unwrap().stock,
        Quantity::from_whole(4)
    );
    assert_eq!(db.movements().list(None, 100).await.unwrap().len(), movements_before);
    assert_eq!(db.carts().summary(&customer.id).await.unwrap().item_count, 5);

    test.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_for_the_last_unit() {
    let test = TestDb::new().await;
    let db = &test.db;
    let ana = user(db, "ana@example.com").await;
    let ben = user(db, "ben@example.com").await;
    let (burger, bun) = burger_with_buns(db, "2").await;

    add(db, &ana.id, &burger.id, 1).await.unwrap();
    add(db, &ben.id, &burger.id, 1).await.unwrap();
    // One bun left for two carts
    set_stock(db, &bun.id, 1).await;

    let first = {
        let db = db.clone();
        let id = ana.id.clone();
        tokio::spawn(async move {
            db.checkout(CheckoutOptions::default())
                .checkout(&id, pickup())
                .await
        })
    };
    let second = {
        let db = db.clone();
        let id = ben.id.clone();
        tokio::spawn(async move {
            db.checkout(CheckoutOptions::default())
                .checkout(&id, pickup())
                .await
        })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(DbError::Domain(CoreError::InsufficientStock { .. }))
    )));

    assert_eq!(
        db.ingredients().require(&bun.id).await.unwrap().stock,
        Quantity::zero()
    );
    assert_eq!(db.orders().list_all(None).await.unwrap().len(), 1);

    test.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stock_never_goes_negative_under_load() {
    let test = TestDb::new().await;
    let db = &test.db;
    let (burger, bun) = burger_with_buns(db, "6").await;

    let mut customers = Vec::new();
    for n in 0..6 {
        let customer = user(db, &format!("customer{n}@example.com")).await;
        add(db, &customer.id, &burger.id, 1).await.unwrap();
        customers.push(customer);
    }
    set_stock(db, &bun.id, 3).await;

    let handles: Vec<_> = customers
        .into_iter()
        .map(|customer| {
            let db = db.clone();
            tokio::spawn(async move {
                db.checkout(CheckoutOptions::default())
                    .checkout(&customer.id, pickup())
                    .await
            })
        })
        .collect();

    let mut placed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(placed, 3);

    let bun = db.ingredients().require(&bun.id).await.unwrap();
    assert_eq!(bun.stock, Quantity::zero());

    let outs = db
        .movements()
        .list(Some(&bun.id), 100)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.kind == MovementKind::Out)
        .count();
    assert_eq!(outs, 3);

    test.cleanup().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cart_additions_never_over_reserve() {
    let test = TestDb::new().await;
    let db = &test.db;
    let (burger, _) = burger_with_buns(db, "3").await;

    let mut customers = Vec::new();
    for n in 0..6 {
        customers.push(user(db, &format!("shopper{n}@example.com")).await);
    }

    let handles: Vec<_> = customers
        .iter()
        .map(|customer| {
            let db = db.clone();
            let user_id = customer.id.clone();
            let product_id = burger.id.clone();
            tokio::spawn(async move { add(&db, &user_id, &product_id, 1).await })
        })
        .collect();

    let mut reserved_ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => reserved_ok += 1,
            Err(DbError::Domain(CoreError::InsufficientAvailability { available: 0, requested: 1, .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(reserved_ok, 3);

    let mut held = 0;
    for customer in &customers {
        held += db.carts().summary(&customer.id).await.unwrap().item_count;
    }
    assert_eq!(held, 3);

    let availability = db
        .products()
        .availability(&burger.id, Default::default())
        .await
        .unwrap();
    assert!(!availability.can_order());

    test.cleanup().await;
}
