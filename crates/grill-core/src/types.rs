//! # Domain Types
//!
//! Core domain types used throughout Grill.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────┐      ┌──────────────────┐      │
//! │  │   Category   │◄─────│   Product    │─────►│   RecipeLine     │      │
//! │  └──────────────┘      │  price_cents │      │  quantity/unit   │      │
//! │                        │  is_available│      └────────┬─────────┘      │
//! │                        └──────┬───────┘               │                 │
//! │                               │                       ▼                 │
//! │  ┌──────────────┐      ┌──────┴───────┐      ┌──────────────────┐      │
//! │  │     User     │─────►│   CartItem   │      │   Ingredient     │      │
//! │  └──────┬───────┘      └──────────────┘      │  stock, minimum  │      │
//! │         │                                    └────────┬─────────┘      │
//! │         ▼                                             │                 │
//! │  ┌──────────────┐      ┌──────────────┐      ┌────────▼─────────┐      │
//! │  │    Order     │─────►│  OrderLine   │      │InventoryMovement │      │
//! │  │ order_number │      │  snapshots   │      │ before → after   │      │
//! │  └──────────────┘      └──────────────┘      └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity has a UUID v4 `id`. Orders also carry a human-readable
//! `order_number` printed on invoices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::order::OrderStatus;
use crate::quantity::Quantity;

// =============================================================================
// Unit of Measure
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    Kg,
    G,
    L,
    Ml,
    Unit,
    Lb,
}

impl UnitOfMeasure {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kg => "kg",
            UnitOfMeasure::G => "g",
            UnitOfMeasure::L => "l",
            UnitOfMeasure::Ml => "ml",
            UnitOfMeasure::Unit => "unit",
            UnitOfMeasure::Lb => "lb",
        }
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock Status
// =============================================================================

/// Derived stock level of an ingredient.
///
/// ```text
///   stock ≤ 0            → Depleted
///   0 < stock ≤ minimum  → Low
///   stock > minimum      → Normal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Normal,
    Low,
    Depleted,
}

impl StockStatus {
    pub fn classify(stock: Quantity, minimum: Quantity) -> Self {
        if stock.hundredths() <= 0 {
            StockStatus::Depleted
        } else if stock <= minimum {
            StockStatus::Low
        } else {
            StockStatus::Normal
        }
    }
}

// =============================================================================
// Ingredient
// =============================================================================

/// A raw ingredient tracked by the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Ingredient {
    pub id: String,

    /// Unique display name ("Beef patty", "Brioche bun").
    pub name: String,

    pub description: Option<String>,

    pub unit: UnitOfMeasure,

    /// Current stock on hand. Never negative after a committed transaction.
    #[ts(type = "string")]
    pub stock: Quantity,

    /// Threshold at or below which stock counts as low.
    #[ts(type = "string")]
    pub minimum_stock: Quantity,

    /// Price paid for one package, in cents.
    pub package_price_cents: i64,

    /// Amount of `unit` in one package. Always positive.
    #[ts(type = "string")]
    pub package_size: Quantity,

    pub supplier: Option<String>,

    pub storage_location: Option<String>,

    /// Inactive ingredients are hidden from listings.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    #[inline]
    pub fn package_price(&self) -> Money {
        Money::from_cents(self.package_price_cents)
    }

    /// Cost of one whole unit of measure (package price / package size).
    pub fn cost_per_unit(&self) -> Money {
        self.cost_of(Quantity::from_whole(1))
    }

    /// Cost of an arbitrary amount of this ingredient.
    pub fn cost_of(&self, amount: Quantity) -> Money {
        self.package_price()
            .prorate(amount.hundredths(), self.package_size.hundredths())
    }

    /// Value of the stock on hand.
    pub fn stock_value(&self) -> Money {
        self.cost_of(self.stock.clamp_non_negative())
    }

    /// Value of the stock of every ingredient, rounded to cents once.
    pub fn total_stock_value<'a, I>(ingredients: I) -> Money
    where
        I: IntoIterator<Item = &'a Ingredient>,
    {
        Money::sum_prorated(ingredients.into_iter().map(|i| {
            (
                i.package_price(),
                i.stock.clamp_non_negative().hundredths(),
                i.package_size.hundredths(),
            )
        }))
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.stock, self.minimum_stock)
    }

    /// Low or depleted.
    pub fn needs_restock(&self) -> bool {
        self.status() != StockStatus::Normal
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A menu item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    pub category_id: Option<String>,

    pub name: String,

    pub description: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    pub image_url: Option<String>,

    /// Manual switch set by staff. Ingredient stock can still block sales
    /// while this is on.
    pub is_available: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Recipe Line
// =============================================================================

/// How much of one ingredient a single unit of a product consumes.
///
/// Unique per (product, ingredient). `position` preserves insertion order,
/// which is the order checkout evaluates ingredients in.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecipeLine {
    pub id: String,
    pub product_id: String,
    pub ingredient_id: String,
    #[ts(type = "string")]
    pub quantity_per_unit: Quantity,
    pub notes: Option<String>,
    pub position: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// One product reserved in a user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Delivery & Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Customer collects at the counter.
    Pickup,
    /// Courier to `delivery_address`.
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryType::Pickup => "pickup",
            DeliveryType::Delivery => "delivery",
        })
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order placed at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Sequential, human-readable number.
    pub order_number: i64,
    pub user_id: String,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    /// `None` once the promotion is deleted; the code snapshot stays.
    pub promotion_id: Option<String>,
    pub promotion_code: Option<String>,
    pub discount_cents: i64,
    /// Amount charged: line totals minus the discount.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Line totals before the discount.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.total_cents + self.discount_cents)
    }
}

/// A line of an order.
/// Uses snapshot pattern to freeze product data at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<String>,
    /// Product name at checkout (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at checkout (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Inventory Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock received (ingredient creation, deliveries).
    In,
    /// Consumed by an order.
    Out,
    /// Manual correction by staff.
    Adjustment,
}

/// Append-only audit record of one stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryMovement {
    pub id: String,
    pub ingredient_id: String,
    pub kind: MovementKind,
    /// Signed: stock_after - stock_before.
    #[ts(type = "string")]
    pub change: Quantity,
    #[ts(type = "string")]
    pub stock_before: Quantity,
    #[ts(type = "string")]
    pub stock_after: Quantity,
    pub reason: String,
    /// Who made the change; `None` for system actions.
    pub user_id: Option<String>,
    /// Set for `Out` movements created by checkout.
    pub order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_staff: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Finished-Goods Stock
// =============================================================================

/// Stock of a finished product, used only when finished-goods tracking
/// is switched on.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductStock {
    pub product_id: String,
    pub stock: i64,
    pub minimum: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductStock {
    pub fn is_low(&self) -> bool {
        self.stock <= self.minimum
    }
}

/// History row for a finished-goods stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductStockEntry {
    pub id: String,
    pub product_id: String,
    pub change: i64,
    pub stock_after: i64,
    pub reason: String,
    pub order_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
