//! # Cart Rules
//!
//! Pure rules for cart mutations and the cart view returned to clients.
//! The cart itself lives in the database (one row per user and product);
//! this module decides what a mutation is allowed to produce.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client Action            Change              Resulting quantity       │
//! │  ─────────────            ──────              ──────────────────       │
//! │  Add product (qty 2)  ──► CartChange::Add ──► existing + 2             │
//! │  Set quantity (5)     ──► CartChange::Set ──► 5                        │
//! │  Remove               ──► (no rule)       ──► line deleted             │
//! │                                                                         │
//! │  Every resulting quantity: 1 ≤ q ≤ 999                                 │
//! │  Every cart: ≤ 100 distinct products                                   │
//! │  Stock check (availability net of other carts) happens in grill-db     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// How a requested quantity combines with what is already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// Increment the existing line (or create it).
    Add(i64),
    /// Replace the existing line's quantity.
    Set(i64),
}

impl CartChange {
    /// The quantity the line will hold after this change.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::cart::CartChange;
    ///
    /// assert_eq!(CartChange::Add(2).resulting_quantity(Some(3)).unwrap(), 5);
    /// assert_eq!(CartChange::Set(2).resulting_quantity(Some(3)).unwrap(), 2);
    /// assert!(CartChange::Add(0).resulting_quantity(None).is_err());
    /// ```
    pub fn resulting_quantity(&self, existing: Option<i64>) -> CoreResult<i64> {
        match *self {
            CartChange::Add(quantity) => {
                validate_quantity(quantity)?;
                let total = existing.unwrap_or(0).saturating_add(quantity);
                if total > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: total,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                Ok(total)
            }
            CartChange::Set(quantity) => {
                validate_quantity(quantity)?;
                Ok(quantity)
            }
        }
    }

    pub const fn requested(&self) -> i64 {
        match *self {
            CartChange::Add(q) | CartChange::Set(q) => q,
        }
    }
}

/// Rejects a new distinct product when the cart is full.
///
/// `distinct_products` is the count BEFORE the change; `is_new_line` says
/// whether the change creates a line.
pub fn check_capacity(distinct_products: usize, is_new_line: bool) -> CoreResult<()> {
    if is_new_line && distinct_products >= MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }
    Ok(())
}

// =============================================================================
// Cart View
// =============================================================================

/// One cart line priced at the product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The cart as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    /// Sum of quantities.
    pub item_count: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

impl CartSummary {
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let total: Money = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        let lines = lines
            .into_iter()
            .map(|line| CartLineView {
                line_total_cents: line.line_total().cents(),
                product_id: line.product_id,
                name: line.name,
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
            })
            .collect();

        CartSummary {
            lines,
            item_count,
            total_cents: total.cents(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
