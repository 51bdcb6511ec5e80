//! # Stock Services
//!
//! Everything that reads stock in order to change it. Each operation runs
//! in one transaction opened by
//! [`begin_stock_transaction`](crate::stock::begin_stock_transaction), so
//! cart reservations, checkouts and adjustments against the same
//! ingredients queue behind each other instead of racing.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ CartService      │ add / set quantity, checked against availability     │
//! │                  │ net of every other cart                              │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ CheckoutService  │ cart → order + lines + deductions + movements,       │
//! │                  │ all or nothing                                       │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ InventoryService │ ingredient create / edit / delete, manual adjustment │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use grill_core::StockPolicy;
use serde::{Deserialize, Serialize};

pub mod cart;
pub mod checkout;
pub mod inventory;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use inventory::InventoryService;

/// Switches that change how carts and checkout treat stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    /// Which ingredient levels make a product unavailable.
    #[serde(default)]
    pub stock_policy: StockPolicy,

    /// Deduct finished-goods stock for products that have a
    /// `product_stock` row.
    #[serde(default)]
    pub track_finished_goods: bool,
}

impl CheckoutOptions {
    pub fn new(stock_policy: StockPolicy, track_finished_goods: bool) -> Self {
        CheckoutOptions {
            stock_policy,
            track_finished_goods,
        }
    }
}
