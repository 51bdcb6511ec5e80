//! # Invoice
//!
//! The invoice data contract: everything a renderer needs to print a sales
//! invoice for one order. Rendering (PDF, HTML) is not done here.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  header    order #, date, status,            │
//! │            delivery, payment, address        │
//! │  customer  name, email, phone, address       │
//! │  lines     name × qty @ unit = subtotal      │
//! │  subtotal, promotion code, discount          │
//! │  total                                       │
//! └──────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::OrderStatus;
use crate::types::{DeliveryType, Order, OrderLine, PaymentMethod, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceHeader {
    pub order_id: String,
    pub order_number: i64,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub delivery_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub header: InvoiceHeader,
    pub customer: CustomerContact,
    pub lines: Vec<InvoiceLine>,
    pub subtotal_cents: i64,
    pub promotion_code: Option<String>,
    pub discount_cents: i64,
    pub total_cents: i64,
    /// `total_cents` formatted for display ("$21.48").
    pub total_display: String,
}

impl Invoice {
    /// Builds the invoice from the stored order snapshot.
    ///
    /// Totals are the order's stored amounts, not a recomputation; lines
    /// already carry frozen prices.
    pub fn build(order: &Order, lines: &[OrderLine], customer: &User) -> Self {
        let delivery_address = match order.delivery_type {
            DeliveryType::Delivery => order.delivery_address.clone(),
            DeliveryType::Pickup => None,
        };

        Invoice {
            header: InvoiceHeader {
                order_id: order.id.clone(),
                order_number: order.order_number,
                issued_at: order.created_at,
                status: order.status,
                delivery_type: order.delivery_type,
                payment_method: order.payment_method,
                delivery_address,
            },
            customer: CustomerContact {
                name: customer.name.clone(),
                email: customer.email.clone(),
                phone: customer.phone.clone(),
                address: customer.address.clone(),
            },
            lines: lines
                .iter()
                .map(|line| InvoiceLine {
                    name: line.name_snapshot.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                    subtotal_cents: line.line_total_cents,
                })
                .collect(),
            subtotal_cents: order.subtotal().cents(),
            promotion_code: order.promotion_code.clone(),
            discount_cents: order.discount_cents,
            total_cents: order.total_cents,
            total_display: Money::from_cents(order.total_cents).to_string(),
        }
    }
}
