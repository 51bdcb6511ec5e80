//! # HTTP Handlers
//!
//! Each handler parses its input, validates it once with the core crate's
//! `validate()`, then calls one repository or stock service.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ catalog      │ menu, products, availability, recipes, categories,       │
//! │              │ finished-goods stock                                     │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ inventory    │ ingredients, manual adjustment, summary, movements       │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ cart         │ cart lines and checkout                                  │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ orders       │ customer orders, invoices, staff status updates          │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ promotions   │ discount codes                                           │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ users        │ registration and profile                                 │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ health       │ database and migration status                            │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod promotions;
pub mod users;
