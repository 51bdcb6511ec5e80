//! # Availability Calculator
//!
//! Derives how many units of a product can be sold from ingredient stock
//! and recipe ratios.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Classic Burger recipe            stock          units it allows       │
//! │  ─────────────────────            ─────          ───────────────       │
//! │  1.00  × Brioche bun              10.00   ──►    floor(10 / 1)    = 10 │
//! │  0.15  × Beef patty (kg)           4.00   ──►    floor(4 / 0.15)  = 26 │
//! │  0.02  × Cheddar (kg)              0.50   ──►    floor(0.5 / 0.02)= 25 │
//! │                                                                         │
//! │  available = min(10, 26, 25) = 10   (limited by Brioche bun)           │
//! │                                                                         │
//! │  No recipe lines at all → Unlimited (a bottled drink bought in).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart-Aware Availability
//! Other shoppers' carts hold reservations. Before dividing, each
//! ingredient's stock is reduced by what every OTHER cart line already
//! needs of it. A negative remainder counts as zero.
//!
//! ```text
//!   Bun stock 10, Alice's cart holds 7 burgers
//!   Bob asks for 4 → net stock 10 - 7 = 3 → available 3 → rejected
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::types::{Product, StockStatus};

// =============================================================================
// Stock Policy
// =============================================================================

/// Which ingredient stock levels switch a product off entirely.
///
/// Quantitative limits always come from [`Availability`]; the policy
/// only decides the yes/no flag shown on the menu and checked by the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Only a depleted ingredient blocks its products.
    DepletedOnly,
    /// Low stock also blocks (keeps a safety margin for the kitchen).
    LowOrDepleted,
}

impl StockPolicy {
    pub const fn blocks(&self, status: StockStatus) -> bool {
        match self {
            StockPolicy::DepletedOnly => matches!(status, StockStatus::Depleted),
            StockPolicy::LowOrDepleted => {
                matches!(status, StockStatus::Depleted | StockStatus::Low)
            }
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::DepletedOnly => "depleted_only",
            StockPolicy::LowOrDepleted => "low_or_depleted",
        }
    }
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy::DepletedOnly
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "depleted_only" => Ok(StockPolicy::DepletedOnly),
            "low_or_depleted" => Ok(StockPolicy::LowOrDepleted),
            _ => Err(ValidationError::NotAllowed {
                field: "stock_policy".to_string(),
                allowed: vec!["depleted_only".to_string(), "low_or_depleted".to_string()],
            }),
        }
    }
}

// =============================================================================
// Stocked Requirement
// =============================================================================

/// A recipe line joined with the current state of its ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockedRequirement {
    pub ingredient_id: String,
    pub ingredient_name: String,
    /// Amount consumed by one unit of the product.
    pub per_unit: Quantity,
    pub on_hand: Quantity,
    pub minimum: Quantity,
    /// Held by other cart lines (zero when not cart-aware).
    pub reserved: Quantity,
}

impl StockedRequirement {
    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.on_hand, self.minimum)
    }

    /// Stock left after other carts' reservations, never below zero.
    pub fn net_stock(&self) -> Quantity {
        (self.on_hand - self.reserved).clamp_non_negative()
    }
}

// =============================================================================
// Availability
// =============================================================================

/// How many units of a product the ingredients can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "units", rename_all = "snake_case")]
pub enum Availability {
    /// No recipe lines; only the manual flag matters.
    Unlimited,
    Limited(i64),
}

impl Availability {
    /// min(floor(on_hand / per_unit)) over the recipe, ignoring reservations.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::availability::{Availability, StockedRequirement};
    /// use grill_core::quantity::Quantity;
    ///
    /// let bun = StockedRequirement {
    ///     ingredient_id: "bun".into(),
    ///     ingredient_name: "Bun".into(),
    ///     per_unit: Quantity::from_whole(1),
    ///     on_hand: Quantity::from_whole(10),
    ///     minimum: Quantity::from_whole(2),
    ///     reserved: Quantity::zero(),
    /// };
    /// assert_eq!(Availability::for_recipe(&[bun]), Availability::Limited(10));
    /// assert_eq!(Availability::for_recipe(&[]), Availability::Unlimited);
    /// ```
    pub fn for_recipe(requirements: &[StockedRequirement]) -> Self {
        Self::min_portions(requirements.iter().map(|r| r.on_hand.portions_of(r.per_unit)))
    }

    /// Same as [`Availability::for_recipe`] but divides stock net of
    /// other carts' reservations.
    pub fn net_of_reservations(requirements: &[StockedRequirement]) -> Self {
        Self::min_portions(
            requirements
                .iter()
                .map(|r| r.net_stock().portions_of(r.per_unit)),
        )
    }

    fn min_portions(portions: impl Iterator<Item = i64>) -> Self {
        match portions.min() {
            Some(units) => Availability::Limited(units),
            None => Availability::Unlimited,
        }
    }

    /// Whether `quantity` units fit.
    pub const fn allows(&self, quantity: i64) -> bool {
        match self {
            Availability::Unlimited => true,
            Availability::Limited(units) => quantity <= *units,
        }
    }

    /// `None` when unlimited.
    pub const fn units(&self) -> Option<i64> {
        match self {
            Availability::Unlimited => None,
            Availability::Limited(units) => Some(*units),
        }
    }
}

/// The ingredient that caps availability (first one wins on ties).
pub fn limiting_ingredient(requirements: &[StockedRequirement]) -> Option<&StockedRequirement> {
    requirements
        .iter()
        .min_by_key(|r| r.net_stock().portions_of(r.per_unit))
}

/// First recipe ingredient whose stock status the policy blocks.
pub fn blocking_ingredient(
    requirements: &[StockedRequirement],
    policy: StockPolicy,
) -> Option<&StockedRequirement> {
    requirements.iter().find(|r| policy.blocks(r.status()))
}

/// Effective availability flag: the manual switch AND no ingredient blocked
/// by the stock policy.
pub fn product_is_available(
    product: &Product,
    requirements: &[StockedRequirement],
    policy: StockPolicy,
) -> bool {
    product.is_available && blocking_ingredient(requirements, policy).is_none()
}

// =============================================================================
// Report
// =============================================================================

/// Availability of one product as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvailabilityReport {
    pub product_id: String,
    /// Effective flag (manual switch + stock policy).
    pub is_available: bool,
    /// Units the ingredients can make, net of other carts.
    pub availability: Availability,
    /// Name of the ingredient that caps `availability`.
    pub limited_by: Option<String>,
}

impl AvailabilityReport {
    pub fn build(product: &Product, requirements: &[StockedRequirement], policy: StockPolicy) -> Self {
        AvailabilityReport {
            product_id: product.id.clone(),
            is_available: product_is_available(product, requirements, policy),
            availability: Availability::net_of_reservations(requirements),
            limited_by: limiting_ingredient(requirements).map(|r| r.ingredient_name.clone()),
        }
    }

    /// Whether a customer can put at least one unit in the cart right now.
    pub fn can_order(&self) -> bool {
        self.is_available && self.availability.allows(1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn req(name: &str, per_unit: i64, on_hand: i64, minimum: i64, reserved: i64) -> StockedRequirement {
        StockedRequirement {
            ingredient_id: format!("id-{name}"),
            ingredient_name: name.to_string(),
            per_unit: Quantity::from_hundredths(per_unit),
            on_hand: Quantity::from_hundredths(on_hand),
            minimum: Quantity::from_hundredths(minimum),
            reserved: Quantity::from_hundredths(reserved),
        }
    }

    fn product(is_available: bool) -> Product {
        Product {
            id: "p-1".to_string(),
            category_id: None,
            name: "Classic Burger".to_string(),
            description: None,
            price_cents: 899,
            image_url: None,
            is_available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_min_over_recipe_lines() {
        let lines = vec![
            req("Bun", 100, 1000, 200, 0),
            req("Beef", 15, 400, 100, 0),
            req("Cheddar", 2, 50, 10, 0),
        ];
        assert_eq!(Availability::for_recipe(&lines), Availability::Limited(10));
        assert_eq!(limiting_ingredient(&lines).unwrap().ingredient_name, "Bun");
    }

    #[test]
    fn test_empty_recipe_is_unlimited() {
        assert_eq!(Availability::for_recipe(&[]), Availability::Unlimited);
        assert!(Availability::Unlimited.allows(999));
        assert_eq!(Availability::Unlimited.units(), None);
    }

    #[test]
    fn test_reservations_reduce_availability() {
        let lines = vec![req("Bun", 100, 1000, 0, 700)];
        assert_eq!(Availability::for_recipe(&lines), Availability::Limited(10));
        assert_eq!(Availability::net_of_reservations(&lines), Availability::Limited(3));
    }

    #[test]
    fn test_over_reserved_counts_as_zero() {
        // Stock was adjusted down below what carts hold
        let lines = vec![req("Bun", 100, 100, 0, 200)];
        assert_eq!(Availability::net_of_reservations(&lines), Availability::Limited(0));
        assert!(!Availability::Limited(0).allows(1));
    }

    #[test]
    fn test_depleted_only_policy() {
        // Stock 10, minimum 10 is "low" but still sellable by default
        let lines = vec![req("Bun", 100, 1000, 1000, 0)];
        assert!(product_is_available(&product(true), &lines, StockPolicy::DepletedOnly));
        assert!(!product_is_available(&product(true), &lines, StockPolicy::LowOrDepleted));

        let empty = vec![req("Bun", 100, 0, 1000, 0)];
        assert!(!product_is_available(&product(true), &empty, StockPolicy::DepletedOnly));
    }

    #[test]
    fn test_blocking_ingredient_is_first_in_recipe_order() {
        let lines = vec![
            req("Bun", 100, 1000, 0, 0),
            req("Beef", 15, 200, 200, 0),
            req("Cheddar", 4, 0, 50, 0),
        ];
        let low = blocking_ingredient(&lines, StockPolicy::LowOrDepleted).unwrap();
        assert_eq!(low.ingredient_name, "Beef");
        let depleted = blocking_ingredient(&lines, StockPolicy::DepletedOnly).unwrap();
        assert_eq!(depleted.ingredient_name, "Cheddar");
        assert!(blocking_ingredient(&lines[..1], StockPolicy::LowOrDepleted).is_none());
    }

    #[test]
    fn test_manual_flag_wins() {
        assert!(!product_is_available(&product(false), &[], StockPolicy::DepletedOnly));
        assert!(product_is_available(&product(true), &[], StockPolicy::DepletedOnly));
    }

    #[test]
    fn test_report() {
        let lines = vec![req("Bun", 100, 1000, 0, 400), req("Beef", 15, 400, 0, 0)];
        let report = AvailabilityReport::build(&product(true), &lines, StockPolicy::DepletedOnly);
        assert!(report.is_available);
        assert_eq!(report.availability, Availability::Limited(6));
        assert_eq!(report.limited_by.as_deref(), Some("Bun"));
        assert!(report.can_order());
    }

    #[test]
    fn test_policy_parse_and_wire_format() {
        assert_eq!("low-or-depleted".parse::<StockPolicy>().unwrap(), StockPolicy::LowOrDepleted);
        assert_eq!("DEPLETED_ONLY".parse::<StockPolicy>().unwrap(), StockPolicy::DepletedOnly);
        assert!("never".parse::<StockPolicy>().is_err());
        assert_eq!(StockPolicy::default(), StockPolicy::DepletedOnly);

        let json = serde_json::to_value(Availability::Limited(4)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "limited", "units": 4}));
        let json = serde_json::to_value(Availability::Unlimited).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "unlimited"}));
    }
}
