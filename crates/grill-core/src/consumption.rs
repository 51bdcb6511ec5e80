//! # Consumption Planning
//!
//! Turns purchased quantities into per-ingredient deductions, the pure half
//! of checkout. The database layer loads stock under the write lock, calls
//! [`plan_consumption`], and applies exactly what it returns.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (insertion order)          Recipe (insertion order)               │
//! │  ──────────────────────          ────────────────────────               │
//! │  2 × Classic Burger    ──►  Bun 1.00, Beef 0.15                          │
//! │  1 × Double Burger     ──►  Bun 1.00, Beef 0.30, Cheddar 0.04            │
//! │                                                                         │
//! │  Aggregated, in order of first appearance:                              │
//! │     Bun      2.00 + 1.00 = 3.00                                         │
//! │     Beef     0.30 + 0.30 = 0.60                                         │
//! │     Cheddar  0.04                                                       │
//! │                                                                         │
//! │  The first ingredient whose total exceeds stock is reported and the    │
//! │  whole plan is rejected. Nothing is deducted.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;
use crate::MAX_ITEM_QUANTITY;

/// One recipe line of a purchased product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRequirement {
    pub ingredient_id: String,
    pub per_unit: Quantity,
}

/// A purchased product with its recipe, in cart order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLine {
    pub product_id: String,
    pub quantity: i64,
    /// Recipe lines in insertion order.
    pub recipe: Vec<RecipeRequirement>,
}

/// Current stock of an ingredient, read under the write lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientStock {
    pub ingredient_id: String,
    pub name: String,
    pub on_hand: Quantity,
}

/// A planned stock deduction for one ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub amount: Quantity,
    pub stock_before: Quantity,
    pub stock_after: Quantity,
}

/// Sums what each ingredient must supply, keyed in first-appearance order.
pub fn aggregate_requirements(lines: &[PurchaseLine]) -> CoreResult<Vec<(String, Quantity)>> {
    let mut totals: Vec<(String, Quantity)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        for requirement in &line.recipe {
            let needed = requirement
                .per_unit
                .checked_times(line.quantity)
                .ok_or(CoreError::QuantityTooLarge {
                    requested: line.quantity,
                    max: MAX_ITEM_QUANTITY,
                })?;

            match index.get(&requirement.ingredient_id) {
                Some(&i) => {
                    totals[i].1 = totals[i].1.checked_add(needed).ok_or_else(|| {
                        CoreError::RequirementTooLarge {
                            ingredient_id: requirement.ingredient_id.clone(),
                        }
                    })?;
                }
                None => {
                    index.insert(requirement.ingredient_id.clone(), totals.len());
                    totals.push((requirement.ingredient_id.clone(), needed));
                }
            }
        }
    }

    Ok(totals)
}

/// Plans every deduction for a checkout, or reports the first shortfall.
///
/// `stock` must contain every ingredient referenced by `lines`; a missing
/// entry is reported as [`CoreError::IngredientNotFound`].
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use grill_core::consumption::*;
/// use grill_core::quantity::Quantity;
///
/// let lines = vec![PurchaseLine {
///     product_id: "burger".into(),
///     quantity: 10,
///     recipe: vec![RecipeRequirement {
///         ingredient_id: "bun".into(),
///         per_unit: Quantity::from_whole(1),
///     }],
/// }];
/// let stock = HashMap::from([(
///     "bun".to_string(),
///     IngredientStock {
///         ingredient_id: "bun".into(),
///         name: "Bun".into(),
///         on_hand: Quantity::from_whole(10),
///     },
/// )]);
///
/// let plan = plan_consumption(&lines, &stock).unwrap();
/// assert_eq!(plan[0].stock_after, Quantity::zero());
/// ```
pub fn plan_consumption(
    lines: &[PurchaseLine],
    stock: &HashMap<String, IngredientStock>,
) -> CoreResult<Vec<Deduction>> {
    let totals = aggregate_requirements(lines)?;
    let mut plan = Vec::with_capacity(totals.len());

    for (ingredient_id, amount) in totals {
        let current = stock
            .get(&ingredient_id)
            .ok_or_else(|| CoreError::IngredientNotFound(ingredient_id.clone()))?;

        let stock_after =
            current
                .on_hand
                .checked_deduct(amount)
                .ok_or_else(|| CoreError::InsufficientStock {
                    ingredient: current.name.clone(),
                    on_hand: current.on_hand,
                    required: amount,
                })?;

        plan.push(Deduction {
            ingredient_id,
            ingredient_name: current.name.clone(),
            amount,
            stock_before: current.on_hand,
            stock_after,
        });
    }

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================
