//! # Request Inputs
//!
//! Typed payloads for every mutation. The HTTP layer deserializes into
//! these structs and calls `validate()` exactly once; repositories only
//! ever see validated values.
//!
//! ```text
//!   JSON body ──serde──► XxxInput ──validate()──► XxxInput (trimmed, checked)
//!                           │                          │
//!                      400 on bad shape           400 on bad value
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::order::OrderStatus;
use crate::promotion::{normalize_code, FULL_PERCENT_BP};
use crate::quantity::Quantity;
use crate::types::UnitOfMeasure;
use crate::validation::{
    validate_email, validate_ingredient_name, validate_name, validate_non_negative,
    validate_optional_text, validate_positive, validate_price_cents, validate_quantity,
    validate_reason, validate_required_text, validate_uuid, ValidationResult,
};

const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_SHORT_TEXT_LENGTH: usize = 100;
const MAX_URL_LENGTH: usize = 500;

fn default_true() -> bool {
    true
}

// =============================================================================
// Ingredients
// =============================================================================

/// Create or fully replace an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngredientInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub unit: UnitOfMeasure,
    #[serde(default)]
    #[ts(type = "string")]
    pub stock: Quantity,
    #[serde(default)]
    #[ts(type = "string")]
    pub minimum_stock: Quantity,
    pub package_price_cents: i64,
    #[ts(type = "string")]
    pub package_size: Quantity,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl IngredientInput {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_price_cents("package_price_cents", self.package_price_cents)?;
        validate_positive("package_size", self.package_size)?;
        validate_non_negative("stock", self.stock)?;
        validate_non_negative("minimum_stock", self.minimum_stock)?;

        Ok(IngredientInput {
            name: validate_ingredient_name(&self.name)?,
            description: validate_optional_text(
                "description",
                self.description,
                MAX_DESCRIPTION_LENGTH,
            )?,
            supplier: validate_optional_text("supplier", self.supplier, MAX_SHORT_TEXT_LENGTH)?,
            storage_location: validate_optional_text(
                "storage_location",
                self.storage_location,
                MAX_SHORT_TEXT_LENGTH,
            )?,
            ..self
        })
    }
}

/// Manual stock correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    /// The new absolute stock level.
    #[ts(type = "string")]
    pub new_stock: Quantity,
    pub reason: String,
}

impl StockAdjustment {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_non_negative("new_stock", self.new_stock)?;
        Ok(StockAdjustment {
            reason: validate_reason(&self.reason)?,
            ..self
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    pub fn validate(self) -> ValidationResult<Self> {
        Ok(CategoryInput {
            name: validate_name(&self.name)?,
        })
    }
}

/// Create or fully replace a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl ProductInput {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_price_cents("price_cents", self.price_cents)?;
        let category_id = validate_optional_text("category_id", self.category_id, 36)?;
        if let Some(id) = &category_id {
            validate_uuid("category_id", id)?;
        }

        Ok(ProductInput {
            name: validate_name(&self.name)?,
            description: validate_optional_text(
                "description",
                self.description,
                MAX_DESCRIPTION_LENGTH,
            )?,
            image_url: validate_optional_text("image_url", self.image_url, MAX_URL_LENGTH)?,
            category_id,
            ..self
        })
    }
}

/// One recipe line to attach to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeLineInput {
    pub ingredient_id: String,
    #[ts(type = "string")]
    pub quantity_per_unit: Quantity,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RecipeLineInput {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_uuid("ingredient_id", &self.ingredient_id)?;
        validate_positive("quantity_per_unit", self.quantity_per_unit)?;
        Ok(RecipeLineInput {
            ingredient_id: self.ingredient_id.trim().to_string(),
            notes: validate_optional_text("notes", self.notes, MAX_SHORT_TEXT_LENGTH * 2)?,
            ..self
        })
    }
}

/// Set tracked finished-goods stock for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductStockInput {
    pub stock: i64,
    #[serde(default)]
    pub minimum: i64,
}

impl ProductStockInput {
    pub fn validate(self) -> ValidationResult<Self> {
        if self.stock < 0 {
            return Err(ValidationError::Negative {
                field: "stock".to_string(),
            });
        }
        if self.minimum < 0 {
            return Err(ValidationError::Negative {
                field: "minimum".to_string(),
            });
        }
        Ok(self)
    }
}

// =============================================================================
// Cart & Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddCartItem {
    pub product_id: String,
    pub quantity: i64,
}

impl AddCartItem {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_uuid("product_id", &self.product_id)?;
        validate_quantity(self.quantity)?;
        Ok(AddCartItem {
            product_id: self.product_id.trim().to_string(),
            ..self
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SetCartQuantity {
    pub quantity: i64,
}

impl SetCartQuantity {
    pub fn validate(self) -> ValidationResult<Self> {
        validate_quantity(self.quantity)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Promotions
// =============================================================================

/// Create or fully replace a promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionInput {
    pub code: String,
    pub description: String,
    /// Basis points, 0..=10000.
    #[serde(default)]
    pub percent_off_bp: i64,
    #[serde(default)]
    pub amount_off_cents: i64,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PromotionInput {
    /// ## Rules
    /// - Code normalized upper-case, see [`normalize_code`]
    /// - Percentage within 0..=100.00 %, fixed amount not negative
    /// - At least one of the two is non-zero
    /// - The window ends after it starts
    pub fn validate(self) -> ValidationResult<Self> {
        if !(0..=FULL_PERCENT_BP).contains(&self.percent_off_bp) {
            return Err(ValidationError::OutOfRange {
                field: "percent_off_bp".to_string(),
                min: 0,
                max: FULL_PERCENT_BP,
            });
        }
        validate_price_cents("amount_off_cents", self.amount_off_cents)?;
        if self.percent_off_bp == 0 && self.amount_off_cents == 0 {
            return Err(ValidationError::Required {
                field: "percent_off_bp".to_string(),
            });
        }
        if self.ends_at <= self.starts_at {
            return Err(ValidationError::InvalidFormat {
                field: "ends_at".to_string(),
                reason: "must be after starts_at".to_string(),
            });
        }

        Ok(PromotionInput {
            code: normalize_code("code", &self.code)?,
            description: validate_required_text("description", &self.description, MAX_DESCRIPTION_LENGTH)?,
            ..self
        })
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

impl NewUser {
    pub fn validate(self) -> ValidationResult<Self> {
        Ok(NewUser {
            email: validate_email(&self.email)?,
            name: validate_required_text("name", &self.name, MAX_SHORT_TEXT_LENGTH)?,
            phone: validate_optional_text("phone", self.phone, 30)?,
            address: validate_optional_text("address", self.address, 255)?,
            ..self
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_input_from_json() {
        let input: IngredientInput = serde_json::from_str(
            r#"{
                "name": " Brioche bun ",
                "unit": "unit",
                "stock": "48",
                "minimum_stock": 12,
                "package_price_cents": 1200,
                "package_size": "24"
            }"#,
        )
        .unwrap();
        let input = input.validate().unwrap();

        assert_eq!(input.name, "Brioche bun");
        assert_eq!(input.stock, Quantity::from_whole(48));
        assert_eq!(input.minimum_stock, Quantity::from_whole(12));
        assert!(input.is_active);
    }

    #[test]
    fn test_ingredient_input_rejects_bad_values() {
        let base = IngredientInput {
            name: "Cheddar".to_string(),
            description: None,
            unit: UnitOfMeasure::Kg,
            stock: Quantity::zero(),
            minimum_stock: Quantity::zero(),
            package_price_cents: 0,
            package_size: Quantity::from_whole(1),
            supplier: None,
            storage_location: None,
            is_active: true,
        };
        assert!(base.clone().validate().is_ok());

        let err = IngredientInput {
            package_size: Quantity::zero(),
            ..base.clone()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "package_size");

        let err = IngredientInput {
            stock: Quantity::from_hundredths(-50),
            ..base.clone()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "stock");

        let err = IngredientInput {
            package_price_cents: -1,
            ..base
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "package_price_cents");
    }

    #[test]
    fn test_stock_adjustment_requires_reason() {
        let err = StockAdjustment {
            new_stock: Quantity::from_whole(3),
            reason: "   ".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "reason");

        let err = StockAdjustment {
            new_stock: Quantity::from_whole(-3),
            reason: "count".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "new_stock");
    }

    #[test]
    fn test_recipe_line_input() {
        let line = RecipeLineInput {
            ingredient_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            quantity_per_unit: Quantity::zero(),
            notes: None,
        };
        assert_eq!(line.validate().unwrap_err().field(), "quantity_per_unit");
    }

    #[test]
    fn test_add_cart_item() {
        let item = AddCartItem {
            product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            quantity: 0,
        };
        assert_eq!(item.validate().unwrap_err().field(), "quantity");
    }

    #[test]
    fn test_new_user_normalizes_email() {
        let user = NewUser {
            email: "Ana@Example.COM".to_string(),
            name: "Ana".to_string(),
            phone: Some(" ".to_string()),
            address: None,
            is_staff: false,
        }
        .validate()
        .unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_recipe_ratio_is_capped() {
        let line = |quantity_per_unit: Quantity| RecipeLineInput {
            ingredient_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            quantity_per_unit,
            notes: None,
        };
        assert!(line(Quantity::MAX).validate().is_ok());
        let err = line(Quantity::from_hundredths(5_000_000_000_000_000))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(err.field(), "quantity_per_unit");
    }

    #[test]
    fn test_promotion_input() {
        let input: PromotionInput = serde_json::from_str(
            r#"{
                "code": " grill10 ",
                "description": "Ten percent off",
                "percent_off_bp": 1000,
                "starts_at": "2026-01-01T00:00:00Z",
                "ends_at": "2026-12-31T23:59:59Z"
            }"#,
        )
        .unwrap();
        let input = input.validate().unwrap();
        assert_eq!(input.code, "GRILL10");
        assert_eq!(input.amount_off_cents, 0);
        assert!(input.is_active);

        let nothing_off = PromotionInput {
            percent_off_bp: 0,
            ..input.clone()
        };
        assert_eq!(nothing_off.validate().unwrap_err().field(), "percent_off_bp");

        let too_much = PromotionInput {
            percent_off_bp: 10_001,
            ..input.clone()
        };
        assert!(too_much.validate().is_err());

        let backwards = PromotionInput {
            ends_at: input.starts_at,
            ..input
        };
        assert_eq!(backwards.validate().unwrap_err().field(), "ends_at");
    }
}
