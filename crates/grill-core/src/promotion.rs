//! # Promotions
//!
//! Discount codes a customer can enter at checkout.
//!
//! ```text
//!   subtotal $20.00, code GRILL10 (10.00 % + $1.00, valid now)
//!
//!   percentage   20.00 × 10.00 %   = 2.00
//!   fixed                          + 1.00
//!   discount     min(3.00, 20.00)  = 3.00
//!   total        20.00 - 3.00      = 17.00
//! ```
//!
//! The discount never exceeds the subtotal. Codes are case-insensitive
//! and stored upper-case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::ValidationResult;

/// Longest accepted promotion code.
pub const MAX_CODE_LENGTH: usize = 50;

/// 100.00 % in basis points.
pub const FULL_PERCENT_BP: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub code: String,
    pub description: String,
    /// Percentage off in basis points (1250 = 12.50 %).
    pub percent_off_bp: i64,
    pub amount_off_cents: i64,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and `now` inside `[starts_at, ends_at]`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }

    /// Percentage part plus fixed part, capped at `subtotal`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use grill_core::money::Money;
    /// use grill_core::promotion::Promotion;
    ///
    /// let now = Utc::now();
    /// let promo = Promotion {
    ///     id: "p-1".into(),
    ///     code: "GRILL10".into(),
    ///     description: "Ten percent and a dollar".into(),
    ///     percent_off_bp: 1000,
    ///     amount_off_cents: 100,
    ///     starts_at: now - Duration::days(1),
    ///     ends_at: now + Duration::days(1),
    ///     is_active: true,
    ///     created_at: now,
    /// };
    /// assert_eq!(promo.discount_for(Money::from_cents(2000)).cents(), 300);
    /// assert_eq!(promo.discount_for(Money::from_cents(100)).cents(), 100);
    /// ```
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() {
            return Money::zero();
        }
        let percentage = subtotal.prorate(self.percent_off_bp, FULL_PERCENT_BP);
        let discount = percentage + Money::from_cents(self.amount_off_cents);
        if discount > subtotal {
            subtotal
        } else {
            discount
        }
    }

    /// The discount this promotion grants on `subtotal` at `now`.
    ///
    /// ## Errors
    /// - `InvalidPromotion` when inactive or outside its validity window
    pub fn apply(&self, subtotal: Money, now: DateTime<Utc>) -> CoreResult<Money> {
        if !self.is_valid_at(now) {
            return Err(CoreError::InvalidPromotion {
                code: self.code.clone(),
            });
        }
        Ok(self.discount_for(subtotal))
    }
}

/// Trims and upper-cases a code; letters, digits, `-` and `_` only.
///
/// ## Example
/// ```rust
/// use grill_core::promotion::normalize_code;
///
/// assert_eq!(normalize_code("code", " grill10 ").unwrap(), "GRILL10");
/// assert!(normalize_code("code", "10% off").is_err());
/// ```
pub fn normalize_code(field: &str, code: &str) -> ValidationResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        });
    }
    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promotion(percent_off_bp: i64, amount_off_cents: i64) -> Promotion {
        let now = Utc::now();
        Promotion {
            id: "p-1".to_string(),
            code: "WELCOME".to_string(),
            description: "Welcome".to_string(),
            percent_off_bp,
            amount_off_cents,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 12.50 % of $8.99 = 112.375 cents
        let promo = promotion(1250, 0);
        assert_eq!(promo.discount_for(Money::from_cents(899)).cents(), 112);
        // 15 % of $8.99 = 134.85 cents
        assert_eq!(promotion(1500, 0).discount_for(Money::from_cents(899)).cents(), 135);
    }

    #[test]
    fn test_discount_capped_at_subtotal() {
        assert_eq!(promotion(0, 5000).discount_for(Money::from_cents(899)).cents(), 899);
        assert_eq!(promotion(FULL_PERCENT_BP, 100).discount_for(Money::from_cents(899)).cents(), 899);
        assert_eq!(promotion(1000, 100).discount_for(Money::zero()).cents(), 0);
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let promo = promotion(1000, 0);
        assert!(promo.apply(Money::from_cents(1000), now).is_ok());

        let expired = Promotion {
            ends_at: now - Duration::minutes(1),
            ..promo.clone()
        };
        assert!(matches!(
            expired.apply(Money::from_cents(1000), now),
            Err(CoreError::InvalidPromotion { ref code }) if code == "WELCOME"
        ));

        let upcoming = Promotion {
            starts_at: now + Duration::minutes(1),
            ..promo.clone()
        };
        assert!(!upcoming.is_valid_at(now));

        let inactive = Promotion {
            is_active: false,
            ..promo
        };
        assert!(!inactive.is_valid_at(now));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("code", "summer-24").unwrap(), "SUMMER-24");
        assert_eq!(normalize_code("code", "  ").unwrap_err().field(), "code");
        assert!(normalize_code("code", &"A".repeat(51)).is_err());
        assert_eq!(normalize_code("promo_code", "café").unwrap_err().field(), "promo_code");
    }
}
