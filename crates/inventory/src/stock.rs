//! Stock adjustment arithmetic.
//!
//! All quantity arithmetic for receiving and issuing stock goes through
//! [`compute_adjusted_quantity`]; the data store applies deltas with the same
//! function so the client preview and the stored value never disagree.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, ProductId};

/// On-hand quantity of a product.
pub type Quantity = u32;

/// Direction of a manual stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    /// Goods received (stock in).
    Add,
    /// Goods issued (stock out).
    Subtract,
}

impl AdjustmentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentDirection::Add => "add",
            AdjustmentDirection::Subtract => "subtract",
        }
    }
}

impl FromStr for AdjustmentDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AdjustmentDirection::Add),
            "subtract" => Ok(AdjustmentDirection::Subtract),
            other => Err(DomainError::validation(format!(
                "direction must be 'add' or 'subtract', got '{other}'"
            ))),
        }
    }
}

/// A validated adjustment amount (always `>= 1`).
///
/// Zero, negative, missing and non-numeric amounts cannot be represented, so
/// the submit action simply has nothing to submit until the input is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AdjustmentAmount(Quantity);

impl AdjustmentAmount {
    pub fn new(raw: i64) -> Result<Self, DomainError> {
        if raw < 1 {
            return Err(DomainError::validation("adjustment amount must be at least 1"));
        }
        let amount = Quantity::try_from(raw)
            .map_err(|_| DomainError::validation("adjustment amount is too large"))?;
        Ok(Self(amount))
    }

    /// Parse user input; anything that is not a positive integer is rejected.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let raw = input
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::validation("adjustment amount must be a whole number"))?;
        Self::new(raw)
    }

    pub fn get(self) -> Quantity {
        self.0
    }
}

impl TryFrom<i64> for AdjustmentAmount {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdjustmentAmount> for i64 {
    fn from(value: AdjustmentAmount) -> Self {
        i64::from(value.0)
    }
}

/// Compute the on-hand quantity after an adjustment.
///
/// - `Add` returns `current + amount` (saturating at `Quantity::MAX`).
/// - `Subtract` returns `max(0, current - amount)`; over-withdrawal floors at
///   zero instead of failing.
pub fn compute_adjusted_quantity(
    current: Quantity,
    amount: AdjustmentAmount,
    direction: AdjustmentDirection,
) -> Quantity {
    match direction {
        AdjustmentDirection::Add => current.saturating_add(amount.get()),
        AdjustmentDirection::Subtract => current.saturating_sub(amount.get()),
    }
}

/// Apply a signed delta with the same floor-at-zero rule.
///
/// A zero delta leaves the quantity unchanged.
pub fn apply_delta(current: Quantity, delta: i64) -> Quantity {
    let (direction, magnitude) = if delta >= 0 {
        (AdjustmentDirection::Add, delta.unsigned_abs())
    } else {
        (AdjustmentDirection::Subtract, delta.unsigned_abs())
    };

    if magnitude == 0 {
        return current;
    }

    let amount = AdjustmentAmount(Quantity::try_from(magnitude).unwrap_or(Quantity::MAX));
    compute_adjusted_quantity(current, amount, direction)
}

/// A requested adjustment for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub amount: AdjustmentAmount,
    pub direction: AdjustmentDirection,
}

impl StockAdjustment {
    pub fn new(
        product_id: ProductId,
        amount: AdjustmentAmount,
        direction: AdjustmentDirection,
    ) -> Self {
        Self {
            product_id,
            amount,
            direction,
        }
    }

    /// Signed delta sent to the store (positive for `Add`).
    pub fn delta(&self) -> i64 {
        let amount = i64::from(self.amount);
        match self.direction {
            AdjustmentDirection::Add => amount,
            AdjustmentDirection::Subtract => -amount,
        }
    }

    /// Quantity this adjustment yields from `current`.
    pub fn apply(&self, current: Quantity) -> Quantity {
        compute_adjusted_quantity(current, self.amount, self.direction)
    }
}
