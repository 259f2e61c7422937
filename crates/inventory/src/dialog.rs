//! State of the stock-in / stock-out dialog on the inventory list.

use stockdesk_core::{DomainError, DomainResult, ProductId};

use crate::record::InventoryViewRow;
use crate::stock::{AdjustmentAmount, AdjustmentDirection, Quantity, StockAdjustment, compute_adjusted_quantity};

/// Open adjustment dialog for one inventory row.
///
/// `amount_input` holds whatever the user typed; it is only turned into an
/// [`AdjustmentAmount`] on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentDialog {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_quantity: Quantity,
    pub direction: AdjustmentDirection,
    pub amount_input: String,
}

impl AdjustmentDialog {
    /// Open the dialog for `row`. Issuing stock from an empty row is refused.
    pub fn open(row: &InventoryViewRow, direction: AdjustmentDirection) -> DomainResult<Self> {
        if direction == AdjustmentDirection::Subtract && !row.can_subtract() {
            return Err(DomainError::invariant("cannot issue stock from an empty row"));
        }
        Ok(Self {
            product_id: row.product_id,
            product_name: row.product_name.clone(),
            current_quantity: row.quantity,
            direction,
            amount_input: String::new(),
        })
    }

    pub fn set_amount(&mut self, input: impl Into<String>) {
        self.amount_input = input.into();
    }

    /// Submit is disabled until the typed amount is a whole number >= 1.
    pub fn can_submit(&self) -> bool {
        AdjustmentAmount::parse(&self.amount_input).is_ok()
    }

    /// Quantity the row would show after submitting, if the input is valid.
    pub fn preview(&self) -> Option<Quantity> {
        AdjustmentAmount::parse(&self.amount_input)
            .ok()
            .map(|amount| compute_adjusted_quantity(self.current_quantity, amount, self.direction))
    }

    pub fn adjustment(&self) -> DomainResult<StockAdjustment> {
        let amount = AdjustmentAmount::parse(&self.amount_input)?;
        Ok(StockAdjustment::new(self.product_id, amount, self.direction))
    }
}
