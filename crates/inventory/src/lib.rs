//! Inventory domain module.
//!
//! Stock arithmetic, status classification, inventory rows and transaction
//! history, implemented purely as deterministic domain logic (no IO, no
//! storage).

pub mod dialog;
pub mod record;
pub mod status;
pub mod stock;
pub mod transaction;

pub use dialog::AdjustmentDialog;
pub use record::{
    DEFAULT_MIN_STOCK_LEVEL, InventoryLevel, InventoryListFilter, InventoryRecord, InventoryViewRow,
    LowStockAlert, StockFields,
};
pub use status::{StockFilter, StockStatus, classify};
pub use stock::{
    AdjustmentAmount, AdjustmentDirection, Quantity, StockAdjustment, apply_delta,
    compute_adjusted_quantity,
};
pub use transaction::{
    DEFAULT_HISTORY_DAYS, DateRange, ProductName, Transaction, TransactionDraft, TransactionQuery,
    TransactionType, TransactionTypeFilter,
};
