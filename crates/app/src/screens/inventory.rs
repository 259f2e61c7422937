use stockdesk_core::{DomainError, ProductId};
use stockdesk_infra::{Select, Table, fetch_all};
use stockdesk_inventory::{
    AdjustmentDialog, AdjustmentDirection, InventoryListFilter, InventoryViewRow, Quantity,
    StockAdjustment, TransactionDraft,
};

use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{ScreenError, ScreenStatus};

/// Inventory list with the stock-in / stock-out dialog.
#[derive(Debug)]
pub struct InventoryScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub rows: Vec<InventoryViewRow>,
    pub filter: InventoryListFilter,
    pub dialog: Option<AdjustmentDialog>,
}

impl InventoryScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            rows: Vec::new(),
            filter: InventoryListFilter::default(),
            dialog: None,
        }
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let query = Select::from(Table::ProductInventoryView).order_by("product_name", true);
        let result = fetch_all(self.ctx.data(), &query)
            .await
            .map_err(ScreenError::remote(Msg::LoadInventoryFailed));
        if let Some(rows) = self.status.finish(locale, result) {
            self.rows = rows;
        }
    }

    pub fn visible(&self) -> Vec<&InventoryViewRow> {
        self.filter.apply(&self.rows)
    }

    pub fn status_label(&self, row: &InventoryViewRow) -> &'static str {
        self.ctx.locale().stock_status(row.status())
    }

    /// Open the dialog for a listed product. Returns false (with a banner)
    /// when the row is unknown or has nothing to issue.
    pub fn open_adjustment(&mut self, product_id: ProductId, direction: AdjustmentDirection) -> bool {
        let opened = match self.rows.iter().find(|r| r.product_id == product_id) {
            Some(row) => AdjustmentDialog::open(row, direction).map_err(ScreenError::from),
            None => Err(DomainError::not_found().into()),
        };
        let locale = self.ctx.locale();
        match self.status.finish(locale, opened) {
            Some(dialog) => {
                self.dialog = Some(dialog);
                true
            }
            None => false,
        }
    }

    pub fn set_amount(&mut self, input: impl Into<String>) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.set_amount(input);
        }
    }

    pub fn cancel_adjustment(&mut self) {
        self.dialog = None;
    }

    /// Send the open dialog's adjustment as a delta, then refetch the list.
    /// On failure the dialog stays open with the error banner.
    ///
    /// Once the delta is committed the dialog closes, even when the history
    /// row cannot be written.
    pub async fn submit_adjustment(&mut self) -> Option<Quantity> {
        let adjustment = self.dialog.as_ref()?.adjustment();
        let locale = self.ctx.locale();
        self.status.begin();
        let result = match adjustment {
            Ok(adjustment) => self.apply(&adjustment).await.map(|q| (adjustment, q)),
            Err(err) => Err(err.into()),
        };
        let (adjustment, quantity) = self.status.finish(locale, result)?;

        self.dialog = None;
        let recorded = self.record(&adjustment).await;
        self.load().await;
        if let Err(err) = recorded {
            self.status.error = Some(err.banner(locale));
        }
        Some(quantity)
    }

    async fn apply(&self, adjustment: &StockAdjustment) -> Result<Quantity, ScreenError> {
        let quantity = self
            .ctx
            .data()
            .adjust_quantity(adjustment.product_id, adjustment.delta())
            .await
            .map_err(ScreenError::remote(Msg::AdjustFailed))?;
        tracing::info!(
            product_id = %adjustment.product_id,
            direction = adjustment.direction.as_str(),
            amount = adjustment.amount.get(),
            quantity,
            "stock adjusted"
        );
        Ok(quantity)
    }

    /// Append the transaction row when recording is enabled.
    async fn record(&self, adjustment: &StockAdjustment) -> Result<(), ScreenError> {
        if !self.ctx.config().record_adjustments {
            return Ok(());
        }
        let draft = TransactionDraft::for_adjustment(adjustment, None);
        let row = serde_json::to_value(&draft)
            .map_err(|e| ScreenError::remote(Msg::HistoryNotRecorded)(e.into()))?;
        self.ctx
            .data()
            .insert(Table::Transactions, row)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::warn!(
                    product_id = %adjustment.product_id,
                    error = %err,
                    "adjustment history not recorded"
                );
                ScreenError::remote(Msg::HistoryNotRecorded)(err)
            })
    }
}
