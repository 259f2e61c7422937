use chrono::{NaiveDate, SecondsFormat};

use stockdesk_infra::{Filter, Select, Table, fetch_all};
use stockdesk_inventory::{DateRange, Transaction, TransactionQuery, TransactionTypeFilter};

use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{ScreenError, ScreenStatus};

const COLUMNS: &str =
    "id, product_id, products(name), type, quantity, reference_number, notes, created_at";

/// Stock movement history. Type and date range are applied by the store;
/// the search box filters the loaded rows.
#[derive(Debug)]
pub struct TransactionsScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub query: TransactionQuery,
    pub rows: Vec<Transaction>,
    pub search: String,
}

impl TransactionsScreen {
    /// Starts on every type over the thirty days through `today`.
    pub fn new(ctx: AppContext, today: NaiveDate) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            query: TransactionQuery::initial(today),
            rows: Vec::new(),
            search: String::new(),
        }
    }

    fn select(&self) -> Select {
        let mut select = Select::from(Table::Transactions)
            .columns(COLUMNS)
            .order_by("created_at", false);
        if let Some(kind) = self.query.kind.kind() {
            select = select.eq("type", kind.as_str());
        }
        if let Some(lo) = self.query.range.lower_bound() {
            select = select.filter(Filter::gte(
                "created_at",
                lo.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(hi) = self.query.range.upper_bound() {
            select = select.filter(Filter::lte(
                "created_at",
                hi.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        select
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = fetch_all(self.ctx.data(), &self.select())
            .await
            .map_err(ScreenError::remote(Msg::LoadTransactionsFailed));
        if let Some(rows) = self.status.finish(locale, result) {
            self.rows = rows;
        }
    }

    pub async fn set_type_filter(&mut self, kind: TransactionTypeFilter) {
        self.query.kind = kind;
        self.load().await;
    }

    pub async fn set_range(&mut self, range: DateRange) {
        self.query.range = range;
        self.load().await;
    }

    pub fn visible(&self) -> Vec<&Transaction> {
        let needle = self.search.trim().to_lowercase();
        self.rows.iter().filter(|t| t.matches_search(&needle)).collect()
    }

    pub fn type_label(&self, transaction: &Transaction) -> &'static str {
        self.ctx.locale().transaction_type(transaction.kind)
    }
}
