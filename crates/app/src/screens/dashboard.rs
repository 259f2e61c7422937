use serde::Deserialize;

use stockdesk_infra::{ClientResult, Select, Table, count, fetch_all};
use stockdesk_inventory::{InventoryRecord, Transaction};
use stockdesk_products::NamedRef;

use crate::context::AppContext;
use crate::i18n::{Locale, Msg};

/// Number of recent transactions shown on the dashboard.
pub const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_quantity: u64,
    pub low_stock_count: usize,
    /// In order of first appearance in the product list.
    pub category_counts: Vec<CategoryCount>,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct ProductCategory {
    #[serde(default)]
    categories: Option<NamedRef>,
}

/// Group products by category name; products without one count under
/// `uncategorized`.
fn count_by_category<'a>(
    names: impl IntoIterator<Item = Option<&'a str>>,
    uncategorized: &str,
) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for name in names {
        let name = name.unwrap_or(uncategorized);
        match counts.iter_mut().find(|c| c.name == name) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

#[derive(Debug)]
pub struct DashboardScreen {
    ctx: AppContext,
    pub loading: bool,
    pub stats: DashboardStats,
}

impl DashboardScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            loading: false,
            stats: DashboardStats::default(),
        }
    }

    /// Refresh the statistics. Failures are logged and leave an empty
    /// dashboard; no banner is shown.
    pub async fn load(&mut self) {
        self.loading = true;
        self.stats = match self.fetch(self.ctx.locale()).await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::error!(error = %err, "failed to load dashboard");
                DashboardStats::default()
            }
        };
        self.loading = false;
    }

    async fn fetch(&self, locale: Locale) -> ClientResult<DashboardStats> {
        let data = self.ctx.data();

        let products: Vec<ProductCategory> = fetch_all(
            data,
            &Select::from(Table::Products).columns("id, categories(name)"),
        )
        .await?;

        let inventory: Vec<InventoryRecord> = fetch_all(data, &Select::from(Table::Inventory)).await?;
        let low_stock_count = count(data, Table::LowStockAlertView).await?;

        let recent_transactions: Vec<Transaction> = fetch_all(
            data,
            &Select::from(Table::Transactions)
                .columns("id, product_id, products(name), type, quantity, created_at")
                .order_by("created_at", false)
                .limit(RECENT_TRANSACTIONS),
        )
        .await?;

        Ok(DashboardStats {
            total_products: products.len(),
            total_quantity: inventory.iter().map(|r| u64::from(r.quantity)).sum(),
            low_stock_count,
            category_counts: count_by_category(
                products
                    .iter()
                    .map(|p| p.categories.as_ref().map(|c| c.name.as_str())),
                locale.text(Msg::Uncategorized),
            ),
            recent_transactions,
        })
    }
}
