use stockdesk_core::ProductId;
use stockdesk_infra::{ClientResult, Filter, Select, Table, fetch_all};
use stockdesk_products::Product;

use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{ScreenError, ScreenStatus};

/// Product list with category and supplier names.
#[derive(Debug)]
pub struct ProductsScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub products: Vec<Product>,
    pub search: String,
}

impl ProductsScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            products: Vec::new(),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let query = Select::from(Table::Products)
            .columns("*, categories(id, name), suppliers(id, name)")
            .order_by("name", true);
        let result = fetch_all(self.ctx.data(), &query)
            .await
            .map_err(ScreenError::remote(Msg::LoadProductsFailed));
        if let Some(products) = self.status.finish(locale, result) {
            self.products = products;
        }
    }

    /// Products matching the search box over name, SKU, category and supplier.
    pub fn visible(&self) -> Vec<&Product> {
        let needle = self.search.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches_search(&needle))
            .collect()
    }

    pub fn confirm_delete(&self) -> &'static str {
        self.ctx.locale().text(Msg::ConfirmDeleteProduct)
    }

    /// Delete the product's inventory row, then the product, then reload.
    pub async fn delete(&mut self, id: ProductId) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self
            .remove(id)
            .await
            .map_err(ScreenError::remote(Msg::DeleteProductFailed));
        if self.status.finish(locale, result).is_some() {
            tracing::info!(product_id = %id, "product deleted");
            self.load().await;
        }
    }

    async fn remove(&self, id: ProductId) -> ClientResult<()> {
        let data = self.ctx.data();
        data.delete(Table::Inventory, &[Filter::eq("product_id", id)])
            .await?;
        data.delete(Table::Products, &[Filter::eq("id", id)]).await?;
        Ok(())
    }
}
