use stockdesk_core::ProductId;
use stockdesk_infra::{ClientResult, Select, Table, fetch_one};
use stockdesk_inventory::InventoryLevel;
use stockdesk_products::NamedRef;

use super::product_form::load_level;
use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{Redirect, ScreenError, ScreenStatus};
use crate::routes::Route;

/// Edit the stored quantity, minimum level and location of one product.
#[derive(Debug)]
pub struct InventoryForm {
    ctx: AppContext,
    pub product_id: ProductId,
    pub product_name: String,
    pub status: ScreenStatus,
    pub quantity: String,
    pub min_stock_level: String,
    pub location: String,
}

impl InventoryForm {
    pub fn new(ctx: AppContext, product_id: ProductId) -> Self {
        let mut form = Self {
            ctx,
            product_id,
            product_name: String::new(),
            status: ScreenStatus::default(),
            quantity: String::new(),
            min_stock_level: String::new(),
            location: String::new(),
        };
        form.fill(&InventoryLevel::defaults(product_id));
        form
    }

    fn fill(&mut self, level: &InventoryLevel) {
        self.quantity = level.quantity.to_string();
        self.min_stock_level = level.min_stock_level.to_string();
        self.location = level.location.clone().unwrap_or_default();
    }

    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self
            .fetch()
            .await
            .map_err(ScreenError::remote(Msg::LoadFormFailed));
        if let Some((name, level)) = self.status.finish(locale, result) {
            self.product_name = name;
            self.fill(&level);
        }
    }

    async fn fetch(&self) -> ClientResult<(String, InventoryLevel)> {
        let data = self.ctx.data();
        let product: NamedRef = fetch_one(
            data,
            &Select::from(Table::Products)
                .columns("id, name")
                .eq("id", self.product_id),
        )
        .await?;
        let level = load_level(data, self.product_id).await?;
        Ok((product.name, level))
    }

    pub async fn submit(&mut self) -> Option<Redirect> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self.save().await;
        self.status.finish(locale, result)?;

        self.status.succeed(locale, Msg::InventorySaved);
        Some(Redirect::after(Route::Inventory, self.ctx.config().redirect_delay))
    }

    async fn save(&self) -> Result<(), ScreenError> {
        let level = InventoryLevel::from_form(
            self.product_id,
            &self.quantity,
            &self.min_stock_level,
            &self.location,
        )?;
        let row = serde_json::to_value(&level)
            .map_err(|e| ScreenError::remote(Msg::SaveFailed)(e.into()))?;
        self.ctx
            .data()
            .upsert(Table::Inventory, row, "product_id")
            .await
            .map_err(ScreenError::remote(Msg::SaveFailed))?;
        tracing::info!(product_id = %self.product_id, quantity = level.quantity, "inventory saved");
        Ok(())
    }
}
