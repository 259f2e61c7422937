use stockdesk_core::{CategoryId, ProductId, SupplierId};
use stockdesk_infra::{
    ClientError, ClientResult, DataClient, Select, Table, fetch_all, fetch_one, fetch_optional,
    insert_record, update_by_id,
};
use stockdesk_inventory::{DEFAULT_MIN_STOCK_LEVEL, InventoryLevel, InventoryRecord, StockFields};
use stockdesk_parties::Supplier;
use stockdesk_products::{Category, Product, ProductDraft, parse_price};

use super::FormMode;
use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{Redirect, ScreenError, ScreenStatus};
use crate::routes::Route;

/// Raw form input; prices and stock figures stay text until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub barcode: String,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub purchase_price: String,
    pub selling_price: String,
    pub image_url: String,
    pub quantity: String,
    pub min_stock_level: String,
    pub location: String,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            sku: String::new(),
            barcode: String::new(),
            category_id: None,
            supplier_id: None,
            purchase_price: String::new(),
            selling_price: String::new(),
            image_url: String::new(),
            quantity: "0".to_string(),
            min_stock_level: DEFAULT_MIN_STOCK_LEVEL.to_string(),
            location: String::new(),
        }
    }
}

impl ProductInput {
    fn from_product(product: &Product, level: &InventoryLevel) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            sku: product.sku.clone().unwrap_or_default(),
            barcode: product.barcode.clone().unwrap_or_default(),
            category_id: product.category_id,
            supplier_id: product.supplier_id,
            purchase_price: product.purchase_price.to_string(),
            selling_price: product.selling_price.to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            quantity: level.quantity.to_string(),
            min_stock_level: level.min_stock_level.to_string(),
            location: level.location.clone().unwrap_or_default(),
        }
    }

    fn draft(&self) -> Result<ProductDraft, ScreenError> {
        let draft = ProductDraft {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            sku: Some(self.sku.clone()),
            barcode: Some(self.barcode.clone()),
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            purchase_price: parse_price("purchase price", &self.purchase_price)?,
            selling_price: parse_price("selling price", &self.selling_price)?,
            image_url: Some(self.image_url.clone()),
        };
        Ok(draft.validated()?)
    }

    fn stock(&self) -> Result<StockFields, ScreenError> {
        Ok(StockFields::from_form(
            &self.quantity,
            &self.min_stock_level,
            &self.location,
        )?)
    }
}

/// Create or edit a product together with its stock row.
#[derive(Debug)]
pub struct ProductForm {
    ctx: AppContext,
    pub mode: FormMode<ProductId>,
    pub status: ScreenStatus,
    pub input: ProductInput,
    pub categories: Vec<Category>,
    pub suppliers: Vec<Supplier>,
}

impl ProductForm {
    pub fn new(ctx: AppContext, mode: FormMode<ProductId>) -> Self {
        Self {
            ctx,
            mode,
            status: ScreenStatus::default(),
            input: ProductInput::default(),
            categories: Vec::new(),
            suppliers: Vec::new(),
        }
    }

    /// Load the category and supplier options and, when editing, the product
    /// and its stock row.
    pub async fn load(&mut self) {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self
            .fetch()
            .await
            .map_err(ScreenError::remote(Msg::LoadFormFailed));
        if let Some((categories, suppliers, input)) = self.status.finish(locale, result) {
            self.categories = categories;
            self.suppliers = suppliers;
            if let Some(input) = input {
                self.input = input;
            }
        }
    }

    async fn fetch(&self) -> ClientResult<(Vec<Category>, Vec<Supplier>, Option<ProductInput>)> {
        let data = self.ctx.data();
        let categories = fetch_all(data, &Select::from(Table::Categories).order_by("name", true)).await?;
        let suppliers = fetch_all(data, &Select::from(Table::Suppliers).order_by("name", true)).await?;

        let input = match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => {
                let product: Product = fetch_one(data, &Select::from(Table::Products).eq("id", id)).await?;
                let level = load_level(data, id).await?;
                Some(ProductInput::from_product(&product, &level))
            }
        };
        Ok((categories, suppliers, input))
    }

    /// Validate, write the product, then upsert its stock row. On success
    /// returns the delayed redirect back to the list.
    pub async fn submit(&mut self) -> Option<Redirect> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self.save().await;
        let id = self.status.finish(locale, result)?;

        tracing::info!(product_id = %id, "product saved");
        self.status.succeed(locale, Msg::ProductSaved);
        Some(Redirect::after(Route::Products, self.ctx.config().redirect_delay))
    }

    async fn save(&self) -> Result<ProductId, ScreenError> {
        // Both parts are validated before any write.
        let draft = self.input.draft()?;
        let stock = self.input.stock()?;

        let data = self.ctx.data();
        let write = async {
            let id = match self.mode {
                FormMode::Edit(id) => {
                    update_by_id(data, Table::Products, id, &draft).await?;
                    id
                }
                FormMode::Create => {
                    let product: Product = insert_record(data, Table::Products, &draft).await?;
                    product.id
                }
            };
            let level = stock.for_product(id);
            data.upsert(Table::Inventory, serde_json::to_value(&level)?, "product_id")
                .await?;
            Ok::<_, ClientError>(id)
        };
        write.await.map_err(ScreenError::remote(Msg::SaveFailed))
    }
}

/// The product's stock row, or the defaults when it has none yet.
pub(crate) async fn load_level(data: &dyn DataClient, id: ProductId) -> ClientResult<InventoryLevel> {
    let record: Option<InventoryRecord> =
        fetch_optional(data, &Select::from(Table::Inventory).eq("product_id", id)).await?;
    Ok(record
        .map(|r| r.level())
        .unwrap_or_else(|| InventoryLevel::defaults(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::screens::testing;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[tokio::test]
    async fn create_writes_product_and_stock() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;

        let mut form = ProductForm::new(ctx, FormMode::Create);
        form.load().await;
        let names: Vec<&str> = form.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Beverages", "Snacks"]);
        assert_eq!(form.suppliers.len(), 1);
        assert_eq!(form.input.quantity, "0");
        assert_eq!(form.input.min_stock_level, "5");

        form.input.name = "  Matcha ".into();
        form.input.category_id = Some(CategoryId::new(1));
        form.input.purchase_price = "12.5".into();
        form.input.selling_price = "20".into();
        form.input.quantity = "7".into();
        form.input.location = "Shelf A".into();

        let redirect = form.submit().await.unwrap();
        assert_eq!(redirect.to, Route::Products);
        assert_eq!(form.status.notice.as_deref(), Some("Product saved"));

        let product = store
            .snapshot(Table::Products)
            .into_iter()
            .find(|p| p["name"] == "Matcha")
            .unwrap();
        let stock = store
            .snapshot(Table::Inventory)
            .into_iter()
            .find(|r| r["product_id"] == product["id"])
            .unwrap();
        assert_eq!(stock["quantity"], 7);
        assert_eq!(stock["location"], "Shelf A");
    }

    #[tokio::test]
    async fn edit_loads_defaults_for_missing_stock_and_upserts() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;

        let mut form = ProductForm::new(ctx, FormMode::Edit(ProductId::new(3)));
        form.load().await;
        assert_eq!(form.input.name, "Water");
        assert_eq!(form.input.quantity, "0");
        assert_eq!(form.input.min_stock_level, "5");
        assert_eq!(
            Decimal::from_str(&form.input.selling_price).unwrap(),
            Decimal::from_str("2.5").unwrap()
        );

        form.input.quantity = "24".into();
        form.input.sku = "WT-1".into();
        form.submit().await.unwrap();

        let rows = store.snapshot(Table::Inventory);
        let water: Vec<_> = rows.iter().filter(|r| r["product_id"] == 3).collect();
        assert_eq!(water.len(), 1);
        assert_eq!(water[0]["quantity"], 24);

        // Second save updates the same row.
        form.input.quantity = "30".into();
        form.submit().await.unwrap();
        let rows = store.snapshot(Table::Inventory);
        let water: Vec<_> = rows.iter().filter(|r| r["product_id"] == 3).collect();
        assert_eq!(water.len(), 1);
        assert_eq!(water[0]["quantity"], 30);
    }

    #[tokio::test]
    async fn validation_errors_block_the_write() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;
        let mut form = ProductForm::new(ctx, FormMode::Create);

        form.input.name = "Matcha".into();
        form.input.purchase_price = "abc".into();
        form.input.selling_price = "1".into();
        assert_eq!(form.submit().await, None);
        assert_eq!(form.status.error.as_deref(), Some("purchase price must be a number"));

        form.input.purchase_price = "1".into();
        form.input.quantity = "-2".into();
        assert_eq!(form.submit().await, None);
        assert_eq!(
            form.status.error.as_deref(),
            Some("quantity must be a non-negative whole number")
        );
        assert_eq!(store.snapshot(Table::Products).len(), 3);
        let stock = store.snapshot(Table::Inventory);
        assert_eq!(stock.len(), 2);
        assert!(stock.iter().any(|r| r["product_id"] == 1 && r["quantity"] == 10));
    }

    #[tokio::test]
    async fn store_errors_keep_the_user_on_the_form() {
        let (ctx, store) = testing::context(AppConfig::default());
        testing::seed(&store).await;
        let mut form = ProductForm::new(ctx, FormMode::Edit(ProductId::new(1)));
        form.load().await;
        store.fail_on(Table::Products, "new row violates row-level security policy");

        assert_eq!(form.submit().await, None);
        assert_eq!(
            form.status.error.as_deref(),
            Some("Failed to save data: new row violates row-level security policy")
        );
        assert_eq!(form.status.notice, None);
    }
}
