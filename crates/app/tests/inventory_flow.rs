//! End-to-end screen flows against the in-memory store and auth service.

use std::time::Duration;

use serde_json::json;

use stockdesk_app::screens::{
    CategoriesScreen, DashboardScreen, FormMode, InventoryScreen, LoginScreen, ProductForm,
};
use stockdesk_app::{AppConfig, AppContext, Navigation, Route};
use stockdesk_core::{CategoryId, ProductId};
use stockdesk_infra::{DataClient, InMemoryAuth, InMemoryDataStore, Table};
use stockdesk_inventory::{AdjustmentDirection, StockStatus};

const EMAIL: &str = "clerk@example.com";
const PASSWORD: &str = "secret1";

async fn signed_in(config: AppConfig) -> (AppContext, std::sync::Arc<InMemoryDataStore>) {
    let config = AppConfig {
        redirect_delay: Duration::ZERO,
        ..config
    };
    let (ctx, store, _auth) =
        AppContext::in_memory(config, InMemoryAuth::default().with_account(EMAIL, PASSWORD));
    ctx.start().await;
    assert_eq!(ctx.navigate(Route::Products).await, Navigation::Redirect(Route::Login));

    let mut login = LoginScreen::new(ctx.clone());
    login.email = EMAIL.into();
    login.password = PASSWORD.into();
    assert_eq!(login.submit().await, Some(Route::Dashboard));
    assert_eq!(ctx.navigate(Route::Products).await, Navigation::Render(Route::Products));

    (ctx, store)
}

/// Create a product through the form with the given stock figures.
async fn create_product(ctx: &AppContext, name: &str, category: Option<i64>, quantity: u32, min: u32) {
    let mut form = ProductForm::new(ctx.clone(), FormMode::Create);
    form.load().await;
    form.input.name = name.into();
    form.input.category_id = category.map(CategoryId::new);
    form.input.purchase_price = "100".into();
    form.input.selling_price = "150".into();
    form.input.quantity = quantity.to_string();
    form.input.min_stock_level = min.to_string();
    let redirect = form.submit().await.expect("product saved");
    assert_eq!(redirect.wait().await, Route::Products);
}

#[tokio::test]
async fn stock_adjustments_follow_the_engine() {
    let (ctx, _store) = signed_in(AppConfig::default()).await;
    create_product(&ctx, "Green Tea", None, 10, 5).await;
    create_product(&ctx, "Rice Cake", None, 3, 5).await;
    create_product(&ctx, "Soy Sauce", None, 5, 5).await;

    let mut inventory = InventoryScreen::new(ctx.clone());
    inventory.load().await;
    let status_of = |screen: &InventoryScreen, id: i64| {
        screen
            .rows
            .iter()
            .find(|r| r.product_id == ProductId::new(id))
            .map(|r| (r.quantity, r.status()))
    };
    assert_eq!(status_of(&inventory, 3), Some((5, StockStatus::LowStock)));

    inventory.open_adjustment(ProductId::new(1), AdjustmentDirection::Add);
    inventory.set_amount("5");
    inventory.submit_adjustment().await;
    assert_eq!(status_of(&inventory, 1), Some((15, StockStatus::Normal)));

    inventory.open_adjustment(ProductId::new(2), AdjustmentDirection::Subtract);
    inventory.set_amount("10");
    inventory.submit_adjustment().await;
    assert_eq!(status_of(&inventory, 2), Some((0, StockStatus::OutOfStock)));

    let mut dashboard = DashboardScreen::new(ctx);
    dashboard.load().await;
    assert_eq!(dashboard.stats.total_quantity, 20);
    assert_eq!(dashboard.stats.low_stock_count, 2);
    assert!(dashboard.stats.recent_transactions.is_empty());
}

#[tokio::test]
async fn adjustments_are_recorded_when_enabled() {
    let (ctx, store) = signed_in(AppConfig::default().recording_adjustments()).await;
    create_product(&ctx, "Green Tea", None, 10, 5).await;

    let mut inventory = InventoryScreen::new(ctx.clone());
    inventory.load().await;
    inventory.open_adjustment(ProductId::new(1), AdjustmentDirection::Add);
    inventory.set_amount("5");
    assert_eq!(inventory.submit_adjustment().await, Some(15));

    let mut dashboard = DashboardScreen::new(ctx);
    dashboard.load().await;
    let recent = &dashboard.stats.recent_transactions;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].quantity, 5);
    assert_eq!(recent[0].product_name(), Some("Green Tea"));
    assert_eq!(store.snapshot(Table::Transactions).len(), 1);
}

#[tokio::test]
async fn deleting_a_category_uncategorizes_its_products() {
    let (ctx, store) = signed_in(AppConfig::default()).await;
    store
        .insert(Table::Categories, json!({ "name": "Beverages" }))
        .await
        .unwrap();
    create_product(&ctx, "Green Tea", Some(1), 1, 0).await;
    create_product(&ctx, "Black Tea", Some(1), 1, 0).await;

    let mut categories = CategoriesScreen::new(ctx.clone());
    categories.load().await;
    categories.delete(CategoryId::new(1)).await;
    assert_eq!(categories.status.error, None);
    assert!(categories.categories.is_empty());

    let products = store.snapshot(Table::Products);
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p["category_id"].is_null()));

    let mut dashboard = DashboardScreen::new(ctx);
    dashboard.load().await;
    assert_eq!(dashboard.stats.category_counts.len(), 1);
    assert_eq!(dashboard.stats.category_counts[0].name, "Uncategorized");
    assert_eq!(dashboard.stats.category_counts[0].count, 2);
}

#[tokio::test]
async fn signing_out_closes_protected_screens() {
    let (ctx, _store) = signed_in(AppConfig::default()).await;
    ctx.sign_out().await.unwrap();
    assert_eq!(ctx.navigate(Route::Inventory).await, Navigation::Redirect(Route::Login));
    assert_eq!(ctx.navigate(Route::Root).await, Navigation::Redirect(Route::Login));
    assert_eq!(ctx.navigate(Route::Register).await, Navigation::Render(Route::Register));
}
