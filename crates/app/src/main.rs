use anyhow::Context as _;

use stockdesk_app::screens::{DashboardScreen, LoginScreen};
use stockdesk_app::{AppConfig, AppContext, Msg, Navigation, Route};
use stockdesk_infra::ClientConfig;

const EMAIL_VAR: &str = "STOCKDESK_EMAIL";
const PASSWORD_VAR: &str = "STOCKDESK_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid application settings")?;
    stockdesk_observability::init_with(config.log_format);

    let client = ClientConfig::from_env().context("data store connection is not configured")?;
    tracing::info!(url = %client.url, locale = ?config.locale, "starting");

    let ctx = AppContext::connect(&client, config);
    ctx.start().await;

    if let (Ok(email), Ok(password)) = (std::env::var(EMAIL_VAR), std::env::var(PASSWORD_VAR)) {
        let mut login = LoginScreen::new(ctx.clone());
        login.email = email;
        login.password = password;
        if login.submit().await.is_none() {
            anyhow::bail!(login.status.error.unwrap_or_default());
        }
    }

    match ctx.navigate(Route::Root).await {
        Navigation::Redirect(Route::Dashboard) => {
            let mut dashboard = DashboardScreen::new(ctx.clone());
            dashboard.load().await;
            let stats = &dashboard.stats;
            tracing::info!(
                products = stats.total_products,
                quantity = stats.total_quantity,
                low_stock = stats.low_stock_count,
                recent = stats.recent_transactions.len(),
                "{}",
                ctx.locale().text(Msg::NavDashboard)
            );
            for entry in &stats.category_counts {
                tracing::info!(category = %entry.name, products = entry.count, "category");
            }
        }
        other => {
            tracing::warn!(
                navigation = ?other,
                "no session; set {EMAIL_VAR} and {PASSWORD_VAR} to sign in"
            );
        }
    }

    Ok(())
}
