//! Screen routes, the guard applied to protected ones and the menu.

use stockdesk_auth::Access;
use stockdesk_core::{CategoryId, ProductId, SupplierId};

use crate::i18n::Msg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Products,
    ProductNew,
    ProductEdit(ProductId),
    Inventory,
    /// Keyed by product: every product has at most one inventory row.
    InventoryEdit(ProductId),
    Categories,
    CategoryNew,
    CategoryEdit(CategoryId),
    Suppliers,
    SupplierNew,
    SupplierEdit(SupplierId),
    Transactions,
}

impl Route {
    /// Parse a path such as `/products/edit/12`. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["products"] => Route::Products,
            ["products", "new"] => Route::ProductNew,
            ["products", "edit", id] => Route::ProductEdit(id.parse().ok()?),
            ["inventory"] => Route::Inventory,
            ["inventory", "edit", id] => Route::InventoryEdit(id.parse().ok()?),
            ["categories"] => Route::Categories,
            ["categories", "new"] => Route::CategoryNew,
            ["categories", "edit", id] => Route::CategoryEdit(id.parse().ok()?),
            ["suppliers"] => Route::Suppliers,
            ["suppliers", "new"] => Route::SupplierNew,
            ["suppliers", "edit", id] => Route::SupplierEdit(id.parse().ok()?),
            ["transactions"] => Route::Transactions,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Products => "/products".to_string(),
            Route::ProductNew => "/products/new".to_string(),
            Route::ProductEdit(id) => format!("/products/edit/{id}"),
            Route::Inventory => "/inventory".to_string(),
            Route::InventoryEdit(id) => format!("/inventory/edit/{id}"),
            Route::Categories => "/categories".to_string(),
            Route::CategoryNew => "/categories/new".to_string(),
            Route::CategoryEdit(id) => format!("/categories/edit/{id}"),
            Route::Suppliers => "/suppliers".to_string(),
            Route::SupplierNew => "/suppliers/new".to_string(),
            Route::SupplierEdit(id) => format!("/suppliers/edit/{id}"),
            Route::Transactions => "/transactions".to_string(),
        }
    }

    /// Everything except the login and register screens needs a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Root | Route::Login | Route::Register)
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}

/// What to show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Session still being resolved.
    Loading,
    Redirect(Route),
}

/// Apply the session guard's decision to `route`.
///
/// `/` goes to the dashboard when signed in and to the login screen
/// otherwise; protected routes redirect to the login screen without a
/// session.
pub fn navigate(route: Route, access: Access) -> Navigation {
    match (route, access) {
        (Route::Root, Access::Loading) => Navigation::Loading,
        (Route::Root, Access::Granted) => Navigation::Redirect(Route::Dashboard),
        (Route::Root, Access::RedirectToLogin) => Navigation::Redirect(Route::Login),
        (r, _) if !r.is_protected() => Navigation::Render(r),
        (_, Access::Loading) => Navigation::Loading,
        (r, Access::Granted) => Navigation::Render(r),
        (_, Access::RedirectToLogin) => Navigation::Redirect(Route::Login),
    }
}

/// Entries of the navigation bar, in display order.
pub const MENU: [(Route, Msg); 6] = [
    (Route::Dashboard, Msg::NavDashboard),
    (Route::Products, Msg::NavProducts),
    (Route::Inventory, Msg::NavInventory),
    (Route::Categories, Msg::NavCategories),
    (Route::Suppliers, Msg::NavSuppliers),
    (Route::Transactions, Msg::NavTransactions),
];

/// The navigation bar is only shown to signed-in users.
pub fn menu(access: Access) -> &'static [(Route, Msg)] {
    match access {
        Access::Granted => &MENU,
        Access::Loading | Access::RedirectToLogin => &[],
    }
}
