//! Screen state models.
//!
//! Each screen owns its rows, its form input and a [`ScreenStatus`]; it is
//! built from an [`AppContext`](crate::context::AppContext) and talks to the
//! store only through it. Rendering is left to the caller.
//!
//! [`ScreenStatus`]: crate::notice::ScreenStatus

pub mod categories;
pub mod dashboard;
pub mod inventory;
pub mod inventory_form;
pub mod login;
pub mod product_form;
pub mod products;
pub mod register;
pub mod suppliers;
pub mod transactions;

pub use categories::{CategoriesScreen, CategoryForm};
pub use dashboard::{CategoryCount, DashboardScreen, DashboardStats};
pub use inventory::InventoryScreen;
pub use inventory_form::InventoryForm;
pub use login::LoginScreen;
pub use product_form::{ProductForm, ProductInput};
pub use products::ProductsScreen;
pub use register::RegisterScreen;
pub use suppliers::{SupplierForm, SuppliersScreen};
pub use transactions::TransactionsScreen;

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<I> {
    Create,
    Edit(I),
}
