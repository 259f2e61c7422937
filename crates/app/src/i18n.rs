//! User-facing text in English and Japanese.

use core::str::FromStr;

use stockdesk_infra::ConfigError;
use stockdesk_inventory::{StockStatus, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "ja" | "ja-jp" => Ok(Locale::Ja),
            other => Err(ConfigError::invalid(
                crate::config::LOCALE_VAR,
                format!("unsupported locale '{other}'"),
            )),
        }
    }
}

/// Message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Msg {
    // Banner prefixes, followed by ": <reason>".
    LoadProductsFailed,
    DeleteProductFailed,
    LoadFormFailed,
    SaveFailed,
    LoadInventoryFailed,
    AdjustFailed,
    /// The adjustment was applied but its transaction row was not.
    HistoryNotRecorded,
    LoadCategoriesFailed,
    DeleteCategoryFailed,
    SaveCategoryFailed,
    LoadSuppliersFailed,
    DeleteSupplierFailed,
    SaveSupplierFailed,
    LoadTransactionsFailed,
    LoginFailed,
    RegisterFailed,

    // Notices.
    ProductSaved,
    InventorySaved,
    CategoryCreated,
    CategoryUpdated,
    SupplierCreated,
    SupplierUpdated,
    RegisterComplete,
    PasswordMismatch,

    // Delete confirmations.
    ConfirmDeleteProduct,
    ConfirmDeleteCategory,
    ConfirmDeleteSupplier,

    // Labels.
    AppTitle,
    Loading,
    Uncategorized,
    StatusOutOfStock,
    StatusLow,
    StatusNormal,
    TransactionIn,
    TransactionOut,
    NavDashboard,
    NavProducts,
    NavInventory,
    NavCategories,
    NavSuppliers,
    NavTransactions,
    SignOut,
}

impl Locale {
    pub fn text(self, msg: Msg) -> &'static str {
        match self {
            Locale::En => en(msg),
            Locale::Ja => ja(msg),
        }
    }

    pub fn stock_status(self, status: StockStatus) -> &'static str {
        self.text(match status {
            StockStatus::OutOfStock => Msg::StatusOutOfStock,
            StockStatus::LowStock => Msg::StatusLow,
            StockStatus::Normal => Msg::StatusNormal,
        })
    }

    pub fn transaction_type(self, kind: TransactionType) -> &'static str {
        self.text(match kind {
            TransactionType::In => Msg::TransactionIn,
            TransactionType::Out => Msg::TransactionOut,
        })
    }
}

fn en(msg: Msg) -> &'static str {
    match msg {
        Msg::LoadProductsFailed => "Failed to load products",
        Msg::DeleteProductFailed => "Failed to delete product",
        Msg::LoadFormFailed => "Failed to load data",
        Msg::SaveFailed => "Failed to save data",
        Msg::LoadInventoryFailed => "Failed to load inventory",
        Msg::AdjustFailed => "Failed to adjust stock",
        Msg::HistoryNotRecorded => "Stock adjusted but history not recorded",
        Msg::LoadCategoriesFailed => "Failed to load categories",
        Msg::DeleteCategoryFailed => "Failed to delete category",
        Msg::SaveCategoryFailed => "Failed to save category",
        Msg::LoadSuppliersFailed => "Failed to load suppliers",
        Msg::DeleteSupplierFailed => "Failed to delete supplier",
        Msg::SaveSupplierFailed => "Failed to save supplier",
        Msg::LoadTransactionsFailed => "Failed to load transactions",
        Msg::LoginFailed => "Sign-in failed",
        Msg::RegisterFailed => "Registration failed",

        Msg::ProductSaved => "Product saved",
        Msg::InventorySaved => "Inventory saved",
        Msg::CategoryCreated => "Category created",
        Msg::CategoryUpdated => "Category updated",
        Msg::SupplierCreated => "Supplier registered",
        Msg::SupplierUpdated => "Supplier updated",
        Msg::RegisterComplete => {
            "Registration complete. Check your email to activate your account."
        }
        Msg::PasswordMismatch => "Passwords do not match",

        Msg::ConfirmDeleteProduct => "Delete this product?",
        Msg::ConfirmDeleteCategory => {
            "Delete this category?\nProducts in it will no longer have a category."
        }
        Msg::ConfirmDeleteSupplier => {
            "Delete this supplier?\nProducts from it will no longer have a supplier."
        }

        Msg::AppTitle => "Inventory Management",
        Msg::Loading => "Loading...",
        Msg::Uncategorized => "Uncategorized",
        Msg::StatusOutOfStock => "Out of stock",
        Msg::StatusLow => "Low",
        Msg::StatusNormal => "Normal",
        Msg::TransactionIn => "In",
        Msg::TransactionOut => "Out",
        Msg::NavDashboard => "Dashboard",
        Msg::NavProducts => "Products",
        Msg::NavInventory => "Inventory",
        Msg::NavCategories => "Categories",
        Msg::NavSuppliers => "Suppliers",
        Msg::NavTransactions => "Transactions",
        Msg::SignOut => "Sign out",
    }
}

fn ja(msg: Msg) -> &'static str {
    match msg {
        Msg::LoadProductsFailed => "商品データの取得に失敗しました",
        Msg::DeleteProductFailed => "商品の削除に失敗しました",
        Msg::LoadFormFailed => "データの取得に失敗しました",
        Msg::SaveFailed => "データの保存に失敗しました",
        Msg::LoadInventoryFailed => "在庫データの取得に失敗しました",
        Msg::AdjustFailed => "在庫調整に失敗しました",
        Msg::HistoryNotRecorded => "在庫は調整されましたが履歴を記録できませんでした",
        Msg::LoadCategoriesFailed => "カテゴリーデータの取得に失敗しました",
        Msg::DeleteCategoryFailed => "カテゴリーの削除に失敗しました",
        Msg::SaveCategoryFailed => "カテゴリーの保存に失敗しました",
        Msg::LoadSuppliersFailed => "仕入先データの取得に失敗しました",
        Msg::DeleteSupplierFailed => "仕入先の削除に失敗しました",
        Msg::SaveSupplierFailed => "仕入先情報の保存に失敗しました",
        Msg::LoadTransactionsFailed => "取引履歴の取得に失敗しました",
        Msg::LoginFailed => "ログインに失敗しました",
        Msg::RegisterFailed => "登録に失敗しました",

        Msg::ProductSaved => "商品データを保存しました",
        Msg::InventorySaved => "在庫データを保存しました",
        Msg::CategoryCreated => "カテゴリーを作成しました",
        Msg::CategoryUpdated => "カテゴリーを更新しました",
        Msg::SupplierCreated => "仕入先を登録しました",
        Msg::SupplierUpdated => "仕入先情報を更新しました",
        Msg::RegisterComplete => {
            "登録が完了しました。メールを確認してアカウントを有効化してください。"
        }
        Msg::PasswordMismatch => "パスワードが一致しません",

        Msg::ConfirmDeleteProduct => "この商品を削除してもよろしいですか？",
        Msg::ConfirmDeleteCategory => {
            "このカテゴリーを削除してもよろしいですか？\n※関連する商品のカテゴリー情報も削除されます。"
        }
        Msg::ConfirmDeleteSupplier => {
            "この仕入先を削除してもよろしいですか？\n※関連する商品の仕入先情報も削除されます。"
        }

        Msg::AppTitle => "在庫管理システム",
        Msg::Loading => "データを読み込み中...",
        Msg::Uncategorized => "未分類",
        Msg::StatusOutOfStock => "在庫切れ",
        Msg::StatusLow => "在庫低",
        Msg::StatusNormal => "正常",
        Msg::TransactionIn => "入庫",
        Msg::TransactionOut => "出庫",
        Msg::NavDashboard => "ダッシュボード",
        Msg::NavProducts => "商品",
        Msg::NavInventory => "在庫",
        Msg::NavCategories => "カテゴリー",
        Msg::NavSuppliers => "仕入先",
        Msg::NavTransactions => "取引履歴",
        Msg::SignOut => "ログアウト",
    }
}
