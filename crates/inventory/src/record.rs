//! Inventory rows, the stock-level draft written by forms, and the joined
//! read-only rows served by the store's views.

use serde::{Deserialize, Deserializer, Serialize};

use stockdesk_core::{DomainError, DomainResult, Entity, InventoryId, ProductId, contains_ci, non_blank};

use crate::status::{StockFilter, StockStatus, classify};
use crate::stock::Quantity;

/// Default minimum stock level offered for a product with no inventory row.
pub const DEFAULT_MIN_STOCK_LEVEL: Quantity = 5;

/// Null or missing quantities read from the store count as zero.
fn quantity_or_zero<'de, D>(deserializer: D) -> Result<Quantity, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Quantity>::deserialize(deserializer)?.unwrap_or(0))
}

/// A stored inventory row (one per product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub min_stock_level: Quantity,
    #[serde(default)]
    pub location: Option<String>,
}

impl InventoryRecord {
    pub fn status(&self) -> StockStatus {
        classify(self.quantity, self.min_stock_level)
    }

    pub fn level(&self) -> InventoryLevel {
        InventoryLevel {
            product_id: self.product_id,
            quantity: self.quantity,
            min_stock_level: self.min_stock_level,
            location: self.location.clone(),
        }
    }
}

impl Entity for InventoryRecord {
    type Id = InventoryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Stock data for a product as written by the product and inventory forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub min_stock_level: Quantity,
    pub location: Option<String>,
}

impl InventoryLevel {
    /// Values shown for a product that has never had stock assigned.
    pub fn defaults(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: 0,
            min_stock_level: DEFAULT_MIN_STOCK_LEVEL,
            location: None,
        }
    }

    /// Build from raw form input; see [`StockFields::from_form`].
    pub fn from_form(
        product_id: ProductId,
        quantity: &str,
        min_stock_level: &str,
        location: &str,
    ) -> DomainResult<Self> {
        Ok(StockFields::from_form(quantity, min_stock_level, location)?.for_product(product_id))
    }

    pub fn status(&self) -> StockStatus {
        classify(self.quantity, self.min_stock_level)
    }
}

/// Validated stock figures not yet tied to a product, for forms that learn
/// the product id only after saving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockFields {
    pub quantity: Quantity,
    pub min_stock_level: Quantity,
    pub location: Option<String>,
}

impl StockFields {
    /// Quantity and minimum level must be non-negative whole numbers; a
    /// blank location is stored as null.
    pub fn from_form(quantity: &str, min_stock_level: &str, location: &str) -> DomainResult<Self> {
        Ok(Self {
            quantity: parse_quantity("quantity", quantity)?,
            min_stock_level: parse_quantity("minimum stock level", min_stock_level)?,
            location: non_blank(Some(location)),
        })
    }

    pub fn for_product(self, product_id: ProductId) -> InventoryLevel {
        InventoryLevel {
            product_id,
            quantity: self.quantity,
            min_stock_level: self.min_stock_level,
            location: self.location,
        }
    }
}

fn parse_quantity(field: &str, raw: &str) -> DomainResult<Quantity> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    trimmed
        .parse::<Quantity>()
        .map_err(|_| DomainError::validation(format!("{field} must be a non-negative whole number")))
}

/// Row of `product_inventory_view`: product joined with its stock, category
/// and supplier names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryViewRow {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub min_stock_level: Quantity,
    #[serde(default)]
    pub location: Option<String>,
}

impl InventoryViewRow {
    pub fn status(&self) -> StockStatus {
        classify(self.quantity, self.min_stock_level)
    }

    /// Stock can only be issued from a row that has some.
    pub fn can_subtract(&self) -> bool {
        self.quantity > 0
    }

    /// Search over product name, SKU, category name and location.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.product_name, needle)
            || [&self.sku, &self.category_name, &self.location]
                .into_iter()
                .flatten()
                .any(|field| contains_ci(field, needle))
    }
}

/// Search text + status filter applied to the inventory list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryListFilter {
    pub search: String,
    pub status: StockFilter,
}

impl InventoryListFilter {
    pub fn new(search: impl Into<String>, status: StockFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn matches(&self, row: &InventoryViewRow) -> bool {
        let needle = self.search.to_lowercase();
        row.matches_search(&needle) && self.status.matches(row.quantity, row.min_stock_level)
    }

    pub fn apply<'a>(&self, rows: &'a [InventoryViewRow]) -> Vec<&'a InventoryViewRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// Row of `low_stock_alert_view`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub min_stock_level: Quantity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(name: &str, sku: Option<&str>, quantity: Quantity, min: Quantity) -> InventoryViewRow {
        InventoryViewRow {
            product_id: ProductId::new(1),
            product_name: name.to_string(),
            sku: sku.map(str::to_string),
            category_name: Some("Beverages".to_string()),
            supplier_name: None,
            quantity,
            min_stock_level: min,
            location: Some("Shelf B2".to_string()),
        }
    }

    #[test]
    fn null_min_stock_level_reads_as_zero() {
        let rec: InventoryRecord = serde_json::from_value(json!({
            "id": 3,
            "product_id": 9,
            "quantity": 4,
            "min_stock_level": null,
            "location": null
        }))
        .unwrap();
        assert_eq!(rec.min_stock_level, 0);
        assert_eq!(rec.status(), StockStatus::Normal);
    }

    #[test]
    fn form_input_is_validated() {
        let p = ProductId::new(2);
        let level = InventoryLevel::from_form(p, "12", "5", "  ").unwrap();
        assert_eq!(level.quantity, 12);
        assert_eq!(level.location, None);

        assert!(matches!(
            InventoryLevel::from_form(p, "-1", "5", ""),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            InventoryLevel::from_form(p, "3", "", ""),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn stock_fields_validate_before_a_product_exists() {
        let fields = StockFields::from_form(" 7 ", "2", "Shelf A").unwrap();
        assert_eq!(fields.location.as_deref(), Some("Shelf A"));

        let level = fields.for_product(ProductId::new(4));
        assert_eq!(level.product_id, ProductId::new(4));
        assert_eq!((level.quantity, level.min_stock_level), (7, 2));

        assert!(matches!(
            StockFields::from_form("1.5", "5", ""),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn defaults_use_five_as_minimum() {
        let level = InventoryLevel::defaults(ProductId::new(1));
        assert_eq!(level.quantity, 0);
        assert_eq!(level.min_stock_level, 5);
    }

    #[test]
    fn search_covers_name_sku_category_and_location() {
        let r = row("Green Tea", Some("GT-100"), 3, 5);
        assert!(r.matches_search("green"));
        assert!(r.matches_search("gt-1"));
        assert!(r.matches_search("bever"));
        assert!(r.matches_search("shelf b"));
        assert!(!r.matches_search("coffee"));
    }

    #[test]
    fn list_filter_combines_search_and_status() {
        let rows = vec![
            row("Green Tea", None, 3, 5),
            row("Black Tea", None, 0, 5),
            row("Coffee", None, 40, 5),
        ];

        let low = InventoryListFilter::new("TEA", StockFilter::Low).apply(&rows);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_name, "Green Tea");

        let out = InventoryListFilter::new("", StockFilter::Out).apply(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].product_name, "Black Tea");

        assert_eq!(InventoryListFilter::default().apply(&rows).len(), 3);
    }

    #[test]
    fn empty_rows_cannot_be_issued_from() {
        assert!(!row("x", None, 0, 5).can_subtract());
        assert!(row("x", None, 1, 5).can_subtract());
    }
}
