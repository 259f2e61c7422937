use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockdesk_core::{
    CategoryId, DomainError, DomainResult, Entity, ProductId, SupplierId, contains_ci, non_blank,
};

/// Embedded `{ id, name }` relation returned when a product is selected
/// together with its category or supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,

    /// Present when selected with `categories(id, name)`.
    #[serde(default, rename = "categories", skip_serializing_if = "Option::is_none")]
    pub category: Option<NamedRef>,

    /// Present when selected with `suppliers(id, name)`.
    #[serde(default, rename = "suppliers", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<NamedRef>,
}

impl Product {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn supplier_name(&self) -> Option<&str> {
        self.supplier.as_ref().map(|s| s.name.as_str())
    }

    /// Gross margin per unit.
    pub fn margin(&self) -> Decimal {
        self.selling_price - self.purchase_price
    }

    /// Search over name, SKU, category name and supplier name.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || [self.sku.as_deref(), self.category_name(), self.supplier_name()]
                .into_iter()
                .flatten()
                .any(|field| contains_ci(field, needle))
    }

    /// Form values for editing this product.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            sku: self.sku.clone(),
            barcode: self.barcode.clone(),
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            image_url: self.image_url.clone(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Product form values (create or update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, purchase_price: Decimal, selling_price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: None,
            sku: None,
            barcode: None,
            category_id: None,
            supplier_id: None,
            purchase_price,
            selling_price,
            image_url: None,
        }
    }

    /// Validate and normalize for writing.
    ///
    /// - name is required
    /// - prices must be non-negative
    /// - blank optional text fields become null
    pub fn validated(&self) -> DomainResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if self.purchase_price.is_sign_negative() {
            return Err(DomainError::validation("purchase price cannot be negative"));
        }
        if self.selling_price.is_sign_negative() {
            return Err(DomainError::validation("selling price cannot be negative"));
        }

        Ok(Self {
            name: name.to_string(),
            description: non_blank(self.description.as_deref()),
            sku: non_blank(self.sku.as_deref()),
            barcode: non_blank(self.barcode.as_deref()),
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            image_url: non_blank(self.image_url.as_deref()),
        })
    }
}

/// Parse a required price field from form input.
pub fn parse_price(field: &str, raw: &str) -> DomainResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    let price = Decimal::from_str(trimmed)
        .map_err(|_| DomainError::validation(format!("{field} must be a number")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(price)
}
