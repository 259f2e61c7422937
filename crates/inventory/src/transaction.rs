//! Stock transaction history (append-only).

use core::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, Entity, ProductId, TransactionId, contains_ci, non_blank};

use crate::stock::{AdjustmentDirection, Quantity, StockAdjustment};

/// Days of history shown when the transaction list first opens.
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Direction of a recorded stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
        }
    }
}

impl From<AdjustmentDirection> for TransactionType {
    fn from(value: AdjustmentDirection) -> Self {
        match value {
            AdjustmentDirection::Add => TransactionType::In,
            AdjustmentDirection::Subtract => TransactionType::Out,
        }
    }
}

/// Embedded `products(name)` relation on a transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductName {
    pub name: String,
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub product_id: ProductId,
    #[serde(default, rename = "products", skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductName>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: Quantity,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }

    /// Search over product name, reference number and notes.
    /// `needle` must already be lowercased; an empty needle matches every row.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        [
            self.product_name(),
            self.reference_number.as_deref(),
            self.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| contains_ci(field, needle))
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A transaction to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub product_id: ProductId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: Quantity,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl TransactionDraft {
    /// History entry describing a manual stock adjustment.
    pub fn for_adjustment(adjustment: &StockAdjustment, notes: Option<&str>) -> Self {
        Self {
            product_id: adjustment.product_id,
            kind: adjustment.direction.into(),
            quantity: adjustment.amount.get(),
            reference_number: None,
            notes: non_blank(notes),
        }
    }
}

/// Type filter on the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionTypeFilter {
    #[default]
    All,
    In,
    Out,
}

impl TransactionTypeFilter {
    /// The type to match on, or `None` for no restriction.
    pub fn kind(&self) -> Option<TransactionType> {
        match self {
            TransactionTypeFilter::All => None,
            TransactionTypeFilter::In => Some(TransactionType::In),
            TransactionTypeFilter::Out => Some(TransactionType::Out),
        }
    }
}

impl FromStr for TransactionTypeFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TransactionTypeFilter::All),
            "in" => Ok(TransactionTypeFilter::In),
            "out" => Ok(TransactionTypeFilter::Out),
            other => Err(DomainError::validation(format!(
                "unknown transaction type filter '{other}'"
            ))),
        }
    }
}

/// Inclusive calendar-day range; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// The last `days` days up to and including `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start: Some(today - Duration::days(days)),
            end: Some(today),
        }
    }

    /// Start of the first day (`00:00:00`).
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// End of the last day (`23:59:59`).
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.lower_bound().is_none_or(|lo| at >= lo) && self.upper_bound().is_none_or(|hi| at <= hi)
    }
}

/// Server-side part of the transaction list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionQuery {
    pub kind: TransactionTypeFilter,
    pub range: DateRange,
}

impl TransactionQuery {
    /// Initial query: every type, the last thirty days through `today`.
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            kind: TransactionTypeFilter::All,
            range: DateRange::last_days(today, DEFAULT_HISTORY_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::AdjustmentAmount;
    use chrono::TimeZone;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deserializes_joined_row() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 1,
            "product_id": 4,
            "products": { "name": "Green Tea" },
            "type": "out",
            "quantity": 2,
            "reference_number": "SO-17",
            "notes": null,
            "created_at": "2026-10-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(tx.kind, TransactionType::Out);
        assert_eq!(tx.product_name(), Some("Green Tea"));
        assert!(tx.matches_search("so-1"));
        assert!(tx.matches_search("green"));
        assert!(!tx.matches_search("coffee"));
        assert!(tx.matches_search(""));
    }

    #[test]
    fn date_range_is_inclusive_of_whole_days() {
        let range = DateRange {
            start: Some(date(2026, 10, 1)),
            end: Some(date(2026, 10, 16)),
        };
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap()));
        assert!(DateRange::default().contains(Utc::now()));
    }

    #[test]
    fn initial_query_covers_thirty_days() {
        let q = TransactionQuery::initial(date(2026, 10, 16));
        assert_eq!(q.kind, TransactionTypeFilter::All);
        assert_eq!(q.range.start, Some(date(2026, 9, 16)));
        assert_eq!(q.range.end, Some(date(2026, 10, 16)));
    }

    #[test]
    fn adjustment_draft_maps_direction_to_type() {
        let adj = StockAdjustment::new(
            ProductId::new(3),
            AdjustmentAmount::new(4).unwrap(),
            AdjustmentDirection::Subtract,
        );
        let draft = TransactionDraft::for_adjustment(&adj, Some(" "));
        assert_eq!(draft.kind, TransactionType::Out);
        assert_eq!(draft.quantity, 4);
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn type_filter_parses() {
        assert_eq!("in".parse::<TransactionTypeFilter>().unwrap().kind(), Some(TransactionType::In));
        assert_eq!("all".parse::<TransactionTypeFilter>().unwrap().kind(), None);
        assert!("both".parse::<TransactionTypeFilter>().is_err());
    }
}
