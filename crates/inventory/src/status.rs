//! Stock status tiers and the list filter built on them.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockdesk_core::DomainError;

use crate::stock::Quantity;

/// Stock level relative to the product's minimum stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Normal,
}

impl StockStatus {
    /// Stable key used for styling rows (`stock-out`, `stock-low`, `stock-normal`).
    pub fn key(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "stock-out",
            StockStatus::LowStock => "stock-low",
            StockStatus::Normal => "stock-normal",
        }
    }
}

/// Classify a quantity against its minimum stock level.
///
/// - `0` is always `OutOfStock`, whatever the minimum.
/// - `1..=min_stock_level` is `LowStock` (equal to the threshold counts as low).
/// - anything above the threshold is `Normal`.
///
/// A missing minimum level is passed as `0`.
pub fn classify(quantity: Quantity, min_stock_level: Quantity) -> StockStatus {
    if quantity == 0 {
        StockStatus::OutOfStock
    } else if quantity <= min_stock_level {
        StockStatus::LowStock
    } else {
        StockStatus::Normal
    }
}

/// Inventory list filter (`all` / `low` / `out`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    #[default]
    All,
    Low,
    Out,
}

impl StockFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockFilter::All => "all",
            StockFilter::Low => "low",
            StockFilter::Out => "out",
        }
    }

    /// Whether a row passes the filter. Uses [`classify`] so the filter and
    /// the status column always agree.
    pub fn matches(&self, quantity: Quantity, min_stock_level: Quantity) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => classify(quantity, min_stock_level) == StockStatus::LowStock,
            StockFilter::Out => classify(quantity, min_stock_level) == StockStatus::OutOfStock,
        }
    }
}

impl FromStr for StockFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StockFilter::All),
            "low" => Ok(StockFilter::Low),
            "out" => Ok(StockFilter::Out),
            other => Err(DomainError::validation(format!("unknown stock filter '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_boundary_is_low_stock() {
        assert_eq!(classify(5, 5), StockStatus::LowStock);
        assert_eq!(classify(6, 5), StockStatus::Normal);
        assert_eq!(classify(0, 5), StockStatus::OutOfStock);
        assert_eq!(classify(15, 5), StockStatus::Normal);
    }

    #[test]
    fn zero_minimum_means_only_empty_is_flagged() {
        assert_eq!(classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(classify(1, 0), StockStatus::Normal);
    }

    #[test]
    fn filter_parses_and_matches() {
        assert_eq!("low".parse::<StockFilter>().unwrap(), StockFilter::Low);
        assert!("none".parse::<StockFilter>().is_err());
        assert!(StockFilter::Low.matches(3, 5));
        assert!(!StockFilter::Low.matches(0, 5));
        assert!(StockFilter::Out.matches(0, 5));
        assert!(StockFilter::All.matches(100, 5));
    }

    proptest! {
        #[test]
        fn empty_is_always_out_of_stock(m in 0u32..10_000) {
            prop_assert_eq!(classify(0, m), StockStatus::OutOfStock);
        }

        #[test]
        fn low_stock_iff_between_one_and_threshold(q in 0u32..10_000, m in 0u32..10_000) {
            prop_assert_eq!(classify(q, m) == StockStatus::LowStock, q > 0 && q <= m);
        }

        #[test]
        fn normal_iff_above_threshold(q in 0u32..10_000, m in 0u32..10_000) {
            prop_assert_eq!(classify(q, m) == StockStatus::Normal, q > m);
        }

        #[test]
        fn classify_is_deterministic(q in 0u32..10_000, m in 0u32..10_000) {
            prop_assert_eq!(classify(q, m), classify(q, m));
        }

        #[test]
        fn filters_agree_with_status(q in 0u32..10_000, m in 0u32..10_000) {
            let status = classify(q, m);
            prop_assert_eq!(StockFilter::Low.matches(q, m), status == StockStatus::LowStock);
            prop_assert_eq!(StockFilter::Out.matches(q, m), status == StockStatus::OutOfStock);
        }
    }
}
