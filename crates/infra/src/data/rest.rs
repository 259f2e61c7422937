use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use stockdesk_core::ProductId;
use stockdesk_inventory::{DEFAULT_MIN_STOCK_LEVEL, Quantity, apply_delta};

use super::client::DataClient;
use super::query::{Filter, Select, Table};
use crate::error::{ClientError, ClientResult};
use crate::rest::{RestConnection, send_json};

const RETURN_ROWS: &str = "return=representation";

/// Read-compute-write rounds tried before an adjustment gives up.
const ADJUST_ATTEMPTS: usize = 5;

/// Conditional write that moves one inventory row to its adjusted quantity.
#[derive(Debug, Clone, PartialEq)]
enum AdjustWrite {
    /// No row yet: create one at the default minimum level.
    Insert(JsonValue),
    /// Only matches while the row still holds the quantity that was read.
    Update { changes: JsonValue, filters: Vec<Filter> },
}

fn adjust_write(product_id: ProductId, current: Option<Quantity>, delta: i64) -> (Quantity, AdjustWrite) {
    let next = apply_delta(current.unwrap_or(0), delta);
    let write = match current {
        None => AdjustWrite::Insert(json!({
            "product_id": product_id,
            "quantity": next,
            "min_stock_level": DEFAULT_MIN_STOCK_LEVEL,
        })),
        Some(read) => AdjustWrite::Update {
            changes: json!({ "quantity": next }),
            filters: vec![Filter::eq("product_id", product_id), Filter::eq("quantity", read)],
        },
    };
    (next, write)
}

fn table_path(table: Table) -> String {
    format!("rest/v1/{}", table.as_str())
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

/// Table access over a PostgREST-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct RestDataClient {
    conn: RestConnection,
}

impl RestDataClient {
    pub fn new(conn: RestConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DataClient for RestDataClient {
    async fn select(&self, query: &Select) -> ClientResult<Vec<JsonValue>> {
        let req = self
            .conn
            .get(&table_path(query.table))
            .query(&query.to_query_pairs());
        let rows: Vec<JsonValue> = send_json(req).await?;
        tracing::debug!(table = %query.table, rows = rows.len(), "select");
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: JsonValue) -> ClientResult<JsonValue> {
        let req = self
            .conn
            .post(&table_path(table))
            .header("Prefer", RETURN_ROWS)
            .json(&row);
        let rows: Vec<JsonValue> = send_json(req).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ClientError::decode("insert returned no row"))
    }

    async fn update(
        &self,
        table: Table,
        changes: JsonValue,
        filters: &[Filter],
    ) -> ClientResult<Vec<JsonValue>> {
        let req = self
            .conn
            .patch(&table_path(table))
            .query(&filter_pairs(filters))
            .header("Prefer", RETURN_ROWS)
            .json(&changes);
        send_json(req).await
    }

    async fn upsert(&self, table: Table, row: JsonValue, on_conflict: &str) -> ClientResult<JsonValue> {
        let req = self
            .conn
            .post(&table_path(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", format!("resolution=merge-duplicates,{RETURN_ROWS}"))
            .json(&row);
        let rows: Vec<JsonValue> = send_json(req).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ClientError::decode("upsert returned no row"))
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> ClientResult<usize> {
        let req = self
            .conn
            .delete(&table_path(table))
            .query(&filter_pairs(filters))
            .header("Prefer", RETURN_ROWS);
        let rows: Vec<JsonValue> = send_json(req).await?;
        Ok(rows.len())
    }

    /// Optimistic read-compute-write: the update is conditioned on the
    /// quantity read, and a lost race is retried from a fresh read.
    async fn adjust_quantity(&self, product_id: ProductId, delta: i64) -> ClientResult<Quantity> {
        let read = Select::from(Table::Inventory)
            .columns("quantity")
            .eq("product_id", product_id);

        for attempt in 1..=ADJUST_ATTEMPTS {
            let rows = self.select(&read).await?;
            let current = match rows.first() {
                Some(row) => Some(
                    row.get("quantity")
                        .and_then(JsonValue::as_u64)
                        .and_then(|q| Quantity::try_from(q).ok())
                        .ok_or_else(|| ClientError::decode("inventory quantity is not a count"))?,
                ),
                None => None,
            };

            let (next, write) = adjust_write(product_id, current, delta);
            let applied = match write {
                AdjustWrite::Insert(row) => match self.insert(Table::Inventory, row).await {
                    Ok(_) => true,
                    // Another writer created the row first.
                    Err(err) if err.code() == Some("23505") => false,
                    Err(err) => return Err(err),
                },
                AdjustWrite::Update { changes, filters } => {
                    !self.update(Table::Inventory, changes, &filters).await?.is_empty()
                }
            };

            if applied {
                tracing::debug!(product_id = %product_id, delta, quantity = next, "stock adjusted");
                return Ok(next);
            }
            tracing::debug!(product_id = %product_id, attempt, "inventory changed concurrently, retrying");
        }

        Err(ClientError::remote(
            "40001",
            format!("inventory for product {product_id} kept changing; try again"),
        ))
    }
}
