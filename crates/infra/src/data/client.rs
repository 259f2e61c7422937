use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use stockdesk_core::ProductId;
use stockdesk_inventory::Quantity;

use super::query::{Filter, Select, Table};
use crate::error::{ClientError, ClientResult};

/// Generic access to the remote tables and views.
///
/// Rows travel as JSON objects; the typed helpers below decode them into
/// domain records. Every call is a single request/response.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Rows matching `query`, in the requested order.
    async fn select(&self, query: &Select) -> ClientResult<Vec<JsonValue>>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: Table, row: JsonValue) -> ClientResult<JsonValue>;

    /// Apply `changes` to every row matching `filters`; returns the updated rows.
    async fn update(
        &self,
        table: Table,
        changes: JsonValue,
        filters: &[Filter],
    ) -> ClientResult<Vec<JsonValue>>;

    /// Insert `row`, or update the row whose `on_conflict` column matches.
    async fn upsert(&self, table: Table, row: JsonValue, on_conflict: &str) -> ClientResult<JsonValue>;

    /// Delete every row matching `filters`; returns how many were removed.
    async fn delete(&self, table: Table, filters: &[Filter]) -> ClientResult<usize>;

    /// Add `delta` to the product's on-hand quantity, floored at zero, and
    /// return the stored result. Concurrent adjustments never overwrite each
    /// other.
    async fn adjust_quantity(&self, product_id: ProductId, delta: i64) -> ClientResult<Quantity>;
}

/// Decode every row of `query`.
pub async fn fetch_all<T>(client: &dyn DataClient, query: &Select) -> ClientResult<Vec<T>>
where
    T: DeserializeOwned,
{
    client
        .select(query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(ClientError::from))
        .collect()
}

/// Decode the first row of `query`, if any.
pub async fn fetch_optional<T>(client: &dyn DataClient, query: &Select) -> ClientResult<Option<T>>
where
    T: DeserializeOwned,
{
    let query = query.clone().limit(1);
    match client.select(&query).await?.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}

/// Decode exactly one row of `query`.
pub async fn fetch_one<T>(client: &dyn DataClient, query: &Select) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    fetch_optional(client, query).await?.ok_or(ClientError::NotFound)
}

/// Serialize a draft and insert it, decoding the stored row.
pub async fn insert_record<D, T>(client: &dyn DataClient, table: Table, draft: &D) -> ClientResult<T>
where
    D: Serialize + Sync,
    T: DeserializeOwned,
{
    let row = client.insert(table, serde_json::to_value(draft)?).await?;
    Ok(serde_json::from_value(row)?)
}

/// Serialize a draft and write it over the row with the given `id`.
pub async fn update_by_id<D>(
    client: &dyn DataClient,
    table: Table,
    id: impl Into<JsonValue>,
    draft: &D,
) -> ClientResult<()>
where
    D: Serialize + Sync,
{
    let updated = client
        .update(table, serde_json::to_value(draft)?, &[Filter::eq("id", id)])
        .await?;
    if updated.is_empty() {
        return Err(ClientError::NotFound);
    }
    Ok(())
}

/// Number of rows in `table`.
pub async fn count(client: &dyn DataClient, table: Table) -> ClientResult<usize> {
    Ok(client.select(&Select::from(table)).await?.len())
}
