use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue, json};

use stockdesk_core::ProductId;
use stockdesk_inventory::{DEFAULT_MIN_STOCK_LEVEL, Quantity, StockStatus, apply_delta, classify};

use super::client::DataClient;
use super::query::{ColumnSpec, Filter, Order, Select, Table, parse_columns};
use crate::error::{ClientError, ClientResult};

type Row = Map<String, JsonValue>;

/// Column list of each base table, in storage order.
fn columns(table: Table) -> &'static [&'static str] {
    match table {
        Table::Products => &[
            "id",
            "name",
            "description",
            "sku",
            "barcode",
            "category_id",
            "supplier_id",
            "purchase_price",
            "selling_price",
            "image_url",
            "created_at",
            "updated_at",
        ],
        Table::Categories => &["id", "name", "description", "created_at"],
        Table::Suppliers => &[
            "id",
            "name",
            "contact_person",
            "email",
            "phone",
            "address",
            "created_at",
        ],
        Table::Inventory => &["id", "product_id", "quantity", "min_stock_level", "location", "updated_at"],
        Table::Transactions => &[
            "id",
            "product_id",
            "type",
            "quantity",
            "reference_number",
            "notes",
            "created_at",
        ],
        Table::ProductInventoryView => &[
            "product_id",
            "product_name",
            "sku",
            "category_name",
            "supplier_name",
            "quantity",
            "min_stock_level",
            "location",
        ],
        Table::LowStockAlertView => &["product_id", "product_name", "quantity", "min_stock_level"],
    }
}

fn not_null(table: Table) -> &'static [&'static str] {
    match table {
        Table::Products => &["name", "purchase_price", "selling_price"],
        Table::Categories | Table::Suppliers => &["name"],
        Table::Inventory => &["product_id", "quantity"],
        Table::Transactions => &["product_id", "type", "quantity"],
        Table::ProductInventoryView | Table::LowStockAlertView => &[],
    }
}

/// `(column, referenced table)` pairs.
fn foreign_keys(table: Table) -> &'static [(&'static str, Table)] {
    match table {
        Table::Products => &[("category_id", Table::Categories), ("supplier_id", Table::Suppliers)],
        Table::Inventory | Table::Transactions => &[("product_id", Table::Products)],
        _ => &[],
    }
}

/// Columns with a unique constraint besides `id`.
fn unique_columns(table: Table) -> &'static [&'static str] {
    match table {
        Table::Inventory => &["product_id"],
        _ => &[],
    }
}

fn default_value(table: Table, column: &str, now: &str) -> JsonValue {
    match (table, column) {
        (_, "created_at" | "updated_at") => JsonValue::String(now.to_string()),
        (Table::Inventory, "quantity") => json!(0),
        (Table::Inventory, "min_stock_level") => json!(DEFAULT_MIN_STOCK_LEVEL),
        _ => JsonValue::Null,
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Default)]
struct Tables {
    rows: BTreeMap<Table, Vec<Row>>,
    next_id: BTreeMap<Table, i64>,
}

impl Tables {
    fn rows(&self, table: Table) -> &[Row] {
        self.rows.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.rows.entry(table).or_default()
    }

    fn allocate_id(&mut self, table: Table) -> i64 {
        let next = self.next_id.entry(table).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    fn reserve_id(&mut self, table: Table, id: i64) {
        let next = self.next_id.entry(table).or_insert(1);
        *next = (*next).max(id + 1);
    }

    fn find(&self, table: Table, column: &str, value: &JsonValue) -> Option<&Row> {
        self.rows(table)
            .iter()
            .find(|row| row.get(column).is_some_and(|v| loosely_equal(v, value)))
    }

    fn name_of(&self, table: Table, id: Option<&JsonValue>) -> JsonValue {
        id.filter(|v| !v.is_null())
            .and_then(|id| self.find(table, "id", id))
            .and_then(|row| row.get("name").cloned())
            .unwrap_or(JsonValue::Null)
    }

    /// Rows of `table` as a reader sees them; views are derived on demand.
    fn materialize(&self, table: Table) -> Vec<Row> {
        match table {
            Table::ProductInventoryView => self
                .rows(Table::Products)
                .iter()
                .map(|product| {
                    let stock = product
                        .get("id")
                        .and_then(|id| self.find(Table::Inventory, "product_id", id));
                    let stock_col = |c: &str| {
                        stock
                            .and_then(|s| s.get(c).cloned())
                            .unwrap_or(JsonValue::Null)
                    };
                    let field = |c: &str| product.get(c).cloned().unwrap_or(JsonValue::Null);

                    let mut row = Row::new();
                    row.insert("product_id".into(), field("id"));
                    row.insert("product_name".into(), field("name"));
                    row.insert("sku".into(), field("sku"));
                    row.insert(
                        "category_name".into(),
                        self.name_of(Table::Categories, product.get("category_id")),
                    );
                    row.insert(
                        "supplier_name".into(),
                        self.name_of(Table::Suppliers, product.get("supplier_id")),
                    );
                    row.insert("quantity".into(), stock_col("quantity"));
                    row.insert("min_stock_level".into(), stock_col("min_stock_level"));
                    row.insert("location".into(), stock_col("location"));
                    row
                })
                .collect(),
            Table::LowStockAlertView => self
                .rows(Table::Inventory)
                .iter()
                .filter(|stock| {
                    let quantity = as_quantity(stock.get("quantity"));
                    let min = as_quantity(stock.get("min_stock_level"));
                    classify(quantity, min) != StockStatus::Normal
                })
                .map(|stock| {
                    let product_id = stock.get("product_id").cloned().unwrap_or(JsonValue::Null);
                    let mut row = Row::new();
                    row.insert(
                        "product_name".into(),
                        self.name_of(Table::Products, Some(&product_id)),
                    );
                    row.insert("product_id".into(), product_id);
                    row.insert("quantity".into(), json!(as_quantity(stock.get("quantity"))));
                    row.insert(
                        "min_stock_level".into(),
                        json!(as_quantity(stock.get("min_stock_level"))),
                    );
                    row
                })
                .collect(),
            base => self.rows(base).to_vec(),
        }
    }

    fn check_row(&self, table: Table, row: &Row, replacing: Option<&JsonValue>) -> ClientResult<()> {
        for column in not_null(table) {
            if row.get(*column).is_none_or(JsonValue::is_null) {
                return Err(ClientError::remote(
                    "23502",
                    format!(
                        "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                    ),
                ));
            }
        }

        for (column, target) in foreign_keys(table) {
            let Some(value) = row.get(*column).filter(|v| !v.is_null()) else {
                continue;
            };
            if self.find(*target, "id", value).is_none() {
                return Err(ClientError::remote(
                    "23503",
                    format!(
                        "insert or update on table \"{table}\" violates foreign key constraint \"{table}_{column}_fkey\""
                    ),
                ));
            }
        }

        for column in std::iter::once(&"id").chain(unique_columns(table)) {
            let Some(value) = row.get(*column) else {
                continue;
            };
            let clash = self.rows(table).iter().any(|other| {
                other.get(*column).is_some_and(|v| loosely_equal(v, value))
                    && replacing.is_none_or(|id| other.get("id").is_none_or(|o| !loosely_equal(o, id)))
            });
            if clash {
                let constraint = if *column == "id" {
                    format!("{table}_pkey")
                } else {
                    format!("{table}_{column}_key")
                };
                return Err(ClientError::remote(
                    "23505",
                    format!("duplicate key value violates unique constraint \"{constraint}\""),
                ));
            }
        }
        Ok(())
    }

    fn insert(&mut self, table: Table, values: Row, now: &str) -> ClientResult<Row> {
        check_known_columns(table, &values)?;

        let id = match values.get("id").and_then(JsonValue::as_i64) {
            Some(id) => id,
            None => self.allocate_id(table),
        };
        let mut row = Row::new();
        for column in columns(table) {
            let value = match (values.get(*column), *column) {
                (Some(v), _) => v.clone(),
                (None, "id") => json!(id),
                (None, c) => default_value(table, c, now),
            };
            row.insert((*column).to_string(), value);
        }

        self.check_row(table, &row, None)?;
        self.reserve_id(table, id);
        self.rows_mut(table).push(row.clone());
        Ok(row)
    }

    fn update(&mut self, table: Table, changes: &Row, filters: &[Filter], now: &str) -> ClientResult<Vec<Row>> {
        check_known_columns(table, changes)?;

        let matching: Vec<usize> = self
            .rows(table)
            .iter()
            .enumerate()
            .filter(|(_, row)| matches_all(row, filters))
            .map(|(idx, _)| idx)
            .collect();

        let mut staged = Vec::with_capacity(matching.len());
        for idx in &matching {
            let mut row = self.rows(table)[*idx].clone();
            let id = row.get("id").cloned().unwrap_or(JsonValue::Null);
            for (column, value) in changes {
                row.insert(column.clone(), value.clone());
            }
            if row.contains_key("updated_at") && !changes.contains_key("updated_at") {
                row.insert("updated_at".into(), JsonValue::String(now.to_string()));
            }
            self.check_row(table, &row, Some(&id))?;
            staged.push(row);
        }

        let rows = self.rows_mut(table);
        for (idx, row) in matching.iter().zip(&staged) {
            rows[*idx] = row.clone();
        }
        Ok(staged)
    }

    fn delete(&mut self, table: Table, filters: &[Filter]) -> ClientResult<usize> {
        let doomed: Vec<JsonValue> = self
            .rows(table)
            .iter()
            .filter(|row| matches_all(row, filters))
            .filter_map(|row| row.get("id").cloned())
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        // Restrict: inventory must be removed before its product.
        if table == Table::Products {
            let referenced = self.rows(Table::Inventory).iter().any(|stock| {
                stock
                    .get("product_id")
                    .is_some_and(|pid| doomed.iter().any(|id| loosely_equal(pid, id)))
            });
            if referenced {
                return Err(ClientError::remote(
                    "23503",
                    "update or delete on table \"products\" violates foreign key constraint \"inventory_product_id_fkey\" on table \"inventory\"",
                ));
            }
        }

        let is_doomed = |row: &Row, column: &str| {
            row.get(column)
                .is_some_and(|v| doomed.iter().any(|id| loosely_equal(v, id)))
        };

        match table {
            // Set null.
            Table::Categories | Table::Suppliers => {
                let column = if table == Table::Categories {
                    "category_id"
                } else {
                    "supplier_id"
                };
                for product in self.rows_mut(Table::Products) {
                    if is_doomed(&*product, column) {
                        product.insert(column.to_string(), JsonValue::Null);
                    }
                }
            }
            // Cascade.
            Table::Products => {
                self.rows_mut(Table::Transactions)
                    .retain(|tx| !is_doomed(tx, "product_id"));
            }
            _ => {}
        }

        let rows = self.rows_mut(table);
        let before = rows.len();
        rows.retain(|row| !is_doomed(row, "id"));
        Ok(before - rows.len())
    }

    fn select(&self, query: &Select) -> ClientResult<Vec<JsonValue>> {
        let specs = parse_columns(&query.columns)?;
        for filter in &query.filters {
            check_column(query.table, filter.column())?;
        }

        let mut rows: Vec<Row> = self
            .materialize(query.table)
            .into_iter()
            .filter(|row| matches_all(row, &query.filters))
            .collect();
        sort_rows(&mut rows, &query.order);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        rows.iter()
            .map(|row| self.project(query.table, row, &specs).map(JsonValue::Object))
            .collect()
    }

    fn project(&self, table: Table, row: &Row, specs: &[ColumnSpec]) -> ClientResult<Row> {
        let mut out = Row::new();
        for spec in specs {
            match spec {
                ColumnSpec::All => {
                    for (column, value) in row {
                        out.insert(column.clone(), value.clone());
                    }
                }
                ColumnSpec::Column(column) => {
                    check_column(table, column)?;
                    out.insert(
                        column.clone(),
                        row.get(column).cloned().unwrap_or(JsonValue::Null),
                    );
                }
                ColumnSpec::Embed { relation, columns } => {
                    let target: Table = relation.parse()?;
                    let fk = embed_key(table, target).ok_or_else(|| {
                        ClientError::remote(
                            "PGRST200",
                            format!(
                                "Could not find a relationship between '{table}' and '{target}' in the schema cache"
                            ),
                        )
                    })?;
                    let embedded = match row.get(fk).filter(|v| !v.is_null()) {
                        Some(id) => match self.find(target, "id", id) {
                            Some(related) => JsonValue::Object(self.project(target, related, columns)?),
                            None => JsonValue::Null,
                        },
                        None => JsonValue::Null,
                    };
                    out.insert(relation.clone(), embedded);
                }
            }
        }
        Ok(out)
    }
}

/// Foreign-key column used to embed `target` into rows of `table`.
fn embed_key(table: Table, target: Table) -> Option<&'static str> {
    foreign_keys(table)
        .iter()
        .find(|(_, t)| *t == target)
        .map(|(column, _)| *column)
}

fn check_column(table: Table, column: &str) -> ClientResult<()> {
    if columns(table).contains(&column) {
        Ok(())
    } else {
        Err(ClientError::remote(
            "42703",
            format!("column {table}.{column} does not exist"),
        ))
    }
}

fn check_known_columns(table: Table, values: &Row) -> ClientResult<()> {
    match values.keys().find(|k| !columns(table).contains(&k.as_str())) {
        Some(unknown) => Err(ClientError::remote(
            "PGRST204",
            format!("Could not find the '{unknown}' column of '{table}' in the schema cache"),
        )),
        None => Ok(()),
    }
}

fn as_quantity(value: Option<&JsonValue>) -> Quantity {
    value
        .and_then(JsonValue::as_u64)
        .and_then(|q| Quantity::try_from(q).ok())
        .unwrap_or(0)
}

/// Equality the way the remote store compares a stored value with a filter
/// argument: numbers and their text form are equal.
fn loosely_equal(stored: &JsonValue, arg: &JsonValue) -> bool {
    match (stored, arg) {
        (JsonValue::Number(a), JsonValue::String(b)) | (JsonValue::String(b), JsonValue::Number(a)) => {
            a.to_string() == *b
        }
        (a, b) => a == b,
    }
}

/// Ordering with nulls sorting last.
fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => Ordering::Equal,
        (JsonValue::Null, _) => Ordering::Greater,
        (_, JsonValue::Null) => Ordering::Less,
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::String(x), JsonValue::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let value = row.get(filter.column()).unwrap_or(&JsonValue::Null);
    match filter {
        Filter::IsNull(_) | Filter::Eq(_, JsonValue::Null) => value.is_null(),
        Filter::Eq(_, arg) => loosely_equal(value, arg),
        Filter::Gte(_, arg) => !value.is_null() && compare_values(value, arg) != Ordering::Less,
        Filter::Lte(_, arg) => !value.is_null() && compare_values(value, arg) != Ordering::Greater,
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

fn sort_rows(rows: &mut [Row], order: &[Order]) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|o| {
                let ord = compare_values(
                    a.get(&o.column).unwrap_or(&JsonValue::Null),
                    b.get(&o.column).unwrap_or(&JsonValue::Null),
                );
                if o.ascending { ord } else { ord.reverse() }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn as_object(table: Table, value: JsonValue) -> ClientResult<Row> {
    match value {
        JsonValue::Object(row) => Ok(row),
        other => Err(ClientError::remote(
            "PGRST102",
            format!("expected a JSON object for '{table}', got {other}"),
        )),
    }
}

fn writable(table: Table) -> ClientResult<Table> {
    if table.is_view() {
        Err(ClientError::remote(
            "55000",
            format!("cannot change view \"{table}\""),
        ))
    } else {
        Ok(table)
    }
}

/// In-memory store behaving like the remote database.
///
/// Assigns ids and timestamps, enforces not-null, unique and foreign-key
/// constraints, nulls product references when a category or supplier is
/// deleted, cascades transactions when a product is deleted, and derives the
/// two views on every read.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDataStore {
    tables: RwLock<Tables>,
    failures: RwLock<HashMap<Table, String>>,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call touching `table` fail with `message`.
    pub fn fail_on(&self, table: Table, message: impl Into<String>) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(table, message.into());
        }
    }

    /// Undo every [`fail_on`](Self::fail_on).
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    /// Raw rows of `table`, views included.
    pub fn snapshot(&self, table: Table) -> Vec<JsonValue> {
        self.tables
            .read()
            .map(|t| t.materialize(table).into_iter().map(JsonValue::Object).collect())
            .unwrap_or_default()
    }

    fn check_failure(&self, table: Table) -> ClientResult<()> {
        let failures = self
            .failures
            .read()
            .map_err(|_| ClientError::message("store lock poisoned"))?;
        match failures.get(&table) {
            Some(message) => Err(ClientError::message(message.clone())),
            None => Ok(()),
        }
    }

    fn read(&self) -> ClientResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| ClientError::message("store lock poisoned"))
    }

    fn write(&self) -> ClientResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| ClientError::message("store lock poisoned"))
    }
}

#[async_trait]
impl DataClient for InMemoryDataStore {
    async fn select(&self, query: &Select) -> ClientResult<Vec<JsonValue>> {
        self.check_failure(query.table)?;
        self.read()?.select(query)
    }

    async fn insert(&self, table: Table, row: JsonValue) -> ClientResult<JsonValue> {
        self.check_failure(table)?;
        let table = writable(table)?;
        let values = as_object(table, row)?;
        let now = timestamp(Utc::now());
        let stored = self.write()?.insert(table, values, &now)?;
        tracing::debug!(%table, "row inserted");
        Ok(JsonValue::Object(stored))
    }

    async fn update(
        &self,
        table: Table,
        changes: JsonValue,
        filters: &[Filter],
    ) -> ClientResult<Vec<JsonValue>> {
        self.check_failure(table)?;
        let table = writable(table)?;
        let changes = as_object(table, changes)?;
        let now = timestamp(Utc::now());
        let updated = self.write()?.update(table, &changes, filters, &now)?;
        tracing::debug!(%table, rows = updated.len(), "rows updated");
        Ok(updated.into_iter().map(JsonValue::Object).collect())
    }

    async fn upsert(&self, table: Table, row: JsonValue, on_conflict: &str) -> ClientResult<JsonValue> {
        self.check_failure(table)?;
        let table = writable(table)?;
        check_column(table, on_conflict)?;
        let values = as_object(table, row)?;
        let now = timestamp(Utc::now());

        let mut tables = self.write()?;
        let key = values.get(on_conflict).cloned().unwrap_or(JsonValue::Null);
        let existing = tables.find(table, on_conflict, &key).is_some();
        let stored = if existing && !key.is_null() {
            tables
                .update(table, &values, &[Filter::Eq(on_conflict.to_string(), key)], &now)?
                .into_iter()
                .next()
                .ok_or(ClientError::NotFound)?
        } else {
            tables.insert(table, values, &now)?
        };
        Ok(JsonValue::Object(stored))
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> ClientResult<usize> {
        self.check_failure(table)?;
        let table = writable(table)?;
        let removed = self.write()?.delete(table, filters)?;
        tracing::debug!(%table, rows = removed, "rows deleted");
        Ok(removed)
    }

    async fn adjust_quantity(&self, product_id: ProductId, delta: i64) -> ClientResult<Quantity> {
        self.check_failure(Table::Inventory)?;
        let now = timestamp(Utc::now());
        let key = JsonValue::from(product_id);

        // Read and write under one lock so concurrent adjustments compose.
        let mut tables = self.write()?;
        let current = match tables.find(Table::Inventory, "product_id", &key) {
            Some(row) => Some(as_quantity(row.get("quantity"))),
            None => None,
        };

        let quantity = match current {
            Some(current) => {
                let next = apply_delta(current, delta);
                let mut changes = Row::new();
                changes.insert("quantity".into(), json!(next));
                tables.update(
                    Table::Inventory,
                    &changes,
                    &[Filter::Eq("product_id".into(), key)],
                    &now,
                )?;
                next
            }
            None => {
                let next = apply_delta(0, delta);
                let mut values = Row::new();
                values.insert("product_id".into(), key);
                values.insert("quantity".into(), json!(next));
                tables.insert(Table::Inventory, values, &now)?;
                next
            }
        };

        tracing::debug!(product_id = %product_id, delta, quantity, "stock adjusted");
        Ok(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::client::{fetch_all, fetch_one};
    use std::sync::Arc;
    use stockdesk_inventory::{InventoryViewRow, LowStockAlert};
    use stockdesk_products::Product;

    async fn seed(store: &InMemoryDataStore) {
        store
            .insert(Table::Categories, json!({ "name": "Beverages" }))
            .await
            .unwrap();
        store
            .insert(Table::Suppliers, json!({ "name": "Uji Tea Farm" }))
            .await
            .unwrap();
        for (name, sku) in [("Green Tea", "GT-1"), ("Black Tea", "BT-1"), ("Coffee", "CF-1")] {
            store
                .insert(
                    Table::Products,
                    json!({
                        "name": name,
                        "sku": sku,
                        "category_id": 1,
                        "supplier_id": 1,
                        "purchase_price": "1.00",
                        "selling_price": "2.50"
                    }),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_defaults() {
        let store = InMemoryDataStore::new();
        seed(&store).await;

        let row = store
            .insert(Table::Inventory, json!({ "product_id": 2, "quantity": 7 }))
            .await
            .unwrap();
        assert_eq!(row["id"], json!(1));
        assert_eq!(row["min_stock_level"], json!(5));
        assert!(row["updated_at"].is_string());
    }

    #[tokio::test]
    async fn constraint_violations_surface_store_codes() {
        let store = InMemoryDataStore::new();
        seed(&store).await;

        let err = store.insert(Table::Categories, json!({})).await.unwrap_err();
        assert_eq!(err.code(), Some("23502"));

        let err = store
            .insert(Table::Products, json!({ "name": "x", "purchase_price": 1, "selling_price": 1, "category_id": 99 }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("23503"));

        store
            .insert(Table::Inventory, json!({ "product_id": 1 }))
            .await
            .unwrap();
        let err = store
            .insert(Table::Inventory, json!({ "product_id": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("23505"));

        let err = store
            .insert(Table::Categories, json!({ "name": "x", "colour": "red" }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("PGRST204"));
    }

    #[tokio::test]
    async fn deleting_a_category_nulls_product_references() {
        let store = InMemoryDataStore::new();
        seed(&store).await;

        let removed = store
            .delete(Table::Categories, &[Filter::eq("id", 1)])
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let products: Vec<Product> = fetch_all(&store, &Select::from(Table::Products)).await.unwrap();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.category_id.is_none()));
        assert!(products.iter().all(|p| p.supplier_id.is_some()));
    }

    #[tokio::test]
    async fn product_delete_is_restricted_by_inventory_and_cascades_history() {
        let store = InMemoryDataStore::new();
        seed(&store).await;
        store
            .insert(Table::Inventory, json!({ "product_id": 1, "quantity": 3 }))
            .await
            .unwrap();
        store
            .insert(Table::Transactions, json!({ "product_id": 1, "type": "in", "quantity": 3 }))
            .await
            .unwrap();

        let err = store
            .delete(Table::Products, &[Filter::eq("id", 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("23503"));

        store
            .delete(Table::Inventory, &[Filter::eq("product_id", 1)])
            .await
            .unwrap();
        assert_eq!(store.delete(Table::Products, &[Filter::eq("id", 1)]).await.unwrap(), 1);
        assert!(store.snapshot(Table::Transactions).is_empty());
    }

    #[tokio::test]
    async fn embeds_relations_and_orders() {
        let store = InMemoryDataStore::new();
        seed(&store).await;

        let query = Select::from(Table::Products)
            .columns("*, categories(id, name), suppliers(id, name)")
            .order_by("name", true);
        let products: Vec<Product> = fetch_all(&store, &query).await.unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Black Tea", "Coffee", "Green Tea"]);
        assert_eq!(products[0].category_name(), Some("Beverages"));
        assert_eq!(products[0].supplier_name(), Some("Uji Tea Farm"));

        let err = store
            .select(&Select::from(Table::Categories).columns("*, suppliers(name)"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("PGRST200"));
    }

    #[tokio::test]
    async fn views_left_join_inventory() {
        let store = InMemoryDataStore::new();
        seed(&store).await;
        store
            .insert(Table::Inventory, json!({ "product_id": 1, "quantity": 3, "min_stock_level": 5 }))
            .await
            .unwrap();
        store
            .insert(Table::Inventory, json!({ "product_id": 3, "quantity": 40, "min_stock_level": 5 }))
            .await
            .unwrap();

        let rows: Vec<InventoryViewRow> = fetch_all(
            &store,
            &Select::from(Table::ProductInventoryView).order_by("product_name", true),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].product_name, "Black Tea");
        assert_eq!(rows[0].quantity, 0);
        assert_eq!(rows[0].location, None);
        assert_eq!(rows[2].category_name.as_deref(), Some("Beverages"));

        let alerts: Vec<LowStockAlert> = fetch_all(&store, &Select::from(Table::LowStockAlertView))
            .await
            .unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].product_name, "Green Tea");
    }

    #[tokio::test]
    async fn filters_compare_timestamps_and_types() {
        let store = InMemoryDataStore::new();
        seed(&store).await;
        for (kind, at) in [
            ("in", "2026-09-01T10:00:00Z"),
            ("out", "2026-10-01T10:00:00Z"),
            ("in", "2026-10-10T10:00:00.5+00:00"),
        ] {
            store
                .insert(
                    Table::Transactions,
                    json!({ "product_id": 1, "type": kind, "quantity": 1, "created_at": at }),
                )
                .await
                .unwrap();
        }

        let rows = store
            .select(
                &Select::from(Table::Transactions)
                    .eq("type", "in")
                    .filter(Filter::gte("created_at", "2026-09-16T00:00:00+00:00"))
                    .order_by("created_at", false),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(3));

        let err = store
            .select(&Select::from(Table::Transactions).eq("colour", "red"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("42703"));
    }

    #[tokio::test]
    async fn upsert_updates_by_conflict_column() {
        let store = InMemoryDataStore::new();
        seed(&store).await;

        store
            .upsert(Table::Inventory, json!({ "product_id": 2, "quantity": 4 }), "product_id")
            .await
            .unwrap();
        let row = store
            .upsert(
                Table::Inventory,
                json!({ "product_id": 2, "quantity": 9, "location": "A1" }),
                "product_id",
            )
            .await
            .unwrap();
        assert_eq!(row["id"], json!(1));
        assert_eq!(row["quantity"], json!(9));
        assert_eq!(store.snapshot(Table::Inventory).len(), 1);
    }

    #[tokio::test]
    async fn adjust_quantity_applies_delta_and_floors() {
        let store = InMemoryDataStore::new();
        seed(&store).await;
        store
            .insert(Table::Inventory, json!({ "product_id": 1, "quantity": 10 }))
            .await
            .unwrap();

        assert_eq!(store.adjust_quantity(ProductId::new(1), 5).await.unwrap(), 15);
        assert_eq!(store.adjust_quantity(ProductId::new(1), -100).await.unwrap(), 0);
        // No row yet: created on first adjustment.
        assert_eq!(store.adjust_quantity(ProductId::new(2), 4).await.unwrap(), 4);

        let row: InventoryViewRow = fetch_one(
            &store,
            &Select::from(Table::ProductInventoryView).eq("product_id", 2),
        )
        .await
        .unwrap();
        assert_eq!(row.quantity, 4);
        assert_eq!(row.min_stock_level, DEFAULT_MIN_STOCK_LEVEL);

        let err = store.adjust_quantity(ProductId::new(99), 1).await.unwrap_err();
        assert_eq!(err.code(), Some("23503"));
    }

    #[tokio::test]
    async fn concurrent_adjustments_do_not_lose_updates() {
        let store = Arc::new(InMemoryDataStore::new());
        seed(&store).await;
        store
            .insert(Table::Inventory, json!({ "product_id": 1, "quantity": 0 }))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.adjust_quantity(ProductId::new(1), 1).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let rows = store.snapshot(Table::Inventory);
        assert_eq!(rows[0]["quantity"], json!(20));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_remote_errors() {
        let store = InMemoryDataStore::new();
        store.fail_on(Table::Products, "permission denied for table products");

        let err = store.select(&Select::from(Table::Products)).await.unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table products");

        store.clear_failures();
        assert!(store.select(&Select::from(Table::Products)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn views_are_read_only() {
        let store = InMemoryDataStore::new();
        let err = store
            .insert(Table::LowStockAlertView, json!({ "product_id": 1 }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("55000"));
    }
}
