//! Table names, filters and select queries understood by every data client.

use core::str::FromStr;

use serde_json::Value as JsonValue;

use crate::error::ClientError;

/// Tables and read-only views exposed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Products,
    Categories,
    Suppliers,
    Inventory,
    Transactions,
    /// Products joined with inventory, category and supplier names.
    ProductInventoryView,
    /// Products at or below their minimum stock level.
    LowStockAlertView,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Products,
        Table::Categories,
        Table::Suppliers,
        Table::Inventory,
        Table::Transactions,
        Table::ProductInventoryView,
        Table::LowStockAlertView,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Categories => "categories",
            Table::Suppliers => "suppliers",
            Table::Inventory => "inventory",
            Table::Transactions => "transactions",
            Table::ProductInventoryView => "product_inventory_view",
            Table::LowStockAlertView => "low_stock_alert_view",
        }
    }

    /// Views cannot be written to.
    pub fn is_view(&self) -> bool {
        matches!(self, Table::ProductInventoryView | Table::LowStockAlertView)
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ClientError::remote("42P01", format!("relation \"{s}\" does not exist")))
    }
}

/// Row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, JsonValue),
    Gte(String, JsonValue),
    Lte(String, JsonValue),
    IsNull(String),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::Gte(column.into(), value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Filter::Lte(column.into(), value.into())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Filter::IsNull(column.into())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lte(c, _) | Filter::IsNull(c) => c,
        }
    }

    /// PostgREST rendering: `(column, "op.value")`.
    pub fn to_query_pair(&self) -> (String, String) {
        let (column, rendered) = match self {
            Filter::Eq(c, JsonValue::Null) | Filter::IsNull(c) => (c, "is.null".to_string()),
            Filter::Eq(c, v) => (c, format!("eq.{}", render_value(v))),
            Filter::Gte(c, v) => (c, format!("gte.{}", render_value(v))),
            Filter::Lte(c, v) => (c, format!("lte.{}", render_value(v))),
        };
        (column.clone(), rendered)
    }
}

fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select query: columns, filters, ordering and an optional limit.
///
/// Columns use the store's select syntax, including embedded relations such
/// as `categories(id, name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: Table,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs for a PostgREST `GET /rest/v1/<table>`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), compact_columns(&self.columns))];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

fn compact_columns(columns: &str) -> String {
    columns.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One entry of a column list: a plain column, `*`, or an embedded relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    All,
    Column(String),
    Embed { relation: String, columns: Vec<ColumnSpec> },
}

/// Parse a column list such as `id, name, categories(id, name)`.
pub fn parse_columns(columns: &str) -> Result<Vec<ColumnSpec>, ClientError> {
    let compact = compact_columns(columns);
    if compact.is_empty() {
        return Ok(vec![ColumnSpec::All]);
    }

    let mut specs = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in compact.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ClientError::remote("PGRST100", "unbalanced parentheses in select"))?;
            }
            ',' if depth == 0 => {
                specs.push(parse_one(&compact[start..idx])?);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ClientError::remote("PGRST100", "unbalanced parentheses in select"));
    }
    specs.push(parse_one(&compact[start..])?);
    Ok(specs)
}

fn parse_one(spec: &str) -> Result<ColumnSpec, ClientError> {
    if spec.is_empty() {
        return Err(ClientError::remote("PGRST100", "empty column in select"));
    }
    if spec == "*" {
        return Ok(ColumnSpec::All);
    }
    match spec.find('(') {
        Some(open) if spec.ends_with(')') => Ok(ColumnSpec::Embed {
            relation: spec[..open].to_string(),
            columns: parse_columns(&spec[open + 1..spec.len() - 1])?,
        }),
        Some(_) => Err(ClientError::remote("PGRST100", format!("malformed relation '{spec}'"))),
        None => Ok(ColumnSpec::Column(spec.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_postgrest_query() {
        let q = Select::from(Table::Transactions)
            .columns("id, product_id, products(name), type")
            .eq("type", "in")
            .filter(Filter::gte("created_at", "2026-09-16T00:00:00Z"))
            .order_by("created_at", false)
            .limit(5);

        assert_eq!(
            q.to_query_pairs(),
            vec![
                ("select".to_string(), "id,product_id,products(name),type".to_string()),
                ("type".to_string(), "eq.in".to_string()),
                ("created_at".to_string(), "gte.2026-09-16T00:00:00Z".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn null_equality_renders_as_is_null() {
        assert_eq!(
            Filter::eq("category_id", JsonValue::Null).to_query_pair(),
            ("category_id".to_string(), "is.null".to_string())
        );
        assert_eq!(
            Filter::eq("id", json!(3)).to_query_pair(),
            ("id".to_string(), "eq.3".to_string())
        );
    }

    #[test]
    fn parses_nested_column_lists() {
        let specs = parse_columns("id, name, categories(id, name), *").unwrap();
        assert_eq!(
            specs,
            vec![
                ColumnSpec::Column("id".to_string()),
                ColumnSpec::Column("name".to_string()),
                ColumnSpec::Embed {
                    relation: "categories".to_string(),
                    columns: vec![
                        ColumnSpec::Column("id".to_string()),
                        ColumnSpec::Column("name".to_string()),
                    ],
                },
                ColumnSpec::All,
            ]
        );
    }

    #[test]
    fn rejects_unbalanced_columns() {
        assert!(parse_columns("id, categories(name").is_err());
        assert!(parse_columns("id, name)").is_err());
    }

    #[test]
    fn table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
        assert_eq!("widgets".parse::<Table>().unwrap_err().code(), Some("42P01"));
    }
}
