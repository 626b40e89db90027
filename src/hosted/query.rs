//! Table query builder
//!
//! Builds the query-string of a PostgREST table request:
//! `select=*&role=eq.teacher&order=full_name.asc&offset=0&limit=20`.

use std::fmt::Display;

/// Select/filter/order/range description of a table request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    range: Option<(i64, i64)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns (and embedded resources) to return
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Equality filter
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Append an ordering term
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    /// Inclusive row window `[from, to]`
    pub fn range(mut self, from: i64, to: i64) -> Self {
        self.range = Some((from, to));
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Query-string pairs in a stable order
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some((from, to)) = self.range {
            let limit = (to - from + 1).max(0);
            params.push(("offset".to_string(), from.max(0).to_string()));
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}
