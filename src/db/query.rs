// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend-neutral row queries.
//!
//! A [`Query`] is the subset of PostgREST's horizontal filtering the app
//! needs: equality and range filters, one sort key and a row limit. The
//! REST backend renders it into URL parameters; the in-memory backend
//! evaluates it directly against JSON rows.

use serde_json::Value;
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Column filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Gte(&'static str, Value),
    Lt(&'static str, Value),
}

impl Filter {
    fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lt(c, _) => c,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            Filter::Eq(..) => "eq",
            Filter::Gte(..) => "gte",
            Filter::Lt(..) => "lt",
        }
    }

    fn value(&self) -> &Value {
        match self {
            Filter::Eq(_, v) | Filter::Gte(_, v) | Filter::Lt(_, v) => v,
        }
    }

    fn matches(&self, row: &Value) -> bool {
        let Some(field) = row.get(self.column()) else {
            return false;
        };
        let ordering = compare_values(field, self.value());
        match self {
            Filter::Eq(..) => ordering == Some(Ordering::Equal),
            Filter::Gte(..) => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            Filter::Lt(..) => ordering == Some(Ordering::Less),
        }
    }
}

/// Filtered, ordered, limited selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(&'static str, Direction)>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn gte(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column, value.into()));
        self
    }

    pub fn lt(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lt(column, value.into()));
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some((column, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row passes every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Filter, sort and truncate rows the way PostgREST would.
    pub fn apply<'a>(&self, rows: impl Iterator<Item = &'a Value>) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.filter(|r| self.matches(r)).cloned().collect();

        if let Some((column, direction)) = self.order {
            selected.sort_by(|a, b| {
                let ordering = match (a.get(column), b.get(column)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit as usize);
        }
        selected
    }

    /// PostgREST query-string parameters, already URL-encoded.
    pub fn to_params(&self) -> Vec<String> {
        let mut params: Vec<String> = self
            .filters
            .iter()
            .map(|f| {
                format!(
                    "{}={}.{}",
                    f.column(),
                    f.operator(),
                    urlencoding::encode(&value_text(f.value()))
                )
            })
            .collect();

        if let Some((column, direction)) = self.order {
            let dir = match direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(format!("order={}.{}", column, dir));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        params
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compare two JSON scalars; numbers numerically, strings lexically.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
