// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process tables with PostgREST-like semantics.
//!
//! Rows are stored as JSON objects so the same typed store code runs
//! against this backend and the hosted one. Serial `id`s are assigned on
//! insert when a row carries none.

use crate::db::query::{compare_values, Query};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Default)]
struct Table {
    rows: Vec<Value>,
    next_id: i64,
}

impl Table {
    fn assign_id(&mut self, row: &mut Map<String, Value>) {
        match row.get("id") {
            Some(Value::Number(n)) => {
                // Keep the sequence ahead of explicitly provided ids.
                if let Some(id) = n.as_i64() {
                    self.next_id = self.next_id.max(id);
                }
            }
            Some(Value::String(_)) => {}
            _ => {
                self.next_id += 1;
                row.insert("id".to_string(), Value::from(self.next_id));
            }
        }
    }
}

/// Shared in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryTables {
    tables: Arc<DashMap<String, Table>>,
    #[cfg(test)]
    rejected: Arc<DashMap<String, ()>>,
}

fn merge(target: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(existing) = target {
        for (key, value) in patch {
            existing.insert(key.clone(), value.clone());
        }
    }
}

fn same_key(row: &Value, candidate: &Map<String, Value>, on_conflict: &[&str]) -> bool {
    on_conflict.iter().all(|column| {
        match (row.get(*column), candidate.get(*column)) {
            (Some(a), Some(b)) => compare_values(a, b) == Some(Ordering::Equal),
            _ => false,
        }
    })
}

fn as_object(row: &Value) -> Option<Map<String, Value>> {
    row.as_object().cloned()
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, table: &str, query: &Query) -> Vec<Value> {
        match self.tables.get(table) {
            Some(t) => query.apply(t.rows.iter()),
            None => Vec::new(),
        }
    }

    /// Insert a row and return it as stored. Non-object rows are rejected.
    pub fn insert(&self, table: &str, row: &Value) -> Option<Value> {
        if self.rejects(table) {
            return None;
        }
        let mut object = as_object(row)?;
        let mut entry = self.tables.entry(table.to_string()).or_default();
        entry.assign_id(&mut object);
        let stored = Value::Object(object);
        entry.rows.push(stored.clone());
        Some(stored)
    }

    /// Insert, or merge into the row with the same `on_conflict` key.
    pub fn upsert(&self, table: &str, row: &Value, on_conflict: &[&str]) -> Option<Value> {
        let candidate = as_object(row)?;
        let mut entry = self.tables.entry(table.to_string()).or_default();

        if let Some(existing) = entry
            .rows
            .iter_mut()
            .find(|r| same_key(r, &candidate, on_conflict))
        {
            merge(existing, &candidate);
            return Some(existing.clone());
        }

        let mut object = candidate;
        entry.assign_id(&mut object);
        let stored = Value::Object(object);
        entry.rows.push(stored.clone());
        Some(stored)
    }

    /// Merge `patch` into every matching row; returns the updated rows.
    pub fn update(&self, table: &str, query: &Query, patch: &Value) -> Vec<Value> {
        let Some(patch) = patch.as_object() else {
            return Vec::new();
        };
        let Some(mut entry) = self.tables.get_mut(table) else {
            return Vec::new();
        };

        let mut updated = Vec::new();
        for row in entry.rows.iter_mut().filter(|r| query.matches(r)) {
            merge(row, patch);
            updated.push(row.clone());
        }
        updated
    }

    /// Number of rows in a table.
    #[cfg(test)]
    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    #[cfg(test)]
    fn rejects(&self, table: &str) -> bool {
        self.rejected.contains_key(table)
    }

    #[cfg(not(test))]
    fn rejects(&self, _table: &str) -> bool {
        false
    }

    /// Make every later insert into `table` fail.
    #[cfg(test)]
    pub fn reject_inserts(&self, table: &str) {
        self.rejected.insert(table.to_string(), ());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_assigns_serial_ids() {
        let tables = MemoryTables::new();
        let a = tables.insert("orders", &json!({"user_id": "u"})).unwrap();
        let b = tables.insert("orders", &json!({"user_id": "u"})).unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
    }

    #[test]
    fn test_explicit_ids_advance_sequence() {
        let tables = MemoryTables::new();
        tables.insert("products", &json!({"id": 7, "name": "红薯"})).unwrap();
        let next = tables.insert("products", &json!({"name": "白菜"})).unwrap();
        assert_eq!(next["id"], 8);
    }

    #[test]
    fn test_uuid_ids_kept() {
        let tables = MemoryTables::new();
        let row = tables
            .insert("profiles", &json!({"id": "6f1c2d4e-8a7b-4c3d-9e2f-1a2b3c4d5e6f"}))
            .unwrap();
        assert_eq!(row["id"], "6f1c2d4e-8a7b-4c3d-9e2f-1a2b3c4d5e6f");
    }

    #[test]
    fn test_upsert_merges_on_conflict_key() {
        let tables = MemoryTables::new();
        let key = ["user_id", "product_id"];
        tables
            .upsert("user_items", &json!({"user_id": "u", "product_id": 1, "quantity": 1}), &key)
            .unwrap();
        let merged = tables
            .upsert("user_items", &json!({"user_id": "u", "product_id": 1, "quantity": 3}), &key)
            .unwrap();
        tables
            .upsert("user_items", &json!({"user_id": "u", "product_id": 2, "quantity": 1}), &key)
            .unwrap();

        assert_eq!(merged["quantity"], 3);
        assert_eq!(tables.count("user_items"), 2);
    }

    #[test]
    fn test_update_touches_matching_rows_only() {
        let tables = MemoryTables::new();
        tables.insert("user_medals", &json!({"user_id": "u", "medal_id": "a"})).unwrap();
        tables.insert("user_medals", &json!({"user_id": "u", "medal_id": "b"})).unwrap();

        let updated = tables.update(
            "user_medals",
            &Query::new().eq("user_id", "u").eq("medal_id", "b"),
            &json!({"is_unlocked": true}),
        );

        assert_eq!(updated.len(), 1);
        let rows = tables.select("user_medals", &Query::new().eq("is_unlocked", true));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["medal_id"], "b");
    }
}
