//! Equality filters, row ranges and ordering for list queries.

use serde::{Deserialize, Serialize};

/// Inclusive row range `[from, to]`, zero-based.
///
/// `Range { from: 0, to: 9 }` is the first ten rows. A range whose `to` is
/// below `from` selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub from: u32,
    pub to: u32,
}

impl Range {
    pub fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    /// Number of rows the range spans. Wide enough for `0..=u32::MAX`.
    pub fn len(&self) -> u64 {
        if self.to < self.from {
            0
        } else {
            u64::from(self.to) - u64::from(self.from) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { from: 0, to: 99 }
    }
}

/// Sort direction on a table's date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl Order {
    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Order::NewestFirst => "DESC",
            Order::OldestFirst => "ASC",
        }
    }
}

/// One page of a list query plus the number of rows matching the filters
/// across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub count: u64,
}

/// A column paired with the value it must equal.
pub(crate) type Condition = (&'static str, String);

/// `WHERE` clause joining conditions with `AND`, numbering placeholders
/// from `?1`. Returns an empty string when there are no conditions.
pub(crate) fn where_clause(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect();
    format!("WHERE {}", parts.join(" AND "))
}

pub(crate) fn condition_params(conditions: &[Condition]) -> Vec<&dyn rusqlite::ToSql> {
    conditions
        .iter()
        .map(|(_, value)| value as &dyn rusqlite::ToSql)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_len() {
        assert_eq!(Range::new(0, 9).len(), 10);
        assert_eq!(Range::new(5, 5).len(), 1);
        assert!(Range::new(6, 5).is_empty());
    }

    #[test]
    fn test_range_len_full_width() {
        let everything = Range::new(0, u32::MAX);
        assert_eq!(everything.len(), u64::from(u32::MAX) + 1);
        assert!(!everything.is_empty());
        assert_eq!(Range::new(u32::MAX, u32::MAX).len(), 1);
    }

    #[test]
    fn test_where_clause_numbers_placeholders() {
        let conditions = vec![
            ("transaction_status", "PAID".to_string()),
            ("transaction_app_source", "app-1".to_string()),
        ];
        assert_eq!(
            where_clause(&conditions),
            "WHERE transaction_status = ?1 AND transaction_app_source = ?2"
        );
        assert_eq!(where_clause(&[]), "");
        assert_eq!(condition_params(&conditions).len(), 2);
    }
}
