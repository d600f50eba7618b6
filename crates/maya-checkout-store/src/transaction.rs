//! Transaction records: one row per payment attempt.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{new_id, now_timestamp, Database};
use crate::error::StoreError;
use crate::query::{condition_params, where_clause, Condition, Order, Page, Range};

/// Status a transaction is created with unless the caller says otherwise.
pub const DEFAULT_STATUS: &str = "PENDING";

const COLUMNS: &str = "transaction_id, transaction_reference_id, transaction_app_source, \
    transaction_app_source_user_id, transaction_service_id, transaction_service_name, \
    transaction_status, transaction_total_amount, transaction_payment_channel, transaction_date";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_id: String,
    pub transaction_reference_id: String,
    pub transaction_app_source: String,
    pub transaction_app_source_user_id: String,
    pub transaction_service_id: String,
    pub transaction_service_name: String,
    pub transaction_status: String,
    pub transaction_total_amount: f64,
    pub transaction_payment_channel: Option<String>,
    pub transaction_date: String,
}

impl TransactionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            transaction_id: row.get(0)?,
            transaction_reference_id: row.get(1)?,
            transaction_app_source: row.get(2)?,
            transaction_app_source_user_id: row.get(3)?,
            transaction_service_id: row.get(4)?,
            transaction_service_name: row.get(5)?,
            transaction_status: row.get(6)?,
            transaction_total_amount: row.get(7)?,
            transaction_payment_channel: row.get(8)?,
            transaction_date: row.get(9)?,
        })
    }
}

/// Insert payload. `None` fields take the table defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction_id: Option<String>,
    pub transaction_reference_id: String,
    pub transaction_app_source: String,
    pub transaction_app_source_user_id: String,
    pub transaction_service_id: String,
    pub transaction_service_name: String,
    pub transaction_status: Option<String>,
    pub transaction_total_amount: f64,
    pub transaction_payment_channel: Option<String>,
    pub transaction_date: Option<String>,
}

/// Partial update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub transaction_app_source: Option<String>,
    pub transaction_app_source_user_id: Option<String>,
    pub transaction_service_id: Option<String>,
    pub transaction_service_name: Option<String>,
    pub transaction_status: Option<String>,
    pub transaction_total_amount: Option<f64>,
    /// `Some(None)` clears the channel; an explicit JSON `null` maps to it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_payment_channel: Option<Option<String>>,
    pub transaction_date: Option<String>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TransactionUpdate {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            transaction_status: Some(status.into()),
            ..Default::default()
        }
    }

    fn assignments(&self) -> Vec<(&'static str, Box<dyn rusqlite::ToSql + '_>)> {
        let mut set: Vec<(&'static str, Box<dyn rusqlite::ToSql + '_>)> = Vec::new();
        if let Some(ref v) = self.transaction_app_source {
            set.push(("transaction_app_source", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_app_source_user_id {
            set.push(("transaction_app_source_user_id", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_service_id {
            set.push(("transaction_service_id", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_service_name {
            set.push(("transaction_service_name", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_status {
            set.push(("transaction_status", Box::new(v)));
        }
        if let Some(v) = self.transaction_total_amount {
            set.push(("transaction_total_amount", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_payment_channel {
            set.push(("transaction_payment_channel", Box::new(v)));
        }
        if let Some(ref v) = self.transaction_date {
            set.push(("transaction_date", Box::new(v)));
        }
        set
    }
}

/// Equality filter on one transaction column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionFilter {
    Status(String),
    AppSource(String),
    AppSourceUserId(String),
    ServiceId(String),
    ServiceName(String),
    PaymentChannel(String),
}

impl TransactionFilter {
    fn condition(&self) -> Condition {
        match self {
            TransactionFilter::Status(v) => ("transaction_status", v.clone()),
            TransactionFilter::AppSource(v) => ("transaction_app_source", v.clone()),
            TransactionFilter::AppSourceUserId(v) => ("transaction_app_source_user_id", v.clone()),
            TransactionFilter::ServiceId(v) => ("transaction_service_id", v.clone()),
            TransactionFilter::ServiceName(v) => ("transaction_service_name", v.clone()),
            TransactionFilter::PaymentChannel(v) => ("transaction_payment_channel", v.clone()),
        }
    }
}

/// A filtered, ranged, date-ordered transaction listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub filters: Vec<TransactionFilter>,
    pub range: Range,
    pub order: Order,
}

impl TransactionQuery {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: TransactionFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

impl Database {
    /// Insert a transaction record and return the stored row.
    pub fn create_transaction(&self, new: &NewTransaction) -> Result<TransactionRow, StoreError> {
        let conn = self.conn()?;

        let row = TransactionRow {
            transaction_id: new.transaction_id.clone().unwrap_or_else(new_id),
            transaction_reference_id: new.transaction_reference_id.clone(),
            transaction_app_source: new.transaction_app_source.clone(),
            transaction_app_source_user_id: new.transaction_app_source_user_id.clone(),
            transaction_service_id: new.transaction_service_id.clone(),
            transaction_service_name: new.transaction_service_name.clone(),
            transaction_status: new
                .transaction_status
                .clone()
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            transaction_total_amount: new.transaction_total_amount,
            transaction_payment_channel: new.transaction_payment_channel.clone(),
            transaction_date: new.transaction_date.clone().unwrap_or_else(now_timestamp),
        };

        conn.execute(
            &format!(
                "INSERT INTO transaction_table ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                row.transaction_id,
                row.transaction_reference_id,
                row.transaction_app_source,
                row.transaction_app_source_user_id,
                row.transaction_service_id,
                row.transaction_service_name,
                row.transaction_status,
                row.transaction_total_amount,
                row.transaction_payment_channel,
                row.transaction_date,
            ],
        )?;

        Ok(row)
    }

    /// Get a transaction by its reference id.
    pub fn get_transaction(&self, reference_id: &str) -> Result<Option<TransactionRow>, StoreError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM transaction_table WHERE transaction_reference_id = ?1"),
                params![reference_id],
                TransactionRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    /// Apply a partial update to the transaction with `reference_id` and
    /// return the updated row.
    pub fn update_transaction(
        &self,
        reference_id: &str,
        update: &TransactionUpdate,
    ) -> Result<TransactionRow, StoreError> {
        let conn = self.conn()?;
        let assignments = update.assignments();

        if !assignments.is_empty() {
            let set: Vec<String> = assignments
                .iter()
                .enumerate()
                .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
                .collect();
            let query = format!(
                "UPDATE transaction_table SET {} WHERE transaction_reference_id = ?{}",
                set.join(", "),
                assignments.len() + 1
            );

            let mut params_refs: Vec<&dyn rusqlite::ToSql> =
                assignments.iter().map(|(_, v)| v.as_ref()).collect();
            params_refs.push(&reference_id);

            let rows_affected = conn.execute(&query, params_refs.as_slice())?;
            if rows_affected == 0 {
                return Err(StoreError::NotFound(format!("transaction {reference_id}")));
            }
        }

        // Fetch with the already-held connection
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM transaction_table WHERE transaction_reference_id = ?1"),
            params![reference_id],
            TransactionRow::from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("transaction {reference_id}")))
    }

    /// List transactions matching every filter in `query`, newest first by
    /// default, restricted to `query.range`.
    pub fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<TransactionRow>, StoreError> {
        let conn = self.conn()?;

        let conditions: Vec<Condition> = query.filters.iter().map(|f| f.condition()).collect();
        let filter_sql = where_clause(&conditions);
        let filter_params = condition_params(&conditions);

        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM transaction_table {filter_sql}"),
            filter_params.as_slice(),
            |row| row.get(0),
        )?;

        if query.range.is_empty() {
            return Ok(Page {
                rows: Vec::new(),
                count: count as u64,
            });
        }

        // Row id breaks ties between rows written in the same instant
        let direction = query.order.sql();
        let sql = format!(
            "SELECT {COLUMNS} FROM transaction_table {filter_sql} \
             ORDER BY transaction_date {direction}, rowid {direction} \
             LIMIT {} OFFSET {}",
            query.range.len(),
            query.range.from
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(filter_params.as_slice(), TransactionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            rows,
            count: count as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.create_app_source_with_id("app-bills", "Bills").unwrap();
        db.create_app_source_with_id("app-shop", "Shop").unwrap();
        db
    }

    fn sample(reference: &str, app: &str, status: &str, date: &str) -> NewTransaction {
        NewTransaction {
            transaction_reference_id: reference.to_string(),
            transaction_app_source: app.to_string(),
            transaction_app_source_user_id: "user-1".to_string(),
            transaction_service_id: "svc-1".to_string(),
            transaction_service_name: "Electricity".to_string(),
            transaction_status: Some(status.to_string()),
            transaction_total_amount: 100.0,
            transaction_date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_get_by_reference() {
        let db = setup();

        let created = db
            .create_transaction(&NewTransaction {
                transaction_reference_id: "REF-1".to_string(),
                transaction_app_source: "app-bills".to_string(),
                transaction_app_source_user_id: "user-1".to_string(),
                transaction_service_id: "svc-1".to_string(),
                transaction_service_name: "Water".to_string(),
                transaction_total_amount: 420.5,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(created.transaction_status, DEFAULT_STATUS);
        assert!(!created.transaction_id.is_empty());
        assert!(created.transaction_payment_channel.is_none());

        let fetched = db.get_transaction("REF-1").unwrap().unwrap();
        assert_eq!(fetched, created);

        let page = db
            .list_transactions(&TransactionQuery::default())
            .unwrap();
        let matching: Vec<_> = page
            .rows
            .iter()
            .filter(|r| r.transaction_reference_id == "REF-1")
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[test]
    fn test_get_missing_reference() {
        let db = setup();
        assert!(db.get_transaction("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_reference_rejected() {
        let db = setup();
        db.create_transaction(&sample("REF-1", "app-bills", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap();
        let err = db
            .create_transaction(&sample("REF-1", "app-bills", "PENDING", "2026-01-02T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_unknown_app_source_rejected() {
        let db = setup();
        let err = db
            .create_transaction(&sample("REF-1", "app-missing", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_update_transaction_partial() {
        let db = setup();
        db.create_transaction(&sample("REF-1", "app-bills", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap();

        let updated = db
            .update_transaction(
                "REF-1",
                &TransactionUpdate {
                    transaction_status: Some("PAYMENT_SUCCESS".to_string()),
                    transaction_payment_channel: Some(Some("master-card".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.transaction_status, "PAYMENT_SUCCESS");
        assert_eq!(updated.transaction_payment_channel.as_deref(), Some("master-card"));
        assert_eq!(updated.transaction_total_amount, 100.0);
        assert_eq!(updated.transaction_service_name, "Electricity");
    }

    #[test]
    fn test_update_moves_app_source_and_clears_channel() {
        let db = setup();
        let mut new = sample("REF-1", "app-bills", "PENDING", "2026-01-01T00:00:00Z");
        new.transaction_payment_channel = Some("gcash".to_string());
        db.create_transaction(&new).unwrap();

        let updated = db
            .update_transaction(
                "REF-1",
                &TransactionUpdate {
                    transaction_app_source: Some("app-shop".to_string()),
                    transaction_date: Some("2026-05-01T00:00:00Z".to_string()),
                    transaction_payment_channel: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.transaction_app_source, "app-shop");
        assert_eq!(updated.transaction_date, "2026-05-01T00:00:00Z");
        assert!(updated.transaction_payment_channel.is_none());

        let err = db
            .update_transaction(
                "REF-1",
                &TransactionUpdate {
                    transaction_app_source: Some("app-missing".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_update_json_null_clears_channel() {
        let clear: TransactionUpdate =
            serde_json::from_str(r#"{"transaction_payment_channel": null}"#).unwrap();
        assert_eq!(clear.transaction_payment_channel, Some(None));

        let untouched: TransactionUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.transaction_payment_channel, None);
    }

    #[test]
    fn test_update_missing_reference() {
        let db = setup();
        let err = db
            .update_transaction("REF-404", &TransactionUpdate::status("PAID"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = db
            .update_transaction("REF-404", &TransactionUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_list_orders_by_date() {
        let db = setup();
        db.create_transaction(&sample("REF-B", "app-bills", "PENDING", "2026-02-01T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-A", "app-bills", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-C", "app-bills", "PENDING", "2026-03-01T00:00:00Z"))
            .unwrap();

        let newest = db.list_transactions(&TransactionQuery::default()).unwrap();
        let refs: Vec<_> = newest.rows.iter().map(|r| r.transaction_reference_id.as_str()).collect();
        assert_eq!(refs, vec!["REF-C", "REF-B", "REF-A"]);

        let oldest = db
            .list_transactions(&TransactionQuery::default().order(Order::OldestFirst))
            .unwrap();
        let refs: Vec<_> = oldest.rows.iter().map(|r| r.transaction_reference_id.as_str()).collect();
        assert_eq!(refs, vec!["REF-A", "REF-B", "REF-C"]);
    }

    #[test]
    fn test_range_never_exceeds_bounds() {
        let db = setup();
        for day in 1..=12 {
            db.create_transaction(&sample(
                &format!("REF-{day:02}"),
                "app-bills",
                "PENDING",
                &format!("2026-01-{day:02}T00:00:00Z"),
            ))
            .unwrap();
        }

        let all = db
            .list_transactions(&TransactionQuery::new(Range::new(0, 99)).order(Order::OldestFirst))
            .unwrap();
        assert_eq!(all.rows.len(), 12);

        for (from, to) in [(0u32, 4u32), (3, 7), (10, 20), (11, 11), (12, 15)] {
            let page = db
                .list_transactions(&TransactionQuery::new(Range::new(from, to)).order(Order::OldestFirst))
                .unwrap();
            let expected: Vec<_> = all
                .rows
                .iter()
                .skip(from as usize)
                .take((to - from + 1) as usize)
                .cloned()
                .collect();
            assert_eq!(page.rows, expected, "range [{from}, {to}]");
            assert!(page.rows.len() as u32 <= to - from + 1);
            assert_eq!(page.count, 12);
        }

        let inverted = db
            .list_transactions(&TransactionQuery::new(Range::new(5, 2)))
            .unwrap();
        assert!(inverted.rows.is_empty());
        assert_eq!(inverted.count, 12);
    }

    #[test]
    fn test_full_width_range_returns_every_row() {
        let db = setup();
        db.create_transaction(&sample("REF-1", "app-bills", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-2", "app-bills", "PENDING", "2026-01-02T00:00:00Z"))
            .unwrap();

        let page = db
            .list_transactions(&TransactionQuery::new(Range::new(0, u32::MAX)))
            .unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.count, 2);

        let past_end = db
            .list_transactions(&TransactionQuery::new(Range::new(u32::MAX, u32::MAX)))
            .unwrap();
        assert!(past_end.rows.is_empty());
        assert_eq!(past_end.count, 2);
    }

    #[test]
    fn test_filters_intersect() {
        let db = setup();
        db.create_transaction(&sample("REF-1", "app-bills", "PENDING", "2026-01-01T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-2", "app-bills", "PAID", "2026-01-02T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-3", "app-shop", "PAID", "2026-01-03T00:00:00Z"))
            .unwrap();
        db.create_transaction(&sample("REF-4", "app-shop", "PENDING", "2026-01-04T00:00:00Z"))
            .unwrap();

        let paid = db
            .list_transactions(&TransactionQuery::default().filter(TransactionFilter::Status("PAID".to_string())))
            .unwrap();
        assert_eq!(paid.count, 2);

        let shop = db
            .list_transactions(
                &TransactionQuery::default().filter(TransactionFilter::AppSource("app-shop".to_string())),
            )
            .unwrap();
        assert_eq!(shop.count, 2);

        let both = db
            .list_transactions(
                &TransactionQuery::default()
                    .filter(TransactionFilter::Status("PAID".to_string()))
                    .filter(TransactionFilter::AppSource("app-shop".to_string())),
            )
            .unwrap();
        assert_eq!(both.count, 1);
        assert_eq!(both.rows.len(), 1);
        assert_eq!(both.rows[0].transaction_reference_id, "REF-3");

        let none = db
            .list_transactions(
                &TransactionQuery::default()
                    .filter(TransactionFilter::Status("PAID".to_string()))
                    .filter(TransactionFilter::Status("PENDING".to_string())),
            )
            .unwrap();
        assert_eq!(none.count, 0);
        assert!(none.rows.is_empty());
    }
}
