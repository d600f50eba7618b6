//! Relational store for checkout transactions, vault customers and the
//! address hierarchy.
//!
//! Backed by SQLite through a single mutex-guarded connection. Each method
//! runs one statement (plus a read-back where it returns the row) and
//! reports failures as [`StoreError`], which converts into
//! [`checkout::CheckoutError`] for envelope wrapping.

pub mod address;
pub mod app_source;
pub mod config;
pub mod customer;
pub mod db;
pub mod error;
pub mod query;
pub mod transaction;

pub use address::{AddressFilter, AddressLevel, BarangayRow, CityRow, ProvinceRow, RegionRow};
pub use app_source::AppSourceRow;
pub use config::StoreConfig;
pub use customer::{
    CustomerCardRow, CustomerRow, CustomerUpdate, NewCustomer, NewCustomerCard, NewPaymentToken,
    PaymentTokenRow,
};
pub use db::Database;
pub use error::StoreError;
pub use query::{Order, Page, Range};
pub use transaction::{
    NewTransaction, TransactionFilter, TransactionQuery, TransactionRow, TransactionUpdate,
    DEFAULT_STATUS,
};
