//! Maya checkout SDK.
//!
//! [`CheckoutKit`] puts the Maya client ([`checkout`]) and the transaction
//! store ([`checkout_store`]) behind one facade. Every method returns an
//! [`Envelope`]; no method panics or returns a bare `Result`.
//!
//! ```no_run
//! use checkout_sdk::{CheckoutKit, TransactionQuery, Range};
//!
//! # fn main() -> Result<(), checkout_sdk::CheckoutError> {
//! let kit = CheckoutKit::from_env()?;
//! let page = kit.list_transactions(&TransactionQuery::new(Range::new(0, 24)));
//! if let Some(page) = page.data() {
//!     println!("{} of {} transactions", page.rows.len(), page.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod flows;
pub mod kit;

pub use checkout::{
    wrap, CapturedLog, CheckoutError, Envelope, ErrorBody, FailureLog, FaultKind, MayaClient,
    MayaConfig, Outcome, SilentLog, TracingLog,
};
pub use checkout_store::{
    AddressFilter, AddressLevel, Database, Order, Page, Range, StoreConfig, StoreError,
    TransactionFilter, TransactionQuery,
};
pub use flows::{CheckoutRecordRequest, RecordedCheckout, SaveCardRequest, SavedCard};
pub use kit::{CheckoutKit, PROVIDER_NAME};
