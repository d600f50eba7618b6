//! Maya checkout client with normalized results.
//!
//! Every outbound call in this workspace goes through the same contract:
//! run once, and produce an [`Envelope`] holding either the parsed data or
//! the fault. Failures are reported to an injectable [`FailureLog`] with a
//! fixed message; nothing is retried and nothing is re-thrown.
//!
//! # Quick example
//!
//! ```no_run
//! use checkout::{wrap, CheckoutRequest, Environment, Item, MayaClient, MayaConfig, TotalAmount, TracingLog};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = MayaClient::new(MayaConfig::new(Environment::Sandbox, "pk-YOUR_KEY"));
//! let request = CheckoutRequest::new("REF-001", TotalAmount::php(100.0), vec![Item::new("Top-up", 100.0)]);
//!
//! let envelope = wrap::call(&TracingLog, "Failed to create maya checkout", client.create_checkout(&request)).await;
//! if let Some(checkout) = envelope.data() {
//!     println!("send the buyer to {}", checkout.redirect_url);
//! }
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod log;
pub mod payment;
pub mod response;
pub mod wrap;

pub use client::MayaClient;
pub use config::{ConfigError, Environment, MayaConfig};
pub use envelope::{Envelope, ErrorBody, Outcome};
pub use error::{CheckoutError, FaultKind};
pub use log::{CapturedLog, FailureLog, LoggedFailure, SilentLog, TracingLog};
pub use payment::*;
pub use response::*;
