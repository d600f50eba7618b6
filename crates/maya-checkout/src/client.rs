//! HTTP client for the Maya checkout and vault APIs.
//!
//! Each method issues exactly one request. Non-success statuses and
//! unparseable bodies come back as [`CheckoutError`]; wrapping into an
//! envelope is left to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::basic_auth;
use crate::config::MayaConfig;
use crate::error::CheckoutError;
use crate::payment::{
    CardDetails, CardPaymentRequest, CheckoutRequest, CustomerRequest, LinkCardRequest,
    PaymentTokenRequest,
};
use crate::response::{CheckoutResponse, LinkedCard, Payment, PaymentToken, VaultCustomer};

/// Which of the two Maya keys authenticates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Public,
    Secret,
}

pub struct MayaClient {
    http: reqwest::Client,
    config: MayaConfig,
}

impl MayaClient {
    pub fn new(config: MayaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(config: MayaConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &MayaConfig {
        &self.config
    }

    /// Create a hosted checkout. The buyer completes payment at the
    /// returned `redirect_url`.
    pub async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, CheckoutError> {
        self.post("/checkout/v1/checkouts", KeyKind::Public, request)
            .await
    }

    /// Exchange raw card details for a single-use payment token.
    pub async fn create_payment_token(
        &self,
        card: &CardDetails,
    ) -> Result<PaymentToken, CheckoutError> {
        self.post(
            "/payments/v1/payment-tokens",
            KeyKind::Public,
            &PaymentTokenRequest { card },
        )
        .await
    }

    pub async fn create_customer(
        &self,
        request: &CustomerRequest,
    ) -> Result<VaultCustomer, CheckoutError> {
        self.post("/payments/v1/customers", KeyKind::Secret, request)
            .await
    }

    /// Vault a tokenized card against a customer.
    pub async fn link_card(
        &self,
        customer_id: &str,
        request: &LinkCardRequest,
    ) -> Result<LinkedCard, CheckoutError> {
        let path = format!(
            "/payments/v1/customers/{}/cards",
            urlencoding::encode(customer_id)
        );
        self.post(&path, KeyKind::Secret, request).await
    }

    /// Charge a vaulted card.
    pub async fn create_card_payment(
        &self,
        customer_id: &str,
        card_token_id: &str,
        request: &CardPaymentRequest,
    ) -> Result<Payment, CheckoutError> {
        let path = format!(
            "/payments/v1/customers/{}/cards/{}/payments",
            urlencoding::encode(customer_id),
            urlencoding::encode(card_token_id)
        );
        self.post(&path, KeyKind::Secret, request).await
    }

    /// All payments made against a request reference number, oldest first.
    pub async fn get_payments_by_reference(
        &self,
        request_reference_number: &str,
    ) -> Result<Vec<Payment>, CheckoutError> {
        let path = format!(
            "/payments/v1/payment-rrns/{}",
            urlencoding::encode(request_reference_number)
        );
        let request = self.http.get(self.url(&path));
        self.send(request, KeyKind::Secret).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base(), path)
    }

    fn key(&self, kind: KeyKind) -> Result<&str, CheckoutError> {
        match kind {
            KeyKind::Public => Ok(&self.config.public_key),
            KeyKind::Secret => Ok(self.config.secret_key()?),
        }
    }

    async fn post<B, R>(&self, path: &str, kind: KeyKind, body: &B) -> Result<R, CheckoutError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body_bytes = serde_json::to_vec(body)?;
        let request = self
            .http
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body_bytes);
        self.send(request, kind).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        kind: KeyKind,
    ) -> Result<R, CheckoutError> {
        let resp = request
            .header("Authorization", basic_auth(self.key(kind)?))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::debug!(status = %status, "maya request rejected");
            return Err(CheckoutError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
