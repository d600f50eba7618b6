//! Multi-step operations spanning the gateway and the store.
//!
//! Steps run in order and stop at the first failure, which is the only one
//! logged and returned. Earlier effects stay in place: a checkout created at
//! Maya is not cancelled when recording it locally fails.

use checkout::wrap::{self, step, StepFailure};
use checkout::{
    CardDetails, CheckoutError, CheckoutRequest, CheckoutResponse, CustomerRequest, Envelope,
    LinkCardRequest, RedirectUrls,
};
use checkout_store::{
    CustomerCardRow, CustomerRow, NewCustomer, NewCustomerCard, NewPaymentToken, NewTransaction,
    TransactionRow, TransactionUpdate,
};
use serde::{Deserialize, Serialize};

use crate::kit::{
    CheckoutKit, CREATE_CARD_FAILED, CREATE_CHECKOUT_FAILED, CREATE_CUSTOMER_FAILED,
    CREATE_PAYMENT_TOKEN_FAILED, CREATE_TOKEN_RECORD_FAILED, CREATE_TRANSACTION_FAILED,
    CREATE_VAULT_CUSTOMER_FAILED, GET_CUSTOMER_FAILED, GET_PAYMENTS_FAILED, LINK_CARD_FAILED,
    PROVIDER_NAME, UPDATE_TRANSACTION_FAILED,
};

/// A checkout plus the transaction fields Maya does not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRecordRequest {
    pub checkout: CheckoutRequest,
    pub app_source: String,
    pub app_source_user_id: String,
    pub service_id: String,
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedCheckout {
    pub checkout: CheckoutResponse,
    pub transaction: TransactionRow,
}

#[derive(Debug, Clone)]
pub struct SaveCardRequest {
    /// Local customer id (`customer_table`), not the Maya vault id.
    pub customer_id: String,
    pub card: CardDetails,
    pub is_default: bool,
    pub redirect_url: RedirectUrls,
    pub request_reference_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    pub card: CustomerCardRow,
    /// 3DS page the buyer must visit before the card can be charged.
    pub verification_url: Option<String>,
}

impl CheckoutKit {
    /// Create a hosted checkout and record it as a `PENDING` transaction
    /// keyed by the checkout's request reference number.
    pub async fn checkout_and_record(
        &self,
        request: &CheckoutRecordRequest,
    ) -> Envelope<RecordedCheckout> {
        let result = self.try_checkout_and_record(request).await;
        wrap::finish(self.log(), result)
    }

    async fn try_checkout_and_record(
        &self,
        request: &CheckoutRecordRequest,
    ) -> Result<RecordedCheckout, StepFailure> {
        let checkout = self
            .maya
            .create_checkout(&request.checkout)
            .await
            .map_err(step(CREATE_CHECKOUT_FAILED))?;

        let new = NewTransaction {
            transaction_reference_id: request.checkout.request_reference_number.clone(),
            transaction_app_source: request.app_source.clone(),
            transaction_app_source_user_id: request.app_source_user_id.clone(),
            transaction_service_id: request.service_id.clone(),
            transaction_service_name: request.service_name.clone(),
            transaction_total_amount: request.checkout.total_amount.value,
            ..Default::default()
        };

        let transaction = match self.db.create_transaction(&new) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(
                    checkout_id = %checkout.checkout_id,
                    reference_id = %new.transaction_reference_id,
                    "checkout created at maya but not recorded"
                );
                return Err(step(CREATE_TRANSACTION_FAILED)(e));
            }
        };

        Ok(RecordedCheckout {
            checkout,
            transaction,
        })
    }

    /// Vault a customer at Maya and link them to `user_id`. A user who
    /// already has a Maya customer record gets that record back.
    pub async fn register_customer(
        &self,
        user_id: &str,
        request: &CustomerRequest,
    ) -> Envelope<CustomerRow> {
        let result = self.try_register_customer(user_id, request).await;
        wrap::finish(self.log(), result)
    }

    async fn try_register_customer(
        &self,
        user_id: &str,
        request: &CustomerRequest,
    ) -> Result<CustomerRow, StepFailure> {
        if let Some(existing) = self
            .db
            .get_customer(user_id, PROVIDER_NAME)
            .map_err(step(GET_CUSTOMER_FAILED))?
        {
            tracing::debug!(user_id, customer_id = %existing.customer_id, "customer already registered");
            return Ok(existing);
        }

        let vault = self
            .maya
            .create_customer(request)
            .await
            .map_err(step(CREATE_VAULT_CUSTOMER_FAILED))?;

        self.db
            .create_customer(&NewCustomer {
                customer_id: None,
                customer_provider_id: vault.id,
                customer_provider_name: PROVIDER_NAME.to_string(),
                customer_user_id: user_id.to_string(),
            })
            .map_err(step(CREATE_CUSTOMER_FAILED))
    }

    /// Tokenize a card, vault it under the customer and record both the
    /// token and the card.
    pub async fn save_card(&self, request: &SaveCardRequest) -> Envelope<SavedCard> {
        let result = self.try_save_card(request).await;
        wrap::finish(self.log(), result)
    }

    async fn try_save_card(&self, request: &SaveCardRequest) -> Result<SavedCard, StepFailure> {
        let customer = self
            .db
            .get_customer_by_id(&request.customer_id)
            .map_err(step(GET_CUSTOMER_FAILED))?
            .ok_or_else(|| {
                step(GET_CUSTOMER_FAILED)(CheckoutError::NotFound(format!(
                    "customer {}",
                    request.customer_id
                )))
            })?;

        let token = self
            .maya
            .create_payment_token(&request.card)
            .await
            .map_err(step(CREATE_PAYMENT_TOKEN_FAILED))?;

        self.db
            .create_payment_token(&NewPaymentToken {
                payment_token_customer_id: customer.customer_id.clone(),
                payment_token_value: token.payment_token_id.clone(),
                payment_token_provider_name: PROVIDER_NAME.to_string(),
                payment_token_state: token.state.clone(),
            })
            .map_err(step(CREATE_TOKEN_RECORD_FAILED))?;

        let link = LinkCardRequest {
            payment_token_id: token.payment_token_id.clone(),
            is_default: request.is_default,
            redirect_url: request.redirect_url.clone(),
            request_reference_number: request.request_reference_number.clone(),
        };
        let linked = self
            .maya
            .link_card(&customer.customer_provider_id, &link)
            .await
            .map_err(step(LINK_CARD_FAILED))?;

        let card = self
            .db
            .create_customer_card(&NewCustomerCard {
                customer_card_id: None,
                customer_card_customer_id: customer.customer_id,
                customer_card_provider_id: linked.card_token_id,
                customer_card_provider_name: PROVIDER_NAME.to_string(),
                customer_card_token: token.payment_token_id,
            })
            .map_err(step(CREATE_CARD_FAILED))?;

        Ok(SavedCard {
            card,
            verification_url: linked.verification_url,
        })
    }

    /// Copy the status and channel of the most recent Maya payment for
    /// `reference_id` onto its transaction.
    pub async fn sync_transaction_status(&self, reference_id: &str) -> Envelope<TransactionRow> {
        let result = self.try_sync_transaction_status(reference_id).await;
        wrap::finish(self.log(), result)
    }

    async fn try_sync_transaction_status(
        &self,
        reference_id: &str,
    ) -> Result<TransactionRow, StepFailure> {
        let payments = self
            .maya
            .get_payments_by_reference(reference_id)
            .await
            .map_err(step(GET_PAYMENTS_FAILED))?;

        // Missing timestamps sort first; ties go to the later entry.
        let latest = payments
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .ok_or_else(|| {
                step(GET_PAYMENTS_FAILED)(CheckoutError::NotFound(format!(
                    "payments for {reference_id}"
                )))
            })?;

        tracing::debug!(
            reference_id,
            payment_id = %latest.id,
            status = %latest.status,
            "syncing transaction status"
        );

        let update = TransactionUpdate {
            transaction_status: Some(latest.status),
            transaction_payment_channel: latest.payment_scheme.map(Some),
            ..Default::default()
        };

        self.db
            .update_transaction(reference_id, &update)
            .map_err(step(UPDATE_TRANSACTION_FAILED))
    }
}
