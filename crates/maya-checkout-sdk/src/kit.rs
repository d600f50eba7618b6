//! `CheckoutKit`: every gateway and store operation behind the envelope.

use std::sync::Arc;

use checkout::{
    wrap, CardDetails, CardPaymentRequest, CheckoutError, CheckoutRequest, CheckoutResponse,
    CustomerRequest, Envelope, FailureLog, LinkCardRequest, LinkedCard, MayaClient, MayaConfig,
    Payment, PaymentToken, TracingLog, VaultCustomer,
};
use checkout_store::{
    AddressFilter, AddressLevel, AppSourceRow, BarangayRow, CityRow, CustomerCardRow, CustomerRow,
    CustomerUpdate, Database, NewCustomer, NewCustomerCard, NewPaymentToken, NewTransaction, Page,
    PaymentTokenRow, ProvinceRow, RegionRow, StoreConfig, TransactionQuery, TransactionRow,
    TransactionUpdate,
};

pub(crate) const CREATE_CHECKOUT_FAILED: &str = "Failed to create maya checkout";
pub(crate) const CREATE_PAYMENT_TOKEN_FAILED: &str = "Failed to create maya payment token";
pub(crate) const CREATE_VAULT_CUSTOMER_FAILED: &str = "Failed to create maya customer";
pub(crate) const LINK_CARD_FAILED: &str = "Failed to link card to maya customer";
pub(crate) const CARD_PAYMENT_FAILED: &str = "Failed to create maya card payment";
pub(crate) const GET_PAYMENTS_FAILED: &str = "Failed to get maya payments";

pub(crate) const CREATE_TRANSACTION_FAILED: &str = "Failed to create transaction record";
pub(crate) const UPDATE_TRANSACTION_FAILED: &str = "Failed to update transaction record";
pub(crate) const GET_TRANSACTION_FAILED: &str = "Failed to get transaction record";
const LIST_TRANSACTIONS_FAILED: &str = "Failed to get transaction list";
const CREATE_APP_SOURCE_FAILED: &str = "Failed to create app source";
const CREATE_APP_SOURCE_WITH_ID_FAILED: &str = "Failed to create app source with id";
const GET_APP_SOURCE_FAILED: &str = "Failed to get app source";
const LIST_APP_SOURCES_FAILED: &str = "Failed to get app sources";
pub(crate) const CREATE_CUSTOMER_FAILED: &str = "Failed to create customer record";
pub(crate) const GET_CUSTOMER_FAILED: &str = "Failed to get customer record";
const UPDATE_CUSTOMER_FAILED: &str = "Failed to update customer record";
pub(crate) const CREATE_CARD_FAILED: &str = "Failed to create customer card record";
const GET_CARD_FAILED: &str = "Failed to get customer card record";
const LIST_CARDS_FAILED: &str = "Failed to get customer cards";
const DELETE_CARD_FAILED: &str = "Failed to delete customer card record";
pub(crate) const CREATE_TOKEN_RECORD_FAILED: &str = "Failed to create payment token record";
const LIST_TOKEN_RECORDS_FAILED: &str = "Failed to get payment token records";
const CREATE_REGION_FAILED: &str = "Failed to create region";
const CREATE_PROVINCE_FAILED: &str = "Failed to create province";
const CREATE_CITY_FAILED: &str = "Failed to create city";
const CREATE_BARANGAY_FAILED: &str = "Failed to create barangay";
const LIST_ADDRESS_FAILED: &str = "Failed to get address list";
const SET_AVAILABILITY_FAILED: &str = "Failed to update address availability";

/// Provider name written to customer, card and token rows.
pub const PROVIDER_NAME: &str = "maya";

/// Maya gateway plus the relational store, with one failure log shared by
/// every call.
///
/// Gateway methods are `async`; store methods run synchronously on the
/// caller's thread.
pub struct CheckoutKit {
    pub(crate) maya: MayaClient,
    pub(crate) db: Database,
    pub(crate) log: Arc<dyn FailureLog>,
}

impl CheckoutKit {
    /// Logs failures through `tracing`. Use [`with_log`](Self::with_log) to
    /// capture or silence them instead.
    pub fn new(maya: MayaClient, db: Database) -> Self {
        Self {
            maya,
            db,
            log: Arc::new(TracingLog),
        }
    }

    pub fn with_log(mut self, log: Arc<dyn FailureLog>) -> Self {
        self.log = log;
        self
    }

    /// Build from `MAYA_*` and `CHECKOUT_DB_PATH`, loading `.env` first.
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let maya = MayaClient::new(MayaConfig::from_env()?);
        let store = StoreConfig::from_env();
        let db = Database::new(&store.db_path)?;

        tracing::info!(
            environment = ?maya.config().environment,
            db_path = %store.db_path,
            "checkout kit configured"
        );

        Ok(Self::new(maya, db))
    }

    pub fn maya(&self) -> &MayaClient {
        &self.maya
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub(crate) fn log(&self) -> &dyn FailureLog {
        self.log.as_ref()
    }

    // Gateway

    pub async fn create_checkout(&self, request: &CheckoutRequest) -> Envelope<CheckoutResponse> {
        wrap::call(self.log(), CREATE_CHECKOUT_FAILED, self.maya.create_checkout(request)).await
    }

    pub async fn create_payment_token(&self, card: &CardDetails) -> Envelope<PaymentToken> {
        wrap::call(
            self.log(),
            CREATE_PAYMENT_TOKEN_FAILED,
            self.maya.create_payment_token(card),
        )
        .await
    }

    pub async fn create_vault_customer(&self, request: &CustomerRequest) -> Envelope<VaultCustomer> {
        wrap::call(
            self.log(),
            CREATE_VAULT_CUSTOMER_FAILED,
            self.maya.create_customer(request),
        )
        .await
    }

    pub async fn link_card(
        &self,
        vault_customer_id: &str,
        request: &LinkCardRequest,
    ) -> Envelope<LinkedCard> {
        wrap::call(
            self.log(),
            LINK_CARD_FAILED,
            self.maya.link_card(vault_customer_id, request),
        )
        .await
    }

    pub async fn create_card_payment(
        &self,
        vault_customer_id: &str,
        card_token_id: &str,
        request: &CardPaymentRequest,
    ) -> Envelope<Payment> {
        wrap::call(
            self.log(),
            CARD_PAYMENT_FAILED,
            self.maya
                .create_card_payment(vault_customer_id, card_token_id, request),
        )
        .await
    }

    pub async fn get_payments_by_reference(&self, reference_number: &str) -> Envelope<Vec<Payment>> {
        wrap::call(
            self.log(),
            GET_PAYMENTS_FAILED,
            self.maya.get_payments_by_reference(reference_number),
        )
        .await
    }

    // Transactions

    pub fn create_transaction(&self, new: &NewTransaction) -> Envelope<TransactionRow> {
        wrap::call_blocking(self.log(), CREATE_TRANSACTION_FAILED, || {
            self.db.create_transaction(new)
        })
    }

    pub fn update_transaction(
        &self,
        reference_id: &str,
        update: &TransactionUpdate,
    ) -> Envelope<TransactionRow> {
        wrap::call_blocking(self.log(), UPDATE_TRANSACTION_FAILED, || {
            self.db.update_transaction(reference_id, update)
        })
    }

    /// Exactly one transaction by reference id; a missing row is an error.
    pub fn get_transaction(&self, reference_id: &str) -> Envelope<TransactionRow> {
        wrap::call_blocking(self.log(), GET_TRANSACTION_FAILED, || {
            self.db.get_transaction(reference_id)?.ok_or_else(|| {
                CheckoutError::NotFound(format!("transaction {reference_id}"))
            })
        })
    }

    pub fn list_transactions(&self, query: &TransactionQuery) -> Envelope<Page<TransactionRow>> {
        wrap::call_blocking(self.log(), LIST_TRANSACTIONS_FAILED, || {
            self.db.list_transactions(query)
        })
    }

    // App sources

    pub fn create_app_source(&self, name: &str) -> Envelope<AppSourceRow> {
        wrap::call_blocking(self.log(), CREATE_APP_SOURCE_FAILED, || {
            self.db.create_app_source(name)
        })
    }

    pub fn create_app_source_with_id(
        &self,
        app_source_id: &str,
        name: &str,
    ) -> Envelope<AppSourceRow> {
        wrap::call_blocking(self.log(), CREATE_APP_SOURCE_WITH_ID_FAILED, || {
            self.db.create_app_source_with_id(app_source_id, name)
        })
    }

    pub fn get_app_source(&self, app_source_id: &str) -> Envelope<Option<AppSourceRow>> {
        wrap::call_blocking(self.log(), GET_APP_SOURCE_FAILED, || {
            self.db.get_app_source(app_source_id)
        })
    }

    pub fn list_app_sources(&self) -> Envelope<Vec<AppSourceRow>> {
        wrap::call_blocking(self.log(), LIST_APP_SOURCES_FAILED, || {
            self.db.list_app_sources()
        })
    }

    // Customers, cards and payment tokens

    pub fn create_customer(&self, new: &NewCustomer) -> Envelope<CustomerRow> {
        wrap::call_blocking(self.log(), CREATE_CUSTOMER_FAILED, || {
            self.db.create_customer(new)
        })
    }

    /// The user's customer record at Maya, if there is one.
    pub fn get_customer(&self, user_id: &str) -> Envelope<Option<CustomerRow>> {
        wrap::call_blocking(self.log(), GET_CUSTOMER_FAILED, || {
            self.db.get_customer(user_id, PROVIDER_NAME)
        })
    }

    pub fn get_customer_by_id(&self, customer_id: &str) -> Envelope<CustomerRow> {
        wrap::call_blocking(self.log(), GET_CUSTOMER_FAILED, || {
            self.db
                .get_customer_by_id(customer_id)?
                .ok_or_else(|| CheckoutError::NotFound(format!("customer {customer_id}")))
        })
    }

    pub fn update_customer(&self, customer_id: &str, update: &CustomerUpdate) -> Envelope<CustomerRow> {
        wrap::call_blocking(self.log(), UPDATE_CUSTOMER_FAILED, || {
            self.db.update_customer(customer_id, update)
        })
    }

    pub fn create_customer_card(&self, new: &NewCustomerCard) -> Envelope<CustomerCardRow> {
        wrap::call_blocking(self.log(), CREATE_CARD_FAILED, || {
            self.db.create_customer_card(new)
        })
    }

    pub fn get_customer_card(&self, card_id: &str) -> Envelope<CustomerCardRow> {
        wrap::call_blocking(self.log(), GET_CARD_FAILED, || {
            self.db
                .get_customer_card(card_id)?
                .ok_or_else(|| CheckoutError::NotFound(format!("customer card {card_id}")))
        })
    }

    pub fn list_customer_cards(&self, customer_id: &str) -> Envelope<Vec<CustomerCardRow>> {
        wrap::call_blocking(self.log(), LIST_CARDS_FAILED, || {
            self.db.list_customer_cards(customer_id)
        })
    }

    pub fn delete_customer_card(&self, card_id: &str) -> Envelope<()> {
        wrap::call_blocking(self.log(), DELETE_CARD_FAILED, || {
            self.db.delete_customer_card(card_id)
        })
    }

    pub fn create_payment_token_record(&self, new: &NewPaymentToken) -> Envelope<PaymentTokenRow> {
        wrap::call_blocking(self.log(), CREATE_TOKEN_RECORD_FAILED, || {
            self.db.create_payment_token(new)
        })
    }

    pub fn list_payment_token_records(&self, customer_id: &str) -> Envelope<Vec<PaymentTokenRow>> {
        wrap::call_blocking(self.log(), LIST_TOKEN_RECORDS_FAILED, || {
            self.db.list_payment_tokens(customer_id)
        })
    }

    // Addresses

    pub fn create_region(&self, name: &str) -> Envelope<RegionRow> {
        wrap::call_blocking(self.log(), CREATE_REGION_FAILED, || {
            self.db.create_region(name)
        })
    }

    /// A missing `region_id` is rejected by the foreign key.
    pub fn create_province(&self, region_id: &str, name: &str) -> Envelope<ProvinceRow> {
        wrap::call_blocking(self.log(), CREATE_PROVINCE_FAILED, || {
            self.db.create_province(region_id, name)
        })
    }

    pub fn create_city(&self, province_id: &str, name: &str) -> Envelope<CityRow> {
        wrap::call_blocking(self.log(), CREATE_CITY_FAILED, || {
            self.db.create_city(province_id, name)
        })
    }

    pub fn create_barangay(
        &self,
        city_id: &str,
        name: &str,
        zip_code: &str,
    ) -> Envelope<BarangayRow> {
        wrap::call_blocking(self.log(), CREATE_BARANGAY_FAILED, || {
            self.db.create_barangay(city_id, name, zip_code)
        })
    }

    pub fn list_regions(&self, filter: AddressFilter) -> Envelope<Vec<RegionRow>> {
        wrap::call_blocking(self.log(), LIST_ADDRESS_FAILED, || {
            self.db.list_regions(filter)
        })
    }

    pub fn list_provinces(&self, region_id: &str, filter: AddressFilter) -> Envelope<Vec<ProvinceRow>> {
        wrap::call_blocking(self.log(), LIST_ADDRESS_FAILED, || {
            self.db.list_provinces(region_id, filter)
        })
    }

    pub fn list_cities(&self, province_id: &str, filter: AddressFilter) -> Envelope<Vec<CityRow>> {
        wrap::call_blocking(self.log(), LIST_ADDRESS_FAILED, || {
            self.db.list_cities(province_id, filter)
        })
    }

    pub fn list_barangays(&self, city_id: &str, filter: AddressFilter) -> Envelope<Vec<BarangayRow>> {
        wrap::call_blocking(self.log(), LIST_ADDRESS_FAILED, || {
            self.db.list_barangays(city_id, filter)
        })
    }

    pub fn set_availability(
        &self,
        level: AddressLevel,
        id: &str,
        is_available: bool,
        is_disabled: bool,
    ) -> Envelope<()> {
        wrap::call_blocking(self.log(), SET_AVAILABILITY_FAILED, || {
            self.db.set_availability(level, id, is_available, is_disabled)
        })
    }
}
