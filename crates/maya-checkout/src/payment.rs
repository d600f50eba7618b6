//! Request payloads sent to the Maya API.
//!
//! Field names serialize in camelCase to match the gateway's schema.
//! Optional fields are omitted rather than sent as `null`.

use serde::{Deserialize, Serialize};

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Body of `POST /checkout/v1/checkouts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub total_amount: TotalAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<RedirectUrls>,
    pub request_reference_number: String,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
}

impl CheckoutRequest {
    /// A checkout with no buyer, no redirects and empty metadata.
    pub fn new(
        request_reference_number: impl Into<String>,
        total_amount: TotalAmount,
        items: Vec<Item>,
    ) -> Self {
        Self {
            total_amount,
            buyer: None,
            items,
            redirect_url: None,
            request_reference_number: request_reference_number.into(),
            metadata: empty_object(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalAmount {
    pub value: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AmountDetails>,
}

impl TotalAmount {
    pub fn php(value: f64) -> Self {
        Self {
            value,
            currency: "PHP".to_string(),
            details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AmountDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub shipping_type: ShippingType,
}

/// Standard or same-day shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingType {
    #[serde(rename = "ST")]
    Standard,
    #[serde(rename = "SD")]
    SameDay,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    pub total_amount: Amount,
}

impl Item {
    pub fn new(name: impl Into<String>, total: f64) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            code: None,
            description: None,
            amount: None,
            total_amount: Amount {
                value: total,
                details: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
}

/// Raw card details for `POST /payments/v1/payment-tokens`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last4: String = self
            .number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        f.debug_struct("CardDetails")
            .field("number", &format!("****{last4}"))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentTokenRequest<'a> {
    pub card: &'a CardDetails,
}

/// Body of `POST /payments/v1/customers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_since: Option<String>,
}

/// Body of `POST /payments/v1/customers/{id}/cards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCardRequest {
    pub payment_token_id: String,
    pub is_default: bool,
    pub redirect_url: RedirectUrls,
    pub request_reference_number: String,
}

/// Body of `POST /payments/v1/customers/{id}/cards/{token}/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentRequest {
    pub total_amount: TotalAmount,
    pub request_reference_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<RedirectUrls>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_wire_shape() {
        let mut request = CheckoutRequest::new(
            "REF-001",
            TotalAmount::php(150.0),
            vec![Item::new("Water bill", 150.0)],
        );
        request.redirect_url = Some(RedirectUrls {
            success: Some("https://shop.test/ok".to_string()),
            ..Default::default()
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requestReferenceNumber"], "REF-001");
        assert_eq!(json["totalAmount"]["value"], 150.0);
        assert_eq!(json["totalAmount"]["currency"], "PHP");
        assert_eq!(json["items"][0]["totalAmount"]["value"], 150.0);
        assert_eq!(json["redirectUrl"]["success"], "https://shop.test/ok");
        assert!(json["redirectUrl"].get("failure").is_none());
        assert!(json.get("buyer").is_none());
        assert_eq!(json["metadata"], serde_json::json!({}));
    }

    #[test]
    fn test_shipping_type_codes() {
        assert_eq!(serde_json::to_value(ShippingType::Standard).unwrap(), "ST");
        assert_eq!(serde_json::to_value(ShippingType::SameDay).unwrap(), "SD");
    }

    #[test]
    fn test_card_debug_masks_number() {
        let card = CardDetails {
            number: "5123456789012346".to_string(),
            exp_month: "12".to_string(),
            exp_year: "2030".to_string(),
            cvc: "111".to_string(),
        };
        let debug = format!("{card:?}");
        assert!(debug.contains("****2346"));
        assert!(!debug.contains("5123456789012346"));
        assert!(!debug.contains("111"));
    }
}
