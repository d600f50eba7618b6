//! Vault customers, their cards, and the payment tokens issued for them.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{new_id, now_timestamp, Database};
use crate::error::StoreError;

const CUSTOMER_COLUMNS: &str =
    "customer_id, customer_provider_id, customer_provider_name, customer_user_id";

const CARD_COLUMNS: &str = "customer_card_id, customer_card_customer_id, \
    customer_card_provider_id, customer_card_provider_name, customer_card_token";

const TOKEN_COLUMNS: &str = "payment_token_id, payment_token_customer_id, payment_token_value, \
    payment_token_provider_name, payment_token_state, payment_token_date_created";

/// Links a local user to their customer record at a payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub customer_id: String,
    /// The provider's id for this customer (e.g. the Maya vault customer id).
    pub customer_provider_id: String,
    pub customer_provider_name: String,
    pub customer_user_id: String,
}

impl CustomerRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            customer_id: row.get(0)?,
            customer_provider_id: row.get(1)?,
            customer_provider_name: row.get(2)?,
            customer_user_id: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_id: Option<String>,
    pub customer_provider_id: String,
    pub customer_provider_name: String,
    pub customer_user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub customer_provider_id: Option<String>,
    pub customer_provider_name: Option<String>,
    pub customer_user_id: Option<String>,
}

/// A card vaulted at the provider for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCardRow {
    pub customer_card_id: String,
    pub customer_card_customer_id: String,
    /// The provider's id for the vaulted card (Maya `cardTokenId`).
    pub customer_card_provider_id: String,
    pub customer_card_provider_name: String,
    /// The payment token the card was vaulted from.
    pub customer_card_token: String,
}

impl CustomerCardRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            customer_card_id: row.get(0)?,
            customer_card_customer_id: row.get(1)?,
            customer_card_provider_id: row.get(2)?,
            customer_card_provider_name: row.get(3)?,
            customer_card_token: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomerCard {
    pub customer_card_id: Option<String>,
    pub customer_card_customer_id: String,
    pub customer_card_provider_id: String,
    pub customer_card_provider_name: String,
    pub customer_card_token: String,
}

/// A card payment token issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTokenRow {
    pub payment_token_id: String,
    pub payment_token_customer_id: String,
    /// The provider's token value (Maya `paymentTokenId`).
    pub payment_token_value: String,
    pub payment_token_provider_name: String,
    pub payment_token_state: Option<String>,
    pub payment_token_date_created: String,
}

impl PaymentTokenRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            payment_token_id: row.get(0)?,
            payment_token_customer_id: row.get(1)?,
            payment_token_value: row.get(2)?,
            payment_token_provider_name: row.get(3)?,
            payment_token_state: row.get(4)?,
            payment_token_date_created: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentToken {
    pub payment_token_customer_id: String,
    pub payment_token_value: String,
    pub payment_token_provider_name: String,
    pub payment_token_state: Option<String>,
}

impl Database {
    pub fn create_customer(&self, new: &NewCustomer) -> Result<CustomerRow, StoreError> {
        let conn = self.conn()?;
        let row = CustomerRow {
            customer_id: new.customer_id.clone().unwrap_or_else(new_id),
            customer_provider_id: new.customer_provider_id.clone(),
            customer_provider_name: new.customer_provider_name.clone(),
            customer_user_id: new.customer_user_id.clone(),
        };

        conn.execute(
            &format!("INSERT INTO customer_table ({CUSTOMER_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
            params![
                row.customer_id,
                row.customer_provider_id,
                row.customer_provider_name,
                row.customer_user_id
            ],
        )?;

        Ok(row)
    }

    pub fn get_customer_by_id(&self, customer_id: &str) -> Result<Option<CustomerRow>, StoreError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customer_table WHERE customer_id = ?1"),
                params![customer_id],
                CustomerRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    /// The customer record a user holds at a given provider.
    pub fn get_customer(
        &self,
        user_id: &str,
        provider_name: &str,
    ) -> Result<Option<CustomerRow>, StoreError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!(
                    "SELECT {CUSTOMER_COLUMNS} FROM customer_table \
                     WHERE customer_user_id = ?1 AND customer_provider_name = ?2 \
                     ORDER BY rowid ASC LIMIT 1"
                ),
                params![user_id, provider_name],
                CustomerRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    pub fn update_customer(
        &self,
        customer_id: &str,
        update: &CustomerUpdate,
    ) -> Result<CustomerRow, StoreError> {
        let conn = self.conn()?;

        let rows_affected = conn.execute(
            r#"
            UPDATE customer_table
            SET customer_provider_id = COALESCE(?2, customer_provider_id),
                customer_provider_name = COALESCE(?3, customer_provider_name),
                customer_user_id = COALESCE(?4, customer_user_id)
            WHERE customer_id = ?1
            "#,
            params![
                customer_id,
                update.customer_provider_id,
                update.customer_provider_name,
                update.customer_user_id
            ],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(format!("customer {customer_id}")));
        }

        conn.query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customer_table WHERE customer_id = ?1"),
            params![customer_id],
            CustomerRow::from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))
    }

    pub fn create_customer_card(&self, new: &NewCustomerCard) -> Result<CustomerCardRow, StoreError> {
        let conn = self.conn()?;
        let row = CustomerCardRow {
            customer_card_id: new.customer_card_id.clone().unwrap_or_else(new_id),
            customer_card_customer_id: new.customer_card_customer_id.clone(),
            customer_card_provider_id: new.customer_card_provider_id.clone(),
            customer_card_provider_name: new.customer_card_provider_name.clone(),
            customer_card_token: new.customer_card_token.clone(),
        };

        conn.execute(
            &format!("INSERT INTO customer_card_table ({CARD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                row.customer_card_id,
                row.customer_card_customer_id,
                row.customer_card_provider_id,
                row.customer_card_provider_name,
                row.customer_card_token
            ],
        )?;

        Ok(row)
    }

    pub fn get_customer_card(&self, card_id: &str) -> Result<Option<CustomerCardRow>, StoreError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM customer_card_table WHERE customer_card_id = ?1"),
                params![card_id],
                CustomerCardRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    /// Cards for a customer in the order they were saved.
    pub fn list_customer_cards(&self, customer_id: &str) -> Result<Vec<CustomerCardRow>, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM customer_card_table \
             WHERE customer_card_customer_id = ?1 ORDER BY rowid ASC"
        ))?;
        let rows = stmt
            .query_map(params![customer_id], CustomerCardRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn delete_customer_card(&self, card_id: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let rows_affected = conn.execute(
            "DELETE FROM customer_card_table WHERE customer_card_id = ?1",
            params![card_id],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(format!("customer card {card_id}")));
        }

        Ok(())
    }

    pub fn create_payment_token(&self, new: &NewPaymentToken) -> Result<PaymentTokenRow, StoreError> {
        let conn = self.conn()?;
        let row = PaymentTokenRow {
            payment_token_id: new_id(),
            payment_token_customer_id: new.payment_token_customer_id.clone(),
            payment_token_value: new.payment_token_value.clone(),
            payment_token_provider_name: new.payment_token_provider_name.clone(),
            payment_token_state: new.payment_token_state.clone(),
            payment_token_date_created: now_timestamp(),
        };

        conn.execute(
            &format!("INSERT INTO payment_token_table ({TOKEN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                row.payment_token_id,
                row.payment_token_customer_id,
                row.payment_token_value,
                row.payment_token_provider_name,
                row.payment_token_state,
                row.payment_token_date_created
            ],
        )?;

        Ok(row)
    }

    /// Payment tokens for a customer, newest first.
    pub fn list_payment_tokens(&self, customer_id: &str) -> Result<Vec<PaymentTokenRow>, StoreError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM payment_token_table \
             WHERE payment_token_customer_id = ?1 \
             ORDER BY payment_token_date_created DESC, rowid DESC"
        ))?;
        let rows = stmt
            .query_map(params![customer_id], PaymentTokenRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(db: &Database, user: &str) -> CustomerRow {
        db.create_customer(&NewCustomer {
            customer_provider_id: format!("maya-{user}"),
            customer_provider_name: "maya".to_string(),
            customer_user_id: user.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_get_customer_by_user_and_provider() {
        let db = Database::new(":memory:").unwrap();
        let created = customer(&db, "user-1");

        assert_eq!(db.get_customer("user-1", "maya").unwrap().unwrap(), created);
        assert!(db.get_customer("user-1", "gcash").unwrap().is_none());
        assert!(db.get_customer("user-2", "maya").unwrap().is_none());
        assert_eq!(db.get_customer_by_id(&created.customer_id).unwrap().unwrap(), created);
    }

    #[test]
    fn test_update_customer_keeps_unset_fields() {
        let db = Database::new(":memory:").unwrap();
        let created = customer(&db, "user-1");

        let updated = db
            .update_customer(
                &created.customer_id,
                &CustomerUpdate {
                    customer_provider_id: Some("maya-new".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.customer_provider_id, "maya-new");
        assert_eq!(updated.customer_user_id, "user-1");

        let err = db.update_customer("missing", &CustomerUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_cards_listed_per_customer() {
        let db = Database::new(":memory:").unwrap();
        let alice = customer(&db, "alice");
        let bob = customer(&db, "bob");

        for (owner, card) in [(&alice, "card-1"), (&alice, "card-2"), (&bob, "card-3")] {
            db.create_customer_card(&NewCustomerCard {
                customer_card_customer_id: owner.customer_id.clone(),
                customer_card_provider_id: card.to_string(),
                customer_card_provider_name: "maya".to_string(),
                customer_card_token: format!("tok-{card}"),
                ..Default::default()
            })
            .unwrap();
        }

        let cards = db.list_customer_cards(&alice.customer_id).unwrap();
        let ids: Vec<_> = cards.iter().map(|c| c.customer_card_provider_id.as_str()).collect();
        assert_eq!(ids, vec!["card-1", "card-2"]);

        db.delete_customer_card(&cards[0].customer_card_id).unwrap();
        assert_eq!(db.list_customer_cards(&alice.customer_id).unwrap().len(), 1);
        assert!(db.get_customer_card(&cards[0].customer_card_id).unwrap().is_none());

        let err = db.delete_customer_card(&cards[0].customer_card_id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_card_requires_existing_customer() {
        let db = Database::new(":memory:").unwrap();
        let result = db.create_customer_card(&NewCustomerCard {
            customer_card_customer_id: "ghost".to_string(),
            customer_card_provider_id: "card-1".to_string(),
            customer_card_provider_name: "maya".to_string(),
            customer_card_token: "tok".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn test_payment_tokens_newest_first() {
        let db = Database::new(":memory:").unwrap();
        let alice = customer(&db, "alice");

        for value in ["tok-1", "tok-2"] {
            db.create_payment_token(&NewPaymentToken {
                payment_token_customer_id: alice.customer_id.clone(),
                payment_token_value: value.to_string(),
                payment_token_provider_name: "maya".to_string(),
                payment_token_state: Some("AVAILABLE".to_string()),
            })
            .unwrap();
        }

        let tokens = db.list_payment_tokens(&alice.customer_id).unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.payment_token_value.as_str()).collect();
        assert_eq!(values, vec!["tok-2", "tok-1"]);
    }
}
