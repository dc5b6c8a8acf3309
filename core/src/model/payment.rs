use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Resource;

/// A payment from a program to a user or transfer method.
///
/// `amount` is a decimal string as sent by the API (e.g. `"20.00"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_payment_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Payment {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}
