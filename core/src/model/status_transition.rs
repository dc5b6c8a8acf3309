use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Resource;

/// Transition values accepted by status-transition endpoints.
///
/// Values the client does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Transition {
    Activated,
    Verified,
    Invalid,
    DeActivated,
    Declined,
    Locked,
    Unlocked,
    Suspended,
    Unsuspended,
    LostOrStolen,
    ComplianceHold,
    KycHold,
    Other(String),
}

impl Transition {
    pub fn as_str(&self) -> &str {
        match self {
            Transition::Activated => "ACTIVATED",
            Transition::Verified => "VERIFIED",
            Transition::Invalid => "INVALID",
            Transition::DeActivated => "DE_ACTIVATED",
            Transition::Declined => "DECLINED",
            Transition::Locked => "LOCKED",
            Transition::Unlocked => "UNLOCKED",
            Transition::Suspended => "SUSPENDED",
            Transition::Unsuspended => "UNSUSPENDED",
            Transition::LostOrStolen => "LOST_OR_STOLEN",
            Transition::ComplianceHold => "COMPLIANCE_HOLD",
            Transition::KycHold => "KYC_HOLD",
            Transition::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for Transition {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVATED" => Transition::Activated,
            "VERIFIED" => Transition::Verified,
            "INVALID" => Transition::Invalid,
            "DE_ACTIVATED" => Transition::DeActivated,
            "DECLINED" => Transition::Declined,
            "LOCKED" => Transition::Locked,
            "UNLOCKED" => Transition::Unlocked,
            "SUSPENDED" => Transition::Suspended,
            "UNSUSPENDED" => Transition::Unsuspended,
            "LOST_OR_STOLEN" => Transition::LostOrStolen,
            "COMPLIANCE_HOLD" => Transition::ComplianceHold,
            "KYC_HOLD" => Transition::KycHold,
            _ => Transition::Other(value),
        }
    }
}

impl From<Transition> for String {
    fn from(value: Transition) -> Self {
        match value {
            Transition::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change requested on a bank account or prepaid card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusTransition {
    pub fn new(transition: Transition) -> Self {
        Self {
            transition: Some(transition),
            ..Self::default()
        }
    }
}

impl Resource for StatusTransition {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}
