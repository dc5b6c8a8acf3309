//! Resource entities exchanged with the API.
//!
//! # Design
//! Each entity is a typed record: the attributes the API is known to send are
//! named `Option` fields (camelCase on the wire), and anything else is kept in
//! a flattened `extra` map so fields added server-side survive a
//! decode/encode cycle. `Resource` gives every entity the same
//! property-mapping constructor and accessor.
//!
//! Decoding is lenient: an entry that the typed field cannot reproduce
//! exactly (a number where a string is declared, an explicit `null`) is kept
//! in `extra` under its own key, so `properties()` always returns the mapping
//! the entity was built from.

mod bank_account;
mod payment;
mod prepaid_card;
mod program;
mod status_transition;
mod user;

pub use bank_account::BankAccount;
pub use payment::Payment;
pub use prepaid_card::PrepaidCard;
pub use program::Program;
pub use status_transition::{StatusTransition, Transition};
pub use user::User;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{HyperwalletError, Result};

pub trait Resource: Serialize + DeserializeOwned {
    /// Build the entity from a field mapping such as a decoded response body.
    fn from_properties(properties: Map<String, Value>) -> Result<Self> {
        let (typed, raw): (Map<String, Value>, Map<String, Value>) = properties
            .into_iter()
            .partition(|(key, value)| fits_typed_field::<Self>(key, value));
        let mut entity: Self = serde_json::from_value(Value::Object(typed))
            .map_err(|e| HyperwalletError::Deserialization(e.to_string()))?;
        entity.extra_mut().extend(raw);
        Ok(entity)
    }

    /// The entity's fields as a JSON mapping. Unset fields are omitted.
    fn properties(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    fn token(&self) -> Option<&str>;

    /// Attributes without a typed field, or whose value the field can't hold.
    fn extra_mut(&mut self) -> &mut Map<String, Value>;
}

/// Whether `key: value` decodes into `R` and encodes back to the same entry.
fn fits_typed_field<R: Resource>(key: &str, value: &Value) -> bool {
    let mut single = Map::new();
    single.insert(key.to_string(), value.clone());
    let single = Value::Object(single);
    serde_json::from_value::<R>(single.clone())
        .ok()
        .and_then(|entity| serde_json::to_value(entity).ok())
        .is_some_and(|encoded| encoded == single)
}
