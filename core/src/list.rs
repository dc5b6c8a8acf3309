//! Paginated list responses.

use std::ops::Index;

use serde_json::{Map, Value};

use crate::error::{HyperwalletError, Result};
use crate::model::Resource;

/// One page of a list endpoint.
///
/// `count` is the server's total and is kept verbatim; it can exceed
/// `len()`, which only reflects the entries on this page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    count: u64,
    data: Vec<T>,
}

impl<T: Resource> ListResponse<T> {
    /// Decode `{"count": n, "data": [...]}`.
    ///
    /// An empty mapping (the API answers `204 No Content` for empty lists)
    /// yields an empty page with a count of zero.
    pub fn from_properties(mut properties: Map<String, Value>) -> Result<Self> {
        let count = match properties.get("count") {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_u64().ok_or_else(|| {
                HyperwalletError::Deserialization(format!(
                    "list count must be a non-negative integer, got {value}"
                ))
            })?,
        };

        let data = match properties.remove("data") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => T::from_properties(map),
                    other => Err(HyperwalletError::Deserialization(format!(
                        "list entry must be an object, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(HyperwalletError::Deserialization(format!(
                    "list data must be an array, got {other}"
                )))
            }
        };

        Ok(Self { count, data })
    }
}

impl<T> ListResponse<T> {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<usize> for ListResponse<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IntoIterator for ListResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ListResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
