//! Blocking client for the Hyperwallet REST API (v3).
//!
//! # Overview
//! `Hyperwallet` exposes one method per API operation on users, bank
//! accounts, prepaid cards, their status transitions, payments and programs.
//! Each call validates its path tokens, substitutes them into the endpoint's
//! URL template, sends a single request with HTTP Basic credentials and
//! decodes the JSON reply into a typed entity or a `ListResponse`.
//!
//! # Design
//! - `Hyperwallet` (facade) validates arguments and picks URL templates.
//! - `ApiClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values; the round-trip itself goes through an injected `Transport`.
//! - `UreqTransport` is the default transport; tests inject their own.
//! - Entities are typed records that keep unknown fields in `extra`.

pub mod api_client;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod list;
pub mod model;
pub mod transport;
pub mod uri_template;

pub use api_client::{ApiClient, QueryParams};
pub use client::Hyperwallet;
pub use config::{Config, DEFAULT_SERVER};
pub use error::{ErrorDetail, HyperwalletError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use list::ListResponse;
pub use model::{
    BankAccount, Payment, PrepaidCard, Program, Resource, StatusTransition, Transition, User,
};
pub use transport::UreqTransport;
