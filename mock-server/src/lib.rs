//! In-memory stand-in for the Hyperwallet `/rest/v3` API.
//!
//! Resources are stored as raw JSON objects so the server accepts whatever
//! fields a client sends. Lists answer `{count, offset, limit, data}` and
//! `204 No Content` when nothing matches, like the real API. Every request
//! must carry Basic credentials matching the server's `Credentials`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Program seeded into every new server.
pub const SANDBOX_PROGRAM_TOKEN: &str = "prg-sandbox";

const DEFAULT_LIMIT: usize = 10;

/// API user accepted by the Basic-auth check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether `header` is `Basic base64(username:password)` for these
    /// credentials.
    fn accepts(&self, header: &str) -> bool {
        let Some(encoded) = header.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = general_purpose::STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };
        decoded.split_once(':') == Some((self.username.as_str(), self.password.as_str()))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("test-username", "test-password")
    }
}

pub type Object = Map<String, Value>;

/// A resource nested under a parent (transfer method under a user,
/// transition under a transfer method).
struct Owned {
    owner: String,
    object: Object,
}

pub struct Store {
    users: Vec<Object>,
    transfer_methods: Vec<Owned>,
    transitions: Vec<Owned>,
    payments: Vec<Object>,
    programs: Vec<Object>,
}

impl Default for Store {
    fn default() -> Self {
        let program = json!({"token": SANDBOX_PROGRAM_TOKEN, "name": "Sandbox Program"});
        Self {
            users: Vec::new(),
            transfer_methods: Vec::new(),
            transitions: Vec::new(),
            payments: Vec::new(),
            programs: vec![into_object(program)],
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error body in the API's `{"errors": [...]}` format.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    field_name: Option<&'static str>,
}

impl ApiError {
    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "OBJECT_NOT_FOUND",
            message: format!("{what} not found"),
            field_name: None,
        }
    }

    fn missing(field: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "CONSTRAINT_VIOLATIONS",
            message: format!("{field} is required"),
            field_name: Some(field),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({"code": self.code, "message": self.message});
        if let Some(field_name) = self.field_name {
            error["fieldName"] = json!(field_name);
        }
        (self.status, Json(json!({"errors": [error]}))).into_response()
    }
}

type Created = (StatusCode, Json<Object>);

pub fn app() -> Router {
    app_with(Credentials::default())
}

pub fn app_with(credentials: Credentials) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/rest/v3/users", get(list_users).post(create_user))
        .route("/rest/v3/users/{user}", get(get_user).put(update_user))
        .route(
            "/rest/v3/users/{user}/bank-accounts",
            get(list_transfer_methods::<BankAccounts>).post(create_transfer_method::<BankAccounts>),
        )
        .route(
            "/rest/v3/users/{user}/bank-accounts/{method}",
            get(get_transfer_method::<BankAccounts>).put(update_transfer_method::<BankAccounts>),
        )
        .route(
            "/rest/v3/users/{user}/bank-accounts/{method}/status-transitions",
            get(list_transitions::<BankAccounts>).post(create_transition::<BankAccounts>),
        )
        .route(
            "/rest/v3/users/{user}/bank-accounts/{method}/status-transitions/{transition}",
            get(get_transition::<BankAccounts>),
        )
        .route(
            "/rest/v3/users/{user}/prepaid-cards",
            get(list_transfer_methods::<PrepaidCards>).post(create_transfer_method::<PrepaidCards>),
        )
        .route(
            "/rest/v3/users/{user}/prepaid-cards/{method}",
            get(get_transfer_method::<PrepaidCards>).put(update_transfer_method::<PrepaidCards>),
        )
        .route(
            "/rest/v3/users/{user}/prepaid-cards/{method}/status-transitions",
            get(list_transitions::<PrepaidCards>).post(create_transition::<PrepaidCards>),
        )
        .route(
            "/rest/v3/users/{user}/prepaid-cards/{method}/status-transitions/{transition}",
            get(get_transition::<PrepaidCards>),
        )
        .route("/rest/v3/payments", get(list_payments).post(create_payment))
        .route("/rest/v3/payments/{payment}", get(get_payment))
        .route("/rest/v3/programs/{program}", get(get_program))
        .layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            require_basic_auth,
        ))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Credentials::default()).await
}

pub async fn run_with(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(credentials)).await
}

async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| credentials.accepts(value));
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected request with missing or wrong credentials");
        return ApiError {
            status: StatusCode::UNAUTHORIZED,
            code: "INCORRECT_LOGIN_CREDENTIALS",
            message: "Invalid credentials".to_string(),
            field_name: None,
        }
        .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Transfer method kinds
// ---------------------------------------------------------------------------

trait TransferMethodKind: Send + Sync + 'static {
    const TYPE: &'static str;
    const NAME: &'static str;
}

struct BankAccounts;
struct PrepaidCards;

impl TransferMethodKind for BankAccounts {
    const TYPE: &'static str = "BANK_ACCOUNT";
    const NAME: &'static str = "bank account";
}

impl TransferMethodKind for PrepaidCards {
    const TYPE: &'static str = "PREPAID_CARD";
    const NAME: &'static str = "prepaid card";
}

/// Resulting status for a requested transition.
fn target_status(transition: &str) -> &str {
    match transition {
        "UNSUSPENDED" | "UNLOCKED" => "ACTIVATED",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn list_users(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    page(store.users.iter(), &params)
}

async fn create_user(
    State(db): State<Db>,
    Json(mut body): Json<Object>,
) -> Result<Created, ApiError> {
    require_field(&body, "programToken")?;
    let token = new_token("usr");
    tracing::debug!(%token, "created user");
    body.insert("token".into(), json!(token));
    body.insert("status".into(), json!("PRE_ACTIVATED"));
    db.write().await.users.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_user(
    State(db): State<Db>,
    Path(user): Path<String>,
) -> Result<Json<Object>, ApiError> {
    let store = db.read().await;
    find(&store.users, &user)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

async fn update_user(
    State(db): State<Db>,
    Path(user): Path<String>,
    Json(body): Json<Object>,
) -> Result<Json<Object>, ApiError> {
    let mut store = db.write().await;
    let existing = store
        .users
        .iter_mut()
        .find(|o| token_of(o) == Some(user.as_str()))
        .ok_or_else(|| ApiError::not_found("user"))?;
    merge(existing, body);
    Ok(Json(existing.clone()))
}

// ---------------------------------------------------------------------------
// Transfer methods
// ---------------------------------------------------------------------------

async fn list_transfer_methods<K: TransferMethodKind>(
    State(db): State<Db>,
    Path(user): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let store = db.read().await;
    find(&store.users, &user).ok_or_else(|| ApiError::not_found("user"))?;
    let methods = transfer_methods::<K>(&store, &user);
    Ok(page(methods, &params))
}

async fn create_transfer_method<K: TransferMethodKind>(
    State(db): State<Db>,
    Path(user): Path<String>,
    Json(mut body): Json<Object>,
) -> Result<Created, ApiError> {
    let mut store = db.write().await;
    find(&store.users, &user).ok_or_else(|| ApiError::not_found("user"))?;
    body.insert("token".into(), json!(new_token("trm")));
    body.insert("type".into(), json!(K::TYPE));
    body.insert("status".into(), json!("ACTIVATED"));
    store.transfer_methods.push(Owned {
        owner: user,
        object: body.clone(),
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_transfer_method<K: TransferMethodKind>(
    State(db): State<Db>,
    Path((user, method)): Path<(String, String)>,
) -> Result<Json<Object>, ApiError> {
    let store = db.read().await;
    let found = transfer_methods::<K>(&store, &user).find(|o| token_of(o) == Some(method.as_str()));
    found.cloned().map(Json).ok_or_else(|| ApiError::not_found(K::NAME))
}

async fn update_transfer_method<K: TransferMethodKind>(
    State(db): State<Db>,
    Path((user, method)): Path<(String, String)>,
    Json(body): Json<Object>,
) -> Result<Json<Object>, ApiError> {
    let mut store = db.write().await;
    let existing = transfer_method_mut::<K>(&mut store, &user, &method)
        .ok_or_else(|| ApiError::not_found(K::NAME))?;
    merge(existing, body);
    Ok(Json(existing.clone()))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

async fn list_transitions<K: TransferMethodKind>(
    State(db): State<Db>,
    Path((user, method)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let store = db.read().await;
    transfer_methods::<K>(&store, &user)
        .find(|o| token_of(o) == Some(method.as_str()))
        .ok_or_else(|| ApiError::not_found(K::NAME))?;
    let transitions = owned_by(&store.transitions, &method);
    Ok(page(transitions, &params))
}

async fn create_transition<K: TransferMethodKind>(
    State(db): State<Db>,
    Path((user, method)): Path<(String, String)>,
    Json(mut body): Json<Object>,
) -> Result<Created, ApiError> {
    let transition = body
        .get("transition")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::missing("transition"))?;

    let mut store = db.write().await;
    let parent = transfer_method_mut::<K>(&mut store, &user, &method)
        .ok_or_else(|| ApiError::not_found(K::NAME))?;
    let from_status = parent.get("status").cloned().unwrap_or(Value::Null);
    let to_status = target_status(&transition).to_string();
    tracing::debug!(%method, %transition, %to_status, "applied status transition");
    parent.insert("status".into(), json!(to_status));

    body.insert("token".into(), json!(new_token("sts")));
    body.insert("fromStatus".into(), from_status);
    body.insert("toStatus".into(), json!(to_status));
    store.transitions.push(Owned {
        owner: method,
        object: body.clone(),
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_transition<K: TransferMethodKind>(
    State(db): State<Db>,
    Path((user, method, transition)): Path<(String, String, String)>,
) -> Result<Json<Object>, ApiError> {
    let store = db.read().await;
    transfer_methods::<K>(&store, &user)
        .find(|o| token_of(o) == Some(method.as_str()))
        .ok_or_else(|| ApiError::not_found(K::NAME))?;
    let found = owned_by(&store.transitions, &method).find(|o| token_of(o) == Some(transition.as_str()));
    found
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("status transition"))
}

// ---------------------------------------------------------------------------
// Payments and programs
// ---------------------------------------------------------------------------

async fn list_payments(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let store = db.read().await;
    page(store.payments.iter(), &params)
}

async fn create_payment(
    State(db): State<Db>,
    Json(mut body): Json<Object>,
) -> Result<Created, ApiError> {
    for field in ["programToken", "amount", "currency", "destinationToken"] {
        require_field(&body, field)?;
    }
    body.insert("token".into(), json!(new_token("pmt")));
    body.insert("status".into(), json!("COMPLETED"));
    db.write().await.payments.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_payment(
    State(db): State<Db>,
    Path(payment): Path<String>,
) -> Result<Json<Object>, ApiError> {
    let store = db.read().await;
    find(&store.payments, &payment)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("payment"))
}

async fn get_program(
    State(db): State<Db>,
    Path(program): Path<String>,
) -> Result<Json<Object>, ApiError> {
    let store = db.read().await;
    find(&store.programs, &program)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("program"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_token(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn into_object(value: Value) -> Object {
    match value {
        Value::Object(map) => map,
        _ => Object::new(),
    }
}

fn token_of(object: &Object) -> Option<&str> {
    object.get("token").and_then(Value::as_str)
}

fn find<'a>(objects: &'a [Object], token: &str) -> Option<&'a Object> {
    objects.iter().find(|o| token_of(o) == Some(token))
}

fn owned_by<'a>(owned: &'a [Owned], owner: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
    owned
        .iter()
        .filter(move |o| o.owner == owner)
        .map(|o| &o.object)
}

fn transfer_methods<'a, K: TransferMethodKind>(
    store: &'a Store,
    user: &'a str,
) -> impl Iterator<Item = &'a Object> + 'a {
    owned_by(&store.transfer_methods, user)
        .filter(|o| o.get("type").and_then(Value::as_str) == Some(K::TYPE))
}

fn transfer_method_mut<'a, K: TransferMethodKind>(
    store: &'a mut Store,
    user: &str,
    method: &str,
) -> Option<&'a mut Object> {
    store
        .transfer_methods
        .iter_mut()
        .filter(|o| o.owner == user)
        .map(|o| &mut o.object)
        .find(|o| {
            o.get("type").and_then(Value::as_str) == Some(K::TYPE) && token_of(o) == Some(method)
        })
}

fn require_field(body: &Object, field: &'static str) -> Result<(), ApiError> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        Some(Value::Number(_)) => Ok(()),
        _ => Err(ApiError::missing(field)),
    }
}

/// Apply `changes` over `existing`; the token is immutable.
fn merge(existing: &mut Object, changes: Object) {
    for (key, value) in changes {
        if key != "token" {
            existing.insert(key, value);
        }
    }
}

/// Render one page of `objects`, filtered by every query parameter other
/// than `offset` and `limit`.
fn page<'a>(objects: impl Iterator<Item = &'a Object>, params: &HashMap<String, String>) -> Response {
    let offset = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0usize);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);

    let matching: Vec<&Object> = objects
        .filter(|o| {
            params
                .iter()
                .filter(|(key, _)| key.as_str() != "offset" && key.as_str() != "limit")
                .all(|(key, value)| o.get(key).and_then(Value::as_str) == Some(value.as_str()))
        })
        .collect();

    if matching.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let data: Vec<&Object> = matching.iter().skip(offset).take(limit).copied().collect();
    Json(json!({
        "count": matching.len(),
        "offset": offset,
        "limit": limit,
        "data": data,
    }))
    .into_response()
}
