use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Credentials, SANDBOX_PROGRAM_TOKEN};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

// base64("test-username:test-password")
const AUTH: &str = "Basic dGVzdC11c2VybmFtZTp0ZXN0LXBhc3N3b3Jk";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/rest/v3/users").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "INCORRECT_LOGIN_CREDENTIALS");
}

#[tokio::test]
async fn wrong_credentials_return_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/rest/v3/users")
                .header(http::header::AUTHORIZATION, "Basic dTpw")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn configured_credentials_are_accepted() {
    let app = app_with(Credentials::new("u", "p"));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/rest/v3/users")
                .header(http::header::AUTHORIZATION, "Basic dTpw")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// --- users ---

#[tokio::test]
async fn list_users_empty_is_no_content() {
    let resp = app().oneshot(get_request("/rest/v3/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/rest/v3/users",
            json!({"programToken": SANDBOX_PROGRAM_TOKEN, "firstName": "Ada"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = body_json(resp).await;
    assert_eq!(user["firstName"], "Ada");
    assert_eq!(user["status"], "PRE_ACTIVATED");
    assert!(user["token"].as_str().unwrap().starts_with("usr-"));
}

#[tokio::test]
async fn create_user_without_program_token_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/rest/v3/users", json!({"firstName": "Ada"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["fieldName"], "programToken");
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(get_request("/rest/v3/users/usr-missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "OBJECT_NOT_FOUND");
}

#[tokio::test]
async fn get_program_is_seeded() {
    let resp = app()
        .oneshot(get_request(&format!("/rest/v3/programs/{SANDBOX_PROGRAM_TOKEN}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let program = body_json(resp).await;
    assert_eq!(program["token"], SANDBOX_PROGRAM_TOKEN);
}

// --- full lifecycle ---

#[tokio::test]
async fn transfer_method_lifecycle() {
    let mut app = app().into_service();

    // create user
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/rest/v3/users",
            json!({"programToken": SANDBOX_PROGRAM_TOKEN}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = body_json(resp).await["token"].as_str().unwrap().to_string();

    // create two prepaid cards
    let mut cards = Vec::new();
    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                &format!("/rest/v3/users/{user}/prepaid-cards"),
                json!({"cardPackage": "DEFAULT"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let card = body_json(resp).await;
        assert_eq!(card["type"], "PREPAID_CARD");
        cards.push(card["token"].as_str().unwrap().to_string());
    }

    // list with limit: count reports the total, data only the page
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/rest/v3/users/{user}/prepaid-cards?limit=1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list = body_json(resp).await;
    assert_eq!(list["count"], 2);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    // a prepaid card is not reachable as a bank account
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/rest/v3/users/{user}/bank-accounts/{}", cards[0])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // suspend the first card
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/rest/v3/users/{user}/prepaid-cards/{}/status-transitions", cards[0]),
            json!({"transition": "SUSPENDED"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let transition = body_json(resp).await;
    assert_eq!(transition["fromStatus"], "ACTIVATED");
    assert_eq!(transition["toStatus"], "SUSPENDED");
    let transition_token = transition["token"].as_str().unwrap().to_string();

    // the card reflects the new status
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/rest/v3/users/{user}/prepaid-cards/{}", cards[0])))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status"], "SUSPENDED");

    // fetch the transition
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!(
            "/rest/v3/users/{user}/prepaid-cards/{}/status-transitions/{transition_token}",
            cards[0]
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["transition"], "SUSPENDED");

    // transition without a value is rejected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/rest/v3/users/{user}/prepaid-cards/{}/status-transitions", cards[1]),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // update keeps the token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/rest/v3/users/{user}"),
            json!({"token": "usr-other", "city": "Vancouver"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["token"], user.as_str());
    assert_eq!(updated["city"], "Vancouver");
}
