use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use faishion_api::app::services::{seed_demo, AppServices};
use faishion_auth::{JwtClaims, Role};
use faishion_core::Username;
use faishion_infra::store::InMemoryStores;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over seeded in-memory stores, on an ephemeral port.
        let stores = InMemoryStores::new();
        seed_demo(&stores);
        let services = Arc::new(AppServices::from_in_memory(&stores));
        let app = faishion_api::app::build_app(JWT_SECRET.to_string(), services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(username: &str, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: Username::parse(username).unwrap(),
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn customer(username: &str) -> String {
    mint_jwt(username, vec![Role::USER])
}

fn seller(username: &str) -> String {
    mint_jwt(username, vec![Role::SELLER])
}

async fn save(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: serde_json::Value,
) -> reqwest::Response {
    client
        .post(srv.url("/qna/save"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn product_questions(
    client: &reqwest::Client,
    srv: &TestServer,
    product_id: i64,
    token: Option<&str>,
) -> Vec<serde_json::Value> {
    let mut req = client.get(srv.url(&format!("/qna/product/{product_id}")));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let res = req.send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public_and_whoami_needs_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reports_username_roles_and_permissions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(seller("shop"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "shop");
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "seller"));
    assert!(body["permissions"].as_array().unwrap().iter().any(|p| p == "qna.answer"));
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let now = Utc::now();
    let claims = JwtClaims {
        sub: Username::parse("alice").unwrap(),
        roles: vec![Role::USER],
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"other-secret"),
    )
    .unwrap();

    let res = client
        .get(srv.url("/qna/list"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn secret_question_is_masked_on_product_page() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 1, "title": "Private Q", "content": "order 123", "secret": true}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.text().await.unwrap(), "question registered");

    let for_alice = product_questions(&client, &srv, 1, Some(&customer("alice"))).await;
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0]["title"], "Private Q");
    assert_eq!(for_alice[0]["content"], "order 123");
    assert_eq!(for_alice[0]["is_author"], true);
    assert_eq!(for_alice[0]["user_name"], "alice");

    let for_bob = product_questions(&client, &srv, 1, Some(&customer("bob"))).await;
    assert_eq!(for_bob[0]["title"], "비밀글입니다");
    assert_eq!(for_bob[0]["content"], "🔒 비밀글입니다. 작성자만 열람할 수 있습니다.");
    assert_eq!(for_bob[0]["is_author"], false);
    assert_eq!(for_bob[0]["secret"], true);

    let anonymous = product_questions(&client, &srv, 1, None).await;
    assert_eq!(anonymous[0]["title"], "비밀글입니다");

    // Staff do not get an exception on the product page.
    let for_shop = product_questions(&client, &srv, 1, Some(&seller("shop"))).await;
    assert_eq!(for_shop[0]["title"], "비밀글입니다");

    let res = save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 1, "title": "Size?", "content": "Runs small?", "secret": false}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    for token in [Some(customer("bob")), None] {
        let listed = product_questions(&client, &srv, 1, token.as_deref()).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1]["title"], "Size?");
        assert_eq!(listed[1]["content"], "Runs small?");
        assert_eq!(listed[1]["secret"], false);
        assert_eq!(listed[1]["is_author"], false);
    }
}

#[tokio::test]
async fn malformed_json_bodies_get_json_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/qna"))
        .bearer_auth(customer("alice"))
        .json(&json!({"product_id": 1, "content": "no title"}))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let res = client
        .put(srv.url("/qna/1"))
        .bearer_auth(customer("alice"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn token_with_blank_subject_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let now = Utc::now();
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": "   ",
            "roles": ["user"],
            "issued_at": now,
            "expires_at": now + ChronoDuration::minutes(10),
        }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_rejects_unknown_product_and_non_customers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let body = json!({"product_id": 99, "title": "t", "content": "c"});

    let res = save(&client, &srv, &customer("alice"), body).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "product not found");

    // Valid token, but no customer account behind it.
    let body = json!({"product_id": 1, "title": "t", "content": "c"});
    let res = save(&client, &srv, &customer("mallory"), body.clone()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Sellers lack the ask permission.
    let res = save(&client, &srv, &seller("shop"), body.clone()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/qna/save"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 1, "title": "  ", "content": "c"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(product_questions(&client, &srv, 1, None).await.is_empty());
    assert!(product_questions(&client, &srv, 99, None).await.is_empty());
}

#[tokio::test]
async fn seller_answers_and_answer_stays_visible_when_masked() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 2, "title": "Refund", "content": "order 7", "secret": true}),
    )
    .await;
    let id = product_questions(&client, &srv, 2, None).await[0]["id"]
        .as_i64()
        .unwrap();
    let answer_url = srv.url(&format!("/qna/answer/{id}"));

    let res = client
        .put(&answer_url)
        .bearer_auth(seller("shop"))
        .json(&json!({"answer": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(&answer_url)
        .bearer_auth(customer("bob"))
        .json(&json!({"answer": "done"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Seller role but no seller account.
    let res = client
        .put(&answer_url)
        .bearer_auth(seller("impostor"))
        .json(&json!({"answer": "done"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url("/qna/answer/4242"))
        .bearer_auth(seller("shop"))
        .json(&json!({"answer": "done"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(&answer_url)
        .bearer_auth(seller("shop"))
        .json(&json!({"answer": "Refund issued"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "answer registered");

    let for_bob = product_questions(&client, &srv, 2, Some(&customer("bob"))).await;
    assert_eq!(for_bob[0]["title"], "비밀글입니다");
    assert_eq!(for_bob[0]["answer"], "Refund issued");

    let res = client
        .get(srv.url(&format!("/qna/{id}")))
        .bearer_auth(seller("shop"))
        .send()
        .await
        .unwrap();
    let detail: serde_json::Value = res.json().await.unwrap();
    assert_eq!(detail["title"], "Refund");
    assert_eq!(detail["answered_by"], "shop");
}

#[tokio::test]
async fn detail_masks_secret_text_for_anonymous_readers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 1, "title": "Private Q", "content": "body", "secret": true}),
    )
    .await;
    let id = product_questions(&client, &srv, 1, None).await[0]["id"]
        .as_i64()
        .unwrap();

    let res = client.get(srv.url(&format!("/qna/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: serde_json::Value = res.json().await.unwrap();
    assert_eq!(detail["title"], "비밀글입니다");
    assert_eq!(detail["is_author"], false);

    let res = client.get(srv.url("/qna/4242")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client.get(srv.url("/qna/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_pages_searches_and_hides_secret_matches() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let alice = customer("alice");

    for i in 0..3 {
        save(
            &client,
            &srv,
            &alice,
            json!({"product_id": 1, "title": format!("Sizing {i}"), "content": "fit?"}),
        )
        .await;
    }
    save(
        &client,
        &srv,
        &alice,
        json!({"product_id": 1, "title": "Sizing secret", "content": "private", "secret": true}),
    )
    .await;

    let res = client
        .get(srv.url("/qna/list?page=0&size=2&direction=asc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total_elements"], 4);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["content"].as_array().unwrap().len(), 2);
    assert_eq!(page["content"][0]["title"], "Sizing 0");

    let res = client.get(srv.url("/qna/list?q=SIZING")).send().await.unwrap();
    let anon: serde_json::Value = res.json().await.unwrap();
    assert_eq!(anon["total_elements"], 3);

    let res = client
        .get(srv.url("/qna/list?q=sizing"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    let mine: serde_json::Value = res.json().await.unwrap();
    assert_eq!(mine["total_elements"], 4);

    let res = client
        .get(srv.url("/qna/list?direction=sideways"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_author_or_admin_can_edit_and_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    save(
        &client,
        &srv,
        &customer("alice"),
        json!({"product_id": 3, "title": "Colour", "content": "Is it navy?"}),
    )
    .await;
    let id = product_questions(&client, &srv, 3, None).await[0]["id"]
        .as_i64()
        .unwrap();
    let url = srv.url(&format!("/qna/{id}"));
    let edit = json!({"title": "Colour?", "content": "Is it navy or black?"});

    let res = client.put(&url).json(&edit).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(&url)
        .bearer_auth(customer("bob"))
        .json(&edit)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(&url)
        .bearer_auth(customer("alice"))
        .json(&edit)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(product_questions(&client, &srv, 3, None).await[0]["title"], "Colour?");

    let res = client
        .delete(&url)
        .bearer_auth(customer("bob"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(&url)
        .bearer_auth(mint_jwt("ops", vec![Role::ADMIN]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(product_questions(&client, &srv, 3, None).await.is_empty());

    let res = client
        .delete(&url)
        .bearer_auth(customer("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn legacy_create_ignores_unknown_customers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let body = json!({"product_id": 2, "title": "Stock?", "content": "Back soon?"});

    let res = client
        .post(srv.url("/qna"))
        .bearer_auth(customer("mallory"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(product_questions(&client, &srv, 2, None).await.is_empty());

    let res = client
        .post(srv.url("/qna"))
        .bearer_auth(customer("bob"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed = product_questions(&client, &srv, 2, None).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["user_name"], "bob");

    let res = client
        .post(srv.url("/qna"))
        .bearer_auth(customer("bob"))
        .json(&json!({"title": "t", "content": "c"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
