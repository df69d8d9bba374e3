use hsa_ledger_server::{app::build_app, config::Config, db};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, backed by a private in-memory store.
        let pool = db::create_in_memory_pool()
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let app = build_app(pool, &Config::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    async fn create_account(&self, email: &str) -> Value {
        let res = self
            .post("/accounts", json!({ "email": email, "name": "Test Holder" }))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn deposit(&self, account_id: i64, amount_cents: i64) -> reqwest::Response {
        self.post(
            &format!("/accounts/{}/deposit", account_id),
            json!({ "amount_cents": amount_cents }),
        )
        .await
    }

    async fn purchase(
        &self,
        account_id: i64,
        card_id: Option<i64>,
        mcc: &str,
        amount_cents: i64,
    ) -> reqwest::Response {
        self.post(
            &format!("/accounts/{}/transactions", account_id),
            json!({
                "card_id": card_id,
                "merchant": "Test Merchant",
                "mcc": mcc,
                "amount_cents": amount_cents,
            }),
        )
        .await
    }

    async fn balance(&self, account_id: i64) -> i64 {
        let account: Value = self
            .get(&format!("/accounts/{}", account_id))
            .await
            .json()
            .await
            .unwrap();
        account["balance_cents"].as_i64().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_reports_connected_database() {
    let server = TestServer::spawn().await;

    let res = server.get("/health").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn account_creation_is_idempotent_by_email() {
    let server = TestServer::spawn().await;

    let first = server.create_account("jane@example.com").await;
    let second = server.create_account("jane@example.com").await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["balance_cents"], 0);
    assert_eq!(first["email"], "jane@example.com");
    assert!(first["created_at"].is_string());

    let res = server
        .post("/accounts", json!({ "email": "not-an-email", "name": "X" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_account_is_404_everywhere() {
    let server = TestServer::spawn().await;

    assert_eq!(server.get("/accounts/404").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.deposit(404, 100).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        server.post("/accounts/404/cards", json!({})).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.get("/accounts/404/cards").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        server.purchase(404, None, "8011", 100).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server.get("/accounts/404/transactions").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.delete("/accounts/404").await.status(), StatusCode::NOT_FOUND);

    let body: Value = server.get("/accounts/404").await.json().await.unwrap();
    assert_eq!(body["error"]["code"], "account_not_found");
}

#[tokio::test]
async fn deposit_rejects_non_positive_amounts() {
    let server = TestServer::spawn().await;
    let id = server.create_account("jane@example.com").await["id"].as_i64().unwrap();

    assert_eq!(server.deposit(id, 0).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.deposit(id, -50).await.status(), StatusCode::BAD_REQUEST);

    let res = server.deposit(id, 5_000).await;
    assert_eq!(res.status(), StatusCode::OK);
    let account: Value = res.json().await.unwrap();
    assert_eq!(account["balance_cents"], 5_000);
}

#[tokio::test]
async fn cards_are_unique_and_listed_newest_first() {
    let server = TestServer::spawn().await;
    let id = server.create_account("jane@example.com").await["id"].as_i64().unwrap();

    let mut issued = Vec::new();
    for _ in 0..5 {
        let res = server.post(&format!("/accounts/{}/cards", id), json!({})).await;
        assert_eq!(res.status(), StatusCode::OK);
        let card: Value = res.json().await.unwrap();

        let number = card["card_number"].as_str().unwrap().to_string();
        assert_eq!(number.len(), 16);
        assert_eq!(card["last4_digits"].as_str().unwrap(), &number[12..]);
        assert_eq!(card["is_active"], true);
        assert_eq!(card["account_id"], id);
        issued.push((card["id"].as_i64().unwrap(), number));
    }

    let listed: Vec<Value> = server
        .get(&format!("/accounts/{}/cards", id))
        .await
        .json()
        .await
        .unwrap();
    let listed_ids: Vec<i64> = listed.iter().map(|c| c["id"].as_i64().unwrap()).collect();
    let expected: Vec<i64> = issued.iter().rev().map(|(card_id, _)| *card_id).collect();
    assert_eq!(listed_ids, expected);

    let mut numbers: Vec<&String> = issued.iter().map(|(_, n)| n).collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 5);
}

#[tokio::test]
async fn purchases_are_authorized_and_logged() {
    let server = TestServer::spawn().await;
    let id = server.create_account("jane@example.com").await["id"].as_i64().unwrap();
    let card: Value = server
        .post(&format!("/accounts/{}/cards", id), json!({}))
        .await
        .json()
        .await
        .unwrap();
    let card_id = card["id"].as_i64();

    server.deposit(id, 500).await;

    // Qualified but short on funds
    let res = server.purchase(id, card_id, "8011", 1_000).await;
    assert_eq!(res.status(), StatusCode::OK);
    let declined: Value = res.json().await.unwrap();
    assert_eq!(declined["is_approved"], false);
    assert_eq!(declined["rejection_reason"], "Insufficient funds");
    assert_eq!(server.balance(id).await, 500);

    // Not a qualified merchant
    let non_qualified: Value = server
        .purchase(id, card_id, "0000", 100)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(non_qualified["is_approved"], false);
    assert_eq!(non_qualified["rejection_reason"], "Non-qualified expense");
    assert_eq!(server.balance(id).await, 500);

    // Pharmacy with funds
    let approved: Value = server
        .purchase(id, card_id, "5912", 200)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(approved["is_approved"], true);
    assert!(approved["rejection_reason"].is_null());
    assert_eq!(approved["card_id"], card["id"]);
    assert_eq!(server.balance(id).await, 300);

    let history: Vec<Value> = server
        .get(&format!("/accounts/{}/transactions", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["id"], approved["id"]);
    assert_eq!(history[2]["id"], declined["id"]);
}

#[tokio::test]
async fn invalid_purchases_are_rejected_without_a_record() {
    let server = TestServer::spawn().await;
    let id = server.create_account("jane@example.com").await["id"].as_i64().unwrap();
    let other = server.create_account("other@example.com").await["id"].as_i64().unwrap();
    let foreign_card: Value = server
        .post(&format!("/accounts/{}/cards", other), json!({}))
        .await
        .json()
        .await
        .unwrap();
    server.deposit(id, 1_000).await;

    assert_eq!(
        server.purchase(id, None, "8011", 0).await.status(),
        StatusCode::BAD_REQUEST
    );
    let res = server.purchase(id, foreign_card["id"].as_i64(), "8011", 100).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Card not found or inactive");

    let history: Vec<Value> = server
        .get(&format!("/accounts/{}/transactions", id))
        .await
        .json()
        .await
        .unwrap();
    assert!(history.is_empty());
    assert_eq!(server.balance(id).await, 1_000);
}

#[tokio::test]
async fn deleting_card_and_account() {
    let server = TestServer::spawn().await;
    let id = server.create_account("jane@example.com").await["id"].as_i64().unwrap();
    let card: Value = server
        .post(&format!("/accounts/{}/cards", id), json!({}))
        .await
        .json()
        .await
        .unwrap();
    server.deposit(id, 1_000).await;
    server.purchase(id, card["id"].as_i64(), "8042", 100).await;

    let res = server
        .delete(&format!("/accounts/{}/cards/{}", id, card["id"]))
        .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let history: Vec<Value> = server
        .get(&format!("/accounts/{}/transactions", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0]["card_id"].is_null());

    assert_eq!(
        server.delete(&format!("/accounts/{}", id)).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        server.get(&format!("/accounts/{}", id)).await.status(),
        StatusCode::NOT_FOUND
    );

    // The email is free again and gets a fresh account
    let recreated = server.create_account("jane@example.com").await;
    assert_ne!(recreated["id"].as_i64().unwrap(), id);
    assert_eq!(recreated["balance_cents"], 0);
}
