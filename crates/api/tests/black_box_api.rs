use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use beadstock_infra::{InMemoryInventoryStore, InfraConfig};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    store: Arc<InMemoryInventoryStore>,
    handle: tokio::task::JoinHandle<()>,
    _seed: tempfile::NamedTempFile,
}

impl TestServer {
    async fn spawn(seed_codes: &[&str]) -> Self {
        Self::spawn_with(seed_codes, true).await
    }

    async fn spawn_with(seed_codes: &[&str], reachable: bool) -> Self {
        let mut seed = tempfile::NamedTempFile::new().expect("failed to create seed file");
        for code in seed_codes {
            writeln!(seed, "{code}").unwrap();
        }

        let config = InfraConfig {
            seed_path: seed.path().to_path_buf(),
            probe_timeout: Duration::from_millis(500),
            demo_rng_seed: Some(7),
            ..InfraConfig::default()
        };

        let store = Arc::new(InMemoryInventoryStore::new());
        store.set_reachable(reachable);

        // Same router as prod, bound to an ephemeral port.
        let app = beadstock_api::app::build_app_with_store(config, store.clone()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
            _seed: seed,
        }
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

async fn json_of(res: reqwest::Response) -> Value {
    res.json().await.unwrap()
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> reqwest::Response {
    client.post(srv.url("/api/inventory")).json(&body).send().await.unwrap()
}

fn codes(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["code"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let srv = TestServer::spawn(&[]).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_store_is_seeded_on_startup() {
    let srv = TestServer::spawn(&["A1", "A2"]).await;

    let body = json_of(reqwest::get(srv.url("/api/inventory")).await.unwrap()).await;
    assert_eq!(body["source"], "live");
    assert_eq!(codes(&body["data"]), vec!["A1", "A2"]);
    assert!(body["data"].as_array().unwrap().iter().all(|i| i["quantity"] == 0));

    let status = json_of(reqwest::get(srv.url("/api/status")).await.unwrap()).await;
    assert_eq!(status["state"], "connected");
    assert_eq!(status["records"], 2);
    assert_eq!(status["seed_asset_present"], true);
}

#[tokio::test]
async fn inventory_lifecycle_create_adjust_set_delete() {
    let srv = TestServer::spawn(&[]).await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({"code": "B7", "quantity": "5"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let item = json_of(res).await;
    assert_eq!(item["code"], "B7");
    assert_eq!(item["quantity"], 5);
    let id = item["id"].as_str().unwrap().to_string();

    let res = client
        .patch(srv.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({"direction": "increase", "amount": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_of(res).await["quantity"], 8);

    let res = client
        .patch(srv.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({"operation": "subtract", "amount": 8}))
        .send()
        .await
        .unwrap();
    assert_eq!(json_of(res).await["quantity"], 0);

    let res = client
        .put(srv.url(&format!("/api/inventory/{id}")))
        .json(&json!({"quantity": 12}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_of(res).await["quantity"], 12);

    let fetched = json_of(reqwest::get(srv.url(&format!("/api/inventory/{id}"))).await.unwrap()).await;
    assert_eq!(fetched["source"], "live");
    assert_eq!(fetched["data"]["quantity"], 12);

    let res = client.delete(srv.url(&format!("/api/inventory/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(srv.url(&format!("/api/inventory/{id}"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(res).await["error"], "not_found");
}

#[tokio::test]
async fn create_normalizes_negative_and_garbage_quantities() {
    let srv = TestServer::spawn(&[]).await;
    let client = reqwest::Client::new();

    let negative = json_of(create(&client, &srv, json!({"code": "N1", "quantity": -4})).await).await;
    assert_eq!(negative["quantity"], 0);

    let garbage = json_of(create(&client, &srv, json!({"code": "N2", "quantity": "lots"})).await).await;
    assert_eq!(garbage["quantity"], 0);

    let missing = json_of(create(&client, &srv, json!({"code": "N3"})).await).await;
    assert_eq!(missing["quantity"], 0);
}

#[tokio::test]
async fn duplicate_code_is_conflict() {
    let srv = TestServer::spawn(&["A1"]).await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({"code": "A1", "quantity": 1})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_of(res).await["error"], "conflict");
}

#[tokio::test]
async fn over_decrease_is_rejected_and_leaves_quantity() {
    let srv = TestServer::spawn(&[]).await;
    let client = reqwest::Client::new();

    let item = json_of(create(&client, &srv, json!({"code": "C3", "quantity": 2})).await).await;
    let id = item["id"].as_str().unwrap();

    let res = client
        .patch(srv.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({"direction": "decrease", "amount": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_of(res).await["error"], "insufficient_stock");

    let fetched = json_of(reqwest::get(srv.url(&format!("/api/inventory/{id}"))).await.unwrap()).await;
    assert_eq!(fetched["data"]["quantity"], 2);
}

#[tokio::test]
async fn invalid_inputs_are_bad_requests() {
    let srv = TestServer::spawn(&[]).await;
    let client = reqwest::Client::new();

    let item = json_of(create(&client, &srv, json!({"code": "D1", "quantity": 2})).await).await;
    let id = item["id"].as_str().unwrap();

    let cases = [
        (client.put(srv.url(&format!("/api/inventory/{id}"))).json(&json!({})), "invalid_input"),
        (client.put(srv.url(&format!("/api/inventory/{id}"))).json(&json!({"quantity": -1})), "invalid_input"),
        (
            client
                .patch(srv.url(&format!("/api/inventory/{id}/adjust")))
                .json(&json!({"direction": "sideways", "amount": 1})),
            "invalid_input",
        ),
        (
            client
                .patch(srv.url(&format!("/api/inventory/{id}/adjust")))
                .json(&json!({"direction": "increase", "amount": 0})),
            "invalid_input",
        ),
        (create_request(&client, &srv, json!({"code": ""})), "invalid_input"),
    ];

    for (req, error) in cases {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(res).await["error"], error);
    }
}

fn create_request(client: &reqwest::Client, srv: &TestServer, body: Value) -> reqwest::RequestBuilder {
    client.post(srv.url("/api/inventory")).json(&body)
}

#[tokio::test]
async fn categories_group_by_letter_prefix() {
    let srv = TestServer::spawn(&["A1", "A2", "AB3", "B1", "42"]).await;

    let cats = json_of(reqwest::get(srv.url("/api/categories")).await.unwrap()).await;
    assert_eq!(cats["source"], "live");
    assert_eq!(cats["data"], json!(["A", "AB", "B", "other"]));

    let a = json_of(reqwest::get(srv.url("/api/categories/A/items")).await.unwrap()).await;
    assert_eq!(codes(&a["data"]), vec!["A1", "A2", "AB3"]);

    let other = json_of(reqwest::get(srv.url("/api/categories/other/items")).await.unwrap()).await;
    assert_eq!(codes(&other["data"]), vec!["42"]);
}

#[tokio::test]
async fn unreachable_store_serves_demo_and_refuses_writes() {
    let srv = TestServer::spawn_with(&["A1", "B1", "B2"], false).await;
    let client = reqwest::Client::new();

    let status = json_of(reqwest::get(srv.url("/api/status")).await.unwrap()).await;
    assert_eq!(status["state"], "disconnected");
    assert_eq!(status["records"], Value::Null);

    let list = json_of(reqwest::get(srv.url("/api/inventory")).await.unwrap()).await;
    assert_eq!(list["source"], "demo");
    assert_eq!(codes(&list["data"]), vec!["A1", "B1", "B2"]);
    assert_eq!(list["data"][0]["quantity"], 10);

    let res = create(&client, &srv, json!({"code": "Z1"})).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_of(res).await["error"], "unavailable");

    let res = client.post(srv.url("/api/reset")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Explicit reconnect after recovery seeds and goes live.
    srv.store.set_reachable(true);
    let status = json_of(client.post(srv.url("/api/connect")).send().await.unwrap()).await;
    assert_eq!(status["state"], "connected");
    assert_eq!(status["records"], 3);

    let list = json_of(reqwest::get(srv.url("/api/inventory")).await.unwrap()).await;
    assert_eq!(list["source"], "live");
}

#[tokio::test]
async fn outage_mid_session_falls_back_to_demo_on_error() {
    let srv = TestServer::spawn(&["A1", "A2"]).await;

    srv.store.set_reachable(false);
    let list = json_of(reqwest::get(srv.url("/api/inventory")).await.unwrap()).await;
    assert_eq!(list["source"], "demo-on-error");

    let list = json_of(reqwest::get(srv.url("/api/inventory")).await.unwrap()).await;
    assert_eq!(list["source"], "demo");
}

#[tokio::test]
async fn reset_import_and_export() {
    let srv = TestServer::spawn(&["A1", "A2"]).await;
    let client = reqwest::Client::new();

    create(&client, &srv, json!({"code": "Q9", "quantity": 4})).await;

    let outcome = json_of(client.post(srv.url("/api/import-from-file")).send().await.unwrap()).await;
    assert_eq!(outcome["inserted"], 0);
    assert_eq!(outcome["seed_asset_present"], true);

    let outcome = json_of(client.post(srv.url("/api/reset")).send().await.unwrap()).await;
    assert_eq!(outcome["removed"], 3);
    assert_eq!(outcome["inserted"], 2);

    let export = json_of(reqwest::get(srv.url("/api/export")).await.unwrap()).await;
    assert_eq!(export["source"], "live");
    assert_eq!(export["records"], 2);
    assert_eq!(
        export["data"],
        json!([{"code": "A1", "quantity": 0}, {"code": "A2", "quantity": 0}])
    );
    assert!(export["timestamp"].is_string());
}
