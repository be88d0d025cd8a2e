// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the counter service over HTTP

use photobooth::config::ServerConfig;
use photobooth::counter::{
    self, CountStore, CounterService, FileStore, MemoryStore, StoreError, StoreResult,
};
use photobooth::errors::AppResult;
use photobooth::{CounterClient, CounterError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const API_KEY: &str = "test-key";

struct TestServer {
    origin: String,
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<AppResult<()>>,
}

impl TestServer {
    async fn start(store: Arc<dyn CountStore>) -> Self {
        let config = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            path_prefix: "/photobooth".to_string(),
            api_key: API_KEY.to_string(),
            store_path: None,
        };
        let listener = tokio::net::TcpListener::bind(&config.bind).await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();

        let service = CounterService::new(store);
        let handle = tokio::spawn(async move {
            counter::serve_on(listener, service, &config, async move {
                let _ = rx.await;
            })
            .await
        });

        Self {
            base_url: format!("{}/photobooth", origin),
            origin,
            shutdown: Some(tx),
            handle,
        }
    }

    fn client(&self) -> CounterClient {
        self.client_with_key(API_KEY)
    }

    fn client_with_key(&self, key: &str) -> CounterClient {
        CounterClient::new(&self.base_url, key, Duration::from_secs(5)).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

struct BrokenStore;

impl CountStore for BrokenStore {
    fn get(&self, _key: &str) -> StoreResult<Option<u64>> {
        Err(StoreError::Io("unavailable".into()))
    }

    fn set(&self, _key: &str, _value: u64) -> StoreResult<()> {
        Err(StoreError::Io("unavailable".into()))
    }
}

fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("photobooth-count-{}.json", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    server.client().health().await.unwrap();

    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/health", server.base_url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));

    server.stop().await;
}

#[tokio::test]
async fn empty_store_counts_zero() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    assert_eq!(server.client().fetch_count().await.unwrap(), 0);

    server.stop().await;
}

#[tokio::test]
async fn increments_are_sequential() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let client = server.client();

    assert_eq!(client.increment().await.unwrap(), 1);
    assert_eq!(client.increment().await.unwrap(), 2);
    // A read between the 2nd and 3rd increment sees the completed write
    assert_eq!(client.fetch_count().await.unwrap(), 2);
    assert_eq!(client.increment().await.unwrap(), 3);
    assert_eq!(client.fetch_count().await.unwrap(), 3);

    server.stop().await;
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let client = server.client();
            tokio::spawn(async move { client.increment().await.unwrap() })
        })
        .collect();

    let mut seen = Vec::new();
    for task in tasks {
        seen.push(task.await.unwrap());
    }
    seen.sort_unstable();

    assert_eq!(seen, (1..=20).collect::<Vec<u64>>());
    assert_eq!(server.client().fetch_count().await.unwrap(), 20);

    server.stop().await;
}

#[tokio::test]
async fn missing_bearer_is_rejected() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let response = reqwest::Client::new()
        .get(format!("{}/capture-count", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing authorization header");

    server.stop().await;
}

#[tokio::test]
async fn wrong_key_is_unauthorized() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let client = server.client_with_key("not-the-key");

    assert_eq!(client.increment().await, Err(CounterError::Unauthorized));
    // The rejected increment must not have counted
    assert_eq!(server.client().fetch_count().await.unwrap(), 0);

    server.stop().await;
}

#[tokio::test]
async fn routes_live_under_the_prefix() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let response = reqwest::Client::new()
        .get(format!("{}/capture-count", server.origin))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn any_origin_is_allowed() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!("{}/capture-count", server.base_url))
        .header("Origin", "https://booth.example")
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    // Preflight carries no credentials and must still succeed
    let preflight = http
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/capture-count/increment", server.base_url),
        )
        .header("Origin", "https://booth.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization, content-type")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(preflight.headers()["access-control-allow-origin"], "*");
    assert_eq!(preflight.headers()["access-control-max-age"], "600");

    drop(http);
    server.stop().await;
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let server = TestServer::start(Arc::new(BrokenStore)).await;

    let response = reqwest::Client::new()
        .post(format!("{}/capture-count/increment", server.base_url))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to increment capture count");

    assert!(matches!(
        server.client().fetch_count().await,
        Err(CounterError::Transport(_))
    ));

    server.stop().await;
}

#[tokio::test]
async fn file_store_keeps_count_across_restarts() {
    let path = temp_store_path();

    let server = TestServer::start(Arc::new(FileStore::open(&path).unwrap())).await;
    server.client().increment().await.unwrap();
    server.client().increment().await.unwrap();
    server.stop().await;

    let server = TestServer::start(Arc::new(FileStore::open(&path).unwrap())).await;
    assert_eq!(server.client().fetch_count().await.unwrap(), 2);
    assert_eq!(server.client().increment().await.unwrap(), 3);
    server.stop().await;

    let _ = std::fs::remove_file(&path);
}
