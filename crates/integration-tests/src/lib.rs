//! Integration tests for the Bazaar storefront.
//!
//! Each test spawns the full router (all layers included) on
//! `127.0.0.1:0` against its own in-memory `SQLite` database, then talks to
//! it over HTTP with `reqwest`. No external services are needed:
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db;
use bazaar_storefront::state::AppState;

/// Signing key used by every spawned server.
pub const TEST_JWT_SECRET: &str = "t9Vq2mXr7LpK4wZs8NbC3hGf6JdY1aEu";

/// A running storefront plus a client pointed at it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub pool: SqlitePool,
}

/// A registered, logged-in user.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: i64,
    pub token: String,
}

impl TestApp {
    /// Start a server on an ephemeral port with a fresh database.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Like [`Self::spawn`], with the test configuration adjusted first.
    pub async fn spawn_with(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let pool = db::create_memory_pool()
            .await
            .expect("in-memory database should open");
        let mut config = StorefrontConfig::for_tests(SecretString::from(TEST_JWT_SECRET));
        configure(&mut config);
        let router = bazaar_storefront::app(AppState::new(config, pool.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port should bind");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("server should run");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            pool,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request should send")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request should send")
    }

    /// `POST` a JSON body with a bearer token.
    pub async fn post_json_as(&self, account: &Account, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(&account.token)
            .json(body)
            .send()
            .await
            .expect("request should send")
    }

    pub async fn get_as(&self, account: &Account, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(&account.token)
            .send()
            .await
            .expect("request should send")
    }

    pub async fn register(&self, username: &str, password: &str, email: &str) -> Response {
        self.post_json(
            "/register",
            &json!({ "username": username, "password": password, "email": email }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Register `username` (password `pw123`) and log in.
    pub async fn signup(&self, username: &str) -> Account {
        let resp = self
            .register(username, "pw123", &format!("{username}@example.com"))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "register {username}");

        let body: Value = self.login(username, "pw123").await.json().await.expect("json");
        Account {
            user_id: body["user_id"].as_i64().expect("user_id"),
            token: body["token"].as_str().expect("token").to_owned(),
        }
    }

    /// Create a store owned by `owner`, returning its JSON.
    pub async fn create_store(&self, owner: &Account, name: &str) -> Value {
        let resp = self
            .post_json_as(
                owner,
                "/stores",
                &json!({ "name": name, "address": "1 Market St", "category": "general" }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "create store {name}");
        resp.json().await.expect("json")
    }

    /// Create an item in `store`, returning its JSON.
    pub async fn create_item(&self, owner: &Account, store: &str, name: &str, price: i64) -> Value {
        let resp = self
            .post_json_as(
                owner,
                &format!("/store/{store}/items"),
                &json!({ "name": name, "price": price, "description": format!("{name} description") }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED, "create item {name}");
        resp.json().await.expect("json")
    }

    /// Row count of `table`, for asserting that rejected requests wrote nothing.
    pub async fn count(&self, table: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count query");
        n
    }
}

/// Read the `{"error": ...}` message of a failed response.
pub async fn error_message(resp: Response) -> String {
    let body: Value = resp.json().await.expect("error body is json");
    body["error"].as_str().expect("error field").to_owned()
}
