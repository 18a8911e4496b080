// tests/common/mod.rs

#![allow(dead_code)]

use std::net::SocketAddr;

use exam_portal::{config::Config, db::MIGRATOR, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection that never idles out keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_ttl_seconds: 600,
        secure_cookies: false,
        auth_replenish_seconds: 1,
        auth_burst: 1000,
        admin_username: None,
        admin_password: None,
        env_warnings: Vec::new(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp { address, pool }
}

/// A browser-like client: keeps cookies, does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, client: &reqwest::Client, username: &str, role: &str) -> reqwest::Response {
        client
            .post(self.url("/register"))
            .json(&json!({ "username": username, "password": "password123", "role": role }))
            .send()
            .await
            .expect("Register request failed")
    }

    pub async fn login(&self, client: &reqwest::Client, username: &str, password: &str) -> reqwest::Response {
        client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// Registers and logs in; the client then carries the session cookie.
    pub async fn signed_in(&self, username: &str, role: &str) -> reqwest::Client {
        let client = client();
        assert_eq!(self.register(&client, username, role).await.status().as_u16(), 201);
        assert_eq!(
            self.login(&client, username, "password123").await.status().as_u16(),
            200
        );
        client
    }

    /// Creates an exam as `admin` and returns its id.
    pub async fn create_exam(&self, admin: &reqwest::Client, colleges: &[&str]) -> i64 {
        let resp = admin
            .post(self.url("/admin/add_exam"))
            .json(&json!({
                "name": "National Entrance",
                "description": "General aptitude",
                "age_min": 18,
                "age_max": 25,
                "education_level": "graduate",
                "eligible_colleges": colleges,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    /// Adds an MCQ whose options are A..D and returns its id.
    pub async fn add_mcq(&self, admin: &reqwest::Client, exam_id: i64, correct: &str) -> i64 {
        let resp = admin
            .post(self.url(&format!("/admin/set_mcqs/{}", exam_id)))
            .json(&json!({
                "question": "Pick one",
                "option1": "A",
                "option2": "B",
                "option3": "C",
                "option4": "D",
                "correct_answer": correct,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
