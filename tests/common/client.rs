//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per breed endpoint. When routes or request
//! formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn breeds_url(&self) -> String {
        format!("{}{}", self.base_url, BREEDS_BASE_PATH)
    }

    /// URL of a single breed, with the name percent-encoded as one segment.
    fn breed_url(&self, name: &str) -> reqwest::Url {
        let mut url = reqwest::Url::parse(&self.breeds_url()).expect("Invalid base URL");
        url.path_segments_mut()
            .expect("Base URL cannot be a base")
            .push(name);
        url
    }

    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET the breed list. `None` leaves the query parameter out.
    pub async fn list_breeds(&self, page: Option<&str>, limit: Option<&str>) -> Response {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.client
            .get(self.breeds_url())
            .query(&query)
            .send()
            .await
            .expect("List breeds request failed")
    }

    pub async fn get_breed(&self, name: &str) -> Response {
        self.client
            .get(self.breed_url(name))
            .send()
            .await
            .expect("Get breed request failed")
    }

    pub async fn add_breed(&self, name: &str, types: &[&str]) -> Response {
        self.add_breed_raw(json!({ "breed": name, "types": types }))
            .await
    }

    pub async fn add_breed_raw(&self, body: Value) -> Response {
        self.client
            .post(self.breeds_url())
            .json(&body)
            .send()
            .await
            .expect("Add breed request failed")
    }

    pub async fn update_breed(&self, name: &str, types: &[&str]) -> Response {
        self.update_breed_raw(name, json!({ "types": types })).await
    }

    pub async fn update_breed_raw(&self, name: &str, body: Value) -> Response {
        self.client
            .put(self.breed_url(name))
            .json(&body)
            .send()
            .await
            .expect("Update breed request failed")
    }

    pub async fn delete_breed(&self, name: &str) -> Response {
        self.client
            .delete(self.breed_url(name))
            .send()
            .await
            .expect("Delete breed request failed")
    }
}
