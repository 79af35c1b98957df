//! Shared setup for the integration tests: a provider configured against a
//! wiremock server standing in for the incident.io API.

#![allow(dead_code)]

use serde_json::{json, Value};
use terraform_provider_incident::testing::ProviderTester;
use terraform_provider_incident::IncidentProvider;
use wiremock::MockServer;

pub const VERSION: &str = "1.2.3";
pub const API_KEY: &str = "test-key";

/// A provider whose environment is empty, so only the provider block counts.
pub fn provider() -> IncidentProvider {
    IncidentProvider::with_env_lookup(VERSION, |_| None)
}

/// A tester configured to talk to `server`.
pub async fn configured(server: &MockServer) -> ProviderTester<IncidentProvider> {
    let tester = ProviderTester::new(provider());
    tester
        .configure(json!({"endpoint": server.uri(), "api_key": API_KEY}))
        .await
        .expect("provider should configure");
    tester
}

/// JSON bodies of every request the server received for `method` and `path`.
pub async fn request_bodies(server: &MockServer, method: &str, path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.method.as_str() == method && request.url.path() == path)
        .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
        .collect()
}

/// The annotations the provider stamps on catalog entities.
pub fn annotations() -> Value {
    json!({"incident.io/terraform/version": VERSION})
}
