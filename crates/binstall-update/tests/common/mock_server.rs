//! Mock server helpers
//!
//! The same wiremock server plays both the GitHub API (`/repos/...`) and
//! the asset host (`/download/...`).

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Path of the latest-release endpoint for the test repository
pub fn latest_release_path() -> String {
    format!("/repos/{}/{}/releases/latest", OWNER, REPO)
}

/// URL an asset is served from
pub fn asset_url(server: &MockServer, name: &str) -> String {
    format!("{}/download/{}", server.uri(), name)
}

/// Serve `release` as the latest release
pub async fn mock_latest_release(server: &MockServer, release: Value) {
    mock_latest_release_for(server, OWNER, REPO, release).await;
}

/// Serve `release` as the latest release of `owner/repo`
pub async fn mock_latest_release_for(server: &MockServer, owner: &str, repo: &str, release: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/releases/latest", owner, repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve an asset's bytes
pub async fn mock_asset(server: &MockServer, name: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Assert that an asset is never requested
pub async fn mock_asset_never_requested(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Answer requests for an asset with 404
pub async fn mock_asset_missing(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}
