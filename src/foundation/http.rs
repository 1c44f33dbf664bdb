use crate::configuration::CatalogSettings;
use reqwest::{header, redirect, Client, ClientBuilder};
use std::time::Duration;

const MAX_REDIRECTS: usize = 4;

fn client_helper(settings: &CatalogSettings) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs.max(1)))
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .user_agent(settings.user_agent.clone())
}

/// Client for the catalog's JSON API.
pub fn json_client(settings: &CatalogSettings) -> reqwest::Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    client_helper(settings).default_headers(headers).build()
}

/// Client for plain asset downloads.
pub fn download_client(settings: &CatalogSettings) -> reqwest::Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("image/*"));
    client_helper(settings).default_headers(headers).build()
}
