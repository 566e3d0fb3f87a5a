//! Place store backed by the hosted REST database.
//!
//! Rows live in the `bathrooms` table and are read/written through the
//! PostgREST-style endpoints under `/rest/v1`.

use catalog::{BoxFuture, CatalogError, ListedPlace, PlaceStore};
use foundation::PlaceId;
use http::header::AUTHORIZATION;

use crate::config::BackendConfig;

const TABLE: &str = "bathrooms";

/// Error talking to the backend.
#[derive(Debug)]
pub struct BackendError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<BackendError> for CatalogError {
    fn from(err: BackendError) -> Self {
        match &err.source {
            Some(source) => CatalogError::Backend(format!("{}: {source}", err.message)),
            None => CatalogError::Backend(err.message),
        }
    }
}

pub struct RemotePlaceStore {
    http: reqwest::Client,
    table_url: String,
    anon_key: String,
}

impl RemotePlaceStore {
    pub fn new(http: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            http,
            table_url: table_url(&config.url),
            anon_key: config.anon_key.clone(),
        }
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }

    async fn fetch_rows(&self, query: &[(&str, &str)]) -> Result<Vec<ListedPlace>, BackendError> {
        let resp = self
            .authorized(self.http.get(&self.table_url))
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::with_source("place query failed", e))?;
        if !resp.status().is_success() {
            return Err(BackendError::new(format!(
                "place query failed: {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| BackendError::with_source("place rows malformed", e))
    }

    async fn insert_row(&self, place: ListedPlace) -> Result<ListedPlace, BackendError> {
        let resp = self
            .authorized(self.http.post(&self.table_url))
            .header("Prefer", "return=representation")
            .json(&[&place])
            .send()
            .await
            .map_err(|e| BackendError::with_source("place insert failed", e))?;
        if !resp.status().is_success() {
            return Err(BackendError::new(format!(
                "place insert failed: {}",
                resp.status()
            )));
        }
        let mut rows: Vec<ListedPlace> = resp
            .json()
            .await
            .map_err(|e| BackendError::with_source("insert response malformed", e))?;
        if rows.is_empty() {
            // Representation suppressed by the backend; the row was accepted as sent.
            return Ok(place);
        }
        Ok(rows.swap_remove(0))
    }
}

impl PlaceStore for RemotePlaceStore {
    fn list_approved(&self) -> BoxFuture<'_, Result<Vec<ListedPlace>, CatalogError>> {
        Box::pin(async move {
            let rows = self.fetch_rows(&list_query()).await?;
            Ok(rows)
        })
    }

    fn get(&self, id: &PlaceId) -> BoxFuture<'_, Result<Option<ListedPlace>, CatalogError>> {
        let filter = format!("eq.{id}");
        Box::pin(async move {
            let rows = self
                .fetch_rows(&[("select", "*"), ("id", filter.as_str())])
                .await?;
            Ok(rows.into_iter().next())
        })
    }

    fn insert(&self, place: ListedPlace) -> BoxFuture<'_, Result<ListedPlace, CatalogError>> {
        Box::pin(async move { Ok(self.insert_row(place).await?) })
    }
}

fn table_url(base: &str) -> String {
    format!("{}/rest/v1/{TABLE}", base.trim_end_matches('/'))
}

fn list_query() -> [(&'static str, &'static str); 3] {
    [
        ("select", "*"),
        ("is_approved", "eq.true"),
        ("order", "created_at.desc"),
    ]
}
