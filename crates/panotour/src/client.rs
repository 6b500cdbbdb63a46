//! HTTP client for the tour record store.
//!
//! The store exposes the scene and hotspot tables through a PostgREST-style
//! REST interface: rows are selected with `column=eq.value` filters and an
//! embedded projection of the destination scene is requested through the
//! `select` parameter.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::cache::{CachedRecord, NoCache, RecordCache, RecordKey};
use crate::error::{Error, Result};
use crate::fetcher::{FetchFuture, RecordFetcher};
use crate::rows::{HotspotRow, SceneRow, HOTSPOT_SELECT};
use crate::types::{Hotspot, Scene, SceneId};

/// Environment variables holding the store URL, in lookup order.
const URL_VARS: [&str; 2] = ["PANOTOUR_URL", "SUPABASE_URL"];

/// Environment variables holding the store key, in lookup order.
const KEY_VARS: [&str; 2] = ["PANOTOUR_KEY", "SUPABASE_KEY"];

/// Connection settings for the record store.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the project, without the `/rest/v1` suffix.
    pub url: String,
    /// API key sent with every request.
    pub key: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl BackendConfig {
    /// Create a configuration, validating the URL.
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let key = key.into();

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::Config {
                key: "url",
                detail: format!("expected an http(s) URL, got {url:?}"),
            });
        }
        if key.trim().is_empty() {
            return Err(Error::Config {
                key: "key",
                detail: "API key is empty".to_string(),
            });
        }

        Ok(Self { url, key })
    }

    /// Read the configuration from `PANOTOUR_URL`/`PANOTOUR_KEY`, falling back
    /// to `SUPABASE_URL`/`SUPABASE_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let find = |names: &[&str]| names.iter().copied().find_map(&lookup);

        let url = find(&URL_VARS).ok_or_else(|| Error::Config {
            key: "url",
            detail: format!("set one of {}", URL_VARS.join(", ")),
        })?;
        let key = find(&KEY_VARS).ok_or_else(|| Error::Config {
            key: "key",
            detail: format!("set one of {}", KEY_VARS.join(", ")),
        })?;

        Self::new(url, key)
    }
}

/// Names of the scene and hotspot tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub scenes: String,
    pub hotspots: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            scenes: "cenas".to_string(),
            hotspots: "hotspots".to_string(),
        }
    }
}

/// HTTP client for fetching scene and hotspot records.
///
/// The client handles authentication, caching and row decoding. It is
/// runtime-agnostic and works with any async executor that can drive reqwest.
///
/// # Example
///
/// ```ignore
/// let client = Client::new(BackendConfig::from_env()?);
/// let scene = client.fetch_scene(SceneId(1)).await?;
/// ```
pub struct Client<C: RecordCache = NoCache> {
    http: reqwest::Client,
    cache: Arc<C>,
    config: BackendConfig,
    tables: TableNames,
}

impl Client<NoCache> {
    /// Create a new client with no caching.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self::with_cache(config, NoCache)
    }
}

impl<C: RecordCache> Client<C> {
    /// Create a new client with a custom cache.
    #[must_use]
    pub fn with_cache(config: BackendConfig, cache: C) -> Self {
        Self::with_http_and_cache(reqwest::Client::new(), config, cache)
    }

    /// Create a new client with a custom HTTP client and cache.
    #[must_use]
    pub fn with_http_and_cache(http: reqwest::Client, config: BackendConfig, cache: C) -> Self {
        Self {
            http,
            cache: Arc::new(cache),
            config,
            tables: TableNames::default(),
        }
    }

    /// Use custom table names.
    #[must_use]
    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    /// The cache backing this client.
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Fetch a scene record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no row matches, or an error if the
    /// request fails or the response cannot be decoded.
    pub async fn fetch_scene(&self, id: SceneId) -> Result<Scene> {
        let key = RecordKey::Scene(id);
        if let Some(CachedRecord::Scene(scene)) = self.cache.get(key).await? {
            tracing::debug!(%id, "scene cache hit");
            return Ok(scene);
        }

        let rows: Vec<SceneRow> = self.fetch_rows(&self.scene_url(id), "scene rows").await?;
        let scene = rows
            .into_iter()
            .next()
            .map(Scene::from)
            .ok_or(Error::NotFound(id))?;

        self.cache.put(key, CachedRecord::Scene(scene.clone())).await?;
        Ok(scene)
    }

    /// Fetch the hotspots whose origin is the given scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn fetch_hotspots(&self, origin: SceneId) -> Result<Vec<Hotspot>> {
        let key = RecordKey::Hotspots(origin);
        if let Some(CachedRecord::Hotspots(hotspots)) = self.cache.get(key).await? {
            tracing::debug!(%origin, "hotspot cache hit");
            return Ok(hotspots);
        }

        let rows: Vec<HotspotRow> = self
            .fetch_rows(&self.hotspots_url(origin), "hotspot rows")
            .await?;
        let hotspots: Vec<Hotspot> = rows.into_iter().map(Hotspot::from).collect();

        self.cache
            .put(key, CachedRecord::Hotspots(hotspots.clone()))
            .await?;
        Ok(hotspots)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.url)
    }

    fn scene_url(&self, id: SceneId) -> String {
        format!(
            "{}?select=*&id=eq.{id}&limit=1",
            self.table_url(&self.tables.scenes)
        )
    }

    fn hotspots_url(&self, origin: SceneId) -> String {
        format!(
            "{}?select={}&cena_origem=eq.{origin}&order=id.asc",
            self.table_url(&self.tables.hotspots),
            urlencoding::encode(HOTSPOT_SELECT)
        )
    }

    /// Fetch and decode a JSON array of rows.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &'static str,
    ) -> Result<Vec<T>> {
        tracing::debug!(url, "fetching");

        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| Error::Decode {
            context,
            message: e.to_string(),
        })
    }
}

impl<C: RecordCache> RecordFetcher for Client<C> {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        Box::pin(self.fetch_scene(id))
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        Box::pin(self.fetch_hotspots(id))
    }
}
