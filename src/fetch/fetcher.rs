use std::{collections::HashMap, sync::Mutex, time::Duration};

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Error, Result};
use super::source::Source;

/// Single-attempt retrieval of a source's raw bytes.
pub trait Fetch: Send + Sync {
    fn fetch(&self, source: &Source) -> Result<Vec<u8>>;
}

/// Blocking HTTP (reqwest) and local-file fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the HTTP client. Without `timeout` the transport default applies.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()
            .map_err(|e| Error::fetch("http client", e))?;
        Ok(Self { client })
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::Http { url, params, headers } => {
                debug!(%source, "GET");
                let mut request = self.client.get(url).query(params);
                for (key, value) in headers {
                    request = request.header(key.as_str(), value.as_str());
                }
                let response = request.send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::fetch(source.to_string(), e))?;
                let body = response.bytes()
                    .map_err(|e| Error::fetch(source.to_string(), e))?;
                debug!(%source, bytes = body.len(), "fetched");
                Ok(body.to_vec())
            }
            Source::File(path) => {
                debug!(path = %path.display(), "read");
                std::fs::read(path).map_err(|e| Error::fetch(source.to_string(), e))
            }
        }
    }
}

enum Canned {
    Body(Vec<u8>),
    Failure(String),
}

/// In-memory fetcher with canned responses and per-source call counts.
#[derive(Default)]
pub struct MemFetcher {
    responses: HashMap<Source, Canned>,
    calls: Mutex<HashMap<Source, usize>>,
}

impl MemFetcher {
    pub fn new() -> Self { Self::default() }

    /// Serve `body` for `source`.
    pub fn with(mut self, source: Source, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(source, Canned::Body(body.into()));
        self
    }

    /// Fail every fetch of `source` with a `Fetch` error carrying `reason`.
    pub fn failing(mut self, source: Source, reason: impl Into<String>) -> Self {
        self.responses.insert(source, Canned::Failure(reason.into()));
        self
    }

    /// Number of fetches issued for `source`.
    pub fn calls(&self, source: &Source) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
            .get(source).copied().unwrap_or(0)
    }

    /// Number of fetches issued for all sources.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).values().sum()
    }
}

impl Fetch for MemFetcher {
    fn fetch(&self, source: &Source) -> Result<Vec<u8>> {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
            .entry(source.clone()).or_default() += 1;

        match self.responses.get(source) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Failure(reason)) => Err(Error::fetch(source.to_string(), reason)),
            None => Err(Error::fetch(source.to_string(), "404 Not Found")),
        }
    }
}
