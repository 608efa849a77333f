//! HTTP fetching for templates and subscriptions (feature `subs_http`).
//!
//! Remote locations are fetched up front, concurrently, then handed to the
//! synchronous pipeline through [`PrefetchedLoader`].

use crate::error::BuildError;
use crate::options::BuildOptions;
use crate::pipeline::{FileLoader, LoadError, SourceLoader};
use crate::source::SourceId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Many providers choose the response format from the user agent.
pub const USER_AGENT: &str = "clash.meta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_remote(location: &str) -> bool {
    let l = location.trim_start().to_ascii_lowercase();
    l.starts_with("http://") || l.starts_with("https://")
}

pub fn client(timeout: Duration) -> Result<reqwest::Client, BuildError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| BuildError::load("http client", e))
}

pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    refresh: bool,
) -> Result<Vec<u8>, BuildError> {
    let mut req = client.get(url);
    if refresh {
        req = req.header(reqwest::header::CACHE_CONTROL, "no-cache");
    }
    let resp = req
        .send()
        .await
        .map_err(|e| BuildError::load(url, e))?
        .error_for_status()
        .map_err(|e| BuildError::load(url, e))?;
    let body = resp.bytes().await.map_err(|e| BuildError::load(url, e))?;
    debug!(url, bytes = body.len(), "fetched");
    Ok(body.to_vec())
}

/// Remote bodies keyed by location; everything else is read from disk.
#[derive(Debug, Default)]
pub struct PrefetchedLoader {
    bodies: HashMap<String, Vec<u8>>,
    local: FileLoader,
}

impl PrefetchedLoader {
    pub fn with_local(mut self, local: FileLoader) -> Self {
        self.local = local;
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, body: Vec<u8>) {
        self.bodies.insert(location.into(), body);
    }
}

impl SourceLoader for PrefetchedLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        if let Some(body) = self.bodies.get(location) {
            return Ok(body.clone());
        }
        if is_remote(location) {
            return Err(format!("{location} was not prefetched").into());
        }
        self.local.load(location)
    }
}

/// Every remote location the options refer to, in order, without repeats.
pub fn remote_locations(options: &BuildOptions) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let template = options.template.iter().map(|t| t.trim().to_string());
    let subs = options.subs.iter().map(|s| SourceId::parse(s.trim()).location);
    for loc in template.chain(subs) {
        if is_remote(&loc) && !out.contains(&loc) {
            out.push(loc);
        }
    }
    out
}

/// Fetch all remote locations with at most `concurrency` requests in flight.
/// The first failure aborts the rest.
pub async fn prefetch(
    options: &BuildOptions,
    client: reqwest::Client,
    concurrency: usize,
) -> Result<PrefetchedLoader, BuildError> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let refresh = options.refresh;
    let mut set = JoinSet::new();
    for url in remote_locations(options) {
        let client = client.clone();
        let permits = permits.clone();
        set.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| BuildError::load(url.as_str(), e))?;
            let body = fetch_bytes(&client, &url, refresh).await?;
            Ok::<_, BuildError>((url, body))
        });
    }

    let mut loader = PrefetchedLoader::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok((url, body))) => loader.insert(url, body),
            Ok(Err(e)) => {
                set.abort_all();
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "fetch task failed");
                set.abort_all();
                return Err(BuildError::load("fetch task", e));
            }
        }
    }
    Ok(loader)
}
