use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Time-bounded cache of raw fetched pages, addressed by URL. The engine
/// never sees this; it only shortens the fetch step between close-together
/// runs. A corrupt or expired entry is a miss, never an error.
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    url: String,
    fetched_at: DateTime<Utc>,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn lookup(&self, url: &str, ttl_secs: u64) -> Option<Vec<u8>> {
        let key = cache_key(url);
        let meta_path = self.meta_path(&key);
        let body_path = self.body_path(&key);

        let meta_text = std::fs::read_to_string(&meta_path).ok()?;
        let meta: CacheMeta = match serde_json::from_str(&meta_text) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(path = %meta_path.display(), error = %err, "unreadable cache metadata; treating as miss");
                return None;
            }
        };

        let age = Utc::now().signed_duration_since(meta.fetched_at);
        if age.num_seconds() < 0 || age.num_seconds() as u64 > ttl_secs {
            debug!(%url, age_secs = age.num_seconds(), ttl_secs, "cache entry expired");
            return None;
        }

        match std::fs::read(&body_path) {
            Ok(body) => {
                debug!(%url, bytes = body.len(), "cache hit");
                Some(body)
            }
            Err(err) => {
                warn!(path = %body_path.display(), error = %err, "cache body missing; treating as miss");
                None
            }
        }
    }

    pub fn store(&self, url: &str, body: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create cache dir {}", self.dir.display()))?;

        let key = cache_key(url);
        let meta = CacheMeta {
            url: url.to_string(),
            fetched_at: Utc::now(),
        };

        let meta_path = self.meta_path(&key);
        std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("failed to write cache metadata {}", meta_path.display()))?;

        let body_path = self.body_path(&key);
        std::fs::write(&body_path, body)
            .with_context(|| format!("failed to write cache body {}", body_path.display()))?;

        debug!(%url, bytes = body.len(), "cache entry written");
        Ok(())
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.body"))
    }
}

fn cache_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..24].to_string()
}
