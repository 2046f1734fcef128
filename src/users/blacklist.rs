use crate::error::AssistError;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

pub const DEFAULT_BLACKLIST_TTL: Duration = Duration::from_secs(60 * 60);

/// Where disallowed username words come from.
pub trait BlacklistSource: Send + Sync {
    fn load(&self) -> Result<Vec<String>, AssistError>;
}

/// A plain-text word list, one word per line.
pub struct FileBlacklistSource {
    path: PathBuf,
}

impl FileBlacklistSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl BlacklistSource for FileBlacklistSource {
    fn load(&self) -> Result<Vec<String>, AssistError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|err| AssistError::ConfigurationError {
                message: format!(
                    "unable to read username blacklist {}: {err}",
                    self.path.display()
                ),
            })?;
        Ok(parse_blacklist(&contents))
    }
}

pub fn parse_blacklist(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_lowercase())
        .collect()
}

struct CachedBlacklist {
    words: Arc<Vec<String>>,
    loaded_at: Instant,
}

/// Holds the most recently loaded blacklist for `ttl`. Requests that race
/// on an expired entry may each reload it; the last write wins and every
/// write holds a complete list.
pub struct BlacklistCache {
    source: Box<dyn BlacklistSource>,
    ttl: Duration,
    cached: RwLock<Option<CachedBlacklist>>,
}

impl BlacklistCache {
    pub fn new(source: Box<dyn BlacklistSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn from_file(path: &Path, ttl: Duration) -> Self {
        Self::new(Box::new(FileBlacklistSource::new(path)), ttl)
    }

    pub fn get(&self) -> Result<Arc<Vec<String>>, AssistError> {
        self.get_or_reload(Instant::now())
    }

    pub fn get_or_reload(&self, now: Instant) -> Result<Arc<Vec<String>>, AssistError> {
        if let Some(words) = self.fresh_entry(now) {
            return Ok(words);
        }

        let words = Arc::new(self.source.load()?);
        info!("Loaded {} username blacklist entries", words.len());
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedBlacklist {
            words: words.clone(),
            loaded_at: now,
        });
        Ok(words)
    }

    fn fresh_entry(&self, now: Instant) -> Option<Arc<Vec<String>>> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        match cached.as_ref() {
            Some(entry) if now.saturating_duration_since(entry.loaded_at) < self.ttl => {
                Some(entry.words.clone())
            }
            Some(_) => {
                debug!("Username blacklist expired");
                None
            }
            None => None,
        }
    }
}
