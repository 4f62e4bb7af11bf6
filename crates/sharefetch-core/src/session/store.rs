//! Where a session's cookies come from and go back to.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::cookie_jar::CookieJar;
use crate::error::SessionError;

/// File name of the persisted jar inside the XDG cache directory.
pub const COOKIE_FILE: &str = "cookies.txt";

/// Persistent cookie state shared by every session in the process.
///
/// `load` runs when a session opens, `save` only when a download completed.
/// There is no locking between concurrent sessions: the last save wins.
pub trait CookieStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<CookieJar, SessionError>;
    fn save(&self, jar: &CookieJar) -> Result<(), SessionError>;
}

/// Netscape cookie file on disk.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.cache/sharefetch/cookies.txt` (via `XDG_CACHE_HOME`).
    pub fn default_location() -> Result<Self, SessionError> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("sharefetch")?;
        Ok(Self::new(xdg_dirs.get_cache_home().join(COOKIE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn jar_error(&self, source: io::Error) -> SessionError {
        SessionError::CookieJar {
            path: self.path.clone(),
            source,
        }
    }
}

impl CookieStore for FileCookieStore {
    fn load(&self) -> Result<CookieJar, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let jar = CookieJar::parse(&text);
                tracing::debug!(path = %self.path.display(), cookies = jar.len(), "loaded cookie jar");
                Ok(jar)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CookieJar::default()),
            Err(e) => Err(self.jar_error(e)),
        }
    }

    fn save(&self, jar: &CookieJar) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.jar_error(e))?;
        }
        fs::write(&self.path, jar.to_netscape()).map_err(|e| self.jar_error(e))?;
        tracing::debug!(path = %self.path.display(), cookies = jar.len(), "saved cookie jar");
        Ok(())
    }
}

/// Process-local jar for tests and embedders that must not touch the disk.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    jar: Mutex<CookieJar>,
    saves: AtomicUsize,
}

impl MemoryCookieStore {
    pub fn new(jar: CookieJar) -> Self {
        Self {
            jar: Mutex::new(jar),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> CookieJar {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CookieStore for MemoryCookieStore {
    fn load(&self) -> Result<CookieJar, SessionError> {
        Ok(self.snapshot())
    }

    fn save(&self, jar: &CookieJar) -> Result<(), SessionError> {
        *self.jar.lock().unwrap_or_else(PoisonError::into_inner) = jar.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
