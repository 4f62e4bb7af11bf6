//! HTTP session: one curl handle configured with proxy, user agent, TLS
//! verification and a cookie engine seeded from a [`CookieStore`].
//!
//! Cookies set during the session (e.g. by a confirmation page) are kept by
//! the handle and sent on every following request. They are written back to
//! the store only by [`Session::close`], which callers invoke after a
//! successful download; dropping a session discards its cookie changes.

mod cookie_jar;
mod store;

pub use cookie_jar::{Cookie, CookieJar};
pub use store::{CookieStore, FileCookieStore, MemoryCookieStore, COOKIE_FILE};

use curl::easy::{Easy, Handler};
use std::cell::RefCell;
use std::str;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SessionError;

/// Desktop browser user agent; the provider serves plain confirmation pages to it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// Default streaming chunk size (curl receive buffer and write buffer).
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

/// Transport settings of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub proxy: Option<String>,
    pub user_agent: String,
    pub verify_tls: bool,
    pub chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_tls: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// An open HTTP session. Not shared between threads; each download opens its own.
pub struct Session {
    easy: Easy,
    cookie_store: Option<Arc<dyn CookieStore>>,
}

impl Session {
    /// Builds the curl handle and, when a store is given, loads its cookies
    /// into the handle before any request is made.
    pub fn open(
        config: &SessionConfig,
        cookie_store: Option<Arc<dyn CookieStore>>,
    ) -> Result<Self, SessionError> {
        tracing::debug!(
            proxy = config.proxy.as_deref().unwrap_or("-"),
            cookies = cookie_store.is_some(),
            verify_tls = config.verify_tls,
            user_agent = %config.user_agent,
            "opening session"
        );

        let mut easy = Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(Duration::from_secs(30))?;
        // Abort if throughput stays below 1 KiB/s for 60s.
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.useragent(&config.user_agent)?;
        easy.buffer_size(config.chunk_size)?;
        if let Some(proxy) = &config.proxy {
            easy.proxy(proxy)?;
        }
        if !config.verify_tls {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }
        // Empty file name: enable the cookie engine without reading anything.
        easy.cookie_file("")?;

        if let Some(store) = &cookie_store {
            let jar = store.load()?;
            for cookie in jar.iter() {
                easy.cookie_list(&cookie.to_line())?;
            }
        }

        Ok(Self { easy, cookie_store })
    }

    /// Performs a GET of `url`, feeding header lines and body chunks to
    /// `handler` as they arrive. Returns the final HTTP status (after redirects).
    pub fn get<H: Handler>(&mut self, url: &str, handler: &mut H) -> Result<u32, curl::Error> {
        self.easy.url(url)?;
        self.easy.get(true)?;
        let handler = RefCell::new(handler);
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|data| handler.borrow_mut().header(data))?;
            transfer.write_function(|data| handler.borrow_mut().write(data))?;
            transfer.perform()?;
        }
        self.easy.response_code()
    }

    /// Current cookie state of the handle.
    pub fn cookie_jar(&mut self) -> Result<CookieJar, SessionError> {
        let list = self.easy.cookies()?;
        Ok(CookieJar::from_lines(
            list.iter().filter_map(|line| str::from_utf8(line).ok()),
        ))
    }

    /// Ends a successful session: writes the handle's cookies back to the store,
    /// overwriting what was there. No-op without a store.
    pub fn close(mut self) -> Result<(), SessionError> {
        let Some(store) = self.cookie_store.take() else {
            return Ok(());
        };
        let jar = self.cookie_jar()?;
        store.save(&jar)
    }
}
