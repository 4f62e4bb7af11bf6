//! Netscape cookie file format (the one curl and wget read and write).

use std::fmt::Write as _;

const HEADER: &str = "# Netscape HTTP Cookie File\n";
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// One cookie line: domain, subdomain flag, path, secure flag, expiry, name, value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Unix seconds; 0 for a session cookie.
    pub expires: u64,
    pub name: String,
    pub value: String,
}

impl Cookie {
    /// Parses one tab-separated line. Comments, blank and malformed lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (http_only, line) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.splitn(7, '\t').collect();
        let [domain, include_subdomains, path, secure, expires, name, value] = fields[..] else {
            return None;
        };
        Some(Self {
            domain: domain.to_string(),
            include_subdomains: parse_flag(include_subdomains)?,
            path: path.to_string(),
            secure: parse_flag(secure)?,
            http_only,
            expires: expires.parse().ok()?,
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Formats the cookie as one Netscape line (no trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{}{}\t{}\t{}\t{}\t{}\t{}\t{}",
            if self.http_only { HTTP_ONLY_PREFIX } else { "" },
            self.domain,
            flag(self.include_subdomains),
            self.path,
            flag(self.secure),
            self.expires,
            self.name,
            self.value
        )
    }

    fn same_slot(&self, other: &Cookie) -> bool {
        self.domain == other.domain && self.path == other.path && self.name == other.name
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "TRUE" | "true" => Some(true),
        "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn flag(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// In-memory cookie set. A cookie with the same domain, path and name replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Parses a Netscape cookie file. Lines that do not parse are skipped.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut jar = Self::default();
        for line in lines {
            match Cookie::parse_line(line) {
                Some(cookie) => jar.insert(cookie),
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        tracing::debug!(line = trimmed, "skipping malformed cookie line");
                    }
                }
            }
        }
        jar
    }

    pub fn insert(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.same_slot(&cookie)) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Full file contents, header comment included.
    pub fn to_netscape(&self) -> String {
        let mut out = String::from(HEADER);
        for cookie in &self.cookies {
            let _ = writeln!(out, "{}", cookie.to_line());
        }
        out
    }
}
