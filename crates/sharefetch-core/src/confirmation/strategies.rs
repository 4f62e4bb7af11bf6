//! Extraction strategies: one pure function per confirmation-page shape.
//!
//! Each strategy looks at a single line of the page and returns the download
//! URL it recognizes, or `None`.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use super::html;

/// A pure function from one line of body text to a candidate URL.
pub(super) type Strategy = fn(&str) -> Option<String>;

/// Priority order. The first strategy to return a URL wins.
pub(super) const STRATEGIES: [(&str, Strategy); 3] = [
    ("export-anchor", export_anchor),
    ("download-form", download_form),
    ("download-url-field", download_url_field),
];

/// Origin prepended to relative export links.
const EXPORT_ORIGIN: &str = "https://docs.google.com";

/// Base for resolving a relative form action.
const FORM_BASE: &str = "https://drive.google.com/";

const DOWNLOAD_FORM_ID: &str = "download-form";

fn re_export_href() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r#"href="(/uc\?export=download[^"]+)"#).expect("compile export href"))
}

fn re_form_tag() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)<form\b[^>]*>").expect("compile form tag"))
}

fn re_input_tag() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)<input\b[^>]*>").expect("compile input tag"))
}

fn re_form_end() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)</form\s*>").expect("compile form end"))
}

fn re_download_url() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r#""downloadUrl":"([^"]+)"#).expect("compile downloadUrl"))
}

fn re_error_caption() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r#"<p class="uc-error-subcaption">(.*)</p>"#).expect("compile error caption")
    })
}

/// `href="/uc?export=download..."` anchors.
pub(super) fn export_anchor(line: &str) -> Option<String> {
    let caps = re_export_href().captures(line)?;
    let path = caps[1].replace("&amp;", "&");
    Some(format!("{EXPORT_ORIGIN}{path}"))
}

/// `<form id="download-form" action="...">` with hidden inputs carrying the
/// confirmation token. Hidden fields are merged into the action's query.
pub(super) fn download_form(line: &str) -> Option<String> {
    let (form_end, action) = re_form_tag().find_iter(line).find_map(|m| {
        let attrs = html::tag_attributes(m.as_str());
        if html::attribute(&attrs, "id") != Some(DOWNLOAD_FORM_ID) {
            return None;
        }
        let action = html::attribute(&attrs, "action")?.to_string();
        Some((m.end(), action))
    })?;

    let mut url = Url::parse(&action)
        .or_else(|_| Url::parse(FORM_BASE).and_then(|base| base.join(&action)))
        .ok()?;

    let rest = &line[form_end..];
    let body = match re_form_end().find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };

    let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for input in re_input_tag().find_iter(body) {
        let attrs = html::tag_attributes(input.as_str());
        let is_hidden = html::attribute(&attrs, "type")
            .map(|t| t.eq_ignore_ascii_case("hidden"))
            .unwrap_or(false);
        if !is_hidden {
            continue;
        }
        let Some(name) = html::attribute(&attrs, "name") else {
            continue;
        };
        let value = html::attribute(&attrs, "value").unwrap_or("");
        merge_param(&mut params, name, value);
    }

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params.iter());
    }
    Some(url.into())
}

/// Replaces every existing value of `name` with `value` (keeping the first
/// position), or appends the pair when `name` is new.
fn merge_param(params: &mut Vec<(String, String)>, name: &str, value: &str) {
    match params.iter().position(|(k, _)| k == name) {
        Some(first) => {
            params[first].1 = value.to_string();
            let mut index = 0;
            params.retain(|(k, _)| {
                let keep = index == first || k != name;
                index += 1;
                keep
            });
        }
        None => params.push((name.to_string(), value.to_string())),
    }
}

/// Embedded `"downloadUrl":"..."` JSON field with escaped separators.
pub(super) fn download_url_field(line: &str) -> Option<String> {
    let caps = re_download_url().captures(line)?;
    let raw = &caps[1];
    let decoded = serde_json::from_str::<String>(&format!("\"{raw}\""))
        .unwrap_or_else(|_| raw.replace("\\u003d", "=").replace("\\u0026", "&"));
    Some(decoded)
}

/// Text of the provider's `uc-error-subcaption` element.
pub(super) fn error_caption(line: &str) -> Option<String> {
    re_error_caption()
        .captures(line)
        .map(|caps| caps[1].to_string())
}
