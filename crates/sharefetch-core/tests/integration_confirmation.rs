//! Integration test: provider confirmation pages and cookie persistence.
//!
//! The local server doubles as an HTTP proxy, so requests for provider hosts
//! (`drive.google.com`, `drive.usercontent.google.com`) reach it with their
//! real hostnames and curl's cookie domain matching applies as in production.

mod common;

use std::fs;
use std::sync::Arc;

use common::http_server::{self, Request, Response};
use sharefetch_core::error::{Error, LinkResolutionError};
use sharefetch_core::session::{CookieJar, CookieStore, MemoryCookieStore};
use sharefetch_core::{download, DownloadOptions, NoProgress};
use tempfile::tempdir;

const PAYLOAD: &[u8] = b"large file contents";

const FORM_PAGE: &str = concat!(
    "<!DOCTYPE html><html><head><title>Google Drive - Virus scan warning</title></head><body>\n",
    "<p class=\"uc-warning-caption\">Google Drive can't scan this file for viruses.</p>\n",
    "<form id=\"download-form\" action=\"http://drive.usercontent.google.com/download\" method=\"get\">",
    "<input type=\"submit\" id=\"uc-download-link\" value=\"Download anyway\"/>",
    "<input type=\"hidden\" name=\"id\" value=\"FILE123\">",
    "<input type=\"hidden\" name=\"export\" value=\"download\">",
    "<input type=\"hidden\" name=\"confirm\" value=\"t\">",
    "</form>\n",
    "</body></html>\n"
);

/// Provider stand-in: `/uc` answers with a confirmation form and a cookie;
/// the payload is only served with both the token and the cookie.
fn provider(req: &Request) -> Response {
    match (req.host.as_str(), req.path.as_str()) {
        ("drive.google.com", "/uc") => Response::html(FORM_PAGE).header(
            "Set-Cookie",
            "download_warning=tok42; Domain=.google.com; Path=/",
        ),
        ("drive.usercontent.google.com", "/download") => {
            let confirmed = req.query_param("confirm").as_deref() == Some("t")
                && req.query_param("id").as_deref() == Some("FILE123");
            if confirmed && req.cookie("download_warning").as_deref() == Some("tok42") {
                Response::ok(PAYLOAD)
                    .header("Content-Type", "application/octet-stream")
                    .attachment("dataset.tar")
            } else {
                Response::status(403, "Forbidden")
            }
        }
        _ => Response::not_found(),
    }
}

fn proxied_options(proxy: &str, dir: &std::path::Path, store: &Arc<MemoryCookieStore>) -> DownloadOptions {
    DownloadOptions {
        output: Some(dir.to_path_buf()),
        proxy: Some(proxy.to_string()),
        cookie_store: Some(Arc::clone(store) as Arc<dyn CookieStore>),
        quiet: true,
        ..DownloadOptions::default()
    }
}

#[test]
fn confirmation_form_is_followed_on_the_same_session() {
    let proxy = http_server::start(provider);
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryCookieStore::default());

    let result = download(
        "http://drive.google.com/uc?id=FILE123",
        &proxied_options(&proxy, dir.path(), &store),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(result.output, dir.path().join("dataset.tar"));
    assert_eq!(fs::read(&result.output).unwrap(), PAYLOAD);
    assert_eq!(store.save_count(), 1);
    let saved = store.snapshot();
    assert_eq!(saved.get("download_warning").unwrap().value, "tok42");
}

#[test]
fn stored_cookies_are_sent_with_the_first_request() {
    let proxy = http_server::start(|req: &Request| {
        if req.cookie("NID").as_deref() == Some("seed") {
            Response::ok("welcome back").attachment("seen.txt")
        } else {
            Response::status(403, "Forbidden")
        }
    });
    let dir = tempdir().unwrap();
    let jar = CookieJar::parse(".google.com\tTRUE\t/\tFALSE\t0\tNID\tseed\n");
    let store = Arc::new(MemoryCookieStore::new(jar));

    let result = download(
        "http://drive.google.com/uc?id=ANY",
        &proxied_options(&proxy, dir.path(), &store),
        &NoProgress,
    )
    .unwrap();
    assert_eq!(fs::read(result.output).unwrap(), b"welcome back");
    assert_eq!(store.load().unwrap().get("NID").unwrap().value, "seed");
}

#[test]
fn embedded_download_url_is_followed() {
    let page = concat!(
        "<html><script>\n",
        r#"var d = {"title":"x","downloadUrl":"http:\/\/drive.usercontent.google.com\/download?id=FILE123&confirm=t"};"#,
        "\n</script></html>"
    );
    let proxy = http_server::start(move |req: &Request| match req.host.as_str() {
        "drive.google.com" => Response::html(page).header(
            "Set-Cookie",
            "download_warning=tok42; Domain=.google.com; Path=/",
        ),
        _ => provider(req),
    });
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryCookieStore::default());

    let result = download(
        "http://drive.google.com/uc?id=FILE123&export=download",
        &proxied_options(&proxy, dir.path(), &store),
        &NoProgress,
    )
    .unwrap();
    assert_eq!(fs::read(result.output).unwrap(), PAYLOAD);
}

#[test]
fn provider_error_caption_fails_without_saving_cookies() {
    let proxy = http_server::start(|_: &Request| {
        Response::html(
            "<html><body>\n<p class=\"uc-error-subcaption\">Too many users have viewed or downloaded this file recently.</p>\n</body></html>",
        )
        .header("Set-Cookie", "NID=new; Domain=.google.com; Path=/")
    });
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryCookieStore::default());

    let err = download(
        "http://drive.google.com/uc?id=HOT",
        &proxied_options(&proxy, dir.path(), &store),
        &NoProgress,
    )
    .unwrap_err();

    match err {
        Error::Resolution(LinkResolutionError::Provider(msg)) => {
            assert_eq!(msg, "Too many users have viewed or downloaded this file recently.")
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(store.save_count(), 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn page_without_link_is_no_link() {
    let proxy = http_server::start(|_: &Request| Response::html("<html><title>Sign in</title></html>"));
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryCookieStore::default());
    let err = download(
        "http://drive.google.com/uc?id=PRIVATE",
        &proxied_options(&proxy, dir.path(), &store),
        &NoProgress,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Resolution(LinkResolutionError::NoLink)));
    assert!(err.to_string().contains("Anyone with the link"));
}

#[test]
fn endless_confirmation_pages_are_bounded() {
    let proxy = http_server::start(|_: &Request| {
        Response::html(
            "<form id=\"download-form\" action=\"http://drive.google.com/uc\"><input type=\"hidden\" name=\"id\" value=\"LOOP\"></form>",
        )
    });
    let dir = tempdir().unwrap();
    let store = Arc::new(MemoryCookieStore::default());
    let opts = DownloadOptions {
        max_confirmation_hops: 2,
        ..proxied_options(&proxy, dir.path(), &store)
    };
    let err = download("http://drive.google.com/uc?id=LOOP", &opts, &NoProgress).unwrap_err();
    assert!(matches!(
        err,
        Error::Resolution(LinkResolutionError::TooManyConfirmations(2))
    ));
    assert_eq!(store.save_count(), 0);
}
