use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::FetchError;

/// Anything that can hand back the current CSV text of the sheet.
#[async_trait]
pub trait TabularSource: Send + Sync {
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<String, FetchError>;
}

fn spreadsheet_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid regex"))
}

fn gid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:[?&#]gid=)(\d+)").expect("valid regex"))
}

/// Turn a sheet link (edit view, share link, or export link) into a CSV
/// export URL.
///
/// Links that carry a spreadsheet id are rebuilt from scratch, keeping the
/// tab `gid` when present. Anything else gets a suffix rewrite.
pub fn export_url(reference: &str) -> String {
    let spreadsheet_id = spreadsheet_id_re()
        .captures(reference)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let gid = gid_re()
        .captures(reference)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    if let Some(id) = spreadsheet_id {
        let mut url = format!("https://docs.google.com/spreadsheets/d/{}/export?format=csv", id);
        if let Some(gid) = gid {
            url.push_str(&format!("&gid={}", gid));
        }
        return url;
    }

    if reference.contains("/export") {
        return reference.to_string();
    }

    let mut url = reference.replace("/edit", "/export");
    url.push_str(if reference.contains('?') {
        "&format=csv"
    } else {
        "?format=csv"
    });
    url
}

/// Fetches a published Google Sheet as CSV.
#[derive(Clone, Debug)]
pub struct HttpSheetSource {
    client: Client,
    reference: String,
    url: String,
}

impl HttpSheetSource {
    pub fn new(reference: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let url = export_url(reference);
        info!("📄 [SHEET] Export URL resolved: {}", url);

        Ok(Self {
            client,
            reference: reference.to_string(),
            url,
        })
    }
}

#[async_trait]
impl TabularSource for HttpSheetSource {
    fn describe(&self) -> String {
        self.reference.clone()
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        let resp = self.client.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!("📄 [SHEET] Fetched {} bytes", body.len());
        Ok(body)
    }
}
