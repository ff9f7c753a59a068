use crate::models::Book;
use reqwest::Url;

/// Fallback gateway set used when the startup fetch is skipped or fails.
pub const DEFAULT_GATEWAYS: &[&str] = &[
    "https://ipfs.io",
    "https://dweb.link",
    "https://cloudflare-ipfs.com",
    "https://gateway.pinata.cloud",
];

/// Process-wide session state, populated once at startup and read-only
/// afterwards. Passed explicitly to whoever needs it instead of living in
/// a global.
pub struct AppContext {
    gateways: Vec<String>,
}

impl AppContext {
    /// Build the context at startup. When `gateways_url` is non-empty the
    /// gateway list is fetched from it once (a JSON array of base URLs);
    /// any failure falls back to the built-in defaults.
    pub async fn init(client: &reqwest::Client, gateways_url: &str) -> Self {
        if gateways_url.is_empty() {
            return Self::with_gateways(default_gateways());
        }
        match fetch_gateways(client, gateways_url).await {
            Ok(gateways) if !gateways.is_empty() => {
                log::info!("loaded {} content gateways from {gateways_url}", gateways.len());
                Self::with_gateways(gateways)
            }
            Ok(_) => {
                log::warn!("gateway list at {gateways_url} was empty, using defaults");
                Self::with_gateways(default_gateways())
            }
            Err(e) => {
                log::warn!("failed to fetch gateway list from {gateways_url}: {e:#}");
                Self::with_gateways(default_gateways())
            }
        }
    }

    pub fn with_gateways(gateways: Vec<String>) -> Self {
        Self { gateways }
    }

    pub fn gateways(&self) -> &[String] {
        &self.gateways
    }

    /// One candidate download link per gateway for a record that carries a
    /// content identifier. Empty when it does not. All options are offered;
    /// no cross-gateway retry is attempted here.
    pub fn download_links(&self, book: &Book) -> Vec<String> {
        if book.ipfs_cid.is_empty() {
            return Vec::new();
        }
        let filename = format!("{}.{}", book.title, book.extension);
        self.gateways
            .iter()
            .filter_map(|gateway| {
                let raw = format!("{}/ipfs/{}", gateway.trim_end_matches('/'), book.ipfs_cid);
                Url::parse_with_params(&raw, [("filename", filename.as_str())]).ok()
            })
            .map(String::from)
            .collect()
    }
}

fn default_gateways() -> Vec<String> {
    DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect()
}

async fn fetch_gateways(client: &reqwest::Client, url: &str) -> anyhow::Result<Vec<String>> {
    let gateways = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<String>>()
        .await?;
    Ok(gateways)
}
