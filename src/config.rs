use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        api_base_url: get_env_or_default("BOOKDEX_API_URL", "http://localhost:7070"),
        cover_base_url: get_env_or_default("BOOKDEX_COVER_URL", "http://localhost:7070"),
        md5_cover_base_url: get_env_or_default("BOOKDEX_MD5_COVER_URL", "https://libgen.is"),
        gateways_url: get_env_or_default("BOOKDEX_GATEWAYS_URL", ""),
        fixture_path: get_env_or_default("BOOKDEX_FIXTURE", ""),
        backend: get_env_or_default("BOOKDEX_BACKEND", "remote"),
        page_size: get_env_parse("BOOKDEX_PAGE_SIZE", "20"),
        timeout_secs: get_env_parse("BOOKDEX_TIMEOUT_SECS", "30"),
        shuffle_first_page: get_env_parse::<u8>("BOOKDEX_SHUFFLE", "1") != 0,
    }
});

pub struct Config {
    /// Base URL of the remote search endpoint.
    pub api_base_url: String,
    /// Base URL that relative cover references are joined onto.
    pub cover_base_url: String,
    /// Base URL for the md5-derived cover fallback.
    pub md5_cover_base_url: String,
    /// Where to fetch the IPFS gateway list at startup. Empty skips the
    /// fetch and uses the built-in defaults.
    pub gateways_url: String,
    /// JSON file of `Book` records backing the static backend.
    pub fixture_path: String,
    /// Which search backend to select at startup: "remote" or "static".
    pub backend: String,
    /// Records per page for the category browse view.
    pub page_size: usize,
    pub timeout_secs: u64,
    /// Whether the first page of a category gets a presentation shuffle.
    pub shuffle_first_page: bool,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = get_env_or_default(key, default);
    raw.parse()
        .unwrap_or_else(|e| panic!("Invalid value for {key}: {e}"))
}
