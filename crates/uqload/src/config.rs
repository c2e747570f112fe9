use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT},
};
use url::Url;

use crate::error::{Result, UqloadError};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const DEFAULT_PAGE_REFERER: &str = "https://www.google.com";

pub const DEFAULT_HOST: &str = "uqload";
pub const DEFAULT_TLDS: &[&str] = &["io", "com", "co"];
pub const DEFAULT_BASE_URL: &str = "https://uqload.io";

/// 1 MiB per write.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// HTTP options shared by page fetches, the metadata probe and the transfer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Timeout for the metadata probe, also used as the read timeout
    /// between body chunks while streaming.
    pub timeout: Duration,

    /// Total timeout for each page fetch.
    pub page_timeout: Duration,

    pub connect_timeout: Duration,

    pub follow_redirects: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept: DEFAULT_ACCEPT.to_owned(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_owned(),
            timeout: Duration::from_secs(40),
            page_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(30),
            follow_redirects: true,
        }
    }
}

impl ClientConfig {
    /// Headers sent with page fetches.
    pub fn page_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, ACCEPT, &self.accept);
        insert_header(&mut headers, ACCEPT_LANGUAGE, &self.accept_language);
        insert_header(&mut headers, REFERER, DEFAULT_PAGE_REFERER);
        headers
    }

    /// Headers sent to the media host. The referer is the media URL's origin.
    pub fn media_headers(&self, media_url: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, ACCEPT, &self.accept);
        let origin = media_url.origin().ascii_serialization();
        insert_header(&mut headers, REFERER, &origin);
        headers
    }
}

fn insert_header(headers: &mut HeaderMap, name: reqwest::header::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// The set of hosts accepted as video pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub host: String,
    pub tlds: Vec<String>,
    /// Base used when the identifier carries none.
    pub default_base: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            tlds: DEFAULT_TLDS.iter().map(|tld| (*tld).to_owned()).collect(),
            default_base: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub client: ClientConfig,
    pub hosts: HostConfig,

    /// Replaces the scheme and authority of the canonical page URLs when the
    /// pages are fetched. The canonical URL itself is left untouched.
    pub page_origin: Option<Url>,

    pub chunk_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            hosts: HostConfig::default(),
            page_origin: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ResolverConfig {
    /// Maps a canonical page URL onto `page_origin`, if one is configured.
    pub fn request_url(&self, canonical: &str) -> Result<String> {
        let Some(origin) = &self.page_origin else {
            return Ok(canonical.to_owned());
        };
        let canonical = Url::parse(canonical)
            .map_err(|e| UqloadError::invalid_argument(format!("{canonical}: {e}")))?;
        origin
            .join(canonical.path())
            .map(String::from)
            .map_err(|e| UqloadError::invalid_argument(format!("{origin}: {e}")))
    }
}

fn client_builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    let redirect = if config.follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.timeout)
        .redirect(redirect)
}

fn build_client(builder: reqwest::ClientBuilder) -> Result<Client> {
    builder
        .build()
        .map_err(|e| UqloadError::network("<client>", format!("failed to build HTTP client: {e}")))
}

/// Client for page fetches. Compressed pages are decoded transparently.
pub fn create_client(config: &ClientConfig) -> Result<Client> {
    build_client(client_builder(config))
}

/// Client for the media probe and transfer. Decompression stays off so the
/// probed `content-length` matches the bytes written to disk.
pub fn create_media_client(config: &ClientConfig) -> Result<Client> {
    build_client(client_builder(config).no_gzip().no_deflate())
}
