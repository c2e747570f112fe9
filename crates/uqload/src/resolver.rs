//! Resolution of a user supplied identifier into [`VideoMetadata`].
//!
//! A [`Resolver`] resolves at most once, the result is cached and shared by
//! [`Resolver::metadata`] and [`Resolver::download`].

use std::path::PathBuf;

use reqwest::Client;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::{HostConfig, ResolverConfig, create_client, create_media_client};
use crate::downloader::{DownloadOutcome, FileDownloader, ProgressCallback};
use crate::error::{Result, UqloadError};
use crate::extract;
use crate::fetcher::ConcurrentFetcher;
use crate::media::VideoMetadata;
use crate::sanitize::{HostMatcher, resolve_output_directory, sanitize_filename, sanitize_text};
use crate::token::{SharedTokenSource, default_tokens};

const EMBED_PREFIX: &str = "embed-";
const PAGE_SUFFIX: &str = ".html";
const MIN_INPUT_LEN: usize = 12;

/// Builds the canonical embed URL from a bare id, an id with `.html` or
/// `embed-`, or a full page URL.
///
/// ```rust
/// use uqload_dl::resolver::normalize;
///
/// let url = normalize("vule3vel9n5q", "https://uqload.io");
/// assert_eq!(url, "https://uqload.io/embed-vule3vel9n5q.html");
/// assert_eq!(normalize(&url, "https://uqload.io"), url);
/// ```
pub fn normalize(raw: &str, default_base: &str) -> String {
    let (base, segment) = raw.rsplit_once('/').unwrap_or((default_base, raw));

    let mut segment = segment.to_owned();
    if !segment.contains(PAGE_SUFFIX) {
        segment.push_str(PAGE_SUFFIX);
    }
    if !segment.contains(EMBED_PREFIX) {
        segment.insert_str(0, EMBED_PREFIX);
    }

    format!("{base}/{segment}")
}

/// Identity of a requested video. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    raw_input: String,
    canonical_url: String,
}

impl VideoReference {
    pub fn parse(raw: &str, hosts: &HostConfig) -> Result<Self> {
        let matcher = HostMatcher::new(hosts)?;
        let raw = raw.trim();
        if raw.chars().count() < MIN_INPUT_LEN {
            return Err(UqloadError::invalid_argument(format!(
                "invalid Uqload URL `{raw}`"
            )));
        }

        let canonical_url = normalize(raw, &hosts.default_base);
        if !matcher.is_known_host_url(&canonical_url) {
            return Err(UqloadError::invalid_argument(format!(
                "invalid Uqload URL `{raw}`"
            )));
        }

        Ok(Self {
            raw_input: raw.to_owned(),
            canonical_url,
        })
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The canonical `.../embed-{id}.html` URL.
    pub fn embed_url(&self) -> &str {
        &self.canonical_url
    }

    /// The sibling page without the `embed-` prefix.
    pub fn home_url(&self) -> String {
        match self.canonical_url.rsplit_once('/') {
            Some((base, segment)) => {
                let segment = segment.strip_prefix(EMBED_PREFIX).unwrap_or(segment);
                format!("{base}/{segment}")
            }
            None => self.canonical_url.clone(),
        }
    }

    /// The 12 character identifier.
    pub fn id(&self) -> &str {
        let segment = self
            .canonical_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.canonical_url);
        let segment = segment.strip_prefix(EMBED_PREFIX).unwrap_or(segment);
        segment.strip_suffix(PAGE_SUFFIX).unwrap_or(segment)
    }
}

struct Resolved {
    metadata: VideoMetadata,
    downloader: FileDownloader,
}

pub struct ResolverBuilder {
    input: String,
    output_file: Option<String>,
    output_dir: Option<PathBuf>,
    progress: Option<ProgressCallback>,
    tokens: SharedTokenSource,
    config: ResolverConfig,
    client: Option<Client>,
}

impl ResolverBuilder {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output_file: None,
            output_dir: None,
            progress: None,
            tokens: default_tokens(),
            config: ResolverConfig::default(),
            client: None,
        }
    }

    /// Overrides the file name derived from the video title.
    pub fn output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    pub fn output_file_opt(mut self, name: Option<String>) -> Self {
        self.output_file = name;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn output_dir_opt(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn tokens(mut self, tokens: SharedTokenSource) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `client` for both page fetches and media requests.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validates every input up front. No request is made.
    pub fn build(self) -> Result<Resolver> {
        let reference = VideoReference::parse(&self.input, &self.config.hosts)?;
        let output_dir = resolve_output_directory(self.output_dir.as_deref())?;
        let output_file = self
            .output_file
            .as_deref()
            .map(sanitize_filename)
            .transpose()?;
        let (client, media_client) = match self.client {
            Some(client) => (client.clone(), client),
            None => (
                create_client(&self.config.client)?,
                create_media_client(&self.config.client)?,
            ),
        };
        let fetcher = ConcurrentFetcher::new(client, &self.config.client);

        Ok(Resolver {
            reference,
            output_file,
            output_dir,
            progress: self.progress,
            tokens: self.tokens,
            config: self.config,
            media_client,
            fetcher,
            resolved: OnceCell::new(),
        })
    }
}

pub struct Resolver {
    reference: VideoReference,
    output_file: Option<String>,
    output_dir: PathBuf,
    progress: Option<ProgressCallback>,
    tokens: SharedTokenSource,
    config: ResolverConfig,
    media_client: Client,
    fetcher: ConcurrentFetcher,
    resolved: OnceCell<Resolved>,
}

impl Resolver {
    pub fn builder(input: impl Into<String>) -> ResolverBuilder {
        ResolverBuilder::new(input)
    }

    pub fn reference(&self) -> &VideoReference {
        &self.reference
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }

    pub async fn metadata(&self) -> Result<&VideoMetadata> {
        Ok(&self.resolved().await?.metadata)
    }

    pub async fn downloader(&self) -> Result<&FileDownloader> {
        Ok(&self.resolved().await?.downloader)
    }

    /// Resolves if needed, then streams the media file.
    ///
    /// Resolution errors propagate. Transfer errors are part of the outcome.
    pub async fn download(&self, cancel: &CancellationToken) -> Result<DownloadOutcome> {
        let resolved = self.resolved().await?;
        Ok(resolved.downloader.download(cancel).await)
    }

    async fn resolved(&self) -> Result<&Resolved> {
        self.resolved.get_or_try_init(|| self.resolve()).await
    }

    #[instrument(skip(self), fields(url = %self.reference.embed_url()), level = "debug")]
    async fn resolve(&self) -> Result<Resolved> {
        info!("Looking for video...");

        let embed_url = self.reference.embed_url();
        let home_url = self.reference.home_url();
        let urls = [
            self.config.request_url(embed_url)?,
            self.config.request_url(&home_url)?,
        ];

        let mut bodies = self.fetcher.fetch_all(&urls).await?.into_iter();
        let (Some(embed_doc), Some(home_doc)) = (
            bodies.next().flatten(),
            bodies.next().flatten(),
        ) else {
            return Err(UqloadError::network(embed_url, "no content"));
        };

        let embed = extract::embed_details(&embed_doc)?;
        let home = extract::home_details(&home_doc);
        if home.is_none() {
            debug!(url = %home_url, "Home page reports an error, skipping title refinement");
        }

        let filename = match &self.output_file {
            Some(name) => name.clone(),
            None => extract::choose_title(&embed, home.as_ref())
                .and_then(|title| sanitize_text(&title).ok())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| self.tokens.token()),
        };
        debug!(media_url = %embed.media_url, filename = %filename, "Extracted video details");

        let mut builder = FileDownloader::builder(embed.media_url.clone())
            .filename(filename.clone())
            .output_dir(self.output_dir.clone())
            .tokens(self.tokens.clone())
            .config(self.config.client.clone())
            .client(self.media_client.clone())
            .chunk_size(self.config.chunk_size);
        if let Some(progress) = &self.progress {
            builder = builder.on_progress(progress.clone());
        }
        let downloader = builder.build().await?;

        let (resolution, duration) = home
            .map(|home| (home.resolution, home.duration))
            .unwrap_or_default();
        let metadata = VideoMetadata {
            media_url: embed.media_url,
            title: filename,
            image_url: embed.image_url,
            resolution,
            duration,
            size_bytes: downloader.total_size(),
            content_type: downloader.content_type().to_owned(),
        };
        info!(title = %metadata.title, size = metadata.size_bytes, "Video resolved");

        Ok(Resolved {
            metadata,
            downloader,
        })
    }
}
