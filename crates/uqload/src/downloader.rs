//! # File Downloader
//!
//! Streams a direct media URL to disk. Construction performs a metadata probe
//! (`HEAD`) to learn the size and content type. [`FileDownloader::download`]
//! then streams the body in fixed-size chunks, reporting progress after every
//! chunk, and never overwrites an existing file.
//!
//! Errors and cancellation during the transfer do not propagate: they end in a
//! [`DownloadOutcome`] and leave any partial file on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use bytes::BytesMut;
use futures::StreamExt;
use parking_lot::Mutex;
use regex::Regex;
use reqwest::{
    Client, StatusCode, Url,
    header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap},
};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::{ClientConfig, DEFAULT_CHUNK_SIZE, create_media_client};
use crate::error::{Result, UqloadError};
use crate::sanitize::{resolve_output_directory, sanitize_filename, sanitize_text};
use crate::token::{SharedTokenSource, default_tokens};

static MEDIA_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+\.\w+$").unwrap());

/// Suffixed names tried after the plain name is taken.
const UNIQUE_NAME_ATTEMPTS: usize = 8;

/// Invoked with `(bytes_downloaded, total_bytes)` after every written chunk.
/// Runs on the transfer task, so it should return quickly.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed { path: PathBuf, bytes: u64 },
    Cancelled { path: PathBuf, bytes: u64 },
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Completed { path, .. } | Self::Cancelled { path, .. } => Some(path),
            Self::Failed { .. } => None,
        }
    }
}

pub struct FileDownloaderBuilder {
    url: String,
    filename: Option<String>,
    output_dir: Option<PathBuf>,
    progress: Option<ProgressCallback>,
    tokens: SharedTokenSource,
    config: ClientConfig,
    client: Option<Client>,
    chunk_size: usize,
}

impl FileDownloaderBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
            output_dir: None,
            progress: None,
            tokens: default_tokens(),
            config: ClientConfig::default(),
            client: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// File name without extension. Defaults to the URL's file stem.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn filename_opt(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    /// Defaults to the current working directory.
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

    pub fn on_progress_opt(mut self, callback: Option<ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    pub fn tokens(mut self, tokens: SharedTokenSource) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Reuses an existing client instead of building one from the config.
    /// The client should not decompress responses, or the probed size will
    /// not match the transferred bytes.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Validates the inputs and runs the metadata probe.
    pub async fn build(self) -> Result<FileDownloader> {
        let url = validate_media_url(&self.url)?;
        let (stem, extension) = split_file_name(&self.url);

        let filename = match self.filename {
            Some(filename) => sanitize_filename(&filename)?,
            None => sanitize_text(stem)
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| self.tokens.token()),
        };
        let output_dir = resolve_output_directory(self.output_dir.as_deref())?;

        if self.chunk_size == 0 {
            return Err(UqloadError::invalid_argument("chunk size must be non-zero"));
        }

        let client = match self.client {
            Some(client) => client,
            None => create_media_client(&self.config)?,
        };
        let headers = self.config.media_headers(&url);
        let (total_size, content_type) =
            probe(&client, &self.url, &headers, self.config.timeout).await?;

        Ok(FileDownloader {
            extension: extension.to_owned(),
            url: self.url,
            client,
            headers,
            filename,
            output_dir,
            progress: self.progress,
            tokens: self.tokens,
            chunk_size: self.chunk_size,
            total_size,
            content_type,
            destination: Mutex::new(None),
            bytes_transferred: AtomicU64::new(0),
        })
    }
}

pub struct FileDownloader {
    url: String,
    client: Client,
    headers: HeaderMap,
    filename: String,
    extension: String,
    output_dir: PathBuf,
    progress: Option<ProgressCallback>,
    tokens: SharedTokenSource,
    chunk_size: usize,
    total_size: u64,
    content_type: String,
    destination: Mutex<Option<PathBuf>>,
    bytes_transferred: AtomicU64,
}

impl std::fmt::Debug for FileDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownloader")
            .field("url", &self.url)
            .field("filename", &self.filename)
            .field("extension", &self.extension)
            .field("output_dir", &self.output_dir)
            .field("total_size", &self.total_size)
            .field("content_type", &self.content_type)
            .field("destination", &*self.destination.lock())
            .finish_non_exhaustive()
    }
}

impl FileDownloader {
    pub fn builder(url: impl Into<String>) -> FileDownloaderBuilder {
        FileDownloaderBuilder::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Includes the leading dot, e.g. `.mp4`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred.load(Ordering::Acquire)
    }

    /// Where the last [`download`](Self::download) wrote to.
    pub fn destination(&self) -> Option<PathBuf> {
        self.destination.lock().clone()
    }

    /// Streams the file to disk. Never returns an error: failures and
    /// cancellation are reported through the outcome.
    #[instrument(skip(self, cancel), fields(url = %self.url), level = "debug")]
    pub async fn download(&self, cancel: &CancellationToken) -> DownloadOutcome {
        match self.transfer(cancel).await {
            Ok(outcome @ DownloadOutcome::Completed { .. }) => {
                if let Some(path) = outcome.path() {
                    info!(path = %path.display(), "Video saved as: {}", path.display());
                }
                outcome
            }
            Ok(outcome) => {
                info!(bytes = self.bytes_transferred(), "Operation canceled");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "An error occurred during the download");
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn transfer(&self, cancel: &CancellationToken) -> Result<DownloadOutcome> {
        let response = self
            .client
            .get(self.url.as_str())
            .headers(self.headers.clone())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(UqloadError::http_status(
                response.status(),
                self.url.as_str(),
                "download",
            ));
        }

        let (mut file, path) = self.create_destination().await?;
        *self.destination.lock() = Some(path.clone());
        self.bytes_transferred.store(0, Ordering::Release);
        debug!(path = %path.display(), total = self.total_size, "Writing file");

        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::with_capacity(self.chunk_size);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.finish(file, path, true).await,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    while buffer.len() >= self.chunk_size {
                        let chunk = buffer.split_to(self.chunk_size);
                        self.write_chunk(&mut file, &chunk).await?;
                        if cancel.is_cancelled() {
                            return self.finish(file, path, true).await;
                        }
                    }
                }
                Some(Err(e)) => {
                    // Keep what was written so far.
                    file.flush().await?;
                    return Err(e.into());
                }
                None => break,
            }
        }

        if !buffer.is_empty() {
            self.write_chunk(&mut file, &buffer).await?;
        }
        self.finish(file, path, false).await
    }

    async fn write_chunk(&self, file: &mut File, chunk: &[u8]) -> Result<()> {
        file.write_all(chunk).await?;
        let done = self
            .bytes_transferred
            .fetch_add(chunk.len() as u64, Ordering::AcqRel)
            + chunk.len() as u64;
        if let Some(callback) = &self.progress {
            callback(done, self.total_size);
        }
        Ok(())
    }

    async fn finish(&self, mut file: File, path: PathBuf, cancelled: bool) -> Result<DownloadOutcome> {
        file.flush().await?;
        let bytes = self.bytes_transferred();
        Ok(if cancelled {
            DownloadOutcome::Cancelled { path, bytes }
        } else {
            DownloadOutcome::Completed { path, bytes }
        })
    }

    /// Creates `{filename}{ext}`, or `{filename}_{token}{ext}` when that is
    /// taken. An existing file is never opened.
    async fn create_destination(&self) -> Result<(File, PathBuf)> {
        let mut path = self
            .output_dir
            .join(format!("{}{}", self.filename, self.extension));

        for _ in 0..=UNIQUE_NAME_ATTEMPTS {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let unique = self.output_dir.join(format!(
                        "{}_{}{}",
                        self.filename,
                        self.tokens.token(),
                        self.extension
                    ));
                    debug!(existing = %path.display(), path = %unique.display(), "Destination exists, using a unique name");
                    path = unique;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "no free file name for `{}{}` in {}",
                self.filename,
                self.extension,
                self.output_dir.display()
            ),
        )
        .into())
    }

    /// Removes the downloaded file. Returns whether a file was removed.
    pub async fn delete_file(&self) -> Result<bool> {
        let Some(path) = self.destination() else {
            return Ok(false);
        };
        if !tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Ok(false);
        }
        tokio::fs::remove_file(&path).await?;
        info!("deleted : {}", path.display());
        Ok(true)
    }
}

fn validate_media_url(url: &str) -> Result<Url> {
    if url.is_empty() {
        return Err(UqloadError::invalid_argument("URL must be a non-empty string"));
    }
    if !MEDIA_URL_REGEX.is_match(url) {
        return Err(UqloadError::invalid_argument(format!(
            "invalid URL `{url}`: URL does not contain a file extension"
        )));
    }
    Url::parse(url).map_err(|e| UqloadError::invalid_argument(format!("invalid URL `{url}`: {e}")))
}

/// Splits the URL's last segment into stem and extension, where the
/// extension keeps its leading dot. Leading dots never start an extension.
fn split_file_name(url: &str) -> (&str, &str) {
    let basename = url.rsplit('/').next().unwrap_or(url);
    match basename.rfind('.') {
        Some(i) if basename[..i].chars().any(|c| c != '.') => basename.split_at(i),
        _ => (basename, ""),
    }
}

async fn probe(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    timeout: Duration,
) -> Result<(u64, String)> {
    let response = client
        .head(url)
        .headers(headers.clone())
        .timeout(timeout)
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Err(UqloadError::http_status(
            response.status(),
            url,
            "metadata probe",
        ));
    }

    // `Response::content_length` reflects the (empty) HEAD body, read the header.
    let total_size = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|size| *size > 0)
        .ok_or_else(|| UqloadError::missing_metadata(url, "content-length"))?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    debug!(url = %url, total_size, content_type = %content_type, "Metadata probe succeeded");
    Ok((total_size, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &[u8] = b"0123456789abcdef";

    async fn media_server(body: &'static [u8]) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/media/v.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("content-type", "video/mp4"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/media/v.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("content-type", "video/mp4"),
            )
            .mount(&server)
            .await;
        server
    }

    fn fixed_tokens() -> SharedTokenSource {
        Arc::new(|| "tok".to_string())
    }

    fn sequential_tokens(tokens: &'static [&'static str]) -> SharedTokenSource {
        let next = Arc::new(AtomicUsize::new(0));
        Arc::new(move || {
            let i = next.fetch_add(1, Ordering::SeqCst).min(tokens.len() - 1);
            tokens[i].to_string()
        })
    }

    /// One response per connection. `HEAD` gets the full length, `GET`
    /// promises the full length and hangs up after `sent` bytes.
    async fn truncating_server(body: &'static [u8], sent: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                        body.len()
                    );
                    socket.write_all(head.as_bytes()).await.unwrap();
                    if request.starts_with(b"GET") {
                        socket.write_all(&body[..sent]).await.unwrap();
                    }
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("https://a.b/x/v.mp4"), ("v", ".mp4"));
        assert_eq!(split_file_name("https://a.b/x/archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_file_name("https://a.b/x/.hidden"), (".hidden", ""));
        assert_eq!(split_file_name("https://a.b/x/noext"), ("noext", ""));
    }

    #[test]
    fn test_validate_media_url() {
        assert!(validate_media_url("https://a.b/x/v.mp4").is_ok());
        assert!(validate_media_url("").is_err());
        assert!(validate_media_url("https://a.b/x/video").is_err());
        assert!(validate_media_url("ftp://a.b/x/v.mp4").is_err());
        assert!(validate_media_url("https://a.b/v.mp4?x=1").is_err());
    }

    #[tokio::test]
    async fn test_probe_reads_size_and_type() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .output_dir(dir.path())
            .build()
            .await
            .unwrap();

        assert_eq!(downloader.total_size(), BODY.len() as u64);
        assert_eq!(downloader.content_type(), "video/mp4");
        assert_eq!(downloader.filename(), "v");
        assert_eq!(downloader.extension(), ".mp4");
    }

    #[tokio::test]
    async fn test_probe_failures() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/empty.mp4"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let missing = FileDownloader::builder(format!("{}/missing.mp4", server.uri()))
            .build()
            .await;
        assert!(matches!(missing, Err(UqloadError::Network { .. })));

        let empty = FileDownloader::builder(format!("{}/empty.mp4", server.uri()))
            .build()
            .await;
        assert!(matches!(empty, Err(UqloadError::MissingMetadata { .. })));
    }

    #[tokio::test]
    async fn test_invalid_inputs_fail_before_probe() {
        let dir = tempfile::tempdir().unwrap();
        let bad_name = FileDownloader::builder("https://a.b/v.mp4")
            .filename("???")
            .build()
            .await;
        assert!(matches!(bad_name, Err(UqloadError::InvalidArgument(_))));

        let bad_dir = FileDownloader::builder("https://a.b/v.mp4")
            .output_dir(dir.path().join("nope"))
            .build()
            .await;
        assert!(matches!(bad_dir, Err(UqloadError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_download_reports_progress_per_chunk() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("clip")
            .output_dir(dir.path())
            .chunk_size(5)
            .on_progress(Arc::new(move |done, total| sink.lock().push((done, total))))
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&CancellationToken::new()).await;
        let expected = dir.path().join("clip.mp4");
        assert_eq!(
            outcome,
            DownloadOutcome::Completed {
                path: expected.clone(),
                bytes: 16
            }
        );
        assert_eq!(std::fs::read(&expected).unwrap(), BODY);
        assert_eq!(*seen.lock(), vec![(5, 16), (10, 16), (15, 16), (16, 16)]);
    }

    #[tokio::test]
    async fn test_download_never_overwrites() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("title.mp4");
        std::fs::write(&existing, b"keep me").unwrap();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("title")
            .output_dir(dir.path())
            .tokens(fixed_tokens())
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&CancellationToken::new()).await;
        let unique = dir.path().join("title_tok.mp4");
        assert_eq!(outcome.path(), Some(unique.as_path()));
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
        assert_eq!(std::fs::read(&unique).unwrap(), BODY);
    }

    #[tokio::test]
    async fn test_download_retries_taken_unique_names() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("title.mp4"), b"first").unwrap();
        std::fs::write(dir.path().join("title_a.mp4"), b"second").unwrap();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("title")
            .output_dir(dir.path())
            .tokens(sequential_tokens(&["a", "b"]))
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&CancellationToken::new()).await;
        let unique = dir.path().join("title_b.mp4");
        assert_eq!(outcome.path(), Some(unique.as_path()));
        assert_eq!(std::fs::read(dir.path().join("title.mp4")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join("title_a.mp4")).unwrap(), b"second");
        assert_eq!(std::fs::read(&unique).unwrap(), BODY);
    }

    #[tokio::test]
    async fn test_download_fails_rather_than_overwrite() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("title.mp4"), b"first").unwrap();
        std::fs::write(dir.path().join("title_tok.mp4"), b"second").unwrap();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("title")
            .output_dir(dir.path())
            .tokens(fixed_tokens())
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&CancellationToken::new()).await;
        assert!(matches!(outcome, DownloadOutcome::Failed { .. }));
        assert_eq!(downloader.destination(), None);
        assert_eq!(std::fs::read(dir.path().join("title.mp4")).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join("title_tok.mp4")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_connection_drop_mid_stream_fails_and_keeps_partial_file() {
        let base = truncating_server(BODY, 6).await;
        let dir = tempfile::tempdir().unwrap();

        let downloader = FileDownloader::builder(format!("{base}/media/v.mp4"))
            .filename("cut")
            .output_dir(dir.path())
            .chunk_size(4)
            .build()
            .await
            .unwrap();
        assert_eq!(downloader.total_size(), BODY.len() as u64);

        let outcome = downloader.download(&CancellationToken::new()).await;
        assert!(matches!(outcome, DownloadOutcome::Failed { .. }));

        let path = dir.path().join("cut.mp4");
        assert_eq!(downloader.destination(), Some(path.clone()));
        let written = std::fs::read(&path).unwrap();
        assert!(written.len() <= 6);
        assert!(BODY.starts_with(&written));
        assert_eq!(downloader.bytes_transferred(), written.len() as u64);
    }

    #[tokio::test]
    async fn test_encoded_media_is_stored_verbatim() {
        let server = MockServer::start().await;
        for verb in ["HEAD", "GET"] {
            Mock::given(method(verb))
                .and(path("/media/v.mp4"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_bytes(BODY)
                        .insert_header("content-encoding", "gzip"),
                )
                .mount(&server)
                .await;
        }
        let dir = tempfile::tempdir().unwrap();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("raw")
            .output_dir(dir.path())
            .build()
            .await
            .unwrap();
        assert_eq!(downloader.total_size(), BODY.len() as u64);

        let outcome = downloader.download(&CancellationToken::new()).await;
        let path = dir.path().join("raw.mp4");
        assert_eq!(
            outcome,
            DownloadOutcome::Completed {
                path: path.clone(),
                bytes: BODY.len() as u64
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), BODY);
    }

    #[tokio::test]
    async fn test_cancelled_download_keeps_partial_file_until_deleted() {
        let server = media_server(BODY).await;
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let downloader = FileDownloader::builder(format!("{}/media/v.mp4", server.uri()))
            .filename("partial")
            .output_dir(dir.path())
            .chunk_size(4)
            .on_progress(Arc::new(move |_, _| trigger.cancel()))
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&cancel).await;
        let path = dir.path().join("partial.mp4");
        assert_eq!(
            outcome,
            DownloadOutcome::Cancelled {
                path: path.clone(),
                bytes: 4
            }
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"0123");

        assert!(downloader.delete_file().await.unwrap());
        assert!(!path.exists());
        assert!(!downloader.delete_file().await.unwrap());
    }

    #[tokio::test]
    async fn test_download_http_error_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(BODY))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let downloader = FileDownloader::builder(format!("{}/v.mp4", server.uri()))
            .output_dir(dir.path())
            .build()
            .await
            .unwrap();

        let outcome = downloader.download(&CancellationToken::new()).await;
        assert!(matches!(outcome, DownloadOutcome::Failed { .. }));
        assert_eq!(downloader.destination(), None);
        assert!(!downloader.delete_file().await.unwrap());
    }
}
