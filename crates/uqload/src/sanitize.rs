//! Validation and normalization of user input: file names, directories and
//! video page URLs.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::HostConfig;
use crate::error::{Result, UqloadError};

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s\-_áéíóúñÁÉÍÓÚÑüÜ]").unwrap());

static DEFAULT_MATCHER: LazyLock<HostMatcher> = LazyLock::new(|| {
    HostMatcher::new(&HostConfig::default()).expect("default host config is valid")
});

/// Replaces every disallowed character with a space, then collapses runs of
/// whitespace and trims.
///
/// Only the empty string is rejected. Any other input yields a result, which
/// may itself be empty when nothing survives.
///
/// ```rust
/// use uqload_dl::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("my video.mp4").unwrap(), "my video mp4");
/// ```
pub fn sanitize_text(input: &str) -> Result<String> {
    if input.is_empty() {
        return Err(UqloadError::invalid_argument(
            "text to sanitize must be a non-empty string",
        ));
    }
    let cleaned = DISALLOWED_CHARS.replace_all(input, " ");
    Ok(cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Sanitizes a user supplied file name, rejecting names with nothing left.
pub fn sanitize_filename(input: &str) -> Result<String> {
    let sanitized = sanitize_text(input)
        .map_err(|_| UqloadError::invalid_argument("output file name must not be empty"))?;
    if sanitized.is_empty() {
        return Err(UqloadError::invalid_argument(format!(
            "output file name `{input}` contains only special characters"
        )));
    }
    Ok(sanitized)
}

/// `None` resolves to the current working directory.
pub fn resolve_output_directory(input: Option<&Path>) -> Result<PathBuf> {
    match input {
        None => Ok(std::env::current_dir()?),
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(UqloadError::invalid_argument(format!(
            "invalid folder path: {}",
            dir.display()
        ))),
    }
}

/// Matches canonical video page URLs for a configured host set.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    regex: Regex,
}

impl HostMatcher {
    pub fn new(hosts: &HostConfig) -> Result<Self> {
        if hosts.host.is_empty() || hosts.tlds.is_empty() {
            return Err(UqloadError::invalid_argument(
                "host configuration needs a host name and at least one TLD",
            ));
        }
        let tlds = hosts
            .tlds
            .iter()
            .map(|tld| regex::escape(tld))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"^(?i:https?)://(?:www\.)?{}\.(?:{tlds})/(?:embed-)?[A-Za-z0-9]{{12}}\.html$",
            regex::escape(&hosts.host)
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| UqloadError::invalid_argument(format!("invalid host pattern: {e}")))?;
        Ok(Self { regex })
    }

    pub fn is_known_host_url(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// [`HostMatcher::is_known_host_url`] for the default host set.
pub fn is_known_host_url(url: &str) -> bool {
    DEFAULT_MATCHER.is_known_host_url(url)
}
