//! Extraction rules over the two page documents.
//!
//! The embed document carries the media URL, thumbnail and a script title.
//! The home document carries a heading and a `[WxH, duration]` token, unless
//! it reports an error through an `err` class.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, UqloadError};

const DELETED_MARKER: &str = "File was deleted";
const ERROR_CLASS: &str = "err";

static MEDIA_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://.+/v\.mp4").unwrap());
static IMAGE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://.*?\.jpg").unwrap());
static SCRIPT_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"title:\s*"([^"]+)""#).unwrap());
static CLASS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class\s*=\s*['"]([^'" ]+)['"]"#).unwrap());
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap());
static TEXTAREA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<textarea[^>]*>(.*?)</textarea>").unwrap());
static RESOLUTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+x\d+), ((?:\d+:){1,2}\d+)\]").unwrap());

#[inline]
fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_deleted(embed: &str) -> bool {
    embed.contains(DELETED_MARKER)
}

/// First `.../v.mp4` URL in the document.
pub fn media_url(embed: &str) -> Option<&str> {
    MEDIA_URL_REGEX.find(embed).map(|m| m.as_str())
}

/// First `.jpg` URL in the document.
pub fn image_url(embed: &str) -> Option<&str> {
    IMAGE_URL_REGEX.find(embed).map(|m| m.as_str())
}

pub fn script_title(embed: &str) -> Option<&str> {
    capture_group_1(&SCRIPT_TITLE_REGEX, embed)
}

/// Values of single-class `class="..."` attributes, in document order.
pub fn class_names(home: &str) -> Vec<&str> {
    CLASS_REGEX
        .captures_iter(home)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn has_error_class(home: &str) -> bool {
    class_names(home).contains(&ERROR_CLASS)
}

/// Text of the first `<h1>`, whitespace collapsed. Empty headings are ignored.
pub fn heading_title(home: &str) -> Option<String> {
    let heading = capture_group_1(&HEADING_REGEX, home)?;
    let collapsed = heading.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// `(resolution, duration)` from the first textarea holding a
/// `[WIDTHxHEIGHT, [H:]M:S]` token.
pub fn resolution_and_duration(home: &str) -> Option<(String, String)> {
    TEXTAREA_REGEX
        .captures_iter(home)
        .filter_map(|caps| caps.get(1))
        .find_map(|textarea| {
            RESOLUTION_REGEX
                .captures(textarea.as_str())
                .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedDetails {
    pub media_url: String,
    pub image_url: Option<String>,
    pub script_title: Option<String>,
}

/// Details from a home document that did not report an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeDetails {
    pub title: Option<String>,
    pub resolution: Option<String>,
    pub duration: Option<String>,
}

pub fn embed_details(embed: &str) -> Result<EmbedDetails> {
    if is_deleted(embed) {
        return Err(UqloadError::video_not_found(
            "the video has been deleted or does not exist",
        ));
    }
    let media_url = media_url(embed).ok_or_else(|| {
        UqloadError::video_not_found("no media URL found in the embed page")
    })?;

    Ok(EmbedDetails {
        media_url: media_url.to_owned(),
        image_url: image_url(embed).map(ToOwned::to_owned),
        script_title: script_title(embed).map(ToOwned::to_owned),
    })
}

/// `None` when the home document carries the error class.
pub fn home_details(home: &str) -> Option<HomeDetails> {
    if has_error_class(home) {
        return None;
    }
    let (resolution, duration) = resolution_and_duration(home).unzip();
    Some(HomeDetails {
        title: heading_title(home),
        resolution,
        duration,
    })
}

/// The home heading wins over the embed script title.
pub fn choose_title(embed: &EmbedDetails, home: Option<&HomeDetails>) -> Option<String> {
    home.and_then(|home| home.title.clone())
        .or_else(|| embed.script_title.clone())
}
