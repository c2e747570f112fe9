use serde::{Deserialize, Serialize};

/// Resolved information about a video.
///
/// Serializes to the mapping `url, title, image_url, resolution, duration,
/// size, type`. `resolution` and `duration` are either both present or both
/// `None`.
///
/// # Examples
///
/// ```rust
/// use uqload_dl::media::VideoMetadata;
///
/// let metadata = VideoMetadata {
///     media_url: "https://m1.uqload.io/abc/v.mp4".to_string(),
///     image_url: None,
///     title: "My video".to_string(),
///     resolution: None,
///     duration: None,
///     size_bytes: 42,
///     content_type: "video/mp4".to_string(),
/// };
/// let json = serde_json::to_value(&metadata).unwrap();
/// assert_eq!(json["size"], 42);
/// assert_eq!(json["type"], "video/mp4");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    #[serde(rename = "url")]
    pub media_url: String,
    pub title: String,
    pub image_url: Option<String>,
    pub resolution: Option<String>,
    pub duration: Option<String>,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl VideoMetadata {
    /// Key/value rows in display order. Absent values render as `None`.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "None".to_string());
        vec![
            ("url", self.media_url.clone()),
            ("title", self.title.clone()),
            ("image_url", or_none(&self.image_url)),
            ("resolution", or_none(&self.resolution)),
            ("duration", or_none(&self.duration)),
            ("size", self.size_bytes.to_string()),
            ("type", self.content_type.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys() {
        let metadata = VideoMetadata {
            media_url: "https://m1.uqload.io/abc/v.mp4".to_string(),
            image_url: Some("https://m1.uqload.io/i/abc.jpg".to_string()),
            title: "t".to_string(),
            resolution: Some("1280x720".to_string()),
            duration: Some("12:00".to_string()),
            size_bytes: 10,
            content_type: "video/mp4".to_string(),
        };
        let json = serde_json::to_value(&metadata).unwrap();
        let mut keys = json.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(
            keys,
            ["duration", "image_url", "resolution", "size", "title", "type", "url"]
        );
        assert_eq!(metadata.rows()[3], ("resolution", "1280x720".to_string()));
    }
}
