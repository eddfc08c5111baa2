use serde::{Deserialize, Serialize};

// Canned payloads. Defaults reproduce the classroom demo bot these replies
// were first written for.

const DEMO_IMAGE_URL: &str = "https://ryankert01.github.io/yzu-oss-hw4/image.png";
const DEMO_VIDEO_URL: &str = "https://ryankert01.github.io/yzu-oss-hw4/video.mp4";
const DEMO_VIDEO_PREVIEW_URL: &str = "https://static01.nyt.com/images/2025/05/03/multimedia/03biz-berkshire-file-ckmj/03biz-berkshire-file-ckmj-articleLarge.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextReply {
    pub keyword: String,
    pub text: String,
}

impl Default for TextReply {
    fn default() -> Self {
        Self {
            keyword: "文字".to_string(),
            text: "這是一則文字回覆！".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerReply {
    pub keyword: String,
    #[serde(rename = "packageId")]
    pub package_id: String,
    #[serde(rename = "stickerId")]
    pub sticker_id: String,
}

impl Default for StickerReply {
    fn default() -> Self {
        Self {
            keyword: "貼圖".to_string(),
            package_id: "1".to_string(),
            sticker_id: "1".to_string(),
        }
    }
}

/// Used for both the image and the video keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReply {
    pub keyword: String,
    pub url: String,
    #[serde(rename = "previewUrl")]
    pub preview_url: String,
}

fn default_image_reply() -> MediaReply {
    MediaReply {
        keyword: "圖片".to_string(),
        url: DEMO_IMAGE_URL.to_string(),
        preview_url: DEMO_IMAGE_URL.to_string(),
    }
}

fn default_video_reply() -> MediaReply {
    MediaReply {
        keyword: "影片".to_string(),
        url: DEMO_VIDEO_URL.to_string(),
        preview_url: DEMO_VIDEO_PREVIEW_URL.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationReply {
    pub keyword: String,
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationReply {
    fn default() -> Self {
        Self {
            keyword: "位置資訊".to_string(),
            title: "台北 101".to_string(),
            address: "台北市信義路五段7號".to_string(),
            latitude: 25.033_968,
            longitude: 121.564_468,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchReply {
    /// Messages starting with this prefix are catalog searches.
    pub prefix: String,
    #[serde(rename = "notFound")]
    pub not_found: String,
}

impl Default for ImageSearchReply {
    fn default() -> Self {
        Self {
            prefix: "mygo:".to_string(),
            not_found: "找不到圖片wwwwwwwww".to_string(),
        }
    }
}

fn default_help() -> String {
    "請輸入：文字、貼圖、圖片、影片 或 位置資訊 來測試不同回覆。".to_string()
}

fn default_non_text_placeholder() -> String {
    "[非文字回覆]".to_string()
}

fn default_error_prefix() -> String {
    "AI 回覆時發生錯誤：".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepliesConfig {
    #[serde(default)]
    pub text: TextReply,
    #[serde(default)]
    pub sticker: StickerReply,
    #[serde(default = "default_image_reply")]
    pub image: MediaReply,
    #[serde(default = "default_video_reply")]
    pub video: MediaReply,
    #[serde(default)]
    pub location: LocationReply,
    #[serde(default, rename = "imageSearch")]
    pub image_search: ImageSearchReply,
    /// Sent for free-form text when no generative backend is configured.
    #[serde(default = "default_help")]
    pub help: String,
    /// Logged as the assistant turn for sticker/image/video/location replies.
    #[serde(default = "default_non_text_placeholder", rename = "nonTextPlaceholder")]
    pub non_text_placeholder: String,
    /// Prepended to the error description when the generative call fails.
    #[serde(default = "default_error_prefix", rename = "errorPrefix")]
    pub error_prefix: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            text: TextReply::default(),
            sticker: StickerReply::default(),
            image: default_image_reply(),
            video: default_video_reply(),
            location: LocationReply::default(),
            image_search: ImageSearchReply::default(),
            help: default_help(),
            non_text_placeholder: default_non_text_placeholder(),
            error_prefix: default_error_prefix(),
        }
    }
}

impl RepliesConfig {
    /// Command keywords in classification order.
    pub fn keywords(&self) -> [&str; 5] {
        [
            &self.text.keyword,
            &self.sticker.keyword,
            &self.image.keyword,
            &self.video.keyword,
            &self.location.keyword,
        ]
    }

    pub(crate) fn validate(&self) -> Result<(), crate::errors::BotError> {
        use crate::errors::BotError;

        let keywords = self.keywords();
        for (i, keyword) in keywords.iter().enumerate() {
            if keyword.trim().is_empty() {
                return Err(BotError::Config(
                    "replies keywords must not be empty".into(),
                ));
            }
            // Compared after normalization, so case-only duplicates collide too
            if keywords[..i]
                .iter()
                .any(|other| other.trim().to_lowercase() == keyword.trim().to_lowercase())
            {
                return Err(BotError::Config(format!(
                    "replies keyword '{}' is used more than once",
                    keyword
                )));
            }
        }
        if self.image_search.prefix.trim().is_empty() {
            return Err(BotError::Config(
                "replies.imageSearch.prefix must not be empty".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.location.latitude)
            || !(-180.0..=180.0).contains(&self.location.longitude)
        {
            return Err(BotError::Config(
                "replies.location coordinates are out of range".into(),
            ));
        }
        Ok(())
    }
}
