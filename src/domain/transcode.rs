//! Transcode job descriptions.
//!
//! Only the job submission/poll/result contract lives here; the codec
//! computation itself runs in whatever service implements
//! `ports::transcoder::TranscodePort`.

use serde::{Deserialize, Serialize};

/// Location of an object in a bucket-like store. Locally, `bucket` is a
/// directory path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub bucket: String,
    pub key: String,
}

impl SourceLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Fixed output profile for training videos: one 640x360 H.264/AAC HLS
/// rendition with 10 second segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeProfile {
    pub width: i32,
    pub height: i32,
    pub max_bitrate: i32,
    pub audio_bitrate: i32,
    pub audio_sample_rate: i32,
    pub segment_seconds: i32,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            max_bitrate: 5_000_000,
            audio_bitrate: 96_000,
            audio_sample_rate: 48_000,
            segment_seconds: 10,
        }
    }
}

/// Everything a transcode service needs to run one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeJobSpec {
    pub source: SourceLocation,
    /// Bucket (or local directory) outputs are written to
    pub destination_bucket: String,
    /// Destination path without the manifest extension, e.g. `video/{id}/{id}`
    pub destination_prefix: String,
    pub profile: TranscodeProfile,
}

/// Terminal and non-terminal states reported by the job service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeJobStatus {
    InProgress,
    Complete,
    Error(String),
}

/// Destination path for a training's rendition, without extension.
/// The HLS packager derives the manifest and segment names from it.
pub fn destination_prefix(video_prefix: &str, training_id: &str) -> String {
    format!(
        "{}/{}/{}",
        video_prefix.trim_matches('/'),
        training_id,
        training_id
    )
}

/// Key of the finished manifest: `{video_prefix}/{id}/{id}.m3u8`.
pub fn manifest_key(video_prefix: &str, training_id: &str) -> String {
    format!("{}.m3u8", destination_prefix(video_prefix, training_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_key_layout() {
        assert_eq!(manifest_key("video", "T1"), "video/T1/T1.m3u8");
        assert_eq!(manifest_key("serving", "T1"), "serving/T1/T1.m3u8");
        // Prefixes copied from URL-style config keep a clean layout
        assert_eq!(manifest_key("/video/", "abc"), "video/abc/abc.m3u8");
    }

    #[test]
    fn destination_prefix_matches_manifest() {
        let prefix = destination_prefix("video", "T1");
        assert_eq!(prefix, "video/T1/T1");
        assert_eq!(manifest_key("video", "T1"), format!("{}.m3u8", prefix));
    }

    #[test]
    fn default_profile() {
        let p = TranscodeProfile::default();
        assert_eq!((p.width, p.height), (640, 360));
        assert_eq!(p.segment_seconds, 10);
        assert_eq!(p.audio_bitrate, 96_000);
        assert_eq!(p.audio_sample_rate, 48_000);
    }
}
