//! Training records and per-user state.

use crate::domain::transcode::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle of a training record.
///
/// Allowed transitions: Pending -> Converting -> {Ready | Failed}.
/// Failed is also reachable from Pending, for records whose workflow dies
/// before the converting mark lands. No back-transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    Pending,
    Converting,
    Ready,
    Failed,
}

impl TrainingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TrainingStatus::Ready | TrainingStatus::Failed)
    }

    pub fn can_transition_to(self, next: TrainingStatus) -> bool {
        use TrainingStatus::*;
        matches!(
            (self, next),
            (Pending, Converting) | (Pending, Failed) | (Converting, Ready) | (Converting, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrainingStatus::Pending => "Pending",
            TrainingStatus::Converting => "Converting",
            TrainingStatus::Ready => "Ready",
            TrainingStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TrainingStatus::Pending),
            "Converting" => Ok(TrainingStatus::Converting),
            "Ready" => Ok(TrainingStatus::Ready),
            "Failed" => Ok(TrainingStatus::Failed),
            other => Err(format!("unknown training status: {}", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: TrainingStatus,
    pub to: TrainingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub training_id: String,
    pub title: String,
    pub description: String,
    /// Staged raw upload. Meaningful only until transcoding completes.
    pub source: SourceLocation,
    /// HLS manifest key in the serving location. Set exactly when the
    /// record becomes Ready, immutable afterwards.
    pub video_asset_key: Option<String>,
    pub status: TrainingStatus,
}

impl TrainingRecord {
    pub fn new(
        training_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        source: SourceLocation,
    ) -> Self {
        Self {
            training_id: training_id.into(),
            title: title.into(),
            description: description.into(),
            source,
            video_asset_key: None,
            status: TrainingStatus::Pending,
        }
    }

    fn transition(&mut self, to: TrainingStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(to) {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn begin_converting(&mut self) -> Result<(), InvalidTransition> {
        self.transition(TrainingStatus::Converting)
    }

    /// Record the finished rendition. The asset key and the Ready status are
    /// written together so one is never observable without the other.
    pub fn complete(&mut self, video_asset_key: impl Into<String>) -> Result<(), InvalidTransition> {
        self.transition(TrainingStatus::Ready)?;
        self.video_asset_key = Some(video_asset_key.into());
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        self.transition(TrainingStatus::Failed)
    }
}

/// Projection used by the training list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub training_id: String,
    pub title: String,
    pub description: String,
}

impl From<&TrainingRecord> for TrainingSummary {
    fn from(record: &TrainingRecord) -> Self {
        Self {
            training_id: record.training_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
        }
    }
}

/// Per-user completion state, keyed by (email, training id).
/// Rows are created lazily; `completed` never reverts to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTrainingStatus {
    pub email: String,
    pub training_id: String,
    pub completed: bool,
}

/// A user's review of a training. Keyed by (training id, email); submitting
/// again overwrites the caller's previous review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub training_id: String,
    pub email: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TrainingRecord {
        TrainingRecord::new(
            "T1",
            "Intro",
            "x",
            SourceLocation::new("staging", "abc"),
        )
    }

    #[test]
    fn new_record_is_pending_without_asset() {
        let r = record();
        assert_eq!(r.status, TrainingStatus::Pending);
        assert_eq!(r.video_asset_key, None);
    }

    #[test]
    fn happy_path_transitions() {
        let mut r = record();
        r.begin_converting().unwrap();
        assert_eq!(r.status, TrainingStatus::Converting);
        r.complete("video/T1/T1.m3u8").unwrap();
        assert_eq!(r.status, TrainingStatus::Ready);
        assert_eq!(r.video_asset_key.as_deref(), Some("video/T1/T1.m3u8"));
    }

    #[test]
    fn failure_from_converting() {
        let mut r = record();
        r.begin_converting().unwrap();
        r.fail().unwrap();
        assert_eq!(r.status, TrainingStatus::Failed);
        assert_eq!(r.video_asset_key, None);
    }

    #[test]
    fn no_back_transitions() {
        let mut r = record();
        r.begin_converting().unwrap();
        r.complete("video/T1/T1.m3u8").unwrap();

        assert!(r.begin_converting().is_err());
        assert!(r.fail().is_err());
        assert!(r.complete("video/T1/other.m3u8").is_err());
        assert_eq!(r.video_asset_key.as_deref(), Some("video/T1/T1.m3u8"));
    }

    #[test]
    fn complete_requires_converting() {
        let mut r = record();
        assert_eq!(
            r.complete("video/T1/T1.m3u8"),
            Err(InvalidTransition {
                from: TrainingStatus::Pending,
                to: TrainingStatus::Ready,
            })
        );
        assert_eq!(r.video_asset_key, None);
    }

    // The asset key must be present exactly when the record is Ready, no
    // matter which operation sequence was attempted.
    #[test]
    fn asset_key_iff_ready_across_synthetic_transitions() {
        type Op = fn(&mut TrainingRecord) -> Result<(), InvalidTransition>;
        let ops: [(&str, Op); 3] = [
            ("begin", |r| r.begin_converting()),
            ("complete", |r| r.complete("video/T1/T1.m3u8")),
            ("fail", |r| r.fail()),
        ];

        for a in 0..ops.len() {
            for b in 0..ops.len() {
                for c in 0..ops.len() {
                    let mut r = record();
                    for &(_, op) in [&ops[a], &ops[b], &ops[c]] {
                        let _ = op(&mut r);
                        assert_eq!(
                            r.video_asset_key.is_some(),
                            r.status == TrainingStatus::Ready,
                            "invariant broken after ops {:?}",
                            (ops[a].0, ops[b].0, ops[c].0),
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            TrainingStatus::Pending,
            TrainingStatus::Converting,
            TrainingStatus::Ready,
            TrainingStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<TrainingStatus>(), Ok(status));
        }
        assert!("Transcoding".parse::<TrainingStatus>().is_err());
    }
}
