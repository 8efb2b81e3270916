//! Workflow states and trigger payloads.

use crate::domain::transcode::SourceLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// States of one transcode orchestration. `Failed` is reachable from
/// `Transcoding` and `Persisting`; everything else runs straight through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    ConvertingInput,
    Transcoding,
    Persisting,
    Succeeded,
    Failed,
}

/// Raw trigger payload handed over by the submission handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub training_title: String,
    pub training_id: String,
    pub bucket_name: String,
    pub s3_key: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed workflow input: {0}")]
pub struct MalformedInput(pub String);

/// Canonical record the workflow operates on, normalized from the raw
/// trigger payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    pub training_title: String,
    pub training_id: String,
    pub source: SourceLocation,
}

impl TranscodeRequest {
    /// Pure data transform; the only failure mode is a blank field, which is
    /// fatal and not retried.
    pub fn from_input(input: WorkflowInput) -> Result<Self, MalformedInput> {
        for (field, value) in [
            ("training_title", &input.training_title),
            ("training_id", &input.training_id),
            ("bucket_name", &input.bucket_name),
            ("s3_key", &input.s3_key),
        ] {
            if value.trim().is_empty() {
                return Err(MalformedInput(format!("{} is empty", field)));
            }
        }

        Ok(Self {
            training_title: input.training_title,
            training_id: input.training_id,
            source: SourceLocation::new(input.bucket_name, input.s3_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> WorkflowInput {
        WorkflowInput {
            training_title: String::from("Intro"),
            training_id: String::from("T1"),
            bucket_name: String::from("upload.trainings.example.com"),
            s3_key: String::from("abc"),
        }
    }

    #[test]
    fn normalizes_valid_input() {
        let request = TranscodeRequest::from_input(input()).unwrap();
        assert_eq!(request.training_id, "T1");
        assert_eq!(request.training_title, "Intro");
        assert_eq!(
            request.source,
            SourceLocation::new("upload.trainings.example.com", "abc")
        );
    }

    #[test]
    fn rejects_blank_fields() {
        for field in ["training_title", "training_id", "bucket_name", "s3_key"] {
            let mut raw = input();
            match field {
                "training_title" => raw.training_title = String::from("  "),
                "training_id" => raw.training_id = String::new(),
                "bucket_name" => raw.bucket_name = String::new(),
                _ => raw.s3_key = String::from(" "),
            }
            let err = TranscodeRequest::from_input(raw).unwrap_err();
            assert!(err.0.contains(field), "{:?} should name {}", err, field);
        }
    }
}
