use serde::{Deserialize, Serialize};

/// Destination and write credential for one staged upload. Repeated intake
/// calls yield independent, unrelated targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub bucket: String,
    pub key: String,
    /// Expiring write-scoped URL the client PUTs the raw video to
    pub url: String,
}
