//! Knowledge synchronization status
//!
//! Every knowledge item carries at most one upstream status tag. The
//! explorer only cares which of three classes a tag falls into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream synchronization status of a knowledge item
///
/// Serialized as the upper-case tags the knowledge API emits. Unknown tags
/// are preserved in [`KnowledgeStatus::Other`] and count as settled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KnowledgeStatus {
    /// Slot reserved, upload not started
    Reserved,
    /// Being parsed and embedded
    Processing,
    /// Processing failed
    Error,
    /// Processed and available
    Uploaded,
    /// Any other terminal tag
    Other(String),
}

/// Classification of a status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Non-terminal, expected to transition
    Waiting,
    /// Terminal failure
    Error,
    /// Terminal success, or no status at all
    Settled,
}

/// Classify an optional status tag
///
/// Total over its input: absent status is [`StatusClass::Settled`].
pub fn classify(status: Option<&KnowledgeStatus>) -> StatusClass {
    match status {
        Some(KnowledgeStatus::Reserved) | Some(KnowledgeStatus::Processing) => StatusClass::Waiting,
        Some(KnowledgeStatus::Error) => StatusClass::Error,
        _ => StatusClass::Settled,
    }
}

/// True for RESERVED and PROCESSING
pub fn is_waiting(status: Option<&KnowledgeStatus>) -> bool {
    classify(status) == StatusClass::Waiting
}

/// True for ERROR
pub fn is_error(status: Option<&KnowledgeStatus>) -> bool {
    classify(status) == StatusClass::Error
}

impl KnowledgeStatus {
    /// Parse a tag (case-insensitive). Never fails.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "RESERVED" => Self::Reserved,
            "PROCESSING" => Self::Processing,
            "ERROR" => Self::Error,
            "UPLOADED" => Self::Uploaded,
            _ => Self::Other(tag.trim().to_string()),
        }
    }

    /// Upstream tag
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reserved => "RESERVED",
            Self::Processing => "PROCESSING",
            Self::Error => "ERROR",
            Self::Uploaded => "UPLOADED",
            Self::Other(tag) => tag,
        }
    }

    pub fn class(&self) -> StatusClass {
        classify(Some(self))
    }
}

impl StatusClass {
    /// Glyph used by the row renderer
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Waiting => "⟳",
            Self::Error => "⚠",
            Self::Settled => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "syncing",
            Self::Error => "error",
            Self::Settled => "ready",
        }
    }
}

impl From<String> for KnowledgeStatus {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<KnowledgeStatus> for String {
    fn from(status: KnowledgeStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for KnowledgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waiting_tags() {
        assert_eq!(classify(Some(&KnowledgeStatus::Reserved)), StatusClass::Waiting);
        assert_eq!(classify(Some(&KnowledgeStatus::Processing)), StatusClass::Waiting);
    }

    #[test]
    fn test_error_tag() {
        assert_eq!(classify(Some(&KnowledgeStatus::Error)), StatusClass::Error);
        assert!(is_error(Some(&KnowledgeStatus::Error)));
        assert!(!is_waiting(Some(&KnowledgeStatus::Error)));
    }

    #[test]
    fn test_settled_tags() {
        assert_eq!(classify(None), StatusClass::Settled);
        assert_eq!(classify(Some(&KnowledgeStatus::Uploaded)), StatusClass::Settled);
        assert_eq!(
            classify(Some(&KnowledgeStatus::Other("SYNCED".into()))),
            StatusClass::Settled
        );
    }

    #[test]
    fn test_never_waiting_and_error() {
        let tags = [
            None,
            Some(KnowledgeStatus::Reserved),
            Some(KnowledgeStatus::Processing),
            Some(KnowledgeStatus::Error),
            Some(KnowledgeStatus::Uploaded),
            Some(KnowledgeStatus::Other("whatever".into())),
        ];
        for tag in &tags {
            assert!(!(is_waiting(tag.as_ref()) && is_error(tag.as_ref())));
        }
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(KnowledgeStatus::parse("processing"), KnowledgeStatus::Processing);
        assert_eq!(KnowledgeStatus::parse(" ERROR "), KnowledgeStatus::Error);
        assert_eq!(
            KnowledgeStatus::parse("QUEUED"),
            KnowledgeStatus::Other("QUEUED".into())
        );
    }

    #[test]
    fn test_serde_uses_upstream_tags() {
        let json = serde_json::to_string(&KnowledgeStatus::Reserved).unwrap();
        assert_eq!(json, "\"RESERVED\"");

        let status: KnowledgeStatus = serde_json::from_str("\"UPLOADED\"").unwrap();
        assert_eq!(status, KnowledgeStatus::Uploaded);

        let other: KnowledgeStatus = serde_json::from_str("\"PARTIAL\"").unwrap();
        assert_eq!(other.class(), StatusClass::Settled);
    }
}
