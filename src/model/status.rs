//! Status enumerations with fixed ordinal tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::properties::OrdinalEnum;

/// Lifecycle of a discovery report.
///
/// `WAITING -> ACTIVATING -> IN_PROGRESS -> COMPLETED | FAILED`; the last two
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryRequestStatus {
    Waiting,
    Activating,
    InProgress,
    Failed,
    Completed,
    Unknown,
}

impl DiscoveryRequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DiscoveryRequestStatus::Completed | DiscoveryRequestStatus::Failed
        )
    }

    fn rank(&self) -> Option<u8> {
        match self {
            DiscoveryRequestStatus::Waiting => Some(0),
            DiscoveryRequestStatus::Activating => Some(1),
            DiscoveryRequestStatus::InProgress => Some(2),
            DiscoveryRequestStatus::Failed | DiscoveryRequestStatus::Completed => Some(3),
            DiscoveryRequestStatus::Unknown => None,
        }
    }

    /// Forward-only check. Steps may be skipped (a report that fails while
    /// activating goes straight to FAILED) but never revisited.
    pub fn can_transition_to(&self, next: DiscoveryRequestStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }
}

impl OrdinalEnum for DiscoveryRequestStatus {
    const TYPE_NAME: &'static str = "DiscoveryRequestStatus";

    fn ordinal(&self) -> i32 {
        match self {
            DiscoveryRequestStatus::Waiting => 0,
            DiscoveryRequestStatus::Activating => 1,
            DiscoveryRequestStatus::InProgress => 2,
            DiscoveryRequestStatus::Failed => 3,
            DiscoveryRequestStatus::Completed => 4,
            DiscoveryRequestStatus::Unknown => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            DiscoveryRequestStatus::Waiting => "WAITING",
            DiscoveryRequestStatus::Activating => "ACTIVATING",
            DiscoveryRequestStatus::InProgress => "IN_PROGRESS",
            DiscoveryRequestStatus::Failed => "FAILED",
            DiscoveryRequestStatus::Completed => "COMPLETED",
            DiscoveryRequestStatus::Unknown => "UNKNOWN_STATUS",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            DiscoveryRequestStatus::Waiting => {
                "Discovery request is waiting to execute."
            }
            DiscoveryRequestStatus::Activating => {
                "Discovery request is accepted and the discovery service is being started."
            }
            DiscoveryRequestStatus::InProgress => "Discovery service is running.",
            DiscoveryRequestStatus::Failed => "Discovery service has failed.",
            DiscoveryRequestStatus::Completed => {
                "Discovery service has completed successfully."
            }
            DiscoveryRequestStatus::Unknown => "Discovery request status is unknown.",
        }
    }

    fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(DiscoveryRequestStatus::Waiting),
            1 => Some(DiscoveryRequestStatus::Activating),
            2 => Some(DiscoveryRequestStatus::InProgress),
            3 => Some(DiscoveryRequestStatus::Failed),
            4 => Some(DiscoveryRequestStatus::Completed),
            99 => Some(DiscoveryRequestStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DiscoveryRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbolic_name())
    }
}

/// Steward review state of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnnotationStatus {
    #[default]
    New,
    Reviewed,
    Approved,
    Actioned,
    Invalid,
    Ignore,
    Other,
    Unknown,
}

impl OrdinalEnum for AnnotationStatus {
    const TYPE_NAME: &'static str = "AnnotationStatus";

    fn ordinal(&self) -> i32 {
        match self {
            AnnotationStatus::New => 0,
            AnnotationStatus::Reviewed => 1,
            AnnotationStatus::Approved => 2,
            AnnotationStatus::Actioned => 3,
            AnnotationStatus::Invalid => 4,
            AnnotationStatus::Ignore => 5,
            AnnotationStatus::Other => 6,
            AnnotationStatus::Unknown => 99,
        }
    }

    fn symbolic_name(&self) -> &'static str {
        match self {
            AnnotationStatus::New => "NEW_ANNOTATION",
            AnnotationStatus::Reviewed => "REVIEWED",
            AnnotationStatus::Approved => "APPROVED",
            AnnotationStatus::Actioned => "ACTIONED",
            AnnotationStatus::Invalid => "INVALID_ANNOTATION",
            AnnotationStatus::Ignore => "IGNORE_ANNOTATION",
            AnnotationStatus::Other => "OTHER_STATUS",
            AnnotationStatus::Unknown => "UNKNOWN_STATUS",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            AnnotationStatus::New => "The annotation is new.",
            AnnotationStatus::Reviewed => "The annotation has been reviewed by a steward.",
            AnnotationStatus::Approved => "The annotation has been approved.",
            AnnotationStatus::Actioned => "The request has been actioned.",
            AnnotationStatus::Invalid => "The annotation is invalid or incorrect.",
            AnnotationStatus::Ignore => "The annotation should be ignored.",
            AnnotationStatus::Other => "Another status.",
            AnnotationStatus::Unknown => "Unknown status.",
        }
    }

    fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(AnnotationStatus::New),
            1 => Some(AnnotationStatus::Reviewed),
            2 => Some(AnnotationStatus::Approved),
            3 => Some(AnnotationStatus::Actioned),
            4 => Some(AnnotationStatus::Invalid),
            5 => Some(AnnotationStatus::Ignore),
            6 => Some(AnnotationStatus::Other),
            99 => Some(AnnotationStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbolic_name())
    }
}
