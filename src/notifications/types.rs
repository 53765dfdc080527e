//! Notification type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    ContentSubmitted,   // New item awaiting review (sent to admins)
    ContentApproved,    // Your item passed review
    ContentRejected,    // Your item was rejected
    ContentResubmitted, // Author asked for another review
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ContentSubmitted => "content_submitted",
            Self::ContentApproved => "content_approved",
            Self::ContentRejected => "content_rejected",
            Self::ContentResubmitted => "content_resubmitted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "content_submitted" => Some(Self::ContentSubmitted),
            "content_approved" => Some(Self::ContentApproved),
            "content_rejected" => Some(Self::ContentRejected),
            "content_resubmitted" => Some(Self::ContentResubmitted),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_round_trip() {
        for kind in [
            NotificationType::ContentSubmitted,
            NotificationType::ContentApproved,
            NotificationType::ContentRejected,
            NotificationType::ContentResubmitted,
        ] {
            assert_eq!(NotificationType::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationType::from_str("mention"), None);
    }
}
