//! Campaign status lifecycle and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a campaign name.
pub const MAX_CAMPAIGN_NAME_LENGTH: usize = 200;

/// Valid campaign delivery channels.
pub const CAMPAIGN_TYPES: &[&str] = &["email", "sms", "push"];

/// Check whether a campaign type is a known delivery channel.
pub fn is_valid_campaign_type(campaign_type: &str) -> bool {
    CAMPAIGN_TYPES.contains(&campaign_type)
}

// ---------------------------------------------------------------------------
// CampaignStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a marketing campaign.
///
/// Transitions happen only through explicit admin action:
/// draft/scheduled -> active (send started) -> completed (full dispatch
/// acknowledged). A partially dispatched campaign stays active with a
/// retry-pending marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid campaign status: '{s}'. Must be one of: draft, scheduled, active, \
                 completed"
            ))),
        }
    }

    /// Whether a send may begin from this status.
    pub fn is_sendable(&self) -> bool {
        matches!(self, Self::Draft | Self::Scheduled)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a campaign name: must be non-empty and within length limit.
pub fn validate_campaign_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Campaign name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_CAMPAIGN_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Campaign name exceeds maximum length of {MAX_CAMPAIGN_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Check that a campaign in `status` may be sent, returning a conflict
/// describing the actual state otherwise.
pub fn ensure_sendable(status: CampaignStatus) -> Result<(), CoreError> {
    if status.is_sendable() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Campaign cannot be sent from status '{status}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_all_variants_roundtrip() {
        let pairs = [
            ("draft", CampaignStatus::Draft),
            ("scheduled", CampaignStatus::Scheduled),
            ("active", CampaignStatus::Active),
            ("completed", CampaignStatus::Completed),
        ];
        for (s, variant) in &pairs {
            assert_eq!(&CampaignStatus::from_str(s).unwrap(), variant);
            assert_eq!(variant.as_str(), *s);
        }
    }

    #[test]
    fn status_invalid_rejects() {
        assert!(CampaignStatus::from_str("paused").is_err());
    }

    #[test]
    fn draft_and_scheduled_are_sendable() {
        assert!(ensure_sendable(CampaignStatus::Draft).is_ok());
        assert!(ensure_sendable(CampaignStatus::Scheduled).is_ok());
    }

    #[test]
    fn active_and_completed_are_not_sendable() {
        assert!(ensure_sendable(CampaignStatus::Active).is_err());
        assert!(ensure_sendable(CampaignStatus::Completed).is_err());
    }

    #[test]
    fn campaign_type_set_is_closed() {
        assert!(is_valid_campaign_type("email"));
        assert!(is_valid_campaign_type("sms"));
        assert!(is_valid_campaign_type("push"));
        assert!(!is_valid_campaign_type("carrier_pigeon"));
    }

    #[test]
    fn empty_campaign_name_rejects() {
        assert!(validate_campaign_name(" ").is_err());
    }
}
