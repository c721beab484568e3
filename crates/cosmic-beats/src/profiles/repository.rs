use serde::{Deserialize, Serialize};

use super::completion::{CompletionThreshold, RewardTier};
use super::domain::{Badge, Profile, ProfileId};

/// Storage abstraction owning profile records and balances.
///
/// Implementations must apply each call atomically per profile and report failures as errors
/// so the completion service can offer a failed reward again on the next evaluation.
pub trait ProfileStore: Send + Sync {
    fn insert(&self, profile: Profile) -> Result<Profile, StoreError>;
    fn update(&self, profile: Profile) -> Result<(), StoreError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError>;
    fn update_balance(&self, id: &ProfileId, beatcoins: u64) -> Result<(), StoreError>;
    fn update_completion(&self, id: &ProfileId, percentage: u8) -> Result<(), StoreError>;
    fn award_badge(&self, id: &ProfileId, badge: Badge) -> Result<(), StoreError>;
}

/// Error enumeration for profile store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("profile already exists")]
    Conflict,
    #[error("profile not found")]
    NotFound,
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for the one-time celebratory notification.
pub trait RewardPublisher: Send + Sync {
    fn publish(&self, notice: RewardNotice) -> Result<(), NotificationError>;
}

/// Payload announcing a granted completion reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardNotice {
    pub profile_id: ProfileId,
    pub threshold: CompletionThreshold,
    pub reward: RewardTier,
    pub beatcoins_total: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
