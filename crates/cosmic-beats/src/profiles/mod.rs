//! Profile completion scoring, reward tiers, and threshold-crossing reward issuance.
//!
//! Role schemas list the fields a profile must fill; the completion engine resolves each
//! path against the profile's field tree and turns the share of complete fields into a
//! percentage. The service records the last settled percentage per profile and pays out the
//! reward of the highest threshold crossed on the way up.

pub mod completion;
pub mod domain;
pub mod fields;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use completion::{
    completion_reward, CompletionEngine, CompletionResult, CompletionState, CompletionThreshold,
    CompletionTracker, RewardTier,
};
pub use domain::{
    Badge, ClubProfile, DjProfile, Equipment, FestivalDates, FestivalProfile, Location,
    MembershipTier, Profile, ProfileId, RaverProfile, Recording, ReporterProfile, Role,
    RoleProfile, SocialLinks, StaffMember, UnknownRole,
};
pub use fields::{is_complete, resolve, FieldTree, FieldValue};
pub use repository::{NotificationError, ProfileStore, RewardNotice, RewardPublisher, StoreError};
pub use router::profile_router;
pub use schema::{FieldRequirement, Importance, SchemaError, SchemaRegistry};
pub use service::{
    CompletionEvaluation, CompletionServiceError, CompletionView, ProfileCompletionService,
    RewardGrant,
};
