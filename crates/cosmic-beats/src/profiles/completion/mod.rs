mod rewards;
mod tracker;

pub use rewards::{completion_reward, CompletionThreshold, RewardTier};
pub use tracker::{CompletionState, CompletionTracker};

use std::sync::Arc;

use serde::Serialize;

use super::domain::Profile;
use super::fields::{is_complete, resolve, FieldTree};
use super::schema::{FieldRequirement, SchemaRegistry};

/// Stateless scorer that applies the role schemas to a profile.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    registry: Arc<SchemaRegistry>,
}

impl CompletionEngine {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Score the profile in a single traversal of its role schema.
    pub fn evaluate(&self, profile: &Profile) -> CompletionResult {
        let requirements = self.registry.required_fields(profile.role());
        let tree = profile.field_tree();

        let incomplete_fields: Vec<FieldRequirement> = requirements
            .iter()
            .filter(|requirement| !is_complete(resolve(&tree, &requirement.path)))
            .cloned()
            .collect();

        let total = requirements.len();
        let completed = total - incomplete_fields.len();

        CompletionResult {
            percentage: rounded_percentage(completed, total),
            completed_fields: completed,
            total_fields: total,
            incomplete_fields,
        }
    }

    /// Rounded share of satisfied requirements; `0` when the role has none registered.
    pub fn calculate_percentage(&self, profile: &Profile) -> u8 {
        self.evaluate(profile).percentage
    }

    /// Requirements the profile does not satisfy, in registry order.
    pub fn incomplete_fields(&self, profile: &Profile) -> Vec<FieldRequirement> {
        self.evaluate(profile).incomplete_fields
    }
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(SchemaRegistry::standard())
    }
}

/// Round-half-up of `100 * completed / total` in integer arithmetic.
fn rounded_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let scaled = (200 * completed + total) / (2 * total);
    u8::try_from(scaled).unwrap_or(100)
}

/// Derived completion snapshot. Recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub percentage: u8,
    pub completed_fields: usize,
    pub total_fields: usize,
    pub incomplete_fields: Vec<FieldRequirement>,
}

impl CompletionResult {
    pub fn reward(&self) -> RewardTier {
        completion_reward(self.percentage)
    }
}
