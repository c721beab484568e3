use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::completion::{
    CompletionEngine, CompletionResult, CompletionThreshold, CompletionTracker, RewardTier,
};
use super::domain::{Badge, Profile, ProfileId, Role};
use super::repository::{ProfileStore, RewardNotice, RewardPublisher, StoreError};
use super::schema::SchemaRegistry;

type TrackerSlot = Arc<Mutex<Option<CompletionTracker>>>;

/// Service composing the completion engine, the profile store, and reward notifications.
///
/// Evaluations of one profile are serialized behind that profile's tracker lock so a crossing
/// is granted once even when several requests edit the same profile.
pub struct ProfileCompletionService<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    engine: Arc<CompletionEngine>,
    trackers: Mutex<HashMap<ProfileId, TrackerSlot>>,
}

impl<S, P> ProfileCompletionService<S, P>
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    pub fn new(store: Arc<S>, publisher: Arc<P>, registry: SchemaRegistry) -> Self {
        Self::with_engine(store, publisher, CompletionEngine::new(registry))
    }

    pub fn with_engine(store: Arc<S>, publisher: Arc<P>, engine: CompletionEngine) -> Self {
        Self {
            store,
            publisher,
            engine: Arc::new(engine),
            trackers: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &CompletionEngine {
        &self.engine
    }

    /// Store a newly created profile and score it from a zero baseline.
    pub fn register(
        &self,
        mut profile: Profile,
    ) -> Result<CompletionEvaluation, CompletionServiceError> {
        let id = profile.id.clone();
        profile.beatcoins = 0;
        profile.completion_percentage = 0;
        profile.badges.clear();

        self.with_tracker(&id, |tracker| {
            self.store.insert(profile)?;
            *tracker = Some(CompletionTracker::new());
            info!(profile_id = %id, "profile registered");

            self.evaluate_locked(tracker, &id)
        })
    }

    /// Persist an edited profile and re-score it.
    ///
    /// Balance, completion and badges are owned by this service, so the stored values win over
    /// whatever the edit carried.
    pub fn save(
        &self,
        mut profile: Profile,
    ) -> Result<CompletionEvaluation, CompletionServiceError> {
        let id = profile.id.clone();
        self.with_tracker(&id, |tracker| {
            let stored = self.store.fetch(&id)?.ok_or(StoreError::NotFound)?;
            profile.beatcoins = stored.beatcoins;
            profile.completion_percentage = stored.completion_percentage;
            profile.badges = stored.badges;
            profile.created_at = stored.created_at;
            self.store.update(profile)?;

            self.evaluate_locked(tracker, &id)
        })
    }

    /// Re-score the stored profile and issue a reward on an upward threshold crossing.
    pub fn evaluate(
        &self,
        id: &ProfileId,
    ) -> Result<CompletionEvaluation, CompletionServiceError> {
        self.with_tracker(id, |tracker| self.evaluate_locked(tracker, id))
    }

    /// Number of profiles currently holding a tracker slot.
    pub fn tracked_profiles(&self) -> usize {
        lock(&self.trackers).len()
    }

    /// Read-only completion snapshot. Never issues rewards.
    pub fn completion(&self, id: &ProfileId) -> Result<CompletionView, CompletionServiceError> {
        let profile = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        let completion = self.engine.evaluate(&profile);

        Ok(CompletionView {
            profile_id: profile.id.clone(),
            role: profile.role(),
            reward_tier: completion.reward(),
            completion,
            beatcoins: profile.beatcoins,
            badges: profile.badges,
        })
    }

    fn evaluate_locked(
        &self,
        tracker: &mut Option<CompletionTracker>,
        id: &ProfileId,
    ) -> Result<CompletionEvaluation, CompletionServiceError> {
        let profile = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        let tracker = tracker
            .get_or_insert_with(|| CompletionTracker::starting_at(profile.completion_percentage));

        let completion = self.engine.evaluate(&profile);
        let previous = tracker.previous();
        let crossed = tracker.begin(completion.percentage);

        let grant = match self.persist(&profile, completion.percentage, crossed) {
            Ok(grant) => {
                tracker.settle();
                grant
            }
            Err(err) => {
                tracker.abort();
                warn!(
                    profile_id = %id,
                    previous,
                    current = completion.percentage,
                    error = %err,
                    "completion update rejected by profile store"
                );
                return Err(err);
            }
        };

        if let Some(grant) = &grant {
            info!(
                profile_id = %id,
                previous,
                current = completion.percentage,
                threshold = grant.threshold.percentage(),
                beatcoins = grant.reward.beatcoins_awarded,
                "completion threshold crossed"
            );
            let notice = RewardNotice {
                profile_id: id.clone(),
                threshold: grant.threshold,
                reward: grant.reward,
                beatcoins_total: grant.beatcoins_total,
            };
            if let Err(err) = self.publisher.publish(notice) {
                warn!(profile_id = %id, error = %err, "reward notification not delivered");
            }
        } else {
            debug!(
                profile_id = %id,
                previous,
                current = completion.percentage,
                "completion evaluated"
            );
        }

        Ok(CompletionEvaluation {
            profile_id: id.clone(),
            previous_percentage: previous,
            completion,
            reward: grant,
        })
    }

    fn persist(
        &self,
        profile: &Profile,
        percentage: u8,
        crossed: Option<CompletionThreshold>,
    ) -> Result<Option<RewardGrant>, CompletionServiceError> {
        let grant = match crossed {
            Some(threshold) => {
                let reward = threshold.reward();
                let beatcoins_total = profile
                    .beatcoins
                    .saturating_add(u64::from(reward.beatcoins_awarded));
                self.store.update_balance(&profile.id, beatcoins_total)?;
                if reward.badge_earned && !profile.has_badge(Badge::ProfileComplete) {
                    self.store.award_badge(&profile.id, Badge::ProfileComplete)?;
                }
                Some(RewardGrant {
                    threshold,
                    reward,
                    beatcoins_total,
                })
            }
            None => None,
        };

        if profile.completion_percentage != percentage {
            self.store.update_completion(&profile.id, percentage)?;
        }

        Ok(grant)
    }

    /// Run `operation` while holding the profile's tracker lock.
    ///
    /// A slot left empty afterwards is dropped from the map, so requests for unknown ids do
    /// not leave entries behind.
    fn with_tracker<T, F>(
        &self,
        id: &ProfileId,
        operation: F,
    ) -> Result<T, CompletionServiceError>
    where
        F: FnOnce(&mut Option<CompletionTracker>) -> Result<T, CompletionServiceError>,
    {
        let slot = self.slot(id);
        let result = {
            let mut tracker = lock(&slot);
            operation(&mut tracker)
        };
        self.release(id, slot);
        result
    }

    fn slot(&self, id: &ProfileId) -> TrackerSlot {
        let mut trackers = lock(&self.trackers);
        trackers.entry(id.clone()).or_default().clone()
    }

    fn release(&self, id: &ProfileId, slot: TrackerSlot) {
        let mut trackers = lock(&self.trackers);
        // Other holders can only clone the slot under the map lock held here.
        if Arc::strong_count(&slot) == 2 && lock(&slot).is_none() {
            trackers.remove(id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reward issued during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardGrant {
    pub threshold: CompletionThreshold,
    pub reward: RewardTier,
    pub beatcoins_total: u64,
}

/// Outcome of scoring a profile after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvaluation {
    pub profile_id: ProfileId,
    pub previous_percentage: u8,
    #[serde(flatten)]
    pub completion: CompletionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardGrant>,
}

/// Read-only projection used to render progress and "what's missing" prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionView {
    pub profile_id: ProfileId,
    pub role: Role,
    #[serde(flatten)]
    pub completion: CompletionResult,
    pub reward_tier: RewardTier,
    pub beatcoins: u64,
    pub badges: Vec<Badge>,
}

/// Error raised by the completion service.
#[derive(Debug, thiserror::Error)]
pub enum CompletionServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
