use cosmic_beats::error::AppError;
use cosmic_beats::profiles::{
    Badge, NotificationError, Profile, ProfileId, ProfileStore, RewardNotice, RewardPublisher,
    SchemaRegistry, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    profiles: Arc<Mutex<HashMap<ProfileId, Profile>>>,
}

impl InMemoryProfileStore {
    fn guard(&self) -> MutexGuard<'_, HashMap<ProfileId, Profile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn modify(&self, id: &ProfileId, apply: impl FnOnce(&mut Profile)) -> Result<(), StoreError> {
        let mut guard = self.guard();
        let profile = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        apply(profile);
        Ok(())
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn insert(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut guard = self.guard();
        if guard.contains_key(&profile.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: Profile) -> Result<(), StoreError> {
        let mut guard = self.guard();
        if guard.contains_key(&profile.id) {
            guard.insert(profile.id.clone(), profile);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        Ok(self.guard().get(id).cloned())
    }

    fn update_balance(&self, id: &ProfileId, beatcoins: u64) -> Result<(), StoreError> {
        self.modify(id, |profile| profile.beatcoins = beatcoins)
    }

    fn update_completion(&self, id: &ProfileId, percentage: u8) -> Result<(), StoreError> {
        self.modify(id, |profile| profile.completion_percentage = percentage)
    }

    fn award_badge(&self, id: &ProfileId, badge: Badge) -> Result<(), StoreError> {
        self.modify(id, |profile| {
            if !profile.has_badge(badge) {
                profile.badges.push(badge);
            }
        })
    }
}

/// Publisher that records reward notices and logs them in place of a push gateway.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRewardPublisher {
    events: Arc<Mutex<Vec<RewardNotice>>>,
}

impl RewardPublisher for InMemoryRewardPublisher {
    fn publish(&self, notice: RewardNotice) -> Result<(), NotificationError> {
        info!(
            profile = %notice.profile_id,
            threshold = notice.threshold.percentage(),
            beatcoins = notice.reward.beatcoins_awarded,
            total = notice.beatcoins_total,
            "reward notice published"
        );
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
        Ok(())
    }
}

impl InMemoryRewardPublisher {
    pub(crate) fn events(&self) -> Vec<RewardNotice> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Load the schema document at `path`, or fall back to the built-in role schemas.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<SchemaRegistry, AppError> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            let registry = SchemaRegistry::from_reader(BufReader::new(file))?;
            info!(path = %path.display(), "loaded schema document");
            Ok(registry)
        }
        None => Ok(SchemaRegistry::standard()),
    }
}

pub(crate) fn read_profile(path: &Path) -> Result<Profile, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
