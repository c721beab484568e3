use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::profiles::domain::{
    Badge, ClubProfile, DjProfile, Equipment, FestivalDates, FestivalProfile, Location, Profile,
    ProfileId, RaverProfile, Recording, ReporterProfile, RoleProfile, SocialLinks, StaffMember,
};
use crate::profiles::repository::{
    NotificationError, ProfileStore, RewardNotice, RewardPublisher, StoreError,
};
use crate::profiles::schema::SchemaRegistry;
use crate::profiles::{profile_router, CompletionEngine, ProfileCompletionService};

pub(super) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 21, 23, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn profile(id: &str, details: RoleProfile) -> Profile {
    Profile::new(ProfileId(id.to_string()), "nightowl", details, created_at())
}

pub(super) fn berlin() -> Location {
    Location {
        address: "Am Wriezener Bahnhof".to_string(),
        city: "Berlin".to_string(),
        country: "DE".to_string(),
    }
}

pub(super) fn dj_named_only(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Dj(DjProfile {
            dj_name: "Nova Pulse".to_string(),
            ..DjProfile::default()
        }),
    )
}

pub(super) fn full_dj(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Dj(DjProfile {
            dj_name: "Nova Pulse".to_string(),
            music_style: "Melodic techno".to_string(),
            biography: "Resident at warehouse nights since 2019.".to_string(),
            profile_image: Some("https://cdn.cosmicbeats.app/nova.png".to_string()),
            location: berlin(),
            social_links: SocialLinks {
                soundcloud: Some("https://soundcloud.com/novapulse".to_string()),
                ..SocialLinks::default()
            },
            equipment: Equipment {
                decks: vec!["CDJ-3000".to_string()],
                ..Equipment::default()
            },
        }),
    )
}

pub(super) fn minimal_raver(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Raver(RaverProfile {
            favorite_genres: vec!["techno".to_string()],
            biography: "x".to_string(),
            location: Location {
                city: "Leipzig".to_string(),
                ..Location::default()
            },
            profile_image: Some("a.png".to_string()),
            referral_code: None,
        }),
    )
}

pub(super) fn full_club(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Club(ClubProfile {
            club_name: "Orbit".to_string(),
            location: berlin(),
            capacity: Some(1200),
            description: "Two floors, one sound system.".to_string(),
            music_genres: vec!["techno".to_string(), "house".to_string()],
            opening_hours: Some("Fri 23:00 - Mon 08:00".to_string()),
            staff: vec![StaffMember {
                name: "Mara".to_string(),
                position: "Door".to_string(),
            }],
            profile_image: None,
        }),
    )
}

pub(super) fn full_reporter(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Reporter(ReporterProfile {
            reporter_name: "Scene Watch".to_string(),
            assigned_dj: Some(ProfileId("dj-1".to_string())),
            biography: "Covers the Berlin circuit.".to_string(),
            recordings: vec![Recording {
                title: "Closing set".to_string(),
                url: "https://cdn.cosmicbeats.app/rec/1.mp4".to_string(),
                recorded_at: created_at(),
            }],
            content_violations: 0,
            profile_image: Some("reporter.png".to_string()),
        }),
    )
}

pub(super) fn full_festival(id: &str) -> Profile {
    profile(
        id,
        RoleProfile::Festival(FestivalProfile {
            festival_name: "Aurora Open Air".to_string(),
            location: berlin(),
            dates: Some(FestivalDates {
                starts_on: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
                ends_on: NaiveDate::from_ymd_opt(2025, 8, 3),
            }),
            lineup: vec!["Nova Pulse".to_string()],
            ticket_url: Some("https://tickets.example/aurora".to_string()),
            description: "Three days by the lake.".to_string(),
        }),
    )
}

/// Mutable access to the DJ variant of a fixture.
pub(super) fn dj_mut(profile: &mut Profile) -> &mut DjProfile {
    match &mut profile.details {
        RoleProfile::Dj(dj) => dj,
        other => panic!("expected dj profile, got {other:?}"),
    }
}

pub(super) fn engine() -> CompletionEngine {
    CompletionEngine::new(SchemaRegistry::standard())
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) profiles: Arc<Mutex<HashMap<ProfileId, Profile>>>,
    fail_balance: Arc<AtomicBool>,
    balance_writes: Arc<Mutex<Vec<u64>>>,
}

impl MemoryStore {
    pub(super) fn fail_balance_updates(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::SeqCst);
    }

    pub(super) fn balance_writes(&self) -> Vec<u64> {
        self.balance_writes.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn stored(&self, id: &str) -> Profile {
        self.profiles
            .lock()
            .expect("store mutex poisoned")
            .get(&ProfileId(id.to_string()))
            .cloned()
            .expect("profile stored")
    }

    fn with_profile(
        &self,
        id: &ProfileId,
        apply: impl FnOnce(&mut Profile),
    ) -> Result<(), StoreError> {
        let mut guard = self.profiles.lock().expect("store mutex poisoned");
        let profile = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        apply(profile);
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    fn insert(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut guard = self.profiles.lock().expect("store mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: Profile) -> Result<(), StoreError> {
        let mut guard = self.profiles.lock().expect("store mutex poisoned");
        if !guard.contains_key(&profile.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        let guard = self.profiles.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_balance(&self, id: &ProfileId, beatcoins: u64) -> Result<(), StoreError> {
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("balance ledger offline".to_string()));
        }
        self.balance_writes
            .lock()
            .expect("store mutex poisoned")
            .push(beatcoins);
        self.with_profile(id, |profile| profile.beatcoins = beatcoins)
    }

    fn update_completion(&self, id: &ProfileId, percentage: u8) -> Result<(), StoreError> {
        self.with_profile(id, |profile| profile.completion_percentage = percentage)
    }

    fn award_badge(&self, id: &ProfileId, badge: Badge) -> Result<(), StoreError> {
        self.with_profile(id, |profile| {
            if !profile.badges.contains(&badge) {
                profile.badges.push(badge);
            }
        })
    }
}

pub(super) struct UnavailableStore;

impl ProfileStore for UnavailableStore {
    fn insert(&self, _profile: Profile) -> Result<Profile, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _profile: Profile) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProfileId) -> Result<Option<Profile>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_balance(&self, _id: &ProfileId, _beatcoins: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_completion(&self, _id: &ProfileId, _percentage: u8) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn award_badge(&self, _id: &ProfileId, _badge: Badge) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPublisher {
    events: Arc<Mutex<Vec<RewardNotice>>>,
}

impl MemoryPublisher {
    pub(super) fn events(&self) -> Vec<RewardNotice> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl RewardPublisher for MemoryPublisher {
    fn publish(&self, notice: RewardNotice) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflinePublisher;

impl RewardPublisher for OfflinePublisher {
    fn publish(&self, _notice: RewardNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("push gateway down".to_string()))
    }
}

pub(super) fn build_service() -> (
    ProfileCompletionService<MemoryStore, MemoryPublisher>,
    Arc<MemoryStore>,
    Arc<MemoryPublisher>,
) {
    let store = Arc::new(MemoryStore::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let service =
        ProfileCompletionService::new(store.clone(), publisher.clone(), SchemaRegistry::standard());
    (service, store, publisher)
}

pub(super) fn profile_router_with_service(
    service: ProfileCompletionService<MemoryStore, MemoryPublisher>,
) -> axum::Router {
    profile_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
