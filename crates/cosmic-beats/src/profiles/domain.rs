use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{FieldTree, FieldValue};

/// Identifier wrapper for platform profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of user types, each with its own required-field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Dj,
    #[serde(alias = "ally")]
    Raver,
    Club,
    Reporter,
    Festival,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Dj,
        Role::Raver,
        Role::Club,
        Role::Reporter,
        Role::Festival,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Dj => "dj",
            Role::Raver => "raver",
            Role::Club => "club",
            Role::Reporter => "reporter",
            Role::Festival => "festival",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dj" => Ok(Role::Dj),
            "raver" | "ally" => Ok(Role::Raver),
            "club" => Ok(Role::Club),
            "reporter" => Ok(Role::Reporter),
            "festival" => Ok(Role::Festival),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// A role name outside the closed [`Role`] set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    Free,
    Pro,
    Vip,
}

impl MembershipTier {
    pub fn label(&self) -> &'static str {
        match self {
            MembershipTier::Free => "free",
            MembershipTier::Pro => "pro",
            MembershipTier::Vip => "vip",
        }
    }
}

/// Achievement markers shown on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    ProfileComplete,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::ProfileComplete => "profile_complete",
        }
    }
}

/// A platform profile: shared attributes plus the role-specific variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub username: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub beatcoins: u64,
    #[serde(default)]
    pub completion_percentage: u8,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub membership: MembershipTier,
    #[serde(default)]
    pub badges: Vec<Badge>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: RoleProfile,
}

fn default_level() -> u32 {
    1
}

impl Profile {
    /// Synthesize a fresh profile with platform defaults.
    pub fn new(
        id: ProfileId,
        username: impl Into<String>,
        details: RoleProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            level: default_level(),
            beatcoins: 0,
            completion_percentage: 0,
            verified: false,
            membership: MembershipTier::Free,
            badges: Vec::new(),
            created_at,
            details,
        }
    }

    pub fn role(&self) -> Role {
        self.details.role()
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }
}

impl FieldTree for Profile {
    fn field_tree(&self) -> FieldValue {
        let mut entries = vec![
            ("id", FieldValue::from(&self.id.0)),
            ("username", FieldValue::from(&self.username)),
            ("role", FieldValue::from(self.role().label())),
            ("level", FieldValue::from(self.level)),
            ("beatcoins", FieldValue::from(self.beatcoins)),
            (
                "completionPercentage",
                FieldValue::from(self.completion_percentage),
            ),
            ("verified", FieldValue::from(self.verified)),
            ("membership", FieldValue::from(self.membership.label())),
            (
                "badges",
                FieldValue::list(self.badges.iter().map(|badge| badge.label())),
            ),
            ("createdAt", FieldValue::from(self.created_at)),
        ];
        entries.extend(self.details.field_entries());
        FieldValue::object(entries)
    }
}

/// Role-specific portion of a profile, tagged by `role` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Dj(DjProfile),
    #[serde(alias = "ally")]
    Raver(RaverProfile),
    Club(ClubProfile),
    Reporter(ReporterProfile),
    Festival(FestivalProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Dj(_) => Role::Dj,
            RoleProfile::Raver(_) => Role::Raver,
            RoleProfile::Club(_) => Role::Club,
            RoleProfile::Reporter(_) => Role::Reporter,
            RoleProfile::Festival(_) => Role::Festival,
        }
    }

    /// Empty variant for `role`, used when a user record is first loaded.
    pub fn empty(role: Role) -> Self {
        match role {
            Role::Dj => RoleProfile::Dj(DjProfile::default()),
            Role::Raver => RoleProfile::Raver(RaverProfile::default()),
            Role::Club => RoleProfile::Club(ClubProfile::default()),
            Role::Reporter => RoleProfile::Reporter(ReporterProfile::default()),
            Role::Festival => RoleProfile::Festival(FestivalProfile::default()),
        }
    }

    fn field_entries(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            RoleProfile::Dj(dj) => vec![
                ("djName", FieldValue::from(&dj.dj_name)),
                ("musicStyle", FieldValue::from(&dj.music_style)),
                ("biography", FieldValue::from(&dj.biography)),
                ("profileImage", FieldValue::from(dj.profile_image.clone())),
                ("location", dj.location.field_tree()),
                ("socialLinks", dj.social_links.field_tree()),
                ("equipment", dj.equipment.field_tree()),
            ],
            RoleProfile::Raver(raver) => vec![
                ("favoriteGenres", FieldValue::list(&raver.favorite_genres)),
                ("biography", FieldValue::from(&raver.biography)),
                ("location", raver.location.field_tree()),
                ("profileImage", FieldValue::from(raver.profile_image.clone())),
                ("referralCode", FieldValue::from(raver.referral_code.clone())),
            ],
            RoleProfile::Club(club) => vec![
                ("clubName", FieldValue::from(&club.club_name)),
                ("location", club.location.field_tree()),
                ("capacity", FieldValue::from(club.capacity)),
                ("description", FieldValue::from(&club.description)),
                ("musicGenres", FieldValue::list(&club.music_genres)),
                ("openingHours", FieldValue::from(club.opening_hours.clone())),
                (
                    "staff",
                    FieldValue::List(club.staff.iter().map(FieldTree::field_tree).collect()),
                ),
                ("profileImage", FieldValue::from(club.profile_image.clone())),
            ],
            RoleProfile::Reporter(reporter) => vec![
                ("reporterName", FieldValue::from(&reporter.reporter_name)),
                (
                    "assignedDj",
                    FieldValue::from(reporter.assigned_dj.as_ref().map(|id| &id.0)),
                ),
                ("biography", FieldValue::from(&reporter.biography)),
                (
                    "recordings",
                    FieldValue::List(
                        reporter
                            .recordings
                            .iter()
                            .map(FieldTree::field_tree)
                            .collect(),
                    ),
                ),
                (
                    "contentViolations",
                    FieldValue::from(reporter.content_violations),
                ),
                (
                    "profileImage",
                    FieldValue::from(reporter.profile_image.clone()),
                ),
            ],
            RoleProfile::Festival(festival) => vec![
                ("festivalName", FieldValue::from(&festival.festival_name)),
                ("location", festival.location.field_tree()),
                (
                    "dates",
                    festival
                        .dates
                        .as_ref()
                        .map(FieldTree::field_tree)
                        .unwrap_or(FieldValue::Null),
                ),
                ("lineup", FieldValue::list(&festival.lineup)),
                ("ticketUrl", FieldValue::from(festival.ticket_url.clone())),
                ("description", FieldValue::from(&festival.description)),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
}

impl FieldTree for Location {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("address", FieldValue::from(&self.address)),
            ("city", FieldValue::from(&self.city)),
            ("country", FieldValue::from(&self.country)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Equipment {
    pub decks: Vec<String>,
    pub mixers: Vec<String>,
    pub controllers: Vec<String>,
}

impl FieldTree for Equipment {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("decks", FieldValue::list(&self.decks)),
            ("mixers", FieldValue::list(&self.mixers)),
            ("controllers", FieldValue::list(&self.controllers)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub soundcloud: Option<String>,
    pub mixcloud: Option<String>,
    pub website: Option<String>,
}

impl FieldTree for SocialLinks {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("instagram", FieldValue::from(self.instagram.clone())),
            ("soundcloud", FieldValue::from(self.soundcloud.clone())),
            ("mixcloud", FieldValue::from(self.mixcloud.clone())),
            ("website", FieldValue::from(self.website.clone())),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DjProfile {
    pub dj_name: String,
    pub music_style: String,
    pub biography: String,
    pub profile_image: Option<String>,
    pub location: Location,
    pub social_links: SocialLinks,
    pub equipment: Equipment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RaverProfile {
    pub favorite_genres: Vec<String>,
    pub biography: String,
    pub location: Location,
    pub profile_image: Option<String>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub name: String,
    pub position: String,
}

impl FieldTree for StaffMember {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("name", FieldValue::from(&self.name)),
            ("position", FieldValue::from(&self.position)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClubProfile {
    pub club_name: String,
    pub location: Location,
    pub capacity: Option<u32>,
    pub description: String,
    pub music_genres: Vec<String>,
    pub opening_hours: Option<String>,
    pub staff: Vec<StaffMember>,
    pub profile_image: Option<String>,
}

/// A set captured by a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub title: String,
    pub url: String,
    pub recorded_at: DateTime<Utc>,
}

impl FieldTree for Recording {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("title", FieldValue::from(&self.title)),
            ("url", FieldValue::from(&self.url)),
            ("recordedAt", FieldValue::from(self.recorded_at)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReporterProfile {
    pub reporter_name: String,
    pub assigned_dj: Option<ProfileId>,
    pub biography: String,
    pub recordings: Vec<Recording>,
    pub content_violations: u32,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalDates {
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
}

impl FieldTree for FestivalDates {
    fn field_tree(&self) -> FieldValue {
        FieldValue::object([
            ("startsOn", FieldValue::from(self.starts_on)),
            ("endsOn", FieldValue::from(self.ends_on)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FestivalProfile {
    pub festival_name: String,
    pub location: Location,
    pub dates: Option<FestivalDates>,
    pub lineup: Vec<String>,
    pub ticket_url: Option<String>,
    pub description: String,
}
