use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use serde::{Deserialize, Serialize};

use super::domain::Role;
use super::fields::path_segments;

/// How strongly the UI should nudge users toward filling a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn label(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }
}

/// One scoring criterion of a role schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub path: String,
    pub label: String,
    pub importance: Importance,
}

impl FieldRequirement {
    pub fn new(path: &str, label: &str, importance: Importance) -> Self {
        Self {
            path: path.to_string(),
            label: label.to_string(),
            importance,
        }
    }
}

/// Immutable per-role lists of required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<Role, Vec<FieldRequirement>>,
}

impl SchemaRegistry {
    /// Registry without any role. Every lookup yields no requirements.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in CosmicBeats schemas for all five roles.
    pub fn standard() -> Self {
        use Importance::{High, Low, Medium};

        let mut schemas = BTreeMap::new();
        schemas.insert(
            Role::Dj,
            vec![
                FieldRequirement::new("djName", "DJ name", High),
                FieldRequirement::new("musicStyle", "Music style", High),
                FieldRequirement::new("biography", "Biography", High),
                FieldRequirement::new("profileImage", "Profile image", Medium),
                FieldRequirement::new("location", "Location", Medium),
                FieldRequirement::new("socialLinks", "Social links", Medium),
                FieldRequirement::new("equipment", "Equipment", Low),
            ],
        );
        schemas.insert(
            Role::Raver,
            vec![
                FieldRequirement::new("username", "Username", High),
                FieldRequirement::new("favoriteGenres", "Favorite genres", High),
                FieldRequirement::new("biography", "Biography", Medium),
                FieldRequirement::new("location.city", "City", Medium),
                FieldRequirement::new("profileImage", "Profile image", Low),
            ],
        );
        schemas.insert(
            Role::Club,
            vec![
                FieldRequirement::new("clubName", "Club name", High),
                FieldRequirement::new("location", "Location", High),
                FieldRequirement::new("capacity", "Capacity", Medium),
                FieldRequirement::new("description", "Description", Medium),
                FieldRequirement::new("musicGenres", "Music genres", Medium),
                FieldRequirement::new("openingHours", "Opening hours", Low),
                FieldRequirement::new("staff", "Staff", Low),
            ],
        );
        schemas.insert(
            Role::Reporter,
            vec![
                FieldRequirement::new("reporterName", "Reporter name", High),
                FieldRequirement::new("assignedDj", "Assigned DJ", High),
                FieldRequirement::new("biography", "Biography", Medium),
                FieldRequirement::new("recordings", "Recordings", Medium),
                FieldRequirement::new("profileImage", "Profile image", Low),
            ],
        );
        schemas.insert(
            Role::Festival,
            vec![
                FieldRequirement::new("festivalName", "Festival name", High),
                FieldRequirement::new("location", "Location", High),
                FieldRequirement::new("dates.startsOn", "Start date", High),
                FieldRequirement::new("lineup", "Lineup", Medium),
                FieldRequirement::new("ticketUrl", "Ticket link", Medium),
                FieldRequirement::new("description", "Description", Low),
            ],
        );

        Self { schemas }
    }

    /// Register (or replace) the requirements for `role`.
    pub fn with_role(
        mut self,
        role: Role,
        requirements: Vec<FieldRequirement>,
    ) -> Result<Self, SchemaError> {
        validate(role, &requirements)?;
        self.schemas.insert(role, requirements);
        Ok(self)
    }

    /// Drop the schema for `role`, leaving it unregistered.
    pub fn without_role(mut self, role: Role) -> Self {
        self.schemas.remove(&role);
        self
    }

    /// Load a registry from a JSON schema document.
    ///
    /// Only the roles present in the document are registered.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_reader(reader)?;
        document
            .roles
            .into_iter()
            .try_fold(Self::empty(), |registry, (role, requirements)| {
                registry.with_role(role, requirements)
            })
    }

    /// Requirements registered for `role`, in scoring order. Empty when unregistered.
    pub fn required_fields(&self, role: Role) -> &[FieldRequirement] {
        self.schemas
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_registered(&self, role: Role) -> bool {
        self.schemas.contains_key(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.schemas.keys().copied()
    }
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    roles: BTreeMap<Role, Vec<FieldRequirement>>,
}

fn validate(role: Role, requirements: &[FieldRequirement]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for requirement in requirements {
        if path_segments(&requirement.path).is_none() {
            return Err(SchemaError::InvalidPath {
                role,
                path: requirement.path.clone(),
            });
        }
        if !seen.insert(requirement.path.as_str()) {
            return Err(SchemaError::DuplicatePath {
                role,
                path: requirement.path.clone(),
            });
        }
    }
    Ok(())
}

/// Raised when a schema document or registration is malformed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{role} schema lists '{path}' more than once")]
    DuplicatePath { role: Role, path: String },
    #[error("{role} schema path '{path}' is malformed or too deep")]
    InvalidPath { role: Role, path: String },
    #[error("unable to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),
}
