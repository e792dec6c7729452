use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "laki-laki" => Self::Male,
            "female" | "f" | "perempuan" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Indonesian display label used on detail views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Laki-laki",
            Self::Female => "Perempuan",
            Self::Unknown => "Tidak diketahui",
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Gender::from_token).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provinsi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negara: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occupations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles_in_community: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            gender,
            ..Self::default()
        }
    }

    /// Native name, treating an empty string as absent.
    pub fn native_name(&self) -> Option<&str> {
        non_empty(self.native_name.as_deref())
    }

    /// Locale attributes in display order, skipping empty values.
    pub fn locale_attributes(&self) -> Vec<(&'static str, &str)> {
        [
            ("Suku", self.suku.as_deref()),
            ("Kota", self.kota.as_deref()),
            ("Provinsi", self.provinsi.as_deref()),
            ("Negara", self.negara.as_deref()),
            ("Tempat lahir", self.place_of_birth.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| non_empty(value).map(|v| (label, v)))
        .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    Spouse,
    ParentOf,
    Child,
    Sibling,
    Other(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Spouse => "spouse",
            Self::ParentOf => "parent_of",
            Self::Child => "child",
            Self::Sibling => "sibling",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for RelationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "spouse" => Self::Spouse,
            "parent_of" => Self::ParentOf,
            "child" => Self::Child,
            "sibling" => Self::Sibling,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RelationType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RelationType> for String {
    fn from(value: RelationType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub person_id_1: String,
    pub person_id_2: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        person_id_1: impl Into<String>,
        person_id_2: impl Into<String>,
        kind: impl Into<RelationType>,
    ) -> Self {
        Self {
            id: id.into(),
            person_id_1: person_id_1.into(),
            person_id_2: person_id_2.into(),
            kind: kind.into(),
            start_date: None,
            end_date: None,
            status: None,
            notes: None,
        }
    }

    pub fn involves(&self, person_id: &str) -> bool {
        self.person_id_1 == person_id || self.person_id_2 == person_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, alias = "event_name")]
    pub title: String,
    #[serde(default, alias = "event_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "person_ids")]
    pub participants: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderDistribution {
    pub male: u64,
    pub female: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_people: u64,
    pub total_relationships: u64,
    pub total_events: u64,
    pub gender_distribution: GenderDistribution,
}

impl Statistics {
    /// Short "L: x, P: y" summary of the gender distribution.
    pub fn gender_summary(&self) -> String {
        format!(
            "L: {}, P: {}",
            self.gender_distribution.male, self.gender_distribution.female
        )
    }
}

/// Everything the tree and timeline need, as fetched in one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilySnapshot {
    pub people: Vec<Person>,
    pub relationships: Vec<Relationship>,
    pub events: Vec<Event>,
}

impl FamilySnapshot {
    /// Totals computed locally, the same way the server reports them.
    pub fn statistics(&self) -> Statistics {
        let count = |gender| self.people.iter().filter(|p| p.gender == gender).count() as u64;
        Statistics {
            total_people: self.people.len() as u64,
            total_relationships: self.relationships.len() as u64,
            total_events: self.events.len() as u64,
            gender_distribution: GenderDistribution {
                male: count(Gender::Male),
                female: count(Gender::Female),
            },
        }
    }
}
