use crate::schema::{crags, gyms};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Model for an indoor climbing gym
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = gyms)]
pub struct Gym {
    pub id: i32,
    pub name: String,
    pub city: Option<String>,
    // Ordered gym-specific grade palette, stored as a JSON array of strings.
    pub grading: Option<serde_json::Value>,
}

/// DTO for registering a new gym
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = gyms)]
pub struct NewGym {
    pub name: String,
    pub city: Option<String>,
    pub grading: Option<serde_json::Value>,
}

/// Model for an outdoor crag
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crags)]
pub struct Crag {
    pub id: i32,
    pub name: String,
    pub area: Option<String>,
    pub grading: Option<serde_json::Value>,
}

/// DTO for registering a new crag
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crags)]
pub struct NewCrag {
    pub name: String,
    pub area: Option<String>,
    pub grading: Option<serde_json::Value>,
}

/// Indoor vs outdoor discriminator shared by climbs and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Indoor,
    Outdoor,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Indoor => "indoor",
            LocationType::Outdoor => "outdoor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "indoor" => Some(LocationType::Indoor),
            "outdoor" => Some(LocationType::Outdoor),
            _ => None,
        }
    }
}

/// Gym/crag reference as it arrives on the wire: either a raw id or an
/// embedded object carrying one. Resolved to a plain id at the API boundary
/// so the domain only ever sees `Option<i32>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationRef {
    Id(i32),
    Embedded { id: i32 },
}

impl LocationRef {
    pub fn id(&self) -> i32 {
        match *self {
            LocationRef::Id(id) => id,
            LocationRef::Embedded { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_ref_accepts_raw_id_and_embedded_object() {
        let raw: LocationRef = serde_json::from_str("7").unwrap();
        assert_eq!(raw.id(), 7);

        let embedded: LocationRef = serde_json::from_str(r#"{"id": 12}"#).unwrap();
        assert_eq!(embedded.id(), 12);
    }

    #[test]
    fn location_type_round_trips_through_strings() {
        assert_eq!(LocationType::parse("indoor"), Some(LocationType::Indoor));
        assert_eq!(LocationType::parse("outdoor"), Some(LocationType::Outdoor));
        assert_eq!(LocationType::parse("gym"), None);
        assert_eq!(LocationType::Outdoor.as_str(), "outdoor");
    }
}
