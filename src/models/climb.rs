use crate::schema::climbs;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Model for a logged climb (top or project)
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = climbs)]
pub struct Climb {
    pub id: i32,
    // The logger. Ownership never transfers, even when the climb is
    // attributed to another participant via climber_id.
    pub user_id: i32,
    pub climber_id: Option<i32>,
    pub session_id: Option<i32>,
    pub status: String,
    pub location_type: String,
    pub gym_id: Option<i32>,
    pub crag_id: Option<i32>,
    pub grade: String,
    pub style: Option<String>,
    pub attempts: Option<i32>,
    pub media_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// DTO for inserting a new climb
#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = climbs)]
pub struct NewClimb {
    pub user_id: i32,
    pub climber_id: Option<i32>,
    pub session_id: Option<i32>,
    pub status: String,
    pub location_type: String,
    pub gym_id: Option<i32>,
    pub crag_id: Option<i32>,
    pub grade: String,
    pub style: Option<String>,
    pub attempts: Option<i32>,
    pub media_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Top (sent) vs project (still working on it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimbStatus {
    Top,
    Project,
}

impl ClimbStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClimbStatus::Top => "top",
            ClimbStatus::Project => "project",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(ClimbStatus::Top),
            "project" => Some(ClimbStatus::Project),
            _ => None,
        }
    }
}

impl Climb {
    pub fn is_top(&self) -> bool {
        self.status == ClimbStatus::Top.as_str()
    }

    pub fn is_project(&self) -> bool {
        self.status == ClimbStatus::Project.as_str()
    }

    /// A flash is a top done first go; derived, never stored.
    pub fn is_flash(&self) -> bool {
        self.is_top() && self.attempts == Some(1)
    }
}
