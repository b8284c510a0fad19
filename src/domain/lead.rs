use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    LeadEmail, LeadId, LeadName, LeadSource, PhoneNumber, PublicId, TypeConstraintError,
    WorkspaceId,
};

/// Pipeline stage of a lead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

impl LeadStatus {
    /// Leads in these stages may still receive campaign outreach.
    pub fn is_reachable(self) -> bool {
        matches!(self, LeadStatus::New | LeadStatus::Contacted)
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        };
        write!(f, "{value}")
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "won" => Ok(LeadStatus::Won),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown lead status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub public_id: PublicId,
    pub workspace_id: WorkspaceId,
    pub name: LeadName,
    pub email: Option<LeadEmail>,
    pub phone: Option<PhoneNumber>,
    pub source: Option<LeadSource>,
    pub status: LeadStatus,
    /// Optional set of custom fields.
    pub fields: Option<BTreeMap<String, String>>,
    /// Synthetic row shown only while the workspace is in demo mode.
    pub is_demo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewLead {
    pub public_id: PublicId,
    pub workspace_id: WorkspaceId,
    pub name: LeadName,
    pub email: Option<LeadEmail>,
    pub phone: Option<PhoneNumber>,
    pub source: Option<LeadSource>,
    pub fields: Option<BTreeMap<String, String>>,
    pub is_demo: bool,
}

/// Treats blank optional inputs as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl NewLead {
    /// Validates raw input into a live (non-demo) lead.
    pub fn try_new(
        workspace_id: i32,
        name: String,
        email: Option<String>,
        phone: Option<String>,
        source: Option<String>,
        fields: Option<BTreeMap<String, String>>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            public_id: PublicId::new(),
            workspace_id: WorkspaceId::new(workspace_id)?,
            name: LeadName::new(name)?,
            email: non_blank(email).map(LeadEmail::new).transpose()?,
            phone: non_blank(phone).map(PhoneNumber::new).transpose()?,
            source: non_blank(source).map(LeadSource::new).transpose()?,
            fields: fields.filter(|m| !m.is_empty()),
            is_demo: false,
        })
    }

    #[must_use]
    pub fn demo(mut self) -> Self {
        self.is_demo = true;
        self
    }
}
