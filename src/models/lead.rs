use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    lead::{Lead as DomainLead, LeadStatus, NewLead as DomainNewLead},
    types::{
        LeadEmail, LeadId, LeadName, LeadSource, PhoneNumber, PublicId, TypeConstraintError,
        WorkspaceId,
    },
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub public_id: Vec<u8>,
    pub workspace_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub fields: Option<String>, // JSON object text
    pub is_demo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
/// Insertable form of [`Lead`].
pub struct NewLead<'a> {
    pub public_id: &'a [u8],
    pub workspace_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub source: Option<&'a str>,
    pub fields: Option<String>,
    pub is_demo: bool,
}

fn parse_fields(raw: Option<String>) -> Option<BTreeMap<String, String>> {
    raw.and_then(|text| serde_json::from_str::<BTreeMap<String, String>>(&text).ok())
        .filter(|map| !map.is_empty())
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::new(lead.id)?,
            public_id: PublicId::from_bytes(&lead.public_id)?,
            workspace_id: WorkspaceId::new(lead.workspace_id)?,
            name: LeadName::new(lead.name)?,
            email: lead.email.map(LeadEmail::new).transpose()?,
            phone: lead.phone.map(PhoneNumber::new).transpose()?,
            source: lead.source.map(LeadSource::new).transpose()?,
            status: LeadStatus::try_from(lead.status.as_str())?,
            fields: parse_fields(lead.fields),
            is_demo: lead.is_demo,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(lead: &'a DomainNewLead) -> Self {
        Self {
            public_id: lead.public_id.as_bytes(),
            workspace_id: lead.workspace_id.get(),
            name: lead.name.as_str(),
            email: lead.email.as_ref().map(LeadEmail::as_str),
            phone: lead.phone.as_ref().map(PhoneNumber::as_str),
            source: lead.source.as_ref().map(LeadSource::as_str),
            fields: lead
                .fields
                .as_ref()
                .and_then(|fields| serde_json::to_string(fields).ok()),
            is_demo: lead.is_demo,
        }
    }
}
