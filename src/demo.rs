//! Synthetic sample data shown while a workspace is in demo mode.

use std::collections::BTreeMap;

use crate::domain::lead::NewLead;
use crate::domain::types::{TypeConstraintError, WorkspaceId};

const SAMPLE_LEADS: &[(&str, &str, &str, &str, &str)] = &[
    ("Avery Chen", "avery.chen@northwind.example", "+14155550101", "website", "Northwind"),
    ("Jordan Patel", "jordan.patel@lumen.example", "+14155550102", "google_ads", "Lumen Labs"),
    ("Riley Okafor", "riley.okafor@brightpath.example", "+14155550103", "referral", "Brightpath"),
    ("Sam Rivera", "sam.rivera@cobalt.example", "+14155550104", "meta_ads", "Cobalt Co"),
    ("Morgan Lee", "morgan.lee@harbor.example", "+14155550105", "webinar", "Harbor"),
    ("Casey Novak", "casey.novak@summit.example", "+14155550106", "website", "Summit"),
    ("Quinn Alvarez", "quinn.alvarez@atlas.example", "+14155550107", "linkedin", "Atlas Freight"),
    ("Taylor Brooks", "taylor.brooks@verde.example", "+14155550108", "google_ads", "Verde"),
    ("Drew Kim", "drew.kim@orbit.example", "+14155550109", "event", "Orbit Systems"),
    ("Parker Singh", "parker.singh@keystone.example", "+14155550110", "referral", "Keystone"),
];

/// Demo leads for `workspace_id`. The output is the same on every call.
pub fn sample_leads(workspace_id: WorkspaceId) -> Result<Vec<NewLead>, TypeConstraintError> {
    SAMPLE_LEADS
        .iter()
        .map(|(name, email, phone, source, company)| {
            let fields = BTreeMap::from([("company".to_string(), (*company).to_string())]);
            NewLead::try_new(
                workspace_id.get(),
                (*name).to_string(),
                Some((*email).to_string()),
                Some((*phone).to_string()),
                Some((*source).to_string()),
                Some(fields),
            )
            .map(NewLead::demo)
        })
        .collect()
}
