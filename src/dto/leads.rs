use serde::{Deserialize, Serialize};

use crate::domain::lead::Lead;
use crate::domain::lead_event::LeadEvent;

/// Query parameters accepted by the lead listing.
#[derive(Debug, Default, Deserialize)]
pub struct LeadsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
}

/// A lead with its most recent activity.
#[derive(Debug, Serialize)]
pub struct LeadDetail {
    pub lead: Lead,
    pub events: Vec<LeadEvent>,
    pub total_events: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImportRowError {
    pub line: usize,
    pub message: String,
}

/// Outcome of a CSV lead import.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Valid rows that clashed with an existing lead email.
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}
