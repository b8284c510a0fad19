use std::collections::BTreeMap;
use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::lead::NewLead;
use crate::domain::types::{TypeConstraintError, WorkspaceId};

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating a single lead.
pub struct CreateLeadPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 64))]
    pub source: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl CreateLeadPayload {
    pub fn into_new_lead(self, workspace_id: WorkspaceId) -> Result<NewLead, TypeConstraintError> {
        NewLead::try_new(
            workspace_id.get(),
            self.name,
            self.email,
            self.phone,
            self.source,
            Some(self.fields),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeadStatusPayload {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddNotePayload {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(MultipartForm)]
/// Multipart upload carrying a CSV file of leads.
pub struct ImportLeadsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

/// A CSV row that could not be turned into a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file, counting the header.
    pub line: usize,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv header must contain a `name` column")]
    MissingNameColumn,
}

/// Columns that map onto lead attributes; any other column becomes a custom field.
const KNOWN_COLUMNS: [&str; 4] = ["name", "email", "phone", "source"];

/// Parses lead rows from CSV, keeping valid rows and reporting invalid ones.
pub fn parse_leads_csv<R: Read>(
    reader: R,
    workspace_id: WorkspaceId,
) -> Result<(Vec<NewLead>, Vec<RowError>), ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if !headers.iter().any(|h| h == "name") {
        return Err(ImportError::MissingNameColumn);
    }

    let mut leads = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in rdr.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let mut columns: BTreeMap<&str, String> = BTreeMap::new();
        let mut fields = BTreeMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if value.is_empty() {
                continue;
            }
            if KNOWN_COLUMNS.contains(&header.as_str()) {
                columns.insert(header.as_str(), value.to_string());
            } else if !header.is_empty() {
                fields.insert(header.clone(), value.to_string());
            }
        }

        let parsed = NewLead::try_new(
            workspace_id.get(),
            columns.remove("name").unwrap_or_default(),
            columns.remove("email"),
            columns.remove("phone"),
            columns.remove("source"),
            Some(fields),
        );
        match parsed {
            Ok(lead) => leads.push(lead),
            Err(e) => errors.push(RowError {
                line,
                message: e.to_string(),
            }),
        }
    }

    Ok((leads, errors))
}

impl ImportLeadsForm {
    pub fn parse(
        &mut self,
        workspace_id: WorkspaceId,
    ) -> Result<(Vec<NewLead>, Vec<RowError>), ImportError> {
        let mut content = Vec::new();
        self.csv.file.read_to_end(&mut content)?;
        parse_leads_csv(content.as_slice(), workspace_id)
    }
}
