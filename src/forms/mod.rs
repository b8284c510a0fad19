//! JSON and multipart payloads accepted by the HTTP API.

use serde::Deserialize;

pub mod campaigns;
pub mod leads;

#[derive(Debug, Deserialize)]
/// Body of the on/off endpoints (demo mode, execution gate).
pub struct TogglePayload {
    pub enabled: bool,
}
