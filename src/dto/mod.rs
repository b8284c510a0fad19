//! Response bodies returned by the services.

pub mod campaigns;
pub mod leads;
