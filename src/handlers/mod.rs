// Controllers for the session-visible actions

pub mod dashboard;
pub mod government;
pub mod ingestion;
pub mod ngo;
pub mod session;

pub use dashboard::{Dashboard, Overview};
pub use government::{BroadcastReceipt, BroadcastRequest, ConvertTaskRequest, GovernmentController, Resources};
pub use ingestion::{IncidentIngestion, ReportIncidentRequest};
pub use ngo::{ClaimTaskRequest, NgoController, VolunteerDelta};
pub use session::{RoleSession, SessionController};

use validator::Validate;

use crate::{DrcsError, DrcsResult};

/// Run derive-based validation and flatten failures into one validation error
pub fn validate_request<T: Validate>(request: &T) -> DrcsResult<()> {
    request.validate().map_err(|validation_errors| {
        let mut messages: Vec<String> = validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "Field '{}': {}",
                        field,
                        error.message.as_ref().map(|m| m.as_ref()).unwrap_or("validation error")
                    )
                })
            })
            .collect();
        // nested structs (coordinates) report under their parent field
        if messages.is_empty() {
            messages.push(validation_errors.to_string());
        }
        messages.sort();
        DrcsError::validation(messages.join("; "))
    })
}

/// Reject blank (empty or whitespace-only) text input
pub fn require_text(field: &str, value: &str) -> DrcsResult<()> {
    if value.trim().is_empty() {
        return Err(DrcsError::validation(format!("Field '{}': must not be empty", field)));
    }
    Ok(())
}
