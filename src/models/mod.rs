// Public exports for data models

pub mod incident;
pub mod ngo;
pub mod role;
pub mod task;

pub use incident::{Assessment, Incident};
pub use ngo::NgoProfile;
pub use role::UserRole;
pub use task::{Priority, Task, TaskStatus};

use serde::{Deserialize, Serialize};
use validator::Validate;

pub type Id = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within [-180, 180]"))]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Generate a fresh entity identifier
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
