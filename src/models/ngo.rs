use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoProfile {
    pub id: Id,
    pub name: String,
    pub active_volunteers: u32,
}

impl NgoProfile {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, active_volunteers: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active_volunteers,
        }
    }

    /// Absolute set; negative requests clamp to zero.
    pub fn set_volunteers(&mut self, count: i64) {
        self.active_volunteers = clamp_volunteers(count);
    }
}

/// Clamp a requested roster size into the storable range.
pub fn clamp_volunteers(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}
