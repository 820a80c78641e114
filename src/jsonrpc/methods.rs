//! JSON-RPC method names and their parameter shapes

use serde::{Deserialize, Serialize};

use crate::handlers::VolunteerDelta;
use crate::models::{Id, UserRole};

pub const LOGIN: &str = "drcs/login";
pub const LOGOUT: &str = "drcs/logout";
pub const SESSION: &str = "drcs/session";
pub const REPORT_INCIDENT: &str = "drcs/report_incident";
pub const LIST_INCIDENTS: &str = "drcs/list_incidents";
pub const REQUEST_ANALYSIS: &str = "drcs/request_analysis";
pub const CONVERT_TO_TASK: &str = "drcs/convert_to_task";
pub const LIST_TASKS: &str = "drcs/list_tasks";
pub const LIST_OPEN_TASKS: &str = "drcs/list_open_tasks";
pub const CLAIM_TASK: &str = "drcs/claim_task";
pub const MY_TASKS: &str = "drcs/my_tasks";
pub const GET_NGO_PROFILE: &str = "drcs/get_ngo_profile";
pub const SET_VOLUNTEER_COUNT: &str = "drcs/set_volunteer_count";
pub const ADJUST_VOLUNTEERS: &str = "drcs/adjust_volunteers";
pub const BROADCAST: &str = "drcs/broadcast";
pub const OVERVIEW: &str = "drcs/overview";

/// All supported DRCS JSON-RPC methods
pub const ALL_METHODS: &[&str] = &[
    LOGIN,
    LOGOUT,
    SESSION,
    REPORT_INCIDENT,
    LIST_INCIDENTS,
    REQUEST_ANALYSIS,
    CONVERT_TO_TASK,
    LIST_TASKS,
    LIST_OPEN_TASKS,
    CLAIM_TASK,
    MY_TASKS,
    GET_NGO_PROFILE,
    SET_VOLUNTEER_COUNT,
    ADJUST_VOLUNTEERS,
    BROADCAST,
    OVERVIEW,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginParams {
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentParams {
    pub incident_id: Id,
}

/// Params for the NGO profile and roster methods; `ngo_id` defaults to the
/// session's NGO.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NgoParams {
    #[serde(default)]
    pub ngo_id: Option<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerCountParams {
    #[serde(default)]
    pub ngo_id: Option<Id>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustVolunteersParams {
    #[serde(default)]
    pub ngo_id: Option<Id>,
    pub delta: VolunteerDelta,
}
