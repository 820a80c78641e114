use serde::{Deserialize, Serialize};

use super::{new_id, Coordinates, Id, Timestamp};

/// Structured triage returned by the analysis gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Disaster category (Flood, Fire, Earthquake, ...)
    #[serde(rename = "type")]
    pub category: String,
    /// Impact score, 1-10 by contract, not enforced
    pub severity_score: f64,
    /// "High", "Med" or "Low" by convention
    pub urgency: String,
    pub suggested_action: String,
}

impl Assessment {
    pub fn new(
        category: impl Into<String>,
        severity_score: f64,
        urgency: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            severity_score,
            urgency: urgency.into(),
            suggested_action: suggested_action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Id,
    pub timestamp: Timestamp,
    pub reporter: String,
    pub description: String,
    pub coordinates: Coordinates,
    /// Present only once an analysis has been merged
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    pub is_analyzed: bool,
    pub is_converted_to_task: bool,
}

impl Incident {
    pub fn new(description: String, reporter: String, coordinates: Coordinates) -> Self {
        Self {
            id: new_id(),
            timestamp: chrono::Utc::now(),
            reporter,
            description,
            coordinates,
            assessment: None,
            is_analyzed: false,
            is_converted_to_task: false,
        }
    }

    /// Replace any previous assessment and mark the incident analyzed.
    pub fn apply_assessment(&mut self, assessment: Assessment) {
        self.assessment = Some(assessment);
        self.is_analyzed = true;
    }

    /// Incidents not yet turned into a mission
    pub fn is_unresolved(&self) -> bool {
        !self.is_converted_to_task
    }
}

impl std::fmt::Display for Incident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.assessment {
            Some(a) => write!(f, "[{} {}/10] {} - {}", a.category, a.severity_score, self.reporter, self.description),
            None => write!(f, "[unassessed] {} - {}", self.reporter, self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flood() -> Incident {
        Incident::new(
            "Flooding near bridge".to_string(),
            "Volunteer_04".to_string(),
            Coordinates::new(34.05, -118.24),
        )
    }

    #[test]
    fn test_new_incident_flags() {
        let incident = flood();
        assert!(!incident.is_analyzed);
        assert!(!incident.is_converted_to_task);
        assert!(incident.assessment.is_none());
        assert!(incident.is_unresolved());
    }

    #[test]
    fn test_apply_assessment_overwrites() {
        let mut incident = flood();
        incident.apply_assessment(Assessment::new("Storm", 3.0, "Low", "Monitor"));
        incident.apply_assessment(Assessment::new("Flood", 7.0, "High", "Deploy boats"));

        assert!(incident.is_analyzed);
        let assessment = incident.assessment.unwrap();
        assert_eq!(assessment.category, "Flood");
        assert_eq!(assessment.suggested_action, "Deploy boats");
    }

    #[test]
    fn test_serialization_field_names() {
        let mut incident = flood();
        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(json["isAnalyzed"], false);
        assert_eq!(json["isConvertedToTask"], false);
        assert!(json.get("type").is_none());

        incident.apply_assessment(Assessment::new("Flood", 7.0, "High", "Deploy boats"));
        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(json["type"], "Flood");
        assert_eq!(json["severity_score"], 7.0);
        assert_eq!(json["urgency"], "High");
        assert_eq!(json["suggested_action"], "Deploy boats");
    }

    #[test]
    fn test_assessment_requires_all_fields() {
        let partial = serde_json::json!({ "type": "Fire", "severity_score": 8 });
        assert!(serde_json::from_value::<Assessment>(partial).is_err());
    }

    #[test]
    fn test_display() {
        let incident = flood();
        assert_eq!(incident.to_string(), "[unassessed] Volunteer_04 - Flooding near bridge");
    }
}
