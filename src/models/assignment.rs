use serde::{Deserialize, Serialize};

use super::Submission;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[serde(default = "default_max_score")]
    pub max_score: i32,
    pub due_date: Option<String>,
    #[serde(default = "default_required")]
    pub is_required: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub submissions_count: Option<i64>,
}

/// Assignment detail as returned by `GET /assignments/{id}`: students see
/// only their own submission, course owners see all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentWithSubmissions {
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignmentRequest {
    pub course_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

impl NewAssignmentRequest {
    pub fn new(course_id: i64, title: impl Into<String>) -> Self {
        Self {
            course_id,
            title: title.into(),
            description: None,
            instructions: None,
            max_score: None,
            due_date: None,
            is_required: None,
        }
    }
}

/// Partial update; only the fields that are set go on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

fn default_max_score() -> i32 {
    100
}

fn default_required() -> bool {
    true
}
