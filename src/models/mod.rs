pub mod assignment;
pub mod course;
pub mod submission;
pub mod user;

use serde::{Deserialize, Serialize};

pub use assignment::{
    Assignment, AssignmentWithSubmissions, NewAssignmentRequest, UpdateAssignmentRequest,
};
pub use course::{Course, CourseModule, CourseStatus, Enrollment, EnrollmentStatus, Pagination};
pub use submission::{Submission, SubmissionFile, SubmissionStatus, UpdateSubmissionRequest};
pub use user::{LoginRequest, RegisterRequest, TokenResponse, User, UserRole};

/// Plain `{"message": ...}` acknowledgement returned by delete/logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Parse a backend timestamp. Accepts RFC 3339 and the naive
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` form, which is read as UTC.
pub fn parse_timestamp(ts: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&chrono::Utc));
    }
    chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
