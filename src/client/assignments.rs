use super::ApiClient;
use crate::error::ClientError;
use crate::models::{
    Assignment, AssignmentWithSubmissions, MessageResponse, NewAssignmentRequest,
    UpdateAssignmentRequest,
};

impl ApiClient {
    /// Lists assignments, optionally only those of one course.
    pub async fn get_assignments(&self, course_id: Option<i64>) -> Result<Vec<Assignment>, ClientError> {
        let path = match course_id {
            Some(id) => format!("/assignments/?course_id={}", id),
            None => "/assignments/".to_string(),
        };
        self.get(&path).await
    }

    pub async fn get_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<AssignmentWithSubmissions, ClientError> {
        self.get(&format!("/assignments/{}", assignment_id)).await
    }

    pub async fn create_assignment(
        &self,
        data: &NewAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.post("/assignments/", data).await
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        data: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.put(&format!("/assignments/{}", assignment_id), data).await
    }

    pub async fn delete_assignment(&self, assignment_id: i64) -> Result<MessageResponse, ClientError> {
        let ack: Option<MessageResponse> = self
            .delete(&format!("/assignments/{}", assignment_id))
            .await?;
        Ok(ack.unwrap_or_default())
    }
}
