use reqwest::multipart::{Form, Part};
use tracing::debug;
use uuid::Uuid;

use super::{ApiClient, read_response};
use crate::error::ClientError;
use crate::models::{Submission, SubmissionFile, UpdateSubmissionRequest};

impl ApiClient {
    pub async fn get_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>, ClientError> {
        self.get(&format!("/assignments/{}/submissions", assignment_id)).await
    }

    pub async fn get_submission(&self, submission_id: i64) -> Result<Submission, ClientError> {
        self.get(&format!("/assignments/submissions/{}", submission_id)).await
    }

    pub async fn update_submission(
        &self,
        submission_id: i64,
        data: &UpdateSubmissionRequest,
    ) -> Result<Submission, ClientError> {
        self.put(&format!("/assignments/submissions/{}", submission_id), data)
            .await
    }

    /// Uploads a submission as `multipart/form-data`.
    ///
    /// Empty `content` is left out of the form. Whether the caller supplied
    /// anything worth submitting is not checked here; the backend rejects
    /// an upload with neither content nor file.
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        content: Option<&str>,
        file: Option<SubmissionFile>,
    ) -> Result<Submission, ClientError> {
        let mut form = Form::new().text("assignment_id", assignment_id.to_string());

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            form = form.text("content", content.to_string());
        }

        if let Some(file) = file {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.mime_type {
                part = part
                    .mime_str(&mime)
                    .map_err(|e| ClientError::InvalidInput(format!("bad mime type {}: {}", mime, e)))?;
            }
            form = form.part("file", part);
        }

        let path = format!("/assignments/{}/submissions", assignment_id);
        let request_id = Uuid::new_v4();
        debug!(%request_id, method = "POST", path = %path, "sending multipart request");

        // The transport sets the multipart Content-Type with its boundary.
        let request = self.authorized(self.http.post(self.url(&path))).multipart(form);

        let cancel = self.shutdown.child_token();
        self.cancellable(&cancel, async {
            let response = request.send().await?;
            read_response(request_id, response).await
        })
        .await
    }
}
