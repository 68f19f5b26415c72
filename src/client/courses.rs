use super::ApiClient;
use crate::error::ClientError;
use crate::models::{Course, Enrollment, Pagination};

impl ApiClient {
    pub async fn get_courses(&self, page: Pagination) -> Result<Vec<Course>, ClientError> {
        self.get(&format!("/courses/?{}", page.to_query())).await
    }

    pub async fn get_course(&self, course_id: i64) -> Result<Course, ClientError> {
        self.get(&format!("/courses/{}", course_id)).await
    }

    pub async fn enroll_course(&self, course_id: i64) -> Result<Enrollment, ClientError> {
        self.post_empty(&format!("/courses/{}/enroll", course_id)).await
    }

    pub async fn get_my_enrollments(&self) -> Result<Vec<Enrollment>, ClientError> {
        self.get("/courses/my/enrollments").await
    }
}
