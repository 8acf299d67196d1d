//! 后端服务层
//!
//! `gateway::ApiClient` 负责传输、令牌与错误归类；
//! 各角色的服务只是对端点的薄封装，供页面和仪表盘聚合器调用。

mod gateway;

pub use gateway::{ApiClient, extract_message};

use campus_shared::protocol::*;
use campus_shared::{
    Ack, AdminDashboardStats, Assignment, AssignmentRequest, Course, CourseRequest, Degree,
    DegreeRequest, Enrollment, GradeRecord, Lecturer, PasswordChange, Profile, ProfileUpdate, Role,
    Student, Submission,
};

use crate::error::{AppError, AppResult};

// =========================================================
// Admin
// =========================================================

#[derive(Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> AppResult<AdminDashboardStats> {
        self.api.call(&GetAdminStats).await
    }

    pub async fn students(&self) -> AppResult<Vec<Student>> {
        self.api.call(&ListStudents).await
    }

    pub async fn lecturers(&self) -> AppResult<Vec<Lecturer>> {
        self.api.call(&ListLecturers).await
    }

    pub async fn courses(&self) -> AppResult<Vec<Course>> {
        self.api.call(&ListCourses).await
    }

    pub async fn create_course(&self, course: CourseRequest) -> AppResult<Course> {
        self.api.call(&CreateCourse(course)).await
    }

    pub async fn update_course(&self, id: i64, course: CourseRequest) -> AppResult<Course> {
        self.api.call(&UpdateCourse { id, course }).await
    }

    pub async fn delete_course(&self, id: i64) -> AppResult<()> {
        self.api.call(&DeleteCourse { id }).await.map(|Ack| ())
    }

    pub async fn assign_lecturer(&self, course_id: i64, lecturer_id: i64) -> AppResult<Course> {
        self.api
            .call(&AssignLecturer {
                course_id,
                lecturer_id,
            })
            .await
    }

    pub async fn set_student_active(&self, id: i64, active: bool) -> AppResult<()> {
        self.api
            .call(&UpdateStudentStatus { id, active })
            .await
            .map(|Ack| ())
    }

    pub async fn set_lecturer_active(&self, id: i64, active: bool) -> AppResult<()> {
        self.api
            .call(&UpdateLecturerStatus { id, active })
            .await
            .map(|Ack| ())
    }
}

// =========================================================
// Degrees
// =========================================================

#[derive(Clone)]
pub struct DegreeService {
    api: ApiClient,
}

impl DegreeService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> AppResult<Vec<Degree>> {
        self.api.call(&ListDegrees).await
    }

    pub async fn create(&self, degree: DegreeRequest) -> AppResult<Degree> {
        self.api.call(&CreateDegree(degree)).await
    }

    pub async fn update(&self, id: i64, degree: DegreeRequest) -> AppResult<Degree> {
        self.api.call(&UpdateDegree { id, degree }).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.api.call(&DeleteDegree { id }).await.map(|Ack| ())
    }
}

// =========================================================
// Lecturer
// =========================================================

#[derive(Clone)]
pub struct LecturerService {
    api: ApiClient,
}

impl LecturerService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn available_courses(&self) -> AppResult<Vec<Course>> {
        self.api.call(&ListAvailableCourses).await
    }

    pub async fn my_courses(&self) -> AppResult<Vec<Course>> {
        self.api.call(&ListTeachingCourses).await
    }

    pub async fn register_to_course(&self, course_id: i64) -> AppResult<()> {
        self.api
            .call(&RegisterToCourse { course_id })
            .await
            .map(|Ack| ())
    }

    pub async fn unregister_from_course(&self, course_id: i64) -> AppResult<()> {
        self.api
            .call(&UnregisterFromCourse { course_id })
            .await
            .map(|Ack| ())
    }

    pub async fn course_students(&self, course_id: i64) -> AppResult<Vec<Student>> {
        self.api.call(&ListCourseStudents { course_id }).await
    }

    pub async fn course_assignments(&self, course_id: i64) -> AppResult<Vec<Assignment>> {
        self.api.call(&ListCourseAssignments { course_id }).await
    }

    pub async fn create_assignment(&self, assignment: AssignmentRequest) -> AppResult<()> {
        self.api
            .call(&CreateAssignment(assignment))
            .await
            .map(|Ack| ())
    }

    pub async fn delete_assignment(&self, id: i64) -> AppResult<()> {
        self.api.call(&DeleteAssignment { id }).await.map(|Ack| ())
    }

    pub async fn submissions(&self, assignment_id: i64) -> AppResult<Vec<Submission>> {
        self.api.call(&ListSubmissions { assignment_id }).await
    }

    pub async fn grade_submission(
        &self,
        submission_id: i64,
        points_earned: f64,
        feedback: Option<String>,
    ) -> AppResult<()> {
        self.api
            .call(&GradeSubmission {
                submission_id,
                points_earned,
                feedback,
            })
            .await
            .map(|Ack| ())
    }

    pub async fn set_final_grade(
        &self,
        course_id: i64,
        student_id: i64,
        final_grade: String,
        feedback: Option<String>,
    ) -> AppResult<()> {
        self.api
            .call(&SetFinalGrade {
                course_id,
                student_id,
                final_grade,
                feedback,
            })
            .await
            .map(|Ack| ())
    }
}

// =========================================================
// Student
// =========================================================

#[derive(Clone)]
pub struct StudentService {
    api: ApiClient,
}

impl StudentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn available_courses(&self) -> AppResult<Vec<Course>> {
        self.api.call(&ListOpenCourses).await
    }

    pub async fn enrollments(&self) -> AppResult<Vec<Enrollment>> {
        self.api.call(&ListEnrollments).await
    }

    pub async fn enroll(&self, course_id: i64) -> AppResult<Enrollment> {
        self.api.call(&EnrollInCourse { course_id }).await
    }

    pub async fn drop_course(&self, course_id: i64) -> AppResult<()> {
        self.api.call(&DropCourse { course_id }).await.map(|Ack| ())
    }

    pub async fn assignments(&self) -> AppResult<Vec<Assignment>> {
        self.api.call(&ListMyAssignments).await
    }

    pub async fn grades(&self) -> AppResult<Vec<GradeRecord>> {
        self.api.call(&ListMyGrades).await
    }
}

// =========================================================
// Profile
// =========================================================

/// 个人资料与密码：学生和讲师走各自的端点，管理员没有个人资料
#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn unsupported(role: Role) -> AppError {
        AppError::Authorization {
            message: Some(format!("{role} accounts have no editable profile")),
        }
    }

    pub async fn load(&self, role: Role) -> AppResult<Profile> {
        match role {
            Role::Student => self.api.call(&GetStudentProfile).await,
            Role::Lecturer => self.api.call(&GetLecturerProfile).await,
            Role::Admin => Err(Self::unsupported(role)),
        }
    }

    /// 角色专属字段只提交给对应角色的端点
    pub async fn update(&self, role: Role, mut update: ProfileUpdate) -> AppResult<Profile> {
        match role {
            Role::Student => {
                update.department = None;
                update.office_location = None;
                self.api.call(&UpdateStudentProfile(update)).await
            }
            Role::Lecturer => {
                update.program = None;
                self.api.call(&UpdateLecturerProfile(update)).await
            }
            Role::Admin => Err(Self::unsupported(role)),
        }
    }

    pub async fn change_password(&self, role: Role, change: PasswordChange) -> AppResult<()> {
        match role {
            Role::Student => self.api.call(&ChangeStudentPassword(change)).await,
            Role::Lecturer => self.api.call(&ChangeLecturerPassword(change)).await,
            Role::Admin => Err(Self::unsupported(role)),
        }
        .map(|Ack| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::session::SessionStore;
    use crate::web::{MemoryStorage, MockTransport};
    use serde_json::json;
    use std::rc::Rc;

    const BASE: &str = "http://api.test";

    fn client() -> (ApiClient, Rc<MockTransport>) {
        let transport = Rc::new(MockTransport::new());
        let session = SessionStore::hydrated(MemoryStorage::new());
        let api = ApiClient::new(&AppConfig::with_base_url(BASE), transport.clone(), session);
        (api, transport)
    }

    #[tokio::test]
    async fn create_course_posts_json_body() {
        let (api, transport) = client();
        transport.mock_response(
            HttpMethod::Post,
            "http://api.test/admin/courses",
            201,
            json!({ "id": 12, "courseCode": "CS201", "courseName": "Data Structures" }),
        );

        let course = AdminService::new(api)
            .create_course(CourseRequest {
                course_code: "CS201".to_string(),
                course_name: "Data Structures".to_string(),
                credits: 4,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(course.id, 12);

        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["credits"], 4);
    }

    #[tokio::test]
    async fn lecturer_unregister_accepts_plain_text_reply() {
        let (api, transport) = client();
        transport.mock_raw(
            HttpMethod::Delete,
            "http://api.test/lecturer/courses/5/unregister",
            200,
            "Successfully unregistered from course",
        );

        LecturerService::new(api)
            .unregister_from_course(5)
            .await
            .unwrap();
        assert_eq!(transport.request_count(), 1);
        assert!(transport.last_request().unwrap().body.is_none());
    }

    #[tokio::test]
    async fn student_enroll_sends_course_id() {
        let (api, transport) = client();
        transport.mock_response(
            HttpMethod::Post,
            "http://api.test/student/enrollments",
            200,
            json!({ "id": 1, "courseId": 9, "status": "ENROLLED" }),
        );

        let enrollment = StudentService::new(api).enroll(9).await.unwrap();
        assert_eq!(enrollment.course_id(), Some(9));
        assert_eq!(
            transport.last_request().unwrap().body.as_deref(),
            Some(r#"{"courseId":9}"#)
        );
    }

    #[tokio::test]
    async fn profile_requests_follow_the_role() {
        let (api, transport) = client();
        let profiles = ProfileService::new(api);
        transport.mock_response(
            HttpMethod::Get,
            "http://api.test/lecturer/profile",
            200,
            json!({ "firstName": "Grace", "lastName": "Hopper", "officeLocation": "B-204" }),
        );
        transport.mock_response(
            HttpMethod::Put,
            "http://api.test/lecturer/profile",
            200,
            json!({ "firstName": "Grace", "lastName": "Hopper", "department": "Computing" }),
        );
        transport.mock_raw(
            HttpMethod::Put,
            "http://api.test/student/profile/password",
            200,
            "Password changed successfully",
        );
        transport.mock_raw(
            HttpMethod::Put,
            "http://api.test/lecturer/change-password",
            200,
            "Password changed successfully",
        );

        let profile = profiles.load(Role::Lecturer).await.unwrap();
        assert_eq!(profile.office_location.as_deref(), Some("B-204"));

        let update = ProfileUpdate {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            program: Some("Computing".to_string()),
            department: Some("Computing".to_string()),
            ..Default::default()
        };
        profiles.update(Role::Lecturer, update).await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.url, "http://api.test/lecturer/profile");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["department"], "Computing");
        assert!(body.get("program").is_none());

        let change = PasswordChange {
            current_password: "old-secret".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        };
        profiles
            .change_password(Role::Student, change.clone())
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/student/profile/password"
        );
        profiles.change_password(Role::Lecturer, change).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/lecturer/change-password"
        );
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn admins_have_no_profile_endpoint() {
        let (api, transport) = client();
        let err = ProfileService::new(api).load(Role::Admin).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Authorization);
        assert_eq!(transport.request_count(), 0);
    }
}
