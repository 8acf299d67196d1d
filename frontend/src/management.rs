//! 管理员业务操作
//!
//! 页面只负责收集输入和展示结果；调用后端、成功后写入活动日志都在这里完成，
//! 保证每个成功的变更恰好留下一条活动记录，失败的变更不留记录。

use std::rc::Rc;

use campus_shared::{Course, CourseRequest, Degree, DegreeRequest, Lecturer, Student};

use crate::activity::{ActivityLog, AdminAction};
use crate::api::{AdminService, DegreeService};
use crate::error::AppResult;

fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

#[derive(Clone)]
pub struct AdminActions {
    admin: AdminService,
    degrees: DegreeService,
    activity: Rc<dyn ActivityLog>,
}

impl AdminActions {
    pub fn new(admin: AdminService, degrees: DegreeService, activity: Rc<dyn ActivityLog>) -> Self {
        Self {
            admin,
            degrees,
            activity,
        }
    }

    // =========================================================
    // 账户状态
    // =========================================================

    pub async fn set_student_active(&self, student: &Student, active: bool) -> AppResult<()> {
        self.admin.set_student_active(student.id, active).await?;
        let name = full_name(&student.first_name, &student.last_name);
        self.activity
            .record_action(AdminAction::StudentStatus { name: &name, active });
        Ok(())
    }

    pub async fn set_lecturer_active(&self, lecturer: &Lecturer, active: bool) -> AppResult<()> {
        self.admin.set_lecturer_active(lecturer.id, active).await?;
        let name = full_name(&lecturer.first_name, &lecturer.last_name);
        self.activity
            .record_action(AdminAction::LecturerStatus { name: &name, active });
        Ok(())
    }

    // =========================================================
    // 学位
    // =========================================================

    pub async fn create_degree(&self, request: DegreeRequest) -> AppResult<Degree> {
        let degree = self.degrees.create(request.clone()).await?;
        self.activity.record_action(AdminAction::DegreeCreated {
            name: &request.name,
            faculty: &request.faculty,
        });
        Ok(degree)
    }

    pub async fn update_degree(&self, id: i64, request: DegreeRequest) -> AppResult<Degree> {
        let degree = self.degrees.update(id, request.clone()).await?;
        self.activity.record_action(AdminAction::DegreeUpdated {
            name: &request.name,
            faculty: &request.faculty,
        });
        Ok(degree)
    }

    pub async fn delete_degree(&self, degree: &Degree) -> AppResult<()> {
        self.degrees.delete(degree.id).await?;
        self.activity.record_action(AdminAction::DegreeDeleted {
            name: &degree.name,
            faculty: &degree.faculty,
        });
        Ok(())
    }

    // =========================================================
    // 课程
    // =========================================================

    pub async fn create_course(&self, request: CourseRequest) -> AppResult<Course> {
        let course = self.admin.create_course(request.clone()).await?;
        self.activity.record_action(AdminAction::CourseCreated {
            code: &request.course_code,
            name: &request.course_name,
        });
        Ok(course)
    }

    pub async fn update_course(&self, id: i64, request: CourseRequest) -> AppResult<Course> {
        let course = self.admin.update_course(id, request.clone()).await?;
        self.activity.record_action(AdminAction::CourseUpdated {
            code: &request.course_code,
            name: &request.course_name,
        });
        Ok(course)
    }

    pub async fn delete_course(&self, course: &Course) -> AppResult<()> {
        self.admin.delete_course(course.id).await?;
        self.activity.record_action(AdminAction::CourseDeleted {
            code: &course.course_code,
            name: &course.course_name,
        });
        Ok(())
    }

    /// 分配讲师也算一次课程更新
    pub async fn assign_lecturer(&self, course: &Course, lecturer_id: i64) -> AppResult<Course> {
        let updated = self.admin.assign_lecturer(course.id, lecturer_id).await?;
        self.activity.record_action(AdminAction::CourseUpdated {
            code: &course.course_code,
            name: &course.course_name,
        });
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityCategory, FixedClock, StoredActivityLog};
    use crate::api::ApiClient;
    use crate::config::AppConfig;
    use crate::error::ErrorKind;
    use crate::session::SessionStore;
    use crate::web::{MemoryStorage, MockTransport};
    use campus_shared::protocol::HttpMethod;
    use serde_json::json;

    const BASE: &str = "http://api.test";

    fn actions() -> (AdminActions, Rc<MockTransport>, Rc<StoredActivityLog>) {
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new(
            &AppConfig::with_base_url(BASE),
            transport.clone(),
            SessionStore::hydrated(MemoryStorage::new()),
        );
        let log = Rc::new(StoredActivityLog::new(
            MemoryStorage::new(),
            FixedClock::at(1_792_418_700_000),
        ));
        let actions = AdminActions::new(
            AdminService::new(api.clone()),
            DegreeService::new(api),
            log.clone(),
        );
        (actions, transport, log)
    }

    fn computing() -> DegreeRequest {
        DegreeRequest {
            name: "BSc Computing".to_string(),
            faculty: "Science".to_string(),
            description: None,
            duration_years: Some(4),
        }
    }

    #[tokio::test]
    async fn degree_update_is_recorded() {
        let (actions, transport, log) = actions();
        transport.mock_response(
            HttpMethod::Put,
            "http://api.test/degrees/7",
            200,
            json!({ "id": 7, "name": "BSc Computing", "faculty": "Science", "durationYears": 4 }),
        );

        let degree = actions.update_degree(7, computing()).await.unwrap();
        assert_eq!(degree.duration_years, Some(4));

        let recent = log.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "Degree Updated");
        assert_eq!(
            recent[0].description,
            "Degree \"BSc Computing\" in Science was updated"
        );
        assert_eq!(recent[0].category, ActivityCategory::Degree);
    }

    #[tokio::test]
    async fn course_update_is_recorded() {
        let (actions, transport, log) = actions();
        transport.mock_response(
            HttpMethod::Put,
            "http://api.test/admin/courses/3",
            200,
            json!({ "id": 3, "courseCode": "CS101", "courseName": "Programming I", "credits": 4 }),
        );

        let request = CourseRequest {
            course_code: "CS101".to_string(),
            course_name: "Programming I".to_string(),
            credits: 4,
            ..Default::default()
        };
        actions.update_course(3, request).await.unwrap();

        let req = transport.last_request().unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["courseName"], "Programming I");

        let recent = log.recent();
        assert_eq!(recent[0].title, "Course Updated");
        assert_eq!(
            recent[0].description,
            "Course \"Programming I\" (CS101) was updated"
        );
    }

    #[tokio::test]
    async fn failed_changes_leave_no_record() {
        let (actions, transport, log) = actions();
        transport.mock_response(
            HttpMethod::Put,
            "http://api.test/degrees/7",
            400,
            json!({ "message": "Degree name already exists" }),
        );
        transport.mock_response(
            HttpMethod::Delete,
            "http://api.test/admin/courses/3",
            404,
            json!({ "message": "Course not found" }),
        );

        let err = actions.update_degree(7, computing()).await.unwrap_err();
        assert_eq!(err.user_message(), "Degree name already exists");

        let course = Course {
            id: 3,
            course_code: "CS101".to_string(),
            ..Default::default()
        };
        let err = actions.delete_course(&course).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(log.recent().is_empty());
    }

    #[tokio::test]
    async fn status_changes_name_the_account() {
        let (actions, transport, log) = actions();
        transport.mock_raw(
            HttpMethod::Put,
            "http://api.test/admin/lecturers/4/status",
            200,
            "Lecturer status updated",
        );

        let lecturer = Lecturer {
            id: 4,
            first_name: "Grace".to_string(),
            last_name: "Hopper ".to_string(),
            ..Default::default()
        };
        actions.set_lecturer_active(&lecturer, false).await.unwrap();

        assert_eq!(
            transport.last_request().unwrap().body.as_deref(),
            Some(r#"{"active":false}"#)
        );
        let recent = log.recent();
        assert_eq!(recent[0].title, "Lecturer Deactivated");
        assert_eq!(recent[0].description, "Grace Hopper was deactivated");
    }
}
