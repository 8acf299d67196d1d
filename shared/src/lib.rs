use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

pub mod date;
pub mod grade;
pub mod protocol;

pub use date::Timestamp;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

// =========================================================
// 角色 (Roles)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Lecturer, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Lecturer => "LECTURER",
            Role::Student => "STUDENT",
        }
    }

    /// 解析后端或表单提交的角色字符串，大小写不敏感
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================
// 认证 (Authentication)
// =========================================================

/// 持久化到客户端存储的用户记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
}

impl UserRecord {
    /// "名 姓"，两者都为空时退回邮箱
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub user_id: i64,
}

impl LoginResponse {
    pub fn user_record(&self) -> UserRecord {
        UserRecord {
            user_id: self.user_id,
            email: self.email.clone(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_location: Option<String>,
}

/// 后端返回的通用消息体，`{ "message": "..." }` 或纯字符串
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiMessage {
    pub message: Option<String>,
}

impl<'de> Deserialize<'de> for ApiMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Object {
                #[serde(default)]
                message: Option<String>,
            },
            Other(IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => ApiMessage {
                message: Some(text),
            },
            Raw::Object { message } => ApiMessage { message },
            Raw::Other(_) => ApiMessage::default(),
        })
    }
}

/// 忽略响应体内容的确认类型（用于 DELETE 等无意义返回值的接口）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Ack;

impl<'de> Deserialize<'de> for Ack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| Ack)
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub description: Option<String>,
    pub credits: Option<u32>,
    pub capacity: Option<u32>,
    pub lecturer_id: Option<i64>,
    pub lecturer_name: Option<String>,
    pub degree_id: Option<i64>,
    pub department: Option<String>,
    pub enrolled_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub course_code: String,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Degree {
    pub id: i64,
    pub name: String,
    pub faculty: String,
    pub description: Option<String>,
    pub duration_years: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeRequest {
    pub name: String,
    pub faculty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<u32>,
}

/// 编辑表单的初始值
impl From<&Course> for CourseRequest {
    fn from(course: &Course) -> Self {
        Self {
            course_code: course.course_code.clone(),
            course_name: course.course_name.clone(),
            description: course.description.clone(),
            credits: course.credits.unwrap_or_default(),
            capacity: course.capacity,
            lecturer_id: course.lecturer_id,
            degree_id: course.degree_id,
            department: course.department.clone(),
        }
    }
}

impl From<&Degree> for DegreeRequest {
    fn from(degree: &Degree) -> Self {
        Self {
            name: degree.name.clone(),
            faculty: degree.faculty.clone(),
            description: degree.description.clone(),
            duration_years: degree.duration_years,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lecturer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub office_location: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    #[default]
    Enrolled,
    Dropped,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrollment {
    pub id: i64,
    pub course: Option<Course>,
    pub course_id: Option<i64>,
    pub status: EnrollmentStatus,
    pub final_grade: Option<String>,
    pub enrollment_date: Option<String>,
}

impl Enrollment {
    pub fn course_id(&self) -> Option<i64> {
        self.course_id.or_else(|| self.course.as_ref().map(|c| c.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignment {
    pub id: i64,
    pub course_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub max_points: Option<u32>,
    pub submitted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub course_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub max_points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: Option<i64>,
    pub student_name: Option<String>,
    pub submission_text: Option<String>,
    pub file_name: Option<String>,
    pub submitted_at: Option<String>,
    pub grade: Option<f64>,
    pub points_earned: Option<f64>,
    pub feedback: Option<String>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some() || self.points_earned.is_some()
    }
}

/// 学生成绩单中的一门课程
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeRecord {
    pub course_id: Option<i64>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<u32>,
    pub letter_grade: Option<String>,
    pub final_grade: Option<String>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboardStats {
    pub total_users: Option<u64>,
    pub total_students: Option<u64>,
    pub total_lecturers: Option<u64>,
    pub total_courses: Option<u64>,
    pub total_enrollments: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    // 学生
    pub student_id: Option<String>,
    pub program: Option<String>,
    // 讲师
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_location: Option<String>,
}

/// 修改密码请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_prefills_its_update_request() {
        let course: Course = serde_json::from_str(
            r#"{"id": 7, "courseCode": "CS101", "courseName": "Intro", "lecturerId": 4, "capacity": 40}"#,
        )
        .unwrap();
        let request = CourseRequest::from(&course);
        assert_eq!(request.course_code, "CS101");
        assert_eq!(request.credits, 0);
        assert_eq!(request.lecturer_id, Some(4));
        assert_eq!(request.capacity, Some(40));

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("description").is_none());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" LECTURER "), Some(Role::Lecturer));
        assert_eq!(Role::parse("Student"), Some(Role::Student));
        assert_eq!(Role::parse("JANITOR"), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = UserRecord {
            user_id: 1,
            email: "a@university.edu".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: Role::Student,
        };
        assert_eq!(user.display_name(), "Ada Lovelace");

        user.last_name.clear();
        assert_eq!(user.display_name(), "Ada");

        user.first_name = "  ".to_string();
        assert_eq!(user.display_name(), "a@university.edu");
    }

    #[test]
    fn login_response_decodes_backend_payload() {
        let json = r#"{
            "token": "jwt",
            "type": "Bearer",
            "email": "admin@university.edu",
            "role": "ADMIN",
            "firstName": "System",
            "lastName": null,
            "userId": 1
        }"#;
        let res: LoginResponse = serde_json::from_str(json).unwrap();
        let user = res.user_record();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.first_name, "System");
        assert_eq!(user.last_name, "");
    }

    #[test]
    fn ack_accepts_any_body() {
        assert_eq!(serde_json::from_str::<Ack>("null").unwrap(), Ack);
        assert_eq!(serde_json::from_str::<Ack>(r#"{"message":"ok"}"#).unwrap(), Ack);
        assert_eq!(serde_json::from_str::<Ack>("[1,2]").unwrap(), Ack);
    }

    #[test]
    fn api_message_accepts_object_or_text() {
        let msg: ApiMessage = serde_json::from_str(r#"{"message":"User registered"}"#).unwrap();
        assert_eq!(msg.message.as_deref(), Some("User registered"));
        let msg: ApiMessage = serde_json::from_str(r#""Registered""#).unwrap();
        assert_eq!(msg.message.as_deref(), Some("Registered"));
        let msg: ApiMessage = serde_json::from_str("null").unwrap();
        assert_eq!(msg.message, None);
    }

    #[test]
    fn dto_decoding_tolerates_missing_fields() {
        let course: Course = serde_json::from_str(r#"{"id": 7, "courseCode": "CS101"}"#).unwrap();
        assert_eq!(course.id, 7);
        assert_eq!(course.course_code, "CS101");
        assert!(course.credits.is_none());

        let enrollment: Enrollment =
            serde_json::from_str(r#"{"id": 1, "course": {"id": 9}, "status": "COMPLETED"}"#)
                .unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Completed);
        assert_eq!(enrollment.course_id(), Some(9));
    }

    #[test]
    fn register_request_omits_absent_role_extras() {
        let req = RegisterRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@university.edu".to_string(),
            password: "secret1".to_string(),
            role: Some(Role::Lecturer),
            department: Some("CS".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["role"], "LECTURER");
        assert_eq!(value["department"], "CS");
        assert!(value.get("studentId").is_none());
    }
}
