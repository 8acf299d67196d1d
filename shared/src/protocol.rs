//! Endpoint definitions for the course management REST API.
//!
//! Every request type carries its HTTP method, its path (relative to the
//! configured base URL) and the type the response body decodes into. For
//! `POST`/`PUT` requests the request value itself is the JSON body; path
//! parameters are `#[serde(skip)]` so they never leak into the body.

use crate::{
    Ack, AdminDashboardStats, ApiMessage, Assignment, AssignmentRequest, Course, CourseRequest,
    Degree, DegreeRequest, Enrollment, GradeRecord, Lecturer, LoginRequest, LoginResponse,
    PasswordChange, Profile, ProfileUpdate, RegisterRequest, Student, Submission,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;
}

macro_rules! endpoint {
    ($ty:ty, $method:ident, $resp:ty, |$this:ident| $path:expr) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                let $this = self;
                $path
            }
        }
    };
    ($ty:ty, $method:ident, $resp:ty, $path:literal) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                $path.to_string()
            }
        }
    };
}

// =========================================================
// Auth
// =========================================================

endpoint!(LoginRequest, Post, LoginResponse, "/auth/login");
endpoint!(RegisterRequest, Post, ApiMessage, "/auth/register");

// =========================================================
// Admin
// =========================================================

#[derive(Debug, Serialize)]
pub struct GetAdminStats;
endpoint!(GetAdminStats, Get, AdminDashboardStats, "/admin/dashboard/stats");

#[derive(Debug, Serialize)]
pub struct ListStudents;
endpoint!(ListStudents, Get, Vec<Student>, "/admin/students");

#[derive(Debug, Serialize)]
pub struct ListLecturers;
endpoint!(ListLecturers, Get, Vec<Lecturer>, "/admin/lecturers");

#[derive(Debug, Serialize)]
pub struct ListCourses;
endpoint!(ListCourses, Get, Vec<Course>, "/admin/courses");

#[derive(Debug, Serialize)]
pub struct CreateCourse(pub CourseRequest);
endpoint!(CreateCourse, Post, Course, "/admin/courses");

#[derive(Debug, Serialize)]
pub struct UpdateCourse {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub course: CourseRequest,
}
endpoint!(UpdateCourse, Put, Course, |r| format!("/admin/courses/{}", r.id));

#[derive(Debug, Serialize)]
pub struct DeleteCourse {
    #[serde(skip)]
    pub id: i64,
}
endpoint!(DeleteCourse, Delete, Ack, |r| format!("/admin/courses/{}", r.id));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLecturer {
    #[serde(skip)]
    pub course_id: i64,
    pub lecturer_id: i64,
}
endpoint!(AssignLecturer, Put, Course, |r| format!(
    "/admin/courses/{}/assign",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct UpdateStudentStatus {
    #[serde(skip)]
    pub id: i64,
    pub active: bool,
}
endpoint!(UpdateStudentStatus, Put, Ack, |r| format!(
    "/admin/students/{}/status",
    r.id
));

#[derive(Debug, Serialize)]
pub struct UpdateLecturerStatus {
    #[serde(skip)]
    pub id: i64,
    pub active: bool,
}
endpoint!(UpdateLecturerStatus, Put, Ack, |r| format!(
    "/admin/lecturers/{}/status",
    r.id
));

// =========================================================
// Degrees (shared by admin and lecturer screens)
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListDegrees;
endpoint!(ListDegrees, Get, Vec<Degree>, "/degrees");

#[derive(Debug, Serialize)]
pub struct CreateDegree(pub DegreeRequest);
endpoint!(CreateDegree, Post, Degree, "/degrees");

#[derive(Debug, Serialize)]
pub struct UpdateDegree {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub degree: DegreeRequest,
}
endpoint!(UpdateDegree, Put, Degree, |r| format!("/degrees/{}", r.id));

#[derive(Debug, Serialize)]
pub struct DeleteDegree {
    #[serde(skip)]
    pub id: i64,
}
endpoint!(DeleteDegree, Delete, Ack, |r| format!("/degrees/{}", r.id));

// =========================================================
// Lecturer
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListAvailableCourses;
endpoint!(
    ListAvailableCourses,
    Get,
    Vec<Course>,
    "/lecturer/courses/available"
);

#[derive(Debug, Serialize)]
pub struct ListTeachingCourses;
endpoint!(ListTeachingCourses, Get, Vec<Course>, "/lecturer/courses");

#[derive(Debug, Serialize)]
pub struct RegisterToCourse {
    #[serde(skip)]
    pub course_id: i64,
}
endpoint!(RegisterToCourse, Post, Ack, |r| format!(
    "/lecturer/courses/{}/register",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct UnregisterFromCourse {
    #[serde(skip)]
    pub course_id: i64,
}
endpoint!(UnregisterFromCourse, Delete, Ack, |r| format!(
    "/lecturer/courses/{}/unregister",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct ListCourseStudents {
    #[serde(skip)]
    pub course_id: i64,
}
endpoint!(ListCourseStudents, Get, Vec<Student>, |r| format!(
    "/lecturer/courses/{}/students",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct ListCourseAssignments {
    #[serde(skip)]
    pub course_id: i64,
}
endpoint!(ListCourseAssignments, Get, Vec<Assignment>, |r| format!(
    "/lecturer/courses/{}/assignments",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct CreateAssignment(pub AssignmentRequest);
endpoint!(CreateAssignment, Post, Ack, "/lecturer/assignments");

#[derive(Debug, Serialize)]
pub struct DeleteAssignment {
    #[serde(skip)]
    pub id: i64,
}
endpoint!(DeleteAssignment, Delete, Ack, |r| format!(
    "/lecturer/assignments/{}",
    r.id
));

#[derive(Debug, Serialize)]
pub struct ListSubmissions {
    #[serde(skip)]
    pub assignment_id: i64,
}
endpoint!(ListSubmissions, Get, Vec<Submission>, |r| format!(
    "/lecturer/assignments/{}/submissions",
    r.assignment_id
));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSubmission {
    #[serde(skip)]
    pub submission_id: i64,
    pub points_earned: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}
endpoint!(GradeSubmission, Put, Ack, |r| format!(
    "/lecturer/submissions/{}/grade",
    r.submission_id
));

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFinalGrade {
    #[serde(skip)]
    pub course_id: i64,
    #[serde(skip)]
    pub student_id: i64,
    pub final_grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}
endpoint!(SetFinalGrade, Put, Ack, |r| format!(
    "/lecturer/courses/{}/students/{}/grade",
    r.course_id, r.student_id
));

#[derive(Debug, Serialize)]
pub struct GetLecturerProfile;
endpoint!(GetLecturerProfile, Get, Profile, "/lecturer/profile");

#[derive(Debug, Serialize)]
pub struct UpdateLecturerProfile(pub ProfileUpdate);
endpoint!(UpdateLecturerProfile, Put, Profile, "/lecturer/profile");

#[derive(Debug, Serialize)]
pub struct ChangeLecturerPassword(pub PasswordChange);
endpoint!(ChangeLecturerPassword, Put, Ack, "/lecturer/change-password");

// =========================================================
// Student
// =========================================================

#[derive(Debug, Serialize)]
pub struct ListOpenCourses;
endpoint!(ListOpenCourses, Get, Vec<Course>, "/student/courses");

#[derive(Debug, Serialize)]
pub struct ListEnrollments;
endpoint!(ListEnrollments, Get, Vec<Enrollment>, "/student/enrollments");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollInCourse {
    pub course_id: i64,
}
endpoint!(EnrollInCourse, Post, Enrollment, "/student/enrollments");

#[derive(Debug, Serialize)]
pub struct DropCourse {
    #[serde(skip)]
    pub course_id: i64,
}
endpoint!(DropCourse, Delete, Ack, |r| format!(
    "/student/enrollments/{}",
    r.course_id
));

#[derive(Debug, Serialize)]
pub struct ListMyAssignments;
endpoint!(ListMyAssignments, Get, Vec<Assignment>, "/student/assignments");

#[derive(Debug, Serialize)]
pub struct ListMyGrades;
endpoint!(ListMyGrades, Get, Vec<GradeRecord>, "/student/grades");

#[derive(Debug, Serialize)]
pub struct GetStudentProfile;
endpoint!(GetStudentProfile, Get, Profile, "/student/profile");

#[derive(Debug, Serialize)]
pub struct UpdateStudentProfile(pub ProfileUpdate);
endpoint!(UpdateStudentProfile, Put, Profile, "/student/profile");

#[derive(Debug, Serialize)]
pub struct ChangeStudentPassword(pub PasswordChange);
endpoint!(ChangeStudentPassword, Put, Ack, "/student/profile/password");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_parameters_are_not_serialized() {
        let req = UpdateCourse {
            id: 42,
            course: CourseRequest {
                course_code: "CS101".to_string(),
                course_name: "Intro".to_string(),
                credits: 3,
                ..Default::default()
            },
        };
        assert_eq!(req.path(), "/admin/courses/42");
        assert_eq!(UpdateCourse::METHOD, HttpMethod::Put);

        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["courseCode"], "CS101");
    }

    #[test]
    fn nested_path_parameters() {
        let req = SetFinalGrade {
            course_id: 3,
            student_id: 11,
            final_grade: "A-".to_string(),
            feedback: None,
        };
        assert_eq!(req.path(), "/lecturer/courses/3/students/11/grade");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "finalGrade": "A-" })
        );
    }

    #[test]
    fn newtype_requests_serialize_as_inner_body() {
        let req = CreateDegree(DegreeRequest {
            name: "BSc Computing".to_string(),
            faculty: "Science".to_string(),
            description: None,
            duration_years: Some(3),
        });
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["name"], "BSc Computing");
        assert_eq!(body["durationYears"], 3);
    }

    #[test]
    fn only_post_and_put_carry_bodies() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }
}
