//! 仪表盘聚合器
//!
//! 并发调用多个列表接口，合并为各角色的统计卡片。
//! 单个数据源失败不影响其他卡片：失败的卡片保留上一次的值（初始为 0），
//! 失败信息交给页面以通知形式展示。

use std::collections::HashSet;

use campus_shared::grade::gpa;
use campus_shared::{EnrollmentStatus, GradeRecord};
use futures::future::join_all;

use crate::api::{AdminService, DegreeService, LecturerService, StudentService};
use crate::error::{AppError, AppResult};

/// 某个数据源的加载失败
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: AppError,
}

impl SourceFailure {
    pub fn notification(&self) -> String {
        format!("Failed to load {}: {}", self.source, self.error.user_message())
    }
}

/// 聚合结果：统计值 + 本次失败的数据源
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate<T> {
    pub stats: T,
    pub failures: Vec<SourceFailure>,
}

impl<T> Aggregate<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 成功时用 `apply` 更新卡片，失败时保留旧值并记录
fn merge<V>(
    result: AppResult<V>,
    source: &'static str,
    failures: &mut Vec<SourceFailure>,
    apply: impl FnOnce(V),
) {
    match result {
        Ok(value) => apply(value),
        Err(error) => report(source, error, failures),
    }
}

fn report(source: &'static str, error: AppError, failures: &mut Vec<SourceFailure>) {
    log_warn!("[Overview] {} unavailable: {}", source, error);
    failures.push(SourceFailure { source, error });
}

// =========================================================
// Admin
// =========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdminStats {
    pub students: usize,
    pub lecturers: usize,
    pub courses: usize,
    pub degrees: usize,
    pub enrollments: u64,
}

pub async fn admin_overview(
    admin: &AdminService,
    degrees: &DegreeService,
    previous: AdminStats,
) -> Aggregate<AdminStats> {
    let (students, lecturers, courses, degree_list, summary) = futures::join!(
        admin.students(),
        admin.lecturers(),
        admin.courses(),
        degrees.list(),
        admin.stats(),
    );

    let mut stats = previous;
    let mut failures = Vec::new();
    merge(students, "students", &mut failures, |v| stats.students = v.len());
    merge(lecturers, "lecturers", &mut failures, |v| stats.lecturers = v.len());
    merge(courses, "courses", &mut failures, |v| stats.courses = v.len());
    merge(degree_list, "degrees", &mut failures, |v| stats.degrees = v.len());
    merge(summary, "statistics", &mut failures, |s| {
        if let Some(total) = s.total_enrollments {
            stats.enrollments = total;
        }
    });

    Aggregate { stats, failures }
}

// =========================================================
// Lecturer
// =========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LecturerStats {
    pub courses: usize,
    /// 所有课程中去重后的学生数
    pub students: usize,
    pub assignments: usize,
    /// 尚未评分的提交
    pub ungraded: usize,
}

pub async fn lecturer_overview(
    lecturer: &LecturerService,
    previous: LecturerStats,
) -> Aggregate<LecturerStats> {
    let mut stats = previous;
    let mut failures = Vec::new();

    // 其余统计都依赖课程列表，课程加载失败时整体保留旧值
    let courses = match lecturer.my_courses().await {
        Ok(courses) => courses,
        Err(error) => {
            report("courses", error, &mut failures);
            return Aggregate { stats, failures };
        }
    };
    stats.courses = courses.len();

    let per_course = join_all(courses.iter().map(|course| async move {
        futures::join!(
            lecturer.course_students(course.id),
            lecturer.course_assignments(course.id)
        )
    }))
    .await;

    let mut students: HashSet<i64> = HashSet::new();
    let mut assignments = Vec::new();
    let mut students_ok = true;
    let mut assignments_ok = true;
    for (roster, work) in per_course {
        match roster {
            Ok(list) => students.extend(list.iter().map(|s| s.id)),
            Err(error) => {
                students_ok = false;
                report("students", error, &mut failures);
            }
        }
        match work {
            Ok(list) => assignments.extend(list),
            Err(error) => {
                assignments_ok = false;
                report("assignments", error, &mut failures);
            }
        }
    }
    if students_ok {
        stats.students = students.len();
    }
    if !assignments_ok {
        return Aggregate { stats, failures };
    }
    stats.assignments = assignments.len();

    let submissions = join_all(assignments.iter().map(|a| lecturer.submissions(a.id))).await;
    let mut ungraded = 0;
    let mut submissions_ok = true;
    for result in submissions {
        match result {
            Ok(list) => ungraded += list.iter().filter(|s| !s.is_graded()).count(),
            Err(error) => {
                submissions_ok = false;
                report("submissions", error, &mut failures);
            }
        }
    }
    if submissions_ok {
        stats.ungraded = ungraded;
    }

    Aggregate { stats, failures }
}

// =========================================================
// Student
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentStats {
    pub enrolled: usize,
    /// 未提交的作业
    pub pending_assignments: usize,
    pub gpa: f64,
    /// 已有最终成绩的课程
    pub completed: usize,
    /// 成绩单，供仪表盘的成绩表展示
    pub grades: Vec<GradeRecord>,
}

pub async fn student_overview(
    student: &StudentService,
    previous: StudentStats,
) -> Aggregate<StudentStats> {
    let (enrollments, assignments, grades) = futures::join!(
        student.enrollments(),
        student.assignments(),
        student.grades(),
    );

    let mut stats = previous;
    let mut failures = Vec::new();
    merge(enrollments, "enrollments", &mut failures, |list| {
        stats.enrolled = list
            .iter()
            .filter(|e| e.status == EnrollmentStatus::Enrolled)
            .count();
    });
    merge(assignments, "assignments", &mut failures, |list| {
        stats.pending_assignments = list.iter().filter(|a| a.submitted != Some(true)).count();
    });
    merge(grades, "grades", &mut failures, |list| {
        stats.gpa = gpa(&list);
        stats.completed = list.iter().filter(|g| g.final_grade.is_some()).count();
        stats.grades = list;
    });

    Aggregate { stats, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::AppConfig;
    use crate::error::ErrorKind;
    use crate::session::SessionStore;
    use crate::web::{MemoryStorage, MockTransport};
    use campus_shared::protocol::HttpMethod;
    use serde_json::json;
    use std::rc::Rc;

    const BASE: &str = "http://api.test";

    fn client() -> (ApiClient, Rc<MockTransport>) {
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new(
            &AppConfig::with_base_url(BASE),
            transport.clone(),
            SessionStore::hydrated(MemoryStorage::new()),
        );
        (api, transport)
    }

    fn url(path: &str) -> String {
        format!("{BASE}{path}")
    }

    #[tokio::test]
    async fn admin_counts_every_list() {
        let (api, transport) = client();
        transport.mock_response(HttpMethod::Get, &url("/admin/students"), 200, json!([{ "id": 1 }, { "id": 2 }]));
        transport.mock_response(HttpMethod::Get, &url("/admin/lecturers"), 200, json!([{ "id": 3 }]));
        transport.mock_response(HttpMethod::Get, &url("/admin/courses"), 200, json!([{ "id": 4 }, { "id": 5 }, { "id": 6 }]));
        transport.mock_response(HttpMethod::Get, &url("/degrees"), 200, json!([{ "id": 7 }]));
        transport.mock_response(HttpMethod::Get, &url("/admin/dashboard/stats"), 200, json!({ "totalEnrollments": 42 }));

        let result = admin_overview(
            &AdminService::new(api.clone()),
            &DegreeService::new(api),
            AdminStats::default(),
        )
        .await;

        assert!(result.is_complete());
        assert_eq!(
            result.stats,
            AdminStats {
                students: 2,
                lecturers: 1,
                courses: 3,
                degrees: 1,
                enrollments: 42,
            }
        );
    }

    #[tokio::test]
    async fn admin_partial_failure_keeps_last_known_values() {
        let (api, transport) = client();
        transport.mock_response(HttpMethod::Get, &url("/admin/students"), 200, json!([{ "id": 1 }]));
        transport.mock_raw(HttpMethod::Get, &url("/admin/lecturers"), 500, "");
        transport.mock_response(HttpMethod::Get, &url("/admin/courses"), 200, json!([]));
        transport.mock_response(HttpMethod::Get, &url("/degrees"), 200, json!([]));
        // 统计接口未配置 → 404

        let previous = AdminStats {
            lecturers: 9,
            enrollments: 17,
            ..Default::default()
        };
        let result = admin_overview(
            &AdminService::new(api.clone()),
            &DegreeService::new(api),
            previous,
        )
        .await;

        assert_eq!(result.stats.students, 1);
        assert_eq!(result.stats.lecturers, 9);
        assert_eq!(result.stats.enrollments, 17);

        let sources: Vec<_> = result.failures.iter().map(|f| f.source).collect();
        assert_eq!(sources, vec!["lecturers", "statistics"]);
        assert_eq!(result.failures[0].error.kind(), ErrorKind::Server);
        assert!(result.failures[0].notification().starts_with("Failed to load lecturers"));
    }

    #[tokio::test]
    async fn lecturer_totals_span_all_courses() {
        let (api, transport) = client();
        transport.mock_response(HttpMethod::Get, &url("/lecturer/courses"), 200, json!([{ "id": 1 }, { "id": 2 }]));
        transport.mock_response(HttpMethod::Get, &url("/lecturer/courses/1/students"), 200, json!([{ "id": 10 }, { "id": 11 }]));
        transport.mock_response(HttpMethod::Get, &url("/lecturer/courses/2/students"), 200, json!([{ "id": 11 }, { "id": 12 }]));
        transport.mock_response(HttpMethod::Get, &url("/lecturer/courses/1/assignments"), 200, json!([{ "id": 100, "title": "HW1" }]));
        transport.mock_response(HttpMethod::Get, &url("/lecturer/courses/2/assignments"), 200, json!([]));
        transport.mock_response(
            HttpMethod::Get,
            &url("/lecturer/assignments/100/submissions"),
            200,
            json!([{ "id": 1, "pointsEarned": 8.5 }, { "id": 2 }, { "id": 3 }]),
        );

        let result = lecturer_overview(&LecturerService::new(api), LecturerStats::default()).await;
        assert!(result.is_complete());
        assert_eq!(
            result.stats,
            LecturerStats {
                courses: 2,
                students: 3,
                assignments: 1,
                ungraded: 2,
            }
        );
    }

    #[tokio::test]
    async fn lecturer_course_failure_keeps_everything() {
        let (api, transport) = client();
        transport.go_offline();

        let previous = LecturerStats {
            courses: 4,
            students: 80,
            assignments: 6,
            ungraded: 3,
        };
        let result = lecturer_overview(&LecturerService::new(api), previous).await;
        assert_eq!(result.stats, previous);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].error.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn student_cards() {
        let (api, transport) = client();
        transport.mock_response(
            HttpMethod::Get,
            &url("/student/enrollments"),
            200,
            json!([
                { "id": 1, "status": "ENROLLED" },
                { "id": 2, "status": "ENROLLED" },
                { "id": 3, "status": "DROPPED" }
            ]),
        );
        transport.mock_response(
            HttpMethod::Get,
            &url("/student/assignments"),
            200,
            json!([{ "id": 1, "submitted": true }, { "id": 2, "submitted": false }, { "id": 3 }]),
        );
        transport.mock_response(
            HttpMethod::Get,
            &url("/student/grades"),
            200,
            json!([
                { "letterGrade": "A", "credits": 3, "finalGrade": "A" },
                { "letterGrade": "B", "credits": 3 }
            ]),
        );

        let result = student_overview(&StudentService::new(api), StudentStats::default()).await;
        assert!(result.is_complete());
        assert_eq!(result.stats.enrolled, 2);
        assert_eq!(result.stats.pending_assignments, 2);
        assert_eq!(result.stats.gpa, 3.5);
        assert_eq!(result.stats.completed, 1);
        assert_eq!(result.stats.grades.len(), 2);
    }
}
