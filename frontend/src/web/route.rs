//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问规则以及守卫决策函数 `guard`。

use std::fmt::Display;

use campus_shared::Role;

use crate::session::SessionState;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const LECTURER_ONLY: &[Role] = &[Role::Lecturer];
const STUDENT_ONLY: &[Role] = &[Role::Student];

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 入口，按会话重定向
    Root,
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// 各角色共用的首页，内容按角色渲染
    Dashboard,
    Profile,
    AdminStudents,
    AdminLecturers,
    AdminDegrees,
    AdminCourses,
    AdminAddCourse,
    LecturerAllCourses,
    LecturerMyCourses,
    StudentAllCourses,
    StudentMyCourses,
    /// 页面未找到
    NotFound,
}

/// 路由的访问规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// 任何人都可访问（404 页面）
    Open,
    /// 仅未登录用户（登录、注册），已登录用户会被送回首页
    GuestOnly,
    /// 需要登录；角色集合为空表示任意已登录用户
    Authenticated(&'static [Role]),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Self::Root,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/profile" => Self::Profile,
            "/admin/students" => Self::AdminStudents,
            "/admin/lecturers" => Self::AdminLecturers,
            "/admin/degrees" => Self::AdminDegrees,
            "/admin/courses" => Self::AdminCourses,
            "/admin/add-course" => Self::AdminAddCourse,
            "/lecturer/all-courses" => Self::LecturerAllCourses,
            "/lecturer/my-courses" => Self::LecturerMyCourses,
            "/student/all-courses" => Self::StudentAllCourses,
            "/student/my-courses" => Self::StudentMyCourses,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
            Self::AdminStudents => "/admin/students",
            Self::AdminLecturers => "/admin/lecturers",
            Self::AdminDegrees => "/admin/degrees",
            Self::AdminCourses => "/admin/courses",
            Self::AdminAddCourse => "/admin/add-course",
            Self::LecturerAllCourses => "/lecturer/all-courses",
            Self::LecturerMyCourses => "/lecturer/my-courses",
            Self::StudentAllCourses => "/student/all-courses",
            Self::StudentMyCourses => "/student/my-courses",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫规则：该路由的访问要求**
    pub fn access(&self) -> RouteAccess {
        match self {
            Self::Login | Self::Register => RouteAccess::GuestOnly,
            Self::NotFound => RouteAccess::Open,
            Self::Root | Self::Dashboard | Self::Profile => RouteAccess::Authenticated(&[]),
            Self::AdminStudents
            | Self::AdminLecturers
            | Self::AdminDegrees
            | Self::AdminCourses
            | Self::AdminAddCourse => RouteAccess::Authenticated(ADMIN_ONLY),
            Self::LecturerAllCourses | Self::LecturerMyCourses => {
                RouteAccess::Authenticated(LECTURER_ONLY)
            }
            Self::StudentAllCourses | Self::StudentMyCourses => {
                RouteAccess::Authenticated(STUDENT_ONLY)
            }
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self.access(), RouteAccess::Authenticated(_))
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 各角色的首页（登录成功、越权访问时的去向）
    pub fn home_for(_role: Role) -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 守卫
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// 未登录访问受保护页面
    Unauthenticated,
    /// 角色不在允许集合中
    Forbidden,
    /// 已登录用户访问登录/注册页
    AlreadyAuthenticated,
    /// 入口路由 `/`
    Entry,
}

/// 守卫决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// 渲染目标页面
    Allow,
    /// 会话尚未恢复：显示加载指示，既不渲染也不重定向
    Pending,
    Redirect { to: AppRoute, reason: RedirectReason },
}

impl GuardDecision {
    pub fn redirect_target(&self) -> Option<AppRoute> {
        match self {
            GuardDecision::Redirect { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// 判断当前会话能否到达目标路由
///
/// 纯函数，导航前、浏览器前进/后退时以及会话变化时都会重新求值。
pub fn guard(route: &AppRoute, state: &SessionState) -> GuardDecision {
    let session = match state {
        SessionState::Loading => return GuardDecision::Pending,
        SessionState::Anonymous => None,
        SessionState::Authenticated(session) => Some(session),
    };

    if *route == AppRoute::Root {
        let to = match session {
            Some(s) => AppRoute::home_for(s.role()),
            None => AppRoute::auth_failure_redirect(),
        };
        return GuardDecision::Redirect {
            to,
            reason: RedirectReason::Entry,
        };
    }

    match (route.access(), session) {
        (RouteAccess::Open, _) => GuardDecision::Allow,
        (RouteAccess::GuestOnly, None) => GuardDecision::Allow,
        (RouteAccess::GuestOnly, Some(s)) => GuardDecision::Redirect {
            to: AppRoute::home_for(s.role()),
            reason: RedirectReason::AlreadyAuthenticated,
        },
        (RouteAccess::Authenticated(_), None) => GuardDecision::Redirect {
            to: AppRoute::auth_failure_redirect(),
            reason: RedirectReason::Unauthenticated,
        },
        (RouteAccess::Authenticated(roles), Some(s)) => {
            if roles.is_empty() || roles.contains(&s.role()) {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect {
                    to: AppRoute::home_for(s.role()),
                    reason: RedirectReason::Forbidden,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use campus_shared::UserRecord;

    const ALL_ROUTES: [AppRoute; 15] = [
        AppRoute::Root,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::Dashboard,
        AppRoute::Profile,
        AppRoute::AdminStudents,
        AppRoute::AdminLecturers,
        AppRoute::AdminDegrees,
        AppRoute::AdminCourses,
        AppRoute::AdminAddCourse,
        AppRoute::LecturerAllCourses,
        AppRoute::LecturerMyCourses,
        AppRoute::StudentAllCourses,
        AppRoute::StudentMyCourses,
        AppRoute::NotFound,
    ];

    fn signed_in(role: Role) -> SessionState {
        SessionState::Authenticated(Session::new(
            UserRecord {
                user_id: 1,
                email: "user@university.edu".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role,
            },
            "jwt",
        ))
    }

    #[test]
    fn paths_round_trip() {
        for route in ALL_ROUTES.into_iter().filter(|r| *r != AppRoute::NotFound) {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/admin/students/"), AppRoute::AdminStudents);
        assert_eq!(AppRoute::from_path("/dashboard?tab=1"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/admin/unknown"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path(""), AppRoute::Root);
    }

    #[test]
    fn allowed_iff_role_in_required_set() {
        for role in Role::ALL {
            let state = signed_in(role);
            for route in ALL_ROUTES {
                let RouteAccess::Authenticated(required) = route.access() else {
                    continue;
                };
                if route == AppRoute::Root {
                    continue;
                }
                let allowed = required.is_empty() || required.contains(&role);
                let decision = guard(&route, &state);
                assert_eq!(
                    decision == GuardDecision::Allow,
                    allowed,
                    "{role} -> {route}: {decision:?}"
                );
                if !allowed {
                    assert_eq!(
                        decision,
                        GuardDecision::Redirect {
                            to: AppRoute::Dashboard,
                            reason: RedirectReason::Forbidden
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        for route in ALL_ROUTES.into_iter().filter(AppRoute::requires_auth) {
            assert_eq!(
                guard(&route, &SessionState::Anonymous).redirect_target(),
                Some(AppRoute::Login),
                "{route}"
            );
        }
        assert_eq!(guard(&AppRoute::Login, &SessionState::Anonymous), GuardDecision::Allow);
        assert_eq!(guard(&AppRoute::Register, &SessionState::Anonymous), GuardDecision::Allow);
    }

    #[test]
    fn signed_in_users_leave_public_pages() {
        for role in Role::ALL {
            for route in [AppRoute::Login, AppRoute::Register, AppRoute::Root] {
                assert_eq!(
                    guard(&route, &signed_in(role)).redirect_target(),
                    Some(AppRoute::Dashboard)
                );
            }
        }
    }

    #[test]
    fn loading_never_redirects() {
        for route in ALL_ROUTES {
            assert_eq!(guard(&route, &SessionState::Loading), GuardDecision::Pending);
        }
    }

    #[test]
    fn not_found_is_reachable_by_anyone() {
        assert_eq!(guard(&AppRoute::NotFound, &SessionState::Anonymous), GuardDecision::Allow);
        assert_eq!(
            guard(&AppRoute::NotFound, &signed_in(Role::Student)),
            GuardDecision::Allow
        );
    }
}
