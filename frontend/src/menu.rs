//! 角色导航菜单
//!
//! 菜单是按角色查表得到的静态数据，不在组件里分支拼装。
//! 每个叶子项都带有目标路由，`route_for_key` 与菜单表共用同一份数据，
//! 测试中再校验叶子路由都能通过对应角色的守卫。

use campus_shared::Role;

use crate::web::route::AppRoute;

/// 菜单图标引用，由 `components::icons` 渲染
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Dashboard,
    Users,
    Student,
    Lecturer,
    Academic,
    Degree,
    Book,
    BookOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    /// 分组项没有路由
    pub route: Option<AppRoute>,
    pub children: &'static [MenuItem],
}

impl MenuItem {
    const fn leaf(key: &'static str, label: &'static str, icon: Icon, route: AppRoute) -> Self {
        Self {
            key,
            label,
            icon,
            route: Some(route),
            children: &[],
        }
    }

    const fn group(
        key: &'static str,
        label: &'static str,
        icon: Icon,
        children: &'static [MenuItem],
    ) -> Self {
        Self {
            key,
            label,
            icon,
            route: None,
            children,
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// 自身及所有后代中的叶子项
    pub fn leaves(&self) -> Vec<&'static MenuItem> {
        let mut out = Vec::new();
        for child in self.children {
            if child.is_group() {
                out.extend(child.leaves());
            } else {
                out.push(child);
            }
        }
        out
    }
}

// =========================================================
// 角色能力表
// =========================================================

/// 所有菜单共有的首页入口
const HOME: MenuItem = MenuItem::leaf("home", "Home", Icon::Dashboard, AppRoute::Dashboard);

const USER_MANAGEMENT: &[MenuItem] = &[
    MenuItem::leaf("students", "Students", Icon::Student, AppRoute::AdminStudents),
    MenuItem::leaf("lecturers", "Lecturers", Icon::Lecturer, AppRoute::AdminLecturers),
];

const ACADEMIC_MANAGEMENT: &[MenuItem] = &[
    MenuItem::leaf("degrees", "Degrees", Icon::Degree, AppRoute::AdminDegrees),
    MenuItem::leaf("courses", "Courses", Icon::Book, AppRoute::AdminCourses),
];

const ADMIN_MENU: &[MenuItem] = &[
    HOME,
    MenuItem::group(
        "user-management",
        "User Management",
        Icon::Users,
        USER_MANAGEMENT,
    ),
    MenuItem::group(
        "academic-management",
        "Academic Management",
        Icon::Academic,
        ACADEMIC_MANAGEMENT,
    ),
];

const LECTURER_MENU: &[MenuItem] = &[
    HOME,
    MenuItem::leaf("all-courses", "All Courses", Icon::Book, AppRoute::LecturerAllCourses),
    MenuItem::leaf("my-courses", "My Courses", Icon::BookOpen, AppRoute::LecturerMyCourses),
];

const STUDENT_MENU: &[MenuItem] = &[
    HOME,
    MenuItem::leaf("all-courses", "All Courses", Icon::Book, AppRoute::StudentAllCourses),
    MenuItem::leaf("my-courses", "My Courses", Icon::BookOpen, AppRoute::StudentMyCourses),
];

const GUEST_MENU: &[MenuItem] = &[HOME];

fn capabilities(role: Option<Role>) -> &'static [MenuItem] {
    match role {
        Some(Role::Admin) => ADMIN_MENU,
        Some(Role::Lecturer) => LECTURER_MENU,
        Some(Role::Student) => STUDENT_MENU,
        None => GUEST_MENU,
    }
}

/// 构建指定角色的菜单树
pub fn build_menu(role: Option<Role>) -> Vec<MenuItem> {
    capabilities(role).to_vec()
}

fn leaf_items(role: Option<Role>) -> impl Iterator<Item = &'static MenuItem> {
    capabilities(role).iter().flat_map(|item| {
        if item.is_group() {
            item.leaves()
        } else {
            vec![item]
        }
    })
}

/// 菜单项 key 对应的路由；分组 key 或不属于该角色的 key 返回 `None`
pub fn route_for_key(role: Option<Role>, key: &str) -> Option<AppRoute> {
    leaf_items(role)
        .find(|item| item.key == key)
        .and_then(|item| item.route)
}

/// 当前路由在菜单中对应的叶子 key（用于高亮）
pub fn key_for_route(role: Option<Role>, route: AppRoute) -> Option<&'static str> {
    let route = match route {
        AppRoute::AdminAddCourse => AppRoute::AdminCourses,
        other => other,
    };
    leaf_items(role)
        .find(|item| item.route == Some(route))
        .map(|item| item.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionState};
    use crate::web::route::{GuardDecision, guard};
    use campus_shared::UserRecord;

    fn keys(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn admin_menu_has_both_groups() {
        let menu = build_menu(Some(Role::Admin));
        assert_eq!(
            keys(&menu),
            vec!["home", "user-management", "academic-management"]
        );

        let users = &menu[1];
        assert_eq!(users.label, "User Management");
        assert_eq!(keys(users.children), vec!["students", "lecturers"]);
        assert_eq!(users.route, None);

        let academic = &menu[2];
        assert_eq!(academic.label, "Academic Management");
        assert_eq!(keys(academic.children), vec!["degrees", "courses"]);
    }

    #[test]
    fn lecturer_and_student_menus_list_courses() {
        for role in [Role::Lecturer, Role::Student] {
            let menu = build_menu(Some(role));
            let labels: Vec<_> = menu.iter().map(|i| i.label).collect();
            assert_eq!(labels, vec!["Home", "All Courses", "My Courses"]);
        }
    }

    #[test]
    fn no_role_gets_only_the_base_entry() {
        let menu = build_menu(None);
        assert_eq!(keys(&menu), vec!["home"]);
        assert_eq!(menu[0].label, "Home");
    }

    #[test]
    fn keys_resolve_to_role_namespaced_routes() {
        assert_eq!(
            route_for_key(Some(Role::Admin), "students"),
            Some(AppRoute::AdminStudents)
        );
        assert_eq!(
            route_for_key(Some(Role::Student), "all-courses"),
            Some(AppRoute::StudentAllCourses)
        );
        assert_eq!(
            route_for_key(Some(Role::Lecturer), "all-courses"),
            Some(AppRoute::LecturerAllCourses)
        );
        assert_eq!(route_for_key(Some(Role::Student), "students"), None);
        assert_eq!(route_for_key(Some(Role::Admin), "user-management"), None);
    }

    #[test]
    fn every_leaf_has_a_route_the_role_may_visit() {
        for role in Role::ALL {
            let state = SessionState::Authenticated(Session::new(
                UserRecord {
                    user_id: 1,
                    email: "u@university.edu".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    role,
                },
                "jwt",
            ));
            for leaf in leaf_items(Some(role)) {
                let route = route_for_key(Some(role), leaf.key)
                    .unwrap_or_else(|| panic!("{role}: `{}` has no route", leaf.key));
                assert_eq!(guard(&route, &state), GuardDecision::Allow, "{role} -> {route}");
            }
        }
        assert_eq!(route_for_key(None, "home"), Some(AppRoute::Dashboard));
    }

    #[test]
    fn add_course_highlights_courses_entry() {
        assert_eq!(
            key_for_route(Some(Role::Admin), AppRoute::AdminAddCourse),
            Some("courses")
        );
        assert_eq!(
            key_for_route(Some(Role::Student), AppRoute::StudentMyCourses),
            Some("my-courses")
        );
        assert_eq!(key_for_route(Some(Role::Student), AppRoute::Profile), None);
    }
}
