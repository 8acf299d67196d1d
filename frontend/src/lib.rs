//! 课程管理系统前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 会话存储（持久化 + 订阅）
//! - `auth`: 登录 / 注册 / 登出
//! - `web::route`: 路由定义与守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `menu`: 按角色查表的导航菜单
//! - `api`: 后端网关与各角色服务
//! - `activity`: 管理员活动日志
//! - `management`: 管理员操作（调用后端并记录活动）
//! - `overview`: 仪表盘聚合器
//! - `components`: UI 组件层

#[macro_use]
mod logging;

pub mod activity;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod management;
pub mod menu;
pub mod overview;
pub mod services;
pub mod session;

mod components {
    pub mod admin;
    pub mod course_management;
    pub mod courses;
    pub mod dashboard;
    pub mod entity_table;
    pub mod icons;
    pub mod layout;
    pub mod login;
    pub mod notice;
    pub mod pending;
    pub mod profile;
    pub mod register;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::{FetchTransport, HttpError, HttpRequest, HttpResponse, HttpTransport};
    pub use storage::{BrowserStorage, KeyValueStore};

    #[cfg(test)]
    pub use http::MockTransport;
    #[cfg(test)]
    pub use storage::MemoryStorage;
}

use std::rc::Rc;

use leptos::prelude::*;

use crate::activity::{StoredActivityLog, SystemClock};
use crate::api::{
    AdminService, ApiClient, DegreeService, LecturerService, ProfileService, StudentService,
};
use crate::auth::{AuthContext, AuthService};
use crate::components::admin::{AddCoursePage, CoursesPage, DegreesPage, LecturersPage, StudentsPage};
use crate::components::courses::{
    LecturerAllCoursesPage, LecturerMyCoursesPage, StudentAllCoursesPage, StudentMyCoursesPage,
};
use crate::components::dashboard::DashboardPage;
use crate::components::layout::AppShell;
use crate::components::login::LoginPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::config::AppConfig;
use crate::services::{AppServices, Services};
use crate::session::SessionStore;
use crate::web::route::AppRoute;
use crate::web::router::{Link, Router, RouterOutlet};
use crate::web::{BrowserStorage, FetchTransport};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
/// 守卫放行后才会调用，这里不再检查权限。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Root | AppRoute::Dashboard => view! { <AppShell><DashboardPage /></AppShell> }.into_any(),
        AppRoute::Profile => view! { <AppShell><ProfilePage /></AppShell> }.into_any(),
        AppRoute::AdminStudents => view! { <AppShell><StudentsPage /></AppShell> }.into_any(),
        AppRoute::AdminLecturers => view! { <AppShell><LecturersPage /></AppShell> }.into_any(),
        AppRoute::AdminDegrees => view! { <AppShell><DegreesPage /></AppShell> }.into_any(),
        AppRoute::AdminCourses => view! { <AppShell><CoursesPage /></AppShell> }.into_any(),
        AppRoute::AdminAddCourse => view! { <AppShell><AddCoursePage /></AppShell> }.into_any(),
        AppRoute::LecturerAllCourses => {
            view! { <AppShell><LecturerAllCoursesPage /></AppShell> }.into_any()
        }
        AppRoute::LecturerMyCourses => {
            view! { <AppShell><LecturerMyCoursesPage /></AppShell> }.into_any()
        }
        AppRoute::StudentAllCourses => {
            view! { <AppShell><StudentAllCoursesPage /></AppShell> }.into_any()
        }
        AppRoute::StudentMyCourses => {
            view! { <AppShell><StudentMyCoursesPage /></AppShell> }.into_any()
        }
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Root class="btn btn-primary mt-6">"Back to home"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_env();
    log_info!("[App] API base URL: {}", config.api_base_url);

    // 1. 启动时同步恢复会话，守卫在首次渲染后不会再看到 Loading
    let session = SessionStore::hydrated(BrowserStorage);

    // 2. 网关与服务共用同一个会话存储
    let api = ApiClient::new(&config, Rc::new(FetchTransport), session.clone());
    let auth_ctx = AuthContext::new(AuthService::new(api.clone(), session));
    provide_context(auth_ctx);

    provide_context(Services::new(AppServices {
        admin: AdminService::new(api.clone()),
        degrees: DegreeService::new(api.clone()),
        lecturer: LecturerService::new(api.clone()),
        student: StudentService::new(api.clone()),
        profile: ProfileService::new(api),
        activity: Rc::new(StoredActivityLog::new(BrowserStorage, SystemClock)),
    }));

    // 3. 获取会话状态信号，用于注入路由服务（解耦！）
    let session_state = auth_ctx.session_signal();

    view! {
        // 4. 路由器组件：注入会话信号实现守卫
        <Router session=session_state>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
