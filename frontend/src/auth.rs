//! 认证模块
//!
//! - `AuthService`: 登录 / 注册 / 登出，与 UI 框架无关，可直接单元测试
//! - `AuthContext`: 把会话存储桥接为 Leptos 信号，通过 Context 在组件间共享
//!
//! 路由服务只依赖注入的会话信号，不直接调用本模块。

use std::rc::Rc;
use std::sync::LazyLock;

use campus_shared::{LoginRequest, PasswordChange, RegisterRequest, Role};
use leptos::prelude::*;
use regex::Regex;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult, FieldError};
use crate::session::{Session, SessionState, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 6;
const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const REGISTRATION_SUCCEEDED: &str = "Registration successful! Please login.";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

// =========================================================
// 注册表单
// =========================================================

/// 注册表单的原始输入，提交前在客户端完成校验
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
    pub phone: String,
    /// 仅学生
    pub student_id: String,
    /// 仅学生
    pub program: String,
    /// 仅讲师
    pub department: String,
    /// 仅讲师
    pub office_location: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl RegisterForm {
    /// 校验全部字段，返回所有字段错误；通过时生成请求体
    ///
    /// 角色专属字段只在对应角色下提交。
    pub fn validate(&self) -> AppResult<RegisterRequest> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("first_name", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("last_name", "Last name is required"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !EMAIL_RE.is_match(email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.confirm_password != self.password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }

        if self.role.is_none() {
            errors.push(FieldError::new("role", "Please select a role"));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let role = self.role;
        let is = |r: Role| role == Some(r);
        Ok(RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role,
            phone: optional(&self.phone),
            student_id: optional(&self.student_id).filter(|_| is(Role::Student)),
            program: optional(&self.program).filter(|_| is(Role::Student)),
            department: optional(&self.department).filter(|_| is(Role::Lecturer)),
            office_location: optional(&self.office_location).filter(|_| is(Role::Lecturer)),
        })
    }
}

// =========================================================
// 修改密码表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> AppResult<PasswordChange> {
        let mut errors = Vec::new();

        if self.current_password.is_empty() {
            errors.push(FieldError::new(
                "current_password",
                "Please enter your current password",
            ));
        }
        if self.new_password.is_empty() {
            errors.push(FieldError::new("new_password", "Please enter a new password"));
        } else if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "new_password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.confirm_password.is_empty() {
            errors.push(FieldError::new(
                "confirm_password",
                "Please confirm your new password",
            ));
        } else if self.confirm_password != self.new_password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(PasswordChange {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
            confirm_password: self.confirm_password.clone(),
        })
    }
}

// =========================================================
// 认证服务
// =========================================================

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Rc<SessionStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: Rc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Rc<SessionStore> {
        &self.session
    }

    /// 登录成功后写入会话存储；失败时会话存储保持不变
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = email.trim();
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Please input your email!"));
        }
        if password.trim().is_empty() {
            errors.push(FieldError::new("password", "Please input your password!"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .api
            .call_public(&request)
            .await
            .map_err(|e| e.or_message(LOGIN_FAILED))?;

        if response.token.trim().is_empty() {
            log_error!("[Auth] Login response carried no token");
            return Err(AppError::Authentication {
                message: Some(LOGIN_FAILED.to_string()),
            });
        }

        let session = Session::new(response.user_record(), response.token);
        log_info!("[Auth] Logged in as {} ({})", session.email(), session.role());
        self.session.set_session(session.clone());
        Ok(session)
    }

    /// 注册新账户，返回提示文案
    ///
    /// 注册成功不会建立会话，用户需要重新登录。
    pub async fn register(&self, form: &RegisterForm) -> AppResult<String> {
        let request = form.validate()?;

        let reply = self
            .api
            .call_public(&request)
            .await
            .map_err(|e| e.or_message(REGISTRATION_FAILED))?;

        log_info!("[Auth] Registered {} as {:?}", request.email, request.role);
        Ok(reply
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| REGISTRATION_SUCCEEDED.to_string()))
    }

    /// 登出只清除本地会话（无状态令牌，无需通知服务端）
    pub fn logout(&self) {
        log_info!("[Auth] Logged out");
        self.session.clear_session();
    }
}

// =========================================================
// Leptos 桥接
// =========================================================

/// 认证上下文
///
/// 会话状态信号由会话存储的订阅驱动，组件只读；
/// 写操作都经过 `AuthService`。
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: ReadSignal<SessionState>,
    service: StoredValue<AuthService, LocalStorage>,
}

impl AuthContext {
    pub fn new(service: AuthService) -> Self {
        let store = service.session().clone();
        let (state, set_state) = signal(store.state());
        store.subscribe(move |next| set_state.set(next.clone()));

        Self {
            state,
            service: StoredValue::new_local(service),
        }
    }

    pub fn state(&self) -> ReadSignal<SessionState> {
        self.state
    }

    /// 会话状态信号（用于路由服务注入）
    pub fn session_signal(&self) -> Signal<SessionState> {
        let state = self.state;
        Signal::derive(move || state.get())
    }

    pub fn service(&self) -> AuthService {
        self.service.get_value()
    }

    pub fn logout(&self) {
        self.service.with_value(|service| service.logout());
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorKind;
    use crate::web::route::{AppRoute, GuardDecision, guard};
    use crate::web::{MemoryStorage, MockTransport};
    use campus_shared::protocol::HttpMethod;
    use serde_json::json;

    const BASE: &str = "http://localhost:8080/api";

    fn service() -> (AuthService, Rc<MockTransport>, Rc<SessionStore>) {
        let transport = Rc::new(MockTransport::new());
        let session = SessionStore::hydrated(MemoryStorage::new());
        let api = ApiClient::new(
            &AppConfig::with_base_url(BASE),
            transport.clone(),
            session.clone(),
        );
        (AuthService::new(api, session.clone()), transport, session)
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@university.edu".to_string(),
            password: "engine1".to_string(),
            confirm_password: "engine1".to_string(),
            role: Some(Role::Student),
            student_id: "S-1001".to_string(),
            department: "Mathematics".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn admin_login_scenario() {
        let (auth, transport, session) = service();
        transport.mock_response(
            HttpMethod::Post,
            "http://localhost:8080/api/auth/login",
            200,
            json!({
                "token": "jwt-admin",
                "type": "Bearer",
                "email": "admin@university.edu",
                "role": "ADMIN",
                "firstName": "System",
                "lastName": "Administrator",
                "userId": 1
            }),
        );

        let logged_in = auth.login("admin@university.edu", "admin123").await.unwrap();
        assert_eq!(logged_in.role(), Role::Admin);

        let state = session.state();
        assert_eq!(state.role(), Some(Role::Admin));
        assert_eq!(guard(&AppRoute::AdminStudents, &state), GuardDecision::Allow);
        assert_eq!(
            guard(&AppRoute::StudentAllCourses, &state).redirect_target(),
            Some(AppRoute::Dashboard)
        );

        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body, json!({ "email": "admin@university.edu", "password": "admin123" }));
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let (auth, transport, session) = service();
        transport.mock_raw(HttpMethod::Post, "http://localhost:8080/api/auth/login", 401, "");

        let err = auth.login("admin@university.edu", "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.user_message(), LOGIN_FAILED);
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn login_surfaces_backend_message() {
        let (auth, transport, _) = service();
        transport.mock_response(
            HttpMethod::Post,
            "http://localhost:8080/api/auth/login",
            400,
            json!({ "message": "Account is disabled" }),
        );

        let err = auth.login("x@university.edu", "secret").await.unwrap_err();
        assert_eq!(err.user_message(), "Account is disabled");
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_backend() {
        let (auth, transport, _) = service();

        let err = auth.login("   ", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.field_message("email").is_some());
        assert!(err.field_message("password").is_some());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn mismatched_passwords_issue_no_request() {
        let (auth, transport, _) = service();
        let form = RegisterForm {
            confirm_password: "engine2".to_string(),
            ..valid_form()
        };

        let err = auth.register(&form).await.unwrap_err();
        assert_eq!(err.field_message("confirm_password"), Some("Passwords do not match"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn registration_does_not_start_a_session() {
        let (auth, transport, session) = service();
        transport.mock_response(
            HttpMethod::Post,
            "http://localhost:8080/api/auth/register",
            200,
            json!({ "message": "User registered successfully" }),
        );

        let message = auth.register(&valid_form()).await.unwrap();
        assert_eq!(message, "User registered successfully");
        assert_eq!(session.state(), SessionState::Anonymous);

        // 讲师字段不会随学生注册提交
        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body["role"], "STUDENT");
        assert_eq!(body["studentId"], "S-1001");
        assert!(body.get("department").is_none());
        assert!(body.get("confirmPassword").is_none());
    }

    #[tokio::test]
    async fn registration_failure_falls_back_to_generic_message() {
        let (auth, transport, _) = service();
        transport.mock_raw(
            HttpMethod::Post,
            "http://localhost:8080/api/auth/register",
            500,
            "<html>Internal Server Error</html>",
        );

        let err = auth.register(&valid_form()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.user_message(), REGISTRATION_FAILED);
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (auth, transport, session) = service();
        transport.mock_response(
            HttpMethod::Post,
            "http://localhost:8080/api/auth/login",
            200,
            json!({ "token": "t", "email": "s@university.edu", "role": "STUDENT", "userId": 7 }),
        );
        auth.login("s@university.edu", "secret").await.unwrap();

        auth.logout();
        assert_eq!(session.get_session(), None);
    }

    #[test]
    fn form_validation_collects_every_field() {
        let err = RegisterForm::default().validate().unwrap_err();
        for field in ["first_name", "last_name", "email", "password", "role"] {
            assert!(err.field_message(field).is_some(), "missing error for {field}");
        }

        let form = RegisterForm {
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
            confirm_password: "12345".to_string(),
            ..valid_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field_message("email"), Some("Please enter a valid email"));
        assert_eq!(
            err.field_message("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(err.field_message("confirm_password"), None);
    }

    #[test]
    fn lecturer_extras_follow_role() {
        let form = RegisterForm {
            role: Some(Role::Lecturer),
            office_location: " B-204 ".to_string(),
            ..valid_form()
        };
        let request = form.validate().unwrap();
        assert_eq!(request.department.as_deref(), Some("Mathematics"));
        assert_eq!(request.office_location.as_deref(), Some("B-204"));
        assert_eq!(request.student_id, None);
    }

    #[test]
    fn password_change_requires_matching_confirmation() {
        let form = PasswordForm {
            current_password: "old-secret".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "new-secreT".to_string(),
        };
        let Err(AppError::Validation(errors)) = form.validate() else {
            panic!("mismatched confirmation must be rejected");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "confirm_password");
        assert_eq!(errors[0].message, "Passwords do not match");

        let short = PasswordForm {
            current_password: String::new(),
            new_password: "abc".to_string(),
            confirm_password: "abc".to_string(),
        };
        let Err(AppError::Validation(errors)) = short.validate() else {
            panic!("short password must be rejected");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["current_password", "new_password"]);

        let ok = PasswordForm {
            confirm_password: "new-secret".to_string(),
            ..form
        };
        let change = ok.validate().unwrap();
        assert_eq!(change.new_password, "new-secret");
        assert_eq!(change.current_password, "old-secret");
    }
}
