//! API 网关
//!
//! 所有后端调用都经过同一个 `ApiClient`：
//! - 请求拦截：存在会话时附加 `Authorization: Bearer <token>`
//! - 响应拦截：携带令牌的请求收到 401 时清除会话，
//!   路由服务监听到会话变化后会把用户带回登录页

use std::rc::Rc;

use campus_shared::protocol::ApiRequest;
use campus_shared::{ApiMessage, BEARER_PREFIX, HEADER_AUTHORIZATION};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::session::SessionStore;
use crate::web::{HttpRequest, HttpResponse, HttpTransport};

/// 纯文本错误消息的最大展示长度
const MAX_PLAIN_MESSAGE_LEN: usize = 300;

#[derive(Clone)]
pub struct ApiClient {
    base_url: Rc<str>,
    transport: Rc<dyn HttpTransport>,
    session: Rc<SessionStore>,
}

impl ApiClient {
    pub fn new(
        config: &AppConfig,
        transport: Rc<dyn HttpTransport>,
        session: Rc<SessionStore>,
    ) -> Self {
        Self {
            base_url: Rc::from(config.api_base_url.trim_end_matches('/')),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Rc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个类型化请求并解码响应
    pub async fn call<R: ApiRequest>(&self, request: &R) -> AppResult<R::Response> {
        self.dispatch(request, true).await
    }

    /// 不携带会话令牌的请求（登录、注册），401 只表示凭据错误
    pub async fn call_public<R: ApiRequest>(&self, request: &R) -> AppResult<R::Response> {
        self.dispatch(request, false).await
    }

    async fn dispatch<R: ApiRequest>(&self, request: &R, credentialed: bool) -> AppResult<R::Response> {
        let mut req = HttpRequest::new(self.url(&request.path()), R::METHOD)
            .with_header("Accept", "application/json");

        if R::METHOD.has_body() {
            let body = serde_json::to_string(request).map_err(|e| AppError::Encode(e.to_string()))?;
            req = req
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        let (req, sent_token) = if credentialed {
            self.intercept_request(req)
        } else {
            (req, None)
        };
        let method = req.method;
        let url = req.url.clone();

        let response = self.transport.send(req).await.map_err(|e| {
            log_error!("[Api] {} {} failed: {}", method.as_str(), url, e);
            AppError::network(e.to_string())
        })?;

        let body = self.intercept_response(response, sent_token.as_deref())?;
        decode_body(&body)
    }

    /// 请求拦截器：附加 Bearer 令牌，返回实际发送的令牌
    fn intercept_request(&self, req: HttpRequest) -> (HttpRequest, Option<String>) {
        match self.session.token() {
            Some(token) => {
                let value = format!("{}{}", BEARER_PREFIX, token);
                (req.with_header(HEADER_AUTHORIZATION, &value), Some(token))
            }
            None => (req, None),
        }
    }

    /// 响应拦截器：成功时返回响应体，失败时归类错误
    fn intercept_response(&self, response: HttpResponse, sent_token: Option<&str>) -> AppResult<String> {
        if response.ok() {
            return Ok(response.body);
        }

        let status = response.status;
        let message = extract_message(&response.body);
        let err = AppError::from_status(status, message, sent_token.is_some());

        if err == AppError::SessionExpired {
            // 只有当前会话仍是发出请求时的会话才清除，迟到的旧响应直接忽略
            if self.session.token().as_deref() == sent_token {
                log_warn!("[Api] Credential rejected ({}), clearing session", status);
                self.session.clear_session();
            }
        } else if status >= 500 {
            log_error!("[Api] Server error {}: {}", status, err);
        }

        Err(err)
    }
}

/// 解码成功响应体
///
/// 空响应体按 `null` 解码；不是 JSON 的纯文本（如 "Successfully registered to course"）
/// 按 JSON 字符串解码，`Ack` / `ApiMessage` 都能接受。
fn decode_body<T: serde::de::DeserializeOwned>(body: &str) -> AppResult<T> {
    let body = body.trim();
    if body.is_empty() {
        return serde_json::from_str("null").map_err(|e| AppError::Decode(e.to_string()));
    }

    let value = serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()));
    serde_json::from_value(value).map_err(|e| {
        log_error!("[Api] Failed to decode response: {}", e);
        AppError::Decode(e.to_string())
    })
}

/// 从错误响应体中提取可读消息
///
/// 支持 `{"message": "..."}`、`{"error": "..."}` 以及较短的纯文本响应体。
pub fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            if let Ok(ApiMessage { message: Some(m) }) =
                serde_json::from_value::<ApiMessage>(Value::Object(map.clone()))
            {
                if !m.trim().is_empty() {
                    return Some(m);
                }
            }
            map.get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        }
        Ok(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Ok(_) => None,
        // 纯文本，但排除 HTML 错误页
        Err(_) if !body.starts_with('<') && body.len() <= MAX_PLAIN_MESSAGE_LEN => {
            Some(body.to_string())
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::session::{Session, SessionState};
    use crate::web::{MemoryStorage, MockTransport};
    use campus_shared::protocol::{DeleteCourse, HttpMethod, ListCourses, ListStudents};
    use campus_shared::{Ack, LoginRequest, Role, UserRecord};
    use serde_json::json;

    const BASE: &str = "http://localhost:8080/api";

    fn setup(logged_in: bool) -> (ApiClient, Rc<MockTransport>, Rc<SessionStore>) {
        let session = SessionStore::hydrated(MemoryStorage::new());
        if logged_in {
            session.set_session(Session::new(
                UserRecord {
                    user_id: 1,
                    email: "admin@university.edu".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    role: Role::Admin,
                },
                "jwt-1",
            ));
        }
        let transport = Rc::new(MockTransport::new());
        let client = ApiClient::new(
            &AppConfig::with_base_url(format!("{}/", BASE)),
            transport.clone(),
            session.clone(),
        );
        (client, transport, session)
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_logged_in() {
        let (client, transport, _) = setup(true);
        transport.mock_response(HttpMethod::Get, &format!("{}/admin/students", BASE), 200, json!([]));

        let students = client.call(&ListStudents).await.unwrap();
        assert!(students.is_empty());

        let req = transport.last_request().unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/admin/students");
        assert_eq!(req.header("Authorization"), Some("Bearer jwt-1"));
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn sends_unauthenticated_without_session() {
        let (client, transport, _) = setup(false);
        transport.mock_response(HttpMethod::Get, &format!("{}/admin/courses", BASE), 200, json!([]));

        client.call(&ListCourses).await.unwrap();
        assert_eq!(transport.last_request().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn unauthorized_response_clears_session() {
        let (client, transport, session) = setup(true);
        transport.mock_raw(HttpMethod::Get, &format!("{}/admin/courses", BASE), 401, "");

        let err = client.call(&ListCourses).await.unwrap_err();
        assert_eq!(err, AppError::SessionExpired);
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn public_call_rejection_is_not_session_expiry() {
        let (client, transport, session) = setup(true);
        transport.mock_response(
            HttpMethod::Post,
            &format!("{}/auth/login", BASE),
            401,
            json!({ "message": "Invalid email or password" }),
        );

        let err = client
            .call_public(&LoginRequest {
                email: "admin@university.edu".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.user_message(), "Invalid email or password");
        assert!(session.state().is_authenticated());
        assert_eq!(transport.last_request().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn forbidden_keeps_session() {
        let (client, transport, session) = setup(true);
        transport.mock_raw(
            HttpMethod::Get,
            &format!("{}/admin/courses", BASE),
            403,
            "Access denied",
        );

        let err = client.call(&ListCourses).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(err.user_message(), "Access denied");
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let (client, transport, session) = setup(true);
        transport.go_offline();

        let err = client.call(&ListCourses).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(session.state().is_authenticated());
    }

    #[tokio::test]
    async fn empty_body_decodes_as_ack() {
        let (client, transport, _) = setup(true);
        transport.mock_raw(HttpMethod::Delete, &format!("{}/admin/courses/3", BASE), 204, "");

        let ack = client.call(&DeleteCourse { id: 3 }).await.unwrap();
        assert_eq!(ack, Ack);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let (client, transport, _) = setup(true);
        transport.mock_raw(HttpMethod::Get, &format!("{}/admin/courses", BASE), 200, "{oops");

        let err = client.call(&ListCourses).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);

        transport.mock_response(
            HttpMethod::Get,
            &format!("{}/admin/courses", BASE),
            200,
            json!({ "id": 1 }),
        );

        let err = client.call(&ListCourses).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn message_extraction() {
        assert_eq!(
            extract_message(r#"{"message":"Email already registered"}"#).as_deref(),
            Some("Email already registered")
        );
        assert_eq!(
            extract_message(r#"{"error":"Bad Request","status":400}"#).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(
            extract_message("Failed to register to course: full").as_deref(),
            Some("Failed to register to course: full")
        );
        assert_eq!(extract_message("<html><body>502</body></html>"), None);
        assert_eq!(extract_message(r#"{"status":500}"#), None);
        assert_eq!(extract_message("   "), None);
    }
}
