//! 前端错误类型
//!
//! 所有失败路径最终都回到可交互的 UI 状态：
//! - 校验错误在提交前拦截，逐字段展示
//! - 认证/网络/服务端错误以可关闭的横幅展示
//! - 会话过期会清空会话，由路由服务重定向到登录页

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// 单个表单字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// 错误分类，决定 UI 的呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Rejected,
    Server,
    Network,
    Serialization,
    SessionExpired,
}

/// `message` 字段保存后端返回的 `message`（如果有），
/// 展示时缺省使用各分类的通用文案。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("{}", .0.first().map(|f| f.message.as_str()).unwrap_or("Invalid input"))]
    Validation(Vec<FieldError>),

    #[error("{}", .message.as_deref().unwrap_or("Invalid credentials"))]
    Authentication { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("You do not have permission to perform this action."))]
    Authorization { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("The requested resource was not found."))]
    NotFound { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Operation failed"))]
    Rejected { status: u16, message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Server error. Please try again later."))]
    Server { status: u16, message: Option<String> },

    /// `detail` 仅用于日志，不展示给用户
    #[error("{}", .message.as_deref().unwrap_or("Unable to reach the server"))]
    Network {
        detail: String,
        message: Option<String>,
    },

    #[error("Failed to prepare request")]
    Encode(String),

    #[error("Unexpected response from server")]
    Decode(String),

    #[error("Session expired. Please login again.")]
    SessionExpired,
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
            message: None,
        }
    }

    /// 按 HTTP 状态码归类非 2xx 响应
    ///
    /// `credentialed` 表示请求是否携带了会话令牌：
    /// 携带令牌时 401 意味着会话失效，否则只是凭据错误（如登录失败）。
    pub fn from_status(status: u16, message: Option<String>, credentialed: bool) -> Self {
        match status {
            401 if credentialed => Self::SessionExpired,
            401 => Self::Authentication { message },
            403 => Self::Authorization { message },
            404 => Self::NotFound { message },
            s if s >= 500 => Self::Server { status, message },
            _ => Self::Rejected { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network { .. } => ErrorKind::Network,
            Self::Encode(_) | Self::Decode(_) => ErrorKind::Serialization,
            Self::SessionExpired => ErrorKind::SessionExpired,
        }
    }

    /// 横幅文案
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// 指定字段的校验错误信息
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .find(|e| e.field == field)
                .map(|e| e.message.as_str()),
            _ => None,
        }
    }

    /// 没有后端消息时，用调用方的通用文案替换分类默认文案
    ///
    /// 例如登录失败统一显示 "Login failed"，除非后端给出了具体原因。
    pub fn or_message(self, fallback: &str) -> Self {
        let fill = |message: Option<String>| message.or_else(|| Some(fallback.to_string()));
        match self {
            Self::Authentication { message } => Self::Authentication {
                message: fill(message),
            },
            Self::Authorization { message } => Self::Authorization {
                message: fill(message),
            },
            Self::NotFound { message } => Self::NotFound {
                message: fill(message),
            },
            Self::Rejected { status, message } => Self::Rejected {
                status,
                message: fill(message),
            },
            Self::Server { status, message } => Self::Server {
                status,
                message: fill(message),
            },
            Self::Network { detail, message } => Self::Network {
                detail,
                message: fill(message),
            },
            other => other,
        }
    }
}

/// 客户端持久化存储错误，不会越过会话存储与活动日志向外传播
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("write rejected for key `{0}`")]
    WriteRejected(String),
    #[error("failed to encode value for key `{key}`: {reason}")]
    Encode { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(AppError::from_status(401, None, true), AppError::SessionExpired);
        assert_eq!(
            AppError::from_status(401, Some("Bad credentials".into()), false).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(AppError::from_status(403, None, true).kind(), ErrorKind::Authorization);
        assert_eq!(AppError::from_status(404, None, true).kind(), ErrorKind::NotFound);
        assert_eq!(AppError::from_status(503, None, true).kind(), ErrorKind::Server);
        assert_eq!(AppError::from_status(409, None, true).kind(), ErrorKind::Rejected);
    }

    #[test]
    fn backend_message_wins_over_defaults() {
        let err = AppError::from_status(400, Some("Course code already exists".into()), true);
        assert_eq!(err.user_message(), "Course code already exists");

        let err = AppError::from_status(500, None, true);
        assert_eq!(err.user_message(), "Server error. Please try again later.");
    }

    #[test]
    fn fallback_message_only_fills_gaps() {
        let err = AppError::network("connection refused").or_message("Login failed");
        assert_eq!(err.user_message(), "Login failed");
        assert_eq!(err.kind(), ErrorKind::Network);

        let err = AppError::Authentication {
            message: Some("Account disabled".into()),
        }
        .or_message("Login failed");
        assert_eq!(err.user_message(), "Account disabled");

        assert_eq!(
            AppError::SessionExpired.or_message("Login failed"),
            AppError::SessionExpired
        );
    }

    #[test]
    fn field_messages() {
        let err = AppError::Validation(vec![
            FieldError::new("email", "Email is required"),
            FieldError::new("password", "Password is required"),
        ]);
        assert_eq!(err.field_message("password"), Some("Password is required"));
        assert_eq!(err.field_message("role"), None);
        assert_eq!(err.user_message(), "Email is required");
    }
}
