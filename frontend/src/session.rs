//! 会话存储
//!
//! 整个应用中"谁已登录"的唯一数据源：
//! - 持久化两个槽位：`token`（原始字符串）和 `user`（JSON 用户记录）
//! - 会话要么完整存在，要么完全不存在
//! - 所有写入同步完成后再通知订阅者（单写者）
//!
//! 与 UI 框架解耦，`auth::AuthContext` 通过订阅把状态桥接到信号。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use campus_shared::{Role, UserRecord};

use crate::web::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// 已认证身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserRecord,
    pub token: String,
}

impl Session {
    pub fn new(user: UserRecord, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    pub fn subject_id(&self) -> i64 {
        self.user.user_id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn display_name(&self) -> String {
        self.user.display_name()
    }
}

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// 尚未从持久化存储恢复
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(Session::role)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&SessionState)>;

pub struct SessionStore {
    storage: Box<dyn KeyValueStore>,
    state: RefCell<SessionState>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<u64>,
}

impl SessionStore {
    /// 创建处于 `Loading` 状态的存储，调用 `hydrate` 后才可用
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            state: RefCell::new(SessionState::Loading),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// 创建并立即从持久化存储恢复
    pub fn hydrated(storage: impl KeyValueStore + 'static) -> Rc<Self> {
        let store = Rc::new(Self::new(storage));
        store.hydrate();
        store
    }

    /// 从持久化存储恢复会话
    ///
    /// 两个槽位都存在且用户记录可解析时恢复为已认证；
    /// 否则视为未登录并清除两个槽位，避免残留的半条会话。
    pub fn hydrate(&self) {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let user = self.storage.get(USER_KEY);

        let restored = match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<UserRecord>(&user) {
                Ok(user) => Some(Session::new(user, token)),
                Err(e) => {
                    log_warn!("[Session] Discarding unreadable user record: {}", e);
                    None
                }
            },
            _ => None,
        };

        match restored {
            Some(session) => {
                log_info!("[Session] Restored session for {}", session.email());
                self.apply(SessionState::Authenticated(session));
            }
            None => {
                self.wipe_storage();
                self.apply(SessionState::Anonymous);
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn get_session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().session().map(|s| s.token.clone())
    }

    /// 替换当前会话并持久化两个槽位
    ///
    /// 存储写入失败只记录日志，内存中的会话仍然生效。
    pub fn set_session(&self, session: Session) {
        match serde_json::to_string(&session.user) {
            Ok(user_json) => {
                if let Err(e) = self
                    .storage
                    .set(TOKEN_KEY, &session.token)
                    .and_then(|_| self.storage.set(USER_KEY, &user_json))
                {
                    log_error!("[Session] Failed to persist session: {}", e);
                    self.wipe_storage();
                }
            }
            Err(e) => log_error!("[Session] Failed to encode user record: {}", e),
        }
        self.apply(SessionState::Authenticated(session));
    }

    /// 清除会话（登出或凭据失效）
    pub fn clear_session(&self) {
        self.wipe_storage();
        self.apply(SessionState::Anonymous);
    }

    /// 订阅状态变化，回调中可以重新读取存储
    pub fn subscribe(&self, callback: impl Fn(&SessionState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn wipe_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log_warn!("[Session] Failed to remove `{}`: {}", key, e);
            }
        }
    }

    fn apply(&self, next: SessionState) {
        *self.state.borrow_mut() = next.clone();
        // 先复制订阅者列表并释放借用，回调内可再次访问本存储
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in subscribers {
            callback(&next);
        }
    }
}
