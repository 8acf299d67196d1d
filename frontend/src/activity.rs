//! 管理员活动日志
//!
//! 本地持久化的有界列表（最新在前，最多保留 50 条，界面展示 10 条），
//! 只用于仪表盘展示，不是审计系统。
//!
//! 写入是尽力而为的：存储失败只记录日志，绝不影响触发它的管理操作。
//! 页面通过注入的 `ActivityLog` 记录活动。

use std::cell::RefCell;
use std::rc::Rc;

use campus_shared::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::web::KeyValueStore;

pub const ACTIVITY_KEY: &str = "adminActivities";
pub const MAX_RETAINED: usize = 50;
pub const MAX_DISPLAYED: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Course,
    Degree,
    Student,
    Lecturer,
    System,
}

impl ActivityCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Course => "Course",
            Self::Degree => "Degree",
            Self::Student => "Student",
            Self::Lecturer => "Lecturer",
            Self::System => "System",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// 创建时的毫秒时间戳，同一日志内严格递增
    pub id: Timestamp,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: ActivityCategory,
    /// 本地时区的可读时间，例如 `Oct 19, 2026 14:05`
    pub timestamp: String,
}

/// 管理员操作，决定活动的标题、描述与分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction<'a> {
    CourseCreated { code: &'a str, name: &'a str },
    CourseUpdated { code: &'a str, name: &'a str },
    CourseDeleted { code: &'a str, name: &'a str },
    DegreeCreated { name: &'a str, faculty: &'a str },
    DegreeUpdated { name: &'a str, faculty: &'a str },
    DegreeDeleted { name: &'a str, faculty: &'a str },
    StudentStatus { name: &'a str, active: bool },
    LecturerStatus { name: &'a str, active: bool },
}

impl AdminAction<'_> {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CourseCreated { .. } => "Course Created",
            Self::CourseUpdated { .. } => "Course Updated",
            Self::CourseDeleted { .. } => "Course Deleted",
            Self::DegreeCreated { .. } => "Degree Created",
            Self::DegreeUpdated { .. } => "Degree Updated",
            Self::DegreeDeleted { .. } => "Degree Deleted",
            Self::StudentStatus { active: true, .. } => "Student Activated",
            Self::StudentStatus { active: false, .. } => "Student Deactivated",
            Self::LecturerStatus { active: true, .. } => "Lecturer Activated",
            Self::LecturerStatus { active: false, .. } => "Lecturer Deactivated",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::CourseCreated { code, name } => format!("New course \"{name}\" ({code}) was created"),
            Self::CourseUpdated { code, name } => format!("Course \"{name}\" ({code}) was updated"),
            Self::CourseDeleted { code, name } => format!("Course \"{name}\" ({code}) was deleted"),
            Self::DegreeCreated { name, faculty } => {
                format!("New degree \"{name}\" in {faculty} was created")
            }
            Self::DegreeUpdated { name, faculty } => {
                format!("Degree \"{name}\" in {faculty} was updated")
            }
            Self::DegreeDeleted { name, faculty } => {
                format!("Degree \"{name}\" from {faculty} was deleted")
            }
            Self::StudentStatus { name, active } | Self::LecturerStatus { name, active } => {
                let verb = if *active { "activated" } else { "deactivated" };
                format!("{name} was {verb}")
            }
        }
    }

    pub fn category(&self) -> ActivityCategory {
        match self {
            Self::CourseCreated { .. } | Self::CourseUpdated { .. } | Self::CourseDeleted { .. } => {
                ActivityCategory::Course
            }
            Self::DegreeCreated { .. } | Self::DegreeUpdated { .. } | Self::DegreeDeleted { .. } => {
                ActivityCategory::Degree
            }
            Self::StudentStatus { .. } => ActivityCategory::Student,
            Self::LecturerStatus { .. } => ActivityCategory::Lecturer,
        }
    }
}

// =========================================================
// 时钟
// =========================================================

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(chrono::Utc::now())
    }
}

/// 测试用的固定时钟
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FixedClock(std::cell::Cell<i64>);

#[cfg(test)]
impl FixedClock {
    pub fn at(ms: i64) -> Self {
        Self(std::cell::Cell::new(ms))
    }

    pub fn advance(&self, ms: i64) {
        self.0.set(self.0.get() + ms);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.0.get())
    }
}

#[cfg(test)]
impl Clock for Rc<FixedClock> {
    fn now(&self) -> Timestamp {
        self.as_ref().now()
    }
}

// =========================================================
// 日志接口
// =========================================================

pub type ActivityListener = Rc<dyn Fn(&[ActivityRecord])>;

pub trait ActivityLog {
    /// 记录一条活动；不会失败
    fn record(&self, title: &str, description: &str, category: ActivityCategory);

    /// 最近的活动（最多 `MAX_DISPLAYED` 条，最新在前）
    fn recent(&self) -> Vec<ActivityRecord>;

    /// 每次记录后收到最近的活动列表
    fn subscribe(&self, listener: ActivityListener);

    fn record_action(&self, action: AdminAction<'_>) {
        self.record(action.title(), &action.description(), action.category());
    }
}

pub struct StoredActivityLog {
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    listeners: RefCell<Vec<ActivityListener>>,
}

impl StoredActivityLog {
    pub fn new(storage: impl KeyValueStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            clock: Box::new(clock),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// 读取完整列表，缺失或损坏时视为空
    fn load(&self) -> Vec<ActivityRecord> {
        let Some(raw) = self.storage.get(ACTIVITY_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log_warn!("[Activity] Ignoring unreadable activity list: {}", e);
            Vec::new()
        })
    }

    fn save(&self, records: &[ActivityRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records).map_err(|e| StorageError::Encode {
            key: ACTIVITY_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.storage.set(ACTIVITY_KEY, &json)
    }

    fn notify(&self, recent: &[ActivityRecord]) {
        let listeners: Vec<ActivityListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(recent);
        }
    }
}

impl ActivityLog for StoredActivityLog {
    fn record(&self, title: &str, description: &str, category: ActivityCategory) {
        let mut records = self.load();

        let now = self.clock.now();
        let id = match records.first() {
            Some(head) if head.id >= now => head.id.next(),
            _ => now,
        };

        records.insert(
            0,
            ActivityRecord {
                id,
                title: title.to_string(),
                description: description.to_string(),
                category,
                timestamp: now.display(),
            },
        );
        records.truncate(MAX_RETAINED);

        if let Err(e) = self.save(&records) {
            log_error!("[Activity] Failed to persist activity `{}`: {}", title, e);
        }

        records.truncate(MAX_DISPLAYED);
        self.notify(&records);
    }

    fn recent(&self) -> Vec<ActivityRecord> {
        let mut records = self.load();
        records.truncate(MAX_DISPLAYED);
        records
    }

    fn subscribe(&self, listener: ActivityListener) {
        self.listeners.borrow_mut().push(listener);
    }
}
