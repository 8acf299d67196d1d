//! 页面共享的服务上下文
//!
//! 服务内部持有 `Rc`，不能直接跨越信号边界，
//! 因此整体放进本地 `StoredValue`，组件只拿到一个可复制的句柄。

use std::rc::Rc;

use leptos::prelude::*;

use crate::activity::{ActivityLog, ActivityRecord};
use crate::api::{AdminService, DegreeService, LecturerService, ProfileService, StudentService};
use crate::management::AdminActions;

#[derive(Clone)]
pub struct AppServices {
    pub admin: AdminService,
    pub degrees: DegreeService,
    pub lecturer: LecturerService,
    pub student: StudentService,
    pub profile: ProfileService,
    pub activity: Rc<dyn ActivityLog>,
}

#[derive(Clone, Copy)]
pub struct Services {
    inner: StoredValue<AppServices, LocalStorage>,
    recent_activity: ReadSignal<Vec<ActivityRecord>>,
}

impl Services {
    /// 创建上下文，并把活动日志的订阅桥接到信号
    pub fn new(services: AppServices) -> Self {
        let (recent_activity, set_recent_activity) = signal(services.activity.recent());
        services.activity.subscribe(Rc::new(move |recent: &[ActivityRecord]| {
            set_recent_activity.set(recent.to_vec());
        }));

        Self {
            inner: StoredValue::new_local(services),
            recent_activity,
        }
    }

    pub fn admin(&self) -> AdminService {
        self.inner.with_value(|s| s.admin.clone())
    }

    pub fn degrees(&self) -> DegreeService {
        self.inner.with_value(|s| s.degrees.clone())
    }

    pub fn lecturer(&self) -> LecturerService {
        self.inner.with_value(|s| s.lecturer.clone())
    }

    pub fn student(&self) -> StudentService {
        self.inner.with_value(|s| s.student.clone())
    }

    pub fn profile(&self) -> ProfileService {
        self.inner.with_value(|s| s.profile.clone())
    }

    /// 会写入活动日志的管理员操作
    pub fn actions(&self) -> AdminActions {
        self.inner.with_value(|s| {
            AdminActions::new(s.admin.clone(), s.degrees.clone(), s.activity.clone())
        })
    }

    /// 最近的活动（最新在前）
    pub fn recent_activity(&self) -> ReadSignal<Vec<ActivityRecord>> {
        self.recent_activity
    }
}

pub fn use_services() -> Services {
    use_context::<Services>().expect("Services should be provided")
}
