//! 行操作的进行中标记
//!
//! 同一页面同一时间只允许一个行操作；进行中的请求结束前，
//! 其他点击直接忽略，按钮处于禁用状态。

use leptos::prelude::*;

/// 当前正在处理的行 id
#[derive(Debug, Clone, Copy)]
pub struct PendingRow(RwSignal<Option<i64>>);

impl PendingRow {
    pub fn new() -> Self {
        Self(RwSignal::new(None))
    }

    /// 开始处理某一行；已有操作进行中时返回 `None`
    ///
    /// 返回的守卫被丢弃时（请求结束或任务被取消）清除标记。
    pub fn begin(&self, id: i64) -> Option<PendingGuard> {
        if self.0.get_untracked().is_some() {
            return None;
        }
        self.0.set(Some(id));
        Some(PendingGuard(self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.with(Option::is_some)
    }

    pub fn is(&self, id: i64) -> bool {
        self.0.get() == Some(id)
    }
}

impl Default for PendingRow {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub struct PendingGuard(RwSignal<Option<i64>>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        // 页面卸载后信号已释放，忽略即可
        let _ = self.0.try_set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, DegreeService};
    use crate::config::AppConfig;
    use crate::session::SessionStore;
    use crate::web::{MemoryStorage, MockTransport};
    use campus_shared::protocol::HttpMethod;
    use std::rc::Rc;

    #[test]
    fn second_action_waits_for_the_first() {
        let pending = PendingRow::new();
        let guard = pending.begin(3).unwrap();
        assert!(pending.is_busy());
        assert!(pending.is(3));
        assert!(pending.begin(3).is_none());
        assert!(pending.begin(4).is_none());

        drop(guard);
        assert!(!pending.is_busy());
        assert!(pending.begin(4).is_some());
    }

    #[tokio::test]
    async fn double_click_sends_one_request() {
        let transport = Rc::new(MockTransport::new());
        transport.mock_raw(
            HttpMethod::Delete,
            "http://api.test/degrees/3",
            200,
            "Degree deleted",
        );
        let api = ApiClient::new(
            &AppConfig::with_base_url("http://api.test"),
            transport.clone(),
            SessionStore::hydrated(MemoryStorage::new()),
        );
        let degrees = DegreeService::new(api);
        let pending = PendingRow::new();

        let click = |id: i64| {
            let degrees = degrees.clone();
            pending.begin(id).map(|guard| async move {
                let _guard = guard;
                degrees.delete(id).await
            })
        };

        let first = click(3);
        let second = click(3);
        assert!(second.is_none());
        first.unwrap().await.unwrap();

        assert_eq!(transport.request_count(), 1);
        assert!(!pending.is_busy());
        assert!(click(3).is_some());
    }
}
