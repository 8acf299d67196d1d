//! 页面通知（右上角 toast，3 秒后自动消失）

use leptos::prelude::*;

#[derive(Clone, Copy)]
pub struct Notice {
    /// 消息内容, 是否出错
    message: ReadSignal<Option<(String, bool)>>,
    set_message: WriteSignal<Option<(String, bool)>>,
}

impl Notice {
    pub fn new() -> Self {
        let (message, set_message) = signal(Option::<(String, bool)>::None);

        // 3秒后清除通知
        Effect::new(move |_| {
            if message.get().is_some() {
                set_timeout(
                    move || set_message.set(None),
                    std::time::Duration::from_secs(3),
                );
            }
        });

        Self {
            message,
            set_message,
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.set_message.set(Some((text.into(), false)));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.set_message.set(Some((text.into(), true)));
    }
}

impl Default for Notice {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_notice() -> Notice {
    use_context::<Notice>().expect("Notice should be provided")
}

#[component]
pub fn Toast(notice: Notice) -> impl IntoView {
    let message = notice.message;

    view! {
        <Show when=move || message.with(Option::is_some)>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let is_err = message.with(|m| m.as_ref().is_some_and(|(_, e)| *e));
                    if is_err {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    }
                }>
                    <span>{move || message.get().map(|(text, _)| text).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}
