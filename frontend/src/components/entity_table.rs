//! 通用实体表格
//!
//! 各管理页面只声明列与行操作，加载中 / 空列表 / 行渲染在这里统一处理。

use leptos::prelude::*;

/// 表格列：表头 + 单元格文本
pub struct Column<T> {
    pub header: &'static str,
    pub cell: fn(&T) -> String,
    /// 小屏幕上隐藏
    pub secondary: bool,
}

impl<T> Column<T> {
    pub fn new(header: &'static str, cell: fn(&T) -> String) -> Self {
        Self {
            header,
            cell,
            secondary: false,
        }
    }

    pub fn secondary(mut self) -> Self {
        self.secondary = true;
        self
    }

    fn class(&self) -> &'static str {
        if self.secondary {
            "hidden md:table-cell"
        } else {
            ""
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

/// 可选字段的单元格文本
pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn EntityTable<T, A, AV>(
    #[prop(into)] rows: Signal<Vec<T>>,
    #[prop(into)] loading: Signal<bool>,
    columns: Vec<Column<T>>,
    /// 行的唯一键；行内容变化时键也应变化，否则不会重新渲染
    row_key: fn(&T) -> String,
    /// 每行最后一列的操作按钮
    actions: A,
    #[prop(default = "No records found.")] empty_text: &'static str,
) -> impl IntoView
where
    T: Clone + Send + Sync + 'static,
    A: Fn(T) -> AV + Send + Clone + 'static,
    AV: IntoView + 'static,
{
    let span = (columns.len() + 1).to_string();
    let empty_span = span.clone();
    let is_empty = move || rows.with(Vec::is_empty);

    let headers = columns
        .iter()
        .map(|c| view! { <th class=c.class()>{c.header}</th> })
        .collect_view();

    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        {headers}
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <Show when=move || loading.get() && is_empty()>
                        <tr>
                            <td colspan=span.clone() class="text-center py-8 text-base-content/50">
                                <span class="loading loading-spinner loading-md"></span> " Loading..."
                            </td>
                        </tr>
                    </Show>
                    <Show when=move || !loading.get() && is_empty()>
                        <tr>
                            <td colspan=empty_span.clone() class="text-center py-8 text-base-content/50">
                                {empty_text}
                            </td>
                        </tr>
                    </Show>
                    <For
                        each=move || rows.get()
                        key=row_key
                        children=move |item| {
                            let cells = columns
                                .iter()
                                .map(|c| view! { <td class=c.class()>{(c.cell)(&item)}</td> })
                                .collect_view();
                            let actions = actions.clone();
                            view! {
                                <tr>
                                    {cells}
                                    <td class="text-right whitespace-nowrap">{actions(item)}</td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}
