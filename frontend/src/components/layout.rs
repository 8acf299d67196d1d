use campus_shared::Role;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::components::icons::{LogOut, MenuIcon, UserCircle};
use crate::components::notice::{Notice, Toast};
use crate::menu::{MenuItem, build_menu, key_for_route, route_for_key};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

fn role_badge(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "badge badge-primary",
        Some(Role::Lecturer) => "badge badge-success",
        Some(Role::Student) => "badge badge-warning",
        None => "badge badge-ghost",
    }
}

/// 已登录页面的外壳：顶栏 + 按角色生成的侧边菜单 + 通知
#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let state = auth.state();

    let notice = Notice::new();
    provide_context(notice);

    let role = Signal::derive(move || state.with(|s| s.role()));
    let welcome = move || {
        state.with(|s| {
            s.session()
                .map(|session| session.display_name())
                .unwrap_or_default()
        })
    };
    let active_key = Signal::derive(move || key_for_route(role.get(), router.current_route().get()));

    let on_logout = move |_| auth.logout();

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Toast notice=notice />

            <div class="navbar bg-base-100 shadow-xl px-4">
                <div class="flex-1 gap-2">
                    <span class="text-xl font-bold">"Course Management System"</span>
                    <span class=move || role_badge(role.get())>
                        {move || role.get().map(|r| r.as_str().to_lowercase()).unwrap_or_default()}
                    </span>
                </div>
                <div class="flex-none gap-2">
                    <span class="hidden md:inline text-sm text-base-content/70">
                        "Welcome, " {welcome}
                    </span>
                    <Link to=AppRoute::Profile class="btn btn-ghost btn-sm gap-2">
                        <UserCircle attr:class="h-4 w-4" /> "Profile"
                    </Link>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                        <LogOut attr:class="h-4 w-4" /> "Logout"
                    </button>
                </div>
            </div>

            <div class="flex flex-col md:flex-row gap-6 p-4 md:p-8 max-w-7xl mx-auto">
                <aside class="md:w-64 shrink-0">
                    <ul class="menu bg-base-100 rounded-box shadow w-full">
                        {move || {
                            let role = role.get();
                            build_menu(role)
                                .into_iter()
                                .map(|item| view! { <SideMenuEntry item=item role=role active_key=active_key /> })
                                .collect_view()
                        }}
                    </ul>
                </aside>
                <main class="flex-1 min-w-0 space-y-6">{children()}</main>
            </div>
        </div>
    }
}

/// 菜单项：分组展开显示子项，叶子项渲染为链接
#[component]
fn SideMenuEntry(
    item: MenuItem,
    role: Option<Role>,
    active_key: Signal<Option<&'static str>>,
) -> impl IntoView {
    if !item.is_group() {
        return view! { <MenuLink item=item role=role active_key=active_key /> }.into_any();
    }

    let children = item
        .children
        .iter()
        .map(|child| view! { <MenuLink item=*child role=role active_key=active_key /> })
        .collect_view();

    view! {
        <li>
            <details open>
                <summary>
                    <MenuIcon icon=item.icon class="h-4 w-4" />
                    {item.label}
                </summary>
                <ul>{children}</ul>
            </details>
        </li>
    }
    .into_any()
}

/// 菜单叶子项，当前路由对应的项高亮
#[component]
fn MenuLink(
    item: MenuItem,
    role: Option<Role>,
    active_key: Signal<Option<&'static str>>,
) -> impl IntoView {
    let router = use_router();
    let key = item.key;
    let Some(route) = route_for_key(role, key) else {
        log_warn!("[Menu] `{}` has no route for {:?}", key, role);
        return ().into_any();
    };
    let class = move || {
        if active_key.get() == Some(key) {
            "flex items-center gap-2 menu-active"
        } else {
            "flex items-center gap-2"
        }
    };

    view! {
        <li>
            <a
                href=route.to_path()
                class=class
                on:click=move |ev: leptos::ev::MouseEvent| {
                    ev.prevent_default();
                    router.navigate_route(route);
                }
            >
                <MenuIcon icon=item.icon class="h-4 w-4" />
                {item.label}
            </a>
        </li>
    }
    .into_any()
}
