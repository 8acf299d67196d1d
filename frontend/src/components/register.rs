//! 注册页面
//!
//! 注册成功不会建立会话，提示后回到登录页。

use campus_shared::Role;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{RegisterForm, use_auth};
use crate::components::icons::ShieldCheck;
use crate::components::login::ErrorBanner;
use crate::error::{AppError, ErrorKind};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

/// 表单状态，字段使用 `RwSignal` 以便在闭包间复制
#[derive(Clone, Copy)]
struct RegisterFormState {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
    confirm_password: RwSignal<String>,
    role: RwSignal<Option<Role>>,
    phone: RwSignal<String>,
    student_id: RwSignal<String>,
    program: RwSignal<String>,
    department: RwSignal<String>,
    office_location: RwSignal<String>,
}

impl RegisterFormState {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
            confirm_password: RwSignal::new(String::new()),
            role: RwSignal::new(Some(Role::Student)),
            phone: RwSignal::new(String::new()),
            student_id: RwSignal::new(String::new()),
            program: RwSignal::new(String::new()),
            department: RwSignal::new(String::new()),
            office_location: RwSignal::new(String::new()),
        }
    }

    fn to_form(self) -> RegisterForm {
        RegisterForm {
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            email: self.email.get_untracked(),
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
            role: self.role.get_untracked(),
            phone: self.phone.get_untracked(),
            student_id: self.student_id.get_untracked(),
            program: self.program.get_untracked(),
            department: self.department.get_untracked(),
            office_location: self.office_location.get_untracked(),
        }
    }
}

/// 文本输入框 + 字段错误
#[component]
pub(crate) fn TextField(
    id: &'static str,
    label: &'static str,
    value: RwSignal<String>,
    errors: ReadSignal<Option<AppError>>,
    #[prop(default = "text")] input_type: &'static str,
) -> impl IntoView {
    let field_error = move || {
        errors.with(|e| {
            e.as_ref()
                .and_then(|e| e.field_message(id))
                .map(str::to_string)
        })
    };

    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=input_type
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
                class=move || if field_error().is_some() { "input input-bordered input-error" } else { "input input-bordered" }
            />
            <Show when=move || field_error().is_some()>
                <label class="label">
                    <span class="label-text-alt text-error">{move || field_error().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();
    let state = RegisterFormState::new();

    let (is_submitting, set_is_submitting) = signal(false);
    let (errors, set_errors) = signal(Option::<AppError>::None);
    let (banner, set_banner) = signal(Option::<String>::None);
    let (success, set_success) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        set_errors.set(None);
        set_banner.set(None);

        let form = state.to_form();
        if let Err(e) = form.validate() {
            set_errors.set(Some(e));
            return;
        }

        set_is_submitting.set(true);
        let service = auth.service();
        spawn_local(async move {
            match service.register(&form).await {
                Ok(message) => {
                    set_success.set(Some(message));
                    set_timeout(
                        move || navigate(AppRoute::Login),
                        std::time::Duration::from_secs(2),
                    );
                }
                Err(e) if e.kind() == ErrorKind::Validation => set_errors.set(Some(e)),
                Err(e) => set_banner.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    let is_role = move |role: Role| state.role.get() == Some(role);
    let role_error = move || {
        errors.with(|e| {
            e.as_ref()
                .and_then(|e| e.field_message("role"))
                .map(str::to_string)
        })
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-2xl">
                <div class="flex flex-col items-center gap-2 mb-4">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <ShieldCheck attr:class="h-8 w-8" />
                    </div>
                    <h1 class="text-3xl font-bold">"Create an account"</h1>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorBanner message=banner set_message=set_banner />
                        <Show when=move || success.with(Option::is_some)>
                            <div role="alert" class="alert alert-success text-sm py-2">
                                <span>{move || success.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="grid grid-cols-2 gap-4">
                            <TextField id="first_name" label="First Name" value=state.first_name errors=errors />
                            <TextField id="last_name" label="Last Name" value=state.last_name errors=errors />
                        </div>
                        <TextField id="email" label="Email" value=state.email errors=errors input_type="email" />
                        <div class="grid grid-cols-2 gap-4">
                            <TextField id="password" label="Password" value=state.password errors=errors input_type="password" />
                            <TextField id="confirm_password" label="Confirm Password" value=state.confirm_password errors=errors input_type="password" />
                        </div>

                        <div class="form-control">
                            <label class="label" for="role">
                                <span class="label-text">"Role"</span>
                            </label>
                            <select
                                id="role"
                                class="select select-bordered w-full"
                                on:change=move |ev| state.role.set(Role::parse(&event_target_value(&ev)))
                            >
                                <option value="STUDENT" selected=move || is_role(Role::Student)>"Student"</option>
                                <option value="LECTURER" selected=move || is_role(Role::Lecturer)>"Lecturer"</option>
                            </select>
                            <Show when=move || role_error().is_some()>
                                <label class="label">
                                    <span class="label-text-alt text-error">{move || role_error().unwrap_or_default()}</span>
                                </label>
                            </Show>
                        </div>

                        <TextField id="phone" label="Phone (optional)" value=state.phone errors=errors />

                        <Show when=move || is_role(Role::Student)>
                            <div class="grid grid-cols-2 gap-4 bg-base-200 p-4 rounded-lg">
                                <TextField id="student_id" label="Student ID" value=state.student_id errors=errors />
                                <TextField id="program" label="Program" value=state.program errors=errors />
                            </div>
                        </Show>
                        <Show when=move || is_role(Role::Lecturer)>
                            <div class="grid grid-cols-2 gap-4 bg-base-200 p-4 rounded-lg">
                                <TextField id="department" label="Department" value=state.department errors=errors />
                                <TextField id="office_location" label="Office Location" value=state.office_location errors=errors />
                            </div>
                        </Show>

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get() || success.with(Option::is_some)>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Registering..." }.into_any()
                                } else {
                                    "Register".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            "Already have an account? "
                            <Link to=AppRoute::Login class="link link-primary">"Login"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
