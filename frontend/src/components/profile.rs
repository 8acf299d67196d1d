use campus_shared::{ProfileUpdate, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{PasswordForm, use_auth};
use crate::components::icons::UserCircle;
use crate::components::notice::use_notice;
use crate::components::register::TextField;
use crate::error::{AppError, ErrorKind};
use crate::services::use_services;

fn optional(value: String) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// 账户信息；学生和讲师可以编辑个人资料、修改密码
#[component]
pub fn ProfilePage() -> impl IntoView {
    let state = use_auth().state();

    let field = move |f: fn(&crate::session::Session) -> String| {
        move || state.with(|s| s.session().map(f).unwrap_or_default())
    };
    let role = Memo::new(move |_| state.with(|s| s.role()));

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center gap-4">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <UserCircle attr:class="h-10 w-10" />
                    </div>
                    <div>
                        <h3 class="card-title">{field(|s| s.display_name())}</h3>
                        <p class="text-base-content/70">{field(|s| s.email().to_string())}</p>
                        <span class="badge badge-outline mt-1">{field(|s| s.role().to_string())}</span>
                    </div>
                </div>
            </div>
        </div>

        {move || match role.get() {
            Some(role @ (Role::Student | Role::Lecturer)) => view! {
                <ProfileForm role=role />
                <ChangePasswordForm role=role />
            }
            .into_any(),
            _ => ().into_any(),
        }}
    }
}

#[derive(Clone, Copy)]
struct ProfileFormState {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    phone: RwSignal<String>,
    address: RwSignal<String>,
    program: RwSignal<String>,
    department: RwSignal<String>,
    office_location: RwSignal<String>,
    // 只读
    account_id: RwSignal<String>,
}

impl ProfileFormState {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            address: RwSignal::new(String::new()),
            program: RwSignal::new(String::new()),
            department: RwSignal::new(String::new()),
            office_location: RwSignal::new(String::new()),
            account_id: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, profile: campus_shared::Profile) {
        self.first_name.set(profile.first_name);
        self.last_name.set(profile.last_name);
        self.phone.set(profile.phone.unwrap_or_default());
        self.address.set(profile.address.unwrap_or_default());
        self.program.set(profile.program.unwrap_or_default());
        self.department.set(profile.department.unwrap_or_default());
        self.office_location
            .set(profile.office_location.unwrap_or_default());
        self.account_id.set(
            profile
                .student_id
                .or(profile.employee_id)
                .unwrap_or_default(),
        );
    }

    fn to_update(self) -> ProfileUpdate {
        ProfileUpdate {
            first_name: self.first_name.get_untracked().trim().to_string(),
            last_name: self.last_name.get_untracked().trim().to_string(),
            phone: optional(self.phone.get_untracked()),
            address: optional(self.address.get_untracked()),
            program: optional(self.program.get_untracked()),
            department: optional(self.department.get_untracked()),
            office_location: optional(self.office_location.get_untracked()),
        }
    }
}

#[component]
fn ProfileForm(role: Role) -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let form = ProfileFormState::new();
    let (loading, set_loading) = signal(true);
    let (saving, set_saving) = signal(false);

    spawn_local(async move {
        match services.profile().load(role).await {
            Ok(profile) => form.fill(profile),
            Err(e) => notice.error(format!("Failed to load profile: {}", e.user_message())),
        }
        set_loading.set(false);
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let update = form.to_update();
        if update.first_name.is_empty() || update.last_name.is_empty() {
            notice.error("First and last name are required");
            return;
        }

        set_saving.set(true);
        spawn_local(async move {
            match services.profile().update(role, update).await {
                Ok(profile) => {
                    form.fill(profile);
                    notice.success("Profile updated successfully");
                }
                Err(e) => notice.error(format!("Failed to update profile: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    let input = move |id: &'static str, label: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label for=id class="label"><span class="label-text">{label}</span></label>
                <input id=id type="text"
                    class="input input-bordered w-full"
                    disabled=move || loading.get()
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </div>
        }
    };

    let account_label = match role {
        Role::Lecturer => "Employee ID",
        _ => "Student ID",
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body space-y-4" on:submit=on_submit>
                <h3 class="card-title">"Personal Information"</h3>
                <div class="form-control">
                    <label class="label"><span class="label-text">{account_label}</span></label>
                    <input type="text" class="input input-bordered w-full" disabled
                        prop:value=move || form.account_id.get()
                    />
                </div>
                <div class="grid grid-cols-2 gap-4">
                    {input("first_name", "First Name", form.first_name)}
                    {input("last_name", "Last Name", form.last_name)}
                </div>
                <div class="grid grid-cols-2 gap-4">
                    {input("phone", "Phone Number", form.phone)}
                    {input("address", "Address", form.address)}
                </div>
                {match role {
                    Role::Lecturer => view! {
                        <div class="grid grid-cols-2 gap-4">
                            {input("department", "Department", form.department)}
                            {input("office_location", "Office Location", form.office_location)}
                        </div>
                    }
                    .into_any(),
                    _ => input("program", "Program", form.program).into_any(),
                }}
                <div class="card-actions justify-end">
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get() || loading.get()>
                        {move || if saving.get() {
                            view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                        } else {
                            "Save Changes".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}

#[component]
fn ChangePasswordForm(role: Role) -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let current_password = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let (errors, set_errors) = signal(Option::<AppError>::None);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        set_errors.set(None);

        let form = PasswordForm {
            current_password: current_password.get_untracked(),
            new_password: new_password.get_untracked(),
            confirm_password: confirm_password.get_untracked(),
        };
        let change = match form.validate() {
            Ok(change) => change,
            Err(e) => {
                set_errors.set(Some(e));
                return;
            }
        };

        set_saving.set(true);
        spawn_local(async move {
            match services.profile().change_password(role, change).await {
                Ok(()) => {
                    notice.success("Password changed successfully");
                    current_password.set(String::new());
                    new_password.set(String::new());
                    confirm_password.set(String::new());
                }
                Err(e) if e.kind() == ErrorKind::Validation => set_errors.set(Some(e)),
                Err(e) => notice.error(format!("Failed to change password: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body space-y-4" on:submit=on_submit>
                <h3 class="card-title">"Change Password"</h3>
                <TextField id="current_password" label="Current Password" value=current_password errors=errors input_type="password" />
                <div class="grid grid-cols-2 gap-4">
                    <TextField id="new_password" label="New Password" value=new_password errors=errors input_type="password" />
                    <TextField id="confirm_password" label="Confirm New Password" value=confirm_password errors=errors input_type="password" />
                </div>
                <div class="card-actions justify-end">
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                        {move || if saving.get() {
                            view! { <span class="loading loading-spinner"></span> "Changing..." }.into_any()
                        } else {
                            "Change Password".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
