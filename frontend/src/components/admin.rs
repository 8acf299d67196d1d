//! 管理员页面：学生、讲师、学位、课程
//!
//! 变更统一走 `AdminActions`，成功时写入活动日志；失败只以通知展示。
//! 行操作进行中时，本页其他行操作按钮处于禁用状态。

use campus_shared::{Course, CourseRequest, Degree, DegreeRequest, Lecturer, Student};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::entity_table::{Column, EntityTable, or_dash};
use crate::components::icons::{Pencil, Plus, RefreshCw, Trash2};
use crate::components::notice::use_notice;
use crate::components::pending::PendingRow;
use crate::services::use_services;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_navigate};

fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

fn status_label(active: Option<bool>) -> String {
    if active.unwrap_or(true) {
        "Active".to_string()
    } else {
        "Inactive".to_string()
    }
}

fn optional(value: String) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// 浏览器确认框
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// 页面标题栏 + 刷新按钮
#[component]
pub(crate) fn PageHeader(
    title: &'static str,
    subtitle: &'static str,
    loading: ReadSignal<bool>,
    on_refresh: impl Fn() + Send + 'static,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="flex items-center justify-between p-6 pb-2">
            <div>
                <h3 class="card-title">{title}</h3>
                <p class="text-base-content/70 text-sm">{subtitle}</p>
            </div>
            <div class="flex items-center gap-2">
                {children.map(|c| c())}
                <button on:click=move |_| on_refresh() disabled=move || loading.get() class="btn btn-ghost btn-circle">
                    <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                </button>
            </div>
        </div>
    }
}

/// 启用 / 停用按钮；本行请求进行中时显示加载状态
#[component]
fn StatusButton(
    id: i64,
    active: bool,
    pending: PendingRow,
    on_toggle: impl Fn() + Send + 'static,
) -> impl IntoView {
    view! {
        <button
            class=if active { "btn btn-sm btn-outline btn-warning" } else { "btn btn-sm btn-outline btn-success" }
            disabled=move || pending.is_busy()
            on:click=move |_| on_toggle()
        >
            <Show when=move || pending.is(id)>
                <span class="loading loading-spinner loading-xs"></span>
            </Show>
            {if active { "Deactivate" } else { "Activate" }}
        </button>
    }
}

// =========================================================
// Students
// =========================================================

#[component]
pub fn StudentsPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let pending = PendingRow::new();

    let (students, set_students) = signal(Vec::<Student>::new());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.admin().students().await {
                Ok(list) => set_students.set(list),
                Err(e) => notice.error(format!("Failed to load students: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let toggle = move |student: Student| {
        let Some(guard) = pending.begin(student.id) else {
            return;
        };
        let active = !student.active.unwrap_or(true);
        spawn_local(async move {
            let _guard = guard;
            match services.actions().set_student_active(&student, active).await {
                Ok(()) => {
                    notice.success(if active {
                        "Student activated successfully"
                    } else {
                        "Student deactivated successfully"
                    });
                    set_students.update(|list| {
                        if let Some(s) = list.iter_mut().find(|s| s.id == student.id) {
                            s.active = Some(active);
                        }
                    });
                }
                Err(e) => notice.error(format!("Failed to update student status: {}", e.user_message())),
            }
        });
    };

    let columns = vec![
        Column::new("Student ID", |s: &Student| or_dash(s.student_id.as_ref())),
        Column::new("Name", |s: &Student| full_name(&s.first_name, &s.last_name)),
        Column::new("Email", |s: &Student| s.email.clone()),
        Column::new("Phone", |s: &Student| or_dash(s.phone.as_ref())).secondary(),
        Column::new("Program", |s: &Student| or_dash(s.program.as_ref())).secondary(),
        Column::new("Status", |s: &Student| status_label(s.active)),
    ];

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="Students" subtitle="Manage student accounts." loading=loading on_refresh=load />
                <EntityTable
                    rows=students
                    loading=loading
                    columns=columns
                    row_key=|s: &Student| format!("{}:{:?}", s.id, s.active)
                    actions=move |student: Student| view! {
                        <StatusButton
                            id=student.id
                            active=student.active.unwrap_or(true)
                            pending=pending
                            on_toggle=move || toggle(student.clone())
                        />
                    }
                    empty_text="No students registered."
                />
            </div>
        </div>
    }
}

// =========================================================
// Lecturers
// =========================================================

#[component]
pub fn LecturersPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let pending = PendingRow::new();

    let (lecturers, set_lecturers) = signal(Vec::<Lecturer>::new());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.admin().lecturers().await {
                Ok(list) => set_lecturers.set(list),
                Err(e) => notice.error(format!("Failed to load lecturers: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let toggle = move |lecturer: Lecturer| {
        let Some(guard) = pending.begin(lecturer.id) else {
            return;
        };
        let active = !lecturer.active.unwrap_or(true);
        spawn_local(async move {
            let _guard = guard;
            match services.actions().set_lecturer_active(&lecturer, active).await {
                Ok(()) => {
                    notice.success(if active {
                        "Lecturer activated successfully"
                    } else {
                        "Lecturer deactivated successfully"
                    });
                    set_lecturers.update(|list| {
                        if let Some(l) = list.iter_mut().find(|l| l.id == lecturer.id) {
                            l.active = Some(active);
                        }
                    });
                }
                Err(e) => notice.error(format!("Failed to update lecturer status: {}", e.user_message())),
            }
        });
    };

    let columns = vec![
        Column::new("Name", |l: &Lecturer| full_name(&l.first_name, &l.last_name)),
        Column::new("Email", |l: &Lecturer| l.email.clone()),
        Column::new("Department", |l: &Lecturer| or_dash(l.department.as_ref())),
        Column::new("Phone", |l: &Lecturer| or_dash(l.phone.as_ref())).secondary(),
        Column::new("Office", |l: &Lecturer| or_dash(l.office_location.as_ref())).secondary(),
        Column::new("Status", |l: &Lecturer| status_label(l.active)),
    ];

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="Lecturers" subtitle="Manage lecturer accounts." loading=loading on_refresh=load />
                <EntityTable
                    rows=lecturers
                    loading=loading
                    columns=columns
                    row_key=|l: &Lecturer| format!("{}:{:?}", l.id, l.active)
                    actions=move |lecturer: Lecturer| view! {
                        <StatusButton
                            id=lecturer.id
                            active=lecturer.active.unwrap_or(true)
                            pending=pending
                            on_toggle=move || toggle(lecturer.clone())
                        />
                    }
                    empty_text="No lecturers registered."
                />
            </div>
        </div>
    }
}

// =========================================================
// Degrees
// =========================================================

/// 学位表单，新建与编辑共用
#[derive(Clone, Copy)]
struct DegreeFormState {
    name: RwSignal<String>,
    faculty: RwSignal<String>,
    description: RwSignal<String>,
    duration: RwSignal<u32>,
}

impl DegreeFormState {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            faculty: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            duration: RwSignal::new(3),
        }
    }

    fn fill(&self, request: DegreeRequest) {
        self.name.set(request.name);
        self.faculty.set(request.faculty);
        self.description.set(request.description.unwrap_or_default());
        self.duration.set(request.duration_years.unwrap_or(3));
    }

    fn to_request(self) -> DegreeRequest {
        DegreeRequest {
            name: self.name.get_untracked().trim().to_string(),
            faculty: self.faculty.get_untracked().trim().to_string(),
            description: optional(self.description.get_untracked()),
            duration_years: Some(self.duration.get_untracked()),
        }
    }
}

#[component]
pub fn DegreesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let pending = PendingRow::new();

    let (degrees, set_degrees) = signal(Vec::<Degree>::new());
    let (loading, set_loading) = signal(true);

    let form = DegreeFormState::new();
    let editing = RwSignal::new(Option::<Degree>::None);
    let (saving, set_saving) = signal(false);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.degrees().list().await {
                Ok(list) => set_degrees.set(list),
                Err(e) => notice.error(format!("Failed to load degrees: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let reset = move || {
        editing.set(None);
        form.fill(DegreeRequest::default());
    };

    let edit = move |degree: Degree| {
        form.fill(DegreeRequest::from(&degree));
        editing.set(Some(degree));
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let request = form.to_request();
        if request.name.is_empty() || request.faculty.is_empty() {
            notice.error("Degree name and faculty are required");
            return;
        }
        let target = editing.get_untracked().map(|d| d.id);

        set_saving.set(true);
        spawn_local(async move {
            let actions = services.actions();
            let result = match target {
                Some(id) => actions.update_degree(id, request).await,
                None => actions.create_degree(request).await,
            };
            match result {
                Ok(_) => {
                    notice.success(if target.is_some() {
                        "Degree updated successfully"
                    } else {
                        "Degree created successfully"
                    });
                    reset();
                    load();
                }
                Err(e) => notice.error(format!("Failed to save degree: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    let delete = move |degree: Degree| {
        if !confirm(&format!("Delete degree \"{}\"?", degree.name)) {
            return;
        }
        let Some(guard) = pending.begin(degree.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.actions().delete_degree(&degree).await {
                Ok(()) => {
                    notice.success("Degree deleted successfully");
                    if editing.with_untracked(|d| d.as_ref().map(|d| d.id)) == Some(degree.id) {
                        reset();
                    }
                    set_degrees.update(|list| list.retain(|d| d.id != degree.id));
                }
                Err(e) => notice.error(format!("Failed to delete degree: {}", e.user_message())),
            }
        });
    };

    let is_editing = move || editing.with(Option::is_some);

    let columns = vec![
        Column::new("Degree Name", |d: &Degree| d.name.clone()),
        Column::new("Faculty", |d: &Degree| d.faculty.clone()),
        Column::new("Duration (Years)", |d: &Degree| or_dash(d.duration_years)),
        Column::new("Description", |d: &Degree| or_dash(d.description.as_ref())).secondary(),
    ];

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">
                    {move || if is_editing() { "Edit Degree" } else { "Add Degree" }}
                </h3>
                <div class="grid grid-cols-1 md:grid-cols-4 gap-4">
                    <input type="text" required placeholder="Degree name"
                        class="input input-bordered w-full"
                        prop:value=move || form.name.get()
                        on:input=move |ev| form.name.set(event_target_value(&ev))
                    />
                    <input type="text" required placeholder="Faculty"
                        class="input input-bordered w-full"
                        prop:value=move || form.faculty.get()
                        on:input=move |ev| form.faculty.set(event_target_value(&ev))
                    />
                    <input type="text" placeholder="Description"
                        class="input input-bordered w-full"
                        prop:value=move || form.description.get()
                        on:input=move |ev| form.description.set(event_target_value(&ev))
                    />
                    <input type="number" min="1" max="10" required
                        class="input input-bordered w-full"
                        prop:value=move || form.duration.get()
                        on:input=move |ev| {
                            if let Ok(val) = event_target_value(&ev).parse::<u32>() {
                                form.duration.set(val);
                            }
                        }
                    />
                </div>
                <div class="card-actions justify-end">
                    <Show when=is_editing>
                        <button type="button" class="btn btn-ghost" on:click=move |_| reset()>"Cancel"</button>
                    </Show>
                    <button type="submit" class="btn btn-primary gap-2" disabled=move || saving.get()>
                        {move || if saving.get() {
                            view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                        } else if is_editing() {
                            view! { <Pencil attr:class="h-4 w-4" /> "Update Degree" }.into_any()
                        } else {
                            view! { <Plus attr:class="h-4 w-4" /> "Add Degree" }.into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="Degrees" subtitle="Degree programs offered by the university." loading=loading on_refresh=load />
                <EntityTable
                    rows=degrees
                    loading=loading
                    columns=columns
                    row_key=|d: &Degree| format!("{}:{}:{}:{:?}", d.id, d.name, d.faculty, d.duration_years)
                    actions=move |degree: Degree| {
                        let for_edit = degree.clone();
                        view! {
                            <button class="btn btn-ghost btn-sm" disabled=move || pending.is_busy()
                                on:click=move |_| edit(for_edit.clone())
                            >
                                <Pencil attr:class="h-4 w-4" />
                            </button>
                            <button class="btn btn-ghost btn-sm text-error" disabled=move || pending.is_busy()
                                on:click=move |_| delete(degree.clone())
                            >
                                <Trash2 attr:class="h-4 w-4" />
                            </button>
                        }
                    }
                    empty_text="No degrees yet."
                />
            </div>
        </div>
    }
}

// =========================================================
// Courses
// =========================================================

/// 课程表单，新建页与列表页的编辑面板共用
#[derive(Clone, Copy)]
struct CourseFormState {
    code: RwSignal<String>,
    title: RwSignal<String>,
    description: RwSignal<String>,
    credits: RwSignal<u32>,
    capacity: RwSignal<u32>,
    degree_id: RwSignal<Option<i64>>,
    department: RwSignal<String>,
}

impl CourseFormState {
    fn new() -> Self {
        Self {
            code: RwSignal::new(String::new()),
            title: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            credits: RwSignal::new(3),
            capacity: RwSignal::new(30),
            degree_id: RwSignal::new(None),
            department: RwSignal::new(String::new()),
        }
    }

    fn fill(&self, request: CourseRequest) {
        self.code.set(request.course_code);
        self.title.set(request.course_name);
        self.description.set(request.description.unwrap_or_default());
        self.credits.set(request.credits);
        self.capacity.set(request.capacity.unwrap_or(30));
        self.degree_id.set(request.degree_id);
        self.department.set(request.department.unwrap_or_default());
    }

    /// 讲师分配由单独的操作维护，这里原样带回
    fn to_request(self, lecturer_id: Option<i64>) -> CourseRequest {
        CourseRequest {
            course_code: self.code.get_untracked().trim().to_string(),
            course_name: self.title.get_untracked().trim().to_string(),
            description: optional(self.description.get_untracked()),
            credits: self.credits.get_untracked(),
            capacity: Some(self.capacity.get_untracked()),
            lecturer_id,
            degree_id: self.degree_id.get_untracked(),
            department: optional(self.department.get_untracked()),
        }
    }
}

#[component]
fn NumberField(id: &'static str, label: &'static str, value: RwSignal<u32>) -> impl IntoView {
    view! {
        <div class="form-control">
            <label for=id class="label"><span class="label-text">{label}</span></label>
            <input id=id type="number" min="1" required
                class="input input-bordered w-full"
                prop:value=move || value.get()
                on:input=move |ev| {
                    if let Ok(val) = event_target_value(&ev).parse::<u32>() {
                        value.set(val);
                    }
                }
            />
        </div>
    }
}

#[component]
fn CourseFields(form: CourseFormState, degrees: ReadSignal<Vec<Degree>>) -> impl IntoView {
    view! {
        <div class="grid grid-cols-2 gap-4">
            <div class="form-control">
                <label for="course_code" class="label"><span class="label-text">"Course Code"</span></label>
                <input id="course_code" type="text" required placeholder="CS101"
                    class="input input-bordered w-full"
                    prop:value=move || form.code.get()
                    on:input=move |ev| form.code.set(event_target_value(&ev))
                />
            </div>
            <div class="form-control">
                <label for="course_name" class="label"><span class="label-text">"Course Name"</span></label>
                <input id="course_name" type="text" required placeholder="Introduction to Programming"
                    class="input input-bordered w-full"
                    prop:value=move || form.title.get()
                    on:input=move |ev| form.title.set(event_target_value(&ev))
                />
            </div>
        </div>
        <div class="form-control">
            <label for="description" class="label"><span class="label-text">"Description"</span></label>
            <textarea id="description" class="textarea textarea-bordered w-full"
                prop:value=move || form.description.get()
                on:input=move |ev| form.description.set(event_target_value(&ev))
            ></textarea>
        </div>
        <div class="grid grid-cols-2 gap-4">
            <NumberField id="credits" label="Credits" value=form.credits />
            <NumberField id="capacity" label="Capacity" value=form.capacity />
        </div>
        <div class="grid grid-cols-2 gap-4">
            <div class="form-control">
                <label class="label"><span class="label-text">"Degree"</span></label>
                <select class="select select-bordered w-full"
                    on:change=move |ev| form.degree_id.set(event_target_value(&ev).parse::<i64>().ok())
                >
                    <option value="" selected=move || form.degree_id.get().is_none()>"None"</option>
                    <For
                        each=move || degrees.get()
                        key=|d| d.id
                        children=move |d: Degree| {
                            let id = d.id;
                            view! {
                                <option value=id.to_string() selected=move || form.degree_id.get() == Some(id)>
                                    {d.name.clone()}
                                </option>
                            }
                        }
                    />
                </select>
            </div>
            <div class="form-control">
                <label for="department" class="label"><span class="label-text">"Department"</span></label>
                <input id="department" type="text"
                    class="input input-bordered w-full"
                    prop:value=move || form.department.get()
                    on:input=move |ev| form.department.set(event_target_value(&ev))
                />
            </div>
        </div>
    }
}

#[component]
pub fn CoursesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let pending = PendingRow::new();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (lecturers, set_lecturers) = signal(Vec::<Lecturer>::new());
    let (degrees, set_degrees) = signal(Vec::<Degree>::new());
    let (loading, set_loading) = signal(true);

    let form = CourseFormState::new();
    let editing = RwSignal::new(Option::<Course>::None);
    let (saving, set_saving) = signal(false);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let admin = services.admin();
            let degree_service = services.degrees();
            let (course_list, lecturer_list, degree_list) =
                futures::join!(admin.courses(), admin.lecturers(), degree_service.list());
            match course_list {
                Ok(list) => set_courses.set(list),
                Err(e) => notice.error(format!("Failed to load courses: {}", e.user_message())),
            }
            // 讲师与学位只用于下拉框
            if let Ok(list) = lecturer_list {
                set_lecturers.set(list);
            }
            if let Ok(list) = degree_list {
                set_degrees.set(list);
            }
            set_loading.set(false);
        });
    };
    load();

    let edit = move |course: Course| {
        form.fill(CourseRequest::from(&course));
        editing.set(Some(course));
    };

    let on_update = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let Some(course) = editing.get_untracked() else {
            return;
        };
        let request = form.to_request(course.lecturer_id);
        if request.course_code.is_empty() || request.course_name.is_empty() {
            notice.error("Course code and name are required");
            return;
        }

        set_saving.set(true);
        spawn_local(async move {
            match services.actions().update_course(course.id, request).await {
                Ok(_) => {
                    notice.success("Course updated successfully");
                    editing.set(None);
                    load();
                }
                Err(e) => notice.error(format!("Failed to update course: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    let delete = move |course: Course| {
        if !confirm(&format!("Delete course \"{}\"?", course.course_name)) {
            return;
        }
        let Some(guard) = pending.begin(course.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.actions().delete_course(&course).await {
                Ok(()) => {
                    notice.success("Course deleted successfully");
                    if editing.with_untracked(|c| c.as_ref().map(|c| c.id)) == Some(course.id) {
                        editing.set(None);
                    }
                    set_courses.update(|list| list.retain(|c| c.id != course.id));
                }
                Err(e) => notice.error(format!("Failed to delete course: {}", e.user_message())),
            }
        });
    };

    let assign = move |course: Course, lecturer_id: i64| {
        let Some(guard) = pending.begin(course.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.actions().assign_lecturer(&course, lecturer_id).await {
                Ok(_) => {
                    notice.success("Lecturer assigned successfully");
                    load();
                }
                Err(e) => notice.error(format!("Failed to assign lecturer: {}", e.user_message())),
            }
        });
    };

    let editing_title = move || {
        editing.with(|c| {
            c.as_ref()
                .map(|c| format!("Edit Course: {}", c.course_code))
                .unwrap_or_default()
        })
    };

    let columns = vec![
        Column::new("Code", |c: &Course| c.course_code.clone()),
        Column::new("Course Name", |c: &Course| c.course_name.clone()),
        Column::new("Credits", |c: &Course| or_dash(c.credits)),
        Column::new("Lecturer", |c: &Course| or_dash(c.lecturer_name.as_ref())),
        Column::new("Enrolled", |c: &Course| {
            match (c.enrolled_count, c.capacity) {
                (Some(n), Some(cap)) => format!("{n}/{cap}"),
                (n, _) => or_dash(n),
            }
        })
        .secondary(),
    ];

    view! {
        <Show when=move || editing.with(Option::is_some)>
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body space-y-4" on:submit=on_update>
                    <h3 class="card-title">{editing_title}</h3>
                    <CourseFields form=form degrees=degrees />
                    <div class="card-actions justify-end">
                        <button type="button" class="btn btn-ghost" on:click=move |_| editing.set(None)>"Cancel"</button>
                        <button type="submit" disabled=move || saving.get() class="btn btn-primary">
                            {move || if saving.get() {
                                view! { <span class="loading loading-spinner"></span> "Saving..." }.into_any()
                            } else {
                                "Update Course".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </Show>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="Courses" subtitle="All courses in the catalogue." loading=loading on_refresh=load>
                    <Link to=AppRoute::AdminAddCourse class="btn btn-primary btn-sm gap-2">
                        <Plus attr:class="h-4 w-4" /> "Add Course"
                    </Link>
                </PageHeader>
                <EntityTable
                    rows=courses
                    loading=loading
                    columns=columns
                    row_key=|c: &Course| {
                        format!("{}:{:?}:{}:{}:{:?}", c.id, c.lecturer_id, c.course_code, c.course_name, c.credits)
                    }
                    actions=move |course: Course| {
                        let current = course.lecturer_id;
                        let for_assign = course.clone();
                        let for_edit = course.clone();
                        view! {
                            <div class="flex items-center justify-end gap-2">
                                <select
                                    class="select select-bordered select-sm"
                                    disabled=move || pending.is_busy()
                                    on:change=move |ev| {
                                        if let Ok(id) = event_target_value(&ev).parse::<i64>() {
                                            assign(for_assign.clone(), id);
                                        }
                                    }
                                >
                                    <option value="" selected=current.is_none()>"Assign lecturer"</option>
                                    <For
                                        each=move || lecturers.get()
                                        key=|l| l.id
                                        children=move |l: Lecturer| view! {
                                            <option value=l.id.to_string() selected=current == Some(l.id)>
                                                {full_name(&l.first_name, &l.last_name)}
                                            </option>
                                        }
                                    />
                                </select>
                                <button class="btn btn-ghost btn-sm" disabled=move || pending.is_busy()
                                    on:click=move |_| edit(for_edit.clone())
                                >
                                    <Pencil attr:class="h-4 w-4" />
                                </button>
                                <button class="btn btn-ghost btn-sm text-error" disabled=move || pending.is_busy()
                                    on:click=move |_| delete(course.clone())
                                >
                                    <Trash2 attr:class="h-4 w-4" />
                                </button>
                            </div>
                        }
                    }
                    empty_text="No courses yet."
                />
            </div>
        </div>
    }
}

/// 新建课程
#[component]
pub fn AddCoursePage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let navigate = use_navigate();

    let form = CourseFormState::new();
    let (degrees, set_degrees) = signal(Vec::<Degree>::new());
    let (saving, set_saving) = signal(false);

    spawn_local(async move {
        match services.degrees().list().await {
            Ok(list) => set_degrees.set(list),
            Err(e) => notice.error(format!("Failed to load degrees: {}", e.user_message())),
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let request = form.to_request(None);
        if request.course_code.is_empty() || request.course_name.is_empty() {
            notice.error("Course code and name are required");
            return;
        }

        set_saving.set(true);
        spawn_local(async move {
            match services.actions().create_course(request).await {
                Ok(_) => {
                    notice.success("Course created successfully");
                    navigate(AppRoute::AdminCourses);
                }
                Err(e) => notice.error(format!("Failed to create course: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body space-y-4" on:submit=on_submit>
                <h3 class="card-title">"Add Course"</h3>
                <CourseFields form=form degrees=degrees />
                <div class="card-actions justify-end">
                    <Link to=AppRoute::AdminCourses class="btn btn-ghost">"Cancel"</Link>
                    <button type="submit" disabled=move || saving.get() class="btn btn-primary">
                        {move || if saving.get() {
                            view! { <span class="loading loading-spinner"></span> "Creating..." }.into_any()
                        } else {
                            "Create Course".into_any()
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
