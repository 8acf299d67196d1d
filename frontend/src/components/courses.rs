//! 讲师与学生的课程页面
//!
//! "All Courses" 列出可加入的课程，"My Courses" 列出已加入的课程。

use campus_shared::{Course, Enrollment, EnrollmentStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::admin::{PageHeader, confirm};
use crate::components::course_management::CourseManagement;
use crate::components::entity_table::{Column, EntityTable, or_dash};
use crate::components::notice::use_notice;
use crate::components::pending::PendingRow;
use crate::services::use_services;

fn course_columns() -> Vec<Column<Course>> {
    vec![
        Column::new("Code", |c: &Course| c.course_code.clone()),
        Column::new("Course Name", |c: &Course| c.course_name.clone()),
        Column::new("Credits", |c: &Course| or_dash(c.credits)),
        Column::new("Lecturer", |c: &Course| or_dash(c.lecturer_name.as_ref())).secondary(),
        Column::new("Department", |c: &Course| or_dash(c.department.as_ref())).secondary(),
        Column::new("Description", |c: &Course| or_dash(c.description.as_ref())).secondary(),
    ]
}

fn course_key(c: &Course) -> String {
    c.id.to_string()
}

// =========================================================
// Lecturer
// =========================================================

#[component]
pub fn LecturerAllCoursesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (loading, set_loading) = signal(true);
    let pending = PendingRow::new();

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.lecturer().available_courses().await {
                Ok(list) => set_courses.set(list),
                Err(e) => notice.error(format!("Failed to load courses: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let register = move |course: Course| {
        let Some(guard) = pending.begin(course.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.lecturer().register_to_course(course.id).await {
                Ok(()) => {
                    notice.success(format!("Registered to {}", course.course_name));
                    load();
                }
                Err(e) => notice.error(format!("Failed to register: {}", e.user_message())),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="All Courses" subtitle="Courses without an assigned lecturer." loading=loading on_refresh=load />
                <EntityTable
                    rows=courses
                    loading=loading
                    columns=course_columns()
                    row_key=course_key
                    actions=move |course: Course| {
                        view! {
                            <button
                                class="btn btn-primary btn-sm"
                                disabled=move || pending.is_busy()
                                on:click=move |_| register(course.clone())
                            >
                                "Teach this course"
                            </button>
                        }
                    }
                    empty_text="No courses available."
                />
            </div>
        </div>
    }
}

#[component]
pub fn LecturerMyCoursesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (loading, set_loading) = signal(true);
    let (selected, set_selected) = signal(Option::<Course>::None);
    let pending = PendingRow::new();

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.lecturer().my_courses().await {
                Ok(list) => set_courses.set(list),
                Err(e) => notice.error(format!("Failed to load courses: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let unregister = move |course: Course| {
        if !confirm(&format!("Stop teaching \"{}\"?", course.course_name)) {
            return;
        }
        let Some(guard) = pending.begin(course.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.lecturer().unregister_from_course(course.id).await {
                Ok(()) => {
                    notice.success("Successfully unregistered from course");
                    if selected.with_untracked(|s| s.as_ref().is_some_and(|s| s.id == course.id)) {
                        set_selected.set(None);
                    }
                    set_courses.update(|list| list.retain(|c| c.id != course.id));
                }
                Err(e) => notice.error(format!("Failed to unregister: {}", e.user_message())),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="My Courses" subtitle="Courses you are teaching." loading=loading on_refresh=load />
                <EntityTable
                    rows=courses
                    loading=loading
                    columns=course_columns()
                    row_key=course_key
                    actions=move |course: Course| {
                        let managed = course.clone();
                        view! {
                            <div class="flex justify-end gap-2">
                                <button class="btn btn-sm btn-outline" on:click=move |_| set_selected.set(Some(managed.clone()))>
                                    "Manage"
                                </button>
                                <button class="btn btn-sm btn-outline btn-error" disabled=move || pending.is_busy()
                                    on:click=move |_| unregister(course.clone())
                                >
                                    "Unregister"
                                </button>
                            </div>
                        }
                    }
                    empty_text="You are not teaching any courses yet."
                />
            </div>
        </div>

        {move || selected.get().map(|course| view! { <CourseManagement course=course /> })}
    }
}

// =========================================================
// Student
// =========================================================

#[component]
pub fn StudentAllCoursesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (courses, set_courses) = signal(Vec::<Course>::new());
    let (enrolled, set_enrolled) = signal(Vec::<i64>::new());
    let (loading, set_loading) = signal(true);
    let pending = PendingRow::new();

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let student = services.student();
            let (course_list, enrollments) =
                futures::join!(student.available_courses(), student.enrollments());
            match course_list {
                Ok(list) => set_courses.set(list),
                Err(e) => notice.error(format!("Failed to load courses: {}", e.user_message())),
            }
            if let Ok(list) = enrollments {
                set_enrolled.set(
                    list.iter()
                        .filter(|e| e.status == EnrollmentStatus::Enrolled)
                        .filter_map(Enrollment::course_id)
                        .collect(),
                );
            }
            set_loading.set(false);
        });
    };
    load();

    let enroll = move |course: Course| {
        let Some(guard) = pending.begin(course.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.student().enroll(course.id).await {
                Ok(_) => {
                    notice.success(format!("Enrolled in {}", course.course_name));
                    set_enrolled.update(|ids| ids.push(course.id));
                }
                Err(e) => notice.error(format!("Failed to enroll: {}", e.user_message())),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="All Courses" subtitle="Browse and enroll in courses." loading=loading on_refresh=load />
                <EntityTable
                    rows=courses
                    loading=loading
                    columns=course_columns()
                    row_key=course_key
                    actions=move |course: Course| {
                        let id = course.id;
                        let is_enrolled = move || enrolled.with(|ids| ids.contains(&id));
                        view! {
                            <Show
                                when=move || !is_enrolled()
                                fallback=|| view! { <span class="badge badge-success">"Enrolled"</span> }
                            >
                                {
                                    let course = course.clone();
                                    view! {
                                        <button
                                            class="btn btn-primary btn-sm"
                                            disabled=move || pending.is_busy()
                                            on:click=move |_| enroll(course.clone())
                                        >
                                            "Enroll"
                                        </button>
                                    }
                                }
                            </Show>
                        }
                    }
                    empty_text="No courses open for enrollment."
                />
            </div>
        </div>
    }
}

fn enrollment_course(e: &Enrollment) -> Option<&Course> {
    e.course.as_ref()
}

#[component]
pub fn StudentMyCoursesPage() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (enrollments, set_enrollments) = signal(Vec::<Enrollment>::new());
    let (loading, set_loading) = signal(true);
    let pending = PendingRow::new();

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.student().enrollments().await {
                Ok(list) => set_enrollments.set(list),
                Err(e) => notice.error(format!("Failed to load enrollments: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let drop_course = move |enrollment: Enrollment| {
        let Some(course_id) = enrollment.course_id() else {
            return;
        };
        let name = enrollment_course(&enrollment)
            .map(|c| c.course_name.clone())
            .unwrap_or_default();
        if !confirm(&format!("Drop \"{name}\"?")) {
            return;
        }
        let Some(guard) = pending.begin(course_id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.student().drop_course(course_id).await {
                Ok(()) => {
                    notice.success("Course dropped");
                    load();
                }
                Err(e) => notice.error(format!("Failed to drop course: {}", e.user_message())),
            }
        });
    };

    let columns = vec![
        Column::new("Code", |e: &Enrollment| {
            or_dash(enrollment_course(e).map(|c| c.course_code.clone()))
        }),
        Column::new("Course Name", |e: &Enrollment| {
            or_dash(enrollment_course(e).map(|c| c.course_name.clone()))
        }),
        Column::new("Credits", |e: &Enrollment| or_dash(enrollment_course(e).and_then(|c| c.credits))),
        Column::new("Status", |e: &Enrollment| format!("{:?}", e.status)),
        Column::new("Final Grade", |e: &Enrollment| or_dash(e.final_grade.as_ref())),
        Column::new("Enrolled On", |e: &Enrollment| or_dash(e.enrollment_date.as_ref())).secondary(),
    ];

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <PageHeader title="My Courses" subtitle="Your current and past enrollments." loading=loading on_refresh=load />
                <EntityTable
                    rows=enrollments
                    loading=loading
                    columns=columns
                    row_key=|e: &Enrollment| format!("{}:{:?}", e.id, e.status)
                    actions=move |enrollment: Enrollment| {
                        let can_drop = enrollment.status == EnrollmentStatus::Enrolled;
                        can_drop.then(|| view! {
                            <button class="btn btn-sm btn-outline btn-error" disabled=move || pending.is_busy()
                                on:click=move |_| drop_course(enrollment.clone())
                            >
                                "Drop"
                            </button>
                        })
                    }
                    empty_text="You are not enrolled in any courses."
                />
            </div>
        </div>
    }
}
