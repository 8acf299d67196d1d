use campus_shared::grade::{grade_points, record_letter};
use campus_shared::{GradeRecord, Role};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::activity::ActivityRecord;
use crate::auth::use_auth;
use crate::components::entity_table::{Column, EntityTable, or_dash};
use crate::components::icons::RefreshCw;
use crate::components::notice::{Notice, use_notice};
use crate::overview::{
    AdminStats, LecturerStats, SourceFailure, StudentStats, admin_overview, lecturer_overview,
    student_overview,
};
use crate::services::use_services;

/// 多个数据源失败时合并为一条通知
fn report_failures(notice: Notice, failures: &[SourceFailure]) {
    if failures.is_empty() {
        return;
    }
    let text = failures
        .iter()
        .map(SourceFailure::notification)
        .collect::<Vec<_>>()
        .join("; ");
    notice.error(text);
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let state = use_auth().state();
    let role = move || state.with(|s| s.role());

    move || match role() {
        Some(Role::Admin) => view! { <AdminDashboard /> }.into_any(),
        Some(Role::Lecturer) => view! { <LecturerDashboard /> }.into_any(),
        Some(Role::Student) => view! { <StudentDashboard /> }.into_any(),
        None => ().into_any(),
    }
}

#[component]
fn StatCard(
    title: &'static str,
    value: Signal<String>,
    #[prop(optional)] desc: &'static str,
    #[prop(default = "text-primary")] tone: &'static str,
) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{title}</div>
            <div class=format!("stat-value {tone}")>{move || value.get()}</div>
            <div class="stat-desc">{desc}</div>
        </div>
    }
}

#[component]
fn DashboardHeader(
    title: &'static str,
    loading: ReadSignal<bool>,
    on_refresh: impl Fn() + Send + 'static,
) -> impl IntoView {
    view! {
        <div class="flex items-center justify-between">
            <h2 class="text-2xl font-bold">{title}</h2>
            <button on:click=move |_| on_refresh() disabled=move || loading.get() class="btn btn-ghost btn-circle">
                <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
            </button>
        </div>
    }
}

// =========================================================
// Admin
// =========================================================

#[component]
fn AdminDashboard() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (stats, set_stats) = signal(AdminStats::default());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let result = admin_overview(
                &services.admin(),
                &services.degrees(),
                stats.get_untracked(),
            )
            .await;
            report_failures(notice, &result.failures);
            set_stats.set(result.stats);
            set_loading.set(false);
        });
    };
    load();

    let card = move |f: fn(&AdminStats) -> String| Signal::derive(move || stats.with(f));
    let recent = services.recent_activity();

    view! {
        <DashboardHeader title="Admin Dashboard" loading=loading on_refresh=load />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <StatCard title="Students" value=card(|s| s.students.to_string()) />
            <StatCard title="Lecturers" value=card(|s| s.lecturers.to_string()) tone="text-secondary" />
            <StatCard title="Courses" value=card(|s| s.courses.to_string()) tone="text-accent" />
            <StatCard title="Degrees" value=card(|s| s.degrees.to_string()) tone="text-info" />
            <StatCard title="Enrollments" value=card(|s| s.enrollments.to_string()) tone="text-success" />
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Recent Activities"</h3>
                <Show
                    when=move || recent.with(|r| !r.is_empty())
                    fallback=|| view! { <p class="text-base-content/50">"No recent activities."</p> }
                >
                    <ul class="space-y-3">
                        <For
                            each=move || recent.get()
                            key=|r: &ActivityRecord| r.id
                            children=|record: ActivityRecord| view! {
                                <li class="flex items-start gap-3">
                                    <span class="badge badge-outline">{record.category.label()}</span>
                                    <div class="flex-1">
                                        <div class="font-semibold">{record.title}</div>
                                        <div class="text-sm text-base-content/70">{record.description}</div>
                                    </div>
                                    <span class="text-xs text-base-content/50 whitespace-nowrap">{record.timestamp}</span>
                                </li>
                            }
                        />
                    </ul>
                </Show>
            </div>
        </div>
    }
}

// =========================================================
// Lecturer
// =========================================================

#[component]
fn LecturerDashboard() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (stats, set_stats) = signal(LecturerStats::default());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let result = lecturer_overview(&services.lecturer(), stats.get_untracked()).await;
            report_failures(notice, &result.failures);
            set_stats.set(result.stats);
            set_loading.set(false);
        });
    };
    load();

    let card = move |f: fn(&LecturerStats) -> String| Signal::derive(move || stats.with(f));

    view! {
        <DashboardHeader title="Lecturer Dashboard" loading=loading on_refresh=load />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <StatCard title="My Courses" value=card(|s| s.courses.to_string()) />
            <StatCard title="Students" value=card(|s| s.students.to_string()) tone="text-secondary" desc="Across all courses" />
            <StatCard title="Assignments" value=card(|s| s.assignments.to_string()) tone="text-accent" />
            <StatCard title="To Grade" value=card(|s| s.ungraded.to_string()) tone="text-warning" desc="Ungraded submissions" />
        </div>
    }
}

// =========================================================
// Student
// =========================================================

#[component]
fn StudentDashboard() -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let (stats, set_stats) = signal(StudentStats::default());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let result = student_overview(&services.student(), stats.get_untracked()).await;
            report_failures(notice, &result.failures);
            set_stats.set(result.stats);
            set_loading.set(false);
        });
    };
    load();

    let card = move |f: fn(&StudentStats) -> String| Signal::derive(move || stats.with(f));

    view! {
        <DashboardHeader title="Student Dashboard" loading=loading on_refresh=load />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <StatCard title="Enrolled Courses" value=card(|s| s.enrolled.to_string()) />
            <StatCard title="Pending Assignments" value=card(|s| s.pending_assignments.to_string()) tone="text-warning" />
            <StatCard title="GPA" value=card(|s| format!("{:.2}", s.gpa)) tone="text-success" />
            <StatCard title="Completed" value=card(|s| s.completed.to_string()) tone="text-secondary" desc="Courses with a final grade" />
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Grades"</h3>
                <EntityTable
                    rows=Signal::derive(move || stats.with(|s| s.grades.clone()))
                    loading=loading
                    columns=grade_columns()
                    row_key=grade_key
                    actions=|_: GradeRecord| ()
                    empty_text="No grades yet."
                />
            </div>
        </div>
    }
}

fn grade_columns() -> Vec<Column<GradeRecord>> {
    vec![
        Column::new("Code", |g: &GradeRecord| or_dash(g.course_code.as_ref())),
        Column::new("Course", |g: &GradeRecord| or_dash(g.course_name.as_ref())),
        Column::new("Credits", |g: &GradeRecord| or_dash(g.credits)).secondary(),
        Column::new("Percentage", |g: &GradeRecord| {
            or_dash(g.percentage.map(|p| format!("{p:.1}%")))
        }),
        Column::new("Letter Grade", |g: &GradeRecord| {
            record_letter(g).unwrap_or("In Progress").to_string()
        }),
        Column::new("Grade Points", |g: &GradeRecord| {
            or_dash(record_letter(g).and_then(grade_points).map(|p| format!("{p:.1}")))
        })
        .secondary(),
    ]
}

fn grade_key(g: &GradeRecord) -> String {
    format!(
        "{:?}:{:?}:{:?}",
        g.course_id,
        record_letter(g),
        g.percentage
    )
}
