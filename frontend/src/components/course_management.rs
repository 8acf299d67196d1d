//! 讲师的单门课程管理：学生名单与最终成绩、作业、提交评分

use campus_shared::grade::GRADE_SCALE;
use campus_shared::{Assignment, AssignmentRequest, Course, Student, Submission};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::admin::confirm;
use crate::components::entity_table::{Column, EntityTable, or_dash};
use crate::components::icons::{Plus, Trash2};
use crate::components::notice::use_notice;
use crate::components::pending::PendingRow;
use crate::services::use_services;

#[component]
pub fn CourseManagement(course: Course) -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let course_id = course.id;

    let (students, set_students) = signal(Vec::<Student>::new());
    let (assignments, set_assignments) = signal(Vec::<Assignment>::new());
    let (loading, set_loading) = signal(true);
    let (selected_assignment, set_selected_assignment) = signal(Option::<Assignment>::None);
    // 学生行与作业行的 id 空间不同，各用一个标记
    let grading = PendingRow::new();
    let deleting = PendingRow::new();

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            let lecturer = services.lecturer();
            let (student_list, assignment_list) = futures::join!(
                lecturer.course_students(course_id),
                lecturer.course_assignments(course_id),
            );
            match student_list {
                Ok(list) => set_students.set(list),
                Err(e) => notice.error(format!("Failed to load students: {}", e.user_message())),
            }
            match assignment_list {
                Ok(list) => set_assignments.set(list),
                Err(e) => notice.error(format!("Failed to load assignments: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let set_final_grade = move |student: Student, grade: String| {
        let Some(guard) = grading.begin(student.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services
                .lecturer()
                .set_final_grade(course_id, student.id, grade, None)
                .await
            {
                Ok(()) => notice.success("Grade updated successfully"),
                Err(e) => notice.error(format!("Failed to update grade: {}", e.user_message())),
            }
        });
    };

    let delete_assignment = move |assignment: Assignment| {
        if !confirm(&format!("Delete assignment \"{}\"?", assignment.title)) {
            return;
        }
        let Some(guard) = deleting.begin(assignment.id) else {
            return;
        };
        spawn_local(async move {
            let _guard = guard;
            match services.lecturer().delete_assignment(assignment.id).await {
                Ok(()) => {
                    notice.success("Assignment deleted");
                    if selected_assignment
                        .with_untracked(|a| a.as_ref().is_some_and(|a| a.id == assignment.id))
                    {
                        set_selected_assignment.set(None);
                    }
                    set_assignments.update(|list| list.retain(|a| a.id != assignment.id));
                }
                Err(e) => notice.error(format!("Failed to delete assignment: {}", e.user_message())),
            }
        });
    };

    let student_columns = vec![
        Column::new("Student ID", |s: &Student| or_dash(s.student_id.as_ref())),
        Column::new("Name", |s: &Student| format!("{} {}", s.first_name, s.last_name)),
        Column::new("Email", |s: &Student| s.email.clone()).secondary(),
    ];
    let assignment_columns = vec![
        Column::new("Title", |a: &Assignment| a.title.clone()),
        Column::new("Due", |a: &Assignment| or_dash(a.due_date.as_ref())),
        Column::new("Max Points", |a: &Assignment| or_dash(a.max_points)),
    ];

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">
                    {course.course_code.clone()} " · " {course.course_name.clone()}
                </h3>

                <h4 class="font-bold mt-4">"Enrolled Students"</h4>
                <EntityTable
                    rows=students
                    loading=loading
                    columns=student_columns
                    row_key=|s: &Student| s.id.to_string()
                    actions=move |student: Student| {
                        let grade = RwSignal::new(String::from("A"));
                        let student_id = student.id;
                        view! {
                            <div class="join">
                                <select
                                    class="select select-bordered select-sm join-item"
                                    on:change=move |ev| grade.set(event_target_value(&ev))
                                >
                                    {GRADE_SCALE
                                        .iter()
                                        .map(|(letter, _)| view! { <option value=*letter>{*letter}</option> })
                                        .collect_view()}
                                </select>
                                <button
                                    class="btn btn-sm btn-outline join-item"
                                    disabled=move || grading.is_busy()
                                    on:click=move |_| set_final_grade(student.clone(), grade.get_untracked())
                                >
                                    <Show when=move || grading.is(student_id)>
                                        <span class="loading loading-spinner loading-xs"></span>
                                    </Show>
                                    "Set Final Grade"
                                </button>
                            </div>
                        }
                    }
                    empty_text="No students enrolled yet."
                />

                <h4 class="font-bold mt-6">"Assignments"</h4>
                <NewAssignmentForm course_id=course_id on_created=load />
                <EntityTable
                    rows=assignments
                    loading=loading
                    columns=assignment_columns
                    row_key=|a: &Assignment| a.id.to_string()
                    actions=move |assignment: Assignment| {
                        let for_review = assignment.clone();
                        view! {
                            <div class="flex justify-end gap-2">
                                <button class="btn btn-sm btn-outline" on:click=move |_| set_selected_assignment.set(Some(for_review.clone()))>
                                    "Submissions"
                                </button>
                                <button class="btn btn-ghost btn-sm text-error" disabled=move || deleting.is_busy()
                                    on:click=move |_| delete_assignment(assignment.clone())
                                >
                                    <Trash2 attr:class="h-4 w-4" />
                                </button>
                            </div>
                        }
                    }
                    empty_text="No assignments yet."
                />

                {move || selected_assignment.get().map(|assignment| view! { <Submissions assignment=assignment /> })}
            </div>
        </div>
    }
}

#[component]
fn NewAssignmentForm(course_id: i64, on_created: impl Fn() + Send + Copy + 'static) -> impl IntoView {
    let services = use_services();
    let notice = use_notice();

    let title = RwSignal::new(String::new());
    let due_date = RwSignal::new(String::new());
    let max_points = RwSignal::new(100u32);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let request = AssignmentRequest {
            course_id,
            title: title.get_untracked().trim().to_string(),
            description: None,
            due_date: Some(due_date.get_untracked()).filter(|d| !d.is_empty()),
            max_points: max_points.get_untracked(),
        };
        if request.title.is_empty() {
            notice.error("Assignment title is required");
            return;
        }

        set_saving.set(true);
        spawn_local(async move {
            match services.lecturer().create_assignment(request).await {
                Ok(()) => {
                    notice.success("Assignment created");
                    title.set(String::new());
                    due_date.set(String::new());
                    on_created();
                }
                Err(e) => notice.error(format!("Failed to create assignment: {}", e.user_message())),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col md:flex-row gap-2" on:submit=on_submit>
            <input type="text" required placeholder="Assignment title"
                class="input input-bordered input-sm flex-1"
                prop:value=move || title.get()
                on:input=move |ev| title.set(event_target_value(&ev))
            />
            <input type="date"
                class="input input-bordered input-sm"
                prop:value=move || due_date.get()
                on:input=move |ev| due_date.set(event_target_value(&ev))
            />
            <input type="number" min="1" required
                class="input input-bordered input-sm w-24"
                prop:value=move || max_points.get()
                on:input=move |ev| {
                    if let Ok(val) = event_target_value(&ev).parse::<u32>() {
                        max_points.set(val);
                    }
                }
            />
            <button type="submit" class="btn btn-primary btn-sm gap-2" disabled=move || saving.get()>
                <Plus attr:class="h-4 w-4" /> "Add"
            </button>
        </form>
    }
}

#[component]
fn Submissions(assignment: Assignment) -> impl IntoView {
    let services = use_services();
    let notice = use_notice();
    let assignment_id = assignment.id;

    let (submissions, set_submissions) = signal(Vec::<Submission>::new());
    let (loading, set_loading) = signal(true);

    let load = move || {
        set_loading.set(true);
        spawn_local(async move {
            match services.lecturer().submissions(assignment_id).await {
                Ok(list) => set_submissions.set(list),
                Err(e) => notice.error(format!("Failed to load submissions: {}", e.user_message())),
            }
            set_loading.set(false);
        });
    };
    load();

    let grade = move |submission: Submission, points: f64, feedback: String| {
        let feedback = Some(feedback.trim().to_string()).filter(|f| !f.is_empty());
        spawn_local(async move {
            match services
                .lecturer()
                .grade_submission(submission.id, points, feedback)
                .await
            {
                Ok(()) => {
                    notice.success("Submission graded");
                    load();
                }
                Err(e) => notice.error(format!("Failed to grade submission: {}", e.user_message())),
            }
        });
    };

    let columns = vec![
        Column::new("Student", |s: &Submission| or_dash(s.student_name.as_ref())),
        Column::new("Submitted", |s: &Submission| or_dash(s.submitted_at.as_ref())),
        Column::new("File", |s: &Submission| or_dash(s.file_name.as_ref())).secondary(),
        Column::new("Points", |s: &Submission| or_dash(s.points_earned.or(s.grade))),
    ];

    view! {
        <h4 class="font-bold mt-6">"Submissions · " {assignment.title.clone()}</h4>
        <EntityTable
            rows=submissions
            loading=loading
            columns=columns
            row_key=|s: &Submission| format!("{}:{}", s.id, s.is_graded())
            actions=move |submission: Submission| {
                let points = RwSignal::new(submission.points_earned.unwrap_or_default());
                let feedback = RwSignal::new(submission.feedback.clone().unwrap_or_default());
                view! {
                    <div class="join">
                        <input type="number" min="0" step="0.5"
                            class="input input-bordered input-sm join-item w-20"
                            prop:value=move || points.get()
                            on:input=move |ev| {
                                if let Ok(val) = event_target_value(&ev).parse::<f64>() {
                                    points.set(val);
                                }
                            }
                        />
                        <input type="text" placeholder="Feedback"
                            class="input input-bordered input-sm join-item"
                            prop:value=move || feedback.get()
                            on:input=move |ev| feedback.set(event_target_value(&ev))
                        />
                        <button
                            class="btn btn-sm btn-primary join-item"
                            on:click=move |_| grade(submission.clone(), points.get_untracked(), feedback.get_untracked())
                        >
                            "Grade"
                        </button>
                    </div>
                }
            }
            empty_text="No submissions yet."
        />
    }
}
