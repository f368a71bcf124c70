use std::sync::Arc;

use guided_core::model::{Hint, Problem, ProblemId, Step};
use guided_core::time::fixed_clock;
use guided_core::walker::{ProgressIntent, WalkError};
use services::{AppServices, InMemoryApi, NewUser, ProblemPage, ProgressSyncError};
use storage::repository::Storage;

fn problem(id: u64, step_count: usize) -> Problem {
    let steps = (1..=step_count)
        .map(|i| Step::new(format!("step {i}")))
        .collect();
    Problem::new(
        ProblemId::new(id),
        format!("Problem {id}"),
        "algebra",
        3,
        "description",
        "solution",
        steps,
        vec![Hint::new("first hint"), Hint::new("second hint")],
    )
    .unwrap()
}

async fn logged_in_app(api: &InMemoryApi) -> AppServices {
    let storage = Storage::in_memory();
    let app = AppServices::new(Arc::new(api.clone()), &storage, fixed_clock());
    app.session()
        .register(&NewUser {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();
    app.session().login("ada", "hunter2").await.unwrap();
    app
}

#[tokio::test]
async fn catalog_lists_and_opens_problems() {
    let api = InMemoryApi::new();
    api.add_problem(problem(1, 3));
    api.add_problem(problem(2, 1));
    let app = logged_in_app(&api).await;

    let count = app.catalog().refresh(ProblemPage::default()).await.unwrap();
    assert_eq!(count, 2);

    let opened = app.catalog().open_problem(ProblemId::new(1)).await.unwrap();
    assert_eq!(opened.steps().len(), 3);
    assert_eq!(opened.first_hint().unwrap().content(), "first hint");

    let state = app.catalog().state().await;
    assert_eq!(state.problems.len(), 2);
    assert_eq!(state.current_problem.unwrap().id(), ProblemId::new(1));
}

#[tokio::test]
async fn three_step_walkthrough_completes() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    // Fresh user: no record yet.
    assert_eq!(progress.refresh().await.unwrap(), 0);
    let fresh = progress.record_for(p.id()).await;
    assert_eq!(fresh.current_step, 0);
    assert!(!fresh.completed);

    let r1 = progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    assert_eq!(r1.current_step, 1);
    assert!(!r1.completed);

    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    let r3 = progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    assert_eq!(r3.current_step, 3);
    assert!(r3.completed);

    // A fourth advance is an illegal transition, not a silent no-op.
    let err = progress.apply(&p, ProgressIntent::Advance).await.unwrap_err();
    assert!(matches!(
        err,
        ProgressSyncError::Walk(WalkError::AlreadyComplete)
    ));
}

#[tokio::test]
async fn persisted_record_round_trips_through_refresh() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    progress
        .apply(&p, ProgressIntent::RevealHint)
        .await
        .unwrap();
    let written = progress.record_for(p.id()).await;

    // Drop local state and re-fetch: no silent field loss.
    assert_eq!(progress.refresh().await.unwrap(), 1);
    let fetched = progress.record_for(p.id()).await;
    assert_eq!(fetched, written);
    assert_eq!(fetched.current_step, 1);
    assert_eq!(fetched.hints_used, 1);
}

#[tokio::test]
async fn two_hint_reveals_only_bump_the_counter() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    progress
        .apply(&p, ProgressIntent::RevealHint)
        .await
        .unwrap();
    let record = progress
        .apply(&p, ProgressIntent::RevealHint)
        .await
        .unwrap();

    assert_eq!(record.hints_used, 2);
    assert_eq!(record.current_step, 0);
    assert!(!record.completed);
}

#[tokio::test]
async fn reset_keeps_hint_counter() {
    let api = InMemoryApi::new();
    let p = problem(1, 2);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    progress
        .apply(&p, ProgressIntent::RevealHint)
        .await
        .unwrap();
    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    progress.apply(&p, ProgressIntent::Advance).await.unwrap();

    let record = progress.apply(&p, ProgressIntent::Reset).await.unwrap();
    assert_eq!(record.current_step, 0);
    assert!(!record.completed);
    assert_eq!(record.hints_used, 1);
}

#[tokio::test]
async fn retreat_reopens_a_completed_problem() {
    let api = InMemoryApi::new();
    let p = problem(1, 2);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    let record = progress.apply(&p, ProgressIntent::Retreat).await.unwrap();
    assert_eq!(record.current_step, 1);
    assert!(!record.completed);
}

#[tokio::test]
async fn failed_update_rolls_back_local_state() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    let confirmed = progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    assert_eq!(confirmed.current_step, 1);

    api.set_fail_updates(true);
    let err = progress.apply(&p, ProgressIntent::Advance).await.unwrap_err();
    assert!(matches!(err, ProgressSyncError::Api(_)));

    // The slice shows the last server-confirmed record, not the optimistic
    // one.
    let record = progress.record_for(p.id()).await;
    assert_eq!(record, confirmed);

    // And the walk resumes cleanly once the backend recovers.
    api.set_fail_updates(false);
    let record = progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    assert_eq!(record.current_step, 2);
}

#[tokio::test]
async fn failed_first_update_leaves_problem_unstarted() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    api.set_fail_updates(true);
    progress
        .apply(&p, ProgressIntent::Advance)
        .await
        .unwrap_err();

    // Rollback removes the optimistic record entirely; the problem stays
    // "not started".
    let state = progress.state().await;
    assert!(!state.records.contains_key(&p.id()));
}

#[tokio::test]
async fn stale_token_during_update_logs_the_session_out() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    let token = app.session().state().await.token.unwrap();
    api.expire_token(&token);

    let err = progress.apply(&p, ProgressIntent::Advance).await.unwrap_err();
    assert!(matches!(
        err,
        ProgressSyncError::Api(ref api_err) if api_err.is_authentication()
    ));
    assert!(!app.session().state().await.authenticated);
}

#[tokio::test]
async fn fetch_for_merges_single_record() {
    let api = InMemoryApi::new();
    let p = problem(1, 3);
    api.add_problem(p.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    // Unstarted problem: fresh record, nothing merged.
    let fresh = progress.fetch_for(p.id()).await.unwrap();
    assert_eq!(fresh.current_step, 0);
    assert!(progress.state().await.records.is_empty());

    progress.apply(&p, ProgressIntent::Advance).await.unwrap();
    let fetched = progress.fetch_for(p.id()).await.unwrap();
    assert_eq!(fetched.current_step, 1);
}

#[tokio::test]
async fn dashboard_counters_reflect_records() {
    let api = InMemoryApi::new();
    let one = problem(1, 1);
    let two = problem(2, 2);
    api.add_problem(one.clone());
    api.add_problem(two.clone());
    let app = logged_in_app(&api).await;
    let progress = app.progress();

    progress.apply(&one, ProgressIntent::Advance).await.unwrap();
    progress
        .apply(&two, ProgressIntent::RevealHint)
        .await
        .unwrap();
    progress.apply(&two, ProgressIntent::Advance).await.unwrap();

    let state = progress.state().await;
    assert_eq!(state.completed_count(), 1);
    assert_eq!(state.total_hints_used(), 1);
}
