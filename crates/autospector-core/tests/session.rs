use autospector_core::history::KeepOriginal;
use autospector_core::model::{DamageReport, User};
use autospector_core::session::{boot, AnalysisState, AnalysisTracker, AppState, View};
use autospector_core::store::{KeyValueStore, MemoryStore, HISTORY_KEY, USER_KEY};
use autospector_core::users::{authenticate, save_user, AuthError, AuthForm, AuthMode};
use std::sync::Arc;

fn user() -> User {
    User {
        email: "ana@example.com".to_string(),
        name: "Ana".to_string(),
    }
}

fn report(summary: &str) -> DamageReport {
    DamageReport {
        id: Some(format!("report-{summary}")),
        date: None,
        damages: Vec::new(),
        summary: summary.to_string(),
        vehicle_parts_visible: Vec::new(),
        total_severity_score: 0,
        image_url: Some("data:image/jpeg;base64,AAAA".to_string()),
    }
}

#[test]
fn history_requires_a_session() {
    let mut state = AppState::new(None);
    assert_eq!(View::Login, state.navigate(View::History));
    assert_eq!(View::Login, state.view);

    state.sign_in(user());
    assert_eq!(View::Home, state.view);
    assert_eq!(View::History, state.navigate(View::History));

    state.sign_out();
    assert!(state.session.is_none());
    assert_eq!(View::Home, state.view);
}

#[test]
fn only_the_latest_analysis_is_applied() {
    let mut state = AppState::new(None);
    let first = state.start_analysis("data:image/png;base64,AAAA".to_string());
    let second = state.start_analysis("data:image/png;base64,BBBB".to_string());
    assert!(second > first);
    assert_eq!(AnalysisState::Analyzing { generation: second }, state.analysis);

    assert!(!state.complete_analysis(first, report("stale")));
    assert!(state.report.is_none());

    assert!(state.complete_analysis(second, report("fresh")));
    assert_eq!("fresh", state.report.as_ref().unwrap().summary);
    assert_eq!(AnalysisState::Ready, state.analysis);
    assert_eq!(View::Dashboard, state.view);
}

#[test]
fn reset_makes_pending_analysis_stale() {
    let mut state = AppState::new(None);
    let generation = state.start_analysis("data:image/png;base64,AAAA".to_string());
    state.navigate(View::Home);
    assert!(state.current_image.is_none());
    assert!(!state.complete_analysis(generation, report("late")));
    assert!(state.report.is_none());
}

#[test]
fn failed_analysis_can_be_retried() {
    let mut state = AppState::new(None);
    let generation = state.start_analysis("data:image/png;base64,AAAA".to_string());
    assert!(state.fail_analysis(generation, "worker stopped"));
    assert!(matches!(state.analysis, AnalysisState::Failed { .. }));

    let (retry_gen, image) = state.retry().unwrap();
    assert!(retry_gen > generation);
    assert_eq!("data:image/png;base64,AAAA", image);
    assert!(state.is_analyzing());
    assert!(state.retry().is_none());
}

#[test]
fn acquisition_errors_stay_on_home() {
    let mut state = AppState::new(None);
    state.acquisition_failed("Please upload a valid image file (JPG, PNG).");
    assert_eq!(View::Home, state.view);
    assert!(state.notice.is_some());
    assert_eq!(AnalysisState::Idle, state.analysis);
}

#[test]
fn camera_failure_closes_the_camera_view() {
    let mut state = AppState::new(None);
    assert_eq!(View::Camera, state.navigate(View::Camera));
    state.acquisition_failed("Unable to access camera: permission denied");
    assert_eq!(View::Home, state.view);
    assert_eq!(
        Some("Unable to access camera: permission denied"),
        state.notice.as_deref()
    );
}

#[test]
fn history_entries_open_with_their_thumbnail() {
    let mut state = AppState::new(Some(user()));
    state.open_from_history(report("old"));
    assert_eq!(View::Dashboard, state.view);
    assert_eq!(Some("data:image/jpeg;base64,AAAA"), state.current_image.as_deref());
}

#[test]
fn tracker_generations_increase() {
    let mut t = AnalysisTracker::default();
    assert!(!t.is_current(0));
    let a = t.begin();
    assert!(t.is_current(a));
    t.invalidate();
    assert!(!t.is_current(a));
}

#[test]
fn boot_survives_truncated_history() {
    let store = Arc::new(MemoryStore::new());
    save_user(&*store, &user()).unwrap();
    store.set(HISTORY_KEY, "[{\"summary\": \"trunc").unwrap();

    let (mut state, history) = boot(Arc::clone(&store), Box::new(KeepOriginal));

    assert_eq!(View::Home, state.view);
    assert_eq!(Some(user()), state.session);
    assert!(history.is_empty());
    assert_eq!(View::History, state.navigate(View::History));
}

#[test]
fn corrupt_user_record_means_signed_out() {
    let store = MemoryStore::new();
    store.set(USER_KEY, "{not json").unwrap();
    let (state, _) = boot(store, Box::new(KeepOriginal));
    assert!(state.session.is_none());
}

#[test]
fn mock_auth_rules() {
    let mut form = AuthForm {
        name: String::new(),
        email: "ana@example.com".to_string(),
        password: String::new(),
    };
    assert_eq!(Err(AuthError::MissingFields), authenticate(AuthMode::Login, &form));

    form.password = "hunter2".to_string();
    let u = authenticate(AuthMode::Login, &form).unwrap();
    assert_eq!("Demo User", u.name);

    assert_eq!(Err(AuthError::MissingName), authenticate(AuthMode::Register, &form));
    form.name = "Ana".to_string();
    assert_eq!(user(), authenticate(AuthMode::Register, &form).unwrap());
}
