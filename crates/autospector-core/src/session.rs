//! Front-end state shared by the CLI and the GUI.

use crate::history::{HistoryStore, Thumbnailer};
use crate::model::{DamageReport, User};
use crate::store::KeyValueStore;
use crate::users::load_user;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Dashboard,
    Login,
    Register,
    History,
    /// Live camera preview.
    Camera,
}

/// Hands out analysis generations; only the newest one may be applied.
#[derive(Debug, Clone, Default)]
pub struct AnalysisTracker {
    latest: u64,
}

impl AnalysisTracker {
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation != 0 && generation == self.latest
    }

    /// Makes every outstanding generation stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Analyzing { generation: u64 },
    Ready,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub session: Option<User>,
    /// Data URI of the image on the dashboard.
    pub current_image: Option<String>,
    pub report: Option<DamageReport>,
    pub analysis: AnalysisState,
    /// Acquisition problem to show on the home view.
    pub notice: Option<String>,
    tracker: AnalysisTracker,
}

impl AppState {
    pub fn new(session: Option<User>) -> Self {
        Self {
            view: View::Home,
            session,
            current_image: None,
            report: None,
            analysis: AnalysisState::Idle,
            notice: None,
            tracker: AnalysisTracker::default(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Switches view and returns where we ended up: history needs a session.
    pub fn navigate(&mut self, view: View) -> View {
        if view == View::History && self.session.is_none() {
            self.view = View::Login;
            return self.view;
        }
        if view == View::Home {
            self.reset();
        }
        self.view = view;
        view
    }

    pub fn sign_in(&mut self, user: User) {
        self.session = Some(user);
        self.view = View::Home;
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.view = View::Home;
    }

    /// Clears the current inspection; any analysis still running is stale.
    pub fn reset(&mut self) {
        self.tracker.invalidate();
        self.report = None;
        self.current_image = None;
        self.analysis = AnalysisState::Idle;
        self.notice = None;
        self.view = View::Home;
    }

    pub fn start_analysis(&mut self, image_uri: String) -> u64 {
        let generation = self.tracker.begin();
        self.current_image = Some(image_uri);
        self.report = None;
        self.notice = None;
        self.analysis = AnalysisState::Analyzing { generation };
        self.view = View::Dashboard;
        generation
    }

    /// Applies a finished analysis if it is still the newest one.
    pub fn complete_analysis(&mut self, generation: u64, report: DamageReport) -> bool {
        if !self.tracker.is_current(generation) {
            tracing::info!(generation, latest = self.tracker.latest(), "dropping stale analysis result");
            return false;
        }
        self.report = Some(report);
        self.analysis = AnalysisState::Ready;
        true
    }

    pub fn fail_analysis(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if !self.tracker.is_current(generation) {
            return false;
        }
        self.analysis = AnalysisState::Failed {
            message: message.into(),
        };
        true
    }

    /// Starts over with the image of a failed analysis.
    pub fn retry(&mut self) -> Option<(u64, String)> {
        if !matches!(self.analysis, AnalysisState::Failed { .. }) {
            return None;
        }
        let image = self.current_image.clone()?;
        Some((self.start_analysis(image.clone()), image))
    }

    /// Reported before any inference is attempted.
    pub fn acquisition_failed(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
        self.view = View::Home;
    }

    pub fn open_from_history(&mut self, report: DamageReport) {
        self.tracker.invalidate();
        self.current_image = report.image_url.clone();
        self.report = Some(report);
        self.analysis = AnalysisState::Ready;
        self.view = View::Dashboard;
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.analysis, AnalysisState::Analyzing { .. })
    }
}

/// Restores the signed-in user and the history from `store`.
pub fn boot<S>(store: S, thumbnailer: Box<dyn Thumbnailer>) -> (AppState, HistoryStore<S>)
where
    S: KeyValueStore,
{
    let session = load_user(&store);
    let history = HistoryStore::load(store, thumbnailer);
    (AppState::new(session), history)
}
