//! CP Planner: a command-point planning calculator.
//!
//! `PlannerApp` owns the simulation state and routes input to the pure
//! handlers in [`logic`]. Notices come back as values; the shell decides
//! whether to raise an alert.

pub mod actions;
pub mod form;
pub mod logic;
pub mod render;
pub mod share;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use actions::*;
use form::{Field, Form, Pending};
use logic::Notice;
use share::{ClipboardPort, LocationPort};
use state::{LogPolicy, SimulationState, ADVANCE_STEPS};

/// Which panel set is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Planner,
    Setup,
}

pub struct PlannerApp {
    pub state: SimulationState,
    pub pending: Pending,
    pub form: Form,
    pub policy: LogPolicy,
    pub view: View,
    /// Summary reflects the setup inputs. Cleared by setup edits until the
    /// user recalculates.
    pub submitted: bool,
    /// Latest notice, shown in the status bar until dismissed.
    pub status: Option<Notice>,
    /// Blocking notices not yet presented by the shell. Shared with
    /// clipboard callbacks, which may fire after the current frame.
    alerts: Rc<RefCell<Vec<Notice>>>,
    location: Box<dyn LocationPort>,
    clipboard: Box<dyn ClipboardPort>,
}

impl PlannerApp {
    /// Start from the page address: a `state` token if present, defaults otherwise.
    pub fn new(location: Box<dyn LocationPort>, clipboard: Box<dyn ClipboardPort>) -> Self {
        let startup = share::load_from_location(location.as_ref());
        if startup.from_link {
            log::info!("planner restored from a shared link");
        }
        Self {
            state: startup.state,
            pending: Pending::new(),
            form: Form::new(),
            policy: startup.log_policy,
            view: View::Planner,
            submitted: true,
            status: None,
            alerts: Rc::new(RefCell::new(Vec::new())),
            location,
            clipboard,
        }
    }

    /// Handle one input event. Returns true if it changed anything.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.form.is_editing() {
            return self.handle_editing(event);
        }
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
            InputEvent::NextField => {
                let fields = self.view_fields();
                self.form.focus_next(None, fields, &self.state, &self.pending);
                true
            }
            InputEvent::Submit if self.view == View::Setup => {
                self.calculate();
                true
            }
            InputEvent::Cancel => self.status.take().is_some(),
            InputEvent::Submit | InputEvent::Erase => false,
        }
    }

    /// Blocking notices raised since the last call, oldest first.
    pub fn take_alerts(&mut self) -> Vec<Notice> {
        std::mem::take(&mut *self.alerts.borrow_mut())
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        self.sync_status();
        render::render(self, f, area, click_state);
    }

    /// Fields the Tab key cycles through in the current view.
    pub fn view_fields(&self) -> &'static [Field] {
        match self.view {
            View::Planner => &Field::ACTIONS,
            View::Setup => &Field::SETUP,
        }
    }

    // ── Dispatch ────────────────────────────────────────────────

    fn handle_editing(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.form.type_char(*c),
            InputEvent::Erase => self.form.erase(),
            InputEvent::Cancel => self.form.cancel(),
            InputEvent::Submit => {
                self.commit_field();
            }
            InputEvent::NextField => {
                let current = self.form.focus;
                if self.commit_field() {
                    let fields = self.view_fields();
                    self.form.focus_next(current, fields, &self.state, &self.pending);
                }
            }
            InputEvent::Click(CANCEL_FIELD) => self.form.cancel(),
            InputEvent::Click(COMMIT_FIELD) => {
                self.commit_field();
            }
            // Tapping elsewhere commits first, so "type a cost, tap Build" works.
            InputEvent::Click(id) => {
                if self.commit_field() {
                    return self.handle_click(*id);
                }
            }
        }
        true
    }

    fn handle_key(&mut self, c: char) -> bool {
        match c {
            '1'..='5' => {
                let step = ADVANCE_STEPS[(c as u8 - b'1') as usize];
                self.advance(step);
            }
            'h' | 'H' => self.advance(self.pending.advance_hours),
            'p' | 'P' => self.run_party(),
            'b' | 'B' => self.build(),
            'r' | 'R' => self.add_resources(),
            'c' | 'C' => self.add_cp(),
            's' | 'S' => self.copy_link(),
            'i' | 'I' => self.toggle_view(),
            _ => return false,
        }
        true
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            ADVANCE_CUSTOM => self.advance(self.pending.advance_hours),
            id if (ADVANCE_STEP_BASE..ADVANCE_STEP_BASE + ADVANCE_STEPS.len() as u16)
                .contains(&id) =>
            {
                self.advance(ADVANCE_STEPS[(id - ADVANCE_STEP_BASE) as usize]);
            }
            RUN_PARTY => self.run_party(),
            BUILD => self.build(),
            ADD_RESOURCES => self.add_resources(),
            ADD_CP => self.add_cp(),
            COPY_LINK => self.copy_link(),
            TAB_PLANNER => self.view = View::Planner,
            TAB_SETUP => self.view = View::Setup,
            COMMIT_FIELD if self.view == View::Setup => self.calculate(),
            DISMISS_NOTICE => self.status = None,
            id if (FOCUS_SETUP_BASE..FOCUS_SETUP_BASE + Field::SETUP.len() as u16)
                .contains(&id) =>
            {
                let field = Field::SETUP[(id - FOCUS_SETUP_BASE) as usize];
                self.form.focus(field, &self.state, &self.pending);
            }
            id if (FOCUS_ACTION_BASE..FOCUS_ACTION_BASE + Field::ACTIONS.len() as u16)
                .contains(&id) =>
            {
                let field = Field::ACTIONS[(id - FOCUS_ACTION_BASE) as usize];
                self.form.focus(field, &self.state, &self.pending);
            }
            _ => return false,
        }
        true
    }

    // ── Actions ─────────────────────────────────────────────────

    fn advance(&mut self, hours: f64) {
        if let Some(n) = logic::advance_time(&mut self.state, hours, self.policy) {
            self.report(n);
        }
    }

    fn run_party(&mut self) {
        if let Some(n) = logic::run_party(&mut self.state) {
            self.report(n);
        }
    }

    fn build(&mut self) {
        if let Some(n) = logic::build_building(&mut self.state, &mut self.pending.building) {
            self.report(n);
        }
    }

    fn add_resources(&mut self) {
        if let Some(n) = logic::add_resources(&mut self.state, &mut self.pending.adjustments) {
            self.report(n);
        }
    }

    fn add_cp(&mut self) {
        if let Some(n) = logic::add_cp(&mut self.state, &mut self.pending.adjustments) {
            self.report(n);
        }
    }

    fn copy_link(&mut self) {
        let alerts = self.alerts.clone();
        share::copy_shareable_link(
            self.location.as_ref(),
            self.clipboard.as_ref(),
            &self.state,
            Box::new(move |n| alerts.borrow_mut().push(n)),
        );
    }

    fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Planner => View::Setup,
            View::Setup => View::Planner,
        };
    }

    fn calculate(&mut self) {
        self.submitted = true;
        self.view = View::Planner;
    }

    /// Commit the focused field. False if the text did not parse.
    fn commit_field(&mut self) -> bool {
        let was_setup = self.form.focus.is_some_and(|f| Field::SETUP.contains(&f));
        match self.form.commit(&mut self.state, &mut self.pending) {
            Some(n) => {
                self.report(n);
                false
            }
            None => {
                if was_setup {
                    self.submitted = false;
                }
                true
            }
        }
    }

    fn report(&mut self, notice: Notice) {
        log::debug!("notice: {notice}");
        if notice.is_blocking() {
            self.alerts.borrow_mut().push(notice.clone());
        }
        self.status = Some(notice);
    }

    /// Mirror the newest pending alert (e.g. a finished clipboard write)
    /// into the status bar.
    fn sync_status(&mut self) {
        if let Some(last) = self.alerts.borrow().last() {
            self.status = Some(last.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::share::encode_state;
    use crate::planner::state::LogEntry;

    struct StubLocation(Option<String>);

    impl LocationPort for StubLocation {
        fn origin(&self) -> String {
            "http://localhost:8080".into()
        }
        fn pathname(&self) -> String {
            "/".into()
        }
        fn query_param(&self, name: &str) -> Option<String> {
            (name == share::SHARE_PARAM).then(|| self.0.clone()).flatten()
        }
    }

    struct RecordingClipboard(Rc<RefCell<Vec<String>>>);

    impl ClipboardPort for RecordingClipboard {
        fn write_text(&self, text: &str, on_done: Box<dyn FnOnce()>) {
            self.0.borrow_mut().push(text.to_string());
            on_done();
        }
    }

    fn app_with(token: Option<String>) -> (PlannerApp, Rc<RefCell<Vec<String>>>) {
        let copied = Rc::new(RefCell::new(Vec::new()));
        let app = PlannerApp::new(
            Box::new(StubLocation(token)),
            Box::new(RecordingClipboard(copied.clone())),
        );
        (app, copied)
    }

    fn app() -> PlannerApp {
        app_with(None).0
    }

    fn type_text(app: &mut PlannerApp, text: &str) {
        for c in text.chars() {
            app.handle_input(&InputEvent::Key(c));
        }
    }

    #[test]
    fn starts_from_defaults_and_submitted() {
        let app = app();
        assert_eq!(app.state, SimulationState::new());
        assert!(app.submitted);
        assert_eq!(app.view, View::Planner);
        assert_eq!(app.policy, LogPolicy::Collapse);
    }

    #[test]
    fn starts_from_shared_link() {
        let mut shared = SimulationState::new();
        shared.current_res = 12345.0;
        let (app, _) = app_with(Some(encode_state(&shared).unwrap()));
        assert_eq!(app.state, shared);
        assert!(app.submitted);
    }

    #[test]
    fn broken_link_still_starts() {
        let (app, _) = app_with(Some("not a token".into()));
        assert_eq!(app.state, SimulationState::new());
        assert!(app.submitted);
    }

    #[test]
    fn quick_advance_keys() {
        let mut app = app();
        assert!(app.handle_input(&InputEvent::Key('5')));
        assert_eq!(app.state.hours_since_start, 48.0);
        app.handle_input(&InputEvent::Click(ADVANCE_STEP_BASE));
        assert_eq!(app.state.hours_since_start, 49.0);
        assert_eq!(app.state.action_log.len(), 1);
    }

    #[test]
    fn party_scenario_through_input() {
        let mut app = app();
        app.handle_input(&InputEvent::Key('5'));
        app.handle_input(&InputEvent::Key('p'));
        assert_eq!(app.state.current_res, 47350.0);
        assert_eq!(app.state.last_party_time, Some(48.0));
        assert!(app.take_alerts().is_empty());

        app.handle_input(&InputEvent::Click(RUN_PARTY));
        assert_eq!(app.state.current_res, 47350.0);
    }

    #[test]
    fn unaffordable_party_raises_alert() {
        let mut app = app();
        app.handle_input(&InputEvent::Key('p'));
        let alerts = app.take_alerts();
        assert_eq!(alerts.len(), 1);
        assert!(matches!(alerts[0], Notice::PartyUnaffordable { .. }));
        assert!(matches!(app.status, Some(Notice::PartyUnaffordable { .. })));
        assert_eq!(
            app.state.action_log,
            vec![LogEntry::PartyFailed { at_hour: 24.0 }]
        );
        assert!(app.take_alerts().is_empty());
    }

    #[test]
    fn type_cost_then_tap_build_commits_first() {
        let mut app = app();
        app.state.current_res = 9000.0;

        app.handle_input(&InputEvent::Click(FOCUS_ACTION_BASE + Field::BuildingName.index() as u16));
        type_text(&mut app, "Keep");
        app.handle_input(&InputEvent::NextField);
        assert_eq!(app.form.focus, Some(Field::BuildingCost));
        app.form.buffer.clear();
        type_text(&mut app, "5000");
        app.handle_input(&InputEvent::NextField);
        app.form.buffer.clear();
        type_text(&mut app, "20");
        app.handle_input(&InputEvent::Click(BUILD));

        assert!(!app.form.is_editing());
        assert_eq!(app.state.current_res, 4000.0);
        assert_eq!(app.state.cp_per_day, 173.0);
        assert_eq!(app.pending.building.name, "");
        assert_eq!(
            app.state.action_log.last().unwrap().to_string(),
            "🏗️ Built \"Keep\": -5000 res, +20 CP/day"
        );
    }

    #[test]
    fn unaffordable_build_alerts_without_logging() {
        let mut app = app();
        app.pending.building.res_cost = 100.0;
        app.handle_input(&InputEvent::Key('b'));
        assert!(app.state.action_log.is_empty());
        assert!(matches!(
            app.take_alerts().as_slice(),
            [Notice::BuildingUnaffordable { .. }]
        ));
    }

    #[test]
    fn typed_letters_go_to_field_not_shortcuts() {
        let mut app = app();
        app.handle_input(&InputEvent::Click(FOCUS_ACTION_BASE + Field::BuildingName.index() as u16));
        type_text(&mut app, "ps");
        assert_eq!(app.form.buffer, "ps");
        assert!(app.state.action_log.is_empty());
        app.handle_input(&InputEvent::Cancel);
        assert!(!app.form.is_editing());
    }

    #[test]
    fn manual_adjustments_via_fields() {
        let mut app = app();
        app.handle_input(&InputEvent::Click(FOCUS_ACTION_BASE + Field::AddResources.index() as u16));
        app.form.buffer.clear();
        type_text(&mut app, "-150");
        app.handle_input(&InputEvent::Submit);
        app.handle_input(&InputEvent::Key('r'));
        assert_eq!(app.state.current_res, -150.0);
        assert_eq!(app.pending.adjustments.resources, 0.0);

        app.pending.adjustments.cp = 12.0;
        app.handle_input(&InputEvent::Click(ADD_CP));
        assert_eq!(app.state.current_cp, 712.0);
    }

    #[test]
    fn invalid_custom_hours_are_rejected() {
        let mut app = app();
        app.pending.advance_hours = 0.0;
        app.handle_input(&InputEvent::Key('h'));
        assert_eq!(app.state.hours_since_start, 24.0);
        assert!(matches!(
            app.take_alerts().as_slice(),
            [Notice::InvalidHours { .. }]
        ));
    }

    #[test]
    fn bad_number_shows_status_but_no_alert() {
        let mut app = app();
        app.handle_input(&InputEvent::Click(FOCUS_ACTION_BASE + Field::BuildingCost.index() as u16));
        app.form.buffer = "1-2".into();
        app.handle_input(&InputEvent::Submit);
        assert!(app.form.is_editing());
        assert!(matches!(app.status, Some(Notice::InvalidNumber { .. })));
        assert!(app.take_alerts().is_empty());
        app.handle_input(&InputEvent::Cancel);
        assert!(app.handle_input(&InputEvent::Cancel));
        assert_eq!(app.status, None);
    }

    #[test]
    fn setup_edit_requires_recalculate() {
        let mut app = app();
        app.handle_input(&InputEvent::Key('i'));
        assert_eq!(app.view, View::Setup);
        app.handle_input(&InputEvent::NextField);
        assert_eq!(app.form.focus, Some(Field::ResPerHour));
        app.form.buffer.clear();
        type_text(&mut app, "3000");
        app.handle_input(&InputEvent::Submit);
        assert_eq!(app.state.res_per_hour, 3000.0);
        assert!(!app.submitted);

        app.handle_input(&InputEvent::Submit);
        assert!(app.submitted);
        assert_eq!(app.view, View::Planner);
    }

    #[test]
    fn copy_link_writes_url_and_confirms() {
        let (mut app, copied) = app_with(None);
        app.handle_input(&InputEvent::Key('5'));
        app.handle_input(&InputEvent::Key('s'));

        let copied = copied.borrow();
        assert_eq!(copied.len(), 1);
        let token = copied[0]
            .strip_prefix("http://localhost:8080/?state=")
            .unwrap();
        assert_eq!(share::decode_state(token).unwrap(), app.state);
        assert_eq!(app.take_alerts(), vec![Notice::LinkCopied]);
    }

    #[test]
    fn tab_moves_to_the_field_after_the_committed_one() {
        let mut app = app();
        app.handle_input(&InputEvent::Key('i'));
        app.handle_input(&InputEvent::Click(FOCUS_SETUP_BASE + Field::CurrentCp.index() as u16));
        app.handle_input(&InputEvent::NextField);
        assert_eq!(app.form.focus, Some(Field::CurrentRes));
        app.handle_input(&InputEvent::NextField);
        assert_eq!(app.form.focus, Some(Field::HoursSinceStart));
        app.handle_input(&InputEvent::NextField);
        assert_eq!(app.form.focus, Some(Field::ResPerHour));
    }

    #[test]
    fn oversized_adjustment_keeps_state_shareable() {
        let mut app = app();
        app.pending.adjustments.resources = 1e308;
        app.handle_input(&InputEvent::Key('r'));
        assert_eq!(app.state.current_res, 1e308);

        app.pending.adjustments.resources = 1e308;
        app.handle_input(&InputEvent::Key('r'));
        assert_eq!(app.state.current_res, 1e308);
        assert_eq!(app.pending.adjustments.resources, 1e308);
        assert_eq!(app.take_alerts(), vec![Notice::OutOfRange]);
        assert_eq!(app.state.action_log.len(), 1);

        let token = encode_state(&app.state).unwrap();
        assert_eq!(share::decode_state(&token).unwrap(), app.state);
    }

    #[test]
    fn unknown_input_is_ignored() {
        let mut app = app();
        assert!(!app.handle_input(&InputEvent::Key('z')));
        assert!(!app.handle_input(&InputEvent::Click(999)));
        assert!(!app.handle_input(&InputEvent::Erase));
    }
}
