//! Semantic action IDs for CP Planner click targets.
//!
//! Each constant represents a distinct clickable action in the UI.
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Clock ───────────────────────────────────────────────────────
/// Quick-advance by `ADVANCE_STEPS[id - ADVANCE_STEP_BASE]` hours.
pub const ADVANCE_STEP_BASE: u16 = 0;
pub const ADVANCE_CUSTOM: u16 = 9;

// ── Actions ─────────────────────────────────────────────────────
pub const RUN_PARTY: u16 = 10;
pub const BUILD: u16 = 11;
pub const ADD_RESOURCES: u16 = 12;
pub const ADD_CP: u16 = 13;
pub const COPY_LINK: u16 = 14;

// ── View tabs ───────────────────────────────────────────────────
pub const TAB_PLANNER: u16 = 20;
pub const TAB_SETUP: u16 = 21;

// ── Field focus (base + index within its group) ─────────────────
pub const FOCUS_SETUP_BASE: u16 = 100;
pub const FOCUS_ACTION_BASE: u16 = 200;

// ── Editing ─────────────────────────────────────────────────────
pub const COMMIT_FIELD: u16 = 300;
pub const CANCEL_FIELD: u16 = 301;
pub const DISMISS_NOTICE: u16 = 310;
