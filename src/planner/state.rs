//! CP Planner state definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resources consumed by one party.
pub const PARTY_COST: f64 = 20_330.0;

/// Simulated hours that must pass between two parties.
pub const PARTY_COOLDOWN_HOURS: f64 = 24.0;

/// Hours offered by the quick-advance buttons, bound to keys `1`..`5`.
pub const ADVANCE_STEPS: [f64; 5] = [1.0, 4.0, 8.0, 12.0, 24.0];

/// What happens to consecutive "Advanced" entries after time moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogPolicy {
    /// Merge every run of consecutive advances into one summed entry.
    #[default]
    Collapse,
    /// Keep one entry per advance.
    Keep,
}

/// One line of the action history.
///
/// Entries are stored typed and rendered through `Display`, so collapsing
/// never has to re-parse rendered text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LogEntry {
    Advanced {
        hours: f64,
        res: f64,
        cp: f64,
    },
    #[serde(rename_all = "camelCase")]
    Partied {
        at_hour: f64,
        cost: f64,
        cp_gained: f64,
    },
    #[serde(rename_all = "camelCase")]
    PartyFailed { at_hour: f64 },
    #[serde(rename_all = "camelCase")]
    Built {
        name: String,
        cost: f64,
        cp_bonus: f64,
    },
    AddedResources { amount: f64 },
    AddedCp { amount: f64 },
    /// Free text carried over from a link whose wording we don't recognize.
    Note { text: String },
}

impl LogEntry {
    /// Failures and parties stand out in the log panel.
    pub fn is_important(&self) -> bool {
        matches!(self, LogEntry::Partied { .. } | LogEntry::PartyFailed { .. })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Advanced { hours, res, cp } => {
                write!(f, "⏩ Advanced {hours}h: +{res} res, +{cp:.2} CP")
            }
            LogEntry::Partied {
                at_hour,
                cost,
                cp_gained,
            } => write!(f, "🎉 [{at_hour}h] Ran party: -{cost} res, +{cp_gained} CP"),
            LogEntry::PartyFailed { at_hour } => {
                write!(f, "❌ [{at_hour}h] Not enough resources to run a party.")
            }
            LogEntry::Built {
                name,
                cost,
                cp_bonus,
            } => write!(f, "🏗️ Built \"{name}\": -{cost} res, +{cp_bonus} CP/day"),
            LogEntry::AddedResources { amount } => write!(f, "➕ Added {amount} resources"),
            LogEntry::AddedCp { amount } => write!(f, "➕ Added {amount} CP"),
            LogEntry::Note { text } => f.write_str(text),
        }
    }
}

/// Everything a share link carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationState {
    /// Resources gained per simulated hour.
    pub res_per_hour: f64,
    /// CP gained per 24 simulated hours. Buildings raise it permanently.
    pub cp_per_day: f64,
    pub current_cp: f64,
    pub current_res: f64,
    /// Simulation clock in hours. Only `advance_time` moves it.
    pub hours_since_start: f64,
    /// Clock value of the last successful party, `None` if never run.
    pub last_party_time: Option<f64>,
    pub action_log: Vec<LogEntry>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            res_per_hour: 1_200.0 + 1_620.0,
            cp_per_day: 153.0,
            current_cp: 700.0,
            current_res: 0.0,
            hours_since_start: 24.0,
            last_party_time: None,
            action_log: Vec::new(),
        }
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        self.action_log.push(entry);
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Building waiting to be constructed. Not part of the share link.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingBuilding {
    pub name: String,
    pub res_cost: f64,
    pub cp_bonus: f64,
}

impl PendingBuilding {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Amounts typed into the manual adjustment fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingAdjustments {
    pub resources: f64,
    pub cp: f64,
}
