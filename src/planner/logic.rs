//! CP Planner logic: pure functions over `SimulationState`.
//!
//! Handlers mutate the state in place and hand back an optional [`Notice`]
//! for the shell to present. None of them touch the browser.

use std::fmt;

use super::state::{
    LogEntry, LogPolicy, PendingAdjustments, PendingBuilding, SimulationState, PARTY_COOLDOWN_HOURS,
    PARTY_COST,
};

/// A user-facing outcome the shell decides how to show.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    PartyUnaffordable { needed: f64, available: f64 },
    BuildingUnaffordable { needed: f64, available: f64 },
    InvalidHours { hours: f64 },
    InvalidNumber { field: &'static str, input: String },
    /// The action would push a counter past what `f64` can hold.
    OutOfRange,
    LinkCopied,
}

impl Notice {
    /// Blocking notices interrupt the user (an alert dialog in the browser).
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Notice::InvalidNumber { .. })
    }

    /// Shortfall line for the status bar, when there is one.
    pub fn detail(&self) -> Option<String> {
        match self {
            Notice::PartyUnaffordable { needed, available }
            | Notice::BuildingUnaffordable { needed, available } => Some(format!(
                "need {}, have {}",
                format_number(*needed),
                format_number(*available)
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PartyUnaffordable { .. } => f.write_str("Not enough resources to run a party!"),
            Notice::BuildingUnaffordable { .. } => f.write_str("Not enough resources to build."),
            Notice::InvalidHours { hours } => {
                write!(f, "Advance time needs a positive number of hours (got {hours}).")
            }
            Notice::InvalidNumber { field, input } => {
                write!(f, "{field}: \"{input}\" is not a number.")
            }
            Notice::OutOfRange => f.write_str("That would make a number too large to track."),
            Notice::LinkCopied => f.write_str("Link copied to clipboard!"),
        }
    }
}

/// True when every value is finite. Counters must stay finite so the
/// share link can carry them.
fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

// ── Clock ───────────────────────────────────────────────────────

/// Move the simulation clock forward by `hours`, accruing resources and CP.
///
/// Non-positive or non-finite hours are rejected without touching the state.
pub fn advance_time(state: &mut SimulationState, hours: f64, policy: LogPolicy) -> Option<Notice> {
    if !hours.is_finite() || hours <= 0.0 {
        log::debug!("rejected advance of {hours}h");
        return Some(Notice::InvalidHours { hours });
    }

    let res = state.res_per_hour * hours;
    let cp = (state.cp_per_day / 24.0) * hours;
    let current_res = state.current_res + res;
    let current_cp = state.current_cp + cp;
    let hours_since_start = state.hours_since_start + hours;
    if !all_finite(&[res, cp, current_res, current_cp, hours_since_start]) {
        return Some(Notice::OutOfRange);
    }

    state.current_res = current_res;
    state.current_cp = current_cp;
    state.hours_since_start = hours_since_start;
    state.push_log(LogEntry::Advanced { hours, res, cp });

    if policy == LogPolicy::Collapse {
        collapse_log(&mut state.action_log);
    }
    None
}

// ── Party ───────────────────────────────────────────────────────

pub fn can_run_party(state: &SimulationState) -> bool {
    match state.last_party_time {
        None => true,
        Some(last) => state.hours_since_start - last >= PARTY_COOLDOWN_HOURS,
    }
}

/// Hours left on the party cooldown, 0 when a party can run now.
pub fn next_party_available_in(state: &SimulationState) -> f64 {
    match state.last_party_time {
        None => 0.0,
        Some(last) => (PARTY_COOLDOWN_HOURS - (state.hours_since_start - last)).max(0.0),
    }
}

/// Whole hours of accumulation until the party cost is covered.
/// `None` when resources never grow at the current rate.
pub fn hours_until_party_affordable(state: &SimulationState) -> Option<u64> {
    let missing = PARTY_COST - state.current_res;
    if missing <= 0.0 {
        return Some(0);
    }
    if state.res_per_hour <= 0.0 {
        return None;
    }
    Some((missing / state.res_per_hour).ceil() as u64)
}

/// Trade resources for a day's worth of CP.
///
/// Silent no-op while on cooldown. An unaffordable attempt is logged but
/// leaves the cooldown untouched, so it can be retried right away.
pub fn run_party(state: &mut SimulationState) -> Option<Notice> {
    if !can_run_party(state) {
        log::debug!(
            "party on cooldown for another {}h",
            next_party_available_in(state)
        );
        return None;
    }

    if state.current_res < PARTY_COST {
        state.push_log(LogEntry::PartyFailed {
            at_hour: state.hours_since_start,
        });
        return Some(Notice::PartyUnaffordable {
            needed: PARTY_COST,
            available: state.current_res,
        });
    }

    let cp_gained = state.cp_per_day;
    let current_cp = state.current_cp + cp_gained;
    if !current_cp.is_finite() {
        return Some(Notice::OutOfRange);
    }
    state.current_res -= PARTY_COST;
    state.current_cp = current_cp;
    state.last_party_time = Some(state.hours_since_start);
    state.push_log(LogEntry::Partied {
        at_hour: state.hours_since_start,
        cost: PARTY_COST,
        cp_gained,
    });
    None
}

// ── Buildings & adjustments ─────────────────────────────────────

/// Construct the pending building, permanently raising CP/day.
///
/// Unlike a failed party, a failed build leaves no trace in the log.
pub fn build_building(state: &mut SimulationState, pending: &mut PendingBuilding) -> Option<Notice> {
    if state.current_res < pending.res_cost {
        return Some(Notice::BuildingUnaffordable {
            needed: pending.res_cost,
            available: state.current_res,
        });
    }

    let current_res = state.current_res - pending.res_cost;
    let cp_per_day = state.cp_per_day + pending.cp_bonus;
    if !all_finite(&[current_res, cp_per_day]) {
        return Some(Notice::OutOfRange);
    }
    state.current_res = current_res;
    state.cp_per_day = cp_per_day;
    state.push_log(LogEntry::Built {
        name: std::mem::take(&mut pending.name),
        cost: pending.res_cost,
        cp_bonus: pending.cp_bonus,
    });
    pending.reset();
    None
}

/// Add the typed resource amount. An amount that would overflow the
/// counter is kept in the field and nothing changes.
pub fn add_resources(state: &mut SimulationState, pending: &mut PendingAdjustments) -> Option<Notice> {
    let current_res = state.current_res + pending.resources;
    if !current_res.is_finite() {
        return Some(Notice::OutOfRange);
    }
    let amount = std::mem::take(&mut pending.resources);
    state.current_res = current_res;
    state.push_log(LogEntry::AddedResources { amount });
    None
}

pub fn add_cp(state: &mut SimulationState, pending: &mut PendingAdjustments) -> Option<Notice> {
    let current_cp = state.current_cp + pending.cp;
    if !current_cp.is_finite() {
        return Some(Notice::OutOfRange);
    }
    let amount = std::mem::take(&mut pending.cp);
    state.current_cp = current_cp;
    state.push_log(LogEntry::AddedCp { amount });
    None
}

// ── Log collapsing ──────────────────────────────────────────────

/// Merge every maximal run of consecutive `Advanced` entries into one.
///
/// Other entries keep their order and end the current run. A run also
/// ends where its sums would stop being finite.
pub fn collapse_log(log: &mut Vec<LogEntry>) {
    let mut collapsed: Vec<LogEntry> = Vec::with_capacity(log.len());
    let mut pending: Option<(f64, f64, f64)> = None;

    for entry in log.drain(..) {
        match entry {
            LogEntry::Advanced { hours, res, cp } => {
                pending = match pending {
                    Some((h, r, c)) if all_finite(&[h + hours, r + res, c + cp]) => {
                        Some((h + hours, r + res, c + cp))
                    }
                    Some((h, r, c)) => {
                        collapsed.push(LogEntry::Advanced { hours: h, res: r, cp: c });
                        Some((hours, res, cp))
                    }
                    None => Some((hours, res, cp)),
                };
            }
            other => {
                if let Some((hours, res, cp)) = pending.take() {
                    collapsed.push(LogEntry::Advanced { hours, res, cp });
                }
                collapsed.push(other);
            }
        }
    }
    if let Some((hours, res, cp)) = pending {
        collapsed.push(LogEntry::Advanced { hours, res, cp });
    }

    *log = collapsed;
}

// ── Formatting ──────────────────────────────────────────────────

/// Format a counter with thousands separators and at most one decimal.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    let rounded = (n * 10.0).round() / 10.0;
    let int_part = rounded.floor() as u64;
    let frac = rounded - rounded.floor();

    let s = int_part.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let result: String = result.chars().rev().collect();

    let tenths = (frac * 10.0).round() as u8;
    if (1..10).contains(&tenths) {
        format!("{}.{}", result, tenths)
    } else {
        result
    }
}

/// "Day 3, 05h" style clock label.
pub fn format_clock(hours: f64) -> String {
    let day = (hours / 24.0).floor() as u64 + 1;
    let hour = hours.rem_euclid(24.0);
    format!("Day {day}, {hour:02.0}h")
}
