//! Editable input fields.
//!
//! A field is edited in a text buffer and only written back to the state on
//! commit, so a half-typed number never reaches the calculator.

use super::logic::Notice;
use super::state::{PendingAdjustments, PendingBuilding, SimulationState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    // Setup inputs
    ResPerHour,
    CpPerDay,
    CurrentCp,
    CurrentRes,
    HoursSinceStart,
    // Action inputs
    AdvanceHours,
    BuildingName,
    BuildingCost,
    BuildingBonus,
    AddResources,
    AddCp,
}

impl Field {
    pub const SETUP: [Field; 5] = [
        Field::ResPerHour,
        Field::CpPerDay,
        Field::CurrentCp,
        Field::CurrentRes,
        Field::HoursSinceStart,
    ];

    pub const ACTIONS: [Field; 6] = [
        Field::AdvanceHours,
        Field::BuildingName,
        Field::BuildingCost,
        Field::BuildingBonus,
        Field::AddResources,
        Field::AddCp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::ResPerHour => "Resources / hour",
            Field::CpPerDay => "CP / day",
            Field::CurrentCp => "Current CP",
            Field::CurrentRes => "Current resources",
            Field::HoursSinceStart => "Hours since start",
            Field::AdvanceHours => "Custom hours",
            Field::BuildingName => "Building name",
            Field::BuildingCost => "Building cost",
            Field::BuildingBonus => "Building CP/day",
            Field::AddResources => "Add resources",
            Field::AddCp => "Add CP",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Field::BuildingName)
    }

    /// Index into `SETUP` or `ACTIONS`, whichever holds this field.
    pub fn index(&self) -> usize {
        Self::SETUP
            .iter()
            .chain(Self::ACTIONS.iter())
            .position(|f| f == self)
            .map(|i| if i >= Self::SETUP.len() { i - Self::SETUP.len() } else { i })
            .unwrap_or(0)
    }
}

/// Values the action fields edit. Not shared in links.
#[derive(Clone, Debug, PartialEq)]
pub struct Pending {
    pub advance_hours: f64,
    pub building: PendingBuilding,
    pub adjustments: PendingAdjustments,
}

impl Pending {
    pub fn new() -> Self {
        Self {
            advance_hours: 1.0,
            building: PendingBuilding::default(),
            adjustments: PendingAdjustments::default(),
        }
    }
}

/// The field being edited, if any, and its text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    pub focus: Option<Field>,
    pub buffer: String,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.focus.is_some()
    }

    /// Start editing `field`, seeding the buffer with its current value.
    pub fn focus(&mut self, field: Field, state: &SimulationState, pending: &Pending) {
        self.focus = Some(field);
        self.buffer = current_text(field, state, pending);
    }

    /// Focus the field after `from` in `fields`, wrapping around; the
    /// first field when `from` is `None` or not in `fields`.
    pub fn focus_next(
        &mut self,
        from: Option<Field>,
        fields: &[Field],
        state: &SimulationState,
        pending: &Pending,
    ) {
        if fields.is_empty() {
            return;
        }
        let next = match from.and_then(|f| fields.iter().position(|x| *x == f)) {
            Some(i) => fields[(i + 1) % fields.len()],
            None => fields[0],
        };
        self.focus(next, state, pending);
    }

    pub fn cancel(&mut self) {
        self.focus = None;
        self.buffer.clear();
    }

    pub fn type_char(&mut self, c: char) {
        let Some(field) = self.focus else {
            return;
        };
        let accepted = if field.is_numeric() {
            c.is_ascii_digit() || c == '.' || c == '-' || c == 'e' || c == 'E'
        } else {
            !c.is_control()
        };
        if accepted {
            self.buffer.push(c);
        }
    }

    pub fn erase(&mut self) {
        self.buffer.pop();
    }

    /// Write the buffer back into the state. On a parse failure the field
    /// keeps its previous value and stays focused.
    pub fn commit(&mut self, state: &mut SimulationState, pending: &mut Pending) -> Option<Notice> {
        let field = self.focus?;

        let target = match field {
            Field::BuildingName => {
                pending.building.name = self.buffer.trim().to_string();
                self.cancel();
                return None;
            }
            Field::ResPerHour => &mut state.res_per_hour,
            Field::CpPerDay => &mut state.cp_per_day,
            Field::CurrentCp => &mut state.current_cp,
            Field::CurrentRes => &mut state.current_res,
            Field::HoursSinceStart => &mut state.hours_since_start,
            Field::AdvanceHours => &mut pending.advance_hours,
            Field::BuildingCost => &mut pending.building.res_cost,
            Field::BuildingBonus => &mut pending.building.cp_bonus,
            Field::AddResources => &mut pending.adjustments.resources,
            Field::AddCp => &mut pending.adjustments.cp,
        };

        let Some(value) = parse_number(&self.buffer) else {
            return Some(Notice::InvalidNumber {
                field: field.label(),
                input: self.buffer.clone(),
            });
        };
        *target = value;
        self.cancel();
        None
    }
}

/// Empty input counts as zero, like a cleared number box.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn current_text(field: Field, state: &SimulationState, pending: &Pending) -> String {
    match field {
        Field::ResPerHour => state.res_per_hour.to_string(),
        Field::CpPerDay => state.cp_per_day.to_string(),
        Field::CurrentCp => state.current_cp.to_string(),
        Field::CurrentRes => state.current_res.to_string(),
        Field::HoursSinceStart => state.hours_since_start.to_string(),
        Field::AdvanceHours => pending.advance_hours.to_string(),
        Field::BuildingName => pending.building.name.clone(),
        Field::BuildingCost => pending.building.res_cost.to_string(),
        Field::BuildingBonus => pending.building.cp_bonus.to_string(),
        Field::AddResources => pending.adjustments.resources.to_string(),
        Field::AddCp => pending.adjustments.cp.to_string(),
    }
}
