//! Input handling: pointer-to-cell conversion, click targets, and event types.
//!
//! The planner dispatches these events in `planner::PlannerApp::handle_input`.

use ratzilla::ratatui::layout::Rect;

/// Keyboard, mouse and touch input, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic action ID
    /// from `planner::actions`.
    Click(u16),
    /// Enter: commit the field being edited.
    Submit,
    /// Backspace inside a field.
    Erase,
    /// Tab: move to the next field.
    NextField,
    /// Esc: drop the edit in progress, or dismiss the notice.
    Cancel,
}

/// A rectangle of terminal cells bound to an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the last frame, shared with the pointer handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width target on `row`, ignored when the row lies outside `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register targets for a horizontal tab bar.
    ///
    /// `tab_widths` holds `(display_width, action_id)` per padded label. Each
    /// target spans its label plus half of each neighbouring separator; the
    /// outer tabs stretch to the edges of the bar.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut starts: Vec<u16> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }

        for (i, &(width, action_id)) in tab_widths.iter().enumerate() {
            let left = if i == 0 {
                0
            } else {
                let prev_end = starts[i - 1] + tab_widths[i - 1].0;
                prev_end + (starts[i] - prev_end) / 2
            };
            let right = if i == n - 1 {
                total_width
            } else {
                let end = starts[i] + width;
                end + (starts[i + 1] - end) / 2
            };

            let w = right.saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Action at a cell. Later targets sit on top and win on overlap.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

/// Below this width the planner stacks its panels vertically.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// Convert a pixel offset from the grid's top edge into a terminal row.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let row = (click_y / (grid_height / terminal_rows as f64)) as u16;
    (row < terminal_rows).then_some(row)
}

/// Convert a pixel offset from the grid's left edge into a terminal column.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let col = (click_x / (grid_width / terminal_cols as f64)) as u16;
    (col < terminal_cols).then_some(col)
}
