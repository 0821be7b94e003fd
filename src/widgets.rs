//! Clickable UI components.
//!
//! Each component renders and registers its own click targets, so the rows
//! a user sees and the rows that react to taps cannot drift apart.
//!
//! - [`TabBar`]: the Planner / Setup switch.
//! - [`ClickableList`]: vertical list with per-line click targets.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A single-row tab bar.
///
/// ```ignore
/// TabBar::new(" │ ")
///     .tab("Planner", style(0), TAB_PLANNER)
///     .tab("Setup", style(1), TAB_SETUP)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Padded label widths paired with their action IDs.
    fn tab_widths(&self) -> Vec<(u16, u16)> {
        self.tabs
            .iter()
            .map(|(label, _, id)| (Line::from(format!(" {} ", label)).width() as u16, *id))
            .collect()
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let tab_widths = self.tab_widths();

        let mut spans: Vec<Span> = Vec::new();
        for (i, (label, style, _)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.separator,
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::styled(format!(" {} ", label), *style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);

        // Full height for tap tolerance.
        cs.register_tab_targets(
            &tab_widths,
            sep_width,
            area.x,
            area.y,
            area.width,
            area.height.max(1),
        );
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines paired with the actions they trigger.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Party"));
/// cl.push_clickable(Line::from(" [P] Run party"), RUN_PARTY);
/// cl.register_targets(area, &mut cs, 1, 1);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a line that does nothing when tapped.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a line bound to `action_id`, wherever it ends up.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for all clickable lines, one row per line.
    ///
    /// * `top_offset` / `bottom_offset`: border rows around the content.
    ///   Lines past the bottom edge register nothing.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        for &(line_idx, action_id) in &self.actions {
            let row = content_y + line_idx;
            if row >= content_end {
                break;
            }
            cs.add_row_target(area, row, action_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::actions::{ADD_RESOURCES, BUILD, RUN_PARTY, TAB_PLANNER, TAB_SETUP};

    #[test]
    fn tab_widths_include_padding() {
        let bar = TabBar::new(" │ ")
            .tab("Planner", Style::default(), TAB_PLANNER)
            .tab("Setup", Style::default(), TAB_SETUP);
        assert_eq!(bar.tab_widths(), vec![(9, TAB_PLANNER), (7, TAB_SETUP)]);
    }

    #[test]
    fn clickable_rows_follow_line_positions() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("Party"));
        cl.push_clickable(Line::from(" [P] Run party"), RUN_PARTY);
        cl.push(Line::from(""));
        cl.push_clickable(Line::from(" [B] Build"), BUILD);

        let area = Rect::new(0, 5, 40, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(3, 7), Some(RUN_PARTY));
        assert_eq!(cs.hit_test(3, 9), Some(BUILD));
        assert_eq!(cs.hit_test(3, 6), None);
        assert_eq!(cs.hit_test(3, 8), None);
    }

    #[test]
    fn clipped_lines_register_nothing() {
        let mut cl = ClickableList::new();
        for i in 0..10u16 {
            cl.push_clickable(Line::from(format!("line {i}")), 50 + i);
        }
        let area = Rect::new(0, 0, 40, 5);
        let mut cs = ClickState::new();
        // 3 visible content rows between the borders.
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 1), Some(50));
        assert_eq!(cs.hit_test(0, 3), Some(52));
        assert_eq!(cs.hit_test(0, 4), None);
    }

    #[test]
    fn borderless_list_starts_at_the_top_row() {
        let mut cl = ClickableList::new();
        cl.push_clickable(Line::from(" [R] Add resources"), ADD_RESOURCES);
        cl.push_clickable(Line::from(" [B] Build"), BUILD);

        let area = Rect::new(4, 2, 20, 2);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 0);

        assert_eq!(cs.hit_test(4, 2), Some(ADD_RESOURCES));
        assert_eq!(cs.hit_test(23, 3), Some(BUILD));
        assert_eq!(cs.hit_test(3, 2), None);
    }

    #[test]
    fn into_lines_keeps_order() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("a"));
        cl.push_clickable(Line::from("b"), 1);
        let lines = cl.into_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "b");
    }
}
