//! CP Planner rendering: summary, actions, input fields, log, status bar.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::form::{current_text, Field};
use super::logic::{self, format_clock, format_number, Notice};
use super::state::{LogPolicy, ADVANCE_STEPS, PARTY_COST};
use super::{PlannerApp, View};

pub fn render(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(1), // tabs
            Constraint::Min(10),   // content
            Constraint::Length(3), // status
        ])
        .split(area);

    render_title(app, f, chunks[0]);
    render_tabs(app, f, chunks[1], click_state);
    match app.view {
        View::Planner => render_planner(app, f, chunks[2], click_state),
        View::Setup => render_setup(app, f, chunks[2], click_state),
    }
    render_status(app, f, chunks[3], click_state);
}

fn render_title(app: &PlannerApp, f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "CP Planner",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_clock(app.state.hours_since_start)),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let widget = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_tabs(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let style = |active: bool| {
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        }
    };
    let mut cs = click_state.borrow_mut();
    TabBar::new(" │ ")
        .tab("Planner", style(app.view == View::Planner), TAB_PLANNER)
        .tab("Setup", style(app.view == View::Setup), TAB_SETUP)
        .render(f, area, &mut cs);
}

// ── Planner view ────────────────────────────────────────────────

fn render_planner(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let (left, log_area) = if is_narrow_layout(area.width) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(24), Constraint::Length(8)])
            .split(area);
        (rows[0], rows[1])
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (cols[0], cols[1])
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),                          // summary
            Constraint::Length(actions_height(left.width)), // actions
            Constraint::Min(8),                             // fields
        ])
        .split(left);

    render_summary(app, f, sections[0]);
    render_actions(app, f, sections[1], click_state);
    render_fields(app, &Field::ACTIONS, FOCUS_ACTION_BASE, " Inputs ", f, sections[2], click_state);
    render_log(app, f, log_area);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {:<18}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn render_summary(app: &PlannerApp, f: &mut Frame, area: Rect) {
    let s = &app.state;

    if !app.submitted {
        let widget = Paragraph::new(Line::from(Span::styled(
            " Setup changed. Open Setup and press Enter to recalculate.",
            Style::default().fg(Color::Yellow),
        )))
        .block(summary_block())
        .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
        return;
    }

    let party = if logic::can_run_party(s) {
        if s.current_res >= PARTY_COST {
            ("ready".to_string(), Color::Green)
        } else {
            match logic::hours_until_party_affordable(s) {
                Some(h) => (format!("affordable in {h}h"), Color::Yellow),
                None => ("unaffordable".to_string(), Color::Red),
            }
        }
    } else {
        (
            format!("cooldown {}h", format_number(logic::next_party_available_in(s))),
            Color::Magenta,
        )
    };

    let lines = vec![
        stat_line("Resources", format_number(s.current_res), Color::Yellow),
        stat_line("Command points", format_number(s.current_cp), Color::Cyan),
        stat_line(
            "Rates",
            format!(
                "{} res/h · {} CP/day",
                format_number(s.res_per_hour),
                format_number(s.cp_per_day)
            ),
            Color::White,
        ),
        stat_line("Hours since start", format_number(s.hours_since_start), Color::White),
        stat_line("Party", party.0, party.1),
        stat_line(
            "Log",
            match app.policy {
                LogPolicy::Collapse => "collapsing advances".to_string(),
                LogPolicy::Keep => "raw".to_string(),
            },
            Color::DarkGray,
        ),
    ];
    f.render_widget(Paragraph::new(lines).block(summary_block()), area);
}

fn summary_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Summary ")
}

fn render_actions(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::White);
    let dim = Style::default().fg(Color::DarkGray);

    let mut entries: Vec<(Line<'static>, u16)> = Vec::new();
    for (i, hours) in ADVANCE_STEPS.iter().enumerate() {
        entries.push((
            Line::from(vec![
                Span::styled(format!(" [{}] ", i + 1), key),
                Span::styled(format!("Advance {hours}h"), text),
            ]),
            ADVANCE_STEP_BASE + i as u16,
        ));
    }
    entries.push((
        Line::from(vec![
            Span::styled(" [H] ", key),
            Span::styled(
                format!("Advance {}h (custom)", app.pending.advance_hours),
                text,
            ),
        ]),
        ADVANCE_CUSTOM,
    ));

    let party_style = if logic::can_run_party(&app.state) { text } else { dim };
    entries.push((
        Line::from(vec![
            Span::styled(" [P] ", key),
            Span::styled(format!("Run party (-{} res)", format_number(PARTY_COST)), party_style),
        ]),
        RUN_PARTY,
    ));
    entries.push((
        Line::from(vec![
            Span::styled(" [B] ", key),
            Span::styled(building_label(app), text),
        ]),
        BUILD,
    ));
    entries.push((
        Line::from(vec![
            Span::styled(" [R] ", key),
            Span::styled(
                format!("Add {} resources", app.pending.adjustments.resources),
                text,
            ),
        ]),
        ADD_RESOURCES,
    ));
    entries.push((
        Line::from(vec![
            Span::styled(" [C] ", key),
            Span::styled(format!("Add {} CP", app.pending.adjustments.cp), text),
        ]),
        ADD_CP,
    ));
    entries.push((
        Line::from(vec![
            Span::styled(" [S] ", key),
            Span::styled("Copy shareable link", text),
        ]),
        COPY_LINK,
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Actions ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns: Vec<Rect> = if actions_fit_two_columns(area.width) {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner)
            .to_vec()
    } else {
        vec![inner]
    };
    let per_column = entries.len().div_ceil(columns.len());

    let mut cs = click_state.borrow_mut();
    let mut entries = entries.into_iter();
    for col in columns {
        let mut cl = ClickableList::new();
        for (line, id) in entries.by_ref().take(per_column) {
            cl.push_clickable(line, id);
        }
        cl.register_targets(col, &mut cs, 0, 0);
        f.render_widget(Paragraph::new(cl.into_lines()), col);
    }
}

/// Eleven actions fit in two columns once each label has about 28 cells.
fn actions_fit_two_columns(width: u16) -> bool {
    width.saturating_sub(2) >= 56
}

/// Panel height for all actions, borders included.
fn actions_height(width: u16) -> u16 {
    let rows = ADVANCE_STEPS.len() as u16 + 6;
    if actions_fit_two_columns(width) {
        rows.div_ceil(2) + 2
    } else {
        rows + 2
    }
}

fn building_label(app: &PlannerApp) -> String {
    let b = &app.pending.building;
    let name = if b.name.is_empty() { "building" } else { b.name.as_str() };
    format!(
        "Build {} (-{} res, +{} CP/day)",
        name,
        format_number(b.res_cost),
        b.cp_bonus
    )
}

// ── Fields ──────────────────────────────────────────────────────

fn render_fields(
    app: &PlannerApp,
    fields: &[Field],
    focus_base: u16,
    title: &str,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    for field in fields {
        let focused = app.form.focus == Some(*field);
        let value = if focused {
            format!("{}▏", app.form.buffer)
        } else {
            current_text(*field, &app.state, &app.pending)
        };
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" {:<18}", field.label()), Style::default().fg(Color::Gray)),
                Span::styled(value, value_style),
            ]),
            focus_base + field.index() as u16,
        );
    }

    let hint = Style::default().fg(Color::DarkGray);
    cl.push(Line::from(""));
    if app.form.is_editing() {
        cl.push_clickable(Line::from(Span::styled(" Enter: save", hint)), COMMIT_FIELD);
        cl.push_clickable(Line::from(Span::styled(" Esc: cancel", hint)), CANCEL_FIELD);
    } else if app.view == View::Setup {
        cl.push_clickable(
            Line::from(Span::styled(
                " Enter: calculate",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            COMMIT_FIELD,
        );
    } else {
        cl.push(Line::from(Span::styled(" Tab or tap a field to edit", hint)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(title.to_string());
    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Setup view ──────────────────────────────────────────────────

fn render_setup(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(3)])
        .split(area);
    render_fields(app, &Field::SETUP, FOCUS_SETUP_BASE, " Setup ", f, rows[0], click_state);

    let help = Paragraph::new(vec![
        Line::from(" Enter your generation rates and current totals."),
        Line::from(" The summary updates once you calculate."),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: false });
    f.render_widget(help, rows[1]);
}

// ── Log & status ────────────────────────────────────────────────

fn render_log(app: &PlannerApp, f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = app
        .state
        .action_log
        .iter()
        .map(|entry| {
            let style = if entry.is_important() {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.to_string(), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(format!(" Log ({}) ", app.state.action_log.len()));
    let inner = block.inner(area);

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    // Keep the newest entry in view.
    let total = paragraph.line_count(inner.width) as u16;
    let scroll = total.saturating_sub(inner.height);
    f.render_widget(paragraph.scroll((scroll, 0)).block(block), area);
}

fn status_text(notice: &Notice) -> String {
    match notice.detail() {
        Some(detail) => format!("{notice} ({detail})  (Esc)"),
        None => format!("{notice}  (Esc)"),
    }
}

fn render_status(app: &PlannerApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let (text, style) = match &app.status {
        Some(notice) => (
            status_text(notice),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => (
            "Tab: next field · I: setup · S: share".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let widget = Paragraph::new(Line::from(Span::styled(text, style)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);

    if app.status.is_some() {
        let mut cs = click_state.borrow_mut();
        for row in area.y..area.y + area.height {
            cs.add_row_target(area, row, DISMISS_NOTICE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_panel_height_fits_every_action() {
        // 11 actions: one column needs 11 rows, two columns need 6.
        assert_eq!(actions_height(40), 13);
        assert!(!actions_fit_two_columns(57));
        assert!(actions_fit_two_columns(58));
        assert_eq!(actions_height(80), 8);
    }

    #[test]
    fn status_text_includes_shortfall() {
        let notice = Notice::BuildingUnaffordable {
            needed: 5000.0,
            available: 120.0,
        };
        assert_eq!(
            status_text(&notice),
            "Not enough resources to build. (need 5,000, have 120)  (Esc)"
        );
        assert_eq!(status_text(&Notice::LinkCopied), "Link copied to clipboard!  (Esc)");
    }
}
