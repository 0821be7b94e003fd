mod console;
mod input;
mod planner;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use planner::logic::Notice;
use planner::share::{BrowserClipboard, BrowserLocation};
use planner::PlannerApp;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let col = pixel_x_to_col(click_x, rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(click_y, rect.height(), cs.terminal_rows)?;
    log::debug!("click: ({mouse_x}, {mouse_y}) -> cell ({col}, {row})");
    Some((col, row))
}

fn key_to_input(code: &KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Char(c) => Some(InputEvent::Key(*c)),
        KeyCode::Enter => Some(InputEvent::Submit),
        KeyCode::Backspace => Some(InputEvent::Erase),
        KeyCode::Tab => Some(InputEvent::NextField),
        KeyCode::Esc => Some(InputEvent::Cancel),
        _ => None,
    }
}

fn show_alerts(alerts: Vec<Notice>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    for notice in alerts {
        if window.alert_with_message(&notice.to_string()).is_err() {
            log::warn!("alert failed: {notice}");
        }
    }
}

fn dispatch(app: &Rc<RefCell<PlannerApp>>, event: InputEvent) {
    let alerts = {
        let mut app = app.borrow_mut();
        app.handle_input(&event);
        app.take_alerts()
    };
    // `alert` blocks, so the app must not be borrowed while it is open.
    show_alerts(alerts);
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    console::init();

    let app = Rc::new(RefCell::new(PlannerApp::new(
        Box::new(BrowserLocation),
        Box::new(BrowserClipboard),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(id) = action {
                dispatch(&app, InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            if let Some(event) = key_to_input(&key_event.code) {
                dispatch(&app, event);
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            let alerts = {
                let mut app = app.borrow_mut();
                app.render(f, size, &click_state);
                // Clipboard confirmations arrive between frames.
                app.take_alerts()
            };
            show_alerts(alerts);
        }
    });

    Ok(())
}
