//! Shareable links.
//!
//! ## Token format
//!
//! `base64url( {"version": N, "state": SimulationState} )` without padding,
//! so the token can sit in a query string as-is.
//!
//! - `SAVE_VERSION`: bumped whenever a field is added.
//! - `MIN_COMPATIBLE_VERSION`: bumped only on breaking changes (a field
//!   removed or its meaning changed). Payloads at or above it load with
//!   missing fields filled from defaults.
//!
//! Older links carried the state as plain JSON in the query string, with
//! the log as rendered text. Those still load; see [`decode_state`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::logic::Notice;
use super::state::{LogEntry, LogPolicy, SimulationState};

/// Current token format version.
const SAVE_VERSION: u32 = 1;

/// Oldest token format that still decodes.
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Query parameter holding the share token.
pub const SHARE_PARAM: &str = "state";

/// Query parameter selecting the log policy (`raw` keeps every advance).
pub const LOG_PARAM: &str = "log";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("token is not a valid state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token version {found} is older than the oldest supported version {min}")]
    IncompatibleVersion { found: u32, min: u32 },
}

#[derive(Serialize)]
struct SaveRef<'a> {
    version: u32,
    state: &'a SimulationState,
}

#[derive(Deserialize)]
struct SaveData {
    version: u32,
    #[serde(default)]
    state: SimulationState,
}

/// Plain-JSON shape of older links: same fields, log kept as text.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyState {
    res_per_hour: f64,
    cp_per_day: f64,
    current_cp: f64,
    current_res: f64,
    hours_since_start: f64,
    last_party_time: Option<f64>,
    action_log: Vec<String>,
}

impl Default for LegacyState {
    fn default() -> Self {
        let d = SimulationState::new();
        Self {
            res_per_hour: d.res_per_hour,
            cp_per_day: d.cp_per_day,
            current_cp: d.current_cp,
            current_res: d.current_res,
            hours_since_start: d.hours_since_start,
            last_party_time: d.last_party_time,
            action_log: Vec::new(),
        }
    }
}

impl From<LegacyState> for SimulationState {
    fn from(legacy: LegacyState) -> Self {
        Self {
            res_per_hour: legacy.res_per_hour,
            cp_per_day: legacy.cp_per_day,
            current_cp: legacy.current_cp,
            current_res: legacy.current_res,
            hours_since_start: legacy.hours_since_start,
            last_party_time: legacy.last_party_time,
            action_log: legacy
                .action_log
                .iter()
                .map(|text| parse_log_text(text))
                .collect(),
        }
    }
}

/// Encode the full state as a URL-safe token.
pub fn encode_state(state: &SimulationState) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(&SaveRef {
        version: SAVE_VERSION,
        state,
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token produced by [`encode_state`], or the plain JSON of an
/// older link.
pub fn decode_state(token: &str) -> Result<SimulationState, DecodeError> {
    let token = token.trim();
    if token.starts_with('{') {
        let legacy: LegacyState = serde_json::from_str(token)?;
        return Ok(legacy.into());
    }

    let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('='))?;
    let json = String::from_utf8(bytes)?;
    let save: SaveData = serde_json::from_str(&json)?;

    if save.version < MIN_COMPATIBLE_VERSION {
        return Err(DecodeError::IncompatibleVersion {
            found: save.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if save.version > SAVE_VERSION {
        log::info!(
            "share token from a newer version (token={}, current={}), unknown fields ignored",
            save.version,
            SAVE_VERSION
        );
    }
    Ok(save.state)
}

/// Recover a typed entry from the text an older link stored.
/// Unrecognized wording is kept verbatim as a note.
fn parse_log_text(text: &str) -> LogEntry {
    parse_known_log_text(text).unwrap_or_else(|| LogEntry::Note {
        text: text.to_string(),
    })
}

fn parse_known_log_text(text: &str) -> Option<LogEntry> {
    if let Some(rest) = text.strip_prefix("⏩ Advanced ") {
        let (hours, rest) = rest.split_once("h: +")?;
        let (res, rest) = rest.split_once(" res, +")?;
        let cp = rest.strip_suffix(" CP")?;
        return Some(LogEntry::Advanced {
            hours: hours.parse().ok()?,
            res: res.parse().ok()?,
            cp: cp.parse().ok()?,
        });
    }
    if let Some(rest) = text.strip_prefix("🎉 [") {
        let (hour, rest) = rest.split_once("h] Ran party: -")?;
        let (cost, rest) = rest.split_once(" res, +")?;
        let cp = rest.strip_suffix(" CP")?;
        return Some(LogEntry::Partied {
            at_hour: hour.parse().ok()?,
            cost: cost.parse().ok()?,
            cp_gained: cp.parse().ok()?,
        });
    }
    if let Some(rest) = text.strip_prefix("❌ [") {
        let hour = rest.strip_suffix("h] Not enough resources to run a party.")?;
        return Some(LogEntry::PartyFailed {
            at_hour: hour.parse().ok()?,
        });
    }
    if let Some(rest) = text.strip_prefix("🏗️ Built \"") {
        let (name, rest) = rest.rsplit_once("\": -")?;
        let (cost, rest) = rest.split_once(" res, +")?;
        let bonus = rest.strip_suffix(" CP/day")?;
        return Some(LogEntry::Built {
            name: name.to_string(),
            cost: cost.parse().ok()?,
            cp_bonus: bonus.parse().ok()?,
        });
    }
    if let Some(rest) = text.strip_prefix("➕ Added ") {
        if let Some(amount) = rest.strip_suffix(" resources") {
            return Some(LogEntry::AddedResources {
                amount: amount.parse().ok()?,
            });
        }
        let amount = rest.strip_suffix(" CP")?;
        return Some(LogEntry::AddedCp {
            amount: amount.parse().ok()?,
        });
    }
    None
}

// ── Ports ───────────────────────────────────────────────────────

/// Read access to the page address.
pub trait LocationPort {
    /// Scheme, host and port, e.g. `https://example.org`.
    fn origin(&self) -> String;
    /// Path of the page, e.g. `/planner/`.
    fn pathname(&self) -> String;
    /// Value of a query parameter, already percent-decoded.
    fn query_param(&self, name: &str) -> Option<String>;
}

/// Write access to the system clipboard.
pub trait ClipboardPort {
    /// Start writing `text`; `on_done` runs once the write succeeded.
    fn write_text(&self, text: &str, on_done: Box<dyn FnOnce()>);
}

/// What the page starts from.
#[derive(Debug, PartialEq)]
pub struct Startup {
    pub state: SimulationState,
    pub log_policy: LogPolicy,
    /// Whether the state came from a link rather than defaults.
    pub from_link: bool,
}

/// Build the start-up state from the page address.
///
/// A broken token is logged and ignored; start-up never fails.
pub fn load_from_location(location: &dyn LocationPort) -> Startup {
    let log_policy = match location.query_param(LOG_PARAM).as_deref() {
        Some("raw") => LogPolicy::Keep,
        _ => LogPolicy::Collapse,
    };

    let (state, from_link) = match location.query_param(SHARE_PARAM) {
        Some(token) if !token.is_empty() => match decode_state(&token) {
            Ok(state) => {
                log::info!("loaded shared state ({} log entries)", state.action_log.len());
                (state, true)
            }
            Err(e) => {
                log::warn!("invalid state in URL, starting from defaults: {e}");
                (SimulationState::new(), false)
            }
        },
        _ => (SimulationState::new(), false),
    };

    Startup {
        state,
        log_policy,
        from_link,
    }
}

/// Full link that reopens the planner at `state`.
pub fn shareable_link(
    location: &dyn LocationPort,
    state: &SimulationState,
) -> Result<String, serde_json::Error> {
    let token = encode_state(state)?;
    Ok(format!(
        "{}{}?{}={}",
        location.origin(),
        location.pathname(),
        SHARE_PARAM,
        token
    ))
}

/// Copy the share link to the clipboard; `on_copied` receives the
/// confirmation notice once the write lands.
pub fn copy_shareable_link(
    location: &dyn LocationPort,
    clipboard: &dyn ClipboardPort,
    state: &SimulationState,
    on_copied: Box<dyn FnOnce(Notice)>,
) {
    match shareable_link(location, state) {
        Ok(url) => clipboard.write_text(&url, Box::new(move || on_copied(Notice::LinkCopied))),
        Err(e) => log::error!("could not encode state for sharing: {e}"),
    }
}

// ── Browser implementations ─────────────────────────────────────

pub use browser::{BrowserClipboard, BrowserLocation};

mod browser {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsValue;

    use super::{ClipboardPort, LocationPort};

    pub struct BrowserLocation;

    impl LocationPort for BrowserLocation {
        fn origin(&self) -> String {
            web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_default()
        }

        fn pathname(&self) -> String {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_default()
        }

        fn query_param(&self, name: &str) -> Option<String> {
            let search = web_sys::window()?.location().search().ok()?;
            web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(name)
        }
    }

    pub struct BrowserClipboard;

    impl ClipboardPort for BrowserClipboard {
        fn write_text(&self, text: &str, on_done: Box<dyn FnOnce()>) {
            let Some(window) = web_sys::window() else {
                log::warn!("no window; clipboard unavailable");
                return;
            };
            let promise: js_sys::Promise = window.navigator().clipboard().write_text(text);
            let on_ok = Closure::once(move |_: JsValue| on_done());
            let on_err = Closure::once(|e: JsValue| {
                log::warn!("clipboard write failed: {e:?}");
            });
            // Both closures must outlive the promise. They are leaked on
            // purpose: two small closures per copy, and copies only happen
            // when the user asks for a link.
            let _ = promise.then2(&on_ok, &on_err);
            on_ok.forget();
            on_err.forget();
        }
    }
}
