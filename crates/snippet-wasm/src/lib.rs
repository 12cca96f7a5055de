//! The snippet runner as a WASM module for browser environments.
//!
//! This crate exposes the execution engine via `wasm-bindgen`, suitable for
//! running inside a Web Worker next to an editor.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { Session } from 'snippet-wasm';
//!
//! await init();
//!
//! const session = new Session();
//! const report = session.run("console.log('hi'); 1 + 1", "shared");
//! // { events: [{ type: "set_error_state", value: false },
//! //            { type: "write_line", value: "hi" },
//! //            { type: "write_line", value: "2" }],
//! //   outcome: { status: "success", output: "2" } }
//! ```

use std::cell::RefCell;

use serde::Serialize;
use snippet_eval::{
    Engine, EngineConfig, ExecutionOutcome, ExecutionRequest, OutputEvent, ScopeMode, Transcript,
};
use wasm_bindgen::prelude::*;

/// Everything one run reported, in order.
#[derive(Debug, Serialize)]
struct RunReport {
    events: Vec<OutputEvent>,
    outcome: ExecutionOutcome,
}

/// A persistent engine. Shared-scope declarations survive between runs of
/// the same session.
#[wasm_bindgen]
pub struct Session {
    engine: Engine,
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Session {
        Session {
            engine: Engine::new(),
        }
    }

    /// A session configured from a JSON `EngineConfig` document.
    pub fn with_config(config_json: &str) -> Result<Session, JsError> {
        let config = EngineConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Session {
            engine: Engine::with_config(config),
        })
    }

    /// Run `source` in `scope` (`"shared"` or `"isolated"`) and return the
    /// report as a JS object.
    pub fn run(&mut self, source: &str, scope: &str) -> Result<JsValue, JsError> {
        let report = self.report(source, scope).map_err(|e| JsError::new(&e))?;
        serde_wasm_bindgen::to_value(&report).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Like [`Session::run`], but returns the report as a JSON string.
    pub fn run_json(&mut self, source: &str, scope: &str) -> Result<String, JsError> {
        let report = self.report(source, scope).map_err(|e| JsError::new(&e))?;
        serde_json::to_string(&report).map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Session {
    fn report(&mut self, source: &str, scope: &str) -> Result<RunReport, String> {
        let scope_mode = scope.parse::<ScopeMode>().map_err(|e| e.to_string())?;
        let mut transcript = Transcript::new();
        let outcome = self
            .engine
            .execute(&ExecutionRequest::new(source, scope_mode), &mut transcript);
        Ok(RunReport {
            events: transcript.events,
            outcome,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static DEFAULT_SESSION: RefCell<Session> = RefCell::new(Session::new());
}

/// Run `source` on the module's default session and return the report as a
/// JSON string.
///
/// ```json
/// {
///   "events": [{ "type": "set_error_state", "value": false },
///              { "type": "write_line", "value": "4" }],
///   "outcome": { "status": "success", "output": "4" }
/// }
/// ```
#[wasm_bindgen]
pub fn run_snippet(source: &str, scope: &str) -> Result<String, JsError> {
    DEFAULT_SESSION.with(|session| session.borrow_mut().run_json(source, scope))
}

/// Return the runner version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_events_and_outcome() {
        let mut session = Session::new();
        let report = session.report("console.warn('w'); 2 + 2", "shared").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "events": [
                    { "type": "set_error_state", "value": false },
                    { "type": "write_line", "value": "WARN: w" },
                    { "type": "write_line", "value": "4" }
                ],
                "outcome": { "status": "success", "output": "4" }
            })
        );
    }

    #[test]
    fn test_session_keeps_shared_state() {
        let mut session = Session::new();
        session.report("var kept = 'yes';", "shared").unwrap();
        let report = session.report("kept", "isolated").unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::Success(Some("yes".into())));
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let mut session = Session::new();
        let err = session.report("1", "sandbox").unwrap_err();
        assert!(err.contains("unknown scope mode 'sandbox'"));
    }

    #[test]
    fn test_failure_report() {
        let mut session = Session::new();
        let report = session.report("throw new Error('x')", "isolated").unwrap();
        assert!(report.outcome.is_failure());
        assert_eq!(report.events[1], OutputEvent::SetErrorState(true));
    }
}
