//! Scripted sessions for tests
//!
//! These implementations of [`DeviceSession`] and [`SessionConnector`] never
//! touch the network. Replies are configured per method and every call is
//! recorded, so tests can assert on exactly what would have been sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::session::{DeviceSession, SessionConnector};
use crate::{ApiError, Result};

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, Value>,
    failure: Option<ApiError>,
    calls: Vec<(String, Value)>,
    closed: bool,
}

/// A shared, scriptable in-memory device session
///
/// Clones share the same script, so a test can keep one handle while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSession {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSession {
    /// A session that answers like a healthy gateway with the radio paused
    pub fn new() -> Self {
        let session = Self::default();
        session.respond_with(
            "miIO.info",
            json!({
                "model": "lumi.gateway.v3",
                "fw_ver": "1.4.1_164",
                "hw_ver": "MW300",
                "mac": "34:CE:00:AA:BB:CC"
            }),
        );
        session.respond_with(
            "get_prop_fm",
            json!({ "current_volume": 10, "current_status": "pause" }),
        );
        session
    }

    /// Reply to `method` with `result` from now on
    pub fn respond_with(&self, method: &str, result: Value) {
        self.lock().replies.insert(method.to_string(), result);
    }

    /// Fail every call with `error` until [`recover`](Self::recover) is called
    pub fn fail_with(&self, error: ApiError) {
        self.lock().failure = Some(error);
    }

    /// Stop failing calls
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// All calls seen so far, as (method, params)
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.lock().calls.clone()
    }

    /// Params of the most recent call to `method`
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DeviceSession for ScriptedSession {
    fn send(&mut self, method: &str, params: Value) -> Result<Value> {
        let mut script = self.lock();
        script.calls.push((method.to_string(), params));

        if script.closed {
            return Err(ApiError::SessionClosed);
        }
        if let Some(error) = &script.failure {
            return Err(error.clone());
        }

        Ok(script
            .replies
            .get(method)
            .cloned()
            .unwrap_or_else(|| json!(["ok"])))
    }

    fn close(&mut self) {
        self.lock().closed = true;
    }
}

/// Connector handing out clones of one [`ScriptedSession`]
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    session: ScriptedSession,
    open_failure: Arc<Mutex<Option<ApiError>>>,
    opened: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedConnector {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    /// Make `open` fail with `error`
    pub fn fail_open_with(&self, error: ApiError) {
        *self.open_failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }

    /// (host, token) pairs passed to `open`
    pub fn opened(&self) -> Vec<(String, String)> {
        self.opened.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn session(&self) -> &ScriptedSession {
        &self.session
    }
}

impl SessionConnector for ScriptedConnector {
    fn open(&self, host: &str, token: &str) -> Result<Box<dyn DeviceSession>> {
        self.opened
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((host.to_string(), token.to_string()));

        if let Some(error) = self.open_failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(error);
        }
        Ok(Box::new(self.session.clone()))
    }
}
