//! Server-side sessions keyed by an opaque cookie token.
//!
//! The browser only ever holds a random token; username, uploaded document
//! text and chat history live in [`SessionStore`]. Sessions expire after a
//! configurable idle period and are evicted lazily on access or in bulk via
//! [`SessionStore::purge_expired`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;
use tracing::{debug, warn};

use docchat_core::types::ChatExchange;

use crate::state::AppState;

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// Per-client attributes.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub username: Option<String>,
    pub file_text: Option<String>,
    pub history: Vec<ChatExchange>,
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

/// In-memory session table with idle expiry.
#[derive(Debug)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
    max_history: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_history: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_history,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        // behind, so a poisoned map is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` against a live session without creating one.
    fn read<R>(&self, token: &str, f: impl FnOnce(&SessionData) -> R) -> Option<R> {
        let mut entries = self.lock();
        let expired = match entries.get_mut(token) {
            None => return None,
            Some(entry) if entry.last_seen.elapsed() > self.ttl => true,
            Some(entry) => {
                entry.last_seen = Instant::now();
                return Some(f(&entry.data));
            }
        };
        if expired {
            entries.remove(token);
            debug!("Evicted expired session");
        }
        None
    }

    /// Run `f` against the session for `token`, creating it if needed.
    fn write<R>(&self, token: &str, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut entries = self.lock();
        let now = Instant::now();
        let entry = entries
            .entry(token.to_string())
            .or_insert_with(|| SessionEntry {
                data: SessionData::default(),
                last_seen: now,
            });
        if now.duration_since(entry.last_seen) > self.ttl {
            entry.data = SessionData::default();
        }
        entry.last_seen = now;
        f(&mut entry.data)
    }

    /// Whether `token` names a live session.
    pub fn contains(&self, token: &str) -> bool {
        self.read(token, |_| ()).is_some()
    }

    pub fn username(&self, token: &str) -> Option<String> {
        self.read(token, |s| s.username.clone()).flatten()
    }

    pub fn set_username(&self, token: &str, username: String) {
        self.write(token, |s| s.username = Some(username));
    }

    /// Remove the username from an existing session. Does nothing for an
    /// unknown token.
    pub fn clear_username(&self, token: &str) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(token) {
            entry.data.username = None;
            entry.last_seen = Instant::now();
        }
    }

    pub fn file_text(&self, token: &str) -> Option<String> {
        self.read(token, |s| s.file_text.clone()).flatten()
    }

    /// Replace the stored document text.
    pub fn set_file_text(&self, token: &str, text: String) {
        self.write(token, |s| s.file_text = Some(text));
    }

    pub fn history(&self, token: &str) -> Vec<ChatExchange> {
        self.read(token, |s| s.history.clone()).unwrap_or_default()
    }

    /// Append an exchange, keeping only the newest `max_history` entries.
    pub fn push_exchange(&self, token: &str, exchange: ChatExchange) {
        let max = self.max_history;
        self.write(token, |s| {
            s.history.push(exchange);
            if s.history.len() > max {
                let excess = s.history.len() - max;
                s.history.drain(..excess);
            }
        });
    }

    pub fn clear_history(&self, token: &str) {
        self.write(token, |s| s.history.clear());
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() <= self.ttl);
        before - entries.len()
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to the caller's session, inserted into request extensions by
/// [`session_middleware`].
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    store: Arc<SessionStore>,
}

impl Session {
    pub fn new(token: String, store: Arc<SessionStore>) -> Self {
        Self { token, store }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> Option<String> {
        self.store.username(&self.token)
    }

    pub fn set_username(&self, username: String) {
        self.store.set_username(&self.token, username);
    }

    pub fn clear_username(&self) {
        self.store.clear_username(&self.token);
    }

    pub fn file_text(&self) -> Option<String> {
        self.store.file_text(&self.token)
    }

    pub fn set_file_text(&self, text: String) {
        self.store.set_file_text(&self.token, text);
    }

    pub fn history(&self) -> Vec<ChatExchange> {
        self.store.history(&self.token)
    }

    pub fn push_exchange(&self, exchange: ChatExchange) {
        self.store.push_exchange(&self.token, exchange);
    }

    pub fn clear_history(&self) {
        self.store.clear_history(&self.token);
    }
}

/// Extract the value of cookie `name` from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Middleware that resolves the session token for every request.
///
/// A request without a valid token gets a fresh one; the cookie is only
/// issued if the handler actually stored something under it.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let existing = cookie_value(req.headers(), &cookie_name)
        .filter(|token| state.sessions.contains(token));

    let (token, is_new) = match existing {
        Some(token) => (token, false),
        None => (generate_token(), true),
    };

    req.extensions_mut()
        .insert(Session::new(token.clone(), Arc::clone(&state.sessions)));

    let mut response = next.run(req).await;

    if is_new && state.sessions.contains(&token) {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, token);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
                debug!("Issued new session cookie");
            }
            Err(e) => warn!(error = %e, "Failed to encode session cookie"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60), 3)
    }

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_reads_do_not_create_sessions() {
        let store = store();
        assert_eq!(store.username("t"), None);
        assert!(store.history("t").is_empty());
        store.clear_username("t");
        assert!(store.is_empty());
    }

    #[test]
    fn test_username_roundtrip_and_logout() {
        let store = store();
        store.set_username("t", "alice".to_string());
        assert_eq!(store.username("t").as_deref(), Some("alice"));
        assert_eq!(store.username("other"), None);

        store.clear_username("t");
        assert_eq!(store.username("t"), None);
        store.clear_username("t");
        assert!(store.contains("t"));
    }

    #[test]
    fn test_file_text_is_replaced() {
        let store = store();
        store.set_file_text("t", "first".to_string());
        store.set_file_text("t", "second".to_string());
        assert_eq!(store.file_text("t").as_deref(), Some("second"));
    }

    #[test]
    fn test_history_is_bounded() {
        let store = store();
        for i in 0..5 {
            store.push_exchange("t", ChatExchange::new(format!("q{}", i), "a"));
        }
        let history = store.history("t");
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].user, "q2");
        assert_eq!(history[2].user, "q4");

        store.clear_history("t");
        assert!(store.history("t").is_empty());
    }

    #[test]
    fn test_expired_sessions_are_evicted() {
        let store = SessionStore::new(Duration::ZERO, 10);
        store.set_username("a", "alice".to_string());
        store.set_username("b", "bob".to_string());
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.username("a"), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; docchat_session=abc123; other=x"),
        );
        assert_eq!(
            cookie_value(&headers, "docchat_session").as_deref(),
            Some("abc123")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), "docchat_session"), None);
    }
}
