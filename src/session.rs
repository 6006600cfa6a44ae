use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::BoardError;
use crate::model::Ms;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Persisted session keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub auth_token: String,
    pub user_info: UserProfile,
    /// Token expiry in Unix ms; `None` means the service did not say.
    #[serde(default)]
    pub expires_at: Option<Ms>,
}

impl AuthState {
    pub fn is_expired(&self, now: Ms) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

/// Navigation requests raised outside the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    Home,
}

/// Explicit auth state backed by a session file.
///
/// Redirects are sent through the navigator channel handed in at
/// construction; a dropped receiver is ignored.
pub struct Session {
    path: PathBuf,
    state: Option<AuthState>,
    navigator: Option<mpsc::UnboundedSender<Redirect>>,
}

impl Session {
    pub fn new(path: PathBuf, navigator: Option<mpsc::UnboundedSender<Redirect>>) -> Self {
        Self {
            path,
            state: None,
            navigator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<&AuthState> {
        self.state.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.auth_token.as_str())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.as_ref().map(|s| &s.user_info)
    }

    /// Read the session file. A missing file means logged out; an unreadable
    /// or expired session is cleared and redirects to login.
    pub fn load(&mut self, now: Ms) -> Result<Option<&AuthState>, BoardError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.state = None;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<AuthState>(&raw) {
            Ok(state) if state.is_expired(now) => {
                info!("session for {} expired", state.user_info.user_id);
                self.clear()?;
                Ok(None)
            }
            Ok(state) => {
                self.state = Some(state);
                Ok(self.state.as_ref())
            }
            Err(e) => {
                warn!("discarding unreadable session file {}: {e}", self.path.display());
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persist `state` and redirect home. Writes a temp file, fsyncs, then
    /// renames it over the old one.
    pub fn save(&mut self, state: AuthState) -> Result<(), BoardError> {
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &state)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        info!("session saved for {}", state.user_info.user_id);
        self.state = Some(state);
        self.navigate(Redirect::Home);
        Ok(())
    }

    /// Forget the session and redirect to login.
    pub fn clear(&mut self) -> Result<(), BoardError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.state = None;
        self.navigate(Redirect::Login);
        Ok(())
    }

    /// The current session, or a redirect to login if there is none.
    pub fn require(&mut self, now: Ms) -> Result<&AuthState, BoardError> {
        let expired = match &self.state {
            None => {
                self.navigate(Redirect::Login);
                return Err(BoardError::Session("not logged in".into()));
            }
            Some(state) => state.is_expired(now),
        };
        if expired {
            self.clear()?;
            return Err(BoardError::Session("session expired".into()));
        }
        self.state
            .as_ref()
            .ok_or_else(|| BoardError::Session("not logged in".into()))
    }

    fn navigate(&self, to: Redirect) {
        if let Some(tx) = &self.navigator {
            let _ = tx.send(to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("roomboard_test_session");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    fn state(expires_at: Option<Ms>) -> AuthState {
        AuthState {
            auth_token: "tok-123".into(),
            user_info: UserProfile {
                user_id: "alice".into(),
                display_name: "Alice".into(),
                department: Some("Engineering".into()),
            },
            expires_at,
        }
    }

    #[test]
    fn missing_file_is_logged_out() {
        let mut session = Session::new(tmp_path("missing.json"), None);
        assert!(session.load(0).unwrap().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn save_then_load() {
        let path = tmp_path("roundtrip.json");
        let mut session = Session::new(path.clone(), None);
        session.save(state(Some(10_000))).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let mut reloaded = Session::new(path, None);
        let loaded = reloaded.load(5_000).unwrap().unwrap();
        assert_eq!(loaded, &state(Some(10_000)));
        assert_eq!(reloaded.user().unwrap().display_name, "Alice");
    }

    #[test]
    fn persisted_keys_are_camel_case() {
        let json = serde_json::to_string(&state(None)).unwrap();
        assert!(json.contains("\"authToken\""));
        assert!(json.contains("\"userInfo\""));
        assert!(json.contains("\"displayName\""));
    }

    #[test]
    fn clear_removes_file_and_redirects() {
        let path = tmp_path("clear.json");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::new(path.clone(), Some(tx));
        session.save(state(None)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Redirect::Home);
        session.clear().unwrap();
        assert!(!path.exists());
        assert!(session.current().is_none());
        assert_eq!(rx.try_recv().unwrap(), Redirect::Login);
    }

    #[test]
    fn expired_session_is_cleared_on_load() {
        let path = tmp_path("expired.json");
        let (tx, mut rx) = mpsc::unbounded_channel();
        Session::new(path.clone(), None).save(state(Some(1_000))).unwrap();

        let mut session = Session::new(path.clone(), Some(tx));
        assert!(session.load(1_000).unwrap().is_none());
        assert!(!path.exists());
        assert_eq!(rx.try_recv().unwrap(), Redirect::Login);
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let path = tmp_path("corrupt.json");
        fs::write(&path, b"{not json").unwrap();
        let mut session = Session::new(path.clone(), None);
        assert!(session.load(0).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn require_redirects_when_logged_out() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::new(tmp_path("require.json"), Some(tx));
        assert!(matches!(session.require(0), Err(BoardError::Session(_))));
        assert_eq!(rx.try_recv().unwrap(), Redirect::Login);

        session.save(state(Some(100))).unwrap();
        assert_eq!(session.require(50).unwrap().auth_token, "tok-123");
        assert!(matches!(session.require(100), Err(BoardError::Session(_))));
        assert!(session.current().is_none());
    }

    #[test]
    fn dropped_navigator_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut session = Session::new(tmp_path("dropped.json"), Some(tx));
        session.clear().unwrap();
    }
}
