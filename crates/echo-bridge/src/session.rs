//! Popup session state.
//!
//! One `PopupSession` exists per popup open. It owns the flags the popup UI
//! reads (recording, insert in flight) and the report text waiting to be
//! inserted. Opening creates a fresh session; closing resets it.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BridgeError;

#[derive(Debug, Clone)]
pub struct PopupSession {
    /// Unique identifier for this popup open.
    pub id: Uuid,
    /// When the popup was opened.
    pub opened_at: DateTime<Utc>,
    recording: bool,
    busy: bool,
    report: Option<String>,
}

impl PopupSession {
    /// Start a session for a freshly opened popup.
    pub fn open() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
            recording: false,
            busy: false,
            report: None,
        };
        info!(session_id = %session.id, "Popup session opened");
        session
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether an insert request is in flight. The insert trigger stays
    /// disabled while this is true.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn start_recording(&mut self) -> Result<(), BridgeError> {
        if self.recording {
            return Err(BridgeError::Session("already recording".to_string()));
        }
        self.recording = true;
        debug!(session_id = %self.id, "Recording started");
        Ok(())
    }

    pub fn stop_recording(&mut self) {
        if self.recording {
            self.recording = false;
            debug!(session_id = %self.id, "Recording stopped");
        }
    }

    /// Replace the report waiting to be inserted.
    pub fn set_report(&mut self, text: impl Into<String>) {
        self.report = Some(text.into());
    }

    pub fn clear_report(&mut self) {
        self.report = None;
    }

    /// Mark an insert as in flight and hand back the text to send.
    ///
    /// Fails while another insert is in flight or when there is no report.
    pub fn begin_insert(&mut self) -> Result<String, BridgeError> {
        if self.busy {
            return Err(BridgeError::Session(
                "an insert is already in progress".to_string(),
            ));
        }
        let text = self
            .report
            .clone()
            .ok_or_else(|| BridgeError::Session("no report to insert".to_string()))?;
        self.busy = true;
        Ok(text)
    }

    /// Re-enable the insert trigger.
    pub fn finish_insert(&mut self) {
        self.busy = false;
    }

    /// Seconds since the popup was opened.
    pub fn elapsed_secs(&self) -> f32 {
        let elapsed = Utc::now() - self.opened_at;
        elapsed.num_milliseconds() as f32 / 1000.0
    }

    /// Reset every flag and drop the report, as when the popup closes.
    pub fn close(&mut self) {
        info!(
            session_id = %self.id,
            elapsed_secs = self.elapsed_secs(),
            "Popup session closed"
        );
        self.recording = false;
        self.busy = false;
        self.report = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_starts_idle() {
        let session = PopupSession::open();
        assert!(!session.is_recording());
        assert!(!session.is_busy());
        assert!(session.report().is_none());
        assert!(session.elapsed_secs() >= 0.0);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(PopupSession::open().id, PopupSession::open().id);
    }

    #[test]
    fn test_recording_toggle() {
        let mut session = PopupSession::open();
        session.start_recording().unwrap();
        assert!(session.is_recording());
        assert!(session.start_recording().is_err());

        session.stop_recording();
        assert!(!session.is_recording());
        session.start_recording().unwrap();
    }

    #[test]
    fn test_begin_insert_requires_report() {
        let mut session = PopupSession::open();
        let err = session.begin_insert().unwrap_err();
        assert!(matches!(err, BridgeError::Session(_)));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_begin_insert_refuses_while_busy() {
        let mut session = PopupSession::open();
        session.set_report("Nodule 1");

        assert_eq!(session.begin_insert().unwrap(), "Nodule 1");
        assert!(session.is_busy());
        assert!(session.begin_insert().is_err());

        session.finish_insert();
        assert!(!session.is_busy());
        assert_eq!(session.begin_insert().unwrap(), "Nodule 1");
    }

    #[test]
    fn test_report_survives_insert() {
        let mut session = PopupSession::open();
        session.set_report("first");
        session.begin_insert().unwrap();
        session.finish_insert();
        assert_eq!(session.report(), Some("first"));

        session.set_report("second");
        assert_eq!(session.report(), Some("second"));
        session.clear_report();
        assert!(session.report().is_none());
    }

    #[test]
    fn test_close_resets_everything() {
        let mut session = PopupSession::open();
        session.start_recording().unwrap();
        session.set_report("text");
        session.begin_insert().unwrap();

        session.close();

        assert!(!session.is_recording());
        assert!(!session.is_busy());
        assert!(session.report().is_none());
    }
}
