//! In-memory conversion session.
//!
//! Holds the transcript between an extraction and the exports that follow
//! it, and serialises extractions so only one file is processed at a time.
//! Front ends call [`Session::begin_extraction`], run the extractor with the
//! returned signal, then hand the outcome to [`Session::finish_extraction`].

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::export::{export, ExportBlob, ExportFormat, ExportOptions};
use crate::extract::AbortSignal;

/// Observable state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing extracted yet.
    Empty,
    /// An extraction is in flight.
    Extracting,
    /// A transcript is available.
    Ready,
    /// The last extraction failed.
    Failed(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Empty => "empty",
            SessionState::Extracting => "extracting",
            SessionState::Ready => "ready",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// State restored when an extraction is cancelled.
#[derive(Debug)]
struct Snapshot {
    state: SessionState,
    transcript: String,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    transcript: String,
    signal: Option<AbortSignal>,
    previous: Option<Snapshot>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Empty,
            transcript: String::new(),
            signal: None,
            previous: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Extracting
    }

    /// Error message of the last failed extraction.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Mark an extraction as started. Fails while another one is in flight.
    pub fn begin_extraction(&mut self) -> Result<AbortSignal> {
        if self.is_busy() {
            return Err(ConvertError::Busy);
        }

        let signal = AbortSignal::new();
        self.previous = Some(Snapshot {
            state: std::mem::replace(&mut self.state, SessionState::Extracting),
            transcript: self.transcript.clone(),
        });
        self.signal = Some(signal.clone());
        debug!("Extraction started");
        Ok(signal)
    }

    /// Record the outcome of the in-flight extraction.
    ///
    /// A cancelled run restores the state that preceded it. Any other failure
    /// clears the transcript and keeps the error message for display.
    pub fn finish_extraction(&mut self, outcome: Result<String>) {
        let previous = self.previous.take();
        self.signal = None;

        match outcome {
            Ok(transcript) => {
                debug!("Extraction finished: {} chars", transcript.len());
                self.transcript = transcript;
                self.state = SessionState::Ready;
            }
            Err(ConvertError::Cancelled) => {
                debug!("Extraction cancelled");
                match previous {
                    Some(snapshot) => {
                        self.state = snapshot.state;
                        self.transcript = snapshot.transcript;
                    }
                    None => self.state = SessionState::Empty,
                }
            }
            Err(e) => {
                warn!("Error processing PDF: {}", e);
                self.transcript.clear();
                self.state = SessionState::Failed(e.to_string());
            }
        }
    }

    /// Abort the in-flight extraction, if any.
    pub fn cancel(&self) -> bool {
        match &self.signal {
            Some(signal) => {
                signal.abort();
                true
            }
            None => false,
        }
    }

    /// Replace the transcript with user-edited text.
    pub fn set_transcript(&mut self, text: impl Into<String>) -> Result<()> {
        if self.is_busy() {
            return Err(ConvertError::Busy);
        }
        self.transcript = text.into();
        if self.state == SessionState::Empty {
            self.state = SessionState::Ready;
        }
        Ok(())
    }

    /// Clear the transcript and any error.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_busy() {
            return Err(ConvertError::Busy);
        }
        self.transcript.clear();
        self.state = SessionState::Empty;
        Ok(())
    }

    /// Export the current transcript. `None` when there is nothing to export.
    pub fn export(&self, format: ExportFormat, options: &ExportOptions) -> Option<ExportBlob> {
        if self.is_busy() || self.transcript.is_empty() {
            return None;
        }
        Some(export(&self.transcript, format, options))
    }
}
