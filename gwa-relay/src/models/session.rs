//! Assessment workflow state machine
//!
//! A session progresses through 4 defined states:
//! AWAITING_IMAGE → AWAITING_REPORT → AWAITING_VERDICT → DONE
//!
//! Each transition is one-directional and requires the payload produced by
//! its triggering operation; a transition attempted from the wrong state or
//! with an empty payload is rejected and the state is held, so a failed
//! upstream call can be retried indefinitely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Assessment workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Waiting for the ad image upload and its model analysis
    AwaitingImage,
    /// Waiting for the company report upload and text extraction
    AwaitingReport,
    /// Waiting for the combined verdict synthesis
    AwaitingVerdict,
    /// Assessment finished; no further transition possible
    Done,
}

impl WorkflowState {
    /// 1-based step number as shown in the workflow UI
    pub fn step(&self) -> u8 {
        match self {
            WorkflowState::AwaitingImage => 1,
            WorkflowState::AwaitingReport => 2,
            WorkflowState::AwaitingVerdict => 3,
            WorkflowState::Done => 4,
        }
    }
}

/// Structured result of the image-analysis step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisRecord {
    /// Company named in the advertisement
    #[serde(rename = "companyName")]
    pub company_name: String,
    /// Free-text greenwashing analysis of the ad
    pub analysis: String,
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: WorkflowState,
    pub new_state: WorkflowState,
    pub transitioned_at: DateTime<Utc>,
}

/// Errors rejecting an invalid transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Operation attempted from a state that does not allow it
    #[error("Workflow is at step {actual_step} ({actual:?}); this operation requires step {expected_step} ({expected:?})")]
    WrongState {
        expected: WorkflowState,
        expected_step: u8,
        actual: WorkflowState,
        actual_step: u8,
    },

    /// Transition payload was empty; the state is held
    #[error("Empty {0} payload; workflow step not advanced")]
    EmptyPayload(&'static str),
}

/// Assessment session (in-memory state)
///
/// Invariant: all result fields for steps earlier than the current state are
/// populated, and all later ones are empty. `AwaitingImage` implies every
/// result field is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current workflow state
    pub state: WorkflowState,

    /// Result of the image-analysis step, absent until step 1 completes
    pub image_analysis: Option<ImageAnalysisRecord>,

    /// Extracted report text, empty until step 2 completes
    pub report_text: String,

    /// Final verdict text, empty until step 3 completes
    pub verdict: String,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Time the workflow reached `Done`, if it has
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a fresh session at step 1
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: WorkflowState::AwaitingImage,
            image_analysis: None,
            report_text: String::new(),
            verdict: String::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Discard all accumulated results and start a new run
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// AwaitingImage → AwaitingReport, carrying the parsed analysis
    pub fn record_image_analysis(
        &mut self,
        record: ImageAnalysisRecord,
    ) -> Result<StateTransition, SessionError> {
        self.require_state(WorkflowState::AwaitingImage)?;
        if record.analysis.is_empty() {
            return Err(SessionError::EmptyPayload("image analysis"));
        }
        self.image_analysis = Some(record);
        Ok(self.advance(WorkflowState::AwaitingReport))
    }

    /// AwaitingReport → AwaitingVerdict, carrying the extracted report text
    pub fn record_report_text(&mut self, text: String) -> Result<StateTransition, SessionError> {
        self.require_state(WorkflowState::AwaitingReport)?;
        if text.is_empty() {
            return Err(SessionError::EmptyPayload("report text"));
        }
        self.report_text = text;
        Ok(self.advance(WorkflowState::AwaitingVerdict))
    }

    /// AwaitingVerdict → Done, carrying the verdict text
    pub fn record_verdict(&mut self, text: String) -> Result<StateTransition, SessionError> {
        self.require_state(WorkflowState::AwaitingVerdict)?;
        if text.is_empty() {
            return Err(SessionError::EmptyPayload("verdict"));
        }
        self.verdict = text;
        self.completed_at = Some(Utc::now());
        Ok(self.advance(WorkflowState::Done))
    }

    fn require_state(&self, expected: WorkflowState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::WrongState {
                expected,
                expected_step: expected.step(),
                actual: self.state,
                actual_step: self.state.step(),
            })
        }
    }

    fn advance(&mut self, new_state: WorkflowState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        transition
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
