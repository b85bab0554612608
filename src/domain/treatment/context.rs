//! Per-session dialogue state.
//!
//! `TreatmentContext` is passed explicitly (`&mut`) through every router
//! handler. Nothing about a session lives anywhere else.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::phase::{Modality, TreatmentPhase, WorkType};
use super::step::StepId;

/// Which digging-deeper check spawned a nested pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiggingCheck {
    FutureProblem,
    Scenario(u8),
    AnythingElse(u8),
}

/// Pending bridge phrase for the entry step of a nested pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    pub spawned_by: DiggingCheck,
    pub used: bool,
}

/// Modality-scoped metadata saved when a nested pass starts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalitySnapshot {
    pub work_type: Option<WorkType>,
    pub selected_method: Option<Modality>,
    pub problem_statement: Option<String>,
    pub cycle_count: u32,
    pub bridge: Option<BridgeState>,
}

/// Saved position of a parent flow while a nested pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Nesting depth of the pass this point returns to (0 = top level).
    pub depth: usize,
    /// Where the parent flow resumes once the nested pass completes.
    pub resume_step: StepId,
    pub spawned_by: DiggingCheck,
    pub snapshot: ModalitySnapshot,
}

/// Explicit metadata carried by the context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreatmentMetadata {
    // Modality scope: cleared when a nested pass starts, restored on return.
    pub work_type: Option<WorkType>,
    pub selected_method: Option<Modality>,
    pub cycle_count: u32,
    pub bridge: Option<BridgeState>,

    // Chain scope: shared by every nesting level of one top-level problem.
    pub original_problem_statement: Option<String>,
    pub dig_deeper_consent: bool,
    pub scenario_checks_asked: u8,
    pub anything_else_checks_asked: u8,
    pub return_stack: Vec<ReturnPoint>,

    /// Free-form notes (integration answers and similar).
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl TreatmentMetadata {
    /// Current nesting depth (0 = top-level pass).
    pub fn depth(&self) -> usize {
        self.return_stack.len()
    }

    pub fn is_nested(&self) -> bool {
        !self.return_stack.is_empty()
    }
}

/// Mutable state of one treatment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentContext {
    session_id: SessionId,
    user_id: UserId,
    current_phase: TreatmentPhase,
    current_step: StepId,
    user_responses: HashMap<StepId, String>,
    metadata: TreatmentMetadata,
    problem_statement: Option<String>,
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TreatmentContext {
    /// Creates a context positioned on `start_step`.
    pub fn new(
        session_id: SessionId,
        user_id: UserId,
        start_step: StepId,
        start_phase: TreatmentPhase,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            user_id,
            current_phase: start_phase,
            current_step: start_step,
            user_responses: HashMap::new(),
            metadata: TreatmentMetadata::default(),
            problem_statement: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn current_phase(&self) -> TreatmentPhase {
        self.current_phase
    }

    pub fn current_step(&self) -> &StepId {
        &self.current_step
    }

    pub fn metadata(&self) -> &TreatmentMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut TreatmentMetadata {
        &mut self.metadata
    }

    /// Canonical text of the problem, goal, or experience being worked on.
    pub fn problem_statement(&self) -> Option<&str> {
        self.problem_statement.as_deref()
    }

    /// The problem that started the current chain.
    pub fn original_problem_statement(&self) -> Option<&str> {
        self.metadata
            .original_problem_statement
            .as_deref()
            .or(self.problem_statement.as_deref())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// The last recorded raw answer for a step.
    pub fn response_for(&self, step: &StepId) -> Option<&str> {
        self.user_responses.get(step).map(String::as_str)
    }

    pub fn response_count(&self) -> usize {
        self.user_responses.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Records raw input against a step (latest write wins).
    pub fn record_response(&mut self, step: &StepId, raw: &str) {
        self.user_responses.insert(step.clone(), raw.trim().to_string());
    }

    pub fn set_problem_statement(&mut self, statement: impl Into<String>) {
        self.problem_statement = Some(statement.into().trim().to_string());
    }

    /// Moves the session to a new current step.
    pub fn move_to(&mut self, step: StepId, phase: TreatmentPhase) {
        self.current_step = step;
        self.current_phase = phase;
        self.updated_at = Timestamp::now();
    }

    /// Marks one completed mutation of the context.
    pub fn bump_version(&mut self) {
        self.version += 1;
        self.updated_at = Timestamp::now();
    }

    /// Starts a brand-new top-level problem.
    ///
    /// Everything except identity and version is reset, including
    /// `cycle_count`, consent, and the check counters.
    pub fn reset_for_new_problem(&mut self) {
        self.user_responses.clear();
        self.metadata = TreatmentMetadata::default();
        self.problem_statement = None;
    }

    /// Captures the modality-scoped state of the current pass.
    pub fn snapshot_modality(&self) -> ModalitySnapshot {
        ModalitySnapshot {
            work_type: self.metadata.work_type,
            selected_method: self.metadata.selected_method,
            problem_statement: self.problem_statement.clone(),
            cycle_count: self.metadata.cycle_count,
            bridge: self.metadata.bridge,
        }
    }

    /// Clears modality-scoped state before a nested pass.
    pub fn clear_modality(&mut self) {
        self.metadata.work_type = None;
        self.metadata.selected_method = None;
        self.metadata.cycle_count = 0;
        self.metadata.bridge = None;
        self.problem_statement = None;
    }

    /// Restores a parent's modality-scoped state.
    pub fn restore_modality(&mut self, snapshot: ModalitySnapshot) {
        self.metadata.work_type = snapshot.work_type;
        self.metadata.selected_method = snapshot.selected_method;
        self.metadata.cycle_count = snapshot.cycle_count;
        self.metadata.bridge = snapshot.bridge;
        self.problem_statement = snapshot.problem_statement;
    }
}
