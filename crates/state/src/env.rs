// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The environment seam between the state machine and the rest of the
//! engine.
//!
//! Guards and actions never touch stores or services directly; they read
//! and mutate through this trait, which keeps them pure enough to test
//! against the in-memory [`fake::FakeEnv`].

use crate::error::StateError;
use edison_core::{QaRecord, Session, Task};
use edison_store::{BundleSummary, EvidenceBlocker, ValidatorReport};

/// A validator the current configuration expects for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedValidator {
    pub id: String,
    pub blocking: bool,
    pub wave: String,
}

/// Everything the state machine needs from the outside world.
pub trait WorkflowEnv {
    /// RFC 3339 timestamp for history entries.
    fn now(&self) -> String;

    /// Resolve a semantic state key to the configured on-disk name.
    ///
    /// The default identity mapping matches the bundled configuration;
    /// the engine overrides it with the workflow config resolution.
    fn semantic_state(&self, _entity: &str, semantic: &str) -> String {
        semantic.to_string()
    }

    // ----- entity IO -----
    fn load_task(&self, id: &str) -> Result<Option<Task>, StateError>;
    fn save_task(&self, task: &Task) -> Result<(), StateError>;
    fn load_qa(&self, id: &str) -> Result<Option<QaRecord>, StateError>;
    fn save_qa(&self, qa: &QaRecord) -> Result<(), StateError>;
    fn load_session(&self, id: &str) -> Result<Option<Session>, StateError>;
    fn save_session(&self, session: &Session) -> Result<(), StateError>;

    // ----- guard data -----

    /// Unsatisfied-dependency diagnostics for a task (empty = ready).
    fn dependency_blockers(&self, task_id: &str) -> Vec<String>;

    /// Missing/invalid required evidence for the current round.
    fn evidence_blockers(&self, task_id: &str) -> Vec<EvidenceBlocker>;

    fn current_round(&self, task_id: &str) -> u32;

    fn validator_reports(&self, task_id: &str, round: u32) -> Vec<ValidatorReport>;

    fn read_bundle(&self, task_id: &str, round: u32) -> Option<BundleSummary>;

    /// Persist an aggregated bundle summary for a round.
    fn write_bundle(&self, task_id: &str, bundle: &BundleSummary) -> Result<(), StateError>;

    /// Validators the active preset/trigger set expects for this task.
    fn expected_validators(&self, task_id: &str) -> Vec<ExpectedValidator>;

    // ----- action side effects -----

    /// Append to the owning session's activity log (no-op for global
    /// entities).
    fn log_session_activity(
        &self,
        session_id: &str,
        message: &str,
        entity_ref: Option<&str>,
    ) -> Result<(), StateError>;

    /// Mark external integration sources (speckit/openspec checkboxes).
    fn sync_integration(&self, task: &Task, kind: &str) -> Result<(), StateError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    /// In-memory environment for guard/action/machine tests.
    #[derive(Default)]
    pub struct FakeEnv {
        pub tasks: Mutex<BTreeMap<String, Task>>,
        pub qa: Mutex<BTreeMap<String, QaRecord>>,
        pub sessions: Mutex<BTreeMap<String, Session>>,
        pub dependency_blockers: Mutex<BTreeMap<String, Vec<String>>>,
        pub evidence_blockers: Mutex<BTreeMap<String, Vec<EvidenceBlocker>>>,
        pub rounds: Mutex<BTreeMap<String, u32>>,
        pub reports: Mutex<BTreeMap<(String, u32), Vec<ValidatorReport>>>,
        pub bundles: Mutex<BTreeMap<(String, u32), BundleSummary>>,
        pub expected: Mutex<BTreeMap<String, Vec<ExpectedValidator>>>,
        pub activity: Mutex<Vec<(String, String)>>,
        pub synced: Mutex<Vec<(String, String)>>,
    }

    impl FakeEnv {
        pub fn with_task(self, task: Task) -> Self {
            self.tasks.lock().insert(task.id.to_string(), task);
            self
        }

        pub fn with_qa(self, qa: QaRecord) -> Self {
            self.qa.lock().insert(qa.id.to_string(), qa);
            self
        }

        pub fn with_session(self, session: Session) -> Self {
            self.sessions.lock().insert(session.id.to_string(), session);
            self
        }
    }

    impl WorkflowEnv for FakeEnv {
        fn now(&self) -> String {
            "2026-01-01T00:00:00Z".to_string()
        }

        fn load_task(&self, id: &str) -> Result<Option<Task>, StateError> {
            Ok(self.tasks.lock().get(id).cloned())
        }

        fn save_task(&self, task: &Task) -> Result<(), StateError> {
            self.tasks.lock().insert(task.id.to_string(), task.clone());
            Ok(())
        }

        fn load_qa(&self, id: &str) -> Result<Option<QaRecord>, StateError> {
            Ok(self.qa.lock().get(id).cloned())
        }

        fn save_qa(&self, qa: &QaRecord) -> Result<(), StateError> {
            self.qa.lock().insert(qa.id.to_string(), qa.clone());
            Ok(())
        }

        fn load_session(&self, id: &str) -> Result<Option<Session>, StateError> {
            Ok(self.sessions.lock().get(id).cloned())
        }

        fn save_session(&self, session: &Session) -> Result<(), StateError> {
            self.sessions
                .lock()
                .insert(session.id.to_string(), session.clone());
            Ok(())
        }

        fn dependency_blockers(&self, task_id: &str) -> Vec<String> {
            self.dependency_blockers
                .lock()
                .get(task_id)
                .cloned()
                .unwrap_or_default()
        }

        fn evidence_blockers(&self, task_id: &str) -> Vec<EvidenceBlocker> {
            self.evidence_blockers
                .lock()
                .get(task_id)
                .cloned()
                .unwrap_or_default()
        }

        fn current_round(&self, task_id: &str) -> u32 {
            self.rounds.lock().get(task_id).copied().unwrap_or(0)
        }

        fn validator_reports(&self, task_id: &str, round: u32) -> Vec<ValidatorReport> {
            self.reports
                .lock()
                .get(&(task_id.to_string(), round))
                .cloned()
                .unwrap_or_default()
        }

        fn read_bundle(&self, task_id: &str, round: u32) -> Option<BundleSummary> {
            self.bundles
                .lock()
                .get(&(task_id.to_string(), round))
                .cloned()
        }

        fn write_bundle(&self, task_id: &str, bundle: &BundleSummary) -> Result<(), StateError> {
            self.bundles
                .lock()
                .insert((task_id.to_string(), bundle.round), bundle.clone());
            Ok(())
        }

        fn expected_validators(&self, task_id: &str) -> Vec<ExpectedValidator> {
            self.expected
                .lock()
                .get(task_id)
                .cloned()
                .unwrap_or_default()
        }

        fn log_session_activity(
            &self,
            session_id: &str,
            message: &str,
            _entity_ref: Option<&str>,
        ) -> Result<(), StateError> {
            self.activity
                .lock()
                .push((session_id.to_string(), message.to_string()));
            Ok(())
        }

        fn sync_integration(&self, task: &Task, kind: &str) -> Result<(), StateError> {
            self.synced.lock().push((task.id.to_string(), kind.to_string()));
            Ok(())
        }
    }
}
