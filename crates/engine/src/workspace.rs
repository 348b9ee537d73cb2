// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workspace context: every service wired over one project root.
//!
//! Replaces process-wide singletons with an explicit, lifetime-bound
//! context. `Workspace` also implements [`WorkflowEnv`], so a state
//! machine borrowing it can evaluate guards against live stores and
//! evidence.

use crate::error::EngineError;
use edison_config::{
    ConfigRegistry, PathResolver, QaConfig, SessionConfig, TaskConfig, ValidationConfig,
    WorkflowConfig,
};
use edison_core::{
    Clock, QaRecord, ReadinessEvaluator, ReadinessPolicy, Session, SystemClock, Task, TaskGraph,
    TaskSummary,
};
use edison_state::{ExpectedValidator, StateError, StateMachine, WorkflowEnv, WorkflowModel};
use edison_store::{
    BundleSummary, EntityKind, EntityStore, EvidenceBlocker, EvidenceService, SessionStore,
    StoreLayout, ValidatorReport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Section heading in a task body that declares its primary files.
const PRIMARY_FILES_HEADING: &str = "primary files";

pub struct Workspace {
    root: PathBuf,
    registry: Arc<ConfigRegistry>,
    resolver: PathResolver,
    tasks: EntityStore<Task>,
    qa: EntityStore<QaRecord>,
    sessions: SessionStore,
    evidence: EvidenceService,
    clock: SystemClock,
}

impl Workspace {
    /// Wire a workspace over an explicit project root.
    pub fn new(root: &Path) -> Result<Self, EngineError> {
        let user_dir = std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join(".edison"))
            .unwrap_or_else(|| root.join(".edison-user"));
        Self::with_user_dir(root, &user_dir)
    }

    /// Wire a workspace with an explicit user overlay dir (tests).
    pub fn with_user_dir(root: &Path, user_dir: &Path) -> Result<Self, EngineError> {
        let registry = ConfigRegistry::load(root, user_dir)?;
        let resolver = PathResolver::new(root);
        let workflow = WorkflowConfig::new(registry.merged());
        let tasks = EntityStore::new(
            resolver.clone(),
            StoreLayout::from_workflow(EntityKind::Task, &workflow)?,
        );
        let qa_store = EntityStore::new(
            resolver.clone(),
            StoreLayout::from_workflow(EntityKind::Qa, &workflow)?,
        );
        let sessions = SessionStore::new(resolver.clone(), &workflow)?;
        let evidence = EvidenceService::new(resolver.clone(), &QaConfig::new(registry.merged()));
        Ok(Self {
            root: root.to_path_buf(),
            registry,
            resolver,
            tasks,
            qa: qa_store,
            sessions,
            evidence,
            clock: SystemClock,
        })
    }

    /// Resolve the project root from a working directory and wire services.
    pub fn discover(cwd: &Path) -> Result<Self, EngineError> {
        let env_root = std::env::var(edison_config::ENV_PROJECT_ROOT).ok();
        let root = PathResolver::resolve_root(cwd, None, env_root.as_deref())?;
        Self::new(&root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn tasks(&self) -> &EntityStore<Task> {
        &self.tasks
    }

    pub fn qa(&self) -> &EntityStore<QaRecord> {
        &self.qa
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn evidence(&self) -> &EvidenceService {
        &self.evidence
    }

    pub fn workflow(&self) -> WorkflowConfig<'_> {
        WorkflowConfig::new(self.registry.merged())
    }

    pub fn task_config(&self) -> TaskConfig<'_> {
        TaskConfig::new(self.registry.merged())
    }

    pub fn qa_config(&self) -> QaConfig<'_> {
        QaConfig::new(self.registry.merged())
    }

    pub fn validation_config(&self) -> ValidationConfig<'_> {
        ValidationConfig::new(self.registry.merged())
    }

    pub fn session_config(&self) -> SessionConfig<'_> {
        SessionConfig::new(self.registry.merged())
    }

    pub fn now(&self) -> String {
        Clock::timestamp(&self.clock)
    }

    /// A state machine evaluating against this workspace.
    pub fn machine(&self) -> Result<StateMachine<'_>, EngineError> {
        let model = WorkflowModel::load(&self.workflow())?;
        Ok(StateMachine::new(model, self))
    }

    pub fn readiness_policy(&self) -> Result<ReadinessPolicy, EngineError> {
        Ok(self.task_config().readiness_policy(&self.workflow())?)
    }

    /// The full task graph (global + every session) with paths attached.
    pub fn task_graph(&self) -> Result<TaskGraph, EngineError> {
        let mut summaries = Vec::new();
        for task in self.tasks.find_all()? {
            let path = self.tasks.get_path(task.id.as_str()).ok();
            summaries.push(TaskSummary::from_task(&task, path));
        }
        Ok(TaskGraph::new(summaries))
    }

    /// Primary files declared in the task body plus (when available)
    /// worktree-diff changed files supplied by the caller.
    pub fn file_context(&self, task: &Task, changed_files: &[String]) -> Vec<String> {
        let mut files = primary_files(&task.description);
        for f in changed_files {
            if !files.contains(f) {
                files.push(f.clone());
            }
        }
        files
    }

    /// Expected validator set for a task: preset selection ∪ always-run ∪
    /// trigger matches against the file context.
    pub fn expected_validator_set(
        &self,
        task: &Task,
        preset_name: &str,
        changed_files: &[String],
    ) -> Result<Vec<ExpectedValidator>, EngineError> {
        let validation = self.validation_config();
        let validators = validation.validators()?;
        let preset = validation.preset(preset_name)?;
        let files = self.file_context(task, changed_files);

        let mut out: Vec<ExpectedValidator> = Vec::new();
        let mut push = |id: &str| {
            if out.iter().any(|v| v.id == id) {
                return;
            }
            if let Some(spec) = validators.get(id) {
                let blocking =
                    spec.blocking || preset.blocking_validators.iter().any(|b| b == id);
                out.push(ExpectedValidator {
                    id: id.to_string(),
                    blocking,
                    wave: spec.wave.clone(),
                });
            }
        };

        for id in &preset.validators {
            push(id);
        }
        for (id, spec) in &validators {
            if spec.always_run {
                push(id);
            } else if spec
                .triggers
                .iter()
                .any(|t| files.iter().any(|f| edison_config::glob_match::matches(t, f)))
            {
                push(id);
            }
        }
        Ok(out)
    }
}

/// Parse the `Primary Files / Areas` list out of a task body.
pub fn primary_files(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_section = false;
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            in_section = trimmed
                .trim_start_matches('#')
                .trim()
                .to_lowercase()
                .starts_with(PRIMARY_FILES_HEADING);
            continue;
        }
        if in_section {
            if let Some(item) = trimmed.strip_prefix("- ") {
                let item = item.trim().trim_matches('`');
                if !item.is_empty() {
                    out.push(item.to_string());
                }
            }
        }
    }
    out
}

impl WorkflowEnv for Workspace {
    fn now(&self) -> String {
        Workspace::now(self)
    }

    fn semantic_state(&self, entity: &str, semantic: &str) -> String {
        self.workflow()
            .semantic_state(entity, semantic)
            .unwrap_or_else(|_| semantic.to_string())
    }

    fn load_task(&self, id: &str) -> Result<Option<Task>, StateError> {
        Ok(self.tasks.get(id)?)
    }

    fn save_task(&self, task: &Task) -> Result<(), StateError> {
        self.tasks.update(task)?;
        Ok(())
    }

    fn load_qa(&self, id: &str) -> Result<Option<QaRecord>, StateError> {
        Ok(self.qa.get(id)?)
    }

    fn save_qa(&self, qa: &QaRecord) -> Result<(), StateError> {
        self.qa.update(qa)?;
        Ok(())
    }

    fn load_session(&self, id: &str) -> Result<Option<Session>, StateError> {
        Ok(self.sessions.get(id)?)
    }

    fn save_session(&self, session: &Session) -> Result<(), StateError> {
        self.sessions.update(session)?;
        Ok(())
    }

    fn dependency_blockers(&self, task_id: &str) -> Vec<String> {
        let Ok(graph) = self.task_graph() else {
            return vec!["task graph unavailable".to_string()];
        };
        let Ok(policy) = self.readiness_policy() else {
            return vec!["readiness policy unavailable".to_string()];
        };
        let evaluator = ReadinessEvaluator::new(&graph, &policy);
        match evaluator.evaluate_task(task_id) {
            Some(r) => r
                .blocked_by
                .iter()
                .map(|b| match &b.dependency_state {
                    Some(state) => {
                        format!("{} is {} ({})", b.dependency_id, state, b.reason)
                    }
                    None => format!("{} ({})", b.dependency_id, b.reason),
                })
                .collect(),
            None => vec![format!("task {task_id} not found in graph")],
        }
    }

    fn evidence_blockers(&self, task_id: &str) -> Vec<EvidenceBlocker> {
        self.evidence.missing_evidence_blockers(task_id)
    }

    fn current_round(&self, task_id: &str) -> u32 {
        self.evidence.current_round(task_id)
    }

    fn validator_reports(&self, task_id: &str, round: u32) -> Vec<ValidatorReport> {
        self.evidence.list_validator_reports(task_id, round)
    }

    fn read_bundle(&self, task_id: &str, round: u32) -> Option<BundleSummary> {
        self.evidence.read_bundle(task_id, round).ok()
    }

    fn write_bundle(&self, task_id: &str, bundle: &BundleSummary) -> Result<(), StateError> {
        self.evidence
            .write_bundle(task_id, bundle)
            .map_err(|e| StateError::Env(e.to_string()))?;
        Ok(())
    }

    fn expected_validators(&self, task_id: &str) -> Vec<ExpectedValidator> {
        let Ok(Some(task)) = self.tasks.get(task_id) else {
            return Vec::new();
        };
        let Ok(preset) = self.validation_config().default_preset() else {
            return Vec::new();
        };
        self.expected_validator_set(&task, &preset, &[])
            .unwrap_or_default()
    }

    fn log_session_activity(
        &self,
        session_id: &str,
        message: &str,
        entity_ref: Option<&str>,
    ) -> Result<(), StateError> {
        let Some(mut session) = self.sessions.get(session_id)? else {
            // A dangling session back-reference is not fatal for the
            // transition itself.
            tracing::warn!(session_id, "activity log target session missing");
            return Ok(());
        };
        session.log_activity(
            Workspace::now(self),
            message,
            entity_ref.map(str::to_string),
        );
        self.sessions.update(&session)?;
        Ok(())
    }

    fn sync_integration(&self, task: &Task, kind: &str) -> Result<(), StateError> {
        let Some(integration) = &task.integration else {
            return Ok(());
        };
        let Some(file) = integration
            .payload
            .get("file")
            .and_then(|v| v.as_str())
        else {
            return Ok(());
        };
        let task_ref = integration
            .payload
            .get("taskRef")
            .and_then(|v| v.as_str())
            .unwrap_or(task.id.as_str());
        let path = self.root.join(file);
        let Ok(content) = std::fs::read_to_string(&path) else {
            tracing::warn!(path = %path.display(), kind, "external sync target missing");
            return Ok(()); // best-effort, fail-open
        };
        let updated = mark_checkbox(&content, task_ref);
        if updated != content {
            std::fs::write(&path, updated).map_err(|e| StateError::Env(e.to_string()))?;
            tracing::debug!(path = %path.display(), task_ref, kind, "marked external checkbox");
        }
        Ok(())
    }
}

/// Mark `- [ ]` checkboxes on lines referencing `task_ref` as done.
pub fn mark_checkbox(content: &str, task_ref: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let is_target = line.contains(task_ref);
        if is_target {
            if let Some(pos) = line.find("- [ ]") {
                out.push_str(&line[..pos]);
                out.push_str("- [x]");
                out.push_str(&line[pos + 5..]);
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
