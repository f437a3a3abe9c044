//! MaPlanValidator - validates multi-agent plans with a classical checker
//!
//! A request moves through RECEIVED -> MODEL_BUILT -> LINEARIZING -> DONE:
//!
//! 1. The multi-agent text is parsed and serialized to classical PDDL inside a
//!    request-scoped artifact session, then re-read by the classical reader.
//! 2. Every plan step is remapped onto its per-agent classical action.
//! 3. Sequential plans are checked once. Partial-order plans are checked one
//!    linearization at a time until the checker accepts one.

use parking_lot::Mutex;
use pddl::{
    Capabilities, ClassicalReader, ClassicalSerializer, MultiAgentWriter, ParseOptions,
    PddlReader, PlanningTask,
};
use serde::Serialize;
use shared::{PlanningError, Result, UnsupportedError, ValidatorConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::checker::{CheckOutcome, SequentialPlanChecker};
use crate::plan::{PartialOrderPlan, Plan};
use crate::remapper::{GroundAction, PlanRemapper};
use crate::session::ArtifactSession;

pub const ENGINE_NAME: &str = "MAPlanValidator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Outcome of one validation request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub engine: String,
    pub checker: String,
    /// Orders handed to the checker
    pub linearizations_tried: usize,
    /// The accepted sequential plan, in classical form
    pub accepted_plan: Option<Vec<GroundAction>>,
    pub logs: Vec<LogMessage>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}

/// Classical task obtained from multi-agent text, plus the text itself
#[derive(Debug, Clone)]
pub struct Translation {
    pub task: PlanningTask,
    /// Features of the multi-agent input together with those of the
    /// classical task. Durations only show up on the multi-agent side.
    pub capabilities: Capabilities,
    pub domain_text: String,
    pub problem_text: String,
}

fn sequence(ground: &[GroundAction], order: &[usize]) -> Vec<GroundAction> {
    order.iter().map(|&i| ground[i].clone()).collect()
}

#[derive(Debug, Default)]
struct SearchOutcome {
    tried: usize,
    accepted: Option<Vec<usize>>,
    last_rejection: Option<String>,
}

/// Multi-agent plan validator over a classical checker
#[derive(Debug)]
pub struct MaPlanValidator<C, R = PddlReader> {
    checker: C,
    reader: R,
    config: ValidatorConfig,
}

impl<C: SequentialPlanChecker> MaPlanValidator<C> {
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            reader: PddlReader::default(),
            config: ValidatorConfig::default(),
        }
    }
}

impl<C: SequentialPlanChecker, R: ClassicalReader> MaPlanValidator<C, R> {
    /// Builder: replace the classical reader
    pub fn with_reader<R2: ClassicalReader>(self, reader: R2) -> MaPlanValidator<C, R2> {
        MaPlanValidator {
            checker: self.checker,
            reader,
            config: self.config,
        }
    }

    /// Builder: set configuration
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Parse multi-agent text, serialize it classically and re-read it
    pub fn translate(&self, writer: &dyn MultiAgentWriter, request_id: Uuid) -> Result<Translation> {
        let options = ParseOptions {
            strict_domain_name: self.config.strict_domain_name,
        };
        let ma_task = PlanningTask::parse(&writer.domain_text()?, &writer.problem_text()?, options)?;
        let domain_text = ClassicalSerializer::domain_text(&ma_task.domain);
        let problem_text = ClassicalSerializer::problem_text(&ma_task.domain, &ma_task.problem)?;

        let session = ArtifactSession::create(request_id, self.config.artifact_dir.as_deref())?;
        let name = &ma_task.problem.name;
        let task = session
            .write(&format!("{}_domain.pddl", name), &domain_text)
            .and_then(|domain_path| {
                let problem_path =
                    session.write(&format!("{}_problem.pddl", name), &problem_text)?;
                self.reader.read(&domain_path, &problem_path)
            });
        drop(session);

        let task = task?;
        let capabilities = ma_task.capabilities().union(task.capabilities());
        Ok(Translation {
            task,
            capabilities,
            domain_text,
            problem_text,
        })
    }

    /// Validate a plan for the problem the writer describes.
    ///
    /// An invalid plan is a normal result; errors mean the request itself
    /// could not be carried out.
    pub fn validate(&self, writer: &dyn MultiAgentWriter, plan: &Plan) -> Result<ValidationResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("validate", request = %request_id);
        let _enter = span.enter();
        info!(state = "RECEIVED", kind = plan.kind(), steps = plan.steps().len(), "Validation request");

        let mut logs = Vec::new();
        let Translation {
            task, capabilities, ..
        } = self.translate(writer, request_id)?;
        info!(state = "MODEL_BUILT", actions = task.domain.actions.len(), "Classical model built");
        self.check_capabilities(capabilities, &mut logs)?;

        let ground = PlanRemapper::new(&task).remap_all(plan.steps())?;
        info!(state = "LINEARIZING", workers = self.config.workers, "Checking plan");

        let outcome = match plan {
            Plan::Sequential(_) => match self.checker.check(&task, &ground) {
                CheckOutcome::Valid { .. } => SearchOutcome {
                    tried: 1,
                    accepted: Some((0..ground.len()).collect()),
                    last_rejection: None,
                },
                CheckOutcome::Invalid { reason, .. } => SearchOutcome {
                    tried: 1,
                    accepted: None,
                    last_rejection: Some(reason),
                },
            },
            Plan::PartialOrder(plan) if self.config.workers > 1 => {
                self.search_parallel(&task, plan, &ground)
            }
            Plan::PartialOrder(plan) => self.search(&task, plan, &ground),
        };

        let status = if outcome.accepted.is_some() {
            ValidationStatus::Valid
        } else {
            logs.push(LogMessage::new(LogLevel::Info, "Invalid sequential plan"));
            if let Some(reason) = &outcome.last_rejection {
                logs.push(LogMessage::new(LogLevel::Info, reason.clone()));
            }
            ValidationStatus::Invalid
        };
        info!(state = "DONE", status = ?status, tried = outcome.tried, "Validation finished");

        Ok(ValidationResult {
            status,
            engine: ENGINE_NAME.to_string(),
            checker: self.checker.name().to_string(),
            linearizations_tried: outcome.tried,
            accepted_plan: outcome
                .accepted
                .map(|order| order.into_iter().map(|i| ground[i].clone()).collect()),
            logs,
        })
    }

    fn check_capabilities(&self, capabilities: Capabilities, logs: &mut Vec<LogMessage>) -> Result<()> {
        if self.config.skip_checks {
            return Ok(());
        }
        if self.checker.supports(&capabilities) {
            return Ok(());
        }
        let message = format!(
            "We cannot establish whether {} can validate this problem",
            self.checker.name()
        );
        if self.config.error_on_failed_checks {
            return Err(PlanningError::from(UnsupportedError {
                construct: format!("{:?}", capabilities),
                context: self.checker.name().to_string(),
            }));
        }
        warn!(checker = self.checker.name(), ?capabilities, "{}", message);
        logs.push(LogMessage::new(LogLevel::Warning, message));
        Ok(())
    }

    fn search(&self, task: &PlanningTask, plan: &PartialOrderPlan, ground: &[GroundAction]) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        for order in plan.linearizations() {
            outcome.tried += 1;
            match self.checker.check(task, &sequence(ground, &order)) {
                CheckOutcome::Valid { .. } => {
                    outcome.accepted = Some(order);
                    break;
                }
                CheckOutcome::Invalid { reason, .. } => {
                    debug!(order = ?order, %reason, "Linearization rejected");
                    outcome.last_rejection = Some(reason);
                }
            }
        }
        outcome
    }

    fn search_parallel(
        &self,
        task: &PlanningTask,
        plan: &PartialOrderPlan,
        ground: &[GroundAction],
    ) -> SearchOutcome {
        let source = Mutex::new(plan.linearizations());
        let found = AtomicBool::new(false);
        let tried = AtomicUsize::new(0);
        let accepted: Mutex<Option<Vec<usize>>> = Mutex::new(None);
        let last_rejection: Mutex<Option<String>> = Mutex::new(None);
        let checker = &self.checker;

        thread::scope(|scope| {
            for _ in 0..self.config.workers {
                scope.spawn(|| loop {
                    if found.load(Ordering::Acquire) {
                        break;
                    }
                    let Some(order) = source.lock().next() else {
                        break;
                    };
                    tried.fetch_add(1, Ordering::Relaxed);
                    match checker.check(task, &sequence(ground, &order)) {
                        CheckOutcome::Valid { .. } => {
                            if !found.swap(true, Ordering::AcqRel) {
                                *accepted.lock() = Some(order);
                            }
                            break;
                        }
                        CheckOutcome::Invalid { reason, .. } => {
                            *last_rejection.lock() = Some(reason);
                        }
                    }
                });
            }
        });

        SearchOutcome {
            tried: tried.into_inner(),
            accepted: accepted.into_inner(),
            last_rejection: last_rejection.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::StripsChecker;
    use crate::fixtures::{single_robot, two_robots};
    use crate::plan::{ActionOccurrence, SequentialPlan};
    use pddl::{RenderedText, UnfactoredWriter};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    /// StripsChecker that counts how often it is asked
    #[derive(Default)]
    struct CountingChecker {
        calls: AtomicUsize,
        supported: bool,
    }

    impl CountingChecker {
        fn supporting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                supported: true,
            }
        }
    }

    impl SequentialPlanChecker for CountingChecker {
        fn name(&self) -> &str {
            "CountingChecker"
        }

        fn supports(&self, _capabilities: &Capabilities) -> bool {
            self.supported
        }

        fn check(&self, task: &PlanningTask, plan: &[GroundAction]) -> CheckOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StripsChecker::new().check(task, plan)
        }
    }

    fn config_in(dir: &Path) -> ValidatorConfig {
        ValidatorConfig {
            artifact_dir: Some(dir.to_path_buf()),
            ..ValidatorConfig::default()
        }
    }

    fn shift_plan(orderings: Vec<(usize, usize)>) -> Plan {
        // r1 first is wrong: l2 is still taken by r2
        PartialOrderPlan::new(
            vec![
                ActionOccurrence::new("move", "r1", ["l1", "l2"]),
                ActionOccurrence::new("move", "r2", ["l2", "l3"]),
            ],
            orderings,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_end_to_end_sequential() {
        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let validator = MaPlanValidator::new(StripsChecker::new());

        let good = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l1", "l2"])]);
        let result = validator.validate(&writer, &good.into()).unwrap();
        assert_eq!(result.status, ValidationStatus::Valid);
        assert_eq!(result.engine, "MAPlanValidator");
        assert_eq!(result.linearizations_tried, 1);
        assert_eq!(
            result.accepted_plan.unwrap()[0].to_string(),
            "(move_r1 r1 l1 l2)"
        );

        let bad = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l2", "l1"])]);
        let result = validator.validate(&writer, &bad.into()).unwrap();
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert!(result.accepted_plan.is_none());
        assert_eq!(result.logs[0].message, "Invalid sequential plan");
    }

    #[test]
    fn test_partial_order_finds_valid_linearization() {
        let problem = two_robots();
        let writer = UnfactoredWriter::new(&problem);
        let validator = MaPlanValidator::new(StripsChecker::new());

        let result = validator.validate(&writer, &shift_plan(Vec::new())).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.linearizations_tried, 2);
        let accepted: Vec<String> = result
            .accepted_plan
            .unwrap()
            .iter()
            .map(|a| a.action.clone())
            .collect();
        assert_eq!(accepted, vec!["move_r2", "move_r1"]);

        // Forcing r1 first leaves no valid order
        let result = validator.validate(&writer, &shift_plan(vec![(0, 1)])).unwrap();
        assert_eq!(result.status, ValidationStatus::Invalid);
        assert_eq!(result.linearizations_tried, 1);
    }

    #[test]
    fn test_search_stops_at_first_accepted_order() {
        let problem = two_robots();
        let writer = UnfactoredWriter::new(&problem);
        // The first order tried is already valid
        let steps = vec![
            ActionOccurrence::new("move", "r2", ["l2", "l3"]),
            ActionOccurrence::new("move", "r1", ["l1", "l2"]),
        ];
        let plan: Plan = PartialOrderPlan::new(steps, Vec::new()).unwrap().into();

        let validator = MaPlanValidator::new(CountingChecker::supporting());
        let result = validator.validate(&writer, &plan).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.linearizations_tried, 1);
        assert_eq!(validator.checker.calls.load(Ordering::SeqCst), 1);

        let validator = MaPlanValidator::new(CountingChecker::supporting());
        let result = validator.validate(&writer, &shift_plan(Vec::new())).unwrap();
        assert!(result.is_valid());
        assert_eq!(validator.checker.calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.linearizations_tried, 2);
    }

    #[test]
    fn test_parallel_search_agrees_with_sequential() {
        let problem = two_robots();
        let writer = UnfactoredWriter::new(&problem);
        let sequential = MaPlanValidator::new(StripsChecker::new());
        let parallel = MaPlanValidator::new(StripsChecker::new()).with_config(ValidatorConfig {
            workers: 4,
            ..ValidatorConfig::default()
        });

        for orderings in [Vec::new(), vec![(0, 1)], vec![(1, 0)]] {
            let plan = shift_plan(orderings);
            let expected = sequential.validate(&writer, &plan).unwrap();
            let actual = parallel.validate(&writer, &plan).unwrap();
            assert_eq!(actual.status, expected.status);
            if actual.is_valid() {
                assert_eq!(actual.accepted_plan, expected.accepted_plan);
            }
        }
    }

    #[test]
    fn test_remapping_failure_is_an_error() {
        let problem = two_robots();
        let writer = UnfactoredWriter::new(&problem);
        let plan: Plan = SequentialPlan::new(vec![ActionOccurrence::new("move", "agentB", ["l1", "l2"])]).into();

        let err = MaPlanValidator::new(StripsChecker::new())
            .validate(&writer, &plan)
            .unwrap_err();
        assert!(matches!(err, PlanningError::ActionLookup(_)));
        assert!(err.to_string().contains("No matching action found for 'move_agentB'"));
    }

    #[test]
    fn test_artifacts_removed_after_success_and_failure() {
        let artifacts = TempDir::new().unwrap();
        let validator =
            MaPlanValidator::new(StripsChecker::new()).with_config(config_in(artifacts.path()));

        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let plan: Plan = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l1", "l2"])]).into();
        assert!(validator.validate(&writer, &plan).unwrap().is_valid());
        assert_eq!(std::fs::read_dir(artifacts.path()).unwrap().count(), 0);

        // Parses fine as MA-PDDL but the reader fails on the artifacts
        struct FailingReader;
        impl ClassicalReader for FailingReader {
            fn read(&self, domain_path: &Path, _problem_path: &Path) -> Result<PlanningTask> {
                assert!(domain_path.exists());
                Err(PlanningError::syntax("reader failure"))
            }
        }
        let failing = MaPlanValidator::new(StripsChecker::new())
            .with_config(config_in(artifacts.path()))
            .with_reader(FailingReader);
        assert!(failing.validate(&writer, &plan).is_err());
        assert_eq!(std::fs::read_dir(artifacts.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_capability_check() {
        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let plan: Plan = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l1", "l2"])]).into();

        let unsupported = MaPlanValidator::new(CountingChecker::default());
        let result = unsupported.validate(&writer, &plan).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.logs[0].level, LogLevel::Warning);

        let strict = MaPlanValidator::new(CountingChecker::default()).with_config(ValidatorConfig {
            error_on_failed_checks: true,
            ..ValidatorConfig::default()
        });
        assert!(matches!(
            strict.validate(&writer, &plan).unwrap_err(),
            PlanningError::Unsupported(_)
        ));

        let skipping = MaPlanValidator::new(CountingChecker::default()).with_config(ValidatorConfig {
            error_on_failed_checks: true,
            skip_checks: true,
            ..ValidatorConfig::default()
        });
        assert!(skipping.validate(&writer, &plan).unwrap().logs.is_empty());
    }

    #[test]
    fn test_durations_seen_on_multi_agent_input() {
        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let durative = RenderedText::new(
            writer
                .domain_text()
                .unwrap()
                .replace(":precondition", ":duration (= ?duration 4)\n\t:precondition"),
            writer.problem_text().unwrap(),
        );
        let plan: Plan = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l1", "l2"])]).into();

        let translation = MaPlanValidator::new(StripsChecker::new())
            .translate(&durative, Uuid::new_v4())
            .unwrap();
        assert!(translation.capabilities.durations);
        assert!(!translation.task.capabilities().durations);

        let lenient = MaPlanValidator::new(StripsChecker::new());
        let result = lenient.validate(&durative, &plan).unwrap();
        assert_eq!(result.logs[0].level, LogLevel::Warning);

        let strict = MaPlanValidator::new(StripsChecker::new()).with_config(ValidatorConfig {
            error_on_failed_checks: true,
            ..ValidatorConfig::default()
        });
        assert!(matches!(
            strict.validate(&durative, &plan).unwrap_err(),
            PlanningError::Unsupported(_)
        ));
    }

    #[test]
    fn test_strict_domain_name() {
        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let text = RenderedText::new(
            writer.domain_text().unwrap(),
            writer
                .problem_text()
                .unwrap()
                .replace("(:domain robots)", "(:domain drones)"),
        );
        let plan: Plan = SequentialPlan::new(vec![ActionOccurrence::new("move", "r1", ["l1", "l2"])]).into();

        let lenient = MaPlanValidator::new(StripsChecker::new());
        assert!(lenient.validate(&text, &plan).unwrap().is_valid());

        let strict = MaPlanValidator::new(StripsChecker::new()).with_config(ValidatorConfig {
            strict_domain_name: true,
            ..ValidatorConfig::default()
        });
        assert!(matches!(
            strict.validate(&text, &plan).unwrap_err(),
            PlanningError::DomainMismatch(_)
        ));
    }

    #[test]
    fn test_translation_keeps_text() {
        let problem = single_robot();
        let writer = UnfactoredWriter::new(&problem);
        let translation = MaPlanValidator::new(StripsChecker::new())
            .translate(&writer, Uuid::new_v4())
            .unwrap();
        assert!(translation.domain_text.contains("(:action move_r1"));
        assert!(!translation.domain_text.contains(":agent"));
        assert!(translation.task.action("move_r1").unwrap().agent_type.is_none());
    }
}
