/// Verification Orchestrator
///
/// **Responsibility:**
/// Coordinate discovery, dispatch, the engine and the report assembler to
/// produce one `VerifyReport` per request.
///
/// **Flow:**
/// 1. Size guards (nothing spawned on rejection)
/// 2. Candidate discovery over the source text
/// 3. Per-case literal parsing and call planning; bad cases are rejected in place
/// 4. One engine run for all ready cases
/// 5. Report assembly
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (engine's job)
/// - How results are compared (evaluator's job)
use anyhow::Result;
use std::time::Instant;
use tracing::{debug, info, warn};
use veritas_common::literal::{parse_bindings, parse_value};
use veritas_common::types::{
    CaseResult, HarnessResult, ParamSchema, TestCase, VerifyReport, VerifyRequest,
};
use veritas_common::HarnessError;

use crate::config::{HarnessSettings, RuntimeConfig, RuntimeConfigManager};
use crate::discovery::{discover, Candidate};
use crate::dispatch::plan_call;
use crate::engine::Engine;
use crate::evaluator::{assemble, PreparedCase};
use crate::script::{render, PlannedCase};

/// A configured verifier. Immutable after construction; share it behind
/// `Arc` across concurrent requests.
pub struct Harness {
    settings: HarnessSettings,
    engine: Engine,
}

impl Harness {
    pub fn new(settings: HarnessSettings, runtimes: &RuntimeConfigManager) -> Result<Self> {
        let runtime = runtimes.get_config(&settings.language)?.clone();
        let engine = Engine::for_backend(settings.backend, runtime)?;
        info!(
            backend = %settings.backend,
            language = %settings.language,
            timeout_ms = settings.timeout_ms,
            "Harness ready"
        );
        Ok(Self { settings, engine })
    }

    /// Local `python3`, default limits.
    pub fn local() -> Self {
        Self::with_engine(
            HarnessSettings::default(),
            Engine::Process(crate::engine::ProcessEngine::new(RuntimeConfig::python())),
        )
    }

    /// Use an already built engine; `settings.backend` is not consulted.
    pub fn with_engine(settings: HarnessSettings, engine: Engine) -> Self {
        Self { settings, engine }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub async fn verify(&self, code: &str, test_cases: &[TestCase]) -> VerifyReport {
        self.verify_request(&VerifyRequest::new(code, test_cases.to_vec()))
            .await
    }

    #[tracing::instrument(skip_all, fields(cases = request.test_cases.len()))]
    pub async fn verify_request(&self, request: &VerifyRequest) -> VerifyReport {
        if let Err(err) = self.check_size(request) {
            warn!(error = %err, "Request rejected");
            return VerifyReport::failure(&err, String::new(), None);
        }

        if request.test_cases.is_empty() {
            let err = HarnessError::NoTestCases("no test cases were provided".to_string());
            return VerifyReport::from_harness(
                HarnessResult::new(Vec::new(), String::new(), Some(err.to_string())),
                None,
            );
        }

        let candidate = match discover(&request.code, request.entry.as_ref()) {
            Ok(candidate) => candidate,
            Err(err) => {
                info!(error = %err, "No callable candidate");
                return VerifyReport::failure(&err, String::new(), None);
            }
        };
        debug!(candidate = candidate.name(), mode = ?candidate.mode(), "Candidate selected");

        let (prepared, planned) = prepare_cases(&candidate, &request.test_cases, request.schema.as_ref());

        if planned.is_empty() {
            let err = HarnessError::NoTestCases("none of the test cases could be parsed".to_string());
            let rejected = prepared
                .into_iter()
                .filter_map(|case| match case {
                    PreparedCase::Rejected(result) => Some(result),
                    PreparedCase::Ready { .. } => None,
                })
                .collect();
            return VerifyReport::from_harness(
                HarnessResult::new(rejected, String::new(), Some(err.to_string())),
                None,
            );
        }

        let script = match render(&request.code, &candidate.entry_point(), &planned) {
            Ok(script) => script,
            Err(err) => return VerifyReport::failure(&err, String::new(), None),
        };

        let timeout_ms = self.settings.effective_timeout_ms(request.timeout_ms);
        let start_time = Instant::now();
        let run = match self.engine.run(&script, timeout_ms).await {
            Ok(run) => run,
            Err(err) => {
                warn!(error = %err, backend = %self.engine.backend(), "Engine failed");
                return VerifyReport::failure(&err, String::new(), None);
            }
        };

        info!(
            backend = %self.engine.backend(),
            timeout_ms,
            execution_time_ms = run.execution_time_ms,
            timed_out = run.timed_out,
            exit_code = ?run.exit_code,
            "Run finished"
        );

        let report = assemble(prepared, run);
        info!(
            success = report.success,
            passed = report.passed,
            total_ms = start_time.elapsed().as_millis() as u64,
            "Verification complete"
        );
        report
    }

    fn check_size(&self, request: &VerifyRequest) -> Result<(), HarnessError> {
        if request.code.len() > self.settings.max_source_bytes {
            return Err(HarnessError::InputTooLarge(format!(
                "source is {} bytes, limit is {}",
                request.code.len(),
                self.settings.max_source_bytes
            )));
        }
        let case_bytes: usize = request
            .test_cases
            .iter()
            .map(|c| c.input.len() + c.output.len())
            .sum();
        if case_bytes > self.settings.max_input_bytes {
            return Err(HarnessError::InputTooLarge(format!(
                "test cases total {} bytes, limit is {}",
                case_bytes, self.settings.max_input_bytes
            )));
        }
        Ok(())
    }
}

/// Parse and plan every case. Cases are numbered from 1 in input order.
fn prepare_cases(
    candidate: &Candidate,
    test_cases: &[TestCase],
    schema: Option<&ParamSchema>,
) -> (Vec<PreparedCase>, Vec<PlannedCase>) {
    let mut prepared = Vec::with_capacity(test_cases.len());
    let mut planned = Vec::with_capacity(test_cases.len());

    for (i, case) in test_cases.iter().enumerate() {
        let index = i + 1;
        let expected_text = case.output.trim().to_string();

        let outcome = parse_bindings(&case.input)
            .map_err(HarnessError::from)
            .and_then(|bindings| {
                let expected = parse_value(&case.output).map_err(|e| {
                    HarnessError::Parse(format!("expected output: {}", e))
                })?;
                let plan = plan_call(candidate, &bindings, schema)?;
                Ok((expected, plan))
            });

        match outcome {
            Ok((expected, plan)) => {
                planned.push(PlannedCase::new(index, plan));
                prepared.push(PreparedCase::Ready {
                    index,
                    input: case.input.clone(),
                    expected_text,
                    expected,
                    mode: candidate.mode(),
                });
            }
            Err(err) => {
                debug!(case = index, error = %err, "Case rejected before run");
                prepared.push(PreparedCase::Rejected(CaseResult::failed(
                    index,
                    &case.input,
                    expected_text,
                    &err,
                )));
            }
        }
    }

    (prepared, planned)
}

/// Verify with a default local harness.
pub async fn verify(code: &str, test_cases: &[TestCase]) -> VerifyReport {
    Harness::local().verify(code, test_cases).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SUM: &str = "def twoSum(nums, target):\n    return [0, 1]\n";

    #[tokio::test]
    async fn test_no_cases_is_explicit() {
        let report = Harness::local().verify(TWO_SUM, &[]).await;
        assert!(report.success);
        assert!(!report.passed);
        assert!(report.results.is_empty());
        assert!(report.error.unwrap().starts_with("NoTestCases:"));
    }

    #[tokio::test]
    async fn test_no_parsable_cases_skips_run() {
        let cases = [
            TestCase::new("nums = [2, 7", "[0, 1]"),
            TestCase::new("nums = [2, 7], target = 9", "[0,"),
        ];
        let report = Harness::local().verify(TWO_SUM, &cases).await;
        assert!(report.success);
        assert!(!report.passed);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].error.as_deref().unwrap().starts_with("ParseError:"));
        assert!(report.results[1].error.as_deref().unwrap().contains("expected output"));
        assert!(report.error.unwrap().starts_with("NoTestCases:"));
    }

    #[tokio::test]
    async fn test_no_candidate_is_infrastructure_failure() {
        let cases = [TestCase::new("x = 1", "1")];
        let report = Harness::local().verify("x = 3\nprint(x)\n", &cases).await;
        assert!(!report.success);
        assert!(report.error.unwrap().starts_with("NoCandidateFound:"));
    }

    #[tokio::test]
    async fn test_size_guards() {
        let mut settings = HarnessSettings::default();
        settings.max_source_bytes = 16;
        settings.max_input_bytes = 8;
        let harness = Harness::new(settings, &RuntimeConfigManager::builtin()).unwrap();

        let cases = [TestCase::new("x = 1", "1")];
        let report = harness.verify(&"#".repeat(17), &cases).await;
        assert!(!report.success);
        assert!(report.error.unwrap().starts_with("InputTooLarge:"));

        let cases = [TestCase::new("x = [1, 2, 3]", "1")];
        let report = harness.verify("def f(x): pass", &cases).await;
        assert!(report.error.unwrap().starts_with("InputTooLarge:"));
    }

    #[test]
    fn test_prepare_keeps_positions() {
        let candidate = discover(TWO_SUM, None).unwrap();
        let cases = [
            TestCase::new("nums = [2, 7, 11, 15], target = 9", "[0, 1]"),
            TestCase::new("nums = ", "[0, 1]"),
            TestCase::new("nums = [3, 3], target = 6", " [0, 1] "),
        ];
        let (prepared, planned) = prepare_cases(&candidate, &cases, None);
        assert_eq!(prepared.len(), 3);
        assert!(prepared[0].is_ready());
        assert!(!prepared[1].is_ready());
        assert_eq!(prepared[2].index(), 3);
        let numbers: Vec<usize> = planned.iter().map(|p| p.case).collect();
        assert_eq!(numbers, vec![1, 3]);
    }
}
