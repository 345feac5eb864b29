/// Report Assembler - Turning Raw Output Into a Verdict
///
/// **Core Responsibility:**
/// Read the child's final result line, decode every case value and compare
/// it with the expected literal.
///
/// **Critical Properties:**
/// - Knows nothing about Docker or local processes
/// - Pure function: (prepared cases, raw run) → report
/// - Case order is the input order; cases rejected before the run keep
///   their slot
///
/// **Output Contract:**
/// - The last non-empty stdout line is the result line
/// - Everything printed before it is `logs`
/// - A missing or undecodable result line is `OutputDecodeError`, with
///   stdout kept as logs and stderr attached
use serde::Deserialize;
use tracing::debug;
use veritas_common::literal::Value;
use veritas_common::normalize::{results_match, CallMode};
use veritas_common::types::{CaseResult, HarnessResult, VerifyReport};
use veritas_common::wire::{decode_value, is_structure};
use veritas_common::HarnessError;

use crate::engine::RawRun;

/// A case after parsing, before the run.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedCase {
    Ready {
        index: usize,
        input: String,
        expected_text: String,
        expected: Value,
        mode: CallMode,
    },
    /// Failed to parse or plan; carried through unchanged.
    Rejected(CaseResult),
}

impl PreparedCase {
    pub fn index(&self) -> usize {
        match self {
            PreparedCase::Ready { index, .. } => *index,
            PreparedCase::Rejected(result) => result.index,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreparedCase::Ready { .. })
    }
}

#[derive(Debug, Deserialize)]
struct HarnessLine {
    #[serde(default)]
    cases: Vec<CaseLine>,
    #[serde(default)]
    fatal: Option<FatalLine>,
}

#[derive(Debug, Deserialize)]
struct CaseLine {
    case: usize,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FatalLine {
    kind: String,
    detail: String,
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Split stdout into (logs, result line).
fn split_output(stdout: &str) -> (String, Option<&str>) {
    let trimmed = stdout.trim_end();
    match trimmed.rfind('\n') {
        Some(pos) => (
            trimmed[..pos].trim_end().to_string(),
            Some(trimmed[pos + 1..].trim()),
        ),
        None if trimmed.is_empty() => (String::new(), None),
        None => (String::new(), Some(trimmed.trim())),
    }
}

fn fatal_error(fatal: FatalLine) -> HarnessError {
    match fatal.kind.as_str() {
        "CandidateLoadError" => HarnessError::CandidateLoad(fatal.detail),
        "NoCandidateFound" => HarnessError::NoCandidateFound(fatal.detail),
        other => HarnessError::Execution(format!("{}: {}", other, fatal.detail)),
    }
}

fn judge(
    index: usize,
    input: String,
    expected_text: String,
    expected: &Value,
    mode: CallMode,
    line: Option<&CaseLine>,
) -> CaseResult {
    let Some(line) = line else {
        let err = HarnessError::OutputDecode(format!("no result reported for case {}", index));
        return CaseResult::failed(index, &input, expected_text, &err);
    };
    if let Some(message) = &line.error {
        return CaseResult::failed(index, &input, expected_text, &HarnessError::Runtime(message.clone()));
    }

    let actual = match decode_value(&line.value) {
        Ok(actual) => actual,
        Err(e) => return CaseResult::failed(index, &input, expected_text, &e.into()),
    };
    let passed = results_match(expected, &actual, mode, is_structure(&line.value));
    CaseResult {
        index,
        passed,
        input,
        expected: expected_text,
        actual: actual.to_string(),
        error: None,
    }
}

/// Build the final report for one run.
pub fn assemble(prepared: Vec<PreparedCase>, run: RawRun) -> VerifyReport {
    let stderr = non_empty(run.stderr);
    if run.timed_out {
        return VerifyReport::failure(&HarnessError::Timeout, String::new(), None);
    }

    let (logs, last) = split_output(&run.stdout);
    let Some(last) = last else {
        let err = HarnessError::OutputDecode(format!(
            "harness produced no result line (exit code {:?})",
            run.exit_code
        ));
        return VerifyReport::failure(&err, run.stdout.trim_end().to_string(), stderr);
    };
    let line: HarnessLine = match serde_json::from_str(last) {
        Ok(line) => line,
        Err(e) => {
            let err = HarnessError::OutputDecode(format!("invalid result line: {}", e));
            return VerifyReport::failure(&err, run.stdout.trim_end().to_string(), stderr);
        }
    };
    if let Some(fatal) = line.fatal {
        return VerifyReport::failure(&fatal_error(fatal), logs, stderr);
    }

    debug!(reported = line.cases.len(), "Result line decoded");

    let results = prepared
        .into_iter()
        .map(|case| match case {
            PreparedCase::Rejected(result) => result,
            PreparedCase::Ready {
                index,
                input,
                expected_text,
                expected,
                mode,
            } => {
                let reported = line.cases.iter().find(|c| c.case == index);
                judge(index, input, expected_text, &expected, mode, reported)
            }
        })
        .collect();

    VerifyReport::from_harness(HarnessResult::new(results, logs, None), stderr)
}
