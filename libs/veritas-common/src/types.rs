use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::HarnessError;

/// One literal input/output pair.
///
/// `input` binds zero or more variables (`nums = [2,7,11,15], target = 9`),
/// `output` is a single literal expression (`[0,1]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(alias = "expected_output", alias = "expectedOutput")]
    pub output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Outcome of a single test case. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    #[serde(rename = "case")]
    pub index: usize,
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseResult {
    /// A case that failed before or during the call.
    pub fn failed(index: usize, input: &str, expected: String, error: &HarnessError) -> Self {
        Self {
            index,
            passed: false,
            input: input.to_string(),
            expected,
            actual: String::new(),
            error: Some(error.to_string()),
        }
    }
}

/// What the harness itself concluded about a batch of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessResult {
    pub passed: bool,
    pub results: Vec<CaseResult>,
    pub logs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HarnessResult {
    /// `passed` holds iff there is at least one case, every case passed and
    /// no top-level error was recorded.
    pub fn new(results: Vec<CaseResult>, logs: String, error: Option<String>) -> Self {
        let passed = error.is_none() && !results.is_empty() && results.iter().all(|r| r.passed);
        Self {
            passed,
            results,
            logs,
            error,
        }
    }
}

/// Caller-facing contract.
///
/// `success = false` means the harness could not run the code at all
/// (timeout, nothing to call, undecodable output); `passed = false` with
/// `success = true` means the code ran and got something wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub success: bool,
    pub passed: bool,
    pub results: Vec<CaseResult>,
    pub logs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl VerifyReport {
    pub fn from_harness(result: HarnessResult, stderr: Option<String>) -> Self {
        Self {
            success: true,
            passed: result.passed,
            results: result.results,
            logs: result.logs,
            error: result.error,
            stderr,
        }
    }

    /// Infrastructure failure: no per-case results survive.
    pub fn failure(error: &HarnessError, logs: String, stderr: Option<String>) -> Self {
        Self {
            success: false,
            passed: false,
            results: Vec::new(),
            logs,
            error: Some(error.to_string()),
            stderr,
        }
    }
}

/// Explicit entry point, overriding discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryPoint {
    Function { name: String },
    Class { name: String },
    /// A method on a wrapper class instantiated without arguments per case.
    Method { class: String, name: String },
}

impl EntryPoint {
    pub fn name(&self) -> &str {
        match self {
            EntryPoint::Function { name } | EntryPoint::Class { name } => name,
            EntryPoint::Method { name, .. } => name,
        }
    }
}

/// Structure kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKind {
    LinkedList,
    Tree,
    Graph,
    Scalar,
}

impl std::str::FromStr for ParamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linkedList" | "linked-list" | "list" => Ok(ParamKind::LinkedList),
            "tree" => Ok(ParamKind::Tree),
            "graph" => Ok(ParamKind::Graph),
            "scalar" => Ok(ParamKind::Scalar),
            other => Err(format!("unknown parameter kind: {}", other)),
        }
    }
}

/// Per-parameter structure kinds, keyed by parameter name.
pub type ParamSchema = BTreeMap<String, ParamKind>;

/// Full verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
    #[serde(alias = "testCases")]
    pub test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ParamSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl VerifyRequest {
    pub fn new(code: impl Into<String>, test_cases: Vec<TestCase>) -> Self {
        Self {
            code: code.into(),
            test_cases,
            entry: None,
            schema: None,
            timeout_ms: None,
        }
    }
}
