// CLI commands for running the harness
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use veritas_common::constraints::{validate, ConstraintReport};
use veritas_common::types::{EntryPoint, ParamKind, ParamSchema, TestCase, VerifyRequest};
use veritas_harness::{Harness, HarnessSettings, RuntimeConfigManager};

pub struct VerifyOptions {
    pub code: PathBuf,
    pub cases: PathBuf,
    pub entry: Option<EntryPoint>,
    pub schema: Option<ParamSchema>,
    pub timeout_ms: Option<u64>,
    pub backend: Option<String>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct CaseCheck {
    case: usize,
    input: String,
    #[serde(flatten)]
    report: ConstraintReport,
}

/// Load a cases file: a JSON array of `{"input", "output"}` objects.
pub fn load_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_constraints(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_entry(
    entry: Option<String>,
    class: Option<String>,
    method: Option<String>,
) -> Result<Option<EntryPoint>> {
    if let Some(name) = entry {
        return Ok(Some(EntryPoint::Function { name }));
    }
    if let Some(name) = class {
        return Ok(Some(EntryPoint::Class { name }));
    }
    let Some(method) = method else {
        return Ok(None);
    };
    match method.split_once('.') {
        Some((class, name)) if !class.is_empty() && !name.is_empty() => Ok(Some(EntryPoint::Method {
            class: class.to_string(),
            name: name.to_string(),
        })),
        _ => bail!("--method expects CLASS.NAME, got '{}'", method),
    }
}

/// `PARAM=KIND` pairs into a schema; `None` when no pair was given.
pub fn parse_schema(pairs: &[String]) -> Result<Option<ParamSchema>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut schema = ParamSchema::new();
    for pair in pairs {
        let Some((param, kind)) = pair.split_once('=') else {
            bail!("--schema expects PARAM=KIND, got '{}'", pair);
        };
        let kind: ParamKind = kind.trim().parse().map_err(anyhow::Error::msg)?;
        schema.insert(param.trim().to_string(), kind);
    }
    Ok(Some(schema))
}

/// Run the harness; returns whether every case passed.
pub async fn verify(options: VerifyOptions) -> Result<bool> {
    let code = fs::read_to_string(&options.code)
        .with_context(|| format!("Failed to read {}", options.code.display()))?;
    let test_cases = load_cases(&options.cases)?;

    let mut settings = HarnessSettings::from_env()?;
    if let Some(backend) = &options.backend {
        settings.backend = backend.parse()?;
    }
    let runtimes = match &options.config {
        Some(path) => RuntimeConfigManager::load(path)?,
        None => RuntimeConfigManager::load_or_builtin()?,
    };
    let harness = Harness::new(settings, &runtimes)?;

    let request = VerifyRequest {
        code,
        test_cases,
        entry: options.entry,
        schema: options.schema,
        timeout_ms: options.timeout_ms,
    };
    let report = harness.verify_request(&request).await;
    info!(passed = report.passed, success = report.success, "Verification finished");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.passed)
}

pub fn check_cases(test_cases: Vec<TestCase>, constraints: &[String]) -> Vec<CaseCheck> {
    test_cases
        .into_iter()
        .enumerate()
        .map(|(i, case)| CaseCheck {
            case: i + 1,
            report: validate(&case.input, constraints),
            input: case.input,
        })
        .collect()
}

/// Validate every case input; returns whether all inputs are valid.
pub fn check(cases: &Path, constraints: &Path) -> Result<bool> {
    let checks = check_cases(load_cases(cases)?, &load_constraints(constraints)?);

    println!("{}", serde_json::to_string_pretty(&checks)?);
    Ok(checks.iter().all(|c| c.report.valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_entry_variants() {
        assert_eq!(parse_entry(None, None, None).unwrap(), None);
        assert_eq!(
            parse_entry(Some("twoSum".into()), None, None).unwrap(),
            Some(EntryPoint::Function { name: "twoSum".into() })
        );
        assert_eq!(
            parse_entry(None, None, Some("Solution.twoSum".into())).unwrap(),
            Some(EntryPoint::Method {
                class: "Solution".into(),
                name: "twoSum".into()
            })
        );
        assert!(parse_entry(None, None, Some("twoSum".into())).is_err());
    }

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(&["head=linkedList".into(), "root = tree".into()])
            .unwrap()
            .unwrap();
        assert_eq!(schema["head"], ParamKind::LinkedList);
        assert_eq!(schema["root"], ParamKind::Tree);

        assert!(parse_schema(&[]).unwrap().is_none());
        assert!(parse_schema(&["head".into()]).is_err());
        assert!(parse_schema(&["head=matrix".into()]).is_err());
    }

    #[test]
    fn test_load_cases_accepts_aliases() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"input": "x = 1", "output": "1"}}, {{"input": "x = 2", "expected_output": "2"}}]"#
        )
        .unwrap();
        let cases = load_cases(file.path()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].output, "2");
    }

    #[test]
    fn test_check_reports_violations() {
        let mut cases = tempfile::NamedTempFile::new().unwrap();
        write!(cases, r#"[{{"input": "nums = [1, 2], k = 0", "output": "0"}}]"#).unwrap();
        let mut constraints = tempfile::NamedTempFile::new().unwrap();
        write!(constraints, r#"["1 <= k <= 10"]"#).unwrap();

        assert!(!check(cases.path(), constraints.path()).unwrap());
    }

    #[test]
    fn test_check_cases_messages() {
        let cases = vec![
            TestCase::new("nums = [1, 2], k = 0", "0"),
            TestCase::new("nums = [1, 2], k = 5", "0"),
        ];
        let constraints = vec!["1 <= k <= 10".to_string(), "1 <= nums.length <= 5".to_string()];
        let checks = check_cases(cases, &constraints);

        assert_eq!(checks[0].case, 1);
        assert_eq!(
            checks[0].report.errors,
            vec!["k = 0 violates constraint: 1 <= k <= 10 (minimum is 1)"]
        );
        assert!(checks[1].report.valid);
    }
}
