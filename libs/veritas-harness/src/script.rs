//! Harness script rendering.
//!
//! A script is the fixed prelude followed by one call carrying the run's
//! payload (candidate code, entry point, call plans) as base64 JSON. Test
//! text never appears in the script as code.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use veritas_common::structures::StructureKind;
use veritas_common::types::EntryPoint;
use veritas_common::HarnessError;

use crate::dispatch::{CallPlan, Invocation};

pub const PRELUDE: &str = include_str!("../prelude/harness.py");

/// One case as the child sees it. `case` is the 1-based case number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedCase {
    pub case: usize,
    pub call: Invocation,
    #[serde(skip)]
    pub structures: Vec<StructureKind>,
}

impl PlannedCase {
    pub fn new(case: usize, plan: CallPlan) -> Self {
        Self {
            case,
            call: plan.invocation,
            structures: plan.structures,
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    code: &'a str,
    entry: &'a EntryPoint,
    /// Which shape the `Node` helper takes in the candidate's namespace.
    node: &'static str,
    cases: &'a [PlannedCase],
}

fn node_flavor(cases: &[PlannedCase]) -> &'static str {
    let random = cases
        .iter()
        .flat_map(|c| c.structures.iter())
        .any(|k| *k == StructureKind::RandomList);
    if random {
        StructureKind::RandomList.as_str()
    } else {
        StructureKind::Graph.as_str()
    }
}

pub fn render(code: &str, entry: &EntryPoint, cases: &[PlannedCase]) -> Result<String, HarnessError> {
    let payload = Payload {
        code,
        entry,
        node: node_flavor(cases),
        cases,
    };
    let json = serde_json::to_string(&payload)
        .map_err(|e| HarnessError::Execution(format!("failed to encode harness payload: {}", e)))?;
    let encoded = general_purpose::STANDARD.encode(json);

    Ok(format!("{}\n\n_harness_main(\"{}\")\n", PRELUDE, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn payload_of(script: &str) -> serde_json::Value {
        let line = script
            .lines()
            .rev()
            .find(|l| l.starts_with("_harness_main("))
            .unwrap();
        let b64 = line.trim_start_matches("_harness_main(\"").trim_end_matches("\")");
        let bytes = general_purpose::STANDARD.decode(b64).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn case(n: usize, structures: Vec<StructureKind>) -> PlannedCase {
        PlannedCase {
            case: n,
            call: Invocation::Function { kwargs: Map::new() },
            structures,
        }
    }

    #[test]
    fn test_script_embeds_payload() {
        let entry = EntryPoint::Function { name: "f".into() };
        let code = "def f():\n    return \"\"\"quotes\"\"\"\n";
        let script = render(code, &entry, &[case(1, vec![])]).unwrap();

        assert!(script.starts_with(PRELUDE));
        assert!(!script.contains("quotes"));
        let payload = payload_of(&script);
        assert_eq!(payload["code"], code);
        assert_eq!(payload["entry"], json!({"kind": "function", "name": "f"}));
        assert_eq!(payload["cases"], json!([{"case": 1, "call": {"mode": "function", "kwargs": {}}}]));
        assert_eq!(payload["node"], "graph");
    }

    #[test]
    fn test_random_list_flavor() {
        let entry = EntryPoint::Function { name: "copyRandomList".into() };
        let cases = [case(1, vec![]), case(2, vec![StructureKind::RandomList])];
        let payload = payload_of(&render("", &entry, &cases).unwrap());
        assert_eq!(payload["node"], "random_list");
    }

    #[test]
    fn test_prelude_defines_entry() {
        assert!(PRELUDE.contains("def _harness_main(payload):"));
        assert!(PRELUDE.contains("class ListNode:"));
        assert!(PRELUDE.contains("class TreeNode:"));
    }
}
