/// Call Dispatcher - Turning Bindings Into a Call Plan
///
/// **Function / method mode:**
/// Every declared parameter is looked up among the case's bindings. Arrays
/// bound to structure parameters are converted to node tables; everything
/// else is passed as a plain value. Arguments travel by keyword, and missing
/// bindings are simply left out so the candidate's own defaults apply.
///
/// **Class mode:**
/// A commands variable and an arguments variable describe a constructor call
/// followed by method calls. The child records one result per command, with
/// `null` for the constructor.
use serde::Serialize;
use serde_json::Map;
use veritas_common::literal::{Bindings, Value};
use veritas_common::structures::{adjacency_to_graph, array_to_list, array_to_tree, NodeTable, StructureKind};
use veritas_common::types::{ParamKind, ParamSchema};
use veritas_common::wire::{encode_structure, encode_value};
use veritas_common::HarnessError;

use crate::discovery::Candidate;

/// Parameter names treated as linked-list heads.
pub const LIST_PARAMS: &[&str] = &["head", "l1", "l2", "list1", "list2", "headA", "headB"];
/// Parameter names treated as tree roots.
pub const TREE_PARAMS: &[&str] = &["root", "p", "q", "root1", "root2", "subRoot"];
/// Binding holding the cycle position for list parameters.
pub const CYCLE_BINDING: &str = "pos";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub method: String,
    pub args: Vec<serde_json::Value>,
}

/// What the child does for one case, with wire-encoded arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Invocation {
    Function {
        kwargs: Map<String, serde_json::Value>,
    },
    Class {
        ctor: Vec<serde_json::Value>,
        steps: Vec<Step>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    pub invocation: Invocation,
    /// Structure kinds materialized for this case.
    pub structures: Vec<StructureKind>,
}

pub fn plan_call(
    candidate: &Candidate,
    bindings: &Bindings,
    schema: Option<&ParamSchema>,
) -> Result<CallPlan, HarnessError> {
    match candidate {
        Candidate::Function(sig) => plan_function(&sig.params, bindings, schema),
        Candidate::Method { method, .. } => plan_function(&method.params, bindings, schema),
        Candidate::Class(_) => plan_class(bindings),
    }
}

/// Name heuristic, used when no schema entry exists for the parameter.
pub fn guess_kind(name: &str, value: &Value) -> ParamKind {
    if LIST_PARAMS.contains(&name) {
        ParamKind::LinkedList
    } else if TREE_PARAMS.contains(&name) {
        ParamKind::Tree
    } else if name == "node"
        && value
            .as_list()
            .is_some_and(|rows| rows.iter().all(|row| row.as_list().is_some()))
    {
        ParamKind::Graph
    } else {
        ParamKind::Scalar
    }
}

fn plan_function(
    params: &[String],
    bindings: &Bindings,
    schema: Option<&ParamSchema>,
) -> Result<CallPlan, HarnessError> {
    let mut kwargs = Map::new();
    let mut structures = Vec::new();

    for name in params {
        let Some(value) = bindings.get(name) else {
            continue;
        };
        let kind = schema
            .and_then(|s| s.get(name))
            .copied()
            .unwrap_or_else(|| guess_kind(name, value));

        // only arrays are converted; null and scalars pass through
        let (Value::List(items), false) = (value, kind == ParamKind::Scalar) else {
            kwargs.insert(name.clone(), encode_value(value));
            continue;
        };
        let table: Option<NodeTable> = match kind {
            ParamKind::LinkedList => {
                let cycle_pos = bindings
                    .get(CYCLE_BINDING)
                    .and_then(Value::as_i64)
                    .unwrap_or(-1);
                array_to_list(items, cycle_pos)?
            }
            ParamKind::Tree => array_to_tree(items)?,
            ParamKind::Graph => adjacency_to_graph(items)?,
            ParamKind::Scalar => None,
        };

        let encoded = match table {
            Some(table) => {
                let shape = match kind {
                    ParamKind::Tree => StructureKind::Tree,
                    ParamKind::Graph => StructureKind::Graph,
                    _ => table.kind(),
                };
                structures.push(shape);
                encode_structure(&table, shape)
            }
            None => serde_json::Value::Null,
        };
        kwargs.insert(name.clone(), encoded);
    }

    Ok(CallPlan {
        invocation: Invocation::Function { kwargs },
        structures,
    })
}

fn class_misuse(detail: &str) -> HarnessError {
    HarnessError::Runtime(format!(
        "class solution requires a commands variable and an arguments variable in the test case ({})",
        detail
    ))
}

fn plan_class(bindings: &Bindings) -> Result<CallPlan, HarnessError> {
    let lowered = |name: &str| name.to_lowercase();
    let (command_var, commands) = bindings
        .iter()
        .find(|(name, _)| {
            let name = lowered(name);
            name.contains("command") || name.contains("method") || name.contains("op")
        })
        .ok_or_else(|| class_misuse("no commands variable"))?;
    let (_, arguments) = bindings
        .iter()
        .find(|(name, _)| {
            let lower = lowered(name);
            *name != command_var
                && (lower.contains("arg") || lower.contains("input") || lower.contains("val"))
        })
        .ok_or_else(|| class_misuse("no arguments variable"))?;

    let commands = commands
        .as_list()
        .ok_or_else(|| class_misuse("commands must be a list"))?;
    let arguments = arguments
        .as_list()
        .ok_or_else(|| class_misuse("arguments must be a list"))?;
    if commands.is_empty() {
        return Err(class_misuse("no constructor command"));
    }
    if commands.len() != arguments.len() {
        return Err(class_misuse(&format!(
            "{} commands but {} argument rows",
            commands.len(),
            arguments.len()
        )));
    }

    let mut rows = Vec::with_capacity(arguments.len());
    for row in arguments {
        let row = row
            .as_list()
            .ok_or_else(|| class_misuse("every argument row must be a list"))?;
        rows.push(row.iter().map(encode_value).collect::<Vec<_>>());
    }
    let mut rows = rows.into_iter();
    let ctor = rows.next().unwrap_or_default();

    let mut steps = Vec::with_capacity(commands.len() - 1);
    for (command, args) in commands[1..].iter().zip(rows) {
        let Value::Str(method) = command else {
            return Err(class_misuse(&format!("command {} is not a method name", command)));
        };
        steps.push(Step {
            method: method.clone(),
            args,
        });
    }

    Ok(CallPlan {
        invocation: Invocation::Class { ctor, steps },
        structures: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ClassOutline, Signature};
    use serde_json::json;
    use veritas_common::literal::parse_bindings;

    fn function(params: &[&str]) -> Candidate {
        Candidate::Function(Signature {
            name: "solve".into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            is_async: false,
        })
    }

    fn class() -> Candidate {
        Candidate::Class(ClassOutline {
            name: "MinStack".into(),
            methods: Vec::new(),
        })
    }

    fn kwargs(plan: &CallPlan) -> &Map<String, serde_json::Value> {
        match &plan.invocation {
            Invocation::Function { kwargs } => kwargs,
            other => panic!("expected function invocation, got {:?}", other),
        }
    }

    #[test]
    fn test_scalars_bound_by_name() {
        let bindings = parse_bindings("target = 9, nums = [2, 7, 11, 15]").unwrap();
        let plan = plan_call(&function(&["nums", "target"]), &bindings, None).unwrap();
        let kw = kwargs(&plan);
        assert_eq!(kw["nums"], json!([2, 7, 11, 15]));
        assert_eq!(kw["target"], json!(9));
        assert!(plan.structures.is_empty());
    }

    #[test]
    fn test_missing_binding_omitted() {
        let bindings = parse_bindings("nums = [1]").unwrap();
        let plan = plan_call(&function(&["nums", "k"]), &bindings, None).unwrap();
        assert!(!kwargs(&plan).contains_key("k"));
    }

    #[test]
    fn test_list_heuristic_with_cycle() {
        let bindings = parse_bindings("head = [3, 2, 0, -4], pos = 1").unwrap();
        let plan = plan_call(&function(&["head"]), &bindings, None).unwrap();
        let head = &kwargs(&plan)["head"];
        assert_eq!(head["$kind"], "list");
        assert_eq!(head["$nodes"][3]["next"], json!(1));
        assert_eq!(plan.structures, vec![StructureKind::List]);
    }

    #[test]
    fn test_random_list_detected() {
        let bindings = parse_bindings("head = [[7, null], [13, 0]]").unwrap();
        let plan = plan_call(&function(&["head"]), &bindings, None).unwrap();
        assert_eq!(kwargs(&plan)["head"]["$kind"], "random_list");
        assert_eq!(plan.structures, vec![StructureKind::RandomList]);
    }

    #[test]
    fn test_tree_and_graph_heuristics() {
        let bindings = parse_bindings("root = [1, null, 2], node = [[2], [1]]").unwrap();
        let plan = plan_call(&function(&["root", "node"]), &bindings, None).unwrap();
        let kw = kwargs(&plan);
        assert_eq!(kw["root"]["$kind"], "tree");
        assert_eq!(kw["node"]["$kind"], "graph");
        assert_eq!(kw["node"]["$nodes"][0]["neighbors"], json!([1]));
    }

    #[test]
    fn test_null_and_empty_structures() {
        let bindings = parse_bindings("head = [], root = null").unwrap();
        let plan = plan_call(&function(&["head", "root"]), &bindings, None).unwrap();
        let kw = kwargs(&plan);
        assert_eq!(kw["head"], json!(null));
        assert_eq!(kw["root"], json!(null));
    }

    #[test]
    fn test_schema_overrides_heuristic() {
        let bindings = parse_bindings("head = [1, 2], values = [4, 5]").unwrap();
        let schema = ParamSchema::from([
            ("head".to_string(), ParamKind::Scalar),
            ("values".to_string(), ParamKind::Tree),
        ]);
        let plan = plan_call(&function(&["head", "values"]), &bindings, Some(&schema)).unwrap();
        let kw = kwargs(&plan);
        assert_eq!(kw["head"], json!([1, 2]));
        assert_eq!(kw["values"]["$kind"], "tree");
    }

    #[test]
    fn test_bad_graph_is_structure_error() {
        let bindings = parse_bindings("node = [[5]]").unwrap();
        let err = plan_call(&function(&["node"]), &bindings, None).unwrap_err();
        assert!(matches!(err, HarnessError::Structure(_)));
    }

    #[test]
    fn test_class_plan() {
        let bindings = parse_bindings(
            r#"commands = ["MinStack", "push", "getMin"], args = [[], [-2], []]"#,
        )
        .unwrap();
        let plan = plan_call(&class(), &bindings, None).unwrap();
        assert_eq!(
            serde_json::to_value(&plan.invocation).unwrap(),
            json!({
                "mode": "class",
                "ctor": [],
                "steps": [
                    {"method": "push", "args": [-2]},
                    {"method": "getMin", "args": []}
                ]
            })
        );
    }

    #[test]
    fn test_class_plan_variable_names() {
        let bindings = parse_bindings(r#"Operations = ["C", "inc"], inputValues = [[1], []]"#).unwrap();
        assert!(plan_call(&class(), &bindings, None).is_ok());
    }

    #[test]
    fn test_class_plan_misuse() {
        let cases = [
            "nums = [1, 2]",
            r#"commands = ["A", "b"]"#,
            r#"commands = ["A", "b"], args = [[]]"#,
            r#"commands = ["A", "b"], args = [[], 3]"#,
            r#"commands = ["A", 7], args = [[], []]"#,
        ];
        for input in cases {
            let bindings = parse_bindings(input).unwrap();
            let err = plan_call(&class(), &bindings, None).unwrap_err();
            assert!(
                err.to_string().starts_with("RuntimeException: class solution requires"),
                "{}: {}",
                input,
                err
            );
        }
    }
}
