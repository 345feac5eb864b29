//! Result normalization and comparison.

use crate::literal::Value;

/// How the candidate was called. Class mode results are per-step lists, so
/// the null-means-empty rule does not apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Function,
    Class,
}

fn category(value: &Value) -> Option<u8> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(1),
        Value::Int(_) | Value::Float(_) => Some(2),
        Value::Str(_) => Some(3),
        Value::List(_) => Some(4),
        Value::Object(_) => Some(5),
    }
}

/// A non-empty list of lists whose sublists are homogeneous and null-free.
pub fn is_order_insensitive(value: &Value) -> bool {
    let Some(outer) = value.as_list() else {
        return false;
    };
    !outer.is_empty()
        && outer.iter().all(|item| {
            let Some(inner) = item.as_list() else {
                return false;
            };
            let Some(first) = inner.first() else {
                return true;
            };
            let Some(kind) = category(first) else {
                return false;
            };
            inner.iter().all(|v| category(v) == Some(kind))
        })
}

/// Sort each sublist, then the outer list.
pub fn canonicalize(value: &Value) -> Value {
    let Some(outer) = value.as_list() else {
        return value.clone();
    };
    let mut rows: Vec<Value> = outer
        .iter()
        .map(|item| match item {
            Value::List(inner) => {
                let mut inner = inner.clone();
                inner.sort_by(|a, b| a.total_cmp(b));
                Value::List(inner)
            }
            other => other.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.total_cmp(b));
    Value::List(rows)
}

/// Compare a decoded result with the expected literal.
///
/// `actual_is_structure` is set when the top-level result came back as a
/// node table: adjacency rows and random-list pairs are positional and never
/// reordered.
pub fn results_match(expected: &Value, actual: &Value, mode: CallMode, actual_is_structure: bool) -> bool {
    let empty;
    let actual = if mode == CallMode::Function && actual.is_null() && expected.as_list().is_some() {
        empty = Value::List(Vec::new());
        &empty
    } else {
        actual
    };

    if !actual_is_structure && is_order_insensitive(expected) && is_order_insensitive(actual) {
        canonicalize(expected) == canonicalize(actual)
    } else {
        expected == actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_value;

    fn lit(text: &str) -> Value {
        parse_value(text).unwrap()
    }

    fn matches(expected: &str, actual: &str) -> bool {
        results_match(&lit(expected), &lit(actual), CallMode::Function, false)
    }

    #[test]
    fn test_group_order_ignored() {
        assert!(matches(
            r#"[["bat"], ["nat", "tan"], ["ate", "eat", "tea"]]"#,
            r#"[["eat", "tea", "ate"], ["tan", "nat"], ["bat"]]"#,
        ));
    }

    #[test]
    fn test_flat_list_order_matters() {
        assert!(!matches("[0, 1]", "[1, 0]"));
        assert!(matches("[0, 1]", "[0, 1]"));
    }

    #[test]
    fn test_nulls_disable_sorting() {
        assert!(!is_order_insensitive(&lit("[[7, null], [13, 0]]")));
        assert!(!matches("[[1, null], [2, 0]]", "[[2, 0], [1, null]]"));
    }

    #[test]
    fn test_mixed_sublist_disables_sorting() {
        assert!(!is_order_insensitive(&lit("[[1, 'a']]")));
        assert!(is_order_insensitive(&lit("[[], [1, 2.5]]")));
        assert!(!is_order_insensitive(&lit("[]")));
    }

    #[test]
    fn test_structure_results_stay_positional() {
        let expected = lit("[[2, 4], [1, 3], [2, 4], [1, 3]]");
        let shuffled = lit("[[1, 3], [2, 4], [2, 4], [1, 3]]");
        assert!(!results_match(&expected, &shuffled, CallMode::Function, true));
        assert!(results_match(&expected, &expected, CallMode::Function, true));
    }

    #[test]
    fn test_null_against_list() {
        assert!(results_match(&lit("[]"), &Value::Null, CallMode::Function, false));
        assert!(!results_match(&lit("[]"), &Value::Null, CallMode::Class, false));
        assert!(!results_match(&lit("[1]"), &Value::Null, CallMode::Function, false));
    }

    #[test]
    fn test_numeric_equality() {
        assert!(matches("2", "2.0"));
        assert!(!matches("1", "true"));
        assert!(matches("{'a': 1, 'b': 2}", "{'b': 2, 'a': 1}"));
    }
}
