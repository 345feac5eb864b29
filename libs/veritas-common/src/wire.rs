//! JSON wire codec between the harness and the child process.
//!
//! Plain JSON carries plain values. Tagged objects carry the rest:
//!
//! - `{"$dict": {...}}` an object literal (so user data never collides with tags)
//! - `{"$nodes": [...], "$kind": "..."}` a node table, entry node 0
//! - `{"$set": [...]}` an unordered collection, sorted on arrival
//! - `{"$repr": "..."}` anything the child could not encode, kept as a string
//! - `{"$float": "inf"}` a non-finite float sent to the child

use serde_json::{json, Map, Number};

use crate::literal::Value;
use crate::structures::{Node, NodeTable, Slot, StructureError, StructureKind};

pub fn encode_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => match Number::from_f64(*f) {
            Some(n) => serde_json::Value::Number(n),
            None => json!({ "$float": f.to_string() }),
        },
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(encode_value).collect()),
        Value::Object(map) => {
            let inner: Map<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "$dict": inner })
        }
    }
}

fn encode_slot(slot: Slot) -> Option<serde_json::Value> {
    match slot {
        Slot::Absent => None,
        Slot::Empty => Some(serde_json::Value::Null),
        Slot::To(i) => Some(json!(i)),
    }
}

pub fn encode_structure(table: &NodeTable, kind: StructureKind) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = table
        .nodes
        .iter()
        .map(|node| {
            let mut obj = Map::new();
            obj.insert("val".to_string(), encode_value(&node.val));
            for (key, slot) in [
                ("next", node.next),
                ("random", node.random),
                ("left", node.left),
                ("right", node.right),
            ] {
                if let Some(v) = encode_slot(slot) {
                    obj.insert(key.to_string(), v);
                }
            }
            if let Some(neighbors) = &node.neighbors {
                obj.insert("neighbors".to_string(), json!(neighbors));
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    json!({ "$kind": kind.as_str(), "$nodes": nodes })
}

/// True when the top level of `json` is a node table.
pub fn is_structure(json: &serde_json::Value) -> bool {
    json.as_object().is_some_and(|obj| obj.contains_key("$nodes"))
}

/// Decode a value produced by the child. Node tables are converted to their
/// canonical literal form wherever they appear.
pub fn decode_value(json: &serde_json::Value) -> Result<Value, StructureError> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(decode_value).collect::<Result<_, _>>()?)
        }
        serde_json::Value::Object(obj) => {
            if let Some(nodes) = obj.get("$nodes") {
                decode_table(nodes)?.to_value()?
            } else if let Some(inner) = obj.get("$dict") {
                decode_object(inner)?
            } else if let Some(items) = obj.get("$set") {
                let mut values = match decode_value(items)? {
                    Value::List(values) => values,
                    other => vec![other],
                };
                values.sort_by(|a, b| a.total_cmp(b));
                Value::List(values)
            } else if let Some(repr) = obj.get("$repr") {
                Value::Str(repr.as_str().unwrap_or_default().to_string())
            } else {
                decode_object(json)?
            }
        }
    })
}

fn decode_object(json: &serde_json::Value) -> Result<Value, StructureError> {
    let obj = json
        .as_object()
        .ok_or_else(|| StructureError("tagged object payload is not an object".to_string()))?;
    let mut map = std::collections::BTreeMap::new();
    for (key, value) in obj {
        map.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(map))
}

fn decode_slot(obj: &Map<String, serde_json::Value>, key: &str) -> Result<Slot, StructureError> {
    match obj.get(key) {
        None => Ok(Slot::Absent),
        Some(serde_json::Value::Null) => Ok(Slot::Empty),
        Some(v) => v
            .as_u64()
            .map(|i| Slot::To(i as usize))
            .ok_or_else(|| StructureError(format!("`{}` must be a node index, got {}", key, v))),
    }
}

/// Parse a `$nodes` array into a table. Index validity is checked by the
/// converters, which know which relations they follow.
pub fn decode_table(nodes: &serde_json::Value) -> Result<NodeTable, StructureError> {
    let entries = nodes
        .as_array()
        .ok_or_else(|| StructureError("`$nodes` must be an array".to_string()))?;

    let mut table = NodeTable::default();
    for entry in entries {
        let obj = entry
            .as_object()
            .ok_or_else(|| StructureError("node entry must be an object".to_string()))?;
        let val = match obj.get("val") {
            Some(v) => decode_value(v)?,
            None => Value::Null,
        };
        let mut node = Node::new(val);
        node.next = decode_slot(obj, "next")?;
        node.random = decode_slot(obj, "random")?;
        node.left = decode_slot(obj, "left")?;
        node.right = decode_slot(obj, "right")?;
        node.neighbors = match obj.get("neighbors") {
            None => None,
            Some(serde_json::Value::Array(ids)) => Some(
                ids.iter()
                    .map(|id| {
                        id.as_u64().map(|i| i as usize).ok_or_else(|| {
                            StructureError(format!("neighbor must be a node index, got {}", id))
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Some(other) => {
                return Err(StructureError(format!("`neighbors` must be an array, got {}", other)))
            }
        };
        table.push(node);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_value;
    use crate::structures::{array_to_list, array_to_tree};

    fn lit(text: &str) -> Value {
        parse_value(text).unwrap()
    }

    #[test]
    fn test_plain_values_pass_through() {
        let value = lit("[1, 2.5, 'a', null, true]");
        let encoded = encode_value(&value);
        assert_eq!(encoded, json!([1, 2.5, "a", null, true]));
        assert_eq!(decode_value(&encoded).unwrap(), value);
    }

    #[test]
    fn test_objects_are_tagged() {
        let value = lit("{'k': [1]}");
        let encoded = encode_value(&value);
        assert_eq!(encoded, json!({"$dict": {"k": [1]}}));
        assert_eq!(decode_value(&encoded).unwrap(), value);
    }

    #[test]
    fn test_non_finite_float_is_tagged() {
        assert_eq!(encode_value(&Value::Float(f64::INFINITY)), json!({"$float": "inf"}));
    }

    #[test]
    fn test_list_structure_encoding() {
        let table = array_to_list(&[Value::Int(1), Value::Int(2)], -1)
            .unwrap()
            .unwrap();
        let encoded = encode_structure(&table, StructureKind::List);
        assert_eq!(
            encoded,
            json!({"$kind": "list", "$nodes": [{"val": 1, "next": 1}, {"val": 2, "next": null}]})
        );
        assert!(is_structure(&encoded));
        assert_eq!(decode_value(&encoded).unwrap(), lit("[1, 2]"));
    }

    #[test]
    fn test_child_tree_output_decodes() {
        let json = json!({"$nodes": [
            {"val": 2, "left": 1, "right": 2},
            {"val": 1, "left": null, "right": null},
            {"val": 3, "left": null, "right": null}
        ]});
        assert_eq!(decode_value(&json).unwrap(), lit("[2, 1, 3]"));
    }

    #[test]
    fn test_tree_round_trip_through_wire() {
        let table = array_to_tree(&match lit("[1, null, 2, 3]") {
            Value::List(items) => items,
            _ => unreachable!(),
        })
        .unwrap()
        .unwrap();
        let encoded = encode_structure(&table, StructureKind::Tree);
        assert_eq!(decode_value(&encoded).unwrap(), lit("[1, null, 2, 3]"));
    }

    #[test]
    fn test_structures_nested_in_lists() {
        let json = json!([null, {"$nodes": [{"val": 4, "next": null}]}]);
        assert!(!is_structure(&json));
        assert_eq!(decode_value(&json).unwrap(), lit("[null, [4]]"));
    }

    #[test]
    fn test_sets_sorted_and_reprs_kept() {
        assert_eq!(decode_value(&json!({"$set": [3, 1, 2]})).unwrap(), lit("[1, 2, 3]"));
        assert_eq!(
            decode_value(&json!({"$repr": "<Foo>"})).unwrap(),
            Value::Str("<Foo>".into())
        );
    }

    #[test]
    fn test_bad_node_reference() {
        let json = json!({"$nodes": [{"val": 1, "next": "x"}]});
        assert!(decode_value(&json).is_err());
        let json = json!({"$nodes": [{"val": 1, "next": 7}]});
        assert!(decode_value(&json).is_err());
    }
}
