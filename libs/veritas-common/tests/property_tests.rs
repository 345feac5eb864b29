//! Property-based tests for structure conversion and comparison.

use proptest::prelude::*;
use veritas_common::literal::{parse_value, Value};
use veritas_common::normalize::{results_match, CallMode};
use veritas_common::structures::{
    adjacency_to_graph, array_to_list, array_to_tree, graph_to_adjacency, list_to_array,
    tree_to_array,
};

fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().map(|i| Value::Int(*i)).collect()
}

fn tree_items(slots: &[Option<i64>]) -> Vec<Value> {
    slots
        .iter()
        .map(|s| s.map(Value::Int).unwrap_or(Value::Null))
        .collect()
}

/// Connected undirected graph as sorted 1-based adjacency rows.
fn connected_graph(n: usize, parents: &[u32], extra: &[(usize, usize)]) -> Vec<Vec<i64>> {
    let mut rows = vec![Vec::new(); n];
    let mut link = |a: usize, b: usize| {
        if a != b && !rows[a].contains(&(b as i64 + 1)) {
            rows[a].push(b as i64 + 1);
            rows[b].push(a as i64 + 1);
        }
    };
    for i in 1..n {
        link(i, parents[i] as usize % i);
    }
    for &(a, b) in extra {
        if a < n && b < n {
            link(a, b);
        }
    }
    for row in &mut rows {
        row.sort_unstable();
    }
    rows
}

fn adjacency(rows: &[Vec<i64>]) -> Vec<Value> {
    rows.iter().map(|r| Value::List(ints(r))).collect()
}

// =============================================================================
// Structure Properties
// =============================================================================

proptest! {
    /// list_to_array(array_to_list(xs)) == xs
    #[test]
    fn list_round_trip(xs in prop::collection::vec(-1000i64..1000, 1..30)) {
        let table = array_to_list(&ints(&xs), -1).unwrap().unwrap();
        prop_assert_eq!(list_to_array(&table).unwrap(), Value::List(ints(&xs)));
    }

    /// A cycle never makes the walk loop; every node is emitted once.
    #[test]
    fn cyclic_list_terminates(
        (xs, pos) in prop::collection::vec(-50i64..50, 1..20)
            .prop_flat_map(|xs| { let n = xs.len(); (Just(xs), 0..n) })
    ) {
        let table = array_to_list(&ints(&xs), pos as i64).unwrap().unwrap();
        prop_assert_eq!(list_to_array(&table).unwrap(), Value::List(ints(&xs)));
    }

    /// One round trip canonicalizes a level-order array; the second is identity.
    #[test]
    fn tree_round_trip_is_stable(
        root in -100i64..100,
        rest in prop::collection::vec(prop::option::weighted(0.7, -100i64..100), 0..30)
    ) {
        let mut slots = vec![Some(root)];
        slots.extend(rest);
        let table = array_to_tree(&tree_items(&slots)).unwrap().unwrap();
        let once = tree_to_array(&table).unwrap();

        let Value::List(items) = &once else {
            panic!("tree serialized to {}", once);
        };
        prop_assert!(!matches!(items.last(), Some(Value::Null)));
        let again = tree_to_array(&array_to_tree(items).unwrap().unwrap()).unwrap();
        prop_assert_eq!(again, once);
    }

    /// Connected graphs survive adjacency -> nodes -> adjacency.
    #[test]
    fn graph_round_trip(
        n in 1usize..8,
        parents in prop::collection::vec(any::<u32>(), 8),
        extra in prop::collection::vec((0usize..8, 0usize..8), 0..10)
    ) {
        let rows = connected_graph(n, &parents, &extra);
        let table = adjacency_to_graph(&adjacency(&rows)).unwrap().unwrap();
        prop_assert_eq!(graph_to_adjacency(&table).unwrap(), Value::List(adjacency(&rows)));
    }
}

// =============================================================================
// Comparison Properties
// =============================================================================

proptest! {
    /// Matching never depends on which side is expected.
    #[test]
    fn comparison_is_symmetric(
        a in prop::collection::vec(prop::collection::vec(0i64..4, 0..3), 0..4),
        b in prop::collection::vec(prop::collection::vec(0i64..4, 0..3), 0..4)
    ) {
        let a = Value::List(a.iter().map(|r| Value::List(ints(r))).collect());
        let b = Value::List(b.iter().map(|r| Value::List(ints(r))).collect());
        prop_assert_eq!(
            results_match(&a, &b, CallMode::Function, false),
            results_match(&b, &a, CallMode::Function, false)
        );
    }

    /// Reordering groups and their members does not change the verdict.
    #[test]
    fn grouping_order_is_ignored(
        groups in prop::collection::vec(prop::collection::vec(-9i64..9, 1..4), 1..5)
    ) {
        let expected = Value::List(groups.iter().map(|g| Value::List(ints(g))).collect());
        let mut shuffled = groups.clone();
        shuffled.reverse();
        for g in &mut shuffled {
            g.reverse();
        }
        let actual = Value::List(shuffled.iter().map(|g| Value::List(ints(g))).collect());
        prop_assert!(results_match(&expected, &actual, CallMode::Function, false));
    }

    /// Display output is itself a literal that parses back to an equal value.
    #[test]
    fn display_reparses(xs in prop::collection::vec(any::<i64>(), 0..10), s in "[a-z\"'\\\\ ]{0,8}") {
        let value = Value::List(vec![Value::List(ints(&xs)), Value::Str(s), Value::Null]);
        prop_assert_eq!(parse_value(&value.to_string()).unwrap(), value);
    }
}
