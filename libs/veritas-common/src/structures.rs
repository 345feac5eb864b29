//! Structure converters.
//!
//! Linked lists, binary trees and graphs travel as flat literal arrays in
//! test cases and as [`NodeTable`]s (index-addressed arenas) everywhere else.
//! Node 0 is always the entry node (head, root or the graph node passed in).
//!
//! **Encodings**
//! - list: `[1, 2, 3]`, optionally with a cycle position for the last node
//! - random list: `[[7, null], [13, 0], ...]` (value, random target index)
//! - tree: level order with `null` for absent children, trailing nulls trimmed
//! - graph: 1-based adjacency rows, node id = row index + 1

use std::collections::VecDeque;

use thiserror::Error;

use crate::error::HarnessError;
use crate::literal::Value;

/// Graph ids above this are rejected instead of allocating huge row tables.
pub const MAX_GRAPH_ID: i64 = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StructureError(pub String);

impl From<StructureError> for HarnessError {
    fn from(err: StructureError) -> Self {
        HarnessError::Structure(err.0)
    }
}

/// A pointer field. `Absent` means the node has no such field at all,
/// `Empty` means the field exists and is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Absent,
    Empty,
    To(usize),
}

impl Slot {
    pub fn target(self) -> Option<usize> {
        match self {
            Slot::To(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, Slot::Absent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub val: Value,
    pub next: Slot,
    pub random: Slot,
    pub left: Slot,
    pub right: Slot,
    pub neighbors: Option<Vec<usize>>,
}

impl Node {
    pub fn new(val: Value) -> Self {
        Self {
            val,
            next: Slot::Absent,
            random: Slot::Absent,
            left: Slot::Absent,
            right: Slot::Absent,
            neighbors: None,
        }
    }
}

/// Shape of a node table, as far as relations tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    List,
    RandomList,
    Tree,
    Graph,
}

impl StructureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::List => "list",
            StructureKind::RandomList => "random_list",
            StructureKind::Tree => "tree",
            StructureKind::Graph => "graph",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeTable {
    pub nodes: Vec<Node>,
}

impl NodeTable {
    pub fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, index: usize) -> Result<&Node, StructureError> {
        self.nodes
            .get(index)
            .ok_or_else(|| StructureError(format!("node reference {} out of range", index)))
    }

    /// `neighbors` wins over `left`/`right`, which win over `next`/`random`.
    pub fn kind(&self) -> StructureKind {
        if self.nodes.iter().any(|n| n.neighbors.is_some()) {
            StructureKind::Graph
        } else if self
            .nodes
            .iter()
            .any(|n| n.left.is_present() || n.right.is_present())
        {
            StructureKind::Tree
        } else if self.nodes.iter().any(|n| n.random.is_present()) {
            StructureKind::RandomList
        } else {
            StructureKind::List
        }
    }

    /// Back to the canonical literal for whatever shape this table has.
    pub fn to_value(&self) -> Result<Value, StructureError> {
        match self.kind() {
            StructureKind::Graph => graph_to_adjacency(self),
            StructureKind::Tree => tree_to_array(self),
            StructureKind::List | StructureKind::RandomList => list_to_array(self),
        }
    }
}

fn random_pair(item: &Value) -> Option<(&Value, &Value)> {
    match item.as_list() {
        Some([val, target]) if target.is_null() || matches!(target, Value::Int(_)) => {
            Some((val, target))
        }
        _ => None,
    }
}

/// Build a list. A negative or out-of-range `cycle_pos` means no cycle.
pub fn array_to_list(items: &[Value], cycle_pos: i64) -> Result<Option<NodeTable>, StructureError> {
    if items.is_empty() {
        return Ok(None);
    }

    let random = items.iter().all(|item| random_pair(item).is_some());
    let len = items.len();
    let mut table = NodeTable::default();

    for (i, item) in items.iter().enumerate() {
        let mut node = match random_pair(item) {
            Some((val, _)) if random => Node::new(val.clone()),
            _ => Node::new(item.clone()),
        };
        node.next = if i + 1 < len { Slot::To(i + 1) } else { Slot::Empty };
        table.push(node);
    }

    if random {
        for (i, item) in items.iter().enumerate() {
            let Some((_, target)) = random_pair(item) else {
                continue;
            };
            table.nodes[i].random = match target {
                Value::Int(t) if *t >= 0 && (*t as usize) < len => Slot::To(*t as usize),
                Value::Int(t) => {
                    return Err(StructureError(format!(
                        "random index {} out of range for list of {} nodes",
                        t, len
                    )))
                }
                _ => Slot::Empty,
            };
        }
    }

    if cycle_pos >= 0 && (cycle_pos as usize) < len {
        table.nodes[len - 1].next = Slot::To(cycle_pos as usize);
    }

    Ok(Some(table))
}

/// Walk `next` from node 0, stopping at the first revisit.
pub fn list_to_array(table: &NodeTable) -> Result<Value, StructureError> {
    if table.is_empty() {
        return Ok(Value::Null);
    }

    let mut order = Vec::new();
    let mut position = vec![None; table.len()];
    let mut current = Some(0);
    while let Some(i) = current {
        let node = table.node(i)?;
        if position[i].is_some() {
            break;
        }
        position[i] = Some(order.len());
        order.push(i);
        current = node.next.target();
    }

    let has_random = order.iter().any(|&i| table.nodes[i].random.is_present());

    let items = order
        .iter()
        .map(|&i| {
            let node = &table.nodes[i];
            if !has_random {
                return node.val.clone();
            }
            let target = node
                .random
                .target()
                .and_then(|t| position.get(t).copied().flatten())
                .map(|p| Value::Int(p as i64))
                .unwrap_or(Value::Null);
            Value::List(vec![node.val.clone(), target])
        })
        .collect();

    Ok(Value::List(items))
}

/// Level-order layout; each dequeued node consumes two slots.
pub fn array_to_tree(items: &[Value]) -> Result<Option<NodeTable>, StructureError> {
    let Some(first) = items.first() else {
        return Ok(None);
    };
    if first.is_null() {
        return Ok(None);
    }

    let mut table = NodeTable::default();
    let mut root = Node::new(first.clone());
    root.left = Slot::Empty;
    root.right = Slot::Empty;
    table.push(root);

    let mut queue = VecDeque::from([0usize]);
    let mut cursor = 1;
    while cursor < items.len() {
        let Some(parent) = queue.pop_front() else {
            break;
        };
        for side in 0..2 {
            let Some(item) = items.get(cursor) else {
                break;
            };
            cursor += 1;
            if item.is_null() {
                continue;
            }
            let mut child = Node::new(item.clone());
            child.left = Slot::Empty;
            child.right = Slot::Empty;
            let index = table.push(child);
            if side == 0 {
                table.nodes[parent].left = Slot::To(index);
            } else {
                table.nodes[parent].right = Slot::To(index);
            }
            queue.push_back(index);
        }
    }

    Ok(Some(table))
}

/// Inverse of [`array_to_tree`]. Fails if any node is reachable twice.
pub fn tree_to_array(table: &NodeTable) -> Result<Value, StructureError> {
    if table.is_empty() {
        return Ok(Value::Null);
    }

    let mut seen = vec![false; table.len()];
    seen[0] = true;
    let mut out = Vec::new();
    let mut queue = VecDeque::from([Some(0usize)]);

    while let Some(slot) = queue.pop_front() {
        let Some(i) = slot else {
            out.push(Value::Null);
            continue;
        };
        let node = table.node(i)?;
        out.push(node.val.clone());
        for child in [node.left, node.right] {
            match child.target() {
                Some(j) => {
                    table.node(j)?;
                    if seen[j] {
                        return Err(StructureError(format!(
                            "tree node {} is reachable more than once",
                            j
                        )));
                    }
                    seen[j] = true;
                    queue.push_back(Some(j));
                }
                None => queue.push_back(None),
            }
        }
    }

    while matches!(out.last(), Some(Value::Null)) {
        out.pop();
    }
    Ok(Value::List(out))
}

/// One node per row; row `i` is node id `i + 1`.
pub fn adjacency_to_graph(rows: &[Value]) -> Result<Option<NodeTable>, StructureError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let count = rows.len();
    let mut table = NodeTable::default();
    for (i, row) in rows.iter().enumerate() {
        let ids = row.as_list().ok_or_else(|| {
            StructureError(format!("adjacency row {} is {}, expected a list", i, row.kind()))
        })?;
        let mut neighbors = Vec::with_capacity(ids.len());
        for id in ids {
            match id.as_i64() {
                Some(n) if n >= 1 && (n as usize) <= count => neighbors.push(n as usize - 1),
                _ => {
                    return Err(StructureError(format!(
                        "neighbor id {} out of range for graph of {} nodes",
                        id, count
                    )))
                }
            }
        }
        let mut node = Node::new(Value::Int(i as i64 + 1));
        node.neighbors = Some(neighbors);
        table.push(node);
    }

    Ok(Some(table))
}

/// BFS from node 0; rows are indexed by node id and sorted ascending.
pub fn graph_to_adjacency(table: &NodeTable) -> Result<Value, StructureError> {
    if table.is_empty() {
        return Ok(Value::Null);
    }

    let mut visited = vec![false; table.len()];
    visited[0] = true;
    let mut order = Vec::new();
    let mut queue = VecDeque::from([0usize]);
    while let Some(i) = queue.pop_front() {
        order.push(i);
        let node = table.node(i)?;
        for &j in node.neighbors.iter().flatten() {
            table.node(j)?;
            if !visited[j] {
                visited[j] = true;
                queue.push_back(j);
            }
        }
    }

    let mut ids = vec![0i64; table.len()];
    for &i in &order {
        let val = &table.nodes[i].val;
        ids[i] = match val.as_i64() {
            Some(id) if (1..=MAX_GRAPH_ID).contains(&id) => id,
            _ => {
                return Err(StructureError(format!(
                    "graph node id {} is not an integer in 1..={}",
                    val, MAX_GRAPH_ID
                )))
            }
        };
    }

    let max_id = order.iter().map(|&i| ids[i]).max().unwrap_or(0) as usize;
    let mut rows: Vec<Option<Vec<i64>>> = vec![None; max_id];
    for &i in &order {
        let mut row: Vec<i64> = table.nodes[i]
            .neighbors
            .iter()
            .flatten()
            .map(|&j| ids[j])
            .collect();
        row.sort_unstable();
        let slot = &mut rows[ids[i] as usize - 1];
        if slot.is_some() {
            return Err(StructureError(format!("duplicate graph node id {}", ids[i])));
        }
        *slot = Some(row);
    }

    Ok(Value::List(
        rows.into_iter()
            .map(|row| Value::List(row.unwrap_or_default().into_iter().map(Value::Int).collect()))
            .collect(),
    ))
}
