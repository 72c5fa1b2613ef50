use std::collections::{HashMap, HashSet};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{CharmError, Result};
use crate::simulator::node::DialogueNode;

/// Root node every conversation starts from.
pub const START_NODE_ID: &str = "intro";

/// Nodes a free-text reply can be routed to, best first.
pub const FALLBACK_NODE_IDS: [&str; 4] = ["excellent", "good", "recovery", "dead-end"];

/// A validated conversation graph: a map of node-id -> DialogueNode.
///
/// Construction checks that the start and fallback nodes exist, that every
/// option points at a known node with a score in range, and that the graph
/// has no cycles.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    nodes: HashMap<String, DialogueNode>,
    start_node_id: String,
    #[serde(skip)]
    max_steps: usize,
    #[serde(skip)]
    max_score: u32,
}

/// On-disk shape of a graph, before validation.
#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default = "default_start")]
    start_node_id: String,
    nodes: Vec<DialogueNode>,
}

fn default_start() -> String {
    START_NODE_ID.to_string()
}

#[derive(Clone, Copy)]
enum Mark {
    Active,
    Done,
}

impl Graph {
    pub fn new(nodes: Vec<DialogueNode>, start_node_id: impl Into<String>) -> Result<Self> {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        let mut graph = Self {
            nodes,
            start_node_id: start_node_id.into(),
            max_steps: 0,
            max_score: 0,
        };
        let (max_steps, max_score) = graph.validate()?;
        graph.max_steps = max_steps;
        graph.max_score = max_score;
        Ok(graph)
    }

    /// Load a graph from JSON of the form `{"start_node_id": .., "nodes": [..]}`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: GraphFile =
            serde_json::from_str(json).context("failed to parse dialogue graph JSON")?;
        let graph = Self::new(file.nodes, file.start_node_id)?;
        Ok(graph)
    }

    /// Look up a node. A missing id is an error.
    pub fn node(&self, id: &str) -> Result<&DialogueNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| CharmError::UnknownScenario(id.to_string()))
    }

    pub fn start_node_id(&self) -> &str {
        &self.start_node_id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of choices on the longest path from the start node.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Best cumulative score reachable by picking options only.
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Check the graph and return its `(max_steps, max_score)`.
    fn validate(&self) -> Result<(usize, u32)> {
        if !self.nodes.contains_key(&self.start_node_id) {
            return Err(CharmError::MissingStart(self.start_node_id.clone()));
        }
        for id in FALLBACK_NODE_IDS {
            if !self.nodes.contains_key(id) {
                return Err(CharmError::MissingFallback(id.to_string()));
            }
        }

        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort_unstable();

        for id in ids {
            let node = &self.nodes[id];
            let mut seen = HashSet::new();
            for option in &node.options {
                if !seen.insert(option.id.as_str()) {
                    return Err(CharmError::DuplicateOption {
                        node: node.id.clone(),
                        option: option.id.clone(),
                    });
                }
                if !(1..=10).contains(&option.quality_score) {
                    return Err(CharmError::ScoreOutOfRange {
                        node: node.id.clone(),
                        option: option.id.clone(),
                        score: option.quality_score,
                    });
                }
                if !self.nodes.contains_key(&option.next_node_id) {
                    return Err(CharmError::DanglingEdge {
                        node: node.id.clone(),
                        option: option.id.clone(),
                        target: option.next_node_id.clone(),
                    });
                }
            }
        }

        let order = self.post_order()?;
        Ok(self.measure(&order))
    }

    /// Every node, children before parents. Fails on the first back edge.
    ///
    /// Iterative so a long chain cannot overflow the stack. Assumes edges
    /// were already checked for dangling targets.
    fn post_order(&self) -> Result<Vec<&str>> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();

        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(ids.len());
        let mut order = Vec::with_capacity(ids.len());

        for root in ids {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::Active);
            // (node id, index of the next option to follow)
            let mut stack = vec![(root, 0)];

            while let Some(&(id, next)) = stack.last() {
                let Some(option) = self.nodes[id].options.get(next) else {
                    marks.insert(id, Mark::Done);
                    order.push(id);
                    stack.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                let child = option.next_node_id.as_str();
                match marks.get(child) {
                    Some(Mark::Done) => {}
                    Some(Mark::Active) => return Err(CharmError::Cycle(child.to_string())),
                    None => {
                        marks.insert(child, Mark::Active);
                        stack.push((child, 0));
                    }
                }
            }
        }
        Ok(order)
    }

    /// Longest path and best score from the start node, one pass over a
    /// post-order so each node is measured once.
    fn measure(&self, order: &[&str]) -> (usize, u32) {
        let mut best: HashMap<&str, (usize, u32)> = HashMap::with_capacity(order.len());
        for &id in order {
            let mut steps = 0;
            let mut score = 0;
            for option in &self.nodes[id].options {
                let (child_steps, child_score) = best[option.next_node_id.as_str()];
                steps = steps.max(child_steps + 1);
                score = score.max(option.quality_score + child_score);
            }
            best.insert(id, (steps, score));
        }
        best.get(self.start_node_id.as_str()).copied().unwrap_or_default()
    }
}
