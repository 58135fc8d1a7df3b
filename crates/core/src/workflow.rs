//! Guest flow graphs (guestbook, upload, face search, ...).
//!
//! A workflow is a small directed graph of UI steps stored as JSON. The
//! backend never executes it; it validates the shape before persisting and
//! answers "what comes after this step" for clients walking the flow.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum number of nodes accepted in a single workflow.
pub const MAX_NODES: usize = 200;

/// Maximum number of edges accepted in a single workflow.
pub const MAX_EDGES: usize = 400;

// ---------------------------------------------------------------------------
// Flow types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    Guestbook,
    Upload,
    FaceSearch,
    Mosaic,
    Drawbot,
    Spinner,
}

impl FlowType {
    pub const ALL: [FlowType; 6] = [
        FlowType::Guestbook,
        FlowType::Upload,
        FlowType::FaceSearch,
        FlowType::Mosaic,
        FlowType::Drawbot,
        FlowType::Spinner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlowType::Guestbook => "GUESTBOOK",
            FlowType::Upload => "UPLOAD",
            FlowType::FaceSearch => "FACE_SEARCH",
            FlowType::Mosaic => "MOSAIC",
            FlowType::Drawbot => "DRAWBOT",
            FlowType::Spinner => "SPINNER",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = String;

    /// Accepts `FACE_SEARCH`, `face_search` and `face-search`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        FlowType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown workflow type '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Step kinds a node may have.
pub mod node_kinds {
    pub const START: &str = "START";
    pub const END: &str = "END";
    pub const FORM: &str = "FORM";
    pub const UPLOAD: &str = "UPLOAD";
    pub const CAMERA: &str = "CAMERA";
    pub const FACE_MATCH: &str = "FACE_MATCH";
    pub const MESSAGE: &str = "MESSAGE";
    pub const CONDITION: &str = "CONDITION";

    pub const ALL: &[&str] = &[
        START, END, FORM, UPLOAD, CAMERA, FACE_MATCH, MESSAGE, CONDITION,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub from: String,
    pub to: String,
    /// Branch label for edges leaving a `CONDITION` node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    /// Parse the stored `nodes` / `edges` JSON columns into a graph.
    pub fn from_json(
        nodes: &serde_json::Value,
        edges: &serde_json::Value,
    ) -> Result<Self, String> {
        let nodes: Vec<WorkflowNode> =
            serde_json::from_value(nodes.clone()).map_err(|e| format!("nodes: {e}"))?;
        let edges: Vec<WorkflowEdge> =
            serde_json::from_value(edges.clone()).map_err(|e| format!("edges: {e}"))?;
        Ok(Self { nodes, edges })
    }

    pub fn start_node(&self) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.kind == node_kinds::START)
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes directly following `from`, in edge declaration order.
    ///
    /// Returns `None` when `from` is not part of the graph.
    pub fn next_nodes(&self, from: &str) -> Option<Vec<(&WorkflowNode, Option<&str>)>> {
        self.node(from)?;
        Some(
            self.edges
                .iter()
                .filter(|e| e.from == from)
                .filter_map(|e| self.node(&e.to).map(|n| (n, e.condition.as_deref())))
                .collect(),
        )
    }

    /// Validate structural rules. Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.nodes.is_empty() {
            return Err(vec!["Workflow must contain at least one node".to_string()]);
        }
        if self.nodes.len() > MAX_NODES {
            errors.push(format!(
                "Workflow has {} nodes, exceeding the maximum of {MAX_NODES}",
                self.nodes.len()
            ));
        }
        if self.edges.len() > MAX_EDGES {
            errors.push(format!(
                "Workflow has {} edges, exceeding the maximum of {MAX_EDGES}",
                self.edges.len()
            ));
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id.trim().is_empty() {
                errors.push("Node ids must not be empty".to_string());
            } else if !seen.insert(node.id.as_str()) {
                errors.push(format!("Duplicate node id '{}'", node.id));
            }
            if !node_kinds::ALL.contains(&node.kind.as_str()) {
                errors.push(format!("Node '{}' has unknown kind '{}'", node.id, node.kind));
            }
        }

        let starts = self
            .nodes
            .iter()
            .filter(|n| n.kind == node_kinds::START)
            .count();
        if starts != 1 {
            errors.push(format!("Workflow must have exactly one START node, found {starts}"));
        }
        if !self.nodes.iter().any(|n| n.kind == node_kinds::END) {
            errors.push("Workflow must have at least one END node".to_string());
        }

        for edge in &self.edges {
            if !seen.contains(edge.from.as_str()) {
                errors.push(format!("Edge references unknown source node '{}'", edge.from));
            }
            if !seen.contains(edge.to.as_str()) {
                errors.push(format!("Edge references unknown target node '{}'", edge.to));
            }
            if edge.from == edge.to {
                errors.push(format!("Node '{}' has an edge to itself", edge.from));
            }
        }

        if starts == 1 {
            let unreachable = self.unreachable_from_start();
            if !unreachable.is_empty() {
                errors.push(format!(
                    "Nodes not reachable from START: {}",
                    unreachable.join(", ")
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Breadth-first walk from the START node; returns ids never visited.
    fn unreachable_from_start(&self) -> Vec<String> {
        let Some(start) = self.start_node() else {
            return Vec::new();
        };

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }

        let mut visited = HashSet::from([start.id.as_str()]);
        let mut queue = VecDeque::from([start.id.as_str()]);
        while let Some(current) = queue.pop_front() {
            for &next in adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        self.nodes
            .iter()
            .filter(|n| !visited.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(id: &str, kind: &str) -> WorkflowNode {
        WorkflowNode {
            id: id.to_string(),
            kind: kind.to_string(),
            label: None,
            config: serde_json::Value::Null,
        }
    }

    fn edge(from: &str, to: &str) -> WorkflowEdge {
        WorkflowEdge {
            from: from.to_string(),
            to: to.to_string(),
            condition: None,
        }
    }

    fn guestbook() -> WorkflowGraph {
        WorkflowGraph {
            nodes: vec![
                node("start", "START"),
                node("form", "FORM"),
                node("camera", "CAMERA"),
                node("end", "END"),
            ],
            edges: vec![edge("start", "form"), edge("form", "camera"), edge("camera", "end")],
        }
    }

    #[test]
    fn flow_type_parsing() {
        assert_eq!("GUESTBOOK".parse::<FlowType>(), Ok(FlowType::Guestbook));
        assert_eq!("face-search".parse::<FlowType>(), Ok(FlowType::FaceSearch));
        assert_eq!("face_search".parse::<FlowType>(), Ok(FlowType::FaceSearch));
        assert!("SLIDESHOW".parse::<FlowType>().is_err());
    }

    #[test]
    fn valid_graph_passes() {
        assert!(guestbook().validate().is_ok());
    }

    #[test]
    fn empty_graph_fails() {
        let graph = WorkflowGraph {
            nodes: vec![],
            edges: vec![],
        };
        assert!(graph.validate().is_err());
    }

    #[test]
    fn duplicate_ids_and_unknown_kinds_are_reported() {
        let mut graph = guestbook();
        graph.nodes.push(node("form", "FORM"));
        graph.nodes.push(node("x", "TELEPORT"));
        let errors = graph.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Duplicate node id 'form'")));
        assert!(errors.iter().any(|e| e.contains("unknown kind 'TELEPORT'")));
    }

    #[test]
    fn requires_single_start_and_an_end() {
        let graph = WorkflowGraph {
            nodes: vec![node("a", "START"), node("b", "START")],
            edges: vec![edge("a", "b")],
        };
        let errors = graph.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("exactly one START")));
        assert!(errors.iter().any(|e| e.contains("END")));
    }

    #[test]
    fn dangling_and_self_edges_are_reported() {
        let mut graph = guestbook();
        graph.edges.push(edge("form", "ghost"));
        graph.edges.push(edge("camera", "camera"));
        let errors = graph.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("unknown target node 'ghost'")));
        assert!(errors.iter().any(|e| e.contains("edge to itself")));
    }

    #[test]
    fn unreachable_nodes_are_reported() {
        let mut graph = guestbook();
        graph.nodes.push(node("orphan", "MESSAGE"));
        let errors = graph.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("orphan")));
    }

    #[test]
    fn next_nodes_follow_edges() {
        let mut graph = guestbook();
        graph.nodes.push(node("thanks", "MESSAGE"));
        graph.edges.push(WorkflowEdge {
            from: "form".into(),
            to: "thanks".into(),
            condition: Some("skip_photo".into()),
        });

        let next = graph.next_nodes("form").unwrap();
        let ids: Vec<_> = next.iter().map(|(n, _)| n.id.as_str()).collect();
        assert_eq!(ids, vec!["camera", "thanks"]);
        assert_eq!(next[1].1, Some("skip_photo"));

        assert!(graph.next_nodes("end").unwrap().is_empty());
        assert!(graph.next_nodes("missing").is_none());
    }

    #[test]
    fn parses_stored_json() {
        let graph = WorkflowGraph::from_json(
            &json!([{"id": "s", "kind": "START"}, {"id": "e", "kind": "END"}]),
            &json!([{"from": "s", "to": "e"}]),
        )
        .unwrap();
        assert!(graph.validate().is_ok());
        assert!(WorkflowGraph::from_json(&json!({}), &json!([])).is_err());
    }
}
