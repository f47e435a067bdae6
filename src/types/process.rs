//! Process lineage graph served by `/api/processes/tree`

use serde::{Deserialize, Serialize};

/// A process node in the lineage graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNode {
    pub id: serde_json::Value,
    pub pid: i64,
    pub name: String,
    #[serde(default)]
    pub suspicious: bool,
    #[serde(default)]
    pub event_count: u64,
}

/// Parent -> child edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessLink {
    pub source: serde_json::Value,
    pub target: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessTree {
    #[serde(default)]
    pub nodes: Vec<ProcessNode>,
    #[serde(default)]
    pub links: Vec<ProcessLink>,
}

impl ProcessTree {
    /// Nodes flagged as suspicious by the backend
    pub fn suspicious(&self) -> impl Iterator<Item = &ProcessNode> {
        self.nodes.iter().filter(|n| n.suspicious)
    }

    /// Find the node for a pid
    pub fn node_for_pid(&self, pid: i64) -> Option<&ProcessNode> {
        self.nodes.iter().find(|n| n.pid == pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_tree_parsing() {
        let json = r#"{
            "nodes": [
                {"id": 1, "pid": 1, "name": "systemd", "suspicious": false, "event_count": 0},
                {"id": 4242, "pid": 4242, "name": "nc", "suspicious": true, "event_count": 9}
            ],
            "links": [{"source": 1, "target": 4242}]
        }"#;
        let tree: ProcessTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.links.len(), 1);
        assert_eq!(tree.suspicious().count(), 1);
        assert_eq!(tree.node_for_pid(4242).map(|n| n.name.as_str()), Some("nc"));
    }
}
