//! Per-event analysis served by `/api/analysis/{id}`

use serde::{Deserialize, Serialize};

/// Reputation result for one IP address found in the event details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpIntel {
    pub ip: String,
    #[serde(default)]
    pub is_malicious: bool,
    #[serde(default)]
    pub threat_score: u32,
    /// Provider-specific extras (country, ISP, report counts, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Threat intelligence summary for an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatIntel {
    #[serde(default)]
    pub has_network_activity: bool,
    #[serde(default)]
    pub checked_ips: Vec<IpIntel>,
    #[serde(default)]
    pub malicious_ips: Vec<IpIntel>,
    #[serde(default)]
    pub max_threat_score: u32,
}

/// Knowledge graph attached to an analysis; node and link shapes are backend-defined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
    #[serde(default)]
    pub links: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnalysis {
    pub event_id: u64,
    /// Explanation text, or a structured explanation object
    #[serde(default)]
    pub xai_explanation: serde_json::Value,
    #[serde(default)]
    pub graph: KnowledgeGraph,
    #[serde(default)]
    pub threat_intel: ThreatIntel,
    #[serde(default)]
    pub raw_details: String,
}
