use std::collections::HashSet;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use super::{Dataset, LinkSpec, NodeSpec};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    group: u32,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    source: String,
    target: String,
    #[serde(default = "default_link_value")]
    value: f32,
}

fn default_link_value() -> f32 {
    1.0
}

pub(super) fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: RawDataset = serde_json::from_str(raw)?;

    if parsed.nodes.is_empty() {
        return Err(anyhow!("dataset contains no nodes"));
    }

    let mut seen = HashSet::with_capacity(parsed.nodes.len());
    for node in &parsed.nodes {
        if node.id.is_empty() {
            return Err(anyhow!("dataset contains a node with an empty id"));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(anyhow!("duplicate node id {:?} in dataset", node.id));
        }
    }

    Ok(Dataset {
        nodes: parsed
            .nodes
            .into_iter()
            .map(|node| NodeSpec {
                id: node.id,
                group: node.group,
            })
            .collect(),
        links: parsed
            .links
            .into_iter()
            .map(|link| LinkSpec {
                source: link.source,
                target: link.target,
                value: link.value,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_and_links() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [{"id": "a", "group": 1}, {"id": "b", "group": 2}],
                "links": [{"source": "a", "target": "b", "value": 3.5}]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.node_count(), 2);
        assert_eq!(dataset.link_count(), 1);
        assert_eq!(dataset.nodes[0].id, "a");
        assert_eq!(dataset.nodes[1].group, 2);
        assert_eq!(dataset.links[0].value, 3.5);
    }

    #[test]
    fn missing_group_and_value_default() {
        let dataset = parse_dataset(
            r#"{
                "nodes": [{"id": "a"}, {"id": "b"}],
                "links": [{"source": "a", "target": "b"}]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.nodes[0].group, 0);
        assert_eq!(dataset.links[0].value, 1.0);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let error = parse_dataset(r#"{"nodes": [{"id": "a"}, {"id": "a"}], "links": []}"#)
            .unwrap_err()
            .to_string();
        assert!(error.contains("duplicate node id"), "{error}");
        assert!(error.contains('a'), "{error}");
    }

    #[test]
    fn empty_node_list_is_rejected() {
        assert!(parse_dataset(r#"{"nodes": [], "links": []}"#).is_err());
        assert!(parse_dataset("{}").is_err());
    }
}
