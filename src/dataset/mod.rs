use std::fs;

use anyhow::{Context, Result};

mod parse;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub group: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    pub value: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

impl Dataset {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn multiplied(&self, copies: usize) -> Dataset {
        let copies = copies.max(1);
        if copies == 1 {
            return self.clone();
        }

        let mut nodes = Vec::with_capacity(self.nodes.len() * copies);
        let mut links = Vec::with_capacity(self.links.len() * copies);
        for copy in 0..copies {
            for node in &self.nodes {
                nodes.push(NodeSpec {
                    id: copy_id(&node.id, copy),
                    group: node.group,
                });
            }
            for link in &self.links {
                links.push(LinkSpec {
                    source: copy_id(&link.source, copy),
                    target: copy_id(&link.target, copy),
                    value: link.value,
                });
            }
        }

        Dataset { nodes, links }
    }
}

fn copy_id(id: &str, copy: usize) -> String {
    if copy == 0 {
        id.to_owned()
    } else {
        format!("{id}#{}", copy + 1)
    }
}

pub fn load_dataset(path: &str) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file {path}"))?;
    parse::parse_dataset(&raw).with_context(|| format!("failed to parse dataset file {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset {
            nodes: vec![
                NodeSpec {
                    id: "a".to_owned(),
                    group: 1,
                },
                NodeSpec {
                    id: "b".to_owned(),
                    group: 2,
                },
            ],
            links: vec![LinkSpec {
                source: "a".to_owned(),
                target: "b".to_owned(),
                value: 1.0,
            }],
        }
    }

    #[test]
    fn multiplied_by_one_is_a_plain_copy() {
        let base = sample();
        let copy = base.multiplied(1);
        assert_eq!(copy, base);
    }

    #[test]
    fn multiplied_replicates_nodes_and_links_with_unique_ids() {
        let tripled = sample().multiplied(3);
        assert_eq!(tripled.node_count(), 6);
        assert_eq!(tripled.link_count(), 3);

        let mut seen = std::collections::HashSet::new();
        for node in &tripled.nodes {
            assert!(seen.insert(node.id.as_str()), "duplicate id {}", node.id);
        }
    }

    #[test]
    fn multiplied_links_stay_within_their_copy() {
        let doubled = sample().multiplied(2);
        assert!(
            doubled
                .links
                .iter()
                .any(|link| link.source == "a" && link.target == "b")
        );
        assert!(
            doubled
                .links
                .iter()
                .any(|link| link.source == "a#2" && link.target == "b#2")
        );
        assert!(
            !doubled
                .links
                .iter()
                .any(|link| link.source == "a" && link.target == "b#2")
        );
    }
}
