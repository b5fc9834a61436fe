use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::warn;

const BUILTIN_REGISTRY: &str = include_str!("../../assets/nodes.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeTier {
    Primary,
    /// Regional variant that shares the similarity data of `primary_code`.
    Secondary { primary_code: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguageNode {
    pub code: String,
    pub display_name: String,
    pub localized_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub tier: NodeTier,
    pub non_standard_corpus: bool,
}

impl LanguageNode {
    pub fn is_primary(&self) -> bool {
        matches!(self.tier, NodeTier::Primary)
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    code: String,
    name: String,
    #[serde(default)]
    localized_name: Option<String>,
    lat: f64,
    lng: f64,
    #[serde(default)]
    country: String,
    #[serde(default)]
    primary: Option<String>,
    #[serde(default)]
    non_standard_corpus: bool,
}

impl From<RawNode> for LanguageNode {
    fn from(raw: RawNode) -> Self {
        let tier = match raw.primary {
            Some(primary_code) if primary_code != raw.code => NodeTier::Secondary { primary_code },
            _ => NodeTier::Primary,
        };

        Self {
            localized_name: raw.localized_name.unwrap_or_else(|| raw.name.clone()),
            code: raw.code,
            display_name: raw.name,
            latitude: raw.lat,
            longitude: raw.lng,
            country: raw.country,
            tier,
            non_standard_corpus: raw.non_standard_corpus,
        }
    }
}

/// Static topology of the atlas: primary language points and their regional
/// variants, in display order.
#[derive(Clone, Debug)]
pub struct NodeRegistry {
    nodes: Vec<LanguageNode>,
    index_by_code: HashMap<String, usize>,
    /// Secondary nodes whose primary reference does not resolve.
    orphans: HashSet<String>,
}

impl NodeRegistry {
    pub fn new(nodes: Vec<LanguageNode>) -> Result<Self> {
        let mut index_by_code = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if index_by_code.insert(node.code.clone(), index).is_some() {
                bail!("duplicate language node code {:?}", node.code);
            }
        }

        let mut orphans = HashSet::new();
        for node in &nodes {
            let NodeTier::Secondary { primary_code } = &node.tier else {
                continue;
            };

            let resolved = index_by_code
                .get(primary_code)
                .map(|&index| &nodes[index])
                .filter(|primary| primary.is_primary() && primary.display_name == node.display_name);

            if resolved.is_none() {
                warn!(
                    code = %node.code,
                    primary = %primary_code,
                    "secondary language node does not resolve to a primary of the same language"
                );
                orphans.insert(node.code.clone());
            }
        }

        Ok(Self {
            nodes,
            index_by_code,
            orphans,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let raw_nodes: Vec<RawNode> =
            serde_json::from_str(raw).context("invalid language node registry JSON")?;
        Self::new(raw_nodes.into_iter().map(LanguageNode::from).collect())
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_REGISTRY).context("built-in language node registry is invalid")
    }

    pub fn nodes(&self) -> &[LanguageNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&LanguageNode> {
        self.index_by_code.get(code).map(|&index| &self.nodes[index])
    }

    pub fn primaries(&self) -> impl Iterator<Item = &LanguageNode> {
        self.nodes.iter().filter(|node| node.is_primary())
    }

    /// The primary node whose similarity data `node` uses; the node itself if
    /// it is primary. `None` only for secondaries with a broken primary link.
    pub fn representative<'a>(&'a self, node: &'a LanguageNode) -> Option<&'a LanguageNode> {
        match &node.tier {
            NodeTier::Primary => Some(node),
            NodeTier::Secondary { primary_code } => {
                if self.orphans.contains(&node.code) {
                    None
                } else {
                    self.get(primary_code)
                }
            }
        }
    }

    pub fn representative_name<'a>(&'a self, node: &'a LanguageNode) -> Option<&'a str> {
        self.representative(node)
            .map(|primary| primary.display_name.as_str())
    }

    /// True when both nodes stand for the same language and at least one is a
    /// regional variant.
    pub fn same_language(&self, a: &LanguageNode, b: &LanguageNode) -> bool {
        if a.is_primary() && b.is_primary() {
            return false;
        }

        match (self.representative(a), self.representative(b)) {
            (Some(left), Some(right)) => left.code == right.code,
            _ => false,
        }
    }

    /// Primary code of the language `code` belongs to.
    pub fn primary_code<'a>(&'a self, code: &str) -> Option<&'a str> {
        let node = self.get(code)?;
        self.representative(node).map(|primary| primary.code.as_str())
    }
}
