//! Method Tree
//!
//! Explicit three-level ownership for registered methods: prefix nodes own
//! base-name nodes, and a base-name node is either a direct callable or a
//! keyed family of callables. Unprefixed base names live in a dedicated
//! top-level map. Later registrations win per derived name; a node changing
//! shape between direct and keyed is replaced wholesale.

use indexmap::IndexMap;

use crate::module::Callable;

/// One base-name node: a direct callable or a keyed family
#[derive(Debug, Clone, PartialEq)]
pub enum MethodNode {
    Direct(Callable),
    Keyed(IndexMap<String, Callable>),
}

/// The methods registry built during a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodTree {
    prefixed: IndexMap<String, IndexMap<String, MethodNode>>,
    unprefixed: IndexMap<String, MethodNode>,
}

impl MethodTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a direct method, replacing any node under the same name
    pub fn insert_direct(&mut self, prefix: Option<&str>, base: &str, callable: Callable) {
        self.bases_mut(prefix)
            .insert(base.to_string(), MethodNode::Direct(callable));
    }

    /// Insert a keyed method.
    ///
    /// An existing keyed node under the same base gains the key or has it
    /// replaced; a direct node is replaced by a fresh keyed family.
    pub fn insert_keyed(
        &mut self,
        prefix: Option<&str>,
        base: &str,
        sub_key: &str,
        callable: Callable,
    ) {
        let bases = self.bases_mut(prefix);
        match bases.get_mut(base) {
            Some(MethodNode::Keyed(family)) => {
                family.insert(sub_key.to_string(), callable);
            }
            _ => {
                let mut family = IndexMap::new();
                family.insert(sub_key.to_string(), callable);
                bases.insert(base.to_string(), MethodNode::Keyed(family));
            }
        }
    }

    fn bases_mut(&mut self, prefix: Option<&str>) -> &mut IndexMap<String, MethodNode> {
        match prefix {
            Some(prefix) => self.prefixed.entry(prefix.to_string()).or_default(),
            None => &mut self.unprefixed,
        }
    }

    fn bases(&self, prefix: Option<&str>) -> Option<&IndexMap<String, MethodNode>> {
        match prefix {
            Some(prefix) => self.prefixed.get(prefix),
            None => Some(&self.unprefixed),
        }
    }

    /// Look up a callable by its name parts
    pub fn get(
        &self,
        prefix: Option<&str>,
        base: &str,
        sub_key: Option<&str>,
    ) -> Option<&Callable> {
        let node = self.bases(prefix)?.get(base)?;
        match (node, sub_key) {
            (MethodNode::Direct(callable), None) => Some(callable),
            (MethodNode::Keyed(family), Some(key)) => family.get(key),
            _ => None,
        }
    }

    /// Look up a callable by its dotted registration name.
    ///
    /// Candidate interpretations are tried from the least qualified up:
    /// whole name as an unprefixed base, then base plus sub-key, prefix
    /// plus base, and finally prefix plus base plus sub-key. Prefixes may
    /// themselves contain dots.
    pub fn get_dotted(&self, name: &str) -> Option<&Callable> {
        if let Some(callable) = self.get(None, name, None) {
            return Some(callable);
        }

        if let Some((head, tail)) = name.rsplit_once('.') {
            if let Some(callable) = self.get(None, head, Some(tail)) {
                return Some(callable);
            }
            if let Some(callable) = self.get(Some(head), tail, None) {
                return Some(callable);
            }
            if let Some((prefix, base)) = head.rsplit_once('.') {
                if let Some(callable) = self.get(Some(prefix), base, Some(tail)) {
                    return Some(callable);
                }
            }
        }

        None
    }

    /// Every dotted registration name in insertion order
    pub fn dotted_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(&self.unprefixed, None, &mut names);
        for (prefix, bases) in &self.prefixed {
            collect_names(bases, Some(prefix), &mut names);
        }
        names
    }

    /// Number of registered callables across all nodes
    pub fn len(&self) -> usize {
        let unprefixed: usize = self.unprefixed.values().map(node_len).sum();
        let prefixed: usize = self
            .prefixed
            .values()
            .flat_map(|bases| bases.values())
            .map(node_len)
            .sum();
        unprefixed + prefixed
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn node_len(node: &MethodNode) -> usize {
    match node {
        MethodNode::Direct(_) => 1,
        MethodNode::Keyed(family) => family.len(),
    }
}

fn collect_names(
    bases: &IndexMap<String, MethodNode>,
    prefix: Option<&str>,
    names: &mut Vec<String>,
) {
    for (base, node) in bases {
        let qualified = match prefix {
            Some(prefix) => format!("{prefix}.{base}"),
            None => base.clone(),
        };
        match node {
            MethodNode::Direct(_) => names.push(qualified),
            MethodNode::Keyed(family) => {
                names.extend(family.keys().map(|key| format!("{qualified}.{key}")));
            }
        }
    }
}
