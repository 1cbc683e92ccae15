use crate::types::{ImportGraph, ReachableSet};
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

impl ImportGraph {
    /// Shortest import chain from any of `sources` to `target`, both ends included.
    pub fn shortest_chain(&self, sources: &[PathBuf], target: &Path) -> Option<Vec<PathBuf>> {
        let goal = self.find_file(target)?;
        let mut parent: HashMap<NodeIndex, Option<NodeIndex>> = HashMap::new();
        let mut queue = VecDeque::new();

        for source in sources {
            if let Some(idx) = self.find_file(source) {
                if parent.insert(idx, None).is_none() {
                    queue.push_back(idx);
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return Some(self.unwind(&parent, goal));
            }
            for next in self.graph.neighbors(current) {
                if !parent.contains_key(&next) {
                    parent.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        None
    }

    fn unwind(&self, parent: &HashMap<NodeIndex, Option<NodeIndex>>, goal: NodeIndex) -> Vec<PathBuf> {
        let mut chain = Vec::new();
        let mut cursor = Some(goal);
        while let Some(idx) = cursor {
            if let Some(path) = self.graph.node_weight(idx) {
                chain.push(path.clone());
            }
            cursor = parent.get(&idx).copied().flatten();
        }
        chain.reverse();
        chain
    }
}

impl ReachableSet {
    /// Why `target` is reachable: an import chain starting at an entry.
    pub fn import_chain(&self, target: &Path) -> Option<Vec<PathBuf>> {
        self.graph.shortest_chain(&self.entries, target)
    }
}
