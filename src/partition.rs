use std::collections::{HashSet, VecDeque};

use crate::graph::FamilyGraph;

/// A maximal connected set of people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyGroup {
    /// Members in breadth-first discovery order from the seed.
    pub members: Vec<String>,
    lookup: HashSet<String>,
}

impl FamilyGroup {
    pub fn new(members: Vec<String>) -> Self {
        let lookup = members.iter().cloned().collect();
        Self { members, lookup }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn seed(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }
}

/// Splits the graph into disjoint groups, seeded in input order.
pub fn partition_groups(graph: &FamilyGraph) -> Vec<FamilyGroup> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();

    for seed in graph.ids() {
        if visited.contains(seed) {
            continue;
        }
        visited.insert(seed);
        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            members.push(current.to_string());
            let Some(node) = graph.get(current) else {
                continue;
            };
            for next in node.neighbors() {
                if graph.contains(next) && visited.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }
        groups.push(FamilyGroup::new(members));
    }

    groups
}
