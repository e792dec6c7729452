//! Generation levels within one family group.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::trace;

use crate::graph::FamilyGraph;
use crate::partition::FamilyGroup;

/// Person id to generation level, enumerated in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMap {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl LevelMap {
    fn assign(&mut self, id: &str, level: usize) -> bool {
        if self.index.contains_key(id) {
            return false;
        }
        self.index.insert(id.to_string(), self.order.len());
        self.order.push((id.to_string(), level));
        true
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&idx| self.order[idx].1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order.iter().map(|(id, level)| (id.as_str(), *level))
    }

    /// Members bucketed by level, ascending, each bucket in assignment order.
    pub fn by_level(&self) -> BTreeMap<usize, Vec<String>> {
        let mut levels: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (id, level) in &self.order {
            levels.entry(*level).or_default().push(id.clone());
        }
        levels
    }

    pub fn depth(&self) -> usize {
        self.order.iter().map(|(_, level)| level + 1).max().unwrap_or(0)
    }
}

pub fn find_roots(group: &FamilyGroup, graph: &FamilyGraph) -> Vec<String> {
    group
        .members
        .iter()
        .filter(|id| {
            graph
                .get(id)
                .is_some_and(|node| !node.parents.iter().any(|p| group.contains(p)))
        })
        .cloned()
        .collect()
}

pub fn assign_levels(group: &FamilyGroup, graph: &FamilyGraph) -> LevelMap {
    let mut levels = LevelMap::default();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();

    for root in find_roots(group, graph) {
        levels.assign(&root, 0);
        queue.push_back((root, 0));
    }
    if queue.is_empty()
        && let Some(seed) = group.seed()
    {
        trace!(seed, "no roots in group, seeding fallback member");
        levels.assign(seed, 0);
        queue.push_back((seed.to_string(), 0));
    }

    while let Some((id, level)) = queue.pop_front() {
        let Some(node) = graph.get(&id) else {
            continue;
        };
        for spouse in &node.spouses {
            if group.contains(spouse) {
                levels.assign(spouse, level);
            }
        }
        for child in &node.children {
            if group.contains(child) && levels.assign(child, level + 1) {
                queue.push_back((child.clone(), level + 1));
            }
        }
    }

    for id in &group.members {
        if levels.assign(id, 0) {
            trace!(id = id.as_str(), "unreached member forced to level 0");
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Person, Relationship};
    use crate::partition::partition_groups;

    fn build(ids: &[&str], rels: &[(&str, &str, &str)]) -> (FamilyGraph, Vec<FamilyGroup>) {
        let people: Vec<Person> = ids
            .iter()
            .map(|id| Person::new(*id, *id, Gender::Unknown))
            .collect();
        let rels: Vec<Relationship> = rels
            .iter()
            .enumerate()
            .map(|(i, (a, b, kind))| Relationship::new(format!("r{i}"), *a, *b, *kind))
            .collect();
        let graph = FamilyGraph::build(&people, &rels);
        let groups = partition_groups(&graph);
        (graph, groups)
    }

    #[test]
    fn couple_with_two_children() {
        let (graph, groups) = build(
            &["a", "b", "c", "d"],
            &[("a", "b", "spouse"), ("a", "c", "parent_of"), ("b", "d", "parent_of")],
        );
        let levels = assign_levels(&groups[0], &graph);
        assert_eq!(levels.level_of("a"), Some(0));
        assert_eq!(levels.level_of("b"), Some(0));
        assert_eq!(levels.level_of("c"), Some(1));
        assert_eq!(levels.level_of("d"), Some(1));
    }

    #[test]
    fn married_in_root_keeps_level_zero() {
        // b married in without parents, so b is a root and keeps level 0
        // while a sits under gp.
        let (graph, groups) = build(
            &["gp", "a", "b", "c"],
            &[
                ("gp", "a", "parent_of"),
                ("a", "b", "spouse"),
                ("a", "c", "parent_of"),
            ],
        );
        let levels = assign_levels(&groups[0], &graph);
        assert_eq!(levels.level_of("gp"), Some(0));
        assert_eq!(levels.level_of("a"), Some(1));
        assert_eq!(levels.level_of("b"), Some(0));
        assert_eq!(levels.level_of("c"), Some(1));
    }

    #[test]
    fn sibling_only_group_sits_on_level_zero() {
        let (graph, groups) = build(&["e", "f"], &[("e", "f", "sibling")]);
        assert_eq!(find_roots(&groups[0], &graph).len(), 2);
        let levels = assign_levels(&groups[0], &graph);
        assert_eq!(levels.level_of("e"), Some(0));
        assert_eq!(levels.level_of("f"), Some(0));
    }

    #[test]
    fn parent_cycle_seeds_first_member() {
        let (graph, groups) = build(
            &["x", "y", "z"],
            &[("x", "y", "parent_of"), ("y", "z", "parent_of"), ("z", "x", "parent_of")],
        );
        assert!(find_roots(&groups[0], &graph).is_empty());
        let levels = assign_levels(&groups[0], &graph);
        assert_eq!(levels.level_of("x"), Some(0));
        assert_eq!(levels.level_of("y"), Some(1));
        assert_eq!(levels.level_of("z"), Some(2));
    }

    #[test]
    fn every_member_gets_a_level_and_output_is_stable() {
        let (graph, groups) = build(
            &["a", "b", "c", "d", "e"],
            &[
                ("a", "b", "parent_of"),
                ("b", "c", "parent_of"),
                ("c", "a", "parent_of"),
                ("d", "a", "sibling"),
                ("e", "d", "spouse"),
            ],
        );
        for group in &groups {
            let first = assign_levels(group, &graph);
            let second = assign_levels(group, &graph);
            assert_eq!(first, second);
            for id in &group.members {
                assert!(first.level_of(id).is_some(), "{id} has no level");
            }
        }
    }

    #[test]
    fn by_level_buckets_in_assignment_order() {
        let (graph, groups) = build(
            &["a", "b", "c", "d"],
            &[("a", "c", "parent_of"), ("a", "d", "parent_of"), ("a", "b", "spouse")],
        );
        let levels = assign_levels(&groups[0], &graph);
        let buckets = levels.by_level();
        assert_eq!(buckets[&0], vec!["a", "b"]);
        assert_eq!(buckets[&1], vec!["c", "d"]);
        assert_eq!(levels.depth(), 2);
    }
}
