//! Id-keyed family graph built from flat person and relationship lists.
//!
//! Adjacency is stored as ordered, deduplicated id lists so cyclic or
//! inconsistent data never turns into recursive structures.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::model::{Person, RelationType, Relationship};

#[derive(Debug, Clone, PartialEq)]
pub struct PersonNode {
    pub person: Person,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub spouses: Vec<String>,
    pub siblings: Vec<String>,
}

impl PersonNode {
    fn new(person: Person) -> Self {
        Self {
            person,
            parents: Vec::new(),
            children: Vec::new(),
            spouses: Vec::new(),
            siblings: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.person.id
    }

    /// Every adjacent id, in parents, children, spouses, siblings order.
    pub fn neighbors(&self) -> impl Iterator<Item = &String> {
        self.parents
            .iter()
            .chain(&self.children)
            .chain(&self.spouses)
            .chain(&self.siblings)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    MissingPerson {
        relationship_id: String,
        missing: Vec<String>,
    },
    SelfRelationship {
        relationship_id: String,
        person_id: String,
    },
    DuplicatePerson {
        person_id: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    nodes: Vec<PersonNode>,
    index: HashMap<String, usize>,
    warnings: Vec<BuildWarning>,
}

impl FamilyGraph {
    pub fn build(people: &[Person], relationships: &[Relationship]) -> Self {
        let mut graph = Self::default();
        for person in people {
            graph.insert_person(person.clone());
        }
        for relationship in relationships {
            graph.apply_relationship(relationship);
        }
        graph.normalize_shared_children();
        debug!(
            people = graph.nodes.len(),
            relationships = relationships.len(),
            warnings = graph.warnings.len(),
            "family graph built"
        );
        graph
    }

    fn insert_person(&mut self, person: Person) {
        if let Some(&idx) = self.index.get(&person.id) {
            warn!(person_id = %person.id, "duplicate person id, keeping the later record");
            self.warnings.push(BuildWarning::DuplicatePerson {
                person_id: person.id.clone(),
            });
            self.nodes[idx] = PersonNode::new(person);
            return;
        }
        self.index.insert(person.id.clone(), self.nodes.len());
        self.nodes.push(PersonNode::new(person));
    }

    fn apply_relationship(&mut self, rel: &Relationship) {
        let first = self.index.get(&rel.person_id_1).copied();
        let second = self.index.get(&rel.person_id_2).copied();
        let (Some(p1), Some(p2)) = (first, second) else {
            let missing: Vec<String> = [
                (first, &rel.person_id_1),
                (second, &rel.person_id_2),
            ]
            .into_iter()
            .filter(|(idx, _)| idx.is_none())
            .map(|(_, id)| id.clone())
            .collect();
            warn!(
                relationship_id = %rel.id,
                missing = ?missing,
                "could not find person for relationship, skipping"
            );
            self.warnings.push(BuildWarning::MissingPerson {
                relationship_id: rel.id.clone(),
                missing,
            });
            return;
        };
        if p1 == p2 {
            warn!(relationship_id = %rel.id, person_id = %rel.person_id_1, "self relationship, skipping");
            self.warnings.push(BuildWarning::SelfRelationship {
                relationship_id: rel.id.clone(),
                person_id: rel.person_id_1.clone(),
            });
            return;
        }

        let id1 = rel.person_id_1.clone();
        let id2 = rel.person_id_2.clone();
        match &rel.kind {
            RelationType::Spouse => {
                push_unique(&mut self.nodes[p1].spouses, id2);
                push_unique(&mut self.nodes[p2].spouses, id1);
            }
            RelationType::ParentOf => {
                push_unique(&mut self.nodes[p1].children, id2);
                push_unique(&mut self.nodes[p2].parents, id1);
            }
            RelationType::Child => {
                push_unique(&mut self.nodes[p2].children, id1);
                push_unique(&mut self.nodes[p1].parents, id2);
            }
            RelationType::Sibling => {
                push_unique(&mut self.nodes[p1].siblings, id2);
                push_unique(&mut self.nodes[p2].siblings, id1);
            }
            RelationType::Other(kind) => {
                debug!(relationship_id = %rel.id, %kind, "relationship type has no adjacency");
            }
        }
    }

    /// Gives every person and their spouses one shared children list.
    ///
    /// Single pass in insertion order; each person unions their own children
    /// with the current children of their direct spouses. Spouse sets are not
    /// closed transitively.
    pub fn normalize_shared_children(&mut self) {
        for idx in 0..self.nodes.len() {
            if self.nodes[idx].spouses.is_empty() {
                continue;
            }
            let spouse_indices: Vec<usize> = self.nodes[idx]
                .spouses
                .iter()
                .filter_map(|id| self.index.get(id).copied())
                .collect();

            let mut seen = HashSet::new();
            let mut shared = Vec::new();
            let own = self.nodes[idx].children.iter();
            let from_spouses = spouse_indices
                .iter()
                .flat_map(|&s| self.nodes[s].children.iter());
            for child in own.chain(from_spouses) {
                if self.index.contains_key(child) && seen.insert(child.as_str()) {
                    shared.push(child.clone());
                }
            }

            for &s in &spouse_indices {
                self.nodes[s].children = shared.clone();
            }
            self.nodes[idx].children = shared;
        }
    }

    pub fn get(&self, id: &str) -> Option<&PersonNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> &[PersonNode] {
        &self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(PersonNode::id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id)
            .map(|node| node.person.full_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(id)
    }
}

fn push_unique(list: &mut Vec<String>, id: String) {
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn person(id: &str) -> Person {
        Person::new(id, id.to_uppercase(), Gender::Unknown)
    }

    fn rel(id: &str, a: &str, b: &str, kind: &str) -> Relationship {
        Relationship::new(id, a, b, kind)
    }

    #[test]
    fn builds_typed_adjacency() {
        let people = vec![person("a"), person("b"), person("c"), person("d")];
        let rels = vec![
            rel("r1", "a", "b", "spouse"),
            rel("r2", "a", "c", "parent_of"),
            rel("r3", "d", "b", "child"),
            rel("r4", "c", "d", "sibling"),
        ];
        let graph = FamilyGraph::build(&people, &rels);
        let a = graph.get("a").unwrap();
        assert_eq!(a.spouses, vec!["b"]);
        assert_eq!(graph.get("c").unwrap().parents, vec!["a"]);
        assert_eq!(graph.get("d").unwrap().parents, vec!["b"]);
        assert_eq!(graph.get("c").unwrap().siblings, vec!["d"]);
        assert_eq!(graph.get("d").unwrap().siblings, vec!["c"]);
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn shared_children_are_unioned_across_spouses() {
        let people = vec![person("a"), person("b"), person("c"), person("d")];
        let rels = vec![
            rel("r1", "a", "b", "spouse"),
            rel("r2", "a", "c", "parent_of"),
            rel("r3", "b", "d", "parent_of"),
        ];
        let graph = FamilyGraph::build(&people, &rels);
        assert_eq!(graph.get("a").unwrap().children, vec!["c", "d"]);
        assert_eq!(graph.get("b").unwrap().children, vec!["c", "d"]);
        // parents are not rewritten by normalization
        assert_eq!(graph.get("d").unwrap().parents, vec!["b"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let people: Vec<Person> = ["a", "b", "c", "x", "y", "z"].into_iter().map(person).collect();
        let rels = vec![
            rel("r1", "a", "b", "spouse"),
            rel("r2", "a", "c", "spouse"),
            rel("r3", "b", "x", "parent_of"),
            rel("r4", "c", "y", "parent_of"),
            rel("r5", "z", "a", "child"),
        ];
        let mut graph = FamilyGraph::build(&people, &rels);
        let once: Vec<Vec<String>> = graph.nodes().iter().map(|n| n.children.clone()).collect();
        graph.normalize_shared_children();
        let twice: Vec<Vec<String>> = graph.nodes().iter().map(|n| n.children.clone()).collect();
        assert_eq!(once, twice);
        assert_eq!(graph.get("a").unwrap().children, vec!["z", "x", "y"]);
    }

    #[test]
    fn spouse_chain_settles_on_second_pass() {
        let people: Vec<Person> = ["a", "b", "c", "d", "ca", "cb", "cc", "cd"]
            .into_iter()
            .map(person)
            .collect();
        let rels = vec![
            rel("r1", "a", "b", "spouse"),
            rel("r2", "b", "c", "spouse"),
            rel("r3", "c", "d", "spouse"),
            rel("r4", "a", "ca", "parent_of"),
            rel("r5", "b", "cb", "parent_of"),
            rel("r6", "c", "cc", "parent_of"),
            rel("r7", "d", "cd", "parent_of"),
        ];
        let mut graph = FamilyGraph::build(&people, &rels);
        let children = |graph: &FamilyGraph, id: &str| graph.get(id).unwrap().children.clone();
        assert_eq!(children(&graph, "a"), vec!["ca", "cb", "cc"]);
        for id in ["b", "c", "d"] {
            assert_eq!(children(&graph, id), vec!["ca", "cb", "cc", "cd"]);
        }

        // a only sees cd once b has picked it up
        graph.normalize_shared_children();
        for id in ["a", "b", "c", "d"] {
            assert_eq!(children(&graph, id), vec!["ca", "cb", "cc", "cd"]);
        }

        let settled = graph.nodes().to_vec();
        graph.normalize_shared_children();
        assert_eq!(graph.nodes(), settled.as_slice());
    }

    #[test]
    fn missing_reference_is_skipped_without_creating_nodes() {
        let people = vec![person("x")];
        let rels = vec![rel("r1", "x", "ghost", "spouse")];
        let graph = FamilyGraph::build(&people, &rels);
        assert_eq!(graph.len(), 1);
        assert!(!graph.contains("ghost"));
        assert!(graph.get("x").unwrap().spouses.is_empty());
        assert_eq!(
            graph.warnings(),
            &[BuildWarning::MissingPerson {
                relationship_id: "r1".to_string(),
                missing: vec!["ghost".to_string()],
            }]
        );
    }

    #[test]
    fn duplicate_relationships_do_not_duplicate_adjacency() {
        let people = vec![person("a"), person("b")];
        let rels = vec![rel("r1", "a", "b", "spouse"), rel("r2", "b", "a", "spouse")];
        let graph = FamilyGraph::build(&people, &rels);
        assert_eq!(graph.get("a").unwrap().spouses, vec!["b"]);
        assert_eq!(graph.get("b").unwrap().spouses, vec!["a"]);
    }

    #[test]
    fn self_relationships_and_unknown_types_add_no_edges() {
        let people = vec![person("a"), person("b")];
        let rels = vec![rel("r1", "a", "a", "spouse"), rel("r2", "a", "b", "cousin")];
        let graph = FamilyGraph::build(&people, &rels);
        assert_eq!(graph.get("a").unwrap().neighbors().count(), 0);
        assert_eq!(graph.warnings().len(), 1);
    }

    #[test]
    fn duplicate_person_keeps_later_record_in_place() {
        let mut later = person("a");
        later.full_name = "Later".to_string();
        let graph = FamilyGraph::build(&[person("a"), person("b"), later], &[]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(graph.display_name("a"), "Later");
    }
}
