use std::collections::HashSet;

use tracing::debug;

use crate::graph::FamilyGraph;
use crate::levels::{LevelMap, assign_levels};
use crate::partition::{FamilyGroup, partition_groups};

use super::surface::{ContainerKind, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelOutline {
    pub level: usize,
    /// Couple units in render order; each lists its members left to right.
    pub units: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOutline {
    pub members: Vec<String>,
    pub levels: Vec<LevelOutline>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeOutline {
    pub groups: Vec<GroupOutline>,
}

impl TreeOutline {
    pub fn card_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.levels)
            .flat_map(|l| &l.units)
            .map(Vec::len)
            .sum()
    }
}

/// Splits one level's members into couple units: each member not yet placed
/// opens a unit and pulls in its same-level spouses that are still unplaced.
pub fn couple_units(members: &[String], graph: &FamilyGraph) -> Vec<Vec<String>> {
    let on_level: HashSet<&str> = members.iter().map(String::as_str).collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut units = Vec::new();

    for member in members {
        if placed.contains(member.as_str()) {
            continue;
        }
        let Some(node) = graph.get(member) else {
            continue;
        };
        placed.insert(member.as_str());
        let mut unit = vec![member.clone()];
        for spouse in &node.spouses {
            if on_level.contains(spouse.as_str()) && placed.insert(spouse.as_str()) {
                unit.push(spouse.clone());
            }
        }
        units.push(unit);
    }

    units
}

fn outline_group(group: &FamilyGroup, levels: &LevelMap, graph: &FamilyGraph) -> GroupOutline {
    let levels = levels
        .by_level()
        .into_iter()
        .map(|(level, members)| LevelOutline {
            level,
            units: couple_units(&members, graph),
        })
        .collect();
    GroupOutline {
        members: group.members.clone(),
        levels,
    }
}

/// Lays every family group out on `surface`: one container per tree, group,
/// level and couple unit, one card per member.
pub fn layout_family_tree<S: Surface + ?Sized>(graph: &FamilyGraph, surface: &mut S) -> TreeOutline {
    let tree = surface.create_container(None, ContainerKind::Tree);
    let mut outline = TreeOutline::default();

    for (index, group) in partition_groups(graph).iter().enumerate() {
        let levels = assign_levels(group, graph);
        let group_outline = outline_group(group, &levels, graph);
        debug!(
            group = index,
            members = group.len(),
            levels = group_outline.levels.len(),
            "laying out family group"
        );

        let group_id = surface.create_container(Some(tree), ContainerKind::Group { index });
        for level in &group_outline.levels {
            let level_id =
                surface.create_container(Some(group_id), ContainerKind::Level { level: level.level });
            for unit in &level.units {
                let unit_id = surface.create_container(Some(level_id), ContainerKind::CoupleUnit);
                for member in unit {
                    if let Some(node) = graph.get(member) {
                        surface.create_card(unit_id, node);
                    }
                }
            }
        }
        outline.groups.push(group_outline);
    }

    outline
}
