use crate::graph::{BuildWarning, FamilyGraph};
use crate::layout::{FamilyLayout, TimelineLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump<'a> {
    pub kind: &'static str,
    pub width: f32,
    pub height: f32,
    pub cards: Vec<CardDump>,
    pub edges: Vec<EdgeDump>,
    pub groups: Vec<GroupDump>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<&'a TimelineLayout>,
}

#[derive(Debug, Serialize)]
pub struct CardDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub name_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub kind: String,
    pub from: String,
    pub to: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Couple units per level, top level first.
    pub levels: Vec<Vec<Vec<String>>>,
}

fn describe_warning(warning: &BuildWarning) -> String {
    match warning {
        BuildWarning::MissingPerson {
            relationship_id,
            missing,
        } => format!(
            "relationship {relationship_id}: missing person {}",
            missing.join(", ")
        ),
        BuildWarning::SelfRelationship {
            relationship_id,
            person_id,
        } => format!("relationship {relationship_id}: {person_id} related to itself"),
        BuildWarning::DuplicatePerson { person_id } => format!("duplicate person {person_id}"),
    }
}

impl<'a> LayoutDump<'a> {
    pub fn from_family(layout: &FamilyLayout, graph: &FamilyGraph) -> Self {
        let cards = layout
            .cards
            .iter()
            .map(|card| CardDump {
                id: card.person_id.clone(),
                x: card.rect.x,
                y: card.rect.y,
                width: card.rect.width,
                height: card.rect.height,
                name_lines: card.name.lines.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.relationship_id.clone(),
                kind: edge.kind.to_string(),
                from: edge.from.clone(),
                to: edge.to.clone(),
                path: edge.path.to_svg_path(),
            })
            .collect();

        let groups = layout
            .groups
            .iter()
            .map(|group| GroupDump {
                index: group.index,
                x: group.rect.x,
                y: group.rect.y,
                width: group.rect.width,
                height: group.rect.height,
                levels: group
                    .levels
                    .iter()
                    .map(|level| level.units.iter().map(|u| u.members.clone()).collect())
                    .collect(),
            })
            .collect();

        LayoutDump {
            kind: "tree",
            width: layout.width,
            height: layout.height,
            cards,
            edges,
            groups,
            warnings: graph.warnings().iter().map(describe_warning).collect(),
            timeline: None,
        }
    }

    pub fn from_timeline(layout: &'a TimelineLayout) -> Self {
        LayoutDump {
            kind: "timeline",
            width: layout.width,
            height: layout.height,
            cards: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            warnings: Vec::new(),
            timeline: Some(layout),
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump<'_>) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
