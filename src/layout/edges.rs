use tracing::debug;

use crate::model::{RelationType, Relationship};
use crate::theme::Theme;

use super::surface::{Surface, edge_element_id};
use super::{CubicPath, EdgeLayout, EdgeStyle, Rect};

/// Start and end anchors for a relationship between two cards.
pub fn anchor_points(kind: &RelationType, from: &Rect, to: &Rect) -> ((f32, f32), (f32, f32)) {
    match kind {
        RelationType::Spouse => (from.right_mid(), to.left_mid()),
        RelationType::ParentOf => (from.bottom_center(), to.top_center()),
        _ => (from.center(), to.center()),
    }
}

pub fn edge_style(kind: &RelationType, theme: &Theme) -> EdgeStyle {
    let color = theme.edge_color(kind).to_string();
    match kind {
        RelationType::Spouse => EdgeStyle {
            color,
            dasharray: Some("5, 5".to_string()),
            arrow: false,
            label: Some("Pasangan".to_string()),
        },
        RelationType::ParentOf => EdgeStyle {
            color,
            dasharray: None,
            arrow: true,
            label: None,
        },
        RelationType::Sibling => EdgeStyle {
            color,
            dasharray: Some("2, 4".to_string()),
            arrow: false,
            label: Some("Saudara".to_string()),
        },
        RelationType::Child | RelationType::Other(_) => EdgeStyle {
            color,
            dasharray: None,
            arrow: false,
            label: Some(kind.as_str().to_string()),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeReport {
    pub drawn: usize,
    /// Relationship ids (or list positions) whose anchors were missing.
    pub skipped: Vec<String>,
}

fn skipped_key(rel: &Relationship, idx: usize) -> String {
    if rel.id.is_empty() {
        idx.to_string()
    } else {
        rel.id.clone()
    }
}

/// Clears previous edges and draws one curve per relationship whose two
/// cards are both on the surface. Self relationships are never drawn.
pub fn draw_edges<S: Surface + ?Sized>(
    relationships: &[Relationship],
    surface: &mut S,
    theme: &Theme,
) -> EdgeReport {
    surface.settle();
    surface.clear_edges();
    let mut report = EdgeReport::default();

    for (idx, rel) in relationships.iter().enumerate() {
        if rel.person_id_1 == rel.person_id_2 {
            debug!(relationship_id = %rel.id, "self relationship, edge skipped");
            report.skipped.push(skipped_key(rel, idx));
            continue;
        }
        let from = surface.measure_anchor(&rel.person_id_1);
        let to = surface.measure_anchor(&rel.person_id_2);
        let (Some(from), Some(to)) = (from, to) else {
            debug!(
                relationship_id = %rel.id,
                from = %rel.person_id_1,
                to = %rel.person_id_2,
                "anchor missing, edge skipped"
            );
            report.skipped.push(skipped_key(rel, idx));
            continue;
        };
        let (start, end) = anchor_points(&rel.kind, &from, &to);
        surface.create_edge(EdgeLayout {
            relationship_id: rel.id.clone(),
            element_id: edge_element_id(&rel.id, idx),
            from: rel.person_id_1.clone(),
            to: rel.person_id_2.clone(),
            kind: rel.kind.clone(),
            path: CubicPath::between(start, end),
            style: edge_style(&rel.kind, theme),
        });
        report.drawn += 1;
    }

    report
}
