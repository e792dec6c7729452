mod edges;
mod surface;
pub(crate) mod text;
mod timeline;
mod tree;
pub(crate) mod types;
pub use edges::*;
pub use surface::*;
pub use timeline::*;
pub use tree::*;
pub use types::*;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::FamilyGraph;
use crate::model::Relationship;
use crate::theme::Theme;

/// Full tree layout on the SVG surface: cards first, edges once the cards
/// have settled.
pub fn compute_family_layout(
    graph: &FamilyGraph,
    relationships: &[Relationship],
    theme: &Theme,
    config: &LayoutConfig,
) -> FamilyLayout {
    let mut surface = SvgSurface::new(theme, config);
    let outline = layout_family_tree(graph, &mut surface);
    let report = draw_edges(relationships, &mut surface, theme);
    debug!(
        groups = outline.groups.len(),
        cards = outline.card_count(),
        edges = report.drawn,
        skipped = report.skipped.len(),
        "family layout computed"
    );
    surface.into_layout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PersonNode;
    use crate::model::{Gender, Person};
    use std::collections::HashMap;

    /// Records calls and hands out fixed anchors for a subset of people.
    #[derive(Default)]
    struct RecordingSurface {
        containers: Vec<(Option<ContainerId>, ContainerKind)>,
        cards: Vec<(ContainerId, String)>,
        edges: Vec<EdgeLayout>,
        anchors: HashMap<String, Rect>,
        clears: usize,
    }

    impl Surface for RecordingSurface {
        fn create_container(
            &mut self,
            parent: Option<ContainerId>,
            kind: ContainerKind,
        ) -> ContainerId {
            self.containers.push((parent, kind));
            ContainerId(self.containers.len() - 1)
        }

        fn create_card(&mut self, container: ContainerId, node: &PersonNode) {
            self.cards.push((container, node.id().to_string()));
        }

        fn create_edge(&mut self, edge: EdgeLayout) {
            self.edges.push(edge);
        }

        fn clear_edges(&mut self) {
            self.clears += 1;
            self.edges.clear();
        }

        fn measure_anchor(&self, person_id: &str) -> Option<Rect> {
            self.anchors.get(person_id).copied()
        }
    }

    fn fixture() -> (Vec<Person>, Vec<Relationship>) {
        let people = vec![
            Person::new("a", "Ahmad", Gender::Male),
            Person::new("b", "Bunga", Gender::Female),
            Person::new("c", "Cahya", Gender::Female),
            Person::new("d", "Dewi", Gender::Female),
            Person::new("x", "Xavier", Gender::Male),
        ];
        let relationships = vec![
            Relationship::new("r1", "a", "b", "spouse"),
            Relationship::new("r2", "a", "c", "parent_of"),
            Relationship::new("r3", "b", "d", "parent_of"),
        ];
        (people, relationships)
    }

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn containers_nest_tree_group_level_unit() {
        let (people, relationships) = fixture();
        let graph = FamilyGraph::build(&people, &relationships);
        let mut surface = RecordingSurface::default();
        let outline = layout_family_tree(&graph, &mut surface);

        assert_eq!(outline.groups.len(), 2);
        assert_eq!(outline.card_count(), 5);
        assert_eq!(surface.containers[0], (None, ContainerKind::Tree));
        let groups: Vec<_> = surface
            .containers
            .iter()
            .filter(|(_, kind)| matches!(kind, ContainerKind::Group { .. }))
            .collect();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|(parent, _)| *parent == Some(ContainerId(0))));

        let first = &outline.groups[0];
        assert_eq!(first.levels[0].units, vec![vec!["a", "b"]]);
        assert_eq!(first.levels[1].units, vec![vec!["c"], vec!["d"]]);
        assert_eq!(outline.groups[1].levels[0].units, vec![vec!["x"]]);
    }

    #[test]
    fn edges_skip_people_without_anchors() {
        let (people, mut relationships) = fixture();
        relationships.push(Relationship::new("r4", "a", "ghost", "sibling"));
        let graph = FamilyGraph::build(&people, &relationships);
        let mut surface = RecordingSurface::default();
        layout_family_tree(&graph, &mut surface);
        surface.anchors.insert("a".into(), Rect::new(0.0, 0.0, 100.0, 50.0));
        surface.anchors.insert("b".into(), Rect::new(120.0, 0.0, 100.0, 50.0));
        surface.anchors.insert("c".into(), Rect::new(0.0, 100.0, 100.0, 50.0));

        let report = draw_edges(&relationships, &mut surface, &Theme::akar());
        assert_eq!(report.drawn, 2);
        assert_eq!(report.skipped, vec!["r3", "r4"]);
        assert_eq!(surface.edges[0].path.start, (100.0, 25.0));
        assert_eq!(surface.edges[1].path.end, (50.0, 100.0));

        let again = draw_edges(&relationships, &mut surface, &Theme::akar());
        assert_eq!(again.drawn, 2);
        assert_eq!(surface.edges.len(), 2);
        assert_eq!(surface.clears, 2);
    }

    #[test]
    fn family_layout_places_children_below_parents() {
        let (people, relationships) = fixture();
        let graph = FamilyGraph::build(&people, &relationships);
        let config = fast_config();
        let layout = compute_family_layout(&graph, &relationships, &Theme::akar(), &config);

        assert!(layout.empty_message.is_none());
        assert_eq!(layout.cards.len(), 5);
        assert_eq!(layout.edges.len(), 3);
        let a = layout.card("a").unwrap().rect;
        let b = layout.card("b").unwrap().rect;
        let c = layout.card("c").unwrap().rect;
        let x = layout.card("x").unwrap().rect;
        assert_eq!(a.y, b.y);
        assert!(c.y >= a.bottom() + config.level_margin);
        assert!(x.y > c.bottom());
        assert_eq!(layout.groups.len(), 2);
        assert!(layout.width > 0.0 && layout.height > x.bottom());
    }

    #[test]
    fn empty_family_has_placeholder() {
        let layout = compute_family_layout(
            &FamilyGraph::default(),
            &[],
            &Theme::akar(),
            &fast_config(),
        );
        assert!(layout.cards.is_empty());
        assert!(layout.empty_message.is_some());
    }
}
