use akar_tree::config::LayoutConfig;
use akar_tree::graph::{BuildWarning, FamilyGraph};
use akar_tree::layout::{SvgSurface, compute_family_layout, layout_family_tree};
use akar_tree::levels::assign_levels;
use akar_tree::model::FamilySnapshot;
use akar_tree::partition::partition_groups;
use akar_tree::theme::Theme;
use akar_tree::{render_family_tree, render_timeline};
use std::collections::HashSet;
use std::path::Path;

const FIXTURES: [&str; 6] = [
    "couple_with_children.json",
    "ghost_reference.json",
    "sibling_only.json",
    "multiple_groups.json",
    "parent_cycle.json",
    "empty.json",
];

fn load(name: &str) -> FamilySnapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    assert!(path.exists(), "fixture missing: {}", name);
    let data = std::fs::read_to_string(&path).expect("read fixture");
    serde_json::from_str(&data).unwrap_or_else(|err| panic!("parse {name}: {err}"))
}

fn config() -> LayoutConfig {
    LayoutConfig {
        fast_text_metrics: true,
        ..LayoutConfig::default()
    }
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture} missing <svg");
    assert!(svg.contains("</svg>"), "{fixture} missing </svg>");
    assert!(!svg.contains("NaN"), "{fixture} contains NaN coordinates");
}

#[test]
fn render_all_fixtures() {
    let theme = Theme::akar();
    let config = config();
    for name in FIXTURES {
        let snapshot = load(name);
        let tree = render_family_tree(&snapshot.people, &snapshot.relationships, &theme, &config);
        assert_valid_svg(&tree, name);
        let timeline = render_timeline(&snapshot.events, &snapshot.people, &theme, &config);
        assert_valid_svg(&timeline, name);
    }
}

#[test]
fn groups_cover_every_person_once_and_every_member_has_a_level() {
    for name in FIXTURES {
        let snapshot = load(name);
        let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
        let groups = partition_groups(&graph);

        let mut seen = HashSet::new();
        for group in &groups {
            for member in &group.members {
                assert!(seen.insert(member.clone()), "{name}: {member} in two groups");
            }
            let levels = assign_levels(group, &graph);
            assert_eq!(levels.len(), group.len(), "{name}: level map incomplete");
            for member in &group.members {
                assert!(levels.level_of(member).is_some(), "{name}: {member} has no level");
            }
        }
        assert_eq!(seen.len(), graph.len(), "{name}: people missing from groups");
    }
}

#[test]
fn shared_children_normalization_is_stable_for_couples() {
    let snapshot = load("couple_with_children.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    let children = |id: &str| graph.get(id).unwrap().children.clone();
    assert_eq!(children("ahmad"), vec!["budi"]);
    assert_eq!(children("siti"), vec!["budi"]);
    assert_eq!(children("budi"), vec!["rina"]);
    assert_eq!(children("dewi"), vec!["rina"]);

    let mut again = graph.clone();
    again.normalize_shared_children();
    assert_eq!(again.nodes(), graph.nodes());
}

#[test]
fn married_in_spouse_without_parents_stays_a_root() {
    let snapshot = load("couple_with_children.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    let groups = partition_groups(&graph);
    assert_eq!(groups.len(), 1);
    let levels = assign_levels(&groups[0], &graph);
    assert_eq!(levels.level_of("ahmad"), Some(0));
    assert_eq!(levels.level_of("siti"), Some(0));
    assert_eq!(levels.level_of("budi"), Some(1));
    assert_eq!(levels.level_of("dewi"), Some(0));
    assert_eq!(levels.level_of("rina"), Some(1));
}

#[test]
fn spouses_reached_from_one_root_share_a_level() {
    let snapshot = load("multiple_groups.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    let groups = partition_groups(&graph);
    let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    assert_eq!(sizes, vec![3, 2, 1]);

    let levels = assign_levels(&groups[0], &graph);
    assert_eq!(levels.level_of("a"), levels.level_of("b"));
    assert_eq!(levels.level_of("c"), Some(1));
    assert_eq!(groups[2].members, vec!["z"]);
}

#[test]
fn ghost_and_self_references_are_skipped() {
    let snapshot = load("ghost_reference.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    assert!(!graph.contains("ghost"));
    assert_eq!(
        graph.warnings(),
        &[
            BuildWarning::MissingPerson {
                relationship_id: "r2".to_string(),
                missing: vec!["ghost".to_string()],
            },
            BuildWarning::SelfRelationship {
                relationship_id: "r3".to_string(),
                person_id: "b".to_string(),
            },
        ]
    );

    let layout = compute_family_layout(&graph, &snapshot.relationships, &Theme::akar(), &config());
    let drawn: Vec<&str> = layout
        .edges
        .iter()
        .map(|edge| edge.relationship_id.as_str())
        .collect();
    assert_eq!(drawn, vec!["r1"]);

    let timeline = render_timeline(&snapshot.events, &snapshot.people, &Theme::akar(), &config());
    assert!(timeline.contains("Agus Salim, ghost"));
}

#[test]
fn rootless_cycle_falls_back_to_first_member() {
    let snapshot = load("parent_cycle.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    let groups = partition_groups(&graph);
    let levels = assign_levels(&groups[0], &graph);
    assert_eq!(levels.level_of("p"), Some(0));
    assert_eq!(levels.level_of("q"), Some(1));
}

#[test]
fn siblings_without_parents_share_the_top_level() {
    let snapshot = load("sibling_only.json");
    let graph = FamilyGraph::build(&snapshot.people, &snapshot.relationships);
    let theme = Theme::akar();
    let config = config();
    let mut surface = SvgSurface::new(&theme, &config);
    let outline = layout_family_tree(&graph, &mut surface);
    assert_eq!(outline.groups.len(), 1);
    assert_eq!(outline.groups[0].levels.len(), 1);
    assert_eq!(outline.groups[0].levels[0].units, vec![vec!["s1"], vec!["s2"]]);
}

#[test]
fn empty_snapshot_renders_placeholders() {
    let snapshot = load("empty.json");
    let theme = Theme::akar();
    let config = config();
    let tree = render_family_tree(&snapshot.people, &snapshot.relationships, &theme, &config);
    assert!(tree.contains("Belum ada anggota keluarga"));
    let timeline = render_timeline(&snapshot.events, &snapshot.people, &theme, &config);
    assert!(timeline.contains("Belum ada acara"));
}
