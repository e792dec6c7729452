//! Display capability the tree layout draws through, plus the geometric
//! implementation used for SVG output.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LayoutConfig;
use crate::date::life_span;
use crate::graph::PersonNode;
use crate::theme::Theme;

use super::text::measure_wrapped;
use super::{
    CardLayout, CoupleUnitLayout, EdgeLayout, FamilyLayout, GroupLayout, LevelLayout, Rect,
};

static UNSAFE_ID_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

/// Element id for a member card, e.g. `member-card-64f0a1`.
pub fn card_element_id(person_id: &str) -> String {
    format!("member-card-{}", UNSAFE_ID_CHARS.replace_all(person_id, "_"))
}

/// Element id for a relationship path; falls back to the list position for
/// relationships without an id.
pub fn edge_element_id(relationship_id: &str, index: usize) -> String {
    if relationship_id.is_empty() {
        format!("rel-{index}")
    } else {
        format!("rel-{}", UNSAFE_ID_CHARS.replace_all(relationship_id, "_"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Tree,
    Group { index: usize },
    Level { level: usize },
    CoupleUnit,
}

pub trait Surface {
    fn create_container(&mut self, parent: Option<ContainerId>, kind: ContainerKind)
    -> ContainerId;

    fn create_card(&mut self, container: ContainerId, node: &PersonNode);

    fn create_edge(&mut self, edge: EdgeLayout);

    /// Removes every edge drawn so far.
    fn clear_edges(&mut self);

    /// Bounding box of the person's card, if one is on the surface and laid out.
    fn measure_anchor(&self, person_id: &str) -> Option<Rect>;

    /// Brings geometry up to date before anchors are measured.
    fn settle(&mut self) {}
}

#[derive(Debug)]
enum Child {
    Container(usize),
    Card(usize),
}

#[derive(Debug)]
struct ContainerNode {
    kind: ContainerKind,
    children: Vec<Child>,
    rect: Rect,
}

#[derive(Debug, Clone, Copy)]
struct Flow {
    horizontal: bool,
    gap: f32,
    padding: f32,
    center_cross: bool,
}

/// Deterministic box layout: groups stack vertically, levels stack inside a
/// group, couple units and cards flow left to right, rows are centered.
pub struct SvgSurface<'a> {
    theme: &'a Theme,
    config: &'a LayoutConfig,
    containers: Vec<ContainerNode>,
    cards: Vec<CardLayout>,
    edges: Vec<EdgeLayout>,
    settled: bool,
}

impl<'a> SvgSurface<'a> {
    pub fn new(theme: &'a Theme, config: &'a LayoutConfig) -> Self {
        Self {
            theme,
            config,
            containers: Vec::new(),
            cards: Vec::new(),
            edges: Vec::new(),
            settled: false,
        }
    }

    fn flow(&self, kind: ContainerKind) -> Flow {
        let c = self.config;
        match kind {
            ContainerKind::Tree => Flow {
                horizontal: false,
                gap: c.group_gap,
                padding: c.tree_padding,
                center_cross: true,
            },
            ContainerKind::Group { .. } => Flow {
                horizontal: false,
                gap: c.level_margin,
                padding: c.group_padding,
                center_cross: true,
            },
            ContainerKind::Level { .. } => Flow {
                horizontal: true,
                gap: c.unit_gap,
                padding: 0.0,
                center_cross: false,
            },
            ContainerKind::CoupleUnit => Flow {
                horizontal: true,
                gap: c.couple_gap,
                padding: 0.0,
                center_cross: false,
            },
        }
    }

    fn card_contents(&self, node: &PersonNode) -> CardLayout {
        let theme = self.theme;
        let config = self.config;
        let person = &node.person;
        let text_width =
            (config.card_width - config.avatar_size - config.card_padding * 3.0).max(24.0);
        let name = measure_wrapped(
            &person.full_name,
            theme.font_size * 1.15,
            text_width,
            config.max_name_lines,
            theme,
            config,
        );
        let native_name = person.native_name().map(str::to_string);
        let small_line = theme.font_size * 0.9 * config.label_line_height;
        let text_height = name.height
            + if native_name.is_some() { small_line } else { 0.0 }
            + small_line;
        let height = config.avatar_size.max(text_height) + config.card_padding * 2.0;

        CardLayout {
            person_id: person.id.clone(),
            element_id: card_element_id(&person.id),
            rect: Rect::new(0.0, 0.0, config.card_width, height),
            gender: person.gender,
            name,
            native_name,
            life_span: life_span(person.birth_date.as_deref(), person.death_date.as_deref()),
        }
    }

    fn measure(&mut self, idx: usize) -> (f32, f32) {
        let flow = self.flow(self.containers[idx].kind);
        let children: Vec<(bool, usize)> = self.containers[idx]
            .children
            .iter()
            .map(|child| match child {
                Child::Container(c) => (true, *c),
                Child::Card(c) => (false, *c),
            })
            .collect();
        let mut main = 0.0f32;
        let mut cross = 0.0f32;
        for (pos, (is_container, child)) in children.iter().enumerate() {
            let (w, h) = if *is_container {
                self.measure(*child)
            } else {
                let rect = self.cards[*child].rect;
                (rect.width, rect.height)
            };
            let (m, x) = if flow.horizontal { (w, h) } else { (h, w) };
            if pos > 0 {
                main += flow.gap;
            }
            main += m;
            cross = cross.max(x);
        }
        let (w, h) = if flow.horizontal {
            (main, cross)
        } else {
            (cross, main)
        };
        let size = (w + flow.padding * 2.0, h + flow.padding * 2.0);
        self.containers[idx].rect.width = size.0;
        self.containers[idx].rect.height = size.1;
        size
    }

    fn place(&mut self, idx: usize, x: f32, y: f32) {
        let flow = self.flow(self.containers[idx].kind);
        let own = self.containers[idx].rect;
        self.containers[idx].rect = Rect::new(x, y, own.width, own.height);
        let inner_cross = if flow.horizontal {
            own.height - flow.padding * 2.0
        } else {
            own.width - flow.padding * 2.0
        };

        let mut cursor = if flow.horizontal { x } else { y } + flow.padding;
        let child_count = self.containers[idx].children.len();
        for pos in 0..child_count {
            let (is_container, child) = match self.containers[idx].children[pos] {
                Child::Container(c) => (true, c),
                Child::Card(c) => (false, c),
            };
            let size = if is_container {
                self.containers[child].rect
            } else {
                self.cards[child].rect
            };
            let (main_len, cross_len) = if flow.horizontal {
                (size.width, size.height)
            } else {
                (size.height, size.width)
            };
            let cross_offset = if flow.center_cross {
                (inner_cross - cross_len) / 2.0
            } else {
                0.0
            };
            let (cx, cy) = if flow.horizontal {
                (cursor, y + flow.padding + cross_offset)
            } else {
                (x + flow.padding + cross_offset, cursor)
            };
            if is_container {
                self.place(child, cx, cy);
            } else {
                let rect = &mut self.cards[child].rect;
                rect.x = cx;
                rect.y = cy;
            }
            cursor += main_len + flow.gap;
        }
    }

    fn arrange(&mut self) {
        let roots: Vec<usize> = self
            .containers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ContainerKind::Tree)
            .map(|(idx, _)| idx)
            .collect();
        let mut y = 0.0;
        for root in roots {
            let (_, h) = self.measure(root);
            self.place(root, 0.0, y);
            y += h;
        }
        self.settled = true;
    }

    /// Consumes the surface, returning the laid-out tree.
    pub fn into_layout(mut self) -> FamilyLayout {
        if !self.settled {
            self.arrange();
        }
        let mut groups = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for container in &self.containers {
            if container.kind == ContainerKind::Tree {
                width = width.max(container.rect.right());
                height = height.max(container.rect.bottom());
            }
            let ContainerKind::Group { index } = container.kind else {
                continue;
            };
            let levels = container
                .children
                .iter()
                .filter_map(|child| match child {
                    Child::Container(c) => Some(&self.containers[*c]),
                    Child::Card(_) => None,
                })
                .filter_map(|level| match level.kind {
                    ContainerKind::Level { level: number } => Some(LevelLayout {
                        level: number,
                        rect: level.rect,
                        units: self.units_of(level),
                    }),
                    _ => None,
                })
                .collect();
            groups.push(GroupLayout {
                index,
                rect: container.rect,
                levels,
            });
        }

        let empty_message = if self.cards.is_empty() {
            Some("Belum ada anggota keluarga. Tambahkan anggota untuk memulai!".to_string())
        } else {
            None
        };
        FamilyLayout {
            width,
            height,
            groups,
            cards: self.cards,
            edges: self.edges,
            empty_message,
        }
    }

    fn units_of(&self, level: &ContainerNode) -> Vec<CoupleUnitLayout> {
        level
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Container(c) => Some(&self.containers[*c]),
                Child::Card(_) => None,
            })
            .map(|unit| CoupleUnitLayout {
                rect: unit.rect,
                members: unit
                    .children
                    .iter()
                    .filter_map(|child| match child {
                        Child::Card(card) => Some(self.cards[*card].person_id.clone()),
                        Child::Container(_) => None,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Surface for SvgSurface<'_> {
    fn create_container(
        &mut self,
        parent: Option<ContainerId>,
        kind: ContainerKind,
    ) -> ContainerId {
        let id = self.containers.len();
        self.containers.push(ContainerNode {
            kind,
            children: Vec::new(),
            rect: Rect::default(),
        });
        if let Some(parent) = parent {
            self.containers[parent.0].children.push(Child::Container(id));
        }
        self.settled = false;
        ContainerId(id)
    }

    fn create_card(&mut self, container: ContainerId, node: &PersonNode) {
        let card = self.card_contents(node);
        let idx = self.cards.len();
        self.cards.push(card);
        self.containers[container.0].children.push(Child::Card(idx));
        self.settled = false;
    }

    fn create_edge(&mut self, edge: EdgeLayout) {
        self.edges.push(edge);
    }

    fn clear_edges(&mut self) {
        self.edges.clear();
    }

    fn measure_anchor(&self, person_id: &str) -> Option<Rect> {
        if !self.settled {
            return None;
        }
        self.cards
            .iter()
            .find(|card| card.person_id == person_id)
            .map(|card| card.rect)
    }

    fn settle(&mut self) {
        if !self.settled {
            self.arrange();
        }
    }
}
