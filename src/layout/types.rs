use serde::Serialize;

use crate::model::{Gender, RelationType};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.center_x(), self.center_y())
    }

    pub fn left_mid(&self) -> (f32, f32) {
        (self.x, self.center_y())
    }

    pub fn right_mid(&self) -> (f32, f32) {
        (self.right(), self.center_y())
    }

    pub fn top_center(&self) -> (f32, f32) {
        (self.center_x(), self.y)
    }

    pub fn bottom_center(&self) -> (f32, f32) {
        (self.center_x(), self.bottom())
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardLayout {
    pub person_id: String,
    /// Element id, safe for use in SVG `id` attributes.
    pub element_id: String,
    pub rect: Rect,
    pub gender: Gender,
    pub name: TextBlock,
    pub native_name: Option<String>,
    pub life_span: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoupleUnitLayout {
    pub rect: Rect,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelLayout {
    pub level: usize,
    pub rect: Rect,
    pub units: Vec<CoupleUnitLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupLayout {
    pub index: usize,
    pub rect: Rect,
    pub levels: Vec<LevelLayout>,
}

/// Cubic curve between two anchors; both control points sit on the
/// vertical midpoint between the anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicPath {
    pub start: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

impl CubicPath {
    pub fn between(start: (f32, f32), end: (f32, f32)) -> Self {
        let mid_y = (start.1 + end.1) / 2.0;
        Self {
            start,
            control1: (start.0, mid_y),
            control2: (end.0, mid_y),
            end,
        }
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> (f32, f32) {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        (
            a * self.start.0 + b * self.control1.0 + c * self.control2.0 + d * self.end.0,
            a * self.start.1 + b * self.control1.1 + c * self.control2.1 + d * self.end.1,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub color: String,
    pub dasharray: Option<String>,
    pub arrow: bool,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeLayout {
    pub relationship_id: String,
    /// Element id of the path, referenced by the label's text path.
    pub element_id: String,
    pub from: String,
    pub to: String,
    pub kind: RelationType,
    pub path: CubicPath,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyLayout {
    pub width: f32,
    pub height: f32,
    pub groups: Vec<GroupLayout>,
    pub cards: Vec<CardLayout>,
    pub edges: Vec<EdgeLayout>,
    /// Placeholder shown when there is nobody to draw.
    pub empty_message: Option<String>,
}

impl FamilyLayout {
    pub fn card(&self, person_id: &str) -> Option<&CardLayout> {
        self.cards.iter().find(|card| card.person_id == person_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntryLayout {
    pub event_id: String,
    pub rect: Rect,
    pub marker: (f32, f32),
    pub title: TextBlock,
    pub date: String,
    pub description: TextBlock,
    pub participants: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineLayout {
    pub width: f32,
    pub height: f32,
    pub line_x: f32,
    pub line_y1: f32,
    pub line_y2: f32,
    pub entries: Vec<TimelineEntryLayout>,
    pub empty_message: Option<String>,
}
