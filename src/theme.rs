use serde::{Deserialize, Serialize};

use crate::model::{Gender, RelationType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub muted_text_color: String,
    pub background: String,
    pub card_fill: String,
    pub card_border: String,
    pub group_border: String,
    pub male_fill: String,
    pub male_text: String,
    pub female_fill: String,
    pub female_text: String,
    pub unknown_fill: String,
    pub unknown_text: String,
    pub spouse_color: String,
    pub parent_color: String,
    pub sibling_color: String,
    pub default_edge_color: String,
    pub timeline_line_color: String,
}

impl Theme {
    /// Light palette matching the web front end.
    pub fn akar() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#111827".to_string(),
            muted_text_color: "#6b7280".to_string(),
            background: "#FFFFFF".to_string(),
            card_fill: "#FFFFFF".to_string(),
            card_border: "#e5e7eb".to_string(),
            group_border: "#d1d5db".to_string(),
            male_fill: "#dbeafe".to_string(),
            male_text: "#1e40af".to_string(),
            female_fill: "#fce7f3".to_string(),
            female_text: "#9d174d".to_string(),
            unknown_fill: "#f3f4f6".to_string(),
            unknown_text: "#1f2937".to_string(),
            spouse_color: "#ec4899".to_string(),
            parent_color: "#3b82f6".to_string(),
            sibling_color: "#22c55e".to_string(),
            default_edge_color: "#9ca3af".to_string(),
            timeline_line_color: "#6366f1".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            text_color: "#f9fafb".to_string(),
            muted_text_color: "#9ca3af".to_string(),
            background: "#111827".to_string(),
            card_fill: "#1f2937".to_string(),
            card_border: "#374151".to_string(),
            group_border: "#4b5563".to_string(),
            male_fill: "#1e3a8a".to_string(),
            male_text: "#bfdbfe".to_string(),
            female_fill: "#831843".to_string(),
            female_text: "#fbcfe8".to_string(),
            unknown_fill: "#374151".to_string(),
            unknown_text: "#e5e7eb".to_string(),
            ..Self::akar()
        }
    }

    pub fn avatar_colors(&self, gender: Gender) -> (&str, &str) {
        match gender {
            Gender::Male => (&self.male_fill, &self.male_text),
            Gender::Female => (&self.female_fill, &self.female_text),
            Gender::Unknown => (&self.unknown_fill, &self.unknown_text),
        }
    }

    pub fn edge_color(&self, kind: &RelationType) -> &str {
        match kind {
            RelationType::Spouse => &self.spouse_color,
            RelationType::ParentOf => &self.parent_color,
            RelationType::Sibling => &self.sibling_color,
            RelationType::Child | RelationType::Other(_) => &self.default_edge_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::akar()
    }
}
