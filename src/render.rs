use crate::config::{LayoutConfig, RenderConfig};
use crate::graph::FamilyGraph;
use crate::layout::{
    CardLayout, EdgeLayout, FamilyLayout, TextBlock, TimelineLayout, compute_family_layout,
    layout_timeline,
};
use crate::model::{Event, Person, Relationship};
use crate::theme::Theme;
#[cfg(feature = "png")]
use anyhow::Context;
use anyhow::Result;
use std::path::Path;

const MIN_WIDTH: f32 = 320.0;
const MIN_HEIGHT: f32 = 120.0;

fn svg_open(svg: &mut String, width: f32, height: f32, theme: &Theme) {
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
}

fn placeholder_svg(svg: &mut String, width: f32, height: f32, message: &str, theme: &Theme) {
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        width / 2.0,
        height / 2.0,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.muted_text_color,
        escape_xml(message)
    ));
}

/// SVG for a laid-out family tree: group frames, cards, then edges on top.
pub fn render_family_svg(layout: &FamilyLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(MIN_WIDTH);
    let height = layout.height.max(MIN_HEIGHT);
    svg_open(&mut svg, width, height, theme);

    if let Some(message) = &layout.empty_message {
        placeholder_svg(&mut svg, width, height, message, theme);
        svg.push_str("</svg>");
        return svg;
    }

    svg.push_str("<defs>");
    for (id, color) in arrow_markers(&layout.edges) {
        svg.push_str(&format!(
            "<marker id=\"{id}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>",
        ));
    }
    svg.push_str("</defs>");

    for group in &layout.groups {
        svg.push_str(&format!(
            "<rect class=\"family-group\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"none\" stroke=\"{}\" stroke-dasharray=\"6 4\" stroke-width=\"1.2\"/>",
            group.rect.x,
            group.rect.y,
            group.rect.width,
            group.rect.height,
            theme.group_border
        ));
    }

    for card in &layout.cards {
        svg.push_str(&card_svg(card, theme, config));
    }

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge, theme));
    }

    svg.push_str("</svg>");
    svg
}

/// One arrow marker per distinct colour of directed edges.
fn arrow_markers(edges: &[EdgeLayout]) -> Vec<(String, String)> {
    let mut markers: Vec<(String, String)> = Vec::new();
    for edge in edges.iter().filter(|e| e.style.arrow) {
        let id = marker_id(&edge.style.color);
        if !markers.iter().any(|(existing, _)| *existing == id) {
            markers.push((id, edge.style.color.clone()));
        }
    }
    markers
}

fn marker_id(color: &str) -> String {
    let suffix: String = color.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("arrow-{suffix}")
}

fn card_svg(card: &CardLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let rect = card.rect;
    let mut out = String::new();
    out.push_str(&format!("<g id=\"{}\" class=\"member-card\">", card.element_id));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        rect.x, rect.y, rect.width, rect.height, theme.card_fill, theme.card_border
    ));

    let (fill, text) = theme.avatar_colors(card.gender);
    let radius = config.avatar_size / 2.0;
    let cx = rect.x + config.card_padding + radius;
    let cy = rect.center_y();
    let initial = card
        .name
        .lines
        .first()
        .and_then(|line| line.chars().next())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();
    out.push_str(&format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"{fill}\"/>"
    ));
    out.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"600\" fill=\"{text}\">{}</text>",
        escape_xml(&theme.font_family),
        radius * 0.8,
        escape_xml(&initial)
    ));

    let text_x = rect.x + config.card_padding * 2.0 + config.avatar_size;
    let name_size = theme.font_size * 1.15;
    let small_size = theme.font_size * 0.9;
    let small_line = small_size * config.label_line_height;
    let text_height = card.name.height
        + if card.native_name.is_some() { small_line } else { 0.0 }
        + small_line;
    let mut y = rect.center_y() - text_height / 2.0;

    out.push_str(&text_lines_svg(
        text_x,
        y,
        &card.name,
        name_size,
        &theme.text_color,
        "600",
        theme,
        config,
    ));
    y += card.name.height;
    if let Some(native) = &card.native_name {
        out.push_str(&single_line_svg(
            text_x,
            y + small_size,
            native,
            small_size,
            &theme.muted_text_color,
            theme,
        ));
        y += small_line;
    }
    out.push_str(&single_line_svg(
        text_x,
        y + small_size,
        &card.life_span,
        small_size,
        &theme.muted_text_color,
        theme,
    ));
    out.push_str("</g>");
    out
}

fn edge_svg(edge: &EdgeLayout, theme: &Theme) -> String {
    let style = &edge.style;
    let mut out = String::new();
    let dash = style
        .dasharray
        .as_deref()
        .map(|d| format!(" stroke-dasharray=\"{d}\""))
        .unwrap_or_default();
    let marker = if style.arrow {
        format!(" marker-end=\"url(#{})\"", marker_id(&style.color))
    } else {
        String::new()
    };
    out.push_str(&format!(
        "<path id=\"{}\" class=\"relationship-line {}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"{dash}{marker}/>",
        edge.element_id,
        escape_xml(edge.kind.as_str()),
        edge.path.to_svg_path(),
        style.color
    ));
    if let Some(label) = &style.label {
        out.push_str(&format!(
            "<text font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\" dy=\"-4\"><textPath href=\"#{}\" startOffset=\"50%\" text-anchor=\"middle\">{}</textPath></text>",
            escape_xml(&theme.font_family),
            theme.font_size * 0.85,
            style.color,
            edge.element_id,
            escape_xml(label)
        ));
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn text_lines_svg(
    x: f32,
    top: f32,
    block: &TextBlock,
    font_size: f32,
    fill: &str,
    weight: &str,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{font_size:.2}\" font-weight=\"{weight}\" fill=\"{fill}\">",
        top + font_size,
        escape_xml(&theme.font_family),
    ));
    for (idx, line) in block.lines.iter().enumerate() {
        let dy = if idx == 0 {
            0.0
        } else {
            font_size * config.label_line_height
        };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn single_line_svg(x: f32, baseline: f32, line: &str, font_size: f32, fill: &str, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{fill}\">{}</text>",
        escape_xml(&theme.font_family),
        escape_xml(line)
    )
}

/// SVG for the event timeline.
pub fn render_timeline_svg(layout: &TimelineLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(MIN_WIDTH);
    let height = layout.height.max(MIN_HEIGHT);
    svg_open(&mut svg, width, height, theme);

    if let Some(message) = &layout.empty_message {
        placeholder_svg(&mut svg, width, height, message, theme);
        svg.push_str("</svg>");
        return svg;
    }

    svg.push_str(&format!(
        "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2\"/>",
        layout.line_y1,
        layout.line_y2,
        theme.timeline_line_color,
        x = layout.line_x,
    ));

    let small_size = theme.font_size * 0.85;
    let line_height = theme.font_size * config.label_line_height;
    for entry in &layout.entries {
        let rect = entry.rect;
        svg.push_str(&format!(
            "<g class=\"timeline-event\" data-event-id=\"{}\">",
            escape_xml(&entry.event_id)
        ));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"6\" fill=\"{}\"/>",
            entry.marker.0, entry.marker.1, theme.timeline_line_color
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            rect.x, rect.y, rect.width, rect.height, theme.card_fill, theme.card_border
        ));

        let x = rect.x + config.card_padding;
        let mut y = rect.y + config.card_padding;
        svg.push_str(&text_lines_svg(
            x,
            y,
            &entry.title,
            theme.font_size * 1.1,
            &theme.text_color,
            "600",
            theme,
            config,
        ));
        y += entry.title.height;
        svg.push_str(&single_line_svg(
            x,
            y + small_size,
            &entry.date,
            small_size,
            &theme.muted_text_color,
            theme,
        ));
        y += line_height;
        if !entry.description.lines.is_empty() {
            svg.push_str(&text_lines_svg(
                x,
                y,
                &entry.description,
                theme.font_size,
                &theme.text_color,
                "400",
                theme,
                config,
            ));
            y += entry.description.height;
        }
        if let Some(participants) = &entry.participants {
            svg.push_str(&single_line_svg(
                x,
                y + small_size,
                participants,
                small_size,
                &theme.muted_text_color,
                theme,
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// Builds the graph from raw records and renders the tree in one call.
pub fn render_family_tree(
    people: &[Person],
    relationships: &[Relationship],
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let graph = FamilyGraph::build(people, relationships);
    let layout = compute_family_layout(&graph, relationships, theme, config);
    render_family_svg(&layout, theme, config)
}

/// Renders the timeline; `people` only resolves participant names.
pub fn render_timeline(
    events: &[Event],
    people: &[Person],
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let graph = FamilyGraph::build(people, &[]);
    let layout = layout_timeline(events, &graph, theme, config);
    render_timeline_svg(&layout, theme, config)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "sans-serif".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .with_context(|| {
            format!(
                "invalid PNG size {}x{}",
                render_cfg.width, render_cfg.height
            )
        })?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output needs the `png` feature")
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
