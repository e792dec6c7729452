use crate::config::LayoutConfig;
use crate::date::format_long_date;
use crate::graph::FamilyGraph;
use crate::model::Event;
use crate::theme::Theme;

use super::text::measure_wrapped;
use super::{Rect, TextBlock, TimelineEntryLayout, TimelineLayout};

const EMPTY_TIMELINE: &str = "Belum ada acara. Tambahkan acara untuk memulai!";
const LINE_INSET: f32 = 12.0;
const CARD_INDENT: f32 = 36.0;

/// Vertical timeline: one card per event, in the order the events arrive.
pub fn layout_timeline(
    events: &[Event],
    graph: &FamilyGraph,
    theme: &Theme,
    config: &LayoutConfig,
) -> TimelineLayout {
    let padding = config.tree_padding;
    let width = config.timeline_width.max(CARD_INDENT + padding * 2.0 + 40.0);
    let line_x = padding + LINE_INSET;
    let card_x = padding + CARD_INDENT;
    let card_width = width - card_x - padding;
    let text_width = (card_width - config.card_padding * 2.0).max(24.0);
    let line_height = theme.font_size * config.label_line_height;

    if events.is_empty() {
        return TimelineLayout {
            width,
            height: padding * 2.0 + line_height,
            line_x,
            line_y1: padding,
            line_y2: padding,
            entries: Vec::new(),
            empty_message: Some(EMPTY_TIMELINE.to_string()),
        };
    }

    let mut entries = Vec::with_capacity(events.len());
    let mut y = padding;
    for event in events {
        let title = measure_wrapped(&event.title, theme.font_size * 1.1, text_width, 0, theme, config);
        let description = match event.description.as_deref() {
            Some(text) => measure_wrapped(text, theme.font_size, text_width, 0, theme, config),
            None => TextBlock::empty(),
        };
        let participants = participant_names(event, graph);
        let date = format_long_date(event.date.as_deref());

        let mut height = config.card_padding * 2.0 + title.height + line_height + description.height;
        if participants.is_some() {
            height += line_height;
        }
        let rect = Rect::new(card_x, y, card_width, height);
        entries.push(TimelineEntryLayout {
            event_id: event.id.clone(),
            rect,
            marker: (line_x, y + config.card_padding + line_height / 2.0),
            title,
            date,
            description,
            participants,
        });
        y += height + config.timeline_card_gap;
    }
    let content_bottom = y - config.timeline_card_gap;

    TimelineLayout {
        width,
        height: content_bottom + padding,
        line_x,
        line_y1: padding,
        line_y2: content_bottom,
        entries,
        empty_message: None,
    }
}

fn participant_names(event: &Event, graph: &FamilyGraph) -> Option<String> {
    if event.participants.is_empty() {
        return None;
    }
    let names: Vec<&str> = event
        .participants
        .iter()
        .map(|id| graph.display_name(id))
        .collect();
    Some(names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Person};

    fn config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn empty_timeline_shows_placeholder() {
        let layout =
            layout_timeline(&[], &FamilyGraph::default(), &Theme::akar(), &config());
        assert!(layout.entries.is_empty());
        assert_eq!(layout.empty_message.as_deref(), Some(EMPTY_TIMELINE));
    }

    #[test]
    fn events_stack_in_input_order_with_resolved_participants() {
        let graph = FamilyGraph::build(&[Person::new("p1", "Siti", Gender::Female)], &[]);
        let events = vec![
            Event {
                id: "e2".to_string(),
                title: "Pernikahan".to_string(),
                date: Some("1970-05-04".to_string()),
                participants: vec!["p1".to_string(), "unknown".to_string()],
                ..Event::default()
            },
            Event {
                id: "e1".to_string(),
                title: "Kelahiran".to_string(),
                date: Some("1950-01-01".to_string()),
                description: Some("Lahir di Yogyakarta".to_string()),
                ..Event::default()
            },
        ];
        let layout = layout_timeline(&events, &graph, &Theme::akar(), &config());
        assert_eq!(layout.entries.len(), 2);
        assert_eq!(layout.entries[0].event_id, "e2");
        assert_eq!(layout.entries[0].date, "4 Mei 1970");
        assert_eq!(layout.entries[0].participants.as_deref(), Some("Siti, unknown"));
        assert!(layout.entries[1].rect.y > layout.entries[0].rect.bottom());
        assert_eq!(layout.line_y2, layout.entries[1].rect.bottom());
    }
}
