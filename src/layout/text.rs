use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

/// Wraps `text` to `max_width`, keeping at most `max_lines` lines (the last
/// kept line gets an ellipsis when text was dropped). `max_lines == 0` means
/// unlimited.
pub(crate) fn measure_wrapped(
    text: &str,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
    theme: &Theme,
    config: &LayoutConfig,
) -> TextBlock {
    let fast = config.fast_text_metrics;
    let family = theme.font_family.as_str();
    let mut lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .flat_map(|line| wrap_line(line, max_width, font_size, family, fast))
        .collect();
    if lines.is_empty() {
        return TextBlock::empty();
    }
    if max_lines > 0 && lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, max_width, font_size, family, fast);
        }
    }

    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, family, fast))
        .fold(0.0, f32::max)
        .min(max_width);
    let height = lines.len() as f32 * font_size * config.label_line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}

pub(crate) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast: bool,
) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    if text_width(line, font_size, font_family, fast) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(&candidate, font_size, font_family, fast) > max_width
        {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn ellipsize(line: &str, max_width: f32, font_size: f32, font_family: &str, fast: bool) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    loop {
        let candidate: String = chars.iter().collect::<String>() + "…";
        if chars.is_empty() || text_width(&candidate, font_size, font_family, fast) <= max_width {
            return candidate;
        }
        chars.pop();
    }
}

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast: bool) -> f32 {
    if fast {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

/// Approximate advance of `ch` in ems for a typical sans-serif face.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.35,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '%' => 0.93,
        'A'..='Z' => 0.68,
        'a'..='z' | '0'..='9' => 0.57,
        _ => 0.6,
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let block = measure_wrapped("Siti", 14.0, 200.0, 2, &Theme::akar(), &fast_config());
        assert_eq!(block.lines, vec!["Siti"]);
        assert!(block.width > 0.0);
        assert_eq!(block.height, 14.0 * 1.5);
    }

    #[test]
    fn long_names_wrap_and_clamp_with_ellipsis() {
        let block = measure_wrapped(
            "Raden Mas Sutan Ahmad Abdullah Wiryadinata Kusumaningrat",
            14.0,
            120.0,
            2,
            &Theme::akar(),
            &fast_config(),
        );
        assert_eq!(block.lines.len(), 2);
        assert!(block.lines[1].ends_with('…'));
        assert!(block.width <= 120.0);
    }

    #[test]
    fn empty_text_has_no_lines() {
        let block = measure_wrapped("", 14.0, 100.0, 0, &Theme::akar(), &fast_config());
        assert!(block.lines.is_empty());
        assert_eq!(block.height, 0.0);
    }

    #[test]
    fn fallback_width_scales_with_font_size() {
        let small = fallback_text_width("Keluarga", 10.0);
        let large = fallback_text_width("Keluarga", 20.0);
        assert!((large - small * 2.0).abs() < 0.01);
    }
}
