use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub card_width: f32,
    pub card_padding: f32,
    pub avatar_size: f32,
    /// Gap between cards inside one couple unit.
    pub couple_gap: f32,
    /// Gap between couple units on one level.
    pub unit_gap: f32,
    pub level_margin: f32,
    pub group_padding: f32,
    pub group_gap: f32,
    pub tree_padding: f32,
    pub label_line_height: f32,
    pub max_name_lines: usize,
    pub fast_text_metrics: bool,
    pub redraw_debounce_ms: u64,
    pub timeline_width: f32,
    pub timeline_card_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 256.0,
            card_padding: 16.0,
            avatar_size: 64.0,
            couple_gap: 16.0,
            unit_gap: 48.0,
            level_margin: 40.0,
            group_padding: 32.0,
            group_gap: 32.0,
            tree_padding: 24.0,
            label_line_height: 1.5,
            max_name_lines: 2,
            fast_text_metrics: false,
            redraw_debounce_ms: 100,
            timeline_width: 640.0,
            timeline_card_gap: 16.0,
        }
    }
}

impl LayoutConfig {
    pub fn redraw_delay(&self) -> Duration {
        Duration::from_millis(self.redraw_debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
    api: Option<ApiConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    background: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    group_border: Option<String>,
    spouse_color: Option<String>,
    parent_color: Option<String>,
    sibling_color: Option<String>,
    line_color: Option<String>,
}

/// Loads a JSON (or JSON5) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let parsed: ConfigFile = json5::from_str(&contents)
        .with_context(|| format!("parsing config {}", path.display()))?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "akar" | "light" => config.theme = Theme::akar(),
            other => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.card_fill {
            config.theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            config.theme.card_border = v;
        }
        if let Some(v) = vars.group_border {
            config.theme.group_border = v;
        }
        if let Some(v) = vars.spouse_color {
            config.theme.spouse_color = v;
        }
        if let Some(v) = vars.parent_color {
            config.theme.parent_color = v;
        }
        if let Some(v) = vars.sibling_color {
            config.theme.sibling_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.default_edge_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(api) = parsed.api {
        config.api = api;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        let mut config = Config::default();
        let parsed: ConfigFile = json5::from_str(text).unwrap();
        apply_config_file(&mut config, parsed);
        config
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.card_width, 256.0);
        assert_eq!(config.layout.redraw_debounce_ms, 100);
        assert_eq!(config.api.timeout_ms, 5000);
    }

    #[test]
    fn json5_file_overrides_sections() {
        let config = parse(
            r##"{
                // comments are allowed
                theme: "dark",
                themeVariables: { spouseColor: "#ff0000", fontSize: 12 },
                layout: { cardWidth: 200 },
                api: { baseUrl: "http://example.test", timeoutMs: 250 },
            }"##,
        );
        assert_eq!(config.theme.background, Theme::dark().background);
        assert_eq!(config.theme.spouse_color, "#ff0000");
        assert_eq!(config.theme.font_size, 12.0);
        assert_eq!(config.api.base_url, "http://example.test");
        assert_eq!(config.api.timeout(), Duration::from_millis(250));
        assert_eq!(config.layout.card_width, 200.0);
        // partial sections keep the remaining defaults
        assert_eq!(config.layout.unit_gap, 48.0);
    }
}
