pub mod api;
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod date;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod levels;
pub mod model;
pub mod notify;
pub mod partition;
pub mod redraw;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use render::{render_family_tree, render_timeline};
