// Library exports for csvplot

pub mod config;
pub mod csv_reader;
pub mod data;
pub mod discovery;
pub mod error;
pub mod figure;
pub mod plot;
pub mod render;
pub mod session;
pub mod stats;
pub mod summary;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// Histogram bin count; Sturges' rule when unset.
    #[serde(default)]
    pub bins: Option<usize>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
            bins: None,
            color: None,
        }
    }
}
