//! One evaluation of the visualizer: discover local files, pick a data
//! source, load it and optionally render a plot.
//!
//! Nothing is kept between evaluations; every call starts from scratch.

use crate::config::Config;
use crate::csv_reader;
use crate::data::Dataset;
use crate::discovery::{self, Discovery};
use crate::figure;
use crate::plot::{self, PlotRequest};
use crate::render;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Label of the y selector option that leaves the y column unset.
pub const NONE_OPTION: &str = "None";

/// Raw bytes of an uploaded CSV file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The source a dataset is loaded from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Upload(Upload),
    Local(String),
}

impl DataSource {
    /// Pick the source for an evaluation. An upload always wins over a
    /// local selection.
    pub fn choose(upload: Option<Upload>, selected_file: Option<String>) -> Option<Self> {
        match (upload, selected_file) {
            (Some(upload), selected) => {
                if let Some(name) = selected {
                    debug!(ignored = %name, "upload takes precedence over local selection");
                }
                Some(DataSource::Upload(upload))
            }
            (None, Some(name)) => Some(DataSource::Local(name)),
            (None, None) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DataSource::Upload(upload) => &upload.name,
            DataSource::Local(name) => name,
        }
    }
}

/// User interactions for one evaluation.
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub upload: Option<Upload>,
    pub selected_file: Option<String>,
    pub request: Option<PlotRequest>,
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub source: String,
    pub dataset: Dataset,
}

#[derive(Debug, Clone)]
pub struct RenderedPlot {
    pub title: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// What an evaluation produced.
#[derive(Debug)]
pub struct SessionView {
    pub discovery: Discovery,
    pub data: Option<LoadedData>,
    pub plot: Option<RenderedPlot>,
}

impl SessionView {
    /// Choices for the x selector; empty until a dataset is loaded.
    pub fn x_options(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.dataset.columns().to_vec())
            .unwrap_or_default()
    }

    /// Choices for the y selector: the "None" option followed by every column.
    /// The option is left out when a column already carries that name.
    pub fn y_options(&self) -> Vec<String> {
        let Some(data) = &self.data else {
            return vec![];
        };
        let columns = data.dataset.columns();
        let sentinel = (!data.dataset.has_column(NONE_OPTION)).then(|| NONE_OPTION.to_string());
        sentinel.into_iter().chain(columns.iter().cloned()).collect()
    }

    /// Plotting is only offered once a dataset is loaded.
    pub fn can_plot(&self) -> bool {
        self.data.is_some()
    }
}

/// Map a y selector value to a column. The "None" option means unset,
/// unless the dataset has a column with that exact name.
pub fn resolve_y_option(value: Option<&str>, dataset: &Dataset) -> Option<String> {
    value
        .filter(|v| *v != NONE_OPTION || dataset.has_column(NONE_OPTION))
        .map(|v| v.to_string())
}

pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one evaluation. A load failure aborts it before any plotting.
    pub fn evaluate(&self, input: SessionInput) -> Result<SessionView> {
        let discovery = discovery::discover_csv_files(&self.config.csv_directory);

        let data = match DataSource::choose(input.upload, input.selected_file) {
            Some(source) => Some(load_source(&discovery, source)?),
            None => None,
        };

        let plot = match (&data, &input.request) {
            (Some(data), Some(request)) => {
                let request = PlotRequest {
                    y_column: resolve_y_option(request.y_column.as_deref(), &data.dataset),
                    ..request.clone()
                };
                Some(render_plot(&data.dataset, &request, &self.config.render)?)
            }
            (None, Some(_)) => {
                debug!("plot requested without a dataset");
                None
            }
            _ => None,
        };

        Ok(SessionView {
            discovery,
            data,
            plot,
        })
    }
}

fn load_source(discovery: &Discovery, source: DataSource) -> Result<LoadedData> {
    let label = source.label().to_string();
    let dataset = match source {
        DataSource::Upload(upload) => csv_reader::read_csv_from_bytes(&upload.bytes)
            .with_context(|| format!("Failed to load uploaded file '{}'", upload.name))?,
        DataSource::Local(name) => {
            let path = discovery.resolve(&name)?;
            csv_reader::read_csv_from_path(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
    };

    info!(
        source = %label,
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );
    Ok(LoadedData {
        source: label,
        dataset,
    })
}

/// Select, lay out and draw one plot.
pub fn render_plot(
    dataset: &Dataset,
    request: &PlotRequest,
    options: &RenderOptions,
) -> Result<RenderedPlot> {
    let selection = plot::select_plot(dataset, request)?;
    debug!(operation = ?selection.operation, y_label = %selection.y_label, "plot selected");

    let figure = figure::build_figure(dataset, &selection, options.bins)?;
    let bytes = render::render_figure(&figure, options).context("Failed to render plot")?;

    info!(title = %selection.title, bytes = bytes.len(), "plot rendered");
    Ok(RenderedPlot {
        title: selection.title,
        format: options.format,
        bytes,
    })
}
