use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use csvplot::config::Config;
use csvplot::plot::{PlotKind, PlotRequest};
use csvplot::session::{Session, SessionInput, Upload};
use csvplot::summary;
use csvplot::OutputFormat;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "csvplot", version)]
#[command(about = "Preview CSV files and plot their columns", long_about = None)]
struct Cli {
    /// Directory searched for local CSV files
    #[arg(long, env = "CSVPLOT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the CSV files in the data directory
    List,
    /// List the supported plot kinds
    Kinds,
    /// Show the first rows of a dataset and its column choices
    Preview(PreviewArgs),
    /// Render a plot of one or two columns
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// CSV file to upload ('-' reads stdin); takes precedence over --file
    #[arg(long, value_name = "PATH")]
    upload: Option<PathBuf>,

    /// Name of a CSV file in the data directory
    #[arg(long, value_name = "NAME")]
    file: Option<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of rows to show
    #[arg(long)]
    rows: Option<usize>,

    /// Also print summary statistics of numeric columns
    #[arg(long)]
    describe: bool,

    /// Print JSON instead of text tables
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Column for the x axis
    #[arg(short, long)]
    x: String,

    /// Column for the y axis ("None" to leave it unset)
    #[arg(short, long)]
    y: Option<String>,

    /// Plot kind: line, bar, scatter, distribution or count
    #[arg(short, long)]
    kind: PlotKind,

    /// Write the image here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Histogram bins for distribution plots
    #[arg(long)]
    bins: Option<usize>,

    /// Series color name
    #[arg(long)]
    color: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_csv_directory(cli.data_dir.clone());

    match cli.command {
        Command::List => run_list(config),
        Command::Kinds => {
            for kind in PlotKind::ALL {
                println!("{}", kind);
            }
            Ok(())
        }
        Command::Preview(args) => run_preview(config, args),
        Command::Plot(args) => run_plot(config, args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run_list(config: Config) -> Result<()> {
    let view = Session::new(config).evaluate(SessionInput::default())?;
    for file in &view.discovery.files {
        println!("{}", file);
    }
    Ok(())
}

fn run_preview(config: Config, args: PreviewArgs) -> Result<()> {
    let rows = args.rows.unwrap_or(config.preview_rows);
    let input = SessionInput {
        upload: read_upload(&args.source)?,
        selected_file: args.source.file.clone(),
        request: None,
    };
    let view = Session::new(config).evaluate(input)?;

    let Some(data) = &view.data else {
        println!("No dataset loaded. Upload a CSV file or select one with --file.");
        if !view.discovery.files.is_empty() {
            println!("Available files: {}", view.discovery.files.join(", "));
        }
        return Ok(());
    };

    let preview = summary::preview(&data.dataset, rows);
    if args.json {
        let mut value = serde_json::json!({
            "source": data.source,
            "preview": preview,
            "x_options": view.x_options(),
            "y_options": view.y_options(),
        });
        if args.describe {
            value["describe"] = serde_json::to_value(summary::describe(&data.dataset))?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Data Preview ({})", data.source);
    print!("{}", summary::preview_table(&preview));
    if args.describe {
        println!();
        println!("Summary Statistics");
        print!("{}", summary::describe_table(&summary::describe(&data.dataset)));
    }
    println!();
    println!("X options: {}", view.x_options().join(", "));
    println!("Y options: {}", view.y_options().join(", "));
    let kinds: Vec<&str> = PlotKind::ALL.iter().map(|k| k.display_name()).collect();
    println!("Plot kinds: {}", kinds.join(", "));
    Ok(())
}

fn run_plot(mut config: Config, args: PlotArgs) -> Result<()> {
    let render = &mut config.render;
    if let Some(width) = args.width {
        render.width = width;
    }
    if let Some(height) = args.height {
        render.height = height;
    }
    if let Some(format) = args.format {
        render.format = format;
    }
    if args.bins.is_some() {
        render.bins = args.bins;
    }
    if args.color.is_some() {
        render.color = args.color.clone();
    }

    let request = PlotRequest::new(args.x.clone(), args.y.clone(), args.kind);
    let input = SessionInput {
        upload: read_upload(&args.source)?,
        selected_file: args.source.file.clone(),
        request: Some(request),
    };
    let view = Session::new(config).evaluate(input)?;

    let Some(plot) = view.plot else {
        anyhow::bail!("No dataset loaded. Upload a CSV file or select one with --file.");
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &plot.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} written to {}", plot.title, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&plot.bytes)
                .context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Read the uploaded file, if any. `-` reads stdin.
fn read_upload(source: &SourceArgs) -> Result<Option<Upload>> {
    let Some(path) = &source.upload else {
        return Ok(None);
    };

    let bytes = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Failed to read CSV from stdin")?;
        buf
    } else {
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
    };

    let name = if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };

    Ok(Some(Upload { name, bytes }))
}
