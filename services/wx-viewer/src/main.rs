//! Viewer command line tool.
//!
//! Renders legends to PNG, browses the data server catalog and checks style
//! files against the same code paths the viewer uses.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use renderer::{LabelFont, Legend, LegendRenderer};
use wx_common::ColorStyle;
use wx_viewer::catalog::{latest_meta, variable_options};
use wx_viewer::{DataServer, HttpDataServer, Props};

#[derive(Parser, Debug)]
#[command(name = "wx-viewer")]
#[command(about = "Weather tile viewer tools")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding config.json, styles.json, uconv.json and colorschemes.json
    #[arg(long, env = "WX_PROPS_DIR", default_value = "props")]
    props: PathBuf,

    /// TrueType font for legend labels (built-in bitmap font when unset)
    #[arg(long, env = "WX_LEGEND_FONT")]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a legend JSON document to PNG
    Legend {
        /// Legend JSON as produced by the tile layer
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long, default_value = "legend.png")]
        output: PathBuf,

        #[arg(long, default_value_t = 300)]
        width: u32,

        #[arg(long, default_value_t = 50)]
        height: u32,

        /// Style name shown in the title
        #[arg(long, default_value = "base")]
        style_name: String,
    },

    /// List datasets on the data server
    Datasets {
        /// Data server URI (defaults to dataServer from config.json)
        #[arg(long, env = "WX_DATA_SERVER")]
        data_server: Option<String>,
    },

    /// List the variable options of a dataset's newest instance
    Variables {
        dataset: String,

        /// Data server URI (defaults to dataServer from config.json)
        #[arg(long, env = "WX_DATA_SERVER")]
        data_server: Option<String>,
    },

    /// Validate a style file and print it with sorted keys
    Style {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Legend {
            input,
            output,
            width,
            height,
            style_name,
        } => {
            let renderer = LegendRenderer::new(load_font(args.font.as_deref())?);
            render_legend(&renderer, &input, &output, width, height, &style_name)
        }
        Command::Datasets { data_server } => {
            let server = data_server_for(&args.props, data_server)?;
            let mut names = server.datasets().await?;
            names.sort();
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Variables {
            dataset,
            data_server,
        } => {
            let server = data_server_for(&args.props, data_server)?;
            let (instance, meta) = latest_meta(&server, &dataset)
                .await
                .with_context(|| format!("Failed to load dataset '{}'", dataset))?;
            info!(dataset = %dataset, instance = %instance, "Loaded meta");
            for option in variable_options(&meta.variables) {
                println!("{}\t{}", option.value, option.label);
            }
            Ok(())
        }
        Command::Style { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let style = ColorStyle::from_json(&content)
                .with_context(|| format!("Invalid style in {}", file.display()))?;
            println!("{}", style.to_sorted_json()?);
            Ok(())
        }
    }
}

fn load_font(path: Option<&Path>) -> Result<LabelFont> {
    match path {
        Some(path) => LabelFont::from_file(path)
            .with_context(|| format!("Failed to load font {}", path.display())),
        None => Ok(LabelFont::default()),
    }
}

fn render_legend(
    renderer: &LegendRenderer,
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    style_name: &str,
) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let legend = Legend::from_json(&json)?;

    let canvas = renderer.render(&legend, width, height, style_name);
    let png = canvas.to_png()?;
    std::fs::write(output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        output = %output.display(),
        width,
        height,
        bytes = png.len(),
        "Legend written"
    );
    Ok(())
}

fn data_server_for(props: &Path, data_server: Option<String>) -> Result<HttpDataServer> {
    let uri = match data_server {
        Some(uri) => uri,
        None => {
            Props::load(props)
                .with_context(|| format!("Failed to load props from {}", props.display()))?
                .config
                .data_server
        }
    };
    Ok(HttpDataServer::new(&uri)?)
}
