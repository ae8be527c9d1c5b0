use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pictos", about = "Picto and associated word PDF generator", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the picto PDF from a configuration file
    Generate {
        /// JSON configuration file
        #[arg(short, long, default_value = "./config.json")]
        config: PathBuf,

        /// Output PDF file
        #[arg(short, long, default_value = "/tmp/pictos.pdf")]
        output: PathBuf,

        /// Draw cut lines between cells
        #[arg(short = 'k', long)]
        cut_lines: bool,

        /// CSV entry list (columns: image, text, definition; header row optional) replacing the configured images
        #[arg(long)]
        entries: Option<PathBuf>,

        /// Override the configured paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Override the configured orientation
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PaperArg> for pdf_pictos::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for pdf_pictos::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Generate {
            config,
            output,
            cut_lines,
            entries,
            paper,
            orientation,
        } => {
            let mut pictos = pdf_pictos::load_config(&config)
                .await
                .with_context(|| format!("unable to load configuration {}", config.display()))?;

            if let Some(path) = entries {
                pictos.entries = pdf_pictos::load_entries_from_csv(&path)
                    .await
                    .with_context(|| format!("unable to read entries {}", path.display()))?;
            }
            if let Some(paper) = paper {
                pictos.grid.paper = paper.into();
            }
            if let Some(orientation) = orientation {
                pictos.grid.orientation = orientation.into();
            }
            pictos.validate()?;

            log::debug!(
                "Grid {}x{}, {} entries, definitions: {}",
                pictos.grid.cols,
                pictos.grid.rows,
                pictos.entries.len(),
                pictos.has_definitions()
            );

            pdf_pictos::generate_pdf(&pictos, cut_lines, &output).await?;
            println!(
                "Generated {} pictos on {} sheets → {}",
                pictos.entries.len(),
                pictos.grid.picto_page_count(pictos.entries.len()),
                output.display()
            );
        }
    }

    Ok(())
}
