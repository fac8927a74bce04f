use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_poster::constants::pt_to_mm;
use pdf_poster::{
    CancelToken, CollisionPolicy, NamingScheme, PdfSource, RunControl, TiledPosterOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gradil", about = "Cut PDF pages into printable poster tiles", version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tile every page of a PDF into a rows x cols grid
    Tile {
        /// Input PDF file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of tile rows per page
        #[arg(long)]
        rows: Option<usize>,

        /// Number of tile columns per page
        #[arg(long)]
        cols: Option<usize>,

        /// Folder the poster is written to
        #[arg(short, long)]
        output_folder: Option<PathBuf>,

        /// Fixed output file name (default: <prefix>_<timestamp>.pdf)
        #[arg(long, conflicts_with = "prefix")]
        name: Option<String>,

        /// Prefix of timestamped output names
        #[arg(long)]
        prefix: Option<String>,

        /// What to do when the output name is taken
        #[arg(long, value_enum)]
        on_collision: Option<CollisionArg>,

        /// Write the poster without stream compression
        #[arg(long)]
        no_compress: bool,

        /// JSON options file; other flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// List posters in an output folder, newest first
    List {
        /// Folder to list (default: the default output folder)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CollisionArg {
    Number,
    Fail,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Number => Self::Disambiguate,
            CollisionArg::Fail => Self::Fail,
            CollisionArg::Overwrite => Self::Overwrite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Tile {
            input,
            rows,
            cols,
            output_folder,
            name,
            prefix,
            on_collision,
            no_compress,
            config,
            stats_only,
        } => {
            let mut options = match &config {
                Some(path) => TiledPosterOptions::load(path)
                    .await
                    .with_context(|| format!("Failed to read config {}", path.display()))?,
                None => TiledPosterOptions::default(),
            };

            if let Some(input) = input {
                options.source_file = input;
            }
            if let Some(rows) = rows {
                options.rows = rows;
            }
            if let Some(cols) = cols {
                options.cols = cols;
            }
            if let Some(folder) = output_folder {
                options.output_folder = folder;
            }
            if let Some(file_name) = name {
                options.naming = NamingScheme::Fixed { file_name };
            } else if let Some(prefix) = prefix {
                options.naming = NamingScheme::Timestamp { prefix };
            }
            if let Some(policy) = on_collision {
                options.on_collision = policy.into();
            }
            if no_compress {
                options.compress = false;
            }

            if options.source_file.as_os_str().is_empty() {
                bail!("No input PDF given (use --input or a config file)");
            }
            options.validate()?;

            if stats_only {
                return print_statistics(&options).await;
            }

            let cancel = CancelToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, stopping after the current page");
                    ctrl_c_token.cancel();
                }
            });

            let control = RunControl::new().with_cancel(cancel);
            let file = pdf_poster::generate_poster_with(&options, control)
                .await
                .with_context(|| {
                    format!("Failed to tile {}", options.source_file.display())
                })?;
            println!("Poster → {}", file.path.display());
        }

        Commands::List { folder } => {
            let folder = folder.unwrap_or_else(pdf_poster::default_output_folder);
            let files = pdf_poster::list_generated_files(&folder)
                .with_context(|| format!("Failed to list {}", folder.display()))?;

            if files.is_empty() {
                println!("No posters in {}", folder.display());
            }
            for file in files {
                println!("{}", file.path.display());
            }
        }
    }

    Ok(())
}

async fn print_statistics(options: &TiledPosterOptions) -> Result<()> {
    let source = PdfSource::load(&options.source_file)
        .await
        .with_context(|| format!("Failed to open {}", options.source_file.display()))?;
    let stats = pdf_poster::calculate_statistics(&source, options)?;

    println!("Poster Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Grid: {} x {}", stats.rows, stats.cols);
    println!("  Output pages: {}", stats.output_pages);
    for (page, size) in stats.tile_sizes.iter().enumerate() {
        println!(
            "  Page {}: tiles of {:.1} x {:.1} mm",
            page + 1,
            pt_to_mm(size.width),
            pt_to_mm(size.height)
        );
    }

    Ok(())
}
