use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use exr_dataset_prep::freeze::{CommandFreezer, FreezeRequest, GraphFreezer};
use exr_dataset_prep::image_pipeline::{ConversionConfig, ExrCompression, FolderConverter};
use exr_dataset_prep::logger::{self, error, info};

/// Normalize EXR training data and freeze trained graphs.
#[derive(Parser, Debug)]
#[command(name = "exr-dataset-prep", version, about, long_about = None)]
struct Cli {
    /// Enable debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every model folder listed in a model list
    Convert {
        /// Newline-delimited list of model folder names
        #[arg(long, value_name = "FILE", default_value = "verify_models.txt")]
        models: PathBuf,
        /// Directory holding one subdirectory per model
        #[arg(long, value_name = "DIR")]
        data_root: PathBuf,
        #[command(flatten)]
        options: ConversionArgs,
    },
    /// Convert a single folder
    ConvertFolder {
        #[arg(value_name = "DIR")]
        folder: PathBuf,
        #[command(flatten)]
        options: ConversionArgs,
    },
    /// Freeze a graph definition and checkpoint into one file
    Freeze {
        #[arg(long, value_name = "FILE")]
        graph: PathBuf,
        /// Checkpoint prefix
        #[arg(long, value_name = "PATH")]
        checkpoint: PathBuf,
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
        /// Freeze tool to run instead of the TensorFlow module
        #[arg(long, value_name = "EXE")]
        program: Option<PathBuf>,
        /// Arguments passed to the tool before the freeze flags
        #[arg(long = "program-arg", value_name = "ARG", allow_hyphen_values = true, requires = "program")]
        program_args: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct ConversionArgs {
    /// Write outputs under this directory instead of overwriting inputs
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,
    /// Width of ground-truth images
    #[arg(long, default_value_t = 256)]
    truth_width: usize,
    /// Height of ground-truth images
    #[arg(long, default_value_t = 256)]
    truth_height: usize,
    /// Channel read from multi-channel ground-truth files
    #[arg(long, default_value = "R")]
    truth_channel: String,
    /// Depth channel names to try in input files, first match wins
    #[arg(long, value_delimiter = ',', default_value = "D,Z,A")]
    depth_channels: Vec<String>,
    #[arg(long, value_enum, default_value_t = CompressionArg::Zip)]
    compression: CompressionArg,
    /// Log progress every N folder entries (0 disables)
    #[arg(long, default_value_t = 100)]
    progress_interval: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CompressionArg {
    None,
    Rle,
    Zip,
    Piz,
}

impl From<CompressionArg> for ExrCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => ExrCompression::None,
            CompressionArg::Rle => ExrCompression::Rle,
            CompressionArg::Zip => ExrCompression::Zip,
            CompressionArg::Piz => ExrCompression::Piz,
        }
    }
}

impl ConversionArgs {
    fn to_config(&self) -> ConversionConfig {
        ConversionConfig::builder()
            .truth_dimensions(self.truth_width, self.truth_height)
            .truth_channel(self.truth_channel.clone())
            .depth_channels(self.depth_channels.iter().cloned())
            .compression(self.compression.into())
            .output_root(self.output_root.clone())
            .progress_interval(self.progress_interval)
            .build()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(err) = run(cli.command) {
        error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            models,
            data_root,
            options,
        } => {
            let converter = FolderConverter::new(options.to_config());
            info!("Compression: {:?}", converter.config().compression);

            let batch = converter
                .convert_models(&models, &data_root)
                .with_context(|| format!("Conversion of {} aborted", models.display()))?;

            info!(
                "Converted {} files, skipped {}, {} failed",
                batch.total_converted(),
                batch.total_skipped(),
                batch.total_failures()
            );
        }
        Command::ConvertFolder { folder, options } => {
            let converter = FolderConverter::new(options.to_config());
            converter
                .convert_folder(&folder)
                .with_context(|| format!("Conversion of {} aborted", folder.display()))?;
        }
        Command::Freeze {
            graph,
            checkpoint,
            output,
            program,
            program_args,
        } => {
            let freezer = match program {
                Some(program) => CommandFreezer::new(program, program_args),
                None => CommandFreezer::default(),
            };
            let request = FreezeRequest::new(graph, checkpoint, output);
            let frozen = freezer.freeze(&request).context("Failed to freeze graph")?;
            info!("Frozen graph written to {}", frozen.display());
        }
    }

    Ok(())
}
