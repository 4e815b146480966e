use crate::domain::model::RunOptions;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ocr-deploy")]
#[command(about = "Build, start and check the Transport OCR service stack")]
pub struct DeployArgs {
    /// Layer the GPU compose overlay on top of the base definitions
    #[arg(long)]
    pub gpu: bool,

    /// Skip the image build step
    #[arg(long)]
    pub skip_build: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl DeployArgs {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            gpu: self.gpu,
            skip_build: self.skip_build,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ocr-health")]
#[command(about = "Check that every Transport OCR service is running and reachable")]
pub struct HealthArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON on stdout; status lines go to stderr
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ocr-models")]
#[command(about = "Download the models the OCR service expects")]
pub struct ModelsArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--help`/`--version` are successful exits; anything else clap rejects is exit 1.
pub fn exit_code_for(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

pub fn try_parse_from<T, I, A>(args: I) -> std::result::Result<T, clap::Error>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    T::try_parse_from(args)
}

/// Parses the process arguments, printing usage or the error and exiting on failure.
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code_for(&e));
        }
    }
}
