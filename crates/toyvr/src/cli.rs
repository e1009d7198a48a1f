use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ENV_CONFIG;

#[derive(Parser, Debug)]
#[command(
    name = "toyvr",
    author,
    version,
    about = "ShaderToy-format shader tooling for the stereo renderer"
)]
pub struct Cli {
    /// Configuration file; defaults to `toyvr.toml` in the platform config directory.
    #[arg(long, global = true, env = ENV_CONFIG, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a shader header and report its channels and assets.
    Inspect(InspectArgs),
    /// Write the fragment source the renderer compiles for a shader.
    Emit(EmitArgs),
    /// Print the resolved configuration as TOML.
    Config,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// ShaderToy-format fragment shader.
    #[arg(value_name = "SHADER")]
    pub shader: PathBuf,

    /// Emit the report as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Directory to resolve channel textures against (overrides the config).
    #[arg(long, value_name = "DIR")]
    pub resource_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// ShaderToy-format fragment shader.
    #[arg(value_name = "SHADER")]
    pub shader: PathBuf,

    /// Write to this path instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
