mod cli;
mod config;
mod run;

use anyhow::Result;
use cli::Command;
use config::AppConfig;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config_path = config::resolve_path(cli.config.as_deref());
    let config = match &config_path {
        Some(path) => AppConfig::load_or_default(path)?,
        None => AppConfig::default(),
    };
    tracing::debug!(path = ?config_path, ?config, "resolved configuration");

    match cli.command {
        Command::Inspect(args) => run::inspect(args, &config),
        Command::Emit(args) => run::emit(args),
        Command::Config => {
            let loaded = config_path.as_deref().filter(|path| path.exists());
            run::show_config(loaded, &config)
        }
    }
}
