use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::scaled_size;
use serde::Serialize;
use shadertoy::{parse_document, ShaderToyDocument};
use tracing_subscriber::EnvFilter;

use crate::cli::{EmitArgs, InspectArgs};
use crate::config::AppConfig;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub shader: PathBuf,
    pub screen_percentage: f32,
    pub body_bytes: usize,
    pub channels: Vec<ChannelReport>,
}

#[derive(Debug, Serialize)]
pub struct ChannelReport {
    pub channel: usize,
    pub content: &'static str,
    pub sampler: &'static str,
    pub files: Vec<AssetFile>,
}

#[derive(Debug, Serialize)]
pub struct AssetFile {
    pub path: PathBuf,
    pub present: bool,
}

impl InspectReport {
    pub fn build(shader: &Path, document: &ShaderToyDocument, resource_dir: &Path) -> Self {
        let channels = document
            .config()
            .inputs()
            .map(|(channel, content)| ChannelReport {
                channel,
                content: content.token(),
                sampler: content.kind().sampler_type(),
                files: content
                    .asset()
                    .resolve(resource_dir)
                    .into_iter()
                    .map(|path| AssetFile {
                        present: path.is_file(),
                        path,
                    })
                    .collect(),
            })
            .collect();

        Self {
            shader: shader.to_path_buf(),
            screen_percentage: document.config().screen_percentage(),
            body_bytes: document.body().len(),
            channels,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{}\n  screen percentage: {}\n  body: {} bytes\n",
            self.shader.display(),
            self.screen_percentage,
            self.body_bytes
        );
        if self.channels.is_empty() {
            out.push_str("  no channels bound\n");
        }
        for channel in &self.channels {
            out.push_str(&format!(
                "  iChannel{:<2} {:<16} {}\n",
                channel.channel, channel.content, channel.sampler
            ));
            for file in &channel.files {
                let status = if file.present { "ok" } else { "missing" };
                out.push_str(&format!("      {status:<8} {}\n", file.path.display()));
            }
        }
        out
    }
}

fn load_document(path: &Path) -> Result<ShaderToyDocument> {
    let file = File::open(path)
        .with_context(|| format!("failed to open shader at {}", path.display()))?;
    parse_document(BufReader::new(file))
        .with_context(|| format!("failed to parse shader header in {}", path.display()))
}

pub fn inspect(args: InspectArgs, config: &AppConfig) -> Result<()> {
    let document = load_document(&args.shader)?;
    let resource_dir = args
        .resource_dir
        .unwrap_or_else(|| config.resource_dir.clone());
    let report = InspectReport::build(&args.shader, &document, &resource_dir);

    let missing = report
        .channels
        .iter()
        .flat_map(|channel| &channel.files)
        .filter(|file| !file.present)
        .count();
    if missing > 0 {
        tracing::warn!(
            missing,
            dir = %resource_dir.display(),
            "channel assets missing; the renderer will use placeholders"
        );
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize inspect report")?;
        println!("{json}");
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn emit(args: EmitArgs) -> Result<()> {
    let document = load_document(&args.shader)?;
    let source = document.fragment_source();

    match args.out {
        Some(out) => {
            fs::write(&out, &source)
                .with_context(|| format!("failed to write fragment source to {}", out.display()))?;
            tracing::info!(
                shader = %args.shader.display(),
                out = %out.display(),
                bytes = source.len(),
                "wrote synthesized fragment source"
            );
        }
        None => print!("{source}"),
    }
    Ok(())
}

pub fn show_config(path: Option<&Path>, config: &AppConfig) -> Result<()> {
    match path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!("{}", config.to_toml()?);

    if config.shader.is_some() {
        let session = config.session_config(None)?;
        match load_document(&session.shader_path) {
            Ok(document) => {
                let percentage = document.config().screen_percentage();
                let (width, height) = scaled_size(session.eye_size, percentage);
                println!(
                    "# eye targets: {} x {width}x{height} (ScreenPercentage {percentage})",
                    session.layout.count()
                );
            }
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "configured shader is unusable");
            }
        }
    }
    Ok(())
}
