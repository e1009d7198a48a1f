use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories_next::ProjectDirs;
use renderer::{EyeLayout, SessionConfig};
use serde::{Deserialize, Serialize};

pub const ENV_CONFIG: &str = "TOYVR_CONFIG";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "ShaderToyVR";
const APPLICATION: &str = "toyvr";
const CONFIG_FILE: &str = "toyvr.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shader rendered when none is given on the command line.
    pub shader: Option<PathBuf>,
    pub resource_dir: PathBuf,
    pub focal_length: f32,
    /// Per-eye target size before the shader's `ScreenPercentage`.
    pub eye_size: [u32; 2],
    /// Render a single eye instead of a stereo pair.
    pub mono: bool,
    pub debug_relink: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            shader: None,
            resource_dir: session.resource_dir,
            focal_length: session.focal_length,
            eye_size: [session.eye_size.0, session.eye_size.1],
            mono: false,
            debug_relink: session.debug_relink,
        }
    }
}

impl AppConfig {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file at {}", path.display()))?;
            let config: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file at {}", path.display()))?;
            config.validate(path)?;
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "config file not found; using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.eye_size.contains(&0) {
            bail!(
                "eye_size in {} must be non-zero, found {:?}",
                path.display(),
                self.eye_size
            );
        }
        if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
            bail!(
                "focal_length in {} must be positive, found {}",
                path.display(),
                self.focal_length
            );
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration to TOML")
    }

    /// Session settings for `shader`, falling back to the configured shader.
    pub fn session_config(&self, shader: Option<&Path>) -> Result<SessionConfig> {
        let Some(shader_path) = shader.or(self.shader.as_deref()) else {
            bail!("no shader given and none configured");
        };
        Ok(SessionConfig {
            shader_path: shader_path.to_path_buf(),
            resource_dir: self.resource_dir.clone(),
            eye_size: (self.eye_size[0], self.eye_size[1]),
            layout: if self.mono {
                EyeLayout::Mono
            } else {
                EyeLayout::Stereo
            },
            focal_length: self.focal_length,
            debug_relink: self.debug_relink,
        })
    }
}

/// Explicit path if given, otherwise `toyvr.toml` in the platform config dir.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("toyvr.toml");
        fs::write(&path, "focal_length = 0.75\nmono = true\n").unwrap();

        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.focal_length, 0.75);
        assert!(config.mono);
        assert_eq!(config.resource_dir, PathBuf::from("resources"));
    }

    #[test]
    fn rejects_zero_eye_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("toyvr.toml");
        fs::write(&path, "eye_size = [0, 1440]\n").unwrap();
        let error = AppConfig::load_or_default(&path).unwrap_err();
        assert!(error.to_string().contains("eye_size"));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AppConfig {
            shader: Some(PathBuf::from("shaders/sky.glsl")),
            debug_relink: true,
            ..AppConfig::default()
        };
        let parsed: AppConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn session_config_prefers_explicit_shader() {
        let config = AppConfig {
            shader: Some(PathBuf::from("configured.glsl")),
            mono: true,
            ..AppConfig::default()
        };
        let session = config
            .session_config(Some(Path::new("explicit.glsl")))
            .unwrap();
        assert_eq!(session.shader_path, PathBuf::from("explicit.glsl"));
        assert_eq!(session.layout, EyeLayout::Mono);
        assert_eq!(session.eye_size, (1280, 1440));

        assert!(AppConfig::default().session_config(None).is_err());
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            resolve_path(Some(Path::new("/tmp/vr.toml"))),
            Some(PathBuf::from("/tmp/vr.toml"))
        );
    }
}
