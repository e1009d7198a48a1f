use std::path::PathBuf;

use crate::uniforms::IDENTITY;

/// How many eye targets a session renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EyeLayout {
    /// Single target, used when no head-mounted display is attached.
    Mono,
    /// Left and right targets for a head-mounted display.
    #[default]
    Stereo,
}

impl EyeLayout {
    pub fn count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Immutable configuration passed to [`RenderSession::new`].
///
/// [`RenderSession::new`]: crate::RenderSession::new
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// ShaderToy-format fragment shader to render.
    pub shader_path: PathBuf,
    /// Directory holding the bundled channel textures.
    pub resource_dir: PathBuf,
    /// Per-eye size recommended by the display, before `ScreenPercentage`.
    pub eye_size: (u32, u32),
    pub layout: EyeLayout,
    /// Value of `iFocalLength`.
    pub focal_length: f32,
    /// Rebuild the program from disk at the start of every frame.
    pub debug_relink: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::new(),
            resource_dir: PathBuf::from("resources"),
            eye_size: (1280, 1440),
            layout: EyeLayout::default(),
            focal_length: 1.0,
            debug_relink: false,
        }
    }
}

/// Caller-supplied view for one eye of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeView {
    /// Column-major head pose for `iCameraTransform`.
    pub camera_transform: [f32; 16],
}

impl Default for EyeView {
    fn default() -> Self {
        Self {
            camera_transform: IDENTITY,
        }
    }
}

/// Smallest and largest `ScreenPercentage` a render target honours.
pub const SCREEN_PERCENTAGE_RANGE: (f32, f32) = (0.2, 2.0);

/// Applies a shader's `ScreenPercentage` to a recommended target size.
///
/// The percentage is clamped to [`SCREEN_PERCENTAGE_RANGE`]; a non-finite
/// value renders at full size.
pub fn scaled_size((width, height): (u32, u32), percentage: f32) -> (u32, u32) {
    let (min, max) = SCREEN_PERCENTAGE_RANGE;
    let percentage = if percentage.is_finite() {
        percentage.clamp(min, max)
    } else {
        1.0
    };
    let scale = |value: u32| ((value as f32 * percentage).round() as u32).max(1);
    (scale(width), scale(height))
}
