//! Everything one rendering session owns, created in dependency order and torn
//! down in reverse.
//!
//! Types:
//!
//! - `RenderSession` holds the screen quad, the linked program, the channel
//!   textures and one target per eye, plus the playback clock.
//!
//! Functions:
//!
//! - `RenderSession::new` fails if the shader cannot be built; a session never
//!   exists without a linked program.
//! - `draw_eye` renders the shader into one eye target.
//! - `reload` rebuilds the program from disk and swaps it in only if it links.
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use shadertoy::ChannelConfig;

use crate::channels::ChannelTextures;
use crate::driver::{check_driver_error, GlDriver, ShaderStage};
use crate::error::ShaderError;
use crate::program::ShaderProgram;
use crate::quad::{
    self, POSITION_ATTRIBUTE, POSITION_LAYOUT, QUAD_VERTEX_SHADER, QUAD_VERTICES,
    TEXCOORD_ATTRIBUTE, TEXCOORD_LAYOUT,
};
use crate::resource::{EyeTarget, GpuResource, SharedResource};
use crate::shader::{Shader, SourceFormat};
use crate::types::{scaled_size, EyeView, SessionConfig};
use crate::uniforms::FrameUniforms;

pub struct RenderSession {
    // Field order is drop order.
    eyes: Vec<EyeTarget>,
    channels: ChannelTextures,
    program: ShaderProgram,
    quad: SharedResource,
    uniforms: FrameUniforms,
    config: SessionConfig,
    driver: Rc<dyn GlDriver>,
    started: Instant,
}

impl RenderSession {
    /// Uploads the quad, builds the program, loads channel textures and
    /// allocates the eye targets, in that order.
    pub fn new(driver: Rc<dyn GlDriver>, config: SessionConfig) -> Result<Self, ShaderError> {
        let quad = GpuResource::buffer(Rc::clone(&driver)).shared();
        quad.generate()?;
        driver.bind_array_buffer(quad.index());
        driver.array_buffer_data(quad::vertex_bytes());
        driver.bind_array_buffer(0);
        check_driver_error(driver.as_ref(), "upload screen quad");

        let program = build_program(&driver, &config.shader_path)?;
        let channel_config = program.channels().unwrap_or_default();
        let channels = ChannelTextures::load(&driver, &channel_config, &config.resource_dir)?;
        let eyes = create_eyes(&driver, &config, &channel_config)?;

        tracing::info!(
            shader = %config.shader_path.display(),
            eyes = eyes.len(),
            channels = channels.iter().count(),
            screen_percentage = channel_config.screen_percentage(),
            "render session ready"
        );

        Ok(Self {
            eyes,
            channels,
            program,
            quad,
            uniforms: FrameUniforms::default(),
            config,
            driver,
            started: Instant::now(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn channels(&self) -> &ChannelTextures {
        &self.channels
    }

    pub fn eyes(&self) -> &[EyeTarget] {
        &self.eyes
    }

    /// Seconds since the session started, fed to `iGlobalTime`.
    pub fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Per-frame housekeeping; relinks from disk when `debug_relink` is set.
    pub fn begin_frame(&mut self) {
        if self.config.debug_relink {
            self.reload();
        }
    }

    /// Renders the shader into eye target `eye`.
    pub fn draw_eye(&mut self, eye: usize, view: &EyeView) -> Result<(), ShaderError> {
        let target = self.eyes.get(eye).ok_or_else(|| {
            ShaderError::precondition(
                "render session",
                format!("eye {eye} requested but only {} exist", self.eyes.len()),
            )
        })?;
        let driver = self.driver.as_ref();

        target.bind(driver);
        driver.bind_array_buffer(self.quad.index());
        self.program
            .enable_vertex_attrib(POSITION_ATTRIBUTE, POSITION_LAYOUT)?;
        self.program
            .enable_vertex_attrib(TEXCOORD_ATTRIBUTE, TEXCOORD_LAYOUT)?;

        self.program.begin();
        self.channels.bind(&mut self.program, driver)?;

        let (width, height) = target.size();
        self.uniforms.resolution = [width as f32, height as f32];
        self.uniforms.set_time(self.started.elapsed().as_secs_f32());
        self.uniforms.channel_resolution = self.channels.resolutions();
        self.uniforms.camera_transform = view.camera_transform;
        self.uniforms.focal_length = self.config.focal_length;
        self.uniforms.refresh_date();
        self.uniforms.apply(&mut self.program)?;

        driver.draw_triangles(0, QUAD_VERTICES.len() as i32);

        self.program.end();
        self.program.disable_vertex_attrib(POSITION_ATTRIBUTE)?;
        self.program.disable_vertex_attrib(TEXCOORD_ATTRIBUTE)?;
        driver.bind_array_buffer(0);
        driver.bind_framebuffer(0);
        check_driver_error(driver, "draw eye");
        Ok(())
    }

    /// Rebuilds the program from the shader file.
    ///
    /// On failure the error is logged and the current program stays in use.
    /// Channel textures and eye targets are rebuilt when the new header asks
    /// for different inputs or a different scale.
    pub fn reload(&mut self) -> bool {
        match self.try_reload() {
            Ok(()) => {
                tracing::info!(shader = %self.config.shader_path.display(), "shader reloaded");
                true
            }
            Err(error) => {
                tracing::warn!(
                    shader = %self.config.shader_path.display(),
                    error = %error,
                    "shader reload failed; keeping previous program"
                );
                false
            }
        }
    }

    fn try_reload(&mut self) -> Result<(), ShaderError> {
        let program = build_program(&self.driver, &self.config.shader_path)?;
        let previous = self.program.channels().unwrap_or_default();
        let next = program.channels().unwrap_or_default();

        let channels = if next == previous {
            None
        } else {
            Some(ChannelTextures::load(
                &self.driver,
                &next,
                &self.config.resource_dir,
            )?)
        };
        let eyes = if next.screen_percentage() == previous.screen_percentage() {
            None
        } else {
            Some(create_eyes(&self.driver, &self.config, &next)?)
        };

        self.program = program;
        if let Some(channels) = channels {
            self.channels = channels;
        }
        if let Some(eyes) = eyes {
            self.eyes = eyes;
        }
        Ok(())
    }
}

fn build_program(
    driver: &Rc<dyn GlDriver>,
    shader_path: &Path,
) -> Result<ShaderProgram, ShaderError> {
    let vertex = Shader::builtin(
        Rc::clone(driver),
        ShaderStage::Vertex,
        "screen quad",
        QUAD_VERTEX_SHADER,
    );
    let fragment = Shader::from_file(
        Rc::clone(driver),
        ShaderStage::Fragment,
        SourceFormat::ShaderToy,
        shader_path,
    )?;

    let mut program = ShaderProgram::new(Rc::clone(driver), shader_path.display().to_string())?;
    program.reserve_attrib_location(POSITION_ATTRIBUTE);
    program.reserve_attrib_location(TEXCOORD_ATTRIBUTE);
    program.load_and_compile(vertex.into_shared(), fragment.into_shared())?;
    program.link()?;
    Ok(program)
}

fn create_eyes(
    driver: &Rc<dyn GlDriver>,
    config: &SessionConfig,
    channels: &ChannelConfig,
) -> Result<Vec<EyeTarget>, ShaderError> {
    let (width, height) = scaled_size(config.eye_size, channels.screen_percentage());
    let mut eyes = Vec::with_capacity(config.layout.count());
    for _ in 0..config.layout.count() {
        let mut eye = EyeTarget::new(driver)?;
        eye.configure(driver.as_ref(), width, height);
        eyes.push(eye);
    }
    Ok(eyes)
}
