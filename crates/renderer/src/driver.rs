//! The seam between the renderer and the OpenGL implementation.
//!
//! Every GPU object is named by a plain `u32` handle where `0` means "none",
//! mirroring the GL object model. The renderer never holds backend-specific
//! types, so shader units, programs and resource handles can be exercised
//! against a recording double in tests and against `glow` in production.
//!
//! Types:
//!
//! - `GlDriver` is the object-safe trait every backend implements.
//! - `ShaderStage`, `TextureTarget`, `TextureImage`, `TextureSampling`,
//!   `VertexLayout` and `UniformValue` describe driver calls without leaking
//!   GL enums into callers.
//! - `DriverError` covers object creation failures reported by the backend.
//!
//! Functions:
//!
//! - `check_driver_error` drains the driver's error queue after a call and
//!   reports each code through `tracing`. It never alters control flow.
use thiserror::Error;

/// Location returned for uniforms the driver does not know about.
pub const INVALID_LOCATION: i32 = -1;

const NO_ERROR: u32 = 0;
const INVALID_ENUM: u32 = 0x0500;
const INVALID_VALUE: u32 = 0x0501;
const INVALID_OPERATION: u32 = 0x0502;
const OUT_OF_MEMORY: u32 = 0x0505;
const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

/// Upper bound on codes drained per check so a broken driver cannot spin us.
const MAX_QUEUED_ERRORS: usize = 8;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver could not create {object}: {reason}")]
    Create { object: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2d,
    Cubemap,
}

/// Destination of a single image upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureImage {
    Texture2d,
    /// Cubemap face in +X, -X, +Y, -Y, +Z, -Z order.
    CubemapFace(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSampling {
    /// Repeat wrapping with trilinear filtering over generated mipmaps.
    RepeatMipmapped,
    /// Repeat wrapping with nearest filtering, no mipmaps (render targets).
    RepeatNearest,
}

/// Float vertex attribute layout inside the bound array buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub components: i32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

impl VertexLayout {
    pub const fn floats(components: i32, stride: i32, offset: i32) -> Self {
        Self {
            components,
            normalized: false,
            stride,
            offset,
        }
    }
}

/// Value uploaded to a uniform of the currently bound program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    Float1(f32),
    Float2(f32, f32),
    Float3(f32, f32, f32),
    Float4(f32, f32, f32, f32),
    Int1(i32),
    Int2(i32, i32),
    Int3(i32, i32, i32),
    Int4(i32, i32, i32, i32),
    Float1Array(&'a [f32]),
    Float3Array(&'a [f32]),
    Matrix2 { transpose: bool, values: &'a [f32] },
    Matrix3 { transpose: bool, values: &'a [f32] },
    Matrix4 { transpose: bool, values: &'a [f32] },
}

/// Operations the renderer issues against an OpenGL-style driver.
///
/// Handles are `0` when absent. Uniform locations are negative when the driver
/// does not expose the uniform.
pub trait GlDriver {
    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DriverError>;
    fn delete_shader(&self, shader: u32);
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;

    fn create_program(&self) -> Result<u32, DriverError>;
    fn delete_program(&self, program: u32);
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn bind_attrib_location(&self, program: u32, index: u32, name: &str);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    /// Binds `program` for subsequent draws; `0` unbinds.
    fn use_program(&self, program: u32);

    fn uniform_location(&self, program: u32, name: &str) -> i32;
    fn set_uniform(&self, location: i32, value: UniformValue<'_>);
    fn get_uniform_f32(&self, program: u32, location: i32, out: &mut [f32]);
    fn get_uniform_i32(&self, program: u32, location: i32, out: &mut [i32]);

    fn enable_vertex_attrib(&self, index: u32);
    fn disable_vertex_attrib(&self, index: u32);
    fn vertex_attrib_pointer(&self, index: u32, layout: VertexLayout);

    fn create_texture(&self) -> Result<u32, DriverError>;
    fn delete_texture(&self, texture: u32);
    fn create_buffer(&self) -> Result<u32, DriverError>;
    fn delete_buffer(&self, buffer: u32);
    fn create_framebuffer(&self) -> Result<u32, DriverError>;
    fn delete_framebuffer(&self, framebuffer: u32);
    fn create_renderbuffer(&self) -> Result<u32, DriverError>;
    fn delete_renderbuffer(&self, renderbuffer: u32);

    fn bind_array_buffer(&self, buffer: u32);
    fn array_buffer_data(&self, data: &[u8]);

    fn active_texture_unit(&self, unit: u32);
    fn bind_texture(&self, target: TextureTarget, texture: u32);
    /// Uploads tightly packed RGBA8 pixels, or allocates storage when `None`.
    fn texture_image_rgba(
        &self,
        image: TextureImage,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    );
    fn texture_sampling(&self, target: TextureTarget, sampling: TextureSampling);
    fn generate_mipmap(&self, target: TextureTarget);

    /// Binds `framebuffer` for drawing; `0` restores the default framebuffer.
    fn bind_framebuffer(&self, framebuffer: u32);
    fn attach_color_texture(&self, texture: u32);
    fn depth_storage(&self, renderbuffer: u32, width: u32, height: u32);
    fn attach_depth_renderbuffer(&self, renderbuffer: u32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn draw_triangles(&self, first: i32, count: i32);

    /// Pops the oldest pending error code, `0` when the queue is empty.
    fn error(&self) -> u32;
}

/// Human readable name for a GL error code.
pub fn describe_error(code: u32) -> &'static str {
    match code {
        NO_ERROR => "no error",
        INVALID_ENUM => "invalid enum",
        INVALID_VALUE => "invalid value",
        INVALID_OPERATION => "invalid operation",
        OUT_OF_MEMORY => "out of memory",
        INVALID_FRAMEBUFFER_OPERATION => "invalid framebuffer operation",
        _ => "unrecognised error",
    }
}

/// Drains pending driver errors, logging each against `site`.
///
/// Returns `true` when the queue was empty.
pub fn check_driver_error(driver: &dyn GlDriver, site: &str) -> bool {
    let mut clean = true;
    for _ in 0..MAX_QUEUED_ERRORS {
        let code = driver.error();
        if code == NO_ERROR {
            break;
        }
        clean = false;
        tracing::warn!(
            site,
            code,
            error = describe_error(code),
            "driver reported an error"
        );
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDriver;

    #[test]
    fn describes_known_codes() {
        assert_eq!(describe_error(0x0502), "invalid operation");
        assert_eq!(describe_error(0x0506), "invalid framebuffer operation");
        assert_eq!(describe_error(0x9999), "unrecognised error");
    }

    #[test]
    fn check_drains_queue() {
        let driver = RecordingDriver::new();
        assert!(check_driver_error(&driver, "idle"));

        driver.push_error(INVALID_VALUE);
        driver.push_error(INVALID_OPERATION);
        assert!(!check_driver_error(&driver, "upload"));
        assert!(check_driver_error(&driver, "upload"));
    }
}
