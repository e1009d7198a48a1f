//! `GlDriver` backed by a live `glow` context.
use std::num::NonZeroU32;

use glow::HasContext;

use crate::driver::{
    DriverError, GlDriver, ShaderStage, TextureImage, TextureSampling, TextureTarget,
    UniformValue, VertexLayout, INVALID_LOCATION,
};

/// Forwards every driver call to OpenGL through `glow`.
///
/// All methods assume the wrapped context is current on the calling thread.
pub struct GlowDriver {
    gl: glow::Context,
}

impl GlowDriver {
    /// # Safety
    ///
    /// `gl` must stay current on this thread for the driver's lifetime, and
    /// the context must outlive every object created through the driver.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

fn handle<T>(raw: u32, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(raw).map(wrap)
}

fn location(raw: i32) -> Option<glow::NativeUniformLocation> {
    (raw > INVALID_LOCATION).then(|| glow::NativeUniformLocation(raw as u32))
}

fn created<T>(object: &'static str, result: Result<T, String>) -> Result<T, DriverError> {
    result.map_err(|reason| DriverError::Create { object, reason })
}

fn texture_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2d => glow::TEXTURE_2D,
        TextureTarget::Cubemap => glow::TEXTURE_CUBE_MAP,
    }
}

fn image_target(image: TextureImage) -> u32 {
    match image {
        TextureImage::Texture2d => glow::TEXTURE_2D,
        TextureImage::CubemapFace(face) => glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
    }
}

impl GlDriver for GlowDriver {
    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DriverError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        let shader = created("shader", unsafe { self.gl.create_shader(kind) })?;
        Ok(shader.0.get())
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(shader) = handle(shader, glow::NativeShader) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(shader) = handle(shader, glow::NativeShader) {
            unsafe { self.gl.shader_source(shader, source) }
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(shader) = handle(shader, glow::NativeShader) {
            unsafe { self.gl.compile_shader(shader) }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        handle(shader, glow::NativeShader)
            .map(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        handle(shader, glow::NativeShader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn create_program(&self) -> Result<u32, DriverError> {
        let program = created("program", unsafe { self.gl.create_program() })?;
        Ok(program.0.get())
    }

    fn delete_program(&self, program: u32) {
        if let Some(program) = handle(program, glow::NativeProgram) {
            unsafe { self.gl.delete_program(program) }
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            handle(program, glow::NativeProgram),
            handle(shader, glow::NativeShader),
        ) {
            unsafe { self.gl.attach_shader(program, shader) }
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            handle(program, glow::NativeProgram),
            handle(shader, glow::NativeShader),
        ) {
            unsafe { self.gl.detach_shader(program, shader) }
        }
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        if let Some(program) = handle(program, glow::NativeProgram) {
            unsafe { self.gl.bind_attrib_location(program, index, name) }
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(program) = handle(program, glow::NativeProgram) {
            unsafe { self.gl.link_program(program) }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        handle(program, glow::NativeProgram)
            .map(|program| unsafe { self.gl.get_program_link_status(program) })
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        handle(program, glow::NativeProgram)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        unsafe { self.gl.use_program(handle(program, glow::NativeProgram)) }
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        handle(program, glow::NativeProgram)
            .and_then(|program| unsafe { self.gl.get_uniform_location(program, name) })
            .map(|location| location.0 as i32)
            .unwrap_or(INVALID_LOCATION)
    }

    fn set_uniform(&self, location: i32, value: UniformValue<'_>) {
        let Some(location) = self::location(location) else {
            return;
        };
        let at = Some(&location);
        unsafe {
            match value {
                UniformValue::Float1(x) => self.gl.uniform_1_f32(at, x),
                UniformValue::Float2(x, y) => self.gl.uniform_2_f32(at, x, y),
                UniformValue::Float3(x, y, z) => self.gl.uniform_3_f32(at, x, y, z),
                UniformValue::Float4(x, y, z, w) => self.gl.uniform_4_f32(at, x, y, z, w),
                UniformValue::Int1(x) => self.gl.uniform_1_i32(at, x),
                UniformValue::Int2(x, y) => self.gl.uniform_2_i32(at, x, y),
                UniformValue::Int3(x, y, z) => self.gl.uniform_3_i32(at, x, y, z),
                UniformValue::Int4(x, y, z, w) => self.gl.uniform_4_i32(at, x, y, z, w),
                UniformValue::Float1Array(values) => self.gl.uniform_1_f32_slice(at, values),
                UniformValue::Float3Array(values) => self.gl.uniform_3_f32_slice(at, values),
                UniformValue::Matrix2 { transpose, values } => {
                    self.gl.uniform_matrix_2_f32_slice(at, transpose, values)
                }
                UniformValue::Matrix3 { transpose, values } => {
                    self.gl.uniform_matrix_3_f32_slice(at, transpose, values)
                }
                UniformValue::Matrix4 { transpose, values } => {
                    self.gl.uniform_matrix_4_f32_slice(at, transpose, values)
                }
            }
        }
    }

    fn get_uniform_f32(&self, program: u32, location: i32, out: &mut [f32]) {
        if let (Some(program), Some(location)) =
            (handle(program, glow::NativeProgram), self::location(location))
        {
            unsafe { self.gl.get_uniform_f32(program, &location, out) }
        }
    }

    fn get_uniform_i32(&self, program: u32, location: i32, out: &mut [i32]) {
        if let (Some(program), Some(location)) =
            (handle(program, glow::NativeProgram), self::location(location))
        {
            unsafe { self.gl.get_uniform_i32(program, &location, out) }
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(&self, index: u32, layout: VertexLayout) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                index,
                layout.components,
                glow::FLOAT,
                layout.normalized,
                layout.stride,
                layout.offset,
            )
        }
    }

    fn create_texture(&self) -> Result<u32, DriverError> {
        let texture = created("texture", unsafe { self.gl.create_texture() })?;
        Ok(texture.0.get())
    }

    fn delete_texture(&self, texture: u32) {
        if let Some(texture) = handle(texture, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(texture) }
        }
    }

    fn create_buffer(&self) -> Result<u32, DriverError> {
        let buffer = created("buffer", unsafe { self.gl.create_buffer() })?;
        Ok(buffer.0.get())
    }

    fn delete_buffer(&self, buffer: u32) {
        if let Some(buffer) = handle(buffer, glow::NativeBuffer) {
            unsafe { self.gl.delete_buffer(buffer) }
        }
    }

    fn create_framebuffer(&self) -> Result<u32, DriverError> {
        let framebuffer = created("framebuffer", unsafe { self.gl.create_framebuffer() })?;
        Ok(framebuffer.0.get())
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        if let Some(framebuffer) = handle(framebuffer, glow::NativeFramebuffer) {
            unsafe { self.gl.delete_framebuffer(framebuffer) }
        }
    }

    fn create_renderbuffer(&self) -> Result<u32, DriverError> {
        let renderbuffer = created("renderbuffer", unsafe { self.gl.create_renderbuffer() })?;
        Ok(renderbuffer.0.get())
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        if let Some(renderbuffer) = handle(renderbuffer, glow::NativeRenderbuffer) {
            unsafe { self.gl.delete_renderbuffer(renderbuffer) }
        }
    }

    fn bind_array_buffer(&self, buffer: u32) {
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, handle(buffer, glow::NativeBuffer))
        }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn active_texture_unit(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, target: TextureTarget, texture: u32) {
        unsafe {
            self.gl.bind_texture(
                texture_target(target),
                handle(texture, glow::NativeTexture),
            )
        }
    }

    fn texture_image_rgba(
        &self,
        image: TextureImage,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            self.gl.tex_image_2d(
                image_target(image),
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                pixels,
            )
        }
    }

    fn texture_sampling(&self, target: TextureTarget, sampling: TextureSampling) {
        let (min, mag) = match sampling {
            TextureSampling::RepeatMipmapped => (glow::LINEAR_MIPMAP_LINEAR, glow::LINEAR),
            TextureSampling::RepeatNearest => (glow::NEAREST, glow::NEAREST),
        };
        let target = texture_target(target);
        unsafe {
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, min as i32);
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, mag as i32);
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        unsafe { self.gl.generate_mipmap(texture_target(target)) }
    }

    fn bind_framebuffer(&self, framebuffer: u32) {
        unsafe {
            self.gl.bind_framebuffer(
                glow::FRAMEBUFFER,
                handle(framebuffer, glow::NativeFramebuffer),
            )
        }
    }

    fn attach_color_texture(&self, texture: u32) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                handle(texture, glow::NativeTexture),
                0,
            )
        }
    }

    fn depth_storage(&self, renderbuffer: u32, width: u32, height: u32) {
        unsafe {
            self.gl.bind_renderbuffer(
                glow::RENDERBUFFER,
                handle(renderbuffer, glow::NativeRenderbuffer),
            );
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT24,
                width as i32,
                height as i32,
            );
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    fn attach_depth_renderbuffer(&self, renderbuffer: u32) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                handle(renderbuffer, glow::NativeRenderbuffer),
            )
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
