//! OpenGL renderer for ShaderToy-format fragment shaders in a stereo headset.
//!
//! Everything talks to the GPU through the [`GlDriver`] trait, so the object
//! model (shader units, programs and owned handles) is independent of the
//! context that backs it. The overall flow is:
//!
//! ```text
//!   SessionConfig
//!        │
//!        ▼
//!   RenderSession::new ──▶ quad buffer ──▶ ShaderProgram ──▶ ChannelTextures ──▶ EyeTarget x2
//!        │
//!        └─▶ draw_eye(eye, view) ──▶ FrameUniforms::apply ──▶ draw_triangles
//! ```
//!
//! With the default `glow` feature, [`GlowDriver`] forwards every call to a
//! live OpenGL context. The embedding application creates the window and the
//! context and makes it current; this crate never opens one itself.
//! Teardown happens in `Drop`, in the reverse of the order above.

mod channels;
mod driver;
mod error;
#[cfg(feature = "glow")]
mod gl;
mod program;
mod quad;
mod resource;
mod session;
mod shader;
#[cfg(test)]
mod testing;
mod types;
mod uniforms;

pub use channels::{ChannelTexture, ChannelTextures};
pub use driver::{
    check_driver_error, describe_error, DriverError, GlDriver, ShaderStage, TextureImage,
    TextureSampling, TextureTarget, UniformValue, VertexLayout, INVALID_LOCATION,
};
pub use error::ShaderError;
#[cfg(feature = "glow")]
pub use gl::GlowDriver;
pub use program::ShaderProgram;
pub use quad::{
    vertex_bytes, POSITION_ATTRIBUTE, QUAD_VERTEX_SHADER, QUAD_VERTICES, TEXCOORD_ATTRIBUTE,
};
pub use resource::{EyeTarget, GpuResource, ResourceKind, SharedResource};
pub use session::RenderSession;
pub use shader::{Shader, SharedShader, SourceFormat};
pub use types::{scaled_size, EyeLayout, EyeView, SessionConfig, SCREEN_PERCENTAGE_RANGE};
pub use uniforms::{FrameUniforms, IDENTITY};
