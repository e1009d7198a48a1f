//! Driver-allocated GPU objects with exactly-once release.
//!
//! Types:
//!
//! - `ResourceKind` selects which driver create/delete pair a handle uses.
//! - `GpuResource` owns one handle, generated lazily and released on drop.
//! - `SharedResource` is the reference-counted form stored by consumers that
//!   need to hand the same texture or buffer to several owners.
//! - `EyeTarget` groups the framebuffer, colour texture and depth render target
//!   one eye renders into.
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::driver::{
    check_driver_error, DriverError, GlDriver, TextureImage, TextureSampling, TextureTarget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Buffer,
    Framebuffer,
    RenderTarget,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Buffer => "buffer",
            Self::Framebuffer => "framebuffer",
            Self::RenderTarget => "render target",
        }
    }

    fn allocate(self, driver: &dyn GlDriver) -> Result<u32, DriverError> {
        match self {
            Self::Texture => driver.create_texture(),
            Self::Buffer => driver.create_buffer(),
            Self::Framebuffer => driver.create_framebuffer(),
            Self::RenderTarget => driver.create_renderbuffer(),
        }
    }

    fn release(self, driver: &dyn GlDriver, handle: u32) {
        match self {
            Self::Texture => driver.delete_texture(handle),
            Self::Buffer => driver.delete_buffer(handle),
            Self::Framebuffer => driver.delete_framebuffer(handle),
            Self::RenderTarget => driver.delete_renderbuffer(handle),
        }
    }
}

pub type SharedResource = Rc<GpuResource>;

/// A texture, buffer, framebuffer or render target owned by the renderer.
///
/// The handle stays `0` until [`GpuResource::generate`] succeeds; a generated
/// handle is released when the value is dropped.
pub struct GpuResource {
    driver: Rc<dyn GlDriver>,
    kind: ResourceKind,
    handle: Cell<u32>,
}

impl GpuResource {
    pub fn new(driver: Rc<dyn GlDriver>, kind: ResourceKind) -> Self {
        Self {
            driver,
            kind,
            handle: Cell::new(0),
        }
    }

    pub fn texture(driver: Rc<dyn GlDriver>) -> Self {
        Self::new(driver, ResourceKind::Texture)
    }

    pub fn buffer(driver: Rc<dyn GlDriver>) -> Self {
        Self::new(driver, ResourceKind::Buffer)
    }

    pub fn framebuffer(driver: Rc<dyn GlDriver>) -> Self {
        Self::new(driver, ResourceKind::Framebuffer)
    }

    pub fn render_target(driver: Rc<dyn GlDriver>) -> Self {
        Self::new(driver, ResourceKind::RenderTarget)
    }

    pub fn shared(self) -> SharedResource {
        Rc::new(self)
    }

    /// Allocates the driver object on first call; later calls return the
    /// existing handle without touching the driver.
    pub fn generate(&self) -> Result<u32, DriverError> {
        let current = self.handle.get();
        if current != 0 {
            return Ok(current);
        }
        let handle = self.kind.allocate(self.driver.as_ref())?;
        check_driver_error(self.driver.as_ref(), "generate resource");
        self.handle.set(handle);
        Ok(handle)
    }

    pub fn index(&self) -> u32 {
        self.handle.get()
    }

    pub fn is_generated(&self) -> bool {
        self.handle.get() != 0
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl fmt::Debug for GpuResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuResource")
            .field("kind", &self.kind)
            .field("handle", &self.handle.get())
            .finish()
    }
}

impl Drop for GpuResource {
    fn drop(&mut self) {
        let handle = self.handle.replace(0);
        if handle == 0 {
            return;
        }
        self.kind.release(self.driver.as_ref(), handle);
        if !check_driver_error(self.driver.as_ref(), "release resource") {
            tracing::warn!(
                kind = self.kind.label(),
                handle,
                "driver error while releasing resource"
            );
        }
    }
}

/// Offscreen target one eye renders into before the compositor picks it up.
#[derive(Debug)]
pub struct EyeTarget {
    framebuffer: SharedResource,
    color: SharedResource,
    depth: SharedResource,
    size: (u32, u32),
}

impl EyeTarget {
    /// Generates all three handles; storage is allocated by [`configure`].
    ///
    /// [`configure`]: EyeTarget::configure
    pub fn new(driver: &Rc<dyn GlDriver>) -> Result<Self, DriverError> {
        let framebuffer = GpuResource::framebuffer(Rc::clone(driver)).shared();
        let color = GpuResource::texture(Rc::clone(driver)).shared();
        let depth = GpuResource::render_target(Rc::clone(driver)).shared();
        for resource in [&framebuffer, &color, &depth] {
            resource.generate()?;
        }
        Ok(Self {
            framebuffer,
            color,
            depth,
            size: (0, 0),
        })
    }

    /// Allocates colour and depth storage for `width` x `height` and attaches
    /// both to the framebuffer.
    pub fn configure(&mut self, driver: &dyn GlDriver, width: u32, height: u32) {
        driver.bind_framebuffer(self.framebuffer.index());

        driver.bind_texture(TextureTarget::Texture2d, self.color.index());
        driver.texture_sampling(TextureTarget::Texture2d, TextureSampling::RepeatNearest);
        driver.texture_image_rgba(TextureImage::Texture2d, width, height, None);
        driver.attach_color_texture(self.color.index());

        driver.depth_storage(self.depth.index(), width, height);
        driver.attach_depth_renderbuffer(self.depth.index());

        driver.bind_texture(TextureTarget::Texture2d, 0);
        driver.bind_framebuffer(0);
        check_driver_error(driver, "configure eye target");
        self.size = (width, height);
    }

    /// Binds the framebuffer and sets the viewport to cover it.
    pub fn bind(&self, driver: &dyn GlDriver) {
        driver.bind_framebuffer(self.framebuffer.index());
        let (width, height) = self.size;
        driver.viewport(0, 0, width as i32, height as i32);
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn framebuffer(&self) -> &SharedResource {
        &self.framebuffer
    }

    /// Colour texture handed to the compositor.
    pub fn color(&self) -> &SharedResource {
        &self.color
    }

    pub fn depth(&self) -> &SharedResource {
        &self.depth
    }
}
