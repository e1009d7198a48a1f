use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use image::imageops::flip_vertical_in_place;
use image::RgbaImage;
use shadertoy::{ChannelAsset, ChannelConfig, ChannelContent, ChannelKind, CHANNEL_COUNT};

use crate::driver::{
    check_driver_error, DriverError, GlDriver, TextureImage, TextureSampling, TextureTarget,
};
use crate::error::ShaderError;
use crate::program::ShaderProgram;
use crate::resource::{GpuResource, SharedResource};

/// A channel texture uploaded to the driver.
#[derive(Debug)]
pub struct ChannelTexture {
    pub content: ChannelContent,
    pub texture: SharedResource,
    pub resolution: [f32; 3],
    pub placeholder: bool,
}

impl ChannelTexture {
    fn target(&self) -> TextureTarget {
        match self.content.kind() {
            ChannelKind::Texture2d => TextureTarget::Texture2d,
            ChannelKind::Cubemap => TextureTarget::Cubemap,
        }
    }
}

/// Textures bound to `iChannel0`..`iChannel3`.
#[derive(Debug)]
pub struct ChannelTextures {
    slots: [Option<ChannelTexture>; CHANNEL_COUNT],
}

impl ChannelTextures {
    pub fn empty() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Decodes and uploads every configured channel.
    ///
    /// Images that fail to load are replaced by a 1x1 placeholder so a missing
    /// asset never stops the shader from running.
    pub fn load(
        driver: &Rc<dyn GlDriver>,
        config: &ChannelConfig,
        resource_dir: &Path,
    ) -> Result<Self, DriverError> {
        let mut textures = Self::empty();
        for (index, content) in config.inputs() {
            let texture = GpuResource::texture(Rc::clone(driver)).shared();
            texture.generate()?;

            let paths = content.asset().resolve(resource_dir);
            let uploaded = match content.asset() {
                ChannelAsset::Texture(_) => load_texture(driver.as_ref(), &texture, &paths[0]),
                ChannelAsset::Cubemap { .. } => load_cubemap(driver.as_ref(), &texture, &paths),
            };
            let (resolution, placeholder) = match uploaded {
                Ok((width, height)) => ([width as f32, height as f32, 1.0], false),
                Err(error) => {
                    tracing::warn!(
                        channel = index,
                        content = %content,
                        dir = %resource_dir.display(),
                        error = %error,
                        "failed to load channel texture; using placeholder"
                    );
                    upload_placeholder(driver.as_ref(), &texture, content.kind());
                    ([1.0, 1.0, 1.0], true)
                }
            };
            textures.slots[index] = Some(ChannelTexture {
                content,
                texture,
                resolution,
                placeholder,
            });
        }
        Ok(textures)
    }

    pub fn get(&self, channel: usize) -> Option<&ChannelTexture> {
        self.slots.get(channel).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ChannelTexture)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|texture| (index, texture)))
    }

    /// `iChannelResolution` values, zero for unbound channels.
    pub fn resolutions(&self) -> [[f32; 3]; CHANNEL_COUNT] {
        std::array::from_fn(|index| {
            self.get(index)
                .map(|texture| texture.resolution)
                .unwrap_or([0.0; 3])
        })
    }

    /// Binds each texture to the unit matching its channel and points the
    /// `iChannelN` sampler at it. The program must be bound.
    pub fn bind(
        &self,
        program: &mut ShaderProgram,
        driver: &dyn GlDriver,
    ) -> Result<(), ShaderError> {
        for (index, texture) in self.iter() {
            driver.active_texture_unit(index as u32);
            driver.bind_texture(texture.target(), texture.texture.index());
            match program.set_uniform_1i(&format!("iChannel{index}"), index as i32) {
                Ok(()) | Err(ShaderError::UniformNotFound { .. }) => {}
                Err(error) => return Err(error),
            }
        }
        check_driver_error(driver, "bind channel textures");
        Ok(())
    }
}

fn decode(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to open channel image at {}", path.display()))?;
    let mut rgba = image.to_rgba8();
    flip_vertical_in_place(&mut rgba);
    Ok(rgba)
}

fn load_texture(driver: &dyn GlDriver, texture: &GpuResource, path: &Path) -> Result<(u32, u32)> {
    let rgba = decode(path)?;
    let (width, height) = rgba.dimensions();

    driver.bind_texture(TextureTarget::Texture2d, texture.index());
    driver.texture_image_rgba(TextureImage::Texture2d, width, height, Some(rgba.as_raw()));
    driver.texture_sampling(TextureTarget::Texture2d, TextureSampling::RepeatMipmapped);
    driver.generate_mipmap(TextureTarget::Texture2d);
    driver.bind_texture(TextureTarget::Texture2d, 0);
    check_driver_error(driver, "upload channel texture");
    Ok((width, height))
}

fn load_cubemap(
    driver: &dyn GlDriver,
    texture: &GpuResource,
    faces: &[PathBuf],
) -> Result<(u32, u32)> {
    let mut decoded = Vec::with_capacity(faces.len());
    for face in faces {
        // Cubemap faces are addressed top-down, unlike 2D textures.
        let rgba = image::open(face)
            .with_context(|| format!("failed to open cubemap face at {}", face.display()))?
            .to_rgba8();
        decoded.push(rgba);
    }

    let (width, height) = decoded
        .first()
        .map(RgbaImage::dimensions)
        .ok_or_else(|| anyhow!("cubemap has no faces"))?;
    if width != height {
        anyhow::bail!("cubemap faces must be square, found {width}x{height}");
    }
    if let Some((index, face)) = decoded
        .iter()
        .enumerate()
        .find(|(_, face)| face.dimensions() != (width, height))
    {
        anyhow::bail!(
            "cubemap face {index} is {:?}, expected {width}x{height}",
            face.dimensions()
        );
    }

    driver.bind_texture(TextureTarget::Cubemap, texture.index());
    for (index, face) in decoded.iter().enumerate() {
        driver.texture_image_rgba(
            TextureImage::CubemapFace(index as u32),
            width,
            height,
            Some(face.as_raw()),
        );
    }
    driver.texture_sampling(TextureTarget::Cubemap, TextureSampling::RepeatMipmapped);
    driver.generate_mipmap(TextureTarget::Cubemap);
    driver.bind_texture(TextureTarget::Cubemap, 0);
    check_driver_error(driver, "upload cubemap");
    Ok((width, height))
}

fn upload_placeholder(driver: &dyn GlDriver, texture: &GpuResource, kind: ChannelKind) {
    let pixel = [255u8, 255, 255, 255];
    match kind {
        ChannelKind::Texture2d => {
            driver.bind_texture(TextureTarget::Texture2d, texture.index());
            driver.texture_image_rgba(TextureImage::Texture2d, 1, 1, Some(&pixel));
            driver.texture_sampling(TextureTarget::Texture2d, TextureSampling::RepeatNearest);
            driver.bind_texture(TextureTarget::Texture2d, 0);
        }
        ChannelKind::Cubemap => {
            driver.bind_texture(TextureTarget::Cubemap, texture.index());
            for face in 0..shadertoy::CUBEMAP_FACE_COUNT as u32 {
                driver.texture_image_rgba(TextureImage::CubemapFace(face), 1, 1, Some(&pixel));
            }
            driver.texture_sampling(TextureTarget::Cubemap, TextureSampling::RepeatNearest);
            driver.bind_texture(TextureTarget::Cubemap, 0);
        }
    }
    check_driver_error(driver, "upload placeholder texture");
}
