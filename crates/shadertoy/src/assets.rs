//! Bundled image files backing each channel content type.
//!
//! Textures are single files in the resource directory; cubemaps are six files
//! named `<stem>_<face>.<ext>` in the +X, -X, +Y, -Y, +Z, -Z order the GPU
//! expects.
use std::path::{Path, PathBuf};

use crate::channel::ChannelContent;

pub const CUBEMAP_FACE_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAsset {
    Texture(&'static str),
    Cubemap {
        stem: &'static str,
        extension: &'static str,
    },
}

impl ChannelAsset {
    /// File names relative to the resource directory.
    pub fn file_names(&self) -> Vec<String> {
        match self {
            Self::Texture(name) => vec![(*name).to_string()],
            Self::Cubemap { stem, extension } => (0..CUBEMAP_FACE_COUNT)
                .map(|face| format!("{stem}_{face}.{extension}"))
                .collect(),
        }
    }

    pub fn resolve(&self, resource_dir: &Path) -> Vec<PathBuf> {
        self.file_names()
            .into_iter()
            .map(|name| resource_dir.join(name))
            .collect()
    }
}

impl ChannelContent {
    pub fn asset(self) -> ChannelAsset {
        use ChannelAsset::{Cubemap, Texture};
        match self {
            Self::NoiseRgb256 => Texture("tex16.png"),
            Self::NoiseR256 => Texture("tex12.png"),
            Self::NoiseRgb64 => Texture("tex11.png"),
            Self::NoiseR64 => Texture("tex10.png"),
            Self::NoiseR8 => Texture("tex15.png"),
            Self::StoneTiles => Texture("tex00.jpg"),
            Self::OldBirch => Texture("tex01.jpg"),
            Self::RustedMetal => Texture("tex02.jpg"),
            Self::DeepskyPattern => Texture("tex03.jpg"),
            Self::LondonStreet => Texture("tex04.jpg"),
            Self::FinishedWood => Texture("tex05.jpg"),
            Self::BarkAndLichen => Texture("tex06.jpg"),
            Self::ColoredRocks => Texture("tex07.jpg"),
            Self::ClothWeave => Texture("tex08.jpg"),
            Self::AnimalPrint => Texture("tex09.jpg"),
            Self::NyanCat => Texture("tex14.png"),
            Self::UffiziGallery512 => Cubemap {
                stem: "cube00",
                extension: "jpg",
            },
            Self::UffiziGallery64 => Cubemap {
                stem: "cube01",
                extension: "png",
            },
            Self::StPeters256 => Cubemap {
                stem: "cube02",
                extension: "jpg",
            },
            Self::StPeters64 => Cubemap {
                stem: "cube03",
                extension: "png",
            },
            Self::Grove512 => Cubemap {
                stem: "cube04",
                extension: "png",
            },
            Self::Grove64 => Cubemap {
                stem: "cube05",
                extension: "png",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_shape_matches_channel_kind() {
        for content in ChannelContent::all() {
            let asset = content.asset();
            let expected = if content.is_2d() { 1 } else { CUBEMAP_FACE_COUNT };
            assert_eq!(asset.file_names().len(), expected, "{content}");
        }
    }

    #[test]
    fn cubemap_faces_resolve_under_resource_dir() {
        let paths = ChannelContent::StPeters256
            .asset()
            .resolve(Path::new("/opt/toyvr/resources"));
        assert_eq!(paths[0], PathBuf::from("/opt/toyvr/resources/cube02_0.jpg"));
        assert_eq!(paths[5], PathBuf::from("/opt/toyvr/resources/cube02_5.jpg"));
    }
}
