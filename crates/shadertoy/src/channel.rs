//! Channel slots and the fixed table of content types a ShaderToy header may
//! bind to them.
//!
//! Types:
//!
//! - `ChannelContent` enumerates every procedural noise texture, material
//!   texture and cubemap environment the bundled resource set provides.
//! - `ChannelKind` tells the renderer whether a channel needs a `sampler2D` or
//!   a `samplerCube`.
//!
//! Functions:
//!
//! - `ChannelContent::from_token` / `token` convert between header tokens and
//!   variants using a single lookup table so parsing and printing never drift.
//! - `parse_channel_key` maps `iChannel0`..`iChannel3` to a slot index.
use std::fmt;
use std::str::FromStr;

/// ShaderToy exposes four optional input channels (`iChannel0-3`).
pub const CHANNEL_COUNT: usize = 4;

/// Texture dimensionality required by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Texture2d,
    Cubemap,
}

impl ChannelKind {
    /// GLSL sampler type used when declaring the channel uniform.
    pub fn sampler_type(self) -> &'static str {
        match self {
            Self::Texture2d => "sampler2D",
            Self::Cubemap => "samplerCube",
        }
    }
}

/// Content a channel can be bound to from the shader header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelContent {
    NoiseRgb256,
    NoiseR256,
    NoiseRgb64,
    NoiseR64,
    NoiseR8,
    StoneTiles,
    OldBirch,
    RustedMetal,
    DeepskyPattern,
    LondonStreet,
    FinishedWood,
    BarkAndLichen,
    ColoredRocks,
    ClothWeave,
    AnimalPrint,
    NyanCat,
    UffiziGallery512,
    UffiziGallery64,
    StPeters256,
    StPeters64,
    Grove512,
    Grove64,
}

const CONTENT_TOKENS: [(&str, ChannelContent); 22] = [
    ("noise_rgb_256", ChannelContent::NoiseRgb256),
    ("noise_r_256", ChannelContent::NoiseR256),
    ("noise_rgb_64", ChannelContent::NoiseRgb64),
    ("noise_r_64", ChannelContent::NoiseR64),
    ("noise_r_8", ChannelContent::NoiseR8),
    ("stone_tiles", ChannelContent::StoneTiles),
    ("old_birch", ChannelContent::OldBirch),
    ("rusted_metal", ChannelContent::RustedMetal),
    ("deepsky_pattern", ChannelContent::DeepskyPattern),
    ("london_street", ChannelContent::LondonStreet),
    ("finished_wood", ChannelContent::FinishedWood),
    ("bark_and_lichen", ChannelContent::BarkAndLichen),
    ("colored_rocks", ChannelContent::ColoredRocks),
    ("cloth_weave", ChannelContent::ClothWeave),
    ("animal_print", ChannelContent::AnimalPrint),
    ("nyan_cat", ChannelContent::NyanCat),
    ("uffizi_gallery_512", ChannelContent::UffiziGallery512),
    ("uffizi_gallery_64", ChannelContent::UffiziGallery64),
    ("st_peters_256", ChannelContent::StPeters256),
    ("st_peters_64", ChannelContent::StPeters64),
    ("grove_512", ChannelContent::Grove512),
    ("grove_64", ChannelContent::Grove64),
];

impl ChannelContent {
    /// Every content type in declaration order.
    pub fn all() -> impl Iterator<Item = ChannelContent> {
        CONTENT_TOKENS.iter().map(|(_, content)| *content)
    }

    /// Looks up the header token (e.g. `noise_rgb_256`).
    pub fn from_token(token: &str) -> Option<Self> {
        CONTENT_TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, content)| *content)
    }

    /// Header token for this content type.
    pub fn token(self) -> &'static str {
        CONTENT_TOKENS
            .iter()
            .find(|(_, content)| *content == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn kind(self) -> ChannelKind {
        match self {
            Self::UffiziGallery512
            | Self::UffiziGallery64
            | Self::StPeters256
            | Self::StPeters64
            | Self::Grove512
            | Self::Grove64 => ChannelKind::Cubemap,
            _ => ChannelKind::Texture2d,
        }
    }

    /// True unless the content is one of the cubemap environments.
    pub fn is_2d(self) -> bool {
        self.kind() == ChannelKind::Texture2d
    }
}

impl fmt::Display for ChannelContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ChannelContent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unknown channel content '{s}'"))
    }
}

/// Maps a header key such as `iChannel2` to its slot index.
pub fn parse_channel_key(key: &str) -> Option<usize> {
    let digits = key.strip_prefix("iChannel")?;
    match digits {
        "0" => Some(0),
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        _ => None,
    }
}
