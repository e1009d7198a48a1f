//! ShaderToy-format fragment files: the `key = value` header that binds input
//! channels, the uniform preamble those shaders are compiled against, and the
//! bundled textures the channels refer to. Nothing here touches the GPU.
mod assets;
mod channel;
mod header;
mod preamble;

pub use assets::{ChannelAsset, CUBEMAP_FACE_COUNT};
pub use channel::{parse_channel_key, ChannelContent, ChannelKind, CHANNEL_COUNT};
pub use header::{parse_document, parse_str, ChannelConfig, HeaderError, ShaderToyDocument};
pub use preamble::{channel_declaration, synthesize, PREAMBLE};
