use crate::channel::ChannelKind;
use crate::header::ChannelConfig;

/// Uniform block every ShaderToy fragment is compiled against.
pub const PREAMBLE: &str = "#version 120\n\
uniform float     iGlobalTime;\n\
uniform vec4      iMouse;\n\
uniform vec2      iResolution;\n\
uniform float     iChannelTime[4];\n\
uniform vec4      iDate;\n\
uniform vec3      iChannelResolution[4];\n\
uniform mat4      iCameraTransform;\n\
uniform float     iFocalLength;\n\
\n";

/// `uniform <sampler> iChannelN;` line for one configured channel.
pub fn channel_declaration(channel: usize, kind: ChannelKind) -> String {
    format!("uniform {} iChannel{channel};\n", kind.sampler_type())
}

/// Splices preamble, channel declarations and body into a single buffer sized
/// up front.
pub fn synthesize(config: &ChannelConfig, body: &str) -> String {
    let declarations = config.inputs().count() * "uniform samplerCube iChannel0;\n".len();
    let mut source = String::with_capacity(PREAMBLE.len() + declarations + body.len());
    source.push_str(PREAMBLE);
    for (channel, content) in config.inputs() {
        source.push_str(&channel_declaration(channel, content.kind()));
    }
    source.push_str(body);
    source
}
