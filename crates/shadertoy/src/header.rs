//! Parses the `key = value` header that prefixes a ShaderToy-format fragment
//! file and splits off the GLSL body that follows it.
//!
//! Types:
//!
//! - `ChannelConfig` records which content each of the four channels is bound
//!   to plus the render-target scale requested by the shader.
//! - `ShaderToyDocument` pairs the parsed configuration with the untouched body
//!   text so callers can synthesize the final fragment source.
//! - `HeaderError` reports the first line that could not be understood.
//!
//! Functions:
//!
//! - `parse_document` drives the line scanner over any `BufRead`, stopping at
//!   the first line that starts with `:`.
//! - `parse_str` is the in-memory convenience wrapper.
use std::io::{self, BufRead};

use thiserror::Error;

use crate::channel::{parse_channel_key, ChannelContent, CHANNEL_COUNT};
use crate::preamble;

const SCREEN_PERCENTAGE_KEY: &str = "ScreenPercentage";
const DELIMITER: u8 = b':';

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("line {line}: unknown header key '{key}'")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: unknown channel content '{value}'")]
    UnknownContent { line: usize, value: String },

    #[error("line {line}: expected a single `key = value` pair, found '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: ScreenPercentage must be a positive number, found '{value}'")]
    InvalidScreenPercentage { line: usize, value: String },

    #[error("header is never terminated by a line starting with ':'")]
    MissingDelimiter,

    #[error("line {line}: header is not valid UTF-8")]
    HeaderEncoding { line: usize },

    #[error("shader body is not valid UTF-8")]
    BodyEncoding,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HeaderError {
    /// Header line the error points at, when it refers to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnknownKey { line, .. }
            | Self::UnknownContent { line, .. }
            | Self::MalformedLine { line, .. }
            | Self::InvalidScreenPercentage { line, .. }
            | Self::HeaderEncoding { line } => Some(*line),
            Self::MissingDelimiter | Self::BodyEncoding | Self::Io(_) => None,
        }
    }
}

/// Channel bindings and render scale declared by a shader header.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    inputs: [Option<ChannelContent>; CHANNEL_COUNT],
    screen_percentage: f32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            inputs: std::array::from_fn(|_| None),
            screen_percentage: 1.0,
        }
    }
}

impl ChannelConfig {
    /// Content bound to `channel`, `None` when unset or out of range.
    pub fn input(&self, channel: usize) -> Option<ChannelContent> {
        self.inputs.get(channel).copied().flatten()
    }

    /// Binds `channel` and returns the content it previously held.
    ///
    /// Out-of-range channels are ignored.
    pub fn set_input(
        &mut self,
        channel: usize,
        content: Option<ChannelContent>,
    ) -> Option<ChannelContent> {
        let slot = self.inputs.get_mut(channel)?;
        std::mem::replace(slot, content)
    }

    /// Configured channels in channel order.
    pub fn inputs(&self) -> impl Iterator<Item = (usize, ChannelContent)> + '_ {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(index, content)| content.map(|content| (index, content)))
    }

    pub fn screen_percentage(&self) -> f32 {
        self.screen_percentage
    }

    pub fn set_screen_percentage(&mut self, value: f32) {
        self.screen_percentage = value;
    }
}

/// A parsed ShaderToy-format file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderToyDocument {
    config: ChannelConfig,
    body: String,
}

impl ShaderToyDocument {
    pub fn new(config: ChannelConfig, body: impl Into<String>) -> Self {
        Self {
            config,
            body: body.into(),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Everything after the delimiter line, byte for byte.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Preamble, channel declarations and body spliced into compilable GLSL.
    pub fn fragment_source(&self) -> String {
        preamble::synthesize(&self.config, &self.body)
    }

    pub fn into_parts(self) -> (ChannelConfig, String) {
        (self.config, self.body)
    }
}

pub fn parse_str(text: &str) -> Result<ShaderToyDocument, HeaderError> {
    parse_document(text.as_bytes())
}

/// Reads header lines until the delimiter, then takes the rest as the body.
pub fn parse_document<R: BufRead>(mut reader: R) -> Result<ShaderToyDocument, HeaderError> {
    let mut config = ChannelConfig::default();
    let mut raw = Vec::new();
    let mut line = 0;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Err(HeaderError::MissingDelimiter);
        }
        line += 1;

        if raw.first() == Some(&DELIMITER) {
            break;
        }

        let text = std::str::from_utf8(&raw).map_err(|_| HeaderError::HeaderEncoding { line })?;
        match scan_line(text) {
            ScannedLine::Blank => {}
            ScannedLine::Pair { key, value } => apply_pair(&mut config, line, key, value)?,
            ScannedLine::Malformed => {
                return Err(HeaderError::MalformedLine {
                    line,
                    text: text.trim_end().to_string(),
                })
            }
        }
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let body = String::from_utf8(body).map_err(|_| HeaderError::BodyEncoding)?;

    Ok(ShaderToyDocument { config, body })
}

#[derive(Debug, PartialEq)]
enum ScannedLine {
    Blank,
    Pair { key: String, value: String },
    Malformed,
}

#[derive(Clone, Copy)]
enum Scan {
    Key,
    Value,
}

fn scan_line(text: &str) -> ScannedLine {
    let mut state = Scan::Key;
    let mut key = String::new();
    let mut value = String::new();
    let mut separators = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\r' | '\n' | ';' => {}
            '/' if chars.peek() == Some(&'/') => break,
            '=' => {
                separators += 1;
                state = Scan::Value;
            }
            _ => match state {
                Scan::Key => key.push(c),
                Scan::Value => value.push(c),
            },
        }
    }

    if separators == 0 && key.is_empty() {
        return ScannedLine::Blank;
    }
    if separators != 1 || key.is_empty() || value.is_empty() {
        return ScannedLine::Malformed;
    }
    ScannedLine::Pair { key, value }
}

fn apply_pair(
    config: &mut ChannelConfig,
    line: usize,
    key: String,
    value: String,
) -> Result<(), HeaderError> {
    if key == SCREEN_PERCENTAGE_KEY {
        config.screen_percentage = parse_screen_percentage(&value)
            .ok_or(HeaderError::InvalidScreenPercentage { line, value })?;
        return Ok(());
    }

    let channel = parse_channel_key(&key).ok_or(HeaderError::UnknownKey {
        line,
        key: key.clone(),
    })?;
    let content = ChannelContent::from_token(&value)
        .ok_or(HeaderError::UnknownContent { line, value })?;
    if let Some(previous) = config.set_input(channel, Some(content)) {
        tracing::warn!(
            channel,
            line,
            previous = %previous,
            replacement = %content,
            "channel bound more than once; keeping the last binding"
        );
    }
    Ok(())
}

fn parse_screen_percentage(value: &str) -> Option<f32> {
    let digits = value
        .strip_suffix('f')
        .or_else(|| value.strip_suffix('F'))
        .unwrap_or(value);
    let parsed: f32 = digits.parse().ok()?;
    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}
