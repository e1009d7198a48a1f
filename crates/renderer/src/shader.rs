//! A single shader stage: its source text, the driver shader object compiled
//! from it and the compile/link flags the owning program consults.
//!
//! Types:
//!
//! - `SourceFormat` picks how `load_file`/`load_source` turn text into GLSL:
//!   plain GLSL, a ShaderToy header + body, or a fixed built-in literal that
//!   refuses reloading.
//! - `Shader` owns the NUL-terminated source buffer and the driver handle.
//! - `SharedShader` is the `Rc<RefCell<_>>` form programs hold so one unit can
//!   back several programs.
//!
//! Functions:
//!
//! - `Shader::load_file` / `load_source` replace the source buffer wholesale;
//!   on failure the buffer is left empty rather than half-written.
//! - `Shader::compile` creates the driver object on demand and releases it
//!   again if compilation fails.
use std::cell::RefCell;
use std::ffi::CString;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use shadertoy::ChannelConfig;

use crate::driver::{check_driver_error, GlDriver, ShaderStage};
use crate::error::ShaderError;

pub type SharedShader = Rc<RefCell<Shader>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Glsl,
    /// Header of channel bindings, `:` delimiter line, GLSL body.
    ShaderToy,
    /// Fixed literal supplied at construction.
    Builtin,
}

pub struct Shader {
    driver: Rc<dyn GlDriver>,
    name: String,
    stage: ShaderStage,
    format: SourceFormat,
    source: CString,
    file_path: Option<PathBuf>,
    channels: Option<ChannelConfig>,
    handle: u32,
    log: String,
    compiled: bool,
    linked: bool,
}

impl Shader {
    /// An empty unit; nothing is allocated on the driver until `compile`.
    pub fn new(
        driver: Rc<dyn GlDriver>,
        stage: ShaderStage,
        format: SourceFormat,
        name: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            name: name.into(),
            stage,
            format,
            source: CString::default(),
            file_path: None,
            channels: None,
            handle: 0,
            log: String::new(),
            compiled: false,
            linked: false,
        }
    }

    pub fn vertex(driver: Rc<dyn GlDriver>, name: impl Into<String>) -> Self {
        Self::new(driver, ShaderStage::Vertex, SourceFormat::Glsl, name)
    }

    pub fn fragment(driver: Rc<dyn GlDriver>, name: impl Into<String>) -> Self {
        Self::new(driver, ShaderStage::Fragment, SourceFormat::Glsl, name)
    }

    /// Fragment unit whose source carries a ShaderToy channel header.
    pub fn shadertoy(driver: Rc<dyn GlDriver>, name: impl Into<String>) -> Self {
        Self::new(driver, ShaderStage::Fragment, SourceFormat::ShaderToy, name)
    }

    /// Unit backed by a fixed literal that cannot be reloaded.
    pub fn builtin(
        driver: Rc<dyn GlDriver>,
        stage: ShaderStage,
        name: impl Into<String>,
        source: &'static str,
    ) -> Self {
        let mut shader = Self::new(driver, stage, SourceFormat::Builtin, name);
        match CString::new(source) {
            Ok(source) => shader.source = source,
            Err(error) => tracing::error!(
                shader = %shader.name,
                offset = error.nul_position(),
                "built-in shader literal contains a NUL byte"
            ),
        }
        shader
    }

    /// Builds a unit and loads it from `path` in one step.
    pub fn from_file(
        driver: Rc<dyn GlDriver>,
        stage: ShaderStage,
        format: SourceFormat,
        path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let mut shader = Self::new(driver, stage, format, path.display().to_string());
        shader.load_file(path)?;
        Ok(shader)
    }

    pub fn into_shared(self) -> SharedShader {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Current source text, empty when nothing is loaded.
    pub fn source(&self) -> &str {
        self.source.to_str().unwrap_or_default()
    }

    /// Source bytes including the trailing NUL handed to the driver.
    pub fn source_with_nul(&self) -> &[u8] {
        self.source.as_bytes_with_nul()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Channel bindings parsed from a ShaderToy header.
    pub fn channels(&self) -> Option<&ChannelConfig> {
        self.channels.as_ref()
    }

    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Log captured by the last `compile` without asking the driver again.
    pub fn cached_log(&self) -> &str {
        &self.log
    }

    /// Replaces the source with the contents of `path`.
    ///
    /// The path is canonicalised and remembered for `reload_file`. Any failure
    /// leaves the source empty.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ShaderError> {
        self.reject_builtin("load_file")?;
        let path = path.as_ref();

        let loaded = self.read_file(path).and_then(|(resolved, text, channels)| {
            let source = self.to_source(text)?;
            Ok((resolved, source, channels))
        });

        match loaded {
            Ok((resolved, source, channels)) => {
                tracing::debug!(
                    shader = %self.name,
                    path = %resolved.display(),
                    bytes = source.as_bytes().len(),
                    "loaded shader source"
                );
                self.source = source;
                self.channels = channels;
                self.file_path = Some(resolved);
                Ok(())
            }
            Err(error) => {
                self.clear_source();
                Err(error)
            }
        }
    }

    /// Replaces the source with in-memory text, parsed per the unit's format.
    pub fn load_source(&mut self, text: &str) -> Result<(), ShaderError> {
        self.reject_builtin("load_source")?;

        let loaded = match self.format {
            SourceFormat::ShaderToy => shadertoy::parse_str(text)
                .map(|document| {
                    let source = document.fragment_source();
                    (source, Some(document.config().clone()))
                })
                .map_err(|source| ShaderError::Header {
                    name: self.name.clone(),
                    source,
                }),
            _ => Ok((text.to_string(), None)),
        }
        .and_then(|(text, channels)| Ok((self.to_source(text)?, channels)));

        match loaded {
            Ok((source, channels)) => {
                self.source = source;
                self.channels = channels;
                Ok(())
            }
            Err(error) => {
                self.clear_source();
                Err(error)
            }
        }
    }

    /// Reads the remembered file again. On success the unit must be compiled
    /// and linked anew.
    pub fn reload_file(&mut self) -> Result<(), ShaderError> {
        let path = self.file_path.clone().ok_or_else(|| {
            ShaderError::precondition(
                format!("shader {}", self.name),
                "reload_file called on a unit that was not loaded from a file",
            )
        })?;
        self.load_file(&path)?;
        self.compiled = false;
        self.linked = false;
        Ok(())
    }

    /// Compiles the current source, creating the driver object if needed.
    ///
    /// Clears `is_compiled` and `is_linked` first. A failed compile releases
    /// the driver object and returns its log.
    pub fn compile(&mut self) -> Result<(), ShaderError> {
        self.compiled = false;
        self.linked = false;

        let source = self.source.to_str().map_err(|error| ShaderError::Encoding {
            name: self.name.clone(),
            reason: error.to_string(),
        })?;
        if source.is_empty() {
            return Err(ShaderError::EmptySource {
                name: self.name.clone(),
            });
        }

        if self.handle == 0 {
            self.handle = self.driver.create_shader(self.stage)?;
        }
        self.driver.shader_source(self.handle, source);
        self.driver.compile_shader(self.handle);
        check_driver_error(self.driver.as_ref(), "compile shader");

        let status = self.driver.shader_compile_status(self.handle);
        self.log = self.driver.shader_info_log(self.handle);
        if status {
            if !self.log.trim().is_empty() {
                tracing::debug!(
                    shader = %self.name,
                    log = %self.log.trim(),
                    "shader compiled with diagnostics"
                );
            }
            self.compiled = true;
            return Ok(());
        }

        tracing::error!(
            shader = %self.name,
            stage = self.stage.label(),
            log = %self.log.trim(),
            "shader failed to compile"
        );
        self.driver.delete_shader(self.handle);
        self.handle = 0;
        Err(ShaderError::Compile {
            name: self.name.clone(),
            stage: self.stage.label(),
            log: self.log.clone(),
        })
    }

    /// Fetches the driver's info log for this unit.
    pub fn shader_log(&mut self) -> Result<&str, ShaderError> {
        if self.handle == 0 {
            return Err(ShaderError::NotReady {
                component: format!("shader {}", self.name),
            });
        }
        self.log = self.driver.shader_info_log(self.handle);
        Ok(&self.log)
    }

    pub(crate) fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    /// Deletes the driver object and forgets compile/link state.
    pub(crate) fn release(&mut self) {
        if self.handle != 0 {
            self.driver.delete_shader(self.handle);
            check_driver_error(self.driver.as_ref(), "release shader");
            self.handle = 0;
        }
        self.compiled = false;
        self.linked = false;
    }

    fn reject_builtin(&self, operation: &str) -> Result<(), ShaderError> {
        if self.format == SourceFormat::Builtin {
            return Err(ShaderError::precondition(
                format!("shader {}", self.name),
                format!("{operation} is not supported for built-in shaders"),
            ));
        }
        Ok(())
    }

    fn read_file(
        &self,
        path: &Path,
    ) -> Result<(PathBuf, String, Option<ChannelConfig>), ShaderError> {
        let io_error = |source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        };
        let resolved = fs::canonicalize(path).map_err(io_error)?;
        let file = File::open(&resolved).map_err(io_error)?;
        let length = file.metadata().map(|meta| meta.len() as usize).unwrap_or(0);

        if self.format == SourceFormat::ShaderToy {
            let document = shadertoy::parse_document(BufReader::new(file)).map_err(|source| {
                ShaderError::Header {
                    name: self.name.clone(),
                    source,
                }
            })?;
            let config = document.config().clone();
            return Ok((resolved, document.fragment_source(), Some(config)));
        }

        let mut bytes = Vec::with_capacity(length + 1);
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(io_error)?;
        let text = String::from_utf8(bytes).map_err(|error| ShaderError::Encoding {
            name: self.name.clone(),
            reason: error.to_string(),
        })?;
        Ok((resolved, text, None))
    }

    fn to_source(&self, text: String) -> Result<CString, ShaderError> {
        CString::new(text).map_err(|error| ShaderError::Encoding {
            name: self.name.clone(),
            reason: format!("NUL byte at offset {}", error.nul_position()),
        })
    }

    fn clear_source(&mut self) {
        self.source = CString::default();
        self.channels = None;
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("format", &self.format)
            .field("handle", &self.handle)
            .field("compiled", &self.compiled)
            .field("linked", &self.linked)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if self.handle != 0 {
            self.driver.delete_shader(self.handle);
            check_driver_error(self.driver.as_ref(), "drop shader");
        }
    }
}
