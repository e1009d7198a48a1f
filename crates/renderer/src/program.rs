//! Links a vertex and a fragment unit into one driver program and exposes the
//! typed uniform setters the render loop calls every frame.
//!
//! Types:
//!
//! - `ShaderProgram` owns the driver program object, the attribute slots
//!   reserved before linking and a lazily filled uniform location cache.
//!
//! Functions:
//!
//! - `load_and_compile` / `link` / `reload_linked` drive the
//!   unlinked -> linked -> unlinked state machine. A failed link tears down
//!   every driver object involved so nothing stays half attached.
//! - `set_uniform_*` resolve a uniform name through the cache and upload.
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use shadertoy::ChannelConfig;

use crate::driver::{check_driver_error, GlDriver, UniformValue, VertexLayout};
use crate::error::ShaderError;
use crate::shader::SharedShader;

/// Attribute slots are handed out from 1 in the order names are reserved.
const FIRST_ATTRIBUTE_SLOT: u32 = 1;

pub struct ShaderProgram {
    driver: Rc<dyn GlDriver>,
    name: String,
    handle: u32,
    vertex: Option<SharedShader>,
    fragment: Option<SharedShader>,
    attributes: HashMap<String, u32>,
    next_attribute: u32,
    uniforms: HashMap<String, i32>,
}

impl ShaderProgram {
    /// Creates the driver program object up front.
    pub fn new(driver: Rc<dyn GlDriver>, name: impl Into<String>) -> Result<Self, ShaderError> {
        let handle = driver.create_program()?;
        check_driver_error(driver.as_ref(), "create program");
        Ok(Self {
            driver,
            name: name.into(),
            handle,
            vertex: None,
            fragment: None,
            attributes: HashMap::new(),
            next_attribute: FIRST_ATTRIBUTE_SLOT,
            uniforms: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Driver program handle, `0` after a failed link.
    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn vertex_shader(&self) -> Option<&SharedShader> {
        self.vertex.as_ref()
    }

    pub fn fragment_shader(&self) -> Option<&SharedShader> {
        self.fragment.as_ref()
    }

    /// Channel bindings of a ShaderToy fragment unit, if that is what the
    /// program was built from.
    pub fn channels(&self) -> Option<ChannelConfig> {
        self.fragment
            .as_ref()
            .and_then(|fragment| fragment.borrow().channels().cloned())
    }

    /// True only while both units report a successful link.
    pub fn is_linked(&self) -> bool {
        match (&self.vertex, &self.fragment) {
            (Some(vertex), Some(fragment)) => {
                vertex.borrow().is_linked() && fragment.borrow().is_linked()
            }
            _ => false,
        }
    }

    /// Stores both units and compiles each of them.
    ///
    /// Both are compiled even when the first fails so their logs are
    /// available; the first failure is returned.
    pub fn load_and_compile(
        &mut self,
        vertex: SharedShader,
        fragment: SharedShader,
    ) -> Result<(), ShaderError> {
        self.vertex = Some(Rc::clone(&vertex));
        self.fragment = Some(Rc::clone(&fragment));

        let vertex_result = vertex.borrow_mut().compile();
        let fragment_result = fragment.borrow_mut().compile();
        if let Err(error) = &vertex_result {
            tracing::error!(program = %self.name, error = %error, "vertex stage did not compile");
        }
        if let Err(error) = &fragment_result {
            tracing::error!(program = %self.name, error = %error, "fragment stage did not compile");
        }
        vertex_result.and(fragment_result)
    }

    /// Attaches both units, applies reserved attribute slots and links.
    pub fn link(&mut self) -> Result<(), ShaderError> {
        let (vertex, fragment) = self.units("link")?;

        if self.handle == 0 {
            self.handle = self.driver.create_program()?;
        }
        self.uniforms.clear();

        let mut attached = Vec::with_capacity(2);
        for unit in [&vertex, &fragment] {
            match self.attach(unit) {
                Ok(shader) => attached.push(shader),
                Err(error) => {
                    self.discard(&vertex, &fragment, &attached);
                    return Err(error);
                }
            }
        }

        for (name, slot) in &self.attributes {
            self.driver.bind_attrib_location(self.handle, *slot, name);
        }

        self.driver.link_program(self.handle);
        check_driver_error(self.driver.as_ref(), "link program");
        if self.driver.program_link_status(self.handle) {
            for (unit, shader) in [&vertex, &fragment].into_iter().zip(&attached) {
                self.driver.detach_shader(self.handle, *shader);
                unit.borrow_mut().set_linked(true);
            }
            tracing::debug!(program = %self.name, handle = self.handle, "program linked");
            return Ok(());
        }

        let log = self.driver.program_info_log(self.handle);
        tracing::error!(program = %self.name, log = %log.trim(), "program failed to link");
        self.discard(&vertex, &fragment, &attached);
        Err(ShaderError::Link {
            program: self.name.clone(),
            log,
        })
    }

    /// Re-reads every file-backed unit and links again.
    ///
    /// Only valid on a linked program. Any failure leaves the program
    /// unlinked with its driver objects released.
    pub fn reload_linked(&mut self) -> Result<(), ShaderError> {
        if !self.is_linked() {
            return Err(ShaderError::precondition(
                format!("program {}", self.name),
                "reload_linked requires a linked program",
            ));
        }
        let (vertex, fragment) = self.units("reload_linked")?;

        for unit in [&vertex, &fragment] {
            let mut shader = unit.borrow_mut();
            if shader.file_path().is_none() {
                continue;
            }
            if let Err(error) = shader.reload_file() {
                drop(shader);
                tracing::warn!(program = %self.name, error = %error, "shader reload failed");
                self.discard(&vertex, &fragment, &[]);
                return Err(error);
            }
        }
        self.link()
    }

    /// Slot for `name`, reserving the next free one on first use.
    ///
    /// Takes effect at the next `link`.
    pub fn reserve_attrib_location(&mut self, name: &str) -> u32 {
        if let Some(slot) = self.attributes.get(name) {
            return *slot;
        }
        let slot = self.next_attribute;
        self.next_attribute += 1;
        self.attributes.insert(name.to_string(), slot);
        slot
    }

    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// Driver location of `name`; misses are cached too.
    pub fn uniform_location(&mut self, name: &str) -> Result<i32, ShaderError> {
        if self.handle == 0 {
            return Err(self.not_ready());
        }
        let location = match self.uniforms.get(name) {
            Some(location) => *location,
            None => {
                let location = self.driver.uniform_location(self.handle, name);
                self.uniforms.insert(name.to_string(), location);
                location
            }
        };
        if location < 0 {
            return Err(ShaderError::UniformNotFound {
                program: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(location)
    }

    pub fn set_uniform_1f(&mut self, name: &str, x: f32) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Float1(x))
    }

    pub fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Float2(x, y))
    }

    pub fn set_uniform_3f(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Float3(x, y, z))
    }

    pub fn set_uniform_4f(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Float4(x, y, z, w))
    }

    pub fn set_uniform_1i(&mut self, name: &str, x: i32) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Int1(x))
    }

    pub fn set_uniform_2i(&mut self, name: &str, x: i32, y: i32) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Int2(x, y))
    }

    pub fn set_uniform_3i(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Int3(x, y, z))
    }

    pub fn set_uniform_4i(
        &mut self,
        name: &str,
        x: i32,
        y: i32,
        z: i32,
        w: i32,
    ) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Int4(x, y, z, w))
    }

    /// Uploads a `float[]` uniform, one element per value.
    pub fn set_uniform_1fv(&mut self, name: &str, values: &[f32]) -> Result<(), ShaderError> {
        self.upload(name, UniformValue::Float1Array(values))
    }

    /// Uploads a `vec3[]` uniform from packed triples.
    pub fn set_uniform_3fv(&mut self, name: &str, values: &[f32]) -> Result<(), ShaderError> {
        self.check_packed(name, values.len(), 3)?;
        self.upload(name, UniformValue::Float3Array(values))
    }

    pub fn set_uniform_matrix_2fv(
        &mut self,
        name: &str,
        transpose: bool,
        values: &[f32],
    ) -> Result<(), ShaderError> {
        self.check_packed(name, values.len(), 4)?;
        self.upload(name, UniformValue::Matrix2 { transpose, values })
    }

    pub fn set_uniform_matrix_3fv(
        &mut self,
        name: &str,
        transpose: bool,
        values: &[f32],
    ) -> Result<(), ShaderError> {
        self.check_packed(name, values.len(), 9)?;
        self.upload(name, UniformValue::Matrix3 { transpose, values })
    }

    /// Column-major unless `transpose` is set.
    pub fn set_uniform_matrix_4fv(
        &mut self,
        name: &str,
        transpose: bool,
        values: &[f32],
    ) -> Result<(), ShaderError> {
        self.check_packed(name, values.len(), 16)?;
        self.upload(name, UniformValue::Matrix4 { transpose, values })
    }

    /// Reads back the current value of a float uniform into `out`.
    pub fn get_uniform_f32s(&mut self, name: &str, out: &mut [f32]) -> Result<(), ShaderError> {
        let location = self.uniform_location(name)?;
        self.driver.get_uniform_f32(self.handle, location, out);
        Ok(())
    }

    pub fn get_uniform_i32s(&mut self, name: &str, out: &mut [i32]) -> Result<(), ShaderError> {
        let location = self.uniform_location(name)?;
        self.driver.get_uniform_i32(self.handle, location, out);
        Ok(())
    }

    /// Enables the reserved slot for `name` and points it into the bound
    /// array buffer.
    pub fn enable_vertex_attrib(
        &self,
        name: &str,
        layout: VertexLayout,
    ) -> Result<(), ShaderError> {
        let slot = self.reserved_slot(name)?;
        self.driver.enable_vertex_attrib(slot);
        self.driver.vertex_attrib_pointer(slot, layout);
        check_driver_error(self.driver.as_ref(), "enable vertex attribute");
        Ok(())
    }

    pub fn disable_vertex_attrib(&self, name: &str) -> Result<(), ShaderError> {
        let slot = self.reserved_slot(name)?;
        self.driver.disable_vertex_attrib(slot);
        Ok(())
    }

    /// Binds the program for drawing when it is linked.
    pub fn begin(&self) {
        if self.handle != 0 && self.is_linked() {
            self.driver.use_program(self.handle);
        }
    }

    pub fn end(&self) {
        if self.handle != 0 {
            self.driver.use_program(0);
        }
    }

    pub fn program_log(&self) -> Result<String, ShaderError> {
        if self.handle == 0 {
            return Err(self.not_ready());
        }
        Ok(self.driver.program_info_log(self.handle))
    }

    fn units(&self, operation: &str) -> Result<(SharedShader, SharedShader), ShaderError> {
        match (&self.vertex, &self.fragment) {
            (Some(vertex), Some(fragment)) => Ok((Rc::clone(vertex), Rc::clone(fragment))),
            _ => Err(ShaderError::precondition(
                format!("program {}", self.name),
                format!("{operation} requires both a vertex and a fragment shader"),
            )),
        }
    }

    /// Compiles `unit` if needed and attaches it, returning its handle.
    fn attach(&self, unit: &SharedShader) -> Result<u32, ShaderError> {
        let mut shader = unit.borrow_mut();
        if !shader.is_compiled() {
            shader.compile()?;
        }
        self.driver.attach_shader(self.handle, shader.handle());
        check_driver_error(self.driver.as_ref(), "attach shader");
        Ok(shader.handle())
    }

    /// Releases every driver object touched by a failed link or reload.
    fn discard(&mut self, vertex: &SharedShader, fragment: &SharedShader, attached: &[u32]) {
        for shader in attached {
            self.driver.detach_shader(self.handle, *shader);
        }
        vertex.borrow_mut().release();
        if !Rc::ptr_eq(vertex, fragment) {
            fragment.borrow_mut().release();
        }
        if self.handle != 0 {
            self.driver.delete_program(self.handle);
            check_driver_error(self.driver.as_ref(), "discard program");
        }
        self.handle = 0;
        self.uniforms.clear();
    }

    fn upload(&mut self, name: &str, value: UniformValue<'_>) -> Result<(), ShaderError> {
        let location = self.uniform_location(name)?;
        self.driver.set_uniform(location, value);
        check_driver_error(self.driver.as_ref(), "set uniform");
        Ok(())
    }

    fn check_packed(&self, name: &str, len: usize, width: usize) -> Result<(), ShaderError> {
        if len == 0 || len % width != 0 {
            return Err(ShaderError::precondition(
                format!("program {}", self.name),
                format!("uniform '{name}' needs a non-empty multiple of {width} values, got {len}"),
            ));
        }
        Ok(())
    }

    fn reserved_slot(&self, name: &str) -> Result<u32, ShaderError> {
        if self.handle == 0 {
            return Err(self.not_ready());
        }
        self.attributes.get(name).copied().ok_or_else(|| {
            ShaderError::precondition(
                format!("program {}", self.name),
                format!("attribute '{name}' was not reserved before linking"),
            )
        })
    }

    fn not_ready(&self) -> ShaderError {
        ShaderError::NotReady {
            component: format!("program {}", self.name),
        }
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("linked", &self.is_linked())
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.handle != 0 {
            self.driver.delete_program(self.handle);
            check_driver_error(self.driver.as_ref(), "drop program");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::driver::ShaderStage;
    use crate::quad::{POSITION_LAYOUT, QUAD_VERTEX_SHADER};
    use crate::shader::{Shader, SourceFormat};
    use crate::testing::{RecordingDriver, COMPILE_ERROR_MARKER};

    const FRAGMENT: &str = "uniform float iGlobalTime;\nuniform vec3 iChannelResolution[4];\n\
                            void main() { gl_FragColor = vec4(iGlobalTime); }\n";

    fn units(driver: &Rc<RecordingDriver>, fragment: &str) -> (SharedShader, SharedShader) {
        let vertex = Shader::builtin(
            driver.clone(),
            ShaderStage::Vertex,
            "quad",
            QUAD_VERTEX_SHADER,
        );
        let mut frag = Shader::fragment(driver.clone(), "frag");
        frag.load_source(fragment).expect("load fragment");
        (vertex.into_shared(), frag.into_shared())
    }

    fn linked_program(driver: &Rc<RecordingDriver>) -> ShaderProgram {
        let (vertex, fragment) = units(driver, FRAGMENT);
        let mut program = ShaderProgram::new(driver.clone(), "test").expect("program");
        program.reserve_attrib_location("position");
        program.load_and_compile(vertex, fragment).expect("compile");
        program.link().expect("link");
        program
    }

    #[test]
    fn reservation_is_idempotent_and_starts_at_one() {
        let driver = RecordingDriver::shared();
        let mut program = ShaderProgram::new(driver, "attribs").expect("program");
        assert_eq!(program.reserve_attrib_location("position"), 1);
        assert_eq!(program.reserve_attrib_location("texcoord"), 2);
        assert_eq!(program.reserve_attrib_location("position"), 1);
        assert_eq!(program.attrib_location("texcoord"), Some(2));
        assert_eq!(program.attrib_location("normal"), None);
    }

    #[test]
    fn link_marks_units_and_detaches() {
        let driver = RecordingDriver::shared();
        let program = linked_program(&driver);

        assert!(program.is_linked());
        assert!(driver.attached(program.handle()).is_empty());
        assert_eq!(
            driver.attrib_bindings(program.handle()),
            vec![(1, "position".to_string())]
        );
        let vertex = program.vertex_shader().expect("vertex");
        assert!(vertex.borrow().is_linked());
    }

    #[test]
    fn link_without_units_is_precondition_error() {
        let driver = RecordingDriver::shared();
        let mut program = ShaderProgram::new(driver, "empty").expect("program");
        assert!(program.link().unwrap_err().is_precondition());
    }

    #[test]
    fn load_and_compile_keeps_both_units_on_failure() {
        let driver = RecordingDriver::shared();
        let (vertex, fragment) = units(&driver, &format!("{COMPILE_ERROR_MARKER}\n"));
        let mut program = ShaderProgram::new(driver.clone(), "partial").expect("program");

        let error = program
            .load_and_compile(vertex.clone(), fragment.clone())
            .unwrap_err();
        assert!(matches!(error, ShaderError::Compile { stage: "fragment", .. }));
        assert!(vertex.borrow().is_compiled());
        assert!(!fragment.borrow().is_compiled());
        assert!(Rc::ptr_eq(program.fragment_shader().expect("stored"), &fragment));
    }

    #[test]
    fn failed_link_releases_everything() {
        let driver = RecordingDriver::shared();
        let (vertex, fragment) = units(&driver, &format!("{COMPILE_ERROR_MARKER}\n"));
        let mut program = ShaderProgram::new(driver.clone(), "broken").expect("program");
        let _ = program.load_and_compile(vertex.clone(), fragment.clone());

        assert!(program.link().is_err());
        assert_eq!(program.handle(), 0);
        assert!(!program.is_linked());
        assert!(!vertex.borrow().is_linked());
        assert!(!fragment.borrow().is_linked());
        assert_eq!(vertex.borrow().handle(), 0);
        assert_eq!(driver.live_objects(), 0);

        program.begin();
        assert_eq!(driver.count("use_program"), 0);
        assert!(matches!(
            program.uniform_location("iGlobalTime"),
            Err(ShaderError::NotReady { .. })
        ));
    }

    #[test]
    fn link_stage_failure_detaches_and_releases() {
        let driver = RecordingDriver::shared();
        let first =
            Shader::builtin(driver.clone(), ShaderStage::Vertex, "quad a", QUAD_VERTEX_SHADER)
                .into_shared();
        let second =
            Shader::builtin(driver.clone(), ShaderStage::Vertex, "quad b", QUAD_VERTEX_SHADER)
                .into_shared();
        let mut program = ShaderProgram::new(driver.clone(), "two vertex").expect("program");
        program
            .load_and_compile(first.clone(), second.clone())
            .expect("both units compile");

        let error = program.link().unwrap_err();
        assert!(matches!(error, ShaderError::Link { .. }));
        assert_eq!(driver.count("detach_shader"), 2);
        assert_eq!(program.handle(), 0);
        assert!(!first.borrow().is_linked());
        assert!(!second.borrow().is_linked());
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn program_can_relink_after_failure() {
        let driver = RecordingDriver::shared();
        let (vertex, fragment) = units(&driver, &format!("{COMPILE_ERROR_MARKER}\n"));
        let mut program = ShaderProgram::new(driver.clone(), "retry").expect("program");
        let _ = program.load_and_compile(vertex, fragment.clone());
        assert!(program.link().is_err());

        fragment.borrow_mut().load_source(FRAGMENT).expect("fix source");
        program.link().expect("relink");
        assert!(program.is_linked());
        assert_ne!(program.handle(), 0);
    }

    #[test]
    fn uniform_lookups_are_cached_including_misses() {
        let driver = RecordingDriver::shared();
        let mut program = linked_program(&driver);

        program.set_uniform_1f("iGlobalTime", 1.5).expect("set");
        program.set_uniform_1f("iGlobalTime", 2.5).expect("set again");
        assert_eq!(driver.count("uniform_location"), 1);

        for _ in 0..3 {
            assert!(matches!(
                program.set_uniform_1f("iMissing", 0.0),
                Err(ShaderError::UniformNotFound { .. })
            ));
        }
        assert_eq!(driver.count("uniform_location"), 2);

        let mut value = [0.0f32];
        program.get_uniform_f32s("iGlobalTime", &mut value).expect("read back");
        assert_eq!(value, [2.5]);
        let location = program.uniform_location("iGlobalTime").expect("location");
        assert_eq!(driver.uniform_value(location), Some(vec![2.5]));
    }

    #[test]
    fn relink_clears_uniform_cache() {
        let driver = RecordingDriver::shared();
        let mut program = linked_program(&driver);
        program.uniform_location("iGlobalTime").expect("location");
        program.link().expect("relink");
        program.uniform_location("iGlobalTime").expect("location");
        assert_eq!(driver.count("uniform_location"), 2);
    }

    #[test]
    fn packed_setters_validate_length() {
        let driver = RecordingDriver::shared();
        let mut program = linked_program(&driver);
        let resolutions = [1.0f32; 12];
        program
            .set_uniform_3fv("iChannelResolution", &resolutions)
            .expect("set vec3 array");
        assert!(program
            .set_uniform_3fv("iChannelResolution", &resolutions[..5])
            .unwrap_err()
            .is_precondition());
        assert!(program
            .set_uniform_matrix_4fv("iChannelResolution", false, &[0.0; 9])
            .unwrap_err()
            .is_precondition());
    }

    #[test]
    fn vertex_attribs_require_reservation() {
        let driver = RecordingDriver::shared();
        let program = linked_program(&driver);
        program
            .enable_vertex_attrib("position", POSITION_LAYOUT)
            .expect("enable");
        assert_eq!(driver.enabled_attribs(), vec![1]);
        assert!(program
            .enable_vertex_attrib("normal", POSITION_LAYOUT)
            .unwrap_err()
            .is_precondition());
        program.disable_vertex_attrib("position").expect("disable");
        assert!(driver.enabled_attribs().is_empty());
    }

    #[test]
    fn begin_and_end_bind_and_unbind() {
        let driver = RecordingDriver::shared();
        let program = linked_program(&driver);
        program.begin();
        assert_eq!(driver.bound_program(), program.handle());
        program.end();
        assert_eq!(driver.bound_program(), 0);
    }

    #[test]
    fn reload_linked_requires_linked_program() {
        let driver = RecordingDriver::shared();
        let (vertex, fragment) = units(&driver, FRAGMENT);
        let mut program = ShaderProgram::new(driver, "unlinked").expect("program");
        program.load_and_compile(vertex, fragment).expect("compile");
        assert!(program.reload_linked().unwrap_err().is_precondition());
    }

    #[test]
    fn reload_linked_picks_up_file_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hot.frag");
        fs::write(&path, FRAGMENT).expect("write");

        let driver = RecordingDriver::shared();
        let vertex = Shader::builtin(driver.clone(), ShaderStage::Vertex, "quad", QUAD_VERTEX_SHADER)
            .into_shared();
        let fragment =
            Shader::from_file(driver.clone(), ShaderStage::Fragment, SourceFormat::Glsl, &path)
                .expect("load")
                .into_shared();
        let mut program = ShaderProgram::new(driver.clone(), "hot").expect("program");
        program.load_and_compile(vertex, fragment.clone()).expect("compile");
        program.link().expect("link");

        fs::write(&path, "uniform float iFocalLength;\nvoid main() {}\n").expect("rewrite");
        program.reload_linked().expect("reload");
        assert!(program.is_linked());
        assert!(fragment.borrow().source().contains("iFocalLength"));

        fs::write(&path, format!("{COMPILE_ERROR_MARKER}\n")).expect("break");
        assert!(program.reload_linked().is_err());
        assert!(!program.is_linked());
        assert_eq!(program.handle(), 0);
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn channels_come_from_shadertoy_fragment() {
        let driver = RecordingDriver::shared();
        let vertex = Shader::builtin(driver.clone(), ShaderStage::Vertex, "quad", QUAD_VERTEX_SHADER)
            .into_shared();
        let mut fragment = Shader::shadertoy(driver.clone(), "toy");
        fragment
            .load_source("iChannel2 = grove_64\n:\nvoid main(){}\n")
            .expect("load");
        let mut program = ShaderProgram::new(driver, "toy").expect("program");
        program
            .load_and_compile(vertex, fragment.into_shared())
            .expect("compile");

        let channels = program.channels().expect("channels");
        assert_eq!(channels.input(2), Some(shadertoy::ChannelContent::Grove64));
    }
}
