//! In-memory `GlDriver` that records calls and simulates compile/link status.
//!
//! Shaders whose source contains `#error` fail to compile. Programs link when a
//! compiled vertex and a compiled fragment shader are attached. Uniform
//! locations are handed out for names that appear in the linked sources.
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::driver::{
    DriverError, GlDriver, ShaderStage, TextureImage, TextureSampling, TextureTarget,
    UniformValue, VertexLayout,
};

pub(crate) const COMPILE_ERROR_MARKER: &str = "#error";

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    linked_sources: Vec<String>,
    linked: bool,
    attribs: Vec<(u32, String)>,
}

#[derive(Default)]
struct State {
    next_handle: u32,
    next_location: i32,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    live: HashMap<u32, &'static str>,
    released: Vec<(&'static str, u32)>,
    calls: Vec<&'static str>,
    errors: VecDeque<u32>,
    locations: HashMap<(u32, String), i32>,
    uniform_values: HashMap<i32, Vec<f32>>,
    bound_program: u32,
    enabled_attribs: Vec<u32>,
    texture_uploads: Vec<(TextureImage, u32, u32)>,
    fail_creation: bool,
}

impl State {
    fn create(&mut self, kind: &'static str) -> Result<u32, DriverError> {
        self.calls.push(kind);
        if self.fail_creation {
            return Err(DriverError::Create {
                object: kind,
                reason: "out of handles".into(),
            });
        }
        self.next_handle += 1;
        self.live.insert(self.next_handle, kind);
        Ok(self.next_handle)
    }

    fn delete(&mut self, kind: &'static str, handle: u32) {
        self.calls.push(kind);
        if handle != 0 {
            self.live.remove(&handle);
            self.released.push((kind, handle));
        }
    }
}

pub(crate) struct RecordingDriver {
    state: RefCell<State>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::default()),
        }
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn fail_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_creation = fail;
    }

    pub fn count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| **c == call).count()
    }

    /// Calls whose name starts with `prefix`, in issue order.
    pub fn calls_matching(&self, prefix: &str) -> Vec<&'static str> {
        self.state
            .borrow()
            .calls
            .iter()
            .copied()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn released(&self) -> Vec<(&'static str, u32)> {
        self.state.borrow().released.clone()
    }

    pub fn release_count(&self, handle: u32) -> usize {
        self.state
            .borrow()
            .released
            .iter()
            .filter(|(_, h)| *h == handle)
            .count()
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_live(&self, handle: u32) -> bool {
        self.state.borrow().live.contains_key(&handle)
    }

    pub fn bound_program(&self) -> u32 {
        self.state.borrow().bound_program
    }

    pub fn attached(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub fn attrib_bindings(&self, program: u32) -> Vec<(u32, String)> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attribs.clone())
            .unwrap_or_default()
    }

    pub fn shader_source(&self, shader: u32) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.source.clone())
    }

    pub fn uniform_value(&self, location: i32) -> Option<Vec<f32>> {
        self.state.borrow().uniform_values.get(&location).cloned()
    }

    pub fn enabled_attribs(&self) -> Vec<u32> {
        self.state.borrow().enabled_attribs.clone()
    }

    pub fn texture_uploads(&self) -> Vec<(TextureImage, u32, u32)> {
        self.state.borrow().texture_uploads.clone()
    }
}

fn uniform_floats(value: UniformValue<'_>) -> Vec<f32> {
    match value {
        UniformValue::Float1(x) => vec![x],
        UniformValue::Float2(x, y) => vec![x, y],
        UniformValue::Float3(x, y, z) => vec![x, y, z],
        UniformValue::Float4(x, y, z, w) => vec![x, y, z, w],
        UniformValue::Int1(x) => vec![x as f32],
        UniformValue::Int2(x, y) => vec![x as f32, y as f32],
        UniformValue::Int3(x, y, z) => vec![x as f32, y as f32, z as f32],
        UniformValue::Int4(x, y, z, w) => vec![x as f32, y as f32, z as f32, w as f32],
        UniformValue::Float1Array(values)
        | UniformValue::Float3Array(values)
        | UniformValue::Matrix2 { values, .. }
        | UniformValue::Matrix3 { values, .. }
        | UniformValue::Matrix4 { values, .. } => values.to_vec(),
    }
}

impl GlDriver for RecordingDriver {
    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let handle = state.create("create_shader")?;
        state.shaders.insert(
            handle,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(handle)
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.delete("delete_shader", shader);
        state.shaders.remove(&shader);
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push("shader_source");
        if let Some(record) = state.shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("compile_shader");
        if let Some(record) = state.shaders.get_mut(&shader) {
            record.compiled = !record.source.contains(COMPILE_ERROR_MARKER);
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.state.borrow().shaders.get(&shader) {
            Some(record) if !record.compiled => {
                format!("0:1(1): error: {} shader failed", record.stage.label())
            }
            _ => String::new(),
        }
    }

    fn create_program(&self) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let handle = state.create("create_program")?;
        state.programs.insert(handle, ProgramRecord::default());
        Ok(handle)
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.delete("delete_program", program);
        state.programs.remove(&program);
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("attach_shader");
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("detach_shader");
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.retain(|s| *s != shader);
        }
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push("bind_attrib_location");
        if let Some(record) = state.programs.get_mut(&program) {
            record.attribs.push((index, name.to_string()));
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("link_program");
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let compiled: Vec<&ShaderRecord> = attached
            .iter()
            .filter_map(|handle| state.shaders.get(handle))
            .filter(|record| record.compiled)
            .collect();
        let has_stage = |stage| compiled.iter().any(|record| record.stage == stage);
        let linked = compiled.len() == attached.len()
            && has_stage(ShaderStage::Vertex)
            && has_stage(ShaderStage::Fragment);
        let sources: Vec<String> = compiled.iter().map(|r| r.source.clone()).collect();
        if let Some(record) = state.programs.get_mut(&program) {
            record.linked = linked;
            record.linked_sources = if linked { sources } else { Vec::new() };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.state.borrow().programs.get(&program) {
            Some(record) if !record.linked => "error: linking failed".to_string(),
            _ => String::new(),
        }
    }

    fn use_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("use_program");
        state.bound_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> i32 {
        let mut state = self.state.borrow_mut();
        state.calls.push("uniform_location");
        let base = name.split('[').next().unwrap_or(name);
        let declared = state
            .programs
            .get(&program)
            .map(|p| p.linked_sources.iter().any(|source| source.contains(base)))
            .unwrap_or(false);
        if !declared {
            return -1;
        }
        let key = (program, name.to_string());
        if let Some(location) = state.locations.get(&key) {
            return *location;
        }
        let location = state.next_location;
        state.next_location += 1;
        state.locations.insert(key, location);
        location
    }

    fn set_uniform(&self, location: i32, value: UniformValue<'_>) {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_uniform");
        state.uniform_values.insert(location, uniform_floats(value));
    }

    fn get_uniform_f32(&self, _program: u32, location: i32, out: &mut [f32]) {
        let state = self.state.borrow();
        if let Some(values) = state.uniform_values.get(&location) {
            for (slot, value) in out.iter_mut().zip(values) {
                *slot = *value;
            }
        }
    }

    fn get_uniform_i32(&self, _program: u32, location: i32, out: &mut [i32]) {
        let state = self.state.borrow();
        if let Some(values) = state.uniform_values.get(&location) {
            for (slot, value) in out.iter_mut().zip(values) {
                *slot = *value as i32;
            }
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("enable_vertex_attrib");
        state.enabled_attribs.push(index);
    }

    fn disable_vertex_attrib(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push("disable_vertex_attrib");
        state.enabled_attribs.retain(|i| *i != index);
    }

    fn vertex_attrib_pointer(&self, _index: u32, _layout: VertexLayout) {
        self.state.borrow_mut().calls.push("vertex_attrib_pointer");
    }

    fn create_texture(&self) -> Result<u32, DriverError> {
        self.state.borrow_mut().create("create_texture")
    }

    fn delete_texture(&self, texture: u32) {
        self.state.borrow_mut().delete("delete_texture", texture);
    }

    fn create_buffer(&self) -> Result<u32, DriverError> {
        self.state.borrow_mut().create("create_buffer")
    }

    fn delete_buffer(&self, buffer: u32) {
        self.state.borrow_mut().delete("delete_buffer", buffer);
    }

    fn create_framebuffer(&self) -> Result<u32, DriverError> {
        self.state.borrow_mut().create("create_framebuffer")
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.state
            .borrow_mut()
            .delete("delete_framebuffer", framebuffer);
    }

    fn create_renderbuffer(&self) -> Result<u32, DriverError> {
        self.state.borrow_mut().create("create_renderbuffer")
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.state
            .borrow_mut()
            .delete("delete_renderbuffer", renderbuffer);
    }

    fn bind_array_buffer(&self, _buffer: u32) {
        self.state.borrow_mut().calls.push("bind_array_buffer");
    }

    fn array_buffer_data(&self, _data: &[u8]) {
        self.state.borrow_mut().calls.push("array_buffer_data");
    }

    fn active_texture_unit(&self, _unit: u32) {
        self.state.borrow_mut().calls.push("active_texture_unit");
    }

    fn bind_texture(&self, _target: TextureTarget, _texture: u32) {
        self.state.borrow_mut().calls.push("bind_texture");
    }

    fn texture_image_rgba(
        &self,
        image: TextureImage,
        width: u32,
        height: u32,
        _pixels: Option<&[u8]>,
    ) {
        let mut state = self.state.borrow_mut();
        state.calls.push("texture_image_rgba");
        state.texture_uploads.push((image, width, height));
    }

    fn texture_sampling(&self, _target: TextureTarget, _sampling: TextureSampling) {
        self.state.borrow_mut().calls.push("texture_sampling");
    }

    fn generate_mipmap(&self, _target: TextureTarget) {
        self.state.borrow_mut().calls.push("generate_mipmap");
    }

    fn bind_framebuffer(&self, _framebuffer: u32) {
        self.state.borrow_mut().calls.push("bind_framebuffer");
    }

    fn attach_color_texture(&self, _texture: u32) {
        self.state.borrow_mut().calls.push("attach_color_texture");
    }

    fn depth_storage(&self, _renderbuffer: u32, _width: u32, _height: u32) {
        self.state.borrow_mut().calls.push("depth_storage");
    }

    fn attach_depth_renderbuffer(&self, _renderbuffer: u32) {
        self.state
            .borrow_mut()
            .calls
            .push("attach_depth_renderbuffer");
    }

    fn viewport(&self, _x: i32, _y: i32, _width: i32, _height: i32) {
        self.state.borrow_mut().calls.push("viewport");
    }

    fn draw_triangles(&self, _first: i32, _count: i32) {
        self.state.borrow_mut().calls.push("draw_triangles");
    }

    fn error(&self) -> u32 {
        self.state.borrow_mut().errors.pop_front().unwrap_or(0)
    }
}
