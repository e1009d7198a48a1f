use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use shadertoy::CHANNEL_COUNT;

use crate::error::ShaderError;
use crate::program::ShaderProgram;

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Per-frame values for the uniforms declared by the ShaderToy preamble.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub resolution: [f32; 2],
    pub mouse: [f32; 4],
    pub channel_time: [f32; CHANNEL_COUNT],
    pub channel_resolution: [[f32; 3]; CHANNEL_COUNT],
    pub date: [f32; 4],
    /// Column-major head pose supplied by the caller.
    pub camera_transform: [f32; 16],
    pub focal_length: f32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            resolution: [0.0; 2],
            mouse: [0.0; 4],
            channel_time: [0.0; CHANNEL_COUNT],
            channel_resolution: [[0.0; 3]; CHANNEL_COUNT],
            date: [0.0; 4],
            camera_transform: IDENTITY,
            focal_length: 1.0,
        }
    }
}

impl FrameUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            resolution: [width as f32, height as f32],
            ..Self::default()
        };
        uniforms.refresh_date();
        uniforms
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
        self.channel_time = [seconds; CHANNEL_COUNT];
    }

    pub fn refresh_date(&mut self) {
        self.set_date(Local::now().naive_local());
    }

    /// `iDate` is year, month, day and seconds since midnight.
    pub fn set_date(&mut self, now: NaiveDateTime) {
        let seconds = now.num_seconds_from_midnight() as f32
            + now.nanosecond() as f32 / 1_000_000_000.0;
        self.date = [now.year() as f32, now.month() as f32, now.day() as f32, seconds];
    }

    /// Uploads every value to the bound `program`.
    ///
    /// Uniforms the shader never reads are optimised out by the driver; those
    /// are skipped. Returns how many uniforms were written.
    pub fn apply(&self, program: &mut ShaderProgram) -> Result<usize, ShaderError> {
        let channel_resolution = self.channel_resolution.concat();
        let [mx, my, mz, mw] = self.mouse;
        let [year, month, day, seconds] = self.date;

        let results = [
            ("iGlobalTime", program.set_uniform_1f("iGlobalTime", self.time)),
            (
                "iResolution",
                program.set_uniform_2f("iResolution", self.resolution[0], self.resolution[1]),
            ),
            ("iMouse", program.set_uniform_4f("iMouse", mx, my, mz, mw)),
            (
                "iChannelTime",
                program.set_uniform_1fv("iChannelTime", &self.channel_time),
            ),
            (
                "iChannelResolution",
                program.set_uniform_3fv("iChannelResolution", &channel_resolution),
            ),
            ("iDate", program.set_uniform_4f("iDate", year, month, day, seconds)),
            (
                "iCameraTransform",
                program.set_uniform_matrix_4fv("iCameraTransform", false, &self.camera_transform),
            ),
            (
                "iFocalLength",
                program.set_uniform_1f("iFocalLength", self.focal_length),
            ),
        ];

        let mut written = 0;
        for (name, result) in results {
            match result {
                Ok(()) => written += 1,
                Err(ShaderError::UniformNotFound { .. }) => {
                    tracing::trace!(uniform = name, "uniform inactive in program; skipped");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(written)
    }
}
