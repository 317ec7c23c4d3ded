use serde::Deserialize;
use simd_json::prelude::*;
use std::fmt;
use tracing::trace;

use crate::{Frame, FrameSink, SynthParams};

pub const DEFAULT_SENSOR_KEY: &str = "potentiometer_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Sweeps the red channel along a sine of the sensor value over a fixed
    /// green/blue base.
    pub fn from_sensor(value: f64) -> Self {
        let red = ((1.0 + value.sin()) * (255.0 / 2.0)).round().clamp(0.0, 255.0);
        Self::new(red as u8, 60, 50)
    }

    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::from_sensor(0.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Everything a frame can drive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub background: Rgb,
    pub synth: SynthParams,
}

/// Named destination for a sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Background,
    LfoFrequency,
    ModulatorFrequency,
    ModulationIndex,
    PartialDistance,
}

impl Target {
    pub fn apply(self, value: f64, params: &mut Parameters) {
        match self {
            Target::Background => params.background = Rgb::from_sensor(value),
            Target::LfoFrequency => params.synth.lfo_frequency = value,
            Target::ModulatorFrequency => params.synth.modulator_frequency = value,
            Target::ModulationIndex => params.synth.modulation_index = value,
            Target::PartialDistance => params.synth.partial_distance = value,
        }
    }
}

type Mapping = Box<dyn Fn(f64, &mut Parameters) + Send + Sync>;

/// Applies per-key transforms from incoming frames to a [`Parameters`] block.
///
/// Bindings run in the order they were added. Keys that are missing from a
/// frame, or whose value is not a number, leave the parameters untouched.
pub struct ParameterMapper {
    mappings: Vec<(String, Mapping)>,
    params: Parameters,
}

impl ParameterMapper {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            params: Parameters::default(),
        }
    }

    pub fn add_mapping<F>(&mut self, key: impl Into<String>, transform: F)
    where
        F: Fn(f64, &mut Parameters) + Send + Sync + 'static,
    {
        self.mappings.push((key.into(), Box::new(transform)));
    }

    pub fn bind(&mut self, key: impl Into<String>, target: Target) {
        self.add_mapping(key, move |value, params| target.apply(value, params));
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Puts the parameters back to their start-of-session values.
    pub fn reset(&mut self) {
        self.params = Parameters::default();
    }

    pub fn apply(&mut self, frame: &Frame) {
        for (key, transform) in &self.mappings {
            match frame.get(key.as_str()).and_then(|v| v.cast_f64()) {
                Some(value) => transform(value, &mut self.params),
                None => trace!(key = %key, "no numeric value for key"),
            }
        }
    }
}

impl Default for ParameterMapper {
    /// Drives the background color from `potentiometer_1`.
    fn default() -> Self {
        let mut mapper = Self::new();
        mapper.bind(DEFAULT_SENSOR_KEY, Target::Background);
        mapper
    }
}

impl FrameSink for ParameterMapper {
    fn on_frame(&mut self, frame: &Frame) {
        self.apply(frame);
    }
}
