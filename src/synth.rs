use serde::Deserialize;

/// Voice layout of the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthMode {
    /// One oscillator.
    #[default]
    Single,
    /// A stack of partials spaced `partial_distance` Hz apart.
    Additive,
    /// Amplitude modulation by a second oscillator.
    Am,
    /// Frequency modulation by a second oscillator.
    Fm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Parameter block for an external synthesizer.
///
/// The crate does not produce audio; it only keeps these values current so
/// that an audio backend can read them.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    pub mode: SynthMode,
    pub waveform: Waveform,
    pub lfo: bool,
    pub partials: u32,
    /// Hz between additive partials.
    pub partial_distance: f64,
    /// Hz.
    pub modulator_frequency: f64,
    pub modulation_index: f64,
    /// Hz.
    pub lfo_frequency: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            mode: SynthMode::Single,
            waveform: Waveform::Sine,
            lfo: false,
            partials: 5,
            partial_distance: 15.0,
            modulator_frequency: 100.0,
            modulation_index: 100.0,
            lfo_frequency: 2.0,
        }
    }
}

impl SynthParams {
    /// Restores the start-of-session values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
