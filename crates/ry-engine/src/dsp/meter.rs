//! Level meter and spectrum analyser taps.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::{gain_to_db, time_coeff};
use crate::Frame;

/// RMS integration time in seconds.
const METER_WINDOW: f32 = 0.05;
/// Mean power below which the meter reads silence.
const POWER_FLOOR: f32 = 1e-12;

/// Analyser window length.
pub const FFT_SIZE: usize = 1024;
/// Number of bins returned by [`Analyser::read_spectrum`].
pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;

/// Smoothed RMS level follower.
#[derive(Clone, Debug)]
pub struct Meter {
    coeff: f32,
    power: f32,
}

impl Meter {
    pub fn new(sample_rate: f32) -> Self {
        Self { coeff: time_coeff(METER_WINDOW, sample_rate), power: 0.0 }
    }

    #[inline]
    pub fn process(&mut self, frame: Frame) {
        self.power = frame.power() + (self.power - frame.power()) * self.coeff;
        if self.power < POWER_FLOOR {
            self.power = 0.0;
        }
    }

    /// Current level in dBFS, `-inf` for silence.
    pub fn level_db(&self) -> f32 {
        gain_to_db(self.power.sqrt())
    }

    pub fn reset(&mut self) {
        self.power = 0.0;
    }
}

/// Rolling window of the master output with an on-demand FFT.
#[derive(Clone)]
pub struct Analyser {
    ring: Vec<f32>,
    write: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl Analyser {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        // Hann window
        let window = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();
        Self { ring: vec![0.0; FFT_SIZE], write: 0, window, fft }
    }

    #[inline]
    pub fn push(&mut self, frame: Frame) {
        self.ring[self.write] = (frame.left + frame.right) * 0.5;
        self.write = (self.write + 1) % FFT_SIZE;
    }

    /// Magnitude spectrum of the last [`FFT_SIZE`] samples in dB, [`SPECTRUM_BINS`] values.
    pub fn read_spectrum(&self) -> Vec<f32> {
        let mut buf: Vec<Complex<f32>> = (0..FFT_SIZE)
            .map(|i| {
                let sample = self.ring[(self.write + i) % FFT_SIZE];
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();
        self.fft.process(&mut buf);
        let scale = 2.0 / FFT_SIZE as f32;
        buf[..SPECTRUM_BINS].iter().map(|c| gain_to_db(c.norm() * scale)).collect()
    }

    pub fn reset(&mut self) {
        self.ring.iter_mut().for_each(|s| *s = 0.0);
        self.write = 0;
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser").field("size", &FFT_SIZE).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_meter_reads_neg_inf() {
        let mut m = Meter::new(44100.0);
        for _ in 0..100 {
            m.process(Frame::silence());
        }
        assert_eq!(m.level_db(), f32::NEG_INFINITY);
    }

    #[test]
    fn full_scale_square_reads_zero_db() {
        let mut m = Meter::new(44100.0);
        for i in 0..44_100 {
            m.process(Frame::mono(if i % 2 == 0 { 1.0 } else { -1.0 }));
        }
        assert!(m.level_db().abs() < 0.1);
    }

    #[test]
    fn meter_falls_back_to_silence() {
        let mut m = Meter::new(44100.0);
        m.process(Frame::mono(1.0));
        for _ in 0..88_200 {
            m.process(Frame::silence());
        }
        assert_eq!(m.level_db(), f32::NEG_INFINITY);
    }

    #[test]
    fn spectrum_peaks_at_tone_bin() {
        let mut a = Analyser::new();
        let bin = 64;
        for i in 0..FFT_SIZE {
            let x = (2.0 * PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin();
            a.push(Frame::mono(x));
        }
        let spectrum = a.read_spectrum();
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        assert_eq!(peak_bin, bin);
    }

    #[test]
    fn empty_spectrum_is_neg_inf() {
        let a = Analyser::new();
        assert!(a.read_spectrum().iter().all(|v| *v == f32::NEG_INFINITY));
    }
}
