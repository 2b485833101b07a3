//! Spectrum analysis tapped from the decoded sample stream.
//!
//! `SampleTap` wraps a rodio source and mixes every frame down to mono into
//! the `Analyser` ring buffer; the UI reads byte-scaled FFT magnitudes back
//! out with `Analyser::frequency_data`.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use crate::error::GraphError;

use super::endpoint::RoutingGraph;
use super::types::GraphState;

pub const DEFAULT_FFT_SIZE: usize = 256;
const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

// Magnitudes outside this range saturate to 0 / 255.
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Shared handle to the analysis window. Cheap to clone.
#[derive(Clone)]
pub struct Analyser {
    fft_size: usize,
    samples: Arc<Mutex<VecDeque<f32>>>,
    capturing: Arc<AtomicBool>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("fft_size", &self.fft_size)
            .field("capturing", &self.capturing.load(Ordering::Relaxed))
            .finish()
    }
}

impl Analyser {
    pub fn new(fft_size: usize) -> Result<Self, GraphError> {
        if !fft_size.is_power_of_two() || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&fft_size) {
            return Err(GraphError::InvalidFftSize(fft_size));
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(fft_size))),
            capturing: Arc::new(AtomicBool::new(true)),
            fft,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Relaxed)
    }

    pub(crate) fn set_capturing(&self, on: bool) {
        self.capturing.store(on, Ordering::Relaxed);
    }

    /// Append mono samples, keeping only the latest `fft_size` of them.
    /// Returns false when the window is busy and nothing was written.
    pub(crate) fn push_samples(&self, samples: &[f32]) -> bool {
        if !self.is_capturing() {
            return true;
        }
        // Never block the mixer thread on a UI read.
        let Ok(mut buf) = self.samples.try_lock() else {
            return false;
        };
        for &s in samples {
            if buf.len() >= self.fft_size {
                buf.pop_front();
            }
            buf.push_back(s);
        }
        true
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
    }

    /// Latest analysis window, left-padded with silence.
    pub fn time_domain_data(&self) -> Vec<f32> {
        let mut window = vec![0.0f32; self.fft_size];
        if let Ok(buf) = self.samples.lock() {
            let offset = self.fft_size - buf.len();
            for (slot, &s) in window[offset..].iter_mut().zip(buf.iter()) {
                *slot = s;
            }
        }
        window
    }

    /// Hann-windowed magnitude spectrum scaled onto `0..=255`, one byte per bin.
    pub fn frequency_data(&self) -> Vec<u8> {
        let n = self.fft_size;
        let window = self.time_domain_data();

        let mut spectrum: Vec<Complex<f32>> = window
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / (n as f32 - 1.0)).cos());
                Complex::new(s * w, 0.0)
            })
            .collect();
        self.fft.process(&mut spectrum);

        spectrum[..self.frequency_bin_count()]
            .iter()
            .map(|c| {
                let magnitude = c.norm() / n as f32;
                let db = 20.0 * magnitude.max(1e-12).log10();
                let scaled = (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS) * 255.0;
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

/// Source wrapper feeding the analyser with a mono mixdown of each frame.
///
/// Frames are handed over in batches of a quarter window. A batch that
/// meets a busy window is kept and retried with the next one.
pub struct SampleTap<S> {
    inner: S,
    analyser: Option<Analyser>,
    frame_sum: f32,
    frame_pos: u16,
    pending: Vec<f32>,
    batch: usize,
}

impl<S> SampleTap<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, analyser: Option<Analyser>) -> Self {
        let batch = analyser
            .as_ref()
            .map(|a| (a.fft_size() / 4).max(1))
            .unwrap_or(0);
        Self {
            inner,
            analyser,
            frame_sum: 0.0,
            frame_pos: 0,
            pending: Vec::with_capacity(batch),
            batch,
        }
    }

    fn flush(&mut self) {
        let Some(analyser) = &self.analyser else {
            return;
        };
        if self.pending.is_empty() || analyser.push_samples(&self.pending) {
            self.pending.clear();
            return;
        }
        // Only the latest window can ever be shown.
        let cap = analyser.fft_size();
        if self.pending.len() > cap {
            let excess = self.pending.len() - cap;
            self.pending.drain(..excess);
        }
    }
}

impl<S> Iterator for SampleTap<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };

        if self.analyser.is_some() {
            let channels = self.inner.channels().max(1);
            self.frame_sum += sample;
            self.frame_pos += 1;
            if self.frame_pos >= channels {
                self.pending.push(self.frame_sum / f32::from(channels));
                self.frame_sum = 0.0;
                self.frame_pos = 0;
                if self.pending.len() >= self.batch {
                    self.flush();
                }
            }
        }

        Some(sample)
    }
}

impl<S> Source for SampleTap<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.pending.clear();
        self.inner.try_seek(pos)
    }
}

/// Routing graph for endpoints whose sources are wrapped in a `SampleTap`.
pub struct TapGraph {
    analyser: Analyser,
    state: GraphState,
}

impl TapGraph {
    pub fn new(analyser: Analyser) -> Self {
        analyser.set_capturing(true);
        Self {
            analyser,
            state: GraphState::Running,
        }
    }
}

impl RoutingGraph for TapGraph {
    fn state(&self) -> GraphState {
        self.state
    }

    fn resume(&mut self) -> Result<(), GraphError> {
        if self.state == GraphState::Closed {
            return Err(GraphError::Closed);
        }
        self.analyser.set_capturing(true);
        self.state = GraphState::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), GraphError> {
        if self.state == GraphState::Closed {
            return Err(GraphError::Closed);
        }
        self.analyser.set_capturing(false);
        self.state = GraphState::Suspended;
        Ok(())
    }

    fn close(&mut self) -> Result<(), GraphError> {
        self.analyser.set_capturing(false);
        self.analyser.clear();
        self.state = GraphState::Closed;
        Ok(())
    }

    fn analyser(&self) -> &Analyser {
        &self.analyser
    }
}
