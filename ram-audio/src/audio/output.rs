//! Audio output using cpal
//!
//! Opens an output device and drives a block-mixing callback from the
//! device's real-time thread. The callback fills [`StereoFrame`] blocks;
//! this module applies master volume, clamps, and converts to the device's
//! sample format.

use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Preferred device rate when the device supports it
const PREFERRED_SAMPLE_RATE: u32 = 44100;

/// Frames mixed per callback invocation of the block source
const SCRATCH_FRAMES: usize = 1024;

/// Audio output manager using cpal.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    /// Master volume as `f32` bits
    volume: Arc<AtomicU32>,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
    error_count: Arc<AtomicU32>,
}

impl AudioOutput {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an audio device for output.
    ///
    /// A named device that cannot be found falls back to the host default.
    ///
    /// # Arguments
    /// - `device_name`: Optional device name (None = default device)
    /// - `buffer_size`: Optional buffer size in frames (None = device default)
    pub fn new(device_name: Option<&str>, buffer_size: Option<u32>) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => {
                let mut devices = host.output_devices().map_err(|e| {
                    Error::AudioOutput(format!("Failed to enumerate devices: {}", e))
                })?;

                match devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                    Some(dev) => {
                        info!("Found requested audio device: {}", name);
                        dev
                    }
                    None => {
                        warn!(
                            "Requested device '{}' not found, falling back to default device",
                            name
                        );
                        host.default_output_device().ok_or_else(|| {
                            Error::AudioOutput(format!(
                                "Device '{}' not found and no default device available",
                                name
                            ))
                        })?
                    }
                }
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?,
        };

        info!(
            "Using audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let (mut config, sample_format) = Self::get_best_config(&device)?;

        if let Some(size) = buffer_size {
            config.buffer_size = cpal::BufferSize::Fixed(size);
            debug!("Using requested buffer size: {} frames", size);
        }

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}, buffer_size={:?}",
            config.sample_rate.0, config.channels, sample_format, config.buffer_size
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            volume: Arc::new(AtomicU32::new(1.0f32.to_bits())),
            error_flag: Arc::new(AtomicBool::new(false)),
            error_count: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Prefer 44.1kHz stereo f32, otherwise the device default.
    fn get_best_config(device: &Device) -> Result<(StreamConfig, SampleFormat)> {
        let mut supported_configs = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?;

        let preferred = supported_configs.find(|config| {
            config.channels() == 2
                && config.min_sample_rate().0 <= PREFERRED_SAMPLE_RATE
                && config.max_sample_rate().0 >= PREFERRED_SAMPLE_RATE
                && config.sample_format() == SampleFormat::F32
        });

        if let Some(supported_config) = preferred {
            let sample_format = supported_config.sample_format();
            let config = supported_config
                .with_sample_rate(cpal::SampleRate(PREFERRED_SAMPLE_RATE))
                .config();
            return Ok((config, sample_format));
        }

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;

        Ok((supported_config.config(), supported_config.sample_format()))
    }

    /// Start the output stream.
    ///
    /// `source` is called on the audio thread with blocks of at most 1024
    /// frames and must fill every frame. It must not block or allocate.
    pub fn start<F>(&mut self, source: F) -> Result<()>
    where
        F: FnMut(&mut [StereoFrame]) + Send + 'static,
    {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32, F>(source)?,
            SampleFormat::I16 => self.build_stream::<i16, F>(source)?,
            SampleFormat::U16 => self.build_stream::<u16, F>(source)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);

        info!("Audio stream started successfully");
        Ok(())
    }

    fn build_stream<T, F>(&self, mut source: F) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
        F: FnMut(&mut [StereoFrame]) + Send + 'static,
    {
        let channels = self.config.channels as usize;
        let volume = Arc::clone(&self.volume);
        let error_flag = Arc::clone(&self.error_flag);
        let error_count = Arc::clone(&self.error_count);
        let mut scratch = vec![StereoFrame::SILENT; SCRATCH_FRAMES];

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let current_volume = f32::from_bits(volume.load(Ordering::Relaxed));

                    for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut scratch[..frames];
                        source(block);

                        for (out, &frame) in chunk.chunks_mut(channels).zip(block.iter()) {
                            let mut frame = frame;
                            frame.apply_volume(current_volume);
                            frame.clamp();
                            out[0] = T::from_sample(frame.left);
                            if channels > 1 {
                                out[1] = T::from_sample(frame.right);
                            }
                            for extra in out.iter_mut().skip(2) {
                                *extra = T::EQUILIBRIUM;
                            }
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                    error_count.fetch_add(1, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }

    /// Stop audio playback and release the stream.
    pub fn stop(&mut self) -> Result<()> {
        info!("Stopping audio stream");

        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }

        Ok(())
    }

    /// Set master volume, clamped to [0.0, 1.0].
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.volume.store(clamped.to_bits(), Ordering::Relaxed);
        debug!("Volume set to {:.2}", clamped);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Device mix rate; size sample buffers with this.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// True once the stream error callback has fired.
    pub fn has_error(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst)
    }

    pub fn get_error_count(&self) -> u32 {
        self.error_count.load(Ordering::SeqCst)
    }
}
