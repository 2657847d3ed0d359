//! ram-audio - play or render a sound from memory
//!
//! Loads a WAV or Ogg Vorbis file into a [`SampleBuffer`] at the output
//! rate, configures a playback cursor from the command line and either
//! plays it through the audio device or renders it to a WAV file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use ram_audio::audio::AudioOutput;
use ram_audio::config::PlayerConfig;
use ram_audio::playback::{create_cursor, CursorHandle};
use ram_audio::render::render_to_wav;
use ram_audio::SampleBuffer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Poll interval while waiting for playback to finish
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for the audio thread to pick up the start command
const START_TIMEOUT: Duration = Duration::from_secs(2);

/// Command-line arguments for ram-audio
#[derive(Parser, Debug)]
#[command(name = "ram-audio")]
#[command(about = "Load a sound into memory and play a slice of it")]
#[command(version)]
struct Args {
    /// Audio file to load (.wav or .ogg)
    #[arg(required_unless_present = "list_devices")]
    file: Option<PathBuf>,

    /// Configuration file (default: <config_dir>/ram-audio/config.toml)
    #[arg(short, long, env = "RAM_AUDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Start offset within the slice, in seconds
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Slice start, in seconds
    #[arg(long, default_value_t = 0.0)]
    slice_start: f64,

    /// Slice length in seconds (negative = to end of buffer)
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    slice_length: f64,

    /// Loop the slice
    #[arg(short = 'l', long = "loop")]
    looping: bool,

    /// Stop after this many seconds (required to end a looping playback)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Output volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Output device name (overrides config)
    #[arg(long, env = "RAM_AUDIO_DEVICE")]
    device: Option<String>,

    /// Output buffer size in frames (overrides config)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Render to this WAV file instead of playing
    #[arg(short, long)]
    render: Option<PathBuf>,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ram_audio={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.list_devices {
        for name in AudioOutput::list_devices().context("Failed to list output devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let file = args
        .file
        .clone()
        .context("No audio file given")?;

    match args.render.clone() {
        Some(render_path) => render(&args, &config, &file, render_path),
        None => play(&args, &config, &file),
    }
}

/// Load `file` into a shared buffer mixing at `rate`.
fn load_buffer(file: &Path, rate: u32) -> Result<Arc<SampleBuffer>> {
    let mut buffer = SampleBuffer::new(rate).context("Failed to create sample buffer")?;
    buffer
        .load(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    Ok(Arc::new(buffer))
}

/// Validate `--duration`. Negative values mean "stop immediately"; NaN,
/// infinity and values too large for a [`Duration`] are rejected.
fn playback_duration(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|seconds| {
            let clamped = if seconds < 0.0 { 0.0 } else { seconds };
            Duration::try_from_secs_f64(clamped)
                .with_context(|| format!("Invalid --duration {}", seconds))
        })
        .transpose()
}

fn configure(handle: &mut CursorHandle, args: &Args) -> Result<()> {
    handle.set_slice(args.slice_start, args.slice_length)?;
    handle.set_loop(args.looping)?;
    handle.start(args.from)?;
    Ok(())
}

fn render(args: &Args, config: &PlayerConfig, file: &Path, render_path: PathBuf) -> Result<()> {
    let rate = config.output.render_rate;
    let buffer = load_buffer(file, rate)?;

    let (mut handle, mut mixer) =
        create_cursor(Arc::clone(&buffer), config.playback.command_queue_capacity);
    configure(&mut handle, args)?;

    let max_frames = match playback_duration(args.duration)? {
        Some(duration) => (duration.as_secs_f64() * rate as f64) as usize,
        None if args.looping => {
            anyhow::bail!("--duration is required when rendering a looping slice")
        }
        None => buffer.frame_count(),
    };

    let written = render_to_wav(&mut mixer, &render_path, max_frames)
        .with_context(|| format!("Failed to render to {}", render_path.display()))?;

    info!(
        "Rendered {} frames, {} loop(s)",
        written,
        handle.get_loop_count()
    );
    Ok(())
}

fn play(args: &Args, config: &PlayerConfig, file: &Path) -> Result<()> {
    let duration = playback_duration(args.duration)?;
    let device = args.device.as_deref().or(config.output.device.as_deref());
    let buffer_size = args.buffer_size.or(config.output.buffer_size);

    let mut output =
        AudioOutput::new(device, buffer_size).context("Failed to open audio output")?;
    output.set_volume(args.volume);

    let buffer = load_buffer(file, output.sample_rate())?;
    info!(
        "Playing {} on {} ({:.3}s buffer)",
        buffer.stream_name(),
        output.device_name(),
        buffer.get_length()
    );

    let (mut handle, mut mixer) =
        create_cursor(Arc::clone(&buffer), config.playback.command_queue_capacity);
    configure(&mut handle, args)?;

    output
        .start(move |block| {
            mixer.mix(block);
        })
        .context("Failed to start audio stream")?;

    // A deadline past the end of the platform clock never fires
    let deadline = duration.and_then(|duration| Instant::now().checked_add(duration));

    // The mixer publishes state only once it has run. A slice that is
    // empty finishes within its first block and never reads as playing.
    let started = Instant::now();
    while !handle.is_playing() {
        if output.has_error()
            || started.elapsed() >= START_TIMEOUT
            || deadline.is_some_and(|d| Instant::now() >= d)
        {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    while handle.is_playing() {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            handle.stop()?;
            break;
        }
        if output.has_error() {
            warn!("Audio output reported {} error(s), stopping", output.get_error_count());
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    info!(
        "Playback finished at {:.3}s after {} loop(s)",
        handle.get_playback_position(),
        handle.get_loop_count()
    );

    output.stop()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_duration() {
        assert_eq!(playback_duration(None).unwrap(), None);
        assert_eq!(
            playback_duration(Some(1.5)).unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(playback_duration(Some(-2.0)).unwrap(), Some(Duration::ZERO));
    }

    #[test]
    fn test_playback_duration_rejects_non_finite() {
        assert!(playback_duration(Some(f64::INFINITY)).is_err());
        assert!(playback_duration(Some(f64::NAN)).is_err());
        assert!(playback_duration(Some(1e300)).is_err());
    }

    #[test]
    fn test_args_accept_infinite_duration_text() {
        let args = Args::try_parse_from(["ram-audio", "a.wav", "--duration", "inf"]).unwrap();
        assert!(playback_duration(args.duration).is_err());
    }
}
