use super::{AudioConfig, AudioEngine, PlaybackStatus};
use crate::error::{ShellError, ShellResult};
use anyhow::Result;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

type FileDecoder = Decoder<BufReader<File>>;

/// rodio-backed engine. One sink per loaded track; the sink is rebuilt from
/// the file whenever playback has to start over (stop, natural end, loop).
pub struct RodioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Duration,
    status: PlaybackStatus,
    config: AudioConfig,
    looping: bool,
    // set when the sink drained on its own; offset then reads as the full length when known
    ended: bool,
}

impl RodioEngine {
    pub fn new(config: AudioConfig) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            path: None,
            duration: Duration::ZERO,
            status: PlaybackStatus::Stopped,
            config,
            looping: false,
            ended: false,
        })
    }

    fn decode(path: &Path) -> ShellResult<FileDecoder> {
        if !path.exists() {
            return Err(ShellError::PathNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Decoder::new(BufReader::new(file)).map_err(|e| {
            debug!("Decoder rejected {}: {}", path.display(), e);
            ShellError::UnsupportedFormat(display_name(path))
        })
    }

    /// Build a paused sink holding a fresh decoder for the current path.
    fn rearm(&mut self) -> ShellResult<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let source = Self::decode(&path)?;
        let sink = Sink::try_new(&self.stream_handle).map_err(|e| {
            warn!("Could not create audio sink: {}", e);
            ShellError::UnsupportedFormat(display_name(&path))
        })?;
        sink.pause();
        sink.set_volume(self.config.volume / 100.0);
        sink.append(source);

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.ended = false;
        Ok(())
    }

    fn sink_drained(&self) -> bool {
        self.sink.as_ref().map(|sink| sink.empty()).unwrap_or(true)
    }

    fn ensure_armed(&mut self) {
        if self.sink_drained() {
            if let Err(e) = self.rearm() {
                warn!("Could not reload track: {}", e);
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

impl AudioEngine for RodioEngine {
    fn open(&mut self, path: &Path) -> ShellResult<()> {
        // decode before touching the current track so a bad file leaves it playing
        let source = Self::decode(path)?;
        let duration = match source.total_duration() {
            Some(d) => d,
            None => self.probe_duration(path).unwrap_or(Duration::ZERO),
        };
        drop(source);

        self.stop();
        self.path = Some(path.to_path_buf());
        self.duration = duration;
        self.rearm()?;
        debug!("Opened {} ({}s)", path.display(), duration.as_secs());
        Ok(())
    }

    fn play(&mut self) {
        self.ensure_armed();
        if let Some(sink) = &self.sink {
            sink.play();
            self.status = PlaybackStatus::Playing;
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.status = PlaybackStatus::Paused;
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.status = PlaybackStatus::Stopped;
        self.ended = false;
    }

    fn set_volume(&mut self, percent: f32) {
        self.config.volume = percent.clamp(0.0, 100.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.config.volume / 100.0);
        }
    }

    fn volume(&self) -> f32 {
        self.config.volume
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn playing_offset(&self) -> Duration {
        if self.ended && !self.duration.is_zero() {
            return self.duration;
        }
        self.sink.as_ref().map(|sink| sink.get_pos()).unwrap_or_default()
    }

    fn set_playing_offset(&mut self, offset: Duration) {
        self.ensure_armed();
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(offset) {
                warn!("Seek to {}s failed: {}", offset.as_secs(), e);
            }
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn status(&mut self) -> PlaybackStatus {
        if self.status == PlaybackStatus::Playing && self.sink_drained() {
            if self.looping {
                self.play();
            } else {
                self.status = PlaybackStatus::Stopped;
                self.ended = true;
            }
        }
        self.status
    }

    fn probe_duration(&self, path: &Path) -> ShellResult<Duration> {
        let source = Self::decode(path)?;
        if let Some(duration) = source.total_duration() {
            return Ok(duration);
        }

        #[cfg(feature = "probe")]
        {
            if let Ok(duration) = probe_duration_with_symphonia(path) {
                return Ok(duration);
            }
        }

        Err(ShellError::UnsupportedFormat(display_name(path)))
    }
}

/// Feature-gated duration probing using symphonia codec
#[cfg(feature = "probe")]
fn probe_duration_with_symphonia(path: &Path) -> Result<Duration> {
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow::anyhow!("No supported audio tracks found"))?;

    // Calculate duration from time base and frame count
    if let (Some(time_base), Some(n_frames)) = (track.codec_params.time_base, track.codec_params.n_frames) {
        let time = time_base.calc_time(n_frames);
        return Ok(Duration::from_secs_f64(time.seconds as f64 + time.frac));
    }

    Err(anyhow::anyhow!("Could not determine duration from file"))
}
