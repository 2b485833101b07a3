//! `rodio`-backed endpoint.
//!
//! Each loaded source gets a fresh paused `Sink` on the default output
//! stream. Sources are wrapped in a `SampleTap` once an analyser has been
//! connected, so the spectrum view sees exactly what is being played.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use log::debug;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{EndpointError, GraphError};

use super::analyser::{Analyser, SampleTap, TapGraph};
use super::endpoint::{Endpoint, Listeners, RoutingGraph, Subscription, SubscriptionId};
use super::types::EndpointEvent;

/// Map a track URL to a local path. Only `file://` URLs and bare paths are playable.
pub(crate) fn resolve_path(url: &str) -> Result<PathBuf, EndpointError> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(EndpointError::UnsupportedUrl(url.to_string()));
    }
    Ok(PathBuf::from(url))
}

/// Create a paused `Sink` for `path`, returning the decoder's total duration when known.
fn create_sink(
    stream: &OutputStream,
    path: &Path,
    analyser: Option<Analyser>,
) -> Result<(Sink, Option<Duration>), EndpointError> {
    let file = File::open(path).map_err(|source| EndpointError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| EndpointError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(SampleTap::new(decoder, analyser));
    sink.pause();
    Ok((sink, total))
}

/// Tag-derived duration for formats whose decoder cannot tell.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
}

pub struct RodioEndpoint {
    stream: OutputStream,
    sink: Option<Sink>,
    source: Option<String>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    volume: f32,
    ended: bool,
    last_position: Duration,
    analyser: Option<Analyser>,
    listeners: Listeners,
}

impl RodioEndpoint {
    /// Open the default output device.
    pub fn open() -> Result<Self, EndpointError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            source: None,
            path: None,
            duration: None,
            volume: 1.0,
            ended: false,
            last_position: Duration::ZERO,
            analyser: None,
            listeners: Listeners::default(),
        })
    }

    /// Rebuild the sink for the loaded file, positioned at `position` and paused.
    fn restart_at(&mut self, position: Duration) -> Result<(), EndpointError> {
        let Some(path) = self.path.clone() else {
            return Err(EndpointError::NoSource);
        };

        let (sink, _) = create_sink(&self.stream, &path, self.analyser.clone())?;
        sink.set_volume(self.volume);
        if !position.is_zero() {
            sink.try_seek(position)?;
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.ended = false;
        self.last_position = position;
        Ok(())
    }
}

impl Endpoint for RodioEndpoint {
    fn subscribe(&mut self) -> Subscription {
        self.listeners.subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn load(&mut self, url: &str) -> Result<(), EndpointError> {
        let path = resolve_path(url)?;
        let (sink, total) = create_sink(&self.stream, &path, self.analyser.clone())?;
        sink.set_volume(self.volume);

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        if let Some(analyser) = &self.analyser {
            analyser.clear();
        }

        self.duration = total
            .or_else(|| probe_duration(&path))
            .filter(|d| !d.is_zero());
        self.source = Some(url.to_string());
        self.path = Some(path);
        self.ended = false;
        self.last_position = Duration::ZERO;
        debug!("endpoint loaded {url} (duration {:?})", self.duration);

        if let Some(duration) = self.duration {
            self.listeners.emit(EndpointEvent::LoadedMetadata { duration });
        }
        self.listeners.emit(EndpointEvent::TimeUpdate {
            position: Duration::ZERO,
        });
        Ok(())
    }

    fn clear_source(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.source = None;
        self.path = None;
        self.duration = None;
        self.ended = false;
        self.last_position = Duration::ZERO;
    }

    fn play(&mut self) -> Result<(), EndpointError> {
        if self.path.is_none() {
            return Err(EndpointError::NoSource);
        }
        // Like a media element, playing an ended source starts it over.
        if self.ended {
            self.restart_at(Duration::ZERO)?;
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn current_time(&self) -> Duration {
        if self.ended {
            return self.last_position;
        }
        self.sink
            .as_ref()
            .map(|s| s.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    fn set_current_time(&mut self, position: Duration) -> Result<(), EndpointError> {
        if self.ended {
            self.restart_at(position)?;
        } else {
            let Some(sink) = &self.sink else {
                return Err(EndpointError::NoSource);
            };
            sink.try_seek(position)?;
            self.last_position = position;
        }
        self.listeners.emit(EndpointEvent::TimeUpdate { position });
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn poll(&mut self) {
        if self.ended {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };

        if sink.empty() {
            self.ended = true;
            self.last_position = self.duration.unwrap_or(self.last_position);
            self.listeners.emit(EndpointEvent::Ended);
            return;
        }

        let position = sink.get_pos();
        if position != self.last_position {
            self.last_position = position;
            self.listeners.emit(EndpointEvent::TimeUpdate { position });
        }
    }

    fn connect_analyser(&mut self, fft_size: usize) -> Result<Box<dyn RoutingGraph>, GraphError> {
        let analyser = Analyser::new(fft_size)?;
        self.analyser = Some(analyser.clone());
        Ok(Box::new(TapGraph::new(analyser)))
    }
}

impl Drop for RodioEndpoint {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_accepts_file_urls_and_bare_paths() {
        assert_eq!(
            resolve_path("file:///music/a.mp3").unwrap(),
            PathBuf::from("/music/a.mp3")
        );
        assert_eq!(
            resolve_path("/music/b.flac").unwrap(),
            PathBuf::from("/music/b.flac")
        );
        assert_eq!(
            resolve_path("relative/c.ogg").unwrap(),
            PathBuf::from("relative/c.ogg")
        );
    }

    #[test]
    fn resolve_path_rejects_remote_schemes() {
        assert!(matches!(
            resolve_path("https://example.com/a.mp3"),
            Err(EndpointError::UnsupportedUrl(_))
        ));
    }
}
