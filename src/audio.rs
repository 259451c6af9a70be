//! Audio backend: one rodio sink on a dedicated thread, driven by commands and
//! reporting back through a player event channel

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub const DEFAULT_VOLUME_PERCENT: u8 = 80;
const TICK: Duration = Duration::from_millis(50);
const POSITION_REPORT_INTERVAL: Duration = Duration::from_millis(500);

static NEXT_LOAD_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one loaded track so late events about older tracks can be told apart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadId(u64);

impl LoadId {
    pub fn next() -> Self {
        LoadId(NEXT_LOAD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Events emitted by the audio thread
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Loading { id: LoadId },
    Playing { id: LoadId, position_ms: u32, duration_ms: u32 },
    Paused { id: LoadId, position_ms: u32 },
    PositionChanged { id: LoadId, position_ms: u32 },
    Ended { id: LoadId },
    Failed { id: LoadId, reason: String },
}

impl PlayerEvent {
    pub fn load_id(&self) -> LoadId {
        match self {
            PlayerEvent::Loading { id }
            | PlayerEvent::Playing { id, .. }
            | PlayerEvent::Paused { id, .. }
            | PlayerEvent::PositionChanged { id, .. }
            | PlayerEvent::Ended { id }
            | PlayerEvent::Failed { id, .. } => *id,
        }
    }
}

pub type PlayerEventChannel = UnboundedReceiver<PlayerEvent>;

enum BackendCommand {
    Load { id: LoadId, bytes: Vec<u8>, autoplay: bool },
    Play,
    Pause,
    Stop,
    SetVolume(u8),
    Shutdown,
}

/// Handle to the audio thread. Cheap to share behind a mutex; dropping it stops the thread.
pub struct AudioBackend {
    commands: Sender<BackendCommand>,
}

impl AudioBackend {
    /// Open the default output device. Blocks until the device is ready or has failed.
    pub fn new(events: UnboundedSender<PlayerEvent>, volume: u8) -> Result<Self> {
        let (commands, receiver) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        thread::Builder::new()
            .name("audio".to_string())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                stream.log_on_drop(false);
                let _ = ready_tx.send(Ok(()));
                run_audio_thread(stream, receiver, events, volume);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("Audio output opened");
                Ok(Self { commands })
            }
            Ok(Err(e)) => Err(anyhow!("could not open audio output: {}", e)),
            Err(_) => Err(anyhow!("audio thread exited during startup")),
        }
    }

    pub fn load(&self, id: LoadId, bytes: Vec<u8>, autoplay: bool) -> Result<()> {
        self.send(BackendCommand::Load { id, bytes, autoplay })
    }

    pub fn play(&self) -> Result<()> {
        self.send(BackendCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(BackendCommand::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(BackendCommand::Stop)
    }

    pub fn set_volume(&self, percent: u8) -> Result<()> {
        self.send(BackendCommand::SetVolume(percent))
    }

    fn send(&self, command: BackendCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("audio thread is not running"))
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        let _ = self.commands.send(BackendCommand::Shutdown);
    }
}

struct CurrentTrack {
    id: LoadId,
    sink: Sink,
    duration_ms: u32,
    playing: bool,
    last_report: Instant,
}

impl CurrentTrack {
    fn position_ms(&self) -> u32 {
        self.sink.get_pos().as_millis() as u32
    }
}

fn volume_factor(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

fn run_audio_thread(
    stream: OutputStream,
    commands: Receiver<BackendCommand>,
    events: UnboundedSender<PlayerEvent>,
    mut volume: u8,
) {
    let mut current: Option<CurrentTrack> = None;
    let emit = |event: PlayerEvent| {
        let _ = events.send(event);
    };

    loop {
        match commands.recv_timeout(TICK) {
            Ok(BackendCommand::Load { id, bytes, autoplay }) => {
                if let Some(old) = current.take() {
                    old.sink.stop();
                }
                emit(PlayerEvent::Loading { id });

                match Decoder::new(Cursor::new(bytes)) {
                    Ok(source) => {
                        let duration_ms = source
                            .total_duration()
                            .map(|d| d.as_millis() as u32)
                            .unwrap_or(0);
                        let sink = Sink::connect_new(stream.mixer());
                        sink.set_volume(volume_factor(volume));
                        sink.pause();
                        sink.append(source);
                        if autoplay {
                            sink.play();
                            emit(PlayerEvent::Playing { id, position_ms: 0, duration_ms });
                        }
                        tracing::debug!(?id, duration_ms, autoplay, "Track loaded");
                        current = Some(CurrentTrack {
                            id,
                            sink,
                            duration_ms,
                            playing: autoplay,
                            last_report: Instant::now(),
                        });
                    }
                    Err(e) => {
                        tracing::error!(?id, error = %e, "Could not decode audio");
                        emit(PlayerEvent::Failed { id, reason: e.to_string() });
                    }
                }
            }
            Ok(BackendCommand::Play) => {
                if let Some(track) = current.as_mut() {
                    if !track.playing {
                        track.sink.play();
                        track.playing = true;
                        emit(PlayerEvent::Playing {
                            id: track.id,
                            position_ms: track.position_ms(),
                            duration_ms: track.duration_ms,
                        });
                    }
                }
            }
            Ok(BackendCommand::Pause) => {
                if let Some(track) = current.as_mut() {
                    if track.playing {
                        track.sink.pause();
                        track.playing = false;
                        emit(PlayerEvent::Paused {
                            id: track.id,
                            position_ms: track.position_ms(),
                        });
                    }
                }
            }
            Ok(BackendCommand::Stop) => {
                if let Some(track) = current.take() {
                    track.sink.stop();
                }
            }
            Ok(BackendCommand::SetVolume(percent)) => {
                volume = percent;
                if let Some(track) = current.as_ref() {
                    track.sink.set_volume(volume_factor(volume));
                }
            }
            Ok(BackendCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let finished = match current.as_mut() {
            Some(track) if track.playing && track.sink.empty() => Some(track.id),
            Some(track) if track.playing => {
                if track.last_report.elapsed() >= POSITION_REPORT_INTERVAL {
                    track.last_report = Instant::now();
                    emit(PlayerEvent::PositionChanged {
                        id: track.id,
                        position_ms: track.position_ms(),
                    });
                }
                None
            }
            _ => None,
        };
        if let Some(id) = finished {
            current = None;
            emit(PlayerEvent::Ended { id });
        }
    }

    tracing::debug!("Audio thread shutting down");
}
