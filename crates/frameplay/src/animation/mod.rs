pub mod clock;
pub mod compositor;
pub mod sequencer;
pub mod store;

use crate::media::decoder::{DecodeError, FrameDecoder};
use crate::media::types::{Frame, Repetitions};
use crate::settings::PlaybackSettings;
use clock::PlaybackClock;
use sequencer::FrameSequencer;
use store::FrameStore;

/// Errors that stop an animation, or prevent one from being built.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error("Decoding frame {index} failed: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },
    #[error("Failed to allocate {bytes} bytes for a frame buffer")]
    Allocation { bytes: usize },
    #[error("Animation has no frames")]
    EmptySequence,
}

/// Playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Not advancing. Initial state, and the state after `stop` or `reset`.
    Stopped,
    /// Advancing with each `update`.
    Running,
    /// All repetitions played, or a frame failed. Only `reset` leaves this.
    Finished,
}

/// Why a run of frame advances ended early.
enum Halt {
    Completed,
    Failed(AnimationError),
}

/// Plays an animated image: turns caller-supplied timestamps into frame
/// changes, decoding and compositing each frame as it comes due.
///
/// Driven from a single thread:
/// ```ignore
/// let mut anim = AnimatedImage::new(GifDecoder::open(path)?)?;
/// anim.start();
/// while let Some(wait_ms) = anim.update(now_ms()) {
///     draw(anim.active_frame());
///     sleep(wait_ms);
/// }
/// ```
pub struct AnimatedImage<D: FrameDecoder> {
    decoder: D,
    store: FrameStore,
    sequencer: FrameSequencer,
    clock: PlaybackClock,
    status: PlaybackStatus,
    /// Timestamp of the last update counted while running.
    now_ms: f64,
    /// Set by `stop`; the first update after resuming only re-anchors
    /// `now_ms`, so time spent stopped never advances frames.
    resync: bool,
    /// Sequence index of the frame on screen.
    frame_index: usize,
    repetitions: Repetitions,
    repetitions_completed: u32,
    last_error: Option<AnimationError>,
}

impl<D: FrameDecoder> AnimatedImage<D> {
    /// Build a player with default settings and decode the first frame.
    pub fn new(decoder: D) -> Result<Self, AnimationError> {
        Self::with_settings(decoder, &PlaybackSettings::default())
    }

    /// Build a player and decode the first frame, so the image is
    /// displayable before `start`. A first frame that fails to decode leaves
    /// the player finished; only empty media is an error.
    pub fn with_settings(decoder: D, settings: &PlaybackSettings) -> Result<Self, AnimationError> {
        let frame_count = decoder.frame_count();
        if frame_count == 0 {
            return Err(AnimationError::EmptySequence);
        }
        let (width, height) = decoder.dimensions();
        let repetitions = settings
            .repetitions
            .unwrap_or_else(|| decoder.repetition_count());

        let mut anim = Self {
            decoder,
            store: FrameStore::new(width, height),
            sequencer: FrameSequencer::new(frame_count),
            clock: PlaybackClock::new(settings.zero_duration_ms),
            status: PlaybackStatus::Stopped,
            now_ms: 0.0,
            resync: false,
            frame_index: 0,
            repetitions,
            repetitions_completed: 0,
            last_error: None,
        };
        anim.show_first_frame();

        log::info!(
            "Animation ready: {}x{}, {} frame{}, {:?}",
            width,
            height,
            frame_count,
            if frame_count == 1 { "" } else { "s" },
            repetitions
        );
        Ok(anim)
    }

    /// Start or resume. Has no effect once finished; `reset` first.
    pub fn start(&mut self) {
        if self.status == PlaybackStatus::Finished {
            return;
        }
        self.status = PlaybackStatus::Running;
    }

    /// Pause. Updates are ignored until the next `start`, and the first
    /// update after resuming counts from its own timestamp.
    pub fn stop(&mut self) {
        if self.status == PlaybackStatus::Running {
            self.status = PlaybackStatus::Stopped;
            self.resync = true;
        }
    }

    /// Rewind to frame 0 with the clock and repetition counter cleared.
    pub fn reset(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.now_ms = 0.0;
        self.resync = false;
        self.repetitions_completed = 0;
        self.last_error = None;
        self.show_first_frame();
    }

    pub fn is_running(&self) -> bool {
        self.status == PlaybackStatus::Running
    }

    pub fn is_finished(&self) -> bool {
        self.status == PlaybackStatus::Finished
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Change how many loops play before finishing. Loops already completed
    /// still count.
    pub fn set_repetition_count(&mut self, repetitions: Repetitions) {
        self.repetitions = repetitions;
    }

    pub fn repetition_count(&self) -> Repetitions {
        self.repetitions
    }

    pub fn repetitions_completed(&self) -> u32 {
        self.repetitions_completed
    }

    pub fn frame_count(&self) -> usize {
        self.sequencer.frame_count()
    }

    /// Index of the frame on screen, `None` if no frame ever decoded.
    pub fn current_index(&self) -> Option<usize> {
        self.store.active().index().map(|_| self.frame_index)
    }

    /// The frame to draw. Replaced by the next `update` that advances.
    pub fn active_frame(&self) -> &Frame {
        self.store.active()
    }

    /// Canvas size in pixels.
    pub fn bounds(&self) -> (u32, u32) {
        self.decoder.dimensions()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// The failure that finished the animation, if any.
    pub fn last_error(&self) -> Option<&AnimationError> {
        self.last_error.as_ref()
    }

    /// Advance playback to `now_ms`, decoding every frame whose turn came.
    ///
    /// Returns the milliseconds until the next frame is due, or `None` when
    /// the animation is not running after the call. Decode failures finish
    /// the animation instead of surfacing here.
    pub fn update(&mut self, now_ms: f64) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let delta_ms = if self.resync {
            self.resync = false;
            0.0
        } else {
            now_ms - self.now_ms
        };
        self.now_ms = now_ms;

        let Self {
            decoder,
            store,
            sequencer,
            clock,
            frame_index,
            repetitions,
            repetitions_completed,
            ..
        } = &mut *self;

        let mut halt = None;
        let crossed = clock.advance(delta_ms, || {
            let (next, wrapped) = sequencer.next_index(*frame_index);
            if wrapped {
                *repetitions_completed += 1;
                if repetitions.is_reached(*repetitions_completed) {
                    halt = Some(Halt::Completed);
                    return None;
                }
            }
            match decode_into(decoder, store, next) {
                Ok(duration_ms) => {
                    *frame_index = next;
                    Some(duration_ms)
                }
                Err(err) => {
                    halt = Some(Halt::Failed(err));
                    None
                }
            }
        });

        if crossed > 0 {
            log::debug!(
                "t={:.1}ms: crossed {} frame boundar{}, showing frame {}",
                now_ms,
                crossed,
                if crossed == 1 { "y" } else { "ies" },
                self.frame_index
            );
        }

        match halt {
            None => Some(self.clock.remaining_ms()),
            Some(Halt::Completed) => {
                log::info!(
                    "Animation finished after {} repetition{}",
                    self.repetitions_completed,
                    if self.repetitions_completed == 1 { "" } else { "s" }
                );
                self.status = PlaybackStatus::Finished;
                None
            }
            Some(Halt::Failed(err)) => {
                self.fail(err);
                None
            }
        }
    }

    fn show_first_frame(&mut self) {
        let (width, height) = self.decoder.dimensions();
        self.store.clear(width, height);
        self.frame_index = 0;
        match decode_into(&mut self.decoder, &mut self.store, 0) {
            Ok(duration_ms) => self.clock.start_frame(duration_ms),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: AnimationError) {
        log::warn!("Animation stopped: {err}");
        self.status = PlaybackStatus::Finished;
        self.last_error = Some(err);
    }
}

/// Decode `index` onto the base the compositor picks, then show it.
/// Returns the frame's declared duration.
fn decode_into<D: FrameDecoder>(
    decoder: &mut D,
    store: &mut FrameStore,
    index: usize,
) -> Result<f64, AnimationError> {
    let decoded = decoder
        .decode_frame(index, compositor::next_base(store))
        .map_err(|source| AnimationError::Decode { index, source })?;
    let duration_ms = decoded.duration_ms;
    compositor::present(store, Frame::from_decoded(decoded, index))?;
    Ok(duration_ms)
}
