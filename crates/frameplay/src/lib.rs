//! Playback and frame compositing for animated images.
//!
//! [`AnimatedImage`] turns timestamps into frame changes for any
//! [`FrameDecoder`], applying GIF-style disposal between frames. Decoders for
//! animated GIFs and still images live in [`media`].

pub mod animation;
pub mod media;
pub mod settings;

pub use animation::{AnimatedImage, AnimationError, PlaybackStatus};
pub use media::{
    DecodeError, DecodedFrame, DisposalMethod, Frame, FrameDecoder, GifDecoder, Repetitions,
    StillDecoder, load_media,
};
pub use settings::PlaybackSettings;
