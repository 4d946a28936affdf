pub mod decoder;
pub mod gif_source;
pub mod types;

pub use decoder::{DecodeError, FrameDecoder, StillDecoder, load_media};
pub use gif_source::GifDecoder;
pub use types::{DecodedFrame, DisposalMethod, Frame, Repetitions};
