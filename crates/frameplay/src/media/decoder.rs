use std::path::Path;

use super::gif_source::GifDecoder;
use super::types::{DecodedFrame, DisposalMethod, Frame, Repetitions};

/// Errors produced while reading or decoding media.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GIF decode failed: {0}")]
    Gif(#[from] gif::DecodingError),
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Frame {index} out of range ({count} frames)")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("Media has no frames")]
    NoFrames,
}

/// Random-access source of frames for an animation.
///
/// `decode_frame` receives the canvas the new frame is composited onto. It
/// is already disposed according to the frame store's rules, so decoders
/// that produce whole frames can ignore it.
pub trait FrameDecoder {
    fn frame_count(&self) -> usize;

    /// Canvas size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Repetition count declared by the encoded data.
    fn repetition_count(&self) -> Repetitions;

    fn decode_frame(&mut self, index: usize, prior: &Frame) -> Result<DecodedFrame, DecodeError>;
}

impl<T: FrameDecoder + ?Sized> FrameDecoder for Box<T> {
    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn repetition_count(&self) -> Repetitions {
        (**self).repetition_count()
    }

    fn decode_frame(&mut self, index: usize, prior: &Frame) -> Result<DecodedFrame, DecodeError> {
        (**self).decode_frame(index, prior)
    }
}

/// A single still image, played as a one-frame animation.
pub struct StillDecoder {
    data: Vec<u8>, // RGBA8
    width: u32,
    height: u32,
}

impl StillDecoder {
    /// Load a static image (PNG, JPEG, etc.) via the `image` crate.
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let img = image::open(path)?;
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }
}

impl FrameDecoder for StillDecoder {
    fn frame_count(&self) -> usize {
        1
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn repetition_count(&self) -> Repetitions {
        Repetitions::Finite(1)
    }

    fn decode_frame(&mut self, index: usize, _prior: &Frame) -> Result<DecodedFrame, DecodeError> {
        if index != 0 {
            return Err(DecodeError::FrameOutOfRange { index, count: 1 });
        }
        Ok(DecodedFrame {
            pixels: self.data.clone(),
            width: self.width,
            height: self.height,
            disposal: DisposalMethod::Keep,
            duration_ms: 0.0,
        })
    }
}

/// Open an image or animated GIF from a file path.
pub fn load_media(path: &Path) -> Result<Box<dyn FrameDecoder>, DecodeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let decoder: Box<dyn FrameDecoder> = if ext == "gif" {
        Box::new(GifDecoder::open(path)?)
    } else {
        Box::new(StillDecoder::open(path)?)
    };

    let (w, h) = decoder.dimensions();
    let frames = decoder.frame_count();
    log::info!(
        "Loaded {}: {}x{}, {} frame{}",
        path.display(),
        w,
        h,
        frames,
        if frames == 1 { "" } else { "s" }
    );
    Ok(decoder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_decoder_yields_one_keep_frame() {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([10, 20, 30, 255]),
        ));
        let mut dec = StillDecoder::from_image(&img);
        assert_eq!(dec.frame_count(), 1);
        assert_eq!(dec.dimensions(), (3, 2));
        assert_eq!(dec.repetition_count(), Repetitions::Finite(1));

        let frame = dec.decode_frame(0, &Frame::blank(3, 2)).unwrap();
        assert_eq!(frame.disposal, DisposalMethod::Keep);
        assert_eq!(frame.pixels.len(), 24);
        assert_eq!(&frame.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn still_decoder_rejects_other_indices() {
        let img = image::DynamicImage::new_rgba8(1, 1);
        let mut dec = StillDecoder::from_image(&img);
        let err = dec.decode_frame(1, &Frame::blank(1, 1)).unwrap_err();
        assert!(matches!(err, DecodeError::FrameOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn load_media_reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let dec = load_media(&path).unwrap();
        assert_eq!(dec.frame_count(), 1);
        assert_eq!(dec.dimensions(), (4, 4));
    }

    #[test]
    fn load_media_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_media(&dir.path().join("absent.gif")).is_err());
    }
}
