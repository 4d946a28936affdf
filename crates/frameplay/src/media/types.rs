use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

/// What happens to a frame's pixels when the animation moves past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    /// Leave the frame in place; the next frame draws over it.
    #[default]
    Keep,
    /// Clear the frame's region to the background before the next frame.
    RestoreBackground,
    /// Roll back to the canvas as it was before this frame was drawn.
    RestorePrevious,
}

/// How many times the frame sequence plays before the animation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repetitions {
    Infinite,
    /// Finish once this many loops have completed. `Finite(0)` behaves like
    /// `Finite(1)`: every frame is shown once.
    Finite(u32),
}

impl Repetitions {
    /// Whether `completed` loops satisfy this count.
    pub fn is_reached(self, completed: u32) -> bool {
        match self {
            Repetitions::Infinite => false,
            Repetitions::Finite(n) => completed >= n.max(1),
        }
    }
}

/// A frame as delivered by a decoder, before it enters the frame store.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub pixels: Vec<u8>, // RGBA8
    pub width: u32,
    pub height: u32,
    pub disposal: DisposalMethod,
    /// Declared display time. Zero or negative means "as short as possible".
    pub duration_ms: f64,
}

/// A composited, displayable frame held by one of the frame store slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    index: Option<usize>,
    disposal: DisposalMethod,
}

impl Frame {
    /// A fully transparent canvas with no frame index.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; byte_len(width, height)],
            width,
            height,
            index: None,
            disposal: DisposalMethod::Keep,
        }
    }

    pub fn from_decoded(decoded: DecodedFrame, index: usize) -> Self {
        Self {
            pixels: decoded.pixels,
            width: decoded.width,
            height: decoded.height,
            index: Some(index),
            disposal: decoded.disposal,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Index of the sequence frame this buffer shows, `None` before any decode.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn disposal(&self) -> DisposalMethod {
        self.disposal
    }

    /// RGBA of one pixel, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Deep-copy into `dst`, reusing its allocation when large enough.
    /// On allocation failure `dst` is left untouched.
    pub fn copy_to(&self, dst: &mut Frame) -> Result<(), TryReserveError> {
        let additional = self.pixels.len().saturating_sub(dst.pixels.len());
        dst.pixels.try_reserve_exact(additional)?;
        dst.pixels.clear();
        dst.pixels.extend_from_slice(&self.pixels);
        dst.width = self.width;
        dst.height = self.height;
        dst.index = self.index;
        dst.disposal = self.disposal;
        Ok(())
    }
}

/// Size in bytes of an RGBA8 buffer.
pub fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_frame_is_transparent_and_unindexed() {
        let f = Frame::blank(2, 3);
        assert_eq!(f.pixels().len(), 24);
        assert!(f.pixels().iter().all(|&b| b == 0));
        assert_eq!(f.index(), None);
        assert_eq!(f.disposal(), DisposalMethod::Keep);
    }

    #[test]
    fn copy_to_resizes_destination() {
        let src = Frame::from_decoded(
            DecodedFrame {
                pixels: vec![9; 16],
                width: 2,
                height: 2,
                disposal: DisposalMethod::RestorePrevious,
                duration_ms: 40.0,
            },
            3,
        );
        let mut dst = Frame::blank(5, 5);
        src.copy_to(&mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn pixel_lookup_bounds() {
        let mut f = Frame::blank(2, 1);
        f.pixels[4..8].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(f.pixel(1, 0), Some([1, 2, 3, 4]));
        assert_eq!(f.pixel(2, 0), None);
        assert_eq!(f.pixel(0, 1), None);
    }

    #[test]
    fn repetitions_reached() {
        assert!(!Repetitions::Infinite.is_reached(u32::MAX));
        assert!(!Repetitions::Finite(2).is_reached(1));
        assert!(Repetitions::Finite(2).is_reached(2));
        assert!(!Repetitions::Finite(0).is_reached(0));
        assert!(Repetitions::Finite(0).is_reached(1));
    }
}
