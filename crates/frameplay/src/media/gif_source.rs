use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::decoder::{DecodeError, FrameDecoder};
use super::types::{DecodedFrame, DisposalMethod, Frame, Repetitions, byte_len};

/// One GIF image block: a sub-rectangle of the canvas.
struct GifFrame {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    disposal: DisposalMethod,
    delay_ms: f64,
}

/// Animated GIF source. The stream is sequential, so every image block is
/// read up front and composited on demand, which gives random access.
pub struct GifDecoder {
    width: u32,
    height: u32,
    frames: Vec<GifFrame>,
    repetitions: Repetitions,
}

impl GifDecoder {
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, DecodeError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut reader = options.read_info(input)?;

        let width = u32::from(reader.width());
        let height = u32::from(reader.height());

        let mut frames = Vec::new();
        while let Some(frame) = reader.read_next_frame()? {
            frames.push(GifFrame {
                left: u32::from(frame.left),
                top: u32::from(frame.top),
                width: u32::from(frame.width),
                height: u32::from(frame.height),
                rgba: frame.buffer.to_vec(),
                disposal: disposal_from_gif(frame.dispose),
                // GIF delay is in centiseconds
                delay_ms: f64::from(frame.delay) * 10.0,
            });
        }

        if frames.is_empty() {
            return Err(DecodeError::NoFrames);
        }

        // The loop extension counts repeats after the first play.
        let repetitions = match reader.repeat() {
            gif::Repeat::Infinite => Repetitions::Infinite,
            gif::Repeat::Finite(n) => Repetitions::Finite(u32::from(n) + 1),
        };

        log::debug!(
            "GIF stream: {}x{}, {} frames, {:?}",
            width,
            height,
            frames.len(),
            repetitions
        );

        Ok(Self {
            width,
            height,
            frames,
            repetitions,
        })
    }

    /// Starting canvas for `index`: the prior frame with its own disposal
    /// applied, or a transparent canvas when there is nothing to build on.
    fn base_canvas(&self, index: usize, prior: &Frame) -> Vec<u8> {
        let usable = index > 0 && prior.dimensions() == (self.width, self.height);
        let Some(prior_frame) = prior.index().filter(|_| usable).and_then(|i| self.frames.get(i))
        else {
            return vec![0; byte_len(self.width, self.height)];
        };

        let mut canvas = prior.pixels().to_vec();
        if prior_frame.disposal == DisposalMethod::RestoreBackground {
            self.clear_rect(&mut canvas, prior_frame);
        }
        canvas
    }

    fn clear_rect(&self, canvas: &mut [u8], frame: &GifFrame) {
        let x0 = frame.left.min(self.width);
        let x1 = (frame.left + frame.width).min(self.width);
        for y in frame.top..(frame.top + frame.height).min(self.height) {
            let row = y as usize * self.width as usize * 4;
            canvas[row + x0 as usize * 4..row + x1 as usize * 4].fill(0);
        }
    }

    /// Draw a frame onto the canvas at its offset. Transparent source pixels
    /// leave the canvas untouched.
    fn draw(&self, canvas: &mut [u8], frame: &GifFrame) {
        for y in 0..frame.height {
            for x in 0..frame.width {
                let dst_x = frame.left + x;
                let dst_y = frame.top + y;
                if dst_x >= self.width || dst_y >= self.height {
                    continue;
                }
                let src_idx = (y as usize * frame.width as usize + x as usize) * 4;
                let Some(src) = frame.rgba.get(src_idx..src_idx + 4) else {
                    continue;
                };
                if src[3] > 0 {
                    let dst_idx =
                        (dst_y as usize * self.width as usize + dst_x as usize) * 4;
                    canvas[dst_idx..dst_idx + 4].copy_from_slice(src);
                }
            }
        }
    }
}

impl FrameDecoder for GifDecoder {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn repetition_count(&self) -> Repetitions {
        self.repetitions
    }

    fn decode_frame(&mut self, index: usize, prior: &Frame) -> Result<DecodedFrame, DecodeError> {
        let frame = self.frames.get(index).ok_or(DecodeError::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })?;

        let mut canvas = self.base_canvas(index, prior);
        self.draw(&mut canvas, frame);

        Ok(DecodedFrame {
            pixels: canvas,
            width: self.width,
            height: self.height,
            disposal: frame.disposal,
            duration_ms: frame.delay_ms,
        })
    }
}

fn disposal_from_gif(method: gif::DisposalMethod) -> DisposalMethod {
    match method {
        gif::DisposalMethod::Any | gif::DisposalMethod::Keep => DisposalMethod::Keep,
        gif::DisposalMethod::Background => DisposalMethod::RestoreBackground,
        gif::DisposalMethod::Previous => DisposalMethod::RestorePrevious,
    }
}
