/// Frame ordering for a looping sequence.
#[derive(Debug, Clone, Copy)]
pub struct FrameSequencer {
    frame_count: usize,
}

impl FrameSequencer {
    /// `frame_count` must be at least 1; the controller rejects empty media.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count: frame_count.max(1),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The frame after `current`, and whether the sequence wrapped to 0.
    pub fn next_index(&self, current: usize) -> (usize, bool) {
        let next = (current + 1) % self.frame_count;
        (next, next == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_forward() {
        let seq = FrameSequencer::new(3);
        assert_eq!(seq.next_index(0), (1, false));
        assert_eq!(seq.next_index(1), (2, false));
    }

    #[test]
    fn wraps_after_last_frame() {
        let seq = FrameSequencer::new(3);
        assert_eq!(seq.next_index(2), (0, true));
    }

    #[test]
    fn single_frame_always_wraps() {
        let seq = FrameSequencer::new(1);
        assert_eq!(seq.next_index(0), (0, true));
    }
}
