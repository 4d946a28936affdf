use super::AnimationError;
use crate::media::types::{Frame, byte_len};

/// The two frame buffers an animation needs: the frame on screen and the
/// snapshot a `RestorePrevious` frame rolls back to.
pub struct FrameStore {
    active: Frame,
    /// Only valid while the frame that filled it uses `RestorePrevious`.
    restore: Frame,
    /// Makes every copy report an allocation failure.
    #[cfg(test)]
    pub(crate) fail_copies: bool,
}

impl FrameStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            active: Frame::blank(width, height),
            restore: Frame::blank(0, 0),
            #[cfg(test)]
            fail_copies: false,
        }
    }

    pub fn active(&self) -> &Frame {
        &self.active
    }

    pub fn restore(&self) -> &Frame {
        &self.restore
    }

    /// Replace the active frame.
    pub fn swap_active(&mut self, frame: Frame) {
        self.active = frame;
    }

    /// Deep-copy the active frame into the restore slot.
    pub fn snapshot_to_restore(&mut self) -> Result<(), AnimationError> {
        self.check_copy(&self.active)?;
        self.active
            .copy_to(&mut self.restore)
            .map_err(|_| AnimationError::Allocation {
                bytes: byte_len(self.active.width(), self.active.height()),
            })
    }

    /// Deep-copy the restore slot back into the active frame.
    pub fn restore_from_snapshot(&mut self) -> Result<(), AnimationError> {
        self.check_copy(&self.restore)?;
        self.restore
            .copy_to(&mut self.active)
            .map_err(|_| AnimationError::Allocation {
                bytes: byte_len(self.restore.width(), self.restore.height()),
            })
    }

    #[cfg(test)]
    fn check_copy(&self, src: &Frame) -> Result<(), AnimationError> {
        if self.fail_copies {
            return Err(AnimationError::Allocation {
                bytes: byte_len(src.width(), src.height()),
            });
        }
        Ok(())
    }

    #[cfg(not(test))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    fn check_copy(&self, _src: &Frame) -> Result<(), AnimationError> {
        Ok(())
    }

    /// Back to a blank canvas, as before the first decode.
    pub fn clear(&mut self, width: u32, height: u32) {
        self.active = Frame::blank(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::types::{DecodedFrame, DisposalMethod};

    fn frame(fill: u8, index: usize, disposal: DisposalMethod) -> Frame {
        Frame::from_decoded(
            DecodedFrame {
                pixels: vec![fill; 4],
                width: 1,
                height: 1,
                disposal,
                duration_ms: 10.0,
            },
            index,
        )
    }

    #[test]
    fn starts_blank() {
        let store = FrameStore::new(2, 2);
        assert_eq!(store.active().dimensions(), (2, 2));
        assert_eq!(store.active().index(), None);
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let mut store = FrameStore::new(1, 1);
        store.swap_active(frame(7, 0, DisposalMethod::Keep));
        store.snapshot_to_restore().unwrap();

        store.swap_active(frame(9, 1, DisposalMethod::RestorePrevious));
        assert_eq!(store.active().pixels(), &[9; 4]);
        assert_eq!(store.restore().pixels(), &[7; 4]);

        store.restore_from_snapshot().unwrap();
        assert_eq!(store.active().pixels(), &[7; 4]);
        assert_eq!(store.active().index(), Some(0));
        // the snapshot survives a restore
        assert_eq!(store.restore().index(), Some(0));
    }

    #[test]
    fn failed_copy_leaves_slots_untouched() {
        let mut store = FrameStore::new(1, 1);
        store.swap_active(frame(7, 0, DisposalMethod::Keep));
        store.snapshot_to_restore().unwrap();
        store.swap_active(frame(9, 1, DisposalMethod::RestorePrevious));

        store.fail_copies = true;
        assert!(matches!(
            store.restore_from_snapshot(),
            Err(AnimationError::Allocation { bytes: 4 })
        ));
        assert!(store.snapshot_to_restore().is_err());
        assert_eq!(store.active().pixels(), &[9; 4]);
        assert_eq!(store.restore().pixels(), &[7; 4]);
    }

    #[test]
    fn clear_resets_active() {
        let mut store = FrameStore::new(1, 1);
        store.swap_active(frame(3, 4, DisposalMethod::Keep));
        store.clear(1, 1);
        assert_eq!(store.active().index(), None);
        assert_eq!(store.active().pixels(), &[0; 4]);
    }
}
