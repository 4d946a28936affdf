//! Disposal rules applied when the animation moves from one frame to the next.
//!
//! Decoders deliver frames already composited onto the base they are given,
//! so the work here is choosing that base and keeping the restore snapshot
//! in step with `RestorePrevious` frames.

use super::AnimationError;
use super::store::FrameStore;
use crate::media::types::{DisposalMethod, Frame};

/// The canvas the frame after the active one is composited onto.
///
/// Reading it does not mutate the store, so a failed decode leaves the
/// active frame exactly as it was.
pub fn next_base(store: &FrameStore) -> &Frame {
    match store.active().disposal() {
        DisposalMethod::RestorePrevious => store.restore(),
        DisposalMethod::Keep | DisposalMethod::RestoreBackground => store.active(),
    }
}

/// Retire the active frame according to its disposal method, then show `next`.
pub fn present(store: &mut FrameStore, next: Frame) -> Result<(), AnimationError> {
    let restored = match store.active().disposal() {
        DisposalMethod::RestorePrevious => {
            store.restore_from_snapshot()?;
            true
        }
        // Background clearing is done by the decoder on the base it receives.
        DisposalMethod::Keep | DisposalMethod::RestoreBackground => false,
    };

    // A restored snapshot already holds the pre-`next` state.
    if next.disposal() == DisposalMethod::RestorePrevious && !restored {
        store.snapshot_to_restore()?;
    }

    store.swap_active(next);
    Ok(())
}
