//! Shuffle selection
//!
//! Picks the next track uniformly at random, never the one that is
//! currently selected.

use rand::Rng;

/// Pick a uniformly random index in `0..len` other than `exclude`
///
/// Returns `None` when no such index exists (empty playlist, or a single
/// track that is the excluded one). An `exclude` outside the range excludes
/// nothing.
pub fn pick_other<R: Rng + ?Sized>(rng: &mut R, len: usize, exclude: Option<usize>) -> Option<usize> {
    match exclude {
        Some(excluded) if excluded < len => {
            if len < 2 {
                return None;
            }
            // Draw from the len - 1 remaining slots and step over the excluded one
            let idx = rng.gen_range(0..len - 1);
            Some(if idx >= excluded { idx + 1 } else { idx })
        }
        _ => pick_any(rng, len),
    }
}

/// Pick a uniformly random index in `0..len`
pub fn pick_any<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.gen_range(0..len))
    }
}
