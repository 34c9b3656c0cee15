//! Segmentation strategies for exercising the vectorized engine
//!
//! Each strategy cuts one buffer into at most `max_segments` consecutive
//! mutable segments that together cover the whole buffer.

use rand::Rng;

/// Small segments in realistic splits are `1..=SMALL_SEGMENT + 1` bytes
pub const SMALL_SEGMENT: usize = 512;

/// Medium segments in realistic splits are `SMALL_SEGMENT..=SMALL_SEGMENT + MEDIUM_SEGMENT` bytes
pub const MEDIUM_SEGMENT: usize = 2048;

/// Segments of uniformly random length, the last one taking the remainder.
pub fn random_split<'a, R: Rng + ?Sized>(
    buf: &'a mut [u8],
    max_segments: usize,
    rng: &mut R,
) -> Vec<&'a mut [u8]> {
    cut(buf, max_segments, |remaining| rng.gen_range(1..=remaining))
}

/// A mix of small and medium segments, as seen when a message is assembled
/// from headers and body parts.
pub fn realistic_split<'a, R: Rng + ?Sized>(
    buf: &'a mut [u8],
    max_segments: usize,
    rng: &mut R,
) -> Vec<&'a mut [u8]> {
    cut(buf, max_segments, |_| {
        if rng.gen_bool(0.5) {
            rng.gen_range(1..=SMALL_SEGMENT + 1)
        } else {
            rng.gen_range(SMALL_SEGMENT..=SMALL_SEGMENT + MEDIUM_SEGMENT)
        }
    })
}

/// Segments of exactly `constraint` bytes. A zero constraint yields empty
/// segments followed by one segment holding the whole buffer.
pub fn constrained_split(
    buf: &mut [u8],
    max_segments: usize,
    constraint: usize,
) -> Vec<&mut [u8]> {
    cut(buf, max_segments, |_| constraint)
}

fn cut<'a>(
    mut buf: &'a mut [u8],
    max_segments: usize,
    mut next_len: impl FnMut(usize) -> usize,
) -> Vec<&'a mut [u8]> {
    let max_segments = max_segments.max(1);
    let mut segments = Vec::new();

    while !buf.is_empty() && segments.len() + 1 < max_segments {
        let len = next_len(buf.len()).min(buf.len());
        let (head, tail) = std::mem::take(&mut buf).split_at_mut(len);
        segments.push(head);
        buf = tail;
    }
    if !buf.is_empty() {
        segments.push(buf);
    }

    segments
}
