//! Scatter/gather walker over message segments

use std::ops::DerefMut;

use zeroize::Zeroize;

use crate::{CryptoError, CryptoResult, BLOCK_SIZE, MAX_MESSAGE_LEN};

/// Presents a list of mutable segments as one logical byte stream.
///
/// Each step hands out a mutable run of the stream:
/// - whole keystream blocks that lie inside one segment are handed out
///   in place, as many as the segment holds;
/// - the final short block is handed out in place when one segment holds it;
/// - a block that straddles segments is gathered into a one-block carry
///   buffer, handed out, then scattered back to its segments.
///
/// Every run except the last starts and ends on a block boundary, so the
/// walk never copies more than one block at a time. Empty segments are
/// skipped.
pub struct SegmentWalker<'a, S> {
    segments: &'a mut [S],
    index: usize,
    offset: usize,
    position: u64,
    total: u64,
    carry: [u8; BLOCK_SIZE],
}

impl<'a, S: DerefMut<Target = [u8]>> SegmentWalker<'a, S> {
    /// Wrap `segments`, rejecting lists longer than the keystream can cover.
    pub fn new(segments: &'a mut [S]) -> CryptoResult<Self> {
        let total = message_len(segments.iter().map(|s| s.len() as u64))?;

        Ok(Self {
            segments,
            index: 0,
            offset: 0,
            position: 0,
            total,
            carry: [0u8; BLOCK_SIZE],
        })
    }

    /// Number of segments, including empty ones
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Logical message length
    pub fn total_len(&self) -> u64 {
        self.total
    }

    /// Logical offset of the next byte to be handed out
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes not yet handed out
    pub fn remaining(&self) -> u64 {
        self.total - self.position
    }

    /// Return to the start of the message
    pub fn rewind(&mut self) {
        self.index = 0;
        self.offset = 0;
        self.position = 0;
    }

    /// Hand the next run of the stream to `f`, or return `None` once the
    /// message is exhausted.
    pub fn next_block<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        self.skip_exhausted();
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }

        let available = self.segments[self.index].len() - self.offset;
        let result = if available >= BLOCK_SIZE {
            self.direct(available - available % BLOCK_SIZE, f)
        } else if available as u64 == remaining {
            self.direct(available, f)
        } else {
            self.stitched(f)
        };
        Some(result)
    }

    /// Walk the rest of the message, stopping at the first error.
    pub fn try_for_each_block<E>(
        &mut self,
        mut f: impl FnMut(&mut [u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        while let Some(result) = self.next_block(&mut f) {
            result?;
        }
        Ok(())
    }

    fn skip_exhausted(&mut self) {
        while self.index < self.segments.len() && self.offset == self.segments[self.index].len() {
            self.index += 1;
            self.offset = 0;
        }
    }

    fn direct<R>(&mut self, len: usize, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let start = self.offset;
        self.offset += len;
        self.position += len as u64;

        let segment: &mut [u8] = &mut self.segments[self.index];
        f(&mut segment[start..start + len])
    }

    fn stitched<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let want = self.remaining().min(BLOCK_SIZE as u64) as usize;
        let (first_index, first_offset) = (self.index, self.offset);

        let mut filled = 0;
        while filled < want {
            self.skip_exhausted();
            let segment: &[u8] = &self.segments[self.index];
            let take = (segment.len() - self.offset).min(want - filled);
            self.carry[filled..filled + take]
                .copy_from_slice(&segment[self.offset..self.offset + take]);
            filled += take;
            self.offset += take;
        }
        self.position += want as u64;

        let result = f(&mut self.carry[..want]);

        let (mut index, mut offset, mut written) = (first_index, first_offset, 0);
        while written < want {
            let segment: &mut [u8] = &mut self.segments[index];
            let take = (segment.len() - offset).min(want - written);
            segment[offset..offset + take].copy_from_slice(&self.carry[written..written + take]);
            written += take;
            index += 1;
            offset = 0;
        }

        result
    }
}

/// Sum segment lengths, rejecting totals past [`MAX_MESSAGE_LEN`].
fn message_len(lens: impl Iterator<Item = u64>) -> CryptoResult<u64> {
    let mut total: u64 = 0;
    for len in lens {
        total = total.checked_add(len).ok_or(CryptoError::MalformedSegmentList {
            reason: "total length overflows",
        })?;
    }
    if total > MAX_MESSAGE_LEN {
        return Err(CryptoError::MalformedSegmentList {
            reason: "message exceeds keystream range",
        });
    }
    Ok(total)
}

impl<S> Drop for SegmentWalker<'_, S> {
    fn drop(&mut self) {
        self.carry.zeroize();
    }
}
