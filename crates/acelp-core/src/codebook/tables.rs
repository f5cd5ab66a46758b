//! Read-only lookup tables shared by every search

use crate::math::Word16;

/// 3-bit Gray code applied to 17 and 35 bit position indices
pub const GRAY: [Word16; 8] = [0, 1, 3, 2, 6, 4, 5, 7];

/// Inverse of [`GRAY`]
pub const DGRAY: [Word16; 8] = [0, 1, 3, 2, 5, 6, 4, 7];

/// Track pairs of the 9-bit codebook
///
/// Indexed `[2 * subframe + pulse + 8 * table]`; the second table holds the
/// alternative track pair signalled by bit 6 of the position index.
pub const START_POS_9BIT: [usize; 16] = [0, 2, 0, 3, 0, 2, 0, 3, 1, 3, 2, 4, 1, 4, 1, 4];

/// Table bit of each track in the 9-bit codebook, `None` when the track is
/// unused in that subframe
pub const TRACK_TABLE_9BIT: [[Option<u8>; 5]; 4] = [
    [Some(0), Some(1), Some(0), Some(1), None],
    [Some(0), None, Some(1), Some(0), Some(1)],
    [Some(0), Some(1), Some(0), None, Some(1)],
    [Some(0), Some(1), None, Some(0), Some(1)],
];

/// Tracks of the first pulse in the 11-bit codebook
pub const START_POS1_11BIT: [usize; 2] = [1, 3];

/// Tracks of the second pulse in the 11-bit codebook
pub const START_POS2_11BIT: [usize; 4] = [0, 1, 2, 4];

/// Track pair searched by the 9-bit codebook for a subframe and start table
pub fn track_pair_9bit(subframe: usize, table: usize) -> (usize, usize) {
    let base = 2 * subframe + 8 * table;
    (START_POS_9BIT[base], START_POS_9BIT[base + 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_inverse() {
        for i in 0..8 {
            assert_eq!(DGRAY[GRAY[i] as usize], i as Word16);
        }
    }

    #[test]
    fn test_track_table_matches_start_positions() {
        for subframe in 0..4 {
            for table in 0..2 {
                let (t0, t1) = track_pair_9bit(subframe, table);
                assert_eq!(TRACK_TABLE_9BIT[subframe][t0], Some(table as u8));
                assert_eq!(TRACK_TABLE_9BIT[subframe][t1], Some(table as u8));
            }
        }
    }
}
