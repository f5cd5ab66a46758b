//! Codebook dimensions and fixed-point weights

use crate::math::Word16;

/// Samples per subframe
pub const L_CODE: usize = 40;

/// Subframes per 20 ms frame
pub const NB_SUBFRAMES: usize = 4;

/// Largest pulse count of any mode
pub const MAX_PULSES: usize = 10;

/// Largest number of packed index words of any mode
pub const MAX_INDEX_WORDS: usize = 10;

/// Interleaved tracks used by the 2 to 4 and 10 pulse layouts
pub const NB_TRACK: usize = 5;

/// Interleaved tracks used by the 8 pulse layout
pub const NB_TRACK_MR102: usize = 4;

/// 1/2 in Q15
pub const INV_2: Word16 = 16384;
/// 1/4 in Q15
pub const INV_4: Word16 = 8192;
/// 1/8 in Q15
pub const INV_8: Word16 = 4096;
/// 1/16 in Q15
pub const INV_16: Word16 = 2048;
/// 1/32 in Q15
pub const INV_32: Word16 = 1024;
/// 1/64 in Q15
pub const INV_64: Word16 = 512;
/// 1/128 in Q15
pub const INV_128: Word16 = 256;

/// `1/5` in Q15, `mult(pos, INV_5) == pos / 5` for every position
pub const INV_5: Word16 = 6554;

/// 0.99 in Q15, headroom for the normalised impulse response
pub const RR_MARGIN: Word16 = 32440;

/// Sign word of a positive candidate position
pub const SIGN_POS: Word16 = 32767;

/// Sign word of a negative candidate position
pub const SIGN_NEG: Word16 = -32767;
