//! Zero-padded impulse response

use super::constants::L_CODE;
use crate::error::{CodebookError, Result};
use crate::math::{add, mult, Word16};

/// Impulse response of the weighted synthesis filter
///
/// Stored behind `L_CODE` leading zeros so that `h[n - pos]` with a negative
/// argument reads zero. [`ImpulseResponse::shifted`] exposes the response
/// delayed by a pulse position as a plain slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpulseResponse {
    buf: [Word16; 2 * L_CODE],
}

impl ImpulseResponse {
    /// Copy the first `L_CODE` samples of `h`
    pub fn from_slice(h: &[Word16]) -> Result<Self> {
        if h.len() < L_CODE {
            return Err(CodebookError::invalid_length("impulse response", L_CODE, h.len()));
        }
        let mut buf = [0; 2 * L_CODE];
        buf[L_CODE..].copy_from_slice(&h[..L_CODE]);
        Ok(Self { buf })
    }

    /// `h[0..L_CODE]`
    pub fn as_slice(&self) -> &[Word16] {
        &self.buf[L_CODE..]
    }

    /// `h[n - pos]` for `n` in `0..L_CODE`
    pub fn shifted(&self, pos: usize) -> &[Word16] {
        debug_assert!(pos < L_CODE);
        &self.buf[L_CODE - pos..2 * L_CODE - pos]
    }

    /// Add the pitch contribution `h[i] += h[i - lag] * factor`
    pub fn sharpen(&mut self, lag: usize, factor: Word16) {
        sharpen(&mut self.buf[L_CODE..], lag, factor);
    }

    /// Copy `h[0..L_CODE]` back into a caller buffer
    pub fn write_to(&self, h: &mut [Word16]) {
        let n = h.len().min(L_CODE);
        h[..n].copy_from_slice(&self.as_slice()[..n]);
    }
}

/// In-place pitch sharpening `v[i] += mult(v[i - lag], factor)` for
/// `i` in `lag..L_CODE`; a lag of `L_CODE` or more leaves `v` untouched
pub fn sharpen(v: &mut [Word16], lag: usize, factor: Word16) {
    for i in lag..v.len().min(L_CODE) {
        v[i] = add(v[i], mult(v[i - lag], factor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted_reads_zero_before_origin() {
        let mut h = [0i16; L_CODE];
        h[0] = 4096;
        h[1] = 2048;
        let imp = ImpulseResponse::from_slice(&h).unwrap();

        let s = imp.shifted(7);
        assert_eq!(s.len(), L_CODE);
        assert!(s[..7].iter().all(|&v| v == 0));
        assert_eq!(s[7], 4096);
        assert_eq!(s[8], 2048);
        assert_eq!(imp.shifted(0), &h[..]);
    }

    #[test]
    fn test_rejects_short_response() {
        assert!(ImpulseResponse::from_slice(&[0i16; 20]).is_err());
        assert!(ImpulseResponse::from_slice(&[0i16; 60]).is_ok());
    }

    #[test]
    fn test_sharpen() {
        let mut v = [0i16; L_CODE];
        v[0] = 8192;
        // factor 0.5 in Q15, lag 10: the echo itself echoes again
        sharpen(&mut v, 10, 16384);
        assert_eq!(v[10], 4096);
        assert_eq!(v[20], 2048);
        assert_eq!(v[30], 1024);
        assert_eq!(v[5], 0);

        let before = v;
        sharpen(&mut v, L_CODE, 16384);
        assert_eq!(v, before);
    }
}
