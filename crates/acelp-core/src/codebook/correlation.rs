//! Target/impulse-response correlation
//!
//! `dn[n] = sum_{i>=n} x[i] * h[i-n]` is computed in 32 bits for every
//! position and scaled by one common shift, chosen so that the per-track
//! maxima of `|dn|` sum without overflowing 16 bits.

use super::constants::L_CODE;
use super::impulse::ImpulseResponse;
use crate::math::*;
use tracing::trace;

/// Backward-filtered target `dn`
///
/// `sf` is 1 for the 2 to 4 pulse modes and 2 for the 8 and 10 pulse
/// modes, which sum more pulses and need the extra headroom.
pub fn cor_h_x(
    h: &ImpulseResponse,
    x: &[Word16],
    sf: Word16,
    nb_track: usize,
    step: usize,
) -> [Word16; L_CODE] {
    let h = h.as_slice();
    let mut y32 = [0 as Word32; L_CODE];
    let mut tot: Word32 = 5;

    for k in 0..nb_track {
        let mut max: Word32 = 0;
        for i in (k..L_CODE).step_by(step) {
            let mut s: Word32 = 0;
            for j in i..L_CODE {
                s = l_mac(s, x[j], h[j - i]);
            }
            y32[i] = s;

            let s = l_abs(s);
            if l_sub(s, max) > 0 {
                max = s;
            }
        }
        tot = l_add(tot, l_shr(max, 1));
    }

    let shift = sub(norm_l(tot), sf);
    trace!(tot, shift, "correlation scaling");

    let mut dn = [0; L_CODE];
    for (d, &y) in dn.iter_mut().zip(y32.iter()) {
        *d = round(l_shl(y, shift));
    }
    dn
}
