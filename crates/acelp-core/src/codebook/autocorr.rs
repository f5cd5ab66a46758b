//! Signed autocorrelation matrix of the impulse response

use super::constants::{L_CODE, RR_MARGIN};
use super::impulse::ImpulseResponse;
use crate::math::*;
use tracing::trace;

/// `rr[i][j] = sign[i] * sign[j] * sum_{n>=max(i,j)} h2[n-i] * h2[n-j]`
pub type Autocorrelation = [[Word16; L_CODE]; L_CODE];

/// Build the signed autocorrelation matrix
///
/// `h` is first scaled to unit energy with a 1% margin (`h2`); when its
/// energy saturates the accumulator it is halved instead. Each diagonal is
/// accumulated from the tail of the response towards position 0, and the
/// two off-diagonal bands receive the same word, so the matrix is exactly
/// symmetric.
pub fn cor_h(h: &ImpulseResponse, sign: &[Word16; L_CODE]) -> Autocorrelation {
    let h = h.as_slice();
    let mut h2 = [0 as Word16; L_CODE];

    let mut s: Word32 = 2;
    for &v in h {
        s = l_mac(s, v, v);
    }

    if extract_h(s) == MAX_16 {
        trace!("impulse response energy saturated, halving");
        for (d, &v) in h2.iter_mut().zip(h) {
            *d = shr(v, 1);
        }
    } else {
        let k = extract_h(l_shl(inv_sqrt(l_shr(s, 1)), 7));
        let k = mult(k, RR_MARGIN);
        trace!(energy = s, k, "impulse response normalisation");
        for (d, &v) in h2.iter_mut().zip(h) {
            *d = round(l_shl(l_mult(v, k), 9));
        }
    }

    let mut rr = [[0 as Word16; L_CODE]; L_CODE];

    let mut s: Word32 = 0;
    for k in 0..L_CODE {
        let i = L_CODE - 1 - k;
        s = l_mac(s, h2[k], h2[k]);
        rr[i][i] = round(s);
    }

    for dec in 1..L_CODE {
        let mut s: Word32 = 0;
        for k in 0..L_CODE - dec {
            let j = L_CODE - 1 - k;
            let i = j - dec;
            s = l_mac(s, h2[k], h2[k + dec]);
            let v = mult(round(s), mult(sign[i], sign[j]));
            rr[j][i] = v;
            rr[i][j] = v;
        }
    }

    rr
}
