//! Pulse sign selection
//!
//! The sign of a pulse at each position is fixed before the search from the
//! sign of the correlation, and `dn` is folded to its magnitude. The plain
//! selector can also prune each track to its strongest positions; the
//! 10.2/12.2 kbit/s selector blends in the long-term prediction residual and
//! derives the anchor positions and track order for the pair search.

use super::constants::{L_CODE, NB_TRACK, SIGN_NEG, SIGN_POS};
use crate::math::*;
use tracing::trace;

/// Fixed signs and the pruned candidate magnitudes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignSelection {
    /// `+32767` or `-32767` per position
    pub sign: [Word16; L_CODE],
    /// Candidate magnitude per position, `-1` marks a pruned position
    pub dn2: [Word16; L_CODE],
}

impl SignSelection {
    /// Whether the search may place a pulse at `pos`
    pub fn is_candidate(&self, pos: usize) -> bool {
        self.dn2[pos] >= 0
    }
}

/// Anchor positions and track permutation for the 8 and 10 pulse search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSeeds {
    /// Position of the strongest combined correlation in each track
    pub pos_max: [usize; NB_TRACK],
    /// Track of every pulse slot; `ipos[0]` is the strongest track and the
    /// sequence repeats after `nb_track` entries
    pub ipos: [usize; 2 * NB_TRACK],
}

/// Fix signs from `dn` and keep the `keep` strongest of the 8 positions in
/// each of the 5 tracks
pub fn set_sign(dn: &mut [Word16; L_CODE], keep: usize) -> SignSelection {
    let mut sign = [0; L_CODE];
    let mut dn2 = [0; L_CODE];

    for i in 0..L_CODE {
        let mut val = dn[i];
        if val >= 0 {
            sign[i] = SIGN_POS;
        } else {
            sign[i] = SIGN_NEG;
            val = negate(val);
        }
        dn[i] = val;
        dn2[i] = val;
    }

    let positions_per_track = L_CODE / NB_TRACK;
    let removals = positions_per_track.saturating_sub(keep);

    // `pos` carries over between tracks when nothing is below the start value
    let mut pos = 0usize;
    for track in 0..NB_TRACK {
        for _ in 0..removals {
            let mut min: Word16 = 0x7fff;
            for j in (track..L_CODE).step_by(NB_TRACK) {
                if dn2[j] >= 0 && sub(dn2[j], min) < 0 {
                    min = dn2[j];
                    pos = j;
                }
            }
            dn2[pos] = -1;
        }
    }

    SignSelection { sign, dn2 }
}

/// Fix signs from a blend of `dn` and the residual `cn`
///
/// Both vectors are normalised by `1/sqrt(energy)` before they are added, so
/// neither dominates the decision. The blend magnitude also selects the
/// per-track anchor `pos_max` and the track ordering `ipos`.
pub fn set_sign12k2(
    dn: &mut [Word16; L_CODE],
    cn: &[Word16],
    nb_track: usize,
    step: usize,
) -> (SignSelection, TrackSeeds) {
    let k_cn = normalisation(cn);
    let k_dn = normalisation(&dn[..]);
    trace!(k_cn, k_dn, "sign blend factors");

    let mut sign = [0; L_CODE];
    let mut en = [0; L_CODE];

    for i in 0..L_CODE {
        let mut val = dn[i];
        let mut cor = round(l_shl(l_mac(l_mult(k_cn, cn[i]), k_dn, val), 10));

        if cor >= 0 {
            sign[i] = SIGN_POS;
        } else {
            sign[i] = SIGN_NEG;
            cor = negate(cor);
            val = negate(val);
        }
        dn[i] = val;
        en[i] = cor;
    }

    let mut pos_max = [0usize; NB_TRACK];
    let mut ipos = [0usize; 2 * NB_TRACK];
    let mut max_of_all: Word16 = -1;
    let mut pos = 0usize;

    for track in 0..nb_track {
        let mut max: Word16 = -1;
        for j in (track..L_CODE).step_by(step) {
            if sub(en[j], max) > 0 {
                max = en[j];
                pos = j;
            }
        }
        pos_max[track] = pos;

        if sub(max, max_of_all) > 0 {
            max_of_all = max;
            ipos[0] = track;
        }
    }

    let mut j = ipos[0];
    for i in 1..nb_track {
        j += 1;
        if j >= nb_track {
            j = 0;
        }
        ipos[i] = j;
        ipos[i + nb_track] = j;
    }
    ipos[nb_track] = ipos[0];

    (SignSelection { sign, dn2: en }, TrackSeeds { pos_max, ipos })
}

/// `1/sqrt(256 + sum v^2)` scaled to Q-format used by the blend
fn normalisation(v: &[Word16]) -> Word16 {
    let mut s: Word32 = 256;
    for &x in v.iter().take(L_CODE) {
        s = l_mac(s, x, x);
    }
    extract_h(l_shl(inv_sqrt(s), 5))
}
