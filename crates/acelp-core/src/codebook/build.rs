//! Innovation vector and filtered innovation

use super::constants::L_CODE;
use super::impulse::ImpulseResponse;
use super::layout::Variant;
use crate::math::*;
use crate::types::{Codevector, Pulse, Sign};

/// Pulse amplitudes of a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Amplitudes {
    /// Added to `code` for a positive / negative pulse
    code: (Word16, Word16),
    /// Weight of the shifted impulse response in `y`
    filter: (Word16, Word16),
}

fn amplitudes(variant: Variant) -> Amplitudes {
    match variant {
        Variant::Pulses8Bits31 => Amplitudes {
            code: (8191, -8191),
            filter: (32767, -32768),
        },
        Variant::Pulses10Bits35 => Amplitudes {
            code: (4096, -4096),
            filter: (8192, -8192),
        },
        _ => Amplitudes {
            code: (8191, -8192),
            filter: (32767, -32768),
        },
    }
}

/// Innovation built from a winning codevector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCode {
    /// Sparse innovation vector (Q13, Q12 for 10 pulses)
    pub code: [Word16; L_CODE],
    /// `code` filtered through the impulse response
    pub filtered: [Word16; L_CODE],
    /// Signed pulses in slot order
    pub codevector: Codevector,
}

/// Place the pulses and filter them
///
/// The filtered innovation is the sum of the impulse response shifted to
/// every pulse position, accumulated in slot order:
/// `y[n] = round(sum_k h[n - pos_k] * s_k)`.
pub fn build_code(
    variant: Variant,
    positions: &[usize],
    sign: &[Word16; L_CODE],
    h: &ImpulseResponse,
) -> BuiltCode {
    let amp = amplitudes(variant);
    let mut code = [0 as Word16; L_CODE];
    let mut weights = Vec::with_capacity(positions.len());
    let mut pulses = Vec::with_capacity(positions.len());

    for &pos in positions {
        if sign[pos] > 0 {
            code[pos] = add(code[pos], amp.code.0);
            weights.push(amp.filter.0);
            pulses.push(Pulse::new(pos, Sign::Positive));
        } else {
            code[pos] = add(code[pos], amp.code.1);
            weights.push(amp.filter.1);
            pulses.push(Pulse::new(pos, Sign::Negative));
        }
    }

    let mut filtered = [0 as Word16; L_CODE];
    for (n, y) in filtered.iter_mut().enumerate() {
        let mut s: Word32 = 0;
        for (&pos, &w) in positions.iter().zip(&weights) {
            s = l_mac(s, h.shifted(pos)[n], w);
        }
        *y = round(s);
    }

    BuiltCode {
        code,
        filtered,
        codevector: Codevector::new(pulses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::constants::{SIGN_NEG, SIGN_POS};

    fn impulse() -> ImpulseResponse {
        let mut h = [0i16; L_CODE];
        h[0] = 4096;
        h[1] = -2048;
        h[2] = 1024;
        ImpulseResponse::from_slice(&h).unwrap()
    }

    #[test]
    fn test_two_pulse_code_and_filter() {
        let mut sign = [SIGN_POS; L_CODE];
        sign[12] = SIGN_NEG;

        let built = build_code(Variant::Pulses2Bits9, &[5, 12], &sign, &impulse());
        assert_eq!(built.code[5], 8191);
        assert_eq!(built.code[12], -8192);
        assert_eq!(built.code.iter().filter(|&&c| c != 0).count(), 2);

        // full-scale weights reproduce h in Q12
        assert_eq!(built.filtered[5], 4096);
        assert_eq!(built.filtered[6], -2048);
        assert_eq!(built.filtered[7], 1024);
        assert_eq!(built.filtered[12], -4096);
        assert_eq!(built.filtered[13], 2048);
        assert_eq!(built.filtered[4], 0);

        assert_eq!(built.codevector.pulses()[1], Pulse::new(12, Sign::Negative));
    }

    #[test]
    fn test_ten_pulse_same_position_accumulates() {
        let sign = [SIGN_POS; L_CODE];
        let positions = [3, 3, 1, 6, 2, 7, 4, 9, 0, 5];
        let built = build_code(Variant::Pulses10Bits35, &positions, &sign, &impulse());
        assert_eq!(built.code[3], 8192);
        assert_eq!(built.code[1], 4096);
        assert_eq!(built.codevector.len(), 10);
    }

    #[test]
    fn test_eight_pulse_amplitudes_are_symmetric() {
        let mut sign = [SIGN_NEG; L_CODE];
        sign[0] = SIGN_POS;
        let positions = [0, 1, 2, 3, 4, 5, 6, 7];
        let built = build_code(Variant::Pulses8Bits31, &positions, &sign, &impulse());
        assert_eq!(built.code[0], 8191);
        assert_eq!(built.code[1], -8191);
    }
}
