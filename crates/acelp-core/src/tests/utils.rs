//! Common test utilities

use crate::codebook::constants::{INV_2, INV_4, L_CODE, NB_TRACK, NB_TRACK_MR102};
use crate::codebook::tables::{track_pair_9bit, START_POS1_11BIT, START_POS2_11BIT};
use crate::codebook::Autocorrelation;
use crate::math::*;
use crate::types::{Codevector, Mode, Pulse, Sign};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Deterministic generator for sampled tests
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Impulse response of a damped resonance, `h[0] = 1.0` in Q12
pub fn damped_impulse(rng: &mut impl Rng) -> [Word16; L_CODE] {
    let r: f64 = rng.gen_range(0.70..0.93);
    let w: f64 = rng.gen_range(0.15..2.5);
    let mut h = [0; L_CODE];
    for (n, v) in h.iter_mut().enumerate() {
        let a = 4096.0 * r.powi(n as i32) * (w * n as f64).cos();
        *v = a.round() as Word16;
    }
    h
}

/// Speech-like target: a few strong excursions over low-level noise
pub fn random_target(rng: &mut impl Rng) -> [Word16; L_CODE] {
    let mut x = [0; L_CODE];
    for v in x.iter_mut() {
        *v = rng.gen_range(-400..=400);
    }
    for _ in 0..rng.gen_range(1..6) {
        let pos = rng.gen_range(0..L_CODE);
        x[pos] = rng.gen_range(-6000..=6000);
    }
    x
}

fn lcg(state: &mut u32) -> u32 {
    *state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    *state
}

/// Integer-only target for pinned outputs: noise in +-2000 plus three
/// excursions up to +-6000
pub fn fixture_target(seed: u32) -> [Word16; L_CODE] {
    let mut state = seed;
    let mut x = [0; L_CODE];
    for v in x.iter_mut() {
        *v = ((lcg(&mut state) >> 16) % 4001) as Word16 - 2000;
    }
    for _ in 0..3 {
        let pos = ((lcg(&mut state) >> 16) % L_CODE as u32) as usize;
        x[pos] = ((lcg(&mut state) >> 16) % 12001) as Word16 - 6000;
    }
    x
}

/// Integer-only impulse response of a two-pole resonance,
/// `h[n] = (a * h[n-1] - b * h[n-2]) >> 12` with `h[0] = 4096`
pub fn fixture_impulse(seed: u32) -> [Word16; L_CODE] {
    let mut state = seed ^ 0x5bd1_e995;
    let a = 3000 + ((lcg(&mut state) >> 16) % 3400) as i32;
    let b = 2400 + ((lcg(&mut state) >> 16) % 900) as i32;

    let mut h = [0 as Word16; L_CODE];
    h[0] = 4096;
    for n in 1..L_CODE {
        let h2 = if n >= 2 { h[n - 2] as i32 } else { 0 };
        let v = (a * h[n - 1] as i32 - b * h2) >> 12;
        h[n] = v.clamp(MIN_16 as i32, MAX_16 as i32) as Word16;
    }
    h
}

/// Unit pulse at `h[0]`
pub fn unit_impulse() -> [Word16; L_CODE] {
    let mut h = [0; L_CODE];
    h[0] = 4096;
    h
}

/// `(sq, alp)` of a two-pulse codevector, computed the way the search ranks
/// its candidates
pub fn pair_criterion(
    dn: &[Word16; L_CODE],
    rr: &Autocorrelation,
    a: usize,
    b: usize,
) -> (Word16, Word16) {
    let ps = add(dn[a], dn[b]);
    let mut alp = l_mult(rr[a][a], INV_4);
    alp = l_mac(alp, rr[b][b], INV_4);
    alp = l_mac(alp, rr[a][b], INV_2);
    (mult(ps, ps), round(alp))
}

/// Every legal position pair of the 2-pulse layouts
pub fn legal_pairs(mode: Mode, subframe: usize) -> Vec<(usize, usize)> {
    let mut track_pairs = Vec::new();
    match mode {
        Mode::MR475 | Mode::MR515 => {
            for table in 0..2 {
                track_pairs.push(track_pair_9bit(subframe, table));
            }
        }
        Mode::MR59 => {
            for &t0 in &START_POS1_11BIT {
                for &t1 in &START_POS2_11BIT {
                    track_pairs.push((t0, t1));
                }
            }
        }
        _ => panic!("{} is not a 2-pulse mode", mode),
    }

    let mut pairs = Vec::new();
    for (t0, t1) in track_pairs {
        for a in (t0..L_CODE).step_by(NB_TRACK) {
            for b in (t1..L_CODE).step_by(NB_TRACK) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

fn random_sign(rng: &mut impl Rng) -> Sign {
    if rng.gen_bool(0.5) {
        Sign::Positive
    } else {
        Sign::Negative
    }
}

fn on_track(rng: &mut impl Rng, track: usize, step: usize) -> usize {
    track + step * rng.gen_range(0..L_CODE / step)
}

/// Random codevector the layout of `mode` can represent
pub fn random_codevector(mode: Mode, subframe: usize, rng: &mut impl Rng) -> Codevector {
    let tracks: Vec<usize> = match mode {
        Mode::MR475 | Mode::MR515 => {
            let (t0, t1) = track_pair_9bit(subframe, rng.gen_range(0..2));
            vec![t0, t1]
        }
        Mode::MR59 => vec![
            *START_POS1_11BIT.choose(rng).unwrap(),
            *START_POS2_11BIT.choose(rng).unwrap(),
        ],
        Mode::MR67 => {
            let mut t = vec![0, *[1, 3].choose(rng).unwrap(), *[2, 4].choose(rng).unwrap()];
            t.shuffle(rng);
            t
        }
        Mode::MR74 | Mode::MR795 => {
            let mut t = vec![0, 1, 2, *[3, 4].choose(rng).unwrap()];
            t.shuffle(rng);
            t
        }
        Mode::MR102 | Mode::MR122 => {
            return random_paired(rng, if mode == Mode::MR102 { NB_TRACK_MR102 } else { NB_TRACK })
        }
    };

    let pulses = tracks
        .into_iter()
        .map(|t| Pulse::new(on_track(rng, t, NB_TRACK), random_sign(rng)))
        .collect();
    Codevector::new(pulses)
}

/// Two pulses per track; pulses sharing a position share a sign
fn random_paired(rng: &mut impl Rng, nb_track: usize) -> Codevector {
    let mut pulses = Vec::with_capacity(2 * nb_track);
    for track in 0..nb_track {
        let first = Pulse::new(on_track(rng, track, nb_track), random_sign(rng));
        let pos = on_track(rng, track, nb_track);
        let sign = if pos == first.position {
            first.sign
        } else {
            random_sign(rng)
        };
        pulses.push(first);
        pulses.push(Pulse::new(pos, sign));
    }
    pulses.shuffle(rng);
    Codevector::new(pulses)
}
