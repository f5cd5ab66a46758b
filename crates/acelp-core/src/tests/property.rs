//! Invariants of the search over arbitrary input

use super::utils::*;
use crate::codebook::constants::{L_CODE, SIGN_NEG, SIGN_POS};
use crate::codebook::{cor_h, ImpulseResponse};
use crate::math::clear_overflow;
use crate::types::{Mode, PackedIndices, SearchInput};
use crate::{pack, search_codebook, unpack};
use proptest::prelude::*;

fn samples(limit: i16) -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(-limit..=limit, L_CODE)
}

fn any_mode() -> impl Strategy<Value = Mode> {
    prop::sample::select(Mode::ALL.to_vec())
}

#[derive(Debug, Clone)]
struct Subframe {
    mode: Mode,
    x: Vec<i16>,
    h: Vec<i16>,
    res: Vec<i16>,
    subframe: usize,
    lag: i16,
    sharp: i16,
    gain: i16,
}

impl Subframe {
    fn input(&self) -> SearchInput<'_> {
        SearchInput::new(&self.x)
            .with_residual(&self.res)
            .with_subframe(self.subframe)
            .with_pitch(self.lag, self.sharp)
            .with_gain_pit(self.gain)
    }
}

prop_compose! {
    fn subframe()(
        mode in any_mode(),
        x in samples(12000),
        h in prop::collection::vec(any::<i16>(), L_CODE),
        res in samples(12000),
        subframe in 0usize..4,
        lag in 18i16..=143,
        sharp in 0i16..=13017,
        gain in 0i16..=4915,
    ) -> Subframe {
        Subframe { mode, x, h, res, subframe, lag, sharp, gain }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_autocorrelation_is_symmetric(
        h in prop::collection::vec(any::<i16>(), L_CODE),
        signs in prop::collection::vec(any::<bool>(), L_CODE),
    ) {
        let imp = ImpulseResponse::from_slice(&h).unwrap();
        let mut sign = [SIGN_POS; L_CODE];
        for (s, &negative) in sign.iter_mut().zip(&signs) {
            if negative {
                *s = SIGN_NEG;
            }
        }
        let rr = cor_h(&imp, &sign);
        clear_overflow();
        for i in 0..L_CODE {
            for j in 0..i {
                prop_assert_eq!(rr[i][j], rr[j][i]);
            }
        }
    }

    #[test]
    fn prop_search_output_is_legal(sf in subframe()) {
        let mut h = sf.h.clone();
        let out = search_codebook(sf.mode, &sf.input(), &mut h).unwrap();

        prop_assert_eq!(out.codevector.len(), sf.mode.pulses());
        prop_assert_eq!(out.indices.words().len(), sf.mode.index_words());
        prop_assert!(out.codevector.positions().iter().all(|&p| p < L_CODE));

        // the indices describe exactly the codevector that was built
        let decoded = unpack(&out.indices, sf.subframe).unwrap();
        prop_assert_eq!(decoded.canonical(), out.codevector.canonical());
        let repacked = pack(sf.mode, sf.subframe, &decoded).unwrap();
        prop_assert_eq!(repacked.words(), out.indices.words());
    }

    #[test]
    fn prop_search_is_idempotent(sf in subframe()) {
        let mut h1 = sf.h.clone();
        let mut h2 = sf.h.clone();
        let first = search_codebook(sf.mode, &sf.input(), &mut h1).unwrap();
        let second = search_codebook(sf.mode, &sf.input(), &mut h2).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(h1, h2);
    }

    #[test]
    fn prop_pack_round_trip(mode in any_mode(), subframe in 0usize..4, seed in any::<u64>()) {
        let mut rng = seeded(seed);
        let cv = random_codevector(mode, subframe, &mut rng);
        let packed = pack(mode, subframe, &cv).unwrap();
        let back = unpack(&packed, subframe).unwrap();
        prop_assert_eq!(back.canonical(), cv.canonical());
    }

    #[test]
    fn prop_unpack_never_panics(
        mode in any_mode(),
        subframe in 0usize..4,
        words in prop::collection::vec(any::<i16>(), 10),
    ) {
        let words = words[..mode.index_words()].to_vec();
        let packed = PackedIndices::new(mode, words).unwrap();
        if let Ok(cv) = unpack(&packed, subframe) {
            prop_assert_eq!(cv.len(), mode.pulses());
        }
    }
}
