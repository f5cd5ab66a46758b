//! Pulse/track layouts of the six codebooks
//!
//! | Variant   | Modes        | Pulses | Tracks used                | Bits |
//! |-----------|--------------|--------|----------------------------|------|
//! | 2 pulses  | MR475, MR515 | 2      | subframe-dependent pairs   | 9    |
//! | 2 pulses  | MR59         | 2      | {1,3} x {0,1,2,4}          | 11   |
//! | 3 pulses  | MR67         | 3      | 0, {1,3}, {2,4}            | 14   |
//! | 4 pulses  | MR74, MR795  | 4      | 0, 1, 2, {3,4}             | 17   |
//! | 8 pulses  | MR102        | 8      | 4 tracks, 2 pulses each    | 31   |
//! | 10 pulses | MR122        | 10     | 5 tracks, 2 pulses each    | 35   |

use super::constants::*;
use super::search::{CrossOrder, Entry, Head, PairWeights, SearchPlan, Stage, TrackOrder};
use super::sign::TrackSeeds;
use super::tables::track_pair_9bit;
use crate::math::Word16;
use once_cell::sync::Lazy;
use std::fmt;

/// Codebook layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 2 pulses, 9 bits, track pair depends on the subframe
    Pulses2Bits9,
    /// 2 pulses, 11 bits
    Pulses2Bits11,
    /// 3 pulses, 14 bits
    Pulses3Bits14,
    /// 4 pulses, 17 bits
    Pulses4Bits17,
    /// 8 pulses, 31 bits
    Pulses8Bits31,
    /// 10 pulses, 35 bits
    Pulses10Bits35,
}

const PLAN_2_PULSES: SearchPlan = SearchPlan {
    head: Head::Scan { self_weight: INV_4 },
    stages: &[Stage::single(Entry::Head, INV_4, INV_2)],
    cross_order: CrossOrder::LatestFirst,
    step: NB_TRACK,
};

const PLAN_3_PULSES: SearchPlan = SearchPlan {
    head: Head::Scan { self_weight: INV_4 },
    stages: &[
        Stage::single(Entry::Head, INV_4, INV_2),
        Stage::single(Entry::Scaled(INV_4), INV_16, INV_8),
    ],
    cross_order: CrossOrder::LatestFirst,
    step: NB_TRACK,
};

const PLAN_4_PULSES: SearchPlan = SearchPlan {
    head: Head::Scan { self_weight: INV_4 },
    stages: &[
        Stage::single(Entry::Head, INV_4, INV_2),
        Stage::single(Entry::Scaled(INV_4), INV_16, INV_8),
        Stage::single(Entry::Deposit, INV_16, INV_8),
    ],
    cross_order: CrossOrder::LatestFirst,
    step: NB_TRACK,
};

const SECOND_OF_PAIR_1: PairWeights = PairWeights {
    self_weight: INV_8,
    cross_weight: INV_4,
    weight: INV_2,
};

const SECOND_OF_PAIR_2: PairWeights = PairWeights {
    self_weight: INV_8,
    cross_weight: INV_4,
    weight: INV_4,
};

const SECOND_OF_PAIR_3: PairWeights = PairWeights {
    self_weight: INV_4,
    cross_weight: INV_2,
    weight: INV_16,
};

const SECOND_OF_PAIR_4: PairWeights = PairWeights {
    self_weight: INV_4,
    cross_weight: INV_2,
    weight: INV_64,
};

const PLAN_8_PULSES: SearchPlan = SearchPlan {
    head: Head::Anchored {
        self_weight: INV_16,
        cross_weight: INV_8,
    },
    stages: &[
        Stage::pair(Entry::Head, INV_16, INV_8, SECOND_OF_PAIR_1),
        Stage::pair(Entry::Scaled(INV_2), INV_32, INV_16, SECOND_OF_PAIR_2),
        Stage::pair(Entry::Scaled(INV_2), INV_64, INV_32, SECOND_OF_PAIR_3),
    ],
    cross_order: CrossOrder::EarliestFirst,
    step: NB_TRACK_MR102,
};

const PLAN_10_PULSES: SearchPlan = SearchPlan {
    head: Head::Anchored {
        self_weight: INV_16,
        cross_weight: INV_8,
    },
    stages: &[
        Stage::pair(Entry::Head, INV_16, INV_8, SECOND_OF_PAIR_1),
        Stage::pair(Entry::Scaled(INV_2), INV_32, INV_16, SECOND_OF_PAIR_2),
        Stage::pair(Entry::Scaled(INV_2), INV_64, INV_32, SECOND_OF_PAIR_3),
        Stage::pair(Entry::Scaled(INV_2), INV_128, INV_64, SECOND_OF_PAIR_4),
    ],
    cross_order: CrossOrder::EarliestFirst,
    step: NB_TRACK,
};

fn order_of(tracks: &[usize]) -> TrackOrder {
    let mut order = [0; MAX_PULSES];
    order[..tracks.len()].copy_from_slice(tracks);
    order
}

/// Every right rotation of `tracks`, starting with `tracks` itself
fn rotations(tracks: &[usize]) -> Vec<TrackOrder> {
    let mut current = tracks.to_vec();
    let mut orders = Vec::with_capacity(tracks.len());
    for _ in 0..tracks.len() {
        orders.push(order_of(&current));
        current.rotate_right(1);
    }
    orders
}

/// Track orders of the 9-bit codebook, one list per subframe
static ORDERS_9BIT: Lazy<[Vec<TrackOrder>; NB_SUBFRAMES]> = Lazy::new(|| {
    std::array::from_fn(|subframe| {
        (0..2)
            .map(|table| {
                let (t0, t1) = track_pair_9bit(subframe, table);
                order_of(&[t0, t1])
            })
            .collect()
    })
});

static ORDERS_11BIT: Lazy<Vec<TrackOrder>> = Lazy::new(|| {
    let mut orders = Vec::with_capacity(8);
    for &t0 in &super::tables::START_POS1_11BIT {
        for &t1 in &super::tables::START_POS2_11BIT {
            orders.push(order_of(&[t0, t1]));
        }
    }
    orders
});

static ORDERS_14BIT: Lazy<Vec<TrackOrder>> = Lazy::new(|| {
    let mut orders = Vec::with_capacity(12);
    for t1 in [1, 3] {
        for t2 in [2, 4] {
            orders.extend(rotations(&[0, t1, t2]));
        }
    }
    orders
});

static ORDERS_17BIT: Lazy<Vec<TrackOrder>> = Lazy::new(|| {
    let mut orders = Vec::with_capacity(8);
    for t3 in [3, 4] {
        orders.extend(rotations(&[0, 1, 2, t3]));
    }
    orders
});

impl Variant {
    /// Number of pulses
    pub fn pulses(self) -> usize {
        match self {
            Self::Pulses2Bits9 | Self::Pulses2Bits11 => 2,
            Self::Pulses3Bits14 => 3,
            Self::Pulses4Bits17 => 4,
            Self::Pulses8Bits31 => 8,
            Self::Pulses10Bits35 => 10,
        }
    }

    /// Codebook bits per subframe
    pub fn bits(self) -> u32 {
        match self {
            Self::Pulses2Bits9 => 9,
            Self::Pulses2Bits11 => 11,
            Self::Pulses3Bits14 => 14,
            Self::Pulses4Bits17 => 17,
            Self::Pulses8Bits31 => 31,
            Self::Pulses10Bits35 => 35,
        }
    }

    /// Packed index words per subframe
    pub fn index_words(self) -> usize {
        match self {
            Self::Pulses8Bits31 => 7,
            Self::Pulses10Bits35 => 10,
            _ => 2,
        }
    }

    /// Number of interleaved tracks
    pub fn nb_track(self) -> usize {
        match self {
            Self::Pulses8Bits31 => NB_TRACK_MR102,
            _ => NB_TRACK,
        }
    }

    /// Distance between the positions of one track
    pub fn step(self) -> usize {
        self.nb_track()
    }

    /// Correlation headroom passed to `cor_h_x`
    pub fn correlation_shift(self) -> Word16 {
        match self {
            Self::Pulses8Bits31 | Self::Pulses10Bits35 => 2,
            _ => 1,
        }
    }

    /// Positions kept per track by the sign selector; the 8 and 10 pulse
    /// layouts use the residual-blended selector and prune nothing
    pub fn kept_per_track(self) -> usize {
        match self {
            Self::Pulses3Bits14 => 6,
            Self::Pulses4Bits17 => 4,
            _ => L_CODE / NB_TRACK,
        }
    }

    /// Whether the residual-blended sign selector is used
    pub fn blends_residual(self) -> bool {
        matches!(self, Self::Pulses8Bits31 | Self::Pulses10Bits35)
    }

    /// Search plan
    pub fn plan(self) -> &'static SearchPlan {
        match self {
            Self::Pulses2Bits9 | Self::Pulses2Bits11 => &PLAN_2_PULSES,
            Self::Pulses3Bits14 => &PLAN_3_PULSES,
            Self::Pulses4Bits17 => &PLAN_4_PULSES,
            Self::Pulses8Bits31 => &PLAN_8_PULSES,
            Self::Pulses10Bits35 => &PLAN_10_PULSES,
        }
    }

    /// Track orders tried by the search
    ///
    /// The 8 and 10 pulse orders start from `seeds.ipos` and rotate every
    /// slot after the first one `nb_track - 1` times; the others are fixed.
    pub fn orders(self, subframe: usize, seeds: Option<&TrackSeeds>) -> Vec<TrackOrder> {
        match self {
            Self::Pulses2Bits9 => ORDERS_9BIT[subframe.min(NB_SUBFRAMES - 1)].clone(),
            Self::Pulses2Bits11 => ORDERS_11BIT.clone(),
            Self::Pulses3Bits14 => ORDERS_14BIT.clone(),
            Self::Pulses4Bits17 => ORDERS_17BIT.clone(),
            Self::Pulses8Bits31 | Self::Pulses10Bits35 => {
                let pulses = self.pulses();
                let mut ipos = [0; MAX_PULSES];
                match seeds {
                    Some(seeds) => ipos[..pulses].copy_from_slice(&seeds.ipos[..pulses]),
                    None => {
                        for (slot, t) in ipos[..pulses].iter_mut().enumerate() {
                            *t = slot % self.nb_track();
                        }
                    }
                }

                let mut orders = Vec::with_capacity(self.nb_track() - 1);
                for _ in 1..self.nb_track() {
                    orders.push(ipos);
                    ipos[1..pulses].rotate_left(1);
                }
                orders
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pulses/{} bits", self.pulses(), self.bits())
    }
}
