//! Greedy pulse search shared by every codebook layout
//!
//! A layout is described by a [`SearchPlan`]: how the first pulse(s) are
//! placed, followed by a list of stages that each add one pulse or a pair of
//! pulses to the best partial codevector of the previous stage. Partial
//! correlation `ps` and energy `alp` are carried between stages, so every
//! candidate costs one `dn` lookup and one `rr` row walk. Pair stages walk
//! the row once per second-pulse position and round it to 16 bits before
//! the inner loop; that rounding can change the winner.
//!
//! Candidates are ranked by `ps^2 / alp` without a division: `a` beats `b`
//! when `sq_a * alp_b - sq_b * alp_a > 0`. The shift schedule of each stage
//! (its self and cross weights) keeps every accumulator inside 32 bits and
//! is part of the bit-exact contract.

use super::autocorr::Autocorrelation;
use super::constants::{L_CODE, MAX_PULSES, NB_TRACK};
use crate::math::*;
use tracing::trace;

/// Track of every pulse slot, in search order
pub type TrackOrder = [usize; MAX_PULSES];

/// Placement of the leading pulse(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    /// Try every unpruned position of the first slot's track
    Scan {
        /// Weight of `rr[i0][i0]`
        self_weight: Word16,
    },
    /// Fix the first two slots at the strongest position of their tracks
    Anchored {
        /// Weight of `rr[i0][i0]` and `rr[i1][i1]`
        self_weight: Word16,
        /// Weight of `rr[i0][i1]`
        cross_weight: Word16,
    },
}

/// How a stage picks up the energy of the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Continue from the head's 32-bit partial energy
    Head,
    /// `l_mult(alp, w)`: the stage works at a smaller scale
    Scaled(Word16),
    /// `l_deposit_h(alp)`: the stage keeps the previous scale
    Deposit,
}

/// Weights of the second pulse of a pair
///
/// Before the nested loops, the energy of every candidate of the second
/// track with the pulses already placed is rounded to one word,
/// `rrv[j] = round(rr[j][j] * self_weight + sum_p rr[p][j] * cross_weight)`,
/// and enters the pair energy as `rrv[j] * weight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairWeights {
    /// Weight of `rr[j][j]` in `rrv[j]`
    pub self_weight: Word16,
    /// Weight of `rr[p][j]` in `rrv[j]`
    pub cross_weight: Word16,
    /// Weight of `rrv[j]` in the pair energy
    pub weight: Word16,
}

/// Pulses added by one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// One pulse, one loop
    Single,
    /// Two pulses, nested loops
    Pair(PairWeights),
}

/// One step of the greedy search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Pulses added
    pub kind: StageKind,
    /// Energy rescaling on entry
    pub entry: Entry,
    /// Weight of the new pulse's own energy
    pub self_weight: Word16,
    /// Weight of its cross terms with every placed pulse
    pub cross_weight: Word16,
}

impl Stage {
    /// Single-pulse stage
    pub const fn single(entry: Entry, self_weight: Word16, cross_weight: Word16) -> Self {
        Self {
            kind: StageKind::Single,
            entry,
            self_weight,
            cross_weight,
        }
    }

    /// Pulse-pair stage; `self_weight` and `cross_weight` apply to the
    /// first pulse and to the cross term between the two
    pub const fn pair(
        entry: Entry,
        self_weight: Word16,
        cross_weight: Word16,
        second: PairWeights,
    ) -> Self {
        Self {
            kind: StageKind::Pair(second),
            entry,
            self_weight,
            cross_weight,
        }
    }

    fn pulses(&self) -> usize {
        match self.kind {
            StageKind::Single => 1,
            StageKind::Pair(_) => 2,
        }
    }
}

/// Order in which cross terms with placed pulses are accumulated
///
/// Saturation makes `l_mac` order dependent, so the order is fixed per
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossOrder {
    /// Most recently placed pulse first
    LatestFirst,
    /// First placed pulse first
    EarliestFirst,
}

/// Complete description of a layout's search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPlan {
    /// Leading pulse placement
    pub head: Head,
    /// Remaining stages in order
    pub stages: &'static [Stage],
    /// Cross-term accumulation order
    pub cross_order: CrossOrder,
    /// Distance between positions of one track
    pub step: usize,
}

impl SearchPlan {
    /// Total pulses placed by the plan
    pub fn pulses(&self) -> usize {
        let head = match self.head {
            Head::Scan { .. } => 1,
            Head::Anchored { .. } => 2,
        };
        head + self.stages.iter().map(Stage::pulses).sum::<usize>()
    }
}

/// Per-subframe inputs of the search
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    /// Sign-folded correlation
    pub dn: &'a [Word16; L_CODE],
    /// Candidate magnitudes, negative where pruned
    pub dn2: &'a [Word16; L_CODE],
    /// Signed autocorrelation
    pub rr: &'a Autocorrelation,
    /// Strongest position of each track, used by [`Head::Anchored`]
    pub pos_max: Option<&'a [usize; NB_TRACK]>,
}

/// Winning codevector and its criterion terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Position of every pulse slot
    pub positions: [usize; MAX_PULSES],
    /// Number of pulses
    pub len: usize,
    /// `ps^2` of the winner, `-1` when no candidate was accepted
    pub sq: Word16,
    /// `alp` of the winner
    pub alp: Word16,
}

impl SearchResult {
    /// Chosen positions in slot order
    pub fn positions(&self) -> &[usize] {
        &self.positions[..self.len]
    }
}

/// Best candidate of one stage
#[derive(Debug, Clone, Copy)]
struct Best {
    sq: Word16,
    alp: Word16,
    ps: Word16,
}

impl Best {
    fn new() -> Self {
        Self { sq: -1, alp: 1, ps: 0 }
    }

    /// Keep `(ps1, alp1)` if it beats the current best
    fn offer(&mut self, ps1: Word16, alp1: Word32) -> bool {
        let sq1 = mult(ps1, ps1);
        let alp_16 = round(alp1);
        if l_msu(l_mult(self.alp, sq1), self.sq, alp_16) > 0 {
            self.sq = sq1;
            self.ps = ps1;
            self.alp = alp_16;
            true
        } else {
            false
        }
    }
}

fn track(start: usize, step: usize) -> impl Iterator<Item = usize> {
    (start..L_CODE).step_by(step)
}

struct Searcher<'a> {
    plan: &'a SearchPlan,
    ctx: SearchContext<'a>,
}

impl Searcher<'_> {
    fn anchor(&self, track: usize) -> usize {
        self.ctx.pos_max.map_or(track, |p| p[track])
    }

    fn cross(&self, mut alp: Word32, placed: &[usize], pos: usize, weight: Word16) -> Word32 {
        let rr = self.ctx.rr;
        match self.plan.cross_order {
            CrossOrder::EarliestFirst => {
                for &p in placed {
                    alp = l_mac(alp, rr[p][pos], weight);
                }
            }
            CrossOrder::LatestFirst => {
                for &p in placed.iter().rev() {
                    alp = l_mac(alp, rr[p][pos], weight);
                }
            }
        }
        alp
    }

    /// Run every stage after the head; returns the last stage's best
    fn stages(
        &self,
        order: &TrackOrder,
        placed: &mut [usize; MAX_PULSES],
        mut filled: usize,
        ps_head: Word16,
        alp_head: Word32,
    ) -> Best {
        let (dn, rr, step) = (self.ctx.dn, self.ctx.rr, self.plan.step);
        let mut last = Best::new();

        for stage in self.plan.stages {
            let (ps0, alp0) = match stage.entry {
                Entry::Head => (ps_head, alp_head),
                Entry::Scaled(w) => (last.ps, l_mult(last.alp, w)),
                Entry::Deposit => (last.ps, l_deposit_h(last.alp)),
            };
            let (sw, cw) = (stage.self_weight, stage.cross_weight);
            let mut best = Best::new();

            match stage.kind {
                StageKind::Single => {
                    let mut ix = order[filled];
                    for i in track(order[filled], step) {
                        let ps1 = add(ps0, dn[i]);
                        let alp1 = self.cross(l_mac(alp0, rr[i][i], sw), &placed[..filled], i, cw);
                        if best.offer(ps1, alp1) {
                            ix = i;
                        }
                    }
                    placed[filled] = ix;
                }
                StageKind::Pair(second) => {
                    let mut rrv = [0 as Word16; L_CODE];
                    for j in track(order[filled + 1], step) {
                        let s = l_mult(rr[j][j], second.self_weight);
                        let s = self.cross(s, &placed[..filled], j, second.cross_weight);
                        rrv[j] = round(s);
                    }

                    let (mut ia, mut ib) = (order[filled], order[filled + 1]);
                    for i in track(order[filled], step) {
                        let ps1 = add(ps0, dn[i]);
                        let alp1 = self.cross(l_mac(alp0, rr[i][i], sw), &placed[..filled], i, cw);

                        for j in track(order[filled + 1], step) {
                            let ps2 = add(ps1, dn[j]);
                            let alp2 = l_mac(alp1, rrv[j], second.weight);
                            let alp2 = l_mac(alp2, rr[i][j], cw);
                            if best.offer(ps2, alp2) {
                                ia = i;
                                ib = j;
                            }
                        }
                    }
                    placed[filled] = ia;
                    placed[filled + 1] = ib;
                }
            }

            filled += stage.pulses();
            last = best;
        }

        last
    }

    fn default_positions(&self, order: &TrackOrder) -> [usize; MAX_PULSES] {
        let mut positions = *order;
        if let Head::Anchored { .. } = self.plan.head {
            positions[0] = self.anchor(order[0]);
            positions[1] = self.anchor(order[1]);
        }
        positions
    }
}

/// Search the codevector maximising `ps^2 / alp` over the given track orders
///
/// Without any accepted candidate (all-zero impulse response) the result is
/// the first order's starting positions, which are always legal.
pub fn search(plan: &SearchPlan, ctx: SearchContext<'_>, orders: &[TrackOrder]) -> SearchResult {
    let len = plan.pulses();
    let searcher = Searcher { plan, ctx };
    let (dn, dn2, rr) = (ctx.dn, ctx.dn2, ctx.rr);

    let mut psk: Word16 = -1;
    let mut alpk: Word16 = 1;
    let mut codvec = orders
        .first()
        .map_or([0; MAX_PULSES], |order| searcher.default_positions(order));

    let mut keep = |last: Best, placed: &[usize; MAX_PULSES]| {
        if l_msu(l_mult(alpk, last.sq), psk, last.alp) > 0 {
            psk = last.sq;
            alpk = last.alp;
            codvec = *placed;
        }
    };

    for order in orders {
        let mut placed = [0usize; MAX_PULSES];
        match plan.head {
            Head::Scan { self_weight } => {
                for i0 in track(order[0], plan.step) {
                    if dn2[i0] < 0 {
                        continue;
                    }
                    placed[0] = i0;
                    let alp0 = l_mult(rr[i0][i0], self_weight);
                    let last = searcher.stages(order, &mut placed, 1, dn[i0], alp0);
                    keep(last, &placed);
                }
            }
            Head::Anchored {
                self_weight,
                cross_weight,
            } => {
                let i0 = searcher.anchor(order[0]);
                let i1 = searcher.anchor(order[1]);
                if dn2[i0] < 0 {
                    continue;
                }
                placed[0] = i0;
                placed[1] = i1;
                let ps0 = add(dn[i0], dn[i1]);
                let mut alp0 = l_mult(rr[i0][i0], self_weight);
                alp0 = l_mac(alp0, rr[i1][i1], self_weight);
                alp0 = l_mac(alp0, rr[i0][i1], cross_weight);
                let last = searcher.stages(order, &mut placed, 2, ps0, alp0);
                keep(last, &placed);
            }
        }
    }

    trace!(sq = psk, alp = alpk, positions = ?&codvec[..len], "search finished");

    SearchResult {
        positions: codvec,
        len,
        sq: psk,
        alp: alpk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::constants::{INV_2, INV_4};

    const PLAN: SearchPlan = SearchPlan {
        head: Head::Scan { self_weight: INV_4 },
        stages: &[Stage::single(Entry::Head, INV_4, INV_2)],
        cross_order: CrossOrder::LatestFirst,
        step: 5,
    };

    fn diagonal_rr(value: Word16) -> Autocorrelation {
        let mut rr = [[0; L_CODE]; L_CODE];
        for (i, row) in rr.iter_mut().enumerate() {
            row[i] = value;
        }
        rr
    }

    fn order(tracks: &[usize]) -> TrackOrder {
        let mut o = [0; MAX_PULSES];
        o[..tracks.len()].copy_from_slice(tracks);
        o
    }

    #[test]
    fn test_plan_pulse_count() {
        assert_eq!(PLAN.pulses(), 2);
    }

    #[test]
    fn test_picks_strongest_positions() {
        let mut dn = [0; L_CODE];
        dn[15] = 9000;
        dn[22] = 4000;
        dn[7] = 100;
        let dn2 = dn;
        let rr = diagonal_rr(16000);
        let ctx = SearchContext {
            dn: &dn,
            dn2: &dn2,
            rr: &rr,
            pos_max: None,
        };

        let result = search(&PLAN, ctx, &[order(&[0, 2])]);
        assert_eq!(result.positions(), &[15, 22]);
        assert!(result.sq > 0);
    }

    #[test]
    fn test_pruned_positions_are_skipped() {
        let mut dn = [0; L_CODE];
        dn[15] = 9000;
        dn[20] = 8000;
        dn[22] = 4000;
        let mut dn2 = dn;
        dn2[15] = -1;
        let rr = diagonal_rr(16000);
        let ctx = SearchContext {
            dn: &dn,
            dn2: &dn2,
            rr: &rr,
            pos_max: None,
        };

        let result = search(&PLAN, ctx, &[order(&[0, 2])]);
        assert_eq!(result.positions(), &[20, 22]);
    }

    #[test]
    fn test_zero_energy_returns_default_order() {
        let dn = [0; L_CODE];
        let rr = diagonal_rr(0);
        let ctx = SearchContext {
            dn: &dn,
            dn2: &dn,
            rr: &rr,
            pos_max: None,
        };

        let result = search(&PLAN, ctx, &[order(&[1, 3]), order(&[0, 2])]);
        assert_eq!(result.positions(), &[1, 3]);
        assert_eq!(result.sq, -1);
    }
}
