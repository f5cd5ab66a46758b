//! Mode dispatcher
//!
//! Runs one subframe through the whole pipeline: pitch sharpening of the
//! impulse response, backward filtering of the target, sign selection,
//! autocorrelation, the pulse search of the mode's layout, innovation
//! building and index packing. The innovation receives the same pitch
//! contribution as the impulse response before it is returned.

use super::autocorr::cor_h;
use super::build::build_code;
use super::constants::L_CODE;
use super::correlation::cor_h_x;
use super::impulse::{sharpen, ImpulseResponse};
use super::packing::pack;
use super::search::{search, SearchContext};
use super::sign::{set_sign, set_sign12k2};
use crate::config::SearchConfig;
use crate::error::{CodebookError, Result};
use crate::math::{clear_overflow, shl, take_overflow, Word16};
use crate::types::{CodebookOutput, Mode, SearchInput};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Pitch sharpening factor in Q15
///
/// MR122 sharpens with the quantized pitch gain, saturated at 1.0; the
/// other modes with the smoothed sharpening factor of the previous subframe.
fn sharpening_factor(mode: Mode, input: &SearchInput<'_>) -> Word16 {
    match mode {
        Mode::MR122 => shl(input.gain_pit, 3),
        _ => shl(input.pitch_sharp, 1),
    }
}

/// Search the algebraic codebook of `mode` for one subframe
///
/// `impulse` holds the impulse response of the weighted synthesis filter
/// and is updated in place with its pitch-sharpened version, which the
/// caller reuses for the gain computation.
pub fn search_codebook(
    mode: Mode,
    input: &SearchInput<'_>,
    impulse: &mut [Word16],
) -> Result<CodebookOutput> {
    input.validate(mode)?;
    let mut h = ImpulseResponse::from_slice(impulse)?;
    let variant = mode.variant();

    clear_overflow();

    let lag = input.pitch_lag as usize;
    let factor = sharpening_factor(mode, input);
    h.sharpen(lag, factor);

    let mut dn = cor_h_x(
        &h,
        input.target,
        variant.correlation_shift(),
        variant.nb_track(),
        variant.step(),
    );

    let (selection, seeds) = if variant.blends_residual() {
        let residual = input
            .residual
            .ok_or_else(|| CodebookError::invalid_length("residual", L_CODE, 0))?;
        let (selection, seeds) =
            set_sign12k2(&mut dn, residual, variant.nb_track(), variant.step());
        (selection, Some(seeds))
    } else {
        (set_sign(&mut dn, variant.kept_per_track()), None)
    };

    let rr = cor_h(&h, &selection.sign);
    let orders = variant.orders(input.subframe, seeds.as_ref());
    let ctx = SearchContext {
        dn: &dn,
        dn2: &selection.dn2,
        rr: &rr,
        pos_max: seeds.as_ref().map(|s| &s.pos_max),
    };
    let best = search(variant.plan(), ctx, &orders);

    let mut built = build_code(variant, best.positions(), &selection.sign, &h);
    let indices = pack(mode, input.subframe, &built.codevector)?;

    sharpen(&mut built.code, lag, factor);
    h.write_to(impulse);

    debug!(
        mode = %mode,
        subframe = input.subframe,
        positions = ?best.positions(),
        indices = ?indices.words(),
        "codebook search"
    );

    Ok(CodebookOutput {
        mode,
        code: built.code,
        filtered: built.filtered,
        codevector: built.codevector,
        indices,
        overflow: take_overflow(),
    })
}

/// One independent subframe of a batch
#[derive(Debug)]
pub struct SearchJob<'a> {
    /// Per-subframe parameters
    pub input: SearchInput<'a>,
    /// Impulse response, sharpened in place
    pub impulse: &'a mut [Word16],
}

impl<'a> SearchJob<'a> {
    /// Create a new job
    pub fn new(input: SearchInput<'a>, impulse: &'a mut [Word16]) -> Self {
        Self { input, impulse }
    }
}

/// Codebook search bound to a configuration
///
/// # Example
/// ```
/// use acelp_core::{CodebookSearch, Mode, SearchConfig, SearchInput};
///
/// let search = CodebookSearch::new(SearchConfig::new(Mode::MR475)).unwrap();
///
/// let mut x = [0i16; 40];
/// x[5] = 8000;
/// let mut h = [0i16; 40];
/// h[0] = 4096;
///
/// let out = search.search(&SearchInput::new(&x), &mut h).unwrap();
/// assert_eq!(out.indices.words().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CodebookSearch {
    config: SearchConfig,
}

impl CodebookSearch {
    /// Create a search from a validated configuration
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Creating codebook search: mode={}, {} pulses, {} bits",
            config.mode,
            config.mode.pulses(),
            config.mode.codebook_bits()
        );
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Mode searched
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Search one subframe
    pub fn search(
        &self,
        input: &SearchInput<'_>,
        impulse: &mut [Word16],
    ) -> Result<CodebookOutput> {
        let out = search_codebook(self.config.mode, input, impulse)?;
        if out.overflow {
            if self.config.overflow_warnings {
                warn!(
                    mode = %out.mode,
                    subframe = input.subframe,
                    "fixed-point saturation during codebook search"
                );
            } else {
                debug!(
                    mode = %out.mode,
                    subframe = input.subframe,
                    "fixed-point saturation during codebook search"
                );
            }
        }
        Ok(out)
    }

    /// Search independent subframes, in parallel once the batch reaches
    /// `min_parallel_batch` jobs
    ///
    /// Results are in job order and match running [`CodebookSearch::search`]
    /// on every job in turn.
    pub fn search_batch(&self, jobs: &mut [SearchJob<'_>]) -> Vec<Result<CodebookOutput>> {
        if jobs.len() < self.config.min_parallel_batch {
            jobs.iter_mut()
                .map(|job| self.search(&job.input, &mut *job.impulse))
                .collect()
        } else {
            debug!(jobs = jobs.len(), "parallel codebook batch");
            jobs.par_iter_mut()
                .map(|job| self.search(&job.input, &mut *job.impulse))
                .collect()
        }
    }
}
