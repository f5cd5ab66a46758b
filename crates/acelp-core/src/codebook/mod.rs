//! Algebraic codebook search
//!
//! The innovation of every AMR-NB mode is a handful of signed unit pulses on
//! interleaved tracks of the 40-sample subframe. All six layouts share one
//! pipeline:
//!
//! ```text
//! x, h ──> cor_h_x ──> dn ──> set_sign ──> sign, dn2 ──┐
//!  h ────────────────────────> cor_h (sign) ──> rr ─────┼──> search ──> build_code ──> pack
//!                                       layout orders ──┘
//! ```
//!
//! and differ only in the [`layout::Variant`] that drives the search.

pub mod autocorr;
pub mod build;
pub mod constants;
pub mod correlation;
pub mod dispatcher;
pub mod impulse;
pub mod layout;
pub mod packing;
pub mod search;
pub mod sign;
pub mod tables;

pub use autocorr::{cor_h, Autocorrelation};
pub use build::{build_code, BuiltCode};
pub use constants::{L_CODE, NB_SUBFRAMES};
pub use correlation::cor_h_x;
pub use dispatcher::{search_codebook, CodebookSearch, SearchJob};
pub use impulse::ImpulseResponse;
pub use layout::Variant;
pub use packing::{pack, unpack};
pub use sign::{set_sign, set_sign12k2, SignSelection, TrackSeeds};
