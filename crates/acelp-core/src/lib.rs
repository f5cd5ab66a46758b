//! # ACELP-Core: AMR-NB Algebraic Codebook Search
//!
//! This library implements the fixed-point innovation (algebraic) codebook
//! search of the AMR narrowband speech codec. For every 40-sample subframe it
//! finds the signed pulse positions that best match the target signal through
//! the weighted synthesis filter, and packs them into the index words of the
//! bit-stream. The search is bit-exact with the 3GPP fixed-point reference.
//!
//! ## Features
//!
//! - **All eight modes**: 2, 3, 4, 8 and 10 pulse layouts from 4.75 to
//!   12.2 kbit/s
//! - **Bit-exact arithmetic**: saturating 16/32-bit basic operators with a
//!   sticky overflow flag
//! - **One search engine**: the six layouts are configurations of a single
//!   depth-first pulse search
//! - **Index decoding**: every packer has an inverse for inspection and
//!   round-trip checks
//! - **Parallel batches**: independent subframes run on the `rayon` pool
//!
//! ## Usage
//!
//! ```rust
//! use acelp_core::{CodebookSearch, Mode, SearchConfig, SearchInput};
//!
//! let search = CodebookSearch::new(SearchConfig::new(Mode::MR59))?;
//!
//! let mut target = [0i16; 40];
//! target[12] = 6000;
//! let mut impulse = [0i16; 40];
//! impulse[0] = 4096;
//! impulse[1] = 1024;
//!
//! let input = SearchInput::new(&target).with_subframe(1);
//! let out = search.search(&input, &mut impulse)?;
//! assert_eq!(out.codevector.len(), 2);
//!
//! let decoded = acelp_core::unpack(&out.indices, 1)?;
//! assert_eq!(decoded.canonical(), out.codevector.canonical());
//! # Ok::<(), acelp_core::CodebookError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::needless_range_loop)]

pub mod codebook;
pub mod config;
pub mod error;
pub mod math;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types and functions
pub use codebook::{pack, search_codebook, unpack, CodebookSearch, SearchJob, Variant};
pub use config::SearchConfig;
pub use error::{CodebookError, ErrorCategory, Result};
pub use types::{CodebookOutput, Codevector, Mode, PackedIndices, Pulse, SearchInput, Sign};

use tracing_subscriber::EnvFilter;

/// Version information for the codebook library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` unless one is
/// already set. It's safe to call multiple times.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for table checks.
pub fn init() -> Result<()> {
    // Initialize logging if not already done
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    tracing::info!("ACELP-Core v{} initialized", VERSION);
    tracing::info!(
        "Supported modes: {:?}",
        Mode::ALL.iter().map(|m| m.name()).collect::<Vec<_>>()
    );

    Ok(())
}

/// Get library information
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        modes: Mode::ALL.to_vec(),
    }
}

/// Library information structure
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    /// Library version
    pub version: &'static str,
    /// Supported codec modes, lowest bit-rate first
    pub modes: Vec<Mode>,
}
