//! Core types for the codebook search
//!
//! This module defines the codec modes, the per-call search input, the pulse
//! and codevector representation and the packed index words handed back to
//! the bit-stream writer.

use crate::codebook::constants::{L_CODE, NB_SUBFRAMES};
use crate::codebook::layout::Variant;
use crate::error::{CodebookError, Result};
use crate::math::Word16;
use std::fmt;
use std::str::FromStr;

/// AMR-NB codec mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    /// 4.75 kbit/s
    MR475,
    /// 5.15 kbit/s
    MR515,
    /// 5.90 kbit/s
    MR59,
    /// 6.70 kbit/s
    MR67,
    /// 7.40 kbit/s
    MR74,
    /// 7.95 kbit/s
    MR795,
    /// 10.2 kbit/s
    MR102,
    /// 12.2 kbit/s
    MR122,
}

impl Mode {
    /// Every mode, lowest bit-rate first
    pub const ALL: [Mode; 8] = [
        Mode::MR475,
        Mode::MR515,
        Mode::MR59,
        Mode::MR67,
        Mode::MR74,
        Mode::MR795,
        Mode::MR102,
        Mode::MR122,
    ];

    /// Get the mode name
    pub fn name(self) -> &'static str {
        match self {
            Self::MR475 => "MR475",
            Self::MR515 => "MR515",
            Self::MR59 => "MR59",
            Self::MR67 => "MR67",
            Self::MR74 => "MR74",
            Self::MR795 => "MR795",
            Self::MR102 => "MR102",
            Self::MR122 => "MR122",
        }
    }

    /// Get the bit-rate in bits per second
    pub fn bitrate(self) -> u32 {
        match self {
            Self::MR475 => 4750,
            Self::MR515 => 5150,
            Self::MR59 => 5900,
            Self::MR67 => 6700,
            Self::MR74 => 7400,
            Self::MR795 => 7950,
            Self::MR102 => 10200,
            Self::MR122 => 12200,
        }
    }

    /// Look a mode up by its bit-rate
    pub fn from_bitrate(bitrate: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.bitrate() == bitrate)
            .ok_or(CodebookError::UnsupportedBitrate { bitrate })
    }

    /// Pulse layout searched in this mode
    pub fn variant(self) -> Variant {
        match self {
            Self::MR475 | Self::MR515 => Variant::Pulses2Bits9,
            Self::MR59 => Variant::Pulses2Bits11,
            Self::MR67 => Variant::Pulses3Bits14,
            Self::MR74 | Self::MR795 => Variant::Pulses4Bits17,
            Self::MR102 => Variant::Pulses8Bits31,
            Self::MR122 => Variant::Pulses10Bits35,
        }
    }

    /// Number of pulses in a codevector
    pub fn pulses(self) -> usize {
        self.variant().pulses()
    }

    /// Codebook bits per subframe
    pub fn codebook_bits(self) -> u32 {
        self.variant().bits()
    }

    /// Number of packed index words per subframe
    pub fn index_words(self) -> usize {
        self.variant().index_words()
    }

    /// Whether the search blends the long-term prediction residual into
    /// the sign decision
    pub fn uses_residual(self) -> bool {
        matches!(self, Self::MR102 | Self::MR122)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = CodebookError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(bitrate) = trimmed.parse::<u32>() {
            return Self::from_bitrate(bitrate);
        }

        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CodebookError::UnsupportedMode {
                mode: trimmed.to_string(),
            })
    }
}

/// Sign of a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    /// +1
    Positive,
    /// -1
    Negative,
}

impl Sign {
    /// Sign of a fixed-point word, zero counts as positive
    pub fn of(value: Word16) -> Self {
        if value >= 0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Opposite sign
    pub fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Check for a positive sign
    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }
}

/// One signed unit pulse of a codevector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pulse {
    /// Sample position in the subframe, `0..L_CODE`
    pub position: usize,
    /// Pulse sign
    pub sign: Sign,
}

impl Pulse {
    /// Create a new pulse
    pub fn new(position: usize, sign: Sign) -> Self {
        Self { position, sign }
    }

    /// Track of the pulse for a given interleaving step
    pub fn track(&self, step: usize) -> usize {
        self.position % step
    }
}

/// Pulses chosen by a search, in pulse-slot order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Codevector {
    pulses: Vec<Pulse>,
}

impl Codevector {
    /// Create a codevector from pulses in slot order
    pub fn new(pulses: Vec<Pulse>) -> Self {
        Self { pulses }
    }

    /// Pulses in slot order
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// Pulse positions in slot order
    pub fn positions(&self) -> Vec<usize> {
        self.pulses.iter().map(|p| p.position).collect()
    }

    /// Number of pulses
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// Check for an empty codevector
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Pulses sorted by position then sign
    ///
    /// Packing may reorder the two pulses sharing a track, so codevectors
    /// are compared in this form after a round trip.
    pub fn canonical(&self) -> Vec<Pulse> {
        let mut pulses = self.pulses.clone();
        pulses.sort_unstable();
        pulses
    }
}

/// Packed codebook index words for one subframe
///
/// The 2 to 4 pulse modes produce a position word followed by a sign word;
/// the 8 pulse mode produces 4 sign words and 3 compressed position words;
/// the 10 pulse mode produces 10 Gray-coded words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedIndices {
    mode: Mode,
    words: Vec<Word16>,
}

impl PackedIndices {
    /// Wrap index words, checking the word count for the mode
    pub fn new(mode: Mode, words: Vec<Word16>) -> Result<Self> {
        if words.len() != mode.index_words() {
            return Err(CodebookError::invalid_index(
                mode,
                format!(
                    "expected {} index words, got {}",
                    mode.index_words(),
                    words.len()
                ),
            ));
        }
        Ok(Self { mode, words })
    }

    /// Mode the indices were packed for
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Index words in bit-stream order
    pub fn words(&self) -> &[Word16] {
        &self.words
    }

    /// Consume into the index words
    pub fn into_words(self) -> Vec<Word16> {
        self.words
    }
}

/// Per-subframe search parameters
#[derive(Debug, Clone, Copy)]
pub struct SearchInput<'a> {
    /// Target signal `x`, `L_CODE` samples
    pub target: &'a [Word16],
    /// Long-term prediction residual, required by MR102 and MR122
    pub residual: Option<&'a [Word16]>,
    /// Subframe number in the frame, `0..4`
    pub subframe: usize,
    /// Integer pitch lag `T0`, at least 1; lags of `L_CODE` or more disable
    /// sharpening
    pub pitch_lag: Word16,
    /// Pitch sharpening factor (Q14) used up to MR102
    pub pitch_sharp: Word16,
    /// Quantized pitch gain (Q12) used as sharpening factor in MR122
    pub gain_pit: Word16,
}

impl<'a> SearchInput<'a> {
    /// Create an input for subframe 0 with sharpening disabled
    pub fn new(target: &'a [Word16]) -> Self {
        Self {
            target,
            residual: None,
            subframe: 0,
            pitch_lag: L_CODE as Word16,
            pitch_sharp: 0,
            gain_pit: 0,
        }
    }

    /// Set the subframe number
    pub fn with_subframe(mut self, subframe: usize) -> Self {
        self.subframe = subframe;
        self
    }

    /// Set pitch lag and sharpening factor
    pub fn with_pitch(mut self, pitch_lag: Word16, pitch_sharp: Word16) -> Self {
        self.pitch_lag = pitch_lag;
        self.pitch_sharp = pitch_sharp;
        self
    }

    /// Set the quantized pitch gain
    pub fn with_gain_pit(mut self, gain_pit: Word16) -> Self {
        self.gain_pit = gain_pit;
        self
    }

    /// Set the long-term prediction residual
    pub fn with_residual(mut self, residual: &'a [Word16]) -> Self {
        self.residual = Some(residual);
        self
    }

    /// Check the input against the contract of a mode
    pub fn validate(&self, mode: Mode) -> Result<()> {
        if self.target.len() != L_CODE {
            return Err(CodebookError::invalid_length(
                "target",
                L_CODE,
                self.target.len(),
            ));
        }

        if self.subframe >= NB_SUBFRAMES {
            return Err(CodebookError::InvalidSubframe {
                subframe: self.subframe,
            });
        }

        if self.pitch_lag <= 0 {
            return Err(CodebookError::InvalidPitchLag {
                lag: self.pitch_lag,
            });
        }

        if mode.uses_residual() {
            let len = self.residual.map_or(0, <[Word16]>::len);
            if len != L_CODE {
                return Err(CodebookError::invalid_length("residual", L_CODE, len));
            }
        }

        Ok(())
    }
}

/// Result of one subframe search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebookOutput {
    /// Mode that was searched
    pub mode: Mode,
    /// Innovation vector including the pitch contribution
    pub code: [Word16; L_CODE],
    /// Innovation filtered through the (sharpened) impulse response
    pub filtered: [Word16; L_CODE],
    /// Chosen pulses in slot order
    pub codevector: Codevector,
    /// Packed index words
    pub indices: PackedIndices,
    /// Whether any fixed-point operation saturated during the search
    pub overflow: bool,
}
