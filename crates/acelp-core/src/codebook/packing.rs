//! Codebook index packing
//!
//! Converts a codevector into the index words written to the bit-stream and
//! back. Packing rejects codevectors the layout cannot represent; unpacking
//! rejects words with bits outside their field.
//!
//! The 8 and 10 pulse layouts store two pulses per track but only one sign:
//! the second pulse shares the first pulse's sign when it does not precede
//! it, otherwise it has the opposite sign. The packer orders each pair so the
//! rule reproduces both signs.

use super::constants::{L_CODE, NB_TRACK, NB_TRACK_MR102};
use super::layout::Variant;
use super::tables::{track_pair_9bit, DGRAY, GRAY, TRACK_TABLE_9BIT};
use crate::error::{CodebookError, Result};
use crate::math::{mult, Word16};
use crate::types::{Codevector, Mode, PackedIndices, Pulse, Sign};

/// Largest first word of a compressed 8-pulse triple
const MAX_TRIPLE_MSBS: Word16 = 124;

/// 1/25 in Q15, used when compressing the last 8-pulse pair
const INV_25: Word16 = 1311;

fn check(ok: bool, variant: Variant, details: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(CodebookError::invalid_index(variant, details()))
    }
}

fn check_pulses(variant: Variant, pulses: &[Pulse]) -> Result<()> {
    check(pulses.len() == variant.pulses(), variant, || {
        format!("expected {} pulses, got {}", variant.pulses(), pulses.len())
    })?;
    for p in pulses {
        check(p.position < L_CODE, variant, || {
            format!("pulse position {} out of range", p.position)
        })?;
    }
    Ok(())
}

fn check_words(variant: Variant, words: &[Word16], limits: &[Word16]) -> Result<()> {
    check(words.len() == limits.len(), variant, || {
        format!("expected {} index words, got {}", limits.len(), words.len())
    })?;
    for (i, (&w, &limit)) in words.iter().zip(limits).enumerate() {
        check((0..limit).contains(&w), variant, || {
            format!("word {} = {} outside 0..{}", i, w, limit)
        })?;
    }
    Ok(())
}

fn check_subframe(subframe: usize) -> Result<()> {
    if subframe < TRACK_TABLE_9BIT.len() {
        Ok(())
    } else {
        Err(CodebookError::InvalidSubframe { subframe })
    }
}

/// Position within the track of a 5-track layout
fn slot5(position: usize) -> Word16 {
    (position / NB_TRACK) as Word16
}

fn sign_of_bit(bits: Word16, bit: u32) -> Sign {
    if bits & (1 << bit) != 0 {
        Sign::Positive
    } else {
        Sign::Negative
    }
}

fn pulse(slot: Word16, track: usize, sign: Sign) -> Pulse {
    Pulse::new(slot as usize * NB_TRACK + track, sign)
}

/// Pack the 2 pulse, 9 bit codebook: `[positions, signs]`
///
/// Bit 6 of the position word selects which of the two track pairs of the
/// subframe was used.
pub fn pack_9bit(subframe: usize, pulses: &[Pulse]) -> Result<[Word16; 2]> {
    let variant = Variant::Pulses2Bits9;
    check_subframe(subframe)?;
    check_pulses(variant, pulses)?;

    let row = &TRACK_TABLE_9BIT[subframe];
    let t0 = pulses[0].track(NB_TRACK);
    let table = row[t0].ok_or_else(|| {
        CodebookError::invalid_index(
            variant,
            format!("track {} unused in subframe {}", t0, subframe),
        )
    })?;
    let pair = track_pair_9bit(subframe, table as usize);
    let tracks = (t0, pulses[1].track(NB_TRACK));
    check(tracks == pair, variant, || {
        format!("tracks {:?} do not form a pair of subframe {}", tracks, subframe)
    })?;

    let mut index = slot5(pulses[0].position) + ((table as Word16) << 6);
    index += slot5(pulses[1].position) << 3;

    let mut signs = 0;
    for (k, p) in pulses.iter().enumerate() {
        if p.sign.is_positive() {
            signs += 1 << k;
        }
    }
    Ok([index, signs])
}

/// Unpack the 2 pulse, 9 bit codebook
pub fn unpack_9bit(subframe: usize, words: &[Word16]) -> Result<Vec<Pulse>> {
    check_subframe(subframe)?;
    check_words(Variant::Pulses2Bits9, words, &[128, 4])?;
    let (index, signs) = (words[0], words[1]);
    let (t0, t1) = track_pair_9bit(subframe, ((index >> 6) & 1) as usize);
    Ok(vec![
        pulse(index & 7, t0, sign_of_bit(signs, 0)),
        pulse((index >> 3) & 7, t1, sign_of_bit(signs, 1)),
    ])
}

/// Pack the 2 pulse, 11 bit codebook: `[positions, signs]`
pub fn pack_11bit(pulses: &[Pulse]) -> Result<[Word16; 2]> {
    let variant = Variant::Pulses2Bits11;
    check_pulses(variant, pulses)?;

    let mut index = 0;
    let mut signs = 0;
    for (k, p) in pulses.iter().enumerate() {
        let slot = slot5(p.position);
        let (bit, field) = match (k, p.track(NB_TRACK)) {
            (0, 1) => (0, slot << 1),
            (0, 3) => (0, (slot << 1) + 1),
            (1, 0) => (1, slot << 6),
            (1, 1) => (1, (slot << 6) + 16),
            (1, 2) => (1, (slot << 6) + 32),
            (1, 4) => (1, (slot << 6) + 48),
            (k, track) => {
                return Err(CodebookError::invalid_index(
                    variant,
                    format!("pulse {} cannot sit on track {}", k, track),
                ))
            }
        };
        index += field;
        if p.sign.is_positive() {
            signs += 1 << bit;
        }
    }
    Ok([index, signs])
}

/// Unpack the 2 pulse, 11 bit codebook
pub fn unpack_11bit(words: &[Word16]) -> Result<Vec<Pulse>> {
    check_words(Variant::Pulses2Bits11, words, &[512, 4])?;
    let (index, signs) = (words[0], words[1]);
    let t0 = if index & 1 == 0 { 1 } else { 3 };
    let t1 = [0, 1, 2, 4][((index >> 4) & 3) as usize];
    Ok(vec![
        pulse((index >> 1) & 7, t0, sign_of_bit(signs, 0)),
        pulse((index >> 6) & 7, t1, sign_of_bit(signs, 1)),
    ])
}

/// Pack the 3 pulse, 14 bit codebook: `[positions, signs]`
///
/// One pulse sits on track 0, one on track 1 or 3 and one on track 2 or 4;
/// fields are placed by track, so the slot order does not matter.
pub fn pack_14bit(pulses: &[Pulse]) -> Result<[Word16; 2]> {
    let variant = Variant::Pulses3Bits14;
    check_pulses(variant, pulses)?;

    let mut index = 0;
    let mut signs = 0;
    let mut used = [false; 3];
    for p in pulses {
        let slot = slot5(p.position);
        let (group, field) = match p.track(NB_TRACK) {
            0 => (0, slot),
            1 => (1, slot << 4),
            3 => (1, (slot << 4) + 8),
            2 => (2, slot << 8),
            _ => (2, (slot << 8) + 128),
        };
        check(!used[group], variant, || {
            format!("two pulses compete for field {}", group)
        })?;
        used[group] = true;
        index += field;
        if p.sign.is_positive() {
            signs += 1 << group;
        }
    }
    Ok([index, signs])
}

/// Unpack the 3 pulse, 14 bit codebook
pub fn unpack_14bit(words: &[Word16]) -> Result<Vec<Pulse>> {
    check_words(Variant::Pulses3Bits14, words, &[2048, 8])?;
    let (index, signs) = (words[0], words[1]);
    let t1 = if index & 8 == 0 { 1 } else { 3 };
    let t2 = if index & 128 == 0 { 2 } else { 4 };
    Ok(vec![
        pulse(index & 7, 0, sign_of_bit(signs, 0)),
        pulse((index >> 4) & 7, t1, sign_of_bit(signs, 1)),
        pulse((index >> 8) & 7, t2, sign_of_bit(signs, 2)),
    ])
}

/// Pack the 4 pulse, 17 bit codebook: `[positions, signs]`
///
/// Positions within a track are Gray coded; bit 9 tells track 3 from 4.
pub fn pack_17bit(pulses: &[Pulse]) -> Result<[Word16; 2]> {
    let variant = Variant::Pulses4Bits17;
    check_pulses(variant, pulses)?;

    let mut index = 0;
    let mut signs = 0;
    let mut used = [false; 4];
    for p in pulses {
        let code = GRAY[slot5(p.position) as usize];
        let (group, field) = match p.track(NB_TRACK) {
            0 => (0, code),
            1 => (1, code << 3),
            2 => (2, code << 6),
            3 => (3, code << 10),
            _ => (3, (code << 10) + 512),
        };
        check(!used[group], variant, || {
            format!("two pulses compete for field {}", group)
        })?;
        used[group] = true;
        index += field;
        if p.sign.is_positive() {
            signs += 1 << group;
        }
    }
    Ok([index, signs])
}

/// Unpack the 4 pulse, 17 bit codebook
pub fn unpack_17bit(words: &[Word16]) -> Result<Vec<Pulse>> {
    check_words(Variant::Pulses4Bits17, words, &[8192, 16])?;
    let (index, signs) = (words[0], words[1]);
    let t3 = if index & 512 == 0 { 3 } else { 4 };
    Ok(vec![
        pulse(DGRAY[(index & 7) as usize], 0, sign_of_bit(signs, 0)),
        pulse(DGRAY[((index >> 3) & 7) as usize], 1, sign_of_bit(signs, 1)),
        pulse(DGRAY[((index >> 6) & 7) as usize], 2, sign_of_bit(signs, 2)),
        pulse(DGRAY[((index >> 10) & 7) as usize], t3, sign_of_bit(signs, 3)),
    ])
}

/// Place the pulses of a two-per-track layout in `(first, second)` slots
///
/// Returns the per-track slot indices and the sign of the first pulse. The
/// first pulse keeps its own sign; the second pulse is stored after it when
/// the signs agree and before it when they differ.
fn order_pairs<const T: usize>(
    variant: Variant,
    pulses: &[Pulse],
) -> Result<([Option<Word16>; T], [Option<Word16>; T], [Sign; T])> {
    check_pulses(variant, pulses)?;

    let mut first: [Option<Word16>; T] = [None; T];
    let mut second: [Option<Word16>; T] = [None; T];
    let mut sign = [Sign::Positive; T];

    for p in pulses {
        let track = p.track(T);
        let index = (p.position / T) as Word16;
        let Some(old) = first[track] else {
            first[track] = Some(index);
            sign[track] = p.sign;
            continue;
        };
        check(second[track].is_none(), variant, || {
            format!("more than two pulses on track {}", track)
        })?;

        if p.sign == sign[track] {
            if old > index {
                second[track] = Some(old);
                first[track] = Some(index);
            } else {
                second[track] = Some(index);
            }
        } else {
            check(old != index, variant, || {
                format!("opposite pulses cancel at position {}", p.position)
            })?;
            if old > index {
                second[track] = Some(index);
            } else {
                second[track] = Some(old);
                first[track] = Some(index);
                sign[track] = p.sign;
            }
        }
    }

    for track in 0..T {
        check(second[track].is_some(), variant, || {
            format!("track {} needs two pulses", track)
        })?;
    }
    Ok((first, second, sign))
}

/// Decode one track of a two-per-track layout
fn unpair(track: usize, step: usize, first: Word16, second: Word16, sign: Sign) -> [Pulse; 2] {
    let pos1 = first as usize * step + track;
    let pos2 = second as usize * step + track;
    let sign2 = if pos2 < pos1 { sign.flip() } else { sign };
    [Pulse::new(pos1, sign), Pulse::new(pos2, sign2)]
}

fn compress_triple(a: Word16, b: Word16, c: Word16) -> Word16 {
    let msbs = (a >> 1) + (b >> 1) * 5 + (c >> 1) * 25;
    (msbs << 3) + (a & 1) + ((b & 1) << 1) + ((c & 1) << 2)
}

fn decompress_triple(word: Word16) -> [Word16; 3] {
    let msbs = (word >> 3).min(MAX_TRIPLE_MSBS);
    let lsbs = word & 7;
    [
        (msbs % 5) * 2 + (lsbs & 1),
        ((msbs / 5) % 5) * 2 + ((lsbs >> 1) & 1),
        (msbs / 25) * 2 + ((lsbs >> 2) & 1),
    ]
}

/// Last pair shares 7 bits: the two position MSBs take 25 of 32 codes
fn compress_pair(a: Word16, b: Word16) -> Word16 {
    let ia = if (b >> 1) & 1 == 1 { 4 - (a >> 1) } else { a >> 1 };
    let v = ((ia + (b >> 1) * 5) << 5) + 12;
    (a & 1) + ((b & 1) << 1) + (mult(v, INV_25) << 2)
}

fn decompress_pair(word: Word16) -> [Word16; 2] {
    let msbs = word >> 2;
    let lsbs = word & 3;
    let v = (msbs * 25 + 12) >> 5;
    let (q, r) = (v / 5, v % 5);
    let ia = if q & 1 == 1 { 4 - r } else { r };
    [ia * 2 + (lsbs & 1), q * 2 + ((lsbs >> 1) & 1)]
}

/// Pack the 8 pulse, 31 bit codebook
///
/// Words 0 to 3 hold the sign of each track, words 4 to 6 the eight
/// position indices compressed to 10, 10 and 7 bits.
pub fn pack_31bit(pulses: &[Pulse]) -> Result<[Word16; 7]> {
    let (first, second, sign) = order_pairs::<NB_TRACK_MR102>(Variant::Pulses8Bits31, pulses)?;

    let mut p = [0 as Word16; 2 * NB_TRACK_MR102];
    for track in 0..NB_TRACK_MR102 {
        p[track] = first[track].unwrap_or(0);
        p[track + NB_TRACK_MR102] = second[track].unwrap_or(0);
    }

    let mut words = [0 as Word16; 7];
    for track in 0..NB_TRACK_MR102 {
        words[track] = if sign[track].is_positive() { 0 } else { 1 };
    }
    words[4] = compress_triple(p[0], p[4], p[1]);
    words[5] = compress_triple(p[2], p[6], p[5]);
    words[6] = compress_pair(p[3], p[7]);
    Ok(words)
}

/// Unpack the 8 pulse, 31 bit codebook
pub fn unpack_31bit(words: &[Word16]) -> Result<Vec<Pulse>> {
    check_words(
        Variant::Pulses8Bits31,
        words,
        &[2, 2, 2, 2, 1024, 1024, 128],
    )?;

    let [p0, p4, p1] = decompress_triple(words[4]);
    let [p2, p6, p5] = decompress_triple(words[5]);
    let [p3, p7] = decompress_pair(words[6]);
    let p = [p0, p1, p2, p3, p4, p5, p6, p7];

    let mut pulses = Vec::with_capacity(2 * NB_TRACK_MR102);
    for track in 0..NB_TRACK_MR102 {
        let sign = if words[track] == 0 {
            Sign::Positive
        } else {
            Sign::Negative
        };
        pulses.extend(unpair(
            track,
            NB_TRACK_MR102,
            p[track],
            p[track + NB_TRACK_MR102],
            sign,
        ));
    }
    Ok(pulses)
}

/// Pack the 10 pulse, 35 bit codebook
///
/// Words 0 to 4 hold the first pulse of each track as a sign bit (8) and a
/// Gray-coded position; words 5 to 9 hold the second pulse's position.
pub fn pack_35bit(pulses: &[Pulse]) -> Result<[Word16; 10]> {
    let (first, second, sign) = order_pairs::<NB_TRACK>(Variant::Pulses10Bits35, pulses)?;

    let mut words = [0 as Word16; 2 * NB_TRACK];
    for track in 0..NB_TRACK {
        let sign_bit = if sign[track].is_positive() { 0 } else { 8 };
        words[track] = sign_bit | GRAY[first[track].unwrap_or(0) as usize];
        words[track + NB_TRACK] = GRAY[second[track].unwrap_or(0) as usize];
    }
    Ok(words)
}

/// Unpack the 10 pulse, 35 bit codebook
pub fn unpack_35bit(words: &[Word16]) -> Result<Vec<Pulse>> {
    check_words(
        Variant::Pulses10Bits35,
        words,
        &[16, 16, 16, 16, 16, 8, 8, 8, 8, 8],
    )?;

    let mut pulses = Vec::with_capacity(2 * NB_TRACK);
    for track in 0..NB_TRACK {
        let word = words[track];
        let sign = if word & 8 == 0 {
            Sign::Positive
        } else {
            Sign::Negative
        };
        pulses.extend(unpair(
            track,
            NB_TRACK,
            DGRAY[(word & 7) as usize],
            DGRAY[words[track + NB_TRACK] as usize],
            sign,
        ));
    }
    Ok(pulses)
}

/// Pack a codevector into the index words of `mode`
///
/// `subframe` only matters for the 9-bit codebook, which rejects values
/// outside `0..4`.
pub fn pack(mode: Mode, subframe: usize, codevector: &Codevector) -> Result<PackedIndices> {
    let pulses = codevector.pulses();
    let words = match mode.variant() {
        Variant::Pulses2Bits9 => pack_9bit(subframe, pulses)?.to_vec(),
        Variant::Pulses2Bits11 => pack_11bit(pulses)?.to_vec(),
        Variant::Pulses3Bits14 => pack_14bit(pulses)?.to_vec(),
        Variant::Pulses4Bits17 => pack_17bit(pulses)?.to_vec(),
        Variant::Pulses8Bits31 => pack_31bit(pulses)?.to_vec(),
        Variant::Pulses10Bits35 => pack_35bit(pulses)?.to_vec(),
    };
    PackedIndices::new(mode, words)
}

/// Decode index words back into a codevector
///
/// Pulses come back in field order, which can differ from the search's slot
/// order; compare with [`Codevector::canonical`].
pub fn unpack(indices: &PackedIndices, subframe: usize) -> Result<Codevector> {
    let words = indices.words();
    let pulses = match indices.mode().variant() {
        Variant::Pulses2Bits9 => unpack_9bit(subframe, words)?,
        Variant::Pulses2Bits11 => unpack_11bit(words)?,
        Variant::Pulses3Bits14 => unpack_14bit(words)?,
        Variant::Pulses4Bits17 => unpack_17bit(words)?,
        Variant::Pulses8Bits31 => unpack_31bit(words)?,
        Variant::Pulses10Bits35 => unpack_35bit(words)?,
    };
    Ok(Codevector::new(pulses))
}
