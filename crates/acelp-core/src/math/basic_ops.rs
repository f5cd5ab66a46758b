//! Fixed-Point Basic Operators
//!
//! Saturating 16/32-bit arithmetic used throughout the codebook search. The
//! operators follow the 3GPP TS 26.073 basic operator set bit for bit, so any
//! sequence of calls produces the same words as the reference encoder.
//!
//! Overflow is reported through a sticky per-thread flag. An operator only ever
//! *raises* the flag; it is cleared explicitly with [`clear_overflow`] or
//! [`take_overflow`]. None of the operators panic, whatever the operands.

use std::cell::Cell;

/// 16-bit fixed-point word
pub type Word16 = i16;

/// 32-bit fixed-point accumulator
pub type Word32 = i32;

/// Maximum 16-bit value
pub const MAX_16: Word16 = 0x7fff;

/// Minimum 16-bit value
pub const MIN_16: Word16 = -0x8000;

/// Maximum 32-bit value
pub const MAX_32: Word32 = 0x7fff_ffff;

/// Minimum 32-bit value
pub const MIN_32: Word32 = -0x8000_0000;

thread_local! {
    static OVERFLOW: Cell<bool> = const { Cell::new(false) };
}

#[inline]
fn raise_overflow() {
    OVERFLOW.with(|flag| flag.set(true));
}

/// Current state of the sticky overflow flag
pub fn overflow() -> bool {
    OVERFLOW.with(Cell::get)
}

/// Reset the sticky overflow flag
pub fn clear_overflow() {
    OVERFLOW.with(|flag| flag.set(false));
}

/// Read and reset the sticky overflow flag in one step
pub fn take_overflow() -> bool {
    OVERFLOW.with(|flag| flag.replace(false))
}

/// Limit a 32-bit value to the 16-bit range
#[inline]
pub fn saturate(l_var1: Word32) -> Word16 {
    if l_var1 > MAX_16 as Word32 {
        raise_overflow();
        MAX_16
    } else if l_var1 < MIN_16 as Word32 {
        raise_overflow();
        MIN_16
    } else {
        l_var1 as Word16
    }
}

/// 16-bit addition with saturation
#[inline]
pub fn add(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 + var2 as Word32)
}

/// 16-bit subtraction with saturation
#[inline]
pub fn sub(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 - var2 as Word32)
}

/// 16-bit absolute value, `abs_s(-32768) == 32767`
#[inline]
pub fn abs_s(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        var1.abs()
    }
}

/// 16-bit negation, `negate(-32768) == 32767`
#[inline]
pub fn negate(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        -var1
    }
}

/// Arithmetic left shift with saturation; negative shifts go right
#[inline]
pub fn shl(var1: Word16, var2: Word16) -> Word16 {
    if var2 < 0 {
        return shr(var1, var2.saturating_neg().min(16));
    }

    if var2 > 15 {
        if var1 == 0 {
            return 0;
        }
        raise_overflow();
        return if var1 > 0 { MAX_16 } else { MIN_16 };
    }

    let result = (var1 as Word32) << var2;
    if result != (result as Word16) as Word32 {
        raise_overflow();
        if var1 > 0 {
            MAX_16
        } else {
            MIN_16
        }
    } else {
        result as Word16
    }
}

/// Arithmetic right shift; negative shifts go left
#[inline]
pub fn shr(var1: Word16, var2: Word16) -> Word16 {
    if var2 < 0 {
        return shl(var1, var2.saturating_neg().min(16));
    }

    if var2 >= 15 {
        if var1 < 0 {
            -1
        } else {
            0
        }
    } else {
        var1 >> var2
    }
}

/// Q15 multiplication: `(var1 * var2) >> 15` with saturation
#[inline]
pub fn mult(var1: Word16, var2: Word16) -> Word16 {
    saturate((var1 as Word32 * var2 as Word32) >> 15)
}

/// Fractional 16x16 -> 32 multiplication: `(var1 * var2) << 1`
#[inline]
pub fn l_mult(var1: Word16, var2: Word16) -> Word32 {
    let product = var1 as Word32 * var2 as Word32;
    if product == 0x4000_0000 {
        raise_overflow();
        MAX_32
    } else {
        product << 1
    }
}

/// 32-bit addition with saturation
#[inline]
pub fn l_add(l_var1: Word32, l_var2: Word32) -> Word32 {
    match l_var1.checked_add(l_var2) {
        Some(sum) => sum,
        None => {
            raise_overflow();
            if l_var1 < 0 {
                MIN_32
            } else {
                MAX_32
            }
        }
    }
}

/// 32-bit subtraction with saturation
#[inline]
pub fn l_sub(l_var1: Word32, l_var2: Word32) -> Word32 {
    match l_var1.checked_sub(l_var2) {
        Some(diff) => diff,
        None => {
            raise_overflow();
            if l_var1 < 0 {
                MIN_32
            } else {
                MAX_32
            }
        }
    }
}

/// Multiply-accumulate: `l_var3 + l_mult(var1, var2)`
#[inline]
pub fn l_mac(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_add(l_var3, l_mult(var1, var2))
}

/// Multiply-subtract: `l_var3 - l_mult(var1, var2)`
#[inline]
pub fn l_msu(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_sub(l_var3, l_mult(var1, var2))
}

/// 32-bit negation with saturation
#[inline]
pub fn l_negate(l_var1: Word32) -> Word32 {
    if l_var1 == MIN_32 {
        MAX_32
    } else {
        -l_var1
    }
}

/// 32-bit absolute value with saturation
#[inline]
pub fn l_abs(l_var1: Word32) -> Word32 {
    if l_var1 == MIN_32 {
        MAX_32
    } else {
        l_var1.abs()
    }
}

/// 32-bit arithmetic left shift with saturation; negative shifts go right
pub fn l_shl(l_var1: Word32, var2: Word16) -> Word32 {
    if var2 <= 0 {
        return l_shr(l_var1, var2.saturating_neg().min(32));
    }

    let mut value = l_var1;
    for _ in 0..var2 {
        if value == 0 {
            break;
        }
        if value > 0x3fff_ffff {
            raise_overflow();
            return MAX_32;
        }
        if value < -0x4000_0000 {
            raise_overflow();
            return MIN_32;
        }
        value <<= 1;
    }
    value
}

/// 32-bit arithmetic right shift; negative shifts go left
pub fn l_shr(l_var1: Word32, var2: Word16) -> Word32 {
    if var2 < 0 {
        return l_shl(l_var1, var2.saturating_neg().min(32));
    }

    if var2 >= 31 {
        if l_var1 < 0 {
            -1
        } else {
            0
        }
    } else {
        l_var1 >> var2
    }
}

/// High word of a 32-bit value
#[inline]
pub fn extract_h(l_var1: Word32) -> Word16 {
    (l_var1 >> 16) as Word16
}

/// Low word of a 32-bit value
#[inline]
pub fn extract_l(l_var1: Word32) -> Word16 {
    l_var1 as Word16
}

/// Round a 32-bit value to its high word
#[inline]
pub fn round(l_var1: Word32) -> Word16 {
    extract_h(l_add(l_var1, 0x0000_8000))
}

/// Deposit a 16-bit value in the high word of a 32-bit value
#[inline]
pub fn l_deposit_h(var1: Word16) -> Word32 {
    (var1 as Word32) << 16
}

/// Number of left shifts needed to normalize a 32-bit value
///
/// Returns 0 for 0 and 31 for -1, as the reference operator does.
pub fn norm_l(l_var1: Word32) -> Word16 {
    match l_var1 {
        0 => 0,
        -1 => 31,
        v => {
            let magnitude = if v < 0 { !v } else { v };
            (magnitude.leading_zeros() - 1) as Word16
        }
    }
}
