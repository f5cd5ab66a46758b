//! Inverse square root by table lookup and linear interpolation

use super::basic_ops::*;

/// `1/sqrt(x)` in Q15 for `x` in [0.25, 1.0], sampled every 1/64
const INV_SQRT_TABLE: [Word16; 49] = [
    32767, 31790, 30894, 30070, 29309, 28602, 27945, 27330, 26755, 26214,
    25705, 25225, 24770, 24339, 23930, 23541, 23170, 22817, 22479, 22155,
    21845, 21548, 21263, 20988, 20724, 20470, 20225, 19988, 19760, 19539,
    19326, 19119, 18919, 18725, 18536, 18354, 18176, 18004, 17837, 17674,
    17515, 17361, 17211, 17064, 16921, 16782, 16646, 16514, 16384,
];

/// Compute `1/sqrt(l_x)`
///
/// The input is normalized to [0.25, 1.0), the mantissa is interpolated from
/// the table and the result is denormalized by half the exponent. Non-positive
/// inputs return `0x3fffffff`.
pub fn inv_sqrt(l_x: Word32) -> Word32 {
    if l_x <= 0 {
        return 0x3fff_ffff;
    }

    let exp = norm_l(l_x);
    let mut l_x = l_shl(l_x, exp);

    let mut exp = sub(30, exp);
    if exp & 1 == 0 {
        l_x = l_shr(l_x, 1);
    }
    exp = shr(exp, 1);
    exp = add(exp, 1);

    l_x = l_shr(l_x, 9);
    let i = extract_h(l_x);
    l_x = l_shr(l_x, 1);
    let a = extract_l(l_x) & 0x7fff;

    let i = sub(i, 16) as usize;

    let mut l_y = l_deposit_h(INV_SQRT_TABLE[i]);
    let tmp = sub(INV_SQRT_TABLE[i], INV_SQRT_TABLE[i + 1]);
    l_y = l_msu(l_y, tmp, a);

    l_shr(l_y, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_input() {
        assert_eq!(inv_sqrt(0), 0x3fff_ffff);
        assert_eq!(inv_sqrt(-5), 0x3fff_ffff);
    }

    #[test]
    fn test_inv_sqrt_close_to_float() {
        // the result approximates 2^30 / sqrt(x)
        for &x in &[1i32, 7, 256, 4096, 65_536, 1_000_000, 0x1000_0000, MAX_32] {
            let y = inv_sqrt(x) as f64;
            let expected = 2f64.powi(30) / (x as f64).sqrt();
            let rel = (y - expected).abs() / expected;
            assert!(rel < 0.001, "x={} got {} expected {}", x, y, expected);
        }
    }

    #[test]
    fn test_table_index_stays_in_range() {
        // every normalization path must land inside the table
        let mut x = 1i32;
        while x > 0 {
            let _ = inv_sqrt(x);
            let _ = inv_sqrt(x | 0x5555);
            x = x.wrapping_shl(1);
        }
    }
}
