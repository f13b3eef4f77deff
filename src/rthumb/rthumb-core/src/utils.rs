// Barrel shifter helpers. Each returns the shifted value and the carry-out;
// a carry of `None` means the flag is left as it was.
//
// Amounts of 32 and above are handled by hand: the hardware shifter does not
// reduce them modulo 32 the way the host shift operators would.

/// Logical shift left
pub fn lsl(value: i32, amount: u32) -> (i32, Option<bool>) {
    match amount {
        0 => (value, None),
        // Last bit out is the sign of the value shifted one less
        1..=31 => (value << amount, Some((value << (amount - 1)) < 0)),
        32 => (0, Some(value & 0x1 == 0x1)),
        _ => (0, Some(false)),
    }
}

/// Logical shift right
pub fn lsr(value: i32, amount: u32) -> (i32, Option<bool>) {
    let bits = value as u32;
    match amount {
        0 => (value, None),
        1..=31 => ((bits >> amount) as i32, Some((bits >> (amount - 1)) & 0x1 == 0x1)),
        32 => (0, Some(value < 0)),
        _ => (0, Some(false)),
    }
}

/// Arithmetic shift right, saturating to the sign for 32 and above
pub fn asr(value: i32, amount: u32) -> (i32, Option<bool>) {
    match amount {
        0 => (value, None),
        1..=31 => (value >> amount, Some((value >> (amount - 1)) & 0x1 == 0x1)),
        _ => (value >> 31, Some(value < 0)),
    }
}

/// Rotate right
pub fn ror(value: i32, amount: u32) -> (i32, Option<bool>) {
    if amount == 0 {
        return (value, None);
    }
    let bits = value as u32;
    match amount & 0x1F {
        // ROR by a multiple of 32
        0 => (value, Some(value < 0)),
        rotate => (
            bits.rotate_right(rotate) as i32,
            Some((bits >> (rotate - 1)) & 0x1 == 0x1),
        ),
    }
}

/// Sign-extend the low `width` bits of `value`
pub fn sign_extend(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

#[cfg(test)]
mod shifter_tests {
    use super::*;

    #[test]
    fn test_zero_amount_leaves_carry() {
        let v = 0x1234_5678;
        assert_eq!(lsl(v, 0), (v, None));
        assert_eq!(lsr(v, 0), (v, None));
        assert_eq!(asr(v, 0), (v, None));
        assert_eq!(ror(v, 0), (v, None));
    }

    #[test]
    fn test_lsl_edges() {
        assert_eq!(lsl(0x4000_0001, 1), (0x8000_0002u32 as i32, Some(false)));
        assert_eq!(lsl(0x4000_0001, 2), (0x4, Some(true)));
        assert_eq!(lsl(0x0000_0001, 32), (0, Some(true)));
        assert_eq!(lsl(0x7FFF_FFFE, 32), (0, Some(false)));
        assert_eq!(lsl(-1, 33), (0, Some(false)));
        assert_eq!(lsl(-1, 255), (0, Some(false)));
    }

    #[test]
    fn test_lsr_edges() {
        let v = 0x8000_0001u32 as i32;
        assert_eq!(lsr(v, 1), (0x4000_0000, Some(true)));
        assert_eq!(lsr(v, 31), (1, Some(false)));
        assert_eq!(lsr(v, 32), (0, Some(true)));
        assert_eq!(lsr(v, 33), (0, Some(false)));
    }

    #[test]
    fn test_asr_saturates() {
        assert_eq!(asr(-1, 40), (-1, Some(true)));
        assert_eq!(asr(i32::MIN, 32), (-1, Some(true)));
        assert_eq!(asr(i32::MAX, 32), (0, Some(false)));
        assert_eq!(asr(i32::MIN, 4), (0xF800_0000u32 as i32, Some(false)));
        assert_eq!(asr(0x18, 4), (0x1, Some(true)));
    }

    #[test]
    fn test_ror() {
        assert_eq!(ror(0x0000_0001, 1), (i32::MIN, Some(true)));
        assert_eq!(ror(0x0000_00F0, 4), (0xF, Some(false)));
        assert_eq!(ror(0x0000_0010, 36), (0x1, Some(false)));
        assert_eq!(ror(i32::MIN, 32), (i32::MIN, Some(true)));
        assert_eq!(ror(0x7000_0000, 64), (0x7000_0000, Some(false)));
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x7FF, 11), -1);
        assert_eq!(sign_extend(0x3FF, 11), 0x3FF);
        assert_eq!(sign_extend(0x80, 8), -128);
    }
}
