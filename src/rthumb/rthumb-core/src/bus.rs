/// Read-only view of the memory map, lent by the surrounding CPU core
pub trait Bus {
    /// Read one byte at the given address
    fn read_byte(&self, address: u32) -> u8;
}

/// Access to the eight low general-purpose registers (r0-r7)
pub trait LowRegisters {
    /// Read a low register. `index` is always in 0..=7.
    fn low_reg(&self, index: u8) -> i32;

    /// Write a low register. Implementations mask `index` to 3 bits, so callers
    /// may hand over a byte with other fields packed above bit 2.
    fn set_low_reg(&mut self, index: u8, value: i32);
}

impl Bus for [u8] {
    // Flat image starting at address 0; reads past the end float high
    fn read_byte(&self, address: u32) -> u8 {
        self.get(address as usize).copied().unwrap_or(0xFF)
    }
}

impl<const N: usize> Bus for [u8; N] {
    fn read_byte(&self, address: u32) -> u8 {
        self[..].read_byte(address)
    }
}

impl LowRegisters for [i32; 8] {
    fn low_reg(&self, index: u8) -> i32 {
        self[(index & 0x7) as usize]
    }

    fn set_low_reg(&mut self, index: u8, value: i32) {
        self[(index & 0x7) as usize] = value;
    }
}

#[cfg(test)]
mod bus_tests {
    use super::*;

    #[test]
    fn test_register_array_masks_index() {
        let mut regs = [0i32; 8];
        regs.set_low_reg(0xFA, -5); // r2 packed with other bits
        assert_eq!(regs[2], -5);
        assert_eq!(regs.low_reg(2), -5);
    }

    #[test]
    fn test_slice_bus_out_of_range() {
        let image = [0x12u8, 0x34];
        assert_eq!(image.read_byte(1), 0x34);
        assert_eq!(image.read_byte(2), 0xFF);
    }
}
