use crate::constants::cpsr::*;
use crate::constants::modes::*;
use log::warn;

/// Processor operating modes encoded in CPSR bits 4-0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    User = MODE_USER,
    Fiq = MODE_FIQ,
    Irq = MODE_IRQ,
    Supervisor = MODE_SUPERVISOR,
    Abort = MODE_ABORT,
    Undefined = MODE_UNDEFINED,
    System = MODE_SYSTEM,
}

impl Mode {
    /// Map a 5-bit mode code to a defined mode; not every combination is one
    pub fn from_bits(bits: u8) -> Option<Mode> {
        match bits & MODE_MASK as u8 {
            MODE_USER => Some(Mode::User),
            MODE_FIQ => Some(Mode::Fiq),
            MODE_IRQ => Some(Mode::Irq),
            MODE_SUPERVISOR => Some(Mode::Supervisor),
            MODE_ABORT => Some(Mode::Abort),
            MODE_UNDEFINED => Some(Mode::Undefined),
            MODE_SYSTEM => Some(Mode::System),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Current Program Status Register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cpsr {
    pub negative: bool, // N - bit 31
    pub zero: bool,     // Z - bit 30
    pub carry: bool,    // C - bit 29
    pub overflow: bool, // V - bit 28

    pub irq_disable: bool, // I - bit 7
    pub fiq_disable: bool, // F - bit 6
    pub thumb: bool,       // T - bit 5, clear while the 32-bit set is active

    mode: u8, // bits 4-0
}

impl Default for Cpsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpsr {
    /// Fresh register in user mode with every flag clear
    pub fn new() -> Self {
        Self {
            negative: false,
            zero: false,
            carry: false,
            overflow: false,
            irq_disable: false,
            fiq_disable: false,
            thumb: false,
            mode: MODE_USER,
        }
    }

    /// Overwrite every field from a raw register word. Reserved bits are dropped.
    pub fn load(&mut self, cpsr: u32) {
        self.negative = cpsr & FLAG_NEGATIVE != 0;
        self.zero = cpsr & FLAG_ZERO != 0;
        self.carry = cpsr & FLAG_CARRY != 0;
        self.overflow = cpsr & FLAG_OVERFLOW != 0;

        self.irq_disable = cpsr & IRQ_DISABLE != 0;
        self.fiq_disable = cpsr & FIQ_DISABLE != 0;
        self.thumb = cpsr & THUMB_STATE != 0;
        self.mode = (cpsr & MODE_MASK) as u8;

        if Mode::from_bits(self.mode).is_none() {
            warn!("CPSR loaded with undefined mode 0x{:02x}", self.mode);
        }
    }

    /// Pack the register back into its hardware layout
    pub fn save(&self) -> u32 {
        let mut result = 0;
        if self.negative {
            result |= FLAG_NEGATIVE;
        }
        if self.zero {
            result |= FLAG_ZERO;
        }
        if self.carry {
            result |= FLAG_CARRY;
        }
        if self.overflow {
            result |= FLAG_OVERFLOW;
        }

        if self.irq_disable {
            result |= IRQ_DISABLE;
        }
        if self.fiq_disable {
            result |= FIQ_DISABLE;
        }
        if self.thumb {
            result |= THUMB_STATE;
        }
        result | (self.mode as u32 & MODE_MASK)
    }

    /// Raw 5-bit mode code, possibly undefined after a `load`
    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn operating_mode(&self) -> Option<Mode> {
        Mode::from_bits(self.mode)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode.bits();
    }

    pub fn set_nz(&mut self, result: i32) {
        self.negative = result < 0;
        self.zero = result == 0;
    }

    /// Latch the shifter carry-out; `None` means the shifter left C alone
    pub fn set_shifter_carry(&mut self, carry: Option<bool>) {
        if let Some(c) = carry {
            self.carry = c;
        }
    }

    /// a + b, setting N Z C V
    pub fn add_flags(&mut self, a: i32, b: i32) -> i32 {
        let (result, carry) = (a as u32).overflowing_add(b as u32);
        self.carry = carry;
        self.overflow = a.overflowing_add(b).1;
        self.set_nz(result as i32);
        result as i32
    }

    /// a - b, setting N Z C V. C is the inverted borrow.
    pub fn sub_flags(&mut self, a: i32, b: i32) -> i32 {
        let (result, borrow) = (a as u32).overflowing_sub(b as u32);
        self.carry = !borrow;
        self.overflow = a.overflowing_sub(b).1;
        self.set_nz(result as i32);
        result as i32
    }

    /// a + b + C, setting N Z C V
    pub fn add_carry_flags(&mut self, a: i32, b: i32) -> i32 {
        let carry_in = self.carry as u64;
        let unsigned = a as u32 as u64 + b as u32 as u64 + carry_in;
        let signed = a as i64 + b as i64 + carry_in as i64;
        let result = unsigned as u32 as i32;

        self.carry = unsigned > u32::MAX as u64;
        self.overflow = signed != result as i64;
        self.set_nz(result);
        result
    }

    /// a - b - NOT C, setting N Z C V
    pub fn sub_carry_flags(&mut self, a: i32, b: i32) -> i32 {
        let borrow_in = (!self.carry) as u64;
        let signed = a as i64 - b as i64 - borrow_in as i64;
        let result = (a as u32)
            .wrapping_sub(b as u32)
            .wrapping_sub(borrow_in as u32) as i32;

        self.carry = a as u32 as u64 >= b as u32 as u64 + borrow_in;
        self.overflow = signed != result as i64;
        self.set_nz(result);
        result
    }
}
