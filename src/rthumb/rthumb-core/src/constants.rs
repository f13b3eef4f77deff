// Operating mode codes held in CPSR bits 4-0
pub mod modes {
    pub const MODE_USER: u8 = 0x10;
    pub const MODE_FIQ: u8 = 0x11;
    pub const MODE_IRQ: u8 = 0x12;
    pub const MODE_SUPERVISOR: u8 = 0x13;
    pub const MODE_ABORT: u8 = 0x17;
    pub const MODE_UNDEFINED: u8 = 0x1B;
    pub const MODE_SYSTEM: u8 = 0x1F;
}

pub mod cpsr {
    // Condition flags
    pub const FLAG_NEGATIVE: u32 = 0x8000_0000; // Bit 31
    pub const FLAG_ZERO: u32 = 0x4000_0000; // Bit 30
    pub const FLAG_CARRY: u32 = 0x2000_0000; // Bit 29
    pub const FLAG_OVERFLOW: u32 = 0x1000_0000; // Bit 28

    // Bits 27-8 are reserved

    // Control bits
    pub const IRQ_DISABLE: u32 = 0x80; // Bit 7
    pub const FIQ_DISABLE: u32 = 0x40; // Bit 6
    pub const THUMB_STATE: u32 = 0x20; // Bit 5
    pub const MODE_MASK: u32 = 0x1F; // Bits 4-0
}

pub mod decode {
    // Primary selector (bits 15-11)
    pub const SELECTOR_OFFSET: u16 = 11;
    pub const SELECTOR_MASK: u16 = 0x1F;

    // Single-bit switches in the high byte
    pub const BIT_8: u16 = 1 << 8;
    pub const BIT_9: u16 = 1 << 9;
    pub const BIT_10: u16 = 1 << 10;
    pub const BITS_10_8: u16 = 0x0700;
    pub const BITS_10_9: u16 = 0x0600;
    pub const PUSH_POP_PATTERN: u16 = 0x0400; // Bit 10 set, bit 9 clear
    pub const SWI_CONDITION: u8 = 0xF;

    // Low register fields
    pub const RD_OFFSET: u16 = 0;
    pub const RS_OFFSET: u16 = 3;
    pub const RN_OFFSET: u16 = 6;
    pub const RD_HIGH_OFFSET: u16 = 8;
    pub const REG_MASK: u16 = 0x7;

    // Immediate fields
    pub const OFFSET5_OFFSET: u16 = 6;
    pub const OFFSET5_MASK: u16 = 0x1F;
    pub const IMM3_MASK: u16 = 0x7;
    pub const IMM8_MASK: u16 = 0xFF;
    pub const SWORD7_MASK: u16 = 0x7F;
    pub const SWORD7_SIGN: u16 = 1 << 7;
    pub const OFFSET11_MASK: u16 = 0x7FF;
    pub const CONDITION_OFFSET: u16 = 8;
    pub const CONDITION_MASK: u16 = 0xF;

    // ALU and hi-register sub-opcodes
    pub const ALU_OP_OFFSET: u16 = 6;
    pub const ALU_OP_MASK: u16 = 0xF;
    pub const HI_OP_OFFSET: u16 = 8;
    pub const HI_OP_MASK: u16 = 0x3;
    pub const H1: u16 = 1 << 7;
    pub const H2: u16 = 1 << 6;
}

pub mod alu {
    // 4-bit ALU sub-opcodes (bits 9-6)
    pub const AND: u8 = 0x0;
    pub const EOR: u8 = 0x1;
    pub const LSL: u8 = 0x2;
    pub const LSR: u8 = 0x3;
    pub const ASR: u8 = 0x4;
    pub const ADC: u8 = 0x5;
    pub const SBC: u8 = 0x6;
    pub const ROR: u8 = 0x7;
    pub const TST: u8 = 0x8;
    pub const NEG: u8 = 0x9;
    pub const CMP: u8 = 0xA;
    pub const CMN: u8 = 0xB;
    pub const ORR: u8 = 0xC;
    pub const MUL: u8 = 0xD;
    pub const BIC: u8 = 0xE;
    pub const MVN: u8 = 0xF;
}

pub mod registers {
    pub const LOW_REGISTER_COUNT: usize = 8;
    pub const REGISTER_SP: u8 = 13;
    pub const REGISTER_LR: u8 = 14;
    pub const REGISTER_PC: u8 = 15;
}
