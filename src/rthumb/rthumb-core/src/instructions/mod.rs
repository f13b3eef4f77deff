pub mod instructions;

use core::fmt;
use log::error;

use crate::constants::alu::*;
use crate::constants::registers::*;

// Import trait implementations for Thumb instruction categories
pub use instructions::Alu;
pub use instructions::ControlFlow;
pub use instructions::DataProcessing;
pub use instructions::LoadStore;
pub use instructions::StackOps;

/// The sixteen data-processing operations of the ALU class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    And, // Rd = Rd & Rs
    Eor, // Rd = Rd ^ Rs
    Lsl, // Rd = Rd << Rs
    Lsr, // Rd = Rd >>> Rs
    Asr, // Rd = Rd >> Rs
    Adc, // Rd = Rd + Rs + C
    Sbc, // Rd = Rd - Rs - NOT C
    Ror, // Rd = Rd ROR Rs
    Tst, // flags on Rd & Rs
    Neg, // Rd = -Rs
    Cmp, // flags on Rd - Rs
    Cmn, // flags on Rd + Rs
    Orr, // Rd = Rd | Rs
    Mul, // Rd = Rd * Rs
    Bic, // Rd = Rd & !Rs
    Mvn, // Rd = !Rs
}

impl AluOp {
    /// Map the 4-bit sub-opcode. Wider values mean the field was mis-extracted.
    pub fn from_bits(op: u8) -> AluOp {
        match op {
            AND => AluOp::And,
            EOR => AluOp::Eor,
            LSL => AluOp::Lsl,
            LSR => AluOp::Lsr,
            ASR => AluOp::Asr,
            ADC => AluOp::Adc,
            SBC => AluOp::Sbc,
            ROR => AluOp::Ror,
            TST => AluOp::Tst,
            NEG => AluOp::Neg,
            CMP => AluOp::Cmp,
            CMN => AluOp::Cmn,
            ORR => AluOp::Orr,
            MUL => AluOp::Mul,
            BIC => AluOp::Bic,
            MVN => AluOp::Mvn,
            _ => {
                error!("ALU sub-opcode 0x{:x} reached dispatch unmasked", op);
                unreachable!("ALU sub-opcode not masked to 4 bits: 0x{:x}", op)
            }
        }
    }

    /// TST, CMP and CMN only set flags
    pub fn writes_back(self) -> bool {
        !matches!(self, AluOp::Tst | AluOp::Cmp | AluOp::Cmn)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::And => "and",
            AluOp::Eor => "eor",
            AluOp::Lsl => "lsl",
            AluOp::Lsr => "lsr",
            AluOp::Asr => "asr",
            AluOp::Adc => "adc",
            AluOp::Sbc => "sbc",
            AluOp::Ror => "ror",
            AluOp::Tst => "tst",
            AluOp::Neg => "neg",
            AluOp::Cmp => "cmp",
            AluOp::Cmn => "cmn",
            AluOp::Orr => "orr",
            AluOp::Mul => "mul",
            AluOp::Bic => "bic",
            AluOp::Mvn => "mvn",
        }
    }
}

/// Hi-register operations (selector 0x08 with bit 10 set)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiOp {
    Add,
    Cmp,
    Mov,
    Bx,
}

/// Single-register transfer flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    StoreWord,
    StoreByte,
    StoreHalfword,
    LoadSignedByte,
    LoadWord,
    LoadByte,
    LoadHalfword,
    LoadSignedHalfword,
}

impl Transfer {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Transfer::StoreWord => "str",
            Transfer::StoreByte => "strb",
            Transfer::StoreHalfword => "strh",
            Transfer::LoadSignedByte => "ldsb",
            Transfer::LoadWord => "ldr",
            Transfer::LoadByte => "ldrb",
            Transfer::LoadHalfword => "ldrh",
            Transfer::LoadSignedHalfword => "ldsh",
        }
    }

    /// Bytes moved, which also scales immediate offsets
    pub fn width(self) -> u32 {
        match self {
            Transfer::StoreWord | Transfer::LoadWord => 4,
            Transfer::StoreHalfword | Transfer::LoadHalfword | Transfer::LoadSignedHalfword => 2,
            Transfer::StoreByte | Transfer::LoadByte | Transfer::LoadSignedByte => 1,
        }
    }
}

/// Branch condition field (bits 11-8 of a conditional branch)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Cs,
    Cc,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
    Nv,
}

impl Condition {
    pub fn from_bits(bits: u8) -> Condition {
        match bits {
            0x0 => Condition::Eq,
            0x1 => Condition::Ne,
            0x2 => Condition::Cs,
            0x3 => Condition::Cc,
            0x4 => Condition::Mi,
            0x5 => Condition::Pl,
            0x6 => Condition::Vs,
            0x7 => Condition::Vc,
            0x8 => Condition::Hi,
            0x9 => Condition::Ls,
            0xA => Condition::Ge,
            0xB => Condition::Lt,
            0xC => Condition::Gt,
            0xD => Condition::Le,
            0xE => Condition::Al,
            0xF => Condition::Nv,
            _ => unreachable!("condition not masked to 4 bits: 0x{:x}", bits),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Cs => "cs",
            Condition::Cc => "cc",
            Condition::Mi => "mi",
            Condition::Pl => "pl",
            Condition::Vs => "vs",
            Condition::Vc => "vc",
            Condition::Hi => "hi",
            Condition::Ls => "ls",
            Condition::Ge => "ge",
            Condition::Lt => "lt",
            Condition::Gt => "gt",
            Condition::Le => "le",
            Condition::Al => "al",
            Condition::Nv => "nv",
        }
    }
}

/// 8-bit low register list of the push/pop and multiple-transfer forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterList(pub u8);

impl RegisterList {
    pub fn contains(&self, reg: u8) -> bool {
        reg < 8 && self.0 & (1 << reg) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Selected registers in ascending order, the order they are transferred in
    pub fn registers(&self) -> heapless::Vec<u8, LOW_REGISTER_COUNT> {
        let mut out = heapless::Vec::new();
        for reg in 0..LOW_REGISTER_COUNT as u8 {
            if self.contains(reg) {
                // At most eight bits can be set
                let _ = out.push(reg);
            }
        }
        out
    }
}

/// A decoded Thumb instruction. Register fields are plain indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // Move shifted register
    LslImm { rd: u8, rs: u8, offset5: u8 },
    LsrImm { rd: u8, rs: u8, offset5: u8 },
    AsrImm { rd: u8, rs: u8, offset5: u8 },

    // Add/subtract
    AddReg { rd: u8, rs: u8, rn: u8 },
    AddImm3 { rd: u8, rs: u8, imm3: u8 },
    SubReg { rd: u8, rs: u8, rn: u8 },
    SubImm3 { rd: u8, rs: u8, imm3: u8 },

    // Move/compare/add/subtract immediate
    MovImm8 { rd: u8, imm8: u8 },
    CmpImm8 { rd: u8, imm8: u8 },
    AddImm8 { rd: u8, imm8: u8 },
    SubImm8 { rd: u8, imm8: u8 },

    Alu { op: AluOp, rd: u8, rs: u8 },

    // Register numbers are 0-15 with the H bits folded in
    HiRegister { op: HiOp, rd: u8, rs: u8 },

    PcRelativeLoad { rd: u8, word8: u8 },
    RegisterOffset { kind: Transfer, ro: u8, rb: u8, rd: u8 },
    ImmediateOffset { kind: Transfer, offset5: u8, rb: u8, rd: u8 },
    SpRelative { load: bool, rd: u8, word8: u8 },
    LoadAddress { sp: bool, rd: u8, word8: u8 },

    // Byte offset, already scaled and signed
    AddOffsetToSp { offset: i16 },
    Push { registers: RegisterList, lr: bool },
    Pop { registers: RegisterList, pc: bool },
    StoreMultiple { rb: u8, registers: RegisterList },
    LoadMultiple { rb: u8, registers: RegisterList },

    // Byte offsets relative to the instruction address + 4
    ConditionalBranch { cond: Condition, offset: i32 },
    SoftwareInterrupt { comment: u8 },
    UnconditionalBranch { offset: i32 },

    // `low` is set on the second half (H = 1) carrying offset bits 11-1
    LongBranch { low: bool, offset11: u16 },

    Undefined,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::LslImm { .. } => "lsl",
            Instruction::LsrImm { .. } => "lsr",
            Instruction::AsrImm { .. } => "asr",
            Instruction::AddReg { .. } | Instruction::AddImm3 { .. } => "add",
            Instruction::SubReg { .. } | Instruction::SubImm3 { .. } => "sub",
            Instruction::MovImm8 { .. } => "mov",
            Instruction::CmpImm8 { .. } => "cmp",
            Instruction::AddImm8 { .. } => "add",
            Instruction::SubImm8 { .. } => "sub",
            Instruction::Alu { op, .. } => op.mnemonic(),
            Instruction::HiRegister { op, .. } => match op {
                HiOp::Add => "add",
                HiOp::Cmp => "cmp",
                HiOp::Mov => "mov",
                HiOp::Bx => "bx",
            },
            Instruction::PcRelativeLoad { .. } => "ldr",
            Instruction::RegisterOffset { kind, .. } | Instruction::ImmediateOffset { kind, .. } => {
                kind.mnemonic()
            }
            Instruction::SpRelative { load, .. } => {
                if *load {
                    "ldr"
                } else {
                    "str"
                }
            }
            Instruction::LoadAddress { .. } | Instruction::AddOffsetToSp { .. } => "add",
            Instruction::Push { .. } => "push",
            Instruction::Pop { .. } => "pop",
            Instruction::StoreMultiple { .. } => "stmia",
            Instruction::LoadMultiple { .. } => "ldmia",
            Instruction::ConditionalBranch { .. } | Instruction::UnconditionalBranch { .. } => "b",
            Instruction::SoftwareInterrupt { .. } => "swi",
            Instruction::LongBranch { .. } => "bl",
            Instruction::Undefined => "undefined",
        }
    }
}

/// Register number as written in assembly, with sp/lr/pc aliases
struct RegName(u8);

impl fmt::Display for RegName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            REGISTER_SP => write!(f, "sp"),
            REGISTER_LR => write!(f, "lr"),
            REGISTER_PC => write!(f, "pc"),
            n => write!(f, "r{}", n),
        }
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    registers: &RegisterList,
    extra: Option<u8>,
) -> fmt::Result {
    write!(f, "{{")?;
    let mut first = true;
    for reg in registers.registers().iter().copied().chain(extra) {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "{}", RegName(reg))?;
        first = false;
    }
    write!(f, "}}")
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mn = self.mnemonic();
        match *self {
            Instruction::LslImm { rd, rs, offset5 }
            | Instruction::LsrImm { rd, rs, offset5 }
            | Instruction::AsrImm { rd, rs, offset5 } => {
                write!(f, "{} r{}, r{}, #{}", mn, rd, rs, offset5)
            }
            Instruction::AddReg { rd, rs, rn } | Instruction::SubReg { rd, rs, rn } => {
                write!(f, "{} r{}, r{}, r{}", mn, rd, rs, rn)
            }
            Instruction::AddImm3 { rd, rs, imm3 } | Instruction::SubImm3 { rd, rs, imm3 } => {
                write!(f, "{} r{}, r{}, #{}", mn, rd, rs, imm3)
            }
            Instruction::MovImm8 { rd, imm8 }
            | Instruction::CmpImm8 { rd, imm8 }
            | Instruction::AddImm8 { rd, imm8 }
            | Instruction::SubImm8 { rd, imm8 } => write!(f, "{} r{}, #{}", mn, rd, imm8),
            Instruction::Alu { rd, rs, .. } => write!(f, "{} r{}, r{}", mn, rd, rs),
            Instruction::HiRegister { op: HiOp::Bx, rs, .. } => {
                write!(f, "{} {}", mn, RegName(rs))
            }
            Instruction::HiRegister { rd, rs, .. } => {
                write!(f, "{} {}, {}", mn, RegName(rd), RegName(rs))
            }
            Instruction::PcRelativeLoad { rd, word8 } => {
                write!(f, "{} r{}, [pc, #{}]", mn, rd, word8 as u32 * 4)
            }
            Instruction::RegisterOffset { ro, rb, rd, .. } => {
                write!(f, "{} r{}, [r{}, r{}]", mn, rd, rb, ro)
            }
            Instruction::ImmediateOffset {
                kind,
                offset5,
                rb,
                rd,
            } => write!(
                f,
                "{} r{}, [r{}, #{}]",
                mn,
                rd,
                rb,
                offset5 as u32 * kind.width()
            ),
            Instruction::SpRelative { rd, word8, .. } => {
                write!(f, "{} r{}, [sp, #{}]", mn, rd, word8 as u32 * 4)
            }
            Instruction::LoadAddress { sp, rd, word8 } => write!(
                f,
                "{} r{}, {}, #{}",
                mn,
                rd,
                if sp { "sp" } else { "pc" },
                word8 as u32 * 4
            ),
            Instruction::AddOffsetToSp { offset } => write!(f, "{} sp, #{}", mn, offset),
            Instruction::Push { registers, lr } => {
                write!(f, "{} ", mn)?;
                write_list(f, &registers, if lr { Some(REGISTER_LR) } else { None })
            }
            Instruction::Pop { registers, pc } => {
                write!(f, "{} ", mn)?;
                write_list(f, &registers, if pc { Some(REGISTER_PC) } else { None })
            }
            Instruction::StoreMultiple { rb, registers }
            | Instruction::LoadMultiple { rb, registers } => {
                write!(f, "{} r{}!, ", mn, rb)?;
                write_list(f, &registers, None)
            }
            Instruction::ConditionalBranch { cond, offset } => {
                write!(f, "{}{} #{}", mn, cond.suffix(), offset)
            }
            Instruction::SoftwareInterrupt { comment } => write!(f, "{} #0x{:02x}", mn, comment),
            Instruction::UnconditionalBranch { offset } => write!(f, "{} #{}", mn, offset),
            Instruction::LongBranch { low, offset11 } => write!(
                f,
                "{}.{} #0x{:03x}",
                mn,
                if low { "lo" } else { "hi" },
                offset11
            ),
            Instruction::Undefined => write!(f, "{}", mn),
        }
    }
}
