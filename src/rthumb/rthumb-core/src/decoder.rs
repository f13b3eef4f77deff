use crate::constants::decode::*;
use crate::instructions::{AluOp, Condition, HiOp, Instruction, RegisterList, Transfer};
use crate::utils::sign_extend;
use log::error;

/// Extract a field of `mask` width starting at bit `offset`
fn field(word: u16, offset: u16, mask: u16) -> u8 {
    ((word >> offset) & mask) as u8
}

/// Selector 0x03: bit 9 picks add/sub, bit 10 picks register/immediate
fn decode_add_sub(word: u16, rd: u8, rs: u8) -> Instruction {
    let rn = field(word, RN_OFFSET, IMM3_MASK); // Rn or Offset3
    let subtract = word & BIT_9 != 0;
    let immediate = word & BIT_10 != 0;

    match (subtract, immediate) {
        (false, false) => Instruction::AddReg { rd, rs, rn },
        (false, true) => Instruction::AddImm3 { rd, rs, imm3: rn },
        (true, false) => Instruction::SubReg { rd, rs, rn },
        (true, true) => Instruction::SubImm3 { rd, rs, imm3: rn },
    }
}

/// Selector 0x08 with bit 10 set: ADD/CMP/MOV/BX on r0-r15
fn decode_hi_register(word: u16, rd: u8, rs: u8) -> Instruction {
    let op = match field(word, HI_OP_OFFSET, HI_OP_MASK) {
        0 => HiOp::Add,
        1 => HiOp::Cmp,
        2 => HiOp::Mov,
        3 => HiOp::Bx,
        op => unreachable!("hi-register op not masked to 2 bits: {}", op),
    };

    // H1 and H2 select the upper bank for Rd and Rs
    let rd = if word & H1 != 0 { rd | 0x8 } else { rd };
    let rs = if word & H2 != 0 { rs | 0x8 } else { rs };
    Instruction::HiRegister { op, rd, rs }
}

/// Selectors 0x0A (stores and LDSB) and 0x0B (loads), split on bits 10 and 9
fn decode_register_offset(word: u16, load: bool, rd: u8, rb: u8) -> Instruction {
    let sign_or_halfword = word & BIT_9 != 0;
    let byte_or_signed = word & BIT_10 != 0;

    let kind = match (load, sign_or_halfword, byte_or_signed) {
        (false, false, false) => Transfer::StoreWord,
        (false, false, true) => Transfer::StoreByte,
        (false, true, false) => Transfer::StoreHalfword,
        (false, true, true) => Transfer::LoadSignedByte,
        (true, false, false) => Transfer::LoadWord,
        (true, false, true) => Transfer::LoadByte,
        (true, true, false) => Transfer::LoadHalfword,
        (true, true, true) => Transfer::LoadSignedHalfword,
    };
    let ro = field(word, RN_OFFSET, REG_MASK);
    Instruction::RegisterOffset { kind, ro, rb, rd }
}

/// Selector 0x16: add offset to SP (bits 10-8 clear) or PUSH (bit 10 set, bit 9 clear)
fn decode_sp_offset_or_push(word: u16) -> Instruction {
    if word & BITS_10_8 == 0 {
        let magnitude = ((word & SWORD7_MASK) << 2) as i16;
        let offset = if word & SWORD7_SIGN != 0 {
            -magnitude
        } else {
            magnitude
        };
        Instruction::AddOffsetToSp { offset }
    } else if word & BITS_10_9 == PUSH_POP_PATTERN {
        Instruction::Push {
            registers: RegisterList(field(word, 0, IMM8_MASK)),
            lr: word & BIT_8 != 0,
        }
    } else {
        Instruction::Undefined
    }
}

/// Selector 0x17: POP (bit 10 set, bit 9 clear)
fn decode_pop(word: u16) -> Instruction {
    if word & BITS_10_9 == PUSH_POP_PATTERN {
        Instruction::Pop {
            registers: RegisterList(field(word, 0, IMM8_MASK)),
            pc: word & BIT_8 != 0,
        }
    } else {
        Instruction::Undefined
    }
}

fn decode_conditional_branch(word: u16) -> Instruction {
    let cond = field(word, CONDITION_OFFSET, CONDITION_MASK);
    let offset8 = field(word, 0, IMM8_MASK);
    Instruction::ConditionalBranch {
        cond: Condition::from_bits(cond),
        offset: (offset8 as i8 as i32) << 1,
    }
}

/// Classify a 16-bit Thumb instruction word by its top 5 bits
pub fn decoder(word: u16) -> Instruction {
    let selector = (word >> SELECTOR_OFFSET) & SELECTOR_MASK;

    // Fields shared by most formats
    let rd = field(word, RD_OFFSET, REG_MASK);
    let rs = field(word, RS_OFFSET, REG_MASK);
    let rd_high = field(word, RD_HIGH_OFFSET, REG_MASK);
    let offset5 = field(word, OFFSET5_OFFSET, OFFSET5_MASK);
    let imm8 = field(word, 0, IMM8_MASK);

    match selector {
        0x00 => Instruction::LslImm { rd, rs, offset5 },
        0x01 => Instruction::LsrImm { rd, rs, offset5 },
        0x02 => Instruction::AsrImm { rd, rs, offset5 },
        0x03 => decode_add_sub(word, rd, rs),
        0x04 => Instruction::MovImm8 { rd: rd_high, imm8 },
        0x05 => Instruction::CmpImm8 { rd: rd_high, imm8 },
        0x06 => Instruction::AddImm8 { rd: rd_high, imm8 },
        0x07 => Instruction::SubImm8 { rd: rd_high, imm8 },
        0x08 => {
            if word & BIT_10 == 0 {
                let op = AluOp::from_bits(field(word, ALU_OP_OFFSET, ALU_OP_MASK));
                Instruction::Alu { op, rd, rs }
            } else {
                decode_hi_register(word, rd, rs)
            }
        }
        0x09 => Instruction::PcRelativeLoad {
            rd: rd_high,
            word8: imm8,
        },
        0x0A => decode_register_offset(word, false, rd, rs),
        0x0B => decode_register_offset(word, true, rd, rs),
        0x0C..=0x11 => {
            let kind = match selector {
                0x0C => Transfer::StoreWord,
                0x0D => Transfer::LoadWord,
                0x0E => Transfer::StoreByte,
                0x0F => Transfer::LoadByte,
                0x10 => Transfer::StoreHalfword,
                _ => Transfer::LoadHalfword,
            };
            Instruction::ImmediateOffset {
                kind,
                offset5,
                rb: rs,
                rd,
            }
        }
        0x12 => Instruction::SpRelative {
            load: false,
            rd: rd_high,
            word8: imm8,
        },
        0x13 => Instruction::SpRelative {
            load: true,
            rd: rd_high,
            word8: imm8,
        },
        0x14 => Instruction::LoadAddress {
            sp: false,
            rd: rd_high,
            word8: imm8,
        },
        0x15 => Instruction::LoadAddress {
            sp: true,
            rd: rd_high,
            word8: imm8,
        },
        0x16 => decode_sp_offset_or_push(word),
        0x17 => decode_pop(word),
        0x18 => Instruction::StoreMultiple {
            rb: rd_high,
            registers: RegisterList(imm8),
        },
        0x19 => Instruction::LoadMultiple {
            rb: rd_high,
            registers: RegisterList(imm8),
        },
        0x1A => decode_conditional_branch(word),
        0x1B => {
            if field(word, CONDITION_OFFSET, CONDITION_MASK) == SWI_CONDITION {
                Instruction::SoftwareInterrupt { comment: imm8 }
            } else {
                decode_conditional_branch(word)
            }
        }
        0x1C => Instruction::UnconditionalBranch {
            offset: sign_extend((word & OFFSET11_MASK) as u32, 11) << 1,
        },
        0x1D => Instruction::Undefined,
        0x1E => Instruction::LongBranch {
            low: false,
            offset11: word & OFFSET11_MASK,
        },
        0x1F => Instruction::LongBranch {
            low: true,
            offset11: word & OFFSET11_MASK,
        },
        _ => {
            error!(
                "Invalid value found. We didn't properly mask the selector bits. {}",
                selector
            );
            unreachable!("selector wider than 5 bits");
        }
    }
}
