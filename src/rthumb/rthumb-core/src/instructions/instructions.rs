use super::{AluOp, Instruction};
use crate::bus::LowRegisters;
use crate::cpu::{Outcome, Thumb};
use crate::utils;
use log::debug;

/// Move shifted register, add/subtract and the 8-bit immediate forms
pub trait DataProcessing {
    fn lsl_imm(&mut self, rd: u8, rs: u8, offset5: u8); // LSL Rd, Rs, #Offset5
    fn lsr_imm(&mut self, rd: u8, rs: u8, offset5: u8); // LSR Rd, Rs, #Offset5
    fn asr_imm(&mut self, rd: u8, rs: u8, offset5: u8); // ASR Rd, Rs, #Offset5
    fn add_reg(&mut self, rd: u8, rs: u8, rn: u8); // ADD Rd, Rs, Rn
    fn add_imm3(&mut self, rd: u8, rs: u8, imm3: u8); // ADD Rd, Rs, #Offset3
    fn sub_reg(&mut self, rd: u8, rs: u8, rn: u8); // SUB Rd, Rs, Rn
    fn sub_imm3(&mut self, rd: u8, rs: u8, imm3: u8); // SUB Rd, Rs, #Offset3
    fn mov_imm8(&mut self, rd: u8, imm8: u8); // MOV Rd, #Offset8
    fn cmp_imm8(&mut self, rd: u8, imm8: u8); // CMP Rd, #Offset8
    fn add_imm8(&mut self, rd: u8, imm8: u8); // ADD Rd, #Offset8
    fn sub_imm8(&mut self, rd: u8, imm8: u8); // SUB Rd, #Offset8
}

impl<'a, R: LowRegisters + ?Sized> DataProcessing for Thumb<'a, R> {
    fn lsl_imm(&mut self, rd: u8, rs: u8, offset5: u8) {
        // LSL #0 leaves carry alone
        let (val, carry) = utils::lsl(self.reg(rs), offset5 as u32);
        self.cpsr.set_shifter_carry(carry);
        self.cpsr.set_nz(val);
        self.set_reg(rd, val);
    }

    fn lsr_imm(&mut self, rd: u8, rs: u8, offset5: u8) {
        // An encoded #0 is LSR #32
        let amount = if offset5 == 0 { 32 } else { offset5 as u32 };
        let (val, carry) = utils::lsr(self.reg(rs), amount);
        self.cpsr.set_shifter_carry(carry);
        self.cpsr.set_nz(val);
        self.set_reg(rd, val);
    }

    fn asr_imm(&mut self, rd: u8, rs: u8, offset5: u8) {
        // An encoded #0 is ASR #32
        let amount = if offset5 == 0 { 32 } else { offset5 as u32 };
        let (val, carry) = utils::asr(self.reg(rs), amount);
        self.cpsr.set_shifter_carry(carry);
        self.cpsr.set_nz(val);
        self.set_reg(rd, val);
    }

    fn add_reg(&mut self, rd: u8, rs: u8, rn: u8) {
        let arg = self.reg(rn);
        let source = self.reg(rs);
        let result = self.cpsr.add_flags(source, arg);
        self.set_reg(rd, result);
    }

    fn add_imm3(&mut self, rd: u8, rs: u8, imm3: u8) {
        let source = self.reg(rs);
        let result = self.cpsr.add_flags(source, imm3 as i32);
        self.set_reg(rd, result);
    }

    fn sub_reg(&mut self, rd: u8, rs: u8, rn: u8) {
        let arg = self.reg(rn);
        let source = self.reg(rs);
        let result = self.cpsr.sub_flags(source, arg);
        self.set_reg(rd, result);
    }

    fn sub_imm3(&mut self, rd: u8, rs: u8, imm3: u8) {
        let source = self.reg(rs);
        let result = self.cpsr.sub_flags(source, imm3 as i32);
        self.set_reg(rd, result);
    }

    fn mov_imm8(&mut self, rd: u8, imm8: u8) {
        // Zero-extended, so never negative
        self.cpsr.negative = false;
        self.cpsr.zero = imm8 == 0;
        self.set_reg(rd, imm8 as i32);
    }

    fn cmp_imm8(&mut self, rd: u8, imm8: u8) {
        let val = self.reg(rd);
        self.cpsr.sub_flags(val, imm8 as i32);
    }

    fn add_imm8(&mut self, rd: u8, imm8: u8) {
        let val = self.reg(rd);
        let result = self.cpsr.add_flags(val, imm8 as i32);
        self.set_reg(rd, result);
    }

    fn sub_imm8(&mut self, rd: u8, imm8: u8) {
        let val = self.reg(rd);
        let result = self.cpsr.sub_flags(val, imm8 as i32);
        self.set_reg(rd, result);
    }
}

/// Format 4 ALU operations, `Rd op= Rs`
pub trait Alu {
    fn alu(&mut self, op: AluOp, rd: u8, rs: u8);
    fn and(&mut self, rd: u8, rs: u8);
    fn eor(&mut self, rd: u8, rs: u8);
    fn lsl(&mut self, rd: u8, rs: u8);
    fn lsr(&mut self, rd: u8, rs: u8);
    fn asr(&mut self, rd: u8, rs: u8);
    fn adc(&mut self, rd: u8, rs: u8);
    fn sbc(&mut self, rd: u8, rs: u8);
    fn ror(&mut self, rd: u8, rs: u8);
    fn tst(&mut self, rd: u8, rs: u8);
    fn neg(&mut self, rd: u8, rs: u8);
    fn cmp(&mut self, rd: u8, rs: u8);
    fn cmn(&mut self, rd: u8, rs: u8);
    fn orr(&mut self, rd: u8, rs: u8);
    fn mul(&mut self, rd: u8, rs: u8);
    fn bic(&mut self, rd: u8, rs: u8);
    fn mvn(&mut self, rd: u8, rs: u8);
}

impl<'a, R: LowRegisters + ?Sized> Thumb<'a, R> {
    /// Only the bottom byte of Rs counts as a shift amount
    fn shift_amount(&self, rs: u8) -> u32 {
        self.reg(rs) as u32 & 0xFF
    }

    fn write_logical(&mut self, rd: u8, val: i32) {
        self.cpsr.set_nz(val);
        self.set_reg(rd, val);
    }

    fn write_shifted(&mut self, rd: u8, (val, carry): (i32, Option<bool>)) {
        self.cpsr.set_shifter_carry(carry);
        self.write_logical(rd, val);
    }
}

impl<'a, R: LowRegisters + ?Sized> Alu for Thumb<'a, R> {
    fn alu(&mut self, op: AluOp, rd: u8, rs: u8) {
        match op {
            AluOp::And => self.and(rd, rs),
            AluOp::Eor => self.eor(rd, rs),
            AluOp::Lsl => self.lsl(rd, rs),
            AluOp::Lsr => self.lsr(rd, rs),
            AluOp::Asr => self.asr(rd, rs),
            AluOp::Adc => self.adc(rd, rs),
            AluOp::Sbc => self.sbc(rd, rs),
            AluOp::Ror => self.ror(rd, rs),
            AluOp::Tst => self.tst(rd, rs),
            AluOp::Neg => self.neg(rd, rs),
            AluOp::Cmp => self.cmp(rd, rs),
            AluOp::Cmn => self.cmn(rd, rs),
            AluOp::Orr => self.orr(rd, rs),
            AluOp::Mul => self.mul(rd, rs),
            AluOp::Bic => self.bic(rd, rs),
            AluOp::Mvn => self.mvn(rd, rs),
        }
    }

    fn and(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd) & self.reg(rs);
        self.write_logical(rd, val);
    }

    fn eor(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd) ^ self.reg(rs);
        self.write_logical(rd, val);
    }

    fn lsl(&mut self, rd: u8, rs: u8) {
        let shifted = utils::lsl(self.reg(rd), self.shift_amount(rs));
        self.write_shifted(rd, shifted);
    }

    fn lsr(&mut self, rd: u8, rs: u8) {
        let shifted = utils::lsr(self.reg(rd), self.shift_amount(rs));
        self.write_shifted(rd, shifted);
    }

    fn asr(&mut self, rd: u8, rs: u8) {
        let shifted = utils::asr(self.reg(rd), self.shift_amount(rs));
        self.write_shifted(rd, shifted);
    }

    fn adc(&mut self, rd: u8, rs: u8) {
        let (a, b) = (self.reg(rd), self.reg(rs));
        let result = self.cpsr.add_carry_flags(a, b);
        self.set_reg(rd, result);
    }

    fn sbc(&mut self, rd: u8, rs: u8) {
        let (a, b) = (self.reg(rd), self.reg(rs));
        let result = self.cpsr.sub_carry_flags(a, b);
        self.set_reg(rd, result);
    }

    fn ror(&mut self, rd: u8, rs: u8) {
        let rotated = utils::ror(self.reg(rd), self.shift_amount(rs));
        self.write_shifted(rd, rotated);
    }

    fn tst(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd) & self.reg(rs);
        self.cpsr.set_nz(val);
    }

    fn neg(&mut self, rd: u8, rs: u8) {
        // Only 0 and i32::MIN negate to themselves
        let val = self.reg(rs);
        let negated = val.wrapping_neg();
        self.cpsr.overflow = val == negated;
        self.write_logical(rd, negated);
    }

    fn cmp(&mut self, rd: u8, rs: u8) {
        let (a, b) = (self.reg(rd), self.reg(rs));
        self.cpsr.sub_flags(a, b);
    }

    fn cmn(&mut self, rd: u8, rs: u8) {
        let (a, b) = (self.reg(rd), self.reg(rs));
        self.cpsr.add_flags(a, b);
    }

    fn orr(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd) | self.reg(rs);
        self.write_logical(rd, val);
    }

    fn mul(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd).wrapping_mul(self.reg(rs));
        self.cpsr.carry = false;
        self.write_logical(rd, val);
    }

    fn bic(&mut self, rd: u8, rs: u8) {
        let val = self.reg(rd) & !self.reg(rs);
        self.write_logical(rd, val);
    }

    fn mvn(&mut self, rd: u8, rs: u8) {
        let val = !self.reg(rs);
        self.write_logical(rd, val);
    }
}

fn not_modelled(cmd: &Instruction) -> Outcome {
    debug!("No execution semantics for '{}'", cmd);
    Outcome::NotModelled(*cmd)
}

/// Single-register transfers and address generation. Memory writes belong to
/// the surrounding core, so these report the decoded form back to it.
pub trait LoadStore {
    fn pc_relative_load(&mut self, cmd: &Instruction) -> Outcome;
    fn register_offset(&mut self, cmd: &Instruction) -> Outcome;
    fn immediate_offset(&mut self, cmd: &Instruction) -> Outcome;
    fn sp_relative(&mut self, cmd: &Instruction) -> Outcome;
    fn load_address(&mut self, cmd: &Instruction) -> Outcome;
}

impl<'a, R: LowRegisters + ?Sized> LoadStore for Thumb<'a, R> {
    fn pc_relative_load(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn register_offset(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn immediate_offset(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn sp_relative(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn load_address(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }
}

/// Stack pointer adjustment and multiple-register transfers
pub trait StackOps {
    fn add_offset_to_sp(&mut self, cmd: &Instruction) -> Outcome;
    fn push(&mut self, cmd: &Instruction) -> Outcome;
    fn pop(&mut self, cmd: &Instruction) -> Outcome;
    fn store_multiple(&mut self, cmd: &Instruction) -> Outcome;
    fn load_multiple(&mut self, cmd: &Instruction) -> Outcome;
}

impl<'a, R: LowRegisters + ?Sized> StackOps for Thumb<'a, R> {
    fn add_offset_to_sp(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn push(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn pop(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn store_multiple(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn load_multiple(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }
}

/// Hi-register operations and branches; these touch r8-r15 or the PC
pub trait ControlFlow {
    fn hi_register(&mut self, cmd: &Instruction) -> Outcome; // ADD/CMP/MOV/BX on Hs/Hd
    fn conditional_branch(&mut self, cmd: &Instruction) -> Outcome;
    fn unconditional_branch(&mut self, cmd: &Instruction) -> Outcome;
    fn long_branch(&mut self, cmd: &Instruction) -> Outcome; // BL, either half
}

impl<'a, R: LowRegisters + ?Sized> ControlFlow for Thumb<'a, R> {
    fn hi_register(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn conditional_branch(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn unconditional_branch(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }

    fn long_branch(&mut self, cmd: &Instruction) -> Outcome {
        not_modelled(cmd)
    }
}


#[cfg(test)]
mod alu_tests {
    use crate::constants::alu::*;
    use crate::cpsr::Cpsr;
    use crate::instructions::tests::{run, MockCore};
    use crate::instructions::AluOp;

    /// ALU op with Rd = r0 and Rs = r1
    fn alu(op: u8) -> u16 {
        0x4000 | (op as u16) << 6 | 1 << 3
    }

    fn exec(op: u8, rd: i32, rs: i32, cpsr: &mut Cpsr) -> MockCore {
        let mut core = MockCore::new([rd, rs, 0, 0, 0, 0, 0, 0]);
        run(alu(op), &mut core, cpsr).unwrap();
        core
    }

    #[test]
    fn test_logical_ops_leave_carry_overflow() {
        let mut cpsr = Cpsr::new();
        cpsr.carry = true;
        cpsr.overflow = true;

        assert_eq!(exec(AND, 0b1100, 0b1010, &mut cpsr).regs[0], 0b1000);
        assert_eq!(exec(EOR, 0b1100, 0b1010, &mut cpsr).regs[0], 0b0110);
        assert_eq!(exec(ORR, 0b1100, 0b1010, &mut cpsr).regs[0], 0b1110);
        assert_eq!(exec(BIC, 0b1100, 0b1010, &mut cpsr).regs[0], 0b0100);
        assert!(!cpsr.negative && !cpsr.zero);

        assert_eq!(exec(MVN, 0x1234, 0, &mut cpsr).regs[0], -1);
        assert!(cpsr.negative);

        assert_eq!(exec(AND, 0b0101, 0b1010, &mut cpsr).regs[0], 0);
        assert!(cpsr.zero);
        assert!(cpsr.carry && cpsr.overflow);
    }

    #[test]
    fn test_lsr_by_register_32_and_33() {
        let mut cpsr = Cpsr::new();
        let v = 0x8000_0001u32 as i32;

        assert_eq!(exec(LSR, v, 32, &mut cpsr).regs[0], 0);
        assert!(cpsr.carry && cpsr.zero);

        assert_eq!(exec(LSR, v, 33, &mut cpsr).regs[0], 0);
        assert!(!cpsr.carry && cpsr.zero);
    }

    #[test]
    fn test_shift_uses_bottom_byte_only() {
        let mut cpsr = Cpsr::new();
        let v = 0x8000_0001u32 as i32;

        // 0x120 shifts by 0x20
        assert_eq!(exec(LSR, v, 0x120, &mut cpsr).regs[0], 0);
        assert!(cpsr.carry);

        // 0x100 shifts by 0: value and carry untouched
        assert_eq!(exec(LSR, v, 0x100, &mut cpsr).regs[0], v);
        assert!(cpsr.carry && cpsr.negative);
    }

    #[test]
    fn test_lsl_by_register() {
        let mut cpsr = Cpsr::new();
        assert_eq!(exec(LSL, 1, 32, &mut cpsr).regs[0], 0);
        assert!(cpsr.carry && cpsr.zero);

        assert_eq!(exec(LSL, -1, 255, &mut cpsr).regs[0], 0);
        assert!(!cpsr.carry);

        assert_eq!(exec(LSL, 3, 1, &mut cpsr).regs[0], 6);
        assert!(!cpsr.carry && !cpsr.zero);
    }

    #[test]
    fn test_asr_saturates() {
        let mut cpsr = Cpsr::new();
        assert_eq!(exec(ASR, -1, 40, &mut cpsr).regs[0], -1);
        assert!(cpsr.carry && cpsr.negative);

        assert_eq!(exec(ASR, 0x7FFF_FFFF, 200, &mut cpsr).regs[0], 0);
        assert!(!cpsr.carry && cpsr.zero);
    }

    #[test]
    fn test_ror_by_register() {
        let mut cpsr = Cpsr::new();
        assert_eq!(exec(ROR, 0x0000_0003, 1, &mut cpsr).regs[0], 0x8000_0001u32 as i32);
        assert!(cpsr.carry && cpsr.negative);

        // Multiples of 32 keep the value and copy bit 31 to carry
        assert_eq!(exec(ROR, 0x4000_0000, 64, &mut cpsr).regs[0], 0x4000_0000);
        assert!(!cpsr.carry);

        cpsr.carry = true;
        assert_eq!(exec(ROR, 0x4000_0000, 0, &mut cpsr).regs[0], 0x4000_0000);
        assert!(cpsr.carry);
    }

    #[test]
    fn test_adc_sbc_use_carry() {
        let mut cpsr = Cpsr::new();
        cpsr.carry = true;
        assert_eq!(exec(ADC, 1, 1, &mut cpsr).regs[0], 3);
        assert!(!cpsr.carry);

        cpsr.carry = false;
        assert_eq!(exec(SBC, 5, 2, &mut cpsr).regs[0], 2);
        assert!(cpsr.carry);

        cpsr.carry = true;
        assert_eq!(exec(SBC, 5, 2, &mut cpsr).regs[0], 3);
    }

    #[test]
    fn test_neg_overflow_cases() {
        let mut cpsr = Cpsr::new();
        assert_eq!(exec(NEG, 0, i32::MIN, &mut cpsr).regs[0], i32::MIN);
        assert!(cpsr.overflow && cpsr.negative);

        assert_eq!(exec(NEG, 7, 0, &mut cpsr).regs[0], 0);
        assert!(cpsr.overflow && cpsr.zero);

        assert_eq!(exec(NEG, 0, 5, &mut cpsr).regs[0], -5);
        assert!(!cpsr.overflow && cpsr.negative);
    }

    #[test]
    fn test_mul_clears_carry() {
        let mut cpsr = Cpsr::new();
        cpsr.carry = true;
        cpsr.overflow = true;
        assert_eq!(exec(MUL, 3, -2, &mut cpsr).regs[0], -6);
        assert!(!cpsr.carry && cpsr.negative);
        assert!(cpsr.overflow);

        cpsr.carry = true;
        assert_eq!(exec(MUL, 0x10000, 0x10000, &mut cpsr).regs[0], 0);
        assert!(!cpsr.carry && cpsr.zero);
    }

    #[test]
    fn test_flag_only_ops_leave_rd() {
        for &op in [TST, CMP, CMN].iter() {
            let mut cpsr = Cpsr::new();
            let core = exec(op, 7, 7, &mut cpsr);
            assert_eq!(core.regs[0], 7);
            assert_eq!(core.writes(), 0);
        }

        let mut cpsr = Cpsr::new();
        exec(CMP, 7, 7, &mut cpsr);
        assert!(cpsr.zero && cpsr.carry);

        exec(CMN, 1, -1, &mut cpsr);
        assert!(cpsr.zero && cpsr.carry);

        exec(TST, 0x8000_0000u32 as i32, -1, &mut cpsr);
        assert!(cpsr.negative && !cpsr.zero);
    }

    #[test]
    fn test_write_back_matches_op_class() {
        for op in 0..16u8 {
            let mut cpsr = Cpsr::new();
            let core = exec(op, 0x55, 3, &mut cpsr);
            let wrote = core.writes() != 0;
            assert_eq!(wrote, AluOp::from_bits(op).writes_back(), "op {:x}", op);
        }
    }
}
