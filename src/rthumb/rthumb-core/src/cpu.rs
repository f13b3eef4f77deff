use crate::bus::{Bus, LowRegisters};
use crate::cpsr::Cpsr;
use crate::decoder::decoder;
use crate::error::Exception;
use crate::instructions::{Alu, ControlFlow, DataProcessing, Instruction, LoadStore, StackOps};
use log::{trace, warn};

/// What a successfully dispatched instruction did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Registers and flags were updated
    Executed,
    /// Decoded, but its semantics are left to the surrounding core. Nothing
    /// was changed.
    NotModelled(Instruction),
}

/// Thumb execution context. Borrows the low register file and the status
/// register from the owning core for the duration of one or more steps.
pub struct Thumb<'a, R: LowRegisters + ?Sized> {
    regs: &'a mut R,
    pub(crate) cpsr: &'a mut Cpsr,
}

/// Read the halfword at `pc`, low byte first
pub fn fetch<B: Bus + ?Sized>(bus: &B, pc: u32) -> u16 {
    let lo = bus.read_byte(pc);
    let hi = bus.read_byte(pc.wrapping_add(1));
    u16::from_le_bytes([lo, hi])
}

impl<'a, R: LowRegisters + ?Sized> Thumb<'a, R> {
    pub fn new(regs: &'a mut R, cpsr: &'a mut Cpsr) -> Self {
        Thumb { regs, cpsr }
    }

    pub fn cpsr(&self) -> &Cpsr {
        self.cpsr
    }

    pub(crate) fn reg(&self, index: u8) -> i32 {
        self.regs.low_reg(index)
    }

    pub(crate) fn set_reg(&mut self, index: u8, value: i32) {
        self.regs.set_low_reg(index, value);
    }

    /// Fetch, decode and execute the instruction at `pc`. The program
    /// counter itself is owned by the caller and is not advanced here.
    pub fn execute<B: Bus + ?Sized>(&mut self, bus: &B, pc: u32) -> Result<Outcome, Exception> {
        let word = fetch(bus, pc);
        let inst = decoder(word);
        trace!("0x{:08x}: {:04x}  {}", pc, word, inst);
        self.dispatch(pc, word, &inst)
    }

    /// Execute an already decoded instruction. `pc` and `word` only feed the
    /// exception records.
    pub fn dispatch(
        &mut self,
        pc: u32,
        word: u16,
        inst: &Instruction,
    ) -> Result<Outcome, Exception> {
        match *inst {
            Instruction::LslImm { rd, rs, offset5 } => self.lsl_imm(rd, rs, offset5),
            Instruction::LsrImm { rd, rs, offset5 } => self.lsr_imm(rd, rs, offset5),
            Instruction::AsrImm { rd, rs, offset5 } => self.asr_imm(rd, rs, offset5),
            Instruction::AddReg { rd, rs, rn } => self.add_reg(rd, rs, rn),
            Instruction::SubReg { rd, rs, rn } => self.sub_reg(rd, rs, rn),
            Instruction::AddImm3 { rd, rs, imm3 } => self.add_imm3(rd, rs, imm3),
            Instruction::SubImm3 { rd, rs, imm3 } => self.sub_imm3(rd, rs, imm3),
            Instruction::MovImm8 { rd, imm8 } => self.mov_imm8(rd, imm8),
            Instruction::CmpImm8 { rd, imm8 } => self.cmp_imm8(rd, imm8),
            Instruction::AddImm8 { rd, imm8 } => self.add_imm8(rd, imm8),
            Instruction::SubImm8 { rd, imm8 } => self.sub_imm8(rd, imm8),
            Instruction::Alu { op, rd, rs } => self.alu(op, rd, rs),
            Instruction::HiRegister { .. } => return Ok(self.hi_register(inst)),
            Instruction::PcRelativeLoad { .. } => return Ok(self.pc_relative_load(inst)),
            Instruction::RegisterOffset { .. } => return Ok(self.register_offset(inst)),
            Instruction::ImmediateOffset { .. } => return Ok(self.immediate_offset(inst)),
            Instruction::SpRelative { .. } => return Ok(self.sp_relative(inst)),
            Instruction::LoadAddress { .. } => return Ok(self.load_address(inst)),
            Instruction::AddOffsetToSp { .. } => return Ok(self.add_offset_to_sp(inst)),
            Instruction::Push { .. } => return Ok(self.push(inst)),
            Instruction::Pop { .. } => return Ok(self.pop(inst)),
            Instruction::StoreMultiple { .. } => return Ok(self.store_multiple(inst)),
            Instruction::LoadMultiple { .. } => return Ok(self.load_multiple(inst)),
            Instruction::ConditionalBranch { .. } => return Ok(self.conditional_branch(inst)),
            Instruction::UnconditionalBranch { .. } => {
                return Ok(self.unconditional_branch(inst))
            }
            Instruction::LongBranch { .. } => return Ok(self.long_branch(inst)),
            Instruction::SoftwareInterrupt { comment } => {
                trace!("SWI #0x{:02x} at 0x{:08x}", comment, pc);
                return Err(Exception::SoftwareInterrupt { pc, comment });
            }
            Instruction::Undefined => {
                warn!("Undefined instruction 0x{:04x} at 0x{:08x}", word, pc);
                return Err(Exception::UndefinedInstruction { pc, word });
            }
        }
        Ok(Outcome::Executed)
    }
}

#[cfg(test)]
mod cpu_tests {
    use super::*;
    use crate::instructions::tests::{init_logger, run, MockCore};
    use crate::instructions::{AluOp, Condition};

    #[test]
    fn test_fetch_is_little_endian() {
        let image = [0x34u8, 0x12, 0x78, 0x56];
        assert_eq!(fetch(&image, 0), 0x1234);
        assert_eq!(fetch(&image, 2), 0x5678);
        // Past the end reads back as 0xFF
        assert_eq!(fetch(&image, 3), 0xFF56);
    }

    #[test]
    fn test_execute_at_offset() {
        init_logger();
        let mut core = MockCore::new([0; 8]);
        let mut cpsr = Cpsr::new();
        // MOV r0, #1 ; MOV r1, #2
        let image = [0x01u8, 0x20, 0x02, 0x21];
        let mut thumb = Thumb::new(&mut core, &mut cpsr);
        assert_eq!(thumb.execute(&image[..], 2), Ok(Outcome::Executed));
        assert_eq!(thumb.execute(&image[..], 0), Ok(Outcome::Executed));
        assert_eq!(core.regs[0], 1);
        assert_eq!(core.regs[1], 2);
    }

    #[test]
    fn test_undefined_traps() {
        let mut core = MockCore::new([0; 8]);
        let mut cpsr = Cpsr::new();
        // Selector 0x1D
        let word = 0xE800;
        assert_eq!(
            run(word, &mut core, &mut cpsr),
            Err(Exception::UndefinedInstruction { pc: 0, word })
        );
        // Selector 0x16 without the SP-offset or push pattern
        let word = 0xB100;
        assert_eq!(
            run(word, &mut core, &mut cpsr),
            Err(Exception::UndefinedInstruction { pc: 0, word })
        );
        assert_eq!(core.writes(), 0);
        assert_eq!(cpsr, Cpsr::new());
    }

    #[test]
    fn test_software_interrupt() {
        let mut core = MockCore::new([0; 8]);
        let mut cpsr = Cpsr::new();
        let result = run(0xDF2A, &mut core, &mut cpsr);
        assert_eq!(result, Err(Exception::SoftwareInterrupt { pc: 0, comment: 0x2A }));
        assert_eq!(result.unwrap_err().pc(), 0);
    }

    #[test]
    fn test_stub_groups_are_not_modelled() {
        let stubs: [u16; 8] = [
            0x4770, // BX lr
            0x4801, // LDR r0, [pc, #4]
            0x5888, // LDR r0, [r1, r2]
            0x6048, // STR r0, [r1, #4]
            0xB081, // SUB sp, #4
            0xB510, // PUSH {r4, lr}
            0xE7FE, // B .
            0xF000, // BL high half
        ];
        for &word in stubs.iter() {
            let mut core = MockCore::new([1, 2, 3, 4, 5, 6, 7, 8]);
            let mut cpsr = Cpsr::new();
            let inst = decoder(word);
            assert_eq!(run(word, &mut core, &mut cpsr), Ok(Outcome::NotModelled(inst)));
            assert_eq!(core.writes(), 0);
            assert_eq!(core.regs, [1, 2, 3, 4, 5, 6, 7, 8]);
            assert_eq!(cpsr, Cpsr::new());
        }
    }

    #[test]
    fn test_conditional_branch_not_modelled() {
        let mut core = MockCore::new([0; 8]);
        let mut cpsr = Cpsr::new();
        // BNE with offset -4
        let result = run(0xD1FE, &mut core, &mut cpsr);
        assert_eq!(
            result,
            Ok(Outcome::NotModelled(Instruction::ConditionalBranch {
                cond: Condition::Ne,
                offset: -4,
            }))
        );
    }

    #[test]
    fn test_dispatch_decoded() {
        let mut core = MockCore::new([6, 7, 0, 0, 0, 0, 0, 0]);
        let mut cpsr = Cpsr::new();
        let inst = Instruction::Alu { op: AluOp::Mul, rd: 0, rs: 1 };
        let mut thumb = Thumb::new(&mut core, &mut cpsr);
        assert_eq!(thumb.dispatch(0, 0x4348, &inst), Ok(Outcome::Executed));
        assert!(!thumb.cpsr().zero);
        assert_eq!(core.regs[0], 42);
    }
}
