use core::fmt;

/// Architectural exceptions raised while executing a Thumb instruction.
/// These belong to the emulated program and are handed back to the driver
/// loop, which vectors them; they never abort the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// Encoding with no defined meaning in the Thumb set
    UndefinedInstruction { pc: u32, word: u16 },
    /// SWI with its 8-bit comment field
    SoftwareInterrupt { pc: u32, comment: u8 },
}

impl Exception {
    /// Address of the instruction that raised the exception
    pub fn pc(&self) -> u32 {
        match *self {
            Exception::UndefinedInstruction { pc, .. } | Exception::SoftwareInterrupt { pc, .. } => {
                pc
            }
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exception::UndefinedInstruction { pc, word } => {
                write!(f, "undefined Thumb instruction 0x{:04x} at 0x{:08x}", word, pc)
            }
            Exception::SoftwareInterrupt { pc, comment } => {
                write!(f, "software interrupt #0x{:02x} at 0x{:08x}", comment, pc)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Exception {}
