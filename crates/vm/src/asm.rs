//! Text form of programs.
//!
//! [`assemble`] turns whitespace separated mnemonics into bytecode. `PUSHn` takes one operand,
//! written in hex (`0x2a`) or decimal (`42`), left padded to `n` bytes. Everything after a `;`
//! on a line is a comment.
//!
//! [`disassemble`] goes the other way and yields one [`Instruction`] per decoded opcode.

use crate::{opcodes::Opcode, utils::u256_to_big_endian};
use bytes::Bytes;
use ethereum_types::U256;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsmError {
    #[error("Unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("Missing operand after {0:?}")]
    MissingOperand(Opcode),
    #[error("Invalid operand `{operand}` for {opcode:?}")]
    InvalidOperand { opcode: Opcode, operand: String },
    #[error("Operand `{operand}` does not fit in {opcode:?}")]
    OperandTooLarge { opcode: Opcode, operand: String },
}

/// Assembles mnemonic source into bytecode.
pub fn assemble(source: &str) -> Result<Bytes, AsmError> {
    let mut tokens = source
        .lines()
        .map(|line| line.split(';').next().unwrap_or_default())
        .flat_map(str::split_ascii_whitespace);
    let mut bytecode: Vec<u8> = Vec::new();

    while let Some(symbol) = tokens.next() {
        let opcode = Opcode::from_str(&symbol.to_ascii_uppercase())
            .map_err(|_| AsmError::UnknownMnemonic(symbol.to_string()))?;
        bytecode.push(opcode.into());

        let push_size = opcode.immediate_size();
        if push_size > 0 {
            let operand = tokens.next().ok_or(AsmError::MissingOperand(opcode))?;
            bytecode.extend(encode_operand(opcode, operand, push_size)?);
        }
    }

    Ok(bytecode.into())
}

fn encode_operand(opcode: Opcode, operand: &str, push_size: usize) -> Result<Vec<u8>, AsmError> {
    let invalid = || AsmError::InvalidOperand {
        opcode,
        operand: operand.to_string(),
    };
    let too_large = || AsmError::OperandTooLarge {
        opcode,
        operand: operand.to_string(),
    };

    let decoded = match operand.strip_prefix("0x") {
        Some(digits) => {
            // Odd digit counts are read as if they had a leading zero.
            let digits = if digits.len() % 2 == 1 {
                format!("0{digits}")
            } else {
                digits.to_string()
            };
            hex::decode(digits).map_err(|_| invalid())?
        }
        None => {
            let value = U256::from_dec_str(operand).map_err(|_| invalid())?;
            let word = u256_to_big_endian(value);
            let significant = word.len().saturating_sub(value.bits().div_ceil(8));
            word.get(significant..).unwrap_or_default().to_vec()
        }
    };

    let padding = push_size.checked_sub(decoded.len()).ok_or_else(too_large)?;
    let mut encoded = vec![0u8; padding];
    encoded.extend(decoded);
    Ok(encoded)
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    /// The byte actually found at `offset`. Differs from `opcode` for undefined bytes.
    pub byte: u8,
    pub opcode: Opcode,
    /// Immediate bytes of a `PUSHn`. Shorter than `n` when the code ends early.
    pub immediate: Bytes,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}: {:?}", self.offset, self.opcode)?;
        if !self.immediate.is_empty() {
            write!(f, " 0x{}", hex::encode(&self.immediate))?;
        }
        if u8::from(self.opcode) != self.byte {
            write!(f, " ; undefined byte {:#04x}", self.byte)?;
        }
        Ok(())
    }
}

/// Decodes `bytecode` into instructions, skipping over push data.
pub fn disassemble(bytecode: &Bytes) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut offset = 0;

    while let Some(&byte) = bytecode.get(offset) {
        let opcode = Opcode::from(byte);
        let start = offset.saturating_add(1);
        let end = start
            .saturating_add(opcode.immediate_size())
            .min(bytecode.len());
        let immediate = if start < end {
            bytecode.slice(start..end)
        } else {
            Bytes::new()
        };

        instructions.push(Instruction {
            offset,
            byte,
            opcode,
            immediate,
        });
        offset = start.saturating_add(opcode.immediate_size());
    }

    instructions
}

/// Listing of `bytecode`, one instruction per line.
pub fn disassemble_to_string(bytecode: &Bytes) -> String {
    disassemble(bytecode)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn assembles_push_operands() {
        let bytecode = assemble(
            "PUSH1 0x80 PUSH1 64 MSTORE ; free memory pointer
             push4 0xcdfead2e
             PUSH2 0x1 PUSH0",
        )
        .unwrap();
        assert_eq!(bytecode.as_ref(), hex!("6080604052 63cdfead2e 610001 5f"));
    }

    #[test]
    fn rejects_bad_source() {
        assert_eq!(
            assemble("PUSH1"),
            Err(AsmError::MissingOperand(Opcode::PUSH1))
        );
        assert_eq!(
            assemble("SELFDESTRUCT"),
            Err(AsmError::UnknownMnemonic("SELFDESTRUCT".to_string()))
        );
        assert_eq!(
            assemble("PUSH1 256"),
            Err(AsmError::OperandTooLarge {
                opcode: Opcode::PUSH1,
                operand: "256".to_string()
            })
        );
        assert!(matches!(
            assemble("PUSH1 0xzz"),
            Err(AsmError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn decimal_zero_pads_to_push_width() {
        assert_eq!(assemble("PUSH2 0").unwrap().as_ref(), hex!("610000"));
    }

    #[test]
    fn disassembles_with_offsets() {
        let bytecode = Bytes::from_static(&hex!("6080 5b 0c 61ff"));
        let listing = disassemble_to_string(&bytecode);
        assert_eq!(
            listing,
            "0x0000: PUSH1 0x80\n0x0002: JUMPDEST\n0x0003: INVALID ; undefined byte 0x0c\n0x0004: PUSH2 0xff"
        );
    }

    #[test]
    fn listing_reassembles() {
        let bytecode = Bytes::from_static(&hex!("6004361060305760e01c5b00"));
        let listing = disassemble_to_string(&bytecode);
        let source = listing
            .lines()
            .map(|line| line.split_once(": ").map(|(_, code)| code).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(assemble(&source).unwrap(), bytecode);
    }
}
