//! Sutter command encoding

use motionkit_core::StepPosition;

/// Absolute move opcode
pub const MOVE_OPCODE: u8 = b'm';

/// Current position opcode
pub const POSITION_OPCODE: u8 = b'c';

/// Size of one encoded coordinate triple
pub const POSITION_LEN: usize = 12;

/// Size of a complete move command
pub const MOVE_COMMAND_LEN: usize = 1 + POSITION_LEN;

/// Encode a position as three little-endian `i32`
pub fn encode_position(position: &StepPosition) -> Vec<u8> {
    position
        .to_array()
        .iter()
        .flat_map(|axis| axis.to_le_bytes())
        .collect()
}

/// Build an absolute move command
pub fn move_command(position: &StepPosition) -> Vec<u8> {
    let mut command = Vec::with_capacity(MOVE_COMMAND_LEN);
    command.push(MOVE_OPCODE);
    command.extend(encode_position(position));
    command
}

/// Build a position query
pub fn position_command() -> Vec<u8> {
    vec![POSITION_OPCODE]
}
