//! Sutter reply parsing
//!
//! A move is acknowledged by a lone carriage return. A position reply is the
//! encoded coordinate triple followed by a carriage return.

use super::command_creator::POSITION_LEN;
use motionkit_core::{Axes, ConnectionError, StepPosition};

/// Reply terminator
pub const TERMINATOR: u8 = b'\r';

/// Size of a move acknowledgement
pub const MOVE_REPLY_LEN: usize = 1;

/// Size of a position reply
pub const POSITION_REPLY_LEN: usize = POSITION_LEN + 1;

/// Decode three little-endian `i32`
///
/// `bytes` must hold at least [`POSITION_LEN`] bytes.
pub fn decode_position(bytes: &[u8]) -> StepPosition {
    let axis = |i: usize| {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
        i32::from_le_bytes(raw)
    };
    Axes::new(axis(0), axis(1), axis(2))
}

/// Parse the reply to a position query
pub fn parse_position_reply(reply: &[u8]) -> Result<StepPosition, ConnectionError> {
    if reply.len() != POSITION_REPLY_LEN {
        return Err(ConnectionError::InvalidResponse {
            reason: format!(
                "position reply has {} bytes, expected {}",
                reply.len(),
                POSITION_REPLY_LEN
            ),
        });
    }
    if reply[POSITION_LEN] != TERMINATOR {
        return Err(ConnectionError::InvalidResponse {
            reason: format!(
                "position reply ends with {:#04x}, expected carriage return",
                reply[POSITION_LEN]
            ),
        });
    }
    Ok(decode_position(&reply[..POSITION_LEN]))
}

/// Check the acknowledgement of a move
pub fn parse_move_reply(reply: &[u8]) -> Result<(), ConnectionError> {
    match reply {
        [TERMINATOR] => Ok(()),
        _ => Err(ConnectionError::InvalidResponse {
            reason: format!("move reply {:02x?}, expected carriage return", reply),
        }),
    }
}
