//! Text command protocol shared by the front door, the consensus log and the
//! state machine.
//!
//! Wire format: ASCII tokens separated by a single space, verb first. There is
//! no quoting or escaping, so keys and values cannot contain spaces.

mod codec;
pub use codec::*;
