//! Consistent-hashing placement.
//!
//! Every node and every key is hashed onto a 32-bit ring. A key belongs to
//! the first node found clockwise from the key's position, wrapping to the
//! lowest position past `u32::MAX`. Adding or removing a node only moves the
//! keys in the arc that node owns.

mod hash_ring;
mod ring_guard;
pub use hash_ring::*;
pub use ring_guard::*;
