// Patch format: serialization of edit scripts and streaming reconstruction.
//
// # Modules
//
// - `varint`  — LEB128 variable-length integers (little-endian base-128)
// - `item`    — Edit items and decoded patch items
// - `error`   — Encode/apply error types
// - `reader`  — Forward-only byte source over a patch buffer
// - `iter`    — Item-by-item patch decoding
// - `encoder` — Edit script -> patch stream
// - `applier` — Source + patch stream -> target, in one forward pass

pub mod applier;
pub mod encoder;
pub mod error;
pub mod item;
pub mod iter;
pub mod reader;
pub mod varint;

// Re-export key types for convenience.
pub use applier::{ApplyStats, PatchApplier, apply_patch, apply_to_vec};
pub use encoder::{PatchEncoder, encode_patch, encode_to_vec, encoded_len};
pub use error::{EncodeError, PatchError};
pub use item::{EditItem, PatchItem};
pub use iter::ItemIterator;
pub use reader::PatchReader;
