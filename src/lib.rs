//! Bytepatch: compact binary patches replayed in a single forward pass.
//!
//! The crate provides:
//! - The patch wire format, encoder and applier (`patch`)
//! - Edit scripts from a Myers diff, plus script validation (`script`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(feature = "myers")] {
//! use bytepatch::patch;
//! use bytepatch::script;
//!
//! let source = b"hello old world";
//! let target = b"hello new world";
//!
//! let items = script::edit_script(source, target);
//! let delta = patch::encode_to_vec(source, target, &items).unwrap();
//! let restored = patch::apply_to_vec(source, &delta).unwrap();
//! assert_eq!(restored, target);
//! # }
//! ```

pub mod io;
pub mod patch;
pub mod script;

#[cfg(feature = "cli")]
pub mod cli;
