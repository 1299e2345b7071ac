// File-level helpers for patch encoding/application.
//
// Both source and target (or source and patch) are read fully into memory;
// the output goes through a `BufWriter`. With the `file-io` feature, SHA-256
// digests of the target and of the reconstructed output are computed while
// the bytes flow, so callers can compare the two ends.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::patch::{ApplyStats, EncodeError, PatchApplier, PatchError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Patch output size in bytes.
    pub patch_size: u64,
    /// Number of edit items in the patch.
    pub items: u64,
    /// SHA-256 of the target file (if `file-io` feature is enabled).
    pub target_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `apply_file()`.
#[derive(Debug, Clone)]
pub struct ApplyFileStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Byte accounting from the applier.
    pub apply: ApplyStats,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("apply error: {0}")]
    Apply(#[from] PatchError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

pub(crate) const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Diff `source_path` against `target_path` and write the patch to
/// `patch_path`.
#[cfg(feature = "myers")]
pub fn encode_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
) -> Result<EncodeStats, FileError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let items = crate::script::edit_script(&source, &target);

    let patch_file = File::create(patch_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, patch_file);
    let patch_size = crate::patch::encode_patch(&source, &target, &items, &mut writer)?;
    writer.flush()?;

    #[cfg(feature = "file-io")]
    let target_sha256 = Some(sha256(&target));
    #[cfg(not(feature = "file-io"))]
    let target_sha256: Option<[u8; 32]> = None;

    Ok(EncodeStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch_size,
        items: items.len() as u64,
        target_sha256,
    })
}

// ---------------------------------------------------------------------------
// apply_file
// ---------------------------------------------------------------------------

/// Apply the patch at `patch_path` to `source_path`, writing the result to
/// `output_path`.
///
/// On failure the partially written output file is removed.
pub fn apply_file(
    source_path: &Path,
    patch_path: &Path,
    output_path: &Path,
) -> Result<ApplyFileStats, FileError> {
    let source = std::fs::read(source_path)?;
    let patch = std::fs::read(patch_path)?;

    let output_file = File::create(output_path)?;
    let result = write_applied(&source, &patch, output_file);
    if result.is_err() {
        let _ = std::fs::remove_file(output_path);
    }
    let (apply, output_sha256) = result?;

    Ok(ApplyFileStats {
        source_size: source.len() as u64,
        patch_size: patch.len() as u64,
        apply,
        output_sha256,
    })
}

fn write_applied(
    source: &[u8],
    patch: &[u8],
    output_file: File,
) -> Result<(ApplyStats, Option<[u8; 32]>), FileError> {
    let mut output_writer = BufWriter::with_capacity(BUF_SIZE, output_file);
    let applier = PatchApplier::new(source);

    #[cfg(feature = "file-io")]
    let (stats, digest) = {
        let mut hasher = sha2::Sha256::new();
        let mut hashing_writer = HashingWriter {
            inner: &mut output_writer,
            hasher: &mut hasher,
        };
        let stats = applier.apply_to(patch, &mut hashing_writer)?;
        (stats, Some(hasher.finalize().into()))
    };

    #[cfg(not(feature = "file-io"))]
    let (stats, digest) = (applier.apply_to(patch, &mut output_writer)?, None);

    output_writer.flush()?;
    Ok((stats, digest))
}

// ---------------------------------------------------------------------------
// Hashing (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha2::Sha256::digest(data).into()
}

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
