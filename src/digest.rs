//! Weight artifact digests and the `signatures.artifact_sig` stamp.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::{fs, io::Read, path::Path};

use crate::metadata;

/// Read size for streaming digests. Peak memory stays at one chunk
/// regardless of artifact size.
const CHUNK_BYTES: usize = 1 << 20;

/// Metadata key the weight digest is stamped under.
pub const ARTIFACT_SIG_KEY: &str = "artifact_sig";

/// Lowercase hex SHA-256 of the full content of `p`.
pub fn sha256_file_streaming(p: &Path) -> Result<String> {
    let mut f = fs::File::open(p).with_context(|| format!("open {}", p.display()))?;
    let mut h = Sha256::new();
    let mut buf = vec![0u8; CHUNK_BYTES];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", p.display()))?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(hex::encode(h.finalize()))
}

/// Hashes `weights` and writes the digest into `metadata_path` as
/// `signatures.artifact_sig`. Returns the digest.
///
/// The weight file is only read. The record is rewritten in full; callers
/// stamping the same record concurrently must serialize themselves.
pub fn stamp_artifact_sig(metadata_path: &Path, weights: &Path) -> Result<String> {
    let digest = sha256_file_streaming(weights)?;
    let mut record = metadata::load_record(metadata_path)?;
    metadata::set_signature(&mut record, ARTIFACT_SIG_KEY, &digest)
        .with_context(|| format!("stamp {}", metadata_path.display()))?;
    metadata::save_record(metadata_path, &record)?;
    tracing::info!(
        record = %metadata_path.display(),
        artifact = %weights.display(),
        %digest,
        "stamped artifact signature"
    );
    Ok(digest)
}

/// Outcome of comparing a stamped record against its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigCheck {
    Match(String),
    Mismatch { stamped: String, actual: String },
    Unstamped { actual: String },
}

impl SigCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Recomputes the digest of `weights` and compares it with the stamp in
/// `metadata_path`.
pub fn check_artifact_sig(metadata_path: &Path, weights: &Path) -> Result<SigCheck> {
    let actual = sha256_file_streaming(weights)?;
    let record = metadata::load_record(metadata_path)?;
    Ok(match metadata::signature(&record, ARTIFACT_SIG_KEY) {
        None => SigCheck::Unstamped { actual },
        Some(s) if s.eq_ignore_ascii_case(&actual) => SigCheck::Match(actual),
        Some(s) => SigCheck::Mismatch {
            stamped: s.to_string(),
            actual,
        },
    })
}
