//! # agentgate -- release-readiness gate for agent bundles
//!
//! An agent bundle ships only after three independent gates agree:
//!
//! 1. **Structure**: required files, metadata keys, and weight payload
//!    counts ([`structural`]).
//! 2. **Static evidence**: each agent's source plausibly emits every
//!    expected marker ([`evidence::static_scan`]).
//! 3. **Runtime evidence**: every marker literally appears in the agent's
//!    logs, and each agent ships exactly one weight payload
//!    ([`evidence::runtime_scan`]).
//!
//! A separate utility stamps the SHA-256 of a weight file into its
//! metadata record ([`digest`]).
//!
//! All gates are stateless scans of a filesystem snapshot. Findings are
//! collected into reports; nothing short-circuits on the first defect.
//!
//! ## Strict and relaxed mode
//!
//! The structural gate promotes issues to hard failures differently per
//! mode (see [`report::Issue::is_hardfail`]). Relaxed mode tolerates a
//! missing top-level `CMakeLists.txt` and only that file
//! ([`report::RELAXED_EXEMPT_TOP_FILE`]).
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Agent registry, marker table, required file lists |
//! | [`fs_guard`] | Symlink-safe, size-bounded file reads |
//! | [`metadata`] | `model.yaml` parsing and round-trip |
//! | [`digest`] | Streaming SHA-256 and signature stamping |
//! | [`report`] | Issues, modes, failure promotion |
//! | [`structural`] | Structural gate |
//! | [`evidence`] | Static and runtime marker scanners |
//! | [`check`] | Combined JSON report |

/// Symlink-safe, size-bounded file reads for every text input.
pub mod fs_guard;

/// Gate configuration: the single agent registry and marker table.
pub mod config;

pub mod metadata;

/// Weight digests and the `signatures.artifact_sig` stamp.
pub mod digest;

pub mod report;

pub mod structural;

pub mod evidence;

pub mod check;
