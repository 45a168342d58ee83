//! Static evidence: does an agent's source plausibly emit each marker?
//!
//! This stands in for running the agent. A marker counts as supported when
//! it appears verbatim in the agent's sources, or when its stem shows up
//! inside one of the recognised logging idioms ([`super::idioms`]).

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::idioms::{find_idiom, marker_stem, Idiom, IDIOMS};
use crate::config::{AgentEntry, GateConfig};
use crate::report::Status;
use crate::structural::agent_dir;

/// Per-file cap for source text (64 MB).
const MAX_SOURCE_BYTES: u64 = 64 * 1024 * 1024;

/// Concatenates every source-like file under `dir`: grouped by extension in
/// config order, sorted tree order within a group. Idiom patterns may span
/// file boundaries, so this order is part of the result. Unreadable files
/// are skipped; a missing directory yields empty text.
pub fn read_sources(dir: &Path, cfg: &GateConfig) -> String {
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && cfg.is_source_file(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    let mut texts = Vec::new();
    for ext in &cfg.source_extensions {
        for p in files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == ext.as_str()))
        {
            match crate::fs_guard::read_text_lossy(p, MAX_SOURCE_BYTES) {
                Ok(t) => texts.push(t),
                Err(err) => tracing::debug!(path = %p.display(), error = %err, "skipping source"),
            }
        }
    }
    texts.join("\n")
}

/// How a marker was found in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Literal,
    Idiom(&'static str),
}

pub fn token_support(token: &str, text: &str, idioms: &'static [Idiom]) -> Result<Option<Support>> {
    if text.contains(token) {
        return Ok(Some(Support::Literal));
    }
    Ok(find_idiom(idioms, marker_stem(token), text)?.map(|i| Support::Idiom(i.description)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentGap {
    pub agent: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaticReport {
    pub status: Status,
    pub missing: Vec<AgentGap>,
}

/// Markers of `agent` with no literal or idiomatic support in its sources.
pub fn scan_agent(root: &Path, cfg: &GateConfig, agent: &AgentEntry) -> Result<Vec<String>> {
    let text = read_sources(&agent_dir(root, &agent.name), cfg);
    let mut missing = Vec::new();
    for token in &agent.markers {
        match token_support(token, &text, IDIOMS)? {
            Some(how) => tracing::debug!(agent = %agent.name, %token, ?how, "marker supported"),
            None => missing.push(token.clone()),
        }
    }
    Ok(missing)
}

/// Scans every registered agent; PASS only when no marker is missing.
pub fn scan(root: &Path, cfg: &GateConfig) -> Result<StaticReport> {
    let mut gaps = Vec::new();
    for agent in &cfg.agents {
        let missing = scan_agent(root, cfg, agent)?;
        if !missing.is_empty() {
            gaps.push(AgentGap {
                agent: agent.name.clone(),
                missing,
            });
        }
    }
    let report = StaticReport {
        status: Status::from_ok(gaps.is_empty()),
        missing: gaps,
    };
    tracing::info!(status = %report.status, agents_with_gaps = report.missing.len(), "static scan finished");
    Ok(report)
}

impl StaticReport {
    /// Human-readable summary: verdict line, then one line per agent gap.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("STATIC VERIFY: {}", self.status)];
        for gap in &self.missing {
            lines.push(format!("- {}: missing {}", gap.agent, gap.missing.join(", ")));
        }
        lines
    }
}
