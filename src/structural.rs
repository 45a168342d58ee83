//! Structural gate: required files, metadata keys, and weight payload
//! counts for every registered agent.
//!
//! Findings are collected, never raised. One pass reports every defect.

use std::{fs, path::Path};

use crate::config::{AgentEntry, GateConfig};
use crate::metadata;
use crate::report::{Issue, Mode, Verdict, TOP};

/// Number of weight payloads directly inside `weights_dir`. A missing or
/// unreadable directory holds zero. Symlinked payloads count; entries that
/// resolve to directories do not.
pub fn count_weight_payloads(weights_dir: &Path, cfg: &GateConfig) -> usize {
    let entries = match fs::read_dir(weights_dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %weights_dir.display(), error = %e, "weights dir unreadable");
            return 0;
        }
    };
    entries
        .filter_map(Result::ok)
        .filter(|e| !e.path().is_dir())
        .filter(|e| e.file_name().to_str().is_some_and(|n| cfg.is_weight_file(n)))
        .count()
}

pub fn agent_dir(root: &Path, agent: &str) -> std::path::PathBuf {
    root.join("agents").join(agent)
}

pub fn check_top(root: &Path, cfg: &GateConfig) -> Vec<Issue> {
    cfg.required_top_files
        .iter()
        .filter(|f| !root.join(f).exists())
        .map(|f| Issue::missing(TOP, f.as_str()))
        .collect()
}

pub fn check_scripts(root: &Path, cfg: &GateConfig) -> Vec<Issue> {
    cfg.required_scripts
        .iter()
        .filter(|f| !root.join(f).exists())
        .map(|f| Issue::missing(TOP, f.as_str()))
        .collect()
}

fn check_agent(root: &Path, cfg: &GateConfig, agent: &AgentEntry, mode: Mode, out: &mut Vec<Issue>) {
    let name = agent.name.as_str();
    let base = agent_dir(root, name);
    if !base.exists() {
        out.push(Issue::missing(name, "dir"));
        return;
    }

    for f in &cfg.required_agent_files {
        if !base.join(f).exists() {
            out.push(Issue::missing(name, f.as_str()));
        }
    }

    let record = metadata::read_key_values(&base.join(&cfg.metadata_file));
    for key in &cfg.required_metadata_keys {
        if !record.contains_key(key) {
            out.push(Issue::missing(name, format!("{}:{key}", cfg.metadata_file)));
        }
    }

    let bins = count_weight_payloads(&base.join(&cfg.weights_dir), cfg);
    let ext = &cfg.weight_extension;
    match mode {
        Mode::Strict if bins != 1 => {
            out.push(Issue::new(
                name,
                cfg.weights_dir.as_str(),
                format!("expect 1 .{ext}, found {bins}"),
            ));
        }
        Mode::Relaxed if bins == 0 => {
            tracing::warn!(agent = name, "no weight payload present");
            out.push(Issue::new(
                name,
                cfg.weights_dir.as_str(),
                format!("warn: no .{ext} present (relaxed mode)"),
            ));
        }
        _ => {}
    }
}

pub fn check_agents(root: &Path, cfg: &GateConfig, mode: Mode) -> Vec<Issue> {
    let mut out = Vec::new();
    for agent in &cfg.agents {
        let before = out.len();
        check_agent(root, cfg, agent, mode, &mut out);
        tracing::debug!(agent = %agent.name, issues = out.len() - before, "agent checked");
    }
    out
}

/// Runs every structural check in report order: top-level files, agents,
/// then auxiliary scripts.
pub fn check_bundle(root: &Path, cfg: &GateConfig, mode: Mode) -> Verdict {
    let mut issues = check_top(root, cfg);
    issues.extend(check_agents(root, cfg, mode));
    issues.extend(check_scripts(root, cfg));
    let verdict = Verdict::from_issues(mode, issues);
    tracing::info!(
        ?mode,
        status = %verdict.status,
        issues = verdict.issues.len(),
        warnings = verdict.issues.iter().filter(|i| i.is_warning()).count(),
        hardfails = verdict.hardfails.len(),
        "structural gate finished"
    );
    verdict
}
