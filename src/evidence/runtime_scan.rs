//! Runtime evidence: did every marker actually show up in the agents' logs,
//! and does every agent ship exactly one weight payload?
//!
//! Unlike the static scan there is no idiom fallback here. A marker either
//! appears verbatim in a log or the agent fails.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::config::{AgentEntry, GateConfig};
use crate::structural::{agent_dir, count_weight_payloads};

/// Per-file cap for log text (64 MB).
const MAX_LOG_BYTES: u64 = 64 * 1024 * 1024;

const LOG_SUFFIX: &str = ".log";

/// Every failing condition of one runtime pass, in the order found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeReport {
    pub failures: Vec<String>,
}

impl RuntimeReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Weight payload count check. Always exact, whatever the structural mode.
pub fn check_weights(root: &Path, cfg: &GateConfig) -> Vec<String> {
    let mut out = Vec::new();
    for agent in cfg.agent_names() {
        let wdir = agent_dir(root, agent).join(&cfg.weights_dir);
        let n = count_weight_payloads(&wdir, cfg);
        if n != 1 {
            out.push(format!(
                "FAIL: expected 1 weight in {}, found {n}",
                wdir.display()
            ));
        }
    }
    out
}

/// Does a log file name belong to the agent filed under `name`?
///
/// Two conventions: the name appears anywhere in the file stem, or the
/// file stem starts with the lowercased name.
fn is_candidate(file_name: &str, name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(LOG_SUFFIX) else {
        return false;
    };
    stem.contains(name) || stem.starts_with(&name.to_lowercase())
}

/// Log files in `logs_dir` that belong to `agent` under its own name or
/// any alias, sorted and deduplicated. Symlinks stay candidates; whether
/// they can be read is decided by [`read_logs`].
pub fn candidate_logs(logs_dir: &Path, agent: &AgentEntry) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(logs_dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| !e.path().is_dir())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| agent.log_names().any(|name| is_candidate(n, name)))
        })
        .map(|e| e.path())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Concatenated log text; unreadable files are skipped.
pub fn read_logs(paths: &[PathBuf]) -> String {
    let mut content = String::new();
    for p in paths {
        match crate::fs_guard::read_text_lossy(p, MAX_LOG_BYTES) {
            Ok(t) => {
                content.push_str(&t);
                content.push('\n');
            }
            Err(e) => tracing::debug!(path = %p.display(), error = %e, "skipping log"),
        }
    }
    content
}

pub fn scan_logs(root: &Path, cfg: &GateConfig) -> Vec<String> {
    let logs_dir = root.join(&cfg.logs_dir);
    if !logs_dir.exists() {
        return vec![format!("FAIL: {}/ directory not found", cfg.logs_dir)];
    }
    let mut out = Vec::new();
    for agent in &cfg.agents {
        let candidates = candidate_logs(&logs_dir, agent);
        if candidates.is_empty() {
            out.push(format!("FAIL: no log file for {}", agent.name));
            continue;
        }
        tracing::debug!(agent = %agent.name, files = candidates.len(), "scanning logs");
        let content = read_logs(&candidates);
        for t in &agent.markers {
            if !content.contains(t.as_str()) {
                out.push(format!("FAIL: {} missing token: {t}", agent.name));
            }
        }
    }
    out
}

/// Weight check first, then the log scan. Never stops at the first failure.
pub fn verify(root: &Path, cfg: &GateConfig) -> RuntimeReport {
    let mut failures = check_weights(root, cfg);
    failures.extend(scan_logs(root, cfg));
    tracing::info!(failures = failures.len(), "runtime scan finished");
    RuntimeReport { failures }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn one_agent(name: &str) -> GateConfig {
        let mut cfg = GateConfig::default();
        cfg.agents.retain(|a| a.name == name);
        cfg
    }

    fn write_log(root: &Path, file: &str, body: &str) {
        fs::create_dir_all(root.join("logs")).unwrap();
        fs::write(root.join("logs").join(file), body).unwrap();
    }

    fn one_weight(root: &Path, agent: &str) {
        let w = agent_dir(root, agent).join("weights");
        fs::create_dir_all(&w).unwrap();
        fs::write(w.join("model.bin"), [1u8; 4]).unwrap();
    }

    #[test]
    fn test_naming_conventions() {
        assert!(is_candidate("NetworkAgent.log", "NetworkAgent"));
        assert!(is_candidate("run-NetworkAgent-2.log", "NetworkAgent"));
        assert!(is_candidate("networkagent_boot.log", "NetworkAgent"));
        assert!(!is_candidate("boot-networkagent.log", "NetworkAgent"));
        assert!(!is_candidate("NetworkAgent.txt", "NetworkAgent"));
        assert!(!is_candidate("NetworkAgent.log.gz", "NetworkAgent"));
    }

    #[test]
    fn test_full_evidence_passes() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("WiFiAgent");
        one_weight(dir.path(), "WiFiAgent");
        write_log(dir.path(), "wifiagent.log", "Router:patch_ok\n");
        write_log(dir.path(), "WiFiAgent-2.log", "SwarmBalancer:active\n");
        let report = verify(dir.path(), &cfg);
        assert!(report.passed(), "{:?}", report.failures);
    }

    #[test]
    fn test_one_missing_token_fails() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("WiFiAgent");
        one_weight(dir.path(), "WiFiAgent");
        write_log(dir.path(), "WiFiAgent.log", "Router:patch_ok\n");
        let report = verify(dir.path(), &cfg);
        assert_eq!(
            report.failures,
            vec!["FAIL: WiFiAgent missing token: SwarmBalancer:active"]
        );
    }

    #[test]
    fn test_idioms_do_not_count_at_runtime() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("NetworkAgent");
        one_weight(dir.path(), "NetworkAgent");
        write_log(
            dir.path(),
            "NetworkAgent.log",
            "logger.info(\"Handshake done\")\nDirectory:update_ok\n",
        );
        let report = verify(dir.path(), &cfg);
        assert_eq!(
            report.failures,
            vec!["FAIL: NetworkAgent missing token: Handshake: link_ok"]
        );
    }

    #[test]
    fn test_no_log_file_is_distinct_failure() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("DroneAgent");
        one_weight(dir.path(), "DroneAgent");
        write_log(dir.path(), "other.log", "Uplink:relay_ok");
        let report = verify(dir.path(), &cfg);
        assert_eq!(report.failures, vec!["FAIL: no log file for DroneAgent"]);
    }

    #[test]
    fn test_missing_logs_dir() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("DroneAgent");
        one_weight(dir.path(), "DroneAgent");
        let report = verify(dir.path(), &cfg);
        assert_eq!(report.failures, vec!["FAIL: logs/ directory not found"]);
    }

    #[test]
    fn test_governor_alias_logs_are_found() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("FabricGovernor");
        one_weight(dir.path(), "FabricGovernor");
        write_log(
            dir.path(),
            "governor.log",
            "PolicyKernel: tick=1\nAuditTrail: delta=0\nConsensus: quorum=3\n",
        );
        let logs = candidate_logs(&dir.path().join("logs"), &cfg.agents[0]);
        assert_eq!(logs.len(), 1);
        assert!(verify(dir.path(), &cfg).passed());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_log_is_candidate_but_unread() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("WiFiAgent");
        one_weight(dir.path(), "WiFiAgent");
        let real = dir.path().join("real.txt");
        fs::write(&real, "Router:patch_ok\nSwarmBalancer:active\n").unwrap();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("logs").join("WiFiAgent.log")).unwrap();

        assert_eq!(candidate_logs(&dir.path().join("logs"), &cfg.agents[0]).len(), 1);
        let report = verify(dir.path(), &cfg);
        assert_eq!(
            report.failures,
            vec![
                "FAIL: WiFiAgent missing token: Router:patch_ok",
                "FAIL: WiFiAgent missing token: SwarmBalancer:active",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_weight_passes_runtime_count() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("DroneAgent");
        let w = agent_dir(dir.path(), "DroneAgent").join("weights");
        fs::create_dir_all(&w).unwrap();
        let blob = dir.path().join("blob");
        fs::write(&blob, [9u8; 8]).unwrap();
        std::os::unix::fs::symlink(&blob, w.join("model.bin")).unwrap();
        assert!(check_weights(dir.path(), &cfg).is_empty());
    }

    #[test]
    fn test_weights_always_exact() {
        let dir = TempDir::new().unwrap();
        let cfg = one_agent("LaptopAgent");
        let w = agent_dir(dir.path(), "LaptopAgent").join("weights");
        fs::create_dir_all(&w).unwrap();
        fs::write(w.join("a.bin"), b"1").unwrap();
        fs::write(w.join("b.bin"), b"2").unwrap();
        let failures = check_weights(dir.path(), &cfg);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("FAIL: expected 1 weight in "));
        assert!(failures[0].ends_with("found 2"));
    }

    #[test]
    fn test_all_failures_reported_weights_first() {
        let dir = TempDir::new().unwrap();
        let cfg = GateConfig::default();
        let report = verify(dir.path(), &cfg);
        assert!(!report.passed());
        assert_eq!(report.failures.len(), cfg.agents.len() + 1);
        assert!(report.failures[0].contains("expected 1 weight"));
        assert_eq!(
            report.failures.last().unwrap(),
            "FAIL: logs/ directory not found"
        );
    }
}
