use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Maximum config file size (1 MB).
const MAX_CONFIG_BYTES: u64 = 1024 * 1024;

/// Bumped whenever the default registry or marker table changes.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// One registered agent and the behavioral markers it must evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub markers: Vec<String>,
    /// Extra names the agent's log files may be filed under.
    #[serde(default)]
    pub log_aliases: Vec<String>,
}

impl AgentEntry {
    fn new(name: &str, markers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            markers: markers.iter().map(ToString::to_string).collect(),
            log_aliases: Vec::new(),
        }
    }

    fn with_log_alias(mut self, alias: &str) -> Self {
        self.log_aliases.push(alias.to_string());
        self
    }

    /// The agent name followed by its aliases, in lookup order.
    pub fn log_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.log_aliases.iter().map(String::as_str))
    }
}

/// Reference data shared by every gate: the agent registry, the marker
/// table, and the fixed file lists a bundle must carry.
///
/// The registry order is the report order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub schema_version: u32,
    pub agents: Vec<AgentEntry>,
    pub required_top_files: Vec<String>,
    pub required_agent_files: Vec<String>,
    pub required_metadata_keys: Vec<String>,
    pub required_scripts: Vec<String>,
    pub metadata_file: String,
    pub weights_dir: String,
    pub weight_extension: String,
    pub source_extensions: Vec<String>,
    pub logs_dir: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            agents: vec![
                AgentEntry::new(
                    "FabricGovernor",
                    &["PolicyKernel: tick=", "AuditTrail: delta=", "Consensus: quorum="],
                )
                .with_log_alias("Governor"),
                AgentEntry::new(
                    "AtomicMemoryDBAgent",
                    &[
                        "MemoryPersistor:write_ok",
                        "MemoryExchange:sync_ok",
                        "Royalty:mint_ok",
                    ],
                ),
                AgentEntry::new("WiFiAgent", &["Router:patch_ok", "SwarmBalancer:active"]),
                AgentEntry::new("NetworkAgent", &["Handshake: link_ok", "Directory:update_ok"]),
                AgentEntry::new(
                    "DroneAgent",
                    &["Uplink:relay_ok", "Beacon:ping_ok", "Audit:bandwidth_delta"],
                ),
                AgentEntry::new(
                    "LaptopAgent",
                    &["OSHook:init_ok", "ExecMultiplex:dispatch_ok", "EnergyMeter:online"],
                ),
                AgentEntry::new(
                    "SmartphoneAgent",
                    &["DeviceBrain:init_ok", "BandwidthClient:connected"],
                ),
            ],
            required_top_files: strings(&["README.md", "CMakeLists.txt"]),
            required_agent_files: strings(&["model.yaml", "policy.seal", "policy.rules", "README.md"]),
            required_metadata_keys: strings(&["name", "version"]),
            required_scripts: strings(&[
                "compile.sh",
                "compile.bat",
                "scripts/build_test.sh",
                "scripts/build_test.bat",
                "tools/static_verify.py",
                "tools/verify_supernet.py",
            ]),
            metadata_file: "model.yaml".to_string(),
            weights_dir: "weights".to_string(),
            weight_extension: "bin".to_string(),
            source_extensions: strings(&["cpp", "cc", "cxx", "h", "hpp", "py", "sh"]),
            logs_dir: "logs".to_string(),
        }
    }
}

impl GateConfig {
    /// Loads a JSON config from `path`, or the built-in registry when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => serde_json::from_slice(&crate::fs_guard::read_validated(
                p,
                MAX_CONFIG_BYTES,
            )?)?,
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Every registered agent must be unique and carry at least one marker.
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(anyhow!("config registers no agents"));
        }
        let mut seen = HashSet::new();
        for a in &self.agents {
            if a.name.trim().is_empty() {
                return Err(anyhow!("config contains an agent with an empty name"));
            }
            if !seen.insert(a.name.as_str()) {
                return Err(anyhow!("agent registered twice: {}", a.name));
            }
            if a.markers.is_empty() {
                return Err(anyhow!("agent {} has no expected markers", a.name));
            }
        }
        Ok(())
    }

    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.name.as_str())
    }

    /// True when `file_name` carries the configured weight extension.
    pub fn is_weight_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .is_some_and(|e| e == self.weight_extension.as_str())
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.source_extensions.iter().any(|s| s == e))
    }
}
