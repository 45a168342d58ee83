//! The `check` report: structural verdict, optionally joined by the static
//! evidence scan, stamped with tool version and time.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::config::GateConfig;
use crate::evidence::static_scan::{self, StaticReport};
use crate::report::{Mode, Verdict};
use crate::structural;

pub const REPORT_SCHEMA: &str = "agentgate/check-report/v1";

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub report_schema: &'static str,
    pub tool_version: &'static str,
    pub config_schema_version: u32,
    pub verified_at: String,
    pub bundle_dir: String,
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub static_scan: Option<StaticReport>,
}

impl CheckReport {
    /// Structural status, and the static status when that scan ran.
    pub fn all_passed(&self) -> bool {
        self.verdict.status.is_pass()
            && self
                .static_scan
                .as_ref()
                .map_or(true, |s| s.status.is_pass())
    }
}

pub fn run_check(root: &Path, cfg: &GateConfig, mode: Mode, with_static: bool) -> Result<CheckReport> {
    let verdict = structural::check_bundle(root, cfg, mode);
    let static_scan = if with_static {
        Some(static_scan::scan(root, cfg)?)
    } else {
        None
    };
    Ok(CheckReport {
        report_schema: REPORT_SCHEMA,
        tool_version: env!("CARGO_PKG_VERSION"),
        config_schema_version: cfg.schema_version,
        verified_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        bundle_dir: root.display().to_string(),
        verdict,
        static_scan,
    })
}
