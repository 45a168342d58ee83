//! Logging and printing idioms that count as static evidence of a marker.
//!
//! Each template holds `{stem}`, replaced by the regex-escaped marker stem.
//! Patterns run case-insensitive with `.` spanning newlines.

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Copy)]
pub struct Idiom {
    pub description: &'static str,
    pub template: &'static str,
}

pub const IDIOMS: &[Idiom] = &[
    Idiom {
        description: "formatted print call",
        template: r"printf\s*\(.*{stem}.*\)",
    },
    Idiom {
        description: "stream insertion to stdout",
        template: r"std::cout\s*<<.*{stem}.*;",
    },
    Idiom {
        description: "leveled LOG macro stream",
        template: r"LOG\(\w+\)\s*<<.*{stem}.*;",
    },
    Idiom {
        description: "leveled logger method",
        template: r"logger\.\w+\(.*{stem}.*\)",
    },
    Idiom {
        description: "generic print call",
        template: r"print\(.+{stem}.+\)",
    },
    Idiom {
        description: "shell echo",
        template: r"echo\s+.*{stem}.*",
    },
];

/// Leading identifier-like part of a marker: everything before the first
/// `:`, `=` or `_`.
pub fn marker_stem(token: &str) -> &str {
    token
        .find([':', '=', '_'])
        .map_or(token, |i| &token[..i])
}

impl Idiom {
    pub fn compile(&self, stem: &str) -> Result<Regex> {
        let pat = format!("(?is){}", self.template.replace("{stem}", &regex::escape(stem)));
        Regex::new(&pat).with_context(|| format!("compile idiom `{}`", self.description))
    }
}

/// Returns the first idiom in `idioms` that emits `stem` somewhere in `text`.
pub fn find_idiom<'a>(idioms: &'a [Idiom], stem: &str, text: &str) -> Result<Option<&'a Idiom>> {
    if stem.is_empty() {
        return Ok(None);
    }
    for idiom in idioms {
        if idiom.compile(stem)?.is_match(text) {
            return Ok(Some(idiom));
        }
    }
    Ok(None)
}
