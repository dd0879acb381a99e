//! Meta-leak filtering: removal and detection of text where the model
//! narrates its own reasoning instead of speaking in character.
//!
//! Best-effort by design: the rule set is a fixed, enumerable table, and
//! anything it misses is caught later by the validity check and repaired.

use once_cell::sync::Lazy;
use regex::Regex;

/// Where a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Deleted by `strip_meta` and flagged by `looks_meta`.
    Strip,
    /// Only flagged by `looks_meta`; stripping these openers would eat
    /// legitimate in-character lines too often.
    DetectOnly,
}

pub struct MetaRule {
    pub name: &'static str,
    pub scope: RuleScope,
    /// Literal phrase opening the leaked fragment.
    pub opener: &'static str,
}

/// The whole rule set. Order is irrelevant; each rule is independent.
pub const META_RULES: &[MetaRule] = &[
    MetaRule {
        name: "hmm-aside",
        scope: RuleScope::Strip,
        opener: "Hmm,",
    },
    MetaRule {
        name: "user-narration",
        scope: RuleScope::Strip,
        opener: "The user",
    },
    MetaRule {
        name: "they-asked",
        scope: RuleScope::Strip,
        opener: "They asked",
    },
    MetaRule {
        name: "ai-disclosure",
        scope: RuleScope::Strip,
        opener: "As an AI",
    },
    MetaRule {
        name: "reasoning-header",
        scope: RuleScope::Strip,
        opener: "Reasoning:",
    },
    MetaRule {
        name: "step-enumeration",
        scope: RuleScope::DetectOnly,
        opener: "First,",
    },
    MetaRule {
        name: "interesting-aside",
        scope: RuleScope::DetectOnly,
        opener: "Interesting",
    },
];

/// Strip rules compiled to consume from the opener through the end of
/// its sentence.
static STRIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    META_RULES
        .iter()
        .filter(|r| r.scope == RuleScope::Strip)
        .map(|r| {
            Regex::new(&format!(r"(?i)\b{}[^.!?]*[.!?]?", regex::escape(r.opener)))
                .expect("meta strip pattern")
        })
        .collect()
});

/// Detection patterns for every rule, match-only.
static DETECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    META_RULES
        .iter()
        .map(|r| Regex::new(&format!(r"(?i)\b{}", regex::escape(r.opener))).expect("meta pattern"))
        .collect()
});

/// Delete every strip-scoped leak through its sentence boundary.
pub fn strip_meta(s: &str) -> String {
    let mut out = s.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out.trim().to_string()
}

/// True when any rule (either scope) still matches.
pub fn looks_meta(s: &str) -> bool {
    DETECT_PATTERNS.iter().any(|p| p.is_match(s))
}
