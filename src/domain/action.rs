//! Draft action categories and the prompt fragment each one carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DOCUMENT_CONTENT_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DraftAction {
    GlassHouse,
    Intelligence,
    LegalStrategy,
    RosettaStone,
}

/// How the user prompt is built from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPromptStyle {
    /// Forward `payload.prompt` as-is
    Passthrough,
    /// Wrap `payload.content` in a document-analysis envelope
    DocumentAnalysis { content_limit: usize },
}

/// Static description of one action
#[derive(Debug, Clone, Copy)]
pub struct ActionProfile {
    pub action: DraftAction,
    pub name: &'static str,
    pub system_extension: &'static str,
    pub user_prompt: UserPromptStyle,
}

pub const ACTION_PROFILES: &[ActionProfile] = &[
    ActionProfile {
        action: DraftAction::GlassHouse,
        name: "glass-house",
        system_extension: GLASS_HOUSE_EXTENSION,
        user_prompt: UserPromptStyle::Passthrough,
    },
    ActionProfile {
        action: DraftAction::Intelligence,
        name: "intelligence",
        system_extension: INTELLIGENCE_EXTENSION,
        user_prompt: UserPromptStyle::Passthrough,
    },
    ActionProfile {
        action: DraftAction::LegalStrategy,
        name: "legal-strategy",
        system_extension: LEGAL_STRATEGY_EXTENSION,
        user_prompt: UserPromptStyle::Passthrough,
    },
    ActionProfile {
        action: DraftAction::RosettaStone,
        name: "rosetta-stone",
        system_extension: ROSETTA_STONE_EXTENSION,
        user_prompt: UserPromptStyle::DocumentAnalysis {
            content_limit: DOCUMENT_CONTENT_LIMIT,
        },
    },
];

impl DraftAction {
    /// Profiles are listed in variant order.
    pub fn profile(self) -> &'static ActionProfile {
        &ACTION_PROFILES[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    pub fn all() -> impl Iterator<Item = DraftAction> {
        ACTION_PROFILES.iter().map(|profile| profile.action)
    }
}

impl fmt::Display for DraftAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for DraftAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACTION_PROFILES
            .iter()
            .find(|profile| profile.name == s)
            .map(|profile| profile.action)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

const GLASS_HOUSE_EXTENSION: &str = "=== GLASS HOUSE PACKAGE V1 ===
COMPLIANCE REQUIREMENTS:
- Every factual claim MUST cite a source
- NO fabrication of facts, dates, names, or case numbers
- CRC 2.111 formatting for court documents
- Red Team all conclusions

LEVERAGE ANALYSIS:
Identify fault lines in the opposing position, solidify the supporting evidence, then press on the weakest point.";

const INTELLIGENCE_EXTENSION: &str = "You are generating a Financial Intelligence Report. \
Analyze the provided context and generate actionable intelligence.";

const LEGAL_STRATEGY_EXTENSION: &str = "ACT AS: Senior Litigation Strategist.
TASK: Draft legal correspondence with the specified tone.";

const ROSETTA_STONE_EXTENSION: &str = r#"You are Rosetta Stone v1.0, a document analyzer and converter. Your task is to:
1. CLASSIFY content as: PROSE (narrative text), TABULAR (spreadsheets, tables, CSV data), or HIERARCHICAL (JSON, XML, nested structures, legal documents with sections)
2. ANALYZE the document structure and extract key metadata
3. PROVIDE confidence scores (0-100) for your classification
4. CONVERT prose to clean Markdown, hierarchical to JSON with inferred schema
5. GENERATE a compliant summary

For the content provided, return your analysis in this exact JSON format:
{
  "classification": "PROSE" | "TABULAR" | "HIERARCHICAL",
  "confidence": <number 0-100>,
  "reasoning": "<brief explanation of classification>",
  "convertedContent": "<the converted/cleaned content>",
  "jsonSchema": <inferred schema object if HIERARCHICAL, null otherwise>,
  "keyEntities": ["<extracted entity 1>", "<extracted entity 2>"],
  "summary": "<2-3 sentence summary>"
}"#;
