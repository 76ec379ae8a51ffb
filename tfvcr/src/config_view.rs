//! A minimal parsed view of a test step's configuration text.
//!
//! Only two things are located: `provider = <alias>` assignments and the
//! opening brace of the block a provider line would be inserted into.
//! Retargeting a configuration is expressed as a [`ConfigEdit`] planned over
//! that view and then applied to the text.

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref PROVIDER_ASSIGNMENT_REGEX: Regex = Regex::new(
        r#"\bprovider\s*=\s*(?P<quote>"?)(?P<alias>[A-Za-z0-9_][A-Za-z0-9_.\-]*)"?"#
    )
    .unwrap();
    static ref BLOCK_OPEN_REGEX: Regex = Regex::new(
        r#"(?m)^[ \t]*(?P<block_type>[A-Za-z_][A-Za-z0-9_\-]*)(?:[ \t]+(?:"[^"\n]*"|[A-Za-z_][A-Za-z0-9_\-]*))*[ \t]*\{"#
    )
    .unwrap();
}

/// Block types that declare infrastructure and accept a `provider` argument.
const RESOURCE_BLOCK_TYPES: &[&str] = &["resource", "data"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAssignment {
    /// Byte range of the whole assignment, quotes included.
    pub span: Range<usize>,
    /// Byte range of the alias token, quotes included.
    pub alias_span: Range<usize>,
    pub alias: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigView {
    pub provider_assignments: Vec<ProviderAssignment>,
    /// Byte offset just past the `{` of the first resource or data block,
    /// or of the first block of any type when there is none.
    pub first_block_body: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEdit {
    /// Replace each of these alias tokens with the target alias. The rest
    /// of the assignment, alignment included, is left as written.
    Retarget(Vec<Range<usize>>),
    /// Insert a provider line for the target alias at this offset.
    Insert(usize),
    Keep(KeepReason),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeepReason {
    /// The text already assigns the target alias.
    AlreadyTargeted,
    /// The text assigns an alias that is neither the source nor the target.
    OtherProvider,
    /// No block to insert a provider line into.
    NoBlock,
}

impl ConfigView {
    pub fn parse(config: &str) -> Self {
        let provider_assignments = PROVIDER_ASSIGNMENT_REGEX
            .captures_iter(config)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let alias_start = captures.name("quote")?.start();
                Some(ProviderAssignment {
                    span: whole.range(),
                    alias_span: alias_start..whole.end(),
                    alias: captures["alias"].to_string(),
                    quoted: !captures["quote"].is_empty(),
                })
            })
            .collect();

        let mut blocks = BLOCK_OPEN_REGEX.captures_iter(config).filter_map(|captures| {
            let whole = captures.get(0)?;
            Some((captures["block_type"].to_string(), whole.end()))
        });
        let first_block = blocks.next();
        let first_resource_block = match &first_block {
            Some((block_type, end)) if RESOURCE_BLOCK_TYPES.contains(&block_type.as_str()) => {
                Some(*end)
            }
            _ => blocks
                .find(|(block_type, _)| RESOURCE_BLOCK_TYPES.contains(&block_type.as_str()))
                .map(|(_, end)| end),
        };

        Self {
            provider_assignments,
            first_block_body: first_resource_block.or_else(|| first_block.map(|(_, end)| end)),
        }
    }

    pub fn assigns(&self, alias: &str) -> bool {
        self.provider_assignments
            .iter()
            .any(|assignment| assignment.alias == alias)
    }

    /// Plans how to move the configuration from `source_alias` to
    /// `target_alias`.
    pub fn plan(&self, source_alias: &str, target_alias: &str) -> ConfigEdit {
        let source_spans: Vec<_> = self
            .provider_assignments
            .iter()
            .filter(|assignment| assignment.alias == source_alias)
            .map(|assignment| assignment.alias_span.clone())
            .collect();

        if !source_spans.is_empty() {
            ConfigEdit::Retarget(source_spans)
        } else if self.assigns(target_alias) {
            ConfigEdit::Keep(KeepReason::AlreadyTargeted)
        } else if !self.provider_assignments.is_empty() {
            ConfigEdit::Keep(KeepReason::OtherProvider)
        } else if let Some(offset) = self.first_block_body {
            ConfigEdit::Insert(offset)
        } else {
            ConfigEdit::Keep(KeepReason::NoBlock)
        }
    }
}

impl ConfigEdit {
    pub fn apply(&self, config: &str, target_alias: &str) -> String {
        match self {
            ConfigEdit::Retarget(spans) => {
                let mut reformed = String::with_capacity(config.len());
                let mut copied_up_to = 0;
                for span in spans {
                    reformed.push_str(&config[copied_up_to..span.start]);
                    reformed.push_str(target_alias);
                    copied_up_to = span.end;
                }
                reformed.push_str(&config[copied_up_to..]);
                reformed
            }
            ConfigEdit::Insert(offset) => format!(
                "{}\n  provider = {}\n{}",
                &config[..*offset],
                target_alias,
                &config[*offset..]
            ),
            ConfigEdit::Keep(_) => config.to_string(),
        }
    }
}

/// Points a configuration at `target_alias` instead of `source_alias`.
///
/// In every `provider = <source_alias>` assignment (quoted or not) the alias
/// becomes an unquoted `<target_alias>`. A configuration without any provider
/// assignment gets one inserted as the first line of its first resource
/// block. Configurations that already name another alias are returned as is.
///
/// The configuration must contain at least one block; if it doesn't, it is
/// returned unchanged.
pub fn reform_config_with_provider(config: &str, source_alias: &str, target_alias: &str) -> String {
    let edit = ConfigView::parse(config).plan(source_alias, target_alias);

    if let ConfigEdit::Keep(KeepReason::NoBlock) = edit {
        tracing::warn!(
            alias = target_alias,
            "configuration has no block to insert a provider into, leaving it unchanged"
        );
    }

    edit.apply(config, target_alias)
}
