//! Folding raw tag tokens into canonical service names.

use crate::accumulator::TagAccumulator;
use std::collections::{BTreeMap, BTreeSet};
use svcinv_protocol::ArtifactCategory;

/// Marks a template variable (`service:$service`) that has no concrete value.
pub const TEMPLATE_MARKER: char = '$';

/// How raw tokens of a category are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// Brace clauses from metric queries such as `service:a,env:prod`, mixed
    /// with literal `service:<name>` tokens.
    CommaJoinedBraced,
    /// Only literal `service:<name>` tokens.
    PlainServiceToken,
}

impl TokenShape {
    pub const fn for_category(category: ArtifactCategory) -> Self {
        match category {
            ArtifactCategory::Dashboard | ArtifactCategory::Notebook => {
                TokenShape::CommaJoinedBraced
            }
            ArtifactCategory::Monitor | ArtifactCategory::Slo => TokenShape::PlainServiceToken,
        }
    }

    /// Push every service name `token` yields onto `out`.
    pub fn parse_into(self, token: &str, out: &mut BTreeSet<String>) {
        match self {
            TokenShape::CommaJoinedBraced => {
                for part in token.split(',') {
                    if !part.contains("service") {
                        continue;
                    }
                    let mut pieces = part.split(':');
                    let (Some(_), Some(value), None) = (pieces.next(), pieces.next(), pieces.next())
                    else {
                        continue;
                    };
                    let value = value.trim();
                    if value.contains(TEMPLATE_MARKER) {
                        continue;
                    }
                    out.insert(value.to_string());
                }
            }
            // TODO: decide whether `$` placeholders should be dropped here too;
            // monitors built from template variables currently report them.
            TokenShape::PlainServiceToken => {
                if let Some((_, value)) = token.split_once(':') {
                    out.insert(value.to_string());
                }
            }
        }
    }
}

/// Canonical services per artifact id for one category.
///
/// Artifacts left with no service are dropped, except for categories that
/// [keep empty artifacts](ArtifactCategory::keeps_empty_artifacts).
pub fn deduplicate(
    category: ArtifactCategory,
    tags: &TagAccumulator,
) -> BTreeMap<String, BTreeSet<String>> {
    let shape = TokenShape::for_category(category);
    let keep_empty = category.keeps_empty_artifacts();
    let mut result = BTreeMap::new();
    for (id, tokens) in tags.iter() {
        let mut services = BTreeSet::new();
        for token in tokens {
            shape.parse_into(token, &mut services);
        }
        if services.is_empty() && !keep_empty {
            log::debug!("{category} {id}: no usable service tags, omitted");
            continue;
        }
        result.insert(id.to_string(), services);
    }
    result
}
