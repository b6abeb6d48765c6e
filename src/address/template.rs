//! Address template parsing and expansion
//!
//! A template is a wire address with at most one `{name}` or `{name:width}`
//! placeholder, e.g. `/ch/{num_channel}/mix/fader`. The placeholder name is
//! looked up in the device counts and the template expands to one concrete
//! address per index, zero-padded to the requested (or natural) width.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Counts;

/// One row of a device address table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddressEntry {
    /// Templated wire address to load
    pub address: String,
    /// Optional alternate address the value is exposed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
}

impl AddressEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            rewrite: None,
        }
    }

    pub fn rewritten(address: impl Into<String>, rewrite: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            rewrite: Some(rewrite.into()),
        }
    }
}

/// Parsed form of a templated address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressTemplate {
    /// No (usable) placeholder: the address expands to itself
    Literal(String),
    /// Exactly one placeholder between `prefix` and `suffix`
    Indexed {
        prefix: String,
        name: String,
        width: Option<usize>,
        suffix: String,
        /// Placeholder text as written, used to substitute in rewrites
        token: String,
    },
}

impl AddressTemplate {
    /// Tokenize an address
    ///
    /// Anything that is not a single well-formed placeholder (unterminated
    /// brace, empty name, bad width, a second placeholder) is treated as a
    /// literal address.
    pub fn parse(address: &str) -> Self {
        let literal = || AddressTemplate::Literal(address.to_string());

        let Some(open) = address.find('{') else {
            return literal();
        };
        let Some(close_rel) = address[open..].find('}') else {
            return literal();
        };
        let close = open + close_rel;

        let inner = &address[open + 1..close];
        let (name, width) = match inner.split_once(':') {
            Some((name, width)) => match width.parse::<usize>() {
                Ok(w) if w > 0 => (name, Some(w)),
                _ => return literal(),
            },
            None => (inner, None),
        };

        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return literal();
        }

        let suffix = &address[close + 1..];
        if suffix.contains('{') || suffix.contains('}') || address[..open].contains('}') {
            return literal();
        }

        AddressTemplate::Indexed {
            prefix: address[..open].to_string(),
            name: name.to_string(),
            width,
            suffix: suffix.to_string(),
            token: address[open..=close].to_string(),
        }
    }

    /// Name of the count this template iterates over
    pub fn placeholder_name(&self) -> Option<&str> {
        match self {
            AddressTemplate::Indexed { name, .. } => Some(name),
            AddressTemplate::Literal(_) => None,
        }
    }

    /// Zero-pad width for a given count: explicit width or digit length of the count
    pub fn resolve_width(&self, count: usize) -> usize {
        match self {
            AddressTemplate::Indexed { width: Some(w), .. } => *w,
            _ => count.to_string().len(),
        }
    }

    /// Expand into concrete addresses in ascending index order
    pub fn expand(&self, counts: &Counts) -> Vec<String> {
        self.expand_with(counts, None)
            .into_iter()
            .map(|(address, _)| address)
            .collect()
    }

    fn expand_with(&self, counts: &Counts, rewrite: Option<&str>) -> Vec<(String, Option<String>)> {
        match self {
            AddressTemplate::Literal(address) => {
                vec![(address.clone(), rewrite.map(str::to_string))]
            }
            AddressTemplate::Indexed {
                prefix,
                name,
                suffix,
                token,
                ..
            } => {
                let Some(&count) = counts.get(name) else {
                    warn!(placeholder = %name, "Unknown count in address template, loading as-is");
                    let address = format!("{}{}{}", prefix, token, suffix);
                    return vec![(address, rewrite.map(str::to_string))];
                };

                let width = self.resolve_width(count);
                (1..=count)
                    .map(|index| {
                        let padded = format!("{:0width$}", index, width = width);
                        let address = format!("{}{}{}", prefix, padded, suffix);
                        let rewritten = rewrite.map(|r| r.replace(token.as_str(), &padded));
                        (address, rewritten)
                    })
                    .collect()
            }
        }
    }
}

/// Expand an address table row into `(concrete, rewritten)` pairs
///
/// The rewrite template receives the same substitution as the address.
pub fn expand_entry(entry: &AddressEntry, counts: &Counts) -> Vec<(String, Option<String>)> {
    AddressTemplate::parse(&entry.address).expand_with(counts, entry.rewrite.as_deref())
}
