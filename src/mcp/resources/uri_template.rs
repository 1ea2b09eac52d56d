//! URI template compilation and matching.
//!
//! Templates are compiled once at registration time into a segment list;
//! matching tokenizes the candidate URI's path and query explicitly — no
//! regular expressions, no per-request recompilation. A path placeholder
//! (`tasks://status/{status}`) binds one segment; a trailing placeholder may
//! instead be satisfied by a query parameter of the same name
//! (`tasks://status?status=todo`). Comma-joined segment values and repeated
//! query parameters both yield multi-valued bindings.
//!
//! Query values are matched raw, without percent decoding.

use std::collections::HashMap;

use crate::{AppError, Result};

/// Variable bindings extracted by a template match, keyed by placeholder
/// name. Values are multi-valued.
pub type TemplateVariables = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A URI pattern compiled into a matcher.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    raw: String,
    scheme: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Compile `pattern` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Registration` if the pattern has no scheme, an
    /// empty segment, or a malformed placeholder.
    pub fn compile(pattern: &str) -> Result<Self> {
        let (scheme, rest) = pattern.split_once("://").ok_or_else(|| {
            AppError::Registration(format!("template '{pattern}' is missing a scheme"))
        })?;
        if scheme.is_empty() {
            return Err(AppError::Registration(format!(
                "template '{pattern}' has an empty scheme"
            )));
        }

        let mut segments = Vec::new();
        for part in rest.split('/') {
            if part.is_empty() {
                return Err(AppError::Registration(format!(
                    "template '{pattern}' contains an empty segment"
                )));
            }
            if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                if name.is_empty()
                    || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(AppError::Registration(format!(
                        "template '{pattern}' has an invalid placeholder '{{{name}}}'"
                    )));
                }
                segments.push(Segment::Variable(name.to_owned()));
            } else if part.contains('{') || part.contains('}') {
                return Err(AppError::Registration(format!(
                    "template '{pattern}' mixes literal text and placeholder in '{part}'"
                )));
            } else {
                segments.push(Segment::Literal(part.to_owned()));
            }
        }

        Ok(Self {
            raw: pattern.to_owned(),
            scheme: scheme.to_owned(),
            segments,
        })
    }

    /// The original pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance.
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Test `uri` against this template, extracting variable bindings on a
    /// match.
    #[must_use]
    pub fn match_uri(&self, uri: &str) -> Option<TemplateVariables> {
        let (scheme, rest) = uri.split_once("://")?;
        if scheme != self.scheme {
            return None;
        }
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let query = query.map(parse_query).unwrap_or_default();
        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let mut variables = TemplateVariables::new();
        let mut cursor = 0usize;
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(cursor).copied() != Some(literal.as_str()) {
                        return None;
                    }
                    cursor += 1;
                }
                Segment::Variable(name) => {
                    if let Some(&value) = parts.get(cursor) {
                        if value.is_empty() {
                            return None;
                        }
                        variables
                            .entry(name.clone())
                            .or_default()
                            .extend(value.split(',').filter(|v| !v.is_empty()).map(str::to_owned));
                        cursor += 1;
                    } else if let Some(values) = query.get(name.as_str()) {
                        variables
                            .entry(name.clone())
                            .or_default()
                            .extend(values.iter().cloned());
                    } else {
                        return None;
                    }
                }
            }
        }
        if cursor != parts.len() {
            return None;
        }
        Some(variables)
    }

    /// Conservative structural overlap test: two templates overlap when they
    /// share a scheme and segment count and every aligned pair is either
    /// equal literals or involves a placeholder.
    pub(crate) fn overlaps(&self, other: &Self) -> bool {
        if self.scheme != other.scheme || self.segments.len() != other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(a, b)| match (a, b) {
                (Segment::Literal(x), Segment::Literal(y)) => x == y,
                _ => true,
            })
    }
}

/// Parse a query string into a multimap. Empty keys and empty values are
/// ignored, matching header/query handling elsewhere in the dispatcher.
fn parse_query(query: &str) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if !key.is_empty() && !value.is_empty() {
                params.entry(key.to_owned()).or_default().push(value.to_owned());
            }
        }
    }
    params
}
