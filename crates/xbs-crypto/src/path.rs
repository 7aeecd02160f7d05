//! Dotted JSON path resolution.
//!
//! The field-selection contract uses a small fixed grammar: `$` is the
//! document root and `$.a.b.c` walks nested object fields. No wildcards and
//! no array indices — a path resolves to at most one value, so ambiguous
//! matches are unrepresentable.

use serde_json::{Map, Value};

use crate::error::{CryptoError, CryptoResult};

/// A parsed dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPath`] on a missing `$` anchor, an
    /// empty segment, or unsupported syntax (wildcards, array indices).
    pub fn parse(path: &str) -> CryptoResult<Self> {
        let trimmed = path.trim();
        if trimmed == "$" {
            return Ok(Self {
                segments: Vec::new(),
            });
        }
        let Some(rest) = trimmed.strip_prefix("$.") else {
            return Err(CryptoError::InvalidPath {
                path: path.into(),
                reason: "must be `$` or start with `$.`",
            });
        };

        let mut segments = Vec::new();
        for segment in rest.split('.') {
            if segment.is_empty() {
                return Err(CryptoError::InvalidPath {
                    path: path.into(),
                    reason: "empty path segment",
                });
            }
            if segment.contains(['*', '[', ']']) {
                return Err(CryptoError::InvalidPath {
                    path: path.into(),
                    reason: "wildcards and array indices are not supported",
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Whether this path denotes the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve the path against a document.
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Remove and return the value at this path, leaving ancestors in place.
    ///
    /// Removing the root replaces the document with an empty object and
    /// returns the previous document.
    pub fn remove(&self, document: &mut Value) -> Option<Value> {
        let Some((leaf, parents)) = self.segments.split_last() else {
            return Some(std::mem::replace(document, Value::Object(Map::new())));
        };
        let mut current = document;
        for segment in parents {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        current.as_object_mut()?.remove(leaf)
    }

    /// Insert a value at this path, creating intermediate objects as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PathConflict`] when the leaf field already
    /// exists, when an intermediate segment resolves to a non-object, or
    /// when inserting at the root of a non-empty document.
    pub fn insert(&self, document: &mut Value, value: Value) -> CryptoResult<()> {
        let Some((leaf, parents)) = self.segments.split_last() else {
            match document {
                Value::Object(map) if map.is_empty() => {
                    *document = value;
                    return Ok(());
                }
                _ => {
                    return Err(CryptoError::PathConflict {
                        path: self.to_string(),
                        reason: "document root is not empty",
                    })
                }
            }
        };

        let mut current = document;
        for segment in parents {
            let map = current.as_object_mut().ok_or_else(|| CryptoError::PathConflict {
                path: self.to_string(),
                reason: "intermediate segment is not an object",
            })?;
            current = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let map = current.as_object_mut().ok_or_else(|| CryptoError::PathConflict {
            path: self.to_string(),
            reason: "intermediate segment is not an object",
        })?;
        if map.contains_key(leaf) {
            return Err(CryptoError::PathConflict {
                path: self.to_string(),
                reason: "target field already exists",
            });
        }
        map.insert(leaf.clone(), value);
        Ok(())
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}
