// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hierarchical NDN names.
//!
//! A [`Name`] is an ordered sequence of opaque byte components, written in
//! URI form as `/example/data`. Names are immutable: operations that
//! "modify" a name return a new one.

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Name must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("Empty component in name: {0}")]
    EmptyComponent(String),

    #[error("Reserved component '{component}' in name: {name}")]
    ReservedComponent { name: String, component: String },

    #[error("Invalid percent-encoding in name: {0}")]
    InvalidEscape(String),
}

/// A single name component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component(Bytes);

impl Component {
    /// Create a component from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Raw component bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Component as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    fn parse(raw: &str, full: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::EmptyComponent(full.to_string()));
        }
        if raw.bytes().all(|b| b == b'.') {
            // "..." encodes the empty component, "...." a single period, etc.
            if raw.len() < 3 {
                return Err(NameError::ReservedComponent {
                    name: full.to_string(),
                    component: raw.to_string(),
                });
            }
            return Ok(Self(Bytes::copy_from_slice(&raw.as_bytes()[3..])));
        }

        let input = raw.as_bytes();
        let mut out = Vec::with_capacity(input.len());
        let mut i = 0;
        while i < input.len() {
            if input[i] == b'%' {
                let hex = input
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| NameError::InvalidEscape(full.to_string()))?;
                out.push(hex);
                i += 3;
            } else {
                out.push(input[i]);
                i += 1;
            }
        }
        Ok(Self(Bytes::from(out)))
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Component {
    fn from(s: String) -> Self {
        Self(Bytes::from(s.into_bytes()))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|&b| b == b'.') {
            write!(f, "...")?;
        }
        for &b in self.0.iter() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "%{:02X}", b)?;
            }
        }
        Ok(())
    }
}

/// Hierarchical NDN name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// The empty name (`/`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from components.
    pub fn from_components<I, C>(components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for the root name.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components of this name.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component at `index`.
    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    /// Return a new name with `component` appended.
    pub fn append(&self, component: impl Into<Component>) -> Self {
        let mut components = self.components.clone();
        components.push(component.into());
        Self { components }
    }

    /// First `n` components (the whole name if `n >= len`).
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            components: self.components[..n.min(self.components.len())].to_vec(),
        }
    }

    /// Components following the first `n`.
    pub fn suffix_after(&self, n: usize) -> &[Component] {
        &self.components[n.min(self.components.len())..]
    }

    /// True if `self` is an ancestor of (or equal to) `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the "ndn:" scheme prefix used by older tooling.
        let uri = s.trim().strip_prefix("ndn:").unwrap_or(s.trim());
        let rest = uri
            .strip_prefix('/')
            .ok_or_else(|| NameError::MissingLeadingSlash(s.to_string()))?;

        if rest.is_empty() {
            return Ok(Self::root());
        }

        // A single trailing slash is tolerated ("/a/b/").
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let components = rest
            .split('/')
            .map(|raw| Component::parse(raw, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }
}

impl TryFrom<&str> for Name {
    type Error = NameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for c in &self.components {
            write!(f, "/{}", c)?;
        }
        Ok(())
    }
}
