//! Namespace selection for filter nodes

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Which XML names a filter node or attribute match applies to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum NamespaceSelector {
    /// Local name in one specific namespace
    Exact { namespace: String, name: String },
    /// Local name in any namespace, including none
    Wildcard { name: String },
}

impl NamespaceSelector {
    /// Select `name` in `namespace`
    ///
    /// An empty `namespace` is no namespace at all, which XML can only
    /// express as an unqualified name; that yields a wildcard, the same
    /// selector the filter reader produces for unqualified elements.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Use [`NamespaceSelector::try_exact`] for
    /// names that come from untrusted input.
    pub fn exact(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "namespace selector needs a local name");
        Self::qualified(namespace.into(), name)
    }

    /// Select `name` regardless of namespace
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Use [`NamespaceSelector::try_wildcard`] for
    /// names that come from untrusted input.
    pub fn wildcard(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "namespace selector needs a local name");
        Self::Wildcard { name }
    }

    pub fn try_exact(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::structural(ErrorKind::EmptyLocalName));
        }
        Ok(Self::qualified(namespace.into(), name))
    }

    fn qualified(namespace: String, name: String) -> Self {
        if namespace.is_empty() {
            Self::Wildcard { name }
        } else {
            Self::Exact { namespace, name }
        }
    }

    pub fn try_wildcard(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::structural(ErrorKind::EmptyLocalName));
        }
        Ok(Self::Wildcard { name })
    }

    /// Selector for a parsed name: exact when a namespace is bound
    pub fn from_parts(namespace: Option<&str>, name: &str) -> Result<Self> {
        match namespace {
            Some(namespace) => Self::try_exact(namespace, name),
            None => Self::try_wildcard(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Exact { name, .. } | Self::Wildcard { name } => name,
        }
    }

    /// Required namespace, `None` for wildcards
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Exact { namespace, .. } => Some(namespace.as_str()),
            Self::Wildcard { .. } => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    /// Whether a node with this local name and namespace is selected
    pub fn matches(&self, name: &str, namespace: Option<&str>) -> bool {
        match self {
            Self::Exact {
                namespace: expected,
                name: expected_name,
            } => expected_name == name && namespace == Some(expected.as_str()),
            Self::Wildcard {
                name: expected_name,
            } => expected_name == name,
        }
    }
}

impl fmt::Display for NamespaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { namespace, name } => write!(f, "{{{namespace}}}{name}"),
            Self::Wildcard { name } => write!(f, "{{*}}{name}"),
        }
    }
}
