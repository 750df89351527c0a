//! Query identities and statuses
//!
//! Every cacheable read is named by a [`QueryKind`]: an entity collection,
//! an entity by id, or an ad-hoc search. Two identities are equal iff their
//! kind and parameters are equal.

use kardex_types::TemplateId;
use std::fmt;

/// Identity of a cacheable read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// The full template collection
    AllTemplates,

    /// A single template by id
    TemplateById(TemplateId),

    /// The disease vocabulary with counts
    AllDiseases,

    /// The template-type vocabulary with counts
    AllTemplateTypes,

    /// The tag vocabulary
    AllTags,

    /// Server-side search results for a keyword
    Search(String),
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::AllTemplates => write!(f, "templates"),
            QueryKind::TemplateById(id) => write!(f, "template({})", id),
            QueryKind::AllDiseases => write!(f, "diseases"),
            QueryKind::AllTemplateTypes => write!(f, "template-types"),
            QueryKind::AllTags => write!(f, "tags"),
            QueryKind::Search(keyword) => write!(f, "search({})", keyword),
        }
    }
}

/// Lifecycle status of a query, carried next to its identity
///
/// Replaces the boolean "enabled" flag threaded through query construction:
/// a query is either not yet eligible to run, running normally, or switched
/// off by its precondition (no selection, empty keyword).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// The store behind this query is not initialized yet
    Uninitialized,
    /// The query may fetch
    Active,
    /// The query's precondition does not hold; never fetch
    Disabled,
}

/// A query identity plus its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    kind: QueryKind,
    status: QueryStatus,
}

impl QuerySpec {
    pub fn active(kind: QueryKind) -> Self {
        Self {
            kind,
            status: QueryStatus::Active,
        }
    }

    pub fn disabled(kind: QueryKind) -> Self {
        Self {
            kind,
            status: QueryStatus::Disabled,
        }
    }

    pub fn uninitialized(kind: QueryKind) -> Self {
        Self {
            kind,
            status: QueryStatus::Uninitialized,
        }
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == QueryStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = QueryKind::TemplateById(TemplateId::new("1"));
        let b = QueryKind::TemplateById(TemplateId::new("1"));
        let c = QueryKind::TemplateById(TemplateId::new("2"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(QueryKind::Search("a".into()), QueryKind::Search("b".into()));
    }

    #[test]
    fn test_spec_status() {
        let spec = QuerySpec::active(QueryKind::AllTemplates);
        assert!(spec.is_active());

        let spec = QuerySpec::disabled(QueryKind::Search(String::new()));
        assert!(!spec.is_active());
        assert_eq!(spec.status(), QueryStatus::Disabled);
    }

    #[test]
    fn test_display() {
        let kind = QueryKind::TemplateById(TemplateId::new("42"));
        assert_eq!(kind.to_string(), "template(42)");
        assert_eq!(QueryKind::AllTemplates.to_string(), "templates");
    }
}
