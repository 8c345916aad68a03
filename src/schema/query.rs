//! Query predicates and their wire encoding.
//!
//! Collection endpoints accept a filter predicate in the `q=` query
//! parameter — one or more `<key><comparator><value>` terms joined with
//! `;` (logical AND) — plus an `inline-relations-depth=<n>` control for
//! server-side relation embedding.

use std::fmt;

/// A filter comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Equality (`:` on the wire).
    Eq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Membership over a list of values (` IN `).
    In,
}

impl Comparator {
    /// Returns the wire spelling of this comparator.
    #[must_use]
    pub const fn wire(self) -> &'static str {
        match self {
            Self::Eq => ":",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::In => " IN ",
        }
    }
}

/// One `<key><comparator><value>` filter term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// The queryable attribute's wire key.
    pub key: String,
    /// The comparator.
    pub comparator: Comparator,
    /// The value(s); more than one only with [`Comparator::In`].
    pub values: Vec<String>,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, self.comparator.wire(), self.values.join(","))
    }
}

/// A filter predicate over queryable attributes, plus fetch options.
///
/// # Example
///
/// ```rust
/// use cloud_controller::schema::{Comparator, Query};
///
/// let query = Query::new()
///     .filter("name", Comparator::Eq, "dora")
///     .filter_in("state", ["STARTED", "STOPPED"])
///     .depth(1);
///
/// let params = query.to_params();
/// assert_eq!(params[0], ("q".to_string(), "name:dora;state IN STARTED,STOPPED".to_string()));
/// assert_eq!(params[1], ("inline-relations-depth".to_string(), "1".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    depth: Option<u32>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single-valued filter term.
    #[must_use]
    pub fn filter(
        mut self,
        key: impl Into<String>,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Self {
        self.filters.push(Filter {
            key: key.into(),
            comparator,
            values: vec![value.into()],
        });
        self
    }

    /// Adds a multi-valued ` IN ` filter term.
    #[must_use]
    pub fn filter_in<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter {
            key: key.into(),
            comparator: Comparator::In,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets the `inline-relations-depth` embedding control.
    #[must_use]
    pub const fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Returns `true` when the query has no filters and no depth.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.depth.is_none()
    }

    /// Returns the wire keys referenced by the filters.
    pub fn filter_keys(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|filter| filter.key.as_str())
    }

    /// Encodes the query as URL parameters.
    ///
    /// Filters join with `;` into a single `q=` parameter; the embedding
    /// depth becomes `inline-relations-depth=`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.filters.is_empty() {
            let predicate = self
                .filters
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(";");
            params.push(("q".to_string(), predicate));
        }
        if let Some(depth) = self.depth {
            params.push(("inline-relations-depth".to_string(), depth.to_string()));
        }
        params
    }
}
