//! SQL dialects and their rendering differences.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    #[default]
    SQLite,
    #[cfg_attr(feature = "serde", serde(alias = "postgres"))]
    PostgreSQL,
    MySQL,
}

impl Dialect {
    /// Renders a placeholder for this dialect with the given 1-based index.
    ///
    /// Returns `Cow::Borrowed("?")` for SQLite/MySQL (zero allocation),
    /// `Cow::Owned` for PostgreSQL numbered placeholders.
    #[inline]
    pub fn render_placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::PostgreSQL => Cow::Owned(format!("${}", index)),
            Dialect::SQLite | Dialect::MySQL => Cow::Borrowed("?"),
        }
    }

    #[inline]
    pub const fn quote(&self) -> char {
        match self {
            Dialect::MySQL => '`',
            Dialect::SQLite | Dialect::PostgreSQL => '"',
        }
    }

    /// Whether `NULLS FIRST` / `NULLS LAST` is understood natively.
    #[inline]
    pub const fn supports_null_ordering(&self) -> bool {
        !matches!(self, Dialect::MySQL)
    }

    /// Limit literal used when only an offset is requested, if one is required.
    #[inline]
    pub const fn unbounded_limit(&self) -> Option<&'static str> {
        match self {
            Dialect::SQLite => Some("-1"),
            Dialect::MySQL => Some("18446744073709551615"),
            Dialect::PostgreSQL => None,
        }
    }

    /// Type name used by `CAST(.. AS ..)` for text.
    #[inline]
    pub const fn text_type(&self) -> &'static str {
        match self {
            Dialect::MySQL => "CHAR",
            Dialect::SQLite | Dialect::PostgreSQL => "TEXT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_dialect() {
        assert_eq!(Dialect::SQLite.render_placeholder(3), "?");
        assert_eq!(Dialect::PostgreSQL.render_placeholder(3), "$3");
        assert_eq!(Dialect::MySQL.render_placeholder(1), "?");
    }
}
