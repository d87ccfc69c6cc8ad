//! Search filters.
//!
//! Filters are structured so a directory can evaluate them without parsing.
//! [`Filter::to_ldap_string`] renders the RFC 4515 form for directories that
//! speak LDAP.

use crate::config::FilterValues;
use std::fmt;

/// A search filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// All sub-filters must match.
    And(Vec<Filter>),

    /// The attribute holds exactly this value.
    Equals { attribute: String, value: String },

    /// The attribute holds a value matching the pattern, where `*` matches any
    /// run of characters.
    Pattern { attribute: String, pattern: String },

    /// The attribute holds at least one value.
    Present { attribute: String },
}

impl Filter {
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn present(attribute: impl Into<String>) -> Self {
        Filter::Present {
            attribute: attribute.into(),
        }
    }

    /// Build the term for `attribute = value`, honoring the value mode.
    ///
    /// With [`FilterValues::Escaped`] the value is always matched exactly. With
    /// [`FilterValues::Literal`] a `*` in the value acts as a wildcard, and a
    /// value made only of `*` is a presence test. Runs of `*` count as one.
    pub fn term(attribute: impl Into<String>, value: &str, mode: FilterValues) -> Self {
        let attribute = attribute.into();
        match mode {
            FilterValues::Literal if value.contains('*') => {
                let pattern = collapse_wildcards(value);
                if pattern == "*" {
                    Filter::Present { attribute }
                } else {
                    Filter::Pattern { attribute, pattern }
                }
            }
            _ => Filter::Equals {
                attribute,
                value: value.to_string(),
            },
        }
    }

    /// Render as an RFC 4515 string filter.
    pub fn to_ldap_string(&self) -> String {
        match self {
            Filter::And(filters) => {
                let inner: Vec<String> = filters.iter().map(Filter::to_ldap_string).collect();
                format!("(&{})", inner.join(""))
            }
            Filter::Equals { attribute, value } => {
                format!("({}={})", attribute, escape_value(value))
            }
            Filter::Pattern { attribute, pattern } => {
                let segments: Vec<String> = collapse_wildcards(pattern)
                    .split('*')
                    .map(escape_value)
                    .collect();
                format!("({}={})", attribute, segments.join("*"))
            }
            Filter::Present { attribute } => format!("({}=*)", attribute),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ldap_string())
    }
}

/// Replace every run of `*` with a single `*`; RFC 4515 substrings forbid empty
/// components.
fn collapse_wildcards(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}

/// Escape special characters in filter values (RFC 4515).
fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_equality() {
        assert_eq!(Filter::equals("cn", "jack").to_string(), "(cn=jack)");
    }

    #[test]
    fn renders_conjunction() {
        let filter = Filter::And(vec![
            Filter::equals("objectClass", "person"),
            Filter::equals("sn", "O'Neill"),
        ]);
        assert_eq!(filter.to_string(), "(&(objectClass=person)(sn=O'Neill))");
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            Filter::equals("cn", "*)(uid=*").to_string(),
            "(cn=\\2a\\29\\28uid=\\2a)"
        );
        assert_eq!(Filter::equals("cn", "a\\b").to_string(), "(cn=a\\5cb)");
    }

    #[test]
    fn escaped_mode_never_builds_wildcards() {
        assert_eq!(
            Filter::term("cn", "*a*", FilterValues::Escaped),
            Filter::equals("cn", "*a*")
        );
    }

    #[test]
    fn literal_mode_honors_wildcards() {
        assert_eq!(
            Filter::term("cn", "*a*", FilterValues::Literal),
            Filter::Pattern {
                attribute: "cn".into(),
                pattern: "*a*".into()
            }
        );
        assert_eq!(
            Filter::term("cn", "*", FilterValues::Literal),
            Filter::present("cn")
        );
        assert_eq!(
            Filter::term("cn", "jack", FilterValues::Literal),
            Filter::equals("cn", "jack")
        );
    }

    #[test]
    fn literal_mode_collapses_repeated_wildcards() {
        let filter = Filter::term("cn", "ja**k", FilterValues::Literal);
        assert_eq!(
            filter,
            Filter::Pattern {
                attribute: "cn".into(),
                pattern: "ja*k".into()
            }
        );
        assert_eq!(filter.to_string(), "(cn=ja*k)");
        assert_eq!(
            Filter::term("cn", "**", FilterValues::Literal),
            Filter::present("cn")
        );
        assert_eq!(
            Filter::term("cn", "***a**", FilterValues::Literal).to_string(),
            "(cn=*a*)"
        );
    }

    #[test]
    fn pattern_keeps_wildcards_but_escapes_the_rest() {
        let filter = Filter::term("cn", "*a)(b*", FilterValues::Literal);
        assert_eq!(filter.to_string(), "(cn=*a\\29\\28b*)");
        assert_eq!(Filter::present("mail").to_string(), "(mail=*)");
    }
}
