//! The contract every managed entry kind implements.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::managed::error::ValidationError;

/// A named definition that can be stored, persisted and rendered.
pub trait ManagedEntry:
    Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Human readable kind, used in logs, metrics labels and error messages.
    const KIND: &'static str;

    /// The unique key of this entry.
    fn name(&self) -> &str;

    /// Check required fields and return the canonical form of the entry.
    ///
    /// Must not have side effects: a rejected entry leaves the store untouched.
    fn normalize(self) -> Result<Self, ValidationError>;
}

/// Names that collide with fixed REST paths under a collection.
const RESERVED_NAMES: &[&str] = &["reload", ".", ".."];

/// Entry names are used unescaped as URL path segments and inside rendered
/// comments, so they are limited to `[A-Za-z0-9._-]`.
pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::missing("name"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::invalid(
            "name",
            "may only contain ASCII letters, digits, '.', '_' and '-'",
        ));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(ValidationError::invalid(
            "name",
            format!("{:?} is reserved", name),
        ));
    }
    Ok(())
}

/// Ensure a prefix begins and ends with `/`.
pub(crate) fn normalize_prefix(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        out.push('/');
    }
    out.push_str(path);
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("blog"), "/blog/");
        assert_eq!(normalize_prefix("/blog"), "/blog/");
        assert_eq!(normalize_prefix("blog/"), "/blog/");
        assert_eq!(normalize_prefix("/a/b/"), "/a/b/");
        assert_eq!(normalize_prefix("/"), "/");
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("blog").is_ok());
        assert!(check_name("api-v2_x").is_ok());

        let err = check_name("").unwrap_err();
        assert_eq!(err.field, "name");
        assert!(check_name("   ").is_err());
        assert!(check_name("a/b").is_err());
        assert!(check_name("a b").is_err());
    }

    #[test]
    fn test_check_name_rejects_url_metacharacters() {
        for name in ["a?x", "a#x", "a%2Fb", "caf\u{e9}", "a:b", "a;b"] {
            let err = check_name(name).unwrap_err();
            assert_eq!(err.field, "name", "{}", name);
        }
        assert!(check_name("svc.v1").is_ok());
    }

    #[test]
    fn test_check_name_rejects_reserved() {
        let err = check_name("reload").unwrap_err();
        assert!(err.reason.contains("reserved"));
        assert!(check_name("..").is_err());
        assert!(check_name("reloader").is_ok());
    }
}
