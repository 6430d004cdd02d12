use std::fmt;

/// Namespace of the console's primary query.
pub const MAIN_NAMESPACE: &str = "main";
/// Namespace of the previous-period comparison query.
pub const PREVIOUS_NAMESPACE: &str = "previous";

/// Identity of a dispatched query.
///
/// Two keys are equal exactly when both the namespace and the query text are equal. The
/// text is compared byte for byte; callers that want whitespace-insensitive matching
/// normalize before building the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Option<String>,
    query: String,
}

impl CacheKey {
    pub fn new(namespace: Option<&str>, query: impl Into<String>) -> Self {
        CacheKey {
            namespace: namespace.map(str::to_string),
            query: query.into(),
        }
    }

    pub fn main(query: impl Into<String>) -> Self {
        Self::new(Some(MAIN_NAMESPACE), query)
    }

    pub fn previous(query: impl Into<String>) -> Self {
        Self::new(Some(PREVIOUS_NAMESPACE), query)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, self.query),
            None => write!(f, "{}", self.query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equal_iff_namespace_and_query_equal() {
        assert_eq!(CacheKey::main("select 1"), CacheKey::main("select 1"));
        assert_ne!(CacheKey::main("select 1"), CacheKey::previous("select 1"));
        assert_ne!(CacheKey::main("select 1"), CacheKey::new(None, "select 1"));
        assert_ne!(CacheKey::main("select 1"), CacheKey::main("select 2"));
    }

    #[test]
    fn test_no_normalization() {
        assert_ne!(CacheKey::main("select 1"), CacheKey::main("select  1"));
        assert_ne!(CacheKey::main("select 1"), CacheKey::main(" select 1"));
    }

    #[test]
    fn test_namespace_separator_cannot_collide() {
        // "a:b" + "c" must differ from "a" + "b:c" even though both display as "a:b:c"
        let left = CacheKey::new(Some("a:b"), "c");
        let right = CacheKey::new(Some("a"), "b:c");
        assert_eq!(left.to_string(), right.to_string());
        assert_ne!(left, right);

        let set: HashSet<_> = [left, right].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
