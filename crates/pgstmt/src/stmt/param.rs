//! Bound argument storage.

use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// One bound argument.
///
/// Terms are cloned while statements nest inside each other, so the value is
/// shared behind an `Arc` instead of being copied.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// The value in the form `tokio_postgres` query methods accept.
    pub fn to_sql_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl fmt::Debug for Param {
    // `ToSql: Debug`, so show the bound value itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Arguments collected while a statement renders.
///
/// `$n` in the query text refers to the `n`-th entry.
#[derive(Clone, Debug, Default)]
pub struct ParamList(Vec<Param>);

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `param` and return the placeholder number that refers to it.
    pub fn bind(&mut self, param: Param) -> usize {
        self.0.push(param);
        self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Param> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_numbers_from_one() {
        let mut params = ParamList::new();
        assert!(params.is_empty());
        assert_eq!(params.bind(Param::new(1i32)), 1);
        assert_eq!(params.bind(Param::new("two")), 2);
        assert_eq!(params.len(), 2);
        let shown: Vec<String> = params.iter().map(|p| format!("{:?}", p)).collect();
        assert_eq!(shown, ["1", "\"two\""]);
    }

    #[test]
    fn test_debug_shows_value() {
        assert_eq!(format!("{:?}", Param::new("tester1")), "\"tester1\"");
        assert_eq!(format!("{:?}", Param::new(Some(15i64))), "Some(15)");
    }
}
