use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("offset must be non-negative, got {0}")]
    NegativeOffset(i64),
    #[error("limit must be non-negative, got {0}")]
    NegativeLimit(i64),
}

/// Normalized offset/limit window for list queries.
///
/// A limit of zero is treated as "unset" (no limit applied), not as "return
/// zero rows". This matches the behavior callers rely on for "fetch the whole
/// list" requests and is deliberate, not a bug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    offset: Option<i64>,
    limit: Option<i64>,
}

impl Pagination {
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Result<Self, PaginationError> {
        if let Some(offset) = offset.filter(|&offset| offset < 0) {
            return Err(PaginationError::NegativeOffset(offset));
        }
        if let Some(limit) = limit.filter(|&limit| limit < 0) {
            return Err(PaginationError::NegativeLimit(limit));
        }

        Ok(Self {
            offset: offset.filter(|&offset| offset > 0),
            limit: limit.filter(|&limit| limit > 0),
        })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// SQLite treats a negative LIMIT as unbounded.
    pub(crate) fn limit_or_unbounded(&self) -> i64 {
        self.limit.unwrap_or(-1)
    }

    pub(crate) fn offset_or_zero(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_normalizes_to_unset() {
        let page = Pagination::new(Some(0), Some(0)).unwrap();
        assert_eq!(page, Pagination::unbounded());
        assert_eq!(page.limit_or_unbounded(), -1);
        assert_eq!(page.offset_or_zero(), 0);
    }

    #[test]
    fn positive_values_are_kept() {
        let page = Pagination::new(Some(3), Some(7)).unwrap();
        assert_eq!(page.offset_or_zero(), 3);
        assert_eq!(page.limit_or_unbounded(), 7);
    }

    #[test]
    fn negative_values_are_rejected() {
        assert_eq!(
            Pagination::new(Some(-1), None),
            Err(PaginationError::NegativeOffset(-1))
        );
        assert_eq!(
            Pagination::new(None, Some(-5)),
            Err(PaginationError::NegativeLimit(-5))
        );
    }
}
