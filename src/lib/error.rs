use std::time::Duration;

use thiserror::Error;

pub type SfaResult<T> = Result<T, SfaError>;

/// Recoverable failures of the automaton engine and of predicate algebras.
///
/// Both variants mean the caller's [`Budget`](crate::budget::Budget) was
/// exhausted. Broken invariants are not reported here, they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfaError {
    #[error("operation exceeded its time limit of {0:?}")]
    Timeout(Duration),
    #[error("minterm construction exceeded the limit of {0} predicates")]
    MintermLimit(usize),
}
