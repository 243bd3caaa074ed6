//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers mirroring common `Result` combinators.
pub trait ResultExt<T, E> {
    /// Map the success value, preserving the error.
    fn map_ok<U, F>(self, op: F) -> Result<U, E>
    where
        F: FnOnce(T) -> U;

    /// Map the error value, preserving the success.
    fn map_err_with<F, E2>(self, op: F) -> Result<T, E2>
    where
        F: FnOnce(E) -> E2;

    /// Chain fallible operations using the shared `Result` type.
    fn and_then_with<U, F>(self, op: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_ok<U, F>(self, op: F) -> Result<U, E>
    where
        F: FnOnce(T) -> U,
    {
        self.map(op)
    }

    fn map_err_with<F, E2>(self, op: F) -> Result<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        self.map_err(op)
    }

    fn and_then_with<U, F>(self, op: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        self.and_then(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCode, ErrorEnvelope};

    #[test]
    fn result_ext_maps_err_with_context() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "bad scope");
        let value: Result<i32> = Err(error);
        let mapped = value.map_err_with(|error| error.with_metadata("scope", "deal"));

        assert!(matches!(
            mapped,
            Err(ref error) if error.metadata.get("scope").map(String::as_str) == Some("deal")
        ));
    }

    #[test]
    fn result_ext_chains() {
        let value: Result<usize> = Ok(3);
        let chained = value.map_ok(|count| count + 1).and_then_with(|count| Ok(count * 2));

        assert!(matches!(chained, Ok(8)));
    }
}
