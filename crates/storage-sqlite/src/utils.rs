//! Helpers for working within SQLite's bound-parameter limit.

/// Maximum number of ids bound in a single `IN (...)` clause.
///
/// SQLite caps bound parameters per statement (`SQLITE_MAX_VARIABLE_NUMBER`,
/// 999 on older builds). 500 leaves room for the scoping parameters that
/// accompany the list.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits `items` into slices that fit in one `IN (...)` clause.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}
