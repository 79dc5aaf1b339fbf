//! Schema catalog collaborator.

/// Source of the real column names of a table.
///
/// The policy engine never hardcodes column lists beyond what rules name
/// literally; expanding the `"*"` allowance into concrete columns goes
/// through this trait.
pub trait SchemaCatalog: Send + Sync {
    /// Columns of `table` in catalog order, or `None` for an unknown table.
    fn columns(&self, table: &str) -> Option<&[String]>;

    /// Columns of `table` that are intentionally withheld from default
    /// visibility (cost, profit, ...). Reported in addition to [`Self::columns`].
    fn sensitive_columns(&self, _table: &str) -> &[String] {
        &[]
    }
}
