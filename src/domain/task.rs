/// One unit of work: the generated params for a single CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTask {
    /// Compact JSON parameter payload.
    pub payload: Vec<u8>,
    /// 1-based line number in the source file; the first data row is 2.
    pub row: usize,
}
