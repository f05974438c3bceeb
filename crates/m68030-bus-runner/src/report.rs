//! JSON trace report.

use motorola_68030::TransactionResult;
use serde::Serialize;

/// One transaction in the report.
///
/// `line` is the stimulus line the transaction came from; interrupt
/// acknowledges issued by the poller have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub line: Option<usize>,
    #[serde(flatten)]
    pub result: TransactionResult,
}

/// Pretty-printed JSON array of entries.
pub fn to_json(entries: &[ReportEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
