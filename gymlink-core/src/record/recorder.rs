use super::Record;

/// Writes records to an output destination.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);

    /// Flushes buffered records, if any. `step` is the current update index.
    fn flush(&mut self, _step: i64) {}
}
