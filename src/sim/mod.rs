/// Greedy per-window charge/discharge primitives and the dispatch policy.
pub mod battery;
/// Meter-day records and the per-date merge builder.
pub mod day;
pub mod engine;
/// Half-hour window indexing.
pub mod slot;
