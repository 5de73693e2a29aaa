/// CSV export of simulated series.
pub mod export;
/// Smart-meter CSV ingestion.
pub mod import;
