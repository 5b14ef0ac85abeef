/// Data layer: the derivation and filtering engine, independent of the UI.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (RecordStore caches the fixed source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  attach total_score / risk_score → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Criteria → row indices (a view, never a copy)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group means, correlations, top-N over the view
///   └───────────┘
/// ```
///
/// Everything below `filter` is pure over immutable inputs; `export` turns a
/// view back into CSV bytes for download.
pub mod aggregate;
pub mod derive;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
