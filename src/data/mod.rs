/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  project columns → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  derive age / employment years → CreditDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterBuilder draft → FilterCriteria → subset dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by, quantiles, histograms
///   └───────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
