/// Data layer: core types, loading, filtering and grouping.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, ordered column list
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop rows with a null label
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by label → ResultTable
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
