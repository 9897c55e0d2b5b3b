/// Data layer: core types, loading, reshaping and aggregation.
///
/// Architecture:
/// ```text
///  size,time rows (.csv / .txt / .parquet / bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse rows → MeasurementTable
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐          ┌───────────┐
///   │ reshape  │          │ aggregate │
///   └──────────┘          └───────────┘
///   RunMatrix               Summary
///   runs[run][size]         size → mean / median
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod reshape;
