/// Data layer: solution-set rows, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SolutionTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SolutionTable │  Vec<SolutionRow> (E, n, F)
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep rows with F < threshold
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

pub use filter::filter_below;
pub use loader::load_file;
pub use model::{SolutionRow, SolutionTable};
