/// Data layer: grid and known-list types, plus their loaders.
///
/// Architecture:
/// ```text
///  rtl_power .csv / .json        freq_list
///        │                           │
///        ▼                           ▼
///   ┌──────────┐             ┌──────────────┐
///   │  loader   │  parse  →  │ KnownFrequency│
///   └──────────┘             └──────────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  SampleGrid   │  rows × bins, freq → column
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
