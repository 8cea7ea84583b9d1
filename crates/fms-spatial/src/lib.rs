//! `fms-spatial` — mine road network, map loading, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `MineNetwork` (CSR + R-tree), `MineNetworkBuilder`, `Segment` |
//! | [`router`]  | `Router` trait, `Route`, `ShortestPaths`, `DijkstraRouter`  |
//! | [`loader`]  | `load_network_csv`, `load_network_reader`, `RoadClass`      |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_reader, LoadSummary, RoadClass};
pub use network::{MineNetwork, MineNetworkBuilder, Segment};
pub use router::{DijkstraRouter, Route, Router, ShortestPaths};
