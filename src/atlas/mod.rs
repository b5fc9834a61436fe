//! Pure similarity-atlas engine: node topology, distance buckets, palette,
//! graph derivation and selection state. Nothing in here touches the UI or
//! the filesystem.

mod category;
mod color;
mod geo;
mod graph;
mod matrix;
mod nodes;
mod selection;
mod word_order;

pub use category::{DistanceCategory, DistanceFilter, categorize};
pub use color::{Rgba, arc_color};
pub use graph::{Graph, PointRole};
pub use matrix::{LanguagePair, Metric, SimilarityMatrix};
pub use nodes::NodeRegistry;
pub use selection::{GraphInputs, NavigationRequest, Selection, SelectionController};
pub use word_order::{HeadDirectionRates, WORD_ORDER_KEY};
