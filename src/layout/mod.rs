//! Layout compiler: venue descriptors in, flat priced seat specs out.

pub mod compiler;
pub mod labels;
mod pricing;

pub use compiler::{compile, CompiledLayout, CLUSTER_MARGIN, GRID_UNIT};
pub use labels::{row_label, seat_label};
