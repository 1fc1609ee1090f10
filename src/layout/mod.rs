pub mod arrow;
pub mod bar;
pub mod grid;
pub mod order;
pub mod style;

pub use arrow::{route_arrow, route_arrow_rtl, ArrowPath};
pub use bar::{
    convert_to_bars, progress_by_params, task_variant, BarColors, BarGeometry, BarVariant,
    DependencyEdge,
};
pub use grid::{build_grid, GridGeometry};
pub use order::{arrange, ArrangedTask};
pub use style::{ChartOptions, FontMetrics};
