pub mod arc_layout;
pub mod bar_layout;
pub mod camera;
pub mod clock;
pub mod easing;
pub mod geometry;
pub mod proportion;
pub mod series;
pub mod types;

pub use arc_layout::{SliceSpan, compute_slice_spans, is_label_visible};
pub use bar_layout::{
    BarGridSpacing, BarSlot, bar_height, bucket_center_x, category_maxima, layout_bar_slots,
};
pub use camera::{
    CameraConfig, CameraState, CameraView, OrbitBounds, OrbitCamera, Ray, ScreenPoint, project_with,
};
pub use clock::{FrameClock, ManualClock, MonotonicClock};
pub use easing::{EasedValue, GrowthAnimation, ease_toward, smoothing_factor};
pub use geometry::{MeshData, MeshShape, Transform3, tessellate, tessellate_all};
pub use proportion::{
    DonutChartData, ProportionSlice, SecondaryTotal, SliceMetric, format_percentage, format_value,
};
pub use series::{BarCategory, CategorySeries, SeriesBucket};
pub use types::{Color, ElementId, Viewport};
