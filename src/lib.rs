//! chart3d-rs: declarative 3D chart scenes for dashboard statistics.
//!
//! A `SceneHost` owns the camera, lights, ground grid, orbit controls and the
//! loading/error overlays. Chart scenes (`BarChartScene`, `DonutChartScene`)
//! turn typed statistics into backend-agnostic `SceneFrame` primitives that a
//! `Renderer` draws.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{
    BarChartConfig, BarChartScene, ChartPhase, ChartScene, DonutChartConfig, DonutChartScene,
    HostConfig, SceneHost,
};
pub use error::{ChartError, ChartResult};
