mod bar_chart_scene;
mod callbacks;
mod chart_scene;
mod donut_chart_scene;
mod host;
mod host_config;
mod invalidation;
mod json_contract;

pub use bar_chart_scene::{BarChartConfig, BarChartScene};
pub use callbacks::{CameraCallback, HostCallbacks, PointerCallback};
pub use chart_scene::{ChartPhase, ChartScene, SceneState};
pub use donut_chart_scene::{DonutChartConfig, DonutChartScene};
pub use host::SceneHost;
pub use host_config::{HostConfig, OrbitControls};
pub use invalidation::{
    InvalidationLevel, InvalidationMask, InvalidationTopic, InvalidationTopics,
};
pub use json_contract::{SCENE_FRAME_JSON_SCHEMA_V1, SceneFrameJsonContractV1};
