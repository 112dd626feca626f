use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{Renderer, SceneFrame};

use super::SceneHost;

pub const SCENE_FRAME_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrameJsonContractV1 {
    pub schema_version: u32,
    pub frame: SceneFrame,
}

impl SceneFrame {
    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = SceneFrameJsonContractV1 {
            schema_version: SCENE_FRAME_JSON_SCHEMA_V1,
            frame: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize scene frame contract v1: {e}"))
        })
    }

    /// Accepts either a bare frame or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(frame) = serde_json::from_str::<SceneFrame>(input) {
            return Ok(frame);
        }
        let payload: SceneFrameJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse scene frame json payload: {e}"))
        })?;
        if payload.schema_version != SCENE_FRAME_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported scene frame schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.frame)
    }
}

impl<R: Renderer> SceneHost<R> {
    /// Snapshot of the frame the host would draw next.
    pub fn frame_json_contract_v1_pretty(&mut self) -> ChartResult<String> {
        self.build_frame().to_json_contract_v1_pretty()
    }
}
