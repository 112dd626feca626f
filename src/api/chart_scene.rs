use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ElementId, GrowthAnimation};
use crate::error::ChartResult;
use crate::interaction::HoverState;
use crate::render::SceneFrame;

/// Lifecycle shared by every chart scene.
///
/// `Unmounted → Initializing → Growing → Settled`; hover is orthogonal and
/// only accepted once the scene is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartPhase {
    #[default]
    Unmounted,
    /// Mounted, waiting for the host engine to become ready.
    Initializing,
    /// Visible and growing toward full size.
    Growing,
    /// Fully grown.
    Settled,
}

impl ChartPhase {
    #[must_use]
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Growing | Self::Settled)
    }
}

/// Chart content mounted inside a `SceneHost`.
///
/// Implementations own all of their per-frame state; the host only forwards
/// lifecycle events, elapsed time and hover routing, then asks for primitives.
pub trait ChartScene {
    fn name(&self) -> &'static str;

    fn phase(&self) -> ChartPhase;

    fn on_mount(&mut self);

    /// Called when the host first reveals the content.
    fn on_reveal(&mut self);

    fn on_unmount(&mut self);

    /// Advances per-frame state; returns `true` while another frame is needed.
    fn tick(&mut self, delta_seconds: f64) -> bool;

    /// Whether the next frame would differ from the current one.
    fn is_animating(&self) -> bool;

    fn hovered(&self) -> Option<ElementId>;

    /// Returns `true` when the hover state changed.
    fn pointer_enter(&mut self, element: ElementId) -> bool;

    /// Returns `true` when the hover state changed.
    fn pointer_leave(&mut self, element: ElementId) -> bool;

    /// Appends content primitives to `frame`.
    fn build(&self, frame: &mut SceneFrame) -> ChartResult<()>;
}

/// Phase, growth clock and hover state of one scene instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneState {
    scene: &'static str,
    phase: ChartPhase,
    growth: GrowthAnimation,
    hover: HoverState,
}

impl SceneState {
    #[must_use]
    pub fn new(scene: &'static str, growth_per_second: f64) -> Self {
        Self {
            scene,
            phase: ChartPhase::Unmounted,
            growth: GrowthAnimation::new(growth_per_second),
            hover: HoverState::default(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> ChartPhase {
        self.phase
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.growth.progress()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.hover.hovered()
    }

    #[must_use]
    pub fn is_hovered(&self, element: ElementId) -> bool {
        self.hover.is_hovered(element)
    }

    pub fn mount(&mut self) {
        if self.phase == ChartPhase::Unmounted {
            self.growth.reset();
            self.transition(ChartPhase::Initializing);
        }
    }

    pub fn reveal(&mut self) {
        if self.phase == ChartPhase::Initializing {
            self.transition(ChartPhase::Growing);
        }
    }

    pub fn unmount(&mut self) {
        self.hover.clear();
        self.transition(ChartPhase::Unmounted);
    }

    /// Advances growth; returns `true` while still growing.
    pub fn advance(&mut self, delta_seconds: f64) -> bool {
        if self.phase != ChartPhase::Growing {
            return false;
        }
        let growing = self.growth.advance(delta_seconds);
        if !growing {
            self.transition(ChartPhase::Settled);
        }
        growing
    }

    pub fn pointer_enter(&mut self, element: ElementId) -> bool {
        if !self.phase.is_visible() {
            return false;
        }
        self.hover.pointer_enter(element)
    }

    pub fn pointer_leave(&mut self, element: ElementId) -> bool {
        self.hover.pointer_leave(element)
    }

    fn transition(&mut self, next: ChartPhase) {
        if self.phase != next {
            debug!(scene = self.scene, from = ?self.phase, to = ?next, "chart phase transition");
            self.phase = next;
        }
    }
}
