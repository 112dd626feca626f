use serde::{Deserialize, Serialize};

use crate::error::ChartResult;
use crate::render::Renderer;

use super::SceneHost;

/// Ordered repaint classes; merging keeps the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    /// Only hover-driven highlight or tooltip changed.
    Cursor,
    /// Animation or camera moved; content geometry is unchanged.
    Light,
    /// Content, chrome or overlay changed.
    Full,
}

impl InvalidationLevel {
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }
}

/// Domain-oriented invalidation topic used to classify repaint requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTopic {
    General,
    Hover,
    Animation,
    Camera,
    Content,
    Overlay,
}

impl InvalidationTopic {
    const fn bit(self) -> u8 {
        match self {
            Self::General => 1 << 0,
            Self::Hover => 1 << 1,
            Self::Animation => 1 << 2,
            Self::Camera => 1 << 3,
            Self::Content => 1 << 4,
            Self::Overlay => 1 << 5,
        }
    }
}

/// Bitmask of invalidation topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationTopics {
    bits: u8,
}

impl InvalidationTopics {
    const ALL_BITS: u8 = InvalidationTopic::General.bit()
        | InvalidationTopic::Hover.bit()
        | InvalidationTopic::Animation.bit()
        | InvalidationTopic::Camera.bit()
        | InvalidationTopic::Content.bit()
        | InvalidationTopic::Overlay.bit();

    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            bits: Self::ALL_BITS,
        }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self { bits: topic.bit() }
    }

    #[must_use]
    pub const fn with_topic(self, topic: InvalidationTopic) -> Self {
        Self {
            bits: self.bits | topic.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains_topic(self, topic: InvalidationTopic) -> bool {
        (self.bits & topic.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// Coalesced invalidation request consumed by frame scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationMask {
    level: InvalidationLevel,
    #[serde(default)]
    topics: InvalidationTopics,
}

impl InvalidationMask {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            level: InvalidationLevel::None,
            topics: InvalidationTopics::none(),
        }
    }

    #[must_use]
    pub const fn hover() -> Self {
        Self {
            level: InvalidationLevel::Cursor,
            topics: InvalidationTopics::from_topic(InvalidationTopic::Hover),
        }
    }

    #[must_use]
    pub const fn animation() -> Self {
        Self {
            level: InvalidationLevel::Light,
            topics: InvalidationTopics::from_topic(InvalidationTopic::Animation),
        }
    }

    #[must_use]
    pub const fn camera() -> Self {
        Self {
            level: InvalidationLevel::Light,
            topics: InvalidationTopics::from_topic(InvalidationTopic::Camera),
        }
    }

    #[must_use]
    pub const fn content() -> Self {
        Self {
            level: InvalidationLevel::Full,
            topics: InvalidationTopics::from_topic(InvalidationTopic::Content),
        }
    }

    #[must_use]
    pub const fn overlay() -> Self {
        Self {
            level: InvalidationLevel::Full,
            topics: InvalidationTopics::from_topic(InvalidationTopic::Overlay),
        }
    }

    #[must_use]
    pub const fn full() -> Self {
        Self {
            level: InvalidationLevel::Full,
            topics: InvalidationTopics::all(),
        }
    }

    #[must_use]
    pub const fn level(self) -> InvalidationLevel {
        self.level
    }

    #[must_use]
    pub const fn topics(self) -> InvalidationTopics {
        self.topics
    }

    #[must_use]
    pub const fn has_topic(self, topic: InvalidationTopic) -> bool {
        self.topics.contains_topic(topic)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self.level, InvalidationLevel::None)
    }

    /// Only the camera moved; built content and overlays are still current.
    #[must_use]
    pub const fn is_view_only(self) -> bool {
        matches!(self.level, InvalidationLevel::Light)
            && self.topics.bits == InvalidationTopic::Camera.bit()
    }

    pub fn merge(&mut self, other: Self) {
        self.level = self.level.max(other.level);
        self.topics = self.topics.union(other.topics);
    }
}

impl<R: Renderer> SceneHost<R> {
    #[must_use]
    pub fn pending_invalidation(&self) -> InvalidationMask {
        self.pending
    }

    #[must_use]
    pub fn pending_invalidation_level(&self) -> InvalidationLevel {
        self.pending.level()
    }

    #[must_use]
    pub fn has_pending_invalidation(&self) -> bool {
        !self.pending.is_none()
    }

    #[must_use]
    pub fn has_pending_invalidation_topic(&self, topic: InvalidationTopic) -> bool {
        self.pending.has_topic(topic)
    }

    pub fn clear_pending_invalidation(&mut self) {
        self.pending = InvalidationMask::none();
    }

    #[must_use]
    pub fn take_pending_invalidation(&mut self) -> InvalidationMask {
        std::mem::take(&mut self.pending)
    }

    /// Renders only when something is pending; returns whether a frame was drawn.
    pub fn render_if_invalidated(&mut self) -> ChartResult<bool> {
        if !self.has_pending_invalidation() {
            return Ok(false);
        }
        self.render()?;
        Ok(true)
    }

    pub(super) fn invalidate(&mut self, mask: InvalidationMask) {
        self.pending.merge(mask);
    }
}
