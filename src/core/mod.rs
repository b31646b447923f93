pub mod animation;
pub mod motion;
pub mod observable;
pub mod redraw;
pub mod resources;
pub mod scroll;
pub mod showcase;
pub mod stage;
pub mod transform;
pub mod viewport;

pub use animation::{AnimationStep, MotionCurve, Phase, Phases, Wave, MAX_SCALE_AMPLITUDE};
pub use motion::{ReducedMotion, Subscription};
pub use observable::{observable, Publisher, Watch};
pub use redraw::{RedrawLoop, RedrawState};
pub use resources::{LiveCounts, ResourceId, ResourceKind, ResourceLedger, SharedLedger};
pub use scroll::{scroll_progress, ScrollKey, ScrollSample, ScrollSettings, ScrollTracker};
pub use showcase::Showcase;
pub use stage::{LoadState, Stage};
pub use transform::Transform;
pub use viewport::Viewport;
