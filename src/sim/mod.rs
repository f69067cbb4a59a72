//! Deterministic simulation module
//!
//! Everything that advances the world lives here. Stepping must stay
//! deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by instance id, then layer depth)
//! - No rendering or platform dependencies beyond the `Renderer` trait

pub mod actor;
pub mod boundary;
pub mod camera;
pub mod context;
pub mod event;
pub mod geometry;
pub mod hooks;
pub mod index;
pub mod layer;
pub mod motion;
pub mod scene;
pub mod stage;
pub mod state;
pub mod tick;

pub use actor::{ActorDefinition, ActorRegistry, Behavior};
pub use boundary::{BoundaryShape, Bounds, PositionedBoundary};
pub use camera::{Camera, Follow};
pub use context::{SimContext, StepContext};
pub use event::{
    Cancellable, GameEvent, KeyPhase, KeyboardEvent, PointerEvent, PointerKind, PointerPhase,
};
pub use index::InstanceIndex;
pub use layer::Layer;
pub use scene::{Scene, SceneState};
pub use stage::Stage;
pub use state::{IdAllocator, Instance, InstanceId, LayerId, StateBag, Status, Value};
pub use tick::FixedStep;
