pub mod clock;
pub mod config;
pub mod geometry;
pub mod history;
pub mod id;
pub mod model;
pub mod preset;
pub mod scene;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EditorConfig;
pub use geometry::{ResizeHandle, Viewport};
pub use history::{History, Snapshot};
pub use id::ElementId;
pub use model::{Element, ElementPatch, StyleBag};
pub use preset::{Placement, PresetBundle};
pub use scene::{IdList, Scene, SceneAction, SceneHooks};

// Re-export kurbo types so downstream crates share one geometry vocabulary
pub use kurbo::{Affine, Point, Rect, Size, Vec2};
