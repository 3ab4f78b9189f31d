pub mod hit;
pub mod paint;

pub use hit::{HitTarget, hit_element, hit_test};
pub use paint::{
    DisplayList, HandleBox, Manipulator, PaintItem, SelectionFrame, SelectionOverlay,
    manipulation_target, manipulator,
};
