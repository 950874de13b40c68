//! Viewport interaction: pointer tracking, the editor camera and edit mode

pub mod camera;
pub mod edit_mode;
pub mod pointer;

pub use camera::{EditorCamera, Ray};
pub use edit_mode::{ClickOutcome, EditModeController, TransformMode};
pub use pointer::{PointerRelease, PointerState};
