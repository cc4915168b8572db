//! Quire Core Library
//!
//! Selection and transform engine for a page-layout editor: items and
//! groups, alignment-guide snapping, move/resize/rotate gestures, polygon
//! vertex editing and an undo log with macros.

pub mod config;
pub mod engine;
pub mod guides;
pub mod handles;
pub mod history;
pub mod input;
pub mod item;
pub mod scene;
pub mod snap;
pub mod transform;

pub use config::{Settings, SettingsError, SnapSettings};
pub use engine::TransformEngine;
pub use guides::{GuideAxis, GuideEngine, GuideFamilies, GuideLine, SnapCorrection};
pub use handles::{Handle, HandleKind};
pub use history::{Command, CommandLog};
pub use input::{Key, Modifiers, MouseButton, PointerEvent};
pub use item::{Item, ItemId, ItemKind, ItemStyle};
pub use scene::Scene;
pub use snap::{ANGLE_SNAP_INCREMENT, snap_angle, snap_line_endpoint};
