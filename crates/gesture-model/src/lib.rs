//! Dragline Gesture Model
//!
//! Defines the data contracts shared by the controller and its hosts:
//! - **Events:** Pointer input from mouse and touch sources, with the
//!   position-extraction rules the controller relies on
//! - **Notifications:** Typed "drag"/"drop" payloads and their recorded form
//! - **Traces:** JSONL files of timestamped, targeted pointer events
//!
//! All coordinates are device pixels.

pub mod event;
pub mod notification;
pub mod trace;

pub use event::*;
pub use notification::*;
pub use trace::*;
