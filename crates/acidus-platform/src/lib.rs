//! Acidus Platform - panel, storage and control-rate layer
//!
//! Everything between the module's hardware abstraction and the real-time
//! core that runs at control rate:
//!
//! - [`PanelInputs`] / [`SettingsStore`] - collaborator traits a board
//!   (or the host simulator) implements
//! - [`TriggerInputs`] - gate and tap edge detection with OR semantics
//! - [`boot`] - calibration load with corruption recovery
//! - [`run_calibration`] - the guided three-point procedure
//! - [`ControlLoop`] - one cooperative iteration per [`ControlLoop::poll`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! acidus-platform = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod boot;
pub mod calibration;
pub mod control_loop;
pub mod edge;
pub mod panel;
pub mod store;

pub use boot::{boot, should_enter_calibration};
pub use calibration::{POST_PRESS_DELAY_MS, run_calibration, wait_for_button};
pub use control_loop::{ControlLoop, INITIAL_NOTE};
pub use edge::{Edge, EdgeDetector, TriggerAction, TriggerInputs};
pub use panel::{Knob, PanelInputs, Switch, SwitchPosition};
pub use store::{MemorySettingsStore, SettingsStore};
