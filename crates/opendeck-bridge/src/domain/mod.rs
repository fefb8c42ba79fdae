//! Domain layer: pure types with no I/O, no async, and no framework
//! dependencies.
//!
//! Everything here is directly unit-testable without a network or a host
//! process: the bridge configuration, the canonical action context key, the
//! device descriptor, and the action registry.

pub mod config;
pub mod context;
pub mod device;
pub mod registry;
pub mod surface;

pub use config::BridgeConfig;
pub use context::ActionContext;
pub use device::DeviceDescriptor;
pub use registry::{ActionHandle, ActionRegistry};
pub use surface::{ActionSurface, ImageAssignment};
