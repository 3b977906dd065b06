//! Backends that can provide signal samples.

pub mod device;
pub mod fallback;
pub mod simulation;

pub use device::DeviceSource;
pub use fallback::{FallbackChain, FallbackStep, sine_fallback};
pub use simulation::{SimulationBuffer, SimulationSource};
