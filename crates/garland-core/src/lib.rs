//! Platform-free core of garland: particle placement and choreography across
//! three arrangements, and the governor that trades fidelity for frame rate.

pub mod constants;
pub mod device;
pub mod error;
pub mod focus;
pub mod governor;
pub mod instance;
pub mod mode;
pub mod motion;
pub mod particle;
pub mod placement;
pub mod registry;
pub mod scene;
pub mod viewer;

pub use device::*;
pub use error::*;
pub use focus::*;
pub use governor::*;
pub use instance::*;
pub use mode::*;
pub use motion::*;
pub use particle::*;
pub use registry::*;
pub use scene::*;
pub use viewer::*;
