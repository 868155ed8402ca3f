//! Platform-free core of the adaptive backdrop.
//!
//! Everything here is plain Rust with no browser bindings so the web layer and
//! host-side tests share one implementation of probing, degradation and the
//! effect lifecycle.

pub mod capabilities;
pub mod constants;
pub mod error;
pub mod flock;
pub mod fps;
pub mod lifecycle;
pub mod loader;
pub mod options;
pub mod policy;
pub mod prober;
pub mod tier;
pub mod visibility;

pub use capabilities::*;
pub use error::*;
pub use flock::*;
pub use fps::*;
pub use lifecycle::*;
pub use loader::*;
pub use options::*;
pub use policy::*;
pub use prober::*;
pub use tier::*;
pub use visibility::*;
