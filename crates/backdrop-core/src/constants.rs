//! Tuning constants for probing and degradation.
//!
//! Thresholds and multipliers live here so the policy code reads as rules
//! rather than a list of magic numbers.

// Capability thresholds
pub const LOW_MEMORY_GB: f64 = 2.0; // at or below: high risk
pub const MODERATE_MEMORY_GB: f64 = 4.0;
pub const LOW_CORE_COUNT: u32 = 2; // at or below: high risk
pub const MODERATE_CORE_COUNT: u32 = 4;
pub const SMALL_VIEWPORT_PX: f64 = 768.0;
pub const LOW_BATTERY_LEVEL: f64 = 0.2;

// Assumed when the platform does not report a value
pub const DEFAULT_MEMORY_GB: f64 = 4.0;
pub const DEFAULT_CORE_COUNT: u32 = 4;

// Old mobile OS cut-offs (inclusive)
pub const OLD_ANDROID_MAJOR: u32 = 7;
pub const OLD_IOS_MAJOR: u32 = 12;

// Frame-rate monitor
pub const FPS_SAMPLE_WINDOW_SEC: f32 = 1.0;
pub const FPS_DEGRADE_BELOW: f32 = 30.0;
pub const FPS_LOW_SAMPLES_TO_DEGRADE: u32 = 2;

// Engine script polling
pub const ENGINE_LOAD_MAX_RETRIES: u32 = 3;
pub const ENGINE_POLL_INTERVAL_MS: u32 = 250;

// Mobile parity profile (forceMobileHighPerformance)
pub const MOBILE_PARITY_QUANTITY: f32 = 0.6;
pub const MOBILE_PARITY_SIZE: f32 = 1.5;
pub const MOBILE_PARITY_PIXEL_RATIO: f32 = 0.75;

// Flock simulation
pub const FLOCK_NEIGHBOR_RADIUS: f32 = 60.0; // css px
pub const FLOCK_CONNECT_DISTANCE: f32 = 110.0; // css px
pub const FLOCK_BASE_SPEED: f32 = 40.0; // css px per second at speed 1.0
pub const FLOCK_POINTER_PULL: f32 = 1.6;
pub const FLOCK_MAX_DT_SEC: f32 = 0.1;
pub const MAX_PARTICLES: u32 = 600; // hard ceiling whatever quantity is asked for
