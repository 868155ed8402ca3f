/// DOM hooks, timings and script locations for the browser layer.
///
/// Pure values only so host-side tests can include this file directly.
// Auto-mount markers
pub const AUTO_MOUNT_ATTR: &str = "data-backdrop";
pub const OPTIONS_ATTR: &str = "data-backdrop-options";

// Class names applied to the generated elements
pub const CONTAINER_CLASS: &str = "backdrop-container";
pub const LAYER_CLASS: &str = "backdrop-layer";
pub const SLOT_CLASS: &str = "backdrop-content";
pub const STATIC_CLASS: &str = "backdrop-static";

// Stacking: effect layer under the content slot
pub const LAYER_Z_INDEX: i32 = 0;
pub const SLOT_Z_INDEX: i32 = 1;

// Timers (milliseconds)
pub const RESIZE_DEBOUNCE_MS: i32 = 200;
pub const IDLE_FALLBACK_DELAY_MS: i32 = 50;
pub const SCRIPT_GRACE_MS: i32 = 1500; // wait after injecting engine scripts

// Viewport presence
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

// Media queries
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

// WebGL renderer probe
pub const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;
pub const RENDERER_WEBGL: u32 = 0x1F01;

// External engine scripts
pub const THREE_SCRIPT_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/three.js/r134/three.min.js";
pub const VANTA_SCRIPT_BASE: &str = "https://cdn.jsdelivr.net/npm/vanta@0.5.24/dist/";

// Native renderer look
pub const LINK_MAX_ALPHA: f64 = 0.35;
pub const LINK_WIDTH_PX: f64 = 1.0;
pub const GLOW_BLUR_PX: f64 = 8.0;
pub const BIRD_LENGTH_FACTOR: f64 = 2.5; // bird body length relative to particle size
