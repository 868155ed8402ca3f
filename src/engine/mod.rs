//! Engine adapters behind the lifecycle's engine traits.

mod native;
mod vanta;
mod vanta_options;

pub use native::{NativeEngine, NativeHandle};
pub use vanta::{VantaEngine, VantaHandle};

use backdrop_core::{
    BackdropError, EffectEngine, EffectHandle, EffectVariant, EngineKind, FrameRateCap, Palette,
    PerformanceTier, RenderParameters,
};
use web_sys as web;

pub enum WebEngine {
    Native(NativeEngine),
    Vanta(VantaEngine),
}

impl WebEngine {
    pub fn new(kind: EngineKind, layer: web::HtmlElement, variant: EffectVariant, palette: Palette) -> Self {
        match kind {
            EngineKind::Native => WebEngine::Native(NativeEngine::new(layer, variant, palette)),
            EngineKind::Vanta => WebEngine::Vanta(VantaEngine::new(layer, variant, palette)),
        }
    }

    /// Takes effect on the next `create`.
    pub fn configure(&mut self, variant: EffectVariant, palette: Palette) {
        match self {
            WebEngine::Native(e) => e.configure(variant, palette),
            WebEngine::Vanta(e) => e.configure(variant, palette),
        }
    }

    /// Whether the effect layer has to accept pointer events. The native
    /// engine listens on the window instead.
    pub fn needs_pointer_events(&self, params: &RenderParameters) -> bool {
        matches!(self, WebEngine::Vanta(_)) && params.features.mouse_follow
    }

    /// Add the engine's script tags to the page (external engine only).
    pub fn inject_scripts(&self, document: &web::Document) {
        if let WebEngine::Vanta(e) = self {
            e.inject_scripts(document);
        }
    }
}

impl EffectEngine for WebEngine {
    type Handle = WebHandle;

    fn name(&self) -> &str {
        match self {
            WebEngine::Native(e) => e.name(),
            WebEngine::Vanta(e) => e.name(),
        }
    }

    fn is_loaded(&self) -> bool {
        match self {
            WebEngine::Native(_) => true,
            WebEngine::Vanta(e) => e.is_loaded(),
        }
    }

    fn create(
        &mut self,
        tier: PerformanceTier,
        params: &RenderParameters,
    ) -> Result<WebHandle, BackdropError> {
        match self {
            WebEngine::Native(e) => e.create(tier, params).map(WebHandle::Native),
            WebEngine::Vanta(e) => e.create(tier, params).map(WebHandle::Vanta),
        }
    }
}

pub enum WebHandle {
    Native(NativeHandle),
    Vanta(VantaHandle),
}

impl WebHandle {
    /// Error raised inside the engine's own frame callback, if any.
    pub fn take_failure(&mut self) -> Option<BackdropError> {
        match self {
            WebHandle::Native(h) => h.take_failure(),
            WebHandle::Vanta(h) => h.take_failure(),
        }
    }
}

impl EffectHandle for WebHandle {
    fn set_frame_rate(&mut self, cap: FrameRateCap) {
        match self {
            WebHandle::Native(h) => h.set_frame_rate(cap),
            WebHandle::Vanta(h) => h.set_frame_rate(cap),
        }
    }

    fn resize(&mut self) {
        match self {
            WebHandle::Native(h) => h.resize(),
            WebHandle::Vanta(h) => h.resize(),
        }
    }

    fn destroy(&mut self) {
        match self {
            WebHandle::Native(h) => h.destroy(),
            WebHandle::Vanta(h) => h.destroy(),
        }
    }
}
