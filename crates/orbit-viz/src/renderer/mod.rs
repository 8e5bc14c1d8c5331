mod hud;
mod nannou_surface;

pub use hud::Hud;
pub use nannou_surface::NannouSurface;

/// Window settings for the render loop
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Resolution {
    pub fn windowed() -> Self {
        Self {
            width: 800,
            height: 600,
            fullscreen: false,
        }
    }

    pub fn fullscreen() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: true,
        }
    }

    /// Debug builds always open a window
    pub fn current(windowed: bool) -> Self {
        if windowed || cfg!(debug_assertions) {
            Self::windowed()
        } else {
            Self::fullscreen()
        }
    }
}
