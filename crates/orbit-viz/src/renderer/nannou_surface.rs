//! `Surface` backed by a nannou `Draw`.

use nannou::prelude::*;
use orbit_viz_core::{Hsla, Surface};

/// Maps canvas coordinates (top-left origin, y down) onto nannou's
/// centered, y-up space. `save`/`restore` keep a stack of transformed draws.
pub struct NannouSurface {
    current: Draw,
    stack: Vec<Draw>,
}

impl NannouSurface {
    pub fn new(draw: &Draw, width: f32, height: f32) -> Self {
        let current = draw
            .translate(vec3(-width / 2.0, height / 2.0, 0.0))
            .scale_axes(vec3(1.0, -1.0, 1.0));
        Self {
            current,
            stack: Vec::new(),
        }
    }
}

fn to_nannou(color: Hsla) -> nannou::color::Hsla {
    hsla(
        color.hue / 360.0,
        color.saturation / 100.0,
        color.lightness / 100.0,
        color.alpha,
    )
}

impl Surface for NannouSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Hsla) {
        self.current
            .rect()
            .x_y(x + width / 2.0, y + height / 2.0)
            .w_h(width, height)
            .color(to_nannou(color));
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        self.current
            .ellipse()
            .x_y(x, y)
            .radius(radius)
            .color(to_nannou(color));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsla) {
        self.current
            .line()
            .start(pt2(from.0, from.1))
            .end(pt2(to.0, to.1))
            .weight(weight)
            .color(to_nannou(color));
    }

    fn save(&mut self) {
        self.stack.push(self.current.clone());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(draw) => self.current = draw,
            None => log::warn!("restore without matching save"),
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.translate(vec3(dx, dy, 0.0));
    }

    fn scale(&mut self, factor: f32) {
        self.current = self.current.scale_axes(vec3(factor, factor, 1.0));
    }
}
