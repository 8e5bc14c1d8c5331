//! Drawing surface abstraction.
//!
//! Coordinates are canvas-style: origin at the top-left corner, y pointing
//! down. Transforms compose like a 2D canvas context and are scoped by
//! `save`/`restore`.

/// HSL color with alpha. Hue in degrees, saturation and lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: f32,
}

impl Hsla {
    pub const fn new(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            alpha,
        }
    }

    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

pub trait Surface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Hsla);

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsla);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);

    /// Uniform scale about the current origin
    fn scale(&mut self, factor: f32);
}

/// A single recorded draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Hsla,
    },
    FillCircle {
        x: f32,
        y: f32,
        radius: f32,
        color: Hsla,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        weight: f32,
        color: Hsla,
    },
    Save,
    Restore,
    Translate {
        dx: f32,
        dy: f32,
    },
    Scale(f32),
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Default, Debug)]
pub struct Recorder {
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }
}

impl Surface for Recorder {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Hsla) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Hsla) {
        self.commands
            .push(DrawCommand::FillCircle { x, y, radius, color });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsla) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            weight,
            color,
        });
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand::Scale(factor));
    }
}
