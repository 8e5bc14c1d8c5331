//! Signal readout overlay.

use nannou::prelude::*;
use orbit_viz_core::{SignalAdapter, SignalUpdate, Transport, UpdateOrigin};
use std::cell::Cell;
use std::rc::Rc;

/// Counts adapter notifications so the overlay can show an update rate.
#[derive(Clone, Default)]
pub struct UpdateCounter {
    analyzer: Rc<Cell<u64>>,
    fallback: Rc<Cell<u64>>,
}

impl UpdateCounter {
    pub fn record(&self, update: &SignalUpdate<'_>) {
        let cell = match update.origin {
            UpdateOrigin::Analyzer => &self.analyzer,
            UpdateOrigin::Fallback => &self.fallback,
        };
        cell.set(cell.get() + 1);
    }

    fn total(&self) -> u64 {
        self.analyzer.get() + self.fallback.get()
    }
}

/// Opaque: the frame persists, so older readouts must not show through
fn backing_color() -> Rgba {
    rgba(0.0, 0.0, 0.0, 1.0)
}

pub struct Hud {
    pub visible: bool,
    counter: UpdateCounter,
    last_total: u64,
    elapsed: f32,
    rate: f32,
}

impl Hud {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            counter: UpdateCounter::default(),
            last_total: 0,
            elapsed: 0.0,
            rate: 0.0,
        }
    }

    /// Hook for [`SignalAdapter::subscribe`]
    pub fn counter(&self) -> UpdateCounter {
        self.counter.clone()
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return;
        }
        let total = self.counter.total();
        self.rate = (total - self.last_total) as f32 / self.elapsed;
        self.last_total = total;
        self.elapsed = 0.0;
    }

    pub fn update_rate(&self) -> f32 {
        self.rate
    }

    pub fn lines(
        &self,
        adapter: &SignalAdapter,
        particles: usize,
        transport: Option<Transport>,
    ) -> Vec<String> {
        let signal = adapter.signal();
        let source = if adapter.is_fallback_active() {
            "fallback"
        } else {
            "analyzer"
        };
        let transport = match transport {
            Some(Transport::Playing) => "playing",
            Some(Transport::Paused) => "paused",
            None => "no audio",
        };

        vec![
            format!("energy    {:.3}", signal.energy),
            format!("level     {:.1} dB", signal.decibels),
            format!("signal    {} ({})", source, transport),
            format!("updates   {:.0}/s", self.rate),
            format!("particles {}", particles),
        ]
    }

    pub fn draw(
        &self,
        draw: &Draw,
        bounds: Rect,
        adapter: &SignalAdapter,
        particles: usize,
        transport: Option<Transport>,
    ) {
        let line_height = 18.0;
        let width = 220.0;
        let padding = 10.0;
        let lines = self.lines(adapter, particles, transport);
        let height = lines.len() as f32 * line_height + padding * 2.0;

        let left = bounds.left() + padding;
        let top = bounds.top() - padding;
        draw.rect()
            .x_y(left + width / 2.0, top - height / 2.0)
            .w_h(width, height)
            .color(backing_color());

        for (i, text) in lines.iter().enumerate() {
            let y = top - padding - line_height * (i as f32 + 0.5);
            draw.text(text)
                .xy(pt2(left + width / 2.0, y))
                .wh(pt2(width - padding * 2.0, line_height))
                .left_justify()
                .no_line_wrap()
                .color(rgba(1.0, 1.0, 1.0, 0.85))
                .font_size(13);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_viz_core::AdapterConfig;
    use std::time::Duration;

    #[test]
    fn test_counter_rate() {
        let mut hud = Hud::new(true);
        let mut adapter = SignalAdapter::without_analyzer(AdapterConfig::default(), 32);
        let counter = hud.counter();
        adapter.subscribe(move |update| counter.record(update));
        adapter.start();

        let mut rng = rand::rng();
        adapter.advance(Duration::from_millis(160), &mut rng);
        hud.tick(0.5);
        assert_eq!(hud.update_rate(), 0.0);
        hud.tick(0.5);
        assert!((hud.update_rate() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_backing_is_opaque() {
        assert_eq!(backing_color().alpha, 1.0);
    }

    #[test]
    fn test_lines_without_audio() {
        let hud = Hud::new(false);
        let mut adapter = SignalAdapter::without_analyzer(AdapterConfig::default(), 32);
        adapter.start();
        let lines = hud.lines(&adapter, 7, None);
        assert!(lines.iter().any(|l| l.contains("fallback (no audio)")));
        assert!(lines.iter().any(|l| l == "particles 7"));
    }
}
