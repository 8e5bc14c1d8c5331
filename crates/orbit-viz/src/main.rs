mod audio;
mod cli;
mod renderer;
mod ui;
mod utils;

use audio::SourcePipe;
use clap::Parser;
use cli::Args;
use nannou::prelude::*;
use orbit_viz_core::{
    AnalyzerConfig, AudioSource, FrequencyAnalyzer, Scene, Settings, SignalAdapter, Transport,
};
use renderer::{Hud, NannouSurface, Resolution};
use std::cell::RefCell;
use ui::bindings::{parse_key, Action};
use utils::{Config, ConfigWatcher};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.list_devices {
        SourcePipe::list_devices();
        return;
    }

    nannou::app(model).update(update).run();
}

struct Model {
    pipe: Option<SourcePipe>,
    adapter: SignalAdapter,
    /// Simulation advances inside `view`, which only gets `&Model`
    scene: RefCell<Scene>,
    settings: Settings,
    /// Last config read from disk, before command line overrides
    file_config: Config,
    watcher: ConfigWatcher,
    hud: Hud,
}

impl Model {
    fn transport(&self) -> Option<Transport> {
        self.pipe.as_ref().map(SourcePipe::transport)
    }

    fn toggle_playback(&mut self) {
        let Some(pipe) = self.pipe.as_mut() else {
            log::info!("No audio source, nothing to play");
            return;
        };
        if pipe.transport().is_playing() {
            pipe.pause();
            log::info!("Paused");
        } else if pipe.play() {
            self.adapter.on_play();
            log::info!("Playing {}", pipe.source());
        }
    }

    fn apply_config(&mut self, config: Config) {
        if config.requires_restart(&self.file_config) {
            log::info!("Audio and fallback options changed; restart to apply them");
        }
        self.settings = config.settings.clone();
        self.file_config = config;
    }
}

fn model(app: &App) -> Model {
    let args = Args::parse();
    let resolution = Resolution::current(args.windowed);
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("orbit-viz")
        .view(view)
        .key_pressed(key_pressed)
        .resized(resized)
        .size(resolution.width, resolution.height)
        .min_size(320, 240);

    if resolution.fullscreen {
        win = win.fullscreen();
    }

    win.build().expect("Failed to open window");

    let config_path = args.config_path();
    let file_config = Config::load(config_path.as_deref());
    let mut config = file_config.clone();
    args.apply(&mut config);

    let adapter_config = config.adapter();
    let analyzer = match FrequencyAnalyzer::new(config.analyzer()) {
        Ok(analyzer) => Some(analyzer),
        Err(e) => {
            log::error!("Invalid analyzer config: {}", e);
            None
        }
    };

    let pipe = match &analyzer {
        Some(analyzer) if SourcePipe::enabled() => open_pipe(&config, analyzer.is_muted()),
        Some(_) => {
            log::warn!("Audio unavailable on this host, running on the fallback signal");
            None
        }
        None => None,
    };

    let band_count = analyzer
        .as_ref()
        .map_or(AnalyzerConfig::default().band_count, |a| a.config().band_count);
    let mut adapter = match (analyzer, &pipe) {
        (Some(analyzer), Some(_)) => SignalAdapter::new(adapter_config, analyzer),
        _ => SignalAdapter::without_analyzer(adapter_config, band_count),
    };

    let hud = Hud::new(args.hud);
    let counter = hud.counter();
    adapter.subscribe(move |update| counter.record(update));
    adapter.start();

    let bounds = app.window_rect();
    let scene = Scene::new(bounds.w(), bounds.h(), &config.settings);
    log::info!("Viewport: {}x{}", bounds.w(), bounds.h());

    let mut model = Model {
        pipe,
        adapter,
        scene: RefCell::new(scene),
        settings: config.settings,
        file_config,
        watcher: ConfigWatcher::new(config_path),
        hud,
    };

    // Start immediately; Space pauses
    model.toggle_playback();
    model
}

fn open_pipe(config: &Config, muted: bool) -> Option<SourcePipe> {
    let source = match AudioSource::parse(config.source()) {
        Ok(source) => source,
        Err(e) => {
            log::error!("{}", e);
            return None;
        }
    };

    match SourcePipe::open(source, muted, config.device_timeout()) {
        Ok(pipe) => Some(pipe),
        Err(e) => {
            log::error!("{:#}", e);
            None
        }
    }
}

fn update(_app: &App, model: &mut Model, update: Update) {
    if let Some(config) = model.watcher.check_reload() {
        model.apply_config(config);
    }

    let mut rng = rand::rng();
    if let Some(pipe) = &model.pipe {
        let transport = pipe.transport();
        for block in pipe.drain() {
            model.adapter.process_block(&block, transport, &mut rng);
        }
    }
    model.adapter.advance(update.since_last, &mut rng);
    model.hud.tick(update.since_last.as_secs_f32());
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let mut scene = model.scene.borrow_mut();
    let (width, height) = scene.viewport();
    let mut surface = NannouSurface::new(&draw, width, height);
    scene.frame(
        &mut surface,
        &model.settings,
        model.adapter.signal(),
        &mut rand::rng(),
    );
    if let Err(e) = draw.to_frame(app, &frame) {
        log::error!("Failed to render frame: {:?}", e);
    }

    if model.hud.visible {
        let hud_draw = app.draw();
        model.hud.draw(
            &hud_draw,
            app.window_rect(),
            &model.adapter,
            scene.field().len(),
            model.transport(),
        );
        if let Err(e) = hud_draw.to_frame(app, &frame) {
            log::error!("Failed to render overlay: {:?}", e);
        }
    }
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    log::debug!("Resized to {}x{}", size.x, size.y);
    model.scene.borrow_mut().resize(size.x, size.y);
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let Some(action) = parse_key(key) else {
        return;
    };

    match action {
        Action::Quit => app.quit(),
        Action::TogglePlayback => model.toggle_playback(),
        Action::ReloadSettings => {
            if let Some(config) = model.watcher.reload() {
                model.apply_config(config);
            }
        }
        Action::ToggleHud => model.hud.toggle(),
    }
}
