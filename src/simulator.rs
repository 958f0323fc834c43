//! Frame loop tying the field, the camera and the host together.

use crate::camera::Camera;
use crate::clock::FrameClock;
use crate::config::FieldConfig;
use crate::field::Field;
use crate::graphics::Framebuffer;
use crate::host::{pixel_size, Command, Host, HostEvent, Label, Subscription};
use crate::pointer::PointerState;
use crate::render::Renderer;
use crate::scene::Lighting;
use anyhow::Result;
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

const FOV_DEGREES: f64 = 60.0;
const NEAR: f64 = 0.1;
const FAR: f64 = 200.0;

/// How long to block on the host while the surface is hidden
const HIDDEN_POLL: Duration = Duration::from_millis(250);

const SUBSCRIPTIONS: [Subscription; 3] = [
    Subscription::PointerMove,
    Subscription::Resize,
    Subscription::Visibility,
];

/// How the simulator was asked to run
#[derive(Clone, Debug)]
pub struct SimulatorOptions {
    pub field: FieldConfig,
    pub fps: u32,
    pub show_edges: bool,
}

/// Frames-per-second counter, refreshed once a second of clock time
struct FrameStats {
    frames_since_last_update: usize,
    seconds_since_last_update: f64,
    fps: f64,
}

impl FrameStats {
    fn new() -> Self {
        FrameStats {
            frames_since_last_update: 0,
            seconds_since_last_update: 0.0,
            fps: 0.0,
        }
    }

    fn tick(&mut self, delta: f64) {
        self.frames_since_last_update += 1;
        self.seconds_since_last_update += delta;
        if self.seconds_since_last_update >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / self.seconds_since_last_update;
            self.frames_since_last_update = 0;
            self.seconds_since_last_update = 0.0;
        }
    }
}

/// Background field simulator
pub struct Simulator<H: Host, C: FrameClock> {
    host: H,
    clock: C,
    field: Field,
    camera: Camera,
    pointer: PointerState,
    lighting: Lighting,
    renderer: Renderer,
    frame: Framebuffer,
    stats: FrameStats,
    frame_budget: Duration,
    /// Loop keeps going while set
    running: bool,
    /// Frame chain is live; cleared while the surface is hidden
    active: bool,
    paused: bool,
    debug: bool,
    frame_count: u64,
}

impl<H: Host, C: FrameClock> Simulator<H, C> {
    /// Builds the grid and registers with the host
    pub fn new<R: Rng>(mut host: H, clock: C, options: SimulatorOptions, rng: &mut R) -> Result<Self> {
        let (columns, rows) = host.size();
        let (width, height) = pixel_size(columns, rows);

        let field = Field::new(options.field, rng);
        ftlog::info!(
            "Built {}x{} field ({} cells, constrained: {})",
            field.config().grid_size,
            field.config().grid_size,
            field.len(),
            field.config().constrained
        );

        for subscription in SUBSCRIPTIONS {
            host.subscribe(subscription)?;
            ftlog::info!("Subscribed to {subscription:?}");
        }

        Ok(Simulator {
            host,
            clock,
            field,
            camera: Camera::new(FOV_DEGREES, width, height, NEAR, FAR),
            pointer: PointerState::default(),
            lighting: Lighting::studio(),
            renderer: Renderer::new(options.show_edges),
            frame: Framebuffer::new(width, height),
            stats: FrameStats::new(),
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(options.fps.max(1))),
            running: true,
            active: true,
            paused: false,
            debug: false,
            frame_count: 0,
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Runs frames until a quit command arrives, then tears down.
    ///
    /// Each pass drains host events, then draws one frame if the surface is
    /// visible, paced to the frame budget. A hidden surface only waits on
    /// the host.
    pub fn run(&mut self) -> Result<()> {
        ftlog::info!("Starting frame loop at {:?} per frame", self.frame_budget);
        let mut frame_started = Instant::now();
        while self.running {
            let remaining = if self.active {
                self.frame_budget.saturating_sub(frame_started.elapsed())
            } else {
                HIDDEN_POLL
            };
            for event in self.host.poll(remaining)? {
                self.handle_event(event);
            }
            if !self.running || !self.active {
                continue;
            }
            let left = self.frame_budget.saturating_sub(frame_started.elapsed());
            if !left.is_zero() {
                thread::sleep(left);
            }
            frame_started = Instant::now();
            self.frame()?;
        }
        self.teardown()
    }

    /// Applies one host notification
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::PointerMove { column, row } => {
                let (columns, rows) = self.host.size();
                self.pointer.move_to_cell(column, row, columns, rows);
            }
            HostEvent::Resize { columns, rows } => self.resize(columns, rows),
            HostEvent::Visibility(visible) => self.set_visible(visible),
            HostEvent::Command(Command::Quit) => {
                ftlog::info!("Quit requested");
                self.running = false;
            }
            HostEvent::Command(Command::TogglePause) => {
                self.paused = !self.paused;
                ftlog::info!("Paused: {}", self.paused);
            }
            HostEvent::Command(Command::ToggleDebug) => self.debug = !self.debug,
            HostEvent::Command(Command::Reset) => {
                self.field.reset();
                ftlog::info!("Field reset to rest");
            }
        }
    }

    /// Resizes the output and the camera; the grid is left alone
    pub fn resize(&mut self, columns: u16, rows: u16) {
        let (width, height) = pixel_size(columns, rows);
        self.frame.resize(width, height);
        self.camera.set_viewport(width, height);
        ftlog::info!("Resized to {columns}x{rows} cells, aspect {:.3}", self.camera.aspect);
    }

    fn set_visible(&mut self, visible: bool) {
        if visible {
            if !self.active {
                // Fresh chain: the hidden interval must not show up as one huge delta.
                self.clock.rearm();
                self.active = true;
                ftlog::info!("Surface visible, frames resumed");
            }
        } else if self.active {
            self.active = false;
            ftlog::info!("Surface hidden, frames suspended");
        }
    }

    /// Advances the simulation by one frame without drawing
    pub fn advance(&mut self) {
        self.pointer.smooth_step(self.field.config().pointer_smoothing);
        self.pointer.project(&self.camera);
        self.lighting.animate(self.clock.elapsed());
        self.field.update(&self.pointer.world);
        self.frame_count += 1;
    }

    /// One full frame: step, draw, present
    pub fn frame(&mut self) -> Result<()> {
        let delta = self.clock.delta();
        if !self.paused {
            self.advance();
        }
        self.renderer
            .render(&self.field, &self.camera, &self.lighting, &mut self.frame);
        self.stats.tick(delta);
        let labels = self.labels();
        self.host.present(&self.frame, &labels)
    }

    fn labels(&self) -> Vec<Label> {
        let mut labels = Vec::new();
        if self.debug {
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!("FPS: {:.2}", self.stats.fps),
                format!(
                    "Pointer: ({:.2}, {:.2}, {:.2})",
                    self.pointer.world[0], self.pointer.world[1], self.pointer.world[2]
                ),
                format!(
                    "Grid: {0}x{0}  drawn: {1}  glowing: {2}",
                    self.field.config().grid_size,
                    self.renderer.drawn(),
                    self.field.touched()
                ),
                format!("Frame: {}", self.frame_count),
            ];
            for (row, text) in lines.into_iter().enumerate() {
                labels.push(Label {
                    column: 1,
                    row: row as u16,
                    text,
                });
            }
        }
        if self.paused {
            let (columns, rows) = self.host.size();
            let text = "Paused".to_string();
            labels.push(Label {
                column: columns.saturating_sub(text.len() as u16) / 2,
                row: rows / 2,
                text,
            });
        }
        labels
    }

    /// Drops every subscription taken at construction
    pub fn teardown(&mut self) -> Result<()> {
        for subscription in SUBSCRIPTIONS {
            self.host.unsubscribe(subscription)?;
        }
        self.active = false;
        ftlog::info!("Torn down after {} frames", self.frame_count);
        Ok(())
    }
}
