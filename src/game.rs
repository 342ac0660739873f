//! The game loop.
//!
//! [`GameManager`] owns the subsystems and runs fixed-period frames:
//! input, step dispatch, world update, draw, then a pacing sleep.

use crate::builtin::input::{InputBackend, InputManager};
use crate::config::EngineConfig;
use crate::debug::Diagnostics;
use crate::display::RenderBackend;
use crate::error::{EngineError, Result};
use crate::event::Event;
use crate::geometry::BoundingBox;
use crate::resources::ResourceManager;
use crate::subsystem::Subsystem;
use crate::time::{Clock, FramePacer};
use crate::world::WorldManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug_span, error, info, warn};

/// Shared "stop after this frame" flag
#[derive(Clone, Debug, Default)]
pub struct GameOver(Arc<AtomicBool>);

impl GameOver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, over: bool) {
        self.0.store(over, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Owns the world and the I/O subsystems and drives frames
pub struct GameManager {
    world: WorldManager,
    display: Box<dyn RenderBackend>,
    display_started: bool,
    input: InputManager,
    resources: ResourceManager,
    pacer: FramePacer,
    clock: Clock,
    diagnostics: Diagnostics,
    step_count: u64,
    started: bool,
}

impl GameManager {
    /// Build the subsystems from `config`; nothing is started yet
    pub fn new(
        config: &EngineConfig,
        display: Box<dyn RenderBackend>,
        input: Box<dyn InputBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let resources = ResourceManager::with_limit(
            config.resources.asset_dir.clone(),
            config.resources.max_sprites,
        );
        Ok(Self {
            world: WorldManager::new(config, resources.clone()),
            display,
            display_started: false,
            input: InputManager::new(input),
            resources,
            pacer: FramePacer::new(config.frame.target(), config.frame.min_sleep()),
            clock: Clock::new(),
            diagnostics: Diagnostics::new(),
            step_count: 0,
            started: false,
        })
    }

    /// Start world, display, input and resources, in that order.
    ///
    /// On failure the subsystems already started are shut down in reverse
    /// order and a `SubsystemStartup` error names the one that failed.
    pub fn start_up(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        if let Err(e) = self.start_subsystems() {
            error!("startup failed: {e}");
            self.shut_down_subsystems();
            return Err(match e {
                EngineError::SubsystemStartup(_) => e,
                other => EngineError::SubsystemStartup(other.to_string()),
            });
        }
        self.started = true;
        info!(
            width = self.display.width(),
            height = self.display.height(),
            "game manager started"
        );
        Ok(())
    }

    fn start_subsystems(&mut self) -> Result<()> {
        self.world.start_up()?;

        self.display
            .start_up()
            .map_err(|e| EngineError::SubsystemStartup(format!("display: {e}")))?;
        self.display_started = true;
        let view = *self.world.view();
        let (width, height) = (self.display.width() as f32, self.display.height() as f32);
        if (view.horizontal, view.vertical) != (width, height) {
            warn!(width, height, "resizing view to the display");
            self.world
                .set_view(BoundingBox::new(view.corner, width, height));
        }

        // input and resources both need a started display
        self.input
            .start_up()
            .map_err(|e| EngineError::SubsystemStartup(format!("{}: {e}", self.input.name())))?;
        self.resources.start_up().map_err(|e| {
            EngineError::SubsystemStartup(format!("{}: {e}", self.resources.name()))
        })?;
        Ok(())
    }

    fn shut_down_subsystems(&mut self) {
        self.resources.shut_down();
        self.input.shut_down();
        if self.display_started {
            if let Err(e) = self.display.shut_down() {
                warn!("display shutdown: {e}");
            }
            self.display_started = false;
        }
        self.world.shut_down();
    }

    /// Stop every subsystem in reverse startup order
    pub fn shut_down(&mut self) {
        if !self.started {
            return;
        }
        self.shut_down_subsystems();
        self.started = false;
        self.diagnostics.print();
        info!(steps = self.step_count, "game manager shut down");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run one frame without pacing
    pub fn step_frame(&mut self) -> Result<()> {
        if !self.started {
            return Err(EngineError::NotStarted("GameManager"));
        }
        let _span = debug_span!("frame", step = self.step_count).entered();

        self.input.get_input(&mut self.world);
        self.world.dispatch(&Event::Step {
            count: self.step_count,
        });
        self.step_count += 1;
        self.world.update();

        self.display.clear();
        self.world.draw(self.display.as_mut());
        self.display.render()
    }

    /// Run paced frames until the game-over flag is set
    pub fn run(&mut self) -> Result<u64> {
        self.run_loop(None)
    }

    /// Run at most `frames` paced frames; stops early on game over
    pub fn run_frames(&mut self, frames: u64) -> Result<u64> {
        self.run_loop(Some(frames))
    }

    fn run_loop(&mut self, limit: Option<u64>) -> Result<u64> {
        let game_over = self.world.game_over().clone();
        game_over.set(false);
        let mut frames = 0;
        while !game_over.is_set() && limit.map_or(true, |limit| frames < limit) {
            self.clock.delta();
            self.step_frame()?;
            frames += 1;

            let work = self.clock.split();
            let slept = self.pacer.sleep(work);
            self.diagnostics.record_frame_time(work + slept);
        }
        Ok(frames)
    }

    pub fn world(&self) -> &WorldManager {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldManager {
        &mut self.world
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn display(&self) -> &dyn RenderBackend {
        self.display.as_ref()
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Steps dispatched so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Handle that ends `run` at the next frame boundary
    pub fn game_over(&self) -> GameOver {
        self.world.game_over().clone()
    }

    pub fn set_game_over(&self) {
        self.world.set_game_over();
    }
}

impl Drop for GameManager {
    fn drop(&mut self) {
        self.shut_down();
    }
}
