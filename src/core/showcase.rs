//! Page controller: decides whether the 3D stage exists and drives it per frame.

use std::time::Instant;

use anyhow::Result;

use super::motion::{ReducedMotion, Subscription};
use super::observable::Watch;
use super::redraw::RedrawLoop;
use super::resources::{LiveCounts, ResourceLedger, SharedLedger};
use super::scroll::{ScrollKey, ScrollSample, ScrollTracker};
use super::stage::{LoadState, Stage};
use super::viewport::Viewport;
use crate::config::ShowcaseConfig;
use crate::frame::{FpsCounter, FrameClock, FrameInfo};
use crate::loaders::{AssetLoader, AssetRequest};
use crate::traits::{DeviceFactory, MotionPreference};

pub struct Showcase<F: DeviceFactory> {
    config: ShowcaseConfig,
    factory: F,
    loader: AssetLoader,
    motion: ReducedMotion,
    ledger: SharedLedger,
    scroll: ScrollTracker,
    redraw: RedrawLoop,
    clock: FrameClock,
    fps: FpsCounter,
    stage: Option<Stage<F::Device>>,
    viewport: Viewport,
    mounts: u64,
}

impl<F: DeviceFactory> Showcase<F> {
    pub fn new(
        config: ShowcaseConfig,
        factory: F,
        loader: AssetLoader,
        motion: ReducedMotion,
        viewport: Viewport,
        now: Instant,
    ) -> Self {
        let scroll = ScrollTracker::new(config.scroll, viewport.height as f32);
        Self {
            config,
            factory,
            loader,
            motion,
            ledger: ResourceLedger::shared(),
            scroll,
            redraw: RedrawLoop::new(),
            clock: FrameClock::new(now),
            fps: FpsCounter::default(),
            stage: None,
            viewport,
            mounts: 0,
        }
    }

    /// Mount the stage unless motion is reduced. Returns whether a stage was created.
    pub fn mount(&mut self, now: Instant) -> Result<bool> {
        if self.motion.is_reduced() {
            log::info!("Reduced motion requested, showing static poster");
            return Ok(false);
        }
        if self.stage.is_some() {
            return Ok(false);
        }

        let device = self.factory.create_device()?;
        let mut stage = Stage::mount(device, self.ledger.clone(), &self.config, self.viewport)?;
        let ticket = self.loader.request(
            AssetRequest {
                path: self.config.asset.clone(),
                base: self.config.base_pose,
            },
            now,
        );
        stage.begin_load(ticket);
        log::info!("Loading {} (request #{})", self.config.asset.display(), ticket.generation());

        self.stage = Some(stage);
        self.clock.reset(now);
        self.redraw.start();
        self.mounts += 1;
        Ok(true)
    }

    /// Stop the redraw loop, abandon the pending load, then release the stage
    pub fn unmount(&mut self) -> bool {
        let Some(mut stage) = self.stage.take() else {
            return false;
        };
        self.redraw.cancel();
        if let Some(ticket) = stage.ticket() {
            self.loader.cancel(ticket);
        }
        stage.dispose();
        true
    }

    /// Apply a new preference, mounting or unmounting as needed
    pub fn set_reduced_motion(&mut self, reduced: bool, now: Instant) -> Result<()> {
        if !self.motion.set(reduced) {
            return Ok(());
        }
        if reduced {
            self.unmount();
        } else {
            self.mount(now)?;
        }
        Ok(())
    }

    pub fn toggle_reduced_motion(&mut self, now: Instant) -> Result<()> {
        let next = !self.motion.is_reduced();
        self.set_reduced_motion(next, now)
    }

    /// Re-read the preference sources and apply their answer if it changed
    pub fn refresh_motion(&mut self, sources: &[&dyn MotionPreference], now: Instant) -> Result<bool> {
        match self.motion.poll_sources(sources) {
            Some(reduced) => {
                self.set_reduced_motion(reduced, now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn subscribe_motion(&mut self, listener: impl FnMut(bool) + 'static) -> Subscription {
        self.motion.subscribe(listener)
    }

    pub fn unsubscribe_motion(&mut self, subscription: Subscription) -> bool {
        self.motion.unsubscribe(subscription)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll.resize(viewport.height as f32);
        if let Some(stage) = &mut self.stage {
            stage.resize(viewport);
        }
    }

    pub fn scroll_by(&mut self, pixels: f32) {
        self.scroll.scroll_by(pixels);
    }

    pub fn scroll_lines(&mut self, lines: f32) {
        self.scroll.scroll_lines(lines);
    }

    pub fn apply_key(&mut self, key: ScrollKey) {
        self.scroll.apply_key(key);
    }

    /// Publish this frame's scroll sample and, while mounted, advance the stage.
    /// Returns `None` when no 3D frame was produced.
    pub fn frame(&mut self, now: Instant) -> Result<Option<FrameInfo>> {
        let sample = self.scroll.sample();
        let Some(stage) = &mut self.stage else {
            return Ok(None);
        };
        if !self.redraw.begin_frame() {
            return Ok(None);
        }

        let info = self.clock.tick(now);
        self.fps.record(info.delta);

        if let Some((ticket, resolution)) = self.loader.poll(now) {
            stage.resolve(ticket, resolution)?;
        }
        stage.animate(sample.progress, &info);
        stage.draw()?;
        Ok(Some(info))
    }

    pub fn is_mounted(&self) -> bool {
        self.stage.is_some()
    }

    pub fn stage(&self) -> Option<&Stage<F::Device>> {
        self.stage.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.stage.as_ref().map_or(LoadState::NotStarted, |s| s.load_state())
    }

    pub fn live_resources(&self) -> LiveCounts {
        self.ledger.borrow().counts()
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn redraw(&self) -> &RedrawLoop {
        &self.redraw
    }

    pub fn wants_frame(&self) -> bool {
        self.redraw.wants_frame()
    }

    pub fn motion(&self) -> &ReducedMotion {
        &self.motion
    }

    pub fn scroll_watch(&self) -> Watch<ScrollSample> {
        self.scroll.watch()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mount_count(&self) -> u64 {
        self.mounts
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<F: DeviceFactory> Drop for Showcase<F> {
    fn drop(&mut self) {
        self.unmount();
    }
}
