/// State of the continuous redraw loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawState {
    Idle,
    Running,
    Cancelled,
}

/// Free-running per-frame redraw driver.
///
/// The event loop asks [`RedrawLoop::wants_frame`] before requesting a redraw.
/// Cancelling takes effect immediately, so a frame already queued by the
/// platform is dropped in [`RedrawLoop::begin_frame`] instead of touching
/// released resources.
#[derive(Debug, Clone, Copy)]
pub struct RedrawLoop {
    state: RedrawState,
    frames: u64,
}

impl RedrawLoop {
    pub fn new() -> Self {
        Self {
            state: RedrawState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> RedrawState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RedrawState::Running
    }

    pub fn start(&mut self) {
        if self.state != RedrawState::Running {
            log::debug!("Redraw loop started");
            self.state = RedrawState::Running;
        }
    }

    /// Returns false when there was nothing to cancel
    pub fn cancel(&mut self) -> bool {
        if self.state == RedrawState::Running {
            log::debug!("Redraw loop cancelled after {} frames", self.frames);
            self.state = RedrawState::Cancelled;
            true
        } else {
            false
        }
    }

    pub fn wants_frame(&self) -> bool {
        self.is_running()
    }

    /// Gate for a redraw callback; false means skip the frame
    pub fn begin_frame(&mut self) -> bool {
        if self.is_running() {
            self.frames += 1;
            true
        } else {
            false
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for RedrawLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let mut redraw = RedrawLoop::new();
        assert_eq!(redraw.state(), RedrawState::Idle);
        assert!(!redraw.wants_frame());
        assert!(!redraw.begin_frame());
    }

    #[test]
    fn cancelled_loop_drops_queued_frames() {
        let mut redraw = RedrawLoop::new();
        redraw.start();
        assert!(redraw.begin_frame());
        assert!(redraw.cancel());
        assert!(!redraw.begin_frame());
        assert_eq!(redraw.frames(), 1);
    }

    #[test]
    fn cancel_twice_is_harmless() {
        let mut redraw = RedrawLoop::new();
        redraw.start();
        assert!(redraw.cancel());
        assert!(!redraw.cancel());
        assert_eq!(redraw.state(), RedrawState::Cancelled);
    }

    #[test]
    fn restart_after_cancel() {
        let mut redraw = RedrawLoop::new();
        redraw.start();
        redraw.cancel();
        redraw.start();
        assert!(redraw.wants_frame());
    }
}
