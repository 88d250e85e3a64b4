//! Frame loop driving scrollbar ticks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Scrollbar;

/// A spawned task calling [`Scrollbar::tick`] once per frame.
///
/// The loop runs until [`FrameLoop::dispose`] is called or the handle is
/// dropped.
#[derive(Debug)]
pub struct FrameLoop {
    handle: Option<JoinHandle<()>>,
}

impl FrameLoop {
    /// Spawns the loop on the current tokio runtime.
    ///
    /// `on_frame` runs after every tick that moved the scroll position.
    /// Returns `None` outside a runtime.
    pub fn spawn(
        scrollbar: Scrollbar,
        interval: Duration,
        on_frame: impl Fn() + Send + 'static,
    ) -> Option<Self> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let handle = runtime.spawn(async move {
            let mut frames = tokio::time::interval(interval.max(Duration::from_millis(1)));
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                frames.tick().await;
                if scrollbar.tick(tokio::time::Instant::now().into_std()) {
                    on_frame();
                }
            }
        });
        log::debug!("frame loop started ({:?} per frame)", interval);
        Some(Self {
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the loop. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("frame loop stopped");
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.dispose();
    }
}
