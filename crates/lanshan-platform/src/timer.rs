use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use lanshan_core::ports::TimerPort;

/// `setTimeout`-backed sleeps.
#[derive(Default)]
pub struct GlooTimer;

impl GlooTimer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl TimerPort for GlooTimer {
    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}
