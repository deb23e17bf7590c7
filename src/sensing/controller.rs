use log::{error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{sensing_loop, SamplerContext};

struct ActiveSampler {
    session_id: i64,
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the one activity sampler that may run at a time.
#[derive(Default)]
pub struct SensingController {
    active: Option<ActiveSampler>,
}

impl SensingController {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Session the running sampler is bound to, if any.
    pub fn active_session(&self) -> Option<i64> {
        self.active.as_ref().map(|sampler| sampler.session_id)
    }

    /// Starts a fresh sampler for `ctx.session_id`. A sampler that is still
    /// running is stopped first, whichever session it belongs to.
    pub async fn start_sensing(&mut self, ctx: SamplerContext) {
        if let Some(previous) = self.stop_sensing().await {
            info!("replaced sampler of session {previous}");
        }

        let session_id = ctx.session_id;
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sensing_loop(ctx, cancel_token.clone()));

        self.active = Some(ActiveSampler {
            session_id,
            handle,
            cancel_token,
        });
    }

    /// Cancels the running sampler and waits for it to exit. The wait is
    /// bounded by one in-flight sample. Returns the session it was bound to.
    pub async fn stop_sensing(&mut self) -> Option<i64> {
        let sampler = self.active.take()?;
        sampler.cancel_token.cancel();

        if let Err(err) = sampler.handle.await {
            error!(
                "sampler task for session {} failed to join: {err}",
                sampler.session_id
            );
        }

        Some(sampler.session_id)
    }
}
