use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    db::{ActivitySample, Database},
    utils::Clock,
};

use super::probe::{WindowInfo, WindowProbe};

// Set to false to silence the per-tick logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything one sampler instance needs. Bound to a single session.
#[derive(Clone)]
pub struct SamplerContext {
    pub session_id: i64,
    pub db: Database,
    pub probe: Arc<dyn WindowProbe>,
    pub clock: Arc<dyn Clock>,
    pub interval: Duration,
}

/// Samples the focused window once per interval until `cancel_token` fires.
/// The first sample is taken immediately. A failing iteration is logged and
/// the loop carries on with the next tick.
pub async fn sensing_loop(ctx: SamplerContext, cancel_token: CancellationToken) {
    let mut ticker = tokio::time::interval(ctx.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!("activity sampler started for session {}", ctx.session_id);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                if let Err(err) = perform_sample(&ctx).await {
                    log_error!("activity sample failed for session {}: {err:?}", ctx.session_id);
                }
            }
        }
    }

    log_info!("activity sampler stopped for session {}", ctx.session_id);
}

/// One sampling attempt. Returns the stored row, or `None` when the probe
/// reported a window without an application name.
pub async fn perform_sample(ctx: &SamplerContext) -> Result<Option<ActivitySample>> {
    let probe = Arc::clone(&ctx.probe);
    let probed = tokio::task::spawn_blocking(move || probe.query())
        .await
        .context("window probe worker join failed")?;

    let info = match probed {
        Ok(info) => info,
        Err(err) => {
            log_warn!("window probe failed ({err}); recording desktop sample");
            WindowInfo::desktop()
        }
    };

    if info.app_name.trim().is_empty() {
        log_debug!("probe returned no application name; skipping sample");
        return Ok(None);
    }

    let mut sample = ActivitySample {
        id: None,
        session_id: ctx.session_id,
        timestamp: ctx.clock.now(),
        app_name: info.app_name,
        window_title: info.window_title,
    };

    let id = ctx
        .db
        .insert_activity_sample(&sample)
        .await
        .context("failed to persist activity sample")?;
    sample.id = Some(id);

    log_debug!(
        "session {} sampled {} - {}",
        sample.session_id,
        sample.app_name,
        sample.window_title
    );

    Ok(Some(sample))
}
