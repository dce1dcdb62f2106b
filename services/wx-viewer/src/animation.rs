//! Time animation driver.
//!
//! Each step locks the state, shows the next time step and releases the lock
//! before sleeping, so other handlers (including `stop_play`) can run between
//! steps. The driver ends when playing stops.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use wx_common::WxResult;

use crate::app::AppState;

/// Time left of `delay` after a step took `elapsed`.
pub fn remaining_delay(delay: Duration, elapsed: Duration) -> Duration {
    delay.saturating_sub(elapsed)
}

/// Run animation steps until playing stops. Returns the number of steps.
pub async fn run_animation(state: Arc<Mutex<AppState>>) -> WxResult<u64> {
    let mut steps = 0u64;
    loop {
        let delay = {
            let mut state = state.lock().await;
            match state.next_time_step().await {
                Ok(delay) => delay,
                Err(e) => {
                    warn!(error = %e, steps, "Animation step failed");
                    state.stop_play().await;
                    return Err(e);
                }
            }
        };

        match delay {
            Some(delay) => {
                steps += 1;
                tokio::time::sleep(delay).await;
            }
            None => break,
        }
    }
    debug!(steps, "Animation finished");
    Ok(steps)
}

pub fn spawn_animation(state: Arc<Mutex<AppState>>) -> JoinHandle<WxResult<u64>> {
    tokio::spawn(run_animation(state))
}
