use std::time::{Duration, Instant};

/// Logs the time spent in one stage of a detection cycle and returns the
/// cumulative elapsed time, to be passed back in for the next stage.
pub(crate) fn trace(verbose: bool, l_type: &str, l_step: &str, detect: Instant, prev_elapsed: Duration) -> Duration {
    let elapsed = detect.elapsed();
    if verbose {
        log::debug!("{} | Total={:.2?} | {}={:.2?}", l_type, elapsed, l_step, elapsed.saturating_sub(prev_elapsed));
    } else {
        log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, elapsed, l_step, elapsed.saturating_sub(prev_elapsed));
    }
    elapsed
}
