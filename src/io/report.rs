//! Result reporting
//!
//! The aggregate speed is rounded only at this boundary; everything upstream
//! works at full precision.

use crate::types::{SpeedEstimate, TrackResult};
use std::path::Path;

/// Default number of decimal places for reported speeds
pub const DEFAULT_REPORT_DECIMALS: usize = 4;

/// Render the aggregate speed with a fixed number of decimal places
pub fn format_estimate(estimate: &SpeedEstimate, decimals: usize) -> String {
    format!("{:.*}", decimals, estimate.mean_kmps)
}

/// Write the rounded aggregate speed to a file
pub fn write_estimate<P: AsRef<Path>>(
    path: P,
    estimate: &SpeedEstimate,
    decimals: usize,
) -> TrackResult<()> {
    let rendered = format_estimate(estimate, decimals);
    log::info!(
        "Writing estimate {} km/s ({} accepted / {} rejected pairs) to {}",
        rendered,
        estimate.accepted_pairs(),
        estimate.rejected_pairs,
        path.as_ref().display()
    );
    std::fs::write(path.as_ref(), rendered)?;
    Ok(())
}
