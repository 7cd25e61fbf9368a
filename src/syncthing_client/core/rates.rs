use std::time::Duration;

use tracing::debug;

use crate::syncthing_client::models::{ConnectionSample, ConnectionsSnapshot};

/// Gap between the two connection samples used to derive throughput.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Throughput between two cumulative counter readings. Anything that would
/// make the number meaningless (missing counter, reset, zero interval) is 0.
pub fn bytes_per_second(before: Option<u64>, after: Option<u64>, interval: Duration) -> f64 {
    let (Some(before), Some(after)) = (before, after) else {
        return 0.0;
    };
    if after < before {
        debug!(before, after, "Byte counter went backwards, reporting no throughput");
        return 0.0;
    }
    let seconds = interval.as_secs_f64();
    if seconds <= 0.0 {
        return 0.0;
    }
    (after - before) as f64 / seconds
}

fn with_rates(
    before: Option<&ConnectionSample>,
    after: &ConnectionSample,
    interval: Duration,
) -> ConnectionSample {
    let mut sample = after.clone();
    sample.in_bps = Some(bytes_per_second(
        before.and_then(|b| b.in_bytes_total),
        after.in_bytes_total,
        interval,
    ));
    sample.out_bps = Some(bytes_per_second(
        before.and_then(|b| b.out_bytes_total),
        after.out_bytes_total,
        interval,
    ));
    sample
}

/// Derive `in_bps`/`out_bps` for every connection in `after` and for the total.
/// Devices missing from `before` get a rate of 0.
pub fn apply_rates(
    before: &ConnectionsSnapshot,
    after: &ConnectionsSnapshot,
    interval: Duration,
) -> ConnectionsSnapshot {
    ConnectionsSnapshot {
        total: with_rates(Some(&before.total), &after.total, interval),
        connections: after
            .connections
            .iter()
            .map(|(id, sample)| (id.clone(), with_rates(before.get(id), sample, interval)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(in_total: u64, out_total: u64) -> ConnectionSample {
        ConnectionSample {
            connected: true,
            in_bytes_total: Some(in_total),
            out_bytes_total: Some(out_total),
            ..Default::default()
        }
    }

    #[test]
    fn rate_is_delta_over_interval() {
        assert_eq!(bytes_per_second(Some(1000), Some(3000), SAMPLE_INTERVAL), 2000.0);
        assert_eq!(
            bytes_per_second(Some(0), Some(500), Duration::from_millis(500)),
            1000.0
        );
        assert_eq!(bytes_per_second(Some(7), Some(7), SAMPLE_INTERVAL), 0.0);
    }

    #[test]
    fn counter_reset_and_missing_values_are_zero() {
        assert_eq!(bytes_per_second(Some(5000), Some(10), SAMPLE_INTERVAL), 0.0);
        assert_eq!(bytes_per_second(None, Some(10), SAMPLE_INTERVAL), 0.0);
        assert_eq!(bytes_per_second(Some(10), None, SAMPLE_INTERVAL), 0.0);
        assert_eq!(bytes_per_second(Some(1), Some(10), Duration::ZERO), 0.0);
    }

    #[test]
    fn applies_to_total_and_each_device() {
        let mut before = ConnectionsSnapshot {
            total: counters(1000, 100),
            ..Default::default()
        };
        before.connections.insert("A".into(), counters(1000, 100));

        let mut after = ConnectionsSnapshot {
            total: counters(3000, 50),
            ..Default::default()
        };
        after.connections.insert("A".into(), counters(3000, 50));
        after.connections.insert("B".into(), counters(9000, 9000));

        let sampled = apply_rates(&before, &after, SAMPLE_INTERVAL);
        assert_eq!(sampled.total.in_bps, Some(2000.0));
        assert_eq!(sampled.total.out_bps, Some(0.0));
        assert_eq!(sampled.get("A").and_then(|c| c.in_bps), Some(2000.0));
        assert_eq!(sampled.get("B").and_then(|c| c.in_bps), Some(0.0));
    }
}
