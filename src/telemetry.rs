//! Here we dump the prometheus metrics collected during the run
use anyhow::{Context, Result};
use prometheus::{Encoder, TextEncoder};

/// text encode all registered meters
pub fn encode_metrics() -> Result<String> {
	let mut buffer = vec![];
	let encoder = TextEncoder::new();
	let metric_families = prometheus::gather();

	encoder.encode(&metric_families, &mut buffer).context("failed to encode metrics")?;

	String::from_utf8(buffer).context("metrics aren't valid utf-8")
}

/// log the metrics at debug level, there's no endpoint to scrape them from a
/// short lived process
pub fn log_metrics() {
	match encode_metrics() {
		Ok(metrics) => tracing::debug!("metrics:\n{metrics}"),
		Err(err) => tracing::warn!("{err:#}"),
	}
}

#[cfg(test)]
mod tests {
	use prometheus::{opts, register_int_counter};

	use super::*;

	#[test]
	fn encodes_registered_meters() {
		let counter =
			register_int_counter!(opts!("telemetry_test_total", "counter for the encoder test"))
				.unwrap();
		counter.inc();

		let metrics = encode_metrics().unwrap();

		assert!(metrics.contains("# TYPE telemetry_test_total counter"));
		assert!(metrics.contains("telemetry_test_total 1"));
	}
}
