//! Gait sequence detection on a simulated recording
//!
//! Simulates two short walks inside a long rest period, runs the detector
//! and prints the resulting gait sequence table.

use gsd_processing::{DetectorConfig, GaitSequenceDetector};
use gsd_simulation::{AccelerometerSimulator, ActivitySchedule, SimulationConfig};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("=== Gait Sequence Detection Example ===\n");

    let schedule = ActivitySchedule::two_short_walks();
    let sim_config = SimulationConfig {
        sampling_rate: 100.0,
        noise_std: 0.005,
        seed: Some(42),
        ..SimulationConfig::default()
    };
    let mut simulator = AccelerometerSimulator::new(sim_config)?;
    let recording = simulator.generate(&schedule)?;

    println!(
        "Simulated {} samples ({:.0} s) at {} Hz",
        recording.row_count(),
        schedule.total_duration(),
        simulator.config().sampling_rate
    );
    for (start, end) in schedule.walking_intervals() {
        println!("   walking from {:.1} s to {:.1} s", start, end);
    }

    let detector = GaitSequenceDetector::new(DetectorConfig::lower_back())?;
    let report = detector.analyze(&recording, simulator.config().sampling_rate)?;

    println!("\nConditioning stages:");
    for metrics in &report.stage_metrics {
        println!(
            "   {:<28} {:>6} -> {:>6} samples in {} us",
            metrics.stage, metrics.input_samples, metrics.output_samples, metrics.processing_time_us
        );
    }

    let threshold = report.threshold_source();
    println!(
        "\nThreshold: {:.3} ({})",
        threshold.value(),
        if threshold.is_adaptive() { "adaptive" } else { "default" }
    );
    println!("Mid-swing peaks counted: {}", report.mid_swing_peaks().len());

    println!("\nDetected gait sequences:");
    for sequence in report.sequences.iter() {
        println!(
            "   #{} {:.2} s - {:.2} s ({:.2} s)",
            sequence.gs_id,
            sequence.start,
            sequence.end,
            sequence.duration()
        );
    }

    println!("\n{}", report.sequences.to_table_json()?);
    Ok(())
}
