//! Demonstration of the Synheart Motion conditioning pipeline.
//!
//! This example shows how to:
//! 1. Build a recording in memory
//! 2. Run the pipeline while a viewer thread drains stage snapshots
//! 3. Segment the conditioned signal at detected peaks
//! 4. Export labeled windows around known timestamps
//!
//! Run with: cargo run --example condition_demo

use std::thread;

use synheart_motion::{
    core::{FilterConfig, FilterType, LabelExporter, Pipeline, Segmenter},
    recording::SampleStream,
    sink::{ChannelSink, SinkMessage, StageSignals},
};

const SAMPLING_RATE: f64 = 50.0;
const START_MS: i64 = 1_700_000_000_000;

/// Ten seconds of slow sway with a sharp tap every two seconds.
fn synthetic_recording() -> SampleStream {
    let n = 500;
    let mut timestamp = Vec::with_capacity(n);
    let (mut x, mut y, mut z) = (Vec::new(), Vec::new(), Vec::new());

    for i in 0..n {
        let t = i as f64 / SAMPLING_RATE;
        let tap = if i % 100 == 50 { 3.0 } else { 0.0 };
        timestamp.push(START_MS + (i as i64) * 20);
        x.push(0.4 * (t * 1.3).sin() + tap);
        y.push(0.2 * (t * 0.7).cos() + tap * 0.5);
        z.push(9.81 + 0.05 * ((i % 7) as f64 - 3.0));
    }

    SampleStream::from_vecs("demo", timestamp, x, y, z).expect("axes have equal length")
}

fn main() {
    println!("Synheart Motion - Conditioning Demo");
    println!("===================================");
    println!();

    let stream = synthetic_recording();
    println!("Recording '{}': {} samples", stream.name(), stream.len());
    println!();

    let config = FilterConfig {
        sampling_rate: Some(SAMPLING_RATE),
        filter_type: Some(FilterType::LowPass),
        median_window: Some(5),
        ..FilterConfig::default()
    };
    let pipeline = Pipeline::new(config).with_merge(true);

    // Viewer thread standing in for a plotting front end
    let (mut sink, receiver) = ChannelSink::new(8);
    let viewer = thread::spawn(move || {
        for message in receiver {
            match message {
                SinkMessage::Stage(snapshot) => {
                    let (channels, peak) = match &snapshot.signals {
                        StageSignals::PerAxis { x, y, z } => (
                            3,
                            x.iter().chain(y).chain(z).fold(0.0_f64, |m, v| m.max(v.abs())),
                        ),
                        StageSignals::Merged(signal) => {
                            (1, signal.iter().fold(0.0_f64, |m, v| m.max(v.abs())))
                        }
                    };
                    println!(
                        "  [{:<24}] {} channel(s), |peak| {:.3}",
                        snapshot.title, channels, peak
                    );
                }
                SinkMessage::Finished => println!("  Pipeline finished"),
            }
        }
    });

    println!("Stages:");
    let conditioned = match pipeline.process_with_sink(stream, &mut sink) {
        Ok(conditioned) => conditioned,
        Err(e) => {
            eprintln!("Error conditioning recording: {e}");
            return;
        }
    };
    drop(sink);
    if viewer.join().is_err() {
        eprintln!("Viewer thread panicked");
    }
    println!();

    let segmentation = match Segmenter::default().segment(&conditioned, false) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error segmenting: {e}");
            return;
        }
    };
    println!("Peaks at: {:?}", segmentation.peaks);
    for segment in &segmentation.segments {
        println!(
            "  Segment {:>3}..{:<3} ({} ms)",
            segment.start,
            segment.end,
            segment.duration_ms()
        );
    }
    println!();

    // Label the first two taps
    let labels = ["tap", "tap"];
    let label_timestamps = [START_MS + 50 * 20, START_MS + 150 * 20];
    let exporter = LabelExporter::new(std::env::temp_dir().join("synheart-motion-demo"));

    match exporter.export(&conditioned, "demo", &label_timestamps, &labels) {
        Ok(path) => println!("Exported {} labeled windows to {path:?}", labels.len()),
        Err(e) => eprintln!("Error exporting labels: {e}"),
    }
}
