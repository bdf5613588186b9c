//! Channel-backed sink for viewers running on another thread.

use crate::sink::VisualizationSink;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Signals captured at one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageSignals {
    PerAxis { x: Vec<f64>, y: Vec<f64>, z: Vec<f64> },
    Merged(Vec<f64>),
}

/// Owned copy of a stage notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub title: String,
    pub timestamp: Vec<i64>,
    pub signals: StageSignals,
}

/// Messages delivered to the receiving side.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    Stage(StageSnapshot),
    Finished,
}

/// Forwards every notification over a bounded channel.
///
/// If the receiver has gone away the notification is dropped with a
/// warning; the pipeline never fails because of its sink.
pub struct ChannelSink {
    sender: Sender<SinkMessage>,
}

impl ChannelSink {
    /// Create a sink plus the receiver a viewer should drain.
    ///
    /// Sends block while the channel is full. A pipeline run sends one
    /// message per executed stage plus [`SinkMessage::Finished`] (at most
    /// six), so the receiver must be drained on another thread unless
    /// `capacity` covers all of them. A capacity of zero is a rendezvous
    /// channel and always needs a concurrent receiver.
    pub fn new(capacity: usize) -> (Self, Receiver<SinkMessage>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }

    fn send(&self, message: SinkMessage) {
        if self.sender.send(message).is_err() {
            tracing::warn!("visualization receiver disconnected, dropping snapshot");
        }
    }
}

impl VisualizationSink for ChannelSink {
    fn plot_sensor_data(&mut self, title: &str, timestamp: &[i64], x: &[f64], y: &[f64], z: &[f64]) {
        self.send(SinkMessage::Stage(StageSnapshot {
            title: title.to_string(),
            timestamp: timestamp.to_vec(),
            signals: StageSignals::PerAxis {
                x: x.to_vec(),
                y: y.to_vec(),
                z: z.to_vec(),
            },
        }));
    }

    fn plot_signal(&mut self, title: &str, timestamp: &[i64], signal: &[f64]) {
        self.send(SinkMessage::Stage(StageSnapshot {
            title: title.to_string(),
            timestamp: timestamp.to_vec(),
            signals: StageSignals::Merged(signal.to_vec()),
        }));
    }

    fn finish(&mut self) {
        self.send(SinkMessage::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_arrive_in_order() {
        let (mut sink, receiver) = ChannelSink::new(8);

        sink.plot_sensor_data("s raw", &[1, 2], &[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]);
        sink.plot_signal("s kalman filter", &[1, 2], &[0.0, 1.0]);
        sink.finish();

        match receiver.recv().unwrap() {
            SinkMessage::Stage(s) => {
                assert_eq!(s.title, "s raw");
                assert!(matches!(s.signals, StageSignals::PerAxis { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        match receiver.recv().unwrap() {
            SinkMessage::Stage(s) => assert_eq!(s.signals, StageSignals::Merged(vec![0.0, 1.0])),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(receiver.recv().unwrap(), SinkMessage::Finished);
    }

    #[test]
    fn test_small_capacity_with_draining_viewer() {
        let (mut sink, receiver) = ChannelSink::new(1);
        let viewer = std::thread::spawn(move || receiver.iter().count());

        for i in 0..5 {
            sink.plot_signal(&format!("stage {i}"), &[1, 2], &[0.0, 1.0]);
        }
        sink.finish();
        drop(sink);

        assert_eq!(viewer.join().unwrap(), 6);
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (mut sink, receiver) = ChannelSink::new(1);
        drop(receiver);
        sink.plot_signal("t", &[1], &[1.0]);
        sink.finish();
    }
}
