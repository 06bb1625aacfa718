//! Picks the adapter best suited to an unlabelled input.

use prizm_domain::ImportSource;
use serde::Serialize;

use crate::adapter::{Detection, FormatAdapter};
use crate::input::ImportInput;

/// Scores at or above this end detection early.
pub const SHORT_CIRCUIT_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionResult {
    pub source: ImportSource,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionCandidate {
    pub source: ImportSource,
    #[serde(flatten)]
    pub detection: Detection,
}

/// Runs every registered adapter's `detect` in registration order.
pub struct FormatDetector<'a> {
    adapters: &'a [Box<dyn FormatAdapter>],
    min_confidence: f64,
}

impl<'a> FormatDetector<'a> {
    pub fn new(adapters: &'a [Box<dyn FormatAdapter>], min_confidence: f64) -> Self {
        Self {
            adapters,
            min_confidence,
        }
    }

    /// The most confident adapter, or `None` when nothing clears the threshold.
    ///
    /// Ties keep the adapter registered first.
    pub fn detect(&self, input: &ImportInput<'_>) -> Option<DetectionResult> {
        let mut best: Option<DetectionResult> = None;

        for adapter in self.adapters {
            let detection = adapter.detect(input);
            tracing::debug!(
                source = adapter.source().as_str(),
                can_handle = detection.can_handle,
                confidence = detection.confidence,
                "Format detection score"
            );
            if !detection.can_handle || detection.confidence < self.min_confidence {
                continue;
            }

            let better = best
                .map(|current| detection.confidence > current.confidence)
                .unwrap_or(true);
            if better {
                best = Some(DetectionResult {
                    source: adapter.source(),
                    confidence: detection.confidence,
                });
            }
            if detection.confidence >= SHORT_CIRCUIT_CONFIDENCE {
                break;
            }
        }

        match best {
            Some(found) => tracing::debug!(
                source = found.source.as_str(),
                confidence = found.confidence,
                "Detected import format"
            ),
            None => tracing::debug!("No adapter recognized the input"),
        }
        best
    }

    /// Every adapter's verdict, in registration order, without short-circuiting.
    pub fn detect_all(&self, input: &ImportInput<'_>) -> Vec<DetectionCandidate> {
        self.adapters
            .iter()
            .map(|adapter| DetectionCandidate {
                source: adapter.source(),
                detection: adapter.detect(input),
            })
            .collect()
    }
}
