//! # Inference Adapter
//!
//! Thin wrapper over an ONNX Runtime session: load a pre-trained action
//! model, run one forward pass per frame, arg-max the scores. No learning
//! step anywhere; the model is frozen.
//!
//! Input and output tensor names are resolved from the model's own metadata
//! instead of being hard-coded, since exporters disagree about what to call
//! them.

use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use pilot_prep::tensor::InputSpec;

use crate::error::{PilotError, PilotResult};

/// A loaded action model plus the metadata needed to feed it.
pub struct ActionModel {
    session: Session,
    input_name: String,
    output_name: String,
    spec: InputSpec,
}

impl ActionModel {
    /// Load an ONNX model from disk and resolve its tensor names.
    pub fn load(path: &Path, spec: InputSpec) -> PilotResult<Self> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                PilotError::inference("load", e.to_string())
                    .with_context(format!("loading model from {}", path.display()))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PilotError::inference("load", "model declares no inputs"))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PilotError::inference("load", "model declares no outputs"))?;

        tracing::info!(
            model = %path.display(),
            input = %input_name,
            output = %output_name,
            "action model loaded"
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            spec,
        })
    }

    /// The input geometry this model was loaded with.
    pub fn spec(&self) -> InputSpec {
        self.spec
    }

    /// One forward pass. `input` must hold exactly the spec's element count
    /// of normalized floats; the returned vector is the raw score vector.
    pub fn infer(&mut self, input: &[f32]) -> PilotResult<Vec<f32>> {
        let expected = self.spec.element_count();
        if input.len() != expected {
            return Err(PilotError::inference(
                "forward",
                format!(
                    "input tensor holds {} elements, model expects {}",
                    input.len(),
                    expected
                ),
            ));
        }

        let dims = self.spec.shape().map(|d| d as usize);
        let tensor = Tensor::from_array((dims, input.to_vec()))
            .map_err(|e| PilotError::inference("tensor", e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| PilotError::inference("forward", e.to_string()))?;

        let (_shape, scores) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| PilotError::inference("extract", e.to_string()))?;

        Ok(scores.to_vec())
    }
}

/// Index of the first maximal score, the original arg-max: strict `>`
/// comparison, so ties keep the earliest index. `None` for an empty vector.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in scores.iter().enumerate() {
        match best {
            None => best = Some((i, v)),
            Some((_, bv)) if v > bv => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_the_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.05, 0.15]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
    }

    #[test]
    fn argmax_ties_keep_the_first() {
        assert_eq!(argmax(&[0.5, 0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.5, 0.5]), Some(1));
    }

    #[test]
    fn argmax_of_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_handles_wide_vectors() {
        // Models with more logits than actions still arg-max over the lot;
        // the caller decides what an out-of-range index means.
        let mut scores = vec![0.0; 10];
        scores[7] = 3.5;
        assert_eq!(argmax(&scores), Some(7));
    }
}
