// Model-driven policy: capture in, key press out.
//
// Per tick: scale the frame to the model's input geometry, normalize
// channels, run one forward pass, arg-max into an action index. Buffers are
// sized at initialize time and reused; nothing allocates on the hot path
// once the first frame has flowed through.

use std::path::Path;

use fast_image_resize::Resizer;
use pilot_prep::cpu::{scale_bgra, Staging};
use pilot_prep::plan::{build_plan, AspectMode, ScalePlan, ScaleTarget, Size};
use pilot_prep::tensor::{normalize_bgra, InputSpec};

use crate::action::Action;
use crate::capture::Frame;
use crate::error::{PilotError, PilotResult};
use crate::policy::infer::{argmax, ActionModel};
use crate::policy::Policy;

/// Perception plus inference: the "with ML" variant's brain.
pub struct ModelPolicy {
    model: ActionModel,
    spec: InputSpec,
    resizer: Resizer,
    staging: Staging,
    plan: Option<ScalePlan>,
    scaled: Vec<u8>,
    tensor: Vec<f32>,
}

impl ModelPolicy {
    /// Load the model and set up reusable preprocessing state.
    pub fn load(model_path: &Path, spec: InputSpec) -> PilotResult<Self> {
        let model = ActionModel::load(model_path, spec)?;
        Ok(Self {
            model,
            spec,
            resizer: Resizer::new(),
            staging: Staging::with_capacity(0),
            plan: None,
            scaled: Vec::new(),
            tensor: Vec::new(),
        })
    }

    /// (Re)build the scale plan and buffers for a source size. The original
    /// stretches to the exact model square, so the plan distorts rather than
    /// preserving aspect.
    fn plan_for(&mut self, input: Size) -> ScalePlan {
        let plan = build_plan(input, ScaleTarget::Exact(self.spec.size), AspectMode::Distort);
        self.scaled
            .resize((plan.out.w * plan.out.h * 4) as usize, 0);
        self.tensor.resize(self.spec.element_count(), 0.0);
        self.plan = Some(plan);
        plan
    }
}

impl Policy for ModelPolicy {
    fn name(&self) -> &'static str {
        "model"
    }

    fn wants_frames(&self) -> bool {
        true
    }

    fn initialize(&mut self, input_size: Size) -> PilotResult<()> {
        let plan = self.plan_for(input_size);
        tracing::info!(
            input_w = plan.input.w,
            input_h = plan.input.h,
            model_w = plan.out.w,
            model_h = plan.out.h,
            "model policy initialized"
        );
        Ok(())
    }

    fn decide(&mut self, frame: Option<&Frame>) -> PilotResult<Option<Action>> {
        let frame = frame.ok_or_else(|| {
            PilotError::state("running", "decide", "model policy received no frame")
        })?;

        // Displays can change resolution mid-run; replan when they do.
        let plan = match self.plan {
            Some(plan) if plan.input == frame.size() => plan,
            _ => self.plan_for(frame.size()),
        };

        scale_bgra(
            &mut self.resizer,
            &frame.data,
            frame.size(),
            Some(frame.stride),
            &plan,
            &mut self.scaled,
            Some(&mut self.staging),
        )?;
        normalize_bgra(&self.scaled, self.spec.size, self.spec.layout, &mut self.tensor)
            .map_err(|e| PilotError::preprocess("normalize", e.to_string()))?;

        let scores = self.model.infer(&self.tensor)?;
        let choice = argmax(&scores);
        tracing::debug!(?choice, classes = scores.len(), "forward pass complete");

        // An index outside the action set presses nothing, same as the
        // original's unmapped-action branch.
        Ok(choice.and_then(Action::from_index))
    }
}
