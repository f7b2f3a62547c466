//! # Pilot Session Management
//!
//! High-level orchestration of the action loop. Provides a declarative,
//! builder-pattern API for wiring a policy, an actuator, and (for the model
//! variant) a frame source into one background task.
//!
//! ## Architecture
//!
//! 1. **Policy / KeyActuator / FrameSource traits**: the pluggable seams
//! 2. **PilotSession**: owns the loop and the shutdown channel
//! 3. **PilotSessionBuilder**: fluent configuration, validated at build time
//!
//! ## Loop discipline
//!
//! Each tick: capture (only when the policy wants frames), decide, press,
//! emit an event, sleep the fixed interval. The sleep races the shutdown
//! channel so Stop takes effect promptly rather than after the nap.
//!
//! Transient capture errors skip the tick; everything else aborts the run
//! and is returned to the caller, which surfaces it in the UI. The loop
//! itself never learns anything: one decision per tick, no feedback.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use crate::action::Action;
use crate::capture::FrameSource;
use crate::error::classify;
use crate::input::KeyActuator;
use crate::policy::Policy;

/// The original gameplay pacing: one action every 200 ms.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Progress events delivered to the UI status log.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started {
        policy: &'static str,
        actuator: &'static str,
        interval_ms: u64,
    },
    /// One completed tick; `action` is `None` when the policy pressed nothing.
    Step { step: u64, action: Option<Action> },
    /// Tick lost to a transient failure.
    Skipped { step: u64, reason: String },
    Finished { report: SessionReport },
    /// The loop aborted; the error is also returned from `run`.
    Failed { error: String },
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Completed ticks.
    pub steps: u64,
    /// Presses per action, in model-output order.
    pub presses: [u64; 4],
    /// Ticks lost to transient failures.
    pub skipped: u64,
}

impl SessionReport {
    pub fn total_presses(&self) -> u64 {
        self.presses.iter().sum()
    }
}

/// High-level pilot session that orchestrates everything.
pub struct PilotSession {
    policy: Box<dyn Policy>,
    actuator: Box<dyn KeyActuator>,
    frame_source: Option<Box<dyn FrameSource>>,
    interval: Duration,
    step_limit: Option<u64>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl PilotSession {
    /// Create a new pilot session using the builder pattern.
    pub fn builder() -> PilotSessionBuilder {
        PilotSessionBuilder::new()
    }

    /// Sender half of the shutdown channel. Sending `true` stops the loop
    /// at the next tick boundary; this is what Stop buttons and Ctrl-C
    /// handlers hold on to.
    pub fn shutdown_sender(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Sleep the tick interval, racing the shutdown channel.
    /// Returns true when shutdown was requested during the nap.
    async fn pause(&mut self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => false,
            changed = self.shutdown_rx.changed() => match changed {
                Ok(()) => *self.shutdown_rx.borrow(),
                // All senders gone counts as a stop request.
                Err(_) => true,
            },
        }
    }

    /// Run the session to completion.
    ///
    /// Returns the report when the step limit is reached or shutdown is
    /// requested; returns the error when the loop aborts.
    pub async fn run(mut self) -> Result<SessionReport> {
        if let Some(source) = self.frame_source.as_mut() {
            source.initialize().await?;
            let input_size = source.input_size();
            self.policy.initialize(input_size)?;
            tracing::info!(w = input_size.w, h = input_size.h, "frame source ready");
        }

        tracing::info!(
            policy = self.policy.name(),
            actuator = self.actuator.name(),
            interval_ms = self.interval.as_millis() as u64,
            "pilot session started"
        );
        self.emit(SessionEvent::Started {
            policy: self.policy.name(),
            actuator: self.actuator.name(),
            interval_ms: self.interval.as_millis() as u64,
        });

        let mut report = SessionReport::default();
        let result = loop {
            if *self.shutdown_rx.borrow() {
                break Ok(());
            }
            if let Some(limit) = self.step_limit {
                if report.steps >= limit {
                    break Ok(());
                }
            }

            // Capture, but only for policies that look at the screen.
            let frame = if self.policy.wants_frames() {
                let source = self
                    .frame_source
                    .as_mut()
                    .expect("validated at build time");
                match source.capture_frame().await {
                    Ok(frame) => Some(frame),
                    Err(e) if classify::is_transient(&e) => {
                        report.skipped += 1;
                        tracing::warn!(error = %e, "transient capture failure, tick skipped");
                        self.emit(SessionEvent::Skipped {
                            step: report.steps,
                            reason: e.to_string(),
                        });
                        if self.pause().await {
                            break Ok(());
                        }
                        continue;
                    }
                    Err(e) => break Err(e),
                }
            } else {
                None
            };

            let action = match self.policy.decide(frame.as_ref()) {
                Ok(action) => action,
                Err(e) => break Err(e),
            };

            if let Some(action) = action {
                if let Err(e) = self.actuator.press(action) {
                    break Err(e);
                }
                report.presses[action.index()] += 1;
            }
            report.steps += 1;

            tracing::info!(step = report.steps, action = ?action, "tick");
            self.emit(SessionEvent::Step {
                step: report.steps,
                action,
            });

            if self.pause().await {
                break Ok(());
            }
        };

        if let Some(source) = self.frame_source.as_mut() {
            source.shutdown().await?;
        }

        match result {
            Ok(()) => {
                tracing::info!(
                    steps = report.steps,
                    presses = report.total_presses(),
                    skipped = report.skipped,
                    "pilot session finished"
                );
                self.emit(SessionEvent::Finished { report });
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "pilot session aborted");
                self.emit(SessionEvent::Failed {
                    error: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}

/// Builder for creating pilot sessions with a fluent API.
pub struct PilotSessionBuilder {
    policy: Option<Box<dyn Policy>>,
    actuator: Option<Box<dyn KeyActuator>>,
    frame_source: Option<Box<dyn FrameSource>>,
    interval: Duration,
    step_limit: Option<u64>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl PilotSessionBuilder {
    pub fn new() -> Self {
        Self {
            policy: None,
            actuator: None,
            frame_source: None,
            interval: DEFAULT_INTERVAL,
            step_limit: None,
            events: None,
        }
    }

    /// Set the decision policy for the session.
    pub fn with_policy<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Set the key actuator for the session.
    pub fn with_actuator<A: KeyActuator + 'static>(mut self, actuator: A) -> Self {
        self.actuator = Some(Box::new(actuator));
        self
    }

    /// Attach a frame source; required when the policy wants frames.
    pub fn with_frame_source<S: FrameSource + 'static>(mut self, source: S) -> Self {
        self.frame_source = Some(Box::new(source));
        self
    }

    /// Override the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop after this many completed ticks (headless runs).
    pub fn with_step_limit(mut self, steps: u64) -> Self {
        self.step_limit = Some(steps);
        self
    }

    /// Deliver progress events to this channel (the GUI status log).
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Build the pilot session with the configured components.
    pub fn build(self) -> Result<PilotSession> {
        let policy = self
            .policy
            .ok_or_else(|| anyhow::anyhow!("No policy specified"))?;
        let actuator = self
            .actuator
            .ok_or_else(|| anyhow::anyhow!("No actuator specified"))?;
        if policy.wants_frames() && self.frame_source.is_none() {
            return Err(anyhow::anyhow!(
                "Policy '{}' needs frames but no frame source was attached",
                policy.name()
            ));
        }
        if self.interval.is_zero() {
            return Err(anyhow::anyhow!("Tick interval must be greater than zero"));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(PilotSession {
            policy,
            actuator,
            frame_source: self.frame_source,
            interval: self.interval,
            step_limit: self.step_limit,
            events: self.events,
            shutdown_tx,
            shutdown_rx,
        })
    }
}

impl Default for PilotSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NullActuator;
    use crate::policy::RandomPolicy;

    #[test]
    fn build_requires_policy_and_actuator() {
        assert!(PilotSession::builder().build().is_err());
        assert!(PilotSession::builder()
            .with_policy(RandomPolicy::with_seed(0))
            .build()
            .is_err());
        assert!(PilotSession::builder()
            .with_policy(RandomPolicy::with_seed(0))
            .with_actuator(NullActuator::new())
            .build()
            .is_ok());
    }

    #[test]
    fn build_rejects_zero_interval() {
        let result = PilotSession::builder()
            .with_policy(RandomPolicy::with_seed(0))
            .with_actuator(NullActuator::new())
            .with_interval(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn report_totals() {
        let report = SessionReport {
            steps: 5,
            presses: [2, 1, 0, 1],
            skipped: 1,
        };
        assert_eq!(report.total_presses(), 4);
    }
}
