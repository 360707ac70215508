//! Chains of transformers.
//!
//! Stage `0` faces the pipe's A side and the last stage faces its B side. A
//! stage's `b` output feeds the next stage's `apply_a`, its `a` output feeds
//! the previous stage's `apply_b`. Fragments that leave either end of the
//! chain are composed into the pipe's result. Fragments waiting for the same
//! stage are composed as well, so each stage sees at most one input per side
//! and round.

use delta_engine::{compose, Delta};

use crate::{TransformError, TransformResult, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeConfig {
    /// Sweeps over the chain before the pipe gives up with
    /// [`TransformError::Diverged`].
    pub max_rounds: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self { max_rounds: 64 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

#[derive(Default)]
pub struct Pipe {
    stages: Vec<Box<dyn Transformer>>,
    config: PipeConfig,
}

impl Pipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipeConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Append a stage on the B end.
    pub fn stage(mut self, stage: impl Transformer + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn run(&mut self, side: Side, delta: Delta) -> Result<TransformResult, TransformError> {
        let n = self.stages.len();
        if n == 0 {
            return Ok(match side {
                Side::A => TransformResult::to_b(delta),
                Side::B => TransformResult::to_a(delta),
            });
        }
        let mut from_a: Vec<Option<Delta>> = vec![None; n];
        let mut from_b: Vec<Option<Delta>> = vec![None; n];
        match side {
            Side::A => from_a[0] = Some(delta),
            Side::B => from_b[n - 1] = Some(delta),
        }

        let mut out = TransformResult::none();
        let mut round = 0;
        while from_a.iter().chain(&from_b).any(Option::is_some) {
            if round == self.config.max_rounds {
                tracing::warn!(rounds = round, stages = n, "Pipe diverged");
                return Err(TransformError::Diverged { rounds: round });
            }
            round += 1;
            for i in 0..n {
                if let Some(input) = from_a[i].take() {
                    tracing::trace!(stage = i, round, side = "a", "Stage step");
                    let result = self.stages[i].apply_a(input)?;
                    route(i, n, result, &mut from_a, &mut from_b, &mut out)?;
                }
                if let Some(input) = from_b[i].take() {
                    tracing::trace!(stage = i, round, side = "b", "Stage step");
                    let result = self.stages[i].apply_b(input)?;
                    route(i, n, result, &mut from_a, &mut from_b, &mut out)?;
                }
            }
        }
        Ok(out)
    }
}

impl Transformer for Pipe {
    fn apply_a(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        self.run(Side::A, delta)
    }

    fn apply_b(&mut self, delta: Delta) -> Result<TransformResult, TransformError> {
        self.run(Side::B, delta)
    }
}

fn route(
    i: usize,
    n: usize,
    result: TransformResult,
    from_a: &mut [Option<Delta>],
    from_b: &mut [Option<Delta>],
    out: &mut TransformResult,
) -> Result<(), TransformError> {
    if let Some(b) = result.b {
        let slot = if i + 1 < n {
            &mut from_a[i + 1]
        } else {
            &mut out.b
        };
        accumulate(slot, b)?;
    }
    if let Some(a) = result.a {
        let slot = if i > 0 { &mut from_b[i - 1] } else { &mut out.a };
        accumulate(slot, a)?;
    }
    Ok(())
}

fn accumulate(slot: &mut Option<Delta>, delta: Delta) -> Result<(), TransformError> {
    if delta.is_empty() {
        return Ok(());
    }
    *slot = Some(match slot.take() {
        Some(prev) => compose(&prev, &delta)?,
        None => delta,
    });
    Ok(())
}
