//! Stage chains for running processing stages in sequence

use crate::processor::{SignalStage, StageMetrics};
use gsd_core::{GsdError, GsdResult, Signal};
use std::time::Instant;
use tracing::debug;

/// Ordered chain of stages, each consuming the previous stage's output
pub struct StageChain {
    stages: Vec<Box<dyn SignalStage>>,
    name: String,
}

/// Builder for constructing stage chains
pub struct StageChainBuilder {
    stages: Vec<Box<dyn SignalStage>>,
    name: String,
}

/// Chain execution result with per-stage metrics
#[derive(Debug, Clone)]
pub struct ChainResult {
    pub output_signal: Signal,
    pub stage_metrics: Vec<StageMetrics>,
    pub total_latency_us: u64,
}

impl StageChain {
    /// Create new empty chain
    pub fn new(name: &str) -> Self {
        StageChain {
            stages: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Add stage to chain
    pub fn add_stage(&mut self, stage: Box<dyn SignalStage>) {
        self.stages.push(stage);
    }

    /// Run the signal through every stage in order
    pub fn process(&self, input: &Signal) -> GsdResult<ChainResult> {
        let start_time = Instant::now();
        let mut current_signal = input.clone();
        let mut stage_metrics = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            if !stage.can_process(&current_signal) {
                return Err(GsdError::ProcessingError {
                    message: format!(
                        "Stage '{}' in chain '{}' cannot process a signal of {} samples",
                        stage.name(),
                        self.name,
                        current_signal.len()
                    ),
                });
            }

            let timer = StageMetrics::start_timing(stage.as_ref(), &current_signal);
            current_signal = stage.apply(&current_signal)?;
            let metrics = timer.finish(&current_signal);

            debug!(
                chain = %self.name,
                stage = %metrics.stage,
                samples = metrics.output_samples,
                elapsed_us = metrics.processing_time_us,
                "stage complete"
            );
            stage_metrics.push(metrics);
        }

        Ok(ChainResult {
            output_signal: current_signal,
            stage_metrics,
            total_latency_us: start_time.elapsed().as_micros() as u64,
        })
    }

    /// Run the chain and keep only the output signal
    pub fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        Ok(self.process(input)?.output_signal)
    }

    /// Chain name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get list of all stage names
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }
}

impl StageChainBuilder {
    /// Create new chain builder
    pub fn new(name: &str) -> Self {
        StageChainBuilder {
            stages: Vec::new(),
            name: name.to_string(),
        }
    }

    /// Add any stage to the chain
    pub fn add_stage(&mut self, stage: Box<dyn SignalStage>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Build the chain
    pub fn build(self) -> StageChain {
        let mut chain = StageChain::new(&self.name);
        for stage in self.stages {
            chain.add_stage(stage);
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BoundaryMode, FilterConfig, GaussianFilter, SavitzkyGolayFilter};
    use crate::processor::StageType;

    #[test]
    fn test_chain_builder() {
        let mut builder = StageChainBuilder::new("Test Chain");
        builder
            .add_stage(Box::new(SavitzkyGolayFilter::new(5, 2).unwrap()))
            .add_stage(Box::new(GaussianFilter::new(2.0, 4, BoundaryMode::Reflect)));

        let chain = builder.build();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.name(), "Test Chain");
        assert_eq!(chain.stage_names()[0], "savgol(5, 2)");
    }

    #[test]
    fn test_chain_processing() {
        let mut builder = StageChainBuilder::new("smoothing");
        builder.add_stage(FilterConfig::savgol(11, 5).build(40.0).unwrap());
        builder.add_stage(Box::new(GaussianFilter::new(2.0, 4, BoundaryMode::Nearest)));
        let chain = builder.build();

        let input = Signal::new((0..200).map(|i| (i as f64 * 0.1).sin()).collect(), 40.0).unwrap();
        let result = chain.process(&input).unwrap();

        assert_eq!(result.output_signal.len(), input.len());
        assert_eq!(result.stage_metrics.len(), 2);
        assert!(result.stage_metrics.iter().all(|m| m.stage_type == StageType::Filter));
        assert_eq!(result.output_signal.sampling_rate(), 40.0);
    }

    #[test]
    fn test_empty_signal_rejected() {
        let mut builder = StageChainBuilder::new("smoothing");
        builder.add_stage(Box::new(GaussianFilter::new(2.0, 4, BoundaryMode::Reflect)));
        let chain = builder.build();

        let empty = Signal::new(Vec::new(), 40.0).unwrap();
        assert!(chain.process(&empty).is_err());
    }
}
