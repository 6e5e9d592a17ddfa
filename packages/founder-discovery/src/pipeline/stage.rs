//! Per-invocation pipeline state.
//!
//! Every `discover`/`enrich` call walks `Idle → Building → Querying →
//! Extracting → Done`, or drops to `Failed` from wherever it was. A run is
//! owned by exactly one invocation and never shared.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DiscoveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Idle,
    Building,
    Querying,
    Extracting,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Building => "building",
            PipelineStage::Querying => "querying",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// The stage that follows this one on success.
    fn successor(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::Building),
            PipelineStage::Building => Some(PipelineStage::Querying),
            PipelineStage::Querying => Some(PipelineStage::Extracting),
            PipelineStage::Extracting => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pipeline a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Discover,
    Enrich,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Discover => "discover",
            Operation::Enrich => "enrich",
        }
    }
}

/// Stage tracker for one invocation.
///
/// Stages only move forward one step at a time; [`PipelineRun::fail`]
/// records where the run was when it failed.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    operation: Operation,
    stage: PipelineStage,
    failed_at: Option<PipelineStage>,
    started: Instant,
    stage_started: Instant,
    timings: Vec<(PipelineStage, Duration)>,
}

impl PipelineRun {
    pub fn new(operation: Operation) -> Self {
        let now = Instant::now();
        Self {
            operation,
            stage: PipelineStage::Idle,
            failed_at: None,
            started: now,
            stage_started: now,
            timings: Vec::new(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Stage the run was in when it failed.
    pub fn failed_at(&self) -> Option<PipelineStage> {
        self.failed_at
    }

    /// Time spent in each completed stage, in order.
    pub fn timings(&self) -> &[(PipelineStage, Duration)] {
        &self.timings
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn enter(&mut self, next: PipelineStage) {
        let spent = self.stage_started.elapsed();
        if self.stage != PipelineStage::Idle {
            self.timings.push((self.stage, spent));
        }

        debug!(
            operation = self.operation.as_str(),
            from = %self.stage,
            to = %next,
            elapsed_ms = spent.as_millis() as u64,
            "Pipeline stage transition"
        );

        self.stage = next;
        self.stage_started = Instant::now();
    }

    /// Move to the next stage.
    ///
    /// Advancing a finished run is a bug in the caller and leaves the run
    /// unchanged.
    pub fn advance(&mut self) -> PipelineStage {
        match self.stage.successor() {
            Some(next) => self.enter(next),
            None => {
                debug_assert!(false, "advance called on a {} run", self.stage);
            }
        }
        self.stage
    }

    /// Mark the run failed and hand the error back unchanged.
    pub fn fail(&mut self, error: DiscoveryError) -> DiscoveryError {
        if !self.stage.is_terminal() {
            let at = self.stage;
            self.failed_at = Some(at);
            self.enter(PipelineStage::Failed);

            warn!(
                operation = self.operation.as_str(),
                stage = %at,
                error_kind = ?error.kind(),
                error = %error,
                "Pipeline failed"
            );
        }
        error
    }
}
