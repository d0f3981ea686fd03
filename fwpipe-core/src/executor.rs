/*!
 * Pipeline execution
 *
 * Stages run strictly in order against one document. The first failing
 * stage ends execution; whatever earlier stages changed stays changed.
 * Callers that need all-or-nothing semantics clone the document first.
 */

use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span};

use crate::document::Document;
use crate::error::{ExecutionError, ExecutionResult};
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub name: String,
    pub elapsed: Duration,
}

/// Per-stage timings of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub stages: Vec<StageTiming>,
}

impl ExecutionReport {
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|s| s.elapsed).sum()
    }
}

pub fn execute_cli<D: Document + ?Sized>(
    document: &mut D,
    pipeline: &mut Pipeline,
) -> ExecutionResult<ExecutionReport> {
    let mut report = ExecutionReport::default();
    let total = pipeline.len();

    for (index, stage) in pipeline.stages_mut().iter_mut().enumerate() {
        let position = index + 1;
        let span = info_span!("stage", position, visitor = stage.name());
        let _guard = span.enter();

        debug!("applying stage {}/{}: {}", position, total, stage.name());
        let start = Instant::now();
        if let Err(source) = document.apply(stage.visitor_mut()) {
            error!("stage {} ('{}') failed: {}", position, stage.name(), source);
            return Err(ExecutionError::StageFailed {
                stage: position,
                name: stage.name().to_string(),
                source,
            });
        }

        let elapsed = start.elapsed();
        info!("stage {} ('{}') done in {}ms", position, stage.name(), elapsed.as_millis());
        report.stages.push(StageTiming {
            name: stage.name().to_string(),
            elapsed,
        });
    }

    Ok(report)
}
