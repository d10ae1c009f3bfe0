//! Pipeline definition and execution

use crate::{Result, WorkflowError};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strategy_core::{PipelineContext, Stage};
use tracing::{error, info};

/// Progress notification emitted while a pipeline runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    /// A stage is about to run
    Started {
        /// Zero-based position of the stage
        index: usize,
        /// Total number of stages
        total: usize,
        /// Stage name
        name: String,
    },
    /// A stage returned successfully
    Finished {
        /// Zero-based position of the stage
        index: usize,
        /// Stage name
        name: String,
        /// Time spent in the stage
        duration: Duration,
    },
}

/// Timing of one completed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Stage name
    pub stage_name: String,
    /// Duration of execution
    pub duration: Duration,
}

/// Outcome of a successful pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Pipeline name
    pub pipeline_name: String,
    /// The final context, with every stage's field filled in
    pub context: PipelineContext,
    /// Per-stage timings, in execution order
    pub stages: Vec<StageReport>,
    /// Total duration
    pub total_duration: Duration,
}

impl PipelineRun {
    /// Path of the report produced by the last stage, if it set one
    pub fn output_path(&self) -> Option<&str> {
        self.context.final_output().ok()
    }

    /// Consume the run and return the final context
    pub fn into_context(self) -> PipelineContext {
        self.context
    }
}

/// An ordered list of stages run against one context
///
/// Stages run strictly one after another. The context returned by stage
/// N is the input of stage N+1; the first error stops the run and no later
/// stage executes. Side effects of completed stages are left in place.
///
/// # Example
///
/// ```no_run
/// use strategy_workflow::Pipeline;
/// use std::sync::Arc;
///
/// # async fn example(
/// #     researcher: Arc<dyn strategy_core::Stage>,
/// #     presenter: Arc<dyn strategy_core::Stage>,
/// # ) -> strategy_workflow::Result<()> {
/// let pipeline = Pipeline::builder("market-strategy")
///     .add_stage(researcher)
///     .add_stage(presenter)
///     .build()?;
///
/// let run = pipeline.run("Renewable energy India").await?;
/// println!("report: {:?}", run.output_path());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// Get the pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Names of the stages in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run the pipeline for a topic
    pub async fn run(&self, topic: impl Into<String>) -> Result<PipelineRun> {
        self.run_observed(topic, |_| {}).await
    }

    /// Run the pipeline for a topic, reporting progress to `observer`
    pub async fn run_observed<F>(&self, topic: impl Into<String>, observer: F) -> Result<PipelineRun>
    where
        F: FnMut(StageEvent) + Send,
    {
        let context = PipelineContext::new(topic)?;
        self.run_context(context, observer).await
    }

    /// Run the pipeline starting from an existing context
    pub async fn run_context<F>(&self, context: PipelineContext, mut observer: F) -> Result<PipelineRun>
    where
        F: FnMut(StageEvent) + Send,
    {
        let started = Instant::now();
        let total = self.stages.len();
        let mut context = context;
        let mut reports = Vec::with_capacity(total);

        info!(pipeline = %self.name, topic = %context.topic(), stages = total, "Starting pipeline");

        for (index, stage) in self.stages.iter().enumerate() {
            let name = stage.name().to_string();
            observer(StageEvent::Started {
                index,
                total,
                name: name.clone(),
            });
            info!("Running stage {}/{}: {}", index + 1, total, name);

            let stage_started = Instant::now();
            context = match stage.run(context).await {
                Ok(next) => next,
                Err(source) => {
                    error!(stage = %name, error = %source, "Stage failed, aborting pipeline");
                    return Err(WorkflowError::StageFailed {
                        stage: name,
                        source,
                    });
                }
            };
            let duration = stage_started.elapsed();

            info!(
                stage = %name,
                elapsed_ms = duration.as_millis() as u64,
                "Stage completed"
            );
            observer(StageEvent::Finished {
                index,
                name: name.clone(),
                duration,
            });
            reports.push(StageReport {
                stage_name: name,
                duration,
            });
        }

        let total_duration = started.elapsed();
        info!(
            pipeline = %self.name,
            elapsed_ms = total_duration.as_millis() as u64,
            "Pipeline finished"
        );

        Ok(PipelineRun {
            pipeline_name: self.name.clone(),
            context,
            stages: reports,
            total_duration,
        })
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage; stages run in the order they are added
    pub fn add_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(WorkflowError::NoStages(self.name));
        }

        Ok(Pipeline {
            name: self.name,
            stages: self.stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use strategy_core::{ContextError, ContextField};

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Writes one context field and records that it ran
    struct RecordingStage {
        name: &'static str,
        field: ContextField,
        journal: Journal,
    }

    #[async_trait]
    impl Stage for RecordingStage {
        async fn run(&self, context: PipelineContext) -> strategy_core::Result<PipelineContext> {
            self.journal.lock().unwrap().push(self.name.to_string());
            let value = format!("{} output", self.name);
            let next = match self.field {
                ContextField::ResearchData => context.with_research_data(value)?,
                ContextField::DataAnalysis => context.with_data_analysis(value)?,
                ContextField::Strategy => {
                    // Strategist reads what the earlier stages wrote
                    context.research_data()?;
                    context.data_analysis()?;
                    context.with_strategy(value)?
                }
                ContextField::FinalOutput => context.with_final_output("report.pdf")?,
                ContextField::Topic => context,
            };
            Ok(next)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct FailingStage {
        journal: Journal,
    }

    #[async_trait]
    impl Stage for FailingStage {
        async fn run(&self, _context: PipelineContext) -> strategy_core::Result<PipelineContext> {
            self.journal.lock().unwrap().push("failing".to_string());
            Err(strategy_core::Error::ProcessingFailed("credential missing".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn stage(name: &'static str, field: ContextField, journal: &Journal) -> Arc<dyn Stage> {
        Arc::new(RecordingStage {
            name,
            field,
            journal: Arc::clone(journal),
        })
    }

    fn four_stage_pipeline(journal: &Journal) -> Pipeline {
        Pipeline::builder("test")
            .add_stage(stage("researcher", ContextField::ResearchData, journal))
            .add_stage(stage("synthesizer", ContextField::DataAnalysis, journal))
            .add_stage(stage("strategist", ContextField::Strategy, journal))
            .add_stage(stage("presenter", ContextField::FinalOutput, journal))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let journal = Journal::default();
        let pipeline = four_stage_pipeline(&journal);

        let run = pipeline.run("Renewable energy India").await.unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["researcher", "synthesizer", "strategist", "presenter"]
        );
        assert_eq!(run.output_path(), Some("report.pdf"));
        assert!(run.context.is_complete());
        assert_eq!(run.stages.len(), 4);
        assert_eq!(run.stages[2].stage_name, "strategist");
        assert_eq!(pipeline.stage_names(), vec!["researcher", "synthesizer", "strategist", "presenter"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_stages() {
        let journal = Journal::default();
        let pipeline = Pipeline::builder("test")
            .add_stage(stage("researcher", ContextField::ResearchData, &journal))
            .add_stage(Arc::new(FailingStage {
                journal: Arc::clone(&journal),
            }))
            .add_stage(stage("presenter", ContextField::FinalOutput, &journal))
            .build()
            .unwrap();

        let err = pipeline.run("solar").await.unwrap_err();

        assert_eq!(err.failed_stage(), Some("failing"));
        assert!(err.to_string().contains("credential missing"));
        assert_eq!(*journal.lock().unwrap(), vec!["researcher", "failing"]);
    }

    #[tokio::test]
    async fn test_out_of_order_read_is_an_error() {
        let journal = Journal::default();
        let pipeline = Pipeline::builder("test")
            .add_stage(stage("strategist", ContextField::Strategy, &journal))
            .build()
            .unwrap();

        let err = pipeline.run("solar").await.unwrap_err();
        match err {
            WorkflowError::StageFailed { stage, source } => {
                assert_eq!(stage, "strategist");
                assert!(matches!(
                    source,
                    strategy_core::Error::Context(ContextError::Missing(ContextField::ResearchData))
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_topic_rejected_before_any_stage() {
        let journal = Journal::default();
        let pipeline = four_stage_pipeline(&journal);

        let err = pipeline.run("   ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidInput(ContextError::EmptyTopic)));
        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observer_sees_every_stage() {
        let journal = Journal::default();
        let pipeline = four_stage_pipeline(&journal);
        let mut events = Vec::new();

        pipeline
            .run_observed("solar", |event| events.push(event))
            .await
            .unwrap();

        assert_eq!(events.len(), 8);
        assert_eq!(
            events[0],
            StageEvent::Started {
                index: 0,
                total: 4,
                name: "researcher".to_string()
            }
        );
        assert!(matches!(&events[7], StageEvent::Finished { index: 3, name, .. } if name == "presenter"));
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let result = Pipeline::builder("empty").build();
        assert!(matches!(result, Err(WorkflowError::NoStages(name)) if name == "empty"));
    }
}
