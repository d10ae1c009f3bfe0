//! Core Stage trait definition

use crate::{PipelineContext, Result};
use async_trait::async_trait;

/// A single step of the strategy pipeline
///
/// A stage takes the context by value and hands back a new context that
/// extends it with the fields the stage owns. Stages never mutate fields
/// written by an earlier stage; the typed setters on [`PipelineContext`]
/// reject a second write.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Run the stage against the context produced by the previous stage
    async fn run(&self, context: PipelineContext) -> Result<PipelineContext>;

    /// Get the stage's name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContextError;

    struct Uppercase;

    #[async_trait]
    impl Stage for Uppercase {
        async fn run(&self, context: PipelineContext) -> Result<PipelineContext> {
            let headlines = context.topic().to_uppercase();
            Ok(context.with_research_data(headlines)?)
        }

        fn name(&self) -> &str {
            "uppercase"
        }
    }

    #[test]
    fn test_stage_extends_context() {
        let stage = Uppercase;
        let context = PipelineContext::new("solar").unwrap();

        let context = tokio_test::block_on(stage.run(context)).unwrap();
        assert_eq!(context.research_data().unwrap(), "SOLAR");
        assert_eq!(stage.name(), "uppercase");
    }

    #[test]
    fn test_stage_cannot_run_twice_on_same_context() {
        let stage = Uppercase;
        let context = PipelineContext::new("solar").unwrap();

        let context = tokio_test::block_on(stage.run(context)).unwrap();
        let err = tokio_test::block_on(stage.run(context)).unwrap_err();
        assert!(matches!(err, crate::Error::Context(ContextError::AlreadySet(_))));
    }
}
