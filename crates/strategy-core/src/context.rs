//! Pipeline context record
//!
//! The `PipelineContext` is the single record threaded through all stages.
//! It is created once per run from a topic and grows monotonically: each
//! stage consumes it and returns a new value with the fields it owns filled
//! in. A field can be written exactly once and must be written before it is
//! read.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fields carried by the context, in the order stages fill them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    /// Initial input supplied by the caller
    Topic,
    /// Headlines gathered by the researcher
    ResearchData,
    /// Table summary produced by the data synthesizer
    DataAnalysis,
    /// Strategy text returned by the language model
    Strategy,
    /// Path of the generated report
    FinalOutput,
}

impl ContextField {
    /// Key used in logs and serialized output
    pub fn key(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::ResearchData => "research_data",
            Self::DataAnalysis => "data_analysis",
            Self::Strategy => "strategy",
            Self::FinalOutput => "final_output",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordering violations on the context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The topic was empty or whitespace only
    #[error("topic must not be empty")]
    EmptyTopic,

    /// A field was read before its owning stage wrote it
    #[error("context field '{0}' has not been set")]
    Missing(ContextField),

    /// A field was written a second time
    #[error("context field '{0}' is already set")]
    AlreadySet(ContextField),

    /// A stage tried to write an empty value
    #[error("context field '{0}' must not be empty")]
    Empty(ContextField),
}

/// Accumulating record passed between pipeline stages
///
/// # Example
///
/// ```
/// use strategy_core::PipelineContext;
///
/// let ctx = PipelineContext::new("Renewable energy India")?
///     .with_research_data("Solar tariffs fall")?
///     .with_data_analysis("Month Price\nJan 75")?;
///
/// assert_eq!(ctx.topic(), "Renewable energy India");
/// assert!(ctx.strategy().is_err());
/// # Ok::<(), strategy_core::ContextError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineContext {
    topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    research_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_output: Option<String>,
}

impl PipelineContext {
    /// Create a context for one pipeline run
    ///
    /// The topic is trimmed; an empty topic is rejected.
    pub fn new(topic: impl Into<String>) -> Result<Self, ContextError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(ContextError::EmptyTopic);
        }

        Ok(Self {
            topic,
            research_data: None,
            data_analysis: None,
            strategy: None,
            final_output: None,
        })
    }

    // =========== Accessors ===========

    /// Get the topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get the research headlines
    pub fn research_data(&self) -> Result<&str, ContextError> {
        read(self.research_data.as_deref(), ContextField::ResearchData)
    }

    /// Get the data analysis summary
    pub fn data_analysis(&self) -> Result<&str, ContextError> {
        read(self.data_analysis.as_deref(), ContextField::DataAnalysis)
    }

    /// Get the strategy text
    pub fn strategy(&self) -> Result<&str, ContextError> {
        read(self.strategy.as_deref(), ContextField::Strategy)
    }

    /// Get the report path
    pub fn final_output(&self) -> Result<&str, ContextError> {
        read(self.final_output.as_deref(), ContextField::FinalOutput)
    }

    // =========== Extension ===========

    /// Return a new context carrying the research headlines
    pub fn with_research_data(mut self, value: impl Into<String>) -> Result<Self, ContextError> {
        write(&mut self.research_data, ContextField::ResearchData, value.into())?;
        Ok(self)
    }

    /// Return a new context carrying the data analysis summary
    pub fn with_data_analysis(mut self, value: impl Into<String>) -> Result<Self, ContextError> {
        write(&mut self.data_analysis, ContextField::DataAnalysis, value.into())?;
        Ok(self)
    }

    /// Return a new context carrying the strategy text
    pub fn with_strategy(mut self, value: impl Into<String>) -> Result<Self, ContextError> {
        write(&mut self.strategy, ContextField::Strategy, value.into())?;
        Ok(self)
    }

    /// Return a new context carrying the report path
    pub fn with_final_output(mut self, value: impl Into<String>) -> Result<Self, ContextError> {
        write(&mut self.final_output, ContextField::FinalOutput, value.into())?;
        Ok(self)
    }

    // =========== Inspection ===========

    /// Fields that have been written so far, in pipeline order
    pub fn filled_fields(&self) -> Vec<ContextField> {
        let mut fields = vec![ContextField::Topic];
        let optional = [
            (ContextField::ResearchData, &self.research_data),
            (ContextField::DataAnalysis, &self.data_analysis),
            (ContextField::Strategy, &self.strategy),
            (ContextField::FinalOutput, &self.final_output),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter(|(_, value)| value.is_some())
                .map(|(field, _)| field),
        );
        fields
    }

    /// Whether every stage has contributed its field
    pub fn is_complete(&self) -> bool {
        self.final_output.is_some()
            && self.strategy.is_some()
            && self.data_analysis.is_some()
            && self.research_data.is_some()
    }
}

fn read(slot: Option<&str>, field: ContextField) -> Result<&str, ContextError> {
    slot.ok_or(ContextError::Missing(field))
}

fn write(slot: &mut Option<String>, field: ContextField, value: String) -> Result<(), ContextError> {
    if slot.is_some() {
        return Err(ContextError::AlreadySet(field));
    }
    if value.trim().is_empty() {
        return Err(ContextError::Empty(field));
    }
    *slot = Some(value);
    Ok(())
}
