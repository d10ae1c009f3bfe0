//! Strategist prompt

use crate::error::Result;
use minijinja::{Environment, context};

/// Default instructions sent to the language model
pub const STRATEGIST_TEMPLATE: &str = r#"You are a market strategist.

Topic: {{ topic }}

Research Data:
{{ research_data }}

Data Analysis:
{{ data_analysis }}

Create a clear, step-by-step market entry strategy for {{ topic }}.
Label each step "STEP n:" on its own line, followed by the action and a short rationale."#;

/// Renders the strategist prompt from the pipeline context values
#[derive(Debug, Clone)]
pub struct StrategyPrompt {
    template: String,
}

impl Default for StrategyPrompt {
    fn default() -> Self {
        Self {
            template: STRATEGIST_TEMPLATE.to_string(),
        }
    }
}

impl StrategyPrompt {
    /// Use a custom template
    ///
    /// The template sees `topic`, `research_data` and `data_analysis`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the prompt
    pub fn render(&self, topic: &str, research_data: &str, data_analysis: &str) -> Result<String> {
        let env = Environment::new();
        let rendered = env.render_str(
            &self.template,
            context! {
                topic => topic,
                research_data => research_data,
                data_analysis => data_analysis,
            },
        )?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    #[test]
    fn test_render_embeds_all_inputs() {
        let prompt = StrategyPrompt::default()
            .render(
                "Renewable energy India",
                "No recent headlines found.",
                "Energy pricing data for Renewable energy India:\nMonth  Price_per_MWh",
            )
            .unwrap();

        assert!(prompt.starts_with("You are a market strategist."));
        assert!(prompt.contains("Research Data:\nNo recent headlines found."));
        assert!(prompt.contains("Price_per_MWh"));
        assert!(prompt.contains("market entry strategy for Renewable energy India."));
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = StrategyPrompt::default()
            .render("R&D <labs>", "\"Quoted\" headline", "table")
            .unwrap();
        assert!(prompt.contains("Topic: R&D <labs>"));
        assert!(prompt.contains("\"Quoted\" headline"));
    }

    #[test]
    fn test_custom_template() {
        let prompt = StrategyPrompt::new("{{ topic | upper }}: {{ research_data }}");
        assert_eq!(prompt.render("solar", "news", "data").unwrap(), "SOLAR: news");
    }

    #[test]
    fn test_broken_template() {
        let prompt = StrategyPrompt::new("{{ topic ");
        assert!(matches!(
            prompt.render("solar", "news", "data"),
            Err(AgentError::PromptError(_))
        ));
    }
}
