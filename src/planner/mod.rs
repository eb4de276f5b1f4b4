//! Planning stage: turn a question into an ordered list of step strings.

mod literal;

pub use literal::{Literal, parse_literal};

use crate::error::PlanParseError;
use crate::llm::{CallOutcome, ChatMessage, ModelCaller};
use crate::prompt::{PLANNER_TEMPLATE, PromptStore};
use tera::Context;

pub struct Planner {
    caller: ModelCaller,
    prompts: PromptStore,
}

impl Planner {
    pub fn new(caller: ModelCaller, prompts: PromptStore) -> Self {
        Self { caller, prompts }
    }

    /// Produce a plan for the question. Every failure mode collapses to an
    /// empty plan, the single "no plan" signal the agent consumes.
    pub async fn plan(&self, question: &str) -> Vec<String> {
        match self.try_plan(question).await {
            Ok(steps) => steps,
            Err(error) => {
                tracing::warn!("planning failed: {error:#}");
                Vec::new()
            }
        }
    }

    async fn try_plan(&self, question: &str) -> anyhow::Result<Vec<String>> {
        let mut context = Context::new();
        context.insert("question", question);
        let prompt = self.prompts.render(PLANNER_TEMPLATE, &context)?;

        tracing::info!("generating plan");
        let CallOutcome::Success(reply) = self.caller.invoke(&[ChatMessage::user(prompt)]).await
        else {
            anyhow::bail!("planner model call failed after retries");
        };
        tracing::debug!(reply = %reply, "planner raw reply");

        let steps = parse_plan_reply(&reply)?;
        tracing::info!(steps = steps.len(), "plan parsed");
        Ok(steps)
    }
}

/// Extract the inner text of the first ```python fenced block.
fn extract_python_fence(text: &str) -> Option<&str> {
    let start = text.find("```python")?;
    let body_start = start + "```python".len();
    let rest = &text[body_start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Parsing contract with the planner model: the plan is a Python list of
/// string literals inside the first ```python fence of the reply.
fn parse_plan_reply(reply: &str) -> Result<Vec<String>, PlanParseError> {
    let body = extract_python_fence(reply).ok_or(PlanParseError::FenceMissing)?;

    let Literal::List(items) = parse_literal(body)? else {
        return Err(PlanParseError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Literal::Str(step) => Ok(step),
            _ => Err(PlanParseError::NonStringStep { index }),
        })
        .collect()
}
