//! Execution stage: resolve each plan step in order, feeding every step the
//! history of what came before, and return the final step's response.

use crate::error::PromptError;
use crate::llm::{CallOutcome, ChatMessage, ModelCaller};
use crate::prompt::{EXECUTOR_TEMPLATE, PromptStore};
use tera::Context;

/// History sentinel for the first step, which has nothing behind it.
const EMPTY_HISTORY: &str = "none";

pub struct Executor {
    caller: ModelCaller,
    prompts: PromptStore,
}

impl Executor {
    pub fn new(caller: ModelCaller, prompts: PromptStore) -> Self {
        Self { caller, prompts }
    }

    /// Run the plan to completion. Never fails: template problems come back
    /// as a descriptive error string standing in for the answer, and a
    /// failed step contributes an empty result but does not stop the run.
    pub async fn execute(&self, question: &str, plan: &[String]) -> String {
        match self.try_execute(question, plan).await {
            Ok(answer) => answer,
            Err(error) => format!("error: plan execution failed: {error}"),
        }
    }

    async fn try_execute(&self, question: &str, plan: &[String]) -> Result<String, PromptError> {
        let rendered_plan = format_plan(plan);
        let mut history = String::new();
        let mut final_answer = String::new();

        tracing::info!(steps = plan.len(), "executing plan");

        for (index, step) in plan.iter().enumerate() {
            let step_number = index + 1;
            tracing::info!(
                step = step_number,
                total = plan.len(),
                "running step: {step}"
            );

            let mut context = Context::new();
            context.insert("question", question);
            context.insert("plan", &rendered_plan);
            context.insert(
                "history",
                if history.is_empty() {
                    EMPTY_HISTORY
                } else {
                    history.as_str()
                },
            );
            context.insert("current_step", step);
            let prompt = self.prompts.render(EXECUTOR_TEMPLATE, &context)?;

            let response = match self.caller.invoke(&[ChatMessage::user(prompt)]).await {
                CallOutcome::Success(text) => text,
                CallOutcome::Failure => String::new(),
            };

            history.push_str(&format!(
                "step {step_number}: {step}\nresult: {response}\n\n"
            ));
            tracing::info!(step = step_number, "step finished");
            final_answer = response;
        }

        if final_answer.is_empty() && !plan.is_empty() {
            // The last step's response is the answer, so a failed final call
            // leaves nothing to show. Flag it instead of passing it off
            // silently.
            tracing::warn!("final step produced no answer; returning an empty result");
        }

        Ok(final_answer)
    }
}

/// Render the plan the way it appears in prompts: a Python-style list of
/// quoted steps.
fn format_plan(plan: &[String]) -> String {
    let quoted: Vec<String> = plan
        .iter()
        .map(|step| format!("'{}'", step.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvTriple, ModelConfig};
    use crate::llm::Provider;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const UNSET_ENV: EnvTriple = EnvTriple {
        model_id: "PLANSOLVE_TEST_UNSET_MODEL",
        api_key: "PLANSOLVE_TEST_UNSET_KEY",
        base_url: "PLANSOLVE_TEST_UNSET_URL",
    };

    /// Records every prompt it receives and answers from a script; `None`
    /// entries simulate a failed call.
    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        script: Mutex<Vec<Option<String>>>,
    }

    impl RecordingProvider {
        fn new(script: Vec<Option<&str>>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                script: Mutex::new(
                    script
                        .into_iter()
                        .rev()
                        .map(|reply| reply.map(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            _model: &str,
            _temperature: f64,
        ) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push(messages[0].content.clone());
            match self.script.lock().unwrap().pop().flatten() {
                Some(reply) => Ok(reply),
                None => anyhow::bail!("scripted failure"),
            }
        }
    }

    /// Lets a test keep a handle on the provider after the caller takes
    /// ownership of its `Box`.
    struct SharedProvider(Arc<RecordingProvider>);

    #[async_trait]
    impl Provider for SharedProvider {
        fn name(&self) -> &str {
            self.0.name()
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            model: &str,
            temperature: f64,
        ) -> anyhow::Result<String> {
            self.0.complete(messages, model, temperature).await
        }
    }

    fn executor_with(
        script: Vec<Option<&str>>,
        template: Option<&str>,
    ) -> (TempDir, Executor, Arc<RecordingProvider>) {
        let dir = TempDir::new().unwrap();
        if let Some(template) = template {
            fs::write(dir.path().join("executor.md"), template).unwrap();
        }
        let provider = Arc::new(RecordingProvider::new(script));
        let config = ModelConfig::resolve(
            &UNSET_ENV,
            Some("test-model"),
            Some("test-key"),
            Some("https://example.invalid"),
            1.0,
        )
        .unwrap()
        .with_max_retries(1);
        let caller = ModelCaller::new(Box::new(SharedProvider(Arc::clone(&provider))), config);
        let executor = Executor::new(caller, PromptStore::open(dir.path()));
        (dir, executor, provider)
    }

    fn steps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn final_step_response_is_the_answer() {
        let (_dir, executor, _provider) = executor_with(
            vec![Some("done:buy food"), Some("done:pack bag")],
            Some("{{ current_step }}"),
        );
        let answer = executor
            .execute("plan a picnic", &steps(&["buy food", "pack bag"]))
            .await;
        assert_eq!(answer, "done:pack bag");
    }

    #[tokio::test]
    async fn renders_one_prompt_per_step_with_causal_history() {
        // Template renders only the history, so each captured prompt is the
        // exact history string passed into that render.
        let (_dir, executor, provider) = executor_with(
            vec![Some("done:buy food"), Some("done:pack bag")],
            Some("{{ history }}"),
        );
        executor
            .execute("plan a picnic", &steps(&["buy food", "pack bag"]))
            .await;

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], "none");
        assert_eq!(prompts[1], "step 1: buy food\nresult: done:buy food\n\n");
    }

    #[tokio::test]
    async fn history_accumulates_across_three_steps() {
        let (_dir, executor, provider) = executor_with(
            vec![Some("r1"), Some("r2"), Some("r3")],
            Some("{{ history }}"),
        );
        let answer = executor.execute("q", &steps(&["a", "b", "c"])).await;
        assert_eq!(answer, "r3");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert_eq!(
            prompts[2],
            "step 1: a\nresult: r1\n\nstep 2: b\nresult: r2\n\n"
        );
    }

    #[tokio::test]
    async fn failed_step_contributes_empty_result_and_run_continues() {
        let (_dir, executor, provider) =
            executor_with(vec![None, Some("recovered")], Some("{{ history }}"));
        let answer = executor.execute("q", &steps(&["a", "b"])).await;
        assert_eq!(answer, "recovered");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts[1], "step 1: a\nresult: \n\n");
    }

    #[tokio::test]
    async fn failed_final_step_yields_empty_answer() {
        let (_dir, executor, _provider) =
            executor_with(vec![Some("r1"), None], Some("{{ history }}"));
        let answer = executor.execute("q", &steps(&["a", "b"])).await;
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn missing_template_becomes_error_string() {
        let (_dir, executor, provider) = executor_with(vec![], None);
        let answer = executor.execute("q", &steps(&["a"])).await;
        assert!(answer.starts_with("error: plan execution failed"));
        assert!(answer.contains("executor.md"));
        // The template failure happened before any model traffic.
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn render_failure_becomes_error_string() {
        let (_dir, executor, _provider) =
            executor_with(vec![], Some("{{ undeclared_variable }}"));
        let answer = executor.execute("q", &steps(&["a"])).await;
        assert!(answer.starts_with("error: plan execution failed"));
    }

    #[tokio::test]
    async fn empty_plan_yields_empty_answer_without_calls() {
        let (_dir, executor, provider) = executor_with(vec![], Some("{{ history }}"));
        let answer = executor.execute("q", &[]).await;
        assert_eq!(answer, "");
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn template_sees_question_plan_and_current_step() {
        let (_dir, executor, provider) = executor_with(
            vec![Some("r1")],
            Some("Q={{ question }} P={{ plan }} S={{ current_step }} H={{ history }}"),
        );
        executor
            .execute("plan a picnic", &steps(&["buy food"]))
            .await;

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            "Q=plan a picnic P=['buy food'] S=buy food H=none"
        );
    }

    #[test]
    fn format_plan_quotes_and_escapes() {
        assert_eq!(
            format_plan(&steps(&["buy food", "don't forget"])),
            r"['buy food', 'don\'t forget']"
        );
        assert_eq!(format_plan(&[]), "[]");
    }
}
