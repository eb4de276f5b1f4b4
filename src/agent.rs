//! Two-phase orchestration: plan first, then execute.

use crate::executor::Executor;
use crate::planner::Planner;

pub struct Agent {
    planner: Planner,
    executor: Executor,
}

impl Agent {
    pub fn new(planner: Planner, executor: Executor) -> Self {
        Self { planner, executor }
    }

    /// Run the full flow for one question. An empty plan aborts the run
    /// before the executor is ever touched; that is the only branch.
    pub async fn run(&self, question: &str) {
        tracing::info!("processing question: {question}");

        let plan = self.planner.plan(question).await;
        if plan.is_empty() {
            tracing::error!("no usable plan was produced; aborting the run");
            println!("no valid plan could be generated; run aborted");
            return;
        }

        tracing::info!(steps = plan.len(), "plan ready");
        let answer = self.executor.execute(question, &plan).await;

        tracing::info!("run finished");
        println!("{answer}");
    }
}
