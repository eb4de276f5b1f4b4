mod store;

pub use store::{EXECUTOR_TEMPLATE, PLANNER_TEMPLATE, PromptStore};
