// SPDX-License-Identifier: MIT

//! Workflow agents - compose other agents in sequence, in a bounded loop or
//! concurrently

use super::{Agent, AgentEvent};
use crate::adk::context::{InvocationContext, LoopControl};
use crate::adk::error::{PipelineError, StudioError};
use crate::adk::state::StateKey;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Runs sub-agents one after another, feeding each output into the next input
pub struct SequentialAgent {
    pub name: String,
    pub description: String,
    pub sub_agents: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        sub_agents: Vec<Arc<dyn Agent>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            sub_agents,
        }
    }
}

#[async_trait]
impl Agent for SequentialAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(
        &self,
        ctx: &mut InvocationContext,
        input: String,
    ) -> Result<String, StudioError> {
        let mut current_input = input;
        for agent in &self.sub_agents {
            log::info!("{}: running step {}", self.name, agent.name());
            current_input = agent.run(ctx, current_input).await?;
        }
        Ok(current_input)
    }

    fn check_data_flow(&self, available: &mut BTreeSet<StateKey>) -> Result<(), PipelineError> {
        for agent in &self.sub_agents {
            agent.check_data_flow(available)?;
        }
        Ok(())
    }

    fn writes(&self) -> BTreeSet<StateKey> {
        writes_of(&self.sub_agents)
    }
}

/// Repeats its sub-agents until one of them raises [`LoopControl::Stop`] or
/// `max_iterations` passes have run
pub struct LoopAgent {
    pub name: String,
    pub description: String,
    pub sub_agents: Vec<Arc<dyn Agent>>,
    pub max_iterations: u32,
}

impl LoopAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        sub_agents: Vec<Arc<dyn Agent>>,
        max_iterations: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            sub_agents,
            max_iterations,
        }
    }
}

#[async_trait]
impl Agent for LoopAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(
        &self,
        ctx: &mut InvocationContext,
        input: String,
    ) -> Result<String, StudioError> {
        let mut current_input = input;
        for iteration in 1..=self.max_iterations {
            log::info!(
                "{} iteration {}/{}",
                self.name,
                iteration,
                self.max_iterations
            );
            ctx.emit(AgentEvent::Log {
                author: self.name.clone(),
                message: format!("Iteration {}/{}", iteration, self.max_iterations),
            })
            .await;

            for agent in &self.sub_agents {
                current_input = agent.run(ctx, current_input).await?;
                if ctx.take_control() == LoopControl::Stop {
                    log::info!(
                        "{} stopped by {} after {} iteration(s)",
                        self.name,
                        agent.name(),
                        iteration
                    );
                    return Ok(current_input);
                }
            }
        }

        log::info!(
            "{} reached its cap of {} iterations",
            self.name,
            self.max_iterations
        );
        Ok(current_input)
    }

    fn check_data_flow(&self, available: &mut BTreeSet<StateKey>) -> Result<(), PipelineError> {
        for agent in &self.sub_agents {
            agent.check_data_flow(available)?;
        }
        Ok(())
    }

    fn writes(&self) -> BTreeSet<StateKey> {
        writes_of(&self.sub_agents)
    }
}

fn writes_of(agents: &[Arc<dyn Agent>]) -> BTreeSet<StateKey> {
    agents.iter().flat_map(|a| a.writes()).collect()
}

/// Aborts spawned branches when dropped, so a cancelled run stops them too.
/// Aborting a finished task is a no-op.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Runs every sub-agent concurrently on its own copy of the context.
///
/// Each branch's state changes are merged back into the parent once all
/// branches finish. Two branches changing the same key is an error.
pub struct ParallelAgent {
    pub name: String,
    pub description: String,
    pub sub_agents: Vec<Arc<dyn Agent>>,
}

impl ParallelAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        sub_agents: Vec<Arc<dyn Agent>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            sub_agents,
        }
    }
}

#[async_trait]
impl Agent for ParallelAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(
        &self,
        ctx: &mut InvocationContext,
        input: String,
    ) -> Result<String, StudioError> {
        let baseline = ctx.state.clone();

        let mut handles = Vec::with_capacity(self.sub_agents.len());
        for agent in &self.sub_agents {
            let agent = agent.clone();
            let input = input.clone();
            let mut branch_ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let result = agent.run(&mut branch_ctx, input).await;
                (branch_ctx, result)
            }));
        }

        let _guard = AbortOnDrop(handles.iter().map(|h| h.abort_handle()).collect());
        let joined = join_all(handles).await;

        let mut writers: BTreeMap<StateKey, &str> = BTreeMap::new();
        let mut results = Vec::with_capacity(joined.len());
        for (agent, handle) in self.sub_agents.iter().zip(joined) {
            let (branch_ctx, result) = handle?;
            let output = result?;

            for key in branch_ctx.state.changed_since(&baseline) {
                if let Some(first) = writers.insert(key, agent.name()) {
                    return Err(PipelineError::ConflictingWrite {
                        key,
                        first: first.to_string(),
                        second: agent.name().to_string(),
                    }
                    .into());
                }
                match branch_ctx.state.get(key) {
                    Some(value) => ctx.state.set(key, value),
                    None => ctx.state.clear(key),
                }
            }
            if branch_ctx.control() == LoopControl::Stop {
                ctx.escalate();
            }
            results.push(output);
        }

        log::info!(
            "{} merged {} branch(es), keys written: {:?}",
            self.name,
            results.len(),
            writers.keys().collect::<Vec<_>>()
        );
        Ok(results.join("\n---\n"))
    }

    fn check_data_flow(&self, available: &mut BTreeSet<StateKey>) -> Result<(), PipelineError> {
        let base = available.clone();
        let mut writers: BTreeMap<StateKey, &str> = BTreeMap::new();

        for agent in &self.sub_agents {
            let mut branch = base.clone();
            agent.check_data_flow(&mut branch)?;

            // Keys already present before the fan-out only show up in the declared writes
            let mut written = agent.writes();
            written.extend(branch.difference(&base).copied());
            for key in written {
                if let Some(first) = writers.insert(key, agent.name()) {
                    return Err(PipelineError::ConflictingWrite {
                        key,
                        first: first.to_string(),
                        second: agent.name().to_string(),
                    });
                }
            }
        }

        available.extend(writers.into_keys());
        Ok(())
    }

    fn writes(&self) -> BTreeSet<StateKey> {
        writes_of(&self.sub_agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::state::SessionState;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Writes a fixed key, counts its runs and optionally stops the loop
    struct StepAgent {
        name: String,
        reads: Vec<StateKey>,
        writes: StateKey,
        stop_on_run: Option<u32>,
        runs: AtomicU32,
    }

    impl StepAgent {
        fn new(name: &str, reads: Vec<StateKey>, writes: StateKey) -> Self {
            Self {
                name: name.to_string(),
                reads,
                writes,
                stop_on_run: None,
                runs: AtomicU32::new(0),
            }
        }

        fn stopping_on(mut self, run: u32) -> Self {
            self.stop_on_run = Some(run);
            self
        }

        fn runs(&self) -> u32 {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Agent for StepAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(
            &self,
            ctx: &mut InvocationContext,
            input: String,
        ) -> Result<String, StudioError> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            for key in &self.reads {
                ctx.state.require(*key)?;
            }
            ctx.state.set(self.writes, format!("{}#{}", self.name, run));
            if self.stop_on_run == Some(run) {
                ctx.escalate();
            }
            Ok(format!("{}>{}", input, self.name))
        }

        fn check_data_flow(
            &self,
            available: &mut BTreeSet<StateKey>,
        ) -> Result<(), PipelineError> {
            if let Some(key) = self.reads.iter().find(|k| !available.contains(k)) {
                return Err(PipelineError::UnsatisfiedRead {
                    agent: self.name.clone(),
                    key: *key,
                });
            }
            available.insert(self.writes);
            Ok(())
        }

        fn writes(&self) -> BTreeSet<StateKey> {
            BTreeSet::from([self.writes])
        }
    }

    /// Sleeps, then counts a completed run
    struct SlowAgent {
        name: String,
        finished: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Agent for SlowAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(
            &self,
            _ctx: &mut InvocationContext,
            input: String,
        ) -> Result<String, StudioError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(input)
        }
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new("s1", SessionState::new())
    }

    #[tokio::test]
    async fn test_sequential_threads_output() {
        let agent = SequentialAgent::new(
            "seq",
            "",
            vec![
                Arc::new(StepAgent::new("a", vec![], StateKey::BlogTopic)),
                Arc::new(StepAgent::new(
                    "b",
                    vec![StateKey::BlogTopic],
                    StateKey::CurrentContent,
                )),
            ],
        );
        let mut ctx = ctx();
        let out = agent.run(&mut ctx, "in".to_string()).await.unwrap();
        assert_eq!(out, "in>a>b");
        assert_eq!(ctx.state.get(StateKey::CurrentContent), Some("b#1"));
    }

    #[tokio::test]
    async fn test_loop_runs_to_cap() {
        let checker = Arc::new(StepAgent::new("check", vec![], StateKey::QualityFeedback));
        let improver = Arc::new(StepAgent::new("improve", vec![], StateKey::CurrentContent));
        let agent = LoopAgent::new("loop", "", vec![checker.clone(), improver.clone()], 3);

        agent.run(&mut ctx(), "x".to_string()).await.unwrap();
        assert_eq!(checker.runs(), 3);
        assert_eq!(improver.runs(), 3);
    }

    #[tokio::test]
    async fn test_loop_stops_on_signal() {
        let checker =
            Arc::new(StepAgent::new("check", vec![], StateKey::QualityFeedback).stopping_on(2));
        let improver = Arc::new(StepAgent::new("improve", vec![], StateKey::CurrentContent));
        let agent = LoopAgent::new("loop", "", vec![checker.clone(), improver.clone()], 3);

        let mut ctx = ctx();
        agent.run(&mut ctx, "x".to_string()).await.unwrap();
        assert_eq!(checker.runs(), 2);
        assert_eq!(improver.runs(), 1);
        // The signal is consumed by the loop
        assert_eq!(ctx.control(), LoopControl::Continue);
    }

    #[tokio::test]
    async fn test_parallel_merges_disjoint_writes() {
        let agent = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new("blog", vec![], StateKey::FinalBlogPost)),
                Arc::new(StepAgent::new("seo", vec![], StateKey::SeoMetadata)),
            ],
        );
        let mut ctx = ctx();
        let out = agent.run(&mut ctx, "x".to_string()).await.unwrap();

        assert_eq!(out, "x>blog\n---\nx>seo");
        assert_eq!(ctx.state.get(StateKey::FinalBlogPost), Some("blog#1"));
        assert_eq!(ctx.state.get(StateKey::SeoMetadata), Some("seo#1"));
    }

    #[tokio::test]
    async fn test_parallel_rejects_overlapping_writes() {
        let agent = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new("one", vec![], StateKey::SeoMetadata)),
                Arc::new(StepAgent::new("two", vec![], StateKey::SeoMetadata)),
            ],
        );
        let err = agent.run(&mut ctx(), "x".to_string()).await.unwrap_err();
        assert!(matches!(
            err,
            StudioError::Pipeline(PipelineError::ConflictingWrite {
                key: StateKey::SeoMetadata,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_parallel_branch_error_propagates() {
        let agent = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new("ok", vec![], StateKey::FinalBlogPost)),
                Arc::new(StepAgent::new(
                    "needs_draft",
                    vec![StateKey::CurrentContent],
                    StateKey::SeoMetadata,
                )),
            ],
        );
        let err = agent.run(&mut ctx(), "x".to_string()).await.unwrap_err();
        assert!(matches!(err, StudioError::MissingState { .. }));
    }

    #[test]
    fn test_parallel_data_flow() {
        let disjoint = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new(
                    "blog",
                    vec![StateKey::CurrentContent],
                    StateKey::FinalBlogPost,
                )),
                Arc::new(StepAgent::new(
                    "seo",
                    vec![StateKey::CurrentContent],
                    StateKey::SeoMetadata,
                )),
            ],
        );
        let mut available = BTreeSet::from([StateKey::CurrentContent]);
        disjoint.check_data_flow(&mut available).unwrap();
        assert!(available.contains(&StateKey::FinalBlogPost));
        assert!(available.contains(&StateKey::SeoMetadata));

        // A branch cannot see what a sibling writes
        let sibling_read = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new("blog", vec![], StateKey::FinalBlogPost)),
                Arc::new(StepAgent::new(
                    "pack",
                    vec![StateKey::FinalBlogPost],
                    StateKey::FinalContentPackage,
                )),
            ],
        );
        let err = sibling_read
            .check_data_flow(&mut BTreeSet::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsatisfiedRead { .. }));

        let overlapping = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new("one", vec![], StateKey::SeoMetadata)),
                Arc::new(StepAgent::new("two", vec![], StateKey::SeoMetadata)),
            ],
        );
        let err = overlapping.check_data_flow(&mut BTreeSet::new()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::ConflictingWrite {
                key: StateKey::SeoMetadata,
                first: "one".to_string(),
                second: "two".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_dropped_parallel_run_aborts_branches() {
        let finished = Arc::new(AtomicU32::new(0));
        let slow = |name: &str| -> Arc<dyn Agent> {
            Arc::new(SlowAgent {
                name: name.to_string(),
                finished: finished.clone(),
            })
        };
        let agent = ParallelAgent::new("fan", "", vec![slow("blog"), slow("seo")]);

        let mut ctx = ctx();
        let run = agent.run(&mut ctx, "x".to_string());
        assert!(tokio::time::timeout(Duration::from_millis(20), run)
            .await
            .is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parallel_data_flow_rejects_rewriting_existing_key() {
        // Both branches rewrite a key that is already set before the fan-out
        let agent = ParallelAgent::new(
            "fan",
            "",
            vec![
                Arc::new(StepAgent::new(
                    "polish",
                    vec![StateKey::CurrentContent],
                    StateKey::CurrentContent,
                )),
                Arc::new(StepAgent::new("shorten", vec![], StateKey::CurrentContent)),
            ],
        );
        let mut available = BTreeSet::from([StateKey::CurrentContent]);
        let err = agent.check_data_flow(&mut available).unwrap_err();
        assert_eq!(
            err,
            PipelineError::ConflictingWrite {
                key: StateKey::CurrentContent,
                first: "polish".to_string(),
                second: "shorten".to_string(),
            }
        );
    }

    #[test]
    fn test_workflow_writes_union_sub_agents() {
        let seq = SequentialAgent::new(
            "seq",
            "",
            vec![
                Arc::new(StepAgent::new("a", vec![], StateKey::BlogTopic)),
                Arc::new(StepAgent::new("b", vec![], StateKey::CurrentContent)),
            ],
        );
        assert_eq!(
            seq.writes(),
            BTreeSet::from([StateKey::BlogTopic, StateKey::CurrentContent])
        );
    }
}
