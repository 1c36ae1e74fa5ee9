// SPDX-License-Identifier: MIT

//! Agent factory - builds every studio agent and composes the pipeline
//!
//! Each role is an [`LLMAgent`] bound to one instruction from
//! [`crate::studio::prompts`] and, where the role needs them, its tools and
//! output key. Workflow agents then arrange the roles into the full
//! content pipeline.

use crate::adk::agent::{Agent, AgentTool, LLMAgent, LoopAgent, ParallelAgent, SequentialAgent};
use crate::adk::model::{GenerationConfig, Model};
use crate::adk::state::StateKey;
use crate::adk::tool::Tool;
use crate::studio::prompts;
use crate::studio::tools::{
    analysis_tools, ExitLoopTool, QualityScoreTool, UpdateSessionStateTool,
};
use std::sync::Arc;

/// Upper bound on score/improve passes
pub const QUALITY_LOOP_MAX_ITERATIONS: u32 = 3;

pub const FULL_WORKFLOW_NAME: &str = "full_content_workflow";
pub const ANALYZER_NAME: &str = "content_analyzer_agent";
pub const ORCHESTRATOR_NAME: &str = "master_orchestrator_agent";

/// Factory for the studio's agents, sharing one model and generation config
pub struct AgentFactory {
    model: Arc<dyn Model>,
    config: GenerationConfig,
}

impl AgentFactory {
    pub fn new(model: Arc<dyn Model>, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    fn llm(
        &self,
        name: &str,
        description: &str,
        instruction: &str,
        tools: Vec<Arc<dyn Tool>>,
    ) -> LLMAgent {
        LLMAgent::new(name, description, instruction, self.model.clone(), tools)
            .with_config(self.config.clone())
    }

    pub fn intake(&self) -> Arc<dyn Agent> {
        Arc::new(self.llm(
            "intake_agent",
            "Extracts topic, audience, tone and keywords from a request",
            prompts::INTAKE_INSTRUCTION,
            vec![Arc::new(UpdateSessionStateTool)],
        ))
    }

    pub fn topic_research(&self) -> Arc<dyn Agent> {
        let config = GenerationConfig {
            google_search: true,
            ..self.config.clone()
        };
        Arc::new(
            self.llm(
                "topic_research_agent",
                "Picks the best blog title for the topic",
                prompts::TOPIC_RESEARCH_INSTRUCTION,
                vec![],
            )
            .with_config(config)
            .with_output_key(StateKey::BlogTopic),
        )
    }

    pub fn drafter(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "content_drafter_agent",
                "Writes the first draft",
                prompts::DRAFTER_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::CurrentContent),
        )
    }

    pub fn quality_checker(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "quality_checker_agent",
                "Scores the draft and lists its issues",
                prompts::QUALITY_CHECKER_INSTRUCTION,
                vec![Arc::new(QualityScoreTool)],
            )
            .with_output_key(StateKey::QualityFeedback),
        )
    }

    pub fn improver(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "content_improver_agent",
                "Rewrites the draft to address reviewer feedback",
                prompts::IMPROVER_INSTRUCTION,
                vec![Arc::new(ExitLoopTool)],
            )
            .with_output_key(StateKey::CurrentContent)
            .keep_output_on_stop(),
        )
    }

    pub fn blog_writer(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "blog_post_writer_agent",
                "Produces the publication-ready blog post",
                prompts::BLOG_WRITER_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::FinalBlogPost),
        )
    }

    pub fn social_media(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "social_media_creator_agent",
                "Writes LinkedIn, Twitter and Instagram posts",
                prompts::SOCIAL_MEDIA_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::SocialMediaPosts),
        )
    }

    pub fn email_newsletter(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "email_newsletter_writer_agent",
                "Writes the email newsletter",
                prompts::EMAIL_NEWSLETTER_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::EmailNewsletter),
        )
    }

    pub fn seo(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "seo_metadata_agent",
                "Generates SEO metadata",
                prompts::SEO_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::SeoMetadata),
        )
    }

    pub fn packager(&self) -> Arc<dyn Agent> {
        Arc::new(
            self.llm(
                "final_packager_agent",
                "Assembles every channel into one content package",
                prompts::PACKAGER_INSTRUCTION,
                vec![],
            )
            .with_output_key(StateKey::FinalContentPackage),
        )
    }

    pub fn analyzer(&self) -> Arc<dyn Agent> {
        Arc::new(self.llm(
            ANALYZER_NAME,
            "Analyzes existing text: word count, readability and hashtags",
            prompts::ANALYZER_INSTRUCTION,
            analysis_tools(),
        ))
    }

    /// The five-stage pipeline: intake, research and draft, quality loop,
    /// multi-channel fan-out, packaging
    pub fn full_workflow(&self) -> Arc<dyn Agent> {
        let research_and_draft = SequentialAgent::new(
            "research_and_draft_workflow",
            "Researches a title, then drafts the post",
            vec![self.topic_research(), self.drafter()],
        );

        let quality_loop = LoopAgent::new(
            "quality_improvement_loop",
            "Scores and improves the draft until it passes",
            vec![self.quality_checker(), self.improver()],
            QUALITY_LOOP_MAX_ITERATIONS,
        );

        let channels = ParallelAgent::new(
            "parallel_content_creation",
            "Writes blog, social, email and SEO content concurrently",
            vec![
                self.blog_writer(),
                self.social_media(),
                self.email_newsletter(),
                self.seo(),
            ],
        );

        Arc::new(SequentialAgent::new(
            FULL_WORKFLOW_NAME,
            "Runs the complete content creation pipeline for a brief",
            vec![
                self.intake(),
                Arc::new(research_and_draft),
                Arc::new(quality_loop),
                Arc::new(channels),
                self.packager(),
            ],
        ))
    }

    /// Root agent that routes free-form requests to the pipeline or the analyzer
    pub fn orchestrator(&self, workflow: Arc<dyn Agent>, analyzer: Arc<dyn Agent>) -> Arc<dyn Agent> {
        let coordinator = self.llm(
            "content_creation_coordinator",
            "Creates a complete multi-channel content package from a brief",
            prompts::COORDINATOR_INSTRUCTION,
            vec![Arc::new(AgentTool::new(workflow))],
        );

        Arc::new(self.llm(
            ORCHESTRATOR_NAME,
            "Content Creation Studio orchestrator",
            prompts::ORCHESTRATOR_INSTRUCTION,
            vec![
                Arc::new(AgentTool::new(Arc::new(coordinator))),
                Arc::new(AgentTool::new(analyzer)),
            ],
        ))
    }
}
