// SPDX-License-Identifier: MIT

//! Typed session state shared by every pipeline step
//!
//! Steps address state through [`StateKey`] rather than free-form strings,
//! so a misspelled key is a compile error and an unset key is a
//! [`StudioError::MissingState`] at the point of use.

use crate::adk::error::StudioError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Every slot the pipeline reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKey {
    Topic,
    TargetAudience,
    Tone,
    Keywords,
    BlogTopic,
    CurrentContent,
    QualityFeedback,
    FinalBlogPost,
    SocialMediaPosts,
    EmailNewsletter,
    SeoMetadata,
    FinalContentPackage,
}

impl StateKey {
    pub const ALL: [StateKey; 12] = [
        StateKey::Topic,
        StateKey::TargetAudience,
        StateKey::Tone,
        StateKey::Keywords,
        StateKey::BlogTopic,
        StateKey::CurrentContent,
        StateKey::QualityFeedback,
        StateKey::FinalBlogPost,
        StateKey::SocialMediaPosts,
        StateKey::EmailNewsletter,
        StateKey::SeoMetadata,
        StateKey::FinalContentPackage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Topic => "topic",
            StateKey::TargetAudience => "target_audience",
            StateKey::Tone => "tone",
            StateKey::Keywords => "keywords",
            StateKey::BlogTopic => "blog_topic",
            StateKey::CurrentContent => "current_content",
            StateKey::QualityFeedback => "quality_feedback",
            StateKey::FinalBlogPost => "final_blog_post",
            StateKey::SocialMediaPosts => "social_media_posts",
            StateKey::EmailNewsletter => "email_newsletter",
            StateKey::SeoMetadata => "seo_metadata",
            StateKey::FinalContentPackage => "final_content_package",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKey {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StudioError::other(format!("Unknown state key: {}", s)))
    }
}

/// Per-session state threaded through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub topic: Option<String>,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    pub keywords: Option<String>,
    pub blog_topic: Option<String>,
    pub current_content: Option<String>,
    pub quality_feedback: Option<String>,
    pub final_blog_post: Option<String>,
    pub social_media_posts: Option<String>,
    pub email_newsletter: Option<String>,
    pub seo_metadata: Option<String>,
    pub final_content_package: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: StateKey) -> &Option<String> {
        match key {
            StateKey::Topic => &self.topic,
            StateKey::TargetAudience => &self.target_audience,
            StateKey::Tone => &self.tone,
            StateKey::Keywords => &self.keywords,
            StateKey::BlogTopic => &self.blog_topic,
            StateKey::CurrentContent => &self.current_content,
            StateKey::QualityFeedback => &self.quality_feedback,
            StateKey::FinalBlogPost => &self.final_blog_post,
            StateKey::SocialMediaPosts => &self.social_media_posts,
            StateKey::EmailNewsletter => &self.email_newsletter,
            StateKey::SeoMetadata => &self.seo_metadata,
            StateKey::FinalContentPackage => &self.final_content_package,
        }
    }

    fn slot_mut(&mut self, key: StateKey) -> &mut Option<String> {
        match key {
            StateKey::Topic => &mut self.topic,
            StateKey::TargetAudience => &mut self.target_audience,
            StateKey::Tone => &mut self.tone,
            StateKey::Keywords => &mut self.keywords,
            StateKey::BlogTopic => &mut self.blog_topic,
            StateKey::CurrentContent => &mut self.current_content,
            StateKey::QualityFeedback => &mut self.quality_feedback,
            StateKey::FinalBlogPost => &mut self.final_blog_post,
            StateKey::SocialMediaPosts => &mut self.social_media_posts,
            StateKey::EmailNewsletter => &mut self.email_newsletter,
            StateKey::SeoMetadata => &mut self.seo_metadata,
            StateKey::FinalContentPackage => &mut self.final_content_package,
        }
    }

    /// Get a field value
    pub fn get(&self, key: StateKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    /// Get a field value that an earlier step must have written
    pub fn require(&self, key: StateKey) -> Result<&str, StudioError> {
        self.get(key).ok_or(StudioError::MissingState { key })
    }

    /// Overwrite a field
    pub fn set(&mut self, key: StateKey, value: impl Into<String>) {
        *self.slot_mut(key) = Some(value.into());
    }

    pub fn clear(&mut self, key: StateKey) {
        *self.slot_mut(key) = None;
    }

    /// Keys whose value differs from `baseline`
    pub fn changed_since(&self, baseline: &SessionState) -> Vec<StateKey> {
        StateKey::ALL
            .iter()
            .copied()
            .filter(|k| self.slot(*k) != baseline.slot(*k))
            .collect()
    }

    /// Keys that currently hold a value
    pub fn keys(&self) -> impl Iterator<Item = StateKey> + '_ {
        StateKey::ALL
            .iter()
            .copied()
            .filter(|k| self.slot(*k).is_some())
    }

    /// Convert the populated fields to a JSON object
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .keys()
            .filter_map(|k| {
                self.get(k)
                    .map(|v| (k.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();
        Value::Object(map)
    }
}
