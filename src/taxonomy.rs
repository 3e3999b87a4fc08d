use serde::Serialize;

use crate::error::DashboardError;
use crate::models::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModuleKind {
    Resource,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Book,
    Chat,
    Database,
    ExternalTool,
    Folder,
    Forum,
    Glossary,
    ImsContentPackage,
    Page,
    File,
    Url,
    Wiki,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    AssignmentSubmitted,
    AssignmentGraded,
    Feedback,
    ForumDiscussionCreated,
    ForumPostCreated,
    QuizAttempt,
    ScormLaunched,
    ScormRawSubmitted,
    ScormStatusSubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    Resource(ResourceType),
    Activity(ActivityType),
}

impl ResourceType {
    pub const ALL: [ResourceType; 12] = [
        ResourceType::Book,
        ResourceType::Chat,
        ResourceType::Database,
        ResourceType::ExternalTool,
        ResourceType::Folder,
        ResourceType::Forum,
        ResourceType::Glossary,
        ResourceType::ImsContentPackage,
        ResourceType::Page,
        ResourceType::File,
        ResourceType::Url,
        ResourceType::Wiki,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ResourceType::Book => r"\mod_book\event\chapter_viewed",
            ResourceType::Chat => r"\mod_chat\event\course_module_viewed",
            ResourceType::Database => r"\mod_data\event\course_module_viewed",
            ResourceType::ExternalTool => r"\mod_lti\event\course_module_viewed",
            ResourceType::Folder => r"\mod_folder\event\course_module_viewed",
            ResourceType::Forum => r"\mod_forum\event\discussion_viewed",
            ResourceType::Glossary => r"\mod_glossary\event\course_module_viewed",
            ResourceType::ImsContentPackage => r"\mod_imscp\event\course_module_viewed",
            ResourceType::Page => r"\mod_page\event\course_module_viewed",
            ResourceType::File => r"\mod_resource\event\course_module_viewed",
            ResourceType::Url => r"\mod_url\event\course_module_viewed",
            ResourceType::Wiki => r"\mod_wiki\event\course_module_viewed",
        }
    }
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::AssignmentSubmitted,
        ActivityType::AssignmentGraded,
        ActivityType::Feedback,
        ActivityType::ForumDiscussionCreated,
        ActivityType::ForumPostCreated,
        ActivityType::QuizAttempt,
        ActivityType::ScormLaunched,
        ActivityType::ScormRawSubmitted,
        ActivityType::ScormStatusSubmitted,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ActivityType::AssignmentSubmitted => r"\mod_assign\event\assessable_submitted",
            ActivityType::AssignmentGraded => r"\mod_assign\event\submission_graded",
            ActivityType::Feedback => r"\mod_feedback\event\response_submitted",
            ActivityType::ForumDiscussionCreated => r"\mod_forum\event\discussion_created",
            ActivityType::ForumPostCreated => r"\mod_forum\event\post_created",
            ActivityType::QuizAttempt => r"\mod_quiz\event\attempt_submitted",
            ActivityType::ScormLaunched => r"\mod_scorm\event\sco_launched",
            ActivityType::ScormRawSubmitted => r"\mod_scorm\event\scoreraw_submitted",
            ActivityType::ScormStatusSubmitted => r"\mod_scorm\event\status_submitted",
        }
    }
}

impl ModuleType {
    /// Resolves an upstream event tag. Unknown tags are a data-contract
    /// violation and never fall into either bucket.
    pub fn from_tag(tag: &str) -> Result<Self, DashboardError> {
        if let Some(resource) = ResourceType::ALL.into_iter().find(|r| r.tag() == tag) {
            return Ok(ModuleType::Resource(resource));
        }
        if let Some(activity) = ActivityType::ALL.into_iter().find(|a| a.tag() == tag) {
            return Ok(ModuleType::Activity(activity));
        }
        Err(DashboardError::Classification {
            tag: tag.to_string(),
        })
    }

    pub fn kind(self) -> ModuleKind {
        match self {
            ModuleType::Resource(_) => ModuleKind::Resource,
            ModuleType::Activity(_) => ModuleKind::Activity,
        }
    }
}

pub fn classify(tag: &str) -> Result<ModuleKind, DashboardError> {
    ModuleType::from_tag(tag).map(ModuleType::kind)
}

pub fn filter_kind(actions: &[Action], kind: ModuleKind) -> Result<Vec<&Action>, DashboardError> {
    let mut selected = Vec::new();
    for action in actions {
        if classify(&action.module_type)? == kind {
            selected.push(action);
        }
    }
    Ok(selected)
}

pub fn mask(actions: &[Action], kind: ModuleKind) -> Result<Vec<bool>, DashboardError> {
    actions
        .iter()
        .map(|action| classify(&action.module_type).map(|k| k == kind))
        .collect()
}

pub fn partition(actions: &[Action]) -> Result<(Vec<&Action>, Vec<&Action>), DashboardError> {
    let mut resources = Vec::new();
    let mut activities = Vec::new();
    for action in actions {
        match classify(&action.module_type)? {
            ModuleKind::Resource => resources.push(action),
            ModuleKind::Activity => activities.push(action),
        }
    }
    Ok((resources, activities))
}
