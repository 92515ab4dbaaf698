//! Core domain model for the KRUG community site.
//!
//! Every type here mirrors a record authored in the site's YAML documents;
//! serde attributes pin the exact key spellings those documents use, since
//! the maintenance jobs rewrite files that the live site keeps reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "krug-core";

/// Category labels for events, as authored under the `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Meetup,
    Seminar,
    Workshop,
    Study,
    Online,
}

/// A single community event from the events document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO date string, kept as authored.
    pub date: String,
    pub location: String,
    #[serde(rename = "type")]
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// The source store's own partition of events. The loader trusts this split
/// verbatim; membership is decided at authoring time, not at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCollections {
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
}

/// One organizer, flattened out of a generation group.
///
/// `id` is only unique within its generation group. The source authors
/// `generation` as text; the loader converts it to a number. Key casing is
/// mixed in the source (`avatar_url` next to `linkedIn`) and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: String,
    pub name: String,
    pub role: String,
    pub generation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, rename = "linkedIn", skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Singleton recruitment block from the organizers document. A missing
/// block means nobody is recruiting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruitment {
    #[serde(default)]
    pub is_recruiting: bool,
    #[serde(default)]
    pub application_url: String,
    #[serde(default)]
    pub contact_email: String,
}

/// Shaped organizers page data: the flat roster plus the recruitment flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizerBoard {
    pub members: Vec<Organizer>,
    pub recruitment: Recruitment,
}

/// Allow-list entry naming a contributor cleared for the public listing.
///
/// Extra hand-authored fields (for example `contribution_type`) are carried
/// in `extra` so a sync rewrite reproduces the entry untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedContributor {
    pub name: String,
    pub github_username: String,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// A refreshed contributor record. Written only by the contributor-sync
/// job; read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub github_username: String,
    /// Most recent merged pull requests, capped at 3, each `"<title> #<number>"`.
    #[serde(default)]
    pub contributions: Vec<String>,
    pub github_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Category labels for community channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelCategory {
    Forum,
    Chat,
    Social,
    Video,
}

/// One community channel from the channels document. `platform` is free
/// text; the presentation layer matches it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityChannel {
    pub id: String,
    pub name: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub category: ChannelCategory,
    pub url: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
}

/// Authored community counters. Key spellings are the document's own; a
/// missing stats section yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    #[serde(default, rename = "MeetupMembers")]
    pub meetup_members: u32,
    #[serde(default, rename = "openChatMembers")]
    pub open_chat_members: u32,
    #[serde(default, rename = "EventCounts")]
    pub event_counts: u32,
    #[serde(default, rename = "contributors")]
    pub contributors: u32,
    #[serde(default, rename = "studyGroups")]
    pub study_groups: u32,
}

/// Everything one page session needs, loaded once by the aggregate load and
/// handed to consumers as a plain owned value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteData {
    pub events: EventCollections,
    pub organizers: Vec<Organizer>,
    pub recruitment: Recruitment,
    pub contributors: Vec<Contributor>,
    pub channels: Vec<CommunityChannel>,
    pub stats: CommunityStats,
}
