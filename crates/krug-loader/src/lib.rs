//! YAML document loading and shaping for the KRUG site.
//!
//! The loader turns raw document bytes into the typed records in
//! `krug-core`; the shaper derives page-ready structures from them. All
//! shaping is pure and synchronous. Schema validation happens here, at the
//! boundary: a shape mismatch is a `ParseFailure`, never an untyped value
//! leaking deeper into the system.

use std::fmt;

use async_trait::async_trait;
use krug_core::{
    CommunityChannel, CommunityStats, Contributor, Event, EventCollections, Organizer,
    OrganizerBoard, Recruitment, SiteData,
};
use krug_storage::{DocumentStore, HttpClientConfig, HttpFetcher};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Mapping;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const CRATE_NAME: &str = "krug-loader";

/// Logical names for the five documents served out of the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentName {
    Events,
    Organizers,
    Contributors,
    Channels,
    Stats,
}

impl DocumentName {
    pub fn file_name(self) -> &'static str {
        match self {
            DocumentName::Events => "events.yaml",
            DocumentName::Organizers => "organizers.yaml",
            DocumentName::Contributors => "contributors.yaml",
            DocumentName::Channels => "channels.yaml",
            DocumentName::Stats => "stats.yaml",
        }
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source unavailable for {name}: {source}")]
    SourceUnavailable {
        name: DocumentName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("malformed document {name}: {source}")]
    ParseFailure {
        name: DocumentName,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("document {name} failed validation: {message}")]
    Validation { name: DocumentName, message: String },
}

/// Where document bytes come from. The site fetches over HTTP; tests and
/// tooling read straight from a data directory.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, name: DocumentName) -> Result<Vec<u8>, LoadError>;
}

pub struct HttpDocumentSource {
    fetcher: HttpFetcher,
    base_url: String,
    run_id: Uuid,
}

impl HttpDocumentSource {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            run_id: Uuid::new_v4(),
        }
    }

    fn url_for(&self, name: DocumentName) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            name.file_name()
        )
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, name: DocumentName) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(name);
        let response = self
            .fetcher
            .fetch_bytes(self.run_id, name.file_name(), &url)
            .await
            .map_err(|err| LoadError::SourceUnavailable {
                name,
                source: err.into(),
            })?;
        debug!(document = %name, bytes = response.body.len(), "fetched document");
        Ok(response.body)
    }
}

pub struct FileDocumentSource {
    store: DocumentStore,
}

impl FileDocumentSource {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentSource for FileDocumentSource {
    async fn fetch(&self, name: DocumentName) -> Result<Vec<u8>, LoadError> {
        let text = self
            .store
            .read_to_string(name.file_name())
            .await
            .map_err(|err| LoadError::SourceUnavailable {
                name,
                source: err.into(),
            })?;
        Ok(text.into_bytes())
    }
}

/// Loader-side environment configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("KRUG_DATA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173/data".to_string()),
            user_agent: std::env::var("KRUG_USER_AGENT")
                .unwrap_or_else(|_| "krug-site/0.1".to_string()),
            http_timeout_secs: std::env::var("KRUG_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }

    pub fn document_source(&self) -> anyhow::Result<HttpDocumentSource> {
        let fetcher = HttpFetcher::new(HttpClientConfig {
            timeout: std::time::Duration::from_secs(self.http_timeout_secs),
            user_agent: Some(self.user_agent.clone()),
            ..Default::default()
        })?;
        Ok(HttpDocumentSource::new(fetcher, self.base_url.clone()))
    }
}

// ---------------------------------------------------------------------------
// Raw document schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct EventsDoc {
    #[serde(default)]
    upcoming_events: Vec<Event>,
    #[serde(default)]
    past_events: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
struct OrganizersDoc {
    #[serde(default)]
    organizers: Mapping,
    #[serde(default)]
    recruitment: Option<Recruitment>,
}

#[derive(Debug, Default, Deserialize)]
struct ContributorsDoc {
    #[serde(default)]
    contributors: Vec<Contributor>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelsDoc {
    #[serde(default)]
    channels: Vec<CommunityChannel>,
}

#[derive(Debug, Default, Deserialize)]
struct StatsDoc {
    #[serde(default)]
    stats: CommunityStats,
}

fn parse_document<T: DeserializeOwned>(name: DocumentName, bytes: &[u8]) -> Result<T, LoadError> {
    serde_yaml::from_slice(bytes).map_err(|source| LoadError::ParseFailure { name, source })
}

// ---------------------------------------------------------------------------
// Shaper
// ---------------------------------------------------------------------------

/// An organizer as authored in the document, before the generation label is
/// converted from text.
#[derive(Debug, Deserialize)]
struct RawOrganizer {
    id: String,
    name: String,
    role: String,
    generation: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    github: Option<String>,
    #[serde(default, rename = "linkedIn")]
    linked_in: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl RawOrganizer {
    fn into_organizer(self) -> Result<Organizer, LoadError> {
        let generation =
            self.generation
                .trim()
                .parse::<u32>()
                .map_err(|_| LoadError::Validation {
                    name: DocumentName::Organizers,
                    message: format!(
                        "organizer {:?} has non-numeric generation {:?}",
                        self.name, self.generation
                    ),
                })?;
        Ok(Organizer {
            id: self.id,
            name: self.name,
            role: self.role,
            generation,
            avatar_url: self.avatar_url,
            github: self.github,
            linked_in: self.linked_in,
            email: self.email,
        })
    }
}

/// Flatten generation-keyed groups into one sequence, in source order.
///
/// Keys not shaped `generation_<...>` are skipped; members keep their group
/// order and no record is created, dropped, or duplicated. Identifier
/// uniqueness only holds within a group, never across the flat result.
pub fn flatten_organizers(groups: &Mapping) -> Result<Vec<Organizer>, LoadError> {
    let mut flattened = Vec::new();
    for (key, value) in groups {
        let Some(key) = key.as_str() else {
            continue;
        };
        if !key.starts_with("generation_") {
            continue;
        }
        let members: Vec<RawOrganizer> =
            serde_yaml::from_value(value.clone()).map_err(|source| LoadError::ParseFailure {
                name: DocumentName::Organizers,
                source,
            })?;
        for raw in members {
            flattened.push(raw.into_organizer()?);
        }
    }
    Ok(flattened)
}

// ---------------------------------------------------------------------------
// Per-document loads
// ---------------------------------------------------------------------------

/// Events pass through in the source store's own upcoming/past partition.
pub async fn load_events(source: &dyn DocumentSource) -> Result<EventCollections, LoadError> {
    let name = DocumentName::Events;
    let bytes = source.fetch(name).await?;
    let doc: EventsDoc = parse_document(name, &bytes)?;
    Ok(EventCollections {
        upcoming: doc.upcoming_events,
        past: doc.past_events,
    })
}

pub async fn load_organizers(source: &dyn DocumentSource) -> Result<OrganizerBoard, LoadError> {
    let name = DocumentName::Organizers;
    let bytes = source.fetch(name).await?;
    let doc: OrganizersDoc = parse_document(name, &bytes)?;
    Ok(OrganizerBoard {
        members: flatten_organizers(&doc.organizers)?,
        recruitment: doc.recruitment.unwrap_or_default(),
    })
}

pub async fn load_contributors(source: &dyn DocumentSource) -> Result<Vec<Contributor>, LoadError> {
    let name = DocumentName::Contributors;
    let bytes = source.fetch(name).await?;
    let doc: ContributorsDoc = parse_document(name, &bytes)?;
    Ok(doc.contributors)
}

pub async fn load_channels(
    source: &dyn DocumentSource,
) -> Result<Vec<CommunityChannel>, LoadError> {
    let name = DocumentName::Channels;
    let bytes = source.fetch(name).await?;
    let doc: ChannelsDoc = parse_document(name, &bytes)?;
    Ok(doc.channels)
}

pub async fn load_stats(source: &dyn DocumentSource) -> Result<CommunityStats, LoadError> {
    let name = DocumentName::Stats;
    let bytes = source.fetch(name).await?;
    let doc: StatsDoc = parse_document(name, &bytes)?;
    Ok(doc.stats)
}

/// Load all five documents concurrently and shape them into one owned
/// [`SiteData`]. The first failure aborts the whole load; there is no
/// partial-result mode.
pub async fn load_site_data(source: &dyn DocumentSource) -> Result<SiteData, LoadError> {
    let (events, board, contributors, channels, stats) = tokio::try_join!(
        load_events(source),
        load_organizers(source),
        load_contributors(source),
        load_channels(source),
        load_stats(source),
    )?;
    Ok(SiteData {
        events,
        organizers: board.members,
        recruitment: board.recruitment,
        contributors,
        channels,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use krug_core::EventCategory;
    use tempfile::tempdir;

    const ORGANIZERS_YAML: &str = "\
organizers:
  generation_2:
    - id: '1'
      name: 나영
      role: Organizer
      generation: '2'
  generation_1:
    - id: '1'
      name: 가영
      role: Lead Organizer
      generation: '1'
      avatar_url: https://example.com/a.png
      linkedIn: https://linkedin.com/in/ga-yeong
recruitment:
  is_recruiting: true
  application_url: https://example.com/apply
  contact_email: hello@example.com
";

    fn organizers_mapping(text: &str) -> Mapping {
        let doc: OrganizersDoc = serde_yaml::from_str(text).expect("parse organizers");
        doc.organizers
    }

    #[test]
    fn flattening_preserves_every_record_in_source_order() {
        let groups = organizers_mapping(ORGANIZERS_YAML);
        let flat = flatten_organizers(&groups).expect("flatten");

        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].name, "나영");
        assert_eq!(flat[0].generation, 2);
        assert_eq!(flat[1].name, "가영");
        assert_eq!(flat[1].generation, 1);
        assert_eq!(
            flat[1].linked_in.as_deref(),
            Some("https://linkedin.com/in/ga-yeong")
        );
    }

    #[test]
    fn non_generation_keys_are_skipped_by_the_shaper() {
        let groups = organizers_mapping(
            "organizers:\n  advisors:\n    - note: not a generation\n  generation_1:\n    - id: '1'\n      name: 가영\n      role: Organizer\n      generation: '1'\n",
        );
        let flat = flatten_organizers(&groups).expect("flatten");
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].name, "가영");
    }

    #[test]
    fn non_numeric_generation_fails_validation() {
        let groups = organizers_mapping(
            "organizers:\n  generation_1:\n    - id: '1'\n      name: 가영\n      role: Organizer\n      generation: 'first'\n",
        );
        let err = flatten_organizers(&groups).expect_err("must fail");
        assert!(matches!(
            err,
            LoadError::Validation {
                name: DocumentName::Organizers,
                ..
            }
        ));
    }

    #[test]
    fn events_parse_with_category_and_optional_urls() {
        let doc: EventsDoc = serde_yaml::from_str(
            "upcoming_events:\n  - id: ev-1\n    title: 정기 밋업\n    description: 분기 모임\n    date: '2026-09-12'\n    location: 서울\n    type: meetup\n    registrationUrl: https://example.com/register\npast_events: []\n",
        )
        .expect("parse events");

        assert_eq!(doc.upcoming_events.len(), 1);
        assert_eq!(doc.upcoming_events[0].category, EventCategory::Meetup);
        assert_eq!(
            doc.upcoming_events[0].registration_url.as_deref(),
            Some("https://example.com/register")
        );
        assert!(doc.upcoming_events[0].video_url.is_none());
        assert!(doc.past_events.is_empty());
    }

    #[test]
    fn missing_stats_section_defaults_to_zero_counters() {
        let doc: StatsDoc = serde_yaml::from_str("{}").expect("parse empty stats");
        assert_eq!(doc.stats.meetup_members, 0);
        assert_eq!(doc.stats.study_groups, 0);

        let doc: StatsDoc = serde_yaml::from_str(
            "stats:\n  MeetupMembers: 1200\n  openChatMembers: 430\n  EventCounts: 18\n  contributors: 24\n  studyGroups: 5\n",
        )
        .expect("parse stats");
        assert_eq!(doc.stats.meetup_members, 1200);
        assert_eq!(doc.stats.open_chat_members, 430);
        assert_eq!(doc.stats.event_counts, 18);
        assert_eq!(doc.stats.contributors, 24);
        assert_eq!(doc.stats.study_groups, 5);
    }

    fn write_fixture_documents(store: &DocumentStore, include_channels: bool) {
        store
            .replace_blocking("events.yaml", b"upcoming_events: []\npast_events: []\n")
            .expect("events");
        store
            .replace_blocking("organizers.yaml", ORGANIZERS_YAML.as_bytes())
            .expect("organizers");
        store
            .replace_blocking(
                "contributors.yaml",
                b"approvedContributors:\n  - name: Ga-yeong\n    githubUsername: gayeong\ncontributors:\n  - name: Ga-yeong\n    githubUsername: gayeong\n    contributions: []\n    githubUrl: https://github.com/gayeong\n    prCount: 0\n",
            )
            .expect("contributors");
        if include_channels {
            store
                .replace_blocking(
                    "channels.yaml",
                    "channels:\n  - id: ch-1\n    name: Slack\n    platform: Slack\n    type: chat\n    url: https://example.com/slack\n    description: 일상 대화\n    memberCount: 900\n"
                        .as_bytes(),
                )
                .expect("channels");
        }
        store
            .replace_blocking("stats.yaml", b"stats:\n  MeetupMembers: 100\n")
            .expect("stats");
    }

    #[tokio::test]
    async fn aggregate_load_shapes_all_documents() {
        let dir = tempdir().expect("tempdir");
        let store = DocumentStore::new(dir.path());
        write_fixture_documents(&store, true);

        let source = FileDocumentSource::new(store);
        let data = load_site_data(&source).await.expect("load");

        assert_eq!(data.organizers.len(), 2);
        assert!(data.recruitment.is_recruiting);
        assert_eq!(data.contributors.len(), 1);
        assert_eq!(data.contributors[0].pr_count, Some(0));
        assert_eq!(data.channels.len(), 1);
        assert_eq!(data.stats.meetup_members, 100);
        assert!(data.events.upcoming.is_empty());
    }

    #[tokio::test]
    async fn aggregate_load_fails_fast_when_one_document_is_missing() {
        let dir = tempdir().expect("tempdir");
        let store = DocumentStore::new(dir.path());
        write_fixture_documents(&store, false);

        let source = FileDocumentSource::new(store);
        let err = load_site_data(&source).await.expect_err("must fail");
        assert!(matches!(
            err,
            LoadError::SourceUnavailable {
                name: DocumentName::Channels,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_yaml_is_a_parse_failure() {
        let dir = tempdir().expect("tempdir");
        let store = DocumentStore::new(dir.path());
        store
            .replace_blocking("events.yaml", b"upcoming_events: [unterminated\n")
            .expect("events");

        let source = FileDocumentSource::new(store);
        let err = load_events(&source).await.expect_err("must fail");
        assert!(matches!(
            err,
            LoadError::ParseFailure {
                name: DocumentName::Events,
                ..
            }
        ));
    }

    #[test]
    fn missing_recruitment_defaults_to_not_recruiting() {
        let doc: OrganizersDoc =
            serde_yaml::from_str("organizers: {}\n").expect("parse organizers");
        let recruitment = doc.recruitment.unwrap_or_default();
        assert!(!recruitment.is_recruiting);
        assert!(recruitment.application_url.is_empty());
        assert!(recruitment.contact_email.is_empty());
    }
}
