//! Maintenance batch jobs that rewrite the site's source documents.
//!
//! Two human-invoked jobs live here. The contributor sync queries the
//! GitHub search API for each allow-listed contributor and replaces the
//! contributors document with refreshed records. The organizer sort
//! re-orders the organizers document by generation and Hangul name order,
//! renumbering ids as it goes. Neither job runs as part of the site's
//! load path.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use krug_core::{ApprovedContributor, Contributor};
use krug_storage::{DocumentStore, HttpClientConfig, HttpFetcher, TokenBucketConfig};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

pub const CRATE_NAME: &str = "krug-sync";

/// Upstream project whose merged pull requests count as contributions.
pub const UPSTREAM_REPO: &str = "apache/airflow";

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Store file names the two jobs operate on.
pub const CONTRIBUTORS_FILE: &str = "contributors.yaml";
pub const ORGANIZERS_FILE: &str = "organizers.yaml";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub data_dir: PathBuf,
    pub github_token: Option<String>,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("KRUG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            github_token: std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            user_agent: std::env::var("KRUG_USER_AGENT")
                .unwrap_or_else(|_| "airflow-krug-contributor-updater".to_string()),
            http_timeout_secs: std::env::var("KRUG_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            max_concurrent_fetches: std::env::var("KRUG_MAX_CONCURRENT_FETCHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
        }
    }
}

// ---------------------------------------------------------------------------
// GitHub client
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<PullRequestItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestItem {
    pub title: String,
    pub number: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
}

/// Thin client over the two GitHub endpoints the sync needs. The bearer
/// credential is optional; without it the API serves degraded rate limits.
pub struct GithubClient {
    fetcher: HttpFetcher,
    run_id: Uuid,
}

impl GithubClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let mut default_headers = vec![(
            "accept".to_string(),
            "application/vnd.github.v3+json".to_string(),
        )];
        if let Some(token) = &config.github_token {
            default_headers.push(("authorization".to_string(), format!("token {token}")));
        }

        let fetcher = HttpFetcher::new(HttpClientConfig {
            timeout: Duration::from_secs(config.http_timeout_secs),
            user_agent: Some(config.user_agent.clone()),
            default_headers,
            max_concurrent_requests: config.max_concurrent_fetches.max(1),
            token_bucket: Some(TokenBucketConfig {
                capacity: 5,
                refill_every: Duration::from_secs(1),
            }),
            ..Default::default()
        })?;

        Ok(Self {
            fetcher,
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Merged pull requests authored by `username` against
    /// [`UPSTREAM_REPO`], most recent first. One page of up to 100 items.
    pub async fn merged_pull_requests(&self, username: &str) -> Result<Vec<PullRequestItem>> {
        let url = format!(
            "{GITHUB_API_BASE}/search/issues?q=repo:{UPSTREAM_REPO}+type:pr+author:{username}+is:merged&sort=created&order=desc&per_page=100"
        );
        let response = self
            .fetcher
            .fetch_bytes(self.run_id, "github-search", &url)
            .await
            .with_context(|| format!("searching merged pull requests for {username}"))?;
        let parsed: SearchResponse = serde_json::from_slice(&response.body)
            .with_context(|| format!("parsing search response for {username}"))?;
        Ok(parsed.items)
    }

    /// Public profile lookup used for the display name. Callers fall back
    /// to the username when this fails.
    pub async fn user_profile(&self, username: &str) -> Result<UserProfile> {
        let url = format!("{GITHUB_API_BASE}/users/{username}");
        let response = self
            .fetcher
            .fetch_bytes(self.run_id, "github-users", &url)
            .await
            .with_context(|| format!("fetching profile for {username}"))?;
        serde_json::from_slice(&response.body)
            .with_context(|| format!("parsing profile response for {username}"))
    }
}

// ---------------------------------------------------------------------------
// Contributor sync
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ContributorSyncSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub approved: usize,
    pub refreshed: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ApprovedSection {
    #[serde(default, rename = "approvedContributors")]
    approved_contributors: Vec<ApprovedContributor>,
}

#[derive(Debug, Serialize)]
struct ContributorsDocOut<'a> {
    #[serde(rename = "approvedContributors")]
    approved_contributors: &'a [ApprovedContributor],
    contributors: &'a [Contributor],
}

/// First three merged PR titles, each suffixed with its reference number.
fn contribution_lines(items: &[PullRequestItem]) -> Vec<String> {
    items
        .iter()
        .take(3)
        .map(|item| format!("{} #{}", item.title, item.number))
        .collect()
}

fn build_contributor(
    username: &str,
    display_name: String,
    items: &[PullRequestItem],
    now: DateTime<Utc>,
) -> Contributor {
    Contributor {
        id: None,
        name: display_name,
        github_username: username.to_string(),
        contributions: contribution_lines(items),
        github_url: format!("https://github.com/{username}"),
        avatar_url: None,
        pr_count: Some(items.len() as u32),
        last_updated: Some(now),
    }
}

/// Refresh one allow-list entry. A failed search query skips the entry; a
/// failed profile lookup only loses the display name. Zero search results
/// is a success, not a failure.
async fn refresh_contributor(
    github: &GithubClient,
    entry: &ApprovedContributor,
) -> Option<Contributor> {
    let username = entry.github_username.as_str();
    let items = match github.merged_pull_requests(username).await {
        Ok(items) => items,
        Err(err) => {
            warn!(username, error = %err, "search query failed; skipping contributor");
            return None;
        }
    };

    let display_name = match github.user_profile(username).await {
        Ok(profile) => profile.name.unwrap_or_else(|| username.to_string()),
        Err(err) => {
            warn!(username, error = %err, "profile lookup failed; falling back to username");
            username.to_string()
        }
    };

    Some(build_contributor(username, display_name, &items, Utc::now()))
}

/// Render the full replacement document: the regenerated header comment
/// with a fresh timestamp, one blank line, then the original allow-list
/// and the refreshed contributor records.
fn render_contributors_document(
    approved: &[ApprovedContributor],
    contributors: &[Contributor],
    stamped_at: DateTime<Utc>,
) -> Result<String> {
    let body = serde_yaml::to_string(&ContributorsDocOut {
        approved_contributors: approved,
        contributors,
    })
    .context("serializing contributors document")?;
    let stamp = stamped_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    Ok(format!(
        "# Apache Airflow 한국인 기여자 정보\n# - contribution_type: code, docs, community, translation 등\n# - 본인 동의하에만 추가\n# - 자동 업데이트: {stamp}\n\n{body}"
    ))
}

pub struct ContributorSync {
    config: SyncConfig,
    store: DocumentStore,
    github: Arc<GithubClient>,
}

impl ContributorSync {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let store = DocumentStore::new(config.data_dir.clone());
        let github = Arc::new(GithubClient::new(&config)?);
        Ok(Self {
            config,
            store,
            github,
        })
    }

    /// One full sync pass: read the allow-list, refresh every entry
    /// concurrently, merge, and replace the document. Per-entry failures
    /// are isolated; only an unreadable document or a failed write is
    /// fatal.
    pub async fn run_once(&self) -> Result<ContributorSyncSummary> {
        let started_at = Utc::now();
        if self.config.github_token.is_none() {
            warn!("GITHUB_TOKEN not set; unauthenticated GitHub API rate limits apply");
        }

        let text = self
            .store
            .read_to_string(CONTRIBUTORS_FILE)
            .await
            .context("reading contributors document")?;
        let section: ApprovedSection =
            serde_yaml::from_str(&text).context("parsing contributors document")?;
        let approved = section.approved_contributors;
        info!(count = approved.len(), "loaded approved contributors");

        let mut join_set = JoinSet::new();
        for (index, entry) in approved.iter().cloned().enumerate() {
            let github = Arc::clone(&self.github);
            join_set.spawn(async move {
                let refreshed = refresh_contributor(&github, &entry).await;
                (index, refreshed)
            });
        }

        let mut slots: Vec<Option<Contributor>> = vec![None; approved.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, refreshed) = joined.context("contributor refresh task panicked")?;
            slots[index] = refreshed;
        }
        let contributors: Vec<Contributor> = slots.into_iter().flatten().collect();
        let skipped = approved.len() - contributors.len();
        info!(
            refreshed = contributors.len(),
            skipped, "merged contributor records"
        );

        let rendered = render_contributors_document(&approved, &contributors, Utc::now())?;
        self.store
            .replace(CONTRIBUTORS_FILE, rendered.as_bytes())
            .await
            .context("writing contributors document")?;

        Ok(ContributorSyncSummary {
            run_id: self.github.run_id(),
            started_at,
            finished_at: Utc::now(),
            approved: approved.len(),
            refreshed: contributors.len(),
            skipped,
        })
    }
}

// ---------------------------------------------------------------------------
// Organizer sort
// ---------------------------------------------------------------------------

/// Dictionary-order comparison for Hangul names.
///
/// Names can arrive as decomposed jamo sequences, which a plain code point
/// sort misorders; the ICU collator normalizes and applies the Korean
/// tailoring.
pub struct KoreanCollator {
    collator: Collator,
}

impl KoreanCollator {
    pub fn new() -> Result<Self> {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        let collator = Collator::try_new(&locale!("ko").into(), options)
            .map_err(|err| anyhow::anyhow!("building Korean collator: {err}"))?;
        Ok(Self { collator })
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}

/// Member count per generation group, for the job's console report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCount {
    pub key: String,
    pub members: usize,
}

/// Outcome of one sort pass over the document text.
#[derive(Debug)]
pub enum SortOutcome {
    /// Document rewritten; generation groups listed in their new order.
    Sorted {
        text: String,
        generations: Vec<GenerationCount>,
    },
    /// No organizers section; the document is left untouched.
    NoOrganizersSection,
}

fn mapping_entry<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

fn generation_number(key: &str) -> Option<u64> {
    key.strip_prefix("generation_")?.parse().ok()
}

/// Leading contiguous run of comment lines plus at most one following
/// blank line, captured verbatim. The YAML parser would discard these, so
/// they are replayed in front of the rewritten body.
fn capture_header(lines: &[&str]) -> Vec<String> {
    let mut header = Vec::new();
    let mut index = 0;
    while index < lines.len() && lines[index].trim_start().starts_with('#') {
        header.push(lines[index].to_string());
        index += 1;
    }
    if index < lines.len() && lines[index].trim().is_empty() {
        header.push(String::new());
    }
    header
}

fn sort_generation_members(
    group: &str,
    members: Vec<Value>,
    collator: &KoreanCollator,
) -> Result<Vec<Value>> {
    let mut named: Vec<(String, Value)> = Vec::with_capacity(members.len());
    for member in members {
        let name = member
            .as_mapping()
            .and_then(|map| mapping_entry(map, "name"))
            .and_then(Value::as_str)
            .with_context(|| format!("organizer in {group} is missing a name"))?
            .to_string();
        named.push((name, member));
    }

    named.sort_by(|a, b| collator.compare(&a.0, &b.0));

    let mut sorted = Vec::with_capacity(named.len());
    for (index, (_, mut member)) in named.into_iter().enumerate() {
        if let Value::Mapping(map) = &mut member {
            map.insert(Value::from("id"), Value::from((index + 1).to_string()));
        }
        sorted.push(member);
    }
    Ok(sorted)
}

/// Pure text-to-text sort pass.
///
/// Generation keys are re-ordered by descending generation number; members
/// inside each group are sorted by name under the Korean collator and
/// renumbered `"1".."N"`. Keys under `organizers` that are not generation
/// groups keep their relative order after the groups; every other
/// top-level key keeps its position.
pub fn sort_organizers_text(text: &str, collator: &KoreanCollator) -> Result<SortOutcome> {
    let lines: Vec<&str> = text.lines().collect();
    let header = capture_header(&lines);

    let root: Value = serde_yaml::from_str(text).context("parsing organizers document")?;
    let Some(doc) = root.as_mapping() else {
        return Ok(SortOutcome::NoOrganizersSection);
    };
    let Some(organizers) = mapping_entry(doc, "organizers").and_then(Value::as_mapping) else {
        return Ok(SortOutcome::NoOrganizersSection);
    };

    let mut generation_groups: Vec<(String, u64, Value)> = Vec::new();
    let mut passthrough: Vec<(Value, Value)> = Vec::new();
    for (key, value) in organizers {
        match key.as_str().and_then(generation_number) {
            Some(number) => generation_groups.push((
                key.as_str().unwrap_or_default().to_string(),
                number,
                value.clone(),
            )),
            None => passthrough.push((key.clone(), value.clone())),
        }
    }
    generation_groups.sort_by(|a, b| b.1.cmp(&a.1));

    let mut rebuilt = Mapping::new();
    let mut generations = Vec::with_capacity(generation_groups.len());
    for (key, _number, value) in generation_groups {
        let value = match value {
            Value::Sequence(members) => {
                let sorted = sort_generation_members(&key, members, collator)?;
                generations.push(GenerationCount {
                    key: key.clone(),
                    members: sorted.len(),
                });
                Value::Sequence(sorted)
            }
            other => {
                generations.push(GenerationCount {
                    key: key.clone(),
                    members: 0,
                });
                other
            }
        };
        rebuilt.insert(Value::from(key), value);
    }
    for (key, value) in passthrough {
        rebuilt.insert(key, value);
    }

    let mut out_doc = doc.clone();
    out_doc.insert(Value::from("organizers"), Value::Mapping(rebuilt));

    let body = serde_yaml::to_string(&out_doc).context("serializing organizers document")?;
    let text = if header.is_empty() {
        body
    } else {
        format!("{}\n{}", header.join("\n"), body)
    };

    Ok(SortOutcome::Sorted { text, generations })
}

/// Sort the organizers document in place: one read, one atomic write, and
/// the write only happens after every step has succeeded. Entirely
/// synchronous; not safe for concurrent invocation against the same
/// document.
pub fn sort_organizers_file(store: &DocumentStore, name: &str) -> Result<SortOutcome> {
    let text = store.read_to_string_blocking(name)?;
    let collator = KoreanCollator::new()?;
    let outcome = sort_organizers_text(&text, &collator)?;
    if let SortOutcome::Sorted { text, .. } = &outcome {
        store.replace_blocking(name, text.as_bytes())?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn collator() -> KoreanCollator {
        KoreanCollator::new().expect("collator")
    }

    fn mk_item(title: &str, number: u64) -> PullRequestItem {
        PullRequestItem {
            title: title.to_string(),
            number,
        }
    }

    #[test]
    fn contributions_are_capped_at_three_with_reference_numbers() {
        let items = vec![
            mk_item("Fix scheduler race", 410),
            mk_item("Add provider docs", 398),
            mk_item("Bump minimum version", 377),
            mk_item("Older change", 120),
        ];
        let lines = contribution_lines(&items);
        assert_eq!(
            lines,
            vec![
                "Fix scheduler race #410",
                "Add provider docs #398",
                "Bump minimum version #377",
            ]
        );
    }

    #[test]
    fn zero_search_results_still_produce_a_record() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).single().unwrap();
        let contributor = build_contributor("gayeong", "가영".to_string(), &[], now);
        assert!(contributor.contributions.is_empty());
        assert_eq!(contributor.pr_count, Some(0));
        assert_eq!(contributor.github_url, "https://github.com/gayeong");
        assert_eq!(contributor.last_updated, Some(now));
    }

    #[test]
    fn search_response_parses_titles_and_numbers() {
        let body = r#"{
            "total_count": 2,
            "items": [
                {"title": "Fix scheduler race", "number": 410, "state": "closed"},
                {"title": "Add provider docs", "number": 398, "state": "closed"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0], mk_item("Fix scheduler race", 410));
    }

    #[test]
    fn rendered_document_keeps_the_allow_list_intact() {
        let mut extra = Mapping::new();
        extra.insert(Value::from("contribution_type"), Value::from("code"));
        let approved = vec![
            ApprovedContributor {
                name: "가영".to_string(),
                github_username: "gayeong".to_string(),
                extra,
            },
            ApprovedContributor {
                name: "나영".to_string(),
                github_username: "nayoung".to_string(),
                extra: Mapping::new(),
            },
        ];
        // Only one entry refreshed; the other's query failed.
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).single().unwrap();
        let contributors = vec![build_contributor(
            "gayeong",
            "가영".to_string(),
            &[mk_item("Fix scheduler race", 410)],
            now,
        )];

        let rendered = render_contributors_document(&approved, &contributors, now).expect("render");

        assert!(rendered.starts_with("# Apache Airflow 한국인 기여자 정보\n"));
        assert!(rendered.contains("# - 자동 업데이트: 2026-08-05T12:00:00.000Z\n"));
        assert!(rendered.contains("\n\napprovedContributors:"));

        let reparsed: ApprovedSection = serde_yaml::from_str(&rendered).expect("reparse");
        assert_eq!(reparsed.approved_contributors, approved);

        // The failed entry stays on the allow-list but gets no record.
        assert!(rendered.contains("githubUsername: gayeong"));
        assert!(!rendered.contains("githubUrl: https://github.com/nayoung"));
    }

    #[test]
    fn korean_collation_orders_by_dictionary_not_code_points() {
        let collator = collator();
        assert_eq!(collator.compare("가영", "나영"), Ordering::Less);
        // Decomposed jamo compare equal to their composed form.
        assert_eq!(
            collator.compare("\u{1100}\u{1161}\u{110B}\u{1167}\u{11BC}", "가영"),
            Ordering::Equal
        );
        // ...and sort into the same dictionary position.
        assert_eq!(
            collator.compare("\u{1100}\u{1161}\u{110B}\u{1167}\u{11BC}", "나영"),
            Ordering::Less
        );
    }

    const UNSORTED: &str = "\
# 운영진 명단
# 수정 후에는 정렬 스크립트를 실행할 것

organizers:
  generation_1:
    - id: '9'
      name: 다은
      role: Organizer
      generation: '1'
  generation_2:
    - id: '7'
      name: 나영
      role: Organizer
      generation: '2'
    - id: '3'
      name: 가영
      role: Lead Organizer
      generation: '2'
recruitment:
  is_recruiting: false
  application_url: ''
  contact_email: hello@example.com
";

    fn sorted_text(input: &str) -> String {
        match sort_organizers_text(input, &collator()).expect("sort") {
            SortOutcome::Sorted { text, .. } => text,
            SortOutcome::NoOrganizersSection => panic!("expected a sorted document"),
        }
    }

    #[test]
    fn generations_descend_and_names_sort_in_dictionary_order() {
        let text = sorted_text(UNSORTED);

        let gen2 = text.find("generation_2:").expect("generation_2");
        let gen1 = text.find("generation_1:").expect("generation_1");
        assert!(gen2 < gen1);

        let ga = text.find("name: 가영").expect("가영");
        let na = text.find("name: 나영").expect("나영");
        assert!(ga < na);
    }

    #[test]
    fn identifiers_are_renumbered_contiguously_in_sort_order() {
        let text = sorted_text(UNSORTED);
        let root: Value = serde_yaml::from_str(&text).expect("reparse");
        let organizers = root
            .as_mapping()
            .and_then(|doc| mapping_entry(doc, "organizers"))
            .and_then(Value::as_mapping)
            .expect("organizers mapping");

        let gen2 = mapping_entry(organizers, "generation_2")
            .and_then(Value::as_sequence)
            .expect("generation_2");
        let ids: Vec<&str> = gen2
            .iter()
            .map(|member| {
                member
                    .as_mapping()
                    .and_then(|map| mapping_entry(map, "id"))
                    .and_then(Value::as_str)
                    .expect("id")
            })
            .collect();
        assert_eq!(ids, vec!["1", "2"]);

        let names: Vec<&str> = gen2
            .iter()
            .map(|member| {
                member
                    .as_mapping()
                    .and_then(|map| mapping_entry(map, "name"))
                    .and_then(Value::as_str)
                    .expect("name")
            })
            .collect();
        assert_eq!(names, vec!["가영", "나영"]);
    }

    #[test]
    fn header_block_is_replayed_verbatim() {
        let text = sorted_text(UNSORTED);
        assert!(text.starts_with(
            "# 운영진 명단\n# 수정 후에는 정렬 스크립트를 실행할 것\n\norganizers:"
        ));
    }

    #[test]
    fn sorting_twice_is_byte_identical() {
        let first = sorted_text(UNSORTED);
        let second = sorted_text(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn other_top_level_and_non_generation_keys_survive() {
        let input = "\
organizers:
  advisors:
    - name: 자문
  generation_1:
    - id: '1'
      name: 가영
      role: Organizer
      generation: '1'
recruitment:
  is_recruiting: true
  application_url: https://example.com/apply
  contact_email: hello@example.com
";
        let text = sorted_text(input);
        assert!(text.contains("advisors:"));
        assert!(text.contains("recruitment:"));
        let gen1 = text.find("generation_1:").expect("generation_1");
        let advisors = text.find("advisors:").expect("advisors");
        assert!(gen1 < advisors);
    }

    #[test]
    fn missing_organizers_section_is_a_no_op() {
        let outcome =
            sort_organizers_text("recruitment:\n  is_recruiting: false\n", &collator())
                .expect("sort");
        assert!(matches!(outcome, SortOutcome::NoOrganizersSection));
    }

    #[test]
    fn missing_member_name_aborts_without_output() {
        let input = "organizers:\n  generation_1:\n    - id: '1'\n      role: Organizer\n";
        assert!(sort_organizers_text(input, &collator()).is_err());
    }

    #[test]
    fn file_pass_sorts_in_place_and_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let store = DocumentStore::new(dir.path());
        store
            .replace_blocking(ORGANIZERS_FILE, UNSORTED.as_bytes())
            .expect("seed document");

        let outcome = sort_organizers_file(&store, ORGANIZERS_FILE).expect("first pass");
        assert!(matches!(outcome, SortOutcome::Sorted { .. }));
        let first = store
            .read_to_string_blocking(ORGANIZERS_FILE)
            .expect("read back");

        sort_organizers_file(&store, ORGANIZERS_FILE).expect("second pass");
        let second = store
            .read_to_string_blocking(ORGANIZERS_FILE)
            .expect("read back");
        assert_eq!(first, second);
        assert!(first.starts_with("# 운영진 명단\n"));
    }

    #[test]
    fn generation_counts_report_the_new_order() {
        match sort_organizers_text(UNSORTED, &collator()).expect("sort") {
            SortOutcome::Sorted { generations, .. } => {
                assert_eq!(
                    generations,
                    vec![
                        GenerationCount {
                            key: "generation_2".to_string(),
                            members: 2,
                        },
                        GenerationCount {
                            key: "generation_1".to_string(),
                            members: 1,
                        },
                    ]
                );
            }
            SortOutcome::NoOrganizersSection => panic!("expected a sorted document"),
        }
    }
}
