use readme_sync_core::config::SyncConfig;
use readme_sync_core::contract::{
    Category, EntryKind, HostError, MockDocHost, MockRepoSource, RemoteDoc, RepoEntry, RepoFile,
    SourceError,
};
use readme_sync_core::document::{fingerprint, render_footer};
use readme_sync_core::synchronise::{
    decide, synchronise, DocOutcome, DocSyncError, SyncAction, SyncError,
};
use serde_json::json;

const HTML_URL: &str = "https://github.com/acme/docs/blob/refs/heads/main/guide.md";

fn config() -> SyncConfig {
    SyncConfig {
        repo: "acme/docs".to_string(),
        path: String::new(),
    }
}

fn markdown(title: &str, category: &str, body: &str) -> String {
    format!("---\ntitle: {title}\ncategory: {category}\n---\n{body}\n")
}

fn entry(path: &str) -> RepoEntry {
    RepoEntry {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        kind: EntryKind::File,
    }
}

fn repo_file(path: &str, content: &str) -> RepoFile {
    RepoFile {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        content: content.to_string(),
        html_url: HTML_URL.to_string(),
    }
}

/// A source serving exactly the given (path, content) files from the root.
fn source_with_files(files: Vec<(&'static str, String)>) -> MockRepoSource {
    let mut source = MockRepoSource::new();
    let entries: Vec<RepoEntry> = files.iter().map(|(path, _)| entry(path)).collect();
    source
        .expect_list_dir()
        .times(1)
        .return_once(move |_| Ok(entries));
    for (path, content) in files {
        source
            .expect_get_file()
            .withf(move |p: &str| p == path)
            .times(1)
            .return_once(move |_| Ok(repo_file(path, &content)));
    }
    source
}

fn getting_started() -> Category {
    Category {
        id: "cat-1".to_string(),
    }
}

#[test]
fn decide_creates_when_no_remote_doc_exists() {
    assert_eq!(decide(None, "abc"), SyncAction::Create);
}

#[test]
fn decide_is_a_no_op_when_hashes_match() {
    let remote: RemoteDoc = serde_json::from_value(json!({
        "slug": "acme-docs-guide",
        "lastUpdatedHash": "abc",
    }))
    .unwrap();
    assert_eq!(decide(Some(remote), "abc"), SyncAction::Unchanged);
}

#[test]
fn decide_updates_when_hash_differs_or_is_absent() {
    let stale: RemoteDoc = serde_json::from_value(json!({
        "slug": "acme-docs-guide",
        "lastUpdatedHash": "old",
    }))
    .unwrap();
    assert!(matches!(decide(Some(stale), "new"), SyncAction::Update(_)));

    // A remote doc that predates hash tracking must still be updated.
    let unhashed: RemoteDoc =
        serde_json::from_value(json!({ "slug": "acme-docs-guide" })).unwrap();
    assert!(matches!(decide(Some(unhashed), "new"), SyncAction::Update(_)));
}

#[tokio::test]
async fn missing_front_matter_is_skipped_without_host_calls() {
    let source = source_with_files(vec![("guide.md", "# No front-matter here\n".to_string())]);
    // No expectations: any host call panics the branch and fails the test.
    let host = MockDocHost::new();

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert!(
        matches!(&report.docs[0].outcome, DocOutcome::Skipped { reason } if reason.contains("front-matter")),
        "outcome should say why the file was skipped, got: {:?}",
        report.docs[0].outcome
    );
    assert!(report.first_failure().is_none());
}

#[tokio::test]
async fn new_document_is_created_never_updated() {
    let content = markdown("Guide", "Getting Started", "Hello");
    let full = format!("{}{}", content, render_footer(HTML_URL));
    let expected_hash = fingerprint(&full);

    let source = source_with_files(vec![("guide.md", content)]);

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .withf(|lookup: &str| lookup == "getting-started")
        .times(1)
        .return_once(|_| Ok(Some(getting_started())));
    host.expect_get_doc()
        .withf(|slug: &str| slug == "acme-docs-guide")
        .times(1)
        .return_once(|_| Ok(None));
    host.expect_create_doc()
        .withf(move |payload| {
            payload["slug"] == "acme-docs-guide"
                && payload["title"] == "Guide"
                && payload["category"] == "cat-1"
                && payload["lastUpdatedHash"] == expected_hash.as_str()
                && payload["body"]
                    .as_str()
                    .is_some_and(|body| body.starts_with("Hello") && body.contains("***"))
        })
        .times(1)
        .return_once(|_| Ok(()));
    // expect_update_doc is deliberately absent: an update call must panic.

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.created(), 1);
    assert_eq!(report.updated(), 0);
    assert_eq!(report.docs[0].slug.as_deref(), Some("acme-docs-guide"));
    assert!(matches!(report.docs[0].outcome, DocOutcome::Created));
}

#[tokio::test]
async fn unchanged_document_issues_no_write() {
    let content = markdown("Guide", "Getting Started", "Hello");
    let full = format!("{}{}", content, render_footer(HTML_URL));
    let stored_hash = fingerprint(&full);

    let source = source_with_files(vec![("guide.md", content)]);

    let remote: RemoteDoc = serde_json::from_value(json!({
        "slug": "acme-docs-guide",
        "lastUpdatedHash": stored_hash,
        "_id": "doc-1",
    }))
    .unwrap();

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .times(1)
        .return_once(|_| Ok(Some(getting_started())));
    host.expect_get_doc()
        .times(1)
        .return_once(move |_| Ok(Some(remote)));
    // Neither create_doc nor update_doc may be called.

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.unchanged(), 1);
    assert_eq!(report.created() + report.updated() + report.failed(), 0);
}

#[tokio::test]
async fn changed_document_is_updated_with_remote_fields_carried() {
    let content = markdown("Guide", "Getting Started", "Fresh body");
    let full = format!("{}{}", content, render_footer(HTML_URL));
    let expected_hash = fingerprint(&full);

    let source = source_with_files(vec![("guide.md", content)]);

    let remote: RemoteDoc = serde_json::from_value(json!({
        "slug": "acme-docs-guide",
        "lastUpdatedHash": "stale",
        "_id": "doc-1",
        "version": "1.0",
        "body": "old body",
    }))
    .unwrap();

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .times(1)
        .return_once(|_| Ok(Some(getting_started())));
    host.expect_get_doc()
        .times(1)
        .return_once(move |_| Ok(Some(remote)));
    host.expect_update_doc()
        .withf(move |slug: &str, payload| {
            slug == "acme-docs-guide"
                && payload["_id"] == "doc-1"
                && payload["version"] == "1.0"
                && payload["lastUpdatedHash"] == expected_hash.as_str()
                && payload["body"]
                    .as_str()
                    .is_some_and(|body| body.starts_with("Fresh body"))
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.updated(), 1);
    assert!(matches!(report.docs[0].outcome, DocOutcome::Updated));
}

#[tokio::test]
async fn category_not_found_fails_the_document_but_not_siblings() {
    let source = source_with_files(vec![
        ("bad.md", markdown("Bad", "Missing Category", "Hello")),
        ("good.md", markdown("Good", "Getting Started", "Hello")),
    ]);

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .withf(|lookup: &str| lookup == "missing-category")
        .times(1)
        .return_once(|_| Ok(None));
    host.expect_get_category()
        .withf(|lookup: &str| lookup == "getting-started")
        .times(1)
        .return_once(|_| Ok(Some(getting_started())));
    host.expect_get_doc().times(1).return_once(|_| Ok(None));
    host.expect_create_doc()
        .withf(|payload| payload["slug"] == "acme-docs-good")
        .times(1)
        .return_once(|_| Ok(()));

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1, "the sibling must still be synced");

    let (doc, err) = report.first_failure().expect("one branch failed");
    assert_eq!(doc.path, "bad.md");
    assert!(
        matches!(err, DocSyncError::CategoryNotFound { name, lookup }
            if name == "Missing Category" && lookup == "missing-category"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn validation_error_fails_only_that_document() {
    let source = source_with_files(vec![
        ("bad.md", markdown("Bad", "Getting Started", "Hello")),
        ("good.md", markdown("Good", "Getting Started", "Hello")),
    ]);

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .times(2)
        .returning(|_| Ok(Some(getting_started())));
    host.expect_get_doc().times(2).returning(|_| Ok(None));
    host.expect_create_doc()
        .withf(|payload| payload["slug"] == "acme-docs-bad")
        .times(1)
        .return_once(|_| {
            Err(HostError::Validation {
                status: 400,
                message: "slug rejected".to_string(),
            })
        });
    host.expect_create_doc()
        .withf(|payload| payload["slug"] == "acme-docs-good")
        .times(1)
        .return_once(|_| Ok(()));

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);

    let (doc, err) = report.first_failure().expect("one branch failed");
    assert_eq!(doc.path, "bad.md", "first failure follows discovery order");
    assert!(
        matches!(err, DocSyncError::Host(HostError::Validation { status: 400, .. })),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn identical_content_gets_distinct_slugs_and_independent_creates() {
    let content = markdown("Guide", "Getting Started", "Hello");
    let full = format!("{}{}", content, render_footer(HTML_URL));
    let shared_hash = fingerprint(&full);

    let source = source_with_files(vec![
        ("guide.md", content.clone()),
        ("copy.md", content),
    ]);

    let hash_for_guide = shared_hash.clone();
    let hash_for_copy = shared_hash;

    let mut host = MockDocHost::new();
    host.expect_get_category()
        .times(2)
        .returning(|_| Ok(Some(getting_started())));
    host.expect_get_doc().times(2).returning(|_| Ok(None));
    host.expect_create_doc()
        .withf(move |payload| {
            payload["slug"] == "acme-docs-guide"
                && payload["lastUpdatedHash"] == hash_for_guide.as_str()
        })
        .times(1)
        .return_once(|_| Ok(()));
    host.expect_create_doc()
        .withf(move |payload| {
            payload["slug"] == "acme-docs-copy"
                && payload["lastUpdatedHash"] == hash_for_copy.as_str()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("listing succeeds");

    assert_eq!(report.created(), 2, "equal fingerprints never merge identities");
}

#[tokio::test]
async fn fetch_failure_fails_the_document_not_the_run() {
    let mut source = MockRepoSource::new();
    source
        .expect_list_dir()
        .times(1)
        .return_once(|_| Ok(vec![entry("guide.md")]));
    source.expect_get_file().times(1).return_once(|_| {
        Err(SourceError::Status {
            status: 502,
            path: "guide.md".to_string(),
            message: "bad gateway".to_string(),
        })
    });

    let host = MockDocHost::new();

    let report = synchronise(&config(), &source, &host)
        .await
        .expect("the run itself must not abort on a per-file fetch error");

    assert_eq!(report.failed(), 1);
    let (_, err) = report.first_failure().expect("branch failed");
    assert!(matches!(err, DocSyncError::Fetch(_)), "got: {err:?}");
}

#[tokio::test]
async fn listing_failure_aborts_the_run() {
    let mut source = MockRepoSource::new();
    source.expect_list_dir().return_once(|_| {
        Err(SourceError::Status {
            status: 500,
            path: String::new(),
            message: "server error".to_string(),
        })
    });
    let host = MockDocHost::new();

    let err = synchronise(&config(), &source, &host)
        .await
        .expect_err("a listing failure leaves nothing to fan out over");
    assert!(matches!(err, SyncError::List { .. }), "got: {err:?}");
}
