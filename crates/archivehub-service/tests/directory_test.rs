//! Integration tests for directory lifecycle, relocation and the tree.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use archivehub_cache::keys;
use archivehub_core::error::ErrorKind;
use archivehub_core::types::{DirectoryId, Patch};
use archivehub_database::memory::MemoryFileStore;
use archivehub_database::store::DirectoryStore;
use archivehub_service::{CreateDirectoryRequest, DirectoryService, UpdateDirectoryRequest};

use helpers::{GatedDirectoryStore, TestApp, memory_cache};

#[tokio::test]
async fn test_paths_compose_from_parent_chain() {
    let app = TestApp::new();
    let docs = app.dir(None, "Docs").await;
    let year = app.dir(Some(&docs), "2024").await;
    let q1 = app.dir(Some(&year), "Q1 Results").await;

    assert_eq!(docs.path, "docs");
    assert_eq!(year.path, "docs/2024");
    assert_eq!(q1.slug, "q1-results");
    assert_eq!(q1.path, "docs/2024/q1-results");
}

#[tokio::test]
async fn test_sibling_slugs_are_uniquified() {
    let app = TestApp::new();
    let parent = app.dir(None, "parent").await;
    let first = app.dir(Some(&parent), "foo").await;
    let second = app.dir(Some(&parent), "Foo").await;
    let other_scope = app.dir(None, "foo").await;

    assert_eq!(first.slug, "foo");
    assert_eq!(second.slug, "foo-1");
    assert_eq!(second.path, "parent/foo-1");
    assert_eq!(other_scope.slug, "foo");
}

#[tokio::test]
async fn test_requested_slug_is_used() {
    let app = TestApp::new();
    let dir = app
        .directory_service
        .create(CreateDirectoryRequest {
            name: "Annual Reports".to_string(),
            slug: Some("Reports".to_string()),
            published: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(dir.slug, "reports");
    assert_eq!(dir.name, "Annual Reports");
}

#[tokio::test]
async fn test_unusable_name_gets_time_seeded_slug() {
    let app = TestApp::new();
    let dir = app.dir(None, "???").await;
    assert!(dir.slug.starts_with("directory-"));
    assert_eq!(dir.path, dir.slug);
}

#[tokio::test]
async fn test_create_rejects_empty_name_and_missing_parent() {
    let app = TestApp::new();

    let err = app
        .directory_service
        .create(CreateDirectoryRequest {
            name: "   ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = app
        .directory_service
        .create(CreateDirectoryRequest {
            parent_id: Some(DirectoryId::new()),
            name: "orphan".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidParent);
}

#[tokio::test]
async fn test_description_is_never_stored() {
    let app = TestApp::new();
    let dir = app
        .directory_service
        .create(CreateDirectoryRequest {
            name: "notes".to_string(),
            description: Some("secret".to_string()),
            published: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(dir.description.is_empty());

    let stored = app.directories.find_by_id(dir.id).await.unwrap().unwrap();
    assert!(stored.description.is_empty());

    let updated = app
        .directory_service
        .update(
            dir.id,
            UpdateDirectoryRequest {
                description: Patch::Value("again".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.description.is_empty());
}

#[tokio::test]
async fn test_reparent_into_own_subtree_is_rejected() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    let b = app.dir(Some(&a), "b").await;
    let c = app.dir(Some(&b), "c").await;

    for target in [a.id, b.id, c.id] {
        let err = app
            .directory_service
            .update(
                a.id,
                UpdateDirectoryRequest {
                    parent_id: Patch::Value(target),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParent);
    }

    let err = app
        .directory_service
        .update(
            a.id,
            UpdateDirectoryRequest {
                parent_id: Patch::Value(DirectoryId::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidParent);
}

#[tokio::test]
async fn test_rename_cascades_to_descendants_and_files() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    let b = app.dir(Some(&a), "b").await;
    let report = app.file(&b, "report", "https://cdn.test/report.pdf").await;
    assert_eq!(report.path, "a/b/report");

    let z = app
        .directory_service
        .update(
            a.id,
            UpdateDirectoryRequest {
                slug: Patch::Value("z".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(z.path, "z");

    let b = app.directory_service.get_by_id(b.id, true).await.unwrap();
    assert_eq!(b.path, "z/b");
    let report = app.file_service.get_by_id(report.id, true).await.unwrap();
    assert_eq!(report.path, "z/b/report");
}

#[tokio::test]
async fn test_move_to_new_parent_and_back_to_root() {
    let app = TestApp::new();
    let archive = app.dir(None, "archive").await;
    let docs = app.dir(None, "docs").await;
    let old = app.dir(Some(&docs), "old").await;
    let readme = app.file(&docs, "readme", "https://cdn.test/readme.md").await;
    let inner = app.file(&old, "notes", "https://cdn.test/notes.txt").await;

    let moved = app
        .directory_service
        .update(
            docs.id,
            UpdateDirectoryRequest {
                parent_id: Patch::Value(archive.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.path, "archive/docs");
    assert_eq!(moved.parent_id, Some(archive.id));
    assert_eq!(
        app.file_service.get_by_id(readme.id, true).await.unwrap().path,
        "archive/docs/readme"
    );
    assert_eq!(
        app.file_service.get_by_id(inner.id, true).await.unwrap().path,
        "archive/docs/old/notes"
    );

    let root = app
        .directory_service
        .update(
            docs.id,
            UpdateDirectoryRequest {
                parent_id: Patch::Null,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(root.path, "docs");
    assert!(root.is_root());
    assert_eq!(
        app.directory_service.get_by_id(old.id, true).await.unwrap().path,
        "docs/old"
    );
}

#[tokio::test]
async fn test_move_reallocates_slug_in_new_scope() {
    let app = TestApp::new();
    let left = app.dir(None, "left").await;
    let right = app.dir(None, "right").await;
    app.dir(Some(&right), "shared").await;
    let shared = app.dir(Some(&left), "shared").await;

    let moved = app
        .directory_service
        .update(
            shared.id,
            UpdateDirectoryRequest {
                parent_id: Patch::Value(right.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.slug, "shared-1");
    assert_eq!(moved.path, "right/shared-1");
}

#[tokio::test]
async fn test_relocation_is_idempotent() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    let b = app.dir(Some(&a), "b").await;
    app.dir(Some(&b), "c").await;

    // Simulate a rename whose cascade never ran.
    let mut renamed = app.directories.find_by_id(a.id).await.unwrap().unwrap();
    renamed.slug = "z".to_string();
    renamed.path = "z".to_string();
    app.directories.update(&renamed).await.unwrap();

    let moved = app
        .directory_service
        .relocate_descendants("a", "z")
        .await
        .unwrap();
    assert_eq!(moved, 2);
    let again = app
        .directory_service
        .relocate_descendants("a", "z")
        .await
        .unwrap();
    assert_eq!(again, 0);
    assert_eq!(
        app.directory_service.get_by_path("z/b/c", true).await.unwrap().path,
        "z/b/c"
    );
    assert_eq!(
        app.directory_service
            .relocate_descendants("z", "Z/")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_repair_requires_existing_target() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    let b = app.dir(Some(&a), "b").await;
    let report = app.file(&b, "report", "https://cdn.test/report.pdf").await;

    let err = app
        .directory_service
        .repair_relocation("a", "typo")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .directory_service
        .repair_relocation("a", "b")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Nothing was rewritten by the rejected attempts.
    assert_eq!(
        app.directory_service.get_by_path("a/b", true).await.unwrap().id,
        b.id
    );
    assert_eq!(
        app.file_service
            .get_by_id(report.id, true)
            .await
            .unwrap()
            .path,
        "a/b/report"
    );
}

#[tokio::test]
async fn test_repair_refuses_while_source_still_exists() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    app.dir(Some(&a), "b").await;
    app.dir(None, "z").await;

    let err = app
        .directory_service
        .repair_relocation("a", "z")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(app.directory_service.get_by_path("a/b", true).await.is_ok());
}

#[tokio::test]
async fn test_repair_finishes_interrupted_rename() {
    let app = TestApp::new();
    let a = app.dir(None, "a").await;
    let b = app.dir(Some(&a), "b").await;
    let report = app.file(&b, "report", "https://cdn.test/report.pdf").await;
    let readme = app.file(&a, "readme", "https://cdn.test/readme.txt").await;

    // The rename landed but neither cascade ran.
    let mut renamed = app.directories.find_by_id(a.id).await.unwrap().unwrap();
    renamed.slug = "z".to_string();
    renamed.path = "z".to_string();
    app.directories.update(&renamed).await.unwrap();

    let moved = app
        .directory_service
        .repair_relocation("a", "z")
        .await
        .unwrap();
    assert_eq!(moved, 1);

    let report = app.file_service.get_by_id(report.id, true).await.unwrap();
    let readme = app.file_service.get_by_id(readme.id, true).await.unwrap();
    assert_eq!(report.path, "z/b/report");
    assert_eq!(readme.path, "z/readme");
    assert_eq!(
        app.directory_service
            .repair_relocation("a", "z")
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_delete_refuses_non_empty_directories() {
    let app = TestApp::new();
    let docs = app.dir(None, "docs").await;
    let file = app.file(&docs, "report", "https://cdn.test/report.pdf").await;

    let err = app.directory_service.delete(docs.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotEmpty);

    app.file_service.delete(file.id).await.unwrap();
    app.directory_service.delete(docs.id).await.unwrap();

    let err = app
        .directory_service
        .get_by_id(docs.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let parent = app.dir(None, "parent").await;
    app.dir(Some(&parent), "child").await;
    let err = app.directory_service.delete(parent.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotEmpty);

    let err = app
        .directory_service
        .delete(DirectoryId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unpublished_directories_are_hidden() {
    let app = TestApp::new();
    let draft = app.dir_with(None, "Draft", 0, false).await;
    app.dir(None, "Live").await;

    assert!(app.directory_service.get_by_id(draft.id, true).await.is_ok());
    let err = app
        .directory_service
        .get_by_id(draft.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .directory_service
        .get_by_path("/DRAFT/", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let roots = app.directory_service.list_by_parent(None, false).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "Live");
    let roots = app.directory_service.list_by_parent(None, true).await.unwrap();
    assert_eq!(roots.len(), 2);
}

#[tokio::test]
async fn test_tree_orders_by_order_then_name() {
    let app = TestApp::new();
    app.dir_with(None, "Banana", 2, true).await;
    app.dir_with(None, "Apple", 1, true).await;
    app.dir_with(None, "Zeta", 1, true).await;

    let tree = app.directory_service.list_tree(false).await.unwrap();
    let names: Vec<(&str, i32)> = tree.iter().map(|d| (d.name.as_str(), d.order)).collect();
    assert_eq!(names, [("Apple", 1), ("Zeta", 1), ("Banana", 2)]);
}

#[tokio::test]
async fn test_published_tree_drops_hidden_subtrees() {
    let app = TestApp::new();
    let docs = app.dir(None, "docs").await;
    let hidden = app.dir_with(Some(&docs), "hidden", 0, false).await;
    app.dir(Some(&hidden), "visible-child").await;
    app.dir(Some(&docs), "public").await;

    let public = app.directory_service.list_tree(false).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].subtree_len(), 2);
    assert_eq!(public[0].children[0].name, "public");

    let all = app.directory_service.list_tree(true).await.unwrap();
    assert_eq!(all[0].subtree_len(), 4);
}

#[tokio::test]
async fn test_tree_cache_is_populated_and_invalidated() {
    let app = TestApp::new();
    let cache = app.cache.clone().unwrap();
    app.dir(None, "docs").await;

    app.directory_service.list_tree(false).await.unwrap();
    assert!(cache.get(&keys::tree_published()).await.unwrap().is_some());
    assert!(cache.get(&keys::tree_all()).await.unwrap().is_none());

    app.directory_service.list_tree(true).await.unwrap();
    assert!(cache.get(&keys::tree_all()).await.unwrap().is_some());

    app.dir(None, "more").await;
    for key in keys::tree_variants() {
        assert!(cache.get(&key).await.unwrap().is_none());
    }
    assert_eq!(app.directory_service.list_tree(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cached_tree_is_served_until_invalidated() {
    let app = TestApp::new();
    let docs = app.dir(None, "docs").await;
    let first = app.directory_service.list_tree(true).await.unwrap();
    assert_eq!(first.len(), 1);

    // A write that bypasses the service is invisible until invalidation.
    let mut raw = app.directories.find_by_id(docs.id).await.unwrap().unwrap();
    raw.name = "Renamed".to_string();
    app.directories.update(&raw).await.unwrap();
    assert_eq!(app.directory_service.list_tree(true).await.unwrap()[0].name, "docs");

    app.directory_service.invalidate_tree_cache().await;
    assert_eq!(
        app.directory_service.list_tree(true).await.unwrap()[0].name,
        "Renamed"
    );
}

#[tokio::test]
async fn test_rebuild_overtaken_by_mutation_is_not_cached() {
    let directories = Arc::new(GatedDirectoryStore::default());
    let cache = memory_cache();
    let service = Arc::new(DirectoryService::new(
        directories.clone(),
        Arc::new(MemoryFileStore::new()),
        Some(cache.clone()),
        Duration::from_secs(1800),
    ));

    directories.arm();
    let reader = tokio::spawn({
        let service = service.clone();
        async move { service.list_tree(true).await }
    });
    directories.reached.notified().await;

    service
        .create(CreateDirectoryRequest {
            name: "New".to_string(),
            published: true,
            ..Default::default()
        })
        .await
        .unwrap();
    directories.release.notify_one();

    let snapshot = reader.await.unwrap().unwrap();
    assert!(snapshot.is_empty());
    assert!(cache.get(&keys::tree_all()).await.unwrap().is_none());

    let tree = service.list_tree(true).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "New");
}

#[tokio::test]
async fn test_tree_without_cache_rebuilds() {
    let app = TestApp::without_cache();
    app.dir(None, "docs").await;
    assert_eq!(app.directory_service.list_tree(true).await.unwrap().len(), 1);
    app.dir(None, "more").await;
    assert_eq!(app.directory_service.list_tree(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_breadcrumbs_round_trip() {
    let app = TestApp::new();
    let docs = app.dir(None, "Docs").await;
    let year = app.dir(Some(&docs), "2024").await;
    app.dir(Some(&year), "Report").await;

    let crumbs = app
        .directory_service
        .build_breadcrumbs("docs/2024/report", false)
        .await
        .unwrap();
    assert_eq!(crumbs.len(), 3);
    let names: Vec<&str> = crumbs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Docs", "2024", "Report"]);
    let joined = crumbs
        .iter()
        .map(|c| c.path.rsplit('/').next().unwrap())
        .collect::<Vec<_>>()
        .join("/");
    assert_eq!(joined, "docs/2024/report");
    assert_eq!(crumbs[2].path, "docs/2024/report");
}

#[tokio::test]
async fn test_breadcrumbs_stop_at_missing_or_hidden_segment() {
    let app = TestApp::new();
    let docs = app.dir(None, "docs").await;
    let hidden = app.dir_with(Some(&docs), "hidden", 0, false).await;
    app.dir(Some(&hidden), "leaf").await;

    let err = app
        .directory_service
        .build_breadcrumbs("docs/missing", true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .directory_service
        .build_breadcrumbs("docs/hidden/leaf", false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let crumbs = app
        .directory_service
        .build_breadcrumbs("docs/hidden/leaf", true)
        .await
        .unwrap();
    assert_eq!(crumbs.len(), 3);
}
