//! Repository behaviour against a live PostgreSQL database.
//!
//! Run with `JUICEBOX_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use std::collections::BTreeSet;

use juicebox::models::{CreatePost, PostPatch, UserPatch};
use serde_json::json;

use common::{TestDb, create_user, unique};

fn tag_set(names: Vec<&str>) -> BTreeSet<String> {
    names.into_iter().map(str::to_string).collect()
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_create_user_and_reject_duplicate_username() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let username = unique("albert");

    let created = repos
        .users
        .create(&username, "bertie99", "Al Bert", "Sidney, Australia")
        .await
        .unwrap()
        .expect("new username should be inserted");
    assert_eq!(created.username, username);
    assert_eq!(created.name, "Al Bert");
    assert_eq!(created.location, "Sidney, Australia");
    assert!(created.active);

    let duplicate = repos
        .users
        .create(&username, "other", "Someone Else", "Elsewhere")
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let stored = repos.users.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(stored.id, created.id);
    assert_eq!(stored.name, "Al Bert");
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_new_user_has_no_password_and_no_posts() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "u1").await;

    let found = repos.users.find_by_id(user.id).await.unwrap().unwrap();
    let value = serde_json::to_value(&found).unwrap();

    assert!(value.get("password").is_none());
    assert_eq!(value["posts"], json!([]));
    assert_eq!(value["username"], json!(user.username));
    assert_eq!(value["name"], json!("Name"));
    assert_eq!(value["location"], json!("Loc"));
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_missing_entities_are_none() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;

    assert!(repos.users.find_by_id(i32::MAX).await.unwrap().is_none());
    assert!(repos.posts.find_by_id(i32::MAX).await.unwrap().is_none());
    let patch = PostPatch {
        title: Some("nobody".to_string()),
        ..Default::default()
    };
    assert!(repos.posts.update(i32::MAX, patch).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_list_users_excludes_passwords() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "lister").await;

    let users = repos.users.list_all().await.unwrap();
    assert!(users.iter().any(|u| u.id == user.id));

    let value = serde_json::to_value(&users).unwrap();
    for entry in value.as_array().unwrap() {
        assert!(entry.get("password").is_none());
    }
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_update_user_patch() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "mover").await;

    let patch = UserPatch::from_fields(
        json!({ "name": "Newname Sogood", "location": "Lesterville, KY" })
            .as_object()
            .cloned()
            .unwrap(),
    )
    .unwrap();
    let updated = repos.users.update(user.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.name, "Newname Sogood");
    assert_eq!(updated.location, "Lesterville, KY");
    assert_eq!(updated.username, user.username);
    assert_eq!(updated.password, user.password);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_empty_patches_are_no_ops() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "idle").await;

    let result = repos.users.update(user.id, UserPatch::default()).await.unwrap();
    assert!(result.is_none());
    let stored = repos.users.find_by_username(&user.username).await.unwrap().unwrap();
    assert_eq!(stored, user);

    let tag = unique("still");
    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Unchanged".to_string(),
            content: "Body".to_string(),
            tags: vec![tag.clone()],
        })
        .await
        .unwrap();

    let unchanged = repos
        .posts
        .update(post.id, PostPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, post);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_create_tags_is_idempotent_and_complete() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let a = unique("a");
    let b = unique("b");
    let c = unique("c");

    let first = repos
        .tags
        .create_tags(&[a.clone(), b.clone()])
        .await
        .unwrap();
    let second = repos
        .tags
        .create_tags(&[b.clone(), c.clone(), b.clone()])
        .await
        .unwrap();

    let first_names: BTreeSet<String> = first.iter().map(|t| t.name.clone()).collect();
    assert_eq!(first_names, tag_set(vec![a.as_str(), b.as_str()]));
    assert_eq!(second.len(), 2);
    let second_names: BTreeSet<String> = second.iter().map(|t| t.name.clone()).collect();
    assert_eq!(second_names, tag_set(vec![b.as_str(), c.as_str()]));

    let b_first = first.iter().find(|t| t.name == b).unwrap();
    let b_second = second.iter().find(|t| t.name == b).unwrap();
    assert_eq!(b_first.id, b_second.id);

    let all = repos.tags.list_all().await.unwrap();
    assert_eq!(all.iter().filter(|t| t.name == b).count(), 1);

    assert!(repos.tags.create_tags(&[]).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_post_is_always_hydrated() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "writer").await;

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "No tags".to_string(),
            content: "Plain".to_string(),
            tags: vec![],
        })
        .await
        .unwrap();

    let found = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    let value = serde_json::to_value(&found).unwrap();

    assert!(value.get("authorId").is_none());
    assert!(value.get("author_id").is_none());
    assert_eq!(value["tags"], json!([]));
    assert_eq!(value["author"]["id"], json!(user.id));
    assert_eq!(value["author"]["username"], json!(user.username));
    assert!(value["author"].get("password").is_none());
    assert_eq!(value["active"], json!(true));
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_tag_set_round_trip() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "tagger").await;
    let a = unique("a");
    let b = unique("b");
    let c = unique("c");

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Tagged".to_string(),
            content: "Twice".to_string(),
            tags: vec![a.clone(), b.clone()],
        })
        .await
        .unwrap();
    let found = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(
        found.tag_names().into_iter().collect::<BTreeSet<_>>(),
        [a.as_str(), b.as_str()].into_iter().collect()
    );
    let b_id = found.tags.iter().find(|t| t.name == b).unwrap().id;

    let patch = PostPatch {
        tags: Some(vec![b.clone(), c.clone()]),
        ..Default::default()
    };
    repos.posts.update(post.id, patch).await.unwrap().unwrap();

    let revised = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(
        revised.tag_names().into_iter().collect::<BTreeSet<_>>(),
        [b.as_str(), c.as_str()].into_iter().collect()
    );
    assert_eq!(revised.tags.iter().find(|t| t.name == b).unwrap().id, b_id);
    assert!(repos.posts.list_by_tag_name(&a).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_update_scalars_keeps_tags() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "editor").await;
    let tag = unique("kept");

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Before".to_string(),
            content: "Body".to_string(),
            tags: vec![tag.clone()],
        })
        .await
        .unwrap();

    let patch = PostPatch::from_fields(
        json!({ "title": "After", "active": false })
            .as_object()
            .cloned()
            .unwrap(),
    )
    .unwrap();
    let updated = repos.posts.update(post.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.title, "After");
    assert_eq!(updated.content, "Body");
    assert!(!updated.active);
    assert_eq!(updated.tag_names(), vec![tag.as_str()]);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_clearing_tags_removes_every_label() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "clearer").await;

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Labelled".to_string(),
            content: "Body".to_string(),
            tags: vec![unique("x"), unique("y")],
        })
        .await
        .unwrap();
    assert_eq!(post.tags.len(), 2);

    let patch = PostPatch {
        tags: Some(vec![]),
        ..Default::default()
    };
    let cleared = repos.posts.update(post.id, patch).await.unwrap().unwrap();
    assert!(cleared.tags.is_empty());
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_add_tags_to_post_twice_links_once() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "linker").await;
    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Untagged".to_string(),
            content: "Body".to_string(),
            tags: vec![],
        })
        .await
        .unwrap();
    let tags = repos.tags.create_tags(&[unique("once")]).await.unwrap();

    repos.tags.add_tags_to_post(post.id, &tags).await.unwrap();
    let view = repos
        .tags
        .add_tags_to_post(post.id, &tags)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(view.tags, tags);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_list_by_tag_name_returns_the_one_post() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "single").await;
    let x = unique("x");

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Only".to_string(),
            content: "One".to_string(),
            tags: vec![x.clone()],
        })
        .await
        .unwrap();

    let posts = repos.posts.list_by_tag_name(&x).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0], post);
    assert_eq!(posts[0].author.id, user.id);
    assert_eq!(posts[0].tag_names(), vec![x.as_str()]);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_lists_preserve_id_order_under_small_cap() {
    let db = TestDb::new(1).await;
    let repos = &db.repos;
    let user = create_user(repos, "prolific").await;

    let mut created = Vec::new();
    for i in 0..5 {
        let post = repos
            .posts
            .create(CreatePost {
                author_id: user.id,
                title: format!("Post {}", i),
                content: "Body".to_string(),
                tags: vec![],
            })
            .await
            .unwrap();
        created.push(post.id);
    }

    let listed: Vec<i32> = repos
        .posts
        .list_by_author(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, created);

    let all: Vec<i32> = repos
        .posts
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert!(all.windows(2).all(|w| w[0] < w[1]));

    let with_posts = repos.users.find_by_id(user.id).await.unwrap().unwrap();
    let owned: Vec<i32> = with_posts.posts.iter().map(|p| p.id).collect();
    assert_eq!(owned, created);
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_unknown_author_is_a_foreign_key_violation() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let tag = unique("orphan");

    let err = repos
        .posts
        .create(CreatePost {
            author_id: i32::MAX,
            title: "Orphan".to_string(),
            content: "Body".to_string(),
            tags: vec![tag.clone()],
        })
        .await
        .unwrap_err();

    let violation = err.constraint_violation().expect("should describe the violation");
    assert_eq!(violation.kind, juicebox::error::ViolationKind::ForeignKey);
    assert_eq!(violation.entity, "posts");
    assert_eq!(violation.field, "authorId");

    // Nothing from the failed create is left behind
    let all = repos.tags.list_all().await.unwrap();
    assert!(all.iter().all(|t| t.name != tag));
}

#[tokio::test]
#[ignore = "needs JUICEBOX_TEST_DATABASE_URL"]
async fn test_failed_update_rolls_back_scalars_and_tags() {
    let db = TestDb::new(4).await;
    let repos = &db.repos;
    let user = create_user(repos, "careful").await;
    let kept = unique("kept");

    let post = repos
        .posts
        .create(CreatePost {
            author_id: user.id,
            title: "Original".to_string(),
            content: "Body".to_string(),
            tags: vec![kept.clone()],
        })
        .await
        .unwrap();

    // Longer than tags.name allows
    let too_long = "x".repeat(300);
    let patch = PostPatch {
        title: Some("Changed".to_string()),
        tags: Some(vec![too_long.clone()]),
        ..Default::default()
    };
    assert!(repos.posts.update(post.id, patch).await.is_err());

    let stored = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);
    assert_eq!(stored.title, "Original");
    assert_eq!(stored.tag_names(), vec![kept.as_str()]);
    let tags = repos.tags.list_all().await.unwrap();
    assert!(tags.iter().all(|t| t.name != too_long));
}
