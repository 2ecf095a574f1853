//! Read-through and invalidation behavior of the blog cache, driven through
//! `BlogService` over in-memory repositories.

mod support;

use std::sync::Arc;

use pinkdreams::application::blog::{CreateBlogCommand, UpdateBlogCommand};
use pinkdreams::application::repos::{BlogListParams, BlogListQuery};
use pinkdreams::cache::{CacheStore, blog_detail_key, blog_list_key};
use serde_json::json;

use support::{HarnessOptions, UnreachableCacheStore, harness, harness_with, sample_post};

fn params(category: Option<&str>, page: Option<&str>) -> BlogListParams {
    BlogListParams {
        category: category.map(str::to_string),
        page: page.map(str::to_string),
        ..Default::default()
    }
}

fn create_command(title: &str) -> CreateBlogCommand {
    CreateBlogCommand {
        title: title.to_string(),
        short_description: "Spring looks".to_string(),
        content: "<p>Pastels are back.</p>".to_string(),
        image: "https://cdn.example.com/spring.jpg".to_string(),
        author_name: "Rin".to_string(),
        category: "fashion".to_string(),
        tags: vec!["Spring".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn repeated_list_reads_hit_the_cache() {
    let h = harness();
    h.blogs.insert(sample_post("Summer Dresses", "fashion", &["summer"])).await;

    let first = h.state.blogs.list(&params(None, None)).await.expect("first list");
    let second = h.state.blogs.list(&params(None, None)).await.expect("second list");

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.value, second.value);
    assert_eq!(h.blogs.list_calls(), 1);
    assert_eq!(second.value.pagination.total_blogs, 1);
}

#[tokio::test]
async fn equivalent_queries_share_one_entry() {
    let h = harness();
    h.blogs.insert(sample_post("Summer Dresses", "fashion", &[])).await;

    h.state.blogs.list(&params(None, None)).await.expect("default list");
    let explicit = h
        .state
        .blogs
        .list(&params(Some("ALL"), Some("1")))
        .await
        .expect("explicit defaults");

    assert!(explicit.cached);
    assert_eq!(h.blogs.list_calls(), 1);
}

#[tokio::test]
async fn list_keys_are_registered_for_invalidation() {
    let h = harness();
    h.state.blogs.list(&params(None, None)).await.expect("list all");
    h.state
        .blogs
        .list(&params(Some("beauty"), None))
        .await
        .expect("list beauty");

    let mut members = h.store.registry_members("cache:keys").await.expect("members");
    members.sort();

    let all = blog_list_key(&BlogListQuery::default()).to_string();
    let beauty = blog_list_key(&BlogListQuery {
        category: "beauty".to_string(),
        ..BlogListQuery::default()
    })
    .to_string();
    let mut expected = vec![all, beauty];
    expected.sort();
    assert_eq!(members, expected);
}

#[tokio::test]
async fn detail_miss_counts_a_view_and_hits_do_not() {
    let h = harness();
    let post = sample_post("Glow Routine", "beauty", &[]);
    let id = post.id;
    h.blogs.insert(post).await;

    let first = h.state.blogs.detail(id).await.expect("first detail");
    let second = h.state.blogs.detail(id).await.expect("second detail");

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.value.views, 1);
    assert_eq!(second.value.views, 1);
    assert_eq!(h.blogs.view_calls(), 1);
    assert!(h.store.contains(blog_detail_key(id).as_str()));
}

#[tokio::test]
async fn unknown_detail_is_not_cached() {
    let h = harness();
    let id = uuid::Uuid::new_v4();

    let err = h.state.blogs.detail(id).await.expect_err("missing post");
    assert!(matches!(
        err,
        pinkdreams::application::blog::BlogError::NotFound
    ));
    assert!(!h.store.contains(blog_detail_key(id).as_str()));
}

#[tokio::test]
async fn create_sweeps_every_list_page() {
    let h = harness();
    h.blogs.insert(sample_post("Summer Dresses", "fashion", &[])).await;
    h.state.blogs.list(&params(None, None)).await.expect("list all");
    h.state
        .blogs
        .list(&params(Some("fashion"), None))
        .await
        .expect("list fashion");
    assert_eq!(h.blogs.list_calls(), 2);

    let created = h
        .state
        .blogs
        .create(create_command("Pastel Season"))
        .await
        .expect("create");
    assert_eq!(created.slug, "pastel-season");
    assert_eq!(created.tags, vec!["spring".to_string()]);

    assert!(h.store.live_keys().iter().all(|key| !key.starts_with("blogs:list")));
    assert!(
        h.store
            .registry_members("cache:keys")
            .await
            .expect("members")
            .is_empty()
    );

    let refreshed = h.state.blogs.list(&params(None, None)).await.expect("relist");
    assert!(!refreshed.cached);
    assert_eq!(refreshed.value.pagination.total_blogs, 2);
    assert_eq!(h.blogs.list_calls(), 3);
}

#[tokio::test]
async fn update_drops_the_detail_entry() {
    let h = harness();
    let post = sample_post("Glow Routine", "beauty", &[]);
    let id = post.id;
    h.blogs.insert(post).await;

    h.state.blogs.detail(id).await.expect("warm detail");
    assert!(h.store.contains(blog_detail_key(id).as_str()));

    let updated = h
        .state
        .blogs
        .update(
            id,
            UpdateBlogCommand {
                title: Some("Night Glow Routine".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.slug, "night-glow-routine");
    assert!(!h.store.contains(blog_detail_key(id).as_str()));

    let fresh = h.state.blogs.detail(id).await.expect("reread");
    assert!(!fresh.cached);
    assert_eq!(fresh.value.title, "Night Glow Routine");
    assert_eq!(fresh.value.views, 2);
}

#[tokio::test]
async fn likes_and_comments_invalidate() {
    let h = harness();
    let post = sample_post("Glow Routine", "beauty", &[]);
    let id = post.id;
    h.blogs.insert(post).await;

    h.state.blogs.detail(id).await.expect("warm detail");
    let liked = h.state.blogs.toggle_like(id, 7).await.expect("like");
    assert!(liked.liked);
    assert_eq!(liked.total_likes, 1);
    assert!(!h.store.contains(blog_detail_key(id).as_str()));

    h.state.blogs.detail(id).await.expect("rewarm detail");
    let count = h
        .state
        .blogs
        .comment(id, json!({ "name": "Mia" }), "  Love it  ")
        .await
        .expect("comment");
    assert_eq!(count, 1);
    assert!(!h.store.contains(blog_detail_key(id).as_str()));

    let unliked = h.state.blogs.toggle_like(id, 7).await.expect("unlike");
    assert!(!unliked.liked);
    assert_eq!(unliked.total_likes, 0);
}

#[tokio::test]
async fn delete_of_unknown_post_leaves_cache_alone() {
    let h = harness();
    h.state.blogs.list(&params(None, None)).await.expect("list");

    let err = h
        .state
        .blogs
        .delete(uuid::Uuid::new_v4())
        .await
        .expect_err("unknown id");
    assert!(matches!(
        err,
        pinkdreams::application::blog::BlogError::NotFound
    ));
    assert_eq!(
        h.store.registry_members("cache:keys").await.expect("members").len(),
        1
    );
}

#[tokio::test]
async fn unreachable_store_fails_open() {
    let h = harness_with(HarnessOptions {
        cache_store: Some(Arc::new(UnreachableCacheStore)),
        ..HarnessOptions::default()
    });
    let post = sample_post("Glow Routine", "beauty", &[]);
    let id = post.id;
    h.blogs.insert(post).await;

    for _ in 0..2 {
        let page = h.state.blogs.list(&params(None, None)).await.expect("list");
        assert!(!page.cached);
        assert_eq!(page.value.blogs.len(), 1);
    }
    assert_eq!(h.blogs.list_calls(), 2);

    let detail = h.state.blogs.detail(id).await.expect("detail");
    assert!(!detail.cached);

    h.state
        .blogs
        .create(create_command("Pastel Season"))
        .await
        .expect("writes succeed without a cache");
}
