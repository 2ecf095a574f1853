//! In-memory repositories and wiring shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use pinkdreams::application::admin_token::AdminToken;
use pinkdreams::application::blog::BlogService;
use pinkdreams::application::cart::CartService;
use pinkdreams::application::categories::CategoryService;
use pinkdreams::application::contact::ContactService;
use pinkdreams::application::health::HealthService;
use pinkdreams::application::newsletter::NewsletterService;
use pinkdreams::application::pagination::{OffsetPage, PageRequest};
use pinkdreams::application::repos::{
    BlogListQuery, BlogPostsRepo, BlogPostsWriteRepo, BlogSortBy, CartsRepo, CategoriesRepo,
    CategoriesWriteRepo, CategoryQueryFilter, ContactQueryFilter, ContactsRepo,
    CreateBlogPostParams, CreateCategoryParams, CreateContactParams, CreateSubscriberParams,
    HealthRepo, LabelCount, LikeOutcome, MonthlyCount, NewsletterRepo, RepoError, SortOrder,
    UpdateBlogPostParams, UpdateCategoryParams, WishlistsRepo,
};
use pinkdreams::application::wishlist::WishlistService;
use pinkdreams::cache::{CacheConfig, CacheError, CacheStore, MemoryCacheStore, build_cache};
use pinkdreams::domain::entities::{
    BlogAuthor, BlogComment, BlogLikes, BlogPostRecord, CartRecord, CategoryRecord,
    ContactRecord, SubscriberRecord, WishlistRecord,
};
use pinkdreams::domain::types::{BlogStatus, CategoryKind, ContactStatus, SubscriberStatus};
use pinkdreams::infra::http::{ApiState, FormRateLimiter};

pub const ADMIN_TOKEN: &str = "test-admin-token";

// ----- Blog posts -----

#[derive(Default)]
pub struct FakeBlogRepo {
    posts: Mutex<Vec<BlogPostRecord>>,
    list_calls: AtomicUsize,
    view_calls: AtomicUsize,
}

impl FakeBlogRepo {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn view_calls(&self) -> usize {
        self.view_calls.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, post: BlogPostRecord) {
        self.posts.lock().await.push(post);
    }
}

pub fn sample_post(title: &str, category: &str, tags: &[&str]) -> BlogPostRecord {
    let now = OffsetDateTime::now_utc();
    BlogPostRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        short_description: format!("About {title}"),
        content: "<p>body</p>".to_string(),
        image: "https://cdn.example.com/cover.jpg".to_string(),
        author: BlogAuthor {
            name: "Ada".to_string(),
            profile_image: None,
            bio: None,
        },
        category: category.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        featured: false,
        trending: false,
        status: BlogStatus::Published,
        published_at: Some(now),
        read_time: 10,
        likes: BlogLikes::default(),
        views: 0,
        comments: Vec::new(),
        meta_title: None,
        meta_description: None,
        meta_keywords: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn matches_query(post: &BlogPostRecord, query: &BlogListQuery) -> bool {
    if let Some(search) = query.search_filter() {
        let needle = search.to_lowercase();
        if !post.title.to_lowercase().contains(&needle)
            && !post.short_description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if query
        .category_filter()
        .is_some_and(|category| post.category != category)
    {
        return false;
    }
    if query
        .tag_filter()
        .is_some_and(|tag| !post.tags.iter().any(|candidate| candidate == tag))
    {
        return false;
    }
    if query.status.is_some_and(|status| post.status != status) {
        return false;
    }
    true
}

#[async_trait]
impl BlogPostsRepo for FakeBlogRepo {
    async fn list_posts(
        &self,
        query: &BlogListQuery,
    ) -> Result<OffsetPage<BlogPostRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let posts = self.posts.lock().await;
        let mut items: Vec<BlogPostRecord> = posts
            .iter()
            .filter(|post| matches_query(post, query))
            .cloned()
            .collect();

        match query.sort_by {
            BlogSortBy::Name => items.sort_by(|a, b| a.title.cmp(&b.title)),
            BlogSortBy::MostViewed => items.sort_by(|a, b| b.views.cmp(&a.views)),
            BlogSortBy::MostLiked => items.sort_by(|a, b| b.likes.count.cmp(&a.likes.count)),
            BlogSortBy::Latest => items.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
        }
        if matches!(query.sort_by, BlogSortBy::Latest | BlogSortBy::Name)
            && query.sort_order == SortOrder::Desc
        {
            items.reverse();
        }

        let total = items.len() as u64;
        let page = query.page_request();
        let items = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(OffsetPage { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        Ok(self.posts.lock().await.iter().find(|p| p.id == id).cloned())
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        let mut posts = self.posts.lock().await;
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            post.views += 1;
            post.clone()
        }))
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(self
            .posts
            .lock()
            .await
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }
}

#[async_trait]
impl BlogPostsWriteRepo for FakeBlogRepo {
    async fn create_post(
        &self,
        params: CreateBlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let post = BlogPostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            slug: params.slug,
            short_description: params.short_description,
            content: params.content,
            image: params.image,
            author: params.author,
            category: params.category,
            tags: params.tags,
            featured: params.featured,
            trending: params.trending,
            status: params.status,
            published_at: params.published_at,
            read_time: params.read_time,
            likes: BlogLikes::default(),
            views: 0,
            comments: Vec::new(),
            meta_title: params.meta_title,
            meta_description: params.meta_description,
            meta_keywords: params.meta_keywords,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().await.push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        params: UpdateBlogPostParams,
    ) -> Result<Option<BlogPostRecord>, RepoError> {
        let mut posts = self.posts.lock().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == params.id) else {
            return Ok(None);
        };
        post.title = params.title;
        post.slug = params.slug;
        post.short_description = params.short_description;
        post.content = params.content;
        post.image = params.image;
        post.author = params.author;
        post.category = params.category;
        post.tags = params.tags;
        post.featured = params.featured;
        post.trending = params.trending;
        post.status = params.status;
        post.published_at = params.published_at;
        post.read_time = params.read_time;
        post.meta_title = params.meta_title;
        post.meta_description = params.meta_description;
        post.meta_keywords = params.meta_keywords;
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let mut posts = self.posts.lock().await;
        let position = posts.iter().position(|p| p.id == id);
        Ok(position.map(|index| posts.remove(index)))
    }

    async fn add_comment(
        &self,
        id: Uuid,
        comment: BlogComment,
    ) -> Result<Option<u64>, RepoError> {
        let mut posts = self.posts.lock().await;
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            post.comments.push(comment);
            post.comments.len() as u64
        }))
    }

    async fn toggle_like(
        &self,
        id: Uuid,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, RepoError> {
        let mut posts = self.posts.lock().await;
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            let liked = post.likes.toggle(user_id);
            LikeOutcome {
                liked,
                total_likes: post.likes.count,
            }
        }))
    }
}

// ----- Categories -----

#[derive(Default)]
pub struct FakeCategoriesRepo {
    categories: Mutex<Vec<CategoryRecord>>,
}

#[async_trait]
impl CategoriesRepo for FakeCategoriesRepo {
    async fn list_categories(
        &self,
        kind: CategoryKind,
        filter: &CategoryQueryFilter,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut items: Vec<CategoryRecord> = self
            .categories
            .lock()
            .await
            .iter()
            .filter(|c| c.kind == kind)
            .filter(|c| filter.active.is_none_or(|active| c.is_active == active))
            .filter(|c| {
                filter.search.as_deref().is_none_or(|search| {
                    c.name.to_lowercase().contains(&search.to_lowercase())
                })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn find_by_id(
        &self,
        kind: CategoryKind,
        id: Uuid,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .find(|c| c.kind == kind && c.id == id)
            .cloned())
    }

    async fn find_conflict(
        &self,
        kind: CategoryKind,
        name: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .find(|c| {
                c.kind == kind
                    && Some(c.id) != exclude
                    && (c.name.eq_ignore_ascii_case(name) || c.slug == slug)
            })
            .cloned())
    }

    async fn max_order(&self, kind: CategoryKind) -> Result<Option<i32>, RepoError> {
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.order)
            .max())
    }

    async fn count_categories(
        &self,
        kind: CategoryKind,
        active: Option<bool>,
    ) -> Result<u64, RepoError> {
        Ok(self
            .categories
            .lock()
            .await
            .iter()
            .filter(|c| c.kind == kind && active.is_none_or(|a| c.is_active == a))
            .count() as u64)
    }
}

#[async_trait]
impl CategoriesWriteRepo for FakeCategoriesRepo {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            kind: params.kind,
            name: params.name,
            slug: params.slug,
            description: params.description,
            image: params.image,
            icon: params.icon,
            is_active: params.is_active,
            parent_category: params.parent_category,
            meta_title: params.meta_title,
            meta_description: params.meta_description,
            order: params.order,
            created_at: now,
            updated_at: now,
        };
        self.categories.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let mut categories = self.categories.lock().await;
        let Some(record) = categories
            .iter_mut()
            .find(|c| c.kind == params.kind && c.id == params.id)
        else {
            return Ok(None);
        };
        record.name = params.name;
        record.slug = params.slug;
        record.description = params.description;
        record.image = params.image;
        record.icon = params.icon;
        record.is_active = params.is_active;
        record.parent_category = params.parent_category;
        record.meta_title = params.meta_title;
        record.meta_description = params.meta_description;
        record.order = params.order;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    async fn delete_category(&self, kind: CategoryKind, id: Uuid) -> Result<bool, RepoError> {
        let mut categories = self.categories.lock().await;
        let before = categories.len();
        categories.retain(|c| !(c.kind == kind && c.id == id));
        Ok(categories.len() != before)
    }

    async fn reorder_categories(
        &self,
        kind: CategoryKind,
        ids: &[Uuid],
    ) -> Result<(), RepoError> {
        let mut categories = self.categories.lock().await;
        for (index, id) in ids.iter().enumerate() {
            if let Some(record) = categories
                .iter_mut()
                .find(|c| c.kind == kind && c.id == *id)
            {
                record.order = index as i32;
            }
        }
        Ok(())
    }
}

// ----- Newsletter -----

#[derive(Default)]
pub struct FakeNewsletterRepo {
    subscribers: Mutex<Vec<SubscriberRecord>>,
}

#[async_trait]
impl NewsletterRepo for FakeNewsletterRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<SubscriberRecord>, RepoError> {
        Ok(self
            .subscribers
            .lock()
            .await
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError> {
        let record = SubscriberRecord {
            id: Uuid::new_v4(),
            email: params.email,
            name: params.name,
            status: SubscriberStatus::Active,
            subscription_source: params.subscription_source,
            preferences: params.preferences,
            ip_address: params.ip_address,
            user_agent: params.user_agent,
            subscribed_at: params.subscribed_at,
            last_email_sent: None,
            unsubscribed_at: None,
            email_verified: false,
            verification_token: Some(params.verification_token),
        };
        self.subscribers.lock().await.push(record.clone());
        Ok(record)
    }

    async fn save_subscriber(
        &self,
        record: &SubscriberRecord,
    ) -> Result<SubscriberRecord, RepoError> {
        let mut subscribers = self.subscribers.lock().await;
        let slot = subscribers
            .iter_mut()
            .find(|s| s.id == record.id)
            .ok_or(RepoError::NotFound)?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn count_subscribers(&self, status: Option<SubscriberStatus>) -> Result<u64, RepoError> {
        Ok(self
            .subscribers
            .lock()
            .await
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .count() as u64)
    }

    async fn monthly_growth(&self, _since: OffsetDateTime) -> Result<Vec<MonthlyCount>, RepoError> {
        Ok(Vec::new())
    }

    async fn source_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        let mut counts: HashMap<&'static str, u64> = HashMap::new();
        for subscriber in self.subscribers.lock().await.iter() {
            *counts
                .entry(subscriber.subscription_source.as_str())
                .or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(label, count)| LabelCount {
                label: label.to_string(),
                count,
            })
            .collect())
    }

    async fn list_subscribers(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<OffsetPage<SubscriberRecord>, RepoError> {
        let subscribers = self.subscribers.lock().await;
        let matching: Vec<SubscriberRecord> = subscribers
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(OffsetPage { items, total })
    }
}

// ----- Contact -----

#[derive(Default)]
pub struct FakeContactsRepo {
    submissions: Mutex<Vec<ContactRecord>>,
}

#[async_trait]
impl ContactsRepo for FakeContactsRepo {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactRecord, RepoError> {
        let record = ContactRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            subject: params.subject,
            message: params.message,
            inquiry_type: params.inquiry_type,
            status: ContactStatus::New,
            ip_address: params.ip_address,
            user_agent: params.user_agent,
            created_at: OffsetDateTime::now_utc(),
            replied_at: None,
        };
        self.submissions.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list_submissions(
        &self,
        filter: &ContactQueryFilter,
        page: PageRequest,
    ) -> Result<OffsetPage<ContactRecord>, RepoError> {
        let submissions = self.submissions.lock().await;
        let matching: Vec<ContactRecord> = submissions
            .iter()
            .filter(|s| filter.status.is_none_or(|wanted| s.status == wanted))
            .filter(|s| filter.inquiry_type.is_none_or(|wanted| s.inquiry_type == wanted))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(OffsetPage { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactRecord>, RepoError> {
        Ok(self
            .submissions
            .lock()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        replied_at: Option<OffsetDateTime>,
    ) -> Result<Option<ContactRecord>, RepoError> {
        let mut submissions = self.submissions.lock().await;
        Ok(submissions.iter_mut().find(|s| s.id == id).map(|record| {
            record.status = status;
            if replied_at.is_some() {
                record.replied_at = replied_at;
            }
            record.clone()
        }))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut submissions = self.submissions.lock().await;
        let before = submissions.len();
        submissions.retain(|s| s.id != id);
        Ok(submissions.len() != before)
    }

    async fn count_submissions(&self) -> Result<u64, RepoError> {
        Ok(self.submissions.lock().await.len() as u64)
    }

    async fn status_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        Ok(Vec::new())
    }

    async fn inquiry_type_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        Ok(Vec::new())
    }
}

// ----- Carts and wishlists -----

#[derive(Default)]
pub struct FakeCartsRepo {
    carts: Mutex<HashMap<String, CartRecord>>,
}

#[async_trait]
impl CartsRepo for FakeCartsRepo {
    async fn load_cart(&self, user_id: &str) -> Result<Option<CartRecord>, RepoError> {
        Ok(self.carts.lock().await.get(user_id).cloned())
    }

    async fn save_cart(&self, cart: &CartRecord) -> Result<(), RepoError> {
        self.carts
            .lock()
            .await
            .insert(cart.user_id.clone(), cart.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeWishlistsRepo {
    wishlists: Mutex<HashMap<String, WishlistRecord>>,
}

#[async_trait]
impl WishlistsRepo for FakeWishlistsRepo {
    async fn load_wishlist(&self, user_id: &str) -> Result<Option<WishlistRecord>, RepoError> {
        Ok(self.wishlists.lock().await.get(user_id).cloned())
    }

    async fn save_wishlist(&self, wishlist: &WishlistRecord) -> Result<(), RepoError> {
        self.wishlists
            .lock()
            .await
            .insert(wishlist.user_id.clone(), wishlist.clone());
        Ok(())
    }
}

// ----- Health -----

pub struct FakeHealthRepo {
    pub up: bool,
}

#[async_trait]
impl HealthRepo for FakeHealthRepo {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.up {
            Ok(())
        } else {
            Err(RepoError::Timeout)
        }
    }
}

// ----- Cache stores -----

/// A store whose every operation fails, as Redis does when unreachable.
pub struct UnreachableCacheStore;

#[async_trait]
impl CacheStore for UnreachableCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::unavailable("get", "connection refused"))
    }

    async fn set(&self, _key: &str, _value: String, _ttl_secs: u64) -> Result<(), CacheError> {
        Err(CacheError::unavailable("set", "connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("delete", "connection refused"))
    }

    async fn registry_add(&self, _registry: &str, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("registry_add", "connection refused"))
    }

    async fn registry_members(&self, _registry: &str) -> Result<Vec<String>, CacheError> {
        Err(CacheError::unavailable("registry_members", "connection refused"))
    }

    async fn registry_clear(&self, _registry: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("registry_clear", "connection refused"))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::unavailable("ping", "connection refused"))
    }
}

// ----- Wiring -----

pub struct Harness {
    pub state: ApiState,
    pub blogs: Arc<FakeBlogRepo>,
    pub store: Arc<MemoryCacheStore>,
}

pub struct HarnessOptions {
    pub admin_token: Option<&'static str>,
    pub form_limit: u32,
    pub cache_store: Option<Arc<dyn CacheStore>>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            admin_token: Some(ADMIN_TOKEN),
            form_limit: 100,
            cache_store: None,
        }
    }
}

pub fn harness() -> Harness {
    harness_with(HarnessOptions::default())
}

/// Build the full service graph over fakes. Without an explicit store the
/// cache runs on a fresh [`MemoryCacheStore`] exposed on the harness.
pub fn harness_with(options: HarnessOptions) -> Harness {
    let blogs = Arc::new(FakeBlogRepo::default());
    let categories = Arc::new(FakeCategoriesRepo::default());
    let memory = Arc::new(MemoryCacheStore::new());
    let store: Arc<dyn CacheStore> = options
        .cache_store
        .clone()
        .unwrap_or_else(|| memory.clone());
    let (cache, trigger) = build_cache(CacheConfig::default(), store.clone());

    let cart = CartService::new(Arc::new(FakeCartsRepo::default()));

    let state = ApiState {
        blogs: Arc::new(BlogService::new(
            blogs.clone(),
            blogs.clone(),
            cache,
            trigger,
        )),
        product_categories: Arc::new(CategoryService::new(
            CategoryKind::Product,
            categories.clone(),
            categories.clone(),
        )),
        blog_categories: Arc::new(CategoryService::new(
            CategoryKind::Blog,
            categories.clone(),
            categories,
        )),
        newsletter: Arc::new(NewsletterService::new(Arc::new(
            FakeNewsletterRepo::default(),
        ))),
        contact: Arc::new(ContactService::new(Arc::new(FakeContactsRepo::default()))),
        wishlist: Arc::new(WishlistService::new(
            Arc::new(FakeWishlistsRepo::default()),
            cart.clone(),
        )),
        cart: Arc::new(cart),
        health: Arc::new(HealthService::new(
            Arc::new(FakeHealthRepo { up: true }),
            Some(store),
        )),
        admin_token: options.admin_token.map(AdminToken::new),
        rate_limiter: Arc::new(FormRateLimiter::new(
            Duration::from_secs(60),
            options.form_limit,
        )),
    };

    Harness {
        state,
        blogs,
        store: memory,
    }
}
