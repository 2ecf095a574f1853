//! Cache key construction.
//!
//! Keys are plain strings so they stay readable in `redis-cli`. User-typed
//! segments are percent-encoded; a `:` in a search term can never
//! masquerade as a segment delimiter.

use std::fmt;

use urlencoding::encode;
use uuid::Uuid;

use crate::application::repos::{BlogListQuery, BlogSortBy, SortOrder};

pub const BLOG_LIST_PREFIX: &str = "blogs:list";
pub const BLOG_DETAIL_PREFIX: &str = "blog:detail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A filtered listing page; tracked in the key registry.
    List,
    /// A single entity; invalidated directly by id.
    Detail,
}

impl KeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::List => "list",
            KeyKind::Detail => "detail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: KeyKind,
    value: String,
}

impl CacheKey {
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_list(&self) -> bool {
        self.kind == KeyKind::List
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Key for one page of the blog listing.
///
/// The base layout is fixed; sort and status segments only appear when
/// they differ from the defaults.
pub fn blog_list_key(query: &BlogListQuery) -> CacheKey {
    let mut value = format!(
        "{BLOG_LIST_PREFIX}:page={}:limit={}:search={}:cat={}:tag={}",
        query.page,
        query.limit,
        encode(&query.search),
        encode(&query.category),
        encode(&query.tag),
    );

    if query.sort_by != BlogSortBy::Latest || query.sort_order != SortOrder::Desc {
        value.push_str(":sort=");
        value.push_str(query.sort_by.as_str());
        value.push(':');
        value.push_str(query.sort_order.as_str());
    }

    if let Some(status) = query.status {
        value.push_str(":status=");
        value.push_str(status.as_str());
    }

    CacheKey {
        kind: KeyKind::List,
        value,
    }
}

pub fn blog_detail_key(id: Uuid) -> CacheKey {
    CacheKey {
        kind: KeyKind::Detail,
        value: format!("{BLOG_DETAIL_PREFIX}:{id}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use insta::assert_snapshot;

    use super::*;
    use crate::application::repos::BlogListParams;
    use crate::domain::types::BlogStatus;

    fn normalized(params: BlogListParams) -> BlogListQuery {
        BlogListQuery::normalize(&params).expect("query")
    }

    #[test]
    fn default_query_key_layout() {
        let key = blog_list_key(&BlogListQuery::default());
        assert_snapshot!(key.as_str(), @"blogs:list:page=1:limit=10:search=:cat=all:tag=");
        assert!(key.is_list());
    }

    #[test]
    fn equivalent_requests_share_a_key() {
        let explicit = normalized(BlogListParams {
            page: Some("1".into()),
            limit: Some("10".into()),
            category: Some("all".into()),
            sort_by: Some("latest".into()),
            sort_order: Some("desc".into()),
            status: Some("All".into()),
            ..Default::default()
        });
        let implicit = normalized(BlogListParams::default());
        assert_eq!(blog_list_key(&explicit), blog_list_key(&implicit));
    }

    #[test]
    fn every_filter_field_changes_the_key() {
        let base = BlogListQuery::default();
        let variants = [
            BlogListQuery {
                page: 2,
                ..base.clone()
            },
            BlogListQuery {
                limit: 20,
                ..base.clone()
            },
            BlogListQuery {
                search: "silk".into(),
                ..base.clone()
            },
            BlogListQuery {
                category: "Fashion".into(),
                ..base.clone()
            },
            BlogListQuery {
                tag: "summer".into(),
                ..base.clone()
            },
            BlogListQuery {
                sort_by: BlogSortBy::Name,
                ..base.clone()
            },
            BlogListQuery {
                sort_order: SortOrder::Asc,
                ..base.clone()
            },
            BlogListQuery {
                status: Some(BlogStatus::Draft),
                ..base.clone()
            },
        ];

        let mut keys: HashSet<String> = HashSet::new();
        keys.insert(blog_list_key(&base).to_string());
        for variant in &variants {
            assert!(
                keys.insert(blog_list_key(variant).to_string()),
                "duplicate key for {variant:?}"
            );
        }
    }

    #[test]
    fn free_text_cannot_forge_segments() {
        let forged = BlogListQuery {
            search: "x:cat=Beauty".into(),
            ..BlogListQuery::default()
        };
        let honest = BlogListQuery {
            search: "x".into(),
            category: "Beauty".into(),
            ..BlogListQuery::default()
        };
        let forged_key = blog_list_key(&forged);
        assert_ne!(forged_key, blog_list_key(&honest));
        assert_snapshot!(
            forged_key.as_str(),
            @"blogs:list:page=1:limit=10:search=x%3Acat%3DBeauty:cat=all:tag="
        );
    }

    #[test]
    fn non_default_sort_and_status_are_appended() {
        let query = BlogListQuery {
            sort_by: BlogSortBy::MostLiked,
            status: Some(BlogStatus::Published),
            ..BlogListQuery::default()
        };
        assert_snapshot!(
            blog_list_key(&query).as_str(),
            @"blogs:list:page=1:limit=10:search=:cat=all:tag=:sort=most_liked:desc:status=published"
        );
    }

    #[test]
    fn detail_keys_embed_the_id() {
        let id = Uuid::nil();
        let key = blog_detail_key(id);
        assert_eq!(key.kind(), KeyKind::Detail);
        assert_eq!(
            key.as_str(),
            "blog:detail:00000000-0000-0000-0000-000000000000"
        );
    }
}
