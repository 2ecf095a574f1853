use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CategoryQueryFilter, CreateCategoryParams, RepoError,
    UpdateCategoryParams,
};
use crate::domain::entities::CategoryRecord;
use crate::domain::slug::{SlugError, derive_slug};
use crate::domain::types::CategoryKind;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("category name is required")]
    NameRequired,
    #[error("{0} with this name already exists")]
    Duplicate(&'static str),
    #[error("category ids must be an array")]
    InvalidOrder,
    #[error("could not derive a slug: {0}")]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub parent_category: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub parent_category: Option<Option<Uuid>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Product and blog categories; one instance per [`CategoryKind`].
#[derive(Clone)]
pub struct CategoryService {
    kind: CategoryKind,
    reader: Arc<dyn CategoriesRepo>,
    writer: Arc<dyn CategoriesWriteRepo>,
}

impl CategoryService {
    pub fn new(
        kind: CategoryKind,
        reader: Arc<dyn CategoriesRepo>,
        writer: Arc<dyn CategoriesWriteRepo>,
    ) -> Self {
        Self {
            kind,
            reader,
            writer,
        }
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    pub async fn list(
        &self,
        filter: &CategoryQueryFilter,
    ) -> Result<Vec<CategoryRecord>, CategoryError> {
        self.reader
            .list_categories(self.kind, filter)
            .await
            .map_err(CategoryError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryRecord, CategoryError> {
        self.reader
            .find_by_id(self.kind, id)
            .await?
            .ok_or(CategoryError::NotFound(self.kind.label()))
    }

    pub async fn create(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(CategoryError::NameRequired);
        }
        let slug = derive_slug(&name)?;

        if self
            .reader
            .find_conflict(self.kind, &name, &slug, None)
            .await?
            .is_some()
        {
            return Err(CategoryError::Duplicate(self.kind.label()));
        }

        let order = self
            .reader
            .max_order(self.kind)
            .await?
            .map_or(1, |max| max + 1);
        let description = command.description.unwrap_or_default();

        let params = CreateCategoryParams {
            kind: self.kind,
            meta_title: command.meta_title.unwrap_or_else(|| name.clone()),
            meta_description: command
                .meta_description
                .unwrap_or_else(|| description.clone()),
            name,
            slug,
            description,
            image: command.image.unwrap_or_default(),
            icon: command.icon.unwrap_or_default(),
            is_active: command.is_active.unwrap_or(true),
            parent_category: command.parent_category,
            order,
        };

        let category = self.writer.create_category(params).await?;
        info!(
            target = "pinkdreams::categories",
            kind = self.kind.as_str(),
            category_id = %category.id,
            slug = %category.slug,
            "Category created"
        );
        Ok(category)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, CategoryError> {
        let existing = self.get(id).await?;

        let (name, slug) = match command.name.map(|name| name.trim().to_string()) {
            Some(name) if !name.is_empty() && name != existing.name => {
                let slug = derive_slug(&name)?;
                if self
                    .reader
                    .find_conflict(self.kind, &name, &slug, Some(id))
                    .await?
                    .is_some()
                {
                    return Err(CategoryError::Duplicate(self.kind.label()));
                }
                (name, slug)
            }
            _ => (existing.name.clone(), existing.slug.clone()),
        };

        let params = UpdateCategoryParams {
            kind: self.kind,
            id,
            name,
            slug,
            description: command.description.unwrap_or(existing.description),
            image: command.image.unwrap_or(existing.image),
            icon: command.icon.unwrap_or(existing.icon),
            is_active: command.is_active.unwrap_or(existing.is_active),
            parent_category: command.parent_category.unwrap_or(existing.parent_category),
            meta_title: command.meta_title.unwrap_or(existing.meta_title),
            meta_description: command.meta_description.unwrap_or(existing.meta_description),
            order: command.order.unwrap_or(existing.order),
        };

        self.save(params).await
    }

    /// Flip the active flag and return the updated record.
    pub async fn toggle_active(&self, id: Uuid) -> Result<CategoryRecord, CategoryError> {
        let existing = self.get(id).await?;
        let params = UpdateCategoryParams {
            kind: self.kind,
            id,
            name: existing.name,
            slug: existing.slug,
            description: existing.description,
            image: existing.image,
            icon: existing.icon,
            is_active: !existing.is_active,
            parent_category: existing.parent_category,
            meta_title: existing.meta_title,
            meta_description: existing.meta_description,
            order: existing.order,
        };
        self.save(params).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CategoryError> {
        if !self.writer.delete_category(self.kind, id).await? {
            return Err(CategoryError::NotFound(self.kind.label()));
        }
        info!(
            target = "pinkdreams::categories",
            kind = self.kind.as_str(),
            category_id = %id,
            "Category deleted"
        );
        Ok(())
    }

    pub async fn reorder(&self, ids: Option<Vec<Uuid>>) -> Result<(), CategoryError> {
        let ids = ids.ok_or(CategoryError::InvalidOrder)?;
        self.writer
            .reorder_categories(self.kind, &ids)
            .await
            .map_err(CategoryError::from)
    }

    pub async fn stats(&self) -> Result<CategoryStats, CategoryError> {
        let total = self.reader.count_categories(self.kind, None).await?;
        let active = self.reader.count_categories(self.kind, Some(true)).await?;
        let inactive = self.reader.count_categories(self.kind, Some(false)).await?;
        Ok(CategoryStats {
            total,
            active,
            inactive,
        })
    }

    async fn save(&self, params: UpdateCategoryParams) -> Result<CategoryRecord, CategoryError> {
        self.writer
            .update_category(params)
            .await?
            .ok_or(CategoryError::NotFound(self.kind.label()))
    }
}
