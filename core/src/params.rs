//! Parameter shapes, one per verb family.
//!
//! `entity` is always a path relative to the API base (`"invoice"`,
//! `"quote"`), never a full URL.

use crate::query::{FilterQuery, QueryOptions};

/// create, createAndUpload, post, patch, mail.
#[derive(Debug, Clone)]
pub struct CreateParams<B> {
    pub entity: String,
    pub json_data: B,
}

impl<B> CreateParams<B> {
    pub fn new(entity: impl Into<String>, json_data: B) -> Self {
        Self {
            entity: entity.into(),
            json_data,
        }
    }
}

/// update, updateAndUpload, upload.
#[derive(Debug, Clone)]
pub struct UpdateParams<B> {
    pub entity: String,
    pub id: String,
    pub json_data: B,
}

impl<B> UpdateParams<B> {
    pub fn new(entity: impl Into<String>, id: impl Into<String>, json_data: B) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
            json_data,
        }
    }
}

/// read, delete, convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParams {
    pub entity: String,
    pub id: String,
}

impl IdParams {
    pub fn new(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    pub entity: String,
    pub query: FilterQuery,
}

impl FilterParams {
    pub fn new(entity: impl Into<String>, query: FilterQuery) -> Self {
        Self {
            entity: entity.into(),
            query,
        }
    }
}

/// search, list, listAll, summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsParams {
    pub entity: String,
    pub options: QueryOptions,
}

impl OptionsParams {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            options: QueryOptions::new(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// Generic get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityParams {
    pub entity: String,
}

impl EntityParams {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }
}
