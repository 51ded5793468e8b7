use serde::Serialize;
use std::path::PathBuf;

use crate::metadata::PostMetadata;

#[derive(Serialize, Debug)]
pub(super) struct PostPageData<'a> {
    pub blog_name: &'static str,
    pub body: String,
    pub meta: &'a PostMetadata,
}

#[derive(Serialize, Debug)]
pub(super) struct ListPageData<'a> {
    pub blog_name: &'static str,
    pub title: String,
    pub path: PathBuf,
    pub posts: Vec<&'a PostMetadata>,
}

/// One entry of `sidebar.json`, consumed by client-side navigation.
#[derive(Serialize, Debug)]
pub(super) struct SidebarEntry<'a> {
    pub title: &'a str,
    pub path: &'a PathBuf,
    pub date: Option<chrono::NaiveDate>,
    pub description: &'a str,
}
