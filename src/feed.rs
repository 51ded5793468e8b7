use std::{fs::OpenOptions, io::BufWriter, path::Path};

use chrono::NaiveTime;
use log::debug;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::generator::utils;
use crate::metadata::PostMetadata;

/// The feed carries only the newest entries.
const FEED_LIMIT: usize = 20;

fn post_url(blog_url: &str, post: &PostMetadata) -> String {
    format!(
        "{}/{}",
        blog_url.trim_end_matches('/'),
        post.path.to_string_lossy()
    )
}

fn build_item(blog_url: &str, post: &PostMetadata) -> Item {
    let link = post_url(blog_url, post);
    // dated posts only reach this point
    let pub_date = post
        .date
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().to_rfc2822());

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .description(Some(post.description.clone()))
        .pub_date(pub_date)
        .guid(Some(
            GuidBuilder::default().value(link).permalink(true).build(),
        ))
        .content(Some(utils::render_markdown(&post.body)))
        .build()
}

/// Builds the RSS 2.0 channel: denylisted and undated posts are excluded,
/// the rest are date-descending and capped at [`FEED_LIMIT`].
pub(crate) fn build_channel(
    blog_name: &str,
    blog_url: &str,
    posts: &[PostMetadata],
) -> Channel {
    let mut entries: Vec<&PostMetadata> = posts
        .iter()
        .filter(|p| p.listed && p.date.is_some())
        .collect();
    entries.sort_by(utils::sort_post);
    entries.truncate(FEED_LIMIT);
    debug!("feed carries {} of {} posts", entries.len(), posts.len());

    let items: Vec<Item> = entries
        .into_iter()
        .map(|p| build_item(blog_url, p))
        .collect();

    ChannelBuilder::default()
        .title(blog_name.to_string())
        .link(blog_url.to_string())
        .description(format!("Posts from {}", blog_name))
        .items(items)
        .build()
}

pub(crate) fn write_feed(
    feed_path: &Path,
    blog_name: &str,
    blog_url: &str,
    posts: &[PostMetadata],
) -> anyhow::Result<()> {
    let channel = build_channel(blog_name, blog_url, posts);
    let fd = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(feed_path)?;
    channel.pretty_write_to(BufWriter::new(fd), b' ', 2)?;
    Ok(())
}
