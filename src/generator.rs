use std::{
    collections::{HashMap, VecDeque},
    fs::OpenOptions,
    io::BufWriter,
    path::PathBuf,
};

use anyhow::Context as _;
use fs_extra::dir::CopyOptions;
use log::{debug, info};

use crate::{context::Context, feed, metadata, metadata::PostMetadata};

mod data;
pub(crate) mod utils;

use data::{ListPageData, PostPageData, SidebarEntry};

fn generate_post(metadata: &PostMetadata) -> anyhow::Result<()> {
    let ctx = Context::instance();

    let body_html = utils::render_markdown(&metadata.body);

    let out_path = ctx.out_dir.join(&metadata.path);
    if out_path.parent().map_or(false, |p| !p.exists()) {
        std::fs::create_dir_all(out_path.parent().unwrap())?;
    }
    let fd = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(out_path)?;

    let data = PostPageData {
        blog_name: &ctx.blog_name,
        body: body_html,
        meta: metadata,
    };
    ctx.handlebars
        .render_to_write("article", &data, fd)
        .with_context(|| format!("while generating from {:?}", metadata.path))?;
    Ok(())
}

pub(crate) fn generate() -> anyhow::Result<()> {
    let ctx = Context::instance();

    fs_extra::dir::remove(&ctx.out_dir)?;
    fs_extra::dir::create_all(&ctx.out_dir, false)?;

    // copy `public_dir`
    let mut cp_opts = CopyOptions::new();
    cp_opts.copy_inside = true;
    cp_opts.content_only = true;
    cp_opts.overwrite = true;
    fs_extra::dir::copy(&ctx.public_dir, ctx.out_dir.join(&ctx.public_dir), &cp_opts)?;

    // master data
    let mut posts = vec![];

    // subdirectory data: indices of `posts` per directory
    let mut directories: HashMap<PathBuf, Vec<usize>> = HashMap::new();
    let mut tags: HashMap<String, Vec<usize>> = HashMap::new();

    // traversing `posts_dir`
    let mut q = VecDeque::new();
    q.push_back(PathBuf::new());
    while let Some(path) = q.pop_front() {
        let current_searching_directory_path = ctx.posts_dir.join(&path);

        let entries_in_current_path = directories.entry(path.clone()).or_default();

        for entry in std::fs::read_dir(current_searching_directory_path)? {
            let entry = entry?;
            let meta = entry.metadata()?;

            if meta.is_dir() {
                q.push_back(path.join(entry.file_name()));
            } else if meta.is_file() {
                let file_path = path.join(entry.file_name());
                if file_path.extension().map_or(true, |ext| ext != "md") {
                    debug!("skipping non-markdown file {:?}", file_path);
                    continue;
                }
                let post_meta = metadata::from_file(&ctx.posts_dir, &file_path)
                    .with_context(|| format!("while preprocessing {:?}", file_path))?;
                // denylisted posts stay out of tag listings too
                if post_meta.listed {
                    for tag in post_meta.tags.iter() {
                        let tag_entries = tags.entry(tag.to_string()).or_default();
                        (*tag_entries).push(posts.len());
                    }
                }
                (*entries_in_current_path).push(posts.len());
                posts.push(post_meta);
            }
        }
    }
    info!("found {} posts", posts.len());

    // generate post pages
    for post in posts.iter() {
        generate_post(post)?;
    }

    // listed posts ordered by date(descending)
    let mut listed: Vec<&PostMetadata> = posts.iter().filter(|p| p.listed).collect();
    listed.sort_by(utils::sort_post);

    // generate index page
    {
        let index_fd = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(ctx.out_dir.join("index.html"))?;

        let index_data = ListPageData {
            blog_name: &ctx.blog_name,
            title: "index".to_string(),
            path: PathBuf::from("/"),
            posts: listed.clone(),
        };
        ctx.handlebars
            .render_to_write("index", &index_data, index_fd)
            .context("while generating index.html")?;
    }

    // sidebar data for client-side navigation
    {
        let sidebar: Vec<SidebarEntry> = listed
            .iter()
            .map(|p| SidebarEntry {
                title: &p.title,
                path: &p.path,
                date: p.date,
                description: &p.description,
            })
            .collect();
        let fd = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(ctx.out_dir.join("sidebar.json"))?;
        serde_json::to_writer_pretty(BufWriter::new(fd), &sidebar)
            .context("while generating sidebar.json")?;
    }

    // generate directory index pages
    for (dir_name, entry) in directories.into_iter() {
        // the root index page is generated above
        if dir_name == PathBuf::new() {
            continue;
        }

        let path = ctx.out_dir.join(&dir_name).join("index.html");
        if path.parent().map_or(false, |p| !p.exists()) {
            std::fs::create_dir_all(path.parent().unwrap())?;
        }
        let title = dir_name.to_string_lossy().to_string();
        let fd = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut dir_posts: Vec<&PostMetadata> = entry
            .iter()
            .map(|idx| &posts[*idx])
            .filter(|p| p.listed)
            .collect();
        dir_posts.sort_by(utils::sort_post);

        let data = ListPageData {
            blog_name: &ctx.blog_name,
            title: title.clone(),
            path: dir_name,
            posts: dir_posts,
        };
        ctx.handlebars
            .render_to_write("list", &data, fd)
            .with_context(|| format!("while generating list for {:?}", title))?;
    }

    // generate tag pages
    fs_extra::dir::create_all(ctx.out_dir.join("tags"), false)?;
    for (tag, post_indices) in tags.into_iter() {
        let mut path = ctx.out_dir.join("tags").join(&tag);
        path.set_extension("html");
        let fd = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut tagged: Vec<&PostMetadata> = post_indices.into_iter().map(|idx| &posts[idx]).collect();
        tagged.sort_by(utils::sort_post);

        let data = ListPageData {
            blog_name: &ctx.blog_name,
            title: format!("tag: {}", tag),
            path: PathBuf::from("/tags").join(&tag),
            posts: tagged,
        };
        ctx.handlebars
            .render_to_write("list", &data, fd)
            .with_context(|| format!("while generating for {:?}", data.title))?;
    }

    // generate feed.xml
    feed::write_feed(
        &ctx.out_dir.join("feed.xml"),
        &ctx.blog_name,
        &ctx.blog_url,
        &posts,
    )
    .context("while generating feed.xml")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    // Full build against the shipped templates. This is the only test that
    // touches the process-wide Context, so it owns it.
    #[test]
    fn build_renders_listings_through_the_shipped_templates() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("posts")).unwrap();
        fs::create_dir(root.path().join("public")).unwrap();
        fs::write(root.path().join("public/style.css"), "body {}\n").unwrap();
        fs::write(
            root.path().join("posts/real-post.md"),
            "---\ntitle: Real post\ndate: 2024-04-01\ntags: meta\n---\nbody\n",
        )
        .unwrap();
        fs::write(
            root.path().join("posts/second-post.md"),
            "---\ntitle: Second post\ndate: 2024-04-02\ntags: meta\n---\nbody\n",
        )
        .unwrap();
        fs::write(
            root.path().join("posts/about.md"),
            "---\ntitle: About\ntags: meta, hidden\n---\nbody\n",
        )
        .unwrap();
        fs::create_dir(root.path().join("posts/projects")).unwrap();
        fs::write(
            root.path().join("posts/projects/thing.md"),
            "---\ntitle: A project\ndate: 2024-03-01\n---\nbody\n",
        )
        .unwrap();

        let template_dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/template"));
        let handlebars = crate::renderer::generate_renderer(template_dir).unwrap();

        // generate() resolves its directories as the teacher does: relative
        // to the working directory.
        std::env::set_current_dir(root.path()).unwrap();
        Context::init(
            PathBuf::from("posts"),
            PathBuf::from("out"),
            PathBuf::from("public"),
            "testblog".to_string(),
            "https://blog.example.com".to_string(),
            handlebars,
        );
        generate().unwrap();

        // every listing shows each post's own title as its link text
        let index = fs::read_to_string("out/index.html").unwrap();
        assert!(index.contains("<a href=\"/real-post.html\">Real post</a>"));
        assert!(index.contains("<a href=\"/second-post.html\">Second post</a>"));

        let tag_page = fs::read_to_string("out/tags/meta.html").unwrap();
        assert!(tag_page.contains("<a href=\"/real-post.html\">Real post</a>"));
        assert!(tag_page.contains("<a href=\"/second-post.html\">Second post</a>"));

        let dir_page = fs::read_to_string("out/projects/index.html").unwrap();
        assert!(dir_page.contains("<a href=\"/projects/thing.html\">A project</a>"));

        // denylisted posts render as pages but stay out of tag listings,
        // and a tag carried only by denylisted posts gets no page at all
        assert!(fs::read_to_string("out/about.html").is_ok());
        assert!(!tag_page.contains("about.html"));
        assert!(!Path::new("out/tags/hidden.html").exists());
    }
}
