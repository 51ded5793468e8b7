use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use chrono::NaiveDate;

/// Files that never show up in post listings or the feed. They are still
/// rendered as standalone pages.
pub(crate) const EXCLUDED_FILES: &[&str] = &["index.md", "about.md", "README.md"];

#[derive(serde::Serialize, Debug, Clone)]
pub(crate) struct PostMetadata {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub tags: Vec<String>,
    pub date: Option<NaiveDate>,
    /// Output path of the rendered page, relative to the output directory.
    pub path: PathBuf,
    /// Markdown body with the frontmatter block stripped.
    #[serde(skip_serializing)]
    pub body: String,
    /// Whether the post appears in listings and the feed.
    #[serde(skip_serializing)]
    pub listed: bool,
}

pub(crate) fn from_file(posts_dir: &Path, file_path: &Path) -> anyhow::Result<PostMetadata> {
    let content = std::fs::read_to_string(posts_dir.join(file_path))?;
    parse(file_path, &content)
}

/// Parses the `---`-delimited frontmatter block at the top of `content`.
/// Fields are `key: value` lines, with optional double quotes around the
/// value. Unknown keys are ignored; a file without a block is a post whose
/// body is the whole file.
pub(crate) fn parse(file_path: &Path, content: &str) -> anyhow::Result<PostMetadata> {
    let mut file_path_html = file_path.to_path_buf();
    file_path_html.set_extension("html");

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut metadata = PostMetadata {
        title: "".to_string(),
        slug: file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        description: "".to_string(),
        tags: vec![],
        date: None,
        path: file_path_html,
        body: "".to_string(),
        listed: !EXCLUDED_FILES.contains(&file_name.as_str()),
    };

    let header_pattern = regex::RegexBuilder::new(r"^---\r?\n(.*?)\r?\n---\r?\n(.*)")
        .dot_matches_new_line(true)
        .build()
        .unwrap();
    let field_pattern = regex::Regex::new(r#"^([A-Za-z_]+):\s*"?(.*?)"?\s*$"#).unwrap();

    metadata.body = if let Some(caps) = header_pattern.captures(content) {
        let header = &caps[1];
        for line in header.split('\n') {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some(field) = field_pattern.captures(line) else {
                bail!("Invalid header: {}", line);
            };

            let name = &field[1];
            let value = field[2].trim();
            match name {
                "title" => {
                    metadata.title = value.to_string();
                }
                "slug" => {
                    metadata.slug = value.to_string();
                }
                "description" => {
                    metadata.description = value.to_string();
                }
                "tag" | "tags" => {
                    metadata.tags = value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                "date" => {
                    metadata.date = Some(
                        NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .context("Invalid date format")?,
                    );
                }
                _ => {}
            }
        }

        caps[2].to_string()
    } else {
        content.to_string()
    };

    if metadata.title.is_empty() {
        metadata.title = metadata.slug.clone();
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn parses_all_recognized_fields() {
        let content = concat!(
            "---\n",
            "title: \"Hello, world\"\n",
            "date: 2024-03-09\n",
            "slug: hello\n",
            "description: \"First post\"\n",
            "tags: rust, blog\n",
            "---\n",
            "body text\n",
        );
        let meta = parse(Path::new("hello-world.md"), content).unwrap();
        assert_eq!(meta.title, "Hello, world");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(meta.slug, "hello");
        assert_eq!(meta.description, "First post");
        assert_eq!(meta.tags, vec!["rust", "blog"]);
        assert_eq!(meta.path, PathBuf::from("hello-world.html"));
        assert_eq!(meta.body, "body text\n");
        assert!(meta.listed);
    }

    #[test]
    fn missing_fields_are_skipped() {
        let content = "---\ntitle: only a title\n---\nbody\n";
        let meta = parse(Path::new("notes/scratch.md"), content).unwrap();
        assert_eq!(meta.title, "only a title");
        assert_eq!(meta.date, None);
        assert_eq!(meta.description, "");
        assert!(meta.tags.is_empty());
        assert_eq!(meta.slug, "scratch");
    }

    #[test]
    fn file_without_frontmatter_is_whole_body() {
        let content = "just markdown, no header\n";
        let meta = parse(Path::new("plain.md"), content).unwrap();
        assert_eq!(meta.body, content);
        assert_eq!(meta.title, "plain");
        assert_eq!(meta.date, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let content = "---\ntitle: t\nlayout: home\n---\nb\n";
        let meta = parse(Path::new("a.md"), content).unwrap();
        assert_eq!(meta.title, "t");
    }

    #[test]
    fn malformed_header_line_is_an_error() {
        let content = "---\ntitle broken line\n---\nb\n";
        assert!(parse(Path::new("a.md"), content).is_err());
    }

    #[test]
    fn invalid_date_is_an_error() {
        let content = "---\ndate: 09/03/2024\n---\nb\n";
        assert!(parse(Path::new("a.md"), content).is_err());
    }

    #[test]
    fn denylisted_files_are_unlisted() {
        for name in ["index.md", "about.md", "README.md"] {
            let meta = parse(Path::new(name), "---\ntitle: t\n---\nb\n").unwrap();
            assert!(!meta.listed, "{name} should be unlisted");
        }
        let meta = parse(Path::new("sub/index.md"), "b\n").unwrap();
        assert!(!meta.listed);
    }

    #[test]
    fn horizontal_rule_in_body_does_not_truncate_it() {
        let content = "---\ntitle: t\n---\nabove\n\n---\n\nbelow\n";
        let meta = parse(Path::new("a.md"), content).unwrap();
        assert!(meta.body.contains("below"));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut fd = std::fs::File::create(dir.path().join("post.md")).unwrap();
        write!(fd, "---\ntitle: from disk\ndate: 2023-01-01\n---\nhi\n").unwrap();

        let meta = from_file(dir.path(), Path::new("post.md")).unwrap();
        assert_eq!(meta.title, "from disk");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2023, 1, 1));
    }
}
