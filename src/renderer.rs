use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use handlebars::{handlebars_helper, Handlebars};

handlebars_helper!(breadcrumbs: |path: PathBuf| {
    let mut current_path = PathBuf::from("/");
    let mut res = String::new();
    let mut components = path.components();
    if path.has_root() {
        components.next();
    }
    res.push_str("<a href=\"/\">/</a> ");
    for (i, c) in components.enumerate() {
        current_path.push(c);
        let _ = write!(
            res,
            "{}<a href=\"{}\">{}</a>",
            if i == 0 {""} else {" / "},
            current_path.to_string_lossy(),
            current_path.file_stem().unwrap().to_string_lossy() // file_prefix: unstable
        );
    }

    res
});

handlebars_helper!(slice_until: |lst: array, upper: usize| lst[..upper.min(lst.len())].to_owned());
handlebars_helper!(slice_since: |lst: array, lower: usize| lst[lower.min(lst.len())..].to_owned());
handlebars_helper!(slice: |lst: array, lower: usize, upper: usize| {
    let upper = upper.min(lst.len());
    let lower = lower.min(upper);
    lst[lower..upper].to_owned()
});

pub(super) fn generate_renderer(template_dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = handlebars::Handlebars::new();
    handlebars.register_helper("breadcrumbs", Box::new(breadcrumbs));
    handlebars.register_helper("slice", Box::new(slice));
    handlebars.register_helper("slice_since", Box::new(slice_since));
    handlebars.register_helper("slice_until", Box::new(slice_until));
    handlebars
        .register_template_file("index", template_dir.join("index.hbs"))
        .context("index.hbs")?;
    handlebars
        .register_template_file("article", template_dir.join("article.hbs"))
        .context("article.hbs")?;
    handlebars
        .register_template_file("list", template_dir.join("list.hbs"))
        .context("list.hbs")?;
    handlebars.register_partial(
        "layout",
        std::fs::read_to_string(template_dir.join("layout.hbs")).context("layout.hbs")?,
    )?;

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("slice", Box::new(slice));
        handlebars.register_helper("slice_since", Box::new(slice_since));
        handlebars.register_helper("slice_until", Box::new(slice_until));
        handlebars
    }

    #[test]
    fn slice_helpers_render_in_bounds_ranges() {
        let handlebars = registry();
        let data = json!({ "lst": ["a", "b", "c"] });
        let rendered = handlebars
            .render_template("{{#each (slice lst 1 3)}}{{this}}{{/each}}", &data)
            .unwrap();
        assert_eq!(rendered, "bc");
    }

    #[test]
    fn slice_helpers_clamp_out_of_bounds_arguments() {
        let handlebars = registry();
        let data = json!({ "lst": ["a", "b", "c"] });
        for (template, expected) in [
            ("{{#each (slice_until lst 10)}}{{this}}{{/each}}", "abc"),
            ("{{#each (slice_since lst 10)}}{{this}}{{/each}}", ""),
            ("{{#each (slice lst 1 10)}}{{this}}{{/each}}", "bc"),
            // lower past the clamped upper must not panic
            ("{{#each (slice lst 5 3)}}{{this}}{{/each}}", ""),
        ] {
            let rendered = handlebars.render_template(template, &data).unwrap();
            assert_eq!(rendered, expected, "{template}");
        }
    }
}
