use std::{path::PathBuf, sync::OnceLock};

#[derive(Debug)]
pub(crate) struct Context {
    pub posts_dir: PathBuf,
    pub out_dir: PathBuf,
    pub public_dir: PathBuf,

    pub blog_name: String,
    pub blog_url: String,

    pub handlebars: handlebars::Handlebars<'static>,
}

static CONTEXT: OnceLock<Context> = OnceLock::new();

impl Context {
    pub fn init(
        posts_dir: PathBuf,
        out_dir: PathBuf,
        public_dir: PathBuf,
        blog_name: String,
        blog_url: String,
        handlebars: handlebars::Handlebars<'static>,
    ) {
        CONTEXT
            .set(Self {
                posts_dir,
                out_dir,
                public_dir,
                blog_name,
                blog_url,
                handlebars,
            })
            .unwrap();
    }

    pub fn instance() -> &'static Context {
        CONTEXT.get().unwrap()
    }
}
