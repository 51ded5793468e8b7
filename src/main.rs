use std::{path::PathBuf, time::Duration};

use anyhow::bail;
use clap::{command, value_parser, Arg, Command};
use context::Context;

mod context;
mod feed;
mod generator;
mod guard;
mod line;
mod metadata;
mod renderer;
mod server;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .subcommand_required(true)
        .subcommand(
            Command::new("build")
                .about("Generate the site from markdown posts")
                .args(&[
                    Arg::new("posts_dir")
                        .help("Directory path of posts")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("posts"),
                    Arg::new("out_dir")
                        .help("Directory path of output. Existing contents will be removed.")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("out"),
                    Arg::new("public_dir")
                        .help("Directory path of public. Contents will be copied as it is.")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("public"),
                    Arg::new("template_dir")
                        .help("Directory of template")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("template"),
                ]),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve a generated site over HTTP")
                .args(&[
                    Arg::new("dir")
                        .help("Directory to serve")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("out"),
                    Arg::new("port")
                        .help("Port to listen on (falls back to $PORT, then 8080)")
                        .long("port")
                        .short('p')
                        .value_parser(value_parser!(u16)),
                ]),
        )
        .subcommand(Command::new("guard").about(
            "Pre-execution hook: read a tool call as JSON on stdin, veto blocked git commands",
        ))
        .subcommand(
            Command::new("line")
                .about("Run the assembly line demo")
                .args(&[
                    Arg::new("ticks")
                        .help("Number of ticks to run")
                        .long("ticks")
                        .value_parser(value_parser!(u64))
                        .default_value("20"),
                    Arg::new("interval_ms")
                        .help("Milliseconds between ticks")
                        .long("interval-ms")
                        .value_parser(value_parser!(u64))
                        .default_value("800"),
                ]),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("build", matches)) => {
            let posts_dir: &PathBuf = matches.get_one("posts_dir").unwrap();
            if !posts_dir.exists() || !posts_dir.is_dir() {
                bail!("posts_dir must be a directory.");
            }
            let out_dir: &PathBuf = matches.get_one("out_dir").unwrap();
            if out_dir.exists() && !out_dir.is_dir() {
                bail!("if out_dir exists, it must be directory.");
            }
            let public_dir: &PathBuf = matches.get_one("public_dir").unwrap();
            if !public_dir.exists() || !public_dir.is_dir() {
                bail!("public_dir must be a directory.")
            }
            let template_dir: &PathBuf = matches.get_one("template_dir").unwrap();
            if !template_dir.exists() || !template_dir.is_dir() {
                bail!("template_dir must be a directory.")
            }

            let handlebars = renderer::generate_renderer(template_dir)?;

            Context::init(
                posts_dir.to_owned(),
                out_dir.to_owned(),
                public_dir.to_owned(),
                std::env::var("BLOG_NAME").unwrap_or_default(),
                std::env::var("BLOG_URL").unwrap_or_default(),
                handlebars,
            );

            generator::generate()?;
        }
        Some(("serve", matches)) => {
            let dir: &PathBuf = matches.get_one("dir").unwrap();
            if !dir.exists() || !dir.is_dir() {
                bail!("dir must be a directory.");
            }
            let port = matches
                .get_one::<u16>("port")
                .copied()
                .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
                .unwrap_or(8080);
            server::serve(dir, port)?;
        }
        Some(("guard", _)) => {
            let code = guard::run(std::io::stdin().lock())?;
            std::process::exit(code);
        }
        Some(("line", matches)) => {
            let ticks: u64 = *matches.get_one("ticks").unwrap();
            let interval_ms: u64 = *matches.get_one("interval_ms").unwrap();
            line::run(ticks, Duration::from_millis(interval_ms));
        }
        _ => unreachable!(),
    }

    Ok(())
}
