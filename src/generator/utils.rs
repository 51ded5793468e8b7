use std::{borrow::Borrow, cmp::Ordering};

use maud::html;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::metadata::PostMetadata;

/// Ordering used by every listing: date descending, undated posts last,
/// ties broken by title descending.
pub(crate) fn sort_post<T: Borrow<PostMetadata>>(a: &T, b: &T) -> Ordering {
    match (a.borrow().date, b.borrow().date) {
        (Some(ref a_date), Some(ref b_date)) => b_date.cmp(a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.borrow().title.cmp(&a.borrow().title),
    }
}

fn render_gallery_item(src: &str, title: &str, alt: &str) -> String {
    let caption = if title.is_empty() { alt } else { title };
    html! {
        a.lightbox href=(src) data-caption=(caption) {
            figure.gallery-item {
                img src=(src) alt=(alt) loading="lazy";
                @if !caption.is_empty() {
                    figcaption { (caption) }
                }
            }
        }
    }
    .into_string()
}

/// Event mapper applied to every parsed markdown stream: promotes soft
/// breaks to hard breaks, and rewrites images into lightbox-ready gallery
/// markup. The image's alt text events are swallowed and re-emitted inside
/// the generated markup.
fn gen_event_mapper() -> Box<dyn FnMut(Event) -> Event> {
    let mut pending_image: Option<(String, String)> = None;
    let mut alt = String::new();

    Box::new(move |event: Event| -> Event {
        match event {
            Event::Start(Tag::Image {
                ref dest_url,
                ref title,
                ..
            }) => {
                pending_image = Some((dest_url.to_string(), title.to_string()));
                alt.clear();
                Event::Text("".into())
            }
            Event::Text(ref text) if pending_image.is_some() => {
                alt.push_str(text);
                Event::Text("".into())
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, title)) = pending_image.take() {
                    Event::Html(render_gallery_item(&src, &title, &alt).into())
                } else {
                    event
                }
            }
            Event::SoftBreak => Event::HardBreak,
            _ => event,
        }
    })
}

pub(crate) fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(body, options).map(gen_event_mapper());

    let mut body_html = String::new();
    pulldown_cmark::html::push_html(&mut body_html, parser);
    body_html
}
