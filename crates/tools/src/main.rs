//! Build an `index.html` listing every text file in a directory as a post

use anyhow::{Context, Result};
use clap::Parser;
use markup::{Document, HtmlArena, NodeId, ToStringOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "posts", about = "Render a directory of text files as one HTML page")]
struct Args {
    /// Directory holding the post files
    dir: PathBuf,

    /// Where to write the page
    #[arg(short, long, default_value = "index.html")]
    output: PathBuf,

    /// Page title
    #[arg(short, long, default_value = "Posts")]
    title: String,

    /// Indent the output over multiple lines
    #[arg(short, long)]
    multiline: bool,
}

/// One `div.post` with the file stem as heading and its lines split by `<br>`
fn post_node(arena: &mut HtmlArena, name: &str, body: &str) -> Result<NodeId> {
    let post = arena.create_element("div.post");
    let heading = arena.create_element_with_text("h1", name);
    let paragraph = arena.create_element("p");

    for (index, line) in body.lines().enumerate() {
        if index > 0 {
            let br = arena.create_element("br");
            arena.node_mut(br)?.use_closing_tag(false);
            arena.node_mut(paragraph)?.append_child(br)?;
        }
        arena.node_mut(paragraph)?.append_text(line)?;
    }

    arena
        .node_mut(post)?
        .append_child(heading)?
        .append_child(paragraph)?;
    Ok(post)
}

fn collect_posts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn build_page(args: &Args) -> Result<Document> {
    let mut document = Document::new();

    let arena = document.arena_mut();
    let title = arena.create_element_with_text("title", &args.title);
    let meta = arena.create_element("meta[charset=\"UTF-8\"]");
    arena.node_mut(meta)?.use_closing_tag(false);
    document.append_node_to_head(meta)?;
    document.append_node_to_head(title)?;

    let container = document.arena_mut().create_element("div.container");
    for path in collect_posts(&args.dir)? {
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let arena = document.arena_mut();
        let post = post_node(arena, &name, &body)?;
        arena.node_mut(container)?.append_child(post)?;
        tracing::debug!("added post {:?}", name);
    }
    document.append_node_to_body(container)?;

    Ok(document)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let document = build_page(&args)?;

    let options = if args.multiline {
        ToStringOptions::multiline()
    } else {
        ToStringOptions::default()
    };
    document
        .write_to_file(&args.output, options)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let posts = document.query_selector("div.post")?.len();
    println!(
        "{} post(s) from {} written to {}",
        posts,
        args.dir.display(),
        args.output.display()
    );
    Ok(())
}
