//! List site content

use anyhow::Result;

use crate::generator::Generator;
use crate::helpers::format_date;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let store = folio.load_store()?;

    match content_type {
        "post" | "posts" => {
            let posts = store.ordered_posts();
            println!("Posts ({}):", posts.len());
            for post in posts {
                let date = post
                    .date
                    .as_ref()
                    .map(|d| format_date(d, "YYYY-MM-DD"))
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {} - {} [{}]", date, post.title, post.source);
            }
        }
        "page" | "pages" => {
            println!("Pages ({}):", store.pages().len());
            for page in store.pages() {
                println!("  {} - {} [{}]", page.slug, page.title, page.source);
            }
        }
        "route" | "routes" => {
            let manifest = Generator::new(folio)?.route_manifest(&store);
            println!(
                "Routes ({}):",
                manifest.pages.len() + manifest.posts.len() + 1
            );
            println!("  /");
            for route in manifest.pages.iter().chain(&manifest.posts) {
                println!("  {}", route.path);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, route",
                content_type
            );
        }
    }

    Ok(())
}
