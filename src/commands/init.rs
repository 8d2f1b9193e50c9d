//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# folio configuration

# Site
title: folio
author: John Doe
tagline: software engineer
description: ''
timezone: ''

# URL
url: http://example.com
root: /
posts_dir: posts

# Directory
content_dir: content
static_dir: static
public_dir: public
ignore: []

# Writing
render_drafts: false
strict: false
highlight:
  theme: base16-ocean.dark
  line_number: false

# Date format
date_format: MMMM D, YYYY

# Links, shown in this order on the home page and page footers
links:
  email: mailto:john@example.com
  github: https://github.com/
  linkedin: https://www.linkedin.com/
  cv: /index.pdf
"#;

const STYLE: &str = r#"body { max-width: 42rem; margin: 2rem auto; padding: 0 1rem; font-family: sans-serif; }
.links { display: flex; gap: 1.25rem; list-style: none; padding: 0; }
.mb-1 { margin-bottom: 0.25rem; }
.mt-1 { margin-top: 0.25rem; }
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content/pages"))?;
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, CONFIG)?;
    }

    write_if_missing(&target_dir.join("static/style.css"), STYLE)?;

    write_if_missing(
        &target_dir.join("content/pages/about.md"),
        r#"---
title: About
description: A little about me
---

This page lives at `/about/`. Nested files such as `pages/projects/foo.md`
are served at `/projects/foo/`.
"#,
    )?;

    let now = chrono::Local::now();
    write_if_missing(
        &target_dir.join("content/posts/hello-world.md"),
        &format!(
            r#"---
title: Hello World
description: The first post
date: {}
---

Welcome! Posts are listed on the home page, newest first.

```bash
$ folio new "My New Post"
$ folio serve
```
"#,
            now.format("%Y-%m-%d %H:%M:%S")
        ),
    )?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if !path.exists() {
        fs::write(path, content)?;
    }
    Ok(())
}
