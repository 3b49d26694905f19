//! Output renderer.
//!
//! Substitutes fully transformed fields into the fixed front-matter
//! template and writes one file per record under the type's collection
//! directory. Collection directories are created on first use.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument, warn};

use fieldpress_shared::{FieldpressError, Record, Result};

/// Front-matter template. List-valued fields render as either nothing
/// (the key followed immediately by a newline) or an indented YAML
/// sequence carried in the substituted value.
const TEMPLATE: &str = r#"---
id: {id}
title: "{title}"
short_write_up: "{short_write_up}"
where: "{where}"
when: "{when}"
who: "{who}"
scale: "{scale}"
values:{values}
related_solutions:{related_solutions}
related_theories:{related_theories}
related_stories:{related_stories}
tags:{tags}
learn_more:{learn_more}
images:
- url: "{image_name}"
  name: "{image_name}"
  caption: "{image_caption}"
  source: "{image_source}"
  source_url: "{image_source_url}"
contributors:{contributors}
---
"#;

/// Render the front-matter block for one transformed record.
///
/// Placeholders are substituted in a single scan of the template, so a
/// field value that happens to contain `{who}`-style text passes through
/// literally instead of being re-substituted.
pub fn render_front_matter(record: &Record) -> String {
    static PLACEHOLDER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid regex"));

    PLACEHOLDER_RE
        .replace_all(TEMPLATE, |caps: &regex::Captures| {
            record.get(&caps[1]).to_string()
        })
        .to_string()
}

/// Writes rendered records into `<output-root>/<type-dir>/<slug>.md`.
pub struct Renderer {
    output_root: PathBuf,
    created_dirs: HashSet<PathBuf>,
    /// Relative output path → title, for slug-collision warnings.
    seen_paths: HashMap<PathBuf, String>,
}

impl Renderer {
    /// Create a renderer rooted at the given output directory.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            created_dirs: HashSet::new(),
            seen_paths: HashMap::new(),
        }
    }

    /// Render and write one record. Returns the path written.
    ///
    /// Two distinct titles can normalize to the same slug; the collision
    /// is logged and the later record wins.
    #[instrument(skip_all, fields(title = record.title()))]
    pub fn write_record(&mut self, record: &Record) -> Result<PathBuf> {
        let record_type = record.record_type()?;
        let dir = self.output_root.join(record_type.output_dir());
        self.ensure_dir(&dir)?;

        let relative = Path::new(record_type.output_dir()).join(format!("{}.md", record.get("slug")));
        if let Some(previous) = self
            .seen_paths
            .insert(relative.clone(), record.title().to_string())
        {
            warn!(
                path = %relative.display(),
                previous,
                title = record.title(),
                "slug collision — overwriting earlier record"
            );
        }

        let path = self.output_root.join(&relative);
        let output = render_front_matter(record);
        std::fs::write(&path, output).map_err(|e| FieldpressError::io(&path, e))?;
        info!(path = %path.display(), "wrote record");

        Ok(path)
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        if self.created_dirs.contains(dir) {
            return Ok(());
        }
        if !dir.is_dir() {
            std::fs::create_dir_all(dir).map_err(|e| FieldpressError::io(dir, e))?;
            info!(path = %dir.display(), "created collection directory");
        }
        self.created_dirs.insert(dir.to_path_buf());
        Ok(())
    }
}
