use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::safe::SafeHtml;

/// Size the bundled icons are drawn at
pub const DEFAULT_ICON_SIZE: u32 = 16;

const BUILTIN_ICONS: &[(&str, &str)] = &[
    (
        "octicon-triangle-down",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-triangle-down" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M4.427 7.427l3.396 3.396a.25.25 0 00.354 0l3.396-3.396A.25.25 0 0011.396 7H4.604a.25.25 0 00-.177.427z"/></svg>"#,
    ),
    (
        "octicon-triangle-up",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-triangle-up" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M4.427 9.573l3.396-3.396a.25.25 0 01.354 0l3.396 3.396a.25.25 0 01-.177.427H4.604a.25.25 0 01-.177-.427z"/></svg>"#,
    ),
    (
        "octicon-repo",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-repo" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M2 2.5A2.5 2.5 0 014.5 0h8.75a.75.75 0 01.75.75v12.5a.75.75 0 01-.75.75h-2.5a.75.75 0 110-1.5h1.75v-2h-8a1 1 0 00-.714 1.7.75.75 0 01-1.072 1.05A2.495 2.495 0 012 11.5v-9z"/></svg>"#,
    ),
    (
        "octicon-lock",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-lock" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M4 4v2h-.25A1.75 1.75 0 002 7.75v5.5c0 .966.784 1.75 1.75 1.75h8.5A1.75 1.75 0 0014 13.25v-5.5A1.75 1.75 0 0012.25 6H12V4a4 4 0 10-8 0zm6.5 2V4a2.5 2.5 0 00-5 0v2h5z"/></svg>"#,
    ),
    (
        "octicon-mirror",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-mirror" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M8.75 1.75a.75.75 0 00-1.5 0v12.5a.75.75 0 001.5 0V1.75zM1.5 3.5v9l4-4.5-4-4.5zm13 0l-4 4.5 4 4.5v-9z"/></svg>"#,
    ),
    (
        "octicon-alert",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-alert" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M8.22 1.754a.25.25 0 00-.44 0L1.698 13.132a.25.25 0 00.22.368h12.164a.25.25 0 00.22-.368L8.22 1.754zM9 11a1 1 0 11-2 0 1 1 0 012 0zm-.25-5.25a.75.75 0 00-1.5 0v2.5a.75.75 0 001.5 0v-2.5z"/></svg>"#,
    ),
    (
        "octicon-organization",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-organization" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M1.5 14.25c0 .138.112.25.25.25H4v-1.25a.75.75 0 01.75-.75h2.5a.75.75 0 01.75.75v1.25h2.25a.25.25 0 00.25-.25V1.75a.25.25 0 00-.25-.25h-8.5a.25.25 0 00-.25.25v12.5z"/></svg>"#,
    ),
    (
        "octicon-people",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-people" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M5.5 3.5a2 2 0 100 4 2 2 0 000-4zM2 5.5a3.5 3.5 0 115.898 2.549 5.507 5.507 0 013.034 4.084.75.75 0 11-1.482.235 4.001 4.001 0 00-7.9 0 .75.75 0 01-1.482-.236A5.507 5.507 0 013.102 8.05 3.49 3.49 0 012 5.5z"/></svg>"#,
    ),
    (
        "octicon-gear",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-gear" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M7.429 1.525a6.593 6.593 0 011.142 0c.036.003.108.036.137.146l.289 1.105c.147.56.55.967.997 1.189.174.086.341.183.501.29.417.278.97.423 1.53.27l1.102-.303c.11-.03.175.016.195.046.219.31.41.641.573.989.014.031.022.11-.059.19l-.815.806c-.411.406-.562.957-.53 1.456a4.588 4.588 0 010 .582c-.032.499.119 1.05.53 1.456l.815.806c.08.08.073.159.059.19a6.494 6.494 0 01-.573.99c-.02.029-.086.074-.195.045l-1.103-.303c-.559-.153-1.112-.008-1.529.27-.16.107-.327.204-.5.29-.449.222-.851.628-.998 1.189l-.289 1.105c-.029.11-.101.143-.137.146a6.613 6.613 0 01-1.142 0c-.036-.003-.108-.037-.137-.146l-.289-1.105c-.147-.56-.55-.967-.997-1.189a4.502 4.502 0 01-.501-.29c-.417-.278-.97-.423-1.53-.27l-1.102.303c-.11.03-.175-.016-.195-.046a6.492 6.492 0 01-.573-.989c-.014-.031-.022-.11.059-.19l.815-.806c.411-.406.562-.957.53-1.456a4.587 4.587 0 010-.582c.032-.499-.119-1.05-.53-1.456l-.815-.806c-.08-.08-.073-.159-.059-.19a6.44 6.44 0 01.573-.99c.02-.029.086-.075.195-.045l1.103.303c.559.153 1.112.008 1.529-.27.16-.107.327-.204.5-.29.449-.222.851-.628.998-1.189l.289-1.105c.029-.11.101-.143.137-.146zM8 0c-.236 0-.47.01-.701.03-.743.065-1.29.615-1.458 1.261l-.29 1.106c-.017.066-.078.158-.211.224a5.994 5.994 0 00-.668.386c-.123.082-.233.09-.3.071L3.27 2.776c-.644-.177-1.392.02-1.82.63a7.977 7.977 0 00-.704 1.217c-.315.675-.111 1.422.363 1.891l.815.806c.05.048.098.147.088.294a6.084 6.084 0 000 .772c.01.147-.038.246-.088.294l-.815.806c-.474.469-.678 1.216-.363 1.891.2.428.436.835.704 1.218.428.609 1.176.806 1.82.63l1.103-.303c.066-.019.176-.011.299.071.213.143.436.272.668.386.133.066.194.158.212.224l.289 1.106c.169.646.715 1.196 1.458 1.26a8.094 8.094 0 001.402 0c.743-.064 1.29-.614 1.458-1.26l.29-1.106c.017-.066.078-.158.211-.224a5.98 5.98 0 00.668-.386c.123-.082.233-.09.3-.071l1.102.302c.644.177 1.392-.02 1.82-.63.268-.382.505-.789.704-1.217.315-.675.111-1.422-.364-1.891l-.814-.806c-.05-.048-.098-.147-.088-.294a6.1 6.1 0 000-.772c-.01-.147.039-.246.088-.294l.814-.806c.475-.469.679-1.216.364-1.891a7.992 7.992 0 00-.704-1.218c-.428-.609-1.176-.806-1.82-.63l-1.103.303c-.066.019-.176.011-.299-.071a5.991 5.991 0 00-.668-.386c-.133-.066-.194-.158-.212-.224L10.16 1.29C9.99.645 9.444.095 8.701.031A8.094 8.094 0 008 0zm1.5 8a1.5 1.5 0 11-3 0 1.5 1.5 0 013 0zM11 8a3 3 0 11-6 0 3 3 0 016 0z"/></svg>"#,
    ),
    (
        "octicon-location",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-location" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M11.536 3.464a5 5 0 010 7.072L8 14.07l-3.536-3.535a5 5 0 117.072-7.072v.001zm1.06 8.132a6.5 6.5 0 10-9.192 0l3.535 3.536a1.5 1.5 0 002.122 0l3.535-3.536zM8 9a2 2 0 100-4 2 2 0 000 4z"/></svg>"#,
    ),
    (
        "octicon-link",
        r#"<svg viewBox="0 0 16 16" class="svg octicon-link" width="16" height="16" aria-hidden="true"><path fill-rule="evenodd" d="M7.775 3.275a.75.75 0 001.06 1.06l1.25-1.25a2 2 0 112.83 2.83l-2.5 2.5a2 2 0 01-2.83 0 .75.75 0 00-1.06 1.06 3.5 3.5 0 004.95 0l2.5-2.5a3.5 3.5 0 00-4.95-4.95l-1.25 1.25zm-4.69 9.64a2 2 0 010-2.83l2.5-2.5a2 2 0 012.83 0 .75.75 0 001.06-1.06 3.5 3.5 0 00-4.95 0l-2.5 2.5a3.5 3.5 0 004.95 4.95l1.25-1.25a.75.75 0 00-1.06-1.06l-1.25 1.25a2 2 0 01-2.83 0z"/></svg>"#,
    ),
];

fn width_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"width="[0-9]+?""#).expect("valid width pattern"))
}

fn height_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"height="[0-9]+?""#).expect("valid height pattern"))
}

/// Icon name → inline SVG markup
#[derive(Debug, Clone, Default)]
pub struct SvgTable {
    icons: HashMap<String, String>,
}

impl SvgTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the icons the shipped templates use
    pub fn builtin() -> Self {
        let icons = BUILTIN_ICONS
            .iter()
            .map(|(name, svg)| (name.to_string(), svg.to_string()))
            .collect();
        Self { icons }
    }

    /// Load every `*.svg` under `dir`, keyed by file stem
    ///
    /// Files are trusted build assets; their markup is emitted verbatim.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in WalkDir::new(dir) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("svg") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let markup = fs::read_to_string(path)?;
            debug!("loaded svg icon {} from {}", name, path.display());
            self.icons.insert(name.to_string(), markup.trim().to_string());
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn contains(&self, icon: &str) -> bool {
        self.icons.contains_key(icon)
    }

    /// Render `icon`, resized when `size` differs from 16 and with `class`
    /// prepended to its class list. Unknown icons render as nothing.
    pub fn render(&self, icon: &str, size: u32, class: &str) -> SafeHtml {
        let Some(svg) = self.icons.get(icon) else {
            return SafeHtml::empty();
        };
        let mut svg = svg.clone();
        if size != 0 && size != DEFAULT_ICON_SIZE {
            svg = width_pattern()
                .replace_all(&svg, format!(r#"width="{}""#, size).as_str())
                .into_owned();
            svg = height_pattern()
                .replace_all(&svg, format!(r#"height="{}""#, size).as_str())
                .into_owned();
        }
        if !class.is_empty() {
            let class = html_escape::encode_double_quoted_attribute(class);
            svg = svg.replacen(r#"class=""#, &format!(r#"class="{} "#, class), 1);
        }
        SafeHtml::trusted(svg)
    }

    /// Arrow for a sortable table header
    ///
    /// `norm_sort` / `rev_sort` are the header's ascending and descending sort
    /// keys, `url_sort` the sort currently requested. No arrow is drawn
    /// until a sort is requested.
    pub fn sort_arrow(&self, norm_sort: &str, rev_sort: &str, url_sort: &str) -> SafeHtml {
        if norm_sort.is_empty() || url_sort.is_empty() {
            return SafeHtml::empty();
        }
        if url_sort == norm_sort {
            self.render("octicon-triangle-down", DEFAULT_ICON_SIZE, "")
        } else if url_sort == rev_sort {
            self.render("octicon-triangle-up", DEFAULT_ICON_SIZE, "")
        } else {
            SafeHtml::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_icon_is_empty() {
        assert!(SvgTable::builtin().render("octicon-nope", 16, "").is_empty());
    }

    #[test]
    fn test_default_size_is_unchanged() {
        let table = SvgTable::builtin();
        let html = table.render("octicon-repo", 16, "");
        assert!(html.as_str().contains(r#"width="16" height="16""#));
    }

    #[test]
    fn test_resize_and_class() {
        let table = SvgTable::builtin();
        let html = table.render("octicon-repo", 32, "mr-3");
        assert!(html.as_str().contains(r#"width="32" height="32""#));
        assert!(html.as_str().contains(r#"class="mr-3 svg octicon-repo""#));
    }

    #[test]
    fn test_class_is_escaped() {
        let html = SvgTable::builtin().render("octicon-lock", 16, r#"x" onload="y"#);
        assert!(!html.as_str().contains(r#"x" onload"#));
    }

    #[test]
    fn test_sort_arrow() {
        let table = SvgTable::builtin();
        assert!(table.sort_arrow("", "", "").is_empty());
        assert!(table.sort_arrow("", "-name", "name").is_empty());
        assert!(table.sort_arrow("name", "-name", "").is_empty());
        assert!(table
            .sort_arrow("name", "-name", "name")
            .as_str()
            .contains("octicon-triangle-down"));
        assert!(table
            .sort_arrow("name", "-name", "-name")
            .as_str()
            .contains("octicon-triangle-up"));
        assert!(table.sort_arrow("name", "-name", "size").is_empty());
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("octicon-star.svg"),
            r#"<svg class="svg octicon-star" width="16" height="16"></svg>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut table = SvgTable::new();
        assert_eq!(table.load_dir(dir.path()).unwrap(), 1);
        assert!(table.contains("octicon-star"));
    }
}
