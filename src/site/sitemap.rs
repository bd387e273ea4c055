use super::base_url::BaseUrl;
use crate::config::ExtraPage;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// A documentation page and the content file it was generated from, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DocPage {
    pub url: String,
    /// Relative to the content directory. May lack an extension or point at a directory route.
    pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ChangeFrequency {
    Weekly,
    Monthly,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SitemapEntry {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct Sitemap {
    pub entries: Vec<SitemapEntry>,
}

#[derive(thiserror::Error, Debug)]
pub enum SitemapError {
    #[error("content directory {0} does not exist")]
    MissingContentDir(PathBuf),

    #[error("failed to serialize sitemap: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn is_markdown(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("md" | "mdx"))
}

/// Walk the content tree and turn every markdown file into a page.
///
/// `index` files map onto their directory's URL. Directories that can't be read are skipped.
pub(crate) fn discover_pages(content_dir: &Path, docs_prefix: &str) -> Result<Vec<DocPage>, SitemapError> {
    if !content_dir.is_dir() {
        return Err(SitemapError::MissingContentDir(content_dir.to_path_buf()));
    }
    let mut files = Vec::new();
    collect_markdown(content_dir, content_dir, &mut files);

    let prefix = docs_prefix.trim_end_matches('/');
    let mut pages: Vec<DocPage> = files
        .into_iter()
        .map(|relative| {
            let mut segments: Vec<String> = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if segments.last().map(String::as_str) == Some("index") {
                segments.pop();
            }
            let url = if segments.is_empty() { prefix.to_string() } else { format!("{prefix}/{}", segments.join("/")) };
            let url = if url.is_empty() { "/".to_string() } else { url };
            DocPage { url, file: Some(relative) }
        })
        .collect();
    pages.sort_by(|a, b| a.url.cmp(&b.url));
    pages.dedup_by(|a, b| a.url == b.url);
    Ok(pages)
}

fn collect_markdown(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(root, &path, files);
        } else if is_markdown(&path) {
            if let Ok(relative) = path.strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
}

/// Pages declared in config, appended after the discovered ones unless their URL is already known.
pub(crate) fn with_extra_pages(mut pages: Vec<DocPage>, extra: &[ExtraPage]) -> Vec<DocPage> {
    for page in extra {
        if pages.iter().all(|p| p.url != page.url) {
            pages.push(DocPage { url: page.url.clone(), file: page.file.clone() });
        }
    }
    pages
}

fn modified(path: &Path) -> Option<SystemTime> {
    let result = fs::metadata(path).and_then(|metadata| match metadata.is_file() {
        true => metadata.modified(),
        false => Err(io::Error::other("not a file")),
    });
    match result {
        Ok(time) => {
            debug!("last modified from {}", path.display());
            Some(time)
        }
        Err(e) => {
            debug!("no timestamp at {}: {e}", path.display());
            None
        }
    }
}

/// Find when a page's source last changed.
///
/// Tries the path as given, then (for extensionless paths) `<path>.mdx`, `<path>/index.mdx` and finally
/// `index.mdx` in the parent directory. Any failure just means the timestamp is unknown.
pub(crate) fn resolve_last_modified(content_dir: &Path, file: &Path) -> Option<SystemTime> {
    let path = content_dir.join(file);
    if let Some(time) = modified(&path) {
        return Some(time);
    }
    if is_markdown(&path) {
        return None;
    }
    let mut with_extension = path.clone().into_os_string();
    with_extension.push(".mdx");
    modified(Path::new(&with_extension))
        .or_else(|| modified(&path.join("index.mdx")))
        .or_else(|| path.parent().and_then(|parent| modified(&parent.join("index.mdx"))))
}

/// Shallower pages rank higher.
pub(crate) fn priority_for(url: &str) -> f32 {
    let depth = url.split('/').filter(|segment| !segment.is_empty()).count();
    match depth {
        0 => 1.0,
        1 => 0.9,
        2 => 0.8,
        3 => 0.7,
        _ => 0.6,
    }
}

pub(crate) fn change_frequency_for(url: &str) -> ChangeFrequency {
    if url == "/" {
        ChangeFrequency::Monthly
    } else {
        ChangeFrequency::Weekly
    }
}

/// Homepage first, then one entry per documentation page.
pub(crate) fn build_sitemap(base: &BaseUrl, pages: &[DocPage], content_dir: &Path, now: SystemTime) -> Sitemap {
    let homepage = SitemapEntry {
        url: base.join("/"),
        last_modified: Some(now.into()),
        change_frequency: ChangeFrequency::Monthly,
        priority: 1.0,
    };
    let docs = pages.iter().map(|page| SitemapEntry {
        url: base.join(&page.url),
        last_modified: page.file.as_deref().and_then(|file| resolve_last_modified(content_dir, file)).map(Into::into),
        change_frequency: change_frequency_for(&page.url),
        priority: priority_for(&page.url),
    });
    Sitemap { entries: std::iter::once(homepage).chain(docs).collect() }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Sitemap {
    /// Render in the sitemaps.org `urlset` format.
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for entry in &self.entries {
            // Writing into a String can't fail.
            let _ = writeln!(xml, "<url>\n<loc>{}</loc>", escape_xml(&entry.url));
            if let Some(modified) = entry.last_modified {
                let _ = writeln!(xml, "<lastmod>{}</lastmod>", modified.to_rfc3339_opts(SecondsFormat::Millis, true));
            }
            let _ = writeln!(xml, "<changefreq>{}</changefreq>", entry.change_frequency);
            let _ = writeln!(xml, "<priority>{:.1}</priority>\n</url>", entry.priority);
        }
        xml.push_str("</urlset>\n");
        xml
    }

    pub(crate) fn to_json(&self) -> Result<String, SitemapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
