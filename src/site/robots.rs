use super::base_url::BaseUrl;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RobotsRule {
    pub user_agent: String,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

/// The contents of `robots.txt`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Robots {
    pub rules: Vec<RobotsRule>,
    pub host: String,
    pub sitemap: String,
}

impl Robots {
    /// Everything is crawlable; point crawlers at the sitemap.
    pub(crate) fn for_site(base: &BaseUrl) -> Self {
        Self {
            rules: vec![RobotsRule { user_agent: "*".into(), allow: vec!["/".into()], disallow: Vec::new() }],
            host: base.to_string(),
            sitemap: base.join("/sitemap.xml"),
        }
    }

    pub(crate) fn to_text(&self) -> String {
        let mut lines = Vec::new();
        for rule in &self.rules {
            lines.push(format!("User-Agent: {}", rule.user_agent));
            lines.extend(rule.allow.iter().map(|path| format!("Allow: {path}")));
            lines.extend(rule.disallow.iter().map(|path| format!("Disallow: {path}")));
            lines.push(String::new());
        }
        lines.push(format!("Host: {}", self.host));
        lines.push(format!("Sitemap: {}", self.sitemap));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}
