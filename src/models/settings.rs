use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The full structured configuration the site wizard and settings panels edit.
///
/// This is the single source of truth for what *should* be in the generator
/// config document. The patch pipeline only reads it for the duration of one
/// sync; it is never mutated from this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsModel {
    pub site: SiteSettings,
    pub theme: ThemeSettings,
    pub typography: TypographySettings,
    pub navigation: NavigationSettings,
    pub features: FeatureToggles,
    pub posts: PostSettings,
    pub home: HomeSettings,
    pub plugins: PluginWiring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteSettings {
    pub page_title: String,
    pub base_url: String,
    pub language: String,
    pub description: String,
    pub author: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            page_title: "My Site".to_string(),
            base_url: "example.com".to_string(),
            language: "en-US".to_string(),
            description: String::new(),
            author: String::new(),
        }
    }
}

/// Color scheme selection for the generated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
    System,
}

impl Appearance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
            Appearance::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSettings {
    pub appearance: Appearance,
    pub dark_mode_toggle_button: bool,
    pub accent_color: String,
    pub reader_line_width: i64,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            appearance: Appearance::System,
            dark_mode_toggle_button: true,
            accent_color: "#284b63".to_string(),
            reader_line_width: 750,
        }
    }
}

/// Where the site's fonts come from.
///
/// `Cdn` means the generator pulls a named font at build time, in which case
/// the effective font is `custom_font_name` rather than the bundled choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    Bundled,
    Cdn,
}

impl FontSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontSource::Bundled => "bundled",
            FontSource::Cdn => "cdn",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypographySettings {
    pub font_source: FontSource,
    pub header_font: String,
    pub body_font: String,
    pub code_font: String,
    pub custom_font_name: String,
    pub base_font_size: i64,
}

impl Default for TypographySettings {
    fn default() -> Self {
        Self {
            font_source: FontSource::Bundled,
            header_font: "Schibsted Grotesk".to_string(),
            body_font: "Source Sans Pro".to_string(),
            code_font: "IBM Plex Mono".to_string(),
            custom_font_name: String::new(),
            base_font_size: 16,
        }
    }
}

/// One entry in the site's navigation bar. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationSettings {
    pub show_breadcrumbs: bool,
    pub sidebar_collapsed: bool,
    pub entries: Vec<NavEntry>,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            show_breadcrumbs: true,
            sidebar_collapsed: false,
            entries: vec![NavEntry {
                title: "Home".to_string(),
                url: "/".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureToggles {
    pub search: bool,
    pub graph_view: bool,
    pub backlinks: bool,
    pub reading_time: bool,
    pub table_of_contents: bool,
    pub comments: bool,
    pub rss_feed: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            search: true,
            graph_view: true,
            backlinks: true,
            reading_time: false,
            table_of_contents: true,
            comments: false,
            rss_feed: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostSettings {
    pub show_date: bool,
    pub date_format: String,
    pub show_tags: bool,
    pub excerpt_length: i64,
    pub default_layout: String,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            show_date: true,
            date_format: "MMM d, yyyy".to_string(),
            show_tags: true,
            excerpt_length: 140,
            default_layout: "post".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeSettings {
    pub show_recent_posts: bool,
    pub recent_post_count: i64,
    pub pinned_note: String,
    pub show_subtitle: bool,
}

impl Default for HomeSettings {
    fn default() -> Self {
        Self {
            show_recent_posts: true,
            recent_post_count: 5,
            pinned_note: String::new(),
            show_subtitle: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatexRenderer {
    Katex,
    Mathjax,
    None,
}

impl LatexRenderer {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatexRenderer::Katex => "katex",
            LatexRenderer::Mathjax => "mathjax",
            LatexRenderer::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginWiring {
    pub syntax_theme: String,
    pub latex_renderer: LatexRenderer,
    pub enable_transcludes: bool,
}

impl Default for PluginWiring {
    fn default() -> Self {
        Self {
            syntax_theme: "github-light".to_string(),
            latex_renderer: LatexRenderer::Katex,
            enable_transcludes: true,
        }
    }
}

/// The kind of literal a field renders to in the config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Bool,
    Int,
    NavList,
}

/// A runtime value for one document field, as handed to the patch engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    Int(i64),
    NavList(Vec<NavEntry>),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Str(_) => ValueKind::Str,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Int(_) => ValueKind::Int,
            FieldValue::NavList(_) => ValueKind::NavList,
        }
    }

    /// Plain-text form used when a value is interpolated into a larger
    /// template string. Nav lists have no sensible inline form and are
    /// rejected by the preset resolver before this is reached.
    pub fn display_fragment(&self) -> String {
        match self {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::NavList(entries) => entries
                .iter()
                .map(|e| e.title.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl SettingsModel {
    /// Look up the current value of a field by its dotted document path.
    ///
    /// Paths mirror the keys in the generator config (camelCase segments).
    /// A few derived paths exist purely for preset interpolation, e.g.
    /// `typography.activeBodyFont` resolves the font-source indirection.
    pub fn field_value(&self, path: &str) -> Option<FieldValue> {
        use FieldValue::*;

        let value = match path {
            "site.pageTitle" => Str(self.site.page_title.clone()),
            "site.baseUrl" => Str(self.site.base_url.clone()),
            "site.language" => Str(self.site.language.clone()),
            "site.description" => Str(self.site.description.clone()),
            "site.author" => Str(self.site.author.clone()),

            "theme.appearance" => Str(self.theme.appearance.as_str().to_string()),
            "theme.darkModeToggleButton" => Bool(self.theme.dark_mode_toggle_button),
            "theme.accentColor" => Str(self.theme.accent_color.clone()),
            "theme.readerLineWidth" => Int(self.theme.reader_line_width),

            "typography.fontSource" => Str(self.typography.font_source.as_str().to_string()),
            "typography.headerFont" => Str(self.typography.header_font.clone()),
            "typography.bodyFont" => Str(self.typography.body_font.clone()),
            "typography.codeFont" => Str(self.typography.code_font.clone()),
            "typography.customFontName" => Str(self.typography.custom_font_name.clone()),
            "typography.baseFontSize" => Int(self.typography.base_font_size),
            "typography.activeHeaderFont" => Str(self.active_font(&self.typography.header_font)),
            "typography.activeBodyFont" => Str(self.active_font(&self.typography.body_font)),

            "navigation.showBreadcrumbs" => Bool(self.navigation.show_breadcrumbs),
            "navigation.sidebarCollapsed" => Bool(self.navigation.sidebar_collapsed),
            "navigation.entries" => NavList(self.navigation.entries.clone()),

            "features.search" => Bool(self.features.search),
            "features.graphView" => Bool(self.features.graph_view),
            "features.backlinks" => Bool(self.features.backlinks),
            "features.readingTime" => Bool(self.features.reading_time),
            "features.tableOfContents" => Bool(self.features.table_of_contents),
            "features.comments" => Bool(self.features.comments),
            "features.rssFeed" => Bool(self.features.rss_feed),

            "posts.showDate" => Bool(self.posts.show_date),
            "posts.dateFormat" => Str(self.posts.date_format.clone()),
            "posts.showTags" => Bool(self.posts.show_tags),
            "posts.excerptLength" => Int(self.posts.excerpt_length),
            "posts.defaultLayout" => Str(self.posts.default_layout.clone()),

            "home.showRecentPosts" => Bool(self.home.show_recent_posts),
            "home.recentPostCount" => Int(self.home.recent_post_count),
            "home.pinnedNote" => Str(self.home.pinned_note.clone()),
            "home.showSubtitle" => Bool(self.home.show_subtitle),

            "plugins.syntaxTheme" => Str(self.plugins.syntax_theme.clone()),
            "plugins.latexRenderer" => Str(self.plugins.latex_renderer.as_str().to_string()),
            "plugins.enableTranscludes" => Bool(self.plugins.enable_transcludes),

            _ => return None,
        };

        Some(value)
    }

    /// Effective font for a bundled choice: when fonts come from a CDN and a
    /// custom font name is set, the custom name wins.
    fn active_font(&self, bundled_choice: &str) -> String {
        if self.typography.font_source == FontSource::Cdn
            && !self.typography.custom_font_name.is_empty()
        {
            self.typography.custom_font_name.clone()
        } else {
            bundled_choice.to_string()
        }
    }

    /// Snapshot every known field as (path, value) pairs, in rule order.
    /// Used by "re-apply everything" callers.
    pub fn all_field_values(&self, paths: &[&str]) -> IndexMap<String, FieldValue> {
        paths
            .iter()
            .filter_map(|p| self.field_value(p).map(|v| (p.to_string(), v)))
            .collect()
    }
}
