//! Swagger UI page generation.
//!
//! The page loads Swagger UI from a CDN and points it at the service's
//! `openapi.json`. Extra settings are merged over the defaults, so any
//! [Swagger UI option](https://swagger.io/docs/open-source-tools/swagger-ui/usage/configuration/)
//! can be passed through.
//!
//! ```rust,ignore
//! use portico_docs::SwaggerUi;
//! use serde_json::json;
//!
//! let swagger = SwaggerUi::new("/api/docs/openapi.json")
//!     .setting("docExpansion", json!("none"))
//!     .setting("persistAuthorization", json!(true));
//! let html = swagger.html();
//! ```

use serde_json::{Map, Value};

/// Default CDN location of the Swagger UI assets.
pub const DEFAULT_ASSET_BASE: &str = "https://unpkg.com/swagger-ui-dist";

/// Swagger UI configuration and HTML generation.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    spec_url: String,
    title: String,
    asset_base: String,
    swagger_version: Option<String>,
    settings: Map<String, Value>,
}

/// Document expansion level for Swagger UI.
#[derive(Debug, Clone, Copy, Default)]
pub enum DocExpansion {
    /// Show all operations collapsed.
    None,
    /// Show only the list of operations.
    #[default]
    List,
    /// Expand all operations fully.
    Full,
}

impl DocExpansion {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Full => "full",
        }
    }
}

impl SwaggerUi {
    /// Creates a page that loads the document at `spec_url`.
    #[must_use]
    pub fn new(spec_url: impl Into<String>) -> Self {
        Self {
            spec_url: spec_url.into(),
            title: "Swagger UI".to_string(),
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            swagger_version: None,
            settings: Map::new(),
        }
    }

    /// Set the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the base URL the Swagger UI assets are loaded from.
    #[must_use]
    pub fn asset_base(mut self, base: impl Into<String>) -> Self {
        self.asset_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Pin the Swagger UI version loaded from the CDN.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = Some(version.into());
        self
    }

    /// Set the document expansion level.
    #[must_use]
    pub fn doc_expansion(self, expansion: DocExpansion) -> Self {
        self.setting("docExpansion", Value::from(expansion.as_str()))
    }

    /// Set one Swagger UI option.
    #[must_use]
    pub fn setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Merge a map of Swagger UI options, later keys winning.
    #[must_use]
    pub fn settings(mut self, settings: Map<String, Value>) -> Self {
        self.settings.extend(settings);
        self
    }

    /// URL of the OpenAPI document the page loads.
    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    /// The effective Swagger UI configuration: defaults, then user settings.
    pub fn config(&self) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("url".into(), Value::from(self.spec_url.as_str()));
        config.insert("dom_id".into(), Value::from("#swagger-ui"));
        config.insert("deepLinking".into(), Value::Bool(true));
        config.insert("docExpansion".into(), Value::from(DocExpansion::List.as_str()));
        config.insert("displayRequestDuration".into(), Value::Bool(true));
        config.extend(self.settings.clone());
        config
    }

    fn assets(&self) -> String {
        match &self.swagger_version {
            Some(version) => format!("{}@{}", self.asset_base, version),
            None => self.asset_base.clone(),
        }
    }

    /// Generate the HTML page.
    pub fn html(&self) -> String {
        let config = script_json(&Value::Object(self.config()));
        let assets = self.assets();

        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{assets}/swagger-ui.css" />
    <style>
        html {{
            box-sizing: border-box;
            overflow-y: scroll;
        }}
        *, *:before, *:after {{
            box-sizing: inherit;
        }}
        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="{assets}/swagger-ui-bundle.js"></script>
    <script src="{assets}/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            const config = {config};
            config.presets = [
                SwaggerUIBundle.presets.apis,
                SwaggerUIStandalonePreset
            ];
            config.plugins = [
                SwaggerUIBundle.plugins.DownloadUrl
            ];
            config.layout = "StandaloneLayout";
            window.ui = SwaggerUIBundle(config);
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            assets = html_escape(&assets),
            config = config,
        )
    }

    /// Generate the HTML as bytes for use in HTTP responses.
    pub fn html_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.html())
    }
}

/// Where the documentation endpoints of a service live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsPaths {
    /// Swagger UI page.
    pub ui: String,
    /// OpenAPI document.
    pub spec: String,
}

impl DocsPaths {
    /// Paths for docs mounted at `pattern` under the service base URL.
    ///
    /// Trailing slashes on `pattern` are ignored: `("/api", "/docs/")` gives
    /// `/api/docs` and `/api/docs/openapi.json`.
    pub fn new(base_url: &str, pattern: &str) -> Self {
        let ui = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            pattern.trim_end_matches('/')
        );
        let spec = format!("{ui}/openapi.json");
        let ui = if ui.is_empty() { "/".to_string() } else { ui };
        Self { ui, spec }
    }
}

/// JSON safe to embed in a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// HTML escape for text and attribute values.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
