//! Attribute parsing for `#[derive(Describe)]`.
//!
//! Two attribute namespaces are read: `#[param(...)]` for location tags and
//! constraints, and `#[serde(...)]` for the keys serde will actually use.

use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Token};

/// Location keys accepted in `#[param(...)]`, with the location variant they map to.
const LOCATIONS: &[(&str, &str)] = &[
    ("path", "Path"),
    ("query", "Query"),
    ("header", "Header"),
    ("cookie", "Cookie"),
    ("json", "Body"),
    ("form", "Form"),
    ("formData", "FormData"),
    ("form_data", "FormData"),
];

/// Struct-level attributes.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Schema title.
    pub title: Option<String>,
    /// Schema description, falling back to the doc comment.
    pub description: Option<String>,
    /// Path of the schema crate in generated code.
    pub crate_path: Option<syn::Path>,
    /// `#[serde(rename_all = "...")]`.
    pub rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    /// Reads container attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("param") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("title") {
                        out.title = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("description") {
                        out.description = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("crate") {
                        let lit: LitStr = meta.value()?.parse()?;
                        out.crate_path = Some(lit.parse()?);
                    } else {
                        return Err(meta.error("unknown container attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                for meta in serde_metas(attr) {
                    if let Some(value) = name_value_str(&meta, "rename_all") {
                        out.rename_all = RenameRule::parse(&value);
                    }
                }
            }
        }
        if out.description.is_none() {
            out.description = doc_comment(attrs);
        }
        Ok(out)
    }
}

/// One location tag on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTag {
    /// `ParamLocation` variant name.
    pub variant: &'static str,
    /// Tag value.
    pub name: String,
}

/// Field-level attributes.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Location tags in declaration order.
    pub tags: Vec<LocationTag>,
    /// Field is an embedded struct.
    pub embed: bool,
    /// Field is left out of the shape.
    pub skip: bool,
    /// Field is required.
    pub required: bool,
    /// Field is deprecated.
    pub deprecated: bool,
    /// `minLength` / `minItems`.
    pub min_length: Option<usize>,
    /// `maxLength` / `maxItems`.
    pub max_length: Option<usize>,
    /// Inclusive minimum.
    pub minimum: Option<f64>,
    /// Inclusive maximum.
    pub maximum: Option<f64>,
    /// Pattern.
    pub pattern: Option<String>,
    /// Comma-separated allowed values.
    pub enumeration: Option<String>,
    /// Default literal.
    pub default: Option<String>,
    /// Example literal.
    pub example: Option<String>,
    /// Format.
    pub format: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description, falling back to the doc comment.
    pub description: Option<String>,
    /// serde key override.
    pub serde_rename: Option<String>,
    /// `#[serde(flatten)]`.
    pub flatten: bool,
    /// `#[serde(skip)]`.
    pub serde_skip: bool,
}

impl FieldAttrs {
    /// Reads field attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("param") {
                attr.parse_nested_meta(|meta| out.parse_param(&meta))?;
            } else if attr.path().is_ident("serde") {
                for meta in serde_metas(attr) {
                    if let Some(value) = name_value_str(&meta, "rename") {
                        out.serde_rename = Some(value);
                    } else if meta.path().is_ident("flatten") {
                        out.flatten = true;
                    } else if meta.path().is_ident("skip") {
                        out.serde_skip = true;
                    }
                }
            }
        }
        if out.description.is_none() {
            out.description = doc_comment(attrs);
        }
        Ok(out)
    }

    fn parse_param(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if let Some((_, variant)) = LOCATIONS.iter().find(|(key, _)| meta.path.is_ident(key)) {
            self.tags.push(LocationTag {
                variant,
                name: string_value(meta)?,
            });
            return Ok(());
        }

        let Some(ident) = meta.path.get_ident().map(ToString::to_string) else {
            return Err(meta.error("expected identifier"));
        };
        match ident.as_str() {
            "embed" => self.embed = true,
            "skip" => self.skip = true,
            "required" => self.required = true,
            "deprecated" => self.deprecated = true,
            "min_length" | "minLength" => self.min_length = Some(usize_value(meta)?),
            "max_length" | "maxLength" => self.max_length = Some(usize_value(meta)?),
            "minimum" => self.minimum = Some(number_value(meta)?),
            "maximum" => self.maximum = Some(number_value(meta)?),
            "pattern" => self.pattern = Some(string_value(meta)?),
            "enum" => self.enumeration = Some(literal_value(meta)?),
            "default" => self.default = Some(literal_value(meta)?),
            "example" => self.example = Some(literal_value(meta)?),
            "format" => self.format = Some(string_value(meta)?),
            "title" => self.title = Some(string_value(meta)?),
            "description" => self.description = Some(string_value(meta)?),
            other => return Err(meta.error(format!("unknown field attribute: {other}"))),
        }
        Ok(())
    }
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn usize_value(meta: &ParseNestedMeta<'_>) -> syn::Result<usize> {
    let lit: syn::LitInt = meta.value()?.parse()?;
    lit.base10_parse()
}

fn number_value(meta: &ParseNestedMeta<'_>) -> syn::Result<f64> {
    let input = meta.value()?;
    let negative = input.parse::<Option<Token![-]>>()?.is_some();
    let lit: Lit = input.parse()?;
    let value = match &lit {
        Lit::Int(i) => i.base10_parse::<f64>()?,
        Lit::Float(f) => f.base10_parse::<f64>()?,
        Lit::Str(s) => s
            .value()
            .parse::<f64>()
            .map_err(|_| syn::Error::new(s.span(), "expected a number"))?,
        _ => return Err(syn::Error::new(lit.span(), "expected a number")),
    };
    Ok(if negative { -value } else { value })
}

/// Accepts `"text"`, numbers and booleans; returns the literal's text.
fn literal_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let input = meta.value()?;
    let negative = input.parse::<Option<Token![-]>>()?.is_some();
    let lit: Lit = input.parse()?;
    let text = match &lit {
        Lit::Str(s) => s.value(),
        Lit::Int(i) => i.base10_digits().to_string(),
        Lit::Float(f) => f.base10_digits().to_string(),
        Lit::Bool(b) => b.value.to_string(),
        _ => return Err(syn::Error::new(lit.span(), "expected a literal")),
    };
    Ok(if negative { format!("-{text}") } else { text })
}

/// Parses `#[serde(...)]` loosely; serde reports its own errors.
fn serde_metas(attr: &Attribute) -> Vec<Meta> {
    attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
        .map(|metas| metas.into_iter().collect())
        .unwrap_or_default()
}

fn name_value_str(meta: &Meta, key: &str) -> Option<String> {
    match meta {
        Meta::NameValue(nv) if nv.path.is_ident(key) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// serde `rename_all` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `lowercase`
    Lower,
    /// `UPPERCASE`
    Upper,
    /// `PascalCase`
    Pascal,
    /// `camelCase`
    Camel,
    /// `snake_case`
    Snake,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnake,
    /// `kebab-case`
    Kebab,
    /// `SCREAMING-KEBAB-CASE`
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => pascal(field),
            Self::Camel => {
                let pascal = pascal(field);
                let mut chars = pascal.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_lowercase().to_string() + chars.as_str()
                })
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }
}

fn pascal(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}
