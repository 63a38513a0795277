//! The fixed-shape business record
//!
//! Serialized with the twelve canonical keys, always present. The optional
//! `raw_ai_output` key appears only when generative output could not be
//! parsed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(rename = "Business Name", default)]
    pub business_name: String,
    #[serde(rename = "About Us", default)]
    pub about_us: String,
    #[serde(rename = "Main Services", default)]
    pub main_services: Vec<String>,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "Phone", default)]
    pub phone: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(rename = "Facebook", default)]
    pub facebook: String,
    #[serde(rename = "Instagram", default)]
    pub instagram: String,
    #[serde(rename = "LinkedIn", default)]
    pub linkedin: String,
    #[serde(rename = "Twitter / X", default)]
    pub twitter_x: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    /// Unparseable generative output, kept for diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ai_output: Option<String>,
}

/// The eleven string-valued fields, addressable for merging and parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    BusinessName,
    AboutUs,
    Email,
    Phone,
    Address,
    Facebook,
    Instagram,
    LinkedIn,
    TwitterX,
    Description,
    Url,
}

impl TextField {
    pub const ALL: [Self; 11] = [
        Self::BusinessName,
        Self::AboutUs,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::Facebook,
        Self::Instagram,
        Self::LinkedIn,
        Self::TwitterX,
        Self::Description,
        Self::Url,
    ];

    /// Canonical output key
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BusinessName => "Business Name",
            Self::AboutUs => "About Us",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::LinkedIn => "LinkedIn",
            Self::TwitterX => "Twitter / X",
            Self::Description => "Description",
            Self::Url => "URL",
        }
    }

    /// Loose spellings a model may use, compared after [`fold_key`]
    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::BusinessName => &["businessname", "companyname", "name", "company"],
            Self::AboutUs => &["aboutus", "about"],
            Self::Email => &["email", "emailaddress"],
            Self::Phone => &["phone", "phonenumber", "telephone"],
            Self::Address => &["address", "location"],
            Self::Facebook => &["facebook"],
            Self::Instagram => &["instagram"],
            Self::LinkedIn => &["linkedin"],
            Self::TwitterX => &["twitterx", "twitter", "x"],
            Self::Description => &["description", "summary"],
            Self::Url => &["url", "website"],
        }
    }
}

/// Every output key, in serialization order
pub const CANONICAL_KEYS: [&str; 12] = [
    "Business Name",
    "About Us",
    "Main Services",
    "Email",
    "Phone",
    "Address",
    "Facebook",
    "Instagram",
    "LinkedIn",
    "Twitter / X",
    "Description",
    "URL",
];

impl ExtractionRecord {
    /// Empty record for a site
    #[must_use]
    pub fn for_site(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Record whose only content is unparseable model output
    #[must_use]
    pub fn diagnostic(raw: impl Into<String>) -> Self {
        Self {
            raw_ai_output: Some(raw.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::BusinessName => &self.business_name,
            TextField::AboutUs => &self.about_us,
            TextField::Email => &self.email,
            TextField::Phone => &self.phone,
            TextField::Address => &self.address,
            TextField::Facebook => &self.facebook,
            TextField::Instagram => &self.instagram,
            TextField::LinkedIn => &self.linkedin,
            TextField::TwitterX => &self.twitter_x,
            TextField::Description => &self.description,
            TextField::Url => &self.url,
        }
    }

    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::BusinessName => &mut self.business_name,
            TextField::AboutUs => &mut self.about_us,
            TextField::Email => &mut self.email,
            TextField::Phone => &mut self.phone,
            TextField::Address => &mut self.address,
            TextField::Facebook => &mut self.facebook,
            TextField::Instagram => &mut self.instagram,
            TextField::LinkedIn => &mut self.linkedin,
            TextField::TwitterX => &mut self.twitter_x,
            TextField::Description => &mut self.description,
            TextField::Url => &mut self.url,
        }
    }

    /// Read a model's JSON object leniently
    ///
    /// Keys are matched case- and punctuation-insensitively, `null` becomes
    /// empty, scalars are stringified and `Main Services` accepts either a
    /// list or a delimited string. Returns `None` for non-object JSON.
    #[must_use]
    pub fn from_generative_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let folded: Vec<(String, &Value)> =
            object.iter().map(|(k, v)| (fold_key(k), v)).collect();
        let lookup = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| folded.iter().find(|(k, _)| k.as_str() == *alias).map(|(_, v)| *v))
        };

        let mut record = Self::default();
        for field in TextField::ALL {
            if let Some(v) = lookup(field.aliases()) {
                *record.text_mut(field) = value_to_text(v);
            }
        }
        if let Some(v) = lookup(&["mainservices", "services"]) {
            record.main_services = value_to_list(v);
        }
        Some(record)
    }
}

/// Lowercase and keep only ASCII alphanumerics: "Twitter / X" -> "twitterx"
fn fold_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // {"name": "...", ...} is a common shape for services
                Value::Object(obj) => obj.get("name").map(value_to_text).unwrap_or_default(),
                other => value_to_text(other),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let separator: &[char] = if s.contains(['\n', ';']) {
                &['\n', ';']
            } else {
                &[',']
            };
            s.split(separator)
                .map(|part| part.trim().trim_start_matches(['-', '*', '•']).trim())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => Vec::new(),
    }
}
