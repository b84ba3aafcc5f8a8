//! Serde shapes for the resume document as it appears on disk.
//!
//! These mirror every field name the document has carried over time. They
//! never leave the `resume` module: `normalize` reconciles them into the
//! canonical types in `model`.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct RawRoot {
    pub cv: RawCv,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCv {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub email: String,
    #[serde(deserialize_with = "scalar")]
    pub phone: String,
    #[serde(deserialize_with = "scalar")]
    pub website: String,
    #[serde(deserialize_with = "nullable_seq")]
    pub social: Vec<RawSocial>,
    pub sections: RawSections,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSections {
    #[serde(deserialize_with = "nullable_seq")]
    pub experience: Vec<RawExperience>,
    #[serde(deserialize_with = "nullable_seq")]
    pub education: Vec<RawEducation>,
    #[serde(deserialize_with = "nullable_seq")]
    pub volunteer: Vec<RawVolunteer>,
    #[serde(deserialize_with = "nullable_seq")]
    pub projects: Vec<RawProject>,
    #[serde(deserialize_with = "nullable_seq")]
    pub awards: Vec<RawAward>,
    #[serde(deserialize_with = "nullable_seq")]
    pub presentations: Vec<RawPresentation>,
    #[serde(deserialize_with = "nullable_seq")]
    pub publications: Vec<RawPublication>,
    #[serde(deserialize_with = "nullable_seq")]
    pub professional_development: Vec<RawProfessionalDevelopment>,
    #[serde(deserialize_with = "optional_strings")]
    pub certifications_and_skills: Option<Vec<String>>,
    /// Older documents used this name for the same list.
    #[serde(deserialize_with = "optional_strings")]
    pub certifications_skills: Option<Vec<String>>,
}

/// Records that may carry a `visible` flag.
pub(crate) trait Hideable {
    fn visible(&self) -> Option<bool>;

    /// Absence of the flag means visible.
    fn is_visible(&self) -> bool {
        self.visible() != Some(false)
    }
}

macro_rules! hideable {
    ($($ty:ty),* $(,)?) => {
        $(impl Hideable for $ty {
            fn visible(&self) -> Option<bool> {
                self.visible
            }
        })*
    };
}

hideable!(
    RawLegacyExperience,
    RawGroupedExperience,
    RawPosition,
    RawEducation,
    RawVolunteer,
    RawProject,
    RawAward,
    RawPresentation,
    RawPublication,
    RawProfessionalDevelopment,
);

impl Hideable for RawExperience {
    fn visible(&self) -> Option<bool> {
        match self {
            RawExperience::Grouped(g) => g.visible,
            RawExperience::Legacy(l) => l.visible,
        }
    }
}

/// The two historical experience shapes. A record with a `positions` list is
/// grouped; anything else is the legacy single-position shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawExperience {
    Grouped(RawGroupedExperience),
    Legacy(RawLegacyExperience),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGroupedExperience {
    #[serde(default, deserialize_with = "scalar")]
    pub company: String,
    #[serde(default, deserialize_with = "scalar")]
    pub location: String,
    #[serde(default)]
    pub show_company_header: Option<bool>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub spacing_after: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    pub positions: Vec<RawPosition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPosition {
    #[serde(alias = "position", deserialize_with = "scalar")]
    pub title: String,
    #[serde(deserialize_with = "scalar")]
    pub start_date: String,
    #[serde(deserialize_with = "scalar")]
    pub end_date: String,
    pub show_date_in_position: Option<bool>,
    #[serde(deserialize_with = "optional_strings")]
    pub highlights: Option<Vec<String>>,
    #[serde(deserialize_with = "optional_strings")]
    pub details: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawLegacyExperience {
    #[serde(deserialize_with = "scalar")]
    pub company: String,
    #[serde(alias = "title", deserialize_with = "scalar")]
    pub position: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub start_date: String,
    #[serde(deserialize_with = "scalar")]
    pub end_date: String,
    pub show_company_header: Option<bool>,
    pub show_date_in_position: Option<bool>,
    #[serde(deserialize_with = "optional_scalar")]
    pub spacing_after: Option<String>,
    #[serde(deserialize_with = "optional_strings")]
    pub highlights: Option<Vec<String>>,
    #[serde(deserialize_with = "optional_strings")]
    pub details: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSocial {
    #[serde(deserialize_with = "scalar")]
    pub network: String,
    #[serde(deserialize_with = "scalar")]
    pub username: String,
    #[serde(deserialize_with = "scalar")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawEducation {
    #[serde(deserialize_with = "scalar")]
    pub institution: String,
    #[serde(deserialize_with = "scalar")]
    pub area: String,
    #[serde(deserialize_with = "scalar")]
    pub degree: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub start_date: String,
    #[serde(deserialize_with = "scalar")]
    pub end_date: String,
    #[serde(deserialize_with = "optional_strings")]
    pub highlights: Option<Vec<String>>,
    #[serde(deserialize_with = "optional_strings")]
    pub details: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawVolunteer {
    #[serde(deserialize_with = "scalar")]
    pub company: String,
    #[serde(deserialize_with = "scalar")]
    pub position: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub start_date: String,
    #[serde(deserialize_with = "scalar")]
    pub end_date: String,
    #[serde(deserialize_with = "optional_strings")]
    pub highlights: Option<Vec<String>>,
    #[serde(deserialize_with = "optional_strings")]
    pub details: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawProject {
    #[serde(deserialize_with = "scalar")]
    pub title: String,
    #[serde(deserialize_with = "scalar")]
    pub description: String,
    #[serde(deserialize_with = "scalar")]
    pub link: String,
    #[serde(deserialize_with = "nullable_strings")]
    pub technologies: Vec<String>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawAward {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    #[serde(deserialize_with = "scalar")]
    pub summary: String,
    #[serde(deserialize_with = "optional_strings")]
    pub highlights: Option<Vec<String>>,
    #[serde(deserialize_with = "optional_strings")]
    pub details: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPresentation {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub summary: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPublication {
    #[serde(deserialize_with = "scalar")]
    pub title: String,
    #[serde(deserialize_with = "nullable_strings")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "scalar")]
    pub journal: String,
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    #[serde(deserialize_with = "scalar")]
    pub doi: String,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawProfessionalDevelopment {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub location: String,
    #[serde(deserialize_with = "scalar")]
    pub date: String,
    #[serde(deserialize_with = "scalar")]
    pub summary: String,
    pub visible: Option<bool>,
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts strings, numbers and booleans (`2020` is a YAML integer); null and
/// nested values read as empty.
fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar(deserializer)?.unwrap_or_default())
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_string))
}

/// `None` when the key is absent or null; otherwise the scalar items as strings.
fn optional_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value.map(|items| items.into_iter().filter_map(value_to_string).collect()))
}

fn nullable_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_strings(deserializer)?.unwrap_or_default())
}

/// `section: ~` and a missing section both read as empty.
fn nullable_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
