//! Author model and related types

use chrono::NaiveDate;
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{trimmed, Entity};

/// Display format for dates shown alongside a record
pub const DATE_DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Full author model from the store
///
/// Serializes with its `url`, `name` and `lifespan` display fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct Author {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";
    const KIND: &'static str = "author";
    const REQUIRED_FIELDS: &'static [&'static str] = &["first_name", "family_name"];
    const DERIVED_FIELDS: &'static [&'static str] = &["url", "name", "lifespan"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Author {
    pub fn from_input(id: impl Into<String>, input: AuthorInput) -> Self {
        Self {
            id: id.into(),
            first_name: input.first_name,
            family_name: input.family_name,
            date_of_birth: input.date_of_birth,
            date_of_death: input.date_of_death,
        }
    }

    /// "Family, First", or empty when either part is missing
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            String::new()
        } else {
            format!("{}, {}", self.family_name, self.first_name)
        }
    }

    /// "birth - death" with blanks for unknown dates
    pub fn lifespan(&self) -> String {
        if self.date_of_birth.is_none() && self.date_of_death.is_none() {
            return String::new();
        }
        let fmt = |d: &Option<NaiveDate>| {
            d.map(|d| d.format(DATE_DISPLAY_FORMAT).to_string())
                .unwrap_or_default()
        };
        format!("{} - {}", fmt(&self.date_of_birth), fmt(&self.date_of_death))
            .trim()
            .to_string()
    }
}

impl Serialize for Author {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Author", 8)?;
        if self.id.is_empty() {
            state.skip_field("id")?;
        } else {
            state.serialize_field("id", &self.id)?;
            state.serialize_field("url", &self.url())?;
        }
        state.serialize_field("first_name", &self.first_name)?;
        state.serialize_field("family_name", &self.family_name)?;
        state.serialize_field("date_of_birth", &self.date_of_birth)?;
        state.serialize_field("date_of_death", &self.date_of_death)?;
        state.serialize_field("name", &self.name())?;
        state.serialize_field("lifespan", &self.lifespan())?;
        state.end()
    }
}

/// Create or update author request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan"))]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 100, message = "First name must be specified"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Family name must be specified"))]
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorInput {
    pub fn sanitized(self) -> Self {
        Self {
            first_name: trimmed(self.first_name),
            family_name: trimmed(self.family_name),
            ..self
        }
    }
}

fn validate_lifespan(input: &AuthorInput) -> Result<(), ValidationError> {
    if let (Some(born), Some(died)) = (input.date_of_birth, input.date_of_death) {
        if died < born {
            let mut err = ValidationError::new("date_of_death");
            err.message = Some("Date of death must not precede date of birth".into());
            return Err(err);
        }
    }
    Ok(())
}
