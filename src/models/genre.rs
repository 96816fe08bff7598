//! Genre model

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use validator::Validate;

use super::{trimmed, Entity};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct Genre {
    #[serde(default)]
    pub id: String,
    /// Natural key: creating a genre with an existing name resolves to that genre
    pub name: String,
}

impl Entity for Genre {
    const COLLECTION: &'static str = "genres";
    const KIND: &'static str = "genre";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Genre {
    pub fn from_input(id: impl Into<String>, input: GenreInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
        }
    }
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Genre", 3)?;
        if self.id.is_empty() {
            state.skip_field("id")?;
        } else {
            state.serialize_field("id", &self.id)?;
            state.serialize_field("url", &self.url())?;
        }
        state.serialize_field("name", &self.name)?;
        state.end()
    }
}

/// Create or update genre request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GenreInput {
    #[validate(length(min = 3, max = 100, message = "Genre name must be 3 to 100 characters"))]
    pub name: String,
}

impl GenreInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn sanitized(self) -> Self {
        Self {
            name: trimmed(self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_bounds() {
        assert!(GenreInput::new("SF").validate().is_err());
        assert!(GenreInput::new("Poetry").validate().is_ok());
        assert!(GenreInput::new("x".repeat(101)).validate().is_err());
        assert!(GenreInput::new("   SF   ").sanitized().validate().is_err());
    }
}
