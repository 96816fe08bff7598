//! Book model and related types

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use validator::Validate;

use super::{trimmed, Entity};

/// Foreign-key field holding the author id
pub const AUTHOR_FIELD: &str = "author";
/// Foreign-key field holding the set of genre ids
pub const GENRE_FIELD: &str = "genre";

/// Full book model from the store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct Book {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    /// Author id
    pub author: String,
    /// Genre ids; many-to-many without a join collection
    #[serde(default)]
    pub genre: Vec<String>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";
    const KIND: &'static str = "book";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "summary", "isbn", "author"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl Book {
    pub fn from_input(id: impl Into<String>, input: BookInput) -> Self {
        Self {
            id: id.into(),
            title: input.title,
            summary: input.summary,
            isbn: input.isbn,
            author: input.author,
            genre: input.genre,
        }
    }

    pub fn has_genre(&self, genre_id: &str) -> bool {
        self.genre.iter().any(|g| g == genre_id)
    }
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Book", 7)?;
        if self.id.is_empty() {
            state.skip_field("id")?;
        } else {
            state.serialize_field("id", &self.id)?;
            state.serialize_field("url", &self.url())?;
        }
        state.serialize_field("title", &self.title)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("isbn", &self.isbn)?;
        state.serialize_field(AUTHOR_FIELD, &self.author)?;
        state.serialize_field(GENRE_FIELD, &self.genre)?;
        state.end()
    }
}

/// Create or update book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Summary must not be empty"))]
    pub summary: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[serde(default)]
    pub genre: Vec<String>,
}

impl BookInput {
    /// Trim every text field and collapse the genre list to a set, keeping first-seen order.
    pub fn sanitized(self) -> Self {
        let mut genre: Vec<String> = Vec::with_capacity(self.genre.len());
        for id in self.genre.into_iter().map(trimmed) {
            if !id.is_empty() && !genre.contains(&id) {
                genre.push(id);
            }
        }
        Self {
            title: trimmed(self.title),
            summary: trimmed(self.summary),
            isbn: trimmed(self.isbn),
            author: trimmed(self.author),
            genre,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_dedups_genres() {
        let input = BookInput {
            title: " The Hobbit ".into(),
            summary: "There and back again".into(),
            isbn: "9780261102217".into(),
            author: "a1 ".into(),
            genre: vec!["g1".into(), " g2".into(), "g1".into(), "  ".into()],
        }
        .sanitized();
        assert_eq!(input.title, "The Hobbit");
        assert_eq!(input.author, "a1");
        assert_eq!(input.genre, vec!["g1".to_string(), "g2".to_string()]);
    }

    #[test]
    fn test_blank_fields_rejected() {
        let input = BookInput {
            title: "   ".into(),
            ..Default::default()
        }
        .sanitized();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("isbn"));
        assert!(fields.contains_key("author"));
    }

    #[test]
    fn test_url() {
        let book = Book::from_input("b1", BookInput::default());
        assert_eq!(book.url(), "/catalog/book/b1");
    }
}
