//! Book instance (physical, loanable copy) model and related types

use chrono::{Local, NaiveDate};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{author::DATE_DISPLAY_FORMAT, trimmed, Entity};

/// Foreign-key field holding the book id
pub const BOOK_FIELD: &str = "book";
pub const STATUS_FIELD: &str = "status";

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    /// Label stored in documents and used by filters
    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }

    /// Whether a return date is expected for this status
    pub fn expects_return(&self) -> bool {
        matches!(self, BookInstanceStatus::Loaned | BookInstanceStatus::Reserved)
    }
}

impl std::fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full book instance model from the store
///
/// Serializes with its `url` and `due_back_formatted` display fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct BookInstance {
    #[serde(default)]
    pub id: String,
    /// Book id
    pub book: String,
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    /// Calendar date, stored as `YYYY-MM-DD`
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
}

impl Entity for BookInstance {
    const COLLECTION: &'static str = "bookinstances";
    const KIND: &'static str = "bookinstance";
    const REQUIRED_FIELDS: &'static [&'static str] = &["book", "imprint", "status"];
    const DERIVED_FIELDS: &'static [&'static str] = &["url", "due_back_formatted"];

    fn id(&self) -> &str {
        &self.id
    }
}

impl BookInstance {
    pub fn from_input(id: impl Into<String>, input: BookInstanceInput) -> Self {
        Self {
            id: id.into(),
            book: input.book,
            imprint: input.imprint,
            status: input.status,
            due_back: input.due_back,
        }
    }

    /// e.g. "October 19, 2026"
    pub fn due_back_formatted(&self) -> Option<String> {
        self.due_back
            .map(|d| d.format(DATE_DISPLAY_FORMAT).to_string())
    }
}

impl Serialize for BookInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BookInstance", 7)?;
        if self.id.is_empty() {
            state.skip_field("id")?;
        } else {
            state.serialize_field("id", &self.id)?;
            state.serialize_field("url", &self.url())?;
        }
        state.serialize_field(BOOK_FIELD, &self.book)?;
        state.serialize_field("imprint", &self.imprint)?;
        state.serialize_field(STATUS_FIELD, &self.status)?;
        state.serialize_field("due_back", &self.due_back)?;
        state.serialize_field("due_back_formatted", &self.due_back_formatted())?;
        state.end()
    }
}

/// Create or update book instance request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_due_back"))]
pub struct BookInstanceInput {
    #[validate(length(min = 1, message = "Book must be specified"))]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceInput {
    pub fn sanitized(self) -> Self {
        Self {
            book: trimmed(self.book),
            imprint: trimmed(self.imprint),
            ..self
        }
    }
}

fn due_back_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("due_back");
    err.message = Some(message.into());
    err
}

fn validate_due_back(input: &BookInstanceInput) -> Result<(), ValidationError> {
    match input.due_back {
        None if input.status == BookInstanceStatus::Loaned => {
            Err(due_back_error("Due date is required for a loaned copy"))
        }
        Some(date) if input.status.expects_return() && date <= Local::now().date_naive() => {
            Err(due_back_error("Date must be after today"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(status: BookInstanceStatus, due_back: Option<NaiveDate>) -> BookInstanceInput {
        BookInstanceInput {
            book: "b1".into(),
            imprint: "Allen & Unwin, 1937".into(),
            status,
            due_back,
        }
    }

    #[test]
    fn test_status_defaults_to_maintenance() {
        let instance: BookInstance =
            serde_json::from_str(r#"{"id":"i1","book":"b1","imprint":"x"}"#).unwrap();
        assert_eq!(instance.status, BookInstanceStatus::Maintenance);
        assert_eq!(instance.due_back, None);
        assert_eq!(instance.url(), "/catalog/bookinstance/i1");
    }

    #[test]
    fn test_due_back_serialized_as_date() {
        let instance = BookInstance {
            due_back: NaiveDate::from_ymd_opt(2026, 10, 19),
            ..BookInstance::from_input("i1", input(BookInstanceStatus::Loaned, None))
        };
        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(json["due_back"], "2026-10-19");
        assert_eq!(json["status"], "Loaned");
        assert_eq!(json["due_back_formatted"], "October 19, 2026");
        assert_eq!(json["url"], "/catalog/bookinstance/i1");

        let back: BookInstance = serde_json::from_value(json).unwrap();
        assert_eq!(back, instance);
    }

    #[test]
    fn test_loan_requires_future_due_date() {
        let today = Local::now().date_naive();
        assert!(input(BookInstanceStatus::Loaned, None).validate().is_err());
        assert!(input(BookInstanceStatus::Loaned, Some(today)).validate().is_err());
        assert!(input(BookInstanceStatus::Loaned, Some(today + Duration::days(14)))
            .validate()
            .is_ok());
        assert!(input(BookInstanceStatus::Available, None).validate().is_ok());
        assert!(input(BookInstanceStatus::Maintenance, Some(today)).validate().is_ok());
    }
}
