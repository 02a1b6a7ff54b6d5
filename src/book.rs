//! The `Book` record and the payload clients submit to create one.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub pages: u32,
    pub book_number: u32,
    pub finished: Option<bool>,
    #[serde(skip)]
    dedupe_id: String,
}

impl Book {
    pub fn new(id: u64, book: NewBook) -> Self {
        Self {
            id,
            dedupe_id: book.dedupe_id(),
            title: book.title,
            author: book.author,
            pages: book.pages,
            book_number: book.book_number,
            finished: book.finished,
        }
    }

    pub fn dedupe_id(&self) -> &str {
        &self.dedupe_id
    }
}

/// A validated book that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub pages: u32,
    pub book_number: u32,
    pub finished: Option<bool>,
}

impl NewBook {
    /// Title followed by page count; two books with the same key are the same book.
    pub fn dedupe_id(&self) -> String {
        format!("{}{}", self.title, self.pages)
    }
}

/// A book as submitted in a create request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    #[validate(
        required(message = "must not be null"),
        length(min = 2, max = 50, message = "size must be between 2 and 50")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "must not be null"),
        length(min = 3, max = 50, message = "size must be between 3 and 50")
    )]
    pub author: Option<String>,

    #[validate(
        required(message = "must not be null"),
        range(min = 1, max = 9999, message = "must be between 1 and 9999")
    )]
    pub pages: Option<i64>,

    #[validate(
        required(message = "must not be null"),
        range(min = 1, max = 99, message = "must be between 1 and 99")
    )]
    pub book_number: Option<i64>,

    pub finished: Option<bool>,
}

impl TryFrom<BookDto> for NewBook {
    type Error = validator::ValidationErrors;

    fn try_from(dto: BookDto) -> Result<Self, Self::Error> {
        dto.validate()?;

        // validate() guarantees every required field is present and in range
        Ok(NewBook {
            title: dto.title.unwrap_or_default(),
            author: dto.author.unwrap_or_default(),
            pages: dto.pages.unwrap_or_default() as u32,
            book_number: dto.book_number.unwrap_or_default() as u32,
            finished: dto.finished,
        })
    }
}
