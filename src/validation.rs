use crate::book::{BookDto, NewBook};
use crate::error::ApiError;
use crate::pagination::PageRequest;
use serde::Deserialize;
use validator::ValidationErrors;

/// Query parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Request validation utilities
pub struct RequestValidator;

impl RequestValidator {
    /// Validates a create request, returning the books ready to be stored.
    ///
    /// All invalid entries are reported at once; nothing is returned unless
    /// the whole batch is valid.
    pub fn validate_books(dtos: Vec<BookDto>) -> Result<Vec<NewBook>, ApiError> {
        if dtos.is_empty() {
            return Err(ApiError::Validation(vec![
                "request body must contain at least one book".to_string(),
            ]));
        }

        let indexed = dtos.len() > 1;
        let mut books = Vec::with_capacity(dtos.len());
        let mut messages = Vec::new();

        for (index, dto) in dtos.into_iter().enumerate() {
            match NewBook::try_from(dto) {
                Ok(book) => books.push(book),
                Err(errors) => {
                    let prefix = if indexed {
                        format!("[{}].", index)
                    } else {
                        String::new()
                    };
                    messages.extend(
                        Self::field_messages(&errors)
                            .into_iter()
                            .map(|msg| format!("{}{}", prefix, msg)),
                    );
                }
            }
        }

        if messages.is_empty() {
            Ok(books)
        } else {
            Err(ApiError::Validation(messages))
        }
    }

    /// Validates list query parameters against the configured page sizes
    pub fn validate_page_params(
        params: &PageParams,
        default_size: u32,
        max_size: u32,
    ) -> Result<PageRequest, ApiError> {
        let size = params.size.unwrap_or(default_size);

        if size == 0 || size > max_size {
            return Err(ApiError::InvalidRequest(format!(
                "size must be between 1 and {}",
                max_size
            )));
        }

        Ok(PageRequest::new(params.page.unwrap_or(0), size))
    }

    /// Flattens validator output into `"<field> <message>"` lines, sorted so
    /// responses are stable.
    pub fn field_messages(errors: &ValidationErrors) -> Vec<String> {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                let field = camel_case(field);
                field_errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    format!("{} {}", field, message)
                })
            })
            .collect();
        messages.sort();
        messages
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> Vec<BookDto> {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_validate_books() {
        let dtos = parse(json!([
            {"title": "Kindred", "author": "Octavia Butler", "pages": 264, "bookNumber": 1, "finished": true}
        ]));

        let books = RequestValidator::validate_books(dtos).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].book_number, 1);
        assert_eq!(books[0].finished, Some(true));
    }

    #[test]
    fn test_single_book_messages() {
        let dtos = parse(json!([
            {"title": "K", "author": "Octavia Butler", "pages": 264}
        ]));

        match RequestValidator::validate_books(dtos) {
            Err(ApiError::Validation(messages)) => {
                assert_eq!(
                    messages,
                    vec![
                        "bookNumber must not be null".to_string(),
                        "title size must be between 2 and 50".to_string(),
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_messages_are_indexed() {
        let dtos = parse(json!([
            {"title": "Kindred", "author": "Octavia Butler", "pages": 264, "bookNumber": 1},
            {"title": "Dawn", "author": "Octavia Butler", "pages": 0, "bookNumber": 2}
        ]));

        match RequestValidator::validate_books(dtos) {
            Err(ApiError::Validation(messages)) => {
                assert_eq!(messages, vec!["[1].pages must be between 1 and 9999".to_string()]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            RequestValidator::validate_books(Vec::new()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_page_params() {
        let request =
            RequestValidator::validate_page_params(&PageParams::default(), 20, 100).unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 20);

        let params = PageParams {
            page: Some(3),
            size: Some(101),
        };
        assert!(RequestValidator::validate_page_params(&params, 20, 100).is_err());

        let params = PageParams {
            page: Some(3),
            size: Some(0),
        };
        assert!(RequestValidator::validate_page_params(&params, 20, 100).is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("book_number"), "bookNumber");
        assert_eq!(camel_case("title"), "title");
    }
}
