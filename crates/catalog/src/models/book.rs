use crate::book::Book;
use crate::error::Error;
use crate::models::timestamp;

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) created_on: i64,
    pub(crate) updated_on: i64,
    pub(crate) series: Option<String>,
    pub(crate) title: String,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            authors: Vec::new(),
            title: row.title,
            series: row.series,
            files: Vec::new(),
            created_on: Some(timestamp(row.created_on, "book creation date")?),
            updated_on: Some(timestamp(row.updated_on, "book update date")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let row = BookRow {
            id: 7,
            created_on: 1_700_000_000,
            updated_on: 1_700_000_060,
            series: Some("Discworld".to_string()),
            title: "Mort".to_string(),
        };
        let book = Book::try_from(row).unwrap();
        assert_eq!(book.id, 7);
        assert_eq!(book.series.as_deref(), Some("Discworld"));
        assert!(book.authors.is_empty());
        assert_eq!(book.updated_on.unwrap().unix_timestamp(), 1_700_000_060);
    }

    #[test]
    fn test_out_of_range_timestamp_is_rejected() {
        let row = BookRow {
            id: 7,
            created_on: i64::MAX,
            updated_on: 0,
            series: None,
            title: "Mort".to_string(),
        };
        assert!(Book::try_from(row).is_err());
    }
}
