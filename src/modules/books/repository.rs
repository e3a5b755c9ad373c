//! Storage access for books.

use std::str::FromStr;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, Order, PaginatorTrait,
    QueryOrder, Set,
};

use super::entity::{ActiveModel, Column, Entity as BookEntity};
use super::error::BookError;
use super::models::{Book, BookDraft};

/// Sort direction of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// `desc` selects descending order; anything else is ascending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        }
    }
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// Book attributes a page may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    CategoryName,
    Isbn,
    Title,
    Publisher,
    Price,
}

impl SortField {
    fn column(self) -> Column {
        match self {
            SortField::Id => Column::Id,
            SortField::CategoryName => Column::CategoryName,
            SortField::Isbn => Column::Isbn,
            SortField::Title => Column::Title,
            SortField::Publisher => Column::Publisher,
            SortField::Price => Column::Price,
        }
    }
}

impl FromStr for SortField {
    type Err = BookError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "id" => Ok(SortField::Id),
            "category_name" | "categoryName" => Ok(SortField::CategoryName),
            "isbn" => Ok(SortField::Isbn),
            "title" => Ok(SortField::Title),
            "publisher" => Ok(SortField::Publisher),
            "price" => Ok(SortField::Price),
            other => Err(BookError::UnknownSortField(other.to_string())),
        }
    }
}

/// Sort directive of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

/// Zero-based page index, page size, and optional sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Option<Sort>,
}

/// One page of results plus totals across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based index of this page
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// Repository trait for the Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books ordered by id
    async fn find_all(&self) -> Result<Vec<Book>, BookError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, BookError>;

    /// Insert a draft without id, otherwise update the row with that id
    async fn save(&self, draft: BookDraft) -> Result<Book, BookError>;

    async fn find_page(&self, request: PageRequest) -> Result<Page<Book>, BookError>;

    async fn count(&self) -> Result<u64, BookError>;
}

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, BookError> {
        Ok(BookEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, BookError> {
        Ok(BookEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn save(&self, draft: BookDraft) -> Result<Book, BookError> {
        let mut model = ActiveModel {
            id: NotSet,
            category_name: Set(draft.category_name),
            isbn: Set(draft.isbn),
            title: Set(draft.title),
            publisher: Set(draft.publisher),
            price: Set(draft.price),
        };

        match draft.id {
            None => Ok(model.insert(&self.db).await?),
            Some(id) => {
                model.id = Set(id);
                match model.update(&self.db).await {
                    Ok(book) => Ok(book),
                    Err(DbErr::RecordNotUpdated) => Err(BookError::NotFound(id)),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Book>, BookError> {
        let query = match request.sort {
            // Ties are broken by id in the same direction so reversing the
            // direction reverses the whole ordering.
            Some(sort) => BookEntity::find()
                .order_by(sort.field.column(), sort.direction.into())
                .order_by(Column::Id, sort.direction.into()),
            None => BookEntity::find().order_by_asc(Column::Id),
        };

        let paginator = query.paginate(&self.db, request.size);
        let totals = paginator.num_items_and_pages().await?;
        let content = paginator.fetch_page(request.page).await?;

        Ok(Page {
            content,
            number: request.page,
            size: request.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    async fn count(&self) -> Result<u64, BookError> {
        Ok(BookEntity::find().count(&self.db).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::modules::books::{create_module, messages};
    use bookshelf_kernel::settings::{DatabaseSettings, Settings};
    use bookshelf_kernel::ModuleRegistry;
    use std::sync::Arc;

    /// Fresh in-memory database with the books schema applied.
    pub(crate) async fn test_db() -> DatabaseConnection {
        let db = bookshelf_db::connect(&DatabaseSettings::in_memory())
            .await
            .unwrap();
        let mut registry = ModuleRegistry::new();
        registry.register(create_module(
            db.clone(),
            Arc::new(messages::builtin()),
            &Settings::default(),
        ));
        bookshelf_db::migrate(&db, &registry).await.unwrap();
        db
    }

    pub(crate) fn draft(title: &str, price: f64) -> BookDraft {
        BookDraft {
            id: None,
            category_name: "Fiction".to_string(),
            isbn: String::new(),
            title: title.to_string(),
            publisher: "Tor".to_string(),
            price,
        }
    }

    #[test]
    fn sort_field_names_are_allow_listed() {
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!(
            "categoryName".parse::<SortField>().unwrap(),
            SortField::CategoryName
        );
        assert!(matches!(
            "title; DROP TABLE book".parse::<SortField>(),
            Err(BookError::UnknownSortField(_))
        ));
    }

    #[test]
    fn anything_but_desc_sorts_ascending() {
        assert_eq!(Direction::parse_lenient(Some("desc")), Direction::Desc);
        assert_eq!(Direction::parse_lenient(Some("DESC")), Direction::Asc);
        assert_eq!(Direction::parse_lenient(Some("asc")), Direction::Asc);
        assert_eq!(Direction::parse_lenient(None), Direction::Asc);
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids() {
        let repo = SeaOrmBookRepository::new(test_db().await);

        let first = repo.save(draft("Dune", 9.99)).await.unwrap();
        let second = repo.save(draft("Emma", 4.5)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.find_by_id(second.id).await.unwrap().unwrap().title, "Emma");
    }

    #[tokio::test]
    async fn update_overwrites_in_place() {
        let repo = SeaOrmBookRepository::new(test_db().await);
        let saved = repo.save(draft("Dune", 9.99)).await.unwrap();

        let updated = repo
            .save(BookDraft {
                id: Some(saved.id),
                title: "Dune Messiah".to_string(),
                price: 12.0,
                ..draft("", 0.0)
            })
            .await
            .unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(repo.count().await.unwrap(), 1);
        let stored = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Dune Messiah");
        assert_eq!(stored.price, 12.0);
    }

    #[tokio::test]
    async fn updating_unknown_id_is_not_found() {
        let repo = SeaOrmBookRepository::new(test_db().await);

        let err = repo
            .save(BookDraft {
                id: Some(404),
                ..draft("Ghost", 1.0)
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookError::NotFound(404)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn pages_carry_totals() {
        let repo = SeaOrmBookRepository::new(test_db().await);
        for n in 1..=25 {
            repo.save(draft(&format!("Book {n:02}"), n as f64)).await.unwrap();
        }

        let page = repo
            .find_page(PageRequest {
                page: 2,
                size: 10,
                sort: None,
            })
            .await
            .unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        let titles: Vec<_> = page.content.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Book 21", "Book 22", "Book 23", "Book 24", "Book 25"]
        );
    }

    #[tokio::test]
    async fn descending_sort_reverses_ascending_with_ties() {
        let repo = SeaOrmBookRepository::new(test_db().await);
        for title in ["Carrie", "Arrival", "Beloved", "Arrival"] {
            repo.save(draft(title, 1.0)).await.unwrap();
        }

        let fetch = |direction| {
            repo.find_page(PageRequest {
                page: 0,
                size: 10,
                sort: Some(Sort {
                    field: SortField::Title,
                    direction,
                }),
            })
        };
        let ascending = fetch(Direction::Asc).await.unwrap().content;
        let mut descending = fetch(Direction::Desc).await.unwrap().content;
        descending.reverse();

        assert_eq!(ascending, descending);
        assert_eq!(ascending[0].title, "Arrival");
        assert_eq!(ascending[3].title, "Carrie");
    }
}
