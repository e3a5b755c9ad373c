use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bookshelf::modules::books::models::BookDraft;
use bookshelf::modules::books::repository::{BookRepository, SeaOrmBookRepository};
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

const FORM: &str = "application/x-www-form-urlencoded";

// Full application router over a fresh in-memory database
async fn setup_app() -> (Router, DatabaseConnection) {
    let settings = Settings {
        database: DatabaseSettings::in_memory(),
        ..Settings::default()
    };
    let db = bookshelf_db::connect(&settings.database)
        .await
        .expect("Failed to connect");
    let registry =
        bookshelf::app::build_registry(&db, &settings).expect("Failed to build registry");
    bookshelf_db::migrate(&db, &registry)
        .await
        .expect("Failed to migrate");

    (bookshelf_http::build_router(&registry, &settings), db)
}

async fn seed(db: &DatabaseConnection, title: &str, price: f64) -> i64 {
    SeaOrmBookRepository::new(db.clone())
        .save(BookDraft {
            id: None,
            category_name: "Fiction".to_string(),
            isbn: String::new(),
            title: title.to_string(),
            publisher: "Tor".to_string(),
            price,
        })
        .await
        .expect("Failed to seed book")
        .id
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn session_cookie(response: &Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn grid_returns_requested_page_with_totals() {
    let (app, db) = setup_app().await;
    for n in 1..=25 {
        seed(&db, &format!("Book {n:02}"), n as f64).await;
    }

    let response = get(&app, "/books/listgrid?page=3&rows=10").await;
    assert_eq!(response.status(), StatusCode::OK);

    let grid = body_json(response).await;
    assert_eq!(grid["currentPage"], 3);
    assert_eq!(grid["totalPages"], 3);
    assert_eq!(grid["totalRecords"], 25);
    let titles: Vec<_> = grid["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Book 21", "Book 22", "Book 23", "Book 24", "Book 25"]);

    // Totals do not depend on the page or sort requested
    let response = get(&app, "/books/listgrid?page=1&rows=7&sidx=price&sord=desc").await;
    let grid = body_json(response).await;
    assert_eq!(grid["totalRecords"], 25);
    assert_eq!(grid["totalPages"], 4);
    assert_eq!(grid["rows"][0]["price"], 25.0);
}

#[tokio::test]
async fn grid_descending_reverses_ascending() {
    let (app, db) = setup_app().await;
    for title in ["Carrie", "Arrival", "Beloved", "Arrival", "Dracula"] {
        seed(&db, title, 1.0).await;
    }

    let ids = |grid: Value| -> Vec<i64> {
        grid["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    };

    let ascending = get(&app, "/books/listgrid?page=1&rows=10&sidx=title&sord=asc").await;
    let ascending = ids(body_json(ascending).await);
    let descending = get(&app, "/books/listgrid?page=1&rows=10&sidx=title&sord=desc").await;
    let mut descending = ids(body_json(descending).await);
    descending.reverse();

    assert_eq!(ascending.len(), 5);
    assert_eq!(ascending, descending);
}

#[tokio::test]
async fn grid_rejects_bad_parameters() {
    let (app, _db) = setup_app().await;

    for uri in [
        "/books/listgrid",
        "/books/listgrid?page=0&rows=10",
        "/books/listgrid?page=1&rows=0",
        "/books/listgrid?page=1&rows=1000",
        "/books/listgrid?page=abc",
        "/books/listgrid?page=9223372036854775807&rows=10",
        "/books/listgrid?page=1000000000000000000&rows=100",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let response = get(&app, "/books/listgrid?page=1&sidx=author").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_parameter");
    assert_eq!(body["error"]["details"][0]["parameter"], "sidx");
}

#[tokio::test]
async fn empty_catalog_has_no_pages() {
    let (app, _db) = setup_app().await;

    let grid = body_json(get(&app, "/books/listgrid?page=1").await).await;
    assert_eq!(grid["totalRecords"], 0);
    assert_eq!(grid["totalPages"], 0);
    assert_eq!(grid["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn list_and_show_render_books() {
    let (app, db) = setup_app().await;
    let id = seed(&db, "Neuromancer", 8.99).await;

    let response = get(&app, "/books").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Neuromancer"));
    assert!(html.contains(&format!("/books/{id}")));

    let response = get(&app, &format!("/books/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Neuromancer"));
    assert!(html.contains("8.99"));

    let response = get(&app, &format!("/books/{id}?form")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"value="Neuromancer""#));
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let (app, _db) = setup_app().await;

    let response = get(&app, "/books/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "not_found");

    let response = get(&app, "/books/999?form").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/books/not-a-number").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_update_persists_nothing() {
    let (app, db) = setup_app().await;
    let id = seed(&db, "Dune", 9.99).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/books/{id}?form"))
                .header(header::CONTENT_TYPE, FORM)
                .body(Body::from("title=+++&price=12"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("The book could not be saved."));

    let stored = SeaOrmBookRepository::new(db)
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Dune");
    assert_eq!(stored.price, 9.99);
}

#[tokio::test]
async fn update_redirects_and_flashes_once() {
    let (app, db) = setup_app().await;
    let id = seed(&db, "Dune", 9.99).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/books/{id}?form"))
                .header(header::CONTENT_TYPE, FORM)
                .header(header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9,en;q=0.5")
                .body(Body::from(
                    "title=Dune+Messiah&isbn=&category_name=Fiction&publisher=Ace&price=12.50",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], format!("/books/{id}"));
    let cookie = session_cookie(&response);

    let show = |cookie: String| {
        app.clone().oneshot(
            Request::get(format!("/books/{id}"))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
    };

    let html = body_text(show(cookie.clone()).await.unwrap()).await;
    assert!(html.contains("Dune Messiah"));
    assert!(html.contains("12.50"));
    assert!(html.contains("Buch gespeichert."));

    let html = body_text(show(cookie).await.unwrap()).await;
    assert!(!html.contains("Buch gespeichert."));
}

#[tokio::test]
async fn notice_survives_a_missing_book() {
    let (app, db) = setup_app().await;
    let id = seed(&db, "Dune", 9.99).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/books/{id}?form"))
                .header(header::CONTENT_TYPE, FORM)
                .body(Body::from("title=Dune&price=10"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let fetch = |uri: String| {
        app.clone().oneshot(
            Request::get(uri)
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
    };

    let response = fetch("/books/999".to_string()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(fetch(format!("/books/{id}")).await.unwrap()).await;
    assert!(html.contains("Book saved."));
}

#[tokio::test]
async fn create_inserts_and_redirects_to_new_book() {
    let (app, db) = setup_app().await;
    let existing = seed(&db, "Emma", 3.0).await;

    let response = get(&app, "/books?form").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"action="/books?form""#));

    let response = app
        .clone()
        .oneshot(
            Request::post("/books?form")
                .header(header::CONTENT_TYPE, FORM)
                .body(Body::from("title=Persuasion&publisher=Penguin&price=7"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let new_id: i64 = location.trim_start_matches("/books/").parse().unwrap();
    assert_ne!(new_id, existing);

    let repository = SeaOrmBookRepository::new(db);
    assert_eq!(repository.count().await.unwrap(), 2);
    assert_eq!(
        repository.find_by_id(new_id).await.unwrap().unwrap().title,
        "Persuasion"
    );
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let (app, _db) = setup_app().await;

    let response = get(&app, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let doc = body_json(get(&app, "/docs/openapi.json").await).await;
    assert!(doc["paths"]["/books/listgrid"]["get"].is_object());
    assert!(doc["components"]["schemas"]["BookGrid"].is_object());
}
