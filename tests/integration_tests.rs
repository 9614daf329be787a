//! Integration tests for book-scout
//!
//! These tests run the full classify -> resolve -> assemble pipeline through
//! the real provider implementations, pointed at local mock servers.

use book_scout::config::Config;
use book_scout::models::{CallKind, CallOutcome, Origin};
use book_scout::{JsonLibrary, Resolver};
use mockito::{Matcher, Server, ServerGuard};
use std::collections::HashSet;

struct Providers {
    aladin: ServerGuard,
    google: ServerGuard,
    open_library: ServerGuard,
}

impl Providers {
    async fn start() -> Self {
        Self {
            aladin: Server::new_async().await,
            google: Server::new_async().await,
            open_library: Server::new_async().await,
        }
    }

    fn resolver(&self) -> Resolver {
        let mut config = Config::default();
        config.api_keys.aladin = Some("ttb-test".to_string());
        config.api_keys.google_books = Some("g-test".to_string());
        config.search.timeout_seconds = 5;
        config.endpoints.aladin = Some(self.aladin.url());
        config.endpoints.google_books = Some(self.google.url());
        config.endpoints.open_library = Some(self.open_library.url());
        Resolver::from_config(&config).expect("resolver")
    }
}

const GOOGLE_THREE: &str = r#"{
    "totalItems": 3,
    "items": [
        {"id": "g1", "volumeInfo": {"title": "Dune", "authors": ["Frank Herbert"], "pageCount": 604, "language": "en"}},
        {"id": "g2", "volumeInfo": {"title": "Dune Messiah", "authors": ["Frank Herbert"]}},
        {"id": "g3", "volumeInfo": {"title": "Children of Dune", "authors": ["Frank Herbert"]}}
    ]
}"#;

#[tokio::test]
async fn test_provider_500_does_not_hide_other_results() {
    let mut providers = Providers::start().await;
    let _aladin = providers
        .aladin
        .mock("GET", "/ItemSearch.aspx")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    let _google = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(GOOGLE_THREE)
        .create_async()
        .await;

    let resolution = providers
        .resolver()
        .resolve("dune", &HashSet::<String>::new())
        .await;

    assert_eq!(resolution.len(), 3);
    assert_eq!(resolution.books[0].book.id, "g1");
    assert_eq!(resolution.diagnostics[0].source, "aladin");
    assert_eq!(
        resolution.diagnostics[0].outcome,
        CallOutcome::Failed {
            error: "HTTP 500: internal error".to_string()
        }
    );
    assert!(!resolution.all_failed());
}

#[tokio::test]
async fn test_empty_primary_yields_exactly_the_secondary_results() {
    let mut providers = Providers::start().await;
    let aladin = providers
        .aladin
        .mock("GET", "/ItemSearch.aspx")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"totalResults": 0, "item": []}"#)
        .expect(2)
        .create_async()
        .await;
    let titled = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::UrlEncoded("q".into(), "intitle:dune".into()))
        .with_status(200)
        .with_body(GOOGLE_THREE)
        .expect(1)
        .create_async()
        .await;
    let unscoped = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::UrlEncoded("q".into(), "dune".into()))
        .with_status(200)
        .with_body(
            r#"{"items": [
                {"id": "x1", "volumeInfo": {"title": "Dune Road", "authors": ["Someone"]}},
                {"id": "x2", "volumeInfo": {"title": "Dune Buggies", "authors": ["Someone Else"]}}
            ]}"#,
        )
        .expect(0)
        .create_async()
        .await;

    let resolution = providers
        .resolver()
        .resolve("dune", &HashSet::<String>::new())
        .await;

    aladin.assert_async().await;
    titled.assert_async().await;
    unscoped.assert_async().await;
    let ids: Vec<&str> = resolution.candidates().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g2", "g3"]);
    assert!(resolution
        .books
        .iter()
        .all(|b| b.origin == Origin::Secondary));
    let last = resolution.diagnostics.last().expect("broadened call");
    assert_eq!(last.source, "aladin");
    assert_eq!(last.call, CallKind::Broadened);
}

#[tokio::test]
async fn test_broadened_primary_keyword_search_ranks_first() {
    let mut providers = Providers::start().await;
    let _by_title = providers
        .aladin
        .mock("GET", "/ItemSearch.aspx")
        .match_query(Matcher::UrlEncoded("QueryType".into(), "Title".into()))
        .with_status(200)
        .with_body(r#"{"item": []}"#)
        .create_async()
        .await;
    let by_keyword = providers
        .aladin
        .mock("GET", "/ItemSearch.aspx")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("QueryType".into(), "Keyword".into()),
            Matcher::UrlEncoded("Query".into(), "dune".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"item": [{"title": "Dune", "author": "Frank Herbert", "isbn13": "9780441172719"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let _google = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(GOOGLE_THREE)
        .create_async()
        .await;

    let resolution = providers
        .resolver()
        .resolve("dune", &HashSet::<String>::new())
        .await;

    by_keyword.assert_async().await;
    let ids: Vec<&str> = resolution.candidates().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["9780441172719", "g2", "g3"]);
    assert_eq!(resolution.books[0].origin, Origin::Primary);
    assert_eq!(resolution.books[0].book.page_count, Some(604));
}

#[tokio::test]
async fn test_isbn_primary_hit_enriched_by_open_library() {
    let mut providers = Providers::start().await;
    let _aladin = providers
        .aladin
        .mock("GET", "/ItemLookUp.aspx")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("itemIdType".into(), "ISBN13".into()),
            Matcher::UrlEncoded("ItemId".into(), "9788936433598".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"item": [{
                "title": "채식주의자",
                "author": "한강 (지은이)",
                "isbn13": "9788936433598",
                "subInfo": {"itemPage": 247}
            }]}"#,
        )
        .create_async()
        .await;
    let _open_library = providers
        .open_library
        .mock("GET", "/isbn/9788936433598.json")
        .with_status(200)
        .with_body(r#"{"title": "The Vegetarian", "number_of_pages": 260}"#)
        .create_async()
        .await;
    let google = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resolution = providers
        .resolver()
        .resolve("ISBN 978-89-364-3359-8", &HashSet::<String>::new())
        .await;

    google.assert_async().await;
    assert_eq!(resolution.len(), 1);
    let resolved = &resolution.books[0];
    assert_eq!(resolved.origin, Origin::Primary);
    assert_eq!(resolved.book.title, "채식주의자");
    assert_eq!(resolved.book.authors, vec!["한강 (지은이)".to_string()]);
    assert_eq!(resolved.book.page_count, Some(260));
    assert!(resolved
        .book
        .cover_url
        .as_deref()
        .is_some_and(|url| url.ends_with("/b/isbn/9788936433598-L.jpg")));
}

#[tokio::test]
async fn test_isbn_primary_miss_uses_secondary_filter() {
    let mut providers = Providers::start().await;
    let _aladin = providers
        .aladin
        .mock("GET", "/ItemLookUp.aspx")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"item": []}"#)
        .create_async()
        .await;
    let _open_library = providers
        .open_library
        .mock("GET", "/isbn/9780441172719.json")
        .with_status(404)
        .create_async()
        .await;
    let google = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "isbn:9780441172719".into()),
            Matcher::UrlEncoded("maxResults".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"items": [{"id": "B1hSG45JCX4C", "volumeInfo": {"title": "Dune", "authors": ["Frank Herbert"]}}]}"#,
        )
        .create_async()
        .await;

    let resolution = providers
        .resolver()
        .resolve("9780441172719", &HashSet::<String>::new())
        .await;

    google.assert_async().await;
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution.books[0].origin, Origin::Secondary);
    assert_eq!(resolution.books[0].book.id, "B1hSG45JCX4C");
}

#[tokio::test]
async fn test_local_script_query_restricts_language_and_marks_library() {
    let mut providers = Providers::start().await;
    let _aladin = providers
        .aladin
        .mock("GET", "/ItemSearch.aspx")
        .match_query(Matcher::UrlEncoded("QueryType".into(), "Title".into()))
        .with_status(200)
        .with_body(
            r#"{"item": [
                {"title": "채식주의자", "author": "한강", "isbn13": "9788936433598", "itemPage": 247},
                {"title": "소년이 온다", "author": "한강", "isbn13": "9788936434120"}
            ]}"#,
        )
        .create_async()
        .await;
    let google = providers
        .google
        .mock("GET", "/volumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "intitle:한강".into()),
            Matcher::UrlEncoded("langRestrict".into(), "ko".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"items": [
                {"id": "k1", "volumeInfo": {"title": "채식주의자", "authors": ["한강"], "language": "ko",
                    "imageLinks": {"thumbnail": "http://books.google.com/k1"}}},
                {"id": "k2", "volumeInfo": {"title": "흰", "authors": ["한강"]}}
            ]}"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(&path, r#"[{"title": "흰", "author": "한강"}]"#).unwrap();
    let library = JsonLibrary::load(&path).unwrap();

    let resolution = providers.resolver().resolve("한강", &library).await;

    google.assert_async().await;
    let ids: Vec<&str> = resolution.candidates().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["9788936433598", "9788936434120", "k2"]);

    let first = &resolution.books[0].book;
    assert_eq!(first.language_code.as_deref(), Some("ko"));
    assert_eq!(first.cover_url.as_deref(), Some("https://books.google.com/k1"));

    assert!(!resolution.books[0].in_library);
    assert!(resolution.books[2].in_library);
    assert_eq!(resolution.books[2].origin, Origin::Secondary);
}
