mod common;

use common::*;
use entity_store::model::*;
use entity_store::query::FilterOp;
use entity_store::{Filter, ListQuery, PageRequest, SortOrder};

async fn twenty_books() -> (entity_store::EntityStore, Vec<Book>) {
    let store = store().await;
    let a = author(&store, "Ada").await;
    let mut books = Vec::new();
    for i in 1..=20 {
        // years deliberately out of id order
        let year = 2000 + (i * 7) % 20;
        books.push(book(&store, &format!("Book {i:02}"), year, a.id).await);
    }
    (store, books)
}

#[tokio::test]
async fn second_page_of_twenty() {
    let (store, books) = twenty_books().await;
    let page = store
        .paginate::<Book>(&ListQuery::default(), PageRequest::new(2, 5))
        .await
        .unwrap();
    let ids: Vec<i64> = page.items.iter().map(|b| b.id).collect();
    let expected: Vec<i64> = books[5..10].iter().map(|b| b.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(page.total, 20);
    assert_eq!(page.total_pages, 4);
    assert!(page.has_prev);
    assert!(page.has_next);
}

#[tokio::test]
async fn page_sizes_follow_the_total() {
    let (store, _) = twenty_books().await;
    for (page, per_page, len, has_next) in [(1, 6, 6, true), (4, 6, 2, false), (5, 6, 0, false), (1, 20, 20, false)] {
        let p = store
            .paginate::<Book>(&ListQuery::default(), PageRequest::new(page, per_page))
            .await
            .unwrap();
        assert_eq!(p.items.len(), len, "page {page} per_page {per_page}");
        assert_eq!(p.has_next, has_next);
        assert_eq!(p.total_pages, 20_u64.div_ceil(per_page as u64));
    }
}

#[tokio::test]
async fn sort_orders_are_monotonic() {
    let (store, _) = twenty_books().await;
    let asc = store
        .list::<Book>(&ListQuery::default().sorted_by("year", SortOrder::Asc))
        .await
        .unwrap();
    assert!(asc.windows(2).all(|w| w[0].year <= w[1].year));

    let desc = store
        .list::<Book>(&ListQuery::default().sorted_by("year", SortOrder::Desc))
        .await
        .unwrap();
    assert!(desc.windows(2).all(|w| w[0].year >= w[1].year));
}

#[tokio::test]
async fn unknown_sort_key_falls_back_to_id() {
    let (store, _) = twenty_books().await;
    let rows = store
        .list::<Book>(&ListQuery::default().sorted_by("title; DROP TABLE books", SortOrder::Asc))
        .await
        .unwrap();
    assert_eq!(rows.len(), 20);
    assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn filters_narrow_the_list() {
    let (store, _) = twenty_books().await;
    let from_2015 = ListQuery::filtered(vec![Filter::new("year", FilterOp::Gte, 2015_i64)]);
    let rows = store.list::<Book>(&from_2015).await.unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|b| b.year.unwrap_or_default() >= 2015));
    assert_eq!(store.count::<Book>(&from_2015.filters).await.unwrap(), rows.len() as u64);

    let titled = ListQuery::filtered(vec![Filter::new("title", FilterOp::Like, "book 1")]);
    let rows = store.list::<Book>(&titled).await.unwrap();
    assert_eq!(rows.len(), 10);
}

#[tokio::test]
async fn substring_filter_matches_wildcards_literally() {
    let store = store().await;
    let a = author(&store, "Ada").await;
    for title in ["Plain", "100% Rust", "snake_case", r"back\slash"] {
        book(&store, title, 2020, a.id).await;
    }
    let titles_matching = |term: &'static str| {
        let store = store.clone();
        async move {
            let query = ListQuery::filtered(vec![Filter::new("title", FilterOp::Like, term)]);
            store
                .list::<Book>(&query)
                .await
                .unwrap()
                .into_iter()
                .map(|b| b.title)
                .collect::<Vec<_>>()
        }
    };
    assert_eq!(titles_matching("%").await, ["100% Rust"]);
    assert_eq!(titles_matching("_").await, ["snake_case"]);
    assert_eq!(titles_matching(r"\").await, [r"back\slash"]);
    assert_eq!(titles_matching("rust").await, ["100% Rust"]);
}

#[tokio::test]
async fn limit_and_offset_window_the_list() {
    let (store, books) = twenty_books().await;
    let query = ListQuery {
        limit: Some(3),
        offset: Some(4),
        ..Default::default()
    };
    let ids: Vec<i64> = store.list::<Book>(&query).await.unwrap().iter().map(|b| b.id).collect();
    let expected: Vec<i64> = books[4..7].iter().map(|b| b.id).collect();
    assert_eq!(ids, expected);
}
