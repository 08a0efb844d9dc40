#![allow(dead_code)]

use entity_store::model::*;
use entity_store::EntityStore;

pub async fn store() -> EntityStore {
    EntityStore::in_memory().await.unwrap()
}

pub async fn author(store: &EntityStore, name: &str) -> Author {
    store
        .create(&NewAuthor {
            name: name.into(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn book(store: &EntityStore, title: &str, year: i64, author_id: i64) -> Book {
    store
        .create(&NewBook {
            title: title.into(),
            year: Some(year),
            author_id: Some(author_id),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn course(store: &EntityStore, name: &str) -> Course {
    store
        .create(&NewCourse {
            name: name.into(),
            description: None,
        })
        .await
        .unwrap()
}

pub async fn student(store: &EntityStore, name: &str, email: &str, course_id: i64) -> Student {
    store
        .create(&NewStudent {
            name: name.into(),
            email: email.into(),
            course_id: Some(course_id),
        })
        .await
        .unwrap()
}
