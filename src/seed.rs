//! Sample rows for a fresh database. Each table group is seeded only while its root table is empty.

use crate::error::AppError;
use crate::model::*;
use crate::store::EntityStore;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub courses: usize,
    pub authors: usize,
    pub books: usize,
    pub products: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == SeedReport::default()
    }
}

pub async fn seed_if_empty(store: &EntityStore) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    if store.count::<Course>(&[]).await? == 0 {
        for (name, description) in [
            ("Python Basics", "Introduction to Python programming"),
            ("Web Development", "Building web applications"),
            ("Data Science", "Data analysis and visualization"),
        ] {
            store
                .create(&NewCourse {
                    name: name.into(),
                    description: Some(description.into()),
                })
                .await?;
            report.courses += 1;
        }
    }

    if store.count::<Author>(&[]).await? == 0 {
        let books: [(&str, Option<&str>, &[(&str, i64, &str)]); 2] = [
            (
                "Author One",
                Some("Helsinki"),
                &[("First Book", 2019, "978-0000000001"), ("Second Book", 2021, "978-0000000002")],
            ),
            (
                "Author Two",
                Some("Espoo"),
                &[("Third Book", 2020, "978-0000000003"), ("Fourth Book", 2023, "978-0000000004")],
            ),
        ];
        for (name, city, titles) in books {
            let author = store
                .create(&NewAuthor {
                    name: name.into(),
                    bio: None,
                    city: city.map(Into::into),
                })
                .await?;
            report.authors += 1;
            for (title, year, isbn) in titles {
                store
                    .create(&NewBook {
                        title: (*title).into(),
                        year: Some(*year),
                        isbn: Some((*isbn).into()),
                        author_id: Some(author.id),
                    })
                    .await?;
                report.books += 1;
            }
        }
    }

    if store.count::<Product>(&[]).await? == 0 {
        for (name, quantity, price) in [("Laptop", 10, 999.99), ("Mouse", 50, 19.99), ("Keyboard", 25, 49.5)] {
            store
                .create(&NewProduct {
                    name: name.into(),
                    quantity: Some(quantity),
                    price: Some(price),
                })
                .await?;
            report.products += 1;
        }
    }

    if report.is_empty() {
        tracing::debug!("sample data already present");
    } else {
        tracing::info!(?report, "sample data seeded");
    }
    Ok(report)
}
