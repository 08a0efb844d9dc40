//! Explicit related-entity fetches: parents embedded in children, children listed by parent.
//! Nothing here is loaded implicitly; every fetch is a visible store call.

use crate::error::AppError;
use crate::model::*;
use crate::query::{Filter, ListQuery};
use crate::store::EntityStore;
use std::collections::HashMap;

impl EntityStore {
    /// Pairs each child with its parent, batch-loading parents by id.
    /// A child whose parent is gone is paired with `None`.
    pub async fn with_parents<C, P>(&self, children: Vec<C>, parent_id: fn(&C) -> i64) -> Result<Vec<(C, Option<P>)>, AppError>
    where
        C: Send,
        P: Entity + Clone,
    {
        let mut ids: Vec<i64> = children.iter().map(parent_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let parents: HashMap<i64, P> = self
            .fetch_where_in::<P>("id", &ids)
            .await?
            .into_iter()
            .map(|p| (p.id(), p))
            .collect();
        Ok(children
            .into_iter()
            .map(|c| {
                let parent = parents.get(&parent_id(&c)).cloned();
                (c, parent)
            })
            .collect())
    }

    pub async fn book_views(&self, books: Vec<Book>) -> Result<Vec<BookView>, AppError> {
        let pairs = self.with_parents::<Book, Author>(books, |b| b.author_id).await?;
        Ok(pairs
            .into_iter()
            .map(|(book, author)| BookView {
                book,
                author: author.as_ref().map(AuthorRef::from),
            })
            .collect())
    }

    pub async fn student_views(&self, students: Vec<Student>) -> Result<Vec<StudentView>, AppError> {
        let pairs = self.with_parents::<Student, Course>(students, |s| s.course_id).await?;
        Ok(pairs
            .into_iter()
            .map(|(student, course)| StudentView {
                student,
                course: course.as_ref().map(CourseRef::from),
            })
            .collect())
    }

    pub async fn teacher_views(&self, teachers: Vec<Teacher>) -> Result<Vec<TeacherView>, AppError> {
        let pairs = self.with_parents::<Teacher, Course>(teachers, |t| t.course_id).await?;
        Ok(pairs
            .into_iter()
            .map(|(teacher, course)| TeacherView {
                teacher,
                course: course.as_ref().map(CourseRef::from),
            })
            .collect())
    }

    /// A single book with its author.
    pub async fn book_view(&self, id: i64) -> Result<BookView, AppError> {
        let book = self.get::<Book>(id).await?;
        let author = self.find::<Author>(book.author_id).await?;
        Ok(BookView {
            author: author.as_ref().map(AuthorRef::from),
            book,
        })
    }

    /// Children of one parent, in id order. Fails if the parent does not exist.
    pub async fn children_of<P: Entity, C: Entity>(&self, parent_id: i64, foreign_key: &'static str) -> Result<Vec<C>, AppError> {
        self.get::<P>(parent_id).await?;
        self.list::<C>(&ListQuery::filtered(vec![Filter::eq(foreign_key, parent_id)]))
            .await
    }

    pub async fn books_by_author(&self, author_id: i64) -> Result<Vec<Book>, AppError> {
        self.children_of::<Author, Book>(author_id, "author_id").await
    }

    pub async fn students_of_course(&self, course_id: i64) -> Result<Vec<Student>, AppError> {
        self.children_of::<Course, Student>(course_id, "course_id").await
    }

    pub async fn teachers_of_course(&self, course_id: i64) -> Result<Vec<Teacher>, AppError> {
        self.children_of::<Course, Teacher>(course_id, "course_id").await
    }

    /// Exact, case-sensitive course name lookup. First match by id wins.
    pub async fn course_by_name(&self, name: &str) -> Result<Option<Course>, AppError> {
        let query = ListQuery::filtered(vec![Filter::eq("name", name)]).with_limit(1);
        Ok(self.list::<Course>(&query).await?.into_iter().next())
    }
}
