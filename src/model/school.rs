//! Variant B: courses with their students and teachers.

use super::{nullable, push_present, Changeset, Dependent, Entity, Reference};
use crate::error::AppError;
use crate::query::{FilterOp, FilterParam, ValueKind};
use crate::service::RequestValidator;
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Entity for Course {
    const TABLE: &'static str = "courses";
    const NAME: &'static str = "Course";
    const KEY: &'static str = "course";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description"];
    const SORTABLE: &'static [&'static str] = &["id", "name"];
    const FILTER_PARAMS: &'static [FilterParam] = &[FilterParam::new("name", "name", FilterOp::Like, ValueKind::Text)];
    const DEPENDENTS: &'static [Dependent] = &[
        Dependent {
            table: "students",
            column: "course_id",
        },
        Dependent {
            table: "teachers",
            column: "course_id",
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewCourse {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

impl Changeset for NewCourse {
    type Entity = Course;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("name", &self.name)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        vec![
            ("name", self.name.trim().into()),
            ("description", self.description.clone().into()),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CoursePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl Changeset for CoursePatch {
    type Entity = Course;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("name", self.name.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "name", &self.name.as_ref().map(|n| n.trim().to_string()));
        push_present(&mut values, "description", &self.description);
        values
    }
}

/// The part of a course embedded in a student or teacher.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourseRef {
    pub id: i64,
    pub name: String,
}

impl From<&Course> for CourseRef {
    fn from(c: &Course) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub course_id: i64,
}

impl Entity for Student {
    const TABLE: &'static str = "students";
    const NAME: &'static str = "Student";
    const KEY: &'static str = "student";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "course_id"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "email", "course_id"];
    const FILTER_PARAMS: &'static [FilterParam] = &[
        FilterParam::new("name", "name", FilterOp::Like, ValueKind::Text),
        FilterParam::new("email", "email", FilterOp::Eq, ValueKind::Text),
        FilterParam::new("course_id", "course_id", FilterOp::Eq, ValueKind::Int),
    ];
    const UNIQUE: &'static [&'static str] = &["email"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub course_id: Option<i64>,
}

impl Changeset for NewStudent {
    type Entity = Student;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("name", &self.name)?;
        RequestValidator::required_text("email", &self.email)?;
        RequestValidator::required("course_id", &self.course_id)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        vec![
            ("name", self.name.trim().into()),
            ("email", self.email.trim().into()),
            ("course_id", self.course_id.into()),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        self.course_id.map(Reference::to::<Course>).into_iter().collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course_id: Option<i64>,
}

impl Changeset for StudentPatch {
    type Entity = Student;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("name", self.name.as_deref())?;
        RequestValidator::not_blank("email", self.email.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "name", &self.name.as_ref().map(|n| n.trim().to_string()));
        push_present(&mut values, "email", &self.email.as_ref().map(|e| e.trim().to_string()));
        push_present(&mut values, "course_id", &self.course_id);
        values
    }

    fn references(&self) -> Vec<Reference> {
        self.course_id.map(Reference::to::<Course>).into_iter().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudentView {
    #[serde(flatten)]
    pub student: Student,
    pub course: Option<CourseRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub course_id: i64,
}

impl Entity for Teacher {
    const TABLE: &'static str = "teachers";
    const NAME: &'static str = "Teacher";
    const KEY: &'static str = "teacher";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "course_id"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "email", "course_id"];
    const FILTER_PARAMS: &'static [FilterParam] = &[
        FilterParam::new("name", "name", FilterOp::Like, ValueKind::Text),
        FilterParam::new("email", "email", FilterOp::Eq, ValueKind::Text),
        FilterParam::new("course_id", "course_id", FilterOp::Eq, ValueKind::Int),
    ];
    const UNIQUE: &'static [&'static str] = &["email"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewTeacher {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub course_id: Option<i64>,
}

impl Changeset for NewTeacher {
    type Entity = Teacher;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("name", &self.name)?;
        RequestValidator::required_text("email", &self.email)?;
        RequestValidator::required("course_id", &self.course_id)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        vec![
            ("name", self.name.trim().into()),
            ("email", self.email.trim().into()),
            ("course_id", self.course_id.into()),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        self.course_id.map(Reference::to::<Course>).into_iter().collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course_id: Option<i64>,
}

impl Changeset for TeacherPatch {
    type Entity = Teacher;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("name", self.name.as_deref())?;
        RequestValidator::not_blank("email", self.email.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "name", &self.name.as_ref().map(|n| n.trim().to_string()));
        push_present(&mut values, "email", &self.email.as_ref().map(|e| e.trim().to_string()));
        push_present(&mut values, "course_id", &self.course_id);
        values
    }

    fn references(&self) -> Vec<Reference> {
        self.course_id.map(Reference::to::<Course>).into_iter().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeacherView {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub course: Option<CourseRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_patch_only_writes_supplied_fields() {
        let patch: StudentPatch = serde_json::from_str(r#"{"email": " new@school.test "}"#).unwrap();
        assert_eq!(patch.values(), vec![("email", BindValue::Text("new@school.test".into()))]);
        assert!(patch.references().is_empty());
    }

    #[test]
    fn new_teacher_reports_first_missing_field() {
        let new: NewTeacher = serde_json::from_str(r#"{"name": "Grace", "course_id": 2}"#).unwrap();
        assert_eq!(new.validate().unwrap_err().to_string(), "email is required");
    }

    #[test]
    fn course_patch_can_clear_description() {
        let patch: CoursePatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.values(), vec![("description", BindValue::Null)]);
    }
}
