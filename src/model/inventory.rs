//! Variant C: products, no relationships.

use super::{push_present, Changeset, Entity};
use crate::error::AppError;
use crate::query::{FilterOp, FilterParam, ValueKind};
use crate::service::RequestValidator;
use crate::sql::BindValue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const NAME: &'static str = "Product";
    const KEY: &'static str = "product";
    const COLUMNS: &'static [&'static str] = &["id", "name", "quantity", "price"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "quantity", "price"];
    const FILTER_PARAMS: &'static [FilterParam] = &[
        FilterParam::new("name", "name", FilterOp::Like, ValueKind::Text),
        FilterParam::new("min_price", "price", FilterOp::Gte, ValueKind::Real),
        FilterParam::new("max_price", "price", FilterOp::Lte, ValueKind::Real),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    /// Left to the column default (0) when absent.
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl Changeset for NewProduct {
    type Entity = Product;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("name", &self.name)?;
        RequestValidator::required("price", &self.price)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = vec![("name", self.name.trim().into()), ("price", self.price.into())];
        push_present(&mut values, "quantity", &self.quantity);
        values
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl Changeset for ProductPatch {
    type Entity = Product;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("name", self.name.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "name", &self.name.as_ref().map(|n| n.trim().to_string()));
        push_present(&mut values, "quantity", &self.quantity);
        push_present(&mut values, "price", &self.price);
        values
    }
}
