//! Generic CRUD execution against SQLite for any `Entity`.

use crate::error::AppError;
use crate::model::{Changeset, Entity};
use crate::query::{Filter, ListQuery, Page, PageRequest};
use crate::sql::{self, BindValue, QueryBuf};
use crate::store::EntityStore;

impl EntityStore {
    /// Validate, check references and unique fields, then insert. Returns the stored record.
    pub async fn create<C: Changeset>(&self, new: &C) -> Result<C::Entity, AppError> {
        new.validate()?;
        self.check_references(new).await?;
        let values = new.values();
        self.check_unique::<C::Entity>(&values, None).await?;

        let q = sql::insert::<C::Entity>(&values);
        let row = self
            .fetch_written::<C::Entity>(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(entity = C::Entity::NAME, id = row.id(), "created");
        Ok(row)
    }

    pub async fn find<E: Entity>(&self, id: i64) -> Result<Option<E>, AppError> {
        let mut q = sql::select_by_id::<E>();
        q.params.push(BindValue::Int(id));
        self.fetch_optional::<E>(&q).await
    }

    pub async fn get<E: Entity>(&self, id: i64) -> Result<E, AppError> {
        self.find::<E>(id).await?.ok_or_else(|| not_found::<E>(id))
    }

    /// List rows matching the query. Without a sort, rows come back in id order.
    pub async fn list<E: Entity>(&self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let sort = query.resolved_sort(E::SORTABLE);
        let q = sql::select_list::<E>(&query.filters, sort, query.limit, query.offset);
        self.fetch_all::<E>(&q).await
    }

    pub async fn count<E: Entity>(&self, filters: &[Filter]) -> Result<u64, AppError> {
        let q = sql::count::<E>(filters);
        self.fetch_count(&q).await
    }

    /// One page of the query. `limit`/`offset` on the query are replaced by the page window.
    pub async fn paginate<E: Entity>(&self, query: &ListQuery, page: PageRequest) -> Result<Page<E>, AppError> {
        let page = page.normalized();
        let total = self.count::<E>(&query.filters).await?;
        let windowed = ListQuery {
            filters: query.filters.clone(),
            sort: query.sort.clone(),
            limit: Some(page.per_page),
            offset: Some(page.offset()),
        };
        let items = self.list::<E>(&windowed).await?;
        Ok(Page::new(items, page, total))
    }

    /// Apply only the fields present in the patch.
    pub async fn update<C: Changeset>(&self, id: i64, patch: &C) -> Result<C::Entity, AppError> {
        patch.validate()?;
        self.get::<C::Entity>(id).await?;
        self.check_references(patch).await?;
        let values = patch.values();
        self.check_unique::<C::Entity>(&values, Some(id)).await?;

        let q = sql::update::<C::Entity>(id, &values);
        let row = self
            .fetch_written::<C::Entity>(&q)
            .await?
            .ok_or_else(|| not_found::<C::Entity>(id))?;
        tracing::info!(entity = C::Entity::NAME, id, fields = values.len(), "updated");
        Ok(row)
    }

    /// Delete by id. Refused while dependent rows still reference the record.
    pub async fn delete<E: Entity>(&self, id: i64) -> Result<(), AppError> {
        self.get::<E>(id).await?;
        for dep in E::DEPENDENTS {
            let q = sql::count_matching(dep.table, dep.column, BindValue::Int(id), None);
            let remaining = self.fetch_count(&q).await?;
            if remaining > 0 {
                return Err(AppError::Conflict(format!(
                    "{} {} still has {} {}",
                    E::NAME,
                    id,
                    remaining,
                    dep.table
                )));
            }
        }
        let q = sql::delete::<E>();
        let result = sqlx::query(&q.sql)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(AppError::from_db)?;
        if result.rows_affected() == 0 {
            return Err(not_found::<E>(id));
        }
        tracing::info!(entity = E::NAME, id, "deleted");
        Ok(())
    }

    /// Rows whose `column` is in `ids`. Used to batch-load parents for a list of children.
    pub async fn fetch_where_in<E: Entity>(&self, column: &str, ids: &[i64]) -> Result<Vec<E>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = sql::select_by_column_in::<E>(column, ids);
        self.fetch_all::<E>(&q).await
    }

    async fn check_references<C: Changeset>(&self, changes: &C) -> Result<(), AppError> {
        for r in changes.references() {
            let q = sql::count_matching(r.table, "id", BindValue::Int(r.id), None);
            if self.fetch_count(&q).await? == 0 {
                return Err(AppError::NotFound(format!("{} {} not found", r.name, r.id)));
            }
        }
        Ok(())
    }

    async fn check_unique<E: Entity>(
        &self,
        values: &[(&'static str, BindValue)],
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        for (col, val) in values {
            if val.is_null() || !E::UNIQUE.contains(col) {
                continue;
            }
            let q = sql::count_matching(E::TABLE, col, val.clone(), exclude_id);
            if self.fetch_count(&q).await? > 0 {
                return Err(AppError::Conflict(format!(
                    "{} with this {} already exists",
                    E::NAME,
                    col
                )));
            }
        }
        Ok(())
    }

    async fn fetch_optional<E: Entity>(&self, q: &QueryBuf) -> Result<Option<E>, AppError> {
        self.fetch_row::<E>(q).await.map_err(AppError::from_db)
    }

    /// INSERT/UPDATE ... RETURNING. References were checked first, but the parent may
    /// have been deleted since, so a foreign-key failure is reported as not found.
    async fn fetch_written<E: Entity>(&self, q: &QueryBuf) -> Result<Option<E>, AppError> {
        self.fetch_row::<E>(q).await.map_err(AppError::from_write)
    }

    async fn fetch_row<E: Entity>(&self, q: &QueryBuf) -> Result<Option<E>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query.fetch_optional(self.pool()).await
    }

    async fn fetch_all<E: Entity>(&self, q: &QueryBuf) -> Result<Vec<E>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, E>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query.fetch_all(self.pool()).await.map_err(AppError::from_db)
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let n = query.fetch_one(self.pool()).await.map_err(AppError::from_db)?;
        Ok(n.max(0) as u64)
    }
}

fn not_found<E: Entity>(id: i64) -> AppError {
    AppError::NotFound(format!("{} {} not found", E::NAME, id))
}
