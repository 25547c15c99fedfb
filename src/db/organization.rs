//! Offices, departments and positions.

use sqlx::Row;

use super::repository::{bump_revision, ensure_exists, matches_query, Repository};
use crate::errors::AppError;
use crate::models::{
    CreateOfficeRequest, CreatePositionRequest, Department, DepartmentRequest, Office,
    OrganizationFilter, Position, UpdateOfficeRequest, UpdatePositionRequest,
};

const POSITION_SELECT: &str = r#"SELECT p.id, p.title, p.department_id, d.name AS department_name
    FROM positions p LEFT JOIN departments d ON d.id = p.department_id"#;

impl Repository {
    // ==================== DEPARTMENT OPERATIONS ====================

    /// List departments, optionally filtered by name.
    pub async fn list_departments(
        &self,
        filter: &OrganizationFilter,
    ) -> Result<Vec<Department>, AppError> {
        let rows = sqlx::query("SELECT id, name FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(department_from_row)
            .filter(|d| matches_query(filter.q.as_deref(), &[Some(d.name.as_str())]))
            .collect())
    }

    pub async fn get_department(&self, id: &str) -> Result<Option<Department>, AppError> {
        let row = sqlx::query("SELECT id, name FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(department_from_row))
    }

    pub async fn create_department(
        &self,
        request: &DepartmentRequest,
    ) -> Result<Department, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let name = request.name.trim().to_string();

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO departments (id, name) VALUES (?, ?)")
            .bind(&id)
            .bind(&name)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(Department { id, name })
    }

    pub async fn update_department(
        &self,
        id: &str,
        request: &DepartmentRequest,
    ) -> Result<Department, AppError> {
        let name = request.name.trim().to_string();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
            .bind(&name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Department {} not found", id)));
        }
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(Department {
            id: id.to_string(),
            name,
        })
    }

    /// Delete a department; its positions keep existing without one.
    pub async fn delete_department(&self, id: &str) -> Result<(), AppError> {
        self.delete_by_id("departments", "Department", id).await
    }

    // ==================== POSITION OPERATIONS ====================

    /// List positions, optionally filtered by department and title.
    pub async fn list_positions(
        &self,
        filter: &OrganizationFilter,
    ) -> Result<Vec<Position>, AppError> {
        let rows = match filter.department_id.as_deref() {
            Some(department_id) => {
                sqlx::query(&format!(
                    "{} WHERE p.department_id = ? ORDER BY p.title",
                    POSITION_SELECT
                ))
                .bind(department_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!("{} ORDER BY p.title", POSITION_SELECT))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows
            .iter()
            .map(position_from_row)
            .filter(|p| {
                matches_query(
                    filter.q.as_deref(),
                    &[Some(p.title.as_str()), p.department_name.as_deref()],
                )
            })
            .collect())
    }

    pub async fn get_position(&self, id: &str) -> Result<Option<Position>, AppError> {
        let row = sqlx::query(&format!("{} WHERE p.id = ?", POSITION_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(position_from_row))
    }

    pub async fn create_position(
        &self,
        request: &CreatePositionRequest,
    ) -> Result<Position, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let department_id = request
            .department_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut tx = self.pool.begin().await?;
        if let Some(department_id) = department_id {
            ensure_exists(&mut tx, "departments", "Department", department_id).await?;
        }
        sqlx::query("INSERT INTO positions (id, title, department_id) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(request.title.trim())
            .bind(department_id)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        self.get_position(&id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Position {} vanished after insert", id)))
    }

    pub async fn update_position(
        &self,
        id: &str,
        request: &UpdatePositionRequest,
    ) -> Result<Position, AppError> {
        let existing = self
            .get_position(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position {} not found", id)))?;

        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&existing.title)
            .to_string();
        let department_id = if request.clear_department {
            None
        } else {
            request
                .department_id
                .clone()
                .filter(|d| !d.trim().is_empty())
                .or(existing.department_id)
        };

        let mut tx = self.pool.begin().await?;
        if let Some(department_id) = department_id.as_deref() {
            ensure_exists(&mut tx, "departments", "Department", department_id).await?;
        }
        sqlx::query("UPDATE positions SET title = ?, department_id = ? WHERE id = ?")
            .bind(&title)
            .bind(&department_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        self.get_position(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position {} not found", id)))
    }

    /// Delete a position; profiles and arrangement snapshots lose the reference.
    pub async fn delete_position(&self, id: &str) -> Result<(), AppError> {
        self.delete_by_id("positions", "Position", id).await
    }

    // ==================== OFFICE OPERATIONS ====================

    /// List offices, optionally filtered by name or city.
    pub async fn list_offices(&self, filter: &OrganizationFilter) -> Result<Vec<Office>, AppError> {
        let rows = sqlx::query("SELECT id, name, city, address FROM offices ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(office_from_row)
            .filter(|o| {
                matches_query(
                    filter.q.as_deref(),
                    &[Some(o.name.as_str()), Some(o.city.as_str())],
                )
            })
            .collect())
    }

    pub async fn get_office(&self, id: &str) -> Result<Option<Office>, AppError> {
        let row = sqlx::query("SELECT id, name, city, address FROM offices WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(office_from_row))
    }

    pub async fn create_office(&self, request: &CreateOfficeRequest) -> Result<Office, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let office = Office::new(
            id,
            request.name.trim().to_string(),
            request.city.trim().to_string(),
            request.address.trim().to_string(),
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO offices (id, name, city, address) VALUES (?, ?, ?, ?)")
            .bind(&office.id)
            .bind(&office.name)
            .bind(&office.city)
            .bind(&office.address)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(office)
    }

    pub async fn update_office(
        &self,
        id: &str,
        request: &UpdateOfficeRequest,
    ) -> Result<Office, AppError> {
        let existing = self
            .get_office(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Office {} not found", id)))?;

        let pick = |value: &Option<String>, current: String| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(current)
        };
        let office = Office::new(
            id.to_string(),
            pick(&request.name, existing.name),
            pick(&request.city, existing.city),
            request
                .address
                .as_deref()
                .map(|a| a.trim().to_string())
                .unwrap_or(existing.address),
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE offices SET name = ?, city = ?, address = ? WHERE id = ?")
            .bind(&office.name)
            .bind(&office.city)
            .bind(&office.address)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(office)
    }

    /// Delete an office; its employees keep existing without one.
    pub async fn delete_office(&self, id: &str) -> Result<(), AppError> {
        self.delete_by_id("offices", "Office", id).await
    }

    async fn delete_by_id(&self, table: &'static str, label: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", label, id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

fn department_from_row(row: &sqlx::sqlite::SqliteRow) -> Department {
    Department {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn position_from_row(row: &sqlx::sqlite::SqliteRow) -> Position {
    Position::new(
        row.get("id"),
        row.get("title"),
        row.get("department_id"),
        row.get("department_name"),
    )
}

fn office_from_row(row: &sqlx::sqlite::SqliteRow) -> Office {
    Office::new(
        row.get("id"),
        row.get("name"),
        row.get("city"),
        row.get("address"),
    )
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support;
    use super::*;

    #[tokio::test]
    async fn test_position_survives_department_delete() {
        let (repo, _dir) = test_support::repository().await;
        let department = repo
            .create_department(&DepartmentRequest {
                name: "Audit".to_string(),
            })
            .await
            .unwrap();
        let position = repo
            .create_position(&CreatePositionRequest {
                title: "Inspector".to_string(),
                department_id: Some(department.id.clone()),
            })
            .await
            .unwrap();
        assert_eq!(position.display_name, "Inspector (Audit)");

        repo.delete_department(&department.id).await.unwrap();

        let position = repo.get_position(&position.id).await.unwrap().unwrap();
        assert!(position.department_id.is_none());
        assert_eq!(position.display_name, "Inspector");
    }

    #[tokio::test]
    async fn test_position_with_unknown_department_rejected() {
        let (repo, _dir) = test_support::repository().await;
        let err = repo
            .create_position(&CreatePositionRequest {
                title: "Inspector".to_string(),
                department_id: Some("missing".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (repo, _dir) = test_support::repository().await;
        for (name, city) in [("Центральный аппарат", "Бишкек"), ("Ошский филиал", "Ош")] {
            repo.create_office(&CreateOfficeRequest {
                name: name.to_string(),
                city: city.to_string(),
                address: String::new(),
            })
            .await
            .unwrap();
        }

        let all = repo.list_offices(&OrganizationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let filter = OrganizationFilter {
            q: Some("ош".to_string()),
            department_id: None,
        };
        let found = repo.list_offices(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].city, "Ош");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (repo, _dir) = test_support::repository().await;
        let err = repo.delete_office("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
