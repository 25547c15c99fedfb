//! Employee profiles.

use chrono::Utc;
use sqlx::Row;

use super::repository::{bump_revision, ensure_exists, matches_query, Repository};
use crate::errors::AppError;
use crate::export::DirectoryEntry;
use crate::models::{
    Gender, NewProfile, Profile, ProfileFilter, ProfileStatus, UpdateProfileRequest,
};
use crate::pin;

const PROFILE_SELECT: &str = r#"SELECT p.id, p.first_name, p.last_name, p.patronymic, p.pin,
        p.birth_date, p.gender, p.position_id, pos.title AS position_title,
        p.office_id, o.name AS office_name, p.email, p.phone_number_work,
        p.phone_number_mobile, p.phone_number_government, p.office_number,
        p.photo_path, p.bio, p.status, p.is_inspector, p.created_at, p.updated_at,
        p.version
    FROM profiles p
    LEFT JOIN positions pos ON pos.id = p.position_id
    LEFT JOIN offices o ON o.id = p.office_id"#;

impl Repository {
    /// List profiles ordered by last name, applying the optional filters.
    pub async fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, AppError> {
        let sql = format!(
            r#"{}
            WHERE (?1 IS NULL OR p.gender = ?1)
              AND (?2 IS NULL OR p.position_id = ?2)
              AND (?3 IS NULL OR p.office_id = ?3)
              AND (?4 IS NULL OR p.status = ?4)
            ORDER BY p.last_name, p.first_name"#,
            PROFILE_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(filter.gender.map(|g| g.as_str()))
            .bind(filter.position_id.as_deref())
            .bind(filter.office_id.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(profile_from_row)
            .filter(|p| {
                matches_query(
                    filter.q.as_deref(),
                    &[
                        Some(p.first_name.as_str()),
                        Some(p.last_name.as_str()),
                        Some(p.pin.as_str()),
                    ],
                )
            })
            .collect())
    }

    /// Get a profile by ID.
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query(&format!("{} WHERE p.id = ?", PROFILE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Insert a validated profile.
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        if let Some(position_id) = profile.position_id.as_deref() {
            ensure_exists(&mut tx, "positions", "Position", position_id).await?;
        }
        if let Some(office_id) = profile.office_id.as_deref() {
            ensure_exists(&mut tx, "offices", "Office", office_id).await?;
        }

        sqlx::query(
            r#"INSERT INTO profiles (
                id, first_name, last_name, patronymic, pin, birth_date, gender,
                position_id, office_id, email, phone_number_work, phone_number_mobile,
                phone_number_government, office_number, photo_path, bio, status,
                is_inspector, created_at, updated_at, version
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"#,
        )
        .bind(&id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.patronymic)
        .bind(&profile.pin)
        .bind(profile.birth_date)
        .bind(profile.gender.as_str())
        .bind(&profile.position_id)
        .bind(&profile.office_id)
        .bind(&profile.email)
        .bind(&profile.phone_number_work)
        .bind(&profile.phone_number_mobile)
        .bind(&profile.phone_number_government)
        .bind(&profile.office_number)
        .bind(&profile.photo_path)
        .bind(&profile.bio)
        .bind(profile.status.as_str())
        .bind(profile.is_inspector as i32)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(e, format!("PIN {} is already registered", profile.pin))
        })?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        tracing::info!(profile_id = %id, "Created profile");

        self.get_profile(&id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile {} vanished after insert", id)))
    }

    /// Update a profile with optimistic concurrency control.
    pub async fn update_profile(
        &self,
        id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<Profile, AppError> {
        let existing = self
            .get_profile(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))?;

        // Check version for optimistic concurrency
        if let Some(expected) = request.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let now = Utc::now().to_rfc3339();
        let new_version = existing.version + 1;

        let first_name = merge_required(&request.first_name, &existing.first_name);
        let last_name = merge_required(&request.last_name, &existing.last_name);
        let pin_value = merge_required(&request.pin, &existing.pin);
        pin::validate_length(&pin_value)?;

        // Derived fields are filled from the PIN only while still absent.
        let birth_date = match request.birth_date.or(existing.birth_date) {
            Some(date) => date,
            None => pin::birth_date(&pin_value)?,
        };
        let gender = match request.gender.or(existing.gender) {
            Some(gender) => gender,
            None => pin::gender(&pin_value)?,
        };

        let position_id = if request.clear_position {
            None
        } else {
            request.position_id.clone().or(existing.position_id.clone())
        };
        let office_id = if request.clear_office {
            None
        } else {
            request.office_id.clone().or(existing.office_id.clone())
        };

        let patronymic = request.patronymic.clone().or(existing.patronymic.clone());
        let email = request.email.clone().or(existing.email.clone());
        let phone_number_work = request
            .phone_number_work
            .clone()
            .or(existing.phone_number_work.clone());
        let phone_number_mobile = request
            .phone_number_mobile
            .clone()
            .or(existing.phone_number_mobile.clone());
        let phone_number_government = request
            .phone_number_government
            .clone()
            .or(existing.phone_number_government.clone());
        let office_number = request
            .office_number
            .clone()
            .or(existing.office_number.clone());
        let photo_path = request.photo_path.clone().or(existing.photo_path.clone());
        let bio = request.bio.clone().or(existing.bio.clone());
        let status = request.status.unwrap_or(existing.status);
        let is_inspector = request.is_inspector.unwrap_or(existing.is_inspector);

        let mut tx = self.pool.begin().await?;
        if let Some(position_id) = position_id.as_deref() {
            ensure_exists(&mut tx, "positions", "Position", position_id).await?;
        }
        if let Some(office_id) = office_id.as_deref() {
            ensure_exists(&mut tx, "offices", "Office", office_id).await?;
        }

        // Use conditional UPDATE with version check to prevent race conditions
        let result = sqlx::query(
            r#"UPDATE profiles SET
                first_name = ?, last_name = ?, patronymic = ?, pin = ?, birth_date = ?,
                gender = ?, position_id = ?, office_id = ?, email = ?, phone_number_work = ?,
                phone_number_mobile = ?, phone_number_government = ?, office_number = ?,
                photo_path = ?, bio = ?, status = ?, is_inspector = ?, updated_at = ?,
                version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&patronymic)
        .bind(&pin_value)
        .bind(birth_date)
        .bind(gender.as_str())
        .bind(&position_id)
        .bind(&office_id)
        .bind(&email)
        .bind(&phone_number_work)
        .bind(&phone_number_mobile)
        .bind(&phone_number_government)
        .bind(&office_number)
        .bind(&photo_path)
        .bind(&bio)
        .bind(status.as_str())
        .bind(is_inspector as i32)
        .bind(&now)
        .bind(new_version)
        .bind(id)
        .bind(existing.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(e, format!("PIN {} is already registered", pin_value))
        })?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: existing.version,
            });
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        self.get_profile(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))
    }

    /// Non-terminated profiles that have an office, with the joins the
    /// phone directory needs.
    pub async fn list_directory_entries(&self) -> Result<Vec<DirectoryEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT p.first_name, p.last_name, p.patronymic, p.phone_number_work,
                      p.phone_number_government, p.phone_number_mobile, p.office_number,
                      pos.title AS position_title, d.name AS department_name,
                      o.id AS office_id, o.name AS office_name, o.city AS office_city,
                      o.address AS office_address
               FROM profiles p
               JOIN offices o ON o.id = p.office_id
               LEFT JOIN positions pos ON pos.id = p.position_id
               LEFT JOIN departments d ON d.id = pos.department_id
               WHERE p.status != 'terminated'
               ORDER BY o.name, o.id, d.name, p.last_name, p.first_name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DirectoryEntry {
                office_id: row.get("office_id"),
                office_name: row.get("office_name"),
                office_city: row.get("office_city"),
                office_address: row.get("office_address"),
                department_name: row.get("department_name"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                patronymic: row.get("patronymic"),
                position_title: row.get("position_title"),
                phone_work: row.get("phone_number_work"),
                phone_government: row.get("phone_number_government"),
                phone_mobile: row.get("phone_number_mobile"),
                office_number: row.get("office_number"),
            })
            .collect())
    }
}

fn merge_required(value: &Option<String>, current: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(current)
        .to_string()
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
    let gender: Option<String> = row.get("gender");
    let status: String = row.get("status");
    let is_inspector: i32 = row.get("is_inspector");
    Profile {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        patronymic: row.get("patronymic"),
        pin: row.get("pin"),
        birth_date: row.get("birth_date"),
        gender: gender.as_deref().and_then(Gender::from_str),
        position_id: row.get("position_id"),
        position_title: row.get("position_title"),
        office_id: row.get("office_id"),
        office_name: row.get("office_name"),
        email: row.get("email"),
        phone_number_work: row.get("phone_number_work"),
        phone_number_mobile: row.get("phone_number_mobile"),
        phone_number_government: row.get("phone_number_government"),
        office_number: row.get("office_number"),
        photo_path: row.get("photo_path"),
        bio: row.get("bio"),
        status: ProfileStatus::from_str(&status).unwrap_or_default(),
        is_inspector: is_inspector != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}
