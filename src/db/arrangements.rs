//! Daily arrangement rows and their bulk lifecycle operations.
//!
//! Every bulk operation runs in one transaction together with its revision
//! bump, so a failure leaves the day exactly as it was.

use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqliteConnection};

use super::repository::{bump_revision, ensure_exists, Repository};
use crate::errors::AppError;
use crate::models::{
    full_name, month_days, Arrangement, ArrangementField, ArrangementNotes, ArrangementRow,
    BulkResult, DayArrangements, FieldUpdate, FieldValue, ImportOutcome, TEXT_COLUMNS,
};

/// Which profiles get an arrangement row.
///
/// Terminated profiles never do. With an office configured, only profiles
/// of that office (matched by name) are eligible.
#[derive(Debug, Clone, Default)]
pub struct ArrangementScope {
    office: Option<String>,
}

impl ArrangementScope {
    pub fn new(office: Option<String>) -> Self {
        Self { office }
    }

    pub fn office(&self) -> Option<&str> {
        self.office.as_deref()
    }
}

const ROW_SELECT: &str = r#"SELECT a.id, a.profile_id, a.date, a.position_id,
        a.responsible_auditor_id, a.audit_activity, a.audit_purpose, a.order_number,
        a.order_period, a.audit_address, a.leave_status, a.presence_check, a.not_started,
        a.updated_at, p.first_name, p.last_name, p.patronymic, p.is_inspector,
        pos.title AS position_title, r.first_name AS auditor_first_name,
        r.last_name AS auditor_last_name, r.patronymic AS auditor_patronymic
    FROM arrangements a
    JOIN profiles p ON p.id = a.profile_id
    LEFT JOIN positions pos ON pos.id = a.position_id
    LEFT JOIN profiles r ON r.id = a.responsible_auditor_id"#;

impl Repository {
    /// Create the missing rows for `date` and return the whole day.
    pub async fn ensure_day(
        &self,
        scope: &ArrangementScope,
        date: NaiveDate,
    ) -> Result<DayArrangements, AppError> {
        let mut tx = self.pool.begin().await?;
        let created = materialize(&mut tx, scope, date).await?;
        if created > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        if created > 0 {
            tracing::info!(%date, created, "Materialized arrangement rows");
        }

        self.list_day(date).await
    }

    /// All rows stored for `date`, without creating any.
    pub async fn list_day(&self, date: NaiveDate) -> Result<DayArrangements, AppError> {
        let rows = sqlx::query(&format!("{} WHERE a.date = ?", ROW_SELECT))
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(DayArrangements::split(
            date,
            rows.iter().map(arrangement_row_from_row).collect(),
        ))
    }

    /// Get a single arrangement by ID.
    pub async fn get_arrangement(&self, id: &str) -> Result<Option<Arrangement>, AppError> {
        let row = sqlx::query(&format!("{} WHERE a.id = ?", ROW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(arrangement_from_row))
    }

    /// Write one cell of an arrangement row.
    ///
    /// The field name is checked against the closed set before any query
    /// runs, so an unknown name never reaches storage.
    pub async fn update_field(
        &self,
        id: &str,
        field_name: &str,
        raw_value: &serde_json::Value,
    ) -> Result<FieldUpdate, AppError> {
        let field = ArrangementField::parse(field_name)?;
        let value = field.value_from_json(raw_value)?;

        let mut tx = self.pool.begin().await?;
        ensure_exists(&mut tx, "arrangements", "Arrangement", id).await?;

        if let FieldValue::Reference(Some(target)) = &value {
            match field {
                ArrangementField::ResponsibleAuditor => {
                    ensure_exists(&mut tx, "profiles", "Profile", target).await?
                }
                _ => ensure_exists(&mut tx, "positions", "Position", target).await?,
            }
        }

        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "UPDATE arrangements SET {} = ?, updated_at = ? WHERE id = ?",
            field.column()
        );
        let query = sqlx::query(&sql);
        let query = match &value {
            FieldValue::Text(text) => query.bind(text.as_str()),
            FieldValue::Reference(target) => query.bind(target.as_deref()),
        };
        query.bind(&now).bind(id).execute(&mut *tx).await?;

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(FieldUpdate {
            id: id.to_string(),
            field: field.as_str().to_string(),
            value: value.to_json(),
        })
    }

    /// Replace the rows of `target` with copies of the rows of `source`.
    pub async fn import_day(
        &self,
        source: NaiveDate,
        target: NaiveDate,
    ) -> Result<ImportOutcome, AppError> {
        if source == target {
            return Err(AppError::Validation(
                "Source and target dates must differ".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            r#"SELECT profile_id, position_id, responsible_auditor_id, audit_activity,
                      audit_purpose, order_number, order_period, audit_address,
                      leave_status, presence_check, not_started
               FROM arrangements WHERE date = ?"#,
        )
        .bind(source)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Ok(ImportOutcome::NothingToImport);
        }

        let removed = sqlx::query("DELETE FROM arrangements WHERE date = ?")
            .bind(target)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let now = Utc::now().to_rfc3339();
        let insert = format!(
            "INSERT INTO arrangements (id, profile_id, date, position_id, responsible_auditor_id, {}, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            TEXT_COLUMNS.join(", ")
        );
        for row in &rows {
            let notes = notes_from_row(row);
            let mut query = sqlx::query(&insert)
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(row.get::<String, _>("profile_id"))
                .bind(target)
                .bind(row.get::<Option<String>, _>("position_id"))
                .bind(row.get::<Option<String>, _>("responsible_auditor_id"));
            for value in notes.values() {
                query = query.bind(value.to_string());
            }
            query.bind(&now).execute(&mut *tx).await?;
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;

        let count = rows.len() as u64;
        tracing::info!(%source, %target, count, removed, "Imported arrangement day");
        Ok(ImportOutcome::Imported { count })
    }

    /// Create the missing rows for every day of a month.
    pub async fn generate_month(
        &self,
        scope: &ArrangementScope,
        year: i32,
        month: u32,
    ) -> Result<BulkResult, AppError> {
        let days = month_days(year, month)?;

        let mut tx = self.pool.begin().await?;
        let mut created = 0;
        for day in days {
            created += materialize(&mut tx, scope, day).await?;
        }
        if created > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        tracing::info!(year, month, created, "Generated arrangement month");
        Ok(BulkResult { affected: created })
    }

    /// Empty every free-text field of the day, keeping the rows.
    pub async fn clear_day(&self, date: NaiveDate) -> Result<BulkResult, AppError> {
        let assignments: Vec<String> = TEXT_COLUMNS
            .iter()
            .map(|column| format!("{} = ''", column))
            .collect();
        let sql = format!(
            "UPDATE arrangements SET {}, updated_at = ? WHERE date = ?",
            assignments.join(", ")
        );

        let mut tx = self.pool.begin().await?;
        let affected = sqlx::query(&sql)
            .bind(Utc::now().to_rfc3339())
            .bind(date)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        tracing::info!(%date, affected, "Cleared arrangement day");
        Ok(BulkResult { affected })
    }

    /// Remove every row of the day.
    pub async fn delete_day(&self, date: NaiveDate) -> Result<BulkResult, AppError> {
        let mut tx = self.pool.begin().await?;
        let affected = sqlx::query("DELETE FROM arrangements WHERE date = ?")
            .bind(date)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected > 0 {
            bump_revision(&mut tx).await?;
        }
        tx.commit().await?;

        tracing::info!(%date, affected, "Deleted arrangement day");
        Ok(BulkResult { affected })
    }
}

/// Insert a row for every eligible profile that has none on `date`.
///
/// Returns the number of rows actually inserted.
async fn materialize(
    conn: &mut SqliteConnection,
    scope: &ArrangementScope,
    date: NaiveDate,
) -> Result<u64, AppError> {
    let missing = sqlx::query(
        r#"SELECT p.id, p.position_id
           FROM profiles p
           LEFT JOIN offices o ON o.id = p.office_id
           WHERE p.status != 'terminated'
             AND (?1 IS NULL OR o.name = ?1)
             AND NOT EXISTS (
                 SELECT 1 FROM arrangements a WHERE a.profile_id = p.id AND a.date = ?2
             )"#,
    )
    .bind(scope.office())
    .bind(date)
    .fetch_all(&mut *conn)
    .await?;

    let now = Utc::now().to_rfc3339();
    let mut created = 0;
    for row in &missing {
        created += sqlx::query(
            r#"INSERT INTO arrangements (id, profile_id, date, position_id, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(profile_id, date) DO NOTHING"#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(row.get::<String, _>("id"))
        .bind(date)
        .bind(row.get::<Option<String>, _>("position_id"))
        .bind(&now)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(created)
}

fn notes_from_row(row: &sqlx::sqlite::SqliteRow) -> ArrangementNotes {
    ArrangementNotes {
        audit_activity: row.get("audit_activity"),
        audit_purpose: row.get("audit_purpose"),
        order_number: row.get("order_number"),
        order_period: row.get("order_period"),
        audit_address: row.get("audit_address"),
        leave_status: row.get("leave_status"),
        presence_check: row.get("presence_check"),
        not_started: row.get("not_started"),
    }
}

fn arrangement_from_row(row: &sqlx::sqlite::SqliteRow) -> Arrangement {
    Arrangement {
        id: row.get("id"),
        profile_id: row.get("profile_id"),
        date: row.get("date"),
        position_id: row.get("position_id"),
        responsible_auditor_id: row.get("responsible_auditor_id"),
        notes: notes_from_row(row),
        updated_at: row.get("updated_at"),
    }
}

fn arrangement_row_from_row(row: &sqlx::sqlite::SqliteRow) -> ArrangementRow {
    let is_inspector: i32 = row.get("is_inspector");
    let auditor_first: Option<String> = row.get("auditor_first_name");
    let auditor_last: Option<String> = row.get("auditor_last_name");
    let auditor_patronymic: Option<String> = row.get("auditor_patronymic");

    ArrangementRow {
        arrangement: arrangement_from_row(row),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        patronymic: row.get("patronymic"),
        is_inspector: is_inspector != 0,
        position_title: row.get("position_title"),
        responsible_auditor_name: match (auditor_first, auditor_last) {
            (Some(first), Some(last)) => {
                Some(full_name(&first, &last, auditor_patronymic.as_deref()))
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support;
    use super::*;
    use crate::models::{
        CreateOfficeRequest, CreatePositionRequest, CreateProfileRequest, NewProfile, Profile,
        ProfileStatus, UpdateProfileRequest,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    async fn add_profile(
        repo: &Repository,
        pin: &str,
        last_name: &str,
        is_inspector: bool,
        office_id: Option<&str>,
    ) -> Profile {
        let request: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Test",
            "lastName": last_name,
            "pin": pin,
            "isInspector": is_inspector,
            "officeId": office_id,
        }))
        .unwrap();
        repo.create_profile(&NewProfile::from_request(&request).unwrap())
            .await
            .unwrap()
    }

    async fn seeded() -> (Repository, tempfile::TempDir, Vec<Profile>) {
        let (repo, dir) = test_support::repository().await;
        let profiles = vec![
            add_profile(&repo, "10101199900001", "Ryskulova", true, None).await,
            add_profile(&repo, "20202198800002", "Abdyldaev", false, None).await,
            add_profile(&repo, "20303197700003", "Kasymov", true, None).await,
        ];
        (repo, dir, profiles)
    }

    fn all_rows(day: &DayArrangements) -> Vec<&ArrangementRow> {
        day.inspectors.iter().chain(day.apparatus.iter()).collect()
    }

    #[tokio::test]
    async fn test_ensure_day_is_idempotent() {
        let (repo, _dir, _profiles) = seeded().await;
        let scope = ArrangementScope::default();

        let first = repo.ensure_day(&scope, day(1)).await.unwrap();
        let second = repo.ensure_day(&scope, day(1)).await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        let mut first_ids: Vec<_> = all_rows(&first).iter().map(|r| r.arrangement.id.clone()).collect();
        let mut second_ids: Vec<_> = all_rows(&second).iter().map(|r| r.arrangement.id.clone()).collect();
        first_ids.sort();
        second_ids.sort();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_ensure_day_splits_and_orders() {
        let (repo, _dir, _profiles) = seeded().await;
        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();

        let inspectors: Vec<_> = result.inspectors.iter().map(|r| r.last_name.as_str()).collect();
        let apparatus: Vec<_> = result.apparatus.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(inspectors, vec!["Kasymov", "Ryskulova"]);
        assert_eq!(apparatus, vec!["Abdyldaev"]);
    }

    #[tokio::test]
    async fn test_ensure_day_fills_only_missing_rows() {
        let (repo, _dir, _profiles) = seeded().await;
        let scope = ArrangementScope::default();
        repo.ensure_day(&scope, day(1)).await.unwrap();

        let late = add_profile(&repo, "10404199500004", "Usenova", false, None).await;
        let result = repo.ensure_day(&scope, day(1)).await.unwrap();

        assert_eq!(result.len(), 4);
        assert!(all_rows(&result)
            .iter()
            .any(|r| r.arrangement.profile_id == late.id));
    }

    #[tokio::test]
    async fn test_terminated_profiles_are_not_materialized() {
        let (repo, _dir, profiles) = seeded().await;
        repo.update_profile(
            &profiles[0].id,
            &UpdateProfileRequest {
                status: Some(ProfileStatus::Terminated),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_scope_limits_to_office() {
        let (repo, _dir) = test_support::repository().await;
        let central = repo
            .create_office(&CreateOfficeRequest {
                name: "Central".to_string(),
                city: "Bishkek".to_string(),
                address: String::new(),
            })
            .await
            .unwrap();
        add_profile(&repo, "10101199900001", "Ryskulova", true, Some(&central.id)).await;
        add_profile(&repo, "20202198800002", "Abdyldaev", false, None).await;

        let scope = ArrangementScope::new(Some("Central".to_string()));
        let result = repo.ensure_day(&scope, day(1)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.inspectors[0].last_name, "Ryskulova");
    }

    #[tokio::test]
    async fn test_position_is_snapshotted() {
        let (repo, _dir) = test_support::repository().await;
        let clerk = repo
            .create_position(&CreatePositionRequest {
                title: "Clerk".to_string(),
                department_id: None,
            })
            .await
            .unwrap();
        let auditor = repo
            .create_position(&CreatePositionRequest {
                title: "Auditor".to_string(),
                department_id: None,
            })
            .await
            .unwrap();
        let profile = add_profile(&repo, "10101199900001", "Ryskulova", true, None).await;
        repo.update_profile(
            &profile.id,
            &UpdateProfileRequest {
                position_id: Some(clerk.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let scope = ArrangementScope::default();
        repo.ensure_day(&scope, day(1)).await.unwrap();
        repo.update_profile(
            &profile.id,
            &UpdateProfileRequest {
                position_id: Some(auditor.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = repo.ensure_day(&scope, day(1)).await.unwrap();
        assert_eq!(result.inspectors[0].position_title.as_deref(), Some("Clerk"));
    }

    #[tokio::test]
    async fn test_update_field_text_and_reference() {
        let (repo, _dir, profiles) = seeded().await;
        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();
        let row_id = result.apparatus[0].arrangement.id.clone();

        let update = repo
            .update_field(&row_id, "audit_purpose", &serde_json::json!("Annual audit"))
            .await
            .unwrap();
        assert_eq!(update.field, "audit_purpose");
        assert_eq!(update.value, serde_json::json!("Annual audit"));

        repo.update_field(
            &row_id,
            "responsibleAuditor",
            &serde_json::json!(profiles[2].id),
        )
        .await
        .unwrap();

        let result = repo.list_day(day(1)).await.unwrap();
        let row = &result.apparatus[0];
        assert_eq!(row.arrangement.notes.audit_purpose, "Annual audit");
        assert_eq!(
            row.responsible_auditor_name.as_deref(),
            Some("Test Kasymov")
        );

        let cleared = repo
            .update_field(&row_id, "responsible_auditor", &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(cleared.value, serde_json::Value::Null);
        let stored = repo.get_arrangement(&row_id).await.unwrap().unwrap();
        assert!(stored.responsible_auditor_id.is_none());
    }

    #[tokio::test]
    async fn test_update_field_unknown_name_changes_nothing() {
        let (repo, _dir, _profiles) = seeded().await;
        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();
        let row_id = result.apparatus[0].arrangement.id.clone();
        let before = repo.get_revision_id().await.unwrap();

        let err = repo
            .update_field(&row_id, "profile_id", &serde_json::json!("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidField(_)));

        let stored = repo.get_arrangement(&row_id).await.unwrap().unwrap();
        assert_eq!(stored.profile_id, result.apparatus[0].arrangement.profile_id);
        assert_eq!(repo.get_revision_id().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_field_missing_targets() {
        let (repo, _dir, _profiles) = seeded().await;
        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();
        let row_id = result.apparatus[0].arrangement.id.clone();

        let err = repo
            .update_field("no-such-row", "audit_purpose", &serde_json::json!("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = repo
            .update_field(&row_id, "position", &serde_json::json!("no-such-position"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_month_counts() {
        let (repo, _dir, _profiles) = seeded().await;
        let scope = ArrangementScope::default();

        let first = repo.generate_month(&scope, 2024, 2).await.unwrap();
        assert_eq!(first.affected, 29 * 3);

        let second = repo.generate_month(&scope, 2024, 2).await.unwrap();
        assert_eq!(second.affected, 0);

        let leap_day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(repo.list_day(leap_day).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_month_rejects_bad_month() {
        let (repo, _dir, _profiles) = seeded().await;
        let err = repo
            .generate_month(&ArrangementScope::default(), 2024, 13)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_import_from_empty_day_leaves_target() {
        let (repo, _dir, _profiles) = seeded().await;
        repo.ensure_day(&ArrangementScope::default(), day(2))
            .await
            .unwrap();

        let outcome = repo.import_day(day(1), day(2)).await.unwrap();
        assert_eq!(outcome, ImportOutcome::NothingToImport);
        assert_eq!(repo.list_day(day(2)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_import_copies_rows() {
        let (repo, _dir, profiles) = seeded().await;
        let scope = ArrangementScope::default();
        let source = repo.ensure_day(&scope, day(1)).await.unwrap();
        for (i, row) in all_rows(&source).iter().enumerate() {
            repo.update_field(
                &row.arrangement.id,
                "leave_status",
                &serde_json::json!(format!("note {}", i)),
            )
            .await
            .unwrap();
        }
        repo.update_field(
            &source.apparatus[0].arrangement.id,
            "responsible_auditor",
            &serde_json::json!(profiles[0].id),
        )
        .await
        .unwrap();

        // A stale target row for a profile that is about to be replaced.
        repo.ensure_day(&scope, day(5)).await.unwrap();
        let stale = repo.list_day(day(5)).await.unwrap();

        let outcome = repo.import_day(day(1), day(5)).await.unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { count: 3 });

        let source = repo.list_day(day(1)).await.unwrap();
        let target = repo.list_day(day(5)).await.unwrap();
        assert_eq!(target.len(), 3);
        for (s, t) in all_rows(&source).iter().zip(all_rows(&target)) {
            assert_eq!(s.arrangement.profile_id, t.arrangement.profile_id);
            assert_eq!(s.arrangement.notes, t.arrangement.notes);
            assert_eq!(
                s.arrangement.responsible_auditor_id,
                t.arrangement.responsible_auditor_id
            );
            assert_ne!(s.arrangement.id, t.arrangement.id);
        }
        for old in all_rows(&stale) {
            assert!(repo
                .get_arrangement(&old.arrangement.id)
                .await
                .unwrap()
                .is_none());
        }
    }

    #[tokio::test]
    async fn test_import_same_day_rejected() {
        let (repo, _dir, _profiles) = seeded().await;
        let err = repo.import_day(day(1), day(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_clear_day_keeps_rows() {
        let (repo, _dir, profiles) = seeded().await;
        let result = repo
            .ensure_day(&ArrangementScope::default(), day(1))
            .await
            .unwrap();
        let row_id = result.inspectors[0].arrangement.id.clone();
        for column in TEXT_COLUMNS {
            repo.update_field(&row_id, column, &serde_json::json!("filled"))
                .await
                .unwrap();
        }
        repo.update_field(
            &row_id,
            "responsible_auditor",
            &serde_json::json!(profiles[1].id),
        )
        .await
        .unwrap();

        let cleared = repo.clear_day(day(1)).await.unwrap();
        assert_eq!(cleared.affected, 3);

        let result = repo.list_day(day(1)).await.unwrap();
        assert_eq!(result.len(), 3);
        assert!(all_rows(&result)
            .iter()
            .all(|r| r.arrangement.notes.is_empty()));
        let stored = repo.get_arrangement(&row_id).await.unwrap().unwrap();
        assert_eq!(
            stored.responsible_auditor_id.as_deref(),
            Some(profiles[1].id.as_str())
        );
    }

    #[tokio::test]
    async fn test_delete_day_only_touches_that_day() {
        let (repo, _dir, _profiles) = seeded().await;
        let scope = ArrangementScope::default();
        repo.ensure_day(&scope, day(1)).await.unwrap();
        repo.ensure_day(&scope, day(2)).await.unwrap();

        let deleted = repo.delete_day(day(1)).await.unwrap();
        assert_eq!(deleted.affected, 3);
        assert_eq!(repo.list_day(day(1)).await.unwrap().len(), 0);
        assert_eq!(repo.list_day(day(2)).await.unwrap().len(), 3);

        let again = repo.delete_day(day(1)).await.unwrap();
        assert_eq!(again.affected, 0);
        assert_eq!(repo.clear_day(day(1)).await.unwrap().affected, 0);
    }
}
