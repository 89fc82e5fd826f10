use chrono::Utc;
use model::{
    location::Location,
    report::{NewReport, Report},
    WithId,
};
use road_reports::database::Result;
use sqlx::{Executor, Sqlite};
use utility::id::Id;

use crate::data_model::{report::ReportRow, with_id, with_ids};

use super::convert_error;

pub async fn insert<'c, E>(executor: E, report: NewReport) -> Result<WithId<Report>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO reports(
            type,
            details,
            latitude,
            longitude,
            created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, type, details, latitude, longitude, created_at;
        ",
    )
    .bind(report.kind.as_str())
    .bind(report.details)
    .bind(report.location.latitude())
    .bind(report.location.longitude())
    .bind(Utc::now())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: ReportRow| with_id(row))
}

pub async fn get<'c, E>(executor: E, id: Id<Report>) -> Result<WithId<Report>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, type, details, latitude, longitude, created_at
        FROM
            reports
        WHERE id = ?1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: ReportRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Report>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, type, details, latitude, longitude, created_at
        FROM
            reports
        ORDER BY id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .and_then(|rows: Vec<ReportRow>| with_ids(rows))
}

/// Plain bounding box, no index: every row is compared against the center.
/// Deltas are rounded like `utility::geo::degree_delta`.
pub async fn get_nearby<'c, E>(
    executor: E,
    center: &Location,
    half_width: f64,
) -> Result<Vec<WithId<Report>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, type, details, latitude, longitude, created_at
        FROM
            reports
        WHERE
            ROUND(ABS(latitude - ?1), 9) < ?3
            AND ROUND(ABS(longitude - ?2), 9) < ?3;
        ",
    )
    .bind(center.latitude())
    .bind(center.longitude())
    .bind(half_width)
    .fetch_all(executor)
    .await
    .map_err(convert_error)
    .and_then(|rows: Vec<ReportRow>| with_ids(rows))
}
