//! SeaORM-backed implementations of the storage ports.
//!
//! Generic over `C: ConnectionTrait + TransactionTrait`, so the repository can
//! sit on a `DatabaseConnection` or be nested inside an outer transaction.
//! Multi-statement mutations always run in their own transaction and issue
//! every statement through it.
//!
//! The uniqueness-sensitive writes never rely on a prior read:
//! - lazy defaults: `INSERT .. ON CONFLICT (id) DO NOTHING`;
//! - booking toggle: `UPDATE .. SET booking_enabled = NOT booking_enabled`;
//! - reservations: a conditional `INSERT .. SELECT .. WHERE count < capacity`
//!   backed by the `(user_id, date, slot)` unique index;
//! - closures and attendance: plain inserts backed by their unique keys.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, Statement, TransactionTrait, Value,
};
use uuid::Uuid;

use crate::contract::model::{
    AttendanceRecord, ClosedDate, DaySlotFilter, FacilitySettings, Reservation, SettingsPatch,
    SlotDefinition,
};
use crate::domain::repo::{
    AttendanceInsert, AttendanceRepository, LedgerInsert, ReservationRepository,
    SettingsRepository,
};
use crate::infra::storage::entity::settings::SINGLETON_ID;
use crate::infra::storage::entity::{attendance, closed_date, reservation, settings, slot};
use crate::infra::storage::mapper::{
    attendance_to_active, closed_to_active, settings_to_active, settings_to_contract,
    slot_to_active,
};

/// SeaORM repository impl for all three facility ports.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmFacilityRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmFacilityRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

async fn load_settings<C: ConnectionTrait>(conn: &C) -> anyhow::Result<Option<FacilitySettings>> {
    let Some(row) = settings::Entity::find_by_id(SINGLETON_ID)
        .one(conn)
        .await
        .context("load settings row failed")?
    else {
        return Ok(None);
    };
    let slots = slot::Entity::find()
        .order_by_asc(slot::Column::Position)
        .all(conn)
        .await
        .context("load slots failed")?;
    let closed = closed_date::Entity::find()
        .order_by_asc(closed_date::Column::Date)
        .all(conn)
        .await
        .context("load closed dates failed")?;
    Ok(Some(settings_to_contract(row, slots, closed)))
}

async fn replace_slots<C: ConnectionTrait>(
    conn: &C,
    slots: &[SlotDefinition],
) -> anyhow::Result<()> {
    slot::Entity::delete_many()
        .exec(conn)
        .await
        .context("clear slots failed")?;
    if !slots.is_empty() {
        slot::Entity::insert_many(slots.iter().enumerate().map(|(i, s)| slot_to_active(i, s)))
            .exec_without_returning(conn)
            .await
            .context("insert slots failed")?;
    }
    Ok(())
}

async fn replace_closed_dates<C: ConnectionTrait>(
    conn: &C,
    closed: &[ClosedDate],
) -> anyhow::Result<()> {
    closed_date::Entity::delete_many()
        .exec(conn)
        .await
        .context("clear closed dates failed")?;
    if !closed.is_empty() {
        closed_date::Entity::insert_many(closed.iter().map(closed_to_active))
            .exec_without_returning(conn)
            .await
            .context("insert closed dates failed")?;
    }
    Ok(())
}

async fn stamp<C: ConnectionTrait>(conn: &C, by: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
    settings::Entity::update_many()
        .col_expr(settings::Column::LastUpdated, Expr::value(at))
        .col_expr(settings::Column::UpdatedBy, Expr::value(Some(by)))
        .filter(settings::Column::Id.eq(SINGLETON_ID))
        .exec(conn)
        .await
        .context("stamp settings failed")?;
    Ok(())
}

#[async_trait]
impl<C> SettingsRepository for SeaOrmFacilityRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn load_or_init(&self, defaults: &FacilitySettings) -> anyhow::Result<FacilitySettings> {
        // Plain read first; the write transaction is only for the first call.
        if let Some(existing) = load_settings(&self.conn).await? {
            return Ok(existing);
        }

        let txn = self.conn.begin().await.context("begin failed")?;

        let inserted = settings::Entity::insert(settings_to_active(defaults))
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("insert default settings failed")?;

        // Only the writer that created the row seeds the child tables.
        if inserted > 0 {
            replace_slots(&txn, &defaults.slots).await?;
            replace_closed_dates(&txn, &defaults.closed_dates).await?;
        }

        let loaded = load_settings(&txn)
            .await?
            .context("settings row missing after init")?;
        txn.commit().await.context("commit failed")?;
        Ok(loaded)
    }

    async fn apply_patch(
        &self,
        patch: &SettingsPatch,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<FacilitySettings> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let mut update = settings::Entity::update_many()
            .col_expr(settings::Column::LastUpdated, Expr::value(at))
            .col_expr(settings::Column::UpdatedBy, Expr::value(Some(by)));
        if let Some(enabled) = patch.booking_enabled {
            update = update.col_expr(settings::Column::BookingEnabled, Expr::value(enabled));
        }
        if let Some(days) = patch.max_advance_booking_days {
            update = update.col_expr(
                settings::Column::MaxAdvanceBookingDays,
                Expr::value(clamp_i32(days)),
            );
        }
        update
            .filter(settings::Column::Id.eq(SINGLETON_ID))
            .exec(&txn)
            .await
            .context("update settings failed")?;

        if let Some(slots) = &patch.slots {
            replace_slots(&txn, slots).await?;
        }
        if let Some(closed) = &patch.closed_dates {
            replace_closed_dates(&txn, closed).await?;
        }

        let loaded = load_settings(&txn)
            .await?
            .context("settings row missing after update")?;
        txn.commit().await.context("commit failed")?;
        Ok(loaded)
    }

    async fn toggle_booking(&self, by: Uuid, at: DateTime<Utc>) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin failed")?;

        settings::Entity::update_many()
            .col_expr(
                settings::Column::BookingEnabled,
                Expr::col(settings::Column::BookingEnabled).not(),
            )
            .col_expr(settings::Column::LastUpdated, Expr::value(at))
            .col_expr(settings::Column::UpdatedBy, Expr::value(Some(by)))
            .filter(settings::Column::Id.eq(SINGLETON_ID))
            .exec(&txn)
            .await
            .context("toggle booking failed")?;

        let row = settings::Entity::find_by_id(SINGLETON_ID)
            .one(&txn)
            .await
            .context("read back booking flag failed")?
            .context("settings row missing")?;
        txn.commit().await.context("commit failed")?;
        Ok(row.booking_enabled)
    }

    async fn add_closed_date(
        &self,
        closed: &ClosedDate,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin failed")?;

        match closed_date::Entity::insert(closed_to_active(closed))
            .exec_without_returning(&txn)
            .await
        {
            Ok(_) => {}
            // Dropping the transaction rolls it back.
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) => return Err(e).context("insert closed date failed"),
        }

        stamp(&txn, by, at).await?;
        txn.commit().await.context("commit failed")?;
        Ok(true)
    }

    async fn remove_closed_date(
        &self,
        date: NaiveDate,
        by: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let res = closed_date::Entity::delete_by_id(date)
            .exec(&txn)
            .await
            .context("delete closed date failed")?;
        let removed = res.rows_affected > 0;
        if removed {
            stamp(&txn, by, at).await?;
        }

        txn.commit().await.context("commit failed")?;
        Ok(removed)
    }
}

/// Compare-and-insert: the row is written only while the slot has room.
fn conditional_insert(backend: DbBackend, r: &Reservation, capacity: u32) -> Statement {
    let sql = match backend {
        DbBackend::Postgres => {
            "INSERT INTO reservations (id, user_id, date, slot, created_at) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE (SELECT COUNT(*) FROM reservations WHERE date = $6 AND slot = $7) < $8"
        }
        _ => {
            "INSERT INTO reservations (id, user_id, date, slot, created_at) \
             SELECT ?, ?, ?, ?, ? \
             WHERE (SELECT COUNT(*) FROM reservations WHERE date = ? AND slot = ?) < ?"
        }
    };
    let values: Vec<Value> = vec![
        r.id.into(),
        r.user_id.into(),
        r.date.into(),
        r.slot.clone().into(),
        r.created_at.into(),
        r.date.into(),
        r.slot.clone().into(),
        i64::from(capacity).into(),
    ];
    Statement::from_sql_and_values(backend, sql, values)
}

#[derive(Debug, FromQueryResult)]
struct SlotCountRow {
    slot: String,
    n: i64,
}

#[async_trait]
impl<C> ReservationRepository for SeaOrmFacilityRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_within_capacity(
        &self,
        r: &Reservation,
        capacity: u32,
    ) -> anyhow::Result<LedgerInsert> {
        let stmt = conditional_insert(self.conn.get_database_backend(), r, capacity);
        let res = match self.conn.execute(stmt).await {
            Ok(res) => res,
            Err(e) if is_unique_violation(&e) => return Ok(LedgerInsert::Duplicate),
            Err(e) => return Err(e).context("conditional reservation insert failed"),
        };
        if res.rows_affected() > 0 {
            return Ok(LedgerInsert::Inserted);
        }
        // The ceiling also hides duplicates of a full slot; tell them apart.
        if self.exists(r.user_id, r.date, &r.slot).await? {
            Ok(LedgerInsert::Duplicate)
        } else {
            Ok(LedgerInsert::Full)
        }
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        let found = reservation::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find reservation failed")?;
        Ok(found.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = reservation::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete reservation failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn exists(&self, user_id: Uuid, date: NaiveDate, slot: &str) -> anyhow::Result<bool> {
        let count = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Date.eq(date))
            .filter(reservation::Column::Slot.eq(slot))
            .count(&self.conn)
            .await
            .context("reservation exists failed")?;
        Ok(count > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_asc(reservation::Column::Date)
            .order_by_asc(reservation::Column::Slot)
            .all(&self.conn)
            .await
            .context("list reservations for user failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_user_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Date.eq(date))
            .order_by_asc(reservation::Column::Slot)
            .all(&self.conn)
            .await
            .context("list reservations for user and day failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(&self, filter: &DaySlotFilter) -> anyhow::Result<Vec<Reservation>> {
        let mut query = reservation::Entity::find();
        if let Some(date) = filter.date {
            query = query.filter(reservation::Column::Date.eq(date));
        }
        if let Some(slot) = &filter.slot {
            query = query.filter(reservation::Column::Slot.eq(slot.as_str()));
        }
        let rows = query
            .order_by_asc(reservation::Column::Date)
            .order_by_asc(reservation::Column::Slot)
            .all(&self.conn)
            .await
            .context("list reservations failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_date_and_slot(&self, date: NaiveDate, slot: &str) -> anyhow::Result<u64> {
        reservation::Entity::find()
            .filter(reservation::Column::Date.eq(date))
            .filter(reservation::Column::Slot.eq(slot))
            .count(&self.conn)
            .await
            .context("count reservations failed")
    }

    async fn counts_for_date(&self, date: NaiveDate) -> anyhow::Result<HashMap<String, u64>> {
        let rows = reservation::Entity::find()
            .select_only()
            .column(reservation::Column::Slot)
            .column_as(reservation::Column::Id.count(), "n")
            .filter(reservation::Column::Date.eq(date))
            .group_by(reservation::Column::Slot)
            .into_model::<SlotCountRow>()
            .all(&self.conn)
            .await
            .context("count reservations per slot failed")?;
        Ok(rows
            .into_iter()
            .map(|r| (r.slot, u64::try_from(r.n).unwrap_or(0)))
            .collect())
    }
}

#[async_trait]
impl<C> AttendanceRepository for SeaOrmFacilityRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_if_absent(&self, rec: &AttendanceRecord) -> anyhow::Result<AttendanceInsert> {
        match attendance::Entity::insert(attendance_to_active(rec))
            .exec_without_returning(&self.conn)
            .await
        {
            Ok(_) => Ok(AttendanceInsert::Inserted(rec.clone())),
            Err(e) if is_unique_violation(&e) => {
                let existing = self
                    .find_for_reservation(rec.user_id, rec.reservation_id)
                    .await?
                    .context("unique violation but no existing attendance record")?;
                Ok(AttendanceInsert::Existing(existing))
            }
            Err(e) => Err(e).context("insert attendance failed"),
        }
    }

    async fn find_for_reservation(
        &self,
        user_id: Uuid,
        reservation_id: Uuid,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::ReservationId.eq(reservation_id))
            .one(&self.conn)
            .await
            .context("find attendance failed")?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn list(&self, filter: &DaySlotFilter) -> anyhow::Result<Vec<AttendanceRecord>> {
        let mut query = attendance::Entity::find();
        if let Some(date) = filter.date {
            query = query.filter(attendance::Column::Date.eq(date));
        }
        if let Some(slot) = &filter.slot {
            query = query.filter(attendance::Column::Slot.eq(slot.as_str()));
        }
        query
            .order_by_desc(attendance::Column::CheckInTime)
            .all(&self.conn)
            .await
            .context("list attendance failed")?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<AttendanceRecord>> {
        attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .order_by_desc(attendance::Column::CheckInTime)
            .all(&self.conn)
            .await
            .context("list attendance for user failed")?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }

    async fn count_all(&self) -> anyhow::Result<u64> {
        attendance::Entity::find()
            .count(&self.conn)
            .await
            .context("count attendance failed")
    }

    async fn count_on(&self, date: NaiveDate) -> anyhow::Result<u64> {
        attendance::Entity::find()
            .filter(attendance::Column::Date.eq(date))
            .count(&self.conn)
            .await
            .context("count attendance for day failed")
    }
}
