use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{require_staff, Service};
use crate::contract::model::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, DaySlotFilter, IssuedToken, Principal,
    ScanOutcome, SlotCount,
};
use crate::domain::error::DomainError;
use crate::domain::repo::AttendanceInsert;

impl Service {
    /// Sign a fresh 5-minute identity token for the requester. Nothing is stored.
    #[instrument(
        name = "facility_booking.service.issue_token",
        skip(self),
        fields(user_id = %requester.id)
    )]
    pub async fn issue_token(&self, requester: Principal) -> Result<IssuedToken, DomainError> {
        let member = self
            .members
            .find_member(requester.id)
            .await?
            .ok_or_else(|| DomainError::member_not_found(requester.id))?;

        let (token, claims) = self.config.signer.issue(&member, self.clock.now())?;
        info!(token_id = %claims.jti, "Identity token issued");

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        })
    }

    /// Verify a presented token and record attendance against today's reservation.
    ///
    /// Signature and freshness are decided before any lookup. The attendance
    /// insert is the atomic decision point; a record that already exists is
    /// returned as [`ScanOutcome::AlreadyCheckedIn`].
    #[instrument(
        name = "facility_booking.service.scan",
        skip(self, token),
        fields(staff_id = %staff.id)
    )]
    pub async fn scan(&self, staff: Principal, token: &str) -> Result<ScanOutcome, DomainError> {
        require_staff(&staff, "scan identity tokens")?;

        let now = self.clock.now();
        let claims = self.config.signer.verify(token, now).inspect_err(|e| {
            warn!(error = %e, "Identity token rejected");
        })?;

        let today = self.today();
        let mut candidates = self
            .reservations
            .list_for_user_on(claims.sub, today)
            .await?;
        if candidates.is_empty() {
            return Err(DomainError::no_reservation(claims.sub, today));
        }
        // Configured slot order; slots removed since booking go last.
        let settings = self.current_settings().await?;
        candidates.sort_by_key(|r| {
            settings
                .slots
                .iter()
                .position(|s| s.name == r.slot)
                .unwrap_or(usize::MAX)
        });

        let mut first_existing: Option<AttendanceRecord> = None;
        for reservation in candidates {
            if let Some(existing) = self
                .attendance
                .find_for_reservation(claims.sub, reservation.id)
                .await?
            {
                first_existing.get_or_insert(existing);
                continue;
            }

            let record = AttendanceRecord {
                id: Uuid::new_v4(),
                user_id: claims.sub,
                reservation_id: reservation.id,
                date: reservation.date,
                slot: reservation.slot,
                check_in_time: now,
                scanned_by: staff.id,
                status: AttendanceStatus::Present,
                notes: None,
            };
            match self.attendance.insert_if_absent(&record).await? {
                AttendanceInsert::Inserted(rec) => {
                    info!(
                        user_id = %rec.user_id,
                        slot = %rec.slot,
                        attendance_id = %rec.id,
                        "Check-in recorded"
                    );
                    return Ok(ScanOutcome::Recorded(rec));
                }
                AttendanceInsert::Existing(rec) => {
                    debug!("Concurrent scan recorded this reservation first");
                    first_existing.get_or_insert(rec);
                }
            }
        }

        match first_existing {
            Some(rec) => {
                info!(user_id = %rec.user_id, "Member already checked in");
                Ok(ScanOutcome::AlreadyCheckedIn(rec))
            }
            None => Err(DomainError::no_reservation(claims.sub, today)),
        }
    }

    #[instrument(
        name = "facility_booking.service.list_attendance",
        skip(self, filter),
        fields(user_id = %requester.id)
    )]
    pub async fn list_attendance(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        require_staff(&requester, "list attendance")?;
        let list = self.attendance.list(&filter).await?;
        debug!(count = list.len(), "Listed attendance");
        Ok(list)
    }

    #[instrument(
        name = "facility_booking.service.my_attendance",
        skip(self),
        fields(user_id = %requester.id)
    )]
    pub async fn my_attendance(
        &self,
        requester: Principal,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let list = self.attendance.list_for_user(requester.id).await?;
        debug!(count = list.len(), "Listed own attendance");
        Ok(list)
    }

    #[instrument(
        name = "facility_booking.service.statistics",
        skip(self),
        fields(user_id = %requester.id)
    )]
    pub async fn statistics(&self, requester: Principal) -> Result<AttendanceStats, DomainError> {
        require_staff(&requester, "view statistics")?;

        let today = self.today();
        let total_attendances = self.attendance.count_all().await?;
        let day_attendances = self.attendance.count_on(today).await?;

        let mut reservations_by_slot: Vec<SlotCount> = self
            .reservations
            .counts_for_date(today)
            .await?
            .into_iter()
            .map(|(slot, count)| SlotCount { slot, count })
            .collect();
        reservations_by_slot.sort_by(|a, b| a.slot.cmp(&b.slot));
        let day_reservations = reservations_by_slot.iter().map(|s| s.count).sum();

        Ok(AttendanceStats {
            date: today,
            total_attendances,
            day_attendances,
            day_reservations,
            attendance_rate: attendance_rate(day_attendances, day_reservations),
            reservations_by_slot,
        })
    }
}

/// Percentage with one decimal; zero when nothing was booked.
fn attendance_rate(attended: u64, booked: u64) -> f64 {
    if booked == 0 {
        return 0.0;
    }
    let pct = attended as f64 / booked as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}
