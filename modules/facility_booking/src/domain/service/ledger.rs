use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{require_staff, Service};
use crate::contract::model::{DayAvailability, DaySlotFilter, Principal, Reservation};
use crate::domain::availability::{admit, day_availability, ensure_capacity, ensure_not_past};
use crate::domain::error::DomainError;
use crate::domain::repo::LedgerInsert;

impl Service {
    /// Reserve `slot` on `date` for the requester.
    ///
    /// Rule order: past date, booking switch, closure, advance window, slot,
    /// duplicate, capacity. The final insert repeats the duplicate and
    /// capacity decisions atomically, so a request that raced past the reads
    /// still cannot over-book or double-book.
    #[instrument(
        name = "facility_booking.service.reserve",
        skip(self),
        fields(user_id = %requester.id, date = %date, slot = %slot)
    )]
    pub async fn reserve(
        &self,
        requester: Principal,
        date: NaiveDate,
        slot: String,
    ) -> Result<Reservation, DomainError> {
        info!("Reserving slot");

        let today = self.today();
        ensure_not_past(date, today)?;

        let settings = self.current_settings().await?;
        let def = admit(&settings, today, date, &slot)?;

        if self.reservations.exists(requester.id, date, &slot).await? {
            return Err(DomainError::slot_duplicate(date, slot));
        }

        let booked = self.reservations.count_by_date_and_slot(date, &slot).await?;
        ensure_capacity(def, date, booked)?;

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id: requester.id,
            date,
            slot,
            created_at: self.clock.now(),
        };
        self.create_reservation(reservation, def.capacity).await
    }

    /// Ledger write. Authoritative for PastDate, SlotDuplicate and SlotFull
    /// regardless of what the caller checked before.
    async fn create_reservation(
        &self,
        reservation: Reservation,
        capacity: u32,
    ) -> Result<Reservation, DomainError> {
        ensure_not_past(reservation.date, self.today())?;

        match self
            .reservations
            .insert_within_capacity(&reservation, capacity)
            .await?
        {
            LedgerInsert::Inserted => {
                info!(reservation_id = %reservation.id, "Reservation created");
                Ok(reservation)
            }
            LedgerInsert::Duplicate => {
                warn!("Concurrent duplicate reservation rejected at insert");
                Err(DomainError::slot_duplicate(reservation.date, reservation.slot))
            }
            LedgerInsert::Full => {
                warn!("Slot filled up before insert");
                Err(DomainError::slot_full(
                    reservation.date,
                    reservation.slot,
                    capacity,
                ))
            }
        }
    }

    #[instrument(
        name = "facility_booking.service.cancel_reservation",
        skip(self),
        fields(user_id = %requester.id, reservation_id = %id)
    )]
    pub async fn cancel_reservation(
        &self,
        requester: Principal,
        id: Uuid,
    ) -> Result<(), DomainError> {
        info!("Cancelling reservation");

        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::reservation_not_found(id))?;

        if reservation.user_id != requester.id && !requester.is_staff() {
            return Err(DomainError::forbidden("cancel another member's reservation"));
        }

        if !self.reservations.delete(id).await? {
            // Deleted by someone else in the meantime.
            return Err(DomainError::reservation_not_found(id));
        }

        info!(date = %reservation.date, slot = %reservation.slot, "Reservation cancelled");
        Ok(())
    }

    #[instrument(
        name = "facility_booking.service.my_reservations",
        skip(self),
        fields(user_id = %requester.id)
    )]
    pub async fn my_reservations(
        &self,
        requester: Principal,
    ) -> Result<Vec<Reservation>, DomainError> {
        let list = self.reservations.list_for_user(requester.id).await?;
        debug!(count = list.len(), "Listed own reservations");
        Ok(list)
    }

    #[instrument(
        name = "facility_booking.service.list_reservations",
        skip(self, filter),
        fields(user_id = %requester.id)
    )]
    pub async fn list_reservations(
        &self,
        requester: Principal,
        filter: DaySlotFilter,
    ) -> Result<Vec<Reservation>, DomainError> {
        require_staff(&requester, "list reservations")?;
        let list = self.reservations.list(&filter).await?;
        debug!(count = list.len(), "Listed reservations");
        Ok(list)
    }

    #[instrument(
        name = "facility_booking.service.availability",
        skip(self),
        fields(date = %date)
    )]
    pub async fn availability(&self, date: NaiveDate) -> Result<DayAvailability, DomainError> {
        debug!("Computing availability");
        let settings = self.current_settings().await?;
        let counts = self.reservations.counts_for_date(date).await?;
        Ok(day_availability(&settings, date, &counts))
    }
}
