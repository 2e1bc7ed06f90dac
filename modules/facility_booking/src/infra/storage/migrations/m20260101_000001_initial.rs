use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FacilitySettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FacilitySettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FacilitySettings::BookingEnabled)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FacilitySettings::MaxAdvanceBookingDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FacilitySettings::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FacilitySettings::UpdatedBy).uuid().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FacilitySlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FacilitySlots::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FacilitySlots::Position).integer().not_null())
                    .col(ColumnDef::new(FacilitySlots::StartTime).string().not_null())
                    .col(ColumnDef::new(FacilitySlots::EndTime).string().not_null())
                    .col(ColumnDef::new(FacilitySlots::Capacity).integer().not_null())
                    .col(ColumnDef::new(FacilitySlots::Enabled).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClosedDates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClosedDates::Date)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClosedDates::Reason).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::Date).date().not_null())
                    .col(ColumnDef::new(Reservations::Slot).string().not_null())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One member, one slot, one day.
        manager
            .create_index(
                Index::create()
                    .name("ux_reservations_user_date_slot")
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .col(Reservations::Date)
                    .col(Reservations::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_date_slot")
                    .table(Reservations::Table)
                    .col(Reservations::Date)
                    .col(Reservations::Slot)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AttendanceRecords::ReservationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Date).date().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Slot).string().not_null())
                    .col(
                        ColumnDef::new(AttendanceRecords::CheckInTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::ScannedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Status).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Notes).text().null())
                    .to_owned(),
            )
            .await?;

        // One check-in per reservation.
        manager
            .create_index(
                Index::create()
                    .name("ux_attendance_user_reservation")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::UserId)
                    .col(AttendanceRecords::ReservationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClosedDates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FacilitySlots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FacilitySettings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FacilitySettings {
    Table,
    Id,
    BookingEnabled,
    MaxAdvanceBookingDays,
    LastUpdated,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum FacilitySlots {
    Table,
    Name,
    Position,
    StartTime,
    EndTime,
    Capacity,
    Enabled,
}

#[derive(DeriveIden)]
enum ClosedDates {
    Table,
    Date,
    Reason,
}

#[derive(DeriveIden)]
enum Reservations {
    Table,
    Id,
    UserId,
    Date,
    Slot,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    Table,
    Id,
    UserId,
    ReservationId,
    Date,
    Slot,
    CheckInTime,
    ScannedBy,
    Status,
    Notes,
}
