//! Migration: users, their profile and employee records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null().default(""))
                    .col(ColumnDef::new(Users::LastName).string().not_null().default(""))
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::UserId).uuid().not_null().unique_key())
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .string_len(20)
                            .not_null()
                            .default("client"),
                    )
                    .col(ColumnDef::new(Profiles::Phone).string_len(20).null())
                    .col(
                        ColumnDef::new(Profiles::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmployeeInfos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployeeInfos::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmployeeInfos::ProfileId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EmployeeInfos::Position).string_len(20).not_null())
                    .col(ColumnDef::new(EmployeeInfos::Contract).string_len(20).not_null())
                    .col(ColumnDef::new(EmployeeInfos::HireDate).date().not_null())
                    .col(
                        ColumnDef::new(EmployeeInfos::HourlyWageCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmployeeInfos::WeeklyHours).double().not_null())
                    .col(ColumnDef::new(EmployeeInfos::Schedule).text().not_null())
                    .col(
                        ColumnDef::new(EmployeeInfos::SocialSecurityNumber)
                            .string_len(15)
                            .null(),
                    )
                    .col(ColumnDef::new(EmployeeInfos::EmergencyPhone).string_len(20).null())
                    .col(ColumnDef::new(EmployeeInfos::EmergencyContact).string().null())
                    .col(
                        ColumnDef::new(EmployeeInfos::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_infos_profile")
                            .from(EmployeeInfos::Table, EmployeeInfos::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmployeeInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    UserId,
    Role,
    Phone,
    Points,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmployeeInfos {
    Table,
    Id,
    ProfileId,
    Position,
    Contract,
    HireDate,
    HourlyWageCents,
    WeeklyHours,
    Schedule,
    SocialSecurityNumber,
    EmergencyPhone,
    EmergencyContact,
    Active,
}
