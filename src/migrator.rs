use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_pickup_points_table::Migration),
            Box::new(m20240101_000002_create_receptions_table::Migration),
            Box::new(m20240101_000003_create_products_table::Migration),
            Box::new(m20240101_000004_create_users_table::Migration),
        ]
    }
}

mod m20240101_000001_create_pickup_points_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_pickup_points_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PickupPoints::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PickupPoints::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PickupPoints::RegistrationDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PickupPoints::City).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pickup_points_registration_date")
                        .table(PickupPoints::Table)
                        .col(PickupPoints::RegistrationDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PickupPoints::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum PickupPoints {
        Table,
        Id,
        RegistrationDate,
        City,
    }
}

mod m20240101_000002_create_receptions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_receptions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Receptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Receptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receptions::PickupPointId).uuid().not_null())
                        .col(
                            ColumnDef::new(Receptions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receptions::Status).string_len(20).not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receptions_pickup_point")
                                .from(Receptions::Table, Receptions::PickupPointId)
                                .to(PickupPoints::Table, PickupPoints::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receptions_pickup_point_created_at")
                        .table(Receptions::Table)
                        .col(Receptions::PickupPointId)
                        .col(Receptions::CreatedAt)
                        .to_owned(),
                )
                .await?;

            // Partial indexes are not expressible through the index builder;
            // Postgres and SQLite both accept this statement as written.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS ux_receptions_open_per_pickup_point \
                     ON receptions (pickup_point_id) WHERE status = 'in_progress'",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Receptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Receptions {
        Table,
        Id,
        PickupPointId,
        CreatedAt,
        Status,
    }

    #[derive(DeriveIden)]
    pub enum PickupPoints {
        Table,
        Id,
    }
}

mod m20240101_000003_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::ReceptionId).uuid().not_null())
                        .col(ColumnDef::new(Products::ProductType).string().not_null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Seq).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_reception")
                                .from(Products::Table, Products::ReceptionId)
                                .to(Receptions::Table, Receptions::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("ux_products_reception_seq")
                        .table(Products::Table)
                        .col(Products::ReceptionId)
                        .col(Products::Seq)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Products {
        Table,
        Id,
        ReceptionId,
        ProductType,
        CreatedAt,
        Seq,
    }

    #[derive(DeriveIden)]
    pub enum Receptions {
        Table,
        Id,
    }
}

mod m20240101_000004_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        Role,
        CreatedAt,
    }
}
