// The MigrationTrait signatures elide SchemaManager's lifetime; spelling
// it out trips E0195 under async-trait.
#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_modeles_table::Migration),
            Box::new(m20250101_000002_create_couleurs_table::Migration),
            Box::new(m20250101_000003_create_elements_superposables_table::Migration),
            Box::new(m20250101_000004_create_motifs_table::Migration),
            Box::new(m20250101_000005_create_variantes_table::Migration),
            Box::new(m20250101_000006_create_associations_table::Migration),
        ]
    }
}

mod m20250101_000001_create_modeles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_modeles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Modeles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Modeles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Modeles::Nom).string().not_null())
                        .col(ColumnDef::new(Modeles::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Modeles::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Modeles {
        Table,
        Id,
        Nom,
        CreatedAt,
    }
}

mod m20250101_000002_create_couleurs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_couleurs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Couleurs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Couleurs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Couleurs::ModeleId).uuid().not_null())
                        .col(ColumnDef::new(Couleurs::Nom).string().not_null())
                        .col(ColumnDef::new(Couleurs::CodeHex).string().null())
                        .col(ColumnDef::new(Couleurs::ImageUrl).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_couleurs_modele_id")
                        .table(Couleurs::Table)
                        .col(Couleurs::ModeleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Couleurs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Couleurs {
        Table,
        Id,
        ModeleId,
        Nom,
        CodeHex,
        ImageUrl,
    }
}

mod m20250101_000003_create_elements_superposables_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_elements_superposables_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ElementsSuperposables::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ElementsSuperposables::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ElementsSuperposables::ModeleId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ElementsSuperposables::Nom).string().not_null())
                        .col(ColumnDef::new(ElementsSuperposables::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(ElementsSuperposables::PositionX)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ElementsSuperposables::PositionY)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_elements_superposables_modele_id")
                        .table(ElementsSuperposables::Table)
                        .col(ElementsSuperposables::ModeleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ElementsSuperposables::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ElementsSuperposables {
        Table,
        Id,
        ModeleId,
        Nom,
        ImageUrl,
        PositionX,
        PositionY,
    }
}

mod m20250101_000004_create_motifs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_motifs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Motifs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Motifs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Motifs::Nom).string().not_null())
                        .col(ColumnDef::new(Motifs::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Motifs::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Motifs {
        Table,
        Id,
        Nom,
        CreatedAt,
    }
}

mod m20250101_000005_create_variantes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_variantes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Variantes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Variantes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Variantes::MotifId).uuid().not_null())
                        .col(ColumnDef::new(Variantes::Nom).string().not_null())
                        .col(ColumnDef::new(Variantes::ImageUrl).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variantes_motif_id")
                        .table(Variantes::Table)
                        .col(Variantes::MotifId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Variantes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Variantes {
        Table,
        Id,
        MotifId,
        Nom,
        ImageUrl,
    }
}

mod m20250101_000006_create_associations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_associations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Associations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Associations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Associations::VarianteId).uuid().not_null())
                        .col(ColumnDef::new(Associations::Modele).string().not_null())
                        .col(ColumnDef::new(Associations::Couleur).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_associations_variante_id")
                        .table(Associations::Table)
                        .col(Associations::VarianteId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Associations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Associations {
        Table,
        Id,
        VarianteId,
        Modele,
        Couleur,
    }
}
