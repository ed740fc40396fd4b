use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Investors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Investors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Investors::Name).string().not_null())
                    .col(ColumnDef::new(Investors::FundType).string())
                    .col(ColumnDef::new(Investors::Website).string())
                    .col(ColumnDef::new(Investors::Focus).string())
                    .col(ColumnDef::new(Investors::Stage).string())
                    .col(ColumnDef::new(Investors::PartnerName).string())
                    .col(ColumnDef::new(Investors::PartnerEmail).string())
                    .col(ColumnDef::new(Investors::Portfolio).text()) // Comma-separated company names can run long
                    .col(ColumnDef::new(Investors::Location).string())
                    .col(ColumnDef::new(Investors::SocialLinks).json())
                    .col(ColumnDef::new(Investors::InvestmentCount).integer())
                    .col(ColumnDef::new(Investors::ExitCount).integer())
                    .col(ColumnDef::new(Investors::Description).text())
                    .col(ColumnDef::new(Investors::FoundingYear).integer())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Investors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Investors {
    Table,
    Id,
    Name,
    FundType,
    Website,
    Focus,
    Stage,
    PartnerName,
    PartnerEmail,
    Portfolio,
    Location,
    SocialLinks,
    InvestmentCount,
    ExitCount,
    Description,
    FoundingYear,
}
