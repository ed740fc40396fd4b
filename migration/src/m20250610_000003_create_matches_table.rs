use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matches::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Matches::InvestorId).integer().not_null())
                    .col(ColumnDef::new(Matches::MatchScore).integer())
                    .col(ColumnDef::new(Matches::MatchReason).text())
                    .col(
                        ColumnDef::new(Matches::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Matches::EmailStatus)
                            .string()
                            .not_null()
                            .default("not_sent"),
                    )
                    .col(ColumnDef::new(Matches::EmailContent).text())
                    .col(ColumnDef::new(Matches::LastInteraction).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_campaign_id")
                            .from(Matches::Table, Matches::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_investor_id")
                            .from(Matches::Table, Matches::InvestorId)
                            .to(Investors::Table, Investors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One match per investor per campaign; re-generation must not duplicate
        manager
            .create_index(
                Index::create()
                    .name("idx_matches_campaign_investor")
                    .table(Matches::Table)
                    .col(Matches::CampaignId)
                    .col(Matches::InvestorId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Matches {
    Table,
    Id,
    CampaignId,
    InvestorId,
    MatchScore,
    MatchReason,
    Status,
    EmailStatus,
    EmailContent,
    LastInteraction,
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Investors {
    Table,
    Id,
}
