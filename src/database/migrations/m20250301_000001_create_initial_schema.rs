use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users and sessions
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("user"))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::LastSignedIn).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::SessionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserSessions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(UserSessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UserSessions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(UserSessions::ExpiresAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_sessions_user_id")
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Projects
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Projects::ProjectType).string().not_null())
                    .col(ColumnDef::new(Projects::Location).string().not_null())
                    .col(ColumnDef::new(Projects::City).string().not_null())
                    .col(ColumnDef::new(Projects::State).string().not_null())
                    .col(
                        ColumnDef::new(Projects::Country)
                            .string()
                            .not_null()
                            .default("USA"),
                    )
                    .col(ColumnDef::new(Projects::Latitude).double())
                    .col(ColumnDef::new(Projects::Longitude).double())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::Scope).text())
                    .col(ColumnDef::new(Projects::TotalUnits).integer())
                    .col(ColumnDef::new(Projects::TotalSqft).double())
                    .col(
                        ColumnDef::new(Projects::ProjectStatus)
                            .string()
                            .not_null()
                            .default("planning"),
                    )
                    .col(ColumnDef::new(Projects::StartDate).timestamp())
                    .col(ColumnDef::new(Projects::CompletionDate).timestamp())
                    .col(ColumnDef::new(Projects::ExpectedCompletion).timestamp())
                    .col(ColumnDef::new(Projects::TotalProjectCost).double())
                    .col(
                        ColumnDef::new(Projects::CapitalDeployed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Projects::ProjectedReturn).double())
                    .col(ColumnDef::new(Projects::ActualReturn).double())
                    .col(ColumnDef::new(Projects::OccupancyRate).double())
                    .col(ColumnDef::new(Projects::Noi).double())
                    .col(
                        ColumnDef::new(Projects::SustainabilityFeatures)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Projects::ImageUrl).string())
                    .col(ColumnDef::new(Projects::Notes).text())
                    .col(
                        ColumnDef::new(Projects::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Investors
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
                    .col(ColumnDef::new(Investors::UserId).integer())
                    .col(ColumnDef::new(Investors::Name).string().not_null())
                    .col(ColumnDef::new(Investors::EntityType).string().not_null())
                    .col(ColumnDef::new(Investors::Email).string().not_null())
                    .col(ColumnDef::new(Investors::Phone).string())
                    .col(ColumnDef::new(Investors::OrganizationName).string())
                    .col(ColumnDef::new(Investors::Website).string())
                    .col(
                        ColumnDef::new(Investors::InvestmentStage)
                            .string()
                            .not_null()
                            .default("pre_qualification"),
                    )
                    .col(
                        ColumnDef::new(Investors::AccreditationStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Investors::MinimumInvestment).double())
                    .col(ColumnDef::new(Investors::MaximumInvestment).double())
                    .col(
                        ColumnDef::new(Investors::TotalDeployed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Investors::FocusSectors)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Investors::GeographicFocus)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Investors::InvestmentHorizon).string())
                    .col(ColumnDef::new(Investors::Notes).text())
                    .col(
                        ColumnDef::new(Investors::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Investors::LastContactedAt).timestamp())
                    .col(ColumnDef::new(Investors::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Investors::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investors_user_id")
                            .from(Investors::Table, Investors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Capital stack layers
        manager
            .create_table(
                Table::create()
                    .table(CapitalStackLayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CapitalStackLayers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::ProjectId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::LayerName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::LayerType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::LayerOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CapitalStackLayers::Amount).double().not_null())
                    .col(ColumnDef::new(CapitalStackLayers::InterestRate).double())
                    .col(ColumnDef::new(CapitalStackLayers::TermMonths).integer())
                    .col(ColumnDef::new(CapitalStackLayers::MaturityDate).timestamp())
                    .col(ColumnDef::new(CapitalStackLayers::ExpectedReturn).double())
                    .col(ColumnDef::new(CapitalStackLayers::ReturnType).string())
                    .col(ColumnDef::new(CapitalStackLayers::SourceInvestorId).integer())
                    .col(ColumnDef::new(CapitalStackLayers::SourceDescription).string())
                    .col(
                        ColumnDef::new(CapitalStackLayers::FundingStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::FundedAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(CapitalStackLayers::FundedDate).timestamp())
                    .col(
                        ColumnDef::new(CapitalStackLayers::Covenants)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(CapitalStackLayers::Notes).text())
                    .col(
                        ColumnDef::new(CapitalStackLayers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CapitalStackLayers::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_capital_stack_layers_project_id")
                            .from(CapitalStackLayers::Table, CapitalStackLayers::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_capital_stack_layers_source_investor_id")
                            .from(
                                CapitalStackLayers::Table,
                                CapitalStackLayers::SourceInvestorId,
                            )
                            .to(Investors::Table, Investors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .index(
                        Index::create()
                            .name("idx_capital_stack_layers_project_order")
                            .table(CapitalStackLayers::Table)
                            .col(CapitalStackLayers::ProjectId)
                            .col(CapitalStackLayers::LayerOrder)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Project investors
        manager
            .create_table(
                Table::create()
                    .table(ProjectInvestors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectInvestors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectInvestors::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(ProjectInvestors::InvestorId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectInvestors::InvestmentAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectInvestors::InvestmentDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectInvestors::Status)
                            .string()
                            .not_null()
                            .default("interested"),
                    )
                    .col(ColumnDef::new(ProjectInvestors::ReturnPercentage).double())
                    .col(ColumnDef::new(ProjectInvestors::ActualReturn).double())
                    .col(ColumnDef::new(ProjectInvestors::ExitDate).timestamp())
                    .col(ColumnDef::new(ProjectInvestors::Notes).text())
                    .col(
                        ColumnDef::new(ProjectInvestors::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectInvestors::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_investors_project_id")
                            .from(ProjectInvestors::Table, ProjectInvestors::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_investors_investor_id")
                            .from(ProjectInvestors::Table, ProjectInvestors::InvestorId)
                            .to(Investors::Table, Investors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_project_investors_unique_pair")
                            .table(ProjectInvestors::Table)
                            .col(ProjectInvestors::ProjectId)
                            .col(ProjectInvestors::InvestorId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Project updates
        manager
            .create_table(
                Table::create()
                    .table(ProjectUpdates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectUpdates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectUpdates::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectUpdates::UpdateType).string().not_null())
                    .col(ColumnDef::new(ProjectUpdates::Title).string().not_null())
                    .col(ColumnDef::new(ProjectUpdates::Description).text().not_null())
                    .col(ColumnDef::new(ProjectUpdates::FinancialImpact).double())
                    .col(ColumnDef::new(ProjectUpdates::TimelineImpactDays).integer())
                    .col(
                        ColumnDef::new(ProjectUpdates::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProjectUpdates::NotifyInvestors)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ProjectUpdates::AttachmentUrls)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(ProjectUpdates::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ProjectUpdates::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_updates_project_id")
                            .from(ProjectUpdates::Table, ProjectUpdates::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Documents
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::ProjectId).integer())
                    .col(ColumnDef::new(Documents::Title).string().not_null())
                    .col(ColumnDef::new(Documents::DocumentType).string().not_null())
                    .col(
                        ColumnDef::new(Documents::AccessLevel)
                            .string()
                            .not_null()
                            .default("admin"),
                    )
                    .col(ColumnDef::new(Documents::FileUrl).string().not_null())
                    .col(ColumnDef::new(Documents::StorageKey).string().not_null())
                    .col(ColumnDef::new(Documents::FileSize).big_integer())
                    .col(ColumnDef::new(Documents::FileType).string())
                    .col(
                        ColumnDef::new(Documents::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Documents::PreviousVersionId).integer())
                    .col(ColumnDef::new(Documents::Description).text())
                    .col(
                        ColumnDef::new(Documents::Tags)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Documents::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Documents::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_project_id")
                            .from(Documents::Table, Documents::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_previous_version_id")
                            .from(Documents::Table, Documents::PreviousVersionId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Investor contacts
        manager
            .create_table(
                Table::create()
                    .table(InvestorContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvestorContacts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InvestorContacts::Name).string().not_null())
                    .col(ColumnDef::new(InvestorContacts::Email).string().not_null())
                    .col(ColumnDef::new(InvestorContacts::Phone).string())
                    .col(ColumnDef::new(InvestorContacts::Company).string())
                    .col(
                        ColumnDef::new(InvestorContacts::InquiryType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InvestorContacts::Message).text())
                    .col(
                        ColumnDef::new(InvestorContacts::InterestedProjectIds)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(InvestorContacts::InvestmentRange).string())
                    .col(
                        ColumnDef::new(InvestorContacts::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(InvestorContacts::AssignedTo).integer())
                    .col(ColumnDef::new(InvestorContacts::Notes).text())
                    .col(ColumnDef::new(InvestorContacts::FollowUpDate).timestamp())
                    .col(
                        ColumnDef::new(InvestorContacts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InvestorContacts::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Audit logs
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::UserId).integer())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityId).integer().not_null())
                    .col(ColumnDef::new(AuditLogs::OldValues).json())
                    .col(ColumnDef::new(AuditLogs::NewValues).json())
                    .col(ColumnDef::new(AuditLogs::IpAddress).string())
                    .col(ColumnDef::new(AuditLogs::UserAgent).text())
                    .col(ColumnDef::new(AuditLogs::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        create_index(manager, "idx_projects_status", Projects::Table, Projects::ProjectStatus).await?;
        create_index(manager, "idx_projects_type", Projects::Table, Projects::ProjectType).await?;
        create_index(manager, "idx_projects_created_at", Projects::Table, Projects::CreatedAt).await?;
        create_index(manager, "idx_investors_email", Investors::Table, Investors::Email).await?;
        create_index(manager, "idx_investors_user_id", Investors::Table, Investors::UserId).await?;
        create_index(manager, "idx_investors_stage", Investors::Table, Investors::InvestmentStage).await?;
        create_index(manager, "idx_investors_entity_type", Investors::Table, Investors::EntityType).await?;
        create_index(
            manager,
            "idx_project_investors_investor_id",
            ProjectInvestors::Table,
            ProjectInvestors::InvestorId,
        )
        .await?;
        create_index(
            manager,
            "idx_project_updates_project_id",
            ProjectUpdates::Table,
            ProjectUpdates::ProjectId,
        )
        .await?;
        create_index(
            manager,
            "idx_project_updates_created_at",
            ProjectUpdates::Table,
            ProjectUpdates::CreatedAt,
        )
        .await?;
        create_index(manager, "idx_documents_project_id", Documents::Table, Documents::ProjectId).await?;
        create_index(manager, "idx_documents_access_level", Documents::Table, Documents::AccessLevel).await?;
        create_index(
            manager,
            "idx_investor_contacts_email",
            InvestorContacts::Table,
            InvestorContacts::Email,
        )
        .await?;
        create_index(
            manager,
            "idx_investor_contacts_status",
            InvestorContacts::Table,
            InvestorContacts::Status,
        )
        .await?;
        create_index(manager, "idx_audit_logs_user_id", AuditLogs::Table, AuditLogs::UserId).await?;
        create_index(manager, "idx_audit_logs_entity_type", AuditLogs::Table, AuditLogs::EntityType).await?;
        create_index(manager, "idx_audit_logs_created_at", AuditLogs::Table, AuditLogs::CreatedAt).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvestorContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectUpdates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectInvestors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CapitalStackLayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Investors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

async fn create_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    column: C,
) -> Result<(), DbErr>
where
    T: Iden + 'static,
    C: Iden + 'static,
{
    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(name)
                .table(table)
                .col(column)
                .to_owned(),
        )
        .await
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
    LastSignedIn,
}

#[derive(Iden)]
enum UserSessions {
    Table,
    Id,
    SessionId,
    UserId,
    IsActive,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    Slug,
    ProjectType,
    Location,
    City,
    State,
    Country,
    Latitude,
    Longitude,
    Description,
    Scope,
    TotalUnits,
    TotalSqft,
    ProjectStatus,
    StartDate,
    CompletionDate,
    ExpectedCompletion,
    TotalProjectCost,
    CapitalDeployed,
    ProjectedReturn,
    ActualReturn,
    OccupancyRate,
    Noi,
    SustainabilityFeatures,
    ImageUrl,
    Notes,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Investors {
    Table,
    Id,
    UserId,
    Name,
    EntityType,
    Email,
    Phone,
    OrganizationName,
    Website,
    InvestmentStage,
    AccreditationStatus,
    MinimumInvestment,
    MaximumInvestment,
    TotalDeployed,
    FocusSectors,
    GeographicFocus,
    InvestmentHorizon,
    Notes,
    IsActive,
    LastContactedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CapitalStackLayers {
    Table,
    Id,
    ProjectId,
    LayerName,
    LayerType,
    LayerOrder,
    Amount,
    InterestRate,
    TermMonths,
    MaturityDate,
    ExpectedReturn,
    ReturnType,
    SourceInvestorId,
    SourceDescription,
    FundingStatus,
    FundedAmount,
    FundedDate,
    Covenants,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectInvestors {
    Table,
    Id,
    ProjectId,
    InvestorId,
    InvestmentAmount,
    InvestmentDate,
    Status,
    ReturnPercentage,
    ActualReturn,
    ExitDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectUpdates {
    Table,
    Id,
    ProjectId,
    UpdateType,
    Title,
    Description,
    FinancialImpact,
    TimelineImpactDays,
    IsPublic,
    NotifyInvestors,
    AttachmentUrls,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Documents {
    Table,
    Id,
    ProjectId,
    Title,
    DocumentType,
    AccessLevel,
    FileUrl,
    StorageKey,
    FileSize,
    FileType,
    Version,
    PreviousVersionId,
    Description,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum InvestorContacts {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Company,
    InquiryType,
    Message,
    InterestedProjectIds,
    InvestmentRange,
    Status,
    AssignedTo,
    Notes,
    FollowUpDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Action,
    EntityType,
    EntityId,
    OldValues,
    NewValues,
    IpAddress,
    UserAgent,
    CreatedAt,
}
