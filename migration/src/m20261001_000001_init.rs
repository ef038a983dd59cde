use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== COMPANIES ==========
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Companies::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== USERS ==========
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Users::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Users::Email).string_len(256).not_null().unique_key())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_company")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE users ADD CONSTRAINT users_role_check CHECK (role IN ('admin', 'user'))",
            )
            .await?;

        // ========== DEVICE TYPES ==========
        manager
            .create_table(
                Table::create()
                    .table(DeviceTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeviceTypes::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DeviceTypes::Description).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeviceTypeProperties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceTypeProperties::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeviceTypeProperties::DeviceTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceTypeProperties::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceTypeProperties::Tag)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeviceTypeProperties::Unit).string_len(32))
                    .col(
                        ColumnDef::new(DeviceTypeProperties::DataType)
                            .string_len(32)
                            .not_null()
                            .default("number"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_type_properties_type")
                            .from(DeviceTypeProperties::Table, DeviceTypeProperties::DeviceTypeId)
                            .to(DeviceTypes::Table, DeviceTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_device_type_properties_tag")
                    .table(DeviceTypeProperties::Table)
                    .col(DeviceTypeProperties::DeviceTypeId)
                    .col(DeviceTypeProperties::Tag)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ========== HIERARCHIES ==========
        manager
            .create_table(
                Table::create()
                    .table(Hierarchies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hierarchies::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Hierarchies::ParentId).uuid())
                    .col(ColumnDef::new(Hierarchies::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Hierarchies::Level).string_len(32))
                    .col(
                        ColumnDef::new(Hierarchies::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hierarchies_parent")
                            .from(Hierarchies::Table, Hierarchies::ParentId)
                            .to(Hierarchies::Table, Hierarchies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hierarchies_parent")
                    .table(Hierarchies::Table)
                    .col(Hierarchies::ParentId)
                    .to_owned(),
            )
            .await?;

        // ========== DEVICES ==========
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Devices::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Devices::DeviceTypeId).integer().not_null())
                    .col(ColumnDef::new(Devices::HierarchyId).uuid().not_null())
                    .col(
                        ColumnDef::new(Devices::SerialNumber)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Devices::Metadata).json_binary())
                    .col(
                        ColumnDef::new(Devices::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devices_company")
                            .from(Devices::Table, Devices::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devices_type")
                            .from(Devices::Table, Devices::DeviceTypeId)
                            .to(DeviceTypes::Table, DeviceTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devices_hierarchy")
                            .from(Devices::Table, Devices::HierarchyId)
                            .to(Hierarchies::Table, Hierarchies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_company_type")
                    .table(Devices::Table)
                    .col(Devices::CompanyId)
                    .col(Devices::DeviceTypeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_hierarchy")
                    .table(Devices::Table)
                    .col(Devices::HierarchyId)
                    .to_owned(),
            )
            .await?;

        // ========== DEVICE READINGS (append-only log) ==========
        manager
            .create_table(
                Table::create()
                    .table(DeviceReadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceReadings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeviceReadings::DeviceId).uuid().not_null())
                    .col(
                        ColumnDef::new(DeviceReadings::SerialNumber)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceReadings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(DeviceReadings::Data).json_binary().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_readings_device")
                            .from(DeviceReadings::Table, DeviceReadings::DeviceId)
                            .to(Devices::Table, Devices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_device_readings_device_time ON device_readings (device_id, created_at)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX idx_device_readings_data ON device_readings USING GIN (data)",
        )
        .await?;

        // ========== DEVICE LATEST (one row per device) ==========
        manager
            .create_table(
                Table::create()
                    .table(DeviceLatest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceLatest::DeviceId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeviceLatest::SerialNumber)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceLatest::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(ColumnDef::new(DeviceLatest::Data).json_binary().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_latest_device")
                            .from(DeviceLatest::Table, DeviceLatest::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== WIDGET TYPES ==========
        manager
            .create_table(
                Table::create()
                    .table(WidgetTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WidgetTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WidgetTypes::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(WidgetTypes::Component).string_len(128).not_null())
                    .col(
                        ColumnDef::new(WidgetTypes::DefaultConfig)
                            .json_binary()
                            .not_null()
                            .extra("DEFAULT '{}'::jsonb"),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== WIDGET DEFINITIONS ==========
        manager
            .create_table(
                Table::create()
                    .table(WidgetDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WidgetDefinitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(
                        ColumnDef::new(WidgetDefinitions::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WidgetDefinitions::Description).text())
                    .col(
                        ColumnDef::new(WidgetDefinitions::WidgetTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WidgetDefinitions::DataSourceConfig)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WidgetDefinitions::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(WidgetDefinitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_widget_definitions_type")
                            .from(WidgetDefinitions::Table, WidgetDefinitions::WidgetTypeId)
                            .to(WidgetTypes::Table, WidgetTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_widget_definitions_creator")
                            .from(WidgetDefinitions::Table, WidgetDefinitions::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== DASHBOARDS ==========
        manager
            .create_table(
                Table::create()
                    .table(Dashboards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Dashboards::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Dashboards::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Dashboards::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Dashboards::Description).text())
                    .col(ColumnDef::new(Dashboards::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Dashboards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Dashboards::GridConfig)
                            .json_binary()
                            .not_null()
                            .extra("DEFAULT '{}'::jsonb"),
                    )
                    .col(
                        ColumnDef::new(Dashboards::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Dashboards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT NOW()"),
                    )
                    .col(
                        ColumnDef::new(Dashboards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dashboards_company")
                            .from(Dashboards::Table, Dashboards::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dashboards_creator")
                            .from(Dashboards::Table, Dashboards::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dashboards_company_active")
                    .table(Dashboards::Table)
                    .col(Dashboards::CompanyId)
                    .col(Dashboards::IsActive)
                    .col(Dashboards::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ========== DASHBOARD LAYOUTS ==========
        manager
            .create_table(
                Table::create()
                    .table(DashboardLayouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DashboardLayouts::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(DashboardLayouts::DashboardId).uuid().not_null())
                    .col(
                        ColumnDef::new(DashboardLayouts::WidgetDefinitionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DashboardLayouts::LayoutConfig)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DashboardLayouts::InstanceConfig).json_binary())
                    .col(
                        ColumnDef::new(DashboardLayouts::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DashboardLayouts::CreatedAt)
                            .timestamp_with_time_zone()
                            .extra("DEFAULT NOW()"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dashboard_layouts_dashboard")
                            .from(DashboardLayouts::Table, DashboardLayouts::DashboardId)
                            .to(Dashboards::Table, Dashboards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dashboard_layouts_widget")
                            .from(DashboardLayouts::Table, DashboardLayouts::WidgetDefinitionId)
                            .to(WidgetDefinitions::Table, WidgetDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dashboard_layouts_order")
                    .table(DashboardLayouts::Table)
                    .col(DashboardLayouts::DashboardId)
                    .col(DashboardLayouts::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(DashboardLayouts::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Dashboards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(WidgetDefinitions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(WidgetTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceLatest::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(DeviceReadings::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hierarchies::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(DeviceTypeProperties::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(DeviceTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    CompanyId,
    Email,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceTypes {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum DeviceTypeProperties {
    Table,
    Id,
    DeviceTypeId,
    Name,
    Tag,
    Unit,
    DataType,
}

#[derive(DeriveIden)]
enum Hierarchies {
    Table,
    Id,
    ParentId,
    Name,
    Level,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    Id,
    CompanyId,
    DeviceTypeId,
    HierarchyId,
    SerialNumber,
    Metadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceReadings {
    Table,
    Id,
    DeviceId,
    SerialNumber,
    CreatedAt,
    Data,
}

#[derive(DeriveIden)]
enum DeviceLatest {
    Table,
    DeviceId,
    SerialNumber,
    UpdatedAt,
    Data,
}

#[derive(DeriveIden)]
enum WidgetTypes {
    Table,
    Id,
    Name,
    Component,
    DefaultConfig,
}

#[derive(DeriveIden)]
enum WidgetDefinitions {
    Table,
    Id,
    Name,
    Description,
    WidgetTypeId,
    DataSourceConfig,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Dashboards {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    CreatedBy,
    IsActive,
    GridConfig,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DashboardLayouts {
    Table,
    Id,
    DashboardId,
    WidgetDefinitionId,
    LayoutConfig,
    InstanceConfig,
    DisplayOrder,
    CreatedAt,
}
