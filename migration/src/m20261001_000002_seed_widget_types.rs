use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Rendering kinds understood by the widget data resolvers.
const WIDGET_TYPES: &[(&str, &str, &str)] = &[
    (
        "line_chart",
        "LineChartWidget",
        r#"{"deviceTypeId": null, "numberOfSeries": 0, "seriesConfig": []}"#,
    ),
    (
        "kpi",
        "KpiWidget",
        r#"{"metric": "", "unit": "", "title": "", "precision": 2}"#,
    ),
    (
        "donut_chart",
        "DonutChartWidget",
        r#"{"metrics": [], "title": ""}"#,
    ),
    (
        "map",
        "MapWidget",
        r#"{"showDevices": true, "showStatistics": true}"#,
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (name, component, default_config) in WIDGET_TYPES {
            db.execute_unprepared(&format!(
                "INSERT INTO widget_types (name, component, default_config) \
                 VALUES ('{name}', '{component}', '{default_config}'::jsonb) \
                 ON CONFLICT (name) DO NOTHING"
            ))
            .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DELETE FROM widget_types WHERE name IN ('line_chart', 'kpi', 'donut_chart', 'map')",
            )
            .await?;
        Ok(())
    }
}
