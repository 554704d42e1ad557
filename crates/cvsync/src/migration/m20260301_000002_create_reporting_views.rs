//! Read-only reporting views consumed by the dashboard.
//!
//! The views rely on PostgreSQL date functions (`DATE_TRUNC`, intervals), so
//! on other backends this migration records itself and creates nothing.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Placeholder for the confirmed-sale predicate shared by the sales views.
const CONFIRMED: &str = "{confirmed}";

const VIEWS: &[(&str, &str)] = &[
    (
        "sales_year_over_year",
        r#"
        SELECT
            CASE WHEN EXTRACT(YEAR FROM sale_date) = EXTRACT(YEAR FROM CURRENT_DATE)
                 THEN 'current_year' ELSE 'previous_year' END AS period,
            EXTRACT(YEAR FROM sale_date) AS year,
            COUNT(*) AS sales_count,
            SUM(amount) AS total_amount,
            AVG(amount) AS average_ticket,
            SUM(commission_amount) AS total_commission,
            AVG(commission_amount) AS average_commission
        FROM sales
        WHERE EXTRACT(YEAR FROM sale_date) >= EXTRACT(YEAR FROM CURRENT_DATE) - 1
          AND {confirmed}
        GROUP BY EXTRACT(YEAR FROM sale_date)
        "#,
    ),
    (
        "sales_monthly",
        r#"
        SELECT
            DATE_TRUNC('month', sale_date) AS month,
            EXTRACT(YEAR FROM sale_date) AS year,
            EXTRACT(MONTH FROM sale_date) AS month_number,
            COUNT(*) AS sales_count,
            SUM(amount) AS total_amount,
            AVG(amount) AS average_ticket,
            SUM(vgv) AS total_vgv,
            SUM(commission_amount) AS total_commission,
            AVG(commission_amount) AS average_commission
        FROM sales
        WHERE sale_date >= CURRENT_DATE - INTERVAL '24 months'
          AND {confirmed}
        GROUP BY 1, 2, 3
        ORDER BY month
        "#,
    ),
    (
        "sales_by_development",
        r#"
        SELECT
            d.cvcrm_id,
            d.name AS development,
            COUNT(s.id) AS sales_count,
            SUM(s.amount) AS total_amount,
            AVG(s.amount) AS average_ticket,
            SUM(s.vgv) AS total_vgv,
            SUM(s.commission_amount) AS total_commission,
            AVG(s.commission_amount) AS average_commission,
            COUNT(DISTINCT s.broker) AS broker_count
        FROM developments d
        LEFT JOIN sales s ON d.name = s.development_name
            AND s.active_flag = 'S'
            AND s.sale_date IS NOT NULL
            AND s.sale_date >= CURRENT_DATE - INTERVAL '12 months'
        GROUP BY d.cvcrm_id, d.name
        ORDER BY total_amount DESC NULLS LAST
        "#,
    ),
    (
        "sales_by_broker",
        r#"
        SELECT
            broker,
            broker_team,
            COUNT(*) AS sales_count,
            SUM(amount) AS total_amount,
            AVG(amount) AS average_ticket,
            SUM(commission_amount) AS total_commission,
            AVG(commission_amount) AS average_commission,
            COUNT(DISTINCT development_name) AS developments_sold
        FROM sales
        WHERE sale_date >= CURRENT_DATE - INTERVAL '12 months'
          AND {confirmed}
          AND broker IS NOT NULL
        GROUP BY broker, broker_team
        ORDER BY total_amount DESC
        "#,
    ),
    (
        "sales_by_team",
        r#"
        SELECT
            COALESCE(broker_team, 'No team') AS broker_team,
            COUNT(*) AS sales_count,
            SUM(amount) AS total_amount,
            AVG(amount) AS average_ticket,
            SUM(commission_amount) AS total_commission,
            AVG(commission_amount) AS average_commission,
            COUNT(DISTINCT broker) AS broker_count,
            COUNT(DISTINCT development_name) AS developments_sold
        FROM sales
        WHERE sale_date >= CURRENT_DATE - INTERVAL '12 months'
          AND {confirmed}
        GROUP BY 1
        ORDER BY total_amount DESC
        "#,
    ),
    (
        "sales_velocity_monthly",
        r#"
        SELECT
            DATE_TRUNC('month', sale_date) AS month,
            COUNT(*) AS sales_count,
            SUM(amount) AS velocity_amount,
            AVG(amount) AS velocity_average_ticket,
            SUM(amount) / NULLIF(COUNT(DISTINCT development_name), 0) AS velocity_per_development
        FROM sales
        WHERE sale_date >= CURRENT_DATE - INTERVAL '12 months'
          AND {confirmed}
        GROUP BY 1
        ORDER BY month
        "#,
    ),
    (
        "prosoluto_ratio_monthly",
        r#"
        SELECT
            DATE_TRUNC('month', p.calculated_on) AS month,
            COUNT(*) AS prosoluto_count,
            SUM(p.amount) AS total_prosoluto,
            AVG(p.amount) AS average_prosoluto,
            SUM(p.amount) / NULLIF(SUM(s.amount), 0) * 100 AS prosoluto_percent_of_sales
        FROM prosoluto p
        LEFT JOIN sales s ON p.sale_id = s.cvcrm_id
        WHERE p.calculated_on >= CURRENT_DATE - INTERVAL '12 months'
          AND COALESCE(p.status, '') <> 'cancelado'
        GROUP BY 1
        ORDER BY month
        "#,
    ),
    (
        "sales_overview",
        r#"
        SELECT
            s.cvcrm_id,
            s.development_name,
            s.broker,
            s.broker_team,
            s.customer,
            s.sale_date,
            s.amount,
            s.financing_amount,
            s.down_payment,
            s.installments,
            s.vgv,
            s.commission_amount,
            p.amount AS prosoluto_amount,
            p.percent AS prosoluto_percent,
            s.status
        FROM sales s
        LEFT JOIN prosoluto p ON s.cvcrm_id = p.sale_id
        WHERE s.sale_date >= CURRENT_DATE - INTERVAL '24 months'
          AND s.active_flag = 'S'
          AND s.sale_date IS NOT NULL
        ORDER BY s.sale_date DESC
        "#,
    ),
];

/// Expand the shared confirmed-sale predicate into a view body.
fn view_sql(name: &str, body: &str) -> String {
    let body = body.replace(
        CONFIRMED,
        "active_flag = 'S' AND sale_date IS NOT NULL",
    );
    format!("CREATE OR REPLACE VIEW {name} AS {}", body.trim())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        for (name, body) in VIEWS {
            db.execute_unprepared(&view_sql(name, body)).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        for (name, _) in VIEWS.iter().rev() {
            db.execute_unprepared(&format!("DROP VIEW IF EXISTS {name}"))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_view_expands_the_confirmed_predicate() {
        for (name, body) in VIEWS {
            let sql = view_sql(name, body);
            assert!(sql.starts_with(&format!("CREATE OR REPLACE VIEW {name} AS SELECT")));
            assert!(!sql.contains(CONFIRMED), "{name} kept the placeholder");
        }
    }

    #[test]
    fn view_names_are_unique() {
        let mut names: Vec<_> = VIEWS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), VIEWS.len());
    }
}
