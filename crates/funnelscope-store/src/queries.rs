use crate::error::Result;
use crate::store::FunnelStore;
use rusqlite::params;
use serde::Serialize;

/// A named analytical query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: &'static str,
    pub title: &'static str,
    pub sql: &'static str,
}

const OVERALL_METRICS: &str = "SELECT
    COUNT(DISTINCT session_id) AS total_sessions,
    COUNT(DISTINCT user_id) AS unique_users,
    COALESCE(SUM(completed_purchase), 0) AS conversions,
    COALESCE(ROUND(SUM(completed_purchase) * 100.0 / NULLIF(COUNT(*), 0), 2), 0) AS conversion_rate,
    COALESCE(ROUND(SUM(bounced) * 100.0 / NULLIF(COUNT(*), 0), 2), 0) AS bounce_rate,
    COALESCE(ROUND(AVG(session_duration_seconds), 2), 0) AS avg_session_duration,
    COALESCE(ROUND(AVG(pages_viewed), 2), 0) AS avg_pages_per_session,
    COALESCE(ROUND(SUM(revenue), 2), 0) AS total_revenue,
    COALESCE(ROUND(SUM(ad_spend), 2), 0) AS total_ad_spend,
    ROUND((SUM(revenue) - SUM(ad_spend)) / NULLIF(SUM(ad_spend), 0) * 100, 2) AS overall_roi
FROM sessions";

const CONVERSION_FUNNEL: &str = "WITH counts AS (
    SELECT
        COUNT(*) AS landed,
        COALESCE(SUM(viewed_product), 0) AS viewed,
        COALESCE(SUM(added_to_cart), 0) AS carted,
        COALESCE(SUM(started_checkout), 0) AS checkout,
        COALESCE(SUM(completed_purchase), 0) AS purchased
    FROM sessions
)
SELECT 'Landing Page' AS stage, 1 AS stage_order, landed AS users,
    CASE WHEN landed = 0 THEN 0.0 ELSE 100.0 END AS percentage,
    0.0 AS drop_off
FROM counts
UNION ALL
SELECT 'Product View', 2, viewed,
    COALESCE(ROUND(viewed * 100.0 / NULLIF(landed, 0), 2), 0),
    COALESCE(ROUND((landed - viewed) * 100.0 / NULLIF(landed, 0), 2), 0)
FROM counts
UNION ALL
SELECT 'Add to Cart', 3, carted,
    COALESCE(ROUND(carted * 100.0 / NULLIF(landed, 0), 2), 0),
    COALESCE(ROUND((viewed - carted) * 100.0 / NULLIF(viewed, 0), 2), 0)
FROM counts
UNION ALL
SELECT 'Checkout Started', 4, checkout,
    COALESCE(ROUND(checkout * 100.0 / NULLIF(landed, 0), 2), 0),
    COALESCE(ROUND((carted - checkout) * 100.0 / NULLIF(carted, 0), 2), 0)
FROM counts
UNION ALL
SELECT 'Purchase Complete', 5, purchased,
    COALESCE(ROUND(purchased * 100.0 / NULLIF(landed, 0), 2), 0),
    COALESCE(ROUND((checkout - purchased) * 100.0 / NULLIF(checkout, 0), 2), 0)
FROM counts
ORDER BY stage_order";

const CART_ABANDONMENT: &str = "SELECT
    COUNT(CASE WHEN added_to_cart = 1 THEN 1 END) AS carts_created,
    COUNT(CASE WHEN added_to_cart = 1 AND completed_purchase = 0 THEN 1 END) AS carts_abandoned,
    COUNT(CASE WHEN completed_purchase = 1 THEN 1 END) AS carts_purchased,
    COALESCE(ROUND(COUNT(CASE WHEN added_to_cart = 1 AND completed_purchase = 0 THEN 1 END) * 100.0
        / NULLIF(COUNT(CASE WHEN added_to_cart = 1 THEN 1 END), 0), 2), 0) AS abandonment_rate
FROM sessions";

const TRAFFIC_SOURCE_PERFORMANCE: &str = "SELECT
    traffic_source,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(bounced) * 100.0 / COUNT(*), 2) AS bounce_rate,
    ROUND(SUM(revenue), 2) AS total_revenue,
    ROUND(SUM(ad_spend), 2) AS total_ad_spend,
    ROUND((SUM(revenue) - SUM(ad_spend)) / NULLIF(SUM(ad_spend), 0) * 100, 2) AS roi_percent,
    ROUND(SUM(revenue) / COUNT(*), 2) AS revenue_per_session
FROM sessions
GROUP BY traffic_source
ORDER BY conversions DESC, traffic_source";

const DEVICE_PERFORMANCE: &str = "SELECT
    device,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(AVG(session_duration_seconds), 2) AS avg_duration,
    ROUND(AVG(pages_viewed), 2) AS avg_pages,
    ROUND(SUM(revenue), 2) AS total_revenue
FROM sessions
GROUP BY device
ORDER BY sessions DESC, device";

const HOURLY_PATTERNS: &str = "SELECT
    printf('%02d', hour) AS hour,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS revenue
FROM sessions
GROUP BY hour
ORDER BY hour";

const DAILY_TRENDS: &str = "SELECT
    date,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS revenue,
    ROUND(AVG(session_duration_seconds), 2) AS avg_duration
FROM sessions
GROUP BY date
ORDER BY date";

const WEEKDAY_PERFORMANCE: &str = "SELECT
    day_of_week,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS revenue
FROM sessions
GROUP BY day_of_week
ORDER BY
    CASE day_of_week
        WHEN 'Monday' THEN 1
        WHEN 'Tuesday' THEN 2
        WHEN 'Wednesday' THEN 3
        WHEN 'Thursday' THEN 4
        WHEN 'Friday' THEN 5
        WHEN 'Saturday' THEN 6
        WHEN 'Sunday' THEN 7
    END";

const CATEGORY_PERFORMANCE: &str = "SELECT
    category,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS total_revenue,
    ROUND(AVG(CASE WHEN completed_purchase = 1 THEN revenue END), 2) AS avg_order_value
FROM sessions
GROUP BY category
ORDER BY total_revenue DESC, category";

const NEW_VS_RETURNING: &str = "SELECT
    CASE WHEN is_returning = 1 THEN 'Returning' ELSE 'New' END AS customer_type,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS total_revenue,
    ROUND(AVG(CASE WHEN completed_purchase = 1 THEN revenue END), 2) AS avg_order_value
FROM sessions
GROUP BY is_returning
ORDER BY is_returning";

const LOCATION_ANALYSIS: &str = "SELECT
    location,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS total_revenue
FROM sessions
GROUP BY location
ORDER BY total_revenue DESC, location";

const CHECKOUT_DROP_OFF: &str = "SELECT
    'Reached Checkout' AS stage,
    COUNT(CASE WHEN started_checkout = 1 THEN 1 END) AS users,
    100.0 AS percentage
FROM sessions
UNION ALL
SELECT
    'Completed Purchase' AS stage,
    COUNT(CASE WHEN completed_purchase = 1 THEN 1 END) AS users,
    COALESCE(ROUND(COUNT(CASE WHEN completed_purchase = 1 THEN 1 END) * 100.0
        / NULLIF(COUNT(*), 0), 2), 0) AS percentage
FROM sessions
WHERE started_checkout = 1";

const REVENUE_METRICS: &str = "SELECT
    COUNT(CASE WHEN completed_purchase = 1 THEN 1 END) AS total_orders,
    COALESCE(ROUND(SUM(revenue), 2), 0) AS total_revenue,
    ROUND(AVG(CASE WHEN completed_purchase = 1 THEN revenue END), 2) AS avg_order_value,
    ROUND(MIN(CASE WHEN completed_purchase = 1 THEN revenue END), 2) AS min_order_value,
    ROUND(MAX(CASE WHEN completed_purchase = 1 THEN revenue END), 2) AS max_order_value,
    COALESCE(ROUND(SUM(revenue) / NULLIF(COUNT(DISTINCT session_id), 0), 2), 0) AS revenue_per_session,
    COALESCE(ROUND(SUM(revenue) / NULLIF(COUNT(DISTINCT user_id), 0), 2), 0) AS revenue_per_user
FROM sessions";

const SESSION_QUALITY: &str = "SELECT
    CASE
        WHEN session_duration_seconds < 30 THEN '< 30 sec'
        WHEN session_duration_seconds < 120 THEN '30 sec - 2 min'
        WHEN session_duration_seconds < 300 THEN '2 - 5 min'
        WHEN session_duration_seconds < 600 THEN '5 - 10 min'
        ELSE '> 10 min'
    END AS duration_bucket,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate
FROM sessions
GROUP BY duration_bucket
ORDER BY
    CASE duration_bucket
        WHEN '< 30 sec' THEN 1
        WHEN '30 sec - 2 min' THEN 2
        WHEN '2 - 5 min' THEN 3
        WHEN '5 - 10 min' THEN 4
        ELSE 5
    END";

const TOP_CONVERTING_SEGMENTS: &str = "SELECT
    traffic_source,
    device,
    COUNT(*) AS sessions,
    SUM(completed_purchase) AS conversions,
    ROUND(SUM(completed_purchase) * 100.0 / COUNT(*), 2) AS conversion_rate,
    ROUND(SUM(revenue), 2) AS revenue
FROM sessions
GROUP BY traffic_source, device
HAVING COUNT(*) > ?1
ORDER BY conversion_rate DESC, traffic_source, device
LIMIT 10";

/// Every analytical query, in report order
pub const QUERY_CATALOG: &[NamedQuery] = &[
    NamedQuery { name: "overall_metrics", title: "Overall key metrics", sql: OVERALL_METRICS },
    NamedQuery { name: "conversion_funnel", title: "Conversion funnel stages", sql: CONVERSION_FUNNEL },
    NamedQuery { name: "cart_abandonment", title: "Cart abandonment analysis", sql: CART_ABANDONMENT },
    NamedQuery { name: "traffic_source_performance", title: "Traffic source analysis", sql: TRAFFIC_SOURCE_PERFORMANCE },
    NamedQuery { name: "device_performance", title: "Device-wise performance", sql: DEVICE_PERFORMANCE },
    NamedQuery { name: "hourly_patterns", title: "Hourly traffic and conversion patterns", sql: HOURLY_PATTERNS },
    NamedQuery { name: "daily_trends", title: "Daily trends over time", sql: DAILY_TRENDS },
    NamedQuery { name: "weekday_performance", title: "Day of week analysis", sql: WEEKDAY_PERFORMANCE },
    NamedQuery { name: "category_performance", title: "Product category analysis", sql: CATEGORY_PERFORMANCE },
    NamedQuery { name: "new_vs_returning", title: "Returning vs new customer performance", sql: NEW_VS_RETURNING },
    NamedQuery { name: "location_analysis", title: "Geographic performance", sql: LOCATION_ANALYSIS },
    NamedQuery { name: "checkout_drop_off", title: "Detailed checkout drop-off", sql: CHECKOUT_DROP_OFF },
    NamedQuery { name: "revenue_metrics", title: "Revenue breakdown", sql: REVENUE_METRICS },
    NamedQuery { name: "session_quality", title: "Session quality indicators", sql: SESSION_QUALITY },
    NamedQuery { name: "top_converting_segments", title: "Best performing segments (?1 = minimum sessions)", sql: TOP_CONVERTING_SEGMENTS },
];

/// The catalog as one commented `.sql` document
pub fn render_catalog() -> String {
    let mut out = String::from("-- E-Commerce Funnel Analysis: analytical queries\n");
    for (i, q) in QUERY_CATALOG.iter().enumerate() {
        out.push_str(&format!("\n-- Query {}: {} ({})\n{};\n", i + 1, q.title, q.name, q.sql));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub total_sessions: i64,
    pub unique_users: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    pub avg_session_duration: f64,
    pub avg_pages_per_session: f64,
    pub total_revenue: f64,
    pub total_ad_spend: f64,
    /// `None` when nothing was spent on ads
    pub overall_roi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStageRow {
    pub stage: String,
    pub stage_order: i64,
    pub users: i64,
    pub percentage: f64,
    pub drop_off: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartAbandonmentRow {
    pub carts_created: i64,
    pub carts_abandoned: i64,
    pub carts_purchased: i64,
    pub abandonment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSourceRow {
    pub traffic_source: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    pub total_revenue: f64,
    pub total_ad_spend: f64,
    pub roi_percent: Option<f64>,
    pub revenue_per_session: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRow {
    pub device: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub avg_duration: f64,
    pub avg_pages: f64,
    pub total_revenue: f64,
}

/// Sessions grouped by one key (hour, date, weekday, location, duration bucket)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    /// Absent for groupings that carry no revenue column
    pub revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrendRow {
    pub date: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub revenue: f64,
    pub avg_duration: f64,
}

/// Category or customer-type performance with average order value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderValueRow {
    pub key: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutStageRow {
    pub stage: String,
    pub users: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueMetrics {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
    pub min_order_value: Option<f64>,
    pub max_order_value: Option<f64>,
    pub revenue_per_session: f64,
    pub revenue_per_user: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPerformanceRow {
    pub traffic_source: String,
    pub device: String,
    pub sessions: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub revenue: f64,
}

fn group_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupRow> {
    Ok(GroupRow {
        key: row.get(0)?,
        sessions: row.get(1)?,
        conversions: row.get(2)?,
        conversion_rate: row.get(3)?,
        revenue: row.get(4)?,
    })
}

fn order_value_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderValueRow> {
    Ok(OrderValueRow {
        key: row.get(0)?,
        sessions: row.get(1)?,
        conversions: row.get(2)?,
        conversion_rate: row.get(3)?,
        total_revenue: row.get(4)?,
        avg_order_value: row.get(5)?,
    })
}

impl FunnelStore {
    pub fn overall_metrics(&self) -> Result<OverallMetrics> {
        self.query_one(OVERALL_METRICS, |row| {
            Ok(OverallMetrics {
                total_sessions: row.get(0)?,
                unique_users: row.get(1)?,
                conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                bounce_rate: row.get(4)?,
                avg_session_duration: row.get(5)?,
                avg_pages_per_session: row.get(6)?,
                total_revenue: row.get(7)?,
                total_ad_spend: row.get(8)?,
                overall_roi: row.get(9)?,
            })
        })
    }

    pub fn conversion_funnel(&self) -> Result<Vec<FunnelStageRow>> {
        self.query_rows(CONVERSION_FUNNEL, |row| {
            Ok(FunnelStageRow {
                stage: row.get(0)?,
                stage_order: row.get(1)?,
                users: row.get(2)?,
                percentage: row.get(3)?,
                drop_off: row.get(4)?,
            })
        })
    }

    pub fn cart_abandonment(&self) -> Result<CartAbandonmentRow> {
        self.query_one(CART_ABANDONMENT, |row| {
            Ok(CartAbandonmentRow {
                carts_created: row.get(0)?,
                carts_abandoned: row.get(1)?,
                carts_purchased: row.get(2)?,
                abandonment_rate: row.get(3)?,
            })
        })
    }

    /// Most conversions first
    pub fn traffic_source_performance(&self) -> Result<Vec<TrafficSourceRow>> {
        self.query_rows(TRAFFIC_SOURCE_PERFORMANCE, |row| {
            Ok(TrafficSourceRow {
                traffic_source: row.get(0)?,
                sessions: row.get(1)?,
                conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                bounce_rate: row.get(4)?,
                total_revenue: row.get(5)?,
                total_ad_spend: row.get(6)?,
                roi_percent: row.get(7)?,
                revenue_per_session: row.get(8)?,
            })
        })
    }

    pub fn device_performance(&self) -> Result<Vec<DeviceRow>> {
        self.query_rows(DEVICE_PERFORMANCE, |row| {
            Ok(DeviceRow {
                device: row.get(0)?,
                sessions: row.get(1)?,
                conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                avg_duration: row.get(4)?,
                avg_pages: row.get(5)?,
                total_revenue: row.get(6)?,
            })
        })
    }

    pub fn hourly_patterns(&self) -> Result<Vec<GroupRow>> {
        self.query_rows(HOURLY_PATTERNS, group_row)
    }

    pub fn daily_trends(&self) -> Result<Vec<DailyTrendRow>> {
        self.query_rows(DAILY_TRENDS, |row| {
            Ok(DailyTrendRow {
                date: row.get(0)?,
                sessions: row.get(1)?,
                conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                revenue: row.get(4)?,
                avg_duration: row.get(5)?,
            })
        })
    }

    /// Monday through Sunday
    pub fn weekday_performance(&self) -> Result<Vec<GroupRow>> {
        self.query_rows(WEEKDAY_PERFORMANCE, group_row)
    }

    pub fn category_performance(&self) -> Result<Vec<OrderValueRow>> {
        self.query_rows(CATEGORY_PERFORMANCE, order_value_row)
    }

    pub fn new_vs_returning(&self) -> Result<Vec<OrderValueRow>> {
        self.query_rows(NEW_VS_RETURNING, order_value_row)
    }

    pub fn location_analysis(&self) -> Result<Vec<GroupRow>> {
        self.query_rows(LOCATION_ANALYSIS, group_row)
    }

    pub fn checkout_drop_off(&self) -> Result<Vec<CheckoutStageRow>> {
        self.query_rows(CHECKOUT_DROP_OFF, |row| {
            Ok(CheckoutStageRow {
                stage: row.get(0)?,
                users: row.get(1)?,
                percentage: row.get(2)?,
            })
        })
    }

    pub fn revenue_metrics(&self) -> Result<RevenueMetrics> {
        self.query_one(REVENUE_METRICS, |row| {
            Ok(RevenueMetrics {
                total_orders: row.get(0)?,
                total_revenue: row.get(1)?,
                avg_order_value: row.get(2)?,
                min_order_value: row.get(3)?,
                max_order_value: row.get(4)?,
                revenue_per_session: row.get(5)?,
                revenue_per_user: row.get(6)?,
            })
        })
    }

    pub fn session_quality(&self) -> Result<Vec<GroupRow>> {
        self.query_rows(SESSION_QUALITY, |row| {
            Ok(GroupRow {
                key: row.get(0)?,
                sessions: row.get(1)?,
                conversions: row.get(2)?,
                conversion_rate: row.get(3)?,
                revenue: None,
            })
        })
    }

    /// Source x device pairs with more than `min_sessions` sessions, best conversion first
    pub fn top_converting_segments(&self, min_sessions: i64) -> Result<Vec<SegmentPerformanceRow>> {
        let mut stmt = self.conn.prepare(TOP_CONVERTING_SEGMENTS)?;
        let rows = stmt.query_map(params![min_sessions], |row| {
            Ok(SegmentPerformanceRow {
                traffic_source: row.get(0)?,
                device: row.get(1)?,
                sessions: row.get(2)?,
                conversions: row.get(3)?,
                conversion_rate: row.get(4)?,
                revenue: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
