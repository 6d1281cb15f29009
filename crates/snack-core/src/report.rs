//! # Reporting Aggregator
//!
//! Pure folds over [`AppState`] producing the monthly and cumulative report
//! bundles.
//!
//! ## Monthly Window
//! ```text
//! month = "2026-02"
//!
//!   [ 2026-02-01 00:00:00 ───────────────── 2026-03-01 00:00:00 )
//!     ▲ included                              ▲ excluded
//! ```
//! The window is half-open: a purchase stamped exactly at the next month's
//! midnight belongs to the next month.
//!
//! All folds run in integer hundredths; percentages are the only floating
//! point in the output and are computed once per row.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::ReportError;
use crate::money::{Money, Qty};
use crate::types::{AppState, Purchase};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    pub margin_pct: f64,
    pub transactions: usize,
}

/// One customer's line in the billing / outstanding maps.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBilling {
    pub total: Money,
    pub count: Qty,
}

/// One product's aggregated sales, for best sellers and the cumulative view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub snack_id: Option<i64>,
    pub name: String,
    pub qty: Qty,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    pub margin_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellOutRow {
    pub snack_id: i64,
    pub name: String,
    pub stock: Qty,
    pub profit_per_unit: Money,
    pub projected_profit: Money,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellOutForecast {
    pub rows: Vec<SellOutRow>,
    pub projected_profit_total: Money,
    pub stock_total: Qty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: String,
    pub summary: ReportSummary,
    pub billing_by_customer: BTreeMap<String, CustomerBilling>,
    pub outstanding_by_customer: BTreeMap<String, CustomerBilling>,
    pub best_sellers: Vec<ProductSales>,
    pub sell_out_forecast: SellOutForecast,
}

/// One product's all-time row. `estimated` marks rows where part of the
/// volume comes from the stock counter rather than purchase detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeRow {
    pub snack_id: Option<i64>,
    pub name: String,
    pub sold: Qty,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    pub estimated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeReport {
    pub summary: ReportSummary,
    pub rows: Vec<CumulativeRow>,
}

// =============================================================================
// Month Parsing
// =============================================================================

/// Parses a `YYYY-MM` key into the half-open UTC window
/// `[first 00:00:00, first-of-next-month 00:00:00)`.
pub fn parse_month(month: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ReportError> {
    let invalid = || ReportError::InvalidMonth(month.to_string());

    let (year_s, month_s) = month.split_once('-').ok_or_else(invalid)?;
    if year_s.len() != 4 || month_s.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year_s.parse().map_err(|_| invalid())?;
    let mon: u32 = month_s.parse().map_err(|_| invalid())?;

    let start = NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)?;
    let end = if mon == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, mon + 1, 1)
    }
    .ok_or_else(invalid)?;

    let at_midnight = |d: NaiveDate| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN));
    Ok((at_midnight(start), at_midnight(end)))
}

// =============================================================================
// Shared Folds
// =============================================================================

fn margin_pct(profit: Money, revenue: Money) -> f64 {
    if revenue.is_zero() {
        0.0
    } else {
        profit.to_f64() / revenue.to_f64() * 100.0
    }
}

fn summarize<'a>(purchases: impl Iterator<Item = &'a Purchase>) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for p in purchases {
        summary.revenue += p.line_revenue;
        summary.cost += p.line_cost;
        summary.profit += p.line_profit;
        summary.transactions += 1;
    }
    summary.margin_pct = margin_pct(summary.profit, summary.revenue);
    summary
}

fn fold_by_customer<'a>(
    purchases: impl Iterator<Item = &'a Purchase>,
) -> BTreeMap<String, CustomerBilling> {
    let mut map: BTreeMap<String, CustomerBilling> = BTreeMap::new();
    for p in purchases {
        let entry = map.entry(p.customer_name.clone()).or_default();
        entry.total += p.line_revenue;
        entry.count += p.qty;
    }
    map
}

/// Product grouping key: snack id when the snapshot carries one, name
/// otherwise. Deleted products keep their history under the old id.
fn product_key(p: &Purchase) -> String {
    match p.snack_id {
        Some(id) => format!("id:{}", id),
        None => format!("name:{}", p.snack_name),
    }
}

fn fold_by_product<'a>(
    purchases: impl Iterator<Item = &'a Purchase>,
) -> HashMap<String, ProductSales> {
    let mut map: HashMap<String, ProductSales> = HashMap::new();
    for p in purchases {
        let entry = map.entry(product_key(p)).or_insert_with(|| ProductSales {
            snack_id: p.snack_id,
            name: p.snack_name.clone(),
            qty: Qty::zero(),
            revenue: Money::zero(),
            cost: Money::zero(),
            profit: Money::zero(),
            margin_pct: 0.0,
        });
        entry.qty += p.qty;
        entry.revenue += p.line_revenue;
        entry.cost += p.line_cost;
        entry.profit += p.line_profit;
    }
    for entry in map.values_mut() {
        entry.margin_pct = margin_pct(entry.profit, entry.revenue);
    }
    map
}

fn rank_best_sellers(map: HashMap<String, ProductSales>) -> Vec<ProductSales> {
    let mut rows: Vec<ProductSales> = map.into_values().collect();
    rows.sort_by(|a, b| b.qty.cmp(&a.qty).then(b.revenue.cmp(&a.revenue)));
    rows
}

// =============================================================================
// Monthly Report
// =============================================================================

/// Builds the monthly report bundle for a `YYYY-MM` key.
pub fn monthly_report(state: &AppState, month: &str) -> Result<MonthlyReport, ReportError> {
    let (start, end) = parse_month(month)?;

    let in_month = |p: &&Purchase| p.purchased_at >= start && p.purchased_at < end;

    let month_purchases = || state.purchases.iter().filter(in_month);

    let mut forecast = SellOutForecast::default();
    for snack in &state.snacks {
        let stock = snack.stock.clamp_non_negative();
        let profit_per_unit = snack.profit_per_unit();
        let projected = profit_per_unit.mul_qty(stock);
        forecast.projected_profit_total += projected;
        forecast.stock_total += stock;
        forecast.rows.push(SellOutRow {
            snack_id: snack.id,
            name: snack.name.clone(),
            stock,
            profit_per_unit,
            projected_profit: projected,
        });
    }

    Ok(MonthlyReport {
        month: month.to_string(),
        summary: summarize(month_purchases()),
        billing_by_customer: fold_by_customer(month_purchases()),
        outstanding_by_customer: fold_by_customer(month_purchases().filter(|p| p.is_unsettled())),
        best_sellers: rank_best_sellers(fold_by_product(month_purchases())),
        sell_out_forecast: forecast,
    })
}

// =============================================================================
// Cumulative Report
// =============================================================================

/// All-time per-product rows, reconciled against each snack's `totalSold`
/// counter. When the counter exceeds the purchase detail, the gap is valued
/// at the snack's current prices and the row is flagged `estimated`.
pub fn cumulative_report(state: &AppState) -> CumulativeReport {
    let mut by_product = fold_by_product(state.purchases.iter());

    let mut rows: Vec<CumulativeRow> = Vec::with_capacity(state.snacks.len());

    for snack in &state.snacks {
        let detail = by_product.remove(&format!("id:{}", snack.id));
        let (detail_qty, detail_revenue, detail_cost) = match &detail {
            Some(d) => (d.qty, d.revenue, d.cost),
            None => (Qty::zero(), Money::zero(), Money::zero()),
        };

        let sold = snack.total_sold.max(detail_qty);
        let extra = Qty::from_hundredths(sold.hundredths() - detail_qty.hundredths());

        let revenue = detail_revenue + snack.sell_price.mul_qty(extra);
        let cost = detail_cost + snack.cost_price.mul_qty(extra);

        rows.push(CumulativeRow {
            snack_id: Some(snack.id),
            name: snack.name.clone(),
            sold,
            revenue,
            cost,
            profit: revenue - cost,
            estimated: extra.hundredths() > 0,
        });
    }

    // Purchase history for products no longer in the catalog.
    for orphan in by_product.into_values() {
        rows.push(CumulativeRow {
            snack_id: orphan.snack_id,
            name: orphan.name,
            sold: orphan.qty,
            revenue: orphan.revenue,
            cost: orphan.cost,
            profit: orphan.profit,
            estimated: false,
        });
    }

    rows.sort_by(|a, b| b.sold.cmp(&a.sold).then(b.revenue.cmp(&a.revenue)));

    let mut summary = ReportSummary::default();
    for row in &rows {
        summary.revenue += row.revenue;
        summary.cost += row.cost;
        summary.profit += row.profit;
    }
    summary.transactions = state.purchases.len();
    summary.margin_pct = margin_pct(summary.profit, summary.revenue);

    CumulativeReport { summary, rows }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::sanitize_state;
    use serde_json::json;

    fn fixture() -> AppState {
        sanitize_state(
            &json!({
                "snacks": [{"id": 1, "name": "มาม่า", "price": 7, "costPrice": 5, "stock": 48}],
                "customers": [{"name": "เอ", "shift": "A"}],
                "users": [{"id": 1, "displayName": "Boss", "role": "admin"}],
                "purchases": [{
                    "id": "p1", "customerName": "เอ", "snackId": 1, "snackName": "มาม่า",
                    "qty": 2, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"
                }]
            }),
            Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_parse_month() {
        let (start, end) = parse_month("2026-02").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());

        let (_, end) = parse_month("2026-12").unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        for bad in ["", "2026", "2026-13", "2026-00", "26-02", "2026-2", "abcd-ef"] {
            assert!(parse_month(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_monthly_scenario() {
        let report = monthly_report(&fixture(), "2026-02").unwrap();

        assert_eq!(report.summary.revenue, Money::from_f64(14.0));
        assert_eq!(report.summary.cost, Money::from_f64(10.0));
        assert_eq!(report.summary.profit, Money::from_f64(4.0));
        assert_eq!(report.summary.transactions, 1);

        let billing = &report.billing_by_customer["เอ"];
        assert_eq!(billing.total, Money::from_f64(14.0));
        assert_eq!(billing.count, Qty::from_f64(2.0));

        // Unsettled, so outstanding matches billing.
        assert_eq!(report.outstanding_by_customer["เอ"].total, Money::from_f64(14.0));

        assert_eq!(report.best_sellers[0].name, "มาม่า");
        assert_eq!(report.best_sellers[0].qty, Qty::from_f64(2.0));
    }

    #[test]
    fn test_month_window_is_half_open() {
        let mut state = fixture();
        // Exactly the next month's midnight: excluded from February.
        state.purchases[0].purchased_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let feb = monthly_report(&state, "2026-02").unwrap();
        assert_eq!(feb.summary.transactions, 0);
        let mar = monthly_report(&state, "2026-03").unwrap();
        assert_eq!(mar.summary.transactions, 1);

        // The month's own midnight: included.
        state.purchases[0].purchased_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let feb = monthly_report(&state, "2026-02").unwrap();
        assert_eq!(feb.summary.transactions, 1);
    }

    #[test]
    fn test_settled_purchases_leave_outstanding() {
        let mut state = fixture();
        state.purchases[0].settled_at = Some(Utc.with_ymd_and_hms(2026, 2, 9, 0, 0, 0).unwrap());
        let report = monthly_report(&state, "2026-02").unwrap();
        assert_eq!(report.billing_by_customer["เอ"].total, Money::from_f64(14.0));
        assert!(report.outstanding_by_customer.is_empty());
    }

    #[test]
    fn test_best_sellers_ordering() {
        let state = sanitize_state(
            &json!({"purchases": [
                {"id": "p1", "customerName": "x", "snackId": 1, "snackName": "a",
                 "qty": 1, "unitPrice": 100, "unitCost": 1, "date": "2026-02-01"},
                {"id": "p2", "customerName": "x", "snackId": 2, "snackName": "b",
                 "qty": 3, "unitPrice": 1, "unitCost": 1, "date": "2026-02-01"},
                {"id": "p3", "customerName": "x", "snackId": 3, "snackName": "c",
                 "qty": 3, "unitPrice": 2, "unitCost": 1, "date": "2026-02-01"}
            ]}),
            Utc::now(),
        );
        let report = monthly_report(&state, "2026-02").unwrap();
        // qty desc first, then revenue desc.
        let names: Vec<&str> = report.best_sellers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sell_out_forecast() {
        let report = monthly_report(&fixture(), "2026-02").unwrap();
        let forecast = &report.sell_out_forecast;
        assert_eq!(forecast.rows.len(), 1);
        // (7 - 5) × 48 = 96
        assert_eq!(forecast.rows[0].projected_profit, Money::from_f64(96.0));
        assert_eq!(forecast.projected_profit_total, Money::from_f64(96.0));
        assert_eq!(forecast.stock_total, Qty::from_f64(48.0));
    }

    #[test]
    fn test_margin_pct_zero_when_no_revenue() {
        let report = monthly_report(&AppState::default(), "2026-02").unwrap();
        assert_eq!(report.summary.margin_pct, 0.0);
    }

    #[test]
    fn test_cumulative_uses_purchase_detail() {
        let report = cumulative_report(&fixture());
        let row = &report.rows[0];
        assert_eq!(row.name, "มาม่า");
        assert_eq!(row.sold, Qty::from_f64(2.0));
        assert_eq!(row.revenue, Money::from_f64(14.0));
        assert!(!row.estimated);
    }

    #[test]
    fn test_cumulative_estimates_from_total_sold() {
        let mut state = fixture();
        // Counter says 10 sold; detail only covers 2. The gap of 8 is valued
        // at current prices.
        state.snacks[0].total_sold = Qty::from_f64(10.0);
        let report = cumulative_report(&state);
        let row = &report.rows[0];
        assert_eq!(row.sold, Qty::from_f64(10.0));
        assert!(row.estimated);
        // 14 + 8×7 = 70 revenue, 10 + 8×5 = 50 cost
        assert_eq!(row.revenue, Money::from_f64(70.0));
        assert_eq!(row.cost, Money::from_f64(50.0));
        assert_eq!(row.profit, Money::from_f64(20.0));
    }

    #[test]
    fn test_cumulative_keeps_orphaned_history() {
        let mut state = fixture();
        state.snacks.clear();
        let report = cumulative_report(&state);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].name, "มาม่า");
        assert!(!report.rows[0].estimated);
    }
}
