//! Built-in role policies and table metadata for the sales data API.

use std::collections::BTreeMap;

use access_policy_sdk::WILDCARD;

use crate::config::{RolePolicyConfig, TableRuleConfig, TableSchemaConfig};

const SALES_ORDERS: &str = "sales_orders";
const DELIVERY_NOTES: &str = "delivery_notes";
const SALES_INVOICES: &str = "sales_invoices";
const CUSTOMERS: &str = "customers";

fn rule(allowed: &[&str], denied: &[&str], row_filter: Option<&str>) -> TableRuleConfig {
    TableRuleConfig {
        allowed_fields: allowed.iter().map(|s| (*s).to_owned()).collect(),
        denied_fields: denied.iter().map(|s| (*s).to_owned()).collect(),
        row_filter: row_filter.map(str::to_owned),
    }
}

fn role(tables: Vec<(&str, TableRuleConfig)>) -> RolePolicyConfig {
    RolePolicyConfig {
        tables: tables
            .into_iter()
            .map(|(table, rule)| (table.to_owned(), rule))
            .collect(),
    }
}

/// Every table, every row.
fn unrestricted_role() -> RolePolicyConfig {
    role(vec![(WILDCARD, rule(&[WILDCARD], &[], None))])
}

/// Every column except the financial figures, rows scoped by `row_filter`.
fn manager_role(row_filter: &str) -> RolePolicyConfig {
    role(vec![
        (
            SALES_ORDERS,
            rule(
                &[WILDCARD],
                &["cost_total", "profit", "margin"],
                Some(row_filter),
            ),
        ),
        (DELIVERY_NOTES, rule(&[WILDCARD], &[], Some(row_filter))),
        (
            SALES_INVOICES,
            rule(&[WILDCARD], &["cost_total", "profit"], Some(row_filter)),
        ),
        (CUSTOMERS, rule(&[WILDCARD], &[], Some(row_filter))),
    ])
}

fn sales_rep_role() -> RolePolicyConfig {
    let own = Some("sales_rep_id = @userId");
    role(vec![
        (
            SALES_ORDERS,
            rule(
                &[
                    "so_no",
                    "customer_name",
                    "order_date",
                    "delivery_date",
                    "amount_total",
                    "status",
                    "created_at",
                ],
                &[],
                own,
            ),
        ),
        (
            DELIVERY_NOTES,
            rule(
                &[
                    "delivery_no",
                    "so_no",
                    "customer_name",
                    "delivery_date",
                    "status",
                    "shipped_at",
                    "created_at",
                ],
                &[],
                own,
            ),
        ),
        (
            SALES_INVOICES,
            rule(
                &[
                    "invoice_no",
                    "customer_name",
                    "invoice_date",
                    "due_date",
                    "amount_total",
                    "status",
                    "created_at",
                ],
                &[],
                own,
            ),
        ),
        (
            CUSTOMERS,
            rule(
                &["partner_code", "name", "created_at"],
                &[],
                Some("assigned_rep_id = @userId"),
            ),
        ),
    ])
}

fn report_viewer_role() -> RolePolicyConfig {
    role(vec![(
        SALES_ORDERS,
        rule(
            &["order_date", "amount_total", "status", "region_code", "dept_code"],
            &[],
            Some("dept_code = ANY(@accessibleDepts)"),
        ),
    )])
}

/// The built-in role policies.
///
/// `admin` and `owner` see everything; managers see their department or
/// region without cost and profit figures; sales reps see their own records
/// through a narrow column list; report viewers see a few aggregate-friendly
/// columns of the departments assigned to them.
#[must_use]
pub fn default_policies() -> BTreeMap<String, RolePolicyConfig> {
    BTreeMap::from([
        ("admin".to_owned(), unrestricted_role()),
        ("owner".to_owned(), unrestricted_role()),
        ("dept_manager".to_owned(), manager_role("dept_code = @userDept")),
        (
            "regional_manager".to_owned(),
            manager_role("region_code = @userRegion"),
        ),
        ("sales_rep".to_owned(), sales_rep_role()),
        ("report_viewer".to_owned(), report_viewer_role()),
    ])
}

fn table(columns: &[&str], sensitive: &[&str]) -> TableSchemaConfig {
    TableSchemaConfig {
        columns: columns.iter().map(|s| (*s).to_owned()).collect(),
        sensitive_columns: sensitive.iter().map(|s| (*s).to_owned()).collect(),
    }
}

/// Columns of the built-in tables, with their sensitive columns.
#[must_use]
pub fn default_schema() -> BTreeMap<String, TableSchemaConfig> {
    BTreeMap::from([
        (
            SALES_ORDERS.to_owned(),
            table(
                &[
                    "id",
                    "so_no",
                    "partner_code",
                    "customer_name",
                    "order_date",
                    "delivery_date",
                    "amount_total",
                    "status",
                    "currency",
                    "sales_rep_id",
                    "dept_code",
                    "region_code",
                    "created_at",
                ],
                &["cost_total", "profit", "margin"],
            ),
        ),
        (
            DELIVERY_NOTES.to_owned(),
            table(
                &[
                    "id",
                    "delivery_no",
                    "so_no",
                    "customer_code",
                    "customer_name",
                    "delivery_date",
                    "status",
                    "shipped_at",
                    "sales_rep_id",
                    "dept_code",
                    "region_code",
                    "created_at",
                ],
                &[],
            ),
        ),
        (
            SALES_INVOICES.to_owned(),
            table(
                &[
                    "id",
                    "invoice_no",
                    "customer_code",
                    "customer_name",
                    "invoice_date",
                    "due_date",
                    "amount_total",
                    "status",
                    "sales_rep_id",
                    "dept_code",
                    "region_code",
                    "created_at",
                ],
                &["cost_total", "profit"],
            ),
        ),
        (
            CUSTOMERS.to_owned(),
            table(
                &[
                    "id",
                    "partner_code",
                    "name",
                    "region_code",
                    "assigned_rep_id",
                    "dept_code",
                    "created_at",
                ],
                &[],
            ),
        ),
    ])
}
