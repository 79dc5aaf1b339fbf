#![allow(clippy::unwrap_used, clippy::expect_used)]

use access_policy::{AccessPolicyConfig, Service};
use access_security::UserSecurityContext;

fn service() -> Service {
    Service::from_config(&AccessPolicyConfig::default()).unwrap()
}

#[test]
fn sales_rep_sees_own_orders_without_costs() {
    let svc = service();
    let rep = UserSecurityContext::builder()
        .user_id("u1")
        .role("sales_rep")
        .build();

    assert_eq!(
        svc.row_level_filter("sales_orders", &rep).as_deref(),
        Some("sales_rep_id = 'u1'")
    );
    assert!(svc.is_field_allowed("sales_orders", "amount_total", &rep));
    assert!(!svc.is_field_allowed("sales_orders", "cost_total", &rep));
}

#[test]
fn dept_manager_wildcard_is_overridden_by_denial() {
    let svc = service();
    let manager = UserSecurityContext::builder()
        .user_id("m1")
        .role("dept_manager")
        .dept_code("D1")
        .build();

    let rule = svc.resolve("sales_orders", &manager).unwrap();
    assert!(rule.allows_all_fields());
    assert!(!svc.is_field_allowed("sales_orders", "profit", &manager));
    assert!(svc.is_field_allowed("sales_orders", "status", &manager));
    assert_eq!(
        svc.row_level_filter("sales_orders", &manager).as_deref(),
        Some("dept_code = 'D1'")
    );
}

#[test]
fn two_manager_roles_or_their_row_filters() {
    let svc = service();
    let user = UserSecurityContext::builder()
        .user_id("m2")
        .roles(["dept_manager", "regional_manager"])
        .dept_code("D1")
        .region_code("R2")
        .build();

    assert_eq!(
        svc.row_level_filter("sales_orders", &user).as_deref(),
        Some("(dept_code = 'D1') OR (region_code = 'R2')")
    );
}

#[test]
fn quotes_in_user_attributes_are_escaped() {
    let svc = service();
    let user = UserSecurityContext::builder()
        .user_id("m3")
        .role("dept_manager")
        .dept_code("O'Brien")
        .build();

    let filter = svc.row_level_filter("customers", &user).unwrap();
    assert_eq!(filter, "dept_code = 'O''Brien'");
    assert!(!filter.contains("'O'B"));
}

#[test]
fn unknown_role_resolves_to_nothing() {
    let svc = service();
    let user = UserSecurityContext::builder()
        .user_id("x")
        .role("no_such_role")
        .build();

    for table in ["sales_orders", "customers", "payroll"] {
        assert!(svc.resolve(table, &user).is_none());
        assert!(!svc.can_access_table(table, &user));
        assert!(svc.row_level_filter(table, &user).is_none());
        assert!(svc.visible_columns(table, &user).is_empty());
    }
}

#[test]
fn admin_flag_bypasses_roles() {
    let svc = service();
    let admin = UserSecurityContext::builder()
        .user_id("root")
        .admin(true)
        .build();

    let rule = svc.resolve("anything", &admin).unwrap();
    assert!(rule.allows_all_fields());
    assert!(rule.denied_fields().is_empty());
    assert!(svc.row_level_filter("sales_orders", &admin).is_none());
    assert!(svc.is_field_allowed("sales_orders", "profit", &admin));
}

#[test]
fn adding_a_role_never_narrows_access() {
    let svc = service();
    let rep = UserSecurityContext::builder()
        .user_id("u1")
        .role("sales_rep")
        .dept_code("D1")
        .build();
    let rep_and_manager = UserSecurityContext::builder()
        .user_id("u1")
        .roles(["sales_rep", "dept_manager"])
        .dept_code("D1")
        .build();

    let narrow = svc.resolve("sales_orders", &rep).unwrap();
    let wide = svc.resolve("sales_orders", &rep_and_manager).unwrap();
    for field in narrow.allowed_fields() {
        assert!(wide.is_field_visible(field));
    }
    assert_eq!(
        svc.row_level_filter("sales_orders", &rep_and_manager).as_deref(),
        Some("(dept_code = 'D1') OR (sales_rep_id = 'u1')")
    );
}

#[test]
fn permissive_merge_lifts_denial_not_shared_by_every_role() {
    let svc = service();
    let user = UserSecurityContext::builder()
        .user_id("u9")
        .roles(["dept_manager", "owner"])
        .dept_code("D1")
        .build();

    assert!(svc.is_field_allowed("sales_orders", "profit", &user));
    assert!(svc.row_level_filter("sales_orders", &user).is_none());
}

#[test]
fn filter_allowed_fields_keeps_request_order() {
    let svc = service();
    let rep = UserSecurityContext::builder()
        .user_id("u1")
        .role("sales_rep")
        .build();
    let requested: Vec<String> = ["status", "profit", "so_no", "cost_total", "created_at"]
        .into_iter()
        .map(str::to_owned)
        .collect();

    assert_eq!(
        svc.filter_allowed_fields("sales_orders", &requested, &rep),
        vec!["status", "so_no", "created_at"]
    );
}

#[test]
fn report_viewer_array_filter() {
    let svc = service();
    let viewer = UserSecurityContext::builder()
        .user_id("v1")
        .role("report_viewer")
        .accessible_depts(["D1", "D2"])
        .build();

    assert_eq!(
        svc.row_level_filter("sales_orders", &viewer).as_deref(),
        Some("dept_code = ANY(ARRAY['D1','D2'])")
    );
    assert!(!svc.can_access_table("customers", &viewer));
}

#[test]
fn resolution_is_deterministic_across_threads() {
    let svc = std::sync::Arc::new(service());
    let user = UserSecurityContext::builder()
        .user_id("m2")
        .roles(["regional_manager", "dept_manager"])
        .dept_code("D1")
        .region_code("R2")
        .build();
    let expected = svc.resolve("sales_invoices", &user);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = std::sync::Arc::clone(&svc);
            let user = user.clone();
            std::thread::spawn(move || svc.resolve("sales_invoices", &user))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn resolved_rule_serializes_with_template_text() {
    let svc = service();
    let manager = UserSecurityContext::builder()
        .user_id("m1")
        .role("dept_manager")
        .dept_code("D1")
        .build();

    let rule = svc.resolve("sales_orders", &manager).unwrap();
    assert_eq!(
        serde_json::to_value(&rule).unwrap(),
        serde_json::json!({
            "allowed_fields": ["*"],
            "denied_fields": ["cost_total", "margin", "profit"],
            "row_filter": "dept_code = @userDept",
        })
    );
}
