#![allow(clippy::unwrap_used, clippy::expect_used)]

use access_security::UserSecurityContext;
use access_security::sql_literal;

#[test]
fn context_attributes_encode_as_literals() {
    let ctx = UserSecurityContext::builder()
        .user_id("u1")
        .dept_code("O'Brien")
        .accessible_customers(["C'1", "C2"])
        .build();

    assert_eq!(sql_literal::quote(ctx.user_id()), "'u1'");
    assert_eq!(sql_literal::quote_or_null(ctx.dept_code()), "'O''Brien'");
    assert_eq!(sql_literal::quote_or_null(ctx.region_code()), "NULL");
    assert_eq!(
        sql_literal::array(ctx.accessible_customers().unwrap()),
        "ARRAY['C''1','C2']"
    );
}
