use formulary::{Case, CaseExpr, Expr, compile};

#[test]
fn one_branch_with_else() {
    let e = compile("CASE WHEN [x] > 1 THEN 10 ELSE 0").unwrap();
    let expected = Case::new()
        .when(Expr::field("x").gt(Expr::int(1)), Expr::int(10))
        .otherwise(Expr::int(0));
    assert_eq!(e, expected);
}

#[test]
fn two_branches_in_declared_order() {
    let e = compile("CASE WHEN [x] > 1 THEN 10 CASE WHEN [x] > 2 THEN 20 ELSE 0").unwrap();
    match e {
        Expr::Case(CaseExpr {
            branches,
            otherwise,
        }) => {
            assert_eq!(
                branches,
                vec![
                    (Expr::field("x").gt(Expr::int(1)), Expr::int(10)),
                    (Expr::field("x").gt(Expr::int(2)), Expr::int(20)),
                ]
            );
            assert_eq!(otherwise, Some(Box::new(Expr::int(0))));
        }
        other => panic!("expected a CASE expression, got {:?}", other),
    }
}

#[test]
fn three_branches_without_else() {
    let e = compile(
        "CASE WHEN [tier] == 1 THEN [price] * 0.9 \
         CASE WHEN [tier] == 2 THEN [price] * 0.8 \
         CASE WHEN [tier] == 3 THEN [price] * 0.7",
    )
    .unwrap();
    let tier = || Expr::field("tier");
    let price = || Expr::field("price");
    let expected = Case::new()
        .when(tier().equal(Expr::int(1)), price() * Expr::float(0.9))
        .when(tier().equal(Expr::int(2)), price() * Expr::float(0.8))
        .when(tier().equal(Expr::int(3)), price() * Expr::float(0.7))
        .end();
    assert_eq!(e, expected);
}

#[test]
fn branch_values_and_else_are_full_expressions() {
    let e = compile("CASE WHEN [x] >= 0 THEN [x] * 2 ELSE 0 - [x]").unwrap();
    let expected = Case::new()
        .when(
            Expr::field("x").ge(Expr::int(0)),
            Expr::field("x") * Expr::int(2),
        )
        .otherwise(Expr::int(0) - Expr::field("x"));
    assert_eq!(e, expected);
}

#[test]
fn compiling_twice_is_structurally_equal() {
    let src = "CASE WHEN [x] > 1 THEN 10 CASE WHEN [x] > 2 THEN 20 ELSE 0";
    assert_eq!(compile(src).unwrap(), compile(src).unwrap());
}
