use crate::ast::Ast;
use std::collections::HashSet;

/// Field names referenced by `ast`, deduplicated, in first-appearance order.
pub(crate) fn collect_fields(ast: &Ast) -> Vec<String> {
    fn walk(node: &Ast, seen: &mut HashSet<String>, out: &mut Vec<String>) {
        match node {
            Ast::Num(_) => {}
            Ast::Field(name) => {
                if seen.insert(name.clone()) {
                    out.push(name.clone());
                }
            }
            Ast::Arith(_, a, b) | Ast::Cmp(_, a, b) => {
                walk(a, seen, out);
                walk(b, seen, out);
            }
            Ast::Case {
                branches,
                otherwise,
            } => {
                for b in branches {
                    walk(&b.condition, seen, out);
                    walk(&b.value, seen, out);
                }
                if let Some(e) = otherwise {
                    walk(e, seen, out);
                }
            }
        }
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk(ast, &mut seen, &mut out);
    out
}
