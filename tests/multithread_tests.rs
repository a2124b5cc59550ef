use std::sync::Arc;
use std::thread;

use formulary::{Compiler, Expr, FormulaError};

#[test]
fn compiler_is_shared_across_threads() -> Result<(), FormulaError> {
    let compiler = Arc::new(Compiler::new());
    let prepared = Arc::new(compiler.prepare("CASE WHEN [x] > 1 THEN [y] ELSE 0")?);
    let expected = compiler.interpret(&prepared)?;

    let mut handles = vec![];

    for i in 0..8 {
        let compiler = Arc::clone(&compiler);
        let prepared = Arc::clone(&prepared);
        let expected = expected.clone();

        let handle = thread::spawn(move || {
            for _ in 0..50 {
                // cached path
                assert_eq!(compiler.interpret(&prepared).unwrap(), expected);
                // fresh compile per thread
                let own = compiler.compile(&format!("[f{i}] * {i}")).unwrap();
                assert_eq!(own, Expr::field(format!("f{i}")) * Expr::int(i));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(compiler.cache_len(), 1);
    Ok(())
}

#[test]
fn expressions_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expr>();
    assert_send_sync::<Compiler>();
    assert_send_sync::<formulary::PreparedFormula>();
}
