use crate::ast::Ast;
use crate::collect::collect_fields;
use uuid::Uuid;

/// A parsed formula with a unique identity, ready for interpretation.
///
/// The identity is minted at preparation time and follows the value through
/// clones. Preparing the same text twice yields two identities, so the
/// [`crate::Compiler`] cache never conflates separately parsed formulas.
#[derive(Clone, Debug)]
pub struct PreparedFormula {
    id: Uuid,
    ast: Ast,
    /// Referenced field names in left-to-right first-appearance order.
    fields: Vec<String>,
}

impl PreparedFormula {
    pub fn from_ast(ast: Ast) -> Self {
        let fields = collect_fields(&ast);
        Self {
            id: Uuid::new_v4(),
            ast,
            fields,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_ast(self) -> Ast {
        self.ast
    }
}
