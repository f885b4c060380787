//! Operator sections: a bare operator used as a function value.
//!
//! `+`  → `function(__mira_olpar_1, __mira_olpar_2) return __mira_olpar_1 + __mira_olpar_2 end`
//! `-`  → `function(__mira_olpar_1) return -__mira_olpar_1 end`
//! `++` → `function(__mira_olpar_1) __mira_olpar_1 = __mira_olpar_1 + 1; return __mira_olpar_1 end`

use mira_syntax::cst::{OperatorSection, SectionOp};

use crate::translate::Translator;

pub fn section_param(index: u32) -> String {
    format!("__mira_olpar_{index}")
}

impl Translator<'_> {
    pub(crate) fn operator_section(&mut self, section: &OperatorSection) {
        let first = section_param(1);
        self.w.write("function(");
        match section.op {
            SectionOp::Unary(op) => {
                self.w.write(&first);
                self.w.write(") return ");
                self.unary_op(op);
                self.w.write(&first);
            }
            SectionOp::Step(op) => {
                self.w.write(&first);
                self.w.write(") ");
                self.w.write(&first);
                self.w.write(" = ");
                self.w.write(&first);
                self.binary_op(op.binary());
                self.w.write("1; return ");
                self.w.write(&first);
            }
            SectionOp::Binary(op) => {
                let second = section_param(2);
                self.w.write(&first);
                self.w.write(", ");
                self.w.write(&second);
                self.w.write(") return ");
                self.w.write(&first);
                self.binary_op(op);
                self.w.write(&second);
            }
        }
        self.w.write(" end");
    }
}
