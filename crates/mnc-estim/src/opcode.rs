//! Estimator opcodes and their mapping from graph operator kinds.

use serde::{Deserialize, Serialize};

use mnc_core::graph::{BinaryKind, NaryKind, OpKind, ReorgKind};

/// Operations the sketch estimator understands. Division shares the
/// elementwise-multiply model (zero stays zero), subtraction the
/// elementwise-add model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpCode {
    MatMul,
    ElemMult,
    ElemPlus,
    CBind,
    RBind,
    Trans,
    Diag,
}

impl OpCode {
    pub fn is_unary(self) -> bool {
        matches!(self, OpCode::Trans | OpCode::Diag)
    }
}

/// Map a matrix operator kind to an estimator opcode, or `None` when the
/// operator has no sketch model (callers fall back to dimension-only
/// inference).
pub fn classify(kind: OpKind) -> Option<OpCode> {
    match kind {
        OpKind::MatMul => Some(OpCode::MatMul),
        OpKind::Binary(b) => match b {
            BinaryKind::Mult | BinaryKind::Div => Some(OpCode::ElemMult),
            BinaryKind::Plus | BinaryKind::Minus => Some(OpCode::ElemPlus),
            BinaryKind::CBind => Some(OpCode::CBind),
            BinaryKind::RBind => Some(OpCode::RBind),
            BinaryKind::Other => None,
        },
        OpKind::Reorg(r) => match r {
            ReorgKind::Trans => Some(OpCode::Trans),
            ReorgKind::Diag => Some(OpCode::Diag),
        },
        OpKind::Nary(n) => match n {
            NaryKind::CBind => Some(OpCode::CBind),
            NaryKind::RBind => Some(OpCode::RBind),
            NaryKind::Plus => Some(OpCode::ElemPlus),
        },
        _ => None,
    }
}
