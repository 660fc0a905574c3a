//! ra-core - Core library for Relalg
//!
//! This crate provides the scalar value and columnar table types, the
//! expression model, the operator-node IR with its column-set algebra, and the
//! interchange form shared by the SQL compiler and the in-memory evaluator.

pub mod error;
pub mod expr;
pub mod ops;
pub mod repr;
pub(crate) mod serde_helpers;
pub mod table;
pub mod value;

pub use error::{CoreError, CoreResult};
pub use expr::{
    call, col, if_else, lit, parse_expression, row_number, ExprContext, Expression,
    AGGREGATE_FUNCTIONS,
};
pub use ops::{
    ColumnSet, DropColumnsNode, ExtendNode, JoinType, NaturalJoinNode, Operator, OrderRowsNode,
    ProjectNode, RenameColumnsNode, RowOrder, SelectColumnsNode, SelectRowsNode,
    TableDescription, Window,
};
pub use repr::OpRepr;
pub use table::{compare_rows, Column, Table};
pub use value::Value;
