//! Rule-expression engine for work-scope tags.
//!
//! Rules are small boolean predicates over a set of tag keys:
//!
//! ```text
//! scope.hasAll(["mangrove","open_data"]) && !scope.has("deprecated")
//! ```
//!
//! The crate tokenises and evaluates rule text ([`evaluate`], [`Rule`]),
//! breaks a verdict down clause by clause ([`explain`]), and synthesises rule
//! text from structured selections ([`build_expression`]). The catalog and
//! activity types describe the data rules are written against and run over.
//!
//! Nothing here performs I/O, and no state is shared between calls.

mod activity;
mod builder;
mod catalog;
mod errors;
mod explain;
mod expr;
mod tags;

pub use activity::{Activity, count_matches, kind_distribution, partition_matches, tag_frequency};
pub use builder::{
    SelectionMode, SelectionSet, TagSelection, build_all_of_expression, build_expression,
    extract_tag_keys,
};
pub use catalog::{Catalog, CatalogEntry, TagKind, TagStatus};
pub use errors::{
    CatalogError, LexError, ParseError, RuleError, SelectionModeError, TagKindError,
};
pub use explain::{ClauseDetail, Explanation, explain, try_explain, try_explain_with_limits};
pub use expr::{
    Atom, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH, Expr, Limits, Operator, Rule, Token, TokenKind,
    evaluate, evaluate_with_limits, tokenize, try_evaluate, validate,
};
pub use tags::TagSet;
