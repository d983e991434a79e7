//! Tree traversal and focusability queries.

pub mod focusability;
pub mod walker;

pub use focusability::{
    focusable_filter, is_focusable, is_tabbable, is_visible, matches_focusable_selector,
};
pub use walker::{
    filter_fn, ElementWalker, FilterResult, NodeFilter, ShadowTreeWalker, SharedFilter,
    TreeWalker, WhatToShow,
};
