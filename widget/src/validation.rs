//! Validation of normalized tag candidates against the owning collection.
//!
//! The rule order is a contract: callers surface the `Display` text of the
//! first failing rule, and each rule has a distinct user-visible message.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::options::TagEditorOptions;

/// Why a candidate tag was refused.
///
/// The `Display` output is the user-visible error message, verbatim. The
/// zh-TW localizations are noted on each variant for reference.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    /// 標籤不能為空格
    #[error("Tag cannot be blank")]
    Empty,
    /// 字數不能超過 N 個字
    #[error("Length cannot exceed {max_len} characters")]
    TooLong { max_len: NonZeroUsize },
    /// 最多只能添加 N 個標籤
    #[error("Can add at most {max_tags} tags")]
    LimitReached { max_tags: NonZeroUsize },
    /// 不能添加重複的標籤
    #[error("Cannot add a duplicate tag")]
    Duplicate,
}

/// Check a normalized candidate against the collection and options.
///
/// Rules are evaluated in this fixed order, first failure wins:
/// empty, too long, collection at capacity, duplicate. Deduplication is an
/// exact match on the normalized form, which makes it case-insensitive with
/// respect to the raw input.
pub fn validate(
    candidate: &str,
    tags: &[String],
    options: &TagEditorOptions,
) -> Result<(), RejectReason> {
    if candidate.is_empty() {
        return Err(RejectReason::Empty);
    }
    if candidate.chars().count() > options.max_len.get() {
        return Err(RejectReason::TooLong {
            max_len: options.max_len,
        });
    }
    if tags.len() >= options.max_tags.get() {
        return Err(RejectReason::LimitReached {
            max_tags: options.max_tags,
        });
    }
    if tags.iter().any(|tag| tag == candidate) {
        return Err(RejectReason::Duplicate);
    }
    Ok(())
}
