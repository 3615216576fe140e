// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Span-based source edits

use crate::analyzer::TextRange;
use std::borrow::Cow;

/// A set of non-overlapping replacements applied in one pass
#[derive(Debug, Default)]
pub struct TextEdits {
    edits: Vec<(TextRange, String)>,
}

impl TextEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `range` with `text`
    pub fn replace(&mut self, range: TextRange, text: impl Into<String>) {
        self.edits.push((range, text.into()));
    }

    /// Delete `range`
    pub fn remove(&mut self, range: TextRange) {
        self.replace(range, String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Apply every edit to `source`.
    ///
    /// Borrows the source untouched when there is nothing to do. An edit that
    /// overlaps an earlier one is dropped.
    pub fn apply(mut self, source: &str) -> Cow<'_, str> {
        if self.edits.is_empty() {
            return Cow::Borrowed(source);
        }

        self.edits.sort_by_key(|(range, _)| (range.start, range.end));

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for (range, text) in &self.edits {
            if range.start < cursor || range.end > source.len() {
                continue;
            }
            out.push_str(&source[cursor..range.start]);
            out.push_str(text);
            cursor = range.end;
        }
        out.push_str(&source[cursor..]);

        Cow::Owned(out)
    }
}
