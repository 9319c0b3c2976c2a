// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

use crate::error::GridError;

pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Zero-based page cursor plus page size. Every method that needs the page
/// count takes the number of rows that survived filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_index: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn with_page_size(page_size: usize) -> Result<Self, GridError> {
        validate_page_size(page_size)?;
        Ok(Self {
            page_index: 0,
            page_size,
        })
    }

    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size)
    }

    pub fn set_page_size(&mut self, page_size: usize, row_count: usize) -> Result<(), GridError> {
        validate_page_size(page_size)?;
        self.page_size = page_size;
        self.clamp(row_count);
        Ok(())
    }

    /// Cycles through [`PAGE_SIZE_OPTIONS`], wrapping at either end.
    pub fn step_page_size(&mut self, delta: isize, row_count: usize) {
        let current = PAGE_SIZE_OPTIONS
            .iter()
            .position(|size| *size == self.page_size)
            .unwrap_or(0) as isize;
        let len = PAGE_SIZE_OPTIONS.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.page_size = PAGE_SIZE_OPTIONS[next];
        self.clamp(row_count);
    }

    /// Moves to a one-based page number. Requests outside `[1, page_count]`
    /// are rejected and leave the cursor where it was.
    pub fn go_to_page(&mut self, requested: i64, row_count: usize) -> Result<(), GridError> {
        let page_count = self.page_count(row_count);
        let Some(page) = usize::try_from(requested)
            .ok()
            .filter(|page| (1..=page_count).contains(page))
        else {
            return Err(GridError::OutOfRangePage {
                requested,
                page_count,
            });
        };
        self.page_index = page - 1;
        Ok(())
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, row_count: usize) -> bool {
        self.page_index + 1 < self.page_count(row_count)
    }

    pub fn next(&mut self, row_count: usize) -> bool {
        if !self.can_next(row_count) {
            return false;
        }
        self.page_index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    pub fn first(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index = 0;
        true
    }

    pub fn last(&mut self, row_count: usize) -> bool {
        let last = self.page_count(row_count).saturating_sub(1);
        if self.page_index == last {
            return false;
        }
        self.page_index = last;
        true
    }

    pub fn reset(&mut self) -> bool {
        self.first()
    }

    /// Pulls the cursor back into range after the row count shrank. Returns
    /// whether the cursor moved.
    pub fn clamp(&mut self, row_count: usize) -> bool {
        let clamped = clamp_index(self.page_index, self.page_count(row_count));
        if clamped == self.page_index {
            return false;
        }
        self.page_index = clamped;
        true
    }

    /// Row range for the current page, clamped to `row_count`.
    pub fn range(&self, row_count: usize) -> Range<usize> {
        let index = clamp_index(self.page_index, self.page_count(row_count));
        let start = (index * self.page_size).min(row_count);
        let end = start.saturating_add(self.page_size).min(row_count);
        start..end
    }

    pub fn summary(&self, row_count: usize) -> String {
        let page_count = self.page_count(row_count);
        let index = clamp_index(self.page_index, page_count);
        format!("Page {} of {}", index + 1, page_count.max(1))
    }
}

pub fn validate_page_size(page_size: usize) -> Result<(), GridError> {
    if PAGE_SIZE_OPTIONS.contains(&page_size) {
        Ok(())
    } else {
        Err(GridError::InvalidPageSize(page_size))
    }
}

/// Parses the text of a "go to page" prompt. Any integer parses; range
/// checks happen in [`Pagination::go_to_page`].
pub fn parse_page_input(raw: &str) -> Result<i64, GridError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GridError::InvalidPageInput(raw.trim().to_owned()))
}

const fn clamp_index(index: usize, page_count: usize) -> usize {
    if page_count == 0 {
        0
    } else if index >= page_count {
        page_count - 1
    } else {
        index
    }
}
