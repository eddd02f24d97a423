//! Date-binned paging over an ordered history result set.
//!
//! A [`DateBinnedPager`] is built once per result set from the visit dates of
//! its rows, in result order (most recent first). It records how many rows
//! fall into each [`DateBin`] and then answers group/child addressing without
//! holding the rows themselves: a consumer asks for the absolute offset of a
//! child and fetches that window from the store.
//!
//! Only non-empty bins are exposed as groups. The pager never refetches; it
//! describes one snapshot and must be rebuilt when the result set changes.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, calendar};

/// Number of calendar bins.
pub const BIN_COUNT: usize = 5;

// ─── DateBin ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBin {
  Today,
  Yesterday,
  LastSevenDays,
  LastMonth,
  Older,
}

impl DateBin {
  pub const ALL: [DateBin; BIN_COUNT] = [
    DateBin::Today,
    DateBin::Yesterday,
    DateBin::LastSevenDays,
    DateBin::LastMonth,
    DateBin::Older,
  ];

  pub fn index(self) -> usize { self as usize }

  pub fn label(self) -> &'static str {
    match self {
      Self::Today => "Today",
      Self::Yesterday => "Yesterday",
      Self::LastSevenDays => "Last 7 days",
      Self::LastMonth => "Last month",
      Self::Older => "Older",
    }
  }
}

// ─── DateSorter ──────────────────────────────────────────────────────────────

/// Classifies visit dates into bins relative to a fixed "now".
#[derive(Debug, Clone)]
pub struct DateSorter {
  /// Lower bounds (exclusive) of every bin but the last: today's midnight,
  /// yesterday's, seven days back and one calendar month back.
  bounds: [DateTime<Utc>; BIN_COUNT - 1],
}

impl DateSorter {
  pub fn new(now: DateTime<Local>) -> Self {
    let bounds = [
      calendar::start_of_day(now),
      calendar::days_before(now, 1),
      calendar::days_before(now, 7),
      calendar::months_before(now, 1),
    ]
    .map(|b| b.with_timezone(&Utc));
    Self { bounds }
  }

  /// The bin a visit date falls into. Undated rows are `Older`.
  pub fn bin(&self, date: Option<DateTime<Utc>>) -> DateBin {
    let Some(date) = date else {
      return DateBin::Older;
    };
    self
      .bounds
      .iter()
      .position(|bound| date > *bound)
      .map_or(DateBin::Older, |i| DateBin::ALL[i])
  }
}

// ─── DateBinnedPager ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateBinnedPager {
  counts: [usize; BIN_COUNT],
  /// Number of non-empty bins.
  groups: usize,
}

impl DateBinnedPager {
  /// Scan the visit dates of a result set sorted by visit date, descending.
  ///
  /// The bin index never decreases during the scan. Once the last bin is
  /// reached every remaining row belongs to it and the scan stops.
  pub fn build<I>(dates: I, sorter: &DateSorter) -> Self
  where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
    I::IntoIter: ExactSizeIterator,
  {
    let mut counts = [0; BIN_COUNT];
    let mut groups = 0;
    let mut current: Option<usize> = None;

    let dates = dates.into_iter();
    let total = dates.len();

    for (position, date) in dates.enumerate() {
      let index = sorter.bin(date).index();
      let bin = match current {
        Some(c) if index <= c => c,
        _ => {
          groups += 1;
          if index == BIN_COUNT - 1 {
            counts[index] = total - position;
            break;
          }
          current = Some(index);
          index
        }
      };
      counts[bin] += 1;
    }

    Self { counts, groups }
  }

  /// Number of non-empty bins.
  pub fn group_count(&self) -> usize { self.groups }

  pub fn is_empty(&self) -> bool { self.groups == 0 }

  /// Total number of rows described.
  pub fn row_count(&self) -> usize { self.counts.iter().sum() }

  /// `Ok` when `group` addresses a non-empty bin.
  pub fn check_group(&self, group: usize) -> Result<()> {
    if group < self.groups {
      Ok(())
    } else {
      Err(Error::GroupOutOfRange { group, groups: self.groups })
    }
  }

  /// Translate a group position to its bin index, skipping empty bins.
  ///
  /// # Panics
  ///
  /// If `group` is not below [`BIN_COUNT`], or, when some bins are empty,
  /// not below [`Self::group_count`].
  fn bin_index(&self, group: usize) -> usize {
    assert!(group < BIN_COUNT, "group position {group} out of range");

    if self.groups == BIN_COUNT || self.groups == 0 {
      return group;
    }

    match self
      .counts
      .iter()
      .enumerate()
      .filter(|(_, count)| **count != 0)
      .nth(group)
    {
      Some((index, _)) => index,
      None => panic!(
        "group position {group} out of range ({} groups)",
        self.groups
      ),
    }
  }

  /// The bin shown by a group.
  pub fn bin(&self, group: usize) -> DateBin { DateBin::ALL[self.bin_index(group)] }

  pub fn child_count(&self, group: usize) -> usize {
    self.counts[self.bin_index(group)]
  }

  /// Absolute row offset of `child` within `group`.
  pub fn locate(&self, group: usize, child: usize) -> usize {
    let bin = self.bin_index(group);
    self.counts[..bin].iter().sum::<usize>() + child
  }

  /// `(group, bin, child count)` for every non-empty group, in order.
  pub fn groups(&self) -> impl Iterator<Item = (usize, DateBin, usize)> + '_ {
    DateBin::ALL
      .into_iter()
      .zip(self.counts)
      .filter(|(_, count)| *count != 0)
      .enumerate()
      .map(|(group, (bin, count))| (group, bin, count))
  }
}
