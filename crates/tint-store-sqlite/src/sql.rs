//! Rendering of [`ReadView`]s to SQL.
//!
//! Every query path goes through [`render`], so the SQL semantics of a view
//! live in one place and match [`ReadView::matches`] / [`ReadView::compare`].

use rusqlite::types::Value;
use tint_core::view::{OrderKey, ReadView, ViewFilter};

use crate::encode::encode_ms;

/// The tail of a `SELECT ... FROM records` statement and its parameters.
pub struct Rendered {
  pub clause: String,
  pub params: Vec<Value>,
}

fn filter_sql(filter: &ViewFilter, params: &mut Vec<Value>) -> &'static str {
  match filter {
    ViewFilter::All => "1",
    ViewFilter::VisitedAfter(t) => {
      params.push(Value::Integer(encode_ms(*t)));
      "visited_date > ?"
    }
    ViewFilter::Bookmarked => "bookmark = 1",
    ViewFilter::Visited => "visit_count > 0",
  }
}

fn order_sql(key: OrderKey) -> &'static str {
  match key {
    OrderKey::VisitCountDesc => "visit_count DESC",
    // SQLite sorts NULL lowest, so unvisited rows come last.
    OrderKey::VisitedDateDesc => "visited_date DESC",
    OrderKey::TitleAsc => "title COLLATE NOCASE ASC",
  }
}

fn to_sql_int(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

/// Render `view` as `WHERE … ORDER BY … LIMIT ? OFFSET ?`.
///
/// The row id is appended as the last sort key so that repeated windows over
/// the same view see the same order.
pub fn render(view: &ReadView) -> Rendered {
  let mut params = Vec::new();
  let filter = filter_sql(&view.filter, &mut params);

  let order = view
    .order
    .iter()
    .map(|key| order_sql(*key))
    .chain(std::iter::once("id ASC"))
    .collect::<Vec<_>>()
    .join(", ");

  // A negative LIMIT means no limit in SQLite.
  params.push(Value::Integer(view.limit.map_or(-1, to_sql_int)));
  params.push(Value::Integer(to_sql_int(view.offset)));

  Rendered {
    clause: format!(" WHERE {filter} ORDER BY {order} LIMIT ? OFFSET ?"),
    params,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Local;

  use super::*;

  #[test]
  fn history_view() {
    let r = render(&ReadView::history());
    assert_eq!(
      r.clause,
      " WHERE visit_count > 0 ORDER BY visited_date DESC, id ASC LIMIT ? OFFSET ?"
    );
    assert_eq!(r.params, vec![Value::Integer(-1), Value::Integer(0)]);
  }

  #[test]
  fn start_page_binds_threshold_then_window() {
    let r = render(&ReadView::start_page(Local::now(), 8).with_offset(2));
    assert!(r.clause.starts_with(" WHERE visited_date > ? ORDER BY visit_count DESC"));
    assert!(r.clause.contains("title COLLATE NOCASE ASC"));
    assert_eq!(r.params.len(), 3);
    assert_eq!(r.params[1..], [Value::Integer(8), Value::Integer(2)]);
  }
}
