//! Pagination orchestration.
//!
//! The paginator resolves the effective ordering, applies the boundary
//! predicate for the supplied cursor, over-fetches one row past the page
//! size to learn whether a further page exists, and emits boundary cursors
//! for the display-ordered page. Results are computed once on first access
//! and cached for the lifetime of the instance, which is single-owner and
//! request-scoped.

use crate::{
    boundary::boundary_predicate,
    cursor::Cursor,
    error::Result,
    order::{Direction, OrderSpec},
    source::DataSource,
};
use model::records::row::RowData;
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One bounded window of records, always in display order (the nominal
/// order-spec order) regardless of traversal direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<RowData>,
    pub has_next: bool,
    pub has_previous: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

pub struct Paginator<S: DataSource> {
    source: S,
    page_size: usize,
    cursor: Option<String>,
    traversal: Direction,
    id_field: String,
    page: Option<Page>,
    total: Option<u64>,
}

impl<S: DataSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Paginator {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
            traversal: Direction::Forward,
            id_field: "id".to_string(),
            page: None,
            total: None,
        }
    }

    /// Sets the page size. Clamped to at least one row.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resumes traversal from an opaque cursor token.
    pub fn cursor(mut self, token: impl Into<String>) -> Self {
        self.cursor = Some(token.into());
        self
    }

    pub fn direction(mut self, traversal: Direction) -> Self {
        self.traversal = traversal;
        self
    }

    /// Names the field guaranteed unique per record, used as the appended
    /// tie-break. Defaults to `"id"`.
    pub fn id_field(mut self, name: &str) -> Self {
        self.id_field = name.to_string();
        self
    }

    pub fn is_forward(&self) -> bool {
        self.traversal.is_forward()
    }

    /// The computed page. Runs the query on first access; later calls
    /// return the cached result without touching the source again.
    pub fn page(&mut self) -> Result<&Page> {
        let page = match self.page.take() {
            Some(page) => page,
            None => self.compute_page()?,
        };

        Ok(self.page.insert(page))
    }

    pub fn records(&mut self) -> Result<&[RowData]> {
        Ok(&self.page()?.records)
    }

    pub fn has_next(&mut self) -> Result<bool> {
        Ok(self.page()?.has_next)
    }

    pub fn has_previous(&mut self) -> Result<bool> {
        Ok(self.page()?.has_previous)
    }

    pub fn start_cursor(&mut self) -> Result<Option<String>> {
        Ok(self.page()?.start_cursor.clone())
    }

    pub fn end_cursor(&mut self) -> Result<Option<String>> {
        Ok(self.page()?.end_cursor.clone())
    }

    /// Total rows in the dataset, ignoring the cursor predicate and limit.
    /// One count query, memoized independently of the page.
    pub fn total(&mut self) -> Result<u64> {
        if let Some(total) = self.total {
            return Ok(total);
        }

        let total = self.source.count()?;
        self.total = Some(total);

        Ok(total)
    }

    fn compute_page(&mut self) -> Result<Page> {
        let spec = OrderSpec::normalize(&self.source.order(), &self.id_field)?;

        if let Some(token) = &self.cursor {
            let cursor = Cursor::decode(token, &spec)?;
            let predicate = boundary_predicate(&spec, &cursor, self.traversal);
            self.source.apply_filter(predicate);
        }

        self.source.apply_order(&spec, self.traversal);
        // Over-fetch: the one extra row, if present, proves a further page
        // exists in the traversal direction without a second query.
        self.source.limit(self.page_size + 1);

        let mut rows = self.source.fetch()?;
        let overflow = rows.len() > self.page_size;

        debug!(
            fetched = rows.len(),
            page_size = self.page_size,
            forward = self.traversal.is_forward(),
            "page computed"
        );

        rows.truncate(self.page_size);
        if !self.traversal.is_forward() {
            // Backward fetch ran in reverse; restore display order.
            rows.reverse();
        }

        let (has_next, has_previous) = match self.traversal {
            Direction::Forward => (overflow, self.cursor.is_some()),
            // Backward traversal stepped back from a known position, so
            // content ahead of the cursor is assumed to exist. Mirrors the
            // forward side, where has_previous is true merely because a
            // cursor was supplied.
            Direction::Backward => (true, overflow),
        };

        let start_cursor = rows.first().map(|row| Cursor::for_row(row, &spec).encode());
        let end_cursor = rows.last().map(|row| Cursor::for_row(row, &spec).encode());

        Ok(Page {
            records: rows,
            has_next,
            has_previous,
            start_cursor,
            end_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Paginator;
    use crate::{
        error::PageError,
        memory::MemorySource,
        order::{Direction, OrderTerm},
    };
    use model::{
        core::value::Value,
        records::row::{FieldValue, RowData},
    };
    use query_builder::ast::common::OrderDir;

    fn item(display_index: i64, id: u64) -> RowData {
        RowData::new(
            "items",
            vec![
                FieldValue::new("id", Value::Uint(id)),
                FieldValue::new("display_index", Value::Int(display_index)),
            ],
        )
    }

    /// Six rows, display_index 5..0, ids 10..15.
    fn dataset() -> MemorySource {
        let rows = (0..6).map(|i| item(5 - i, 10 + i as u64)).collect();
        MemorySource::new(rows).with_order(vec![OrderTerm::FieldDir(
            "display_index".to_string(),
            OrderDir::Desc,
        )])
    }

    fn indexes(rows: &[RowData]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.get_value("display_index") {
                Value::Int(i) => i,
                other => panic!("unexpected display_index {other:?}"),
            })
            .collect()
    }

    #[test]
    fn first_page_without_cursor() {
        let mut paginator = Paginator::new(dataset()).page_size(2);

        assert_eq!(indexes(paginator.records().unwrap()), vec![5, 4]);
        assert!(paginator.has_next().unwrap());
        assert!(!paginator.has_previous().unwrap());
        assert_eq!(paginator.total().unwrap(), 6);
    }

    #[test]
    fn end_cursor_decodes_to_the_documented_wire_format() {
        let mut paginator = Paginator::new(dataset()).page_size(2);
        let token = paginator.end_cursor().unwrap().unwrap();

        use base64::{Engine as _, engine::general_purpose::STANDARD};
        let body: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(&token).unwrap()).unwrap();

        assert_eq!(body, serde_json::json!([{"display_index": 4}, {"id": 11}]));
    }

    #[test]
    fn forward_walk_with_cursor_yields_the_next_window() {
        let mut first = Paginator::new(dataset()).page_size(2);
        let token = first.end_cursor().unwrap().unwrap();

        let mut second = Paginator::new(dataset()).page_size(2).cursor(token);
        assert_eq!(indexes(second.records().unwrap()), vec![3, 2]);
        assert!(second.has_next().unwrap());
        assert!(second.has_previous().unwrap());
    }

    #[test]
    fn last_page_reports_no_next() {
        let mut first = Paginator::new(dataset()).page_size(4);
        let token = first.end_cursor().unwrap().unwrap();

        let mut second = Paginator::new(dataset()).page_size(4).cursor(token);
        assert_eq!(indexes(second.records().unwrap()), vec![1, 0]);
        assert!(!second.has_next().unwrap());
    }

    #[test]
    fn backward_page_is_the_preceding_window_in_display_order() {
        let mut forward = Paginator::new(dataset()).page_size(2).cursor(
            Paginator::new(dataset())
                .page_size(2)
                .end_cursor()
                .unwrap()
                .unwrap(),
        );
        let start = forward.start_cursor().unwrap().unwrap();

        let mut backward = Paginator::new(dataset())
            .page_size(2)
            .cursor(start)
            .direction(Direction::Backward);

        assert_eq!(indexes(backward.records().unwrap()), vec![5, 4]);
        assert!(backward.has_next().unwrap());
        assert!(!backward.has_previous().unwrap());
        assert!(!backward.is_forward());
    }

    #[test]
    fn empty_dataset_yields_an_empty_page_without_cursors() {
        let source = MemorySource::new(vec![]);
        let mut paginator = Paginator::new(source).page_size(3);

        let page = paginator.page().unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.start_cursor, None);
        assert_eq!(page.end_cursor, None);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn invalid_order_fails_before_any_fetch() {
        let source = MemorySource::new(vec![item(1, 1)])
            .with_order(vec![OrderTerm::Clause("abs(display_index)".to_string())]);
        let mut paginator = Paginator::new(source);

        let err = paginator.records().unwrap_err();
        assert!(matches!(err, PageError::InvalidOrder(_)), "{err}");
    }

    #[test]
    fn mismatched_cursor_is_rejected() {
        // Token minted under [name asc, id asc], replayed against
        // [display_index desc, id asc].
        let other = MemorySource::new(vec![RowData::new(
            "items",
            vec![
                FieldValue::new("id", Value::Uint(1)),
                FieldValue::new("name", Value::String("a".to_string())),
            ],
        )])
        .with_order(vec![OrderTerm::Field("name".to_string())]);

        let token = Paginator::new(other)
            .page_size(1)
            .end_cursor()
            .unwrap()
            .unwrap();

        let mut paginator = Paginator::new(dataset()).cursor(token);
        let err = paginator.records().unwrap_err();
        assert!(matches!(err, PageError::InvalidCursor(_)), "{err}");
    }

    #[test]
    fn page_and_total_are_memoized() {
        let mut paginator = Paginator::new(dataset()).page_size(2);

        let first = paginator.page().unwrap().clone();
        let second = paginator.page().unwrap().clone();
        assert_eq!(first, second);

        assert_eq!(paginator.total().unwrap(), paginator.total().unwrap());
    }

    #[test]
    fn page_size_is_clamped_to_at_least_one() {
        let mut paginator = Paginator::new(dataset()).page_size(0);
        assert_eq!(paginator.records().unwrap().len(), 1);
    }
}
