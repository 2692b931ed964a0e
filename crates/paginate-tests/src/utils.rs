use model::{
    core::value::Value,
    records::row::{FieldValue, RowData},
};
use paginate_core::{Direction, MemorySource, OrderTerm, Page, Paginator};
use tracing::info;

/// Hard stop for page walks so a pagination bug cannot loop forever.
pub const MAX_WALK_PAGES: usize = 64;

/// Builds an `items` row with a unique `id` and an arbitrary sort payload.
pub fn item(id: u64, fields: Vec<FieldValue>) -> RowData {
    let mut field_values = vec![FieldValue::new("id", Value::Uint(id))];
    field_values.extend(fields);
    RowData::new("items", field_values)
}

/// Reads the `id` column of every row.
pub fn ids(rows: &[RowData]) -> Vec<u64> {
    rows.iter()
        .map(|r| match r.get_value("id") {
            Value::Uint(id) => id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

fn paginator(
    rows: &[RowData],
    order: &[OrderTerm],
    page_size: usize,
) -> Paginator<MemorySource> {
    let source = MemorySource::new(rows.to_vec()).with_order(order.to_vec());
    Paginator::new(source).page_size(page_size)
}

/// Walks the dataset forward page by page until `has_next` is false. Every
/// step builds a fresh paginator, the way a client re-enters with the
/// previous response's end cursor.
pub fn walk_forward(rows: &[RowData], order: &[OrderTerm], page_size: usize) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    for _ in 0..MAX_WALK_PAGES {
        let mut paginator = paginator(rows, order, page_size);
        if let Some(token) = cursor.take() {
            paginator = paginator.cursor(token);
        }

        let page = paginator.page().expect("forward walk page").clone();
        info!(
            page = pages.len(),
            records = page.records.len(),
            has_next = page.has_next,
            "fetched forward page"
        );
        let done = !page.has_next;
        cursor = page.end_cursor.clone();
        pages.push(page);

        if done {
            return pages;
        }
    }

    panic!("forward walk did not terminate within {MAX_WALK_PAGES} pages");
}

/// Fetches a single backward page from the given cursor.
pub fn page_before(
    rows: &[RowData],
    order: &[OrderTerm],
    page_size: usize,
    cursor: &str,
) -> Page {
    let page = paginator(rows, order, page_size)
        .cursor(cursor)
        .direction(Direction::Backward)
        .page()
        .expect("backward page")
        .clone();
    info!(
        records = page.records.len(),
        has_previous = page.has_previous,
        "fetched backward page"
    );
    page
}
