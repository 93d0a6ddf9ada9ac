use std::sync::Arc;
use std::time::Instant;

use sheetgrid_lib::DataSession;
use sheetgrid_lib::SessionContext;
use sheetgrid_lib::model::Value;
use sheetgrid_lib::service::HttpPageSource;
use sheetgrid_lib::service::PageSource;
use sheetgrid_table::ViewportConfig;
use sheetgrid_table::VirtualTable;

use crate::args::BrowseArgs;
use crate::error::CliError;
use crate::serve::data_service;

pub async fn run(args: BrowseArgs, context: SessionContext) -> Result<(), CliError> {
    let source: Arc<dyn PageSource> = match &args.remote {
        Some(base) => Arc::new(HttpPageSource::new(base)?),
        None => Arc::new(data_service(&args.source)?),
    };

    let mut session = DataSession::new(context, source)?;
    session.type_filter(args.filter.as_str(), Instant::now());
    session.commit_filter();
    session.set_page(args.page);

    let started = Instant::now();
    let page = session.load_active().await?;
    log::debug!("loaded {} in {:?}", session.active(), started.elapsed());

    let config = ViewportConfig::default()
        .with_viewport_height(args.height)
        .with_row_height(args.row_height)
        .with_overscan(args.overscan);
    let mut table = VirtualTable::new(config);
    table.set_page(page);

    if let Some(column) = &args.sort {
        if table.toggle_sort(column).is_none() {
            log::warn!("unknown sort column {:?}", column);
            eprintln!("warning: no column named {:?}, showing page order", column);
        } else if args.desc {
            table.toggle_sort(column);
        }
    }
    table.set_scroll_offset(args.scroll);

    print!("{}", render(&table));
    Ok(())
}

/// Renders the visible window as tab-separated text with a summary line.
fn render(table: &VirtualTable) -> String {
    let mut out = String::new();
    let Some(page) = table.page() else {
        return out;
    };

    out.push_str(&format!(
        "page {} of {} ({} items)\n",
        page.current_page, page.total_pages, page.total_items
    ));
    if page.is_empty() {
        out.push_str("no matching rows\n");
        return out;
    }
    if table.is_empty() {
        out.push_str("no rows on this page\n");
        return out;
    }

    let window = table.visible();
    let range = window.range();
    out.push_str(&format!(
        "rows {}-{} of {} on this page\n",
        range.start + 1,
        range.end,
        table.len()
    ));
    out.push_str(&table.columns().join("\t"));
    out.push('\n');

    for row in &window.rows {
        let cells: Vec<String> = row.record.values().iter().map(cell_text).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetgrid_lib::model::Record;
    use sheetgrid_lib::page::select;

    fn table_of(records: &[Record], page: i64, filter: &str) -> VirtualTable {
        let mut table = VirtualTable::new(ViewportConfig::default().with_overscan(0));
        table.set_page(Arc::new(select(records, page, filter)));
        table
    }

    #[test]
    fn test_render_window() {
        let records: Vec<Record> = (0..3)
            .map(|i| {
                Record::new()
                    .set("Name", format!("Co {i}"))
                    .set("Domain", "Finance")
                    .set("Employees", if i == 1 { Value::Null } else { Value::from(i * 10) })
            })
            .collect();

        let text = render(&table_of(&records, 1, ""));
        assert_eq!(
            text,
            "page 1 of 1 (3 items)\n\
             rows 1-3 of 3 on this page\n\
             Name\tDomain\tEmployees\n\
             Co 0\tFinance\t0\n\
             Co 1\tFinance\t-\n\
             Co 2\tFinance\t20\n"
        );
    }

    #[test]
    fn test_render_no_match() {
        let records = vec![Record::new().set("Name", "Co").set("Domain", "Retail")];
        let text = render(&table_of(&records, 1, "finance"));
        assert_eq!(text, "page 1 of 1 (0 items)\nno matching rows\n");
    }

    #[test]
    fn test_render_page_past_end() {
        let records = vec![Record::new().set("Name", "Co").set("Domain", "Retail")];
        let text = render(&table_of(&records, 2, ""));
        assert_eq!(text, "page 2 of 1 (1 items)\nno rows on this page\n");
    }

    #[test]
    fn test_render_without_page() {
        assert!(render(&VirtualTable::default()).is_empty());
    }
}
