/// Basic Grid Example
///
/// This example demonstrates:
/// - Building a table engine over JSON records
/// - Searching, filtering and sorting
/// - Paging through the results
///
/// Run with `RUST_LOG=debug` to see every state transition.

use gridstate::{ColumnDescriptor, FilterSpec, SearchConfig, TableConfig, TableEngine};
use serde_json::{json, Value as JsonValue};

fn print_page(table: &TableEngine<JsonValue>) {
    let info = table.page_info();
    println!(
        "   page {}/{} (rows {}-{} of {})",
        info.current_page, info.total_pages, info.start_row, info.end_row, info.total_rows
    );
    for row in table.page_data() {
        println!(
            "   {:>2}  {:<8} {:<6} {}",
            row["id"],
            row["name"].as_str().unwrap_or(""),
            row["team"].as_str().unwrap_or(""),
            row["score"]
        );
    }
    println!();
}

fn main() -> gridstate::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== GridState Basic Grid Example ===\n");

    let data = vec![
        json!({"id": 1, "name": "Bob", "team": "red", "score": 42}),
        json!({"id": 2, "name": "ann", "team": "blue", "score": 87}),
        json!({"id": 3, "name": "Cara", "team": "red", "score": 65}),
        json!({"id": 4, "name": "dev", "team": "green", "score": null}),
        json!({"id": 5, "name": "Eli", "team": "blue", "score": 91}),
        json!({"id": 6, "name": "fay", "team": "green", "score": 12}),
        json!({"id": 7, "name": "Gus", "team": "red", "score": 77}),
    ];

    let columns = vec![
        ColumnDescriptor::new("id").searchable(false),
        ColumnDescriptor::new("name").with_header("Name"),
        ColumnDescriptor::new("team").with_header("Team"),
        ColumnDescriptor::new("score").with_header("Score").searchable(false),
    ];

    let config = TableConfig::default()
        .with_search(SearchConfig::keys(["name", "team"]))
        .with_page_size(3);
    let mut table = TableEngine::new(data, columns, config)?;

    println!("1. Initial page:");
    print_page(&table);

    println!("2. Sorted by name (ascending):");
    table.toggle_sort("name");
    print_page(&table);

    println!("3. Next page:");
    table.next_page();
    print_page(&table);

    println!("4. Score descending, missing scores last:");
    table.toggle_sort("score");
    table.toggle_sort("score");
    print_page(&table);

    println!("5. Only red and blue teams:");
    table.set_filter(FilterSpec::one_of("team", ["red", "blue"]));
    print_page(&table);

    println!("6. Searching for 'a':");
    table.set_search_query("a");
    print_page(&table);

    println!("7. Snapshot for the presentation layer:");
    println!("   {}", table.snapshot().to_json()?);

    Ok(())
}
