//! Stats command implementation

use anyhow::Result;

use crate::store::ChartStore;

pub fn run(store: &ChartStore) -> Result<()> {
    let stats = store.get_statistics();

    println!("Total charts:      {}", stats.total_charts);
    println!("This month:        {}", stats.charts_this_month);
    println!(
        "Success rate:      {:.1}% of {} YES/NO charts",
        stats.success_rate_percent, stats.total_judged_count
    );

    if !stats.per_category_counts.is_empty() {
        println!("\n{:<20} {}", "Category", "Charts");
        println!("{}", "-".repeat(30));
        for (category, count) in &stats.per_category_counts {
            println!("{:<20} {}", category, count);
        }
    }

    let notes = store.get_notebook_entries(None).len();
    println!("\nNotebook entries:  {}", notes);
    Ok(())
}
