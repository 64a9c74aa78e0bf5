//! Taxonomy listing

use anyhow::Result;
use cashewiss_core::Category;

pub fn cmd_categories() -> Result<()> {
    println!("📂 Categories");
    println!();

    for category in Category::ALL {
        println!("{}", category);
        let subs = category.subcategories();
        for (i, sub) in subs.iter().enumerate() {
            let branch = if i + 1 == subs.len() { "└──" } else { "├──" };
            println!("  {} {}", branch, sub);
        }
    }

    Ok(())
}
