//! Show command implementation

use anyhow::Result;

use crate::store::ChartStore;

pub fn run(store: &ChartStore, id: i64, aspects: bool) -> Result<()> {
    let chart = match store.get_chart(id) {
        Some(c) => c,
        None => {
            println!("Chart {} not found.", id);
            return Ok(());
        }
    };

    println!("\n{}", "=".repeat(80));
    println!("Chart #{}: {}", chart.id, chart.question);
    println!(
        "Location: {} | Cast: {}",
        chart.location,
        chart.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Judgment: {} ({}% confidence) | Category: {}",
        chart.judgment, chart.confidence, chart.category
    );
    if !chart.tags.is_empty() {
        println!("Tags: {}", chart.tags.join(", "));
    }
    println!("{}", "=".repeat(80));

    if !chart.notes.trim().is_empty() {
        println!("\nNotes:\n{}", chart.notes);
    }

    let payload = &chart.chart_payload;
    if payload.is_empty() {
        println!("\nNo chart data stored for this chart.");
    } else {
        for key in ["ascendant", "midheaven"] {
            if let Some(angle) = payload.angle(key) {
                println!("\n{:<10} {:.2}°", key, angle);
            }
        }

        if !payload.houses.is_empty() {
            let cusps: Vec<String> = payload.houses.iter().map(|c| format!("{:.1}", c)).collect();
            println!("\nHouse cusps: {}", cusps.join(" "));
        }

        if !payload.planets.is_empty() {
            println!(
                "\n{:<10} {:<9} {:<12} {:<6} {:<8} {}",
                "Planet", "Longitude", "Sign", "House", "Dignity", "Solar"
            );
            println!("{}", "-".repeat(65));
            for (name, planet) in &payload.planets {
                let solar = planet
                    .solar_condition
                    .as_ref()
                    .filter(|s| !s.is_free())
                    .map(|s| s.condition.as_str())
                    .unwrap_or("-");
                println!(
                    "{:<10} {:<9} {:<12} {:<6} {:<8} {}",
                    format!("{}{}", name, if planet.retrograde { " R" } else { "" }),
                    format!("{:.2}", planet.longitude),
                    planet.sign,
                    planet.house,
                    planet.dignity_score,
                    solar,
                );
            }
        }

        if aspects && !payload.aspects.is_empty() {
            println!(
                "\n{:<10} {:<12} {:<10} {:<7} {}",
                "Planet", "Aspect", "Planet", "Orb", "Applying"
            );
            println!("{}", "-".repeat(50));
            for aspect in &payload.aspects {
                println!(
                    "{:<10} {:<12} {:<10} {:<7} {}",
                    aspect.planet1,
                    aspect.aspect_type,
                    aspect.planet2,
                    format!("{:.2}", aspect.orb),
                    if aspect.applying { "yes" } else { "no" },
                );
            }
        }
    }

    let notes = store.notes_for_chart(chart.id);
    if !notes.is_empty() {
        println!("\nNotebook entries:");
        for note in notes {
            println!("  [{}] {}", note.id, note.title);
        }
    }

    Ok(())
}
