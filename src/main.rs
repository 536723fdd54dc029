use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;

use group_slot_scheduler::domain::occupancy::occupancy_aggregator::{OccupancySummary, StatusTier};
use group_slot_scheduler::{generate_scheduler, logger};

#[derive(Parser)]
#[command(name = "group-slots")]
#[command(about = "Capacity and occupancy views for group training slots")]
struct Cli {
    /// Scheduler configuration (trainers, rooms, templates).
    #[arg(long, global = true, default_value = "data/config.json")]
    config: PathBuf,

    /// Recorded assignments and bookings.
    #[arg(long, global = true, default_value = "data/scenario.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-slot occupancy of one month.
    Occupancy {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Free seats in every template held on a date.
    Availability {
        #[arg(long)]
        date: NaiveDate,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let scheduler = generate_scheduler(&cli.config, &cli.data)
        .with_context(|| format!("loading {} and {}", cli.config.display(), cli.data.display()))?;

    match cli.command {
        Commands::Occupancy { year, month } => {
            let summary = scheduler.aggregator.aggregate_month(year, month)?;
            print_occupancy(&summary);
        }
        Commands::Availability { date } => {
            let availability = scheduler.manager.slot_availability(date)?;
            println!("{}", format!("Slots on {} ({})", date, date.format("%A")).bold());

            if availability.is_empty() {
                println!("  no templates on this weekday");
            }
            for slot in availability {
                let spots = format!("{}/{} free", slot.available_spots, slot.max_capacity);
                let spots = if slot.is_full { spots.red() } else { spots.green() };
                println!(
                    "  {} {} {} ({}) {}",
                    slot.template.group_identifier, slot.template.time, slot.template.room, slot.template.trainer, spots
                );
            }
        }
    }

    Ok(())
}

fn print_occupancy(summary: &OccupancySummary) {
    println!("{}", format!("Occupancy {} to {}", summary.from, summary.to).bold());

    for slot in &summary.slots {
        let ratio = format!("{}/{}", slot.occupancy, slot.capacity);
        let status = match slot.status {
            StatusTier::Free => format!("{} {}", ratio, slot.status).green(),
            StatusTier::Partial => format!("{} {}", ratio, slot.status).yellow(),
            StatusTier::Full if slot.is_over_capacity() => format!("{} over capacity", ratio).red().bold(),
            StatusTier::Full => format!("{} {}", ratio, slot.status).red(),
        };
        println!("  {} {}", slot.key, status);

        for record in &slot.records {
            println!("      {} [{}]", record.user_id(), record.origin());
        }
    }

    let over = summary.over_capacity();
    if !over.is_empty() {
        println!("{}", format!("{} slot(s) over capacity", over.len()).red());
    }
}
