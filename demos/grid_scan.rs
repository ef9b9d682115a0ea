//! Fills a grid with bounded random values from the thread-local generator,
//! reports the sum and the first minimum, then replaces zero cells with a
//! sentinel.
//!
//! Run with: cargo run --example grid_scan -- --rows 10 --cols 12 --limit 1000

#![allow(clippy::print_stdout)]

use clap::Parser;
use xoshiro_bounded::random_uniform;

#[derive(Parser)]
struct Opt {
    #[arg(short, long, default_value_t = 10)]
    rows: usize,
    #[arg(short, long, default_value_t = 12)]
    cols: usize,
    /// Exclusive upper bound for every cell.
    #[arg(short, long, default_value_t = 1000)]
    limit: u32,
    /// Value written over zero cells; defaults to the limit.
    #[arg(short, long)]
    sentinel: Option<u32>,
}

fn print_grid(grid: &[Vec<u32>]) {
    for row in grid {
        let line: String = row.iter().map(|cell| format!("{cell:5}")).collect();
        println!("{line}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .finish(),
    )?;

    let opt = Opt::parse();
    if opt.limit == 0 {
        return Err("limit must be at least 1".into());
    }
    let sentinel = opt.sentinel.unwrap_or(opt.limit);

    let mut grid: Vec<Vec<u32>> = (0..opt.rows)
        .map(|_| (0..opt.cols).map(|_| random_uniform(opt.limit)).collect())
        .collect();

    print_grid(&grid);

    let sum: u64 = grid.iter().flatten().map(|&cell| u64::from(cell)).sum();
    println!("sum: {sum}");

    // first minimum in row-major order
    let mut min: Option<(u32, usize, usize)> = None;
    for (r, row) in grid.iter().enumerate() {
        for (c, &cell) in row.iter().enumerate() {
            if min.is_none_or(|(best, _, _)| cell < best) {
                min = Some((cell, r, c));
            }
        }
    }
    if let Some((value, r, c)) = min {
        println!("min: {value} at [{r}][{c}]");
    }

    let mut replaced = 0usize;
    for cell in grid.iter_mut().flatten() {
        if *cell == 0 {
            *cell = sentinel;
            replaced += 1;
        }
    }
    tracing::info!(replaced, sentinel, "rewrote zero cells");

    println!();
    print_grid(&grid);
    Ok(())
}
