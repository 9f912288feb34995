#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

//! Measures how far entries sit from their home slot as the table fills up, before and
//! after removing half of them, and plots the results.

use std::error::Error;

use plotters::prelude::*;
use probemap::{LinearHashMap, ProbeStats};
use rand::{Rng, seq::SliceRandom};

/// Slot count of every measured table; it never grows during the experiment
const TABLE_SIZE: usize = 1 << 16;
/// Number of load factors sampled between `MIN_LOAD` and `MAX_LOAD`
const NUM_LOAD_FACTORS: usize = 9;
/// Lowest sampled load factor
const MIN_LOAD: f64 = 0.1;
/// Highest sampled load factor
const MAX_LOAD: f64 = 0.9;
/// Keeps the table from growing below `MAX_LOAD`
const LOAD_FACTOR_THRESHOLD: usize = 95;

/// Table states that are measured at each load factor
const PHASES: [&str; 2] = ["After inserts", "After removing half"];

/// Chart styling
const FONT_FAMILY: &str = "sans-serif";
/// Caption font size
const TITLE_SIZE: i32 = 30;
/// Axis description font size
const TEXT_SIZE: i32 = 16;
/// Width of plotted lines
const LINE_WIDTH: u32 = 2;
/// Radius of point markers
const MARKER_SIZE: i32 = 4;

/// Fills a fresh table with `keys`, then removes a random half of them.
///
/// Returns the displacement statistics taken after each phase.
fn measure<R: Rng + ?Sized>(
    keys: &[u64],
    rng: &mut R,
) -> Result<[ProbeStats; 2], Box<dyn Error>> {
    let mut table = LinearHashMap::with_capacity(TABLE_SIZE);
    table.set_load_factor_threshold(LOAD_FACTOR_THRESHOLD);

    for &key in keys {
        table.insert(key, key);
    }
    let filled = table.probe_stats();

    let mut doomed = keys.to_vec();
    doomed.shuffle(rng);
    for key in doomed.iter().take(keys.len() / 2) {
        table.remove(key)?;
    }
    let thinned = table.probe_stats();

    if table.capacity() != TABLE_SIZE {
        return Err(format!("table grew to {} slots", table.capacity()).into());
    }

    Ok([filled, thinned])
}

/// Draws one line per phase against the sampled load factors into an SVG file
fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    load_factors: &[f64],
    series: &[Vec<f64>],
) -> Result<(), Box<dyn Error>> {
    let colors = [
        RGBColor(220, 50, 50), // Red
        RGBColor(50, 90, 220), // Blue
    ];

    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series.iter().flatten().fold(1.0_f64, |max, &y| max.max(y)) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, TITLE_SIZE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(MIN_LOAD..MAX_LOAD, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_labels(NUM_LOAD_FACTORS)
        .x_label_formatter(&|x| format!("{x:.1}"))
        .x_desc("Load Factor Before Removal")
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, TEXT_SIZE))
        .draw()?;

    for ((phase, values), color) in PHASES.iter().zip(series).zip(colors.iter()) {
        let line_style = ShapeStyle::from(color).stroke_width(LINE_WIDTH);
        let points: Vec<(f64, f64)> =
            load_factors.iter().copied().zip(values.iter().copied()).collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), line_style))?
            .label(*phase)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            points.iter().map(|&point| Circle::new(point, MARKER_SIZE, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| MIN_LOAD + (MAX_LOAD - MIN_LOAD) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();
    let num_keys: Vec<usize> =
        load_factors.iter().map(|&load| (TABLE_SIZE as f64 * load) as usize).collect();

    println!("Load factors: {load_factors:?}");
    println!("Number of keys: {num_keys:?}");

    // Distinct random keys, shared by every run for a fair comparison
    let mut rng = rand::rng();
    let max_keys_needed = num_keys.iter().copied().max().unwrap_or_default();
    let mut keys: Vec<u64> = (0..max_keys_needed).map(|_| rng.random()).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.shuffle(&mut rng);

    let mut mean_displacement: Vec<Vec<f64>> = vec![Vec::new(); PHASES.len()];
    let mut worst_displacement: Vec<Vec<f64>> = vec![Vec::new(); PHASES.len()];

    for &n_keys in &num_keys {
        let sample = keys.get(..n_keys).unwrap_or(keys.as_slice());
        let phases = measure(sample, &mut rng)?;

        println!("Testing with {} keys", sample.len());
        for ((phase, stats), (means, worsts)) in PHASES
            .iter()
            .zip(phases.iter())
            .zip(mean_displacement.iter_mut().zip(worst_displacement.iter_mut()))
        {
            println!(
                "  {}: {} entries, mean displacement = {:.3}, worst = {}",
                phase,
                stats.entries,
                stats.mean_displacement(),
                stats.max_displacement
            );
            means.push(stats.mean_displacement());
            worsts.push(stats.max_displacement as f64);
        }
    }

    draw_chart(
        "mean_displacement.svg",
        "Mean Distance From Home Slot",
        "Mean displacement (slots)",
        &load_factors,
        &mean_displacement,
    )?;
    draw_chart(
        "worst_displacement.svg",
        "Worst Distance From Home Slot",
        "Worst displacement (slots)",
        &load_factors,
        &worst_displacement,
    )?;

    println!("Generated plot images: mean_displacement.svg, worst_displacement.svg");

    Ok(())
}
