//! Writes a synthetic ÄKTA export (UTF-16 LE, tab-delimited) for trying the
//! main binary without instrument data.

use std::path::PathBuf;

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Deterministic baseline noise: splitmix64 draws, summed twelve at a time
/// for a roughly normal sample.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self, std_dev: f64) -> f64 {
        let sum: f64 = (0..12).map(|_| self.uniform()).sum();
        (sum - 6.0) * std_dev
    }
}

/// One x/y column pair of the export.
struct Block {
    header: &'static str,
    x_unit: &'static str,
    y_unit: &'static str,
    x: Vec<String>,
    y: Vec<String>,
}

impl Block {
    fn numeric(header: &'static str, y_unit: &'static str, points: &[(f64, f64)]) -> Self {
        Block {
            header,
            x_unit: "ml",
            y_unit,
            x: points.iter().map(|(x, _)| format!("{x:.3}")).collect(),
            y: points.iter().map(|(_, y)| format!("{y:.3}")).collect(),
        }
    }

    fn text(header: &'static str, entries: &[(f64, String)]) -> Self {
        Block {
            header,
            x_unit: "ml",
            y_unit: "",
            x: entries.iter().map(|(x, _)| format!("{x:.2}")).collect(),
            y: entries.iter().map(|(_, t)| t.clone()).collect(),
        }
    }
}

const ELUTION_START: f64 = 20.0;
const FRACTION_WIDTH: f64 = 1.0;

fn main() -> Result<()> {
    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_export.csv"));
    let mut noise = Noise(42);

    // 0 → 50 mL, one point every 0.05 mL
    let volumes: Vec<f64> = (0..=1000).map(|i| i as f64 * 0.05).collect();

    let uv: Vec<(f64, f64)> = volumes
        .iter()
        .map(|&v| {
            let signal = gaussian(v, 3.0, 0.8, 1200.0)
                + gaussian(v, 27.0, 1.5, 450.0)
                + gaussian(v, 31.0, 1.0, 180.0);
            (v, signal + noise.normal(1.5))
        })
        .collect();
    let uv260: Vec<(f64, f64)> = uv.iter().map(|&(v, a)| (v, a * 0.55)).collect();
    let conc_b: Vec<(f64, f64)> = volumes
        .iter()
        .map(|&v| (v, ((v - ELUTION_START) * 5.0).clamp(0.0, 100.0)))
        .collect();
    let cond: Vec<(f64, f64)> = conc_b.iter().map(|&(v, b)| (v, 2.0 + b * 0.8)).collect();

    let run_log = vec![
        (0.0, "Method Run".to_string()),
        (0.5, "Sample injection".to_string()),
        (8.0, "Column wash".to_string()),
        (ELUTION_START, "Elution".to_string()),
        (45.0, "End of method".to_string()),
    ];

    let mut fractions = Vec::new();
    let mut position = ELUTION_START;
    let mut n = 1;
    while position < 40.0 {
        let row = (b'A' + ((n - 1) / 12) as u8) as char;
        fractions.push((position, format!("1.{row}.{}", (n - 1) % 12 + 1)));
        position += FRACTION_WIDTH;
        n += 1;
    }
    fractions.push((position, "Waste".to_string()));

    // vial fills for 0.8 mL, collector moves for 0.2 mL
    let digital: Vec<(f64, f64)> = volumes
        .iter()
        .map(|&v| {
            let phase = (v - ELUTION_START).rem_euclid(FRACTION_WIDTH);
            let high = (ELUTION_START..40.0).contains(&v) && phase < 0.8;
            (v, if high { 1.0 } else { 0.0 })
        })
        .collect();

    let blocks = [
        Block::numeric("UV 1_280", "mAU", &uv),
        Block::numeric("UV 2_260", "mAU", &uv260),
        Block::numeric("Cond", "mS/cm", &cond),
        Block::numeric("Conc B", "%", &conc_b),
        Block::text("Fraction", &fractions),
        Block::text("Run Log", &run_log),
        Block::numeric("Digital in 1", "", &digital),
    ];

    let n_rows = blocks.iter().map(|b| b.x.len()).max().unwrap_or(0);
    let mut text = String::new();
    let title: Vec<&str> = blocks.iter().flat_map(|_| ["Chrom.1", ""]).collect();
    text.push_str(&title.join("\t"));
    text.push_str("\r\n");
    let headers: Vec<&str> = blocks.iter().flat_map(|b| [b.header, ""]).collect();
    text.push_str(&headers.join("\t"));
    text.push_str("\r\n");
    let units: Vec<&str> = blocks.iter().flat_map(|b| [b.x_unit, b.y_unit]).collect();
    text.push_str(&units.join("\t"));
    text.push_str("\r\n");
    for i in 0..n_rows {
        let cells: Vec<&str> = blocks
            .iter()
            .flat_map(|b| {
                [
                    b.x.get(i).map_or("", String::as_str),
                    b.y.get(i).map_or("", String::as_str),
                ]
            })
            .collect();
        text.push_str(&cells.join("\t"));
        text.push_str("\r\n");
    }

    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    std::fs::write(&output_path, bytes)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} rows x {} channels to {}",
        n_rows,
        blocks.len(),
        output_path.display()
    );
    Ok(())
}
