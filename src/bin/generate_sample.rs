use std::io::Write;

use chrono::{Duration, NaiveDate};

const HZ_LOW: f64 = 88_000_000.0;
const HZ_HIGH: f64 = 108_000_000.0;
const BINS: usize = 2000;
const HOPS: usize = 4;
const SWEEPS: usize = 60;
const NOISE_DB: f64 = -72.0;

/// (centre Hz, width Hz, peak dB above noise, duty cycle 0..1)
const STATIONS: [(f64, f64, f64, f64); 5] = [
    (89_300_000.0, 60_000.0, 35.0, 1.0),
    (94_700_000.0, 80_000.0, 28.0, 1.0),
    (99_100_000.0, 40_000.0, 22.0, 0.3),
    (101_500_000.0, 60_000.0, 18.0, 1.0),
    (104_950_000.0, 30_000.0, 14.0, 0.5),
];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn sweep(freqs: &[f64], sweep_idx: usize, noise: &mut NoiseSource) -> Vec<f64> {
    freqs
        .iter()
        .map(|&f| {
            let signal: f64 = STATIONS
                .iter()
                .filter(|&&(_, _, _, duty)| {
                    // Bursty stations key up in runs of three sweeps.
                    duty >= 1.0 || ((sweep_idx / 3) as f64 * 0.618).fract() < duty
                })
                .map(|&(mu, width, amp, _)| gaussian(f, mu, width / 2.0, amp))
                .sum();
            NOISE_DB + signal + noise.jitter(1.5)
        })
        .collect()
}

/// Receiver noise: splitmix64 uniforms shaped by Box-Muller, with the
/// second normal of each pair kept for the next draw.
struct NoiseSource {
    counter: u64,
    spare: Option<f64>,
}

impl NoiseSource {
    fn seeded(seed: u64) -> Self {
        NoiseSource { counter: seed, spare: None }
    }

    /// Uniform in (0, 1].
    fn uniform(&mut self) -> f64 {
        self.counter = self.counter.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        ((z >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    /// Zero-mean normal sample with the given spread in dB.
    fn jitter(&mut self, sigma_db: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return sigma_db * z;
        }
        let radius = (-2.0 * self.uniform().ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        self.spare = Some(radius * angle.sin());
        sigma_db * radius * angle.cos()
    }
}

fn main() {
    let mut noise = NoiseSource::seeded(42);

    let hz_per_bin = (HZ_HIGH - HZ_LOW) / BINS as f64;
    let bins_per_hop = BINS / HOPS;
    let freqs: Vec<f64> = (0..BINS).map(|i| HZ_LOW + (i as f64 + 0.5) * hz_per_bin).collect();
    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid start time");

    // rtl_power layout: date, time, Hz low, Hz high, Hz step, samples, dB...
    let output_path = "sample_scan.csv";
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(output_path)
        .expect("Failed to create output file");

    for s in 0..SWEEPS {
        let stamp = start + Duration::seconds(10 * s as i64);
        let date = stamp.format("%Y-%m-%d").to_string();
        let time = stamp.format("%H:%M:%S").to_string();
        let row = sweep(&freqs, s, &mut noise);

        for (hop, chunk) in row.chunks(bins_per_hop).enumerate() {
            let hop_low = HZ_LOW + (hop * bins_per_hop) as f64 * hz_per_bin;
            let hop_high = hop_low + bins_per_hop as f64 * hz_per_bin;
            let mut record = vec![
                date.clone(),
                time.clone(),
                format!("{hop_low:.0}"),
                format!("{hop_high:.0}"),
                format!("{hz_per_bin:.2}"),
                "16".to_string(),
            ];
            record.extend(chunk.iter().map(|db| format!("{db:.2}")));
            writer.write_record(&record).expect("Failed to write record");
        }
    }
    writer.flush().expect("Failed to flush CSV");

    // Two of the stations are already known; one entry is a sentinel.
    let mut list = std::fs::File::create("freq_list").expect("Failed to create freq_list");
    writeln!(list, "89300000 #00FF00").expect("Failed to write freq_list");
    writeln!(list, "94700000 #FF0000").expect("Failed to write freq_list");
    writeln!(list, "106000000 #00FFFF").expect("Failed to write freq_list");

    println!(
        "Wrote {SWEEPS} sweeps ({BINS} bins in {HOPS} hops) to {output_path} and a 3-entry freq_list"
    );
}
