use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Mean closed PnL per sentiment class; greedier markets pay a little better.
const SENTIMENTS: [(&str, f64); 5] = [
    ("Extreme Fear", -12.0),
    ("Fear", -4.0),
    ("Neutral", 1.0),
    ("Greed", 6.0),
    ("Extreme Greed", 9.0),
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let accounts = ["0xa1", "0xb2", "0xc3", "0xd4"];
    let symbols = ["BTC", "ETH", "SOL"];
    let sides = ["BUY", "SELL"];
    let n_trades = 500;

    let mut account = Vec::with_capacity(n_trades);
    let mut symbol = Vec::with_capacity(n_trades);
    let mut side = Vec::with_capacity(n_trades);
    let mut size_usd = Vec::with_capacity(n_trades);
    let mut closed_pnl: Vec<Option<f64>> = Vec::with_capacity(n_trades);
    let mut classification: Vec<Option<&str>> = Vec::with_capacity(n_trades);

    for _ in 0..n_trades {
        let (label, mean) = SENTIMENTS[(rng.next_u64() % SENTIMENTS.len() as u64) as usize];

        account.push(rng.pick(&accounts));
        symbol.push(rng.pick(&symbols));
        side.push(rng.pick(&sides));
        size_usd.push((rng.gauss(2_000.0, 800.0)).abs());

        // Opening trades carry no closed PnL; some days have no sentiment reading.
        closed_pnl.push((rng.next_f64() > 0.1).then(|| rng.gauss(mean, 25.0)));
        classification.push((rng.next_f64() > 0.05).then_some(label));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("account", DataType::Utf8, false),
        Field::new("symbol", DataType::Utf8, false),
        Field::new("side", DataType::Utf8, false),
        Field::new("size_usd", DataType::Float64, false),
        Field::new("closedPnL", DataType::Float64, true),
        Field::new("Classification", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(account)),
            Arc::new(StringArray::from(symbol)),
            Arc::new(StringArray::from(side)),
            Arc::new(Float64Array::from(size_usd)),
            Arc::new(Float64Array::from(closed_pnl)),
            Arc::new(StringArray::from(classification)),
        ],
    )
    .context("building record batch")?;

    let output_path = "sample_trades.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {n_trades} trades to {output_path}");
    Ok(())
}
