//! Synthetic market table

use crate::config::MarketDataMode;
use comfy_table::{Cell, CellAlignment, Table, presets};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Header of the label column
pub const MONTH_COLUMN: &str = "Month";

/// Header of the value column
pub const PRICE_COLUMN: &str = "Price_per_MWh";

/// Row labels, in order
pub const MONTHS: [&str; 3] = ["Jan", "Feb", "Mar"];

/// Values used by [`MarketDataMode::Fixed`]
pub const FIXED_PRICES: [u32; 3] = [75, 80, 78];

/// One month of pricing data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketRow {
    /// Month label
    pub month: String,
    /// Price in dollars per megawatt-hour
    pub price_per_mwh: u32,
}

/// Three months of energy prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketTable {
    rows: Vec<MarketRow>,
}

impl MarketTable {
    /// Generate a table according to `mode`
    pub fn generate(mode: MarketDataMode) -> Self {
        let prices = match mode {
            MarketDataMode::Fixed => FIXED_PRICES,
            MarketDataMode::Uniform { low, high, seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                let (low, high) = (low.min(high), low.max(high));
                std::array::from_fn(|_| rng.random_range(low..=high))
            }
        };

        let rows = MONTHS
            .iter()
            .zip(prices)
            .map(|(month, price_per_mwh)| MarketRow {
                month: (*month).to_string(),
                price_per_mwh,
            })
            .collect();

        Self { rows }
    }

    /// Rows in month order
    pub fn rows(&self) -> &[MarketRow] {
        &self.rows
    }

    /// Month labels
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.month.as_str()).collect()
    }

    /// Price column
    pub fn prices(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.price_per_mwh).collect()
    }

    /// Plain-text rendering with a header row and right-aligned values
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_header(vec![MONTH_COLUMN, PRICE_COLUMN]);

        for row in &self.rows {
            table.add_row(vec![Cell::new(&row.month), Cell::new(row.price_per_mwh)]);
        }

        if let Some(column) = table.column_mut(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }

        table
            .to_string()
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary stored in the pipeline context
    pub fn summary(&self, topic: &str) -> String {
        format!("Energy pricing data for {topic}:\n{}", self.render())
    }
}
