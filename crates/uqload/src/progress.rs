use std::io::{self, Write};

use crate::error::{Result, UqloadError};

pub const BAR_LENGTH: usize = 40;

pub fn percent_complete(done: u64, total: u64) -> Result<f64> {
    if total == 0 {
        return Err(UqloadError::invalid_argument("total must be greater than zero"));
    }
    Ok(done as f64 / total as f64 * 100.0)
}

/// A `BAR_LENGTH` wide bar. A `>` marks the fill edge unless the bar is
/// empty or full.
pub fn render_bar(percent: f64) -> String {
    let block = ((BAR_LENGTH as f64 * percent / 100.0) as usize).min(BAR_LENGTH);
    match block {
        0 => " ".repeat(BAR_LENGTH),
        BAR_LENGTH => "-".repeat(BAR_LENGTH),
        _ => format!(
            "{}>{}",
            "-".repeat(block),
            " ".repeat(BAR_LENGTH - block - 1)
        ),
    }
}

/// A full overwriting terminal line, starting with a carriage return.
pub fn render_line(percent: f64) -> String {
    format!(
        "\rDownloading... |{}| {percent:.2}% completed",
        render_bar(percent)
    )
}

#[derive(Debug, Clone)]
pub struct ProgressBar {
    total: u64,
    percent: f64,
}

impl ProgressBar {
    pub fn new(total: u64) -> Result<Self> {
        percent_complete(0, total)?;
        Ok(Self {
            total,
            percent: 0.0,
        })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn update(&mut self, done: u64) -> f64 {
        // `total` is non-zero by construction.
        self.percent = done as f64 / self.total as f64 * 100.0;
        self.percent
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", render_line(self.percent))?;
        writer.flush()
    }
}
