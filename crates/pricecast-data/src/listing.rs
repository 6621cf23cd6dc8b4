use crate::frame::{Column, Frame};
use log::info;
use pricecast_core::PipelineResult;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Name of the target column produced by [`listings_to_frame`].
pub const TARGET_COLUMN: &str = "price";

/// One used-vehicle advertisement, as delivered by the upstream cleaning
/// step: fully typed, no missing values. Identifier columns are not part of
/// the record and are therefore dropped at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub maker: String,
    pub model: String,
    pub color: String,
    pub reg_year: i64,
    pub body: String,
    pub mileage: f64,
    pub engine_size: f64,
    pub transmission: String,
    pub fuel: String,
    pub seats: i64,
    pub doors: i64,
    pub ad_year: i64,
    pub ad_month: i64,
    pub price: f64,
}

impl Listing {
    /// Advertisement time as a continuous year + fraction.
    pub fn ad_time(&self) -> f64 {
        self.ad_year as f64 + (self.ad_month as f64 - 1.0) / 12.0
    }
}

/// Errors raised while reading listings from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read listing file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed listing record: {0}")]
    Csv(#[from] csv::Error),
}

/// Read listings from any CSV source with a header row.
pub fn read_listings<R: Read>(reader: R) -> Result<Vec<Listing>, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut listings = Vec::new();
    for record in rdr.deserialize() {
        listings.push(record?);
    }
    Ok(listings)
}

/// Read listings from a CSV file.
pub fn load_listings(path: impl AsRef<Path>) -> Result<Vec<Listing>, LoadError> {
    let file = std::fs::File::open(path)?;
    read_listings(file)
}

/// Drop rows with zero mileage and report how many were excluded.
///
/// The log transform downstream requires strictly positive mileage, so the
/// exclusion happens here, once, before any split.
pub fn drop_zero_mileage(listings: Vec<Listing>) -> (Vec<Listing>, usize) {
    let before = listings.len();
    let kept: Vec<Listing> = listings.into_iter().filter(|l| l.mileage > 0.0).collect();
    let excluded = before - kept.len();
    if excluded > 0 {
        info!("excluded {excluded} zero-mileage listings of {before}");
    }
    (kept, excluded)
}

/// Turn listings into the column frame the recipe consumes.
///
/// The raw ad year/month pair becomes the continuous `ad_time` column; the
/// target stays in the frame under [`TARGET_COLUMN`] until the run splits
/// predictors from target.
pub fn listings_to_frame(listings: &[Listing]) -> PipelineResult<Frame> {
    let mut frame = Frame::new();
    let cat = |f: fn(&Listing) -> &String| -> Column {
        Column::Categorical(listings.iter().map(|l| f(l).clone()).collect())
    };
    let num = |f: fn(&Listing) -> f64| -> Column {
        Column::Numeric(listings.iter().map(f).collect())
    };

    frame.push("maker", cat(|l| &l.maker))?;
    frame.push("model", cat(|l| &l.model))?;
    frame.push("color", cat(|l| &l.color))?;
    frame.push("body", cat(|l| &l.body))?;
    frame.push("transmission", cat(|l| &l.transmission))?;
    frame.push("fuel", cat(|l| &l.fuel))?;
    frame.push("reg_year", num(|l| l.reg_year as f64))?;
    frame.push("mileage", num(|l| l.mileage))?;
    frame.push("engine_size", num(|l| l.engine_size))?;
    frame.push("seats", num(|l| l.seats as f64))?;
    frame.push("doors", num(|l| l.doors as f64))?;
    frame.push("ad_time", num(|l| l.ad_time()))?;
    frame.push(TARGET_COLUMN, num(|l| l.price))?;
    Ok(frame)
}
