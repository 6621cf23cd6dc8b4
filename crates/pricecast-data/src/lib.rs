pub mod frame;
pub mod listing;
pub mod synthetic;

pub use frame::{Column, Frame};
pub use listing::{
    drop_zero_mileage, listings_to_frame, load_listings, read_listings, Listing, LoadError,
    TARGET_COLUMN,
};
