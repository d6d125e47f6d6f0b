pub mod bins;
pub mod simulate;
