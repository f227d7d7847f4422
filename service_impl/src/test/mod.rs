#[cfg(test)]
pub mod reservation;
