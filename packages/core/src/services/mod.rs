pub mod envelope;
pub mod trips_api;

#[cfg(test)]
pub mod mock_trips_api;
