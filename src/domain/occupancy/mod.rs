pub mod occupancy_aggregator;
pub mod occupancy_record;
