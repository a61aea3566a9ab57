// Domain layer - Core types of a split batch

pub mod model;
