//! quizhub: quiz content API, newsletter/contact storage and reading-time estimates,
//! laid out as a hexagon (domain, ports, adapters, use cases).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
