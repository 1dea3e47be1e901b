//! Testing utilities and mock implementations for pipeline tests.
//!
//! Mocks for the three external seams (discovery, collectors, export) with
//! controllable behavior, so full pipeline runs can be exercised without
//! real backends.

mod mock_collector;
mod mock_discovery;
mod mock_exporter;

pub use mock_collector::MockCollector;
pub use mock_discovery::MockDiscovery;
pub use mock_exporter::MockExporter;
