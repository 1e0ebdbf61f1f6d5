//! Job-shop domain models.
//!
//! Provides the data types for describing a job-shop instance and its
//! solution. Everything here is plain data: validation happens when an
//! instance is built, solving happens in [`crate::cp`].
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Healthcare | Logistics |
//! |-----------|--------------|------------|-----------|
//! | Job | Order | Patient Case | Shipment |
//! | Operation | Routing Step | Procedure | Transport Leg |
//! | Machine | Work Center | Operating Room | Dock |
//! | Schedule | Production Plan | OR Schedule | Route Plan |

mod instance;
mod job;
mod operation;
mod schedule;

pub use instance::{InstanceData, JobShopInstance};
pub use job::Job;
pub use operation::{Operation, OperationId, OperationKey};
pub use schedule::{Schedule, ScheduledOperation, Violation, ViolationType};
