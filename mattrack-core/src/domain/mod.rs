//! Domain types for the mat tracker

pub mod attendance;
pub mod error;
pub mod ids;
pub mod promotion;
pub mod rank;
pub mod student;

pub use attendance::{AttendanceRecord, ClassType};
pub use error::DomainError;
pub use ids::{AttendanceId, PromotionId, StudentId};
pub use promotion::PromotionRecord;
pub use rank::{Rank, RankPosition, Stripes};
pub use student::Student;
