pub mod dates;
pub mod lenient;
pub mod models;
pub mod rankings;
pub mod sync_result;

pub use models::*;
pub use rankings::{TeamRanking, aggregate_team_rankings};
pub use sync_result::{SyncResponse, SyncTally};
