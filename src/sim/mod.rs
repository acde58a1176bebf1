pub mod event;
pub mod frame;
pub mod leaderboard;
pub mod step;
pub mod world;
