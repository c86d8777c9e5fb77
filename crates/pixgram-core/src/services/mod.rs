//! Write paths issued from user interactions.
//!
//! Services never touch view state: the snapshot pushed after a write is what
//! updates the screen.

mod comments;
mod likes;
mod orphans;
mod profiles;
mod upload;

pub use comments::{CommentService, comments_query};
pub use likes::LikeService;
pub use orphans::OrphanSweeper;
pub use profiles::ProfileService;
pub use upload::UploadSequencer;
