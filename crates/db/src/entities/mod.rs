//! `SeaORM` entity definitions.

pub mod attachments;
pub mod comments;
pub mod messages;
pub mod posts;

pub mod prelude {
    //! Entity re-exports.

    pub use super::attachments::Entity as Attachments;
    pub use super::comments::Entity as Comments;
    pub use super::messages::Entity as Messages;
    pub use super::posts::Entity as Posts;
}
